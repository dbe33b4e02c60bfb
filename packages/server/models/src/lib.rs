#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the mobility map server.
//!
//! Events posted by the frontend are plain
//! [`Message`](mobility_map_session::Message)s; every session endpoint
//! answers with an [`ApiSession`] carrying the state, the form and the
//! rendered page.

use chrono::{DateTime, Utc};
use mobility_map_dataset_models::{Basemap, DatasetId};
use mobility_map_render::{FilterForm, RenderedPage};
use mobility_map_session::SessionState;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    pub healthy: bool,
    pub version: String,
    /// Number of live sessions.
    pub sessions: usize,
}

/// One selectable basemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBasemap {
    pub id: Basemap,
    /// Name shown in the layer switcher.
    pub name: String,
    /// Tile provider identifier.
    pub tiles: String,
    pub default: bool,
}

impl From<Basemap> for ApiBasemap {
    fn from(basemap: Basemap) -> Self {
        Self {
            id: basemap,
            name: basemap.display_name().to_string(),
            tiles: basemap.tiles().to_string(),
            default: basemap == Basemap::default(),
        }
    }
}

/// A loaded dataset and its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    pub id: DatasetId,
    pub name: String,
    /// Feature count; for collisions, the total across every readable
    /// year file.
    pub feature_count: u64,
    /// Attribute columns present on at least one feature.
    pub columns: Vec<String>,
}

/// A session with everything needed to draw it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSession {
    /// Session id (UUID v4).
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: SessionState,
    /// Whether the form differs from what the map shows.
    pub pending_changes: bool,
    pub form: FilterForm,
    pub page: RenderedPage,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
