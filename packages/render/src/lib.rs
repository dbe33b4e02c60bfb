#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View builders for the mobility map.
//!
//! Turns a [`SessionState`](mobility_map_session::SessionState) into what
//! the frontend draws: the filter form ([`form`]), map overlays with
//! tooltips ([`layer`], [`tooltip`]), and the page with its summary
//! ([`page`], [`summary`]). Every builder is deterministic apart from the
//! measured timings.

pub mod form;
pub mod layer;
pub mod page;
pub mod summary;
pub mod tooltip;

pub use form::{FilterControl, FilterForm, FormOption, FormTemplate, build_form};
pub use layer::{MapLayer, Shape, build_layer, layer_name};
pub use page::{MapControl, MapView, OverlayLayer, RenderedPage, TileLayer, render_page};
pub use summary::{PhaseTimings, SummaryReport};
