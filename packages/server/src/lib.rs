#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the mobility map viewer.
//!
//! Loads the dataset catalog once at startup, keeps one selection state
//! per browser session, and answers every UI event with the rebuilt form
//! and page. The frontend bundle is served from the static directory.

mod handlers;
pub mod interactive;
pub mod sessions;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use mobility_map_dataset::progress::{LogProgress, ProgressCallback};
use mobility_map_dataset::{Catalog, DatasetError, DatasetLoader};
use mobility_map_filter::FilterEngine;
use mobility_map_filter::cache::DEFAULT_COLLISION_CAPACITY;
use mobility_map_render::FormTemplate;
use thiserror::Error;

use crate::sessions::SessionStore;

/// Errors raised while starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required dataset failed to load.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Render(#[from] tokio::task::JoinError),

    /// No session has the requested id.
    #[error("Session {id} not found")]
    SessionNotFound {
        /// Requested id.
        id: String,
    },

    /// The session id is not a UUID.
    #[error("Invalid session id {id:?}")]
    InvalidSessionId {
        /// Offending id.
        id: String,
    },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Root of the dataset tree (`DATA_DIR`).
    pub data_dir: PathBuf,
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Listen port (`PORT`).
    pub port: u16,
    /// Capacity of the collision filter cache (`COLLISION_CACHE_SIZE`).
    pub collision_cache_size: NonZeroUsize,
    /// Frontend bundle directory (`STATIC_DIR`).
    pub static_dir: PathBuf,
    /// Minutes a session may stay idle (`SESSION_IDLE_MINUTES`).
    pub session_idle_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            collision_cache_size: DEFAULT_COLLISION_CAPACITY,
            static_dir: PathBuf::from("app/dist"),
            session_idle_minutes: 120,
        }
    }
}

impl ServerConfig {
    /// The idle limit for sessions; the default when
    /// `session_idle_minutes` does not fit in a [`chrono::Duration`].
    #[must_use]
    pub fn session_idle_limit(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.session_idle_minutes).unwrap_or_else(|| {
            let fallback = Self::default().session_idle_minutes;
            log::warn!(
                "SESSION_IDLE_MINUTES={} is out of range; using {fallback}",
                self.session_idle_minutes
            );
            chrono::Duration::minutes(fallback)
        })
    }

    /// Reads every setting from its environment variable, keeping the
    /// default for unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parsed_env("PORT").unwrap_or(defaults.port),
            collision_cache_size: parsed_env("COLLISION_CACHE_SIZE")
                .unwrap_or(defaults.collision_cache_size),
            static_dir: std::env::var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            session_idle_minutes: parsed_env("SESSION_IDLE_MINUTES")
                .unwrap_or(defaults.session_idle_minutes),
        }
    }
}

fn parsed_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring invalid {name}={value:?}");
    }
    parsed
}

/// Shared application state.
pub struct AppState {
    /// Filters over the loaded catalog, with their result cache.
    pub engine: Arc<FilterEngine>,
    /// Form options, counted once at startup.
    pub form: Arc<FormTemplate>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Loads the catalog under `config.data_dir` and builds the shared
    /// state around it.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Dataset`] when a required dataset fails to
    /// load.
    pub fn load(
        config: &ServerConfig,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, ServerError> {
        let loader = DatasetLoader::new(&config.data_dir);
        let catalog = Arc::new(Catalog::load(&loader, progress)?);
        let form = Arc::new(FormTemplate::from_catalog(&catalog));
        let engine = Arc::new(FilterEngine::new(catalog, config.collision_cache_size));

        Ok(Self {
            engine,
            form,
            sessions: SessionStore::new(config.session_idle_limit()),
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/basemaps", web::get().to(handlers::basemaps))
            .route("/datasets", web::get().to(handlers::datasets))
            .route("/sessions", web::post().to(handlers::create_session))
            .route("/sessions/{id}", web::get().to(handlers::get_session))
            .route("/sessions/{id}", web::delete().to(handlers::delete_session))
            .route("/sessions/{id}/events", web::post().to(handlers::post_event)),
    );
}

/// Starts the mobility map server.
///
/// Loads every required dataset, then serves the API and the frontend
/// bundle until shut down. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and the logger.
///
/// # Errors
///
/// Returns an `std::io::Result` error if a required dataset fails to load,
/// the server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Loading datasets from {}...", config.data_dir.display());
    let state = AppState::load(&config, &LogProgress::shared()).map_err(|e| {
        log::error!("Failed to load datasets: {e}");
        std::io::Error::other(e.to_string())
    })?;
    let state = web::Data::new(state);

    let ServerConfig {
        bind_addr,
        port,
        static_dir,
        ..
    } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve frontend static files (production)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
