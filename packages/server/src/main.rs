#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mobility map server binary.
//!
//! Reads its settings from the environment (`DATA_DIR`, `BIND_ADDR`,
//! `PORT`, `COLLISION_CACHE_SIZE`, `STATIC_DIR`, `SESSION_IDLE_MINUTES`).

use mobility_map_server::{ServerConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    run_server(ServerConfig::from_env()).await
}
