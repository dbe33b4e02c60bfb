#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive CLI for the mobility map viewer.
//!
//! Lets users pick a tool: start the server, inspect the dataset tree, or
//! try a filter combination in the terminal and see what the map would
//! draw.
//!
//! Uses `indicatif-log-bridge` (via [`mobility_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod explore;
mod inspect;

use std::path::PathBuf;
use std::sync::Arc;

use dialoguer::{Input, Select};
use mobility_map_cli_utils::{IndicatifProgress, MultiProgress};
use mobility_map_dataset::{Catalog, DatasetError, DatasetLoader};

/// Top-level tool selection.
enum Tool {
    Server,
    Inspect,
    Explore,
}

impl Tool {
    const ALL: &[Self] = &[Self::Server, Self::Inspect, Self::Explore];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Inspect => "Inspect datasets",
            Self::Explore => "Explore filters",
        }
    }
}

/// Prompts for the data directory, defaulting to `DATA_DIR` or `data`.
fn prompt_data_dir() -> PathBuf {
    let default = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    Input::new()
        .with_prompt("Data directory")
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
        .into()
}

/// Loads every required dataset under `root` with a progress bar.
fn load_catalog(multi: &MultiProgress, root: PathBuf) -> Result<Arc<Catalog>, DatasetError> {
    let progress = IndicatifProgress::load_bar(multi, "Loading datasets");
    Catalog::load(&DatasetLoader::new(root), &progress).map(Arc::new)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = mobility_map_cli_utils::init_logger();

    println!("Mobility Map");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Server => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(mobility_map_server::interactive::run())
            })
            .await??;
        }
        Tool::Inspect => {
            let catalog = load_catalog(&multi, prompt_data_dir())?;
            inspect::run(&catalog);
        }
        Tool::Explore => {
            let catalog = load_catalog(&multi, prompt_data_dir())?;
            explore::run(catalog)?;
        }
    }

    Ok(())
}
