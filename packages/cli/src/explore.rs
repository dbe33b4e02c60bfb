//! Tries one dataset's filter combination in the terminal.
//!
//! Walks the same form, reducer and page builder the server uses, then
//! prints the layer names and summary instead of drawing a map.

use std::num::NonZeroUsize;
use std::sync::Arc;

use dialoguer::{MultiSelect, Select};
use mobility_map_dataset::Catalog;
use mobility_map_dataset_models::DatasetId;
use mobility_map_filter::FilterEngine;
use mobility_map_filter::cache::DEFAULT_COLLISION_CAPACITY;
use mobility_map_render::{FormTemplate, render_page};
use mobility_map_session::{Message, SessionState, update};

/// Runs the explorer over `catalog`.
///
/// # Errors
///
/// Returns an error if a prompt cannot be shown.
pub fn run(catalog: Arc<Catalog>) -> Result<(), dialoguer::Error> {
    let template = FormTemplate::from_catalog(&catalog);
    let engine = FilterEngine::new(catalog, capacity());

    let names: Vec<&str> = DatasetId::all().iter().map(|d| d.display_name()).collect();
    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&names)
        .default(0)
        .interact()?;
    let dataset = DatasetId::all()[idx];

    let mut state = SessionState::new();
    for control in template
        .controls()
        .iter()
        .filter(|c| c.dimension.dataset() == dataset)
    {
        if let Some(reason) = &control.unavailable {
            println!("{reason}");
            continue;
        }
        let labels: Vec<&str> = control.options.iter().map(|o| o.label.as_str()).collect();
        let picked = MultiSelect::new()
            .with_prompt(control.label)
            .items(&labels)
            .interact()?;
        update(
            &mut state,
            Message::SelectionChanged {
                dimension: control.dimension,
                values: picked
                    .into_iter()
                    .map(|i| control.options[i].value.clone())
                    .collect(),
            },
        );
    }
    update(&mut state, Message::Submit);

    let page = render_page(&state, &engine);
    println!();
    for warning in &page.warnings {
        println!("warning: {warning}");
    }
    for overlay in &page.map.overlays {
        println!("{} ({} features)", overlay.name, overlay.feature_count);
    }
    println!("{}", page.summary);

    Ok(())
}

fn capacity() -> NonZeroUsize {
    std::env::var("COLLISION_CACHE_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_COLLISION_CAPACITY)
}
