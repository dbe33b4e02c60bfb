//! Prints what the catalog loaded: sizes, columns and collision years.

use mobility_map_dataset::Catalog;
use mobility_map_dataset_models::DatasetId;

pub fn run(catalog: &Catalog) {
    println!();
    for id in DatasetId::all() {
        if *id == DatasetId::Collisions {
            continue;
        }
        let dataset = catalog.dataset(*id);
        println!("{} ({} features)", id.display_name(), dataset.len());
        let columns: Vec<&str> = dataset.columns().iter().map(String::as_str).collect();
        println!("  columns: {}", columns.join(", "));
    }

    let collisions = catalog.collisions();
    let totals = collisions.totals();
    println!();
    println!(
        "{} ({})",
        DatasetId::Collisions.display_name(),
        collisions.directory().display()
    );
    if totals.by_year.is_empty() {
        println!("  no year files found");
    }
    for (year, count) in &totals.by_year {
        let note = if totals.failed_years.contains(year) {
            " (unreadable)"
        } else {
            ""
        };
        println!("  {year}: {count}{note}");
    }
    for (characteristic, count) in &totals.by_characteristic {
        println!("  {}: {count}", characteristic.display_label());
    }

    println!();
    println!("Loaded in {:.3}s", catalog.load_elapsed().as_secs_f64());
}
