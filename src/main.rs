mod apartments;
mod catalog;
mod models;

use anyhow::{Context, Result};
use apartments::{load_apartment_detail, map_markers, ApartmentListModel, ListSnapshot, NameMapper};
use catalog::{seed_if_missing, ApartmentRepository, CatalogConfig, SqliteStore};
use chrono::{DateTime, Utc};
use models::{Apartment, FloorPlan, SortOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Apartment Finder - local catalog");
    info!("===================================");

    let config = CatalogConfig::from_env();
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open catalog at {}", config.database_path.display()))?;
    let store = Arc::new(store);

    if config.seed_on_start {
        seed_if_missing(store.as_ref())
            .await
            .context("Failed to seed apartment catalog")?;
    }

    let repository = ApartmentRepository::new(store);
    let names = Arc::new(NameMapper::builtin().context("Apartment name table is inconsistent")?);
    check_name_table(&repository, &names).await?;

    // List screen: every ordering, then a search over the last one
    let list = Arc::new(ApartmentListModel::new(repository.clone(), Arc::clone(&names)));
    list.request_sort_order(SortOrder::None)
        .await
        .context("Initial apartment load did not finish")?;
    print_list(&list.snapshot());

    for order in SortOrder::ALL {
        list.set_sort_order(order).await;
        print_list(&list.snapshot());
    }

    list.set_search_text("apart");
    print_list(&list.snapshot());
    list.set_search_text("penthouse");
    print_list(&list.snapshot());
    list.clear_search();
    list.refresh().await;

    // Detail screen for each picker entry
    for display_name in names.all_display_names() {
        let detail = load_apartment_detail(&repository, &names, display_name).await?;
        match &detail.apartment {
            Some(apartment) => {
                println!("{} ({})", display_name, apartment.name);
                println!("   Utilities: {}", apartment.utilities);
                for line in detail.floor_plan_lines() {
                    println!("   {}", line);
                }
            }
            None => println!("{}: no matching apartment", display_name),
        }
    }
    println!();

    // Map screen
    let markers = map_markers(&repository, &names).await?;
    for marker in &markers {
        println!(
            "📍 {} (#{}) at {:.5}, {:.5}",
            marker.title, marker.apartment_id, marker.latitude, marker.longitude
        );
    }
    info!("Placed {} apartments on the map", markers.len());

    export_catalog(&repository, &names, &config).await?;

    Ok(())
}

/// Warn about table entries the catalog cannot resolve, or resolves to several apartments
async fn check_name_table(repository: &ApartmentRepository, names: &NameMapper) -> Result<()> {
    let catalog = repository.get_all_apartments().await?;
    for missing in names.unknown_storage_names(&catalog) {
        warn!("Name table entry {:?} matches no catalog apartment", missing);
    }

    for storage in names.all_storage_names() {
        let matches = repository.find_apartments_by_name(storage).await?;
        if matches.len() > 1 {
            let found: Vec<&str> = matches.iter().map(|a| a.name.as_str()).collect();
            warn!("Name {:?} is ambiguous, lookups will pick the first of {:?}", storage, found);
        }
    }
    Ok(())
}

fn print_list(snapshot: &ListSnapshot) {
    let query = snapshot.search_text.trim();
    if query.is_empty() {
        println!("== {} ==", snapshot.sort_order.label());
    } else {
        println!("== {} / search {:?} ==", snapshot.sort_order.label(), query);
    }

    if let Some(error) = &snapshot.error {
        println!("   ⚠️  {}", error);
    }
    if snapshot.is_loading {
        println!("   loading...");
    }
    if let Some(message) = &snapshot.empty_message {
        println!("   {}", message);
    }
    for (i, item) in snapshot.apartments.iter().enumerate() {
        println!("{}. {} [{} #{}]", i + 1, item.display_name, item.name, item.id);
    }
    println!();
}

#[derive(Serialize)]
struct CatalogExport {
    exported_at: DateTime<Utc>,
    apartments: Vec<ExportedApartment>,
}

#[derive(Serialize)]
struct ExportedApartment {
    #[serde(flatten)]
    apartment: Apartment,
    display_name: String,
    floor_plans: Vec<FloorPlan>,
}

async fn export_catalog(repository: &ApartmentRepository, names: &NameMapper, config: &CatalogConfig) -> Result<()> {
    let mut apartments = Vec::new();
    for apartment in repository.get_all_apartments().await? {
        let floor_plans = repository.get_floor_plans(apartment.id).await?;
        let unparsed = floor_plans
            .iter()
            .filter(|p| p.rent.range().is_none() || p.size.range().is_none())
            .count();
        if unparsed > 0 {
            warn!("{} has {} floor plans with unparsed ranges", apartment.name, unparsed);
        }

        apartments.push(ExportedApartment {
            display_name: names.to_display_name(&apartment.name).to_string(),
            apartment,
            floor_plans,
        });
    }

    let export = CatalogExport {
        exported_at: Utc::now(),
        apartments,
    };
    let json = serde_json::to_string_pretty(&export)?;
    tokio::fs::write(&config.export_path, json)
        .await
        .with_context(|| format!("Failed to write {}", config.export_path.display()))?;
    info!("💾 Saved {} apartments to {}", export.apartments.len(), config.export_path.display());

    Ok(())
}
