use crate::apartments::names::NameMapper;
use crate::catalog::{ApartmentRepository, Result};
use serde::Serialize;
use tracing::debug;

/// A pin on the apartment map
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapMarker {
    pub apartment_id: i64,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Markers for every apartment with usable coordinates
pub async fn map_markers(repository: &ApartmentRepository, names: &NameMapper) -> Result<Vec<MapMarker>> {
    let apartments = repository.get_all_apartments().await?;

    let markers = apartments
        .iter()
        .filter_map(|apartment| {
            let Some(location) = apartment.location() else {
                debug!("Skipping {} on map, coordinates {:?}", apartment.name, apartment.coordinates);
                return None;
            };
            Some(MapMarker {
                apartment_id: apartment.id,
                title: names.to_display_name(&apartment.name).to_string(),
                latitude: location.latitude,
                longitude: location.longitude,
            })
        })
        .collect();

    Ok(markers)
}
