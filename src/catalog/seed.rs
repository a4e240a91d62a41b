use crate::catalog::error::Result;
use crate::catalog::traits::ApartmentStore;
use crate::models::{Apartment, FloorPlan};
use std::collections::HashSet;
use tracing::{debug, info};

/// The fixed catalog loaded into an empty store
pub fn seed_apartments() -> Vec<Apartment> {
    vec![
        Apartment::new("Waterfront", "", "43.07761,-89.39298", "Wifi").with_id(1),
        Apartment::new("Palisade", "", "43.07174,-89.39501", "Wifi").with_id(2),
        Apartment::new("Landon", "", "", "Wifi").with_id(3),
        Apartment::new("Iota Courts", "", "", "Wifi").with_id(4),
        Apartment::new("Aberdeen Apartments", "", "43.07321,-89.39356", "Wifi").with_id(5),
    ]
}

pub fn seed_floor_plans() -> Vec<FloorPlan> {
    vec![
        FloorPlan::new(1, "1024 - 1170", "3 bed, 2 bath", "1576 - 1871").with_id(1),
        FloorPlan::new(1, "1373 - 1458", "5 bed, 2 bath", "1450 - 1680").with_id(2),
        FloorPlan::new(2, "775 - 865", "2 bed, 1 bath", "1525 - 1588").with_id(3),
        FloorPlan::new(2, "861 - 904", "2 bed, 2 bath", "1700 - 1800").with_id(4),
        FloorPlan::new(3, "300 - 365", "Studio", "1300 - 1400").with_id(5),
        FloorPlan::new(3, "498 - 518", "1 bed, 1 bath", "1500 - 1600").with_id(6),
        FloorPlan::new(4, "298 - 435", "Studio", "1750 - 2100").with_id(7),
        FloorPlan::new(4, "457 - 792", "1 bed, 1 bath", "1925 - 2205").with_id(8),
        FloorPlan::new(5, "577 - 643", "1 bed, 1 bath", "2200 - 2300").with_id(9),
        FloorPlan::new(5, "657 - 685", "2 bed, 1 bath", "1450 - 1600").with_id(10),
    ]
}

/// Whether every seed apartment and floor plan id is already stored
async fn seed_is_present(store: &dyn ApartmentStore) -> Result<bool> {
    let stored: HashSet<i64> = store.all_apartments().await?.iter().map(|a| a.id).collect();
    let apartments = seed_apartments();
    if !apartments.iter().all(|a| stored.contains(&a.id)) {
        return Ok(false);
    }

    let plans = seed_floor_plans();
    for apartment in &apartments {
        let stored_plans: HashSet<i64> = store
            .floor_plans(apartment.id)
            .await?
            .iter()
            .map(|p| p.id)
            .collect();
        let complete = plans
            .iter()
            .filter(|p| p.apartment_id == apartment.id)
            .all(|p| stored_plans.contains(&p.id));
        if !complete {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Load the fixed catalog unless all of it is already stored.
///
/// Seed rows carry fixed ids and inserts replace on conflict, so rewriting the
/// whole catalog after a partial earlier run fills the gaps without duplicating
/// anything. Returns whether rows were written.
pub async fn seed_if_missing(store: &dyn ApartmentStore) -> Result<bool> {
    if seed_is_present(store).await? {
        debug!("Catalog already seeded ({} apartments), skipping", store.apartment_count().await?);
        return Ok(false);
    }

    let apartments = seed_apartments();
    let floor_plans = seed_floor_plans();
    let (apartment_total, plan_total) = (apartments.len(), floor_plans.len());
    store.insert_catalog(apartments, floor_plans).await?;

    info!("Seeded catalog with {} apartments and {} floor plans", apartment_total, plan_total);
    Ok(true)
}
