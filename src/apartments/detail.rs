use crate::apartments::names::NameMapper;
use crate::catalog::{ApartmentRepository, Result};
use crate::models::{Apartment, FloorPlan};
use serde::Serialize;
use tracing::debug;

/// An apartment and its floor plans, as shown on the detail screen
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ApartmentDetail {
    pub apartment: Option<Apartment>,
    pub floor_plans: Vec<FloorPlan>,
}

impl ApartmentDetail {
    pub fn floor_plan_lines(&self) -> Vec<String> {
        self.floor_plans.iter().map(FloorPlan::summary).collect()
    }
}

/// Look up an apartment by the name the UI shows for it.
///
/// No match is not an error: the detail comes back empty.
pub async fn load_apartment_detail(
    repository: &ApartmentRepository,
    names: &NameMapper,
    display_name: &str,
) -> Result<ApartmentDetail> {
    let storage_name = names.to_storage_name(display_name);
    let Some(apartment) = repository.get_apartment_by_name(storage_name).await? else {
        debug!("No apartment matches {:?} (stored as {:?})", display_name, storage_name);
        return Ok(ApartmentDetail::default());
    };

    let floor_plans = repository.get_floor_plans(apartment.id).await?;
    Ok(ApartmentDetail {
        apartment: Some(apartment),
        floor_plans,
    })
}
