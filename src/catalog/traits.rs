use crate::catalog::error::Result;
use crate::catalog::sorting::DerivedSort;
use crate::models::{Apartment, FloorPlan};
use async_trait::async_trait;

/// Storage backend for the apartment catalog
#[async_trait]
pub trait ApartmentStore: Send + Sync {
    /// Insert or overwrite by primary key. An unassigned id gets a fresh key.
    /// Returns the stored id.
    async fn insert_apartment(&self, apartment: Apartment) -> Result<i64>;

    /// Insert or overwrite by primary key, like `insert_apartment`
    async fn insert_floor_plan(&self, floor_plan: FloorPlan) -> Result<i64>;

    /// Write a batch of apartments and floor plans.
    ///
    /// Backends that can should apply the batch atomically; the default writes
    /// row by row and may stop partway on error.
    async fn insert_catalog(&self, apartments: Vec<Apartment>, floor_plans: Vec<FloorPlan>) -> Result<()> {
        for apartment in apartments {
            self.insert_apartment(apartment).await?;
        }
        for floor_plan in floor_plans {
            self.insert_floor_plan(floor_plan).await?;
        }
        Ok(())
    }

    async fn all_apartments(&self) -> Result<Vec<Apartment>>;

    async fn floor_plans(&self, apartment_id: i64) -> Result<Vec<FloorPlan>>;

    /// First apartment (lowest id) whose name contains `fragment`, ignoring case.
    ///
    /// Unlike a plain substring match, the fragment is trimmed and a blank
    /// fragment matches nothing.
    async fn apartment_by_name(&self, fragment: &str) -> Result<Option<Apartment>>;

    /// Every apartment whose name contains `fragment`, ignoring case, by id.
    /// Trimmed and blank-rejecting like `apartment_by_name`.
    async fn apartments_matching(&self, fragment: &str) -> Result<Vec<Apartment>>;

    async fn apartments_sorted(&self, order: DerivedSort) -> Result<Vec<Apartment>>;

    async fn apartment_count(&self) -> Result<usize>;
}
