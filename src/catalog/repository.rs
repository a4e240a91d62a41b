use crate::catalog::error::Result;
use crate::catalog::sorting::DerivedSort;
use crate::catalog::traits::ApartmentStore;
use crate::models::{Apartment, FloorPlan};
use std::sync::Arc;

/// Read surface over the catalog store for the list, detail and map views.
///
/// Pure delegation: storage errors come back untouched.
#[derive(Clone)]
pub struct ApartmentRepository {
    store: Arc<dyn ApartmentStore>,
}

impl ApartmentRepository {
    pub fn new(store: Arc<dyn ApartmentStore>) -> Self {
        Self { store }
    }

    pub async fn get_apartment_by_name(&self, name: &str) -> Result<Option<Apartment>> {
        self.store.apartment_by_name(name).await
    }

    pub async fn find_apartments_by_name(&self, name: &str) -> Result<Vec<Apartment>> {
        self.store.apartments_matching(name).await
    }

    pub async fn get_floor_plans(&self, apartment_id: i64) -> Result<Vec<FloorPlan>> {
        self.store.floor_plans(apartment_id).await
    }

    pub async fn get_all_apartments(&self) -> Result<Vec<Apartment>> {
        self.store.all_apartments().await
    }

    pub async fn get_apartments_by_cheapest(&self) -> Result<Vec<Apartment>> {
        self.store.apartments_sorted(DerivedSort::Cheapest).await
    }

    pub async fn get_apartments_by_most_expensive(&self) -> Result<Vec<Apartment>> {
        self.store.apartments_sorted(DerivedSort::MostExpensive).await
    }

    pub async fn get_apartments_by_smallest(&self) -> Result<Vec<Apartment>> {
        self.store.apartments_sorted(DerivedSort::Smallest).await
    }

    pub async fn get_apartments_by_largest(&self) -> Result<Vec<Apartment>> {
        self.store.apartments_sorted(DerivedSort::Largest).await
    }

    pub async fn get_apartments_by(&self, order: DerivedSort) -> Result<Vec<Apartment>> {
        match order {
            DerivedSort::Cheapest => self.get_apartments_by_cheapest().await,
            DerivedSort::MostExpensive => self.get_apartments_by_most_expensive().await,
            DerivedSort::Smallest => self.get_apartments_by_smallest().await,
            DerivedSort::Largest => self.get_apartments_by_largest().await,
        }
    }
}
