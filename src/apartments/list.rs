use crate::apartments::names::NameMapper;
use crate::catalog::sorting::DerivedSort;
use crate::catalog::{ApartmentRepository, Result};
use crate::models::{Apartment, SortOrder};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Row shown in the apartment list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApartmentListItem {
    pub id: i64,
    /// Catalog name, used for lookups
    pub name: String,
    /// Name shown to the user
    pub display_name: String,
}

/// Everything the list screen renders at one point in time
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListSnapshot {
    pub sort_order: SortOrder,
    pub search_text: String,
    pub apartments: Vec<ApartmentListItem>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set when nothing is visible and no fetch is running
    pub empty_message: Option<String>,
}

#[derive(Debug, Default)]
struct ListState {
    sort_order: SortOrder,
    search_text: String,
    /// Last applied fetch, in sort order, before search filtering
    fetched: Vec<ApartmentListItem>,
    is_loading: bool,
    error: Option<String>,
    /// Bumped by every fetch; only the newest may write `fetched`
    generation: u64,
}

impl ListState {
    fn visible(&self) -> Vec<ApartmentListItem> {
        let query = self.search_text.trim().to_lowercase();
        if query.is_empty() {
            return self.fetched.clone();
        }
        self.fetched
            .iter()
            .filter(|item| item.display_name.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}

/// Holds sort order and search text for the apartment list.
///
/// Changing the sort order refetches from the repository. Changing the search
/// text only refilters the last fetch.
pub struct ApartmentListModel {
    repository: ApartmentRepository,
    names: Arc<NameMapper>,
    state: Mutex<ListState>,
}

impl ApartmentListModel {
    pub fn new(repository: ApartmentRepository, names: Arc<NameMapper>) -> Self {
        Self {
            repository,
            names,
            state: Mutex::new(ListState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ListState> {
        // every write leaves ListState valid, so a poisoned lock is still usable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch ordering and fetch the list for it.
    ///
    /// Returns `false` when a later call superseded this one before it finished;
    /// its result is then dropped.
    pub async fn set_sort_order(&self, order: SortOrder) -> bool {
        let generation = {
            let mut state = self.state();
            state.sort_order = order;
            state.generation += 1;
            state.is_loading = true;
            state.error = None;
            state.generation
        };

        debug!("Fetching apartments ({:?}, generation {})", order, generation);
        let result = self.fetch(order).await;

        let mut state = self.state();
        if state.generation != generation {
            debug!("Dropping superseded {:?} fetch (generation {})", order, generation);
            return false;
        }

        state.is_loading = false;
        match result {
            Ok(items) => {
                info!("Loaded {} apartments sorted by {:?}", items.len(), order);
                state.fetched = items;
            }
            Err(err) => {
                warn!("Failed to load apartments: {}", err);
                state.error = Some(format!("Could not load apartments: {}", err));
            }
        }
        true
    }

    /// Run `set_sort_order` in the background
    pub fn request_sort_order(self: &Arc<Self>, order: SortOrder) -> JoinHandle<bool> {
        let model = Arc::clone(self);
        tokio::spawn(async move { model.set_sort_order(order).await })
    }

    /// Fetch again with the current ordering
    pub async fn refresh(&self) -> bool {
        let order = self.state().sort_order;
        self.set_sort_order(order).await
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.state().search_text = text.into();
    }

    pub fn clear_search(&self) {
        self.state().search_text.clear();
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let state = self.state();
        let apartments = state.visible();

        let empty_message = (apartments.is_empty() && !state.is_loading).then(|| {
            let query = state.search_text.trim();
            if query.is_empty() {
                "No apartments found".to_string()
            } else {
                format!("No apartments found for \"{}\"", query)
            }
        });

        ListSnapshot {
            sort_order: state.sort_order,
            search_text: state.search_text.clone(),
            apartments,
            is_loading: state.is_loading,
            error: state.error.clone(),
            empty_message,
        }
    }

    async fn fetch(&self, order: SortOrder) -> Result<Vec<ApartmentListItem>> {
        let apartments = match DerivedSort::from_sort_order(order) {
            Some(derived) => self.repository.get_apartments_by(derived).await?,
            None => {
                let mut all = self.repository.get_all_apartments().await?;
                match order {
                    SortOrder::AToZ => all.sort_by_cached_key(|a| a.name.to_lowercase()),
                    SortOrder::ZToA => all.sort_by_cached_key(|a| std::cmp::Reverse(a.name.to_lowercase())),
                    _ => {}
                }
                all
            }
        };

        Ok(apartments.into_iter().map(|a| self.to_item(a)).collect())
    }

    fn to_item(&self, apartment: Apartment) -> ApartmentListItem {
        let display_name = self.names.to_display_name(&apartment.name).to_string();
        ApartmentListItem {
            id: apartment.id,
            name: apartment.name,
            display_name,
        }
    }
}
