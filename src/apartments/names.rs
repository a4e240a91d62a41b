use crate::models::Apartment;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Display name shown in the UI paired with the name stored in the catalog
const BUILTIN_NAMES: [(&str, &str); 5] = [
    ("Waterfront Apartment", "Waterfront"),
    ("Palisade Properties", "Palisade"),
    ("Aberdeen Apartments", "Aberdeen Apartments"),
    ("140 Iota Courts", "Iota Courts"),
    ("The Langdon Apartment", "Landon"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameTableError {
    #[error("display name {0:?} is listed more than once")]
    DuplicateDisplay(String),

    #[error("storage name {storage:?} is mapped from both {first:?} and {second:?}")]
    DuplicateStorage {
        storage: String,
        first: String,
        second: String,
    },
}

/// Two-way lookup between display names and catalog names.
///
/// Unknown names pass through unchanged in both directions.
#[derive(Debug, Clone)]
pub struct NameMapper {
    entries: Vec<(String, String)>,
    by_display: HashMap<String, usize>,
    by_storage: HashMap<String, usize>,
}

impl NameMapper {
    /// Build a mapper, rejecting tables that are not one-to-one
    pub fn new<I, D, S>(entries: I) -> Result<Self, NameTableError>
    where
        I: IntoIterator<Item = (D, S)>,
        D: Into<String>,
        S: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(display, storage)| (display.into(), storage.into()))
            .collect();

        let mut seen_display: HashSet<&str> = HashSet::new();
        let mut seen_storage: HashMap<&str, &str> = HashMap::new();
        for (display, storage) in &entries {
            if !seen_display.insert(display.as_str()) {
                return Err(NameTableError::DuplicateDisplay(display.clone()));
            }
            if let Some(first) = seen_storage.insert(storage.as_str(), display.as_str()) {
                return Err(NameTableError::DuplicateStorage {
                    storage: storage.clone(),
                    first: first.to_string(),
                    second: display.clone(),
                });
            }
        }

        Ok(Self::index(entries))
    }

    /// The mapping shipped with the app, validated like any other table
    pub fn builtin() -> Result<Self, NameTableError> {
        Self::new(BUILTIN_NAMES)
    }

    fn index(entries: Vec<(String, String)>) -> Self {
        let mut by_display = HashMap::with_capacity(entries.len());
        let mut by_storage = HashMap::with_capacity(entries.len());
        for (i, (display, storage)) in entries.iter().enumerate() {
            by_display.entry(display.clone()).or_insert(i);
            by_storage.entry(storage.clone()).or_insert(i);
        }
        Self {
            entries,
            by_display,
            by_storage,
        }
    }

    pub fn to_storage_name<'a>(&'a self, display: &'a str) -> &'a str {
        self.by_display
            .get(display)
            .map(|&i| self.entries[i].1.as_str())
            .unwrap_or(display)
    }

    pub fn to_display_name<'a>(&'a self, storage: &'a str) -> &'a str {
        self.by_storage
            .get(storage)
            .map(|&i| self.entries[i].0.as_str())
            .unwrap_or(storage)
    }

    pub fn all_display_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(display, _)| display.as_str()).collect()
    }

    pub fn all_storage_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, storage)| storage.as_str()).collect()
    }

    /// Storage names in the table that no catalog apartment carries
    pub fn unknown_storage_names(&self, catalog: &[Apartment]) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(_, storage)| storage.as_str())
            .filter(|storage| !catalog.iter().any(|a| a.name == *storage))
            .collect()
    }
}
