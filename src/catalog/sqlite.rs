use crate::catalog::error::{CatalogError, Result};
use crate::catalog::sorting::DerivedSort;
use crate::catalog::traits::ApartmentStore;
use crate::models::{Apartment, FloorPlan, RangeField};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Bumped whenever a column changes. Any other stored version is dropped and
/// rebuilt, the catalog is re-seeded afterwards.
pub const SCHEMA_VERSION: i32 = 3;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS apartments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    coordinates TEXT NOT NULL DEFAULT '',
    utilities TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS floorplans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    apartment_id INTEGER NOT NULL,
    size TEXT NOT NULL,
    beds_bath TEXT NOT NULL,
    rent TEXT NOT NULL,
    size_min INTEGER,
    size_max INTEGER,
    rent_min INTEGER,
    rent_max INTEGER
);

CREATE INDEX IF NOT EXISTS idx_floorplans_apartment ON floorplans(apartment_id);
"#;

const APARTMENT_COLUMNS: &str = "id, name, address, coordinates, utilities";

/// Catalog store backed by a single SQLite connection.
///
/// Cloning shares the connection. Every call runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the catalog file and bring its schema to `SCHEMA_VERSION`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CatalogError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|source| CatalogError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Opened catalog database at {}", path.display());
        Self::from_connection(conn)
    }

    /// Private, non-persistent store
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| CatalogError::Open {
            path: std::path::PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CatalogError::Unavailable("catalog connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await?
    }
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let migration_err = |source| CatalogError::Migration {
        version: SCHEMA_VERSION,
        source,
    };

    let current: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(migration_err)?;
    if current == SCHEMA_VERSION {
        debug!("Catalog schema already at version {}", current);
        return Ok(());
    }

    if current != 0 {
        warn!(
            "Catalog schema version {} does not match {}, dropping stored data",
            current, SCHEMA_VERSION
        );
    }

    let tx = conn.transaction().map_err(migration_err)?;
    tx.execute_batch(
        "DROP TABLE IF EXISTS floorplans;
         DROP TABLE IF EXISTS apartments;",
    )
    .map_err(migration_err)?;
    tx.execute_batch(SCHEMA_SQL).map_err(migration_err)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(migration_err)?;
    tx.commit().map_err(migration_err)?;

    info!("Catalog schema created at version {}", SCHEMA_VERSION);
    Ok(())
}

fn row_to_apartment(row: &Row) -> rusqlite::Result<Apartment> {
    Ok(Apartment {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        coordinates: row.get(3)?,
        utilities: row.get(4)?,
    })
}

fn row_to_floor_plan(row: &Row) -> rusqlite::Result<FloorPlan> {
    Ok(FloorPlan {
        id: row.get(0)?,
        apartment_id: row.get(1)?,
        size: RangeField::from(row.get::<_, String>(2)?),
        beds_bath: row.get(3)?,
        rent: RangeField::from(row.get::<_, String>(4)?),
    })
}

fn upsert_apartment(conn: &Connection, apartment: &Apartment) -> rusqlite::Result<i64> {
    // NULLIF turns an unassigned id into NULL so SQLite allocates one
    conn.execute(
        "INSERT OR REPLACE INTO apartments (id, name, address, coordinates, utilities)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5)",
        params![
            apartment.id,
            apartment.name,
            apartment.address,
            apartment.coordinates,
            apartment.utilities,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn upsert_floor_plan(conn: &Connection, floor_plan: &FloorPlan) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT OR REPLACE INTO floorplans
            (id, apartment_id, size, beds_bath, rent, size_min, size_max, rent_min, rent_max)
         VALUES (NULLIF(?1, 0), ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            floor_plan.id,
            floor_plan.apartment_id,
            floor_plan.size.raw(),
            floor_plan.beds_bath,
            floor_plan.rent.raw(),
            floor_plan.size.lower(),
            floor_plan.size.upper(),
            floor_plan.rent.lower(),
            floor_plan.rent.upper(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn query_apartments(conn: &Connection, sql: &str, fragment: Option<&str>) -> Result<Vec<Apartment>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = match fragment {
        Some(fragment) => stmt.query_map(params![fragment], row_to_apartment)?,
        None => stmt.query_map([], row_to_apartment)?,
    };
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

#[async_trait]
impl ApartmentStore for SqliteStore {
    async fn insert_apartment(&self, apartment: Apartment) -> Result<i64> {
        self.with_conn(move |conn| Ok(upsert_apartment(conn, &apartment)?))
            .await
    }

    async fn insert_floor_plan(&self, floor_plan: FloorPlan) -> Result<i64> {
        self.with_conn(move |conn| Ok(upsert_floor_plan(conn, &floor_plan)?))
            .await
    }

    async fn insert_catalog(&self, apartments: Vec<Apartment>, floor_plans: Vec<FloorPlan>) -> Result<()> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for apartment in &apartments {
                upsert_apartment(&tx, apartment)?;
            }
            for floor_plan in &floor_plans {
                upsert_floor_plan(&tx, floor_plan)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn all_apartments(&self) -> Result<Vec<Apartment>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM apartments ORDER BY id", APARTMENT_COLUMNS);
            query_apartments(conn, &sql, None)
        })
        .await
    }

    async fn floor_plans(&self, apartment_id: i64) -> Result<Vec<FloorPlan>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, apartment_id, size, beds_bath, rent
                 FROM floorplans WHERE apartment_id = ?1 ORDER BY id",
            )?;
            let plans = stmt
                .query_map(params![apartment_id], row_to_floor_plan)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(plans)
        })
        .await
    }

    async fn apartment_by_name(&self, fragment: &str) -> Result<Option<Apartment>> {
        let fragment = fragment.trim().to_string();
        if fragment.is_empty() {
            return Ok(None);
        }

        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM apartments
                 WHERE instr(lower(name), lower(?1)) > 0
                 ORDER BY id LIMIT 1",
                APARTMENT_COLUMNS
            );
            let apartment = conn
                .query_row(&sql, params![fragment], row_to_apartment)
                .optional()?;
            Ok(apartment)
        })
        .await
    }

    async fn apartments_matching(&self, fragment: &str) -> Result<Vec<Apartment>> {
        let fragment = fragment.trim().to_string();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }

        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {} FROM apartments
                 WHERE instr(lower(name), lower(?1)) > 0
                 ORDER BY id",
                APARTMENT_COLUMNS
            );
            query_apartments(conn, &sql, Some(&fragment))
        })
        .await
    }

    async fn apartments_sorted(&self, order: DerivedSort) -> Result<Vec<Apartment>> {
        self.with_conn(move |conn| query_apartments(conn, &order.sql(), None))
            .await
    }

    async fn apartment_count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM apartments", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(apartments: &[Apartment]) -> Vec<&str> {
        apartments.iter().map(|a| a.name.as_str()).collect()
    }

    async fn store_with(plans: &[(&str, &[(&str, &str)])]) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for (name, ranges) in plans {
            let id = store
                .insert_apartment(Apartment::new(*name, "", "", "Wifi"))
                .await
                .unwrap();
            for (size, rent) in ranges.iter() {
                store
                    .insert_floor_plan(FloorPlan::new(id, size, "1 bed, 1 bath", rent))
                    .await
                    .unwrap();
            }
        }
        store
    }

    #[tokio::test]
    async fn insert_generates_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.insert_apartment(Apartment::new("A", "", "", "")).await.unwrap();
        let second = store.insert_apartment(Apartment::new("B", "", "", "")).await.unwrap();
        assert!(first > 0);
        assert_ne!(first, second);
        assert_eq!(store.apartment_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn insert_replaces_on_same_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_apartment(Apartment::new("Old", "", "", "").with_id(7))
            .await
            .unwrap();
        let id = store
            .insert_apartment(Apartment::new("New", "1 Main St", "", "").with_id(7))
            .await
            .unwrap();

        assert_eq!(id, 7);
        let all = store.all_apartments().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "New");
        assert_eq!(all[0].address, "1 Main St");

        store
            .insert_floor_plan(FloorPlan::new(7, "1 - 2", "Studio", "3 - 4").with_id(1))
            .await
            .unwrap();
        store
            .insert_floor_plan(FloorPlan::new(7, "5 - 6", "Studio", "7 - 8").with_id(1))
            .await
            .unwrap();
        let plans = store.floor_plans(7).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].size.lower(), Some(5));
    }

    #[tokio::test]
    async fn floor_plans_keep_raw_text() {
        let store = store_with(&[("Odd", &[("bad-data", "call us")])]).await;
        let apartment = store.apartment_by_name("odd").await.unwrap().unwrap();
        let plans = store.floor_plans(apartment.id).await.unwrap();
        assert_eq!(plans[0].size.raw(), "bad-data");
        assert_eq!(plans[0].size.range(), None);
        assert_eq!(plans[0].rent.to_string(), "call us");
    }

    #[tokio::test]
    async fn name_lookup_is_case_insensitive_substring() {
        let store = store_with(&[("Waterfront", &[]), ("Iota Courts", &[]), ("Iota Annex", &[])]).await;

        let found = store.apartment_by_name("waterFRONT").await.unwrap();
        assert_eq!(found.map(|a| a.name), Some("Waterfront".to_string()));

        let first = store.apartment_by_name("iota").await.unwrap().unwrap();
        assert_eq!(first.name, "Iota Courts");

        let all = store.apartments_matching("IOTA").await.unwrap();
        assert_eq!(names(&all), vec!["Iota Courts", "Iota Annex"]);

        assert!(store.apartment_by_name("Langdon").await.unwrap().is_none());
        assert!(store.apartment_by_name("  ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_lookup_treats_wildcards_literally() {
        let store = store_with(&[("Palisade", &[])]).await;
        assert!(store.apartment_by_name("%").await.unwrap().is_none());
        assert!(store.apartment_by_name("_alisade").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cheapest_uses_min_lower_rent_bound() {
        let store = store_with(&[
            ("Pricey", &[("500 - 600", "2000 - 2100")]),
            ("Mixed", &[("500 - 600", "1800 - 1900"), ("700 - 800", "1100 - 2500")]),
            ("Middle", &[("500 - 600", "1500 - 1600")]),
        ])
        .await;

        let sorted = store.apartments_sorted(DerivedSort::Cheapest).await.unwrap();
        assert_eq!(names(&sorted), vec!["Mixed", "Middle", "Pricey"]);
    }

    #[tokio::test]
    async fn most_expensive_uses_max_upper_rent_bound() {
        let store = store_with(&[
            ("Low", &[("500 - 600", "1000 - 1200")]),
            ("Wide", &[("500 - 600", "900 - 3000")]),
            ("High", &[("500 - 600", "2000 - 2100")]),
        ])
        .await;

        let sorted = store.apartments_sorted(DerivedSort::MostExpensive).await.unwrap();
        assert_eq!(names(&sorted), vec!["Wide", "High", "Low"]);
    }

    #[tokio::test]
    async fn size_orderings() {
        let store = store_with(&[
            ("Compact", &[("300 - 365", "1 - 2"), ("498 - 518", "1 - 2")]),
            ("Roomy", &[("1024 - 1170", "1 - 2"), ("1373 - 1458", "1 - 2")]),
            ("Average", &[("775 - 865", "1 - 2")]),
        ])
        .await;

        let smallest = store.apartments_sorted(DerivedSort::Smallest).await.unwrap();
        assert_eq!(names(&smallest), vec!["Compact", "Average", "Roomy"]);

        let largest = store.apartments_sorted(DerivedSort::Largest).await.unwrap();
        assert_eq!(names(&largest), vec!["Roomy", "Average", "Compact"]);
    }

    #[tokio::test]
    async fn missing_values_sort_last_in_both_directions() {
        let store = store_with(&[
            ("Empty", &[]),
            ("Broken", &[("bad-data", "bad-data")]),
            ("Cheap", &[("100 - 200", "100 - 200")]),
            ("Dear", &[("900 - 950", "900 - 950")]),
        ])
        .await;

        for order in [
            DerivedSort::Cheapest,
            DerivedSort::MostExpensive,
            DerivedSort::Smallest,
            DerivedSort::Largest,
        ] {
            let sorted = store.apartments_sorted(order).await.unwrap();
            assert_eq!(sorted.len(), 4, "{:?} dropped an apartment", order);
            assert_eq!(names(&sorted[2..]), vec!["Empty", "Broken"], "{:?}", order);
        }
    }

    #[tokio::test]
    async fn malformed_plan_is_skipped_in_aggregate() {
        let store = store_with(&[
            ("HasJunk", &[("bad-data", "bad-data"), ("800 - 900", "1700 - 1800")]),
            ("Plain", &[("400 - 500", "1600 - 1650")]),
        ])
        .await;

        let cheapest = store.apartments_sorted(DerivedSort::Cheapest).await.unwrap();
        assert_eq!(names(&cheapest), vec!["Plain", "HasJunk"]);
    }

    #[tokio::test]
    async fn lower_bound_counts_even_when_upper_is_unusable() {
        let store = store_with(&[
            ("Normal", &[("500 - 600", "1500 - 1600")]),
            ("OpenEnded", &[("500 - 600", "1000 - TBD")]),
            ("Inverted", &[("500 - 600", "1100 - 900")]),
        ])
        .await;

        let cheapest = store.apartments_sorted(DerivedSort::Cheapest).await.unwrap();
        assert_eq!(names(&cheapest), vec!["OpenEnded", "Inverted", "Normal"]);

        // No usable upper bound on OpenEnded, so it trails the most expensive order
        let dearest = store.apartments_sorted(DerivedSort::MostExpensive).await.unwrap();
        assert_eq!(names(&dearest), vec!["Normal", "Inverted", "OpenEnded"]);
    }

    #[tokio::test]
    async fn catalog_insert_writes_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_catalog(
                vec![Apartment::new("Solo", "", "", "").with_id(3)],
                vec![
                    FloorPlan::new(3, "1 - 2", "Studio", "3 - 4").with_id(1),
                    FloorPlan::new(3, "5 - 6", "Studio", "7 - 8").with_id(2),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.apartment_count().await.unwrap(), 1);
        assert_eq!(store.floor_plans(3).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ties_keep_id_order() {
        let store = store_with(&[
            ("First", &[("500 - 600", "1000 - 1100")]),
            ("Second", &[("500 - 600", "1000 - 1100")]),
            ("Third", &[("500 - 600", "1000 - 1100")]),
        ])
        .await;

        for order in [DerivedSort::Cheapest, DerivedSort::Largest] {
            let sorted = store.apartments_sorted(order).await.unwrap();
            assert_eq!(names(&sorted), vec!["First", "Second", "Third"]);
        }
    }

    #[tokio::test]
    async fn orphan_floor_plans_are_ignored() {
        let store = store_with(&[("Real", &[("500 - 600", "1500 - 1600")])]).await;
        store
            .insert_floor_plan(FloorPlan::new(99, "1 - 2", "Studio", "1 - 2"))
            .await
            .unwrap();

        let sorted = store.apartments_sorted(DerivedSort::Cheapest).await.unwrap();
        assert_eq!(names(&sorted), vec!["Real"]);
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_apartment(Apartment::new("Kept", "", "", "")).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        let all = reopened.all_apartments().await.unwrap();
        assert_eq!(names(&all), vec!["Kept"]);
    }

    #[tokio::test]
    async fn version_change_drops_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_apartment(Apartment::new("Stale", "", "", "")).await.unwrap();
        }
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION - 1).unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.apartment_count().await.unwrap(), 0);
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a database file
        let result = SqliteStore::open(dir.path());
        assert!(result.is_err());
    }
}
