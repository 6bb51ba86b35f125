use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::error::{PredictError, Result};

pub const DEFAULT_MATCH_TABLE: &str = "sports_data_final";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryField {
    Weather,
    Team,
    Location,
}

impl CategoryField {
    pub const ALL: [CategoryField; 3] = [
        CategoryField::Weather,
        CategoryField::Team,
        CategoryField::Location,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CategoryField::Weather => "weather",
            CategoryField::Team => "team",
            CategoryField::Location => "location",
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One distinct `(weather, team1, team2, location)` tuple as returned by the
/// catalog source. Any column may be NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRow {
    pub weather: Option<String>,
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub location: Option<String>,
}

impl CatalogRow {
    pub fn new(weather: &str, team1: &str, team2: &str, location: &str) -> Self {
        Self {
            weather: Some(weather.to_string()),
            team1: Some(team1.to_string()),
            team2: Some(team2.to_string()),
            location: Some(location.to_string()),
        }
    }
}

pub trait CatalogSource {
    fn describe(&self) -> String;

    fn distinct_rows(&self) -> Result<Vec<CatalogRow>>;
}

impl CatalogSource for Vec<CatalogRow> {
    fn describe(&self) -> String {
        format!("in-memory ({} rows)", self.len())
    }

    fn distinct_rows(&self) -> Result<Vec<CatalogRow>> {
        Ok(self.clone())
    }
}

/// Known categorical values per field. Sets are sorted, unique and never
/// contain blank strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    weather: BTreeSet<String>,
    teams: BTreeSet<String>,
    locations: BTreeSet<String>,
}

impl CategoryCatalog {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = CatalogRow>,
    {
        let mut catalog = Self::default();
        for row in rows {
            insert_present(&mut catalog.weather, row.weather);
            insert_present(&mut catalog.teams, row.team1);
            insert_present(&mut catalog.teams, row.team2);
            insert_present(&mut catalog.locations, row.location);
        }
        catalog
    }

    pub fn values(&self, field: CategoryField) -> &BTreeSet<String> {
        match field {
            CategoryField::Weather => &self.weather,
            CategoryField::Team => &self.teams,
            CategoryField::Location => &self.locations,
        }
    }

    pub fn contains(&self, field: CategoryField, value: &str) -> bool {
        self.values(field).contains(value)
    }

    pub fn len(&self, field: CategoryField) -> usize {
        self.values(field).len()
    }

    /// First field with no known values, if any.
    pub fn first_empty_field(&self) -> Option<CategoryField> {
        CategoryField::ALL
            .into_iter()
            .find(|field| self.values(*field).is_empty())
    }
}

fn insert_present(set: &mut BTreeSet<String>, value: Option<String>) {
    if let Some(value) = value
        && !value.trim().is_empty()
    {
        set.insert(value);
    }
}

/// Runs the single catalog query and folds the rows into a catalog.
pub fn build_catalog(source: &dyn CatalogSource) -> Result<CategoryCatalog> {
    let rows = source.distinct_rows()?;
    let row_count = rows.len();
    let catalog = CategoryCatalog::from_rows(rows);
    info!(
        source = %source.describe(),
        rows = row_count,
        weather = catalog.len(CategoryField::Weather),
        teams = catalog.len(CategoryField::Team),
        locations = catalog.len(CategoryField::Location),
        "category catalog built"
    );
    Ok(catalog)
}

pub struct SqliteCatalogSource {
    conn: Connection,
    table: String,
    target: String,
}

impl SqliteCatalogSource {
    /// Opens an existing database read-only. A missing file is reported as a
    /// connectivity failure instead of creating an empty database.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let target = path.display().to_string();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| PredictError::Connectivity {
            target: target.clone(),
            source,
        })?;
        Ok(Self {
            conn,
            table: table.to_string(),
            target,
        })
    }

    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
            target: "sqlite connection".to_string(),
        })
    }
}

impl CatalogSource for SqliteCatalogSource {
    fn describe(&self) -> String {
        format!("{} [{}]", self.target, self.table)
    }

    fn distinct_rows(&self) -> Result<Vec<CatalogRow>> {
        let sql = format!(
            "SELECT DISTINCT weather, team1, team2, location FROM {}",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;

        // Drivers disagree on identifier case, so resolve columns by
        // normalized name rather than position.
        let names = stmt
            .column_names()
            .iter()
            .map(|name| name.trim().to_ascii_lowercase())
            .collect::<Vec<_>>();
        let weather = column_index(&names, "weather")?;
        let team1 = column_index(&names, "team1")?;
        let team2 = column_index(&names, "team2")?;
        let location = column_index(&names, "location")?;

        let rows = stmt.query_map([], |row| {
            Ok(CatalogRow {
                weather: category_value(row.get_ref(weather)?),
                team1: category_value(row.get_ref(team1)?),
                team2: category_value(row.get_ref(team2)?),
                location: category_value(row.get_ref(location)?),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

// Numeric columns are categories too; they are kept in their text form.
fn category_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(v.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn column_index(names: &[String], want: &'static str) -> Result<usize> {
    names
        .iter()
        .position(|name| name == want)
        .ok_or(PredictError::MissingColumn(want))
}

/// Accepts `table` or `schema.table` made of ASCII letters, digits and `_`.
pub fn validate_table_name(raw: &str) -> Result<()> {
    let parts = raw.split('.').collect::<Vec<_>>();
    let ok = !parts.is_empty()
        && parts.len() <= 2
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        });
    if ok {
        Ok(())
    } else {
        Err(PredictError::Config(format!("invalid table name {raw:?}")))
    }
}
