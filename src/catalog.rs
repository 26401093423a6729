// 🥦 Catalog - Read-only reference table of vegetables
//
// Each entry carries a baseline price and the date label the price refers to.
// Built once, never mutated. Lookup is exact and case-sensitive; fuzzy
// resolution of user input lives in the matcher.

use crate::error::{CatalogError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// One reference item: name, baseline price, reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique key (e.g. "Tomato")
    pub name: String,

    /// Reference price, never negative
    pub base_value: Decimal,

    /// Date label the price refers to
    pub reference_date: NaiveDate,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, base_value: Decimal, reference_date: NaiveDate) -> Self {
        CatalogEntry {
            name: name.into(),
            base_value,
            reference_date,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidEntry {
                name: self.name.clone(),
                reason: "name is empty".to_string(),
            });
        }

        if self.base_value.is_sign_negative() && !self.base_value.is_zero() {
            return Err(CatalogError::negative_price(&self.name, self.base_value));
        }

        Ok(())
    }
}

/// Raw CSV row, same column names as the exported price table
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Vegetable")]
    vegetable: String,

    #[serde(rename = "Avg_Price")]
    avg_price: String,

    #[serde(rename = "Predicted_Date")]
    predicted_date: String,
}

impl CatalogRow {
    fn into_entry(self) -> Result<CatalogEntry> {
        let name = self.vegetable.trim().to_string();

        let base_value = Decimal::from_str(self.avg_price.trim()).map_err(|e| {
            CatalogError::InvalidEntry {
                name: name.clone(),
                reason: format!("bad price '{}': {}", self.avg_price, e),
            }
        })?;

        let reference_date = NaiveDate::parse_from_str(self.predicted_date.trim(), "%Y-%m-%d")
            .map_err(|e| CatalogError::InvalidEntry {
                name: name.clone(),
                reason: format!("bad date '{}': {}", self.predicted_date, e),
            })?;

        Ok(CatalogEntry {
            name,
            base_value,
            reference_date,
        })
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Immutable, insertion-ordered table of known items.
///
/// Shared by reference between the matcher and the estimator. There is no
/// mutation API, so a `&Catalog` can be handed to any number of threads.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// The reference price table: eleven vegetables, all dated 2025-04-08.
    pub fn builtin() -> Self {
        let date = NaiveDate::from_ymd_opt(2025, 4, 8).expect("2025-04-08 is a valid date");

        let rows = [
            ("Tomato", dec!(12.5)),
            ("Onion", dec!(9.0)),
            ("Carrot", dec!(10.2)),
            ("Broccoli", dec!(14.3)),
            ("Potato", dec!(7.5)),
            ("Brinjal", dec!(8.2)),
            ("Garlic", dec!(15.0)),
            ("Peas", dec!(11.0)),
            ("Methi", dec!(7.8)),
            ("Green Chilli", dec!(6.5)),
            ("Elephant Yam", dec!(13.2)),
        ];

        let entries: Vec<CatalogEntry> = rows
            .into_iter()
            .map(|(name, price)| CatalogEntry::new(name, price, date))
            .collect();

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        Catalog { entries, index }
    }

    /// Build a catalog from entries, keeping their order.
    ///
    /// Fails on duplicate names, empty names or negative prices.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;

            if index.insert(entry.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEntry {
                    name: entry.name.clone(),
                });
            }
        }

        debug!(entries = entries.len(), "catalog built");
        Ok(Catalog { entries, index })
    }

    /// Load a catalog from a CSV file with `Vegetable,Avg_Price,Predicted_Date` columns.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| CatalogError::Csv(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_reader(file)?;
        info!(path = %path.display(), entries = catalog.len(), "loaded catalog from CSV");
        Ok(catalog)
    }

    /// Same as [`Catalog::from_csv`] but reads from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);

        let mut entries = Vec::new();
        for row in rdr.deserialize::<CatalogRow>() {
            entries.push(row?.into_entry()?);
        }

        Self::from_entries(entries)
    }

    /// Exact lookup. Fails with `NotFound` when `name` is not a key.
    pub fn get(&self, name: &str) -> Result<&CatalogEntry> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| CatalogError::not_found(name))
    }

    /// All names in insertion order.
    pub fn all_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Index of `name` within [`Catalog::all_names`], used to pre-select a dropdown.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// TESTS
// ============================================================================
