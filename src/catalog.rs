//! The outlet catalog: which outlets to process, grouped by region and media
//! category.
//!
//! On disk the catalog is nested JSON, `{region: {category: [outlet, ...]}}`.
//! In memory it is flattened into an ordered list of [`CatalogEntry`]
//! triples; [`Catalog::pairs`] regroups consecutive entries into
//! (region, category) runs for the pipeline.

use crate::error::CatalogError;
use crate::models::OutletDescriptor;
use itertools::Itertools;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// One outlet together with the region and media category it was listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub region: String,
    pub media_category: String,
    pub outlet: OutletDescriptor,
}

impl CatalogEntry {
    /// The outlet's website, if present as a non-empty string.
    pub fn website(&self) -> Option<&str> {
        self.outlet
            .get("website")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// All entries of a (region, media category) pair, in catalog order.
#[derive(Debug)]
pub struct CatalogPair<'a> {
    pub region: &'a str,
    pub media_category: &'a str,
    pub entries: Vec<&'a CatalogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Read and flatten a JSON catalog file.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            outlets = catalog.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Flatten a JSON catalog, keeping document order.
    ///
    /// Outlets that are not JSON objects are skipped with a warning; any other
    /// shape mismatch is an error.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(raw)?;
        let Value::Object(regions) = root else {
            return Err(CatalogError::Shape(
                "top level must be an object of regions".to_string(),
            ));
        };

        let mut entries = Vec::new();
        for (region, categories) in regions {
            let Value::Object(categories) = categories else {
                return Err(CatalogError::Shape(format!(
                    "region {region:?} must map to an object of media categories"
                )));
            };
            for (media_category, outlets) in categories {
                let Value::Array(outlets) = outlets else {
                    return Err(CatalogError::Shape(format!(
                        "{region:?}/{media_category:?} must be a list of outlets"
                    )));
                };
                for (index, outlet) in outlets.into_iter().enumerate() {
                    match outlet {
                        Value::Object(outlet) => entries.push(CatalogEntry {
                            region: region.clone(),
                            media_category: media_category.clone(),
                            outlet,
                        }),
                        other => warn!(
                            %region,
                            %media_category,
                            index,
                            value = %other,
                            "Skipping outlet that is not a JSON object"
                        ),
                    }
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every (region, category, outlet) triple in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Consecutive entries grouped by (region, media category).
    pub fn pairs(&self) -> Vec<CatalogPair<'_>> {
        self.entries()
            .chunk_by(|e| (e.region.as_str(), e.media_category.as_str()))
            .into_iter()
            .map(|((region, media_category), group)| CatalogPair {
                region,
                media_category,
                entries: group.collect(),
            })
            .collect()
    }
}
