//! In-Memory Curve Database

use crate::{LightCurve, LightCurveError, LightCurveSource, PhotometricFilter, Sample, StarId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// On-disk JSON layout of a curve database
#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseFile {
    /// Filters in discovery order (derived from `curves` when omitted)
    #[serde(default)]
    filters: Vec<PhotometricFilter>,
    curves: Vec<CurveRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CurveRecord {
    star: StarId,
    filter: PhotometricFilter,
    samples: Vec<Sample>,
}

/// Light curves held in memory, keyed by star and filter
///
/// Samples are stored as read; they are validated when a curve is
/// retrieved, so a malformed curve only affects its own star.
#[derive(Debug, Clone, Default)]
pub struct CurveDatabase {
    identity: String,
    filters: Vec<PhotometricFilter>,
    curves: HashMap<(StarId, PhotometricFilter), Vec<Sample>>,
}

impl CurveDatabase {
    /// Create an empty database with the given identity
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            filters: Vec::new(),
            curves: HashMap::new(),
        }
    }

    /// Load a database from a JSON file; the path becomes its identity
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LightCurveError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file: DatabaseFile = serde_json::from_slice(&bytes)
            .map_err(|e| LightCurveError::Database(format!("{}: {}", path.display(), e)))?;

        let mut db = Self::new(path.display().to_string());
        for filter in file.filters {
            db.add_filter(filter);
        }
        for record in file.curves {
            db.insert(record.star, record.filter, record.samples);
        }

        info!(
            "Opened curve database {}: {} filters, {} curves",
            db.identity,
            db.filters.len(),
            db.curves.len()
        );
        Ok(db)
    }

    /// Write the database as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LightCurveError> {
        let mut curves: Vec<CurveRecord> = self
            .curves
            .iter()
            .map(|((star, filter), samples)| CurveRecord {
                star: *star,
                filter: filter.clone(),
                samples: samples.clone(),
            })
            .collect();
        curves.sort_by(|a, b| (a.star, &a.filter).cmp(&(b.star, &b.filter)));

        let file = DatabaseFile {
            filters: self.filters.clone(),
            curves,
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| LightCurveError::Database(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Register a filter (no-op if already known)
    pub fn add_filter(&mut self, filter: PhotometricFilter) {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
    }

    /// Insert or replace the samples of a curve
    pub fn insert(&mut self, star: StarId, filter: PhotometricFilter, samples: Vec<Sample>) {
        self.add_filter(filter.clone());
        debug!("Storing {} samples for star {} in {}", samples.len(), star, filter);
        self.curves.insert((star, filter), samples);
    }

    /// Number of stored curves
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }
}

impl LightCurveSource for CurveDatabase {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn filters(&self) -> Vec<PhotometricFilter> {
        self.filters.clone()
    }

    fn light_curve(
        &self,
        star: StarId,
        filter: &PhotometricFilter,
    ) -> Result<LightCurve, LightCurveError> {
        let samples = self
            .curves
            .get(&(star, filter.clone()))
            .ok_or_else(|| LightCurveError::Missing {
                star,
                filter: filter.clone(),
            })?;

        LightCurve::new(samples.clone())
    }
}
