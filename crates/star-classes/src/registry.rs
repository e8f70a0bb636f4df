//! Star Registry Implementation

use crate::filters::{FilterIndex, FilterSet};
use crate::RegistryError;
use feature_engine::FeatureVector;
use light_curve::{PhotometricFilter, StarId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Position of a star in the global star list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarIndex(pub usize);

impl fmt::Display for StarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One labeled star
#[derive(Debug, Clone, PartialEq)]
pub struct StarInstance {
    id: StarId,
    class_name: String,
    enabled: bool,
}

impl StarInstance {
    pub fn id(&self) -> StarId {
        self.id
    }

    /// Variability class label
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Registry of stars, filters and per-filter feature lists
///
/// Feature lists are indexed positionally by `StarIndex`: the n-th vector
/// appended to a filter belongs to the n-th star.
#[derive(Debug, Clone, Default)]
pub struct StarClasses {
    stars: Vec<StarInstance>,
    positions: HashMap<StarId, StarIndex>,
    filters: FilterSet,
    features: Vec<Vec<FeatureVector>>,
    /// Length shared by every non-placeholder vector
    feature_dimension: Option<usize>,
}

impl StarClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a star, enabled, at the end of the global list
    pub fn add_star(
        &mut self,
        id: StarId,
        class_name: impl Into<String>,
    ) -> Result<StarIndex, RegistryError> {
        if self.positions.contains_key(&id) {
            return Err(RegistryError::DuplicateStar(id));
        }

        let index = StarIndex(self.stars.len());
        self.stars.push(StarInstance {
            id,
            class_name: class_name.into(),
            enabled: true,
        });
        self.positions.insert(id, index);
        Ok(index)
    }

    pub fn number_of_stars(&self) -> usize {
        self.stars.len()
    }

    pub fn star(&self, index: StarIndex) -> Option<&StarInstance> {
        self.stars.get(index.0)
    }

    /// Stars with their global indexes, in order
    pub fn iter(&self) -> impl Iterator<Item = (StarIndex, &StarInstance)> {
        self.stars.iter().enumerate().map(|(i, s)| (StarIndex(i), s))
    }

    pub fn class_name(&self, index: StarIndex) -> Option<&str> {
        self.star(index).map(StarInstance::class_name)
    }

    /// Whether the star exists and is enabled
    pub fn is_enabled(&self, index: StarIndex) -> bool {
        self.star(index).map_or(false, StarInstance::is_enabled)
    }

    pub fn instance_id(&self, index: StarIndex) -> Option<StarId> {
        self.star(index).map(StarInstance::id)
    }

    pub fn index_of(&self, id: StarId) -> Option<StarIndex> {
        self.positions.get(&id).copied()
    }

    pub fn enabled_count(&self) -> usize {
        self.stars.iter().filter(|s| s.enabled).count()
    }

    /// Permanently disable a star; returns false if it already was
    pub fn disable_star(&mut self, id: StarId) -> Result<bool, RegistryError> {
        let index = self.index_of(id).ok_or(RegistryError::UnknownStar(id))?;
        let star = &mut self.stars[index.0];

        if !star.enabled {
            return Ok(false);
        }

        star.enabled = false;
        warn!("Star {} at index {} disabled", id, index);
        Ok(true)
    }

    /// Register a filter and its (empty) feature list
    pub fn add_filter(&mut self, filter: PhotometricFilter) -> FilterIndex {
        let (index, added) = self.filters.insert(filter);
        if added {
            self.features.push(Vec::new());
            info!(
                "Added filter {} at index {}",
                self.filters.get(index).map(PhotometricFilter::name).unwrap_or_default(),
                index
            );
        }
        index
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Append the feature vector of the next star in `filter`
    ///
    /// Returns the star slot the vector was stored at. Placeholders are
    /// only accepted for disabled stars and every non-placeholder vector
    /// must share one length.
    pub fn add_feature(
        &mut self,
        filter: FilterIndex,
        vector: FeatureVector,
    ) -> Result<StarIndex, RegistryError> {
        let list = self
            .features
            .get_mut(filter.0)
            .ok_or(RegistryError::UnknownFilter(filter))?;

        let slot = StarIndex(list.len());
        let star = self.stars.get(slot.0).ok_or(RegistryError::FilterFull(filter))?;

        if vector.is_placeholder() {
            if star.enabled {
                return Err(RegistryError::PlaceholderForEnabledStar { filter, star: star.id });
            }
        } else {
            match self.feature_dimension {
                Some(expected) if expected != vector.len() => {
                    return Err(RegistryError::FeatureLengthMismatch {
                        filter,
                        expected,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
                None => self.feature_dimension = Some(vector.len()),
            }
        }

        debug!("Feature of star {} stored in filter {}", star.id, filter);
        list.push(vector);
        Ok(slot)
    }

    /// Feature list of a filter, in star order
    pub fn features(&self, filter: FilterIndex) -> Option<&[FeatureVector]> {
        self.features.get(filter.0).map(Vec::as_slice)
    }

    pub fn feature(&self, filter: FilterIndex, star: StarIndex) -> Option<&FeatureVector> {
        self.features.get(filter.0).and_then(|list| list.get(star.0))
    }

    /// Length of the non-placeholder vectors, once known
    pub fn feature_dimension(&self) -> Option<usize> {
        self.feature_dimension
    }

    /// Whether any feature vector has been stored
    pub fn has_features(&self) -> bool {
        self.features.iter().any(|list| !list.is_empty())
    }
}
