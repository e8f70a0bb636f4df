//! Photometric Filter Set

use light_curve::PhotometricFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a filter in the `FilterSet` (feature column group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilterIndex(pub usize);

impl fmt::Display for FilterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free set of filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<PhotometricFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter, returning its index and whether it was new
    pub fn insert(&mut self, filter: PhotometricFilter) -> (FilterIndex, bool) {
        match self.index_of(&filter) {
            Some(index) => (index, false),
            None => {
                self.filters.push(filter);
                (FilterIndex(self.filters.len() - 1), true)
            }
        }
    }

    pub fn index_of(&self, filter: &PhotometricFilter) -> Option<FilterIndex> {
        self.filters.iter().position(|f| f == filter).map(FilterIndex)
    }

    pub fn get(&self, index: FilterIndex) -> Option<&PhotometricFilter> {
        self.filters.get(index.0)
    }

    /// Filters with their indexes, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (FilterIndex, &PhotometricFilter)> {
        self.filters.iter().enumerate().map(|(i, f)| (FilterIndex(i), f))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn as_slice(&self) -> &[PhotometricFilter] {
        &self.filters
    }
}
