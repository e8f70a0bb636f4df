//! Feature Set Snapshot

use crate::StorageError;
use feature_engine::FeatureVector;
use light_curve::{PhotometricFilter, StarId};
use serde::{Deserialize, Serialize};

/// Format version written with every feature set
pub const FEATURE_SET_VERSION: u32 = 2;

/// Serialized form of the features computed for one source
///
/// `features[f][s]` is the vector of the star `star_ids[s]` in filter
/// `filters[f]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub version: u32,
    /// Identity of the light-curve source the features came from
    pub source: String,
    /// Fingerprint of the calculator settings
    pub calculator: String,
    pub star_ids: Vec<StarId>,
    pub filters: Vec<PhotometricFilter>,
    pub features: Vec<Vec<FeatureVector>>,
    /// Stars disabled while computing
    pub disabled: Vec<StarId>,
}

impl FeatureSet {
    /// Create an empty, current-version feature set
    pub fn new(source: impl Into<String>, star_ids: Vec<StarId>) -> Self {
        Self {
            version: FEATURE_SET_VERSION,
            source: source.into(),
            calculator: String::new(),
            star_ids,
            filters: Vec::new(),
            features: Vec::new(),
            disabled: Vec::new(),
        }
    }

    /// Encode with postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decode and check the format version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let set: FeatureSet = postcard::from_bytes(bytes)?;
        if set.version != FEATURE_SET_VERSION {
            return Err(StorageError::VersionMismatch {
                expected: FEATURE_SET_VERSION,
                found: set.version,
            });
        }
        Ok(set)
    }

    /// Whether the snapshot was taken over exactly these stars, in order
    pub fn matches_stars(&self, star_ids: &[StarId]) -> bool {
        self.star_ids == star_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> FeatureSet {
        let mut set = FeatureSet::new("curves.json", vec![StarId(1), StarId(2)]);
        set.calculator = "lomb-scargle".to_string();
        set.filters.push("V".into());
        set.features.push(vec![
            FeatureVector::new(vec![0.5, 1.5, -2.0]),
            FeatureVector::placeholder(),
        ]);
        set.disabled.push(StarId(2));
        set
    }

    #[test]
    fn test_encode_decode() {
        let set = sample_set();
        let bytes = set.to_bytes().unwrap();
        assert_eq!(FeatureSet::from_bytes(&bytes).unwrap(), set);
    }

    #[test]
    fn test_version_mismatch() {
        let mut set = sample_set();
        set.version = FEATURE_SET_VERSION + 1;
        let bytes = set.to_bytes().unwrap();

        assert!(matches!(
            FeatureSet::from_bytes(&bytes),
            Err(StorageError::VersionMismatch { found, .. }) if found == FEATURE_SET_VERSION + 1
        ));
    }

    #[test]
    fn test_truncated_bytes() {
        let bytes = sample_set().to_bytes().unwrap();
        assert!(matches!(
            FeatureSet::from_bytes(&bytes[..bytes.len() / 2]),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_matches_stars() {
        let set = sample_set();
        assert!(set.matches_stars(&[StarId(1), StarId(2)]));
        assert!(!set.matches_stars(&[StarId(2), StarId(1)]));
        assert!(!set.matches_stars(&[StarId(1)]));
    }
}
