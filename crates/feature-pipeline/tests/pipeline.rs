//! Feature pipeline integration tests

use feature_engine::{
    FeatureError, FeatureExtractor, FeatureVector, PeriodogramConfig, StarFeatureCalculator,
    FEATURE_DIMENSION,
};
use feature_pipeline::{PipelineError, StarsFeatures};
use light_curve::{
    CurveDatabase, LightCurve, LightCurveError, LightCurveSource, PhotometricFilter, Sample,
    StarId,
};
use star_classes::{FilterIndex, RegistryError, StarClasses, StarIndex};
use std::cell::RefCell;
use std::f64::consts::PI;
use storage::{FeatureSet, FeatureStore, FileFeatureStore, MemoryFeatureStore};

/// Mean magnitude and sample count; fails below three samples
struct MeanCalculator;

impl StarFeatureCalculator for MeanCalculator {
    fn calculate(&mut self, curve: &LightCurve) -> Result<FeatureVector, FeatureError> {
        if curve.len() < 3 {
            return Err(FeatureError::InsufficientSamples {
                required: 3,
                actual: curve.len(),
            });
        }
        let mags = curve.magnitudes();
        let mean = mags.iter().sum::<f64>() / mags.len() as f64;
        Ok(FeatureVector::new(vec![mean, curve.len() as f64]))
    }
}

/// Returns one value per sample, so vector length varies with the curve
struct RaggedCalculator;

impl StarFeatureCalculator for RaggedCalculator {
    fn calculate(&mut self, curve: &LightCurve) -> Result<FeatureVector, FeatureError> {
        Ok(FeatureVector::new(curve.magnitudes().to_vec()))
    }
}

/// Records every curve request
struct RecordingSource<'a> {
    inner: &'a CurveDatabase,
    requests: RefCell<Vec<(StarId, PhotometricFilter)>>,
}

impl<'a> RecordingSource<'a> {
    fn new(inner: &'a CurveDatabase) -> Self {
        Self {
            inner,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn requested(&self, star: StarId) -> usize {
        self.requests.borrow().iter().filter(|(s, _)| *s == star).count()
    }
}

impl LightCurveSource for RecordingSource<'_> {
    fn identity(&self) -> &str {
        self.inner.identity()
    }

    fn filters(&self) -> Vec<PhotometricFilter> {
        self.inner.filters()
    }

    fn light_curve(
        &self,
        star: StarId,
        filter: &PhotometricFilter,
    ) -> Result<LightCurve, LightCurveError> {
        self.requests.borrow_mut().push((star, filter.clone()));
        self.inner.light_curve(star, filter)
    }
}

fn samples(n: usize, frequency: f64) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.37 + 0.05 * ((i * 7) % 3) as f64;
            let m = 12.0
                + 0.3 * (2.0 * PI * frequency * t).sin()
                + 0.1 * (2.0 * PI * 0.55 * t).cos();
            Sample::new(t, m, 0.01)
        })
        .collect()
}

const FILTERS: [&str; 3] = ["V", "R", "I"];

fn registry(ids: &[u64]) -> StarClasses {
    let mut stars = StarClasses::new();
    for &id in ids {
        let class = if id % 2 == 0 { "RRLyrae" } else { "Cepheid" };
        stars.add_star(StarId(id), class).unwrap();
    }
    stars
}

/// Every star has a curve in every filter
fn full_database(ids: &[u64]) -> CurveDatabase {
    let mut db = CurveDatabase::new("survey.json");
    for &id in ids {
        for filter in FILTERS {
            db.insert(StarId(id), filter.into(), samples(60, 0.1 + id as f64 * 0.01));
        }
    }
    db
}

#[test]
fn test_failure_on_last_filter_disables_star() {
    // Star 20 has no curve in the third filter
    let mut db = CurveDatabase::new("survey.json");
    for filter in FILTERS {
        for id in [10, 20, 30] {
            if !(id == 20 && filter == "I") {
                db.insert(StarId(id), filter.into(), samples(40, 0.2));
            }
        }
    }

    let mut stars = registry(&[10, 20, 30]);
    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .calculate_features(&db)
        .unwrap();

    assert_eq!(report.disabled, vec![StarId(20)]);
    assert_eq!(report.vectors, 8);
    assert_eq!(report.placeholders, 1);
    assert!(!report.from_cache);

    assert!(!stars.is_enabled(StarIndex(1)));
    assert_eq!(stars.enabled_count(), 2);
    for f in 0..3 {
        assert_eq!(stars.features(FilterIndex(f)).unwrap().len(), 3);
    }
    assert!(!stars.feature(FilterIndex(0), StarIndex(1)).unwrap().is_placeholder());
    assert!(!stars.feature(FilterIndex(1), StarIndex(1)).unwrap().is_placeholder());
    assert!(stars.feature(FilterIndex(2), StarIndex(1)).unwrap().is_placeholder());
}

#[test]
fn test_failure_skips_remaining_filters() {
    let mut db = full_database(&[1, 2]);
    db.insert(StarId(2), "V".into(), samples(2, 0.1));

    let source = RecordingSource::new(&db);
    let mut stars = registry(&[1, 2]);
    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .calculate_features(&source)
        .unwrap();

    assert_eq!(report.disabled, vec![StarId(2)]);
    assert_eq!(report.placeholders, 3);
    assert_eq!(source.requested(StarId(1)), 3);
    assert_eq!(source.requested(StarId(2)), 1);
    for f in 0..3 {
        assert!(stars.feature(FilterIndex(f), StarIndex(1)).unwrap().is_placeholder());
    }
}

#[test]
fn test_predisabled_star_never_queried() {
    let db = full_database(&[1, 2, 3]);
    let source = RecordingSource::new(&db);
    let mut stars = registry(&[1, 2, 3]);
    stars.disable_star(StarId(2)).unwrap();

    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .calculate_features(&source)
        .unwrap();

    assert!(report.disabled.is_empty());
    assert_eq!(report.placeholders, 3);
    assert_eq!(source.requested(StarId(2)), 0);
    assert!(stars.feature(FilterIndex(2), StarIndex(1)).unwrap().is_placeholder());
    assert!(!stars.feature(FilterIndex(2), StarIndex(2)).unwrap().is_placeholder());
}

#[test]
fn test_filters_registered_in_discovery_order() {
    let mut db = CurveDatabase::new("db");
    db.insert(StarId(1), "I".into(), samples(10, 0.1));
    db.insert(StarId(1), "B".into(), samples(10, 0.1));

    let mut stars = registry(&[1]);
    StarsFeatures::new(&mut stars, MeanCalculator)
        .calculate_features(&db)
        .unwrap();

    let names: Vec<&str> = stars.filters().iter().map(|(_, f)| f.name()).collect();
    assert_eq!(names, vec!["I", "B"]);
}

#[test]
fn test_second_calculation_rejected() {
    let db = full_database(&[1]);
    let mut stars = registry(&[1]);
    let mut pipeline = StarsFeatures::new(&mut stars, MeanCalculator);

    pipeline.calculate_features(&db).unwrap();
    assert!(matches!(
        pipeline.calculate_features(&db),
        Err(PipelineError::AlreadyCalculated)
    ));
    assert!(matches!(
        pipeline.get_features(&db, &MemoryFeatureStore::new()),
        Err(PipelineError::AlreadyCalculated)
    ));
}

#[test]
fn test_length_mismatch_is_fatal() {
    let mut db = CurveDatabase::new("db");
    db.insert(StarId(1), "V".into(), samples(5, 0.1));
    db.insert(StarId(2), "V".into(), samples(6, 0.1));

    let mut stars = registry(&[1, 2]);
    let result = StarsFeatures::new(&mut stars, RaggedCalculator).calculate_features(&db);

    assert!(matches!(
        result,
        Err(PipelineError::Registry(RegistryError::FeatureLengthMismatch {
            expected: 5,
            actual: 6,
            ..
        }))
    ));
}

#[test]
fn test_cache_hit_matches_fresh_run() {
    let mut db = full_database(&[1, 2, 3]);
    db.insert(StarId(3), "R".into(), samples(2, 0.1));
    let store = MemoryFeatureStore::new();

    let mut first = registry(&[1, 2, 3]);
    let fresh = StarsFeatures::new(&mut first, MeanCalculator)
        .get_features(&db, &store)
        .unwrap();
    assert!(!fresh.from_cache);
    assert!(store.contains("survey.json"));

    let source = RecordingSource::new(&db);
    let mut second = registry(&[1, 2, 3]);
    let cached = StarsFeatures::new(&mut second, MeanCalculator)
        .get_features(&source, &store)
        .unwrap();

    assert!(cached.from_cache);
    assert_eq!(source.requests.borrow().len(), 0);
    assert_eq!(cached.vectors, fresh.vectors);
    assert_eq!(cached.placeholders, fresh.placeholders);
    assert_eq!(cached.disabled, vec![StarId(3)]);
    assert_eq!(first.filters(), second.filters());
    for (index, _) in first.filters().iter() {
        assert_eq!(first.features(index), second.features(index));
    }
    assert!(!second.is_enabled(StarIndex(2)));
}

#[test]
fn test_stale_cache_is_recomputed() {
    let db = full_database(&[1, 2]);
    let store = MemoryFeatureStore::new();

    let mut old = registry(&[1]);
    StarsFeatures::new(&mut old, MeanCalculator)
        .get_features(&db, &store)
        .unwrap();

    let mut stars = registry(&[1, 2]);
    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .get_features(&db, &store)
        .unwrap();

    assert!(!report.from_cache);
    assert_eq!(report.vectors, 6);
    assert_eq!(store.read("survey.json").unwrap().star_ids.len(), 2);
}

#[test]
fn test_corrupt_cache_is_recomputed() {
    let db = full_database(&[1]);
    let store = MemoryFeatureStore::new();
    store.insert_raw("survey.json", vec![0xff, 0xff]).unwrap();

    let mut stars = registry(&[1]);
    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .get_features(&db, &store)
        .unwrap();

    assert!(!report.from_cache);
    assert!(store.read("survey.json").is_ok());
}

#[test]
fn test_inconsistent_cache_is_recomputed() {
    let db = full_database(&[1, 2]);
    let store = MemoryFeatureStore::new();

    let mut set = FeatureSet::new("survey.json", vec![StarId(1), StarId(2)]);
    for filter in FILTERS {
        set.filters.push(filter.into());
        set.features.push(vec![
            FeatureVector::new(vec![1.0, 2.0]),
            FeatureVector::new(vec![1.0, 2.0, 3.0]),
        ]);
    }
    store.write("survey.json", &set).unwrap();

    let mut stars = registry(&[1, 2]);
    let report = StarsFeatures::new(&mut stars, MeanCalculator)
        .get_features(&db, &store)
        .unwrap();

    assert!(!report.from_cache);
    assert_eq!(report.vectors, 6);
    assert_eq!(stars.filters().len(), 3);
    assert_eq!(stars.feature_dimension(), Some(2));
    assert_eq!(stars.enabled_count(), 2);
}

#[test]
fn test_changed_periodogram_settings_recompute() {
    let db = full_database(&[1, 2]);
    let store = MemoryFeatureStore::new();

    let mut first = registry(&[1, 2]);
    StarsFeatures::new(&mut first, FeatureExtractor::default())
        .get_features(&db, &store)
        .unwrap();

    let narrow = PeriodogramConfig {
        min_frequency: Some(0.5),
        max_frequency: Some(1.0),
        ..Default::default()
    };
    let mut second = registry(&[1, 2]);
    let report = StarsFeatures::new(&mut second, FeatureExtractor::new(narrow.clone()))
        .get_features(&db, &store)
        .unwrap();
    assert!(!report.from_cache);

    let mut fresh = registry(&[1, 2]);
    StarsFeatures::new(&mut fresh, FeatureExtractor::new(narrow.clone()))
        .calculate_features(&db)
        .unwrap();
    for (index, _) in fresh.filters().iter() {
        assert_eq!(fresh.features(index), second.features(index));
    }

    let mut third = registry(&[1, 2]);
    let cached = StarsFeatures::new(&mut third, FeatureExtractor::new(narrow))
        .get_features(&db, &store)
        .unwrap();
    assert!(cached.from_cache);
}

#[test]
fn test_reference_extractor_with_file_store() {
    let db = full_database(&[2, 3, 4]);
    let dir = tempfile::tempdir().unwrap();
    let store = FileFeatureStore::new(dir.path()).unwrap();

    let mut first = registry(&[2, 3, 4]);
    let report = StarsFeatures::new(&mut first, FeatureExtractor::default())
        .get_features(&db, &store)
        .unwrap();

    assert_eq!(report.vectors, 9);
    assert!(report.disabled.is_empty());
    assert_eq!(first.feature_dimension(), Some(FEATURE_DIMENSION));

    let mut second = registry(&[2, 3, 4]);
    let cached = StarsFeatures::new(&mut second, FeatureExtractor::default())
        .get_features(&db, &store)
        .unwrap();

    assert!(cached.from_cache);
    for (index, _) in first.filters().iter() {
        assert_eq!(first.features(index), second.features(index));
    }
}
