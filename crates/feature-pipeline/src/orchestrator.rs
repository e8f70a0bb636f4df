//! Feature Pipeline Orchestrator

use crate::cache;
use crate::{PipelineError, StarFailure};
use feature_engine::{FeatureVector, StarFeatureCalculator};
use light_curve::{LightCurveSource, PhotometricFilter, StarId};
use metrics::counter;
use serde::Serialize;
use star_classes::{FilterIndex, StarClasses, StarIndex};
use storage::FeatureStore;
use tracing::{debug, error, info, warn};

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Identity of the light-curve source
    pub source: String,
    /// Features were loaded from the cache
    pub from_cache: bool,
    pub stars_processed: usize,
    /// Non-placeholder vectors stored
    pub vectors: usize,
    pub placeholders: usize,
    /// Stars disabled by this run
    pub disabled: Vec<StarId>,
}

/// Computes the features of every registered star
///
/// Sole writer of the registry while it runs.
pub struct StarsFeatures<'a, C> {
    registry: &'a mut StarClasses,
    calculator: C,
}

impl<'a, C: StarFeatureCalculator> StarsFeatures<'a, C> {
    pub fn new(registry: &'a mut StarClasses, calculator: C) -> Self {
        Self {
            registry,
            calculator,
        }
    }

    pub fn registry(&self) -> &StarClasses {
        &*self.registry
    }

    /// Compute features for every star and filter of `source`
    ///
    /// A star whose curve cannot be read or whose features cannot be
    /// computed is disabled and gets placeholders; the run continues.
    pub fn calculate_features<S>(&mut self, source: &S) -> Result<PipelineReport, PipelineError>
    where
        S: LightCurveSource + ?Sized,
    {
        if self.registry.has_features() {
            return Err(PipelineError::AlreadyCalculated);
        }

        let filters = self.register_filters(source);
        let stars: Vec<(StarIndex, StarId)> =
            self.registry.iter().map(|(i, s)| (i, s.id())).collect();

        info!(
            "Calculating features of {} stars in {} filters from {}",
            stars.len(),
            filters.len(),
            source.identity()
        );

        let mut report = PipelineReport {
            source: source.identity().to_string(),
            stars_processed: stars.len(),
            ..Default::default()
        };

        for &(index, id) in &stars {
            for (filter_index, filter) in &filters {
                let vector = if self.registry.is_enabled(index) {
                    match self.compute(source, id, filter) {
                        Ok(vector) => vector,
                        Err(failure) => {
                            error!(
                                "Features of star {} in filter {} failed: {}",
                                id, filter, failure
                            );
                            self.registry.disable_star(id)?;
                            report.disabled.push(id);
                            counter!("clavel_stars_disabled_total").increment(1);
                            FeatureVector::placeholder()
                        }
                    }
                } else {
                    debug!("Star {} is disabled, placeholder in filter {}", id, filter);
                    FeatureVector::placeholder()
                };

                if vector.is_placeholder() {
                    report.placeholders += 1;
                    counter!("clavel_placeholders_total").increment(1);
                } else {
                    report.vectors += 1;
                    counter!("clavel_feature_vectors_total").increment(1);
                }

                let slot = self.registry.add_feature(*filter_index, vector)?;
                if slot != index {
                    return Err(PipelineError::SlotMisaligned {
                        filter: *filter_index,
                        expected: index,
                        actual: slot,
                    });
                }
            }
        }

        info!(
            "Computed {} feature vectors, {} placeholders, {} stars disabled",
            report.vectors,
            report.placeholders,
            report.disabled.len()
        );
        Ok(report)
    }

    /// Load features from `store` when a matching set is cached, otherwise
    /// compute them and write the result back
    pub fn get_features<S, F>(
        &mut self,
        source: &S,
        store: &F,
    ) -> Result<PipelineReport, PipelineError>
    where
        S: LightCurveSource + ?Sized,
        F: FeatureStore + ?Sized,
    {
        if self.registry.has_features() {
            return Err(PipelineError::AlreadyCalculated);
        }

        let key = source.identity();
        let fingerprint = self.calculator.fingerprint();
        if store.contains(key) {
            match store.read(key) {
                Ok(set) => {
                    let filters = unique_filters(source.filters());
                    match cache::stale_reason(&set, self.registry, key, &fingerprint, &filters) {
                        None => {
                            let disabled = cache::import(self.registry, &set)?;
                            counter!("clavel_feature_cache_hits_total").increment(1);

                            let (vectors, placeholders) = count_vectors(&set.features);
                            info!("Loaded {} feature vectors from cache for {}", vectors, key);
                            return Ok(PipelineReport {
                                source: key.to_string(),
                                from_cache: true,
                                stars_processed: set.star_ids.len(),
                                vectors,
                                placeholders,
                                disabled,
                            });
                        }
                        Some(reason) => warn!("Cached features for {} are stale: {}", key, reason),
                    }
                }
                Err(e) => warn!("Cached features for {} are unreadable: {}", key, e),
            }
        }

        let report = self.calculate_features(source)?;
        store.write(key, &cache::export(self.registry, key, &fingerprint))?;
        info!("Cached features for {}", key);
        Ok(report)
    }

    /// Register the source's filters in discovery order
    fn register_filters<S>(&mut self, source: &S) -> Vec<(FilterIndex, PhotometricFilter)>
    where
        S: LightCurveSource + ?Sized,
    {
        unique_filters(source.filters())
            .into_iter()
            .map(|filter| (self.registry.add_filter(filter.clone()), filter))
            .collect()
    }

    fn compute<S>(
        &mut self,
        source: &S,
        star: StarId,
        filter: &PhotometricFilter,
    ) -> Result<FeatureVector, StarFailure>
    where
        S: LightCurveSource + ?Sized,
    {
        let curve = source.light_curve(star, filter)?;
        let vector = self.calculator.calculate(&curve)?;
        debug!("Star {} in filter {}: {} features", star, filter, vector.len());
        Ok(vector)
    }
}

fn unique_filters(filters: Vec<PhotometricFilter>) -> Vec<PhotometricFilter> {
    let mut unique = Vec::with_capacity(filters.len());
    for filter in filters {
        if !unique.contains(&filter) {
            unique.push(filter);
        }
    }
    unique
}

fn count_vectors(features: &[Vec<FeatureVector>]) -> (usize, usize) {
    let placeholders = features
        .iter()
        .flatten()
        .filter(|v| v.is_placeholder())
        .count();
    let total: usize = features.iter().map(Vec::len).sum();
    (total - placeholders, placeholders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_filters_keeps_first_seen_order() {
        let filters = vec!["V".into(), "I".into(), "V".into(), "B".into()];
        assert_eq!(
            unique_filters(filters),
            vec![
                PhotometricFilter::new("V"),
                PhotometricFilter::new("I"),
                PhotometricFilter::new("B")
            ]
        );
    }

    #[test]
    fn test_count_vectors() {
        let features = vec![
            vec![FeatureVector::new(vec![1.0]), FeatureVector::placeholder()],
            vec![FeatureVector::new(vec![2.0]), FeatureVector::new(vec![3.0])],
        ];
        assert_eq!(count_vectors(&features), (3, 1));
    }
}
