//! Conversion between the registry and cached feature sets

use crate::PipelineError;
use light_curve::{PhotometricFilter, StarId};
use star_classes::{StarClasses, StarIndex};
use std::collections::HashSet;
use storage::FeatureSet;

/// Snapshot the features held by the registry
pub(crate) fn export(registry: &StarClasses, source: &str, calculator: &str) -> FeatureSet {
    let mut set = FeatureSet::new(source, registry.iter().map(|(_, s)| s.id()).collect());
    set.calculator = calculator.to_string();

    for (index, filter) in registry.filters().iter() {
        set.filters.push(filter.clone());
        let list = registry.features(index).map(|l| l.to_vec());
        set.features.push(list.unwrap_or_default());
    }
    set.disabled = registry
        .iter()
        .filter(|(_, s)| !s.is_enabled())
        .map(|(_, s)| s.id())
        .collect();

    set
}

/// Reason a cached set cannot be applied to the registry, if any
pub(crate) fn stale_reason(
    set: &FeatureSet,
    registry: &StarClasses,
    source: &str,
    calculator: &str,
    source_filters: &[PhotometricFilter],
) -> Option<String> {
    if set.source != source {
        return Some(format!("cached for source '{}'", set.source));
    }

    if set.calculator != calculator {
        return Some(format!("computed with settings '{}'", set.calculator));
    }

    let star_ids: Vec<StarId> = registry.iter().map(|(_, s)| s.id()).collect();
    if !set.matches_stars(&star_ids) {
        return Some("star list differs".to_string());
    }

    if set.filters != source_filters {
        return Some("filter list differs".to_string());
    }

    if set.features.len() != set.filters.len() {
        return Some(format!(
            "{} feature lists for {} filters",
            set.features.len(),
            set.filters.len()
        ));
    }

    let disabled: HashSet<StarId> = set.disabled.iter().copied().collect();
    if let Some((_, star)) = registry
        .iter()
        .find(|(_, s)| !s.is_enabled() && !disabled.contains(&s.id()))
    {
        return Some(format!("star {} is disabled but has cached features", star.id()));
    }

    for (filter, list) in set.filters.iter().zip(&set.features) {
        if list.len() != star_ids.len() {
            return Some(format!(
                "filter {} holds {} vectors for {} stars",
                filter,
                list.len(),
                star_ids.len()
            ));
        }
        if let Some(pos) = list
            .iter()
            .zip(&star_ids)
            .position(|(v, id)| v.is_placeholder() && !disabled.contains(id))
        {
            return Some(format!(
                "placeholder for enabled star {} in filter {}",
                star_ids[pos], filter
            ));
        }
    }

    let mut lengths = set
        .features
        .iter()
        .flatten()
        .filter(|v| !v.is_placeholder())
        .map(|v| v.len());
    if let Some(first) = lengths.next() {
        if let Some(other) = lengths.find(|&len| len != first) {
            return Some(format!("vectors of {} and {} values", first, other));
        }
    }

    None
}

/// Restore filters, vectors and disabled stars through the registry
///
/// Applied to a copy first; on error the registry is left untouched.
/// Returns the stars newly disabled by the import.
pub(crate) fn import(
    registry: &mut StarClasses,
    set: &FeatureSet,
) -> Result<Vec<StarId>, PipelineError> {
    let mut scratch = registry.clone();
    let disabled = apply(&mut scratch, set)?;
    *registry = scratch;
    Ok(disabled)
}

fn apply(registry: &mut StarClasses, set: &FeatureSet) -> Result<Vec<StarId>, PipelineError> {
    let mut disabled = Vec::new();
    for &id in &set.disabled {
        if registry.disable_star(id)? {
            disabled.push(id);
        }
    }

    for (filter, list) in set.filters.iter().zip(&set.features) {
        let index = registry.add_filter(filter.clone());
        for (expected, vector) in list.iter().enumerate() {
            let slot = registry.add_feature(index, vector.clone())?;
            if slot != StarIndex(expected) {
                return Err(PipelineError::SlotMisaligned {
                    filter: index,
                    expected: StarIndex(expected),
                    actual: slot,
                });
            }
        }
    }

    Ok(disabled)
}
