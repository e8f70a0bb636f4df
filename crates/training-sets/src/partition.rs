//! Class Partitioner

use crate::ClassLocalIndex;
use star_classes::{StarClasses, StarIndex};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Enabled stars of one retained class, in ascending global order
///
/// Translates class-local positions to global star indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPartition {
    label: String,
    members: Vec<StarIndex>,
}

impl ClassPartition {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn members(&self) -> &[StarIndex] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Global index of a class-local position
    pub fn global_index(&self, local: ClassLocalIndex) -> Option<StarIndex> {
        self.members.get(local.0).copied()
    }
}

/// Groups enabled stars by class and applies the minimum cardinality
pub struct ClassPartitioner<'a> {
    registry: &'a StarClasses,
    min_cardinal: usize,
}

impl<'a> ClassPartitioner<'a> {
    pub fn new(registry: &'a StarClasses, min_cardinal: usize) -> Self {
        Self {
            registry,
            min_cardinal,
        }
    }

    /// Enabled stars per class label, labels in first-seen order
    pub fn count_instances_by_class(&self) -> Vec<(String, usize)> {
        self.group_by_class()
            .into_iter()
            .map(|(label, members)| (label, members.len()))
            .collect()
    }

    /// Global indexes of the enabled stars labeled `label`, ascending
    pub fn indexes_for_class(&self, label: &str) -> Vec<StarIndex> {
        self.registry
            .iter()
            .filter(|(_, star)| star.is_enabled() && star.class_name() == label)
            .map(|(index, _)| index)
            .collect()
    }

    /// Partitions of the classes with at least `min_cardinal` enabled stars
    pub fn determine_classes_to_use_for_training(&self) -> Vec<ClassPartition> {
        let mut retained = Vec::new();

        for (label, members) in self.group_by_class() {
            if members.len() >= self.min_cardinal {
                debug!("Class {} retained with {} stars", label, members.len());
                retained.push(ClassPartition { label, members });
            } else {
                warn!(
                    "Class {} ignored for training, not enough elements {}",
                    label,
                    members.len()
                );
            }
        }

        info!(
            "{} classes retained with minimum cardinal {}",
            retained.len(),
            self.min_cardinal
        );
        retained
    }

    /// Single pass over the registry; members stay in ascending order
    ///
    /// Labels are ordered by their first enabled star, so a disabled star
    /// at index 0 does not fix the first label.
    fn group_by_class(&self) -> Vec<(String, Vec<StarIndex>)> {
        let mut groups: Vec<(String, Vec<StarIndex>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for (index, star) in self.registry.iter() {
            if !star.is_enabled() {
                warn!("Instance at index {} disabled, so it is ignored for training", index);
                continue;
            }

            let label = star.class_name();
            match positions.get(label) {
                Some(&pos) => groups[pos].1.push(index),
                None => {
                    positions.insert(label, groups.len());
                    groups.push((label.to_string(), vec![index]));
                }
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use light_curve::StarId;

    fn registry() -> StarClasses {
        let mut stars = StarClasses::new();
        for (id, class) in [
            (1, "Mira"),
            (2, "RRLyrae"),
            (3, "Mira"),
            (4, "Cepheid"),
            (5, "RRLyrae"),
            (6, "Mira"),
        ] {
            stars.add_star(StarId(id), class).unwrap();
        }
        stars
    }

    #[test]
    fn test_count_in_first_seen_order() {
        let stars = registry();
        let counts = ClassPartitioner::new(&stars, 1).count_instances_by_class();
        assert_eq!(
            counts,
            vec![
                ("Mira".to_string(), 3),
                ("RRLyrae".to_string(), 2),
                ("Cepheid".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_disabled_stars_are_skipped() {
        let mut stars = registry();
        stars.disable_star(StarId(1)).unwrap();
        stars.disable_star(StarId(4)).unwrap();

        // Star 1 is disabled, so the first enabled label is RRLyrae
        let partitioner = ClassPartitioner::new(&stars, 1);
        assert_eq!(
            partitioner.count_instances_by_class(),
            vec![("RRLyrae".to_string(), 2), ("Mira".to_string(), 2)]
        );
        assert_eq!(
            partitioner.indexes_for_class("Mira"),
            vec![StarIndex(2), StarIndex(5)]
        );
        assert!(partitioner.indexes_for_class("Cepheid").is_empty());
    }

    #[test]
    fn test_retained_order_follows_first_enabled_star() {
        let mut stars = registry();
        stars.disable_star(StarId(1)).unwrap();

        let retained = ClassPartitioner::new(&stars, 2).determine_classes_to_use_for_training();
        let labels: Vec<&str> = retained.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["RRLyrae", "Mira"]);
        assert_eq!(retained[1].members(), &[StarIndex(2), StarIndex(5)]);
    }

    #[test]
    fn test_minimum_cardinal() {
        let stars = registry();
        let retained = ClassPartitioner::new(&stars, 2).determine_classes_to_use_for_training();

        assert_eq!(retained.len(), 2);
        assert_eq!(retained[0].label(), "Mira");
        assert_eq!(
            retained[0].members(),
            &[StarIndex(0), StarIndex(2), StarIndex(5)]
        );
        assert_eq!(retained[1].label(), "RRLyrae");
        assert_eq!(retained[1].global_index(ClassLocalIndex(1)), Some(StarIndex(4)));
        assert_eq!(retained[1].global_index(ClassLocalIndex(2)), None);
    }

    #[test]
    fn test_members_match_indexes_for_class() {
        let stars = registry();
        let partitioner = ClassPartitioner::new(&stars, 0);
        for partition in partitioner.determine_classes_to_use_for_training() {
            assert_eq!(
                partition.members(),
                partitioner.indexes_for_class(partition.label()).as_slice()
            );
        }
    }

    #[test]
    fn test_empty_registry() {
        let stars = StarClasses::new();
        let partitioner = ClassPartitioner::new(&stars, 0);
        assert!(partitioner.count_instances_by_class().is_empty());
        assert!(partitioner.determine_classes_to_use_for_training().is_empty());
    }
}
