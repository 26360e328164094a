//! Upper-bound enumeration of the matrix walk.
//!
//! Useful for answering "what would be compiled" without touching a
//! compiler: the plan assumes a fully supported detector, so nothing is
//! pruned and every pair spawns its triples.

use castcheck_matrix::{Configuration, ConfigurationTester, expand_matrix};

struct PlanCollector {
    planned: Vec<Configuration>,
}

impl ConfigurationTester for PlanCollector {
    fn test(&mut self, config: &Configuration, _template: &str) -> bool {
        self.planned.push(*config);
        true
    }
}

/// Every configuration the driver would attempt against a fully supported
/// detector, in execution order.
#[must_use]
pub fn upper_bound_plan() -> Vec<Configuration> {
    let mut collector = PlanCollector {
        planned: Vec::new(),
    };
    let _ = expand_matrix(&mut collector);
    collector.planned
}
