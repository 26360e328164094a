//! Matrix expansion: which configurations get tested, and in what order.
//!
//! The walk is strictly sequential. Single-dimension probes run first and
//! their failures feed the [`PruningState`]; pair and triple failures are
//! reported by the tester but never prune, since a combination-specific
//! failure may be idiosyncratic to that exact combination.

use crate::compat;
use crate::config::Configuration;
use crate::dimension::{AllocKind, CastKind, LayoutKind};
use crate::pruning::PruningState;

/// Template for a failed single-allocation probe.
pub const ALLOC_TEMPLATE: &str = "Allocations of type {ALLOC} not handled";
/// Template for a failed single-layout probe.
pub const LAYOUT_TEMPLATE: &str = "Structures with layout {BASE} not handled";
/// Template for a failed single-cast probe.
pub const CAST_TEMPLATE: &str = "Down-cast of type {CAST} not handled";
/// Template for a failed allocation/layout pair.
pub const PAIR_TEMPLATE: &str =
    "Combination of allocation type {ALLOC} and structure layout {BASE} not handled";
/// Template for a failed full triple.
pub const TRIPLE_TEMPLATE: &str =
    "Combination of allocation type {ALLOC}, structure layout {BASE} and down-cast type {CAST} not handled";

/// Runs the two-phase compile-execute-classify protocol for one
/// configuration.
///
/// Returns `true` only when both phases behaved as required. Implementations
/// own all reporting; the expansion only consumes the verdict.
pub trait ConfigurationTester {
    fn test(&mut self, config: &Configuration, template: &str) -> bool;
}

/// Walk the full matrix against `tester` and return the pruning state
/// accumulated from single-dimension failures.
pub fn expand_matrix<T: ConfigurationTester>(tester: &mut T) -> PruningState {
    let mut pruning = PruningState::new();

    // Phase A: each allocation kind alone.
    for &alloc in AllocKind::ALL {
        if !tester.test(&Configuration::single_alloc(alloc), ALLOC_TEMPLATE) {
            pruning.mark_alloc(alloc);
        }
    }

    // Phase B: each layout kind alone.
    for &layout in LayoutKind::ALL {
        if !tester.test(&Configuration::single_layout(layout), LAYOUT_TEMPLATE) {
            pruning.mark_layout(layout);
        }
    }

    // Phase C: each downcast kind alone.
    for &cast in CastKind::ALL {
        if !tester.test(&Configuration::single_cast(cast), CAST_TEMPLATE) {
            pruning.mark_cast(cast);
        }
    }

    // Phase D: compatible pairs, then triples gated on the pair passing.
    for &alloc in AllocKind::ALL {
        if pruning.alloc_pruned(alloc) {
            continue;
        }
        for &layout in LayoutKind::ALL {
            if pruning.layout_pruned(layout) {
                continue;
            }
            if !compat::pair_allowed(alloc, layout) {
                continue;
            }
            if !tester.test(&Configuration::pair(alloc, layout), PAIR_TEMPLATE) {
                continue;
            }
            for &cast in CastKind::ALL {
                if pruning.cast_pruned(cast) {
                    continue;
                }
                // The triple verdict is reported by the tester but does not
                // feed back into the pruning sets.
                let _ = tester.test(&Configuration::triple(alloc, layout, cast), TRIPLE_TEMPLATE);
            }
        }
    }

    pruning
}

/// Upper bound on protocol invocations for a fully supported detector:
/// |Alloc| + |Layout| + |Cast| + |compatible pairs| + |compatible triples|.
#[must_use]
pub fn max_invocations() -> usize {
    let singles = AllocKind::ALL.len() + LayoutKind::ALL.len() + CastKind::ALL.len();
    let pairs = AllocKind::ALL
        .iter()
        .flat_map(|&a| LayoutKind::ALL.iter().map(move |&l| (a, l)))
        .filter(|&(a, l)| compat::pair_allowed(a, l))
        .count();
    singles + pairs + pairs * CastKind::ALL.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted tester: fails exactly the configurations in `failures`,
    /// recording every probe it receives.
    #[derive(Default)]
    struct ScriptedTester {
        failures: Vec<Configuration>,
        seen: Vec<(Configuration, &'static str)>,
    }

    impl ScriptedTester {
        fn failing(failures: Vec<Configuration>) -> Self {
            Self {
                failures,
                seen: Vec::new(),
            }
        }

        fn tested(&self, config: &Configuration) -> bool {
            self.seen.iter().any(|(seen, _)| seen == config)
        }
    }

    impl ConfigurationTester for ScriptedTester {
        fn test(&mut self, config: &Configuration, template: &str) -> bool {
            // Templates are 'static in the walk; keep them for assertions.
            let template: &'static str = match template {
                ALLOC_TEMPLATE => ALLOC_TEMPLATE,
                LAYOUT_TEMPLATE => LAYOUT_TEMPLATE,
                CAST_TEMPLATE => CAST_TEMPLATE,
                PAIR_TEMPLATE => PAIR_TEMPLATE,
                TRIPLE_TEMPLATE => TRIPLE_TEMPLATE,
                other => panic!("unexpected template: {other}"),
            };
            self.seen.push((*config, template));
            !self.failures.contains(config)
        }
    }

    #[test]
    fn fully_supported_detector_walks_the_whole_matrix() {
        let mut tester = ScriptedTester::default();
        let pruning = expand_matrix(&mut tester);

        assert!(pruning.is_empty());
        assert_eq!(tester.seen.len(), max_invocations());

        // 8 raw-storage allocs x 3 virtual layouts are excluded.
        let pairs = tester
            .seen
            .iter()
            .filter(|(_, t)| *t == PAIR_TEMPLATE)
            .count();
        assert_eq!(pairs, 21 * 12 - 8 * 3);
        let triples = tester
            .seen
            .iter()
            .filter(|(_, t)| *t == TRIPLE_TEMPLATE)
            .count();
        assert_eq!(triples, pairs * 4);
    }

    #[test]
    fn unsupported_alloc_never_reappears() {
        let mut tester =
            ScriptedTester::failing(vec![Configuration::single_alloc(AllocKind::Stack)]);
        let pruning = expand_matrix(&mut tester);

        assert_eq!(pruning.unsupported_allocs(), vec![AllocKind::Stack]);
        // Prune completeness: after the failed probe, no pair or triple
        // containing STACK is ever tested.
        let stack_reuse = tester
            .seen
            .iter()
            .filter(|(cfg, t)| cfg.alloc == Some(AllocKind::Stack) && *t != ALLOC_TEMPLATE)
            .count();
        assert_eq!(stack_reuse, 0);
        // STACK is virtual-capable, yet (STACK, VINHERITANCE) must not appear.
        assert!(!tester.tested(&Configuration::pair(
            AllocKind::Stack,
            LayoutKind::Vinheritance
        )));
    }

    #[test]
    fn unsupported_cast_is_skipped_inside_triples() {
        let mut tester =
            ScriptedTester::failing(vec![Configuration::single_cast(CastKind::Phantom)]);
        let pruning = expand_matrix(&mut tester);

        assert_eq!(pruning.unsupported_casts(), vec![CastKind::Phantom]);
        let phantom_triples = tester
            .seen
            .iter()
            .filter(|(cfg, t)| *t == TRIPLE_TEMPLATE && cfg.cast == Some(CastKind::Phantom))
            .count();
        assert_eq!(phantom_triples, 0);
        // The other three casts still run for every passing pair.
        let triples = tester
            .seen
            .iter()
            .filter(|(_, t)| *t == TRIPLE_TEMPLATE)
            .count();
        assert_eq!(triples, (21 * 12 - 8 * 3) * 3);
    }

    #[test]
    fn failing_pair_suppresses_its_triples_only() {
        let bad_pair = Configuration::pair(AllocKind::Global, LayoutKind::Nested);
        let mut tester = ScriptedTester::failing(vec![bad_pair]);
        let pruning = expand_matrix(&mut tester);

        // Pair failures are reported but never prune.
        assert!(pruning.is_empty());
        for &cast in CastKind::ALL {
            assert!(!tester.tested(&Configuration::triple(
                AllocKind::Global,
                LayoutKind::Nested,
                cast
            )));
        }
        // The same values keep being tested in other combinations.
        assert!(tester.tested(&Configuration::pair(AllocKind::Global, LayoutKind::Basic)));
        assert!(tester.tested(&Configuration::pair(AllocKind::Stack, LayoutKind::Nested)));
    }

    #[test]
    fn failing_triple_does_not_prune_its_values() {
        let bad = Configuration::triple(AllocKind::New, LayoutKind::Basic, CastKind::Phantom);
        let mut tester = ScriptedTester::failing(vec![bad]);
        let pruning = expand_matrix(&mut tester);

        assert!(pruning.is_empty());
        // PHANTOM still runs in later combinations.
        assert!(tester.tested(&Configuration::triple(
            AllocKind::New,
            LayoutKind::Nested0,
            CastKind::Phantom
        )));
    }

    #[test]
    fn pairs_run_before_their_triples_and_constraint_always_holds() {
        let mut tester = ScriptedTester::default();
        expand_matrix(&mut tester);

        for (idx, (config, template)) in tester.seen.iter().enumerate() {
            if *template == TRIPLE_TEMPLATE {
                let pair = Configuration::pair(config.alloc.unwrap(), config.layout.unwrap());
                let pair_idx = tester
                    .seen
                    .iter()
                    .position(|(seen, _)| *seen == pair)
                    .expect("pair tested");
                assert!(pair_idx < idx, "pair must precede triple");
            }
            if let (Some(alloc), Some(layout)) = (config.alloc, config.layout) {
                assert!(compat::pair_allowed(alloc, layout), "{config:?}");
            }
        }
    }

    #[test]
    fn singles_run_in_dimension_order_before_combinations() {
        let mut tester = ScriptedTester::default();
        expand_matrix(&mut tester);

        let phase_rank = |template: &str| match template {
            ALLOC_TEMPLATE => 0,
            LAYOUT_TEMPLATE => 1,
            CAST_TEMPLATE => 2,
            _ => 3,
        };
        let ranks: Vec<usize> = tester.seen.iter().map(|(_, t)| phase_rank(t)).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted, "phases must not interleave");
    }

    #[test]
    fn all_singles_failing_limits_run_to_probes() {
        let mut failures: Vec<Configuration> = Vec::new();
        failures.extend(AllocKind::ALL.iter().map(|&a| Configuration::single_alloc(a)));
        failures.extend(
            LayoutKind::ALL
                .iter()
                .map(|&l| Configuration::single_layout(l)),
        );
        failures.extend(CastKind::ALL.iter().map(|&c| Configuration::single_cast(c)));

        let mut tester = ScriptedTester::failing(failures);
        let pruning = expand_matrix(&mut tester);

        assert_eq!(pruning.unsupported_allocs().len(), 21);
        assert_eq!(pruning.unsupported_layouts().len(), 12);
        assert_eq!(pruning.unsupported_casts().len(), 4);
        // Only the 37 probes ran; everything else was pruned.
        assert_eq!(tester.seen.len(), 21 + 12 + 4);
    }
}
