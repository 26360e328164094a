//! Pruning memory for the matrix walk.

use std::collections::BTreeSet;

use crate::config::Configuration;
use crate::dimension::{AllocKind, CastKind, LayoutKind};

/// Dimension values proven unsupported during single-dimension testing.
///
/// Sets only grow within one run. Membership is checked against the
/// explicitly chosen slots of a configuration: a defaulted slot resolves to
/// its baseline unconditionally, even if that baseline value itself failed
/// its single-dimension probe.
#[derive(Debug, Clone, Default)]
pub struct PruningState {
    allocs: BTreeSet<AllocKind>,
    layouts: BTreeSet<LayoutKind>,
    casts: BTreeSet<CastKind>,
}

impl PruningState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_alloc(&mut self, alloc: AllocKind) {
        self.allocs.insert(alloc);
    }

    pub fn mark_layout(&mut self, layout: LayoutKind) {
        self.layouts.insert(layout);
    }

    pub fn mark_cast(&mut self, cast: CastKind) {
        self.casts.insert(cast);
    }

    #[must_use]
    pub fn alloc_pruned(&self, alloc: AllocKind) -> bool {
        self.allocs.contains(&alloc)
    }

    #[must_use]
    pub fn layout_pruned(&self, layout: LayoutKind) -> bool {
        self.layouts.contains(&layout)
    }

    #[must_use]
    pub fn cast_pruned(&self, cast: CastKind) -> bool {
        self.casts.contains(&cast)
    }

    /// Whether a configuration survives pruning (no explicitly chosen slot is
    /// in an unsupported set).
    #[must_use]
    pub fn permits(&self, config: &Configuration) -> bool {
        !(config.alloc.is_some_and(|a| self.alloc_pruned(a))
            || config.layout.is_some_and(|l| self.layout_pruned(l))
            || config.cast.is_some_and(|c| self.cast_pruned(c)))
    }

    /// Unsupported allocation kinds, in dimension order.
    #[must_use]
    pub fn unsupported_allocs(&self) -> Vec<AllocKind> {
        self.allocs.iter().copied().collect()
    }

    /// Unsupported layout kinds, in dimension order.
    #[must_use]
    pub fn unsupported_layouts(&self) -> Vec<LayoutKind> {
        self.layouts.iter().copied().collect()
    }

    /// Unsupported downcast kinds, in dimension order.
    #[must_use]
    pub fn unsupported_casts(&self) -> Vec<CastKind> {
        self.casts.iter().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocs.is_empty() && self.layouts.is_empty() && self.casts.is_empty()
    }
}
