//! Test configurations and error-message templates.

use serde::{Deserialize, Serialize};

use crate::dimension::{AllocKind, CastKind, LayoutKind};

/// One point in the test matrix.
///
/// A `None` slot means "compile with that dimension's baseline value"; only
/// explicitly chosen slots appear in rendered failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Configuration {
    pub alloc: Option<AllocKind>,
    pub layout: Option<LayoutKind>,
    pub cast: Option<CastKind>,
}

/// A configuration with baselines filled in, ready for a compile command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfiguration {
    pub alloc: AllocKind,
    pub layout: LayoutKind,
    pub cast: CastKind,
}

impl Configuration {
    /// Single-dimension probe of an allocation kind.
    #[must_use]
    pub const fn single_alloc(alloc: AllocKind) -> Self {
        Self {
            alloc: Some(alloc),
            layout: None,
            cast: None,
        }
    }

    /// Single-dimension probe of a layout kind.
    #[must_use]
    pub const fn single_layout(layout: LayoutKind) -> Self {
        Self {
            alloc: None,
            layout: Some(layout),
            cast: None,
        }
    }

    /// Single-dimension probe of a downcast kind.
    #[must_use]
    pub const fn single_cast(cast: CastKind) -> Self {
        Self {
            alloc: None,
            layout: None,
            cast: Some(cast),
        }
    }

    /// Allocation/layout pair with the cast left at baseline.
    #[must_use]
    pub const fn pair(alloc: AllocKind, layout: LayoutKind) -> Self {
        Self {
            alloc: Some(alloc),
            layout: Some(layout),
            cast: None,
        }
    }

    /// Fully explicit triple.
    #[must_use]
    pub const fn triple(alloc: AllocKind, layout: LayoutKind, cast: CastKind) -> Self {
        Self {
            alloc: Some(alloc),
            layout: Some(layout),
            cast: Some(cast),
        }
    }

    /// Fill defaulted slots with their dimension baselines.
    #[must_use]
    pub fn resolved(&self) -> ResolvedConfiguration {
        ResolvedConfiguration {
            alloc: self.alloc.unwrap_or(AllocKind::baseline()),
            layout: self.layout.unwrap_or(LayoutKind::baseline()),
            cast: self.cast.unwrap_or(CastKind::baseline()),
        }
    }

    /// Render a failure-message template against this configuration.
    ///
    /// Substitutes `{ALLOC}`, `{BASE}` and `{CAST}` for the explicitly chosen
    /// slots only; a placeholder for a defaulted slot is left untouched so
    /// baseline values never leak into user-facing messages.
    #[must_use]
    pub fn render_message(&self, template: &str) -> String {
        let mut message = template.to_string();
        if let Some(alloc) = self.alloc {
            message = message.replace("{ALLOC}", alloc.name());
        }
        if let Some(layout) = self.layout {
            message = message.replace("{BASE}", layout.name());
        }
        if let Some(cast) = self.cast {
            message = message.replace("{CAST}", cast.name());
        }
        message
    }

    /// Compact `ALLOC/BASE/CAST` label for logs and progress output, using
    /// `-` for defaulted slots.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}",
            self.alloc.map_or("-", AllocKind::name),
            self.layout.map_or("-", LayoutKind::name),
            self.cast.map_or("-", CastKind::name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_fills_baselines() {
        let cfg = Configuration::single_layout(LayoutKind::Inheritance);
        let resolved = cfg.resolved();
        assert_eq!(resolved.alloc, AllocKind::New);
        assert_eq!(resolved.layout, LayoutKind::Inheritance);
        assert_eq!(resolved.cast, CastKind::Basic);
    }

    #[test]
    fn resolved_keeps_explicit_values() {
        let cfg = Configuration::triple(
            AllocKind::Stack,
            LayoutKind::VinheritanceMulti,
            CastKind::Phantom,
        );
        let resolved = cfg.resolved();
        assert_eq!(resolved.alloc, AllocKind::Stack);
        assert_eq!(resolved.layout, LayoutKind::VinheritanceMulti);
        assert_eq!(resolved.cast, CastKind::Phantom);
    }

    #[test]
    fn render_substitutes_only_explicit_slots() {
        let cfg = Configuration::single_alloc(AllocKind::MallocVla);
        assert_eq!(
            cfg.render_message("Allocations of type {ALLOC} not handled"),
            "Allocations of type MALLOC_VLA not handled"
        );

        // A defaulted slot's placeholder must not resolve to the baseline.
        assert_eq!(
            cfg.render_message("{ALLOC} with {BASE}"),
            "MALLOC_VLA with {BASE}"
        );
    }

    #[test]
    fn render_handles_pairs_and_triples() {
        let pair = Configuration::pair(AllocKind::Global, LayoutKind::Nested);
        assert_eq!(
            pair.render_message(
                "Combination of allocation type {ALLOC} and structure layout {BASE} not handled"
            ),
            "Combination of allocation type GLOBAL and structure layout NESTED not handled"
        );

        let triple =
            Configuration::triple(AllocKind::New, LayoutKind::Basic, CastKind::PhantomDeep);
        assert_eq!(
            triple.render_message("{ALLOC}+{BASE}+{CAST}"),
            "NEW+BASIC+PHANTOM_DEEP"
        );
    }

    #[test]
    fn label_marks_defaulted_slots() {
        assert_eq!(
            Configuration::single_cast(CastKind::Phantom).label(),
            "-/-/PHANTOM"
        );
        assert_eq!(
            Configuration::pair(AllocKind::Stack, LayoutKind::Basic).label(),
            "STACK/BASIC/-"
        );
    }
}
