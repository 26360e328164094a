//! Dimension enumerations for the test matrix.
//!
//! Each dimension is a fixed, ordered sequence of named values known in
//! advance. The first value of each sequence is the dimension's implicit
//! baseline, substituted into the compile command whenever a configuration
//! leaves that slot at default.

use serde::{Deserialize, Serialize};

/// How and where the test object is allocated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocKind {
    Stack,
    StackArray,
    StackArrayDeep,
    Malloc,
    MallocArray,
    MallocVla,
    CallocArray,
    CallocVla,
    Realloc,
    ReallocArray,
    ReallocVla,
    New,
    NewArray,
    NewVla,
    OverloadedNew,
    OverloadedNewArray,
    OverloadedNewVla,
    Global,
    GlobalArray,
    GlobalArrayDeep,
    Argument,
}

impl AllocKind {
    /// All allocation kinds, in test order.
    pub const ALL: &'static [Self] = &[
        Self::Stack,
        Self::StackArray,
        Self::StackArrayDeep,
        Self::Malloc,
        Self::MallocArray,
        Self::MallocVla,
        Self::CallocArray,
        Self::CallocVla,
        Self::Realloc,
        Self::ReallocArray,
        Self::ReallocVla,
        Self::New,
        Self::NewArray,
        Self::NewVla,
        Self::OverloadedNew,
        Self::OverloadedNewArray,
        Self::OverloadedNewVla,
        Self::Global,
        Self::GlobalArray,
        Self::GlobalArrayDeep,
        Self::Argument,
    ];

    /// Value substituted into a compile command when the allocation slot is
    /// left at default.
    ///
    /// This is deliberately not `ALL[0]`: the fixture program's neutral
    /// allocation path is plain `new`.
    #[must_use]
    pub const fn baseline() -> Self {
        Self::New
    }

    /// Macro-suffix name as it appears in `-DALLOC_<NAME>`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stack => "STACK",
            Self::StackArray => "STACK_ARRAY",
            Self::StackArrayDeep => "STACK_ARRAY_DEEP",
            Self::Malloc => "MALLOC",
            Self::MallocArray => "MALLOC_ARRAY",
            Self::MallocVla => "MALLOC_VLA",
            Self::CallocArray => "CALLOC_ARRAY",
            Self::CallocVla => "CALLOC_VLA",
            Self::Realloc => "REALLOC",
            Self::ReallocArray => "REALLOC_ARRAY",
            Self::ReallocVla => "REALLOC_VLA",
            Self::New => "NEW",
            Self::NewArray => "NEW_ARRAY",
            Self::NewVla => "NEW_VLA",
            Self::OverloadedNew => "OVERLOADED_NEW",
            Self::OverloadedNewArray => "OVERLOADED_NEW_ARRAY",
            Self::OverloadedNewVla => "OVERLOADED_NEW_VLA",
            Self::Global => "GLOBAL",
            Self::GlobalArray => "GLOBAL_ARRAY",
            Self::GlobalArrayDeep => "GLOBAL_ARRAY_DEEP",
            Self::Argument => "ARGUMENT",
        }
    }
}

/// Class-hierarchy shape of the allocated object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutKind {
    Basic,
    Nested0,
    Nested,
    NestedArray,
    NestedDeep,
    NestedArrayDeep,
    Inheritance,
    Vinheritance,
    InheritanceMulti,
    VinheritanceMulti,
    InheritanceMultiDeep,
    VinheritanceMultiDeep,
}

impl LayoutKind {
    /// All layout kinds, in test order.
    pub const ALL: &'static [Self] = &[
        Self::Basic,
        Self::Nested0,
        Self::Nested,
        Self::NestedArray,
        Self::NestedDeep,
        Self::NestedArrayDeep,
        Self::Inheritance,
        Self::Vinheritance,
        Self::InheritanceMulti,
        Self::VinheritanceMulti,
        Self::InheritanceMultiDeep,
        Self::VinheritanceMultiDeep,
    ];

    /// Value substituted into a compile command when the layout slot is left
    /// at default.
    #[must_use]
    pub const fn baseline() -> Self {
        Self::Basic
    }

    /// Macro-suffix name as it appears in `-DBASE_<NAME>`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Nested0 => "NESTED0",
            Self::Nested => "NESTED",
            Self::NestedArray => "NESTED_ARRAY",
            Self::NestedDeep => "NESTED_DEEP",
            Self::NestedArrayDeep => "NESTED_ARRAY_DEEP",
            Self::Inheritance => "INHERITANCE",
            Self::Vinheritance => "VINHERITANCE",
            Self::InheritanceMulti => "INHERITANCE_MULTI",
            Self::VinheritanceMulti => "VINHERITANCE_MULTI",
            Self::InheritanceMultiDeep => "INHERITANCE_MULTI_DEEP",
            Self::VinheritanceMultiDeep => "VINHERITANCE_MULTI_DEEP",
        }
    }
}

/// Shape of the downcast performed on the object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CastKind {
    Basic,
    InheritanceMulti,
    Phantom,
    PhantomDeep,
}

impl CastKind {
    /// All downcast kinds, in test order.
    pub const ALL: &'static [Self] = &[
        Self::Basic,
        Self::InheritanceMulti,
        Self::Phantom,
        Self::PhantomDeep,
    ];

    /// Value substituted into a compile command when the cast slot is left at
    /// default.
    #[must_use]
    pub const fn baseline() -> Self {
        Self::Basic
    }

    /// Macro-suffix name as it appears in `-DCAST_<NAME>`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::InheritanceMulti => "INHERITANCE_MULTI",
            Self::Phantom => "PHANTOM",
            Self::PhantomDeep => "PHANTOM_DEEP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_tables_have_expected_sizes() {
        assert_eq!(AllocKind::ALL.len(), 21);
        assert_eq!(LayoutKind::ALL.len(), 12);
        assert_eq!(CastKind::ALL.len(), 4);
    }

    #[test]
    fn baselines_match_fixture_defaults() {
        assert_eq!(AllocKind::baseline(), AllocKind::New);
        assert_eq!(LayoutKind::baseline(), LayoutKind::Basic);
        assert_eq!(CastKind::baseline(), CastKind::Basic);
    }

    #[test]
    fn names_are_unique_per_dimension() {
        let mut alloc_names: Vec<&str> = AllocKind::ALL.iter().map(|a| a.name()).collect();
        alloc_names.sort_unstable();
        alloc_names.dedup();
        assert_eq!(alloc_names.len(), AllocKind::ALL.len());

        let mut layout_names: Vec<&str> = LayoutKind::ALL.iter().map(|l| l.name()).collect();
        layout_names.sort_unstable();
        layout_names.dedup();
        assert_eq!(layout_names.len(), LayoutKind::ALL.len());
    }

    #[test]
    fn serde_names_match_macro_names() {
        for &alloc in AllocKind::ALL {
            let json = serde_json::to_string(&alloc).unwrap();
            assert_eq!(json, format!("\"{}\"", alloc.name()));
        }
        for &layout in LayoutKind::ALL {
            let json = serde_json::to_string(&layout).unwrap();
            assert_eq!(json, format!("\"{}\"", layout.name()));
        }
        for &cast in CastKind::ALL {
            let json = serde_json::to_string(&cast).unwrap();
            assert_eq!(json, format!("\"{}\"", cast.name()));
        }
    }
}
