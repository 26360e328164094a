//! Compatibility relation between allocation kinds and layout kinds.
//!
//! Layouts that use virtual inheritance require an allocation path that
//! constructs a complete virtual object (vtable and virtual bases in place).
//! Allocator call shapes that only yield raw storage cannot express that, so
//! pairing them with a virtual layout is meaningless rather than unsupported:
//! such configurations are never compiled and never counted either way.

use crate::dimension::{AllocKind, LayoutKind};

/// Allocation kinds able to construct a complete virtual object.
pub const VIRTUAL_CAPABLE_ALLOCS: &[AllocKind] = &[
    AllocKind::Stack,
    AllocKind::StackArray,
    AllocKind::StackArrayDeep,
    AllocKind::New,
    AllocKind::NewArray,
    AllocKind::NewVla,
    AllocKind::OverloadedNew,
    AllocKind::OverloadedNewArray,
    AllocKind::OverloadedNewVla,
    AllocKind::Global,
    AllocKind::GlobalArray,
    AllocKind::GlobalArrayDeep,
    AllocKind::Argument,
];

/// Layout kinds whose hierarchy uses virtual inheritance.
pub const VIRTUAL_LAYOUTS: &[LayoutKind] = &[
    LayoutKind::Vinheritance,
    LayoutKind::VinheritanceMulti,
    LayoutKind::VinheritanceMultiDeep,
];

impl AllocKind {
    /// Whether this allocation path runs constructors and can therefore
    /// produce a complete virtual object.
    #[must_use]
    pub fn supports_virtual_construction(self) -> bool {
        VIRTUAL_CAPABLE_ALLOCS.contains(&self)
    }
}

impl LayoutKind {
    /// Whether this hierarchy shape involves virtual inheritance.
    #[must_use]
    pub fn uses_virtual_inheritance(self) -> bool {
        VIRTUAL_LAYOUTS.contains(&self)
    }
}

/// True when `alloc` can realize `layout`.
#[must_use]
pub fn pair_allowed(alloc: AllocKind, layout: LayoutKind) -> bool {
    !layout.uses_virtual_inheritance() || alloc.supports_virtual_construction()
}
