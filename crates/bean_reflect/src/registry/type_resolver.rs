use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock};

use crate::info::TypeRef;

// -----------------------------------------------------------------------------
// TypeResolver

/// Out-of-band type lookup, consulted only when a type cannot be learned
/// from declared signatures.
///
/// [`TypeRegistry`](super::TypeRegistry) is the stock implementation.
pub trait TypeResolver: Send + Sync {
    /// Resolves a full type path or a short type name.
    fn resolve_type(&self, name: &str) -> Option<TypeRef>;

    /// Resolves the element type of a container property whose signature
    /// leaves it open.
    fn element_type(&self, owner_path: &str, property: &str) -> Option<TypeRef> {
        let _ = (owner_path, property);
        None
    }
}

// -----------------------------------------------------------------------------
// ResolverSlot

/// A swappable holder for one [`TypeResolver`].
#[derive(Default)]
pub struct ResolverSlot {
    inner: RwLock<Option<Arc<dyn TypeResolver>>>,
}

impl ResolverSlot {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Installs `resolver`, returning the one it replaces.
    pub fn register(&self, resolver: Arc<dyn TypeResolver>) -> Option<Arc<dyn TypeResolver>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(resolver)
    }

    /// Removes the installed resolver.
    pub fn unregister(&self) -> Option<Arc<dyn TypeResolver>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Returns the installed resolver, if any.
    pub fn current(&self) -> Option<Arc<dyn TypeResolver>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl core::fmt::Debug for ResolverSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolverSlot")
            .field("registered", &self.current().is_some())
            .finish()
    }
}
