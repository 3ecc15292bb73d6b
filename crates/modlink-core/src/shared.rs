//! Reference-counted module owner.
//!
//! [`NativeModule`] assumes a single owner. When several independent
//! subsystems need the same library, wrap it in a [`SharedModule`]: clones
//! share one platform handle, which is released when the last clone drops.

use std::ffi::CStr;
use std::sync::Arc;

use crate::error::Result;
use crate::module::{NativeModule, SymbolAddress};

/// A native module shared between several owners.
#[derive(Debug, Clone)]
pub struct SharedModule {
    inner: Arc<NativeModule>,
}

impl SharedModule {
    /// Take ownership of a loaded module.
    pub fn new(module: NativeModule) -> Self {
        Self {
            inner: Arc::new(module),
        }
    }

    /// Load a library and wrap it.
    pub fn load(name: impl Into<String>) -> Result<Self> {
        NativeModule::load(name).map(Self::new)
    }

    /// Name the module was loaded with.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Raw platform handle.
    pub fn handle(&self) -> usize {
        self.inner.handle()
    }

    /// Resolve an exported symbol. See [`NativeModule::resolve_symbol`].
    pub fn resolve_symbol(&self, symbol: &str) -> Result<SymbolAddress> {
        self.inner.resolve_symbol(symbol)
    }

    /// Resolve an exported symbol from a NUL-terminated name.
    pub fn resolve_symbol_cstr(&self, symbol: &CStr) -> Result<SymbolAddress> {
        self.inner.resolve_symbol_cstr(symbol)
    }

    /// Number of owners currently holding this module.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Recover exclusive ownership if this is the last owner.
    ///
    /// Returns `self` unchanged when other clones are still alive.
    pub fn try_into_inner(self) -> std::result::Result<NativeModule, SharedModule> {
        Arc::try_unwrap(self.inner).map_err(|inner| SharedModule { inner })
    }
}

impl From<NativeModule> for SharedModule {
    fn from(module: NativeModule) -> Self {
        Self::new(module)
    }
}
