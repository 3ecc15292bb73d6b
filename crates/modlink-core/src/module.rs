//! Native module handle.
//!
//! A [`NativeModule`] wraps the platform loader's opaque handle for one
//! shared library. It is created by [`NativeModule::load`], resolves exported
//! symbols by name, and is released exactly once by [`NativeModule::unload`]
//! (or on drop if it was never unloaded explicitly).
//!
//! On Unix the library is opened with `RTLD_LAZY | RTLD_LOCAL`: undefined
//! symbols inside the library bind on first use, and its exports are not
//! promoted into the global symbol namespace. Windows has no equivalent
//! flags; `LoadLibraryExW` is called with its defaults.

use std::ffi::{c_void, CStr};
use std::fmt;

#[cfg(unix)]
use libloading::os::unix::{Library, RTLD_LAZY, RTLD_LOCAL};
#[cfg(windows)]
use libloading::os::windows::Library;

use crate::error::{LoaderError, Result};

/// Address of a resolved symbol. Zero means the symbol was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SymbolAddress(usize);

impl SymbolAddress {
    /// The "not found" address.
    pub const NULL: SymbolAddress = SymbolAddress(0);

    /// Whether the lookup found nothing.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Raw address value.
    pub fn value(self) -> usize {
        self.0
    }

    /// Address as a raw pointer.
    pub fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }

    /// Converts to `None` when the symbol was not found.
    pub fn non_null(self) -> Option<SymbolAddress> {
        (!self.is_null()).then_some(self)
    }
}

impl From<*mut c_void> for SymbolAddress {
    fn from(ptr: *mut c_void) -> Self {
        SymbolAddress(ptr as usize)
    }
}

impl fmt::Display for SymbolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for SymbolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Lifecycle state of a [`NativeModule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Handle is live and symbols can be resolved.
    Loaded,
    /// Handle has been released. Terminal.
    Unloaded,
}

/// A loaded native shared library.
///
/// Owned by exactly one caller. No reference counting is performed; wrap it
/// in a [`SharedModule`](crate::SharedModule) to share it between owners.
pub struct NativeModule {
    /// Name passed to the platform loader.
    name: String,

    /// Raw platform handle captured at load time.
    raw: usize,

    /// `None` once unloaded.
    library: Option<Library>,
}

impl NativeModule {
    /// Load a library through the platform loader.
    ///
    /// `name` is handed to the loader verbatim, so it may be a bare file
    /// name looked up on the platform search path or a full path.
    pub fn load(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(LoaderError::LoadFailure {
                name,
                message: "library name is empty".to_string(),
            });
        }

        // The loader's diagnostic is taken from the error right away;
        // the next dl* call would overwrite it.
        let library = unsafe { open_library(&name) }.map_err(|e| LoaderError::LoadFailure {
            name: name.clone(),
            message: e.to_string(),
        })?;

        let (library, raw) = split_raw(library);
        tracing::debug!("Loaded native library {} (handle {:#x})", name, raw);

        Ok(Self {
            name,
            raw,
            library: Some(library),
        })
    }

    /// Name this module was loaded with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw platform handle, or `0` once unloaded.
    pub fn handle(&self) -> usize {
        if self.library.is_some() {
            self.raw
        } else {
            0
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModuleState {
        if self.library.is_some() {
            ModuleState::Loaded
        } else {
            ModuleState::Unloaded
        }
    }

    /// Whether symbols can still be resolved.
    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }

    /// Resolve an exported symbol by name.
    ///
    /// A symbol that does not exist yields [`SymbolAddress::NULL`], not an
    /// error. The only error is [`LoaderError::UseAfterUnload`].
    pub fn resolve_symbol(&self, symbol: &str) -> Result<SymbolAddress> {
        let library = self.live_library(symbol)?;

        // An interior NUL can never name an exported symbol.
        if symbol.contains('\0') {
            return Ok(SymbolAddress::NULL);
        }

        Ok(lookup(library, &self.name, symbol, symbol.as_bytes()))
    }

    /// Resolve an exported symbol from an already NUL-terminated name.
    pub fn resolve_symbol_cstr(&self, symbol: &CStr) -> Result<SymbolAddress> {
        let display = symbol.to_string_lossy();
        let library = self.live_library(&display)?;
        Ok(lookup(library, &self.name, &display, symbol.to_bytes_with_nul()))
    }

    /// Release the library.
    ///
    /// Moves the module to [`ModuleState::Unloaded`]. Platform unload
    /// failures are logged and swallowed. Calling this again on an unloaded
    /// module does nothing.
    pub fn unload(&mut self) {
        match self.library.take() {
            Some(library) => {
                if let Err(e) = library.close() {
                    tracing::warn!("Failed to unload native library {}: {}", self.name, e);
                } else {
                    tracing::debug!("Unloaded native library {}", self.name);
                }
            }
            None => {
                tracing::warn!("Native library {} is already unloaded", self.name);
            }
        }
    }

    fn live_library(&self, symbol: &str) -> Result<&Library> {
        self.library
            .as_ref()
            .ok_or_else(|| LoaderError::UseAfterUnload {
                name: self.name.clone(),
                symbol: symbol.to_string(),
            })
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("name", &self.name)
            .field("handle", &format_args!("{:#x}", self.handle()))
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(unix)]
unsafe fn open_library(name: &str) -> std::result::Result<Library, libloading::Error> {
    Library::open(Some(name), RTLD_LAZY | RTLD_LOCAL)
}

#[cfg(windows)]
unsafe fn open_library(name: &str) -> std::result::Result<Library, libloading::Error> {
    Library::new(name)
}

/// Take the raw handle value out of a library without closing it.
fn split_raw(library: Library) -> (Library, usize) {
    let raw = library.into_raw();
    let value = raw as usize;
    (unsafe { Library::from_raw(raw) }, value)
}

fn lookup(library: &Library, name: &str, symbol: &str, bytes: &[u8]) -> SymbolAddress {
    match unsafe { library.get::<*mut c_void>(bytes) } {
        Ok(sym) => {
            let address = SymbolAddress::from(*sym);
            tracing::trace!("Resolved {} in {} at {}", symbol, name, address);
            address
        }
        Err(e) => {
            tracing::trace!("Symbol {} not found in {}: {}", symbol, name, e);
            SymbolAddress::NULL
        }
    }
}
