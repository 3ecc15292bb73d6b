//! Dynamic native module loading for modlink.
//!
//! This crate provides a uniform load/resolve/unload contract over the
//! platform's dynamic linker (`dlopen`/`dlsym`/`dlclose` on Unix,
//! `LoadLibraryExW`/`GetProcAddress`/`FreeLibrary` on Windows).
//!
//! ## Example
//!
//! ```no_run
//! use modlink_core::{platform, NativeModule};
//!
//! let mut libm = NativeModule::load(platform::math_library())?;
//! let cos = libm.resolve_symbol("cos")?;
//! assert!(!cos.is_null());
//! libm.unload();
//! # Ok::<(), modlink_core::LoaderError>(())
//! ```
//!
//! - [`NativeModule`]: single-owner handle to one loaded library
//! - [`SharedModule`]: reference-counted owner for shared access
//! - [`LibraryResolver`]: tries aliases and search directories in order
//! - [`LoaderConfig`]: resolver settings from TOML and environment

pub mod config;
pub mod error;
pub mod module;
pub mod platform;
pub mod resolver;
pub mod shared;

pub use config::LoaderConfig;
pub use error::{LoaderError, Result};
pub use module::{ModuleState, NativeModule, SymbolAddress};
pub use resolver::LibraryResolver;
pub use shared::SharedModule;
