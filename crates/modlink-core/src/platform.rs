//! Platform-specific library naming.

use std::path::Path;

/// File extension of native shared libraries on this platform.
#[cfg(target_os = "windows")]
pub const LIBRARY_EXTENSION: &str = "dll";
/// File extension of native shared libraries on this platform.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub const LIBRARY_EXTENSION: &str = "dylib";
/// File extension of native shared libraries on this platform.
#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "ios")))]
pub const LIBRARY_EXTENSION: &str = "so";

/// File name prefix of native shared libraries on this platform.
#[cfg(target_os = "windows")]
pub const LIBRARY_PREFIX: &str = "";
/// File name prefix of native shared libraries on this platform.
#[cfg(not(target_os = "windows"))]
pub const LIBRARY_PREFIX: &str = "lib";

/// Map a base library name to the platform file name.
///
/// `m` becomes `libm.so`, `libm.dylib` or `m.dll`. Names that already look
/// like a library file (carry the platform extension or a versioned `.so.N`
/// suffix) or contain a path separator are returned unchanged.
pub fn map_library_name(base: &str) -> String {
    if base.contains('/') || base.contains(std::path::MAIN_SEPARATOR) || has_library_suffix(base)
    {
        return base.to_string();
    }

    format!("{}{}.{}", LIBRARY_PREFIX, base, LIBRARY_EXTENSION)
}

/// Check whether a path names a native library on this platform.
pub fn is_native_library(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(has_library_suffix)
        .unwrap_or(false)
}

/// Name of the C math library that is present on a stock system.
///
/// Unlike `libm.so`, which only exists with development packages installed,
/// these names resolve on a plain runtime install.
pub fn math_library() -> &'static str {
    if cfg!(target_os = "windows") {
        "ucrtbase.dll"
    } else if cfg!(any(target_os = "macos", target_os = "ios")) {
        "libm.dylib"
    } else if cfg!(target_os = "linux") {
        "libm.so.6"
    } else {
        "libm.so"
    }
}

fn has_library_suffix(name: &str) -> bool {
    let dotted = format!(".{}", LIBRARY_EXTENSION);
    if name.ends_with(&dotted) {
        return true;
    }

    // Versioned sonames: libfoo.so.6, libfoo.so.1.2.3
    if LIBRARY_EXTENSION == "so" {
        if let Some(pos) = name.find(".so.") {
            let version = &name[pos + 4..];
            return !version.is_empty()
                && version
                    .split('.')
                    .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        }
    }

    false
}
