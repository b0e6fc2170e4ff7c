// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

include!("ffi.rs");

// Re-export libloading for error handling
pub use libloading;

use std::sync::OnceLock;

static LIBRARY: OnceLock<UvcGadgetLibrary> = OnceLock::new();

/// Default soname searched through the system library paths.
pub const DEFAULT_LIBRARY: &str = "libuvcgadget.so";

/// Initialize the bindings by loading libuvcgadget.so
///
/// This must succeed before any other libuvcgadget function is called.
/// Returns an error if the library or one of its required symbols cannot be
/// loaded. Symbols of the libcamera source are optional, see
/// [`UvcGadgetLibrary::libcamera`].
///
/// The environment variable `UVCGADGET_LIBRARY` can be used to specify a
/// custom path to the library. If not set, searches standard system paths.
pub fn init() -> Result<&'static UvcGadgetLibrary, libloading::Error> {
    if let Some(lib) = LIBRARY.get() {
        return Ok(lib);
    }

    let lib_path =
        std::env::var("UVCGADGET_LIBRARY").unwrap_or_else(|_| DEFAULT_LIBRARY.to_string());

    let lib = unsafe { UvcGadgetLibrary::new(lib_path.as_str())? };

    // A concurrent initializer may have won the race, in which case our copy
    // is dropped and theirs is returned.
    Ok(LIBRARY.get_or_init(|| lib))
}

/// Try to get a reference to the loaded library without loading it
pub fn try_library() -> Option<&'static UvcGadgetLibrary> {
    LIBRARY.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_fd_set_matches_glibc() {
        assert_eq!(size_of::<fd_set>(), FD_SETSIZE / 8);
    }

    #[test]
    fn test_missing_library_is_an_error() {
        let result = unsafe { UvcGadgetLibrary::new("/nonexistent/libuvcgadget.so") };
        assert!(result.is_err());
    }
}
