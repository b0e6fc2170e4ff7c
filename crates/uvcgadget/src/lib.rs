// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! UVC Gadget video sources for Rust
//!
//! This crate selects, configures and drives one video source feeding a USB
//! Video Class gadget function through libuvcgadget. The available sources
//! are a V4L2 capture device, a libcamera camera, a still MJPEG image, a
//! directory of images cycled as a slideshow, and a synthetic test pattern.
//!
//! # Quick Start
//!
//! ```no_run
//! use uvcgadget::session::{Gadget, Options, Orchestrator};
//!
//! let mut options = Options::default();
//! options.sources.camera = Some("0".into());
//! options.controls.awb = Some("daylight".into());
//!
//! // Blocks until SIGINT or SIGTERM, then tears everything down.
//! Orchestrator::new(Gadget::new()).run(&options)?;
//! # Ok::<(), uvcgadget::Error>(())
//! ```
//!
//! # Layers
//!
//! - [`controls`] validates camera tuning options into a [`controls::ControlSet`]
//! - [`selection`] picks exactly one [`selection::Backend`]
//! - [`source`] defines the capability contract every backend satisfies
//! - [`session`] composes everything and owns teardown order
//! - [`function`], [`events`] and [`stream`] wrap the libuvcgadget
//!   collaborators

use std::{
    error,
    ffi::NulError,
    fmt, io,
};
use uvcgadget_sys as ffi;

use crate::controls::ValidationError;
use crate::selection::{BackendKind, SourceIntent};

/// Error type for UVC gadget operations
#[derive(Debug)]
pub enum Error {
    /// libuvcgadget.so could not be loaded at runtime
    LibraryNotLoaded(ffi::libloading::Error),

    /// I/O error from underlying system calls
    Io(io::Error),

    /// CString creation error (null byte found in string)
    CString(NulError),

    /// Two source intents that may not be combined were both given
    SelectionConflict {
        first: SourceIntent,
        second: SourceIntent,
    },

    /// A camera control value was rejected
    Validation(ValidationError),

    /// The gadget function configuration could not be resolved
    Resolution(String),

    /// The selected backend failed to instantiate
    Creation {
        backend: BackendKind,
        locator: Option<String>,
    },

    /// The UVC stream could not be created or bound to the source
    Attachment(String),

    /// The requested operation is not available for this backend or build
    Unsupported(String),

    /// The process-wide interrupt target was already installed
    InterruptArmed,
}

impl Error {
    /// True for errors caused by the command line rather than the system,
    /// after which usage help should be shown.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::SelectionConflict { .. } | Error::Validation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::LibraryNotLoaded(err) => {
                write!(f, "libuvcgadget could not be loaded: {}", err)
            }
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::CString(err) => write!(f, "CString creation error: {}", err),
            Error::SelectionConflict { first, second } => write!(
                f,
                "Both {} and {} specified, please specify only one",
                first, second
            ),
            Error::Validation(err) => write!(f, "{}", err),
            Error::Resolution(msg) => write!(f, "{}", msg),
            Error::Creation {
                backend,
                locator: Some(locator),
            } => write!(f, "Failed to create {} source from {}", backend, locator),
            Error::Creation {
                backend,
                locator: None,
            } => write!(f, "Failed to create {} source", backend),
            Error::Attachment(msg) => write!(f, "Failed to attach UVC stream: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::InterruptArmed => write!(f, "Interrupt handler already armed"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::LibraryNotLoaded(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::CString(err) => Some(err),
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ffi::libloading::Error> for Error {
    fn from(err: ffi::libloading::Error) -> Self {
        Error::LibraryNotLoaded(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<NulError> for Error {
    fn from(err: NulError) -> Self {
        Error::CString(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

/// Helper macro for modules to get the library reference and call functions
/// All functions must return Result<T, Error> to use this macro
#[macro_export]
macro_rules! uvc {
    ($fn_name:ident($($args:expr),*)) => {
        {
            #[allow(clippy::macro_metavars_in_unsafe)]
            let result = {
                let lib = uvcgadget_sys::init()?;
                unsafe { lib.$fn_name($($args),*) }
            };
            result
        }
    };
}

/// The controls module validates camera-pipeline tuning options.
pub mod controls;

/// The selection module decides which single backend runs.
pub mod selection;

/// The source module provides the video source capability contract.
pub mod source;

/// The function module resolves the UVC gadget function configuration.
pub mod function;

/// The events module wraps the libuvcgadget event loop.
pub mod events;

/// The stream module binds a video source to the UVC function.
pub mod stream;

/// The interrupt module routes SIGINT/SIGTERM to the running event loop.
pub mod interrupt;

/// The session module composes selection, validation and the collaborators.
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{parse_mode, AwbMode};

    #[test]
    fn test_usage_errors() {
        let conflict = Error::SelectionConflict {
            first: SourceIntent::Device,
            second: SourceIntent::Image,
        };
        assert!(conflict.is_usage());
        assert_eq!(
            conflict.to_string(),
            "Both capture device and still image specified, please specify only one"
        );

        let invalid: Error = parse_mode::<AwbMode>("sunny").unwrap_err().into();
        assert!(invalid.is_usage());
        assert!(error::Error::source(&invalid).is_some());

        let creation = Error::Creation {
            backend: BackendKind::StaticImage,
            locator: Some("/tmp/missing.jpg".into()),
        };
        assert!(!creation.is_usage());
        assert_eq!(
            creation.to_string(),
            "Failed to create static image source from /tmp/missing.jpg"
        );
    }
}
