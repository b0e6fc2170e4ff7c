// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Rejected source selection or camera control value
    InvalidArgs(String),
    /// libuvcgadget missing, or built without the requested backend
    LibraryUnavailable(String),
    /// No matching UVC function in ConfigFS
    FunctionNotFound(String),
    /// Video source or UVC stream could not be set up
    SourceFailed(String),
    /// Anything else
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "{}", msg),
            CliError::LibraryUnavailable(msg) => write!(f, "Library unavailable: {}", msg),
            CliError::FunctionNotFound(msg) => write!(f, "{}", msg),
            CliError::SourceFailed(msg) => write!(f, "{}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        // Every failure is reported to the shell as 1.
        match self {
            CliError::InvalidArgs(_)
            | CliError::LibraryUnavailable(_)
            | CliError::FunctionNotFound(_)
            | CliError::SourceFailed(_)
            | CliError::General(_) => ExitCode::FAILURE,
        }
    }

    /// Errors after which the usage line is printed
    pub fn is_usage(&self) -> bool {
        matches!(self, CliError::InvalidArgs(_))
    }
}

/// Map uvcgadget::Error to CliError
impl From<uvcgadget::Error> for CliError {
    fn from(err: uvcgadget::Error) -> Self {
        use uvcgadget::Error;

        match err {
            Error::SelectionConflict { .. } | Error::Validation(_) => {
                CliError::InvalidArgs(err.to_string())
            }

            Error::LibraryNotLoaded(_) | Error::Unsupported(_) => {
                CliError::LibraryUnavailable(err.to_string())
            }

            Error::Resolution(msg) => CliError::FunctionNotFound(msg),

            Error::Creation { .. } | Error::Attachment(_) => {
                CliError::SourceFailed(err.to_string())
            }

            Error::Io(_) | Error::CString(_) | Error::InterruptArmed => {
                CliError::General(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::General(format!("JSON error: {}", err))
    }
}

/// Print the error, followed by `usage()` for command-line mistakes, and
/// convert the result to an exit code.
pub fn result_to_exit_code<T>(
    result: Result<T, CliError>,
    usage: impl FnOnce() -> String,
) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_usage() {
                eprintln!("\n{}", usage());
            }
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvcgadget::selection::{BackendKind, SourceIntent};

    #[test]
    fn test_exit_codes() {
        let errors = [
            CliError::InvalidArgs("test".into()),
            CliError::LibraryUnavailable("test".into()),
            CliError::FunctionNotFound("test".into()),
            CliError::SourceFailed("test".into()),
            CliError::General("test".into()),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), ExitCode::FAILURE);
        }
    }

    #[test]
    fn test_from_library_error() {
        let conflict: CliError = uvcgadget::Error::SelectionConflict {
            first: SourceIntent::Device,
            second: SourceIntent::Image,
        }
        .into();
        assert!(conflict.is_usage());
        assert_eq!(
            conflict.to_string(),
            "Both capture device and still image specified, please specify only one"
        );

        let creation: CliError = uvcgadget::Error::Creation {
            backend: BackendKind::HardwareCapture,
            locator: Some("/dev/video9".into()),
        }
        .into();
        assert!(!creation.is_usage());
        assert_eq!(
            creation.to_string(),
            "Failed to create V4L2 capture source from /dev/video9"
        );
    }
}
