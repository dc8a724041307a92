//! Errors surfaced to the host through the instance's error string.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use thiserror::Error;

use crate::ffi;

/// Why the host refused a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, Error)]
#[repr(i32)]
pub enum ParAppendError {
    #[error("invalid parameter name")]
    InvalidName = ffi::PARAMETER_APPEND_INVALID_NAME,
    #[error("invalid parameter label")]
    InvalidLabel = ffi::PARAMETER_APPEND_INVALID_LABEL,
    #[error("invalid parameter size")]
    InvalidSize = ffi::PARAMETER_APPEND_INVALID_SIZE,
    #[error("parameter name already used")]
    NameAlreadyUsed = ffi::PARAMETER_APPEND_NAME_ALREADY_USED,
}

impl ParAppendError {
    /// Interpret a raw `appendFloat` result. `Ok` on success.
    pub fn check(code: i32) -> Result<(), ParAppendResultError> {
        if code == ffi::PARAMETER_APPEND_SUCCESS {
            return Ok(());
        }
        match ParAppendError::from_i32(code) {
            Some(err) => Err(ParAppendResultError::Known(err)),
            None => Err(ParAppendResultError::Unknown(code)),
        }
    }
}

/// A failed append, including result codes this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParAppendResultError {
    #[error(transparent)]
    Known(ParAppendError),
    #[error("unrecognised append result {0}")]
    Unknown(i32),
}

#[derive(Debug, Error)]
pub enum TopError {
    #[error("parameter '{name}' could not be registered: {source}")]
    Configuration {
        name: String,
        #[source]
        source: ParAppendResultError,
    },

    #[error("render setup failed: {0:#}")]
    RenderSetup(#[source] anyhow::Error),

    #[error("render failed: {0:#}")]
    Render(#[source] anyhow::Error),

    #[error("invalid output size {width}x{height}")]
    InvalidOutputSize { width: i32, height: i32 },

    #[error("instance could not be created: {0}")]
    Allocation(String),

    #[error("unknown instance handle {0:#x}")]
    UnknownInstance(usize),

    #[error("host passed a null {0}")]
    NullHostObject(&'static str),

    #[error("panic in {callback}: {message}")]
    Panic {
        callback: &'static str,
        message: String,
    },
}

pub type Result<T, E = TopError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_code_is_ok() {
        assert_eq!(ParAppendError::check(ffi::PARAMETER_APPEND_SUCCESS), Ok(()));
    }

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(
            ParAppendError::check(ffi::PARAMETER_APPEND_NAME_ALREADY_USED),
            Err(ParAppendResultError::Known(ParAppendError::NameAlreadyUsed))
        );
        assert_eq!(
            ParAppendError::check(42),
            Err(ParAppendResultError::Unknown(42))
        );
    }

    #[test]
    fn configuration_message_names_parameter() {
        let err = TopError::Configuration {
            name: "Red".into(),
            source: ParAppendResultError::Known(ParAppendError::InvalidName),
        };
        assert_eq!(
            err.to_string(),
            "parameter 'Red' could not be registered: invalid parameter name"
        );
    }
}
