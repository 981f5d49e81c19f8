use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[cfg(feature = "service")]
use notify::{Error as NotifyError, ErrorKind as NotifyErrorKind};

#[cfg(feature = "wasm")]
use serde_wasm_bindgen::Error as WasmError;

/// Errors raised at the fallible edges of the crate: settings storage, file-backed
/// document sources, the watch service and the host adapters.
///
/// The annotation core itself (parsing, sorting, filtering, view-state transitions and
/// render plans) is total and never produces one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum MarginaliaError {
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Watch service error: {0}")]
    Watch(String),
}

impl From<toml::de::Error> for MarginaliaError {
    fn from(src: toml::de::Error) -> MarginaliaError {
        MarginaliaError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for MarginaliaError {
    fn from(src: toml::ser::Error) -> MarginaliaError {
        MarginaliaError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for MarginaliaError {
    fn from(src: JsonError) -> MarginaliaError {
        MarginaliaError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for MarginaliaError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MarginaliaError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => MarginaliaError::PermissionDenied,
            _ => MarginaliaError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for MarginaliaError {
    fn from(x: fmt::Error) -> Self {
        MarginaliaError::Custom(format!("{x}"))
    }
}

#[cfg(feature = "wasm")]
impl From<WasmError> for MarginaliaError {
    fn from(wasm_error: WasmError) -> Self {
        MarginaliaError::Serialization(format!("Serde-wasm-bindgen error: {wasm_error}"))
    }
}

#[cfg(feature = "service")]
impl From<NotifyError> for MarginaliaError {
    fn from(notify_error: NotifyError) -> Self {
        match notify_error.kind {
            NotifyErrorKind::Generic(msg) => MarginaliaError::Watch(format!(
                "notify: {}, paths: {:?}",
                msg, notify_error.paths
            )),
            NotifyErrorKind::Io(io_error) => MarginaliaError::Watch(format!(
                "notify: io error {}, paths: {:?}",
                io_error.kind(),
                notify_error.paths
            )),
            NotifyErrorKind::PathNotFound => MarginaliaError::NotFound(format!(
                "notify: path(s) not found: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::WatchNotFound => MarginaliaError::NotFound(format!(
                "notify: watch not found, paths: {:?}",
                notify_error.paths
            )),
            NotifyErrorKind::InvalidConfig(_) => {
                MarginaliaError::Watch("notify invalid config".to_string())
            }
            NotifyErrorKind::MaxFilesWatch => {
                MarginaliaError::Watch("notify max file watch limit reached".to_string())
            }
        }
    }
}
