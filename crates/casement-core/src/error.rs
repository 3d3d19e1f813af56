// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the error type shared by every platform operation.

use thiserror::Error;

/// The error returned by library, window, monitor and cursor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The library context is not initialized, or has already been terminated.
    #[error("The library is not initialized")]
    NotInitialized,

    /// A library context is already alive on this thread.
    #[error("The library is already initialized")]
    AlreadyInitialized,

    /// The host failed to allocate a native resource.
    #[error("Failed to allocate native {resource}: {details}")]
    PlatformResourceExhausted {
        /// The kind of resource that could not be allocated (e.g. `"cursor"`).
        resource: &'static str,
        /// Backend-specific details.
        details: String,
    },

    /// A video mode could not be captured or applied. The monitor is left windowed.
    #[error("Video mode switch failed on display {display}: {details}")]
    ModeSwitchFailed {
        /// The native display identifier of the monitor.
        display: u32,
        /// Backend-specific details.
        details: String,
    },

    /// The requested feature is not available on the current host.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A handle does not refer to a live object of this library.
    #[error("Invalid {kind} handle: {id}")]
    InvalidHandle {
        /// The kind of object the handle refers to.
        kind: &'static str,
        /// The raw handle value.
        id: u64,
    },

    /// A required native library or symbol could not be loaded.
    #[error("Failed to load native library '{library}': {details}")]
    LibraryLoadFailed {
        /// The library name passed to the loader.
        library: String,
        /// Loader-specific details.
        details: String,
    },

    /// An argument is out of range or malformed.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The library configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlatformError {
    /// Shorthand for a [`PlatformError::PlatformResourceExhausted`] error.
    pub fn exhausted(resource: &'static str, details: impl Into<String>) -> Self {
        Self::PlatformResourceExhausted {
            resource,
            details: details.into(),
        }
    }

    /// Shorthand for a [`PlatformError::ModeSwitchFailed`] error.
    pub fn mode_switch(display: u32, details: impl Into<String>) -> Self {
        Self::ModeSwitchFailed {
            display,
            details: details.into(),
        }
    }
}

/// A specialized `Result` type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let err = PlatformError::exhausted("cursor", "out of memory");
        assert_eq!(
            err.to_string(),
            "Failed to allocate native cursor: out of memory"
        );

        let err = PlatformError::mode_switch(3, "snapshot unavailable");
        assert!(err.to_string().contains("display 3"));
    }

    #[test]
    fn invalid_handle_names_its_kind() {
        let err = PlatformError::InvalidHandle {
            kind: "window",
            id: 7,
        };
        assert_eq!(err.to_string(), "Invalid window handle: 7");
    }
}
