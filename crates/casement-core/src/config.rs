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

//! Library configuration, loadable from RON.
//!
//! Every field has a default, so an empty document `()` is a valid configuration.

use crate::error::{PlatformError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Creation-time hints applied to every window unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowHints {
    /// Whether the user can resize the window.
    pub resizable: bool,
    /// Whether the window is shown on creation.
    pub visible: bool,
    /// Whether the window has a title bar and border.
    pub decorated: bool,
    /// Whether the window takes input focus on creation.
    pub focused: bool,
    /// Whether the window floats above other windows.
    pub floating: bool,
    /// Whether the cursor is warped to the window center when it becomes full screen.
    pub center_cursor: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            resizable: true,
            visible: true,
            decorated: true,
            focused: true,
            floating: false,
            center_cursor: true,
        }
    }
}

/// A native library the context loads at init, and the symbols it needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryRequest {
    /// The name passed to the symbol loader (e.g. a framework or shared object name).
    pub name: String,
    /// The symbols to resolve from the library.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// If `true`, failing to load the library or any of its symbols fails init.
    #[serde(default)]
    pub required: bool,
}

impl LibraryRequest {
    /// Creates an optional request for `name` resolving `symbols`.
    pub fn optional(name: impl Into<String>, symbols: &[&str]) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            required: false,
        }
    }

    /// Creates a required request for `name` resolving `symbols`.
    pub fn required(name: impl Into<String>, symbols: &[&str]) -> Self {
        Self {
            required: true,
            ..Self::optional(name, symbols)
        }
    }
}

/// Configuration consumed by [`Library`](crate::Library) at init.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Defaults applied to windows created with [`Library::create_window`](crate::Library::create_window).
    pub window_defaults: WindowHints,
    /// Whether keys the backend cannot map are reported to the diagnostic hook.
    pub report_unmapped_keys: bool,
    /// Extra native libraries to preload, in addition to the ones the backend requests.
    pub native_libraries: Vec<LibraryRequest>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            window_defaults: WindowHints::default(),
            report_unmapped_keys: true,
            native_libraries: Vec::new(),
        }
    }
}

impl LibraryConfig {
    /// Parses a configuration from a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| PlatformError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a RON configuration file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            PlatformError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_ron_str(&source)
    }
}
