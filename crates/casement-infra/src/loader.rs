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

//! A symbol loader serving libraries registered in memory.

use casement_core::platform::{SymbolAddress, SymbolLoader};
use casement_core::{NativeHandle, PlatformError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct LoaderState {
    libraries: HashMap<String, Vec<String>>,
    open: HashMap<NativeHandle, String>,
    next: u64,
}

/// Opens libraries from a registry filled with [`InMemoryLoader::with_library`].
///
/// Clones share the same registry, so a clone kept by the caller can observe
/// which libraries the library context still holds open.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    state: Rc<RefCell<LoaderState>>,
}

impl InMemoryLoader {
    /// An empty registry: every load fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a library exporting `symbols`.
    pub fn with_library(self, name: &str, symbols: &[&str]) -> Self {
        self.state.borrow_mut().libraries.insert(
            name.to_string(),
            symbols.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// The number of libraries currently open.
    pub fn open_count(&self) -> usize {
        self.state.borrow().open.len()
    }
}

impl SymbolLoader for InMemoryLoader {
    fn load(&mut self, name: &str) -> Result<NativeHandle> {
        let mut state = self.state.borrow_mut();
        if !state.libraries.contains_key(name) {
            return Err(PlatformError::LibraryLoadFailed {
                library: name.to_string(),
                details: "library not found".to_string(),
            });
        }
        state.next += 1;
        let handle = NativeHandle(state.next);
        state.open.insert(handle, name.to_string());
        Ok(handle)
    }

    fn resolve(&self, library: NativeHandle, symbol: &str) -> Option<SymbolAddress> {
        let state = self.state.borrow();
        let name = state.open.get(&library)?;
        let index = state.libraries.get(name)?.iter().position(|s| s == symbol)?;
        Some(SymbolAddress(((library.0 as usize) << 16) | (index + 1)))
    }

    fn unload(&mut self, library: NativeHandle) {
        if self.state.borrow_mut().open.remove(&library).is_none() {
            log::warn!("Unloading unknown library {library:?}.");
        }
    }
}
