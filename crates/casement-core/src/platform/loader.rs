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

//! Dynamic native-symbol loading.

use crate::config::LibraryRequest;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{PlatformError, Result};
use crate::handle::NativeHandle;
use std::collections::HashMap;

/// The address of a resolved native symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolAddress(pub usize);

/// Opens native libraries and resolves symbols from them.
pub trait SymbolLoader {
    /// Opens the library called `name`.
    ///
    /// # Errors
    /// Returns [`PlatformError::LibraryLoadFailed`] if the library cannot be opened.
    fn load(&mut self, name: &str) -> Result<NativeHandle>;

    /// Resolves `symbol` from an opened library.
    fn resolve(&self, library: NativeHandle, symbol: &str) -> Option<SymbolAddress>;

    /// Closes a library opened by [`SymbolLoader::load`].
    fn unload(&mut self, library: NativeHandle);
}

/// The loader used when the application installs none: every load fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSymbolLoader;

impl SymbolLoader for NoSymbolLoader {
    fn load(&mut self, name: &str) -> Result<NativeHandle> {
        Err(PlatformError::LibraryLoadFailed {
            library: name.to_string(),
            details: "no symbol loader installed".to_string(),
        })
    }

    fn resolve(&self, _library: NativeHandle, _symbol: &str) -> Option<SymbolAddress> {
        None
    }

    fn unload(&mut self, _library: NativeHandle) {}
}

/// The native libraries opened at init and the symbols resolved from them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    libraries: Vec<(String, NativeHandle)>,
    symbols: HashMap<String, SymbolAddress>,
}

impl SymbolTable {
    /// Loads every request in order.
    ///
    /// Optional failures are reported to `diagnostics` and skipped. A required
    /// failure unloads everything loaded so far and returns the error.
    pub fn load(
        loader: &mut dyn SymbolLoader,
        requests: &[LibraryRequest],
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut table = Self::default();

        for request in requests {
            match table.load_one(loader, request, diagnostics) {
                Ok(()) => {}
                Err(e) if request.required => {
                    log::error!("Required native library '{}' failed: {e}", request.name);
                    table.unload_all(loader);
                    return Err(e);
                }
                Err(e) => diagnostics.report(Diagnostic::MissingLibrary {
                    library: request.name.clone(),
                    details: e.to_string(),
                }),
            }
        }

        Ok(table)
    }

    fn load_one(
        &mut self,
        loader: &mut dyn SymbolLoader,
        request: &LibraryRequest,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let library = loader.load(&request.name)?;
        let mut resolved = Vec::with_capacity(request.symbols.len());

        for symbol in &request.symbols {
            match loader.resolve(library, symbol) {
                Some(address) => resolved.push((symbol.clone(), address)),
                None if request.required => {
                    loader.unload(library);
                    return Err(PlatformError::LibraryLoadFailed {
                        library: request.name.clone(),
                        details: format!("missing symbol '{symbol}'"),
                    });
                }
                None => diagnostics.report(Diagnostic::MissingSymbol {
                    library: request.name.clone(),
                    symbol: symbol.clone(),
                }),
            }
        }

        log::debug!(
            "Loaded native library '{}' ({} symbols).",
            request.name,
            resolved.len()
        );
        for (symbol, address) in resolved {
            self.symbols.entry(symbol).or_insert(address);
        }
        self.libraries.push((request.name.clone(), library));
        Ok(())
    }

    /// Returns the address of a resolved symbol.
    pub fn get(&self, symbol: &str) -> Option<SymbolAddress> {
        self.symbols.get(symbol).copied()
    }

    /// Returns `true` if `symbol` was resolved.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Returns the number of open libraries.
    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    /// Closes every open library, most recently opened first, and forgets all symbols.
    pub fn unload_all(&mut self, loader: &mut dyn SymbolLoader) {
        self.symbols.clear();
        while let Some((name, library)) = self.libraries.pop() {
            log::debug!("Unloading native library '{name}'.");
            loader.unload(library);
        }
    }
}
