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

//! Recoverable anomalies reported during library operation.

use crate::input::Key;
use std::fmt;

/// A recoverable condition worth surfacing to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The backend has no native code for a neutral key; the key is unmapped.
    UnmappedKey(Key),
    /// An optional native library could not be loaded.
    MissingLibrary {
        /// The library name.
        library: String,
        /// Loader-specific details.
        details: String,
    },
    /// An optional native symbol could not be resolved.
    MissingSymbol {
        /// The library the symbol was looked up in.
        library: String,
        /// The symbol name.
        symbol: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmappedKey(key) => {
                write!(f, "Key '{}' has no native mapping", key.name())
            }
            Diagnostic::MissingLibrary { library, details } => {
                write!(f, "Optional library '{library}' unavailable: {details}")
            }
            Diagnostic::MissingSymbol { library, symbol } => {
                write!(f, "Optional symbol '{symbol}' missing from '{library}'")
            }
        }
    }
}

/// A callback receiving every [`Diagnostic`].
pub type DiagnosticHook = Box<dyn FnMut(&Diagnostic)>;

/// Routes diagnostics to the log and to the optional application hook.
#[derive(Default)]
pub struct Diagnostics {
    hook: Option<DiagnosticHook>,
}

impl Diagnostics {
    /// Creates a sink forwarding to `hook`, if any.
    pub fn new(hook: Option<DiagnosticHook>) -> Self {
        Self { hook }
    }

    /// Logs `diagnostic` and forwards it to the hook.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::UnmappedKey(_) => log::debug!("{diagnostic}"),
            _ => log::warn!("{diagnostic}"),
        }
        if let Some(hook) = self.hook.as_mut() {
            hook(&diagnostic);
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn report_forwards_to_hook() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut diagnostics =
            Diagnostics::new(Some(Box::new(move |d: &Diagnostic| sink.borrow_mut().push(d.clone()))));

        diagnostics.report(Diagnostic::UnmappedKey(Key::F25));

        assert_eq!(*seen.borrow(), vec![Diagnostic::UnmappedKey(Key::F25)]);
    }

    #[test]
    fn report_without_hook_is_silent() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.report(Diagnostic::MissingSymbol {
            library: "Carbon".into(),
            symbol: "TISGetInputSourceProperty".into(),
        });
    }

    #[test]
    fn display_names_the_key() {
        assert_eq!(
            Diagnostic::UnmappedKey(Key::PrintScreen).to_string(),
            "Key 'print screen' has no native mapping"
        );
    }
}
