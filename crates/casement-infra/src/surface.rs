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

//! A surface provider that records the surfaces it hands out.

use casement_core::platform::SurfaceProvider;
use casement_core::{NativeWindow, PlatformError, Result, SurfaceHandle, WindowHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SurfaceLedger {
    live: HashMap<SurfaceHandle, WindowHandle>,
    next: u64,
    failing: bool,
}

/// Creates placeholder surfaces and keeps track of which are still live.
///
/// Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurfaceProvider {
    ledger: Rc<RefCell<SurfaceLedger>>,
}

impl RecordingSurfaceProvider {
    /// A provider with no live surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following surface creation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.ledger.borrow_mut().failing = failing;
    }

    /// The number of live surfaces.
    pub fn live_count(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    /// The live surface attached to `window`.
    pub fn surface_for(&self, window: WindowHandle) -> Option<SurfaceHandle> {
        self.ledger
            .borrow()
            .live
            .iter()
            .find(|(_, w)| **w == window)
            .map(|(s, _)| *s)
    }
}

impl SurfaceProvider for RecordingSurfaceProvider {
    fn create_surface(
        &mut self,
        window: WindowHandle,
        native: &NativeWindow,
    ) -> Result<SurfaceHandle> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.failing {
            return Err(PlatformError::exhausted(
                "surface",
                format!("no surface for view {:?}", native.view),
            ));
        }
        ledger.next += 1;
        let surface = SurfaceHandle(ledger.next);
        ledger.live.insert(surface, window);
        Ok(surface)
    }

    fn destroy_surface(&mut self, surface: SurfaceHandle) {
        if self.ledger.borrow_mut().live.remove(&surface).is_none() {
            log::warn!("Destroying unknown surface {surface:?}.");
        }
    }
}
