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

//! A headless implementation of every platform capability.
//!
//! [`HeadlessBackend`] simulates a desktop host in memory: it hands out native
//! handles, tracks which ones are live, keeps a list of displays with their
//! modes, and queues events for the pump. A [`HeadlessInspector`] taken from the
//! backend keeps access to that state after the backend is moved into a
//! [`Library`](casement_core::Library), which lets tests inject input and
//! verify that every native object was released.

mod host;
pub mod keymap;

pub use host::{
    FailPoint, HeadlessClock, HeadlessDisplay, HeadlessInspector, HeadlessWindow, ResourceKind,
};

use crate::loader::InMemoryLoader;
use casement_core::config::LibraryRequest;
use casement_core::cursor::{CursorImage, StandardCursor};
use casement_core::input::{Key, NativeKeyCode, RawEvent};
use casement_core::monitor::{DisplayId, NativeDisplay};
use casement_core::platform::{
    NativeClock, NativeCursors, NativeDisplays, NativeLibrary, NativeWindowing, SymbolTable,
};
use casement_core::{NativeHandle, NativeWindow, PlatformError, Result, VideoMode, WindowDescriptor};
use host::HeadlessHost;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// The native library providing keyboard layout services on the headless host.
pub const LAYOUT_LIBRARY: &str = "HeadlessLayout";

/// The symbols the backend resolves from [`LAYOUT_LIBRARY`].
pub const LAYOUT_SYMBOLS: [&str; 2] = ["layout_copy_current", "layout_translate_key"];

/// An in-memory desktop host.
#[derive(Debug)]
pub struct HeadlessBackend {
    host: Rc<RefCell<HeadlessHost>>,
}

impl HeadlessBackend {
    /// A host with one primary display and a manual clock running at 1 MHz.
    pub fn new() -> Self {
        Self {
            host: Rc::new(RefCell::new(HeadlessHost::new())),
        }
    }

    /// Replaces the host clock.
    pub fn with_clock(self, clock: HeadlessClock) -> Self {
        self.host.borrow_mut().clock = clock;
        self
    }

    /// Replaces every display with `displays`.
    pub fn with_displays(self, displays: Vec<HeadlessDisplay>) -> Self {
        self.host.borrow_mut().displays = displays;
        self
    }

    /// Whether warping the pointer makes the host report a motion event, as
    /// desktop hosts do. Enabled by default.
    pub fn with_synthetic_warp_motion(self, enabled: bool) -> Self {
        self.host.borrow_mut().synthetic_warp_motion = enabled;
        self
    }

    /// An inspector sharing this host's state.
    pub fn inspector(&self) -> HeadlessInspector {
        HeadlessInspector {
            host: Rc::clone(&self.host),
        }
    }

    /// A symbol loader that can open [`LAYOUT_LIBRARY`].
    pub fn symbol_loader() -> InMemoryLoader {
        InMemoryLoader::new().with_library(LAYOUT_LIBRARY, &LAYOUT_SYMBOLS)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeLibrary for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn required_libraries(&self) -> Vec<LibraryRequest> {
        vec![LibraryRequest::optional(LAYOUT_LIBRARY, &LAYOUT_SYMBOLS)]
    }

    fn bind_symbols(&mut self, symbols: &SymbolTable) -> Result<()> {
        let bound = LAYOUT_SYMBOLS.iter().all(|s| symbols.contains(s));
        if !bound {
            log::debug!("Headless host: layout services unavailable.");
        }
        self.host.borrow_mut().layout_symbols_bound = bound;
        Ok(())
    }

    fn open_cleanup_scope(&mut self) -> Result<NativeHandle> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::CleanupScope) {
            return Err(PlatformError::exhausted("cleanup scope", "host refused the scope"));
        }
        Ok(host.allocate(ResourceKind::CleanupScope))
    }

    fn close_cleanup_scope(&mut self, scope: NativeHandle) {
        self.host
            .borrow_mut()
            .release(ResourceKind::CleanupScope, scope);
    }

    fn create_event_source(&mut self) -> Result<NativeHandle> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::EventSource) {
            return Err(PlatformError::exhausted("event source", "host refused the source"));
        }
        Ok(host.allocate(ResourceKind::EventSource))
    }

    fn release_event_source(&mut self, source: NativeHandle) {
        self.host
            .borrow_mut()
            .release(ResourceKind::EventSource, source);
    }

    fn acquire_keyboard_layout(&mut self) -> Option<NativeHandle> {
        let mut host = self.host.borrow_mut();
        if !host.layout_symbols_bound {
            return None;
        }
        Some(host.allocate(ResourceKind::KeyboardLayout))
    }

    fn release_keyboard_layout(&mut self, layout: NativeHandle) {
        self.host
            .borrow_mut()
            .release(ResourceKind::KeyboardLayout, layout);
    }

    fn native_key_code(&self, key: Key) -> Option<NativeKeyCode> {
        keymap::native_code(key)
    }

    fn key_display_name(&self, layout: NativeHandle, code: NativeKeyCode) -> Option<String> {
        if !self.host.borrow().is_live(ResourceKind::KeyboardLayout, layout) {
            log::warn!("Headless host: key name requested with a stale layout.");
            return None;
        }
        keymap::us_layout_char(code).map(String::from)
    }

    fn clipboard_text(&mut self) -> Result<Option<String>> {
        let host = self.host.borrow();
        if host.should_fail(FailPoint::Clipboard) {
            return Err(PlatformError::UnsupportedOperation(
                "clipboard is unavailable".into(),
            ));
        }
        Ok(host.clipboard.clone())
    }

    fn set_clipboard_text(&mut self, text: &str) -> Result<()> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::Clipboard) {
            return Err(PlatformError::UnsupportedOperation(
                "clipboard is unavailable".into(),
            ));
        }
        host.clipboard = Some(text.to_string());
        Ok(())
    }
}

impl NativeClock for HeadlessBackend {
    fn timer_frequency(&self) -> u64 {
        self.host.borrow().frequency()
    }

    fn timer_value(&self) -> u64 {
        self.host.borrow().ticks()
    }
}

impl NativeWindowing for HeadlessBackend {
    fn create_window(
        &mut self,
        descriptor: &WindowDescriptor,
        display: Option<DisplayId>,
    ) -> Result<NativeWindow> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::WindowAllocation) {
            return Err(PlatformError::exhausted("window", "host refused the window"));
        }
        if let Some(id) = display {
            if host.display(id).is_none() {
                return Err(PlatformError::UnsupportedOperation(format!(
                    "display {} is not connected",
                    id.0
                )));
            }
        }

        let native = NativeWindow {
            object: host.allocate(ResourceKind::Window),
            delegate: host.allocate(ResourceKind::Delegate),
            view: host.allocate(ResourceKind::View),
        };
        host.windows.insert(
            native.object,
            HeadlessWindow {
                delegate: native.delegate,
                view: native.view,
                title: descriptor.title.clone(),
                size: (descriptor.width, descriptor.height),
                cursor: None,
                pointer: (0.0, 0.0),
                display,
            },
        );
        log::debug!("Headless host: window {:?} allocated.", native.object);
        Ok(native)
    }

    fn destroy_window(&mut self, window: &NativeWindow) {
        let mut host = self.host.borrow_mut();
        host.windows.remove(&window.object);
        host.pending.retain(|event| !targets(event, window.object));
        host.release(ResourceKind::View, window.view);
        host.release(ResourceKind::Delegate, window.delegate);
        host.release(ResourceKind::Window, window.object);
    }

    fn set_window_cursor(&mut self, window: &NativeWindow, cursor: Option<NativeHandle>) {
        let mut host = self.host.borrow_mut();
        if let Some(c) = cursor {
            if !host.is_live(ResourceKind::Cursor, c) {
                log::warn!("Headless host: displaying unknown cursor {c:?}.");
            }
        }
        if let Some(state) = host.windows.get_mut(&window.object) {
            state.cursor = cursor;
        }
    }

    fn warp_pointer(&mut self, window: &NativeWindow, x: f64, y: f64) {
        let mut guard = self.host.borrow_mut();
        let host = &mut *guard;
        host.warps.push((window.object, x, y));
        let synthetic = host.synthetic_warp_motion;
        let Some(state) = host.windows.get_mut(&window.object) else {
            return;
        };
        let (dx, dy) = (x - state.pointer.0, y - state.pointer.1);
        state.pointer = (x, y);
        if synthetic {
            host.pending.push_back(RawEvent::PointerMotion {
                window: window.object,
                x,
                y,
                dx,
                dy,
            });
        }
    }

    fn pump_events(&mut self, timeout: Duration) -> Vec<RawEvent> {
        let mut host = self.host.borrow_mut();
        if host.pending.is_empty() && !timeout.is_zero() {
            let clock = host.clock;
            match clock {
                HeadlessClock::Manual { frequency } => {
                    let ticks = timeout.as_nanos() * u128::from(frequency) / 1_000_000_000;
                    host.manual_ticks = host
                        .manual_ticks
                        .saturating_add(u64::try_from(ticks).unwrap_or(u64::MAX));
                }
                HeadlessClock::Monotonic => {
                    drop(host);
                    std::thread::sleep(timeout);
                    host = self.host.borrow_mut();
                }
            }
        }
        let events = host.pending.drain(..).collect();
        events
    }
}

fn targets(event: &RawEvent, object: NativeHandle) -> bool {
    match event {
        RawEvent::PointerMotion { window, .. }
        | RawEvent::Key { window, .. }
        | RawEvent::MouseButton { window, .. }
        | RawEvent::Scroll { window, .. }
        | RawEvent::CloseRequested { window }
        | RawEvent::Resized { window, .. }
        | RawEvent::Focused { window, .. } => *window == object,
        RawEvent::DisplaysChanged => false,
    }
}

impl NativeDisplays for HeadlessBackend {
    fn displays(&mut self) -> Vec<NativeDisplay> {
        self.host
            .borrow()
            .displays
            .iter()
            .map(|d| d.info.clone())
            .collect()
    }

    fn display_modes(&self, display: DisplayId) -> Vec<VideoMode> {
        self.host
            .borrow()
            .display(display)
            .map(|d| d.modes.clone())
            .unwrap_or_default()
    }

    fn current_display_mode(&self, display: DisplayId) -> Result<VideoMode> {
        let host = self.host.borrow();
        if host.should_fail(FailPoint::ModeSnapshot) {
            return Err(PlatformError::mode_switch(display.0, "cannot read the current mode"));
        }
        host.display(display)
            .map(|d| d.current)
            .ok_or_else(|| PlatformError::mode_switch(display.0, "display is not connected"))
    }

    fn apply_display_mode(&mut self, display: DisplayId, mode: &VideoMode) -> Result<()> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::ModeApply) {
            return Err(PlatformError::mode_switch(display.0, "host rejected the mode"));
        }
        let state = host
            .display_mut(display)
            .ok_or_else(|| PlatformError::mode_switch(display.0, "display is not connected"))?;
        if !state.modes.contains(mode) {
            return Err(PlatformError::mode_switch(
                display.0,
                format!("unsupported mode {mode}"),
            ));
        }
        state.current = *mode;
        log::debug!("Headless host: display {} switched to {mode}.", display.0);
        Ok(())
    }
}

impl NativeCursors for HeadlessBackend {
    fn create_cursor(&mut self, image: &CursorImage) -> Result<NativeHandle> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::CursorAllocation) {
            return Err(PlatformError::exhausted(
                "cursor",
                format!("cannot allocate a {}x{} cursor", image.width(), image.height()),
            ));
        }
        Ok(host.allocate(ResourceKind::Cursor))
    }

    fn create_standard_cursor(&mut self, shape: StandardCursor) -> Result<NativeHandle> {
        let mut host = self.host.borrow_mut();
        if host.should_fail(FailPoint::CursorAllocation) {
            return Err(PlatformError::exhausted(
                "cursor",
                format!("cannot allocate the {shape:?} cursor"),
            ));
        }
        Ok(host.allocate(ResourceKind::Cursor))
    }

    fn destroy_cursor(&mut self, cursor: NativeHandle) {
        let mut host = self.host.borrow_mut();
        if host.windows.values().any(|w| w.cursor == Some(cursor)) {
            log::error!("Headless host: cursor {cursor:?} destroyed while displayed.");
            host.dangling_cursor_destroys += 1;
        }
        host.release(ResourceKind::Cursor, cursor);
    }
}
