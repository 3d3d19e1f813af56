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

//! Provides the contracts every host platform backend implements.
//!
//! A backend is split into capability traits, one per concern of the native
//! host: library-wide resources, the monotonic clock, windowing and the event
//! pump, displays, and cursors. [`PlatformBackend`] bundles them; the neutral
//! [`Library`](crate::Library) only ever talks to the host through it.

pub mod loader;
pub mod surface;

pub use loader::{NoSymbolLoader, SymbolAddress, SymbolLoader, SymbolTable};
pub use surface::SurfaceProvider;

use crate::config::LibraryRequest;
use crate::cursor::{CursorImage, StandardCursor};
use crate::error::Result;
use crate::handle::NativeHandle;
use crate::input::{Key, NativeKeyCode, RawEvent};
use crate::monitor::{DisplayId, NativeDisplay};
use crate::video::VideoMode;
use crate::window::{NativeWindow, WindowDescriptor};
use std::time::Duration;

/// Library-wide native resources: cleanup scope, event source, keyboard
/// layout, key translation and clipboard.
pub trait NativeLibrary {
    /// A short name for the backend, used in logs.
    fn name(&self) -> &'static str;

    /// Native libraries the backend wants loaded before it is used.
    fn required_libraries(&self) -> Vec<LibraryRequest> {
        Vec::new()
    }

    /// Hands the loaded symbols to the backend.
    fn bind_symbols(&mut self, _symbols: &SymbolTable) -> Result<()> {
        Ok(())
    }

    /// Opens the scope that owns transient native objects for the library lifetime.
    fn open_cleanup_scope(&mut self) -> Result<NativeHandle>;

    /// Closes a scope opened by [`NativeLibrary::open_cleanup_scope`].
    fn close_cleanup_scope(&mut self, scope: NativeHandle);

    /// Creates the source used to post synthetic native events.
    fn create_event_source(&mut self) -> Result<NativeHandle>;

    /// Releases the event source.
    fn release_event_source(&mut self, source: NativeHandle);

    /// Acquires a reference to the current keyboard layout, if the host exposes one.
    fn acquire_keyboard_layout(&mut self) -> Option<NativeHandle>;

    /// Releases a keyboard layout reference.
    fn release_keyboard_layout(&mut self, layout: NativeHandle);

    /// Returns the native key code for a neutral key, if the host has one.
    fn native_key_code(&self, key: Key) -> Option<NativeKeyCode>;

    /// Returns the printable name of a native key under `layout`.
    fn key_display_name(&self, layout: NativeHandle, code: NativeKeyCode) -> Option<String>;

    /// Reads the clipboard as UTF-8 text.
    fn clipboard_text(&mut self) -> Result<Option<String>>;

    /// Replaces the clipboard contents with `text`.
    fn set_clipboard_text(&mut self, text: &str) -> Result<()>;
}

/// The native monotonic counter.
pub trait NativeClock {
    /// Ticks per second. Must never change and must never be zero.
    fn timer_frequency(&self) -> u64;

    /// The current raw counter value.
    fn timer_value(&self) -> u64;
}

/// Native windows and the event pump.
pub trait NativeWindowing {
    /// Creates the native window, its event delegate and its content view.
    ///
    /// `display` is set when the window is created full screen on that display.
    fn create_window(
        &mut self,
        descriptor: &WindowDescriptor,
        display: Option<DisplayId>,
    ) -> Result<NativeWindow>;

    /// Destroys the native window, delegate and view.
    fn destroy_window(&mut self, window: &NativeWindow);

    /// Displays `cursor` over the window, or the platform default for `None`.
    fn set_window_cursor(&mut self, window: &NativeWindow, cursor: Option<NativeHandle>);

    /// Moves the pointer to `(x, y)` in window coordinates.
    fn warp_pointer(&mut self, window: &NativeWindow, x: f64, y: f64);

    /// Drains pending native events, waiting at most `timeout` for the first one.
    /// A zero timeout never blocks.
    fn pump_events(&mut self, timeout: Duration) -> Vec<RawEvent>;
}

/// Native displays and their video modes.
pub trait NativeDisplays {
    /// Enumerates the connected displays.
    fn displays(&mut self) -> Vec<NativeDisplay>;

    /// Lists the modes a display supports.
    fn display_modes(&self, display: DisplayId) -> Vec<VideoMode>;

    /// Reads the mode a display is currently using.
    fn current_display_mode(&self, display: DisplayId) -> Result<VideoMode>;

    /// Switches a display to `mode`.
    fn apply_display_mode(&mut self, display: DisplayId, mode: &VideoMode) -> Result<()>;
}

/// Native cursor images.
pub trait NativeCursors {
    /// Creates a cursor from an RGBA image.
    fn create_cursor(&mut self, image: &CursorImage) -> Result<NativeHandle>;

    /// Creates one of the host's standard cursor shapes.
    fn create_standard_cursor(&mut self, shape: StandardCursor) -> Result<NativeHandle>;

    /// Destroys a cursor. It is never displayed by any window at this point.
    fn destroy_cursor(&mut self, cursor: NativeHandle);
}

/// A complete host platform backend.
pub trait PlatformBackend:
    NativeLibrary + NativeClock + NativeWindowing + NativeDisplays + NativeCursors
{
}

// Any type implementing every capability is a backend.
impl<T> PlatformBackend for T where
    T: NativeLibrary + NativeClock + NativeWindowing + NativeDisplays + NativeCursors
{
}
