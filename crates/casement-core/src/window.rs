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

//! Window descriptors and per-window state.

use crate::config::WindowHints;
use crate::handle::{CursorHandle, MonitorHandle, NativeHandle, SurfaceHandle};

/// Describes a window to be created.
///
/// This follows the builder pattern to provide an ergonomic API for window creation.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    /// The window title.
    pub title: String,
    /// Content width in screen coordinates.
    pub width: u32,
    /// Content height in screen coordinates.
    pub height: u32,
    /// Creation hints.
    pub hints: WindowHints,
}

impl WindowDescriptor {
    /// Creates a descriptor with default hints.
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            hints: WindowHints::default(),
        }
    }

    /// Sets the creation hints.
    pub fn with_hints(mut self, hints: WindowHints) -> Self {
        self.hints = hints;
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self::new(1024, 768, "Casement")
    }
}

/// The native objects backing one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindow {
    /// The native window object.
    pub object: NativeHandle,
    /// The object receiving native window notifications.
    pub delegate: NativeHandle,
    /// The content view receiving input.
    pub view: NativeHandle,
}

/// Pointer movement the library caused itself and must hide from the application.
///
/// Warping the pointer makes the host report an ordinary motion event. Every
/// warp adds to the pending delta; the next raw motion event subtracts the
/// whole pending delta and clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WarpCompensation {
    dx: f64,
    dy: f64,
}

impl WarpCompensation {
    /// Records a warp by `(dx, dy)`.
    pub fn accumulate(&mut self, dx: f64, dy: f64) {
        self.dx += dx;
        self.dy += dy;
    }

    /// The movement still waiting to be subtracted.
    pub fn pending(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    /// Subtracts the pending delta from a raw motion and clears it.
    pub fn consume(&mut self, raw_dx: f64, raw_dy: f64) -> (f64, f64) {
        let reported = (raw_dx - self.dx, raw_dy - self.dy);
        *self = Self::default();
        reported
    }
}

/// The per-window state embedded behind a [`WindowHandle`](crate::WindowHandle).
#[derive(Debug, Clone)]
pub struct WindowState {
    pub(crate) native: NativeWindow,
    pub(crate) surface: Option<SurfaceHandle>,
    pub(crate) warp: WarpCompensation,
    pub(crate) cursor: Option<CursorHandle>,
    pub(crate) monitor: Option<MonitorHandle>,
    pub(crate) title: String,
    pub(crate) size: (u32, u32),
    pub(crate) cursor_position: (f64, f64),
    pub(crate) focused: bool,
    pub(crate) should_close: bool,
}

impl WindowState {
    pub(crate) fn new(
        native: NativeWindow,
        surface: Option<SurfaceHandle>,
        descriptor: &WindowDescriptor,
    ) -> Self {
        Self {
            native,
            surface,
            warp: WarpCompensation::default(),
            cursor: None,
            monitor: None,
            title: descriptor.title.clone(),
            size: (descriptor.width, descriptor.height),
            cursor_position: (0.0, 0.0),
            focused: descriptor.hints.focused && descriptor.hints.visible,
            should_close: false,
        }
    }

    /// The native window, delegate and view.
    pub fn native(&self) -> &NativeWindow {
        &self.native
    }

    /// The drawing surface, if a surface provider is installed.
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    /// The pending warp compensation.
    pub fn warp_delta(&self) -> (f64, f64) {
        self.warp.pending()
    }

    /// The cursor displayed over this window, `None` for the platform default.
    pub fn cursor(&self) -> Option<CursorHandle> {
        self.cursor
    }

    /// The monitor this window is full screen on.
    pub fn monitor(&self) -> Option<MonitorHandle> {
        self.monitor
    }

    /// The window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Content size in screen coordinates.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Last known cursor position in window coordinates.
    pub fn cursor_position(&self) -> (f64, f64) {
        self.cursor_position
    }

    /// Whether the window has input focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the user asked to close the window.
    pub fn should_close(&self) -> bool {
        self.should_close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warp_is_subtracted_once() {
        let mut warp = WarpCompensation::default();
        warp.accumulate(10.0, -4.0);

        assert_eq!(warp.consume(10.0, -4.0), (0.0, 0.0));
        assert_eq!(warp.pending(), (0.0, 0.0));
        assert_eq!(warp.consume(3.0, 1.0), (3.0, 1.0));
    }

    #[test]
    fn warps_accumulate_until_consumed() {
        let mut warp = WarpCompensation::default();
        warp.accumulate(5.0, 5.0);
        warp.accumulate(-2.0, 1.0);
        assert_eq!(warp.pending(), (3.0, 6.0));

        // User movement on top of the warp is preserved.
        assert_eq!(warp.consume(4.0, 6.5), (1.0, 0.5));
    }

    #[test]
    fn descriptor_builder_sets_fields() {
        let hints = WindowHints {
            resizable: false,
            ..WindowHints::default()
        };
        let descriptor = WindowDescriptor::new(800, 600, "t")
            .with_title("main")
            .with_hints(hints);

        assert_eq!(descriptor.title, "main");
        assert_eq!((descriptor.width, descriptor.height), (800, 600));
        assert!(!descriptor.hints.resizable);
    }
}
