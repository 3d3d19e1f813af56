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

//! The raw events backends report and the neutral events applications consume.

use super::keys::{Key, NativeKeyCode};
use crate::handle::{NativeHandle, WindowHandle};

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// The back mouse button (typically on the side).
    Back,
    /// The forward mouse button (typically on the side).
    Forward,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// Whether a key or button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// The key or button was pressed.
    Pressed,
    /// The key or button was released.
    Released,
}

/// An event as reported by a backend's native event pump.
///
/// Windows are identified by the native object handle the backend returned
/// from window creation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// The pointer moved. `dx`/`dy` is the raw movement as the host reports it,
    /// which includes movement caused by the library warping the pointer.
    PointerMotion {
        /// The native window object.
        window: NativeHandle,
        /// New pointer position in window coordinates.
        x: f64,
        /// New pointer position in window coordinates.
        y: f64,
        /// Raw horizontal movement.
        dx: f64,
        /// Raw vertical movement.
        dy: f64,
    },
    /// A key changed state.
    Key {
        /// The native window object.
        window: NativeHandle,
        /// The native key code.
        code: NativeKeyCode,
        /// The new key state.
        state: ElementState,
        /// Whether this is an auto-repeat press.
        repeat: bool,
    },
    /// A mouse button changed state.
    MouseButton {
        /// The native window object.
        window: NativeHandle,
        /// The button.
        button: MouseButton,
        /// The new button state.
        state: ElementState,
    },
    /// The scroll wheel or touchpad scrolled.
    Scroll {
        /// The native window object.
        window: NativeHandle,
        /// Horizontal scroll delta.
        dx: f64,
        /// Vertical scroll delta.
        dy: f64,
    },
    /// The user asked to close the window.
    CloseRequested {
        /// The native window object.
        window: NativeHandle,
    },
    /// The window content area was resized.
    Resized {
        /// The native window object.
        window: NativeHandle,
        /// New width in screen coordinates.
        width: u32,
        /// New height in screen coordinates.
        height: u32,
    },
    /// The window gained or lost input focus.
    Focused {
        /// The native window object.
        window: NativeHandle,
        /// Whether the window now has focus.
        focused: bool,
    },
    /// The display configuration changed (a display was connected or removed).
    DisplaysChanged,
}

/// A normalized event delivered to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The cursor moved. `dx`/`dy` excludes movement caused by cursor warps.
    CursorMoved {
        /// The window the cursor moved in.
        window: WindowHandle,
        /// New cursor position in window coordinates.
        x: f64,
        /// New cursor position in window coordinates.
        y: f64,
        /// Horizontal movement reported to the application.
        dx: f64,
        /// Vertical movement reported to the application.
        dy: f64,
    },
    /// A key changed state.
    Key {
        /// The focused window.
        window: WindowHandle,
        /// The neutral key, or `None` if the native code is unmapped.
        key: Option<Key>,
        /// The native key code.
        scancode: NativeKeyCode,
        /// The new key state.
        state: ElementState,
        /// Whether this is an auto-repeat press.
        repeat: bool,
    },
    /// A mouse button changed state.
    MouseButton {
        /// The window under the cursor.
        window: WindowHandle,
        /// The button.
        button: MouseButton,
        /// The new button state.
        state: ElementState,
    },
    /// The scroll wheel or touchpad scrolled.
    Scroll {
        /// The window under the cursor.
        window: WindowHandle,
        /// Horizontal scroll delta.
        dx: f64,
        /// Vertical scroll delta.
        dy: f64,
    },
    /// The user asked to close the window.
    CloseRequested {
        /// The window.
        window: WindowHandle,
    },
    /// The window content area was resized.
    Resized {
        /// The window.
        window: WindowHandle,
        /// New width in screen coordinates.
        width: u32,
        /// New height in screen coordinates.
        height: u32,
    },
    /// The window gained or lost input focus.
    Focused {
        /// The window.
        window: WindowHandle,
        /// Whether the window now has focus.
        focused: bool,
    },
    /// The set of connected monitors changed.
    MonitorsChanged,
}

/// The neutral event queue filled by the event pump.
///
/// Backed by an unbounded channel so the pump and the consumer never block on
/// each other.
#[derive(Debug)]
pub struct EventQueue {
    sender: flume::Sender<Event>,
    receiver: flume::Receiver<Event>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Appends an event to the queue.
    pub fn publish(&self, event: Event) {
        log::trace!("Queueing event: {event:?}");

        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to queue event: {e}. Receiver likely disconnected.");
        }
    }

    /// Removes and returns the oldest queued event, if any.
    pub fn next(&self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of queued events.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
