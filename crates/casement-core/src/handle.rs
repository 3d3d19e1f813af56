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

//! Neutral handles the application programs against, and the opaque native
//! handles the backends hand back.

use std::fmt;

macro_rules! neutral_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// The kind of object this handle refers to, used in error messages.
            pub const KIND: &'static str = $kind;

            /// Returns the raw identifier of the handle.
            pub fn id(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $kind, self.0)
            }
        }
    };
}

neutral_handle!(
    /// Identifies a window created by the library.
    WindowHandle,
    "window"
);
neutral_handle!(
    /// Identifies a physical display known to the library.
    MonitorHandle,
    "monitor"
);
neutral_handle!(
    /// Identifies a cursor image created by the library.
    CursorHandle,
    "cursor"
);

/// Hands out monotonically increasing neutral handle ids.
///
/// Ids are never reused during the lifetime of a library context, so a stale
/// handle can never alias a newer object.
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub(crate) fn window(&mut self) -> WindowHandle {
        WindowHandle(self.bump())
    }

    pub(crate) fn monitor(&mut self) -> MonitorHandle {
        MonitorHandle(self.bump())
    }

    pub(crate) fn cursor(&mut self) -> CursorHandle {
        CursorHandle(self.bump())
    }
}

/// An opaque reference to a native object owned by a backend.
///
/// The neutral layer never interprets the value; it only stores it and hands
/// it back to the backend that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

/// An opaque drawing-surface handle produced by a [`SurfaceProvider`](crate::platform::SurfaceProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);
