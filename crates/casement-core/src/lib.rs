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

//! # Casement Core
//!
//! Foundational crate containing the platform-neutral handle model, the
//! contracts every host backend implements, and the library context that
//! ties windows, monitors, cursors, input and time together.

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod cursor;
pub mod diagnostic;
pub mod error;
pub mod handle;
pub mod input;
pub mod monitor;
pub mod platform;
pub mod time;
pub mod video;
pub mod window;

pub use config::{LibraryConfig, LibraryRequest, WindowHints};
pub use context::{Library, LibraryBuilder};
pub use cursor::{CursorImage, StandardCursor};
pub use diagnostic::Diagnostic;
pub use error::{PlatformError, Result};
pub use handle::{CursorHandle, MonitorHandle, NativeHandle, SurfaceHandle, WindowHandle};
pub use input::{ElementState, Event, Key, MouseButton, RawEvent};
pub use monitor::{DisplayId, MonitorMode, NativeDisplay};
pub use video::VideoMode;
pub use window::{NativeWindow, WindowDescriptor};
