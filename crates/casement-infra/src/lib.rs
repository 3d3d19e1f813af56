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

//! # Casement Infra
//!
//! Concrete implementations of the contracts defined in `casement-core`: the
//! headless host backend, a `winit` desktop backend behind the `winit`
//! feature, an in-memory symbol loader and a recording surface provider.

#![warn(missing_docs)]

#[cfg(feature = "headless")]
pub mod headless;
pub mod loader;
#[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
pub mod platform;
pub mod surface;

#[cfg(feature = "headless")]
pub use headless::{HeadlessBackend, HeadlessInspector};
pub use loader::InMemoryLoader;
#[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
pub use platform::window::WinitBackend;
pub use surface::RecordingSurfaceProvider;
