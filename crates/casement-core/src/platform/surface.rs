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

//! The drawing-surface collaborator contract.

use crate::error::Result;
use crate::handle::{SurfaceHandle, WindowHandle};
use crate::window::NativeWindow;

/// The rendering-context collaborator that attaches a drawing surface to each window.
///
/// Any graphics backend (OpenGL context, Vulkan surface, software blitter, etc.)
/// can implement this trait. Windows created without a provider have no surface.
pub trait SurfaceProvider {
    /// Creates the drawing surface for a freshly created window.
    fn create_surface(&mut self, window: WindowHandle, native: &NativeWindow)
        -> Result<SurfaceHandle>;

    /// Releases a surface. Called before the native window is destroyed.
    fn destroy_surface(&mut self, surface: SurfaceHandle);
}
