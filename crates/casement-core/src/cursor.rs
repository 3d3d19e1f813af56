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

//! Cursor images and per-cursor native state.

use crate::error::{PlatformError, Result};
use crate::handle::NativeHandle;

/// An RGBA8 cursor image with its hotspot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    hotspot: (u32, u32),
}

impl CursorImage {
    /// Creates an image from tightly packed, non-premultiplied RGBA8 pixels.
    ///
    /// # Errors
    /// Returns [`PlatformError::InvalidValue`] if the image is empty, the pixel
    /// buffer does not hold exactly `width * height` pixels, or the hotspot
    /// lies outside the image.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, hotspot: (u32, u32)) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PlatformError::InvalidValue(format!(
                "cursor image size {width}x{height} is empty"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                PlatformError::InvalidValue(format!(
                    "cursor image size {width}x{height} is too large"
                ))
            })?;
        if pixels.len() != expected {
            return Err(PlatformError::InvalidValue(format!(
                "cursor image needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        if hotspot.0 >= width || hotspot.1 >= height {
            return Err(PlatformError::InvalidValue(format!(
                "cursor hotspot {hotspot:?} outside {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            hotspot,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The RGBA8 pixel data, row by row from the top.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The hotspot in pixels from the top-left corner.
    pub fn hotspot(&self) -> (u32, u32) {
        self.hotspot
    }
}

/// The cursor shapes every host provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardCursor {
    /// The regular arrow.
    Arrow,
    /// The text input I-beam.
    IBeam,
    /// The crosshair.
    Crosshair,
    /// The pointing hand.
    Hand,
    /// The horizontal resize arrow.
    HorizontalResize,
    /// The vertical resize arrow.
    VerticalResize,
}

/// Where a cursor's image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    /// A custom image of the given size.
    Custom {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// A standard host shape.
    Standard(StandardCursor),
}

/// The per-cursor state embedded behind a [`CursorHandle`](crate::CursorHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    native: NativeHandle,
    shape: CursorShape,
}

impl CursorState {
    pub(crate) fn new(native: NativeHandle, shape: CursorShape) -> Self {
        Self { native, shape }
    }

    /// The native cursor image object.
    pub fn native(&self) -> NativeHandle {
        self.native
    }

    /// The cursor's shape.
    pub fn shape(&self) -> CursorShape {
        self.shape
    }
}
