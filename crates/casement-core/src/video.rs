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

//! Display video modes and closest-mode selection.

use std::cmp::Ordering;
use std::fmt;

/// A display resolution, colour depth and refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoMode {
    /// Width in screen coordinates.
    pub width: u32,
    /// Height in screen coordinates.
    pub height: u32,
    /// Bits of the red channel.
    pub red_bits: u8,
    /// Bits of the green channel.
    pub green_bits: u8,
    /// Bits of the blue channel.
    pub blue_bits: u8,
    /// Refresh rate in Hz. `0` in a requested mode means "any rate".
    pub refresh_rate: u32,
}

impl VideoMode {
    /// Creates a 24-bit mode of the given size and refresh rate.
    pub fn new(width: u32, height: u32, refresh_rate: u32) -> Self {
        Self {
            width,
            height,
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            refresh_rate,
        }
    }

    /// Returns the total colour depth in bits.
    pub fn bits_per_pixel(&self) -> u32 {
        self.red_bits as u32 + self.green_bits as u32 + self.blue_bits as u32
    }

    /// Orders modes by colour depth, then area, then width, then refresh rate.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.bits_per_pixel()
            .cmp(&other.bits_per_pixel())
            .then_with(|| {
                let area = self.width as u64 * self.height as u64;
                area.cmp(&(other.width as u64 * other.height as u64))
            })
            .then_with(|| self.width.cmp(&other.width))
            .then_with(|| self.refresh_rate.cmp(&other.refresh_rate))
    }
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {} Hz ({} bpp)",
            self.width,
            self.height,
            self.refresh_rate,
            self.bits_per_pixel()
        )
    }
}

/// Picks the supported mode closest to `desired`.
///
/// Colour depth difference is minimized first, then the squared size
/// difference, then the refresh rate difference. A requested refresh rate of
/// `0` prefers the highest available rate.
pub fn choose_closest(modes: &[VideoMode], desired: &VideoMode) -> Option<VideoMode> {
    modes
        .iter()
        .min_by_key(|mode| {
            let color = (mode.red_bits as i32 - desired.red_bits as i32).unsigned_abs()
                + (mode.green_bits as i32 - desired.green_bits as i32).unsigned_abs()
                + (mode.blue_bits as i32 - desired.blue_bits as i32).unsigned_abs();
            let dw = mode.width.abs_diff(desired.width) as u128;
            let dh = mode.height.abs_diff(desired.height) as u128;
            let size = dw * dw + dh * dh;
            let rate = if desired.refresh_rate != 0 {
                (mode.refresh_rate as i64 - desired.refresh_rate as i64).unsigned_abs()
            } else {
                u32::MAX as u64 - mode.refresh_rate as u64
            };
            (color, size, rate)
        })
        .copied()
}

/// Sorts modes ascending and removes duplicates.
pub fn sort_modes(modes: &mut Vec<VideoMode>) {
    modes.sort_by(VideoMode::compare);
    modes.dedup();
}
