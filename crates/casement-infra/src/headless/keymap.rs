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

//! The headless host's virtual key codes and its US keyboard layout.
//!
//! Codes follow the ANSI virtual key code layout of desktop keyboards.
//! `PrintScreen`, `ScrollLock`, `Pause`, `World2` and `F21`..`F25` have no
//! code on this host and stay unmapped.

use casement_core::input::{Key, NativeKeyCode};

const KEYMAP: &[(Key, NativeKeyCode)] = &[
    (Key::Digit0, 0x1D),
    (Key::Digit1, 0x12),
    (Key::Digit2, 0x13),
    (Key::Digit3, 0x14),
    (Key::Digit4, 0x15),
    (Key::Digit5, 0x17),
    (Key::Digit6, 0x16),
    (Key::Digit7, 0x1A),
    (Key::Digit8, 0x1C),
    (Key::Digit9, 0x19),
    (Key::A, 0x00),
    (Key::B, 0x0B),
    (Key::C, 0x08),
    (Key::D, 0x02),
    (Key::E, 0x0E),
    (Key::F, 0x03),
    (Key::G, 0x05),
    (Key::H, 0x04),
    (Key::I, 0x22),
    (Key::J, 0x26),
    (Key::K, 0x28),
    (Key::L, 0x25),
    (Key::M, 0x2E),
    (Key::N, 0x2D),
    (Key::O, 0x1F),
    (Key::P, 0x23),
    (Key::Q, 0x0C),
    (Key::R, 0x0F),
    (Key::S, 0x01),
    (Key::T, 0x11),
    (Key::U, 0x20),
    (Key::V, 0x09),
    (Key::W, 0x0D),
    (Key::X, 0x07),
    (Key::Y, 0x10),
    (Key::Z, 0x06),
    (Key::Apostrophe, 0x27),
    (Key::Backslash, 0x2A),
    (Key::Comma, 0x2B),
    (Key::Equal, 0x18),
    (Key::GraveAccent, 0x32),
    (Key::LeftBracket, 0x21),
    (Key::Minus, 0x1B),
    (Key::Period, 0x2F),
    (Key::RightBracket, 0x1E),
    (Key::Semicolon, 0x29),
    (Key::Slash, 0x2C),
    (Key::World1, 0x0A),
    (Key::Backspace, 0x33),
    (Key::CapsLock, 0x39),
    (Key::Delete, 0x75),
    (Key::Down, 0x7D),
    (Key::End, 0x77),
    (Key::Enter, 0x24),
    (Key::Escape, 0x35),
    (Key::F1, 0x7A),
    (Key::F2, 0x78),
    (Key::F3, 0x63),
    (Key::F4, 0x76),
    (Key::F5, 0x60),
    (Key::F6, 0x61),
    (Key::F7, 0x62),
    (Key::F8, 0x64),
    (Key::F9, 0x65),
    (Key::F10, 0x6D),
    (Key::F11, 0x67),
    (Key::F12, 0x6F),
    (Key::F13, 0x69),
    (Key::F14, 0x6B),
    (Key::F15, 0x71),
    (Key::F16, 0x6A),
    (Key::F17, 0x40),
    (Key::F18, 0x4F),
    (Key::F19, 0x50),
    (Key::F20, 0x5A),
    (Key::Home, 0x73),
    (Key::Insert, 0x72),
    (Key::Left, 0x7B),
    (Key::LeftAlt, 0x3A),
    (Key::LeftControl, 0x3B),
    (Key::LeftShift, 0x38),
    (Key::LeftSuper, 0x37),
    (Key::Menu, 0x6E),
    (Key::NumLock, 0x47),
    (Key::PageDown, 0x79),
    (Key::PageUp, 0x74),
    (Key::Right, 0x7C),
    (Key::RightAlt, 0x3D),
    (Key::RightControl, 0x3E),
    (Key::RightShift, 0x3C),
    (Key::RightSuper, 0x36),
    (Key::Space, 0x31),
    (Key::Tab, 0x30),
    (Key::Up, 0x7E),
    (Key::Kp0, 0x52),
    (Key::Kp1, 0x53),
    (Key::Kp2, 0x54),
    (Key::Kp3, 0x55),
    (Key::Kp4, 0x56),
    (Key::Kp5, 0x57),
    (Key::Kp6, 0x58),
    (Key::Kp7, 0x59),
    (Key::Kp8, 0x5B),
    (Key::Kp9, 0x5C),
    (Key::KpAdd, 0x45),
    (Key::KpDecimal, 0x41),
    (Key::KpDivide, 0x4B),
    (Key::KpEnter, 0x4C),
    (Key::KpEqual, 0x51),
    (Key::KpMultiply, 0x43),
    (Key::KpSubtract, 0x4E),
];

/// Returns the virtual key code of `key`.
pub fn native_code(key: Key) -> Option<NativeKeyCode> {
    KEYMAP.iter().find(|(k, _)| *k == key).map(|(_, code)| *code)
}

/// Returns the character a virtual key produces under the US layout, for printable keys.
pub fn us_layout_char(code: NativeKeyCode) -> Option<char> {
    let key = KEYMAP.iter().find(|(_, c)| *c == code).map(|(k, _)| *k)?;
    let name = key.name();
    if name.len() == 1 {
        return name.chars().next();
    }
    let ch = match key {
        Key::Apostrophe => '\'',
        Key::Backslash => '\\',
        Key::Comma => ',',
        Key::Equal => '=',
        Key::GraveAccent => '`',
        Key::LeftBracket => '[',
        Key::Minus => '-',
        Key::Period => '.',
        Key::RightBracket => ']',
        Key::Semicolon => ';',
        Key::Slash => '/',
        Key::KpDecimal => '.',
        Key::KpDivide => '/',
        Key::KpMultiply => '*',
        Key::KpSubtract => '-',
        Key::KpAdd => '+',
        Key::KpEqual => '=',
        Key::Kp0 => '0',
        Key::Kp1 => '1',
        Key::Kp2 => '2',
        Key::Kp3 => '3',
        Key::Kp4 => '4',
        Key::Kp5 => '5',
        Key::Kp6 => '6',
        Key::Kp7 => '7',
        Key::Kp8 => '8',
        Key::Kp9 => '9',
        _ => return None,
    };
    Some(ch)
}
