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

//! Neutral key codes and the bidirectional translation table between them and
//! the backend's native key codes.

/// A backend-specific key code (a virtual key code or scancode).
pub type NativeKeyCode = u16;

/// The number of native key codes the translation table can address.
pub const NATIVE_KEY_RANGE: usize = 256;

/// The maximum length in bytes of a key display name, excluding room for a terminator.
pub const KEY_NAME_CAPACITY: usize = 64;

macro_rules! define_keys {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// A physical key, named after its position on a US keyboard layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Key {
            $(
                #[allow(missing_docs)]
                $variant,
            )*
        }

        impl Key {
            /// Every neutral key, in code order.
            pub const ALL: &'static [Key] = &[$(Key::$variant),*];

            /// Returns the layout-independent name of the key.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => $name,)*
                }
            }
        }
    };
}

define_keys! {
    Space => "space",
    Apostrophe => "apostrophe",
    Comma => "comma",
    Minus => "minus",
    Period => "period",
    Slash => "slash",
    Digit0 => "0",
    Digit1 => "1",
    Digit2 => "2",
    Digit3 => "3",
    Digit4 => "4",
    Digit5 => "5",
    Digit6 => "6",
    Digit7 => "7",
    Digit8 => "8",
    Digit9 => "9",
    Semicolon => "semicolon",
    Equal => "equal",
    A => "a",
    B => "b",
    C => "c",
    D => "d",
    E => "e",
    F => "f",
    G => "g",
    H => "h",
    I => "i",
    J => "j",
    K => "k",
    L => "l",
    M => "m",
    N => "n",
    O => "o",
    P => "p",
    Q => "q",
    R => "r",
    S => "s",
    T => "t",
    U => "u",
    V => "v",
    W => "w",
    X => "x",
    Y => "y",
    Z => "z",
    LeftBracket => "left bracket",
    Backslash => "backslash",
    RightBracket => "right bracket",
    GraveAccent => "grave accent",
    World1 => "world 1",
    World2 => "world 2",
    Escape => "escape",
    Enter => "enter",
    Tab => "tab",
    Backspace => "backspace",
    Insert => "insert",
    Delete => "delete",
    Right => "right",
    Left => "left",
    Down => "down",
    Up => "up",
    PageUp => "page up",
    PageDown => "page down",
    Home => "home",
    End => "end",
    CapsLock => "caps lock",
    ScrollLock => "scroll lock",
    NumLock => "num lock",
    PrintScreen => "print screen",
    Pause => "pause",
    F1 => "f1",
    F2 => "f2",
    F3 => "f3",
    F4 => "f4",
    F5 => "f5",
    F6 => "f6",
    F7 => "f7",
    F8 => "f8",
    F9 => "f9",
    F10 => "f10",
    F11 => "f11",
    F12 => "f12",
    F13 => "f13",
    F14 => "f14",
    F15 => "f15",
    F16 => "f16",
    F17 => "f17",
    F18 => "f18",
    F19 => "f19",
    F20 => "f20",
    F21 => "f21",
    F22 => "f22",
    F23 => "f23",
    F24 => "f24",
    F25 => "f25",
    Kp0 => "keypad 0",
    Kp1 => "keypad 1",
    Kp2 => "keypad 2",
    Kp3 => "keypad 3",
    Kp4 => "keypad 4",
    Kp5 => "keypad 5",
    Kp6 => "keypad 6",
    Kp7 => "keypad 7",
    Kp8 => "keypad 8",
    Kp9 => "keypad 9",
    KpDecimal => "keypad decimal",
    KpDivide => "keypad divide",
    KpMultiply => "keypad multiply",
    KpSubtract => "keypad subtract",
    KpAdd => "keypad add",
    KpEnter => "keypad enter",
    KpEqual => "keypad equal",
    LeftShift => "left shift",
    LeftControl => "left control",
    LeftAlt => "left alt",
    LeftSuper => "left super",
    RightShift => "right shift",
    RightControl => "right control",
    RightAlt => "right alt",
    RightSuper => "right super",
    Menu => "menu",
}

impl Key {
    /// The number of neutral keys.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the dense index of the key, in `0..Key::COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The bidirectional translation table between neutral and native key codes.
///
/// Unmapped entries are `None` in both directions.
#[derive(Clone)]
pub struct KeyTable {
    public_keys: [Option<Key>; NATIVE_KEY_RANGE],
    native_keys: [Option<NativeKeyCode>; Key::COUNT],
}

impl KeyTable {
    /// Creates a table with every entry unmapped.
    pub fn empty() -> Self {
        Self {
            public_keys: [None; NATIVE_KEY_RANGE],
            native_keys: [None; Key::COUNT],
        }
    }

    /// Builds the table by probing `native_for` once for every neutral key.
    ///
    /// Returns the table and the keys that could not be mapped. A native code
    /// outside [`NATIVE_KEY_RANGE`] counts as unmapped.
    pub fn build(mut native_for: impl FnMut(Key) -> Option<NativeKeyCode>) -> (Self, Vec<Key>) {
        let mut table = Self::empty();
        let mut unmapped = Vec::new();

        for &key in Key::ALL {
            match native_for(key) {
                Some(code) if (code as usize) < NATIVE_KEY_RANGE => {
                    if let Some(previous) = table.public_keys[code as usize] {
                        log::warn!(
                            "Native key code {code:#04x} maps to both {previous:?} and {key:?}; keeping {key:?}."
                        );
                        table.native_keys[previous.index()] = None;
                        unmapped.push(previous);
                    }
                    table.public_keys[code as usize] = Some(key);
                    table.native_keys[key.index()] = Some(code);
                }
                Some(code) => {
                    log::warn!("Native key code {code:#x} for {key:?} is out of range.");
                    unmapped.push(key);
                }
                None => unmapped.push(key),
            }
        }

        (table, unmapped)
    }

    /// Returns the native key code for a neutral key.
    pub fn native(&self, key: Key) -> Option<NativeKeyCode> {
        self.native_keys[key.index()]
    }

    /// Returns the neutral key for a native key code.
    pub fn public(&self, code: NativeKeyCode) -> Option<Key> {
        self.public_keys.get(code as usize).copied().flatten()
    }

    /// Returns the number of mapped neutral keys.
    pub fn mapped_count(&self) -> usize {
        self.native_keys.iter().filter(|k| k.is_some()).count()
    }
}

impl std::fmt::Debug for KeyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyTable")
            .field("mapped", &self.mapped_count())
            .finish()
    }
}

/// A bounded scratch buffer holding the display name of the last queried key.
#[derive(Debug)]
pub struct KeyNameBuffer {
    buf: String,
}

impl KeyNameBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(KEY_NAME_CAPACITY),
        }
    }

    /// Replaces the buffer contents with `name`, truncated on a character
    /// boundary to at most `KEY_NAME_CAPACITY - 1` bytes.
    pub fn fill(&mut self, name: &str) -> &str {
        let mut end = name.len().min(KEY_NAME_CAPACITY - 1);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.clear();
        self.buf.push_str(&name[..end]);
        &self.buf
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for KeyNameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        for (i, key) in Key::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
        assert_eq!(Key::COUNT, Key::ALL.len());
    }

    #[test]
    fn build_maps_both_directions() {
        let (table, unmapped) = KeyTable::build(|key| match key {
            Key::A => Some(0x00),
            Key::Escape => Some(0x35),
            _ => None,
        });

        assert_eq!(table.native(Key::A), Some(0x00));
        assert_eq!(table.public(0x35), Some(Key::Escape));
        assert_eq!(table.mapped_count(), 2);
        assert_eq!(unmapped.len(), Key::COUNT - 2);
        assert!(unmapped.contains(&Key::F25));
    }

    #[test]
    fn shared_native_code_keeps_the_later_key() {
        let (table, unmapped) = KeyTable::build(|key| match key {
            Key::A | Key::B => Some(0x0B),
            _ => None,
        });

        assert_eq!(table.public(0x0B), Some(Key::B));
        assert_eq!(table.native(Key::B), Some(0x0B));
        assert_eq!(table.native(Key::A), None);
        assert!(unmapped.contains(&Key::A));
        assert!(!unmapped.contains(&Key::B));
        assert_eq!(table.mapped_count(), 1);
    }

    #[test]
    fn out_of_range_codes_are_unmapped() {
        let (table, unmapped) = KeyTable::build(|key| (key == Key::Menu).then_some(0x1ff));
        assert_eq!(table.native(Key::Menu), None);
        assert!(unmapped.contains(&Key::Menu));
        assert_eq!(table.public(0x1ff), None);
    }

    #[test]
    fn key_name_buffer_truncates_on_char_boundary() {
        let mut buffer = KeyNameBuffer::new();
        assert_eq!(buffer.fill("a"), "a");

        let long = "é".repeat(40); // 80 bytes
        let filled = buffer.fill(&long).to_string();
        assert!(filled.len() < KEY_NAME_CAPACITY);
        assert_eq!(filled.len(), 62);
        assert!(filled.chars().all(|c| c == 'é'));
    }
}
