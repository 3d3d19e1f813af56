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

//! Translation from `winit` window events to the raw events of the core.
//!
//! Native key codes on this backend are positions in [`KEY_CODES`], so they
//! stay stable across platforms and always fit the core key table.

use casement_core::input::{ElementState, Key, MouseButton, NativeKeyCode, RawEvent};
use casement_core::NativeHandle;
use winit::event::{
    ElementState as WinitElementState, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Every neutral key with its `winit` physical key, in native code order.
pub static KEY_CODES: &[(Key, KeyCode)] = &[
    (Key::Space, KeyCode::Space),
    (Key::Apostrophe, KeyCode::Quote),
    (Key::Comma, KeyCode::Comma),
    (Key::Minus, KeyCode::Minus),
    (Key::Period, KeyCode::Period),
    (Key::Slash, KeyCode::Slash),
    (Key::Digit0, KeyCode::Digit0),
    (Key::Digit1, KeyCode::Digit1),
    (Key::Digit2, KeyCode::Digit2),
    (Key::Digit3, KeyCode::Digit3),
    (Key::Digit4, KeyCode::Digit4),
    (Key::Digit5, KeyCode::Digit5),
    (Key::Digit6, KeyCode::Digit6),
    (Key::Digit7, KeyCode::Digit7),
    (Key::Digit8, KeyCode::Digit8),
    (Key::Digit9, KeyCode::Digit9),
    (Key::Semicolon, KeyCode::Semicolon),
    (Key::Equal, KeyCode::Equal),
    (Key::A, KeyCode::KeyA),
    (Key::B, KeyCode::KeyB),
    (Key::C, KeyCode::KeyC),
    (Key::D, KeyCode::KeyD),
    (Key::E, KeyCode::KeyE),
    (Key::F, KeyCode::KeyF),
    (Key::G, KeyCode::KeyG),
    (Key::H, KeyCode::KeyH),
    (Key::I, KeyCode::KeyI),
    (Key::J, KeyCode::KeyJ),
    (Key::K, KeyCode::KeyK),
    (Key::L, KeyCode::KeyL),
    (Key::M, KeyCode::KeyM),
    (Key::N, KeyCode::KeyN),
    (Key::O, KeyCode::KeyO),
    (Key::P, KeyCode::KeyP),
    (Key::Q, KeyCode::KeyQ),
    (Key::R, KeyCode::KeyR),
    (Key::S, KeyCode::KeyS),
    (Key::T, KeyCode::KeyT),
    (Key::U, KeyCode::KeyU),
    (Key::V, KeyCode::KeyV),
    (Key::W, KeyCode::KeyW),
    (Key::X, KeyCode::KeyX),
    (Key::Y, KeyCode::KeyY),
    (Key::Z, KeyCode::KeyZ),
    (Key::LeftBracket, KeyCode::BracketLeft),
    (Key::Backslash, KeyCode::Backslash),
    (Key::RightBracket, KeyCode::BracketRight),
    (Key::GraveAccent, KeyCode::Backquote),
    (Key::World1, KeyCode::IntlBackslash),
    (Key::World2, KeyCode::IntlYen),
    (Key::Escape, KeyCode::Escape),
    (Key::Enter, KeyCode::Enter),
    (Key::Tab, KeyCode::Tab),
    (Key::Backspace, KeyCode::Backspace),
    (Key::Insert, KeyCode::Insert),
    (Key::Delete, KeyCode::Delete),
    (Key::Right, KeyCode::ArrowRight),
    (Key::Left, KeyCode::ArrowLeft),
    (Key::Down, KeyCode::ArrowDown),
    (Key::Up, KeyCode::ArrowUp),
    (Key::PageUp, KeyCode::PageUp),
    (Key::PageDown, KeyCode::PageDown),
    (Key::Home, KeyCode::Home),
    (Key::End, KeyCode::End),
    (Key::CapsLock, KeyCode::CapsLock),
    (Key::ScrollLock, KeyCode::ScrollLock),
    (Key::NumLock, KeyCode::NumLock),
    (Key::PrintScreen, KeyCode::PrintScreen),
    (Key::Pause, KeyCode::Pause),
    (Key::F1, KeyCode::F1),
    (Key::F2, KeyCode::F2),
    (Key::F3, KeyCode::F3),
    (Key::F4, KeyCode::F4),
    (Key::F5, KeyCode::F5),
    (Key::F6, KeyCode::F6),
    (Key::F7, KeyCode::F7),
    (Key::F8, KeyCode::F8),
    (Key::F9, KeyCode::F9),
    (Key::F10, KeyCode::F10),
    (Key::F11, KeyCode::F11),
    (Key::F12, KeyCode::F12),
    (Key::F13, KeyCode::F13),
    (Key::F14, KeyCode::F14),
    (Key::F15, KeyCode::F15),
    (Key::F16, KeyCode::F16),
    (Key::F17, KeyCode::F17),
    (Key::F18, KeyCode::F18),
    (Key::F19, KeyCode::F19),
    (Key::F20, KeyCode::F20),
    (Key::F21, KeyCode::F21),
    (Key::F22, KeyCode::F22),
    (Key::F23, KeyCode::F23),
    (Key::F24, KeyCode::F24),
    (Key::F25, KeyCode::F25),
    (Key::Kp0, KeyCode::Numpad0),
    (Key::Kp1, KeyCode::Numpad1),
    (Key::Kp2, KeyCode::Numpad2),
    (Key::Kp3, KeyCode::Numpad3),
    (Key::Kp4, KeyCode::Numpad4),
    (Key::Kp5, KeyCode::Numpad5),
    (Key::Kp6, KeyCode::Numpad6),
    (Key::Kp7, KeyCode::Numpad7),
    (Key::Kp8, KeyCode::Numpad8),
    (Key::Kp9, KeyCode::Numpad9),
    (Key::KpDecimal, KeyCode::NumpadDecimal),
    (Key::KpDivide, KeyCode::NumpadDivide),
    (Key::KpMultiply, KeyCode::NumpadMultiply),
    (Key::KpSubtract, KeyCode::NumpadSubtract),
    (Key::KpAdd, KeyCode::NumpadAdd),
    (Key::KpEnter, KeyCode::NumpadEnter),
    (Key::KpEqual, KeyCode::NumpadEqual),
    (Key::LeftShift, KeyCode::ShiftLeft),
    (Key::LeftControl, KeyCode::ControlLeft),
    (Key::LeftAlt, KeyCode::AltLeft),
    (Key::LeftSuper, KeyCode::SuperLeft),
    (Key::RightShift, KeyCode::ShiftRight),
    (Key::RightControl, KeyCode::ControlRight),
    (Key::RightAlt, KeyCode::AltRight),
    (Key::RightSuper, KeyCode::SuperRight),
    (Key::Menu, KeyCode::ContextMenu),
];

/// The native code of a neutral key.
pub fn native_code(key: Key) -> Option<NativeKeyCode> {
    KEY_CODES
        .iter()
        .position(|(k, _)| *k == key)
        .map(|i| i as NativeKeyCode)
}

/// The native code of a `winit` physical key, if the backend knows it.
pub fn native_code_for(code: KeyCode) -> Option<NativeKeyCode> {
    KEY_CODES
        .iter()
        .position(|(_, c)| *c == code)
        .map(|i| i as NativeKeyCode)
}

/// Translates one `winit` window event into a [`RawEvent`] for `window`.
///
/// `last_pointer` is the pointer position of the previous motion in this
/// window; the first motion reports no movement. Returns `None` for events the
/// core has no counterpart for.
pub fn translate_window_event(
    window: NativeHandle,
    event: &WindowEvent,
    last_pointer: Option<(f64, f64)>,
) -> Option<RawEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let (last_x, last_y) = last_pointer.unwrap_or((position.x, position.y));
            Some(RawEvent::PointerMotion {
                window,
                x: position.x,
                y: position.y,
                dx: position.x - last_x,
                dy: position.y - last_y,
            })
        }
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            let PhysicalKey::Code(keycode) = key_event.physical_key else {
                return None;
            };
            let Some(code) = native_code_for(keycode) else {
                log::trace!("winit: no native code for {keycode:?}.");
                return None;
            };
            Some(RawEvent::Key {
                window,
                code,
                state: map_state(key_event.state),
                repeat: key_event.repeat,
            })
        }
        WindowEvent::MouseInput { state, button, .. } => Some(RawEvent::MouseButton {
            window,
            button: map_mouse_button(*button),
            state: map_state(*state),
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (f64::from(*x), f64::from(*y)),
                MouseScrollDelta::PixelDelta(pos) => (pos.x, pos.y),
            };
            Some(RawEvent::Scroll { window, dx, dy })
        }
        WindowEvent::Resized(size) => Some(RawEvent::Resized {
            window,
            width: size.width,
            height: size.height,
        }),
        WindowEvent::Focused(focused) => Some(RawEvent::Focused {
            window,
            focused: *focused,
        }),
        WindowEvent::CloseRequested => Some(RawEvent::CloseRequested { window }),
        _ => None,
    }
}

/// The printable text a key press produced, keyed by its native code.
pub fn key_label(event: &WindowEvent) -> Option<(NativeKeyCode, String)> {
    let WindowEvent::KeyboardInput {
        event: key_event, ..
    } = event
    else {
        return None;
    };
    let PhysicalKey::Code(keycode) = key_event.physical_key else {
        return None;
    };
    let text = key_event.text.as_ref()?.to_string();
    if text.is_empty() || text.chars().any(char::is_control) {
        return None;
    }
    Some((native_code_for(keycode)?, text.to_lowercase()))
}

fn map_state(state: WinitElementState) -> ElementState {
    match state {
        WinitElementState::Pressed => ElementState::Pressed,
        WinitElementState::Released => ElementState::Released,
    }
}

/// Maps a `winit::event::MouseButton` to the core `MouseButton`.
pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}
