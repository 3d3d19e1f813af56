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

//! Integration tests for the event pump, warp compensation, keys, clipboard
//! and the timer on the headless host.

use approx::assert_relative_eq;
use casement_core::{
    ElementState, Event, Key, Library, MouseButton, NativeHandle, PlatformError, RawEvent,
    WindowHandle,
};
use casement_infra::headless::{FailPoint, HeadlessClock};
use casement_infra::{HeadlessBackend, HeadlessInspector};
use std::time::Duration;

/// Helper: a library with key layout services and one windowed window.
fn setup() -> (Library, HeadlessInspector, WindowHandle, NativeHandle) {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let mut library = Library::builder(Box::new(backend))
        .with_symbol_loader(Box::new(HeadlessBackend::symbol_loader()))
        .init()
        .expect("headless init must succeed");
    let window = library
        .create_window(800, 600, "input", None)
        .expect("window creation must succeed");
    let object = library.window(window).unwrap().native().object;
    (library, inspector, window, object)
}

// ─────────────────────────────────────────────────────────────────────────────
// Warp compensation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_warp_is_hidden_from_motion() -> anyhow::Result<()> {
    let (mut library, _, window, _) = setup();

    library.warp_cursor(window, 10.0, 5.0)?;
    assert_eq!(library.window(window)?.warp_delta(), (10.0, 5.0));

    library.poll_events()?;
    assert_eq!(
        library.next_event()?,
        Some(Event::CursorMoved {
            window,
            x: 10.0,
            y: 5.0,
            dx: 0.0,
            dy: 0.0,
        })
    );
    assert_eq!(library.window(window)?.warp_delta(), (0.0, 0.0));
    assert_eq!(library.cursor_position(window)?, (10.0, 5.0));
    Ok(())
}

#[test]
fn test_user_motion_after_warp_is_reported() -> anyhow::Result<()> {
    let (mut library, inspector, window, object) = setup();

    library.set_cursor_position(window, 100.0, 100.0)?;
    library.poll_events()?;
    library.drain_events()?;

    inspector.move_pointer(object, 3.0, -2.0);
    library.poll_events()?;
    assert_eq!(
        library.drain_events()?,
        vec![Event::CursorMoved {
            window,
            x: 103.0,
            y: 98.0,
            dx: 3.0,
            dy: -2.0,
        }]
    );
    Ok(())
}

#[test]
fn test_silent_warp_is_subtracted_from_next_motion() -> anyhow::Result<()> {
    let backend = HeadlessBackend::new().with_synthetic_warp_motion(false);
    let inspector = backend.inspector();
    let mut library = Library::init(Box::new(backend))?;
    let window = library.create_window(800, 600, "silent", None)?;
    let object = library.window(window)?.native().object;

    library.warp_cursor(window, 4.0, 4.0)?;
    library.poll_events()?;
    assert!(library.drain_events()?.is_empty());

    inspector.move_pointer(object, 5.0, 6.0);
    library.poll_events()?;
    match library.next_event()? {
        Some(Event::CursorMoved { dx, dy, .. }) => {
            assert_relative_eq!(dx, 1.0);
            assert_relative_eq!(dy, 2.0);
        }
        other => panic!("expected cursor motion, got {other:?}"),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Event normalization
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_events_are_normalized() -> anyhow::Result<()> {
    let (mut library, inspector, window, object) = setup();

    inspector.push_event(RawEvent::Key {
        window: object,
        code: 0x0C,
        state: ElementState::Pressed,
        repeat: false,
    });
    inspector.push_event(RawEvent::MouseButton {
        window: object,
        button: MouseButton::Left,
        state: ElementState::Released,
    });
    inspector.push_event(RawEvent::Scroll {
        window: object,
        dx: 0.0,
        dy: -1.5,
    });
    inspector.push_event(RawEvent::Resized {
        window: object,
        width: 1024,
        height: 768,
    });
    inspector.push_event(RawEvent::Focused {
        window: object,
        focused: false,
    });
    inspector.push_event(RawEvent::CloseRequested { window: object });

    library.poll_events()?;

    assert_eq!(
        library.drain_events()?,
        vec![
            Event::Key {
                window,
                key: Some(Key::Q),
                scancode: 0x0C,
                state: ElementState::Pressed,
                repeat: false,
            },
            Event::MouseButton {
                window,
                button: MouseButton::Left,
                state: ElementState::Released,
            },
            Event::Scroll {
                window,
                dx: 0.0,
                dy: -1.5,
            },
            Event::Resized {
                window,
                width: 1024,
                height: 768,
            },
            Event::Focused {
                window,
                focused: false,
            },
            Event::CloseRequested { window },
        ]
    );
    assert_eq!(library.window_size(window)?, (1024, 768));
    assert!(!library.window(window)?.is_focused());
    assert!(library.should_close(window)?);

    library.set_should_close(window, false)?;
    assert!(!library.should_close(window)?);
    Ok(())
}

#[test]
fn test_unmapped_native_key_keeps_scancode() -> anyhow::Result<()> {
    let (mut library, inspector, window, object) = setup();

    inspector.push_event(RawEvent::Key {
        window: object,
        code: 0xF0,
        state: ElementState::Pressed,
        repeat: true,
    });
    library.poll_events()?;

    assert_eq!(
        library.next_event()?,
        Some(Event::Key {
            window,
            key: None,
            scancode: 0xF0,
            state: ElementState::Pressed,
            repeat: true,
        })
    );
    Ok(())
}

#[test]
fn test_events_for_unknown_windows_are_dropped() -> anyhow::Result<()> {
    let (mut library, inspector, _, _) = setup();

    inspector.push_event(RawEvent::CloseRequested {
        window: NativeHandle(0xDEAD),
    });
    library.poll_events()?;

    assert_eq!(library.next_event()?, None);
    Ok(())
}

#[test]
fn test_wait_returns_after_timeout() -> anyhow::Result<()> {
    let (mut library, _, _, _) = setup();
    let before = library.timer_now()?;

    library.wait_events_timeout(Duration::from_millis(250))?;

    assert_relative_eq!(library.timer_now()? - before, 0.25, epsilon = 1e-9);
    assert!(library.drain_events()?.is_empty());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys and clipboard
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_key_translation_round_trips() -> anyhow::Result<()> {
    let (library, _, _, _) = setup();

    let code = library.native_key(Key::Escape)?.expect("escape is mapped");
    assert_eq!(code, 0x35);
    assert_eq!(library.public_key(code)?, Some(Key::Escape));
    assert_eq!(library.native_key(Key::Pause)?, None);
    assert_eq!(library.public_key(0xFF)?, None);
    Ok(())
}

#[test]
fn test_key_names_follow_layout() -> anyhow::Result<()> {
    let (mut library, _, _, _) = setup();

    assert_eq!(library.key_name(Key::Q)?, Some("q"));
    assert_eq!(library.key_name(Key::Semicolon)?, Some(";"));
    assert_eq!(library.key_name(Key::Kp7)?, Some("7"));
    assert_eq!(library.key_name(Key::Escape)?, None);
    assert_eq!(library.key_name(Key::PrintScreen)?, None);
    Ok(())
}

#[test]
fn test_clipboard_round_trip() -> anyhow::Result<()> {
    let (mut library, inspector, _, _) = setup();

    assert_eq!(library.clipboard_string()?, None);

    library.set_clipboard_string("hello")?;
    assert_eq!(inspector.clipboard().as_deref(), Some("hello"));

    inspector.set_clipboard("from another app");
    assert_eq!(library.clipboard_string()?, Some("from another app"));
    Ok(())
}

#[test]
fn test_clipboard_failure_is_reported() {
    let (mut library, inspector, _, _) = setup();
    inspector.set_failure(FailPoint::Clipboard, true);

    assert!(matches!(
        library.set_clipboard_string("nope"),
        Err(PlatformError::UnsupportedOperation(_))
    ));
    assert!(library.clipboard_string().is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_timer_starts_at_zero_and_follows_the_clock() -> anyhow::Result<()> {
    let (library, inspector, _, _) = setup();

    assert_eq!(library.timer_frequency()?, 1_000_000);
    assert_eq!(library.timer_value()?, 0);

    inspector.advance(1_500_000);
    assert_eq!(library.timer_value()?, 1_500_000);
    assert_relative_eq!(library.timer_now()?, 1.5);
    Ok(())
}

#[test]
fn test_set_time_moves_the_epoch() -> anyhow::Result<()> {
    let (mut library, inspector, _, _) = setup();
    inspector.advance(7_000_000);

    library.set_time(2.0)?;
    assert_relative_eq!(library.timer_now()?, 2.0);
    inspector.advance(250_000);
    assert_relative_eq!(library.timer_now()?, 2.25);

    assert!(matches!(
        library.set_time(-1.0),
        Err(PlatformError::InvalidValue(_))
    ));
    assert!(library.set_time(f64::NAN).is_err());
    Ok(())
}

#[test]
fn test_monotonic_timer_never_decreases() -> anyhow::Result<()> {
    let backend = HeadlessBackend::new().with_clock(HeadlessClock::Monotonic);
    let library = Library::init(Box::new(backend))?;

    let mut last = library.timer_now()?;
    for _ in 0..1_000 {
        let now = library.timer_now()?;
        assert!(now >= last, "timer went backwards: {now} < {last}");
        last = now;
    }
    Ok(())
}
