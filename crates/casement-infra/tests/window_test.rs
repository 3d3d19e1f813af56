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

//! Integration tests for windows, cursors and monitors on the headless host.

use casement_core::{
    CursorImage, DisplayId, Library, MonitorMode, PlatformError, StandardCursor, VideoMode,
    WindowDescriptor,
};
use casement_infra::headless::{FailPoint, HeadlessDisplay, ResourceKind};
use casement_infra::{HeadlessBackend, HeadlessInspector, RecordingSurfaceProvider};

const DESKTOP: VideoMode = VideoMode {
    width: 2560,
    height: 1440,
    red_bits: 8,
    green_bits: 8,
    blue_bits: 8,
    refresh_rate: 60,
};

/// Helper: a library on a fresh headless host, with a surface provider.
fn setup() -> (Library, HeadlessInspector, RecordingSurfaceProvider) {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let surfaces = RecordingSurfaceProvider::new();
    let library = Library::builder(Box::new(backend))
        .with_surface_provider(Box::new(surfaces.clone()))
        .init()
        .expect("headless init must succeed");
    (library, inspector, surfaces)
}

fn white_cursor() -> CursorImage {
    CursorImage::new(2, 2, vec![0xFF; 16], (0, 0)).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Windows
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_window_lifecycle_balances_native_objects() -> anyhow::Result<()> {
    let (mut library, inspector, surfaces) = setup();
    let baseline = inspector.live_resources();

    let window = library.create_window(800, 600, "lifecycle", None)?;
    assert_eq!(inspector.live(ResourceKind::Window), 1);
    assert_eq!(inspector.live(ResourceKind::Delegate), 1);
    assert_eq!(inspector.live(ResourceKind::View), 1);
    assert_eq!(surfaces.surface_for(window), library.window(window)?.surface());
    assert_eq!(library.window_size(window)?, (800, 600));
    assert_eq!(library.window(window)?.title(), "lifecycle");

    library.destroy_window(window)?;
    assert_eq!(inspector.live_resources(), baseline);
    assert_eq!(surfaces.live_count(), 0);
    assert!(matches!(
        library.window(window),
        Err(PlatformError::InvalidHandle { kind: "window", .. })
    ));
    Ok(())
}

#[test]
fn test_empty_window_is_rejected() {
    let (mut library, inspector, _) = setup();
    assert!(matches!(
        library.create_window(0, 600, "empty", None),
        Err(PlatformError::InvalidValue(_))
    ));
    assert_eq!(inspector.live(ResourceKind::Window), 0);
}

#[test]
fn test_window_allocation_failure() {
    let (mut library, inspector, _) = setup();
    inspector.set_failure(FailPoint::WindowAllocation, true);

    assert!(matches!(
        library.create_window(640, 480, "refused", None),
        Err(PlatformError::PlatformResourceExhausted { resource: "window", .. })
    ));
    assert!(library.windows().unwrap().is_empty());
}

#[test]
fn test_surface_failure_releases_native_window() {
    let (mut library, inspector, surfaces) = setup();
    surfaces.set_failing(true);

    assert!(library.create_window(640, 480, "no surface", None).is_err());
    assert_eq!(inspector.live(ResourceKind::Window), 0);
    assert_eq!(inspector.live(ResourceKind::View), 0);
}

#[test]
fn test_full_screen_window_switches_and_restores_mode() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    let window = library.create_window(1920, 1080, "game", Some(monitor))?;
    assert_eq!(
        inspector.current_mode(DisplayId(1)),
        Some(VideoMode::new(1920, 1080, 144)),
        "an unspecified rate picks the fastest matching mode"
    );
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Exclusive);
    assert_eq!(library.monitor(monitor)?.window(), Some(window));
    assert_eq!(library.window(window)?.monitor(), Some(monitor));

    library.destroy_window(window)?;
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Windowed);
    assert_eq!(library.monitor(monitor)?.window(), None);
    Ok(())
}

#[test]
fn test_full_screen_mode_failure_rolls_back() -> anyhow::Result<()> {
    let (mut library, inspector, surfaces) = setup();
    let monitor = library.primary_monitor()?.expect("one display");
    inspector.set_failure(FailPoint::ModeApply, true);

    let result = library.create_window(1280, 720, "game", Some(monitor));

    assert!(matches!(result, Err(PlatformError::ModeSwitchFailed { display: 1, .. })));
    assert_eq!(inspector.live(ResourceKind::Window), 0);
    assert_eq!(surfaces.live_count(), 0);
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Windowed);
    assert_eq!(library.monitor(monitor)?.window(), None);
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_second_full_screen_window_on_monitor_is_rejected() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    library.create_window(1280, 720, "first", Some(monitor))?;
    assert!(matches!(
        library.create_window(800, 600, "second", Some(monitor)),
        Err(PlatformError::UnsupportedOperation(_))
    ));
    assert_eq!(inspector.live(ResourceKind::Window), 1);
    Ok(())
}

#[test]
fn test_full_screen_centers_cursor_without_motion() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    let window = library.create_window(1280, 720, "centered", Some(monitor))?;
    let object = library.window(window)?.native().object;
    assert_eq!(inspector.warps(), vec![(object, 640.0, 360.0)]);

    library.poll_events()?;
    assert_eq!(
        library.drain_events()?,
        vec![casement_core::Event::CursorMoved {
            window,
            x: 640.0,
            y: 360.0,
            dx: 0.0,
            dy: 0.0,
        }]
    );
    Ok(())
}

#[test]
fn test_hints_disable_centering() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");
    let mut descriptor = WindowDescriptor::new(1280, 720, "uncentered");
    descriptor.hints.center_cursor = false;

    library.create_window_with(&descriptor, Some(monitor))?;
    assert!(inspector.warps().is_empty());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Monitors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_restore_twice_is_noop() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    library.set_video_mode(monitor, &VideoMode::new(1280, 720, 60))?;
    library.restore_video_mode(monitor)?;
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));

    inspector.set_failure(FailPoint::ModeApply, true);
    library.restore_video_mode(monitor)?;
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    assert_eq!(library.monitor(monitor)?.previous_mode(), None);
    Ok(())
}

#[test]
fn test_chained_switches_restore_original_mode() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    library.set_video_mode(monitor, &VideoMode::new(1280, 720, 60))?;
    library.set_video_mode(monitor, &VideoMode::new(1920, 1080, 60))?;
    assert_eq!(
        inspector.current_mode(DisplayId(1)),
        Some(VideoMode::new(1920, 1080, 60))
    );
    assert_eq!(library.monitor(monitor)?.previous_mode(), Some(&DESKTOP));

    library.restore_video_mode(monitor)?;
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_unreadable_mode_leaves_monitor_windowed() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");
    inspector.set_failure(FailPoint::ModeSnapshot, true);

    assert!(matches!(
        library.set_video_mode(monitor, &VideoMode::new(1280, 720, 60)),
        Err(PlatformError::ModeSwitchFailed { display: 1, .. })
    ));
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Windowed);
    assert_eq!(library.monitor(monitor)?.previous_mode(), None);
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_unreadable_mode_after_switch_restores_desktop() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    library.set_video_mode(monitor, &VideoMode::new(1280, 720, 60))?;
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Exclusive);

    inspector.set_failure(FailPoint::ModeSnapshot, true);
    assert!(matches!(
        library.set_video_mode(monitor, &VideoMode::new(1920, 1080, 60)),
        Err(PlatformError::ModeSwitchFailed { display: 1, .. })
    ));
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Windowed);
    assert_eq!(library.monitor(monitor)?.previous_mode(), None);
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_largest_requested_mode_selects_the_desktop() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    library.set_video_mode(monitor, &VideoMode::new(u32::MAX, u32::MAX, 0))?;
    assert_eq!(library.monitor(monitor)?.mode(), MonitorMode::Windowed);
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_largest_full_screen_window_keeps_the_desktop() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    let window = library.create_window(u32::MAX, u32::MAX, "huge", Some(monitor))?;
    assert_eq!(library.monitor(monitor)?.window(), Some(window));
    assert_eq!(inspector.current_mode(DisplayId(1)), Some(DESKTOP));
    Ok(())
}

#[test]
fn test_video_modes_are_sorted() -> anyhow::Result<()> {
    let (library, _, _) = setup();
    let monitor = library.primary_monitor()?.expect("one display");

    let modes = library.video_modes(monitor)?;
    assert_eq!(modes.first(), Some(&VideoMode::new(800, 600, 60)));
    assert_eq!(modes.last(), Some(&DESKTOP));
    assert_eq!(library.current_video_mode(monitor)?, DESKTOP);
    Ok(())
}

#[test]
fn test_monitor_hotplug() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let first = library.primary_monitor()?.expect("one display");
    assert_eq!(library.monitor_name(first)?, "Headless Display");

    inspector.connect_display(HeadlessDisplay::standard(2, "Headless Display", 1, false));
    library.poll_events()?;
    assert_eq!(library.drain_events()?, vec![casement_core::Event::MonitorsChanged]);

    let monitors = library.monitors()?;
    assert_eq!(monitors.len(), 2);
    assert_eq!(monitors[0], first, "existing monitors keep their handle");
    assert_eq!(library.monitor_name(first)?, "Headless Display (0)");
    assert_eq!(library.monitor_name(monitors[1])?, "Headless Display (1)");
    assert_eq!(library.primary_monitor()?, Some(first));

    inspector.disconnect_display(DisplayId(1));
    library.poll_events()?;
    let monitors = library.monitors()?;
    assert_eq!(monitors.len(), 1);
    assert!(matches!(
        library.monitor(first),
        Err(PlatformError::InvalidHandle { kind: "monitor", .. })
    ));
    assert_eq!(library.primary_monitor()?, Some(monitors[0]));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_destroying_shared_cursor_detaches_every_window() -> anyhow::Result<()> {
    let (mut library, inspector, _) = setup();
    let a = library.create_window(640, 480, "a", None)?;
    let b = library.create_window(640, 480, "b", None)?;
    let cursor = library.create_cursor(&white_cursor())?;

    library.set_cursor(a, Some(cursor))?;
    library.set_cursor(b, Some(cursor))?;
    let native = library.cursor(cursor)?.native();
    let (object_a, object_b) = (
        library.window(a)?.native().object,
        library.window(b)?.native().object,
    );
    assert_eq!(inspector.window_cursor(object_a), Some(native));

    library.destroy_cursor(cursor)?;

    assert_eq!(inspector.dangling_cursor_destroys(), 0);
    assert_eq!(inspector.window_cursor(object_a), None);
    assert_eq!(inspector.window_cursor(object_b), None);
    assert_eq!(library.window(a)?.cursor(), None);
    assert_eq!(library.window(b)?.cursor(), None);
    assert_eq!(inspector.live(ResourceKind::Cursor), 0);
    Ok(())
}

#[test]
fn test_cursor_allocation_failure() {
    let (mut library, inspector, _) = setup();
    inspector.set_failure(FailPoint::CursorAllocation, true);

    assert!(matches!(
        library.create_standard_cursor(StandardCursor::IBeam),
        Err(PlatformError::PlatformResourceExhausted { resource: "cursor", .. })
    ));
    assert!(library.create_cursor(&white_cursor()).is_err());
    assert_eq!(library.cursor_count(), Ok(0));
    assert_eq!(inspector.live(ResourceKind::Cursor), 0);
}

#[test]
fn test_set_cursor_rejects_stale_handles() -> anyhow::Result<()> {
    let (mut library, _, _) = setup();
    let window = library.create_window(640, 480, "stale", None)?;
    let cursor = library.create_standard_cursor(StandardCursor::Crosshair)?;
    library.destroy_cursor(cursor)?;

    assert!(matches!(
        library.set_cursor(window, Some(cursor)),
        Err(PlatformError::InvalidHandle { kind: "cursor", .. })
    ));
    Ok(())
}
