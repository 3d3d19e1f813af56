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

//! Monitor state and the exclusive video-mode controller.
//!
//! A monitor is either windowed or in exclusive mode. The saved previous mode
//! is the exclusive-mode flag: it is `Some` exactly while a switch is active.

use crate::error::{PlatformError, Result};
use crate::handle::WindowHandle;
use crate::platform::NativeDisplays;
use crate::video::{choose_closest, VideoMode};

/// The host's identifier for a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u32);

/// A display as enumerated by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDisplay {
    /// The host's display identifier.
    pub id: DisplayId,
    /// The human-readable name.
    pub name: String,
    /// The host's unit number, unique among connected displays.
    pub unit_number: u32,
    /// Whether this is the primary display.
    pub primary: bool,
    /// Physical size in millimetres.
    pub physical_size_mm: (u32, u32),
}

/// Whether a monitor runs its desktop mode or a mode set by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    /// The display runs the mode it had before the library touched it.
    Windowed,
    /// The display was switched by [`MonitorState::set_video_mode`].
    Exclusive,
}

/// The per-monitor state embedded behind a [`MonitorHandle`](crate::MonitorHandle).
#[derive(Debug, Clone)]
pub struct MonitorState {
    display: NativeDisplay,
    previous_mode: Option<VideoMode>,
    pub(crate) window: Option<WindowHandle>,
}

impl MonitorState {
    /// Wraps a freshly enumerated display. The monitor starts windowed.
    pub fn new(display: NativeDisplay) -> Self {
        Self {
            display,
            previous_mode: None,
            window: None,
        }
    }

    /// The native display backing this monitor.
    pub fn display(&self) -> &NativeDisplay {
        &self.display
    }

    pub(crate) fn update_display(&mut self, display: NativeDisplay) {
        self.display = display;
    }

    /// The mode saved before the active exclusive switch, if any.
    pub fn previous_mode(&self) -> Option<&VideoMode> {
        self.previous_mode.as_ref()
    }

    /// The current state of the mode state machine.
    pub fn mode(&self) -> MonitorMode {
        if self.previous_mode.is_some() {
            MonitorMode::Exclusive
        } else {
            MonitorMode::Windowed
        }
    }

    /// The full-screen window currently occupying this monitor.
    pub fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// Switches the display to the supported mode closest to `desired`.
    ///
    /// In exclusive mode, requesting the active mode is a no-op; any other mode
    /// restores first and then applies. The current mode is saved before the
    /// switch; if it cannot be read, or the switch fails, the monitor is left
    /// windowed and [`PlatformError::ModeSwitchFailed`] is returned.
    pub fn set_video_mode<D>(&mut self, displays: &mut D, desired: &VideoMode) -> Result<()>
    where
        D: NativeDisplays + ?Sized,
    {
        let id = self.display.id;
        let best = choose_closest(&displays.display_modes(id), desired)
            .ok_or_else(|| PlatformError::mode_switch(id.0, "display reports no video modes"))?;

        if self.previous_mode.is_some() {
            if matches!(displays.current_display_mode(id), Ok(active) if active == best) {
                return Ok(());
            }
            self.restore_video_mode(displays);
        }

        let current = displays
            .current_display_mode(id)
            .map_err(|e| PlatformError::mode_switch(id.0, format!("cannot save current mode: {e}")))?;
        if current == best {
            log::debug!("Display {} already runs {best}.", id.0);
            return Ok(());
        }

        self.previous_mode = Some(current);
        if let Err(e) = displays.apply_display_mode(id, &best) {
            self.previous_mode = None;
            return Err(PlatformError::mode_switch(id.0, e.to_string()));
        }

        log::info!("Display {} switched to {best}.", id.0);
        Ok(())
    }

    /// Returns the display to the saved mode. A no-op when windowed.
    pub fn restore_video_mode<D>(&mut self, displays: &mut D)
    where
        D: NativeDisplays + ?Sized,
    {
        let Some(previous) = self.previous_mode.take() else {
            return;
        };

        match displays.apply_display_mode(self.display.id, &previous) {
            Ok(()) => log::info!("Display {} restored.", self.display.id.0),
            Err(e) => log::warn!(
                "Failed to restore display {}: {e}. Leaving it as is.",
                self.display.id.0
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeDisplays {
        current: HashMap<DisplayId, VideoMode>,
        modes: Vec<VideoMode>,
        fail_snapshot: bool,
        fail_apply: bool,
        applied: Vec<VideoMode>,
    }

    impl NativeDisplays for FakeDisplays {
        fn displays(&mut self) -> Vec<NativeDisplay> {
            Vec::new()
        }

        fn display_modes(&self, _display: DisplayId) -> Vec<VideoMode> {
            self.modes.clone()
        }

        fn current_display_mode(&self, display: DisplayId) -> Result<VideoMode> {
            if self.fail_snapshot {
                return Err(PlatformError::UnsupportedOperation("no snapshot".into()));
            }
            Ok(self.current[&display])
        }

        fn apply_display_mode(&mut self, display: DisplayId, mode: &VideoMode) -> Result<()> {
            if self.fail_apply {
                return Err(PlatformError::UnsupportedOperation("apply".into()));
            }
            self.applied.push(*mode);
            self.current.insert(display, *mode);
            Ok(())
        }
    }

    const DESKTOP: VideoMode = VideoMode {
        width: 2560,
        height: 1440,
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
        refresh_rate: 60,
    };

    fn setup() -> (MonitorState, FakeDisplays) {
        let monitor = MonitorState::new(NativeDisplay {
            id: DisplayId(1),
            name: "Built-in".into(),
            unit_number: 0,
            primary: true,
            physical_size_mm: (600, 340),
        });
        let mut displays = FakeDisplays {
            modes: vec![
                DESKTOP,
                VideoMode::new(1920, 1080, 60),
                VideoMode::new(1280, 720, 60),
            ],
            ..Default::default()
        };
        displays.current.insert(DisplayId(1), DESKTOP);
        (monitor, displays)
    }

    #[test]
    fn switch_then_restore_returns_to_desktop() {
        let (mut monitor, mut displays) = setup();

        monitor
            .set_video_mode(&mut displays, &VideoMode::new(1280, 720, 60))
            .unwrap();
        assert_eq!(monitor.mode(), MonitorMode::Exclusive);
        assert_eq!(monitor.previous_mode(), Some(&DESKTOP));

        monitor.restore_video_mode(&mut displays);
        assert_eq!(monitor.mode(), MonitorMode::Windowed);
        assert_eq!(displays.current[&DisplayId(1)], DESKTOP);
    }

    #[test]
    fn double_restore_is_a_no_op() {
        let (mut monitor, mut displays) = setup();
        monitor.restore_video_mode(&mut displays);
        monitor.restore_video_mode(&mut displays);
        assert_eq!(monitor.mode(), MonitorMode::Windowed);
        assert!(displays.applied.is_empty());
    }

    #[test]
    fn chained_switches_restore_the_original_mode() {
        let (mut monitor, mut displays) = setup();

        monitor
            .set_video_mode(&mut displays, &VideoMode::new(1920, 1080, 60))
            .unwrap();
        monitor
            .set_video_mode(&mut displays, &VideoMode::new(1280, 720, 60))
            .unwrap();
        assert_eq!(monitor.previous_mode(), Some(&DESKTOP));

        monitor.restore_video_mode(&mut displays);
        assert_eq!(displays.current[&DisplayId(1)], DESKTOP);
    }

    #[test]
    fn requesting_the_active_mode_is_idempotent() {
        let (mut monitor, mut displays) = setup();
        let mode = VideoMode::new(1920, 1080, 60);

        monitor.set_video_mode(&mut displays, &mode).unwrap();
        let applied = displays.applied.len();
        monitor.set_video_mode(&mut displays, &mode).unwrap();

        assert_eq!(displays.applied.len(), applied);
        assert_eq!(monitor.previous_mode(), Some(&DESKTOP));
    }

    #[test]
    fn snapshot_failure_leaves_monitor_windowed() {
        let (mut monitor, mut displays) = setup();
        displays.fail_snapshot = true;

        let err = monitor
            .set_video_mode(&mut displays, &VideoMode::new(1280, 720, 60))
            .unwrap_err();

        assert!(matches!(err, PlatformError::ModeSwitchFailed { display: 1, .. }));
        assert_eq!(monitor.mode(), MonitorMode::Windowed);
        assert!(displays.applied.is_empty());
    }

    #[test]
    fn apply_failure_clears_the_snapshot() {
        let (mut monitor, mut displays) = setup();
        displays.fail_apply = true;

        let err = monitor
            .set_video_mode(&mut displays, &VideoMode::new(1280, 720, 60))
            .unwrap_err();

        assert!(matches!(err, PlatformError::ModeSwitchFailed { .. }));
        assert_eq!(monitor.previous_mode(), None);
    }

    #[test]
    fn requesting_the_desktop_mode_does_not_switch() {
        let (mut monitor, mut displays) = setup();
        monitor.set_video_mode(&mut displays, &DESKTOP).unwrap();
        assert_eq!(monitor.mode(), MonitorMode::Windowed);
        assert!(displays.applied.is_empty());
    }
}
