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

//! A desktop backend driving a `winit` event loop.
//!
//! The event loop is pumped rather than run, so the library keeps control of
//! its own loop. Operations that need an active event loop (window and cursor
//! creation, display enumeration) are dispatched through a zero-timeout pump.
//! Window coordinates are physical pixels.

use crate::platform::input;
use casement_core::cursor::{CursorImage, StandardCursor};
use casement_core::input::{Key, NativeKeyCode, RawEvent};
use casement_core::monitor::{DisplayId, NativeDisplay};
use casement_core::platform::{
    NativeClock, NativeCursors, NativeDisplays, NativeLibrary, NativeWindowing,
};
use casement_core::{NativeHandle, NativeWindow, PlatformError, Result, VideoMode, WindowDescriptor};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::monitor::{MonitorHandle, VideoModeHandle};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Cursor, CursorIcon, CustomCursor, Fullscreen, Window, WindowId, WindowLevel};

/// The backend clock counts nanoseconds.
const TIMER_FREQUENCY: u64 = 1_000_000_000;

/// Events and window bookkeeping shared with the pump handler.
#[derive(Default)]
struct EventCollector {
    objects: HashMap<WindowId, NativeHandle>,
    pointers: HashMap<WindowId, (f64, f64)>,
    key_labels: HashMap<NativeKeyCode, String>,
    monitors: Option<Vec<MonitorHandle>>,
    pending: Vec<RawEvent>,
}

impl EventCollector {
    fn window_event(&mut self, id: WindowId, event: &WindowEvent) {
        let Some(&object) = self.objects.get(&id) else {
            return;
        };
        if let Some((code, label)) = input::key_label(event) {
            self.key_labels.insert(code, label);
        }
        let last = self.pointers.get(&id).copied();
        if let WindowEvent::CursorMoved { position, .. } = event {
            self.pointers.insert(id, (position.x, position.y));
        }
        if let Some(raw) = input::translate_window_event(object, event, last) {
            self.pending.push(raw);
        }
    }

    /// Queues a display change when the monitor list differs from the last enumeration.
    fn observe_monitors(&mut self, event_loop: &ActiveEventLoop) {
        let Some(known) = self.monitors.as_mut() else {
            return;
        };
        let current: Vec<MonitorHandle> = event_loop.available_monitors().collect();
        if *known != current {
            *known = current;
            self.pending.push(RawEvent::DisplaysChanged);
        }
    }
}

/// The application handler used for one pump. `task`, if any, runs with the
/// first active event loop the pump hands out.
struct Dispatch<'a, F> {
    collector: &'a mut EventCollector,
    task: Option<F>,
}

impl<'a, F: FnOnce(&ActiveEventLoop)> Dispatch<'a, F> {
    fn new(collector: &'a mut EventCollector, task: Option<F>) -> Self {
        Self { collector, task }
    }

    fn run_task(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(task) = self.task.take() {
            task(event_loop);
        }
    }
}

impl<F: FnOnce(&ActiveEventLoop)> ApplicationHandler for Dispatch<'_, F> {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.run_task(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.run_task(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        self.collector.window_event(id, &event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.run_task(event_loop);
        self.collector.observe_monitors(event_loop);
    }
}

struct WinitWindow {
    window: Window,
    display: Option<DisplayId>,
}

struct DisplayRecord {
    id: DisplayId,
    monitor: MonitorHandle,
    desktop: VideoMode,
    active: Option<VideoMode>,
}

/// A host backend for desktop platforms, built on `winit`.
///
/// Capabilities `winit` does not expose report
/// [`PlatformError::UnsupportedOperation`]: clipboard access, and mode
/// switches on a display without a full-screen window. Key names are the
/// text the keyboard produced for each key since the backend was created.
pub struct WinitBackend {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    epoch: Instant,
    next_handle: u64,
    windows: HashMap<NativeHandle, WinitWindow>,
    displays: Vec<DisplayRecord>,
    next_display: u32,
    cursors: HashMap<NativeHandle, Cursor>,
}

impl WinitBackend {
    /// Creates the backend and its event loop.
    ///
    /// # Errors
    /// Returns [`PlatformError::PlatformResourceExhausted`] if no event loop
    /// can be created, for example without a display server or when one
    /// already exists in this process.
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| PlatformError::exhausted("event loop", e.to_string()))?;
        log::info!("winit event loop created.");
        Ok(Self {
            event_loop,
            collector: EventCollector::default(),
            epoch: Instant::now(),
            next_handle: 0,
            windows: HashMap::new(),
            displays: Vec::new(),
            next_display: 0,
            cursors: HashMap::new(),
        })
    }

    fn allocate(&mut self) -> NativeHandle {
        self.next_handle += 1;
        NativeHandle(self.next_handle)
    }

    fn pump<F: FnOnce(&ActiveEventLoop)>(&mut self, timeout: Duration, task: Option<F>) {
        let mut dispatch = Dispatch::new(&mut self.collector, task);
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(timeout), &mut dispatch)
        {
            log::warn!("winit event loop exited with code {code}.");
        }
    }

    /// Runs `task` with an active event loop. Returns `None` if the pump never
    /// handed one out.
    fn with_active_loop<R>(&mut self, task: impl FnOnce(&ActiveEventLoop) -> R) -> Option<R> {
        let mut result = None;
        self.pump(
            Duration::ZERO,
            Some(|event_loop: &ActiveEventLoop| result = Some(task(event_loop))),
        );
        result
    }

    fn record(&self, display: DisplayId) -> Option<&DisplayRecord> {
        self.displays.iter().find(|r| r.id == display)
    }
}

impl fmt::Debug for WinitBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WinitBackend")
            .field("windows", &self.windows.len())
            .field("displays", &self.displays.len())
            .field("cursors", &self.cursors.len())
            .finish()
    }
}

impl NativeLibrary for WinitBackend {
    fn name(&self) -> &'static str {
        "winit"
    }

    fn open_cleanup_scope(&mut self) -> Result<NativeHandle> {
        Ok(self.allocate())
    }

    fn close_cleanup_scope(&mut self, _scope: NativeHandle) {}

    fn create_event_source(&mut self) -> Result<NativeHandle> {
        Ok(self.allocate())
    }

    fn release_event_source(&mut self, _source: NativeHandle) {}

    fn acquire_keyboard_layout(&mut self) -> Option<NativeHandle> {
        Some(self.allocate())
    }

    fn release_keyboard_layout(&mut self, _layout: NativeHandle) {}

    fn native_key_code(&self, key: Key) -> Option<NativeKeyCode> {
        input::native_code(key)
    }

    fn key_display_name(&self, _layout: NativeHandle, code: NativeKeyCode) -> Option<String> {
        self.collector.key_labels.get(&code).cloned()
    }

    fn clipboard_text(&mut self) -> Result<Option<String>> {
        Err(PlatformError::UnsupportedOperation(
            "winit has no clipboard access".into(),
        ))
    }

    fn set_clipboard_text(&mut self, _text: &str) -> Result<()> {
        Err(PlatformError::UnsupportedOperation(
            "winit has no clipboard access".into(),
        ))
    }
}

impl NativeClock for WinitBackend {
    fn timer_frequency(&self) -> u64 {
        TIMER_FREQUENCY
    }

    fn timer_value(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl NativeWindowing for WinitBackend {
    fn create_window(
        &mut self,
        descriptor: &WindowDescriptor,
        display: Option<DisplayId>,
    ) -> Result<NativeWindow> {
        let monitor = match display {
            Some(id) => Some(
                self.record(id)
                    .ok_or_else(|| {
                        PlatformError::UnsupportedOperation(format!(
                            "display {} is not connected",
                            id.0
                        ))
                    })?
                    .monitor
                    .clone(),
            ),
            None => None,
        };

        let hints = &descriptor.hints;
        let level = if hints.floating {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        };
        let attributes = Window::default_attributes()
            .with_title(descriptor.title.clone())
            .with_inner_size(PhysicalSize::new(descriptor.width, descriptor.height))
            .with_resizable(hints.resizable)
            .with_visible(hints.visible)
            .with_decorations(hints.decorated)
            .with_active(hints.focused)
            .with_window_level(level)
            .with_fullscreen(monitor.map(|m| Fullscreen::Borderless(Some(m))));

        let window = self
            .with_active_loop(|event_loop| event_loop.create_window(attributes))
            .ok_or_else(|| PlatformError::exhausted("window", "event loop was not dispatched"))?
            .map_err(|e| PlatformError::exhausted("window", e.to_string()))?;

        let native = NativeWindow {
            object: self.allocate(),
            delegate: self.allocate(),
            view: self.allocate(),
        };
        self.collector.objects.insert(window.id(), native.object);
        self.windows
            .insert(native.object, WinitWindow { window, display });
        log::debug!("winit: window {:?} created.", native.object);
        Ok(native)
    }

    fn destroy_window(&mut self, window: &NativeWindow) {
        if let Some(entry) = self.windows.remove(&window.object) {
            let id = entry.window.id();
            self.collector.objects.remove(&id);
            self.collector.pointers.remove(&id);
            log::debug!("winit: window {:?} destroyed.", window.object);
        }
    }

    fn set_window_cursor(&mut self, window: &NativeWindow, cursor: Option<NativeHandle>) {
        let Some(entry) = self.windows.get(&window.object) else {
            return;
        };
        let cursor = cursor
            .and_then(|c| self.cursors.get(&c).cloned())
            .unwrap_or_else(|| Cursor::from(CursorIcon::Default));
        entry.window.set_cursor(cursor);
    }

    fn warp_pointer(&mut self, window: &NativeWindow, x: f64, y: f64) {
        let Some(entry) = self.windows.get(&window.object) else {
            return;
        };
        if let Err(e) = entry.window.set_cursor_position(PhysicalPosition::new(x, y)) {
            log::warn!("winit: cannot warp the pointer: {e}.");
        }
    }

    fn pump_events(&mut self, timeout: Duration) -> Vec<RawEvent> {
        let timeout = if self.collector.pending.is_empty() {
            timeout
        } else {
            Duration::ZERO
        };
        self.pump::<fn(&ActiveEventLoop)>(timeout, None);
        std::mem::take(&mut self.collector.pending)
    }
}

impl NativeDisplays for WinitBackend {
    fn displays(&mut self) -> Vec<NativeDisplay> {
        let snapshot = self.with_active_loop(|event_loop| {
            (
                event_loop.available_monitors().collect::<Vec<_>>(),
                event_loop.primary_monitor(),
            )
        });
        let Some((monitors, primary)) = snapshot else {
            log::warn!("winit: event loop was not dispatched; keeping the known displays.");
            return self.native_displays(None);
        };
        self.collector.monitors = Some(monitors.clone());

        let mut records = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let record = match self.displays.iter().position(|r| r.monitor == monitor) {
                Some(index) => {
                    let mut record = self.displays.swap_remove(index);
                    if record.active.is_none() {
                        record.desktop = desktop_mode(&record.monitor);
                    }
                    record
                }
                None => {
                    self.next_display += 1;
                    DisplayRecord {
                        id: DisplayId(self.next_display),
                        desktop: desktop_mode(&monitor),
                        monitor,
                        active: None,
                    }
                }
            };
            records.push(record);
        }
        self.displays = records;
        self.native_displays(primary.as_ref())
    }

    fn display_modes(&self, display: DisplayId) -> Vec<VideoMode> {
        self.record(display)
            .map(|r| r.monitor.video_modes().map(|m| to_video_mode(&m)).collect())
            .unwrap_or_default()
    }

    fn current_display_mode(&self, display: DisplayId) -> Result<VideoMode> {
        self.record(display)
            .map(|r| r.active.unwrap_or(r.desktop))
            .ok_or_else(|| PlatformError::mode_switch(display.0, "display is not connected"))
    }

    fn apply_display_mode(&mut self, display: DisplayId, mode: &VideoMode) -> Result<()> {
        let index = self
            .displays
            .iter()
            .position(|r| r.id == display)
            .ok_or_else(|| PlatformError::mode_switch(display.0, "display is not connected"))?;
        let record = &self.displays[index];
        let owner = self
            .windows
            .values()
            .find(|w| w.display == Some(display));

        if *mode == record.desktop {
            if let Some(owner) = owner {
                owner
                    .window
                    .set_fullscreen(Some(Fullscreen::Borderless(Some(record.monitor.clone()))));
            }
            self.displays[index].active = None;
            return Ok(());
        }

        let Some(owner) = owner else {
            return Err(PlatformError::UnsupportedOperation(format!(
                "display {} needs a full-screen window to switch modes",
                display.0
            )));
        };
        let handle = record
            .monitor
            .video_modes()
            .find(|m| to_video_mode(m) == *mode)
            .ok_or_else(|| PlatformError::mode_switch(display.0, format!("{mode} is not supported")))?;
        owner.window.set_fullscreen(Some(Fullscreen::Exclusive(handle)));
        self.displays[index].active = Some(*mode);
        Ok(())
    }
}

impl WinitBackend {
    fn native_displays(&self, primary: Option<&MonitorHandle>) -> Vec<NativeDisplay> {
        self.displays
            .iter()
            .enumerate()
            .map(|(unit, r)| NativeDisplay {
                id: r.id,
                name: r
                    .monitor
                    .name()
                    .unwrap_or_else(|| format!("Display {}", r.id.0)),
                unit_number: unit as u32,
                primary: match primary {
                    Some(p) => *p == r.monitor,
                    None => unit == 0,
                },
                physical_size_mm: (0, 0),
            })
            .collect()
    }
}

impl NativeCursors for WinitBackend {
    fn create_cursor(&mut self, image: &CursorImage) -> Result<NativeHandle> {
        let (hx, hy) = image.hotspot();
        let source = CustomCursor::from_rgba(
            image.pixels().to_vec(),
            cursor_dimension(image.width())?,
            cursor_dimension(image.height())?,
            cursor_dimension(hx)?,
            cursor_dimension(hy)?,
        )
        .map_err(|e| PlatformError::InvalidValue(e.to_string()))?;

        let cursor = self
            .with_active_loop(|event_loop| event_loop.create_custom_cursor(source))
            .ok_or_else(|| PlatformError::exhausted("cursor", "event loop was not dispatched"))?;
        let handle = self.allocate();
        self.cursors.insert(handle, Cursor::from(cursor));
        Ok(handle)
    }

    fn create_standard_cursor(&mut self, shape: StandardCursor) -> Result<NativeHandle> {
        let handle = self.allocate();
        self.cursors
            .insert(handle, Cursor::from(standard_icon(shape)));
        Ok(handle)
    }

    fn destroy_cursor(&mut self, cursor: NativeHandle) {
        self.cursors.remove(&cursor);
    }
}

fn cursor_dimension(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| {
        PlatformError::InvalidValue(format!("cursor dimension {value} exceeds {}", u16::MAX))
    })
}

fn standard_icon(shape: StandardCursor) -> CursorIcon {
    match shape {
        StandardCursor::Arrow => CursorIcon::Default,
        StandardCursor::IBeam => CursorIcon::Text,
        StandardCursor::Crosshair => CursorIcon::Crosshair,
        StandardCursor::Hand => CursorIcon::Pointer,
        StandardCursor::HorizontalResize => CursorIcon::EwResize,
        StandardCursor::VerticalResize => CursorIcon::NsResize,
    }
}

/// The mode a monitor runs outside any library switch. The desktop colour
/// depth is not exposed, so it is taken as 24 bits.
fn desktop_mode(monitor: &MonitorHandle) -> VideoMode {
    let size = monitor.size();
    let rate = monitor.refresh_rate_millihertz().map_or(0, millihertz_to_hz);
    VideoMode::new(size.width, size.height, rate)
}

fn to_video_mode(mode: &VideoModeHandle) -> VideoMode {
    let size = mode.size();
    let (red_bits, green_bits, blue_bits) = split_bit_depth(mode.bit_depth());
    VideoMode {
        width: size.width,
        height: size.height,
        red_bits,
        green_bits,
        blue_bits,
        refresh_rate: millihertz_to_hz(mode.refresh_rate_millihertz()),
    }
}

/// Splits a pixel depth into red, green and blue bits. 32-bit modes carry
/// 24 bits of colour; leftover bits go to green first, then red.
fn split_bit_depth(depth: u16) -> (u8, u8, u8) {
    let depth = if depth == 32 { 24 } else { depth.min(48) };
    let base = (depth / 3) as u8;
    let extra = depth % 3;
    (base + u8::from(extra == 2), base + u8::from(extra >= 1), base)
}

fn millihertz_to_hz(millihertz: u32) -> u32 {
    millihertz.saturating_add(500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depths_split_like_desktop_formats() {
        assert_eq!(split_bit_depth(32), (8, 8, 8));
        assert_eq!(split_bit_depth(24), (8, 8, 8));
        assert_eq!(split_bit_depth(16), (5, 6, 5));
        assert_eq!(split_bit_depth(15), (5, 5, 5));
        assert_eq!(split_bit_depth(30), (10, 10, 10));
    }

    #[test]
    fn refresh_rates_round_to_the_nearest_hertz() {
        assert_eq!(millihertz_to_hz(59_940), 60);
        assert_eq!(millihertz_to_hz(144_000), 144);
        assert_eq!(millihertz_to_hz(u32::MAX), u32::MAX / 1000);
    }

    #[test]
    fn standard_shapes_map_to_css_icons() {
        assert_eq!(standard_icon(StandardCursor::Hand), CursorIcon::Pointer);
        assert_eq!(standard_icon(StandardCursor::IBeam), CursorIcon::Text);
        assert_eq!(
            standard_icon(StandardCursor::HorizontalResize),
            CursorIcon::EwResize
        );
    }

    #[test]
    fn oversized_cursor_images_are_rejected() {
        assert!(matches!(
            cursor_dimension(70_000),
            Err(PlatformError::InvalidValue(_))
        ));
        assert_eq!(cursor_dimension(32).unwrap(), 32);
    }
}
