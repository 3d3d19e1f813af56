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

//! The simulated native host behind the headless backend, and the inspector
//! used to observe and drive it.

use casement_core::input::RawEvent;
use casement_core::monitor::{DisplayId, NativeDisplay};
use casement_core::{NativeHandle, VideoMode};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Instant;

/// The kinds of native objects the host allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// A cleanup scope.
    CleanupScope,
    /// An event source.
    EventSource,
    /// A keyboard layout reference.
    KeyboardLayout,
    /// A native window object.
    Window,
    /// A window delegate.
    Delegate,
    /// A content view.
    View,
    /// A cursor image.
    Cursor,
}

/// Host operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Opening the cleanup scope.
    CleanupScope,
    /// Creating the event source.
    EventSource,
    /// Allocating a window.
    WindowAllocation,
    /// Allocating a cursor.
    CursorAllocation,
    /// Reading the current display mode.
    ModeSnapshot,
    /// Applying a display mode.
    ModeApply,
    /// Accessing the clipboard.
    Clipboard,
}

/// The host's monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessClock {
    /// A counter that only moves when the inspector advances it or the pump waits.
    Manual {
        /// Ticks per second.
        frequency: u64,
    },
    /// Nanoseconds of real time.
    Monotonic,
}

/// A display attached to the headless host.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessDisplay {
    /// How the display is reported to the library.
    pub info: NativeDisplay,
    /// The modes the display supports.
    pub modes: Vec<VideoMode>,
    /// The mode the display currently runs.
    pub current: VideoMode,
}

impl HeadlessDisplay {
    /// A display with a typical desktop mode list, running `2560x1440 @ 60 Hz`.
    pub fn standard(id: u32, name: &str, unit_number: u32, primary: bool) -> Self {
        let modes = vec![
            VideoMode::new(800, 600, 60),
            VideoMode::new(1280, 720, 60),
            VideoMode::new(1920, 1080, 60),
            VideoMode::new(1920, 1080, 144),
            VideoMode::new(2560, 1440, 60),
        ];
        Self {
            info: NativeDisplay {
                id: DisplayId(id),
                name: name.to_string(),
                unit_number,
                primary,
                physical_size_mm: (597, 336),
            },
            current: VideoMode::new(2560, 1440, 60),
            modes,
        }
    }
}

/// A window as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    /// The delegate allocated with the window.
    pub delegate: NativeHandle,
    /// The view allocated with the window.
    pub view: NativeHandle,
    /// The window title.
    pub title: String,
    /// Content size.
    pub size: (u32, u32),
    /// The cursor displayed over the window, `None` for the default arrow.
    pub cursor: Option<NativeHandle>,
    /// The pointer position in window coordinates.
    pub pointer: (f64, f64),
    /// The display the window is full screen on.
    pub display: Option<DisplayId>,
}

#[derive(Debug)]
pub(crate) struct HeadlessHost {
    next_handle: u64,
    pub(crate) live: BTreeMap<ResourceKind, HashSet<NativeHandle>>,
    pub(crate) windows: HashMap<NativeHandle, HeadlessWindow>,
    pub(crate) displays: Vec<HeadlessDisplay>,
    pub(crate) clipboard: Option<String>,
    pub(crate) pending: VecDeque<RawEvent>,
    pub(crate) failures: HashSet<FailPoint>,
    pub(crate) warps: Vec<(NativeHandle, f64, f64)>,
    pub(crate) dangling_cursor_destroys: usize,
    pub(crate) clock: HeadlessClock,
    pub(crate) manual_ticks: u64,
    pub(crate) started: Instant,
    pub(crate) synthetic_warp_motion: bool,
    pub(crate) layout_symbols_bound: bool,
}

impl HeadlessHost {
    pub(crate) fn new() -> Self {
        Self {
            next_handle: 0x1000,
            live: BTreeMap::new(),
            windows: HashMap::new(),
            displays: vec![HeadlessDisplay::standard(1, "Headless Display", 0, true)],
            clipboard: None,
            pending: VecDeque::new(),
            failures: HashSet::new(),
            warps: Vec::new(),
            dangling_cursor_destroys: 0,
            clock: HeadlessClock::Manual {
                frequency: 1_000_000,
            },
            manual_ticks: 0,
            started: Instant::now(),
            synthetic_warp_motion: true,
            layout_symbols_bound: false,
        }
    }

    pub(crate) fn allocate(&mut self, kind: ResourceKind) -> NativeHandle {
        self.next_handle += 1;
        let handle = NativeHandle(self.next_handle);
        self.live.entry(kind).or_default().insert(handle);
        handle
    }

    /// Releases `handle`, returning `false` if it was not live.
    pub(crate) fn release(&mut self, kind: ResourceKind, handle: NativeHandle) -> bool {
        let released = self
            .live
            .get_mut(&kind)
            .is_some_and(|set| set.remove(&handle));
        if !released {
            log::warn!("Headless host: releasing unknown {kind:?} {handle:?}.");
        }
        released
    }

    pub(crate) fn is_live(&self, kind: ResourceKind, handle: NativeHandle) -> bool {
        self.live.get(&kind).is_some_and(|set| set.contains(&handle))
    }

    pub(crate) fn should_fail(&self, point: FailPoint) -> bool {
        self.failures.contains(&point)
    }

    pub(crate) fn display(&self, id: DisplayId) -> Option<&HeadlessDisplay> {
        self.displays.iter().find(|d| d.info.id == id)
    }

    pub(crate) fn display_mut(&mut self, id: DisplayId) -> Option<&mut HeadlessDisplay> {
        self.displays.iter_mut().find(|d| d.info.id == id)
    }

    pub(crate) fn frequency(&self) -> u64 {
        match self.clock {
            HeadlessClock::Manual { frequency } => frequency,
            HeadlessClock::Monotonic => 1_000_000_000,
        }
    }

    pub(crate) fn ticks(&self) -> u64 {
        match self.clock {
            HeadlessClock::Manual { .. } => self.manual_ticks,
            HeadlessClock::Monotonic => self.started.elapsed().as_nanos() as u64,
        }
    }
}

/// A handle for inspecting and driving the headless host from tests or tools.
///
/// The inspector shares state with the backend it was taken from, so it keeps
/// working after the backend has been moved into a library.
#[derive(Debug, Clone)]
pub struct HeadlessInspector {
    pub(crate) host: Rc<RefCell<HeadlessHost>>,
}

impl HeadlessInspector {
    /// The number of live native objects of every kind.
    pub fn live_resources(&self) -> usize {
        self.host.borrow().live.values().map(HashSet::len).sum()
    }

    /// The number of live native objects of one kind.
    pub fn live(&self, kind: ResourceKind) -> usize {
        self.host.borrow().live.get(&kind).map_or(0, HashSet::len)
    }

    /// Makes `point` fail (or succeed again) until changed.
    pub fn set_failure(&self, point: FailPoint, failing: bool) {
        let mut host = self.host.borrow_mut();
        if failing {
            host.failures.insert(point);
        } else {
            host.failures.remove(&point);
        }
    }

    /// Queues a raw event for the next pump.
    pub fn push_event(&self, event: RawEvent) {
        self.host.borrow_mut().pending.push_back(event);
    }

    /// Simulates the user moving the pointer by `(dx, dy)` over `window`.
    pub fn move_pointer(&self, window: NativeHandle, dx: f64, dy: f64) {
        let mut host = self.host.borrow_mut();
        let Some(state) = host.windows.get_mut(&window) else {
            log::warn!("Headless host: pointer motion over unknown window {window:?}.");
            return;
        };
        state.pointer = (state.pointer.0 + dx, state.pointer.1 + dy);
        let (x, y) = state.pointer;
        host.pending.push_back(RawEvent::PointerMotion {
            window,
            x,
            y,
            dx,
            dy,
        });
    }

    /// The number of events waiting for the next pump.
    pub fn pending_events(&self) -> usize {
        self.host.borrow().pending.len()
    }

    /// A snapshot of a live native window.
    pub fn window(&self, object: NativeHandle) -> Option<HeadlessWindow> {
        self.host.borrow().windows.get(&object).cloned()
    }

    /// The cursor a native window currently displays.
    pub fn window_cursor(&self, object: NativeHandle) -> Option<NativeHandle> {
        self.host
            .borrow()
            .windows
            .get(&object)
            .and_then(|w| w.cursor)
    }

    /// The number of times a cursor was destroyed while a window still displayed it.
    pub fn dangling_cursor_destroys(&self) -> usize {
        self.host.borrow().dangling_cursor_destroys
    }

    /// Every pointer warp so far, as `(window, x, y)`.
    pub fn warps(&self) -> Vec<(NativeHandle, f64, f64)> {
        self.host.borrow().warps.clone()
    }

    /// The mode a display currently runs.
    pub fn current_mode(&self, id: DisplayId) -> Option<VideoMode> {
        self.host.borrow().display(id).map(|d| d.current)
    }

    /// Attaches a display and queues a display-change event.
    pub fn connect_display(&self, display: HeadlessDisplay) {
        let mut host = self.host.borrow_mut();
        host.displays.push(display);
        host.pending.push_back(RawEvent::DisplaysChanged);
    }

    /// Detaches a display and queues a display-change event.
    pub fn disconnect_display(&self, id: DisplayId) {
        let mut host = self.host.borrow_mut();
        host.displays.retain(|d| d.info.id != id);
        host.pending.push_back(RawEvent::DisplaysChanged);
    }

    /// The clipboard contents as other applications would see them.
    pub fn clipboard(&self) -> Option<String> {
        self.host.borrow().clipboard.clone()
    }

    /// Replaces the clipboard contents as another application would.
    pub fn set_clipboard(&self, text: &str) {
        self.host.borrow_mut().clipboard = Some(text.to_string());
    }

    /// Advances a manual clock by `ticks`, saturating at `u64::MAX`. Has no
    /// effect on a monotonic clock.
    pub fn advance(&self, ticks: u64) {
        let mut host = self.host.borrow_mut();
        host.manual_ticks = host.manual_ticks.saturating_add(ticks);
    }
}
