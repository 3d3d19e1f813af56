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

//! The library context: the single owner of every native resource.
//!
//! A [`Library`] is created by [`LibraryBuilder::init`] and threaded through
//! every call. It owns the backend, the global native objects (cleanup scope,
//! event source, keyboard layout), the key tables, the clipboard cache, and
//! the state of every window, monitor and cursor. [`Library::terminate`] (or
//! dropping the library) releases all of it in reverse acquisition order;
//! afterwards every operation fails with [`PlatformError::NotInitialized`].
//!
//! The library is single-threaded: it is not `Send`, and at most one live
//! context may exist per thread.

use crate::config::LibraryConfig;
use crate::cursor::{CursorImage, CursorShape, CursorState, StandardCursor};
use crate::diagnostic::{Diagnostic, DiagnosticHook, Diagnostics};
use crate::error::{PlatformError, Result};
use crate::handle::{CursorHandle, HandleAllocator, MonitorHandle, NativeHandle, WindowHandle};
use crate::input::{Event, EventQueue, Key, KeyNameBuffer, KeyTable, NativeKeyCode, RawEvent};
use crate::monitor::MonitorState;
use crate::platform::{NoSymbolLoader, PlatformBackend, SurfaceProvider, SymbolLoader, SymbolTable};
use crate::time::TimerState;
use crate::video::{sort_modes, VideoMode};
use crate::window::{WindowDescriptor, WindowState};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

thread_local! {
    static LIBRARY_ALIVE: Cell<bool> = const { Cell::new(false) };
}

/// Configures and initializes a [`Library`].
pub struct LibraryBuilder {
    backend: Box<dyn PlatformBackend>,
    config: LibraryConfig,
    surfaces: Option<Box<dyn SurfaceProvider>>,
    loader: Box<dyn SymbolLoader>,
    hook: Option<DiagnosticHook>,
}

impl LibraryBuilder {
    /// Starts configuring a library on top of `backend`.
    pub fn new(backend: Box<dyn PlatformBackend>) -> Self {
        Self {
            backend,
            config: LibraryConfig::default(),
            surfaces: None,
            loader: Box::new(NoSymbolLoader),
            hook: None,
        }
    }

    /// Sets the library configuration.
    pub fn with_config(mut self, config: LibraryConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs the collaborator creating a drawing surface for each window.
    pub fn with_surface_provider(mut self, provider: Box<dyn SurfaceProvider>) -> Self {
        self.surfaces = Some(provider);
        self
    }

    /// Installs the loader used for native libraries.
    pub fn with_symbol_loader(mut self, loader: Box<dyn SymbolLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Installs a callback receiving recoverable diagnostics.
    pub fn with_diagnostic_hook(mut self, hook: impl FnMut(&Diagnostic) + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Initializes the library.
    ///
    /// Native resources are acquired in order: timer, cleanup scope, native
    /// libraries, event source, keyboard layout, key tables, monitors. If a
    /// step fails, everything acquired before it is released.
    ///
    /// # Errors
    /// - [`PlatformError::AlreadyInitialized`] if a library is alive on this thread.
    /// - Any error from the backend or a required native library.
    ///
    /// # Panics
    /// Panics if the backend reports a timer frequency of zero.
    pub fn init(self) -> Result<Library> {
        if LIBRARY_ALIVE.with(Cell::get) {
            return Err(PlatformError::AlreadyInitialized);
        }

        let mut backend = self.backend;
        log::info!("Initializing '{}' platform backend...", backend.name());

        let timer = TimerState::new(backend.timer_frequency(), backend.timer_value());
        let scope = backend.open_cleanup_scope()?;
        LIBRARY_ALIVE.with(|alive| alive.set(true));

        let mut library = Library {
            backend,
            surfaces: self.surfaces,
            loader: self.loader,
            diagnostics: Diagnostics::new(self.hook),
            config: self.config,
            globals: Some(NativeGlobals {
                scope,
                event_source: None,
                keyboard_layout: None,
            }),
            symbols: SymbolTable::default(),
            keys: KeyTable::empty(),
            key_name: KeyNameBuffer::new(),
            clipboard: None,
            timer,
            handles: HandleAllocator::default(),
            windows: BTreeMap::new(),
            native_windows: HashMap::new(),
            monitors: BTreeMap::new(),
            cursors: BTreeMap::new(),
            events: EventQueue::new(),
        };

        if let Err(e) = library.acquire_globals() {
            log::error!("Library initialization failed: {e}");
            library.terminate();
            return Err(e);
        }

        log::info!(
            "Library initialized: {} keys mapped, {} monitors.",
            library.keys.mapped_count(),
            library.monitors.len()
        );
        Ok(library)
    }
}

/// Library-wide native objects, present exactly while the library is initialized.
#[derive(Debug)]
struct NativeGlobals {
    scope: NativeHandle,
    event_source: Option<NativeHandle>,
    keyboard_layout: Option<NativeHandle>,
}

/// The library context.
pub struct Library {
    backend: Box<dyn PlatformBackend>,
    surfaces: Option<Box<dyn SurfaceProvider>>,
    loader: Box<dyn SymbolLoader>,
    diagnostics: Diagnostics,
    config: LibraryConfig,
    globals: Option<NativeGlobals>,
    symbols: SymbolTable,
    keys: KeyTable,
    key_name: KeyNameBuffer,
    clipboard: Option<String>,
    timer: TimerState,
    handles: HandleAllocator,
    windows: BTreeMap<WindowHandle, WindowState>,
    native_windows: HashMap<NativeHandle, WindowHandle>,
    monitors: BTreeMap<MonitorHandle, MonitorState>,
    cursors: BTreeMap<CursorHandle, CursorState>,
    events: EventQueue,
}

impl Library {
    /// Starts configuring a library on top of `backend`.
    pub fn builder(backend: Box<dyn PlatformBackend>) -> LibraryBuilder {
        LibraryBuilder::new(backend)
    }

    /// Initializes a library with the default configuration.
    pub fn init(backend: Box<dyn PlatformBackend>) -> Result<Self> {
        LibraryBuilder::new(backend).init()
    }

    fn acquire_globals(&mut self) -> Result<()> {
        let mut requests = self.backend.required_libraries();
        requests.extend(self.config.native_libraries.iter().cloned());
        self.symbols = SymbolTable::load(&mut *self.loader, &requests, &mut self.diagnostics)?;
        self.backend.bind_symbols(&self.symbols)?;

        let event_source = self.backend.create_event_source()?;
        let keyboard_layout = self.backend.acquire_keyboard_layout();
        if keyboard_layout.is_none() {
            log::warn!("No keyboard layout available; key names are disabled.");
        }
        if let Some(globals) = self.globals.as_mut() {
            globals.event_source = Some(event_source);
            globals.keyboard_layout = keyboard_layout;
        }

        let backend = &self.backend;
        let (keys, unmapped) = KeyTable::build(|key| backend.native_key_code(key));
        self.keys = keys;
        if self.config.report_unmapped_keys {
            for key in unmapped {
                self.diagnostics.report(Diagnostic::UnmappedKey(key));
            }
        }

        self.refresh_monitors();
        Ok(())
    }

    /// Returns `true` until the library is terminated.
    pub fn is_initialized(&self) -> bool {
        self.globals.is_some()
    }

    fn ensure_initialized(&self) -> Result<&NativeGlobals> {
        self.globals.as_ref().ok_or(PlatformError::NotInitialized)
    }

    /// Releases every native resource.
    ///
    /// Remaining windows and cursors are destroyed, every monitor is restored
    /// to its desktop mode, then the keyboard layout, event source, clipboard
    /// cache, native libraries and cleanup scope are released. Calling it
    /// again is a no-op.
    pub fn terminate(&mut self) {
        let Some(globals) = self.globals.take() else {
            return;
        };
        log::info!("Terminating '{}' platform backend...", self.backend.name());

        let windows: Vec<WindowHandle> = self.windows.keys().rev().copied().collect();
        for window in windows {
            self.release_window(window);
        }
        let cursors: Vec<CursorHandle> = self.cursors.keys().rev().copied().collect();
        for cursor in cursors {
            self.release_cursor(cursor);
        }
        for monitor in self.monitors.values_mut() {
            monitor.restore_video_mode(&mut *self.backend);
        }
        self.monitors.clear();

        if let Some(layout) = globals.keyboard_layout {
            self.backend.release_keyboard_layout(layout);
        }
        if let Some(source) = globals.event_source {
            self.backend.release_event_source(source);
        }
        self.clipboard = None;
        self.key_name.clear();
        self.keys = KeyTable::empty();
        self.symbols.unload_all(&mut *self.loader);
        self.backend.close_cleanup_scope(globals.scope);
        self.events.drain();

        LIBRARY_ALIVE.with(|alive| alive.set(false));
        log::info!("Library terminated.");
    }

    // --- Timer ---

    /// Seconds elapsed since init (or since the epoch set by [`Library::set_time`]).
    pub fn timer_now(&self) -> Result<f64> {
        self.ensure_initialized()?;
        Ok(self.timer.seconds(self.backend.timer_value()))
    }

    /// Raw ticks elapsed since the epoch.
    pub fn timer_value(&self) -> Result<u64> {
        self.ensure_initialized()?;
        Ok(self.timer.ticks_since_epoch(self.backend.timer_value()))
    }

    /// Ticks per second of the native counter.
    pub fn timer_frequency(&self) -> Result<u64> {
        self.ensure_initialized()?;
        Ok(self.timer.frequency())
    }

    /// Moves the epoch so that the current time reads `seconds`.
    pub fn set_time(&mut self, seconds: f64) -> Result<()> {
        self.ensure_initialized()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlatformError::InvalidValue(format!("invalid time {seconds}")));
        }
        let raw = self.backend.timer_value();
        self.timer.rebase(raw, seconds);
        Ok(())
    }

    // --- Keys and clipboard ---

    /// The native key code for a neutral key.
    pub fn native_key(&self, key: Key) -> Result<Option<NativeKeyCode>> {
        self.ensure_initialized()?;
        Ok(self.keys.native(key))
    }

    /// The neutral key for a native key code.
    pub fn public_key(&self, code: NativeKeyCode) -> Result<Option<Key>> {
        self.ensure_initialized()?;
        Ok(self.keys.public(code))
    }

    /// The layout-dependent printable name of a key, e.g. `"q"` or `";"`.
    ///
    /// Returns `Ok(None)` for unmapped or non-printable keys.
    ///
    /// # Errors
    /// [`PlatformError::UnsupportedOperation`] if the host exposes no keyboard layout.
    pub fn key_name(&mut self, key: Key) -> Result<Option<&str>> {
        let layout = self
            .ensure_initialized()?
            .keyboard_layout
            .ok_or_else(|| PlatformError::UnsupportedOperation("keyboard layout unavailable".into()))?;

        let Some(code) = self.keys.native(key) else {
            return Ok(None);
        };
        match self.backend.key_display_name(layout, code) {
            Some(name) => Ok(Some(self.key_name.fill(&name))),
            None => Ok(None),
        }
    }

    /// Reads the clipboard into the cache and returns it.
    pub fn clipboard_string(&mut self) -> Result<Option<&str>> {
        self.ensure_initialized()?;
        self.clipboard = self.backend.clipboard_text()?;
        Ok(self.clipboard.as_deref())
    }

    /// Writes `text` to the clipboard. The cached string is invalidated.
    pub fn set_clipboard_string(&mut self, text: &str) -> Result<()> {
        self.ensure_initialized()?;
        self.clipboard = None;
        self.backend.set_clipboard_text(text)
    }

    // --- Monitors ---

    fn refresh_monitors(&mut self) {
        let displays = self.backend.displays();

        let removed: Vec<MonitorHandle> = self
            .monitors
            .iter()
            .filter(|(_, m)| !displays.iter().any(|d| d.id == m.display().id))
            .map(|(handle, _)| *handle)
            .collect();
        for handle in removed {
            self.monitors.remove(&handle);
            for window in self.windows.values_mut() {
                if window.monitor == Some(handle) {
                    window.monitor = None;
                }
            }
            log::info!("Monitor {handle} disconnected.");
        }

        for display in displays {
            let existing = self
                .monitors
                .values_mut()
                .find(|m| m.display().id == display.id);
            match existing {
                Some(monitor) => monitor.update_display(display),
                None => {
                    let handle = self.handles.monitor();
                    log::info!("Monitor {handle} connected: '{}'.", display.name);
                    self.monitors.insert(handle, MonitorState::new(display));
                }
            }
        }
    }

    fn monitor_state(&self, monitor: MonitorHandle) -> Result<&MonitorState> {
        self.monitors.get(&monitor).ok_or(PlatformError::InvalidHandle {
            kind: MonitorHandle::KIND,
            id: monitor.id(),
        })
    }

    /// The connected monitors, in enumeration order.
    pub fn monitors(&self) -> Result<Vec<MonitorHandle>> {
        self.ensure_initialized()?;
        Ok(self.monitors.keys().copied().collect())
    }

    /// The primary monitor, or the first one if none is flagged primary.
    pub fn primary_monitor(&self) -> Result<Option<MonitorHandle>> {
        self.ensure_initialized()?;
        Ok(self
            .monitors
            .iter()
            .find(|(_, m)| m.display().primary)
            .or_else(|| self.monitors.iter().next())
            .map(|(handle, _)| *handle))
    }

    /// The state of a monitor.
    pub fn monitor(&self, monitor: MonitorHandle) -> Result<&MonitorState> {
        self.ensure_initialized()?;
        self.monitor_state(monitor)
    }

    /// The human-readable name of a monitor. Monitors sharing a name are told
    /// apart by their unit number, e.g. `"DELL U2720Q (2)"`.
    pub fn monitor_name(&self, monitor: MonitorHandle) -> Result<String> {
        self.ensure_initialized()?;
        let display = self.monitor_state(monitor)?.display();
        let duplicated = self
            .monitors
            .values()
            .filter(|m| m.display().name == display.name)
            .count()
            > 1;

        Ok(if duplicated {
            format!("{} ({})", display.name, display.unit_number)
        } else {
            display.name.clone()
        })
    }

    /// The modes a monitor supports, sorted ascending without duplicates.
    pub fn video_modes(&self, monitor: MonitorHandle) -> Result<Vec<VideoMode>> {
        self.ensure_initialized()?;
        let id = self.monitor_state(monitor)?.display().id;
        let mut modes = self.backend.display_modes(id);
        sort_modes(&mut modes);
        Ok(modes)
    }

    /// The mode a monitor currently runs.
    pub fn current_video_mode(&self, monitor: MonitorHandle) -> Result<VideoMode> {
        self.ensure_initialized()?;
        let id = self.monitor_state(monitor)?.display().id;
        self.backend.current_display_mode(id)
    }

    /// Switches a monitor to the supported mode closest to `desired`.
    ///
    /// See [`MonitorState::set_video_mode`] for the state machine.
    pub fn set_video_mode(&mut self, monitor: MonitorHandle, desired: &VideoMode) -> Result<()> {
        self.ensure_initialized()?;
        let state = self
            .monitors
            .get_mut(&monitor)
            .ok_or(PlatformError::InvalidHandle {
                kind: MonitorHandle::KIND,
                id: monitor.id(),
            })?;
        state.set_video_mode(&mut *self.backend, desired)
    }

    /// Returns a monitor to the mode it had before the last switch. A no-op if
    /// the monitor is windowed.
    pub fn restore_video_mode(&mut self, monitor: MonitorHandle) -> Result<()> {
        self.ensure_initialized()?;
        let state = self
            .monitors
            .get_mut(&monitor)
            .ok_or(PlatformError::InvalidHandle {
                kind: MonitorHandle::KIND,
                id: monitor.id(),
            })?;
        state.restore_video_mode(&mut *self.backend);
        Ok(())
    }

    // --- Windows ---

    fn window_state(&self, window: WindowHandle) -> Result<&WindowState> {
        self.windows.get(&window).ok_or(PlatformError::InvalidHandle {
            kind: WindowHandle::KIND,
            id: window.id(),
        })
    }

    fn window_state_mut(&mut self, window: WindowHandle) -> Result<&mut WindowState> {
        self.windows.get_mut(&window).ok_or(PlatformError::InvalidHandle {
            kind: WindowHandle::KIND,
            id: window.id(),
        })
    }

    /// Creates a window using the configured default hints.
    ///
    /// With a target monitor the window is full screen and the monitor is
    /// switched to the mode closest to `width` x `height`.
    pub fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        monitor: Option<MonitorHandle>,
    ) -> Result<WindowHandle> {
        let descriptor =
            WindowDescriptor::new(width, height, title).with_hints(self.config.window_defaults);
        self.create_window_with(&descriptor, monitor)
    }

    /// Creates a window from a full descriptor.
    ///
    /// # Errors
    /// - [`PlatformError::InvalidValue`] for a zero-sized window.
    /// - [`PlatformError::PlatformResourceExhausted`] if the native window or
    ///   its surface cannot be allocated.
    /// - [`PlatformError::ModeSwitchFailed`] if the full-screen mode cannot be set.
    ///
    /// Nothing is left allocated on failure.
    pub fn create_window_with(
        &mut self,
        descriptor: &WindowDescriptor,
        monitor: Option<MonitorHandle>,
    ) -> Result<WindowHandle> {
        self.ensure_initialized()?;
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(PlatformError::InvalidValue(format!(
                "window size {}x{} is empty",
                descriptor.width, descriptor.height
            )));
        }
        let display = match monitor {
            Some(m) => {
                let state = self.monitor_state(m)?;
                if let Some(owner) = state.window() {
                    return Err(PlatformError::UnsupportedOperation(format!(
                        "monitor {m} is already used by full-screen {owner}"
                    )));
                }
                Some(state.display().id)
            }
            None => None,
        };

        let native = self.backend.create_window(descriptor, display)?;
        let handle = self.handles.window();

        let surface = match self.surfaces.as_mut() {
            Some(provider) => match provider.create_surface(handle, &native) {
                Ok(surface) => Some(surface),
                Err(e) => {
                    self.backend.destroy_window(&native);
                    return Err(e);
                }
            },
            None => None,
        };

        let mut state = WindowState::new(native, surface, descriptor);

        if let Some(m) = monitor {
            let mode = VideoMode::new(descriptor.width, descriptor.height, 0);
            let result = match self.monitors.get_mut(&m) {
                Some(monitor_state) => monitor_state
                    .set_video_mode(&mut *self.backend, &mode)
                    .map(|()| monitor_state.window = Some(handle)),
                None => Err(PlatformError::InvalidHandle {
                    kind: MonitorHandle::KIND,
                    id: m.id(),
                }),
            };
            if let Err(e) = result {
                if let (Some(surface), Some(provider)) = (surface, self.surfaces.as_mut()) {
                    provider.destroy_surface(surface);
                }
                self.backend.destroy_window(&native);
                return Err(e);
            }
            state.monitor = Some(m);

            if descriptor.hints.center_cursor {
                let (cx, cy) = (descriptor.width as f64 / 2.0, descriptor.height as f64 / 2.0);
                state.warp.accumulate(cx, cy);
                state.cursor_position = (cx, cy);
                self.backend.warp_pointer(&native, cx, cy);
            }
        }

        self.native_windows.insert(native.object, handle);
        self.windows.insert(handle, state);
        log::info!(
            "Window {handle} created: '{}' {}x{}{}.",
            descriptor.title,
            descriptor.width,
            descriptor.height,
            if monitor.is_some() { " (full screen)" } else { "" }
        );
        Ok(handle)
    }

    /// Destroys a window: detaches its cursor, releases its monitor, its
    /// surface, and finally the native window, delegate and view.
    pub fn destroy_window(&mut self, window: WindowHandle) -> Result<()> {
        self.ensure_initialized()?;
        self.window_state(window)?;
        self.release_window(window);
        Ok(())
    }

    fn release_window(&mut self, window: WindowHandle) {
        let Some(mut state) = self.windows.remove(&window) else {
            return;
        };
        self.native_windows.remove(&state.native.object);

        if state.cursor.take().is_some() {
            self.backend.set_window_cursor(&state.native, None);
        }
        if let Some(monitor) = state.monitor.take() {
            if let Some(monitor_state) = self.monitors.get_mut(&monitor) {
                monitor_state.restore_video_mode(&mut *self.backend);
                monitor_state.window = None;
            }
        }
        if let Some(surface) = state.surface.take() {
            if let Some(provider) = self.surfaces.as_mut() {
                provider.destroy_surface(surface);
            }
        }
        self.backend.destroy_window(&state.native);
        log::info!("Window {window} destroyed.");
    }

    /// The state of a window.
    pub fn window(&self, window: WindowHandle) -> Result<&WindowState> {
        self.ensure_initialized()?;
        self.window_state(window)
    }

    /// The live windows, oldest first.
    pub fn windows(&self) -> Result<Vec<WindowHandle>> {
        self.ensure_initialized()?;
        Ok(self.windows.keys().copied().collect())
    }

    /// Content size of a window in screen coordinates.
    pub fn window_size(&self, window: WindowHandle) -> Result<(u32, u32)> {
        Ok(self.window(window)?.size())
    }

    /// Whether the user asked to close the window.
    pub fn should_close(&self, window: WindowHandle) -> Result<bool> {
        Ok(self.window(window)?.should_close())
    }

    /// Sets or clears the close flag of a window.
    pub fn set_should_close(&mut self, window: WindowHandle, value: bool) -> Result<()> {
        self.ensure_initialized()?;
        self.window_state_mut(window)?.should_close = value;
        Ok(())
    }

    /// Last known cursor position in window coordinates.
    pub fn cursor_position(&self, window: WindowHandle) -> Result<(f64, f64)> {
        Ok(self.window(window)?.cursor_position())
    }

    /// Moves the pointer by `(dx, dy)`.
    ///
    /// The delta is recorded before the pointer moves, and subtracted from
    /// the next raw motion event so the warp is never reported as user motion.
    pub fn warp_cursor(&mut self, window: WindowHandle, dx: f64, dy: f64) -> Result<()> {
        self.ensure_initialized()?;
        let state = self
            .windows
            .get_mut(&window)
            .ok_or(PlatformError::InvalidHandle {
                kind: WindowHandle::KIND,
                id: window.id(),
            })?;

        state.warp.accumulate(dx, dy);
        let (x, y) = (state.cursor_position.0 + dx, state.cursor_position.1 + dy);
        state.cursor_position = (x, y);
        self.backend.warp_pointer(&state.native, x, y);
        Ok(())
    }

    /// Moves the pointer to `(x, y)` in window coordinates.
    pub fn set_cursor_position(&mut self, window: WindowHandle, x: f64, y: f64) -> Result<()> {
        let (cx, cy) = self.cursor_position(window)?;
        self.warp_cursor(window, x - cx, y - cy)
    }

    // --- Cursors ---

    fn insert_cursor(&mut self, native: NativeHandle, shape: CursorShape) -> CursorHandle {
        let handle = self.handles.cursor();
        self.cursors.insert(handle, CursorState::new(native, shape));
        log::debug!("Cursor {handle} created ({shape:?}).");
        handle
    }

    /// Creates a cursor from an image.
    ///
    /// # Errors
    /// [`PlatformError::PlatformResourceExhausted`] if the host cannot allocate it.
    pub fn create_cursor(&mut self, image: &CursorImage) -> Result<CursorHandle> {
        self.ensure_initialized()?;
        let native = self.backend.create_cursor(image)?;
        Ok(self.insert_cursor(
            native,
            CursorShape::Custom {
                width: image.width(),
                height: image.height(),
            },
        ))
    }

    /// Creates one of the host's standard cursors.
    pub fn create_standard_cursor(&mut self, shape: StandardCursor) -> Result<CursorHandle> {
        self.ensure_initialized()?;
        let native = self.backend.create_standard_cursor(shape)?;
        Ok(self.insert_cursor(native, CursorShape::Standard(shape)))
    }

    /// The state of a cursor.
    pub fn cursor(&self, cursor: CursorHandle) -> Result<&CursorState> {
        self.ensure_initialized()?;
        self.cursors.get(&cursor).ok_or(PlatformError::InvalidHandle {
            kind: CursorHandle::KIND,
            id: cursor.id(),
        })
    }

    /// The number of live cursors.
    pub fn cursor_count(&self) -> Result<usize> {
        self.ensure_initialized()?;
        Ok(self.cursors.len())
    }

    /// Displays `cursor` over a window; `None` reverts to the platform default.
    pub fn set_cursor(&mut self, window: WindowHandle, cursor: Option<CursorHandle>) -> Result<()> {
        let native_cursor = match cursor {
            Some(c) => Some(self.cursor(c)?.native()),
            None => {
                self.ensure_initialized()?;
                None
            }
        };
        let state = self
            .windows
            .get_mut(&window)
            .ok_or(PlatformError::InvalidHandle {
                kind: WindowHandle::KIND,
                id: window.id(),
            })?;

        self.backend.set_window_cursor(&state.native, native_cursor);
        state.cursor = cursor;
        Ok(())
    }

    /// Destroys a cursor after reverting every window displaying it to the default cursor.
    pub fn destroy_cursor(&mut self, cursor: CursorHandle) -> Result<()> {
        self.cursor(cursor)?;
        self.release_cursor(cursor);
        Ok(())
    }

    fn release_cursor(&mut self, cursor: CursorHandle) {
        let Some(state) = self.cursors.remove(&cursor) else {
            return;
        };
        for window in self.windows.values_mut() {
            if window.cursor == Some(cursor) {
                window.cursor = None;
                self.backend.set_window_cursor(&window.native, None);
            }
        }
        self.backend.destroy_cursor(state.native());
        log::debug!("Cursor {cursor} destroyed.");
    }

    // --- Events ---

    /// Processes pending native events without waiting.
    pub fn poll_events(&mut self) -> Result<()> {
        self.pump(Duration::ZERO)
    }

    /// Waits up to `timeout` for native events, then processes all pending ones.
    pub fn wait_events_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.pump(timeout)
    }

    fn pump(&mut self, timeout: Duration) -> Result<()> {
        self.ensure_initialized()?;
        let raw_events = self.backend.pump_events(timeout);
        log::trace!("Pumped {} native events.", raw_events.len());
        for raw in raw_events {
            self.dispatch(raw);
        }
        Ok(())
    }

    /// Normalizes one native event into the neutral queue.
    fn dispatch(&mut self, raw: RawEvent) {
        let native = match &raw {
            RawEvent::DisplaysChanged => {
                self.refresh_monitors();
                self.events.publish(Event::MonitorsChanged);
                return;
            }
            RawEvent::PointerMotion { window, .. }
            | RawEvent::Key { window, .. }
            | RawEvent::MouseButton { window, .. }
            | RawEvent::Scroll { window, .. }
            | RawEvent::CloseRequested { window }
            | RawEvent::Resized { window, .. }
            | RawEvent::Focused { window, .. } => *window,
        };
        let Some(&handle) = self.native_windows.get(&native) else {
            log::debug!("Dropping event for unknown native window {native:?}.");
            return;
        };
        let Some(state) = self.windows.get_mut(&handle) else {
            return;
        };

        let event = match raw {
            RawEvent::PointerMotion { x, y, dx, dy, .. } => {
                let (dx, dy) = state.warp.consume(dx, dy);
                state.cursor_position = (x, y);
                Event::CursorMoved {
                    window: handle,
                    x,
                    y,
                    dx,
                    dy,
                }
            }
            RawEvent::Key {
                code,
                state: key_state,
                repeat,
                ..
            } => Event::Key {
                window: handle,
                key: self.keys.public(code),
                scancode: code,
                state: key_state,
                repeat,
            },
            RawEvent::MouseButton { button, state: button_state, .. } => Event::MouseButton {
                window: handle,
                button,
                state: button_state,
            },
            RawEvent::Scroll { dx, dy, .. } => Event::Scroll {
                window: handle,
                dx,
                dy,
            },
            RawEvent::CloseRequested { .. } => {
                state.should_close = true;
                Event::CloseRequested { window: handle }
            }
            RawEvent::Resized { width, height, .. } => {
                state.size = (width, height);
                Event::Resized {
                    window: handle,
                    width,
                    height,
                }
            }
            RawEvent::Focused { focused, .. } => {
                state.focused = focused;
                Event::Focused {
                    window: handle,
                    focused,
                }
            }
            RawEvent::DisplaysChanged => return,
        };
        self.events.publish(event);
    }

    /// Removes and returns the oldest queued event.
    pub fn next_event(&self) -> Result<Option<Event>> {
        self.ensure_initialized()?;
        Ok(self.events.next())
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain_events(&self) -> Result<Vec<Event>> {
        self.ensure_initialized()?;
        Ok(self.events.drain())
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("backend", &self.backend.name())
            .field("initialized", &self.is_initialized())
            .field("windows", &self.windows.len())
            .field("monitors", &self.monitors.len())
            .field("cursors", &self.cursors.len())
            .finish()
    }
}
