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

use anyhow::{Context, Result};
use casement_core::{Event, Key, Library, LibraryConfig, StandardCursor};
use casement_infra::{HeadlessBackend, RecordingSurfaceProvider};
use std::time::Duration;

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => LibraryConfig::from_ron_file(&path)
            .with_context(|| format!("loading configuration from '{path}'"))?,
        None => LibraryConfig::default(),
    };

    #[cfg(feature = "winit")]
    if std::env::var("CASEMENT_BACKEND").as_deref() == Ok("winit") {
        return run_desktop(config);
    }

    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let mut library = Library::builder(Box::new(backend))
        .with_config(config)
        .with_symbol_loader(Box::new(HeadlessBackend::symbol_loader()))
        .with_surface_provider(Box::new(RecordingSurfaceProvider::new()))
        .with_diagnostic_hook(|d| log::debug!("diagnostic: {d}"))
        .init()?;

    for monitor in library.monitors()? {
        log::info!(
            "{} runs {}",
            library.monitor_name(monitor)?,
            library.current_video_mode(monitor)?
        );
    }

    let monitor = library.primary_monitor()?;
    let window = library.create_window(1280, 720, "Casement Sandbox", monitor)?;
    let cursor = library.create_standard_cursor(StandardCursor::Crosshair)?;
    library.set_cursor(window, Some(cursor))?;
    log::info!("'q' is labelled {:?}", library.key_name(Key::Q)?);

    let object = library.window(window)?.native().object;
    inspector.move_pointer(object, 12.0, -4.0);
    inspector.push_event(casement_core::RawEvent::CloseRequested { window: object });

    while !library.should_close(window)? {
        library.wait_events_timeout(Duration::from_millis(16))?;
        for event in library.drain_events()? {
            match event {
                Event::CursorMoved { x, y, dx, dy, .. } => {
                    log::info!("Cursor at ({x}, {y}), moved by ({dx}, {dy}).")
                }
                other => log::info!("{other:?}"),
            }
        }
    }

    log::info!("Ran for {:.3} s.", library.timer_now()?);
    library.terminate();
    log::info!("{} native objects left.", inspector.live_resources());
    Ok(())
}

/// Opens a real window and echoes its events until it is closed.
#[cfg(feature = "winit")]
fn run_desktop(config: LibraryConfig) -> Result<()> {
    let backend = casement_infra::WinitBackend::new()?;
    let mut library = Library::builder(Box::new(backend))
        .with_config(config)
        .init()?;

    let window = library.create_window(1280, 720, "Casement Sandbox", None)?;
    while !library.should_close(window)? {
        library.wait_events_timeout(Duration::from_millis(16))?;
        for event in library.drain_events()? {
            log::info!("{event:?}");
        }
    }

    library.terminate();
    Ok(())
}
