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

//! Integration tests for library initialization and termination on the
//! headless host: resource accounting, rollback and the one-context rule.

use casement_core::{
    Diagnostic, Key, Library, LibraryConfig, LibraryRequest, PlatformError, StandardCursor,
};
use casement_infra::headless::{FailPoint, ResourceKind};
use casement_infra::{HeadlessBackend, InMemoryLoader, RecordingSurfaceProvider};
use std::cell::RefCell;
use std::rc::Rc;

/// Helper: a fully equipped library plus the observers of its collaborators.
fn equipped() -> (
    Library,
    casement_infra::HeadlessInspector,
    InMemoryLoader,
    RecordingSurfaceProvider,
) {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let loader = HeadlessBackend::symbol_loader();
    let surfaces = RecordingSurfaceProvider::new();
    let library = Library::builder(Box::new(backend))
        .with_symbol_loader(Box::new(loader.clone()))
        .with_surface_provider(Box::new(surfaces.clone()))
        .init()
        .expect("headless init must succeed");
    (library, inspector, loader, surfaces)
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource accounting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_init_acquires_globals() {
    let (library, inspector, loader, _) = equipped();

    assert!(library.is_initialized());
    assert_eq!(inspector.live(ResourceKind::CleanupScope), 1);
    assert_eq!(inspector.live(ResourceKind::EventSource), 1);
    assert_eq!(inspector.live(ResourceKind::KeyboardLayout), 1);
    assert_eq!(loader.open_count(), 1);
}

#[test]
fn test_create_destroy_terminate_leaves_no_allocations() -> anyhow::Result<()> {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let mut library = Library::init(Box::new(backend))?;

    let window = library.create_window(800, 600, "t", None)?;
    library.destroy_window(window)?;
    library.terminate();

    assert_eq!(inspector.live_resources(), 0);
    Ok(())
}

#[test]
fn test_terminate_releases_everything() -> anyhow::Result<()> {
    let (mut library, inspector, loader, surfaces) = equipped();
    let monitor = library.primary_monitor()?.expect("one display");

    let windowed = library.create_window(640, 480, "windowed", None)?;
    let _full = library.create_window(1280, 720, "full", Some(monitor))?;
    let cursor = library.create_standard_cursor(StandardCursor::Hand)?;
    library.set_cursor(windowed, Some(cursor))?;
    assert!(inspector.live_resources() > 3);

    library.terminate();

    assert_eq!(inspector.live_resources(), 0);
    assert_eq!(inspector.dangling_cursor_destroys(), 0);
    assert_eq!(loader.open_count(), 0);
    assert_eq!(surfaces.live_count(), 0);
    assert_eq!(
        inspector.current_mode(casement_core::DisplayId(1)),
        Some(casement_core::VideoMode::new(2560, 1440, 60)),
        "terminate must restore the desktop mode"
    );
    Ok(())
}

#[test]
fn test_drop_terminates() {
    let (library, inspector, _, _) = equipped();
    drop(library);
    assert_eq!(inspector.live_resources(), 0);
}

#[test]
fn test_terminate_twice_is_noop() {
    let (mut library, inspector, _, _) = equipped();
    library.terminate();
    library.terminate();
    assert!(!library.is_initialized());
    assert_eq!(inspector.live_resources(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_operations_after_terminate_fail() {
    let (mut library, _, _, _) = equipped();
    library.terminate();

    assert_eq!(library.timer_now(), Err(PlatformError::NotInitialized));
    assert_eq!(library.monitors(), Err(PlatformError::NotInitialized));
    assert_eq!(
        library.create_window(640, 480, "late", None),
        Err(PlatformError::NotInitialized)
    );
    assert_eq!(library.poll_events(), Err(PlatformError::NotInitialized));
    assert_eq!(library.next_event(), Err(PlatformError::NotInitialized));
    assert_eq!(library.drain_events(), Err(PlatformError::NotInitialized));
    assert_eq!(library.cursor_count(), Err(PlatformError::NotInitialized));
}

#[test]
fn test_second_context_is_rejected() {
    let (first, _, _, _) = equipped();

    let second = Library::init(Box::new(HeadlessBackend::new()));
    assert!(matches!(second, Err(PlatformError::AlreadyInitialized)));

    drop(first);
    assert!(Library::init(Box::new(HeadlessBackend::new())).is_ok());
}

#[test]
fn test_required_library_failure_rolls_back() {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    let config = LibraryConfig {
        native_libraries: vec![LibraryRequest::required(
            "libvulkan",
            &["vkCreateInstance"],
        )],
        ..LibraryConfig::default()
    };

    let result = Library::builder(Box::new(backend))
        .with_config(config)
        .init();

    assert!(matches!(
        result,
        Err(PlatformError::LibraryLoadFailed { ref library, .. }) if library == "libvulkan"
    ));
    assert_eq!(inspector.live_resources(), 0);
    assert!(
        Library::init(Box::new(HeadlessBackend::new())).is_ok(),
        "a failed init must not leave the context marked alive"
    );
}

#[test]
fn test_event_source_failure_rolls_back() {
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();
    inspector.set_failure(FailPoint::EventSource, true);

    let result = Library::init(Box::new(backend));

    assert!(matches!(
        result,
        Err(PlatformError::PlatformResourceExhausted { .. })
    ));
    assert_eq!(inspector.live_resources(), 0);
}

#[test]
fn test_cleanup_scope_failure_leaves_nothing_alive() {
    let backend = HeadlessBackend::new();
    backend.inspector().set_failure(FailPoint::CleanupScope, true);

    assert!(Library::init(Box::new(backend)).is_err());
    assert!(Library::init(Box::new(HeadlessBackend::new())).is_ok());
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unmapped_keys_are_reported() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let _library = Library::builder(Box::new(HeadlessBackend::new()))
        .with_symbol_loader(Box::new(HeadlessBackend::symbol_loader()))
        .with_diagnostic_hook(move |d| sink.borrow_mut().push(d.clone()))
        .init()
        .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 9);
    assert!(seen.contains(&Diagnostic::UnmappedKey(Key::PrintScreen)));
    assert!(seen.contains(&Diagnostic::UnmappedKey(Key::F25)));
}

#[test]
fn test_unmapped_key_reports_can_be_disabled() {
    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    let config = LibraryConfig {
        report_unmapped_keys: false,
        ..LibraryConfig::default()
    };

    let _library = Library::builder(Box::new(HeadlessBackend::new()))
        .with_config(config)
        .with_symbol_loader(Box::new(HeadlessBackend::symbol_loader()))
        .with_diagnostic_hook(move |_| *sink.borrow_mut() += 1)
        .init()
        .unwrap();

    assert_eq!(*seen.borrow(), 0);
}

#[test]
fn test_missing_optional_library_disables_key_names() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let backend = HeadlessBackend::new();
    let inspector = backend.inspector();

    let mut library = Library::builder(Box::new(backend))
        .with_diagnostic_hook(move |d| sink.borrow_mut().push(d.clone()))
        .init()
        .unwrap();

    assert!(seen
        .borrow()
        .iter()
        .any(|d| matches!(d, Diagnostic::MissingLibrary { library, .. } if library == "HeadlessLayout")));
    assert_eq!(inspector.live(ResourceKind::KeyboardLayout), 0);
    assert!(matches!(
        library.key_name(Key::Q),
        Err(PlatformError::UnsupportedOperation(_))
    ));
}
