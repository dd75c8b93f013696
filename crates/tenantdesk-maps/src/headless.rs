//! In-memory map runtime.
//!
//! Keeps map and marker state without drawing anything. Used when the map
//! is driven from a terminal or a test instead of a rendered page.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tenantdesk_core::Coordinate;

use crate::platform::{MapOptions, MapRuntime, MapSurface, MarkerHandle, MarkerOptions};

#[derive(Debug, Default)]
pub struct HeadlessRuntime {
    next_map_id: AtomicU64,
    maps_created: AtomicUsize,
    markers_created: AtomicUsize,
}

impl HeadlessRuntime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn maps_created(&self) -> usize {
        self.maps_created.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn markers_created(&self) -> usize {
        self.markers_created.load(Ordering::SeqCst)
    }
}

impl MapRuntime for HeadlessRuntime {
    fn create_map(&self, container_id: &str, options: &MapOptions) -> Box<dyn MapSurface> {
        let id = self.next_map_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.maps_created.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(map_id = id, container = container_id, "headless map created");
        Box::new(HeadlessMap {
            id,
            center: Mutex::new(options.center),
            zoom: options.zoom,
        })
    }

    fn create_marker(
        &self,
        map: &dyn MapSurface,
        options: &MarkerOptions,
    ) -> Box<dyn MarkerHandle> {
        self.markers_created.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(map_id = map.id(), title = %options.title, "headless marker created");
        Box::new(HeadlessMarker {
            position: Mutex::new(options.position),
            attached: AtomicBool::new(true),
        })
    }
}

struct HeadlessMap {
    id: u64,
    center: Mutex<Coordinate>,
    zoom: u8,
}

impl MapSurface for HeadlessMap {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_center(&self, center: Coordinate) {
        *self.center.lock().unwrap_or_else(PoisonError::into_inner) = center;
    }

    fn center(&self) -> Coordinate {
        *self.center.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }
}

struct HeadlessMarker {
    position: Mutex<Coordinate>,
    attached: AtomicBool,
}

impl MarkerHandle for HeadlessMarker {
    fn set_position(&self, position: Coordinate) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }

    fn position(&self) -> Coordinate {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}
