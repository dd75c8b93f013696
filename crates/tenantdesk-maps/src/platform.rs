//! Seams between this crate and whatever actually hosts the map.
//!
//! A [`MapPlatform`] performs the one-time capability load and yields a
//! [`MapHandle`]; the handle's [`MapRuntime`] creates map and marker objects
//! on a named render target.

use std::sync::Arc;

use futures::future::BoxFuture;
use tenantdesk_core::Coordinate;

use crate::credential::Credential;
use crate::error::LoadError;

/// Capability version requested from the provider.
pub const MAP_VERSION: &str = "weekly";

/// Libraries bundled into the capability load.
pub const MAP_CAPABILITIES: &[&str] = &["places", "geometry"];

/// What a capability load asks the provider for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub credential: Credential,
    pub version: &'static str,
    pub capabilities: &'static [&'static str],
}

impl LoadRequest {
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            version: MAP_VERSION,
            capabilities: MAP_CAPABILITIES,
        }
    }
}

/// Binding to the external map provider.
///
/// The loader calls `load` at most once per in-flight credential and shares
/// the returned future between every caller waiting on it.
pub trait MapPlatform: Send + Sync {
    fn load(&self, request: LoadRequest) -> BoxFuture<'static, Result<MapHandle, LoadError>>;
}

/// Factory for map objects once the capability is ready.
pub trait MapRuntime: Send + Sync {
    fn create_map(&self, container_id: &str, options: &MapOptions) -> Box<dyn MapSurface>;

    fn create_marker(&self, map: &dyn MapSurface, options: &MarkerOptions)
        -> Box<dyn MarkerHandle>;
}

pub trait MapSurface: Send + Sync {
    fn id(&self) -> u64;
    fn set_center(&self, center: Coordinate);
    fn center(&self) -> Coordinate;
    fn zoom(&self) -> u8;
}

pub trait MarkerHandle: Send + Sync {
    fn set_position(&self, position: Coordinate);
    fn position(&self) -> Coordinate;
    /// Removes the marker from its map. Idempotent.
    fn detach(&self);
    fn is_attached(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapType {
    Roadmap,
    Satellite,
    Hybrid,
    Terrain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
    pub map_type: MapType,
    pub map_type_control: bool,
    pub street_view_control: bool,
    pub fullscreen_control: bool,
    pub zoom_control: bool,
}

impl MapOptions {
    /// The picker's map: road map at street zoom with every control shown.
    #[must_use]
    pub fn picker(center: Coordinate) -> Self {
        Self {
            center,
            zoom: 15,
            map_type: MapType::Roadmap,
            map_type_control: true,
            street_view_control: true,
            fullscreen_control: true,
            zoom_control: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: Coordinate,
    pub draggable: bool,
    pub title: String,
}

impl MarkerOptions {
    #[must_use]
    pub fn picker(position: Coordinate) -> Self {
        Self {
            position,
            draggable: true,
            title: "Selected Location".to_owned(),
        }
    }
}

/// A loaded map capability bound to the credential that loaded it.
#[derive(Clone)]
pub struct MapHandle {
    credential: Credential,
    runtime: Arc<dyn MapRuntime>,
}

impl MapHandle {
    #[must_use]
    pub fn new(credential: Credential, runtime: Arc<dyn MapRuntime>) -> Self {
        Self {
            credential,
            runtime,
        }
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[must_use]
    pub fn runtime(&self) -> &dyn MapRuntime {
        self.runtime.as_ref()
    }

    /// True when both handles came out of the same load.
    #[must_use]
    pub fn same_load(&self, other: &MapHandle) -> bool {
        Arc::ptr_eq(&self.runtime, &other.runtime) && self.credential == other.credential
    }
}

impl std::fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapHandle")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
