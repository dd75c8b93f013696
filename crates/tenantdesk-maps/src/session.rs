//! One interactive map with one draggable marker.
//!
//! Every location change (map click or marker drag) recenters the map,
//! moves the marker, and notifies the listener twice: once immediately with
//! a provisional address and once when reverse geocoding resolves. Each
//! change takes a fresh token; a geocode result is applied only if its token
//! is still the latest, so a slow lookup for an old location can never
//! overwrite the address of a newer one. The initial coordinate is
//! geocoded in the background so creating the session never waits on the
//! provider.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tenantdesk_core::Coordinate;
use tokio::task::JoinHandle;

use crate::error::MapError;
use crate::geocode::{fallback_address, GeocodeResolver};
use crate::loader::MapLoader;
use crate::platform::{MapHandle, MapOptions, MapSurface, MarkerHandle, MarkerOptions};
use crate::probe::{ReadinessProbe, RenderContainer};

/// Listener for location changes.
pub type LocationListener = Arc<dyn Fn(&LocationUpdate) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub coordinate: Coordinate,
    pub address: String,
    /// `true` for the immediate notification sent before geocoding resolves.
    pub provisional: bool,
    pub token: u64,
}

/// User interactions that move the selected location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    MapClick(Coordinate),
    MarkerDragEnd(Coordinate),
}

impl Gesture {
    #[must_use]
    pub fn coordinate(self) -> Coordinate {
        match self {
            Gesture::MapClick(c) | Gesture::MarkerDragEnd(c) => c,
        }
    }
}

struct SessionState {
    coordinate: Coordinate,
    address: String,
    latest_token: u64,
}

/// Listener slot. An update emitted while no listener is registered is kept
/// and handed to the next listener.
#[derive(Default)]
struct Notifier {
    listener: Option<LocationListener>,
    undelivered: Option<LocationUpdate>,
}

struct Shared {
    resolver: GeocodeResolver,
    state: Mutex<SessionState>,
    notifier: Mutex<Notifier>,
}

pub struct MapSession {
    container_id: String,
    map: Box<dyn MapSurface>,
    marker: Box<dyn MarkerHandle>,
    shared: Arc<Shared>,
    initial_lookup: Mutex<Option<JoinHandle<()>>>,
}

impl MapSession {
    /// Waits for the container, acquires the map capability, and builds the
    /// session.
    ///
    /// # Errors
    ///
    /// - [`MapError::ContainerUnavailable`] when the container never mounts
    ///   or is gone by the time the capability is ready.
    /// - Any error from [`MapLoader::acquire`].
    pub async fn open(
        probe: &ReadinessProbe,
        container: &dyn RenderContainer,
        loader: &MapLoader,
        credential: &str,
        initial: Coordinate,
        resolver: GeocodeResolver,
    ) -> Result<Self, MapError> {
        if !probe.wait(container).await {
            return Err(MapError::ContainerUnavailable(container.id().to_owned()));
        }
        let handle = loader.acquire(credential).await?;
        Self::initialize(container, &handle, initial, resolver)
    }

    /// Creates the map and marker in `container` and starts geocoding
    /// `initial` in the background as token 0.
    ///
    /// Returns without waiting for the address; the resolved initial update
    /// reaches the listener (or the first listener registered later). Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::ContainerUnavailable`] when the container is not
    /// mounted.
    pub fn initialize(
        container: &dyn RenderContainer,
        handle: &MapHandle,
        initial: Coordinate,
        resolver: GeocodeResolver,
    ) -> Result<Self, MapError> {
        if !container.is_mounted() {
            return Err(MapError::ContainerUnavailable(container.id().to_owned()));
        }

        let runtime = handle.runtime();
        let map = runtime.create_map(container.id(), &MapOptions::picker(initial));
        let marker = runtime.create_marker(map.as_ref(), &MarkerOptions::picker(initial));
        tracing::info!(
            container = container.id(),
            map_id = map.id(),
            %initial,
            "map session initialized"
        );

        let shared = Arc::new(Shared {
            resolver,
            state: Mutex::new(SessionState {
                coordinate: initial,
                address: fallback_address(initial),
                latest_token: 0,
            }),
            notifier: Mutex::new(Notifier::default()),
        });
        let lookup = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                shared.resolve_and_apply(initial, 0).await;
            }
        });

        Ok(Self {
            container_id: container.id().to_owned(),
            map,
            marker,
            shared,
            initial_lookup: Mutex::new(Some(lookup)),
        })
    }

    /// Registers the location listener, replacing any previous one.
    ///
    /// If an update was emitted while no listener was registered, the new
    /// listener receives it immediately.
    pub fn notify<F>(&self, listener: F)
    where
        F: Fn(&LocationUpdate) + Send + Sync + 'static,
    {
        let listener: LocationListener = Arc::new(listener);
        let undelivered = {
            let mut notifier = self.shared.notifier();
            notifier.listener = Some(Arc::clone(&listener));
            notifier.undelivered.take()
        };
        if let Some(update) = undelivered {
            listener(&update);
        }
    }

    /// Waits for the initial coordinate's geocode to finish. Returns at once
    /// if it already has.
    pub async fn settled(&self) {
        let lookup = self
            .initial_lookup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(lookup) = lookup {
            if let Err(e) = lookup.await {
                tracing::warn!(error = %e, "initial geocode task did not complete");
            }
        }
    }

    pub async fn handle_gesture(&self, gesture: Gesture) -> Option<LocationUpdate> {
        tracing::debug!(?gesture, container = %self.container_id, "map gesture");
        self.update_location(gesture.coordinate()).await
    }

    /// Moves the selection to `coordinate`.
    ///
    /// Returns the resolved update, or `None` when a newer location
    /// superseded this one before its address came back.
    pub async fn update_location(&self, coordinate: Coordinate) -> Option<LocationUpdate> {
        let provisional = {
            let mut state = self.shared.state();
            state.latest_token += 1;
            state.coordinate = coordinate;
            state.address = fallback_address(coordinate);
            LocationUpdate {
                coordinate,
                address: state.address.clone(),
                provisional: true,
                token: state.latest_token,
            }
        };

        self.marker.set_position(coordinate);
        self.map.set_center(coordinate);
        self.shared.emit(provisional.clone());

        self.shared
            .resolve_and_apply(coordinate, provisional.token)
            .await
    }

    /// Current coordinate and last known address. Does not modify anything.
    #[must_use]
    pub fn confirm(&self) -> (Coordinate, String) {
        let state = self.shared.state();
        (state.coordinate, state.address.clone())
    }

    #[must_use]
    pub fn map(&self) -> &dyn MapSurface {
        self.map.as_ref()
    }

    #[must_use]
    pub fn marker(&self) -> &dyn MarkerHandle {
        self.marker.as_ref()
    }
}

impl Shared {
    async fn resolve_and_apply(&self, coordinate: Coordinate, token: u64) -> Option<LocationUpdate> {
        let address = self.resolver.resolve(coordinate).await;

        let update = {
            let mut state = self.state();
            if state.latest_token != token {
                tracing::debug!(
                    token,
                    latest = state.latest_token,
                    "discarding superseded geocode result"
                );
                return None;
            }
            state.address.clone_from(&address);
            LocationUpdate {
                coordinate,
                address,
                provisional: false,
                token,
            }
        };
        self.emit(update.clone());
        Some(update)
    }

    fn emit(&self, update: LocationUpdate) {
        let listener = {
            let mut notifier = self.notifier();
            match notifier.listener.clone() {
                Some(listener) => listener,
                None => {
                    notifier.undelivered = Some(update);
                    return;
                }
            }
        };
        listener(&update);
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notifier(&self) -> MutexGuard<'_, Notifier> {
        self.notifier.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        if let Some(lookup) = self
            .initial_lookup
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            lookup.abort();
        }
        self.marker.detach();
        tracing::debug!(container = %self.container_id, "map session closed");
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
