//! Process-wide lifecycle of the external map capability.
//!
//! The loader keeps at most one load in flight. Callers asking for the
//! credential that is already loading join that load; callers asking for a
//! different credential discard whatever was there and start over. A failed
//! load leaves the loader `Uninitialized` so the next `acquire` retries.
//!
//! State lives behind a mutex and is never held across an await, so the
//! check-then-set in [`MapLoader::acquire`] is sound on a multi-threaded
//! runtime. Each load carries a generation number; a load that completes
//! after being superseded (credential switch or [`MapLoader::reset`]) hands
//! its result to its own waiters but never writes loader state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::credential::Credential;
use crate::error::{LoadError, MapError};
use crate::platform::{LoadRequest, MapHandle, MapPlatform};

type PendingLoad = Shared<BoxFuture<'static, Result<MapHandle, LoadError>>>;

static GLOBAL: OnceLock<MapLoader> = OnceLock::new();

/// Observable loader state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    Uninitialized,
    Loading(Credential),
    Ready(Credential),
}

enum Slot {
    Uninitialized,
    Loading {
        credential: Credential,
        generation: u64,
        pending: PendingLoad,
    },
    Ready {
        credential: Credential,
        handle: MapHandle,
    },
}

struct Inner {
    slot: Slot,
    next_generation: u64,
}

enum Begin {
    Ready(MapHandle),
    Wait {
        generation: u64,
        pending: PendingLoad,
    },
}

pub struct MapLoader {
    platform: Arc<dyn MapPlatform>,
    inner: Mutex<Inner>,
    loads_started: AtomicUsize,
}

impl MapLoader {
    /// Creates a standalone loader. Production code goes through
    /// [`MapLoader::install_global`]; tests build their own instances.
    #[must_use]
    pub fn new(platform: Arc<dyn MapPlatform>) -> Self {
        Self {
            platform,
            inner: Mutex::new(Inner {
                slot: Slot::Uninitialized,
                next_generation: 0,
            }),
            loads_started: AtomicUsize::new(0),
        }
    }

    /// Installs the process-wide loader. The first installation wins; later
    /// calls get the existing instance back and their platform is dropped.
    pub fn install_global(platform: Arc<dyn MapPlatform>) -> &'static MapLoader {
        let mut installed = false;
        let loader = GLOBAL.get_or_init(|| {
            installed = true;
            MapLoader::new(platform)
        });
        if !installed {
            tracing::debug!("map loader already installed; reusing existing instance");
        }
        loader
    }

    #[must_use]
    pub fn global() -> Option<&'static MapLoader> {
        GLOBAL.get()
    }

    /// Returns a ready handle for `credential`, loading it if needed.
    ///
    /// The state transition happens on first poll, before any await.
    ///
    /// # Errors
    ///
    /// - [`MapError::InvalidCredentialFormat`] when the key fails the shape
    ///   check; no load is attempted.
    /// - [`MapError::Load`] when the provider load fails; the loader is
    ///   reset to `Uninitialized`.
    pub async fn acquire(&self, credential: &str) -> Result<MapHandle, MapError> {
        let credential = Credential::parse(credential)?;
        let (generation, pending) = match self.begin(&credential) {
            Begin::Ready(handle) => return Ok(handle),
            Begin::Wait {
                generation,
                pending,
            } => (generation, pending),
        };
        let outcome = pending.await;
        self.finish(generation, &credential, outcome)
    }

    #[must_use]
    pub fn state(&self) -> LoaderState {
        match &self.lock().slot {
            Slot::Uninitialized => LoaderState::Uninitialized,
            Slot::Loading { credential, .. } => LoaderState::Loading(credential.clone()),
            Slot::Ready { credential, .. } => LoaderState::Ready(credential.clone()),
        }
    }

    /// Number of provider loads started over the loader's lifetime.
    #[must_use]
    pub fn loads_started(&self) -> usize {
        self.loads_started.load(Ordering::SeqCst)
    }

    /// Drops any loaded or loading capability. In-flight loads still resolve
    /// for their waiters but no longer update the loader.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if !matches!(inner.slot, Slot::Uninitialized) {
            tracing::debug!("map loader reset");
        }
        inner.slot = Slot::Uninitialized;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, credential: &Credential) -> Begin {
        let mut inner = self.lock();
        match &inner.slot {
            Slot::Ready {
                credential: current,
                handle,
            } if current == credential => {
                tracing::debug!(credential = %credential, "reusing loaded map capability");
                return Begin::Ready(handle.clone());
            }
            Slot::Loading {
                credential: current,
                generation,
                pending,
            } if current == credential => {
                tracing::debug!(credential = %credential, "joining in-flight map capability load");
                return Begin::Wait {
                    generation: *generation,
                    pending: pending.clone(),
                };
            }
            Slot::Uninitialized => {}
            Slot::Loading {
                credential: current,
                ..
            }
            | Slot::Ready {
                credential: current,
                ..
            } => {
                tracing::info!(
                    previous = %current,
                    next = %credential,
                    "map credential changed; discarding loader state"
                );
            }
        }

        inner.next_generation += 1;
        let generation = inner.next_generation;
        self.loads_started.fetch_add(1, Ordering::SeqCst);
        tracing::info!(credential = %credential, generation, "loading map capability");

        let pending = self
            .platform
            .load(LoadRequest::new(credential.clone()))
            .shared();
        inner.slot = Slot::Loading {
            credential: credential.clone(),
            generation,
            pending: pending.clone(),
        };
        Begin::Wait {
            generation,
            pending,
        }
    }

    fn finish(
        &self,
        generation: u64,
        credential: &Credential,
        outcome: Result<MapHandle, LoadError>,
    ) -> Result<MapHandle, MapError> {
        let mut inner = self.lock();
        let current = matches!(
            &inner.slot,
            Slot::Loading { generation: g, .. } if *g == generation
        );
        match outcome {
            Ok(handle) => {
                if current {
                    tracing::info!(credential = %credential, "map capability ready");
                    inner.slot = Slot::Ready {
                        credential: credential.clone(),
                        handle: handle.clone(),
                    };
                }
                Ok(handle)
            }
            Err(err) => {
                if current {
                    inner.slot = Slot::Uninitialized;
                }
                tracing::warn!(
                    credential = %credential,
                    kind = err.kind(),
                    error = %err,
                    "map capability load failed"
                );
                Err(MapError::Load(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
