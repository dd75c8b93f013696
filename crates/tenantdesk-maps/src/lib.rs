//! Map capability plumbing for the vendor location picker.
//!
//! [`MapLoader`] owns the single process-wide load of the external map
//! capability, [`ReadinessProbe`] waits for a render target, and
//! [`MapSession`] drives one map/marker pair, reverse-geocoding every
//! location change through a [`GeocodeResolver`].

pub mod bootstrap;
pub mod credential;
pub mod error;
pub mod geocode;
pub mod headless;
pub mod loader;
pub mod platform;
pub mod probe;
pub mod session;

pub use bootstrap::BootstrapPlatform;
pub use credential::Credential;
pub use error::{GeocodeError, LoadError, MapError};
pub use geocode::{fallback_address, GeocodeResolver, GeocodingClient, ReverseGeocoder};
pub use headless::HeadlessRuntime;
pub use loader::{LoaderState, MapLoader};
pub use platform::{LoadRequest, MapHandle, MapPlatform, MapRuntime, MapSurface, MarkerHandle};
pub use probe::{ContainerSlot, PolledContainer, ReadinessProbe, RenderContainer};
pub use session::{Gesture, LocationListener, LocationUpdate, MapSession};
