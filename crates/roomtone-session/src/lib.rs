#![deny(clippy::wildcard_imports)]

pub mod authorization;
pub mod config;
pub mod events;
pub mod session;

pub use authorization::{
    AuthorizationError, AuthorizationMonitor, AuthorizationStatus, ProviderSessionEvent,
    SensingGate,
};
pub use config::{AmbienceTrack, SessionConfig, bundled_ambience};
pub use events::{SessionEvent, SessionEventHub};
pub use session::{ImmersiveSession, SessionError};
