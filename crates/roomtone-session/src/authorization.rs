//! World-sensing authorization.
//!
//! Anchor tracking needs the user's sensing permission. A denial at start
//! or a revocation mid-session disables anchor tracking; the rest of the
//! session keeps running. Authorization is never retried automatically.

use roomtone_core::ProviderState;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Allowed,
    Denied,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("world sensing authorization denied")]
    Denied,
    #[error("world sensing authorization revoked mid-session")]
    Revoked,
}

/// Authorization collaborator of the platform session host.
pub trait SensingGate: Send {
    /// Prompt for world-sensing authorization, or return the remembered
    /// decision.
    fn request_world_sensing(&mut self) -> AuthorizationStatus;

    /// Current status without prompting.
    fn query_world_sensing(&self) -> AuthorizationStatus;
}

/// Session-host notifications relevant to authorization and provider
/// health.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderSessionEvent {
    ProviderStateChanged {
        state: ProviderState,
        error: Option<String>,
    },
    AuthorizationChanged {
        status: AuthorizationStatus,
    },
}

/// Tracks authorization across session-host events.
#[derive(Debug)]
pub struct AuthorizationMonitor {
    status: AuthorizationStatus,
    providers_stopped_with_error: bool,
}

impl AuthorizationMonitor {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self {
            status,
            providers_stopped_with_error: false,
        }
    }

    pub fn status(&self) -> AuthorizationStatus {
        self.status
    }

    pub fn providers_stopped_with_error(&self) -> bool {
        self.providers_stopped_with_error
    }

    /// Apply one session-host event. A transition away from `Allowed`
    /// surfaces [`AuthorizationError::Revoked`] to the caller.
    pub fn observe(&mut self, event: &ProviderSessionEvent) -> Result<(), AuthorizationError> {
        match event {
            ProviderSessionEvent::ProviderStateChanged { state, error } => {
                if *state == ProviderState::Stopped
                    && let Some(message) = error
                {
                    warn!(message, "provider stopped with error");
                    self.providers_stopped_with_error = true;
                }
                Ok(())
            },
            ProviderSessionEvent::AuthorizationChanged { status } => {
                let was_allowed = self.status == AuthorizationStatus::Allowed;
                self.status = *status;
                if was_allowed && *status == AuthorizationStatus::Denied {
                    return Err(AuthorizationError::Revoked);
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use roomtone_core::ProviderState;

    use super::{
        AuthorizationError, AuthorizationMonitor, AuthorizationStatus, ProviderSessionEvent,
    };

    #[test]
    fn revocation_is_surfaced_once_to_the_caller() {
        let mut monitor = AuthorizationMonitor::new(AuthorizationStatus::Allowed);
        let error = monitor
            .observe(&ProviderSessionEvent::AuthorizationChanged {
                status: AuthorizationStatus::Denied,
            })
            .expect_err("revocation surfaces");
        assert_eq!(error, AuthorizationError::Revoked);
        assert_eq!(monitor.status(), AuthorizationStatus::Denied);

        // A repeat of the same status is not a second revocation.
        monitor
            .observe(&ProviderSessionEvent::AuthorizationChanged {
                status: AuthorizationStatus::Denied,
            })
            .expect("already denied");
    }

    #[test]
    fn provider_stop_with_error_is_recorded_not_fatal() {
        let mut monitor = AuthorizationMonitor::new(AuthorizationStatus::Allowed);
        monitor
            .observe(&ProviderSessionEvent::ProviderStateChanged {
                state: ProviderState::Stopped,
                error: Some("tracking interrupted".to_string()),
            })
            .expect("provider stop is not an authorization failure");
        assert!(monitor.providers_stopped_with_error());
        assert_eq!(monitor.status(), AuthorizationStatus::Allowed);
    }

    #[test]
    fn clean_provider_transitions_leave_no_error_flag() {
        let mut monitor = AuthorizationMonitor::new(AuthorizationStatus::Allowed);
        for state in [ProviderState::Running, ProviderState::Paused, ProviderState::Stopped] {
            monitor
                .observe(&ProviderSessionEvent::ProviderStateChanged { state, error: None })
                .expect("clean transition");
        }
        assert!(!monitor.providers_stopped_with_error());
    }
}
