//! Session event hub.
//!
//! Fan-out of session happenings to any number of observers. Emission
//! never blocks; an event with no subscribers is dropped.

use tokio::sync::broadcast;

use roomtone_core::SurfaceClass;

use crate::authorization::AuthorizationStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DecorationApplied { class: SurfaceClass, decals: usize },
    AnchorStreamEnded,
    AuthorizationChanged { status: AuthorizationStatus },
    EngineStarted,
    EngineStopped,
}

pub struct SessionEventHub {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionEvent, SessionEventHub};

    #[test]
    fn subscribers_receive_emitted_events() {
        let hub = SessionEventHub::new(8);
        let mut rx = hub.subscribe();
        hub.emit(SessionEvent::EngineStarted);
        assert_eq!(rx.try_recv().expect("event delivered"), SessionEvent::EngineStarted);
    }

    #[test]
    fn emission_without_subscribers_is_dropped() {
        let hub = SessionEventHub::new(8);
        hub.emit(SessionEvent::EngineStopped);
        let mut rx = hub.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
