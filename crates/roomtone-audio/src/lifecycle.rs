//! Bulk sound-event lifecycle driven by session transitions.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::session::AudioSession;

/// Drives start/pause/resume/stop over the session's live event set.
///
/// Bulk operations read the live set at call time, not a snapshot queued
/// earlier: if the session was stopped or replaced in the meantime, the
/// iteration observes whatever set exists then, possibly empty.
#[derive(Clone)]
pub struct SoundEventLifecycleManager {
    session: Arc<Mutex<AudioSession>>,
}

impl SoundEventLifecycleManager {
    pub fn new(session: Arc<Mutex<AudioSession>>) -> Self {
        Self { session }
    }

    /// Start every created event. Returns the number that transitioned.
    pub fn start_all(&self) -> usize {
        self.for_each_live("start", |event| event.start())
    }

    /// Pause every playing event, e.g. when the immersive view goes away.
    pub fn pause_all(&self) -> usize {
        self.for_each_live("pause", |event| event.pause())
    }

    /// Resume every paused event when the view reappears.
    pub fn resume_all(&self) -> usize {
        self.for_each_live("resume", |event| event.resume())
    }

    /// Force every live event to its terminal state without stopping the
    /// engine itself.
    pub fn stop_all(&self) -> usize {
        self.for_each_live("stop", |event| event.stop())
    }

    fn for_each_live(
        &self,
        operation: &str,
        apply: impl Fn(&crate::event::SoundEvent) -> bool,
    ) -> usize {
        let live = self.session.lock().live_events();
        let transitioned = live.iter().filter(|event| apply(event)).count();
        debug!(operation, live = live.len(), transitioned, "bulk lifecycle pass");
        transitioned
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use roomtone_core::Vec3;

    use super::SoundEventLifecycleManager;
    use crate::ambient::AmbientAudioGraphBuilder;
    use crate::event::PlaybackState;
    use crate::registry::MemoryAssetRegistry;
    use crate::session::AudioSession;
    use crate::types::SoundSourceDescriptor;

    fn session_with_beds(count: usize) -> (Arc<Mutex<AudioSession>>, Vec<crate::event::SoundEvent>) {
        let mut session = AudioSession::new(Box::new(MemoryAssetRegistry::new()));
        let listener = session.make_listener();
        let builder = AmbientAudioGraphBuilder::new();
        let events = (0..count)
            .map(|index| {
                builder
                    .build(
                        &mut session,
                        &SoundSourceDescriptor::new(format!("bed_{index}.wav"), Vec3::ZERO),
                        listener,
                    )
                    .expect("bed builds")
            })
            .collect();
        (Arc::new(Mutex::new(session)), events)
    }

    #[test]
    fn bulk_pause_and_resume_walk_every_live_event() {
        let (session, events) = session_with_beds(3);
        let lifecycle = SoundEventLifecycleManager::new(Arc::clone(&session));

        assert_eq!(lifecycle.start_all(), 3);
        assert_eq!(lifecycle.pause_all(), 3);
        assert_eq!(lifecycle.resume_all(), 3);
        for event in &events {
            assert_eq!(event.state(), PlaybackState::Playing);
        }
    }

    #[test]
    fn pause_all_on_a_mixed_set_skips_non_playing_events() {
        let (session, events) = session_with_beds(3);
        let lifecycle = SoundEventLifecycleManager::new(Arc::clone(&session));
        events[0].start();
        // events[1] stays Created, events[2] is already stopped.
        events[2].stop();

        assert_eq!(lifecycle.pause_all(), 1);
        assert_eq!(events[0].state(), PlaybackState::Paused);
        assert_eq!(events[1].state(), PlaybackState::Created);
        assert_eq!(events[2].state(), PlaybackState::Stopped);
    }

    #[test]
    fn bulk_operations_see_the_live_set_at_call_time() {
        let (session, events) = session_with_beds(2);
        let lifecycle = SoundEventLifecycleManager::new(Arc::clone(&session));
        lifecycle.start_all();

        // Engine teardown empties the live set before the bulk call.
        session.lock().stop();

        assert_eq!(lifecycle.pause_all(), 0);
        for event in &events {
            assert_eq!(event.state(), PlaybackState::Stopped);
        }
    }
}
