/// Run-state reported by tracking and surface-detection providers.
///
/// A provider that is not [`ProviderState::Running`] yields no data for a
/// sampling tick; that is a skip, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderState {
    #[default]
    Initialized,
    Running,
    Paused,
    Stopped,
}

impl ProviderState {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}
