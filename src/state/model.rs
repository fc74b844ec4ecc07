/// Lifecycle of a single crop/zoom session. `Committed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Active,
    Committed,
    Cancelled,
}

impl SessionState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled)
    }
}
