//! Physical channel policy applied after a card request

use derive_more::Display;

/// Policy for managing the physical channel after a card request is executed
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelControl {
    /// Leave the physical channel open
    #[default]
    #[display("KEEP_OPEN")]
    KeepOpen,

    /// Terminate the communication with the card: the physical channel closes at once, or a
    /// card removal sequence starts when the reader runs in observation mode
    #[display("CLOSE_AFTER")]
    CloseAfter,
}

impl ChannelControl {
    /// Whether the policy ends the communication
    pub const fn closes_channel(self) -> bool {
        matches!(self, Self::CloseAfter)
    }
}
