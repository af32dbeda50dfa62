use std::fmt;

/// Negotiation progress of one peer session.
///
/// `Offering` and `Answering` are held while a local description is being
/// produced; both settle back into `Negotiating` (or `Connected` when
/// renegotiating). `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    AwaitingLocalCapability,
    Offering,
    Answering,
    Negotiating,
    Connected,
    Closed,
}

impl NegotiationState {
    pub fn is_closed(&self) -> bool {
        matches!(self, NegotiationState::Closed)
    }

    /// States in which remote offers and answers are processed.
    pub fn accepts_descriptions(&self) -> bool {
        matches!(self, NegotiationState::Negotiating | NegotiationState::Connected)
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::AwaitingLocalCapability => "awaiting-local-capability",
            NegotiationState::Offering => "offering",
            NegotiationState::Answering => "answering",
            NegotiationState::Negotiating => "negotiating",
            NegotiationState::Connected => "connected",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
