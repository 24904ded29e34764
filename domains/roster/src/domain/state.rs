//! Invitation lifecycle state machine
//!
//! States, events, guard conditions and terminal states for invitations.
//! The stored status column can lag behind wall-clock expiry; expiry is
//! applied lazily when a token is verified or accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::InvitationStatus;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot apply {event} in state {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Terminal state: {0} cannot transition")]
    TerminalState(String),
}

/// Invitation states. `Expired` is recoverable via resend; `Accepted`
/// and `Revoked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl InvitationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Revoked)
    }

    /// All states reachable from the current state
    pub fn valid_transitions(&self) -> &'static [InvitationState] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Expired, Self::Revoked, Self::Pending],
            Self::Expired => &[Self::Pending],
            Self::Accepted => &[],
            Self::Revoked => &[],
        }
    }
}

impl From<InvitationStatus> for InvitationState {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Pending => Self::Pending,
            InvitationStatus::Accepted => Self::Accepted,
            InvitationStatus::Expired => Self::Expired,
            InvitationStatus::Revoked => Self::Revoked,
        }
    }
}

impl From<InvitationState> for InvitationStatus {
    fn from(state: InvitationState) -> Self {
        match state {
            InvitationState::Pending => Self::Pending,
            InvitationState::Accepted => Self::Accepted,
            InvitationState::Expired => Self::Expired,
            InvitationState::Revoked => Self::Revoked,
        }
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// Events that trigger invitation state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvitationEvent {
    /// Recipient accepts with the token
    Accept,
    /// Expiry timestamp passed (applied lazily)
    Expire,
    /// Sender or admin withdraws the invitation
    Revoke,
    /// Sender re-sends: fresh token, fresh expiry
    Resend,
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Expire => write!(f, "expire"),
            Self::Revoke => write!(f, "revoke"),
            Self::Resend => write!(f, "resend"),
        }
    }
}

/// Guard context for invitation transitions
#[derive(Debug, Clone)]
pub struct InvitationGuardContext {
    /// Whether expires_at has passed
    pub is_expired: bool,
}

/// Invitation state machine
pub struct InvitationStateMachine;

impl InvitationStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: InvitationState,
        event: InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> Result<InvitationState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            (InvitationState::Pending, InvitationEvent::Accept) => {
                // Guard: expiry is checked against the clock, not the column
                if let Some(ctx) = context {
                    if ctx.is_expired {
                        return Err(StateError::GuardFailed(
                            "Cannot accept expired invitation".to_string(),
                        ));
                    }
                }
                InvitationState::Accepted
            }
            (InvitationState::Pending, InvitationEvent::Expire) => InvitationState::Expired,
            (InvitationState::Pending, InvitationEvent::Revoke) => InvitationState::Revoked,
            (InvitationState::Pending, InvitationEvent::Resend) => InvitationState::Pending,
            (InvitationState::Expired, InvitationEvent::Resend) => InvitationState::Pending,

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: InvitationState,
        event: &InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> bool {
        Self::transition(current, *event, context).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pending_to_accepted() {
        let ctx = InvitationGuardContext { is_expired: false };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Accept,
            Some(&ctx),
        );
        assert_eq!(result, Ok(InvitationState::Accepted));
    }

    #[test]
    fn test_valid_pending_to_expired() {
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Expire,
            None,
        );
        assert_eq!(result, Ok(InvitationState::Expired));
    }

    #[test]
    fn test_valid_pending_to_revoked() {
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Revoke,
            None,
        );
        assert_eq!(result, Ok(InvitationState::Revoked));
    }

    #[test]
    fn test_resend_revives_expired_invitation() {
        let result = InvitationStateMachine::transition(
            InvitationState::Expired,
            InvitationEvent::Resend,
            None,
        );
        assert_eq!(result, Ok(InvitationState::Pending));
    }

    #[test]
    fn test_resend_keeps_pending_pending() {
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Resend,
            None,
        );
        assert_eq!(result, Ok(InvitationState::Pending));
    }

    #[test]
    fn test_guard_fails_accept_past_expiry() {
        let ctx = InvitationGuardContext { is_expired: true };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Accept,
            Some(&ctx),
        );
        assert!(matches!(result, Err(StateError::GuardFailed(_))));
    }

    #[test]
    fn test_expired_cannot_be_accepted() {
        let result = InvitationStateMachine::transition(
            InvitationState::Expired,
            InvitationEvent::Accept,
            None,
        );
        assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_accepted_cannot_transition() {
        let result = InvitationStateMachine::transition(
            InvitationState::Accepted,
            InvitationEvent::Revoke,
            None,
        );
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_terminal_revoked_cannot_transition() {
        let result = InvitationStateMachine::transition(
            InvitationState::Revoked,
            InvitationEvent::Resend,
            None,
        );
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_is_terminal() {
        assert!(!InvitationState::Pending.is_terminal());
        assert!(!InvitationState::Expired.is_terminal());
        assert!(InvitationState::Accepted.is_terminal());
        assert!(InvitationState::Revoked.is_terminal());
    }

    #[test]
    fn test_valid_transitions() {
        let pending = InvitationState::Pending.valid_transitions();
        assert!(pending.contains(&InvitationState::Accepted));
        assert!(pending.contains(&InvitationState::Expired));
        assert!(pending.contains(&InvitationState::Revoked));

        assert_eq!(
            InvitationState::Expired.valid_transitions(),
            &[InvitationState::Pending]
        );
        assert!(InvitationState::Accepted.valid_transitions().is_empty());
        assert!(InvitationState::Revoked.valid_transitions().is_empty());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Expired,
            InvitationStatus::Revoked,
        ] {
            let state = InvitationState::from(status);
            assert_eq!(InvitationStatus::from(state), status);
        }
    }
}
