use thiserror::Error;

use crate::db::types::{CardPaymentStatus, ManualPaymentStatus};

/// A reviewer's verdict on a pending manual purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReviewDecision {
    Verified,
    Rejected,
}

impl ReviewDecision {
    pub(crate) fn target_status(self) -> ManualPaymentStatus {
        match self {
            ReviewDecision::Verified => ManualPaymentStatus::Verified,
            ReviewDecision::Rejected => ManualPaymentStatus::Rejected,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TransitionError {
    #[error("purchase is not a manual payment")]
    NotManual,
    #[error("purchase already reviewed as {0:?}")]
    AlreadyTerminal(ManualPaymentStatus),
}

/// The manual state machine: `pending -> verified | rejected`, nothing
/// else. Used to classify a failed CAS into the right error before the
/// row is re-read.
pub(crate) fn review_transition(
    current: Option<ManualPaymentStatus>,
    decision: ReviewDecision,
) -> Result<ManualPaymentStatus, TransitionError> {
    match current {
        None => Err(TransitionError::NotManual),
        Some(ManualPaymentStatus::Pending) => Ok(decision.target_status()),
        Some(terminal) => Err(TransitionError::AlreadyTerminal(terminal)),
    }
}

/// Card settlements reported by the provider callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WebhookOutcome {
    Completed,
    Failed,
}

impl WebhookOutcome {
    pub(crate) fn target_status(self) -> CardPaymentStatus {
        match self {
            WebhookOutcome::Completed => CardPaymentStatus::Completed,
            WebhookOutcome::Failed => CardPaymentStatus::Failed,
        }
    }

    /// A completed card payment enrolls exactly like a verified manual one.
    pub(crate) fn grants_enrollment(self) -> bool {
        matches!(self, WebhookOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_verdict() {
        assert_eq!(
            review_transition(Some(ManualPaymentStatus::Pending), ReviewDecision::Verified),
            Ok(ManualPaymentStatus::Verified)
        );
        assert_eq!(
            review_transition(Some(ManualPaymentStatus::Pending), ReviewDecision::Rejected),
            Ok(ManualPaymentStatus::Rejected)
        );
    }

    #[test]
    fn terminal_states_reject_re_review() {
        for terminal in [ManualPaymentStatus::Verified, ManualPaymentStatus::Rejected] {
            for decision in [ReviewDecision::Verified, ReviewDecision::Rejected] {
                assert_eq!(
                    review_transition(Some(terminal), decision),
                    Err(TransitionError::AlreadyTerminal(terminal))
                );
            }
        }
    }

    #[test]
    fn card_purchases_are_not_reviewable() {
        assert_eq!(
            review_transition(None, ReviewDecision::Verified),
            Err(TransitionError::NotManual)
        );
    }

    #[test]
    fn only_completed_webhooks_enroll() {
        assert!(WebhookOutcome::Completed.grants_enrollment());
        assert!(!WebhookOutcome::Failed.grants_enrollment());
    }
}
