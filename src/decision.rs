//! Quorum rule deciding when a bid is published or canceled.
//!
//! Publication needs `quorum` distinct approvals; a single rejection cancels
//! the bid no matter how many approvals it already has. `PUBLISHED` and
//! `CANCELED` absorb further decisions.

use serde::{Serialize, Serializer};

use crate::error::{ServiceError, ServiceResult};
use crate::models::Bid;
use crate::status::{BidStatus, Decision};

pub const DEFAULT_APPROVAL_QUORUM: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Pending { remaining: u32 },
    Published,
    Rejected,
    AlreadyPublished,
    AlreadyCanceled,
}

impl DecisionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending { .. } => "pending",
            Self::Published => "published",
            Self::Rejected => "rejected",
            Self::AlreadyPublished => "already_published",
            Self::AlreadyCanceled => "already_canceled",
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            Self::Pending { remaining } => Some(*remaining),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Pending { remaining } => {
                format!("bid is not published yet: {remaining} more approvals needed")
            }
            Self::Published => "bid published".to_string(),
            Self::Rejected => "bid rejected".to_string(),
            Self::AlreadyPublished => "bid is already published".to_string(),
            Self::AlreadyCanceled => "bid is already canceled".to_string(),
        }
    }

    /// Whether the outcome changed the bid.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Pending { .. } | Self::Published | Self::Rejected
        )
    }
}

impl Serialize for DecisionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            status: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            remaining: Option<u32>,
            message: String,
        }

        Wire {
            status: self.label(),
            remaining: self.remaining(),
            message: self.message(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumRule {
    quorum: u32,
}

impl Default for QuorumRule {
    fn default() -> Self {
        Self {
            quorum: DEFAULT_APPROVAL_QUORUM,
        }
    }
}

impl QuorumRule {
    pub fn new(quorum: u32) -> Self {
        Self {
            quorum: quorum.max(1),
        }
    }

    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    /// The informational outcome for a bid that no longer accepts decisions.
    pub fn settled(&self, bid: &Bid) -> Option<DecisionOutcome> {
        if !bid.status.is_terminal() {
            return None;
        }
        Some(if bid.status == BidStatus::Published {
            DecisionOutcome::AlreadyPublished
        } else {
            DecisionOutcome::AlreadyCanceled
        })
    }

    /// Applies one vote by an already authorized user. The caller persists the
    /// bid when the outcome is a mutation.
    pub fn apply(
        &self,
        bid: &mut Bid,
        username: &str,
        decision: Decision,
    ) -> ServiceResult<DecisionOutcome> {
        if let Some(outcome) = self.settled(bid) {
            return Ok(outcome);
        }
        if bid.approved_by.contains(username) {
            return Err(ServiceError::Conflict(format!(
                "user '{username}' has already decided on this bid"
            )));
        }

        match decision {
            Decision::Reject => {
                bid.status = BidStatus::Canceled;
                Ok(DecisionOutcome::Rejected)
            }
            Decision::Approve => {
                bid.approved_by.insert(username)?;
                let approvals = bid.approved_by.len() as u32;
                if approvals >= self.quorum {
                    bid.status = BidStatus::Published;
                    Ok(DecisionOutcome::Published)
                } else {
                    Ok(DecisionOutcome::Pending {
                        remaining: self.quorum - approvals,
                    })
                }
            }
        }
    }
}
