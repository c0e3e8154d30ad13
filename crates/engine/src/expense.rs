//! Expenses.
//!
//! An [`Expense`] and its [`Share`]s are built together by [`Expense::create`],
//! which runs the split calculator first: an expense that fails validation
//! never exists. Records loaded back from storage can be re-checked with
//! [`Expense::validate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MemberId, MoneyCents, ResultEngine, Share, SplitRequest, Trip, compute_split,
    split::SPLIT_TOLERANCE,
};

/// Everything needed to record an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub split: SplitRequest,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ExpenseDraft {
    pub fn new(split: SplitRequest) -> Self {
        Self {
            split,
            description: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub payer_id: MemberId,
    pub amount: MoneyCents,
    pub is_personal: bool,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub shares: Vec<Share>,
}

impl Expense {
    /// Splits the draft and builds the expense with a fresh id.
    pub fn create(trip: &Trip, draft: ExpenseDraft) -> ResultEngine<Self> {
        Self::build(Uuid::new_v4(), trip, draft)
    }

    /// Replaces the content of an existing expense, validating the new draft
    /// exactly like [`Expense::create`]. The id is kept.
    pub fn amend(self, trip: &Trip, draft: ExpenseDraft) -> ResultEngine<Self> {
        if self.trip_id != trip.id {
            return Err(EngineError::InvariantViolation {
                expense_id: self.id,
                reason: format!("expense belongs to trip {}, not {}", self.trip_id, trip.id),
            });
        }
        Self::build(self.id, trip, draft)
    }

    fn build(id: Uuid, trip: &Trip, draft: ExpenseDraft) -> ResultEngine<Self> {
        let shares = compute_split(trip, &draft.split)?;
        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            id,
            trip_id: trip.id,
            payer_id: draft.split.payer,
            amount: draft.split.total,
            is_personal: draft.split.is_personal,
            description,
            occurred_at: draft.occurred_at,
            shares,
        })
    }

    /// Sum of all share amounts.
    #[must_use]
    pub fn shares_total(&self) -> MoneyCents {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Share owed by `member`, zero if they are not part of the expense.
    #[must_use]
    pub fn share_of(&self, member: &MemberId) -> MoneyCents {
        self.shares
            .iter()
            .filter(|s| &s.user_id == member)
            .map(|s| s.amount)
            .sum()
    }

    /// Re-checks a stored expense against the trip it claims to belong to.
    pub fn validate(&self, trip: &Trip) -> ResultEngine<()> {
        if self.trip_id != trip.id {
            return Err(EngineError::InvariantViolation {
                expense_id: self.id,
                reason: format!("expense belongs to trip {}, not {}", self.trip_id, trip.id),
            });
        }
        self.check_invariants(|id| trip.is_member(id))
            .map_err(|reason| EngineError::InvariantViolation {
                expense_id: self.id,
                reason,
            })
    }

    /// Checks amounts, membership and share consistency. Returns the reason of
    /// the first violation found.
    pub(crate) fn check_invariants(
        &self,
        is_member: impl Fn(&MemberId) -> bool,
    ) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err(format!("amount must be > 0, got {}", self.amount));
        }
        if !is_member(&self.payer_id) {
            return Err(format!("payer {} is not a trip member", self.payer_id));
        }

        let mut total = MoneyCents::ZERO;
        for share in &self.shares {
            if !is_member(&share.user_id) {
                return Err(format!("share holder {} is not a trip member", share.user_id));
            }
            if share.amount.is_negative() {
                return Err(format!(
                    "share of {} is negative: {}",
                    share.user_id, share.amount
                ));
            }
            total = total
                .checked_add(share.amount)
                .ok_or_else(|| "shares overflow".to_string())?;
        }

        if self.is_personal {
            match self.shares.as_slice() {
                [share] if share.user_id == self.payer_id && share.amount == self.amount => {}
                _ => {
                    return Err(
                        "personal expense must have exactly one share, owned by the payer and \
                         equal to the amount"
                            .to_string(),
                    );
                }
            }
        } else {
            if self.shares.is_empty() {
                return Err("expense has no shares".to_string());
            }
            if (total - self.amount).abs() > SPLIT_TOLERANCE {
                return Err(format!("shares sum to {total}, expected {}", self.amount));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Currency, Member};

    fn trip() -> Trip {
        Trip::new(
            Uuid::new_v4(),
            "Crete",
            Currency::Eur,
            vec![Member::new("a", "Alice"), Member::new("b", "Bob")],
        )
        .unwrap()
    }

    #[test]
    fn create_builds_expense_with_shares() {
        let trip = trip();
        let draft = ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(1001), "a", ["a", "b"]))
            .description("  Ferry tickets ");
        let expense = Expense::create(&trip, draft).unwrap();

        assert_eq!(expense.trip_id, trip.id);
        assert_eq!(expense.description.as_deref(), Some("Ferry tickets"));
        assert_eq!(expense.shares_total(), MoneyCents::new(1001));
        assert_eq!(expense.share_of(&"a".into()), MoneyCents::new(501));
        assert_eq!(expense.share_of(&"b".into()), MoneyCents::new(500));
        assert!(expense.validate(&trip).is_ok());
    }

    #[test]
    fn create_fails_without_partial_state() {
        let draft = ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(100), "a", ["zed"]));
        assert_eq!(
            Expense::create(&trip(), draft),
            Err(EngineError::NotATripMember("zed".into()))
        );
    }

    #[test]
    fn amend_keeps_id_and_revalidates() {
        let trip = trip();
        let expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(100), "a", ["a", "b"])),
        )
        .unwrap();
        let id = expense.id;

        let amended = expense
            .clone()
            .amend(
                &trip,
                ExpenseDraft::new(SplitRequest::personal(MoneyCents::new(300), "b")),
            )
            .unwrap();
        assert_eq!(amended.id, id);
        assert!(amended.is_personal);
        assert_eq!(amended.shares_total(), MoneyCents::new(300));

        let bad = SplitRequest::custom(MoneyCents::new(100), "a", [("a", MoneyCents::new(90))]);
        assert!(matches!(
            expense.amend(&trip, ExpenseDraft::new(bad)),
            Err(EngineError::SplitMismatch { .. })
        ));
    }

    #[test]
    fn validate_flags_tampered_records() {
        let trip = trip();
        let mut expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(100), "a", ["a", "b"])),
        )
        .unwrap();
        expense.shares[1].amount = MoneyCents::new(10);

        let err = expense.validate(&trip).unwrap_err();
        assert!(matches!(
            &err,
            EngineError::InvariantViolation { expense_id, .. } if *expense_id == expense.id
        ));
        assert!(!err.is_validation());
    }

    #[test]
    fn validate_checks_personal_shape() {
        let trip = trip();
        let mut expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::personal(MoneyCents::new(100), "a")),
        )
        .unwrap();
        expense.shares[0].user_id = "b".into();
        assert!(expense.validate(&trip).is_err());
    }
}
