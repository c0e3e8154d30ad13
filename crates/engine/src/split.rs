//! Split calculator.
//!
//! Turns a requested expense (total, payer, participants, policy) into the
//! [`Share`]s each participant is responsible for. Shares are produced only if
//! the whole request is valid; on error nothing is returned.
//!
//! ## Equal splits
//!
//! Amounts are integer cents, so `total / n` is rarely exact. Every participant
//! gets the floor of the quotient and the `total % n` leftover cents are handed
//! out one each to participants sorted by **ascending member id**. The result
//! sums to `total` exactly and does not depend on the order participants were
//! given in.
//!
//! ## Custom splits
//!
//! Amounts are taken as given and must add up to the total within
//! [`SPLIT_TOLERANCE`]. They are never adjusted.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{EngineError, MemberId, MoneyCents, ResultEngine, Trip};

/// Largest accepted gap between the custom shares and the expense total.
pub const SPLIT_TOLERANCE: MoneyCents = MoneyCents::new(1);

/// Portion of one expense attributed to one member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub user_id: MemberId,
    pub amount: MoneyCents,
    /// Settlement hint for the persistence layer: `true` only for the payer's
    /// own share. The ledger ignores it.
    pub paid: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    Equal,
    Custom(BTreeMap<MemberId, MoneyCents>),
}

/// Input of [`compute_split`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub total: MoneyCents,
    pub payer: MemberId,
    /// Ignored for personal expenses. Duplicates are collapsed.
    pub participants: Vec<MemberId>,
    pub policy: SplitPolicy,
    pub is_personal: bool,
}

impl SplitRequest {
    /// Equal split among `participants`.
    pub fn equal(
        total: MoneyCents,
        payer: impl Into<MemberId>,
        participants: impl IntoIterator<Item = impl Into<MemberId>>,
    ) -> Self {
        Self {
            total,
            payer: payer.into(),
            participants: participants.into_iter().map(Into::into).collect(),
            policy: SplitPolicy::Equal,
            is_personal: false,
        }
    }

    /// Custom split; the participants are the keys of `amounts`.
    pub fn custom(
        total: MoneyCents,
        payer: impl Into<MemberId>,
        amounts: impl IntoIterator<Item = (impl Into<MemberId>, MoneyCents)>,
    ) -> Self {
        let amounts: BTreeMap<MemberId, MoneyCents> = amounts
            .into_iter()
            .map(|(id, amount)| (id.into(), amount))
            .collect();
        Self {
            total,
            payer: payer.into(),
            participants: amounts.keys().cloned().collect(),
            policy: SplitPolicy::Custom(amounts),
            is_personal: false,
        }
    }

    /// Expense entirely attributed to the payer.
    pub fn personal(total: MoneyCents, payer: impl Into<MemberId>) -> Self {
        let payer = payer.into();
        Self {
            total,
            participants: vec![payer.clone()],
            payer,
            policy: SplitPolicy::Equal,
            is_personal: true,
        }
    }
}

/// Computes the shares of an expense.
///
/// Validation order: total, payer, personal shortcut, participants, policy.
pub fn compute_split(trip: &Trip, request: &SplitRequest) -> ResultEngine<Vec<Share>> {
    if !request.total.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "expense amount must be > 0, got {}",
            request.total
        )));
    }
    trip.ensure_member(&request.payer)?;

    if request.is_personal {
        tracing::debug!(payer = %request.payer, total = %request.total, "personal expense");
        return Ok(vec![Share {
            user_id: request.payer.clone(),
            amount: request.total,
            paid: true,
        }]);
    }

    let participants = dedup_participants(&request.participants);
    if participants.is_empty() {
        return Err(EngineError::EmptyParticipants);
    }
    for participant in &participants {
        trip.ensure_member(participant)?;
    }

    let amounts = match &request.policy {
        SplitPolicy::Equal => equal_amounts(request.total, &participants),
        SplitPolicy::Custom(custom) => custom_amounts(trip, request.total, &participants, custom)?,
    };

    let shares: Vec<Share> = participants
        .into_iter()
        .zip(amounts)
        .map(|(user_id, amount)| Share {
            paid: user_id == request.payer,
            user_id,
            amount,
        })
        .collect();

    tracing::debug!(
        payer = %request.payer,
        total = %request.total,
        shares = shares.len(),
        "computed split"
    );
    Ok(shares)
}

fn dedup_participants(participants: &[MemberId]) -> Vec<MemberId> {
    let mut seen: HashSet<&MemberId> = HashSet::with_capacity(participants.len());
    participants
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Amounts aligned with `participants`.
fn equal_amounts(total: MoneyCents, participants: &[MemberId]) -> Vec<MoneyCents> {
    let count = participants.len() as i64;
    let base = total.cents() / count;
    let remainder = (total.cents() % count) as usize;

    let mut by_id: Vec<usize> = (0..participants.len()).collect();
    by_id.sort_by(|&a, &b| participants[a].cmp(&participants[b]));

    let mut amounts = vec![MoneyCents::new(base); participants.len()];
    for &idx in by_id.iter().take(remainder) {
        amounts[idx] += MoneyCents::new(1);
    }
    amounts
}

/// Amounts aligned with `participants`.
fn custom_amounts(
    trip: &Trip,
    total: MoneyCents,
    participants: &[MemberId],
    custom: &BTreeMap<MemberId, MoneyCents>,
) -> ResultEngine<Vec<MoneyCents>> {
    for id in custom.keys() {
        trip.ensure_member(id)?;
        if !participants.contains(id) {
            return Err(EngineError::InvalidAmount(format!(
                "custom amount given for {id}, who is not a participant"
            )));
        }
    }

    let mut amounts = Vec::with_capacity(participants.len());
    let mut sum = MoneyCents::ZERO;
    for id in participants {
        let amount = *custom.get(id).ok_or_else(|| {
            EngineError::InvalidAmount(format!("missing custom amount for {id}"))
        })?;
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "share of {id} must be >= 0, got {amount}"
            )));
        }
        sum = sum
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("shares too large".to_string()))?;
        amounts.push(amount);
    }

    if (sum - total).abs() > SPLIT_TOLERANCE {
        return Err(EngineError::SplitMismatch {
            sum,
            expected: total,
        });
    }
    Ok(amounts)
}
