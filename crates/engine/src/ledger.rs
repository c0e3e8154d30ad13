//! Balance ledger.
//!
//! Reduces the expense history of a trip to one net balance per member:
//!
//! 1. every member starts at zero;
//! 2. each expense credits its payer with the total of its shares;
//! 3. each share debits its holder with the share amount.
//!
//! The share total equals the expense amount except for custom splits accepted
//! within [`SPLIT_TOLERANCE`](crate::SPLIT_TOLERANCE). Crediting the share total
//! keeps every expense zero-sum without touching the shares themselves.
//!
//! Personal expenses need no special case: the payer is credited and debited
//! by the same amount. Balances are recomputed from the full history on every
//! call and nothing is cached.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Expense, Member, MemberId, MoneyCents, ResultEngine};

/// Net position of one member.
///
/// `net` is positive when the member is owed money and negative when they owe
/// money. `paid` and `consumed` include personal expenses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: MemberId,
    pub name: String,
    /// Total credited to the member as payer, i.e. the share totals of the
    /// expenses they fronted.
    pub paid: MoneyCents,
    /// Total of the member's shares.
    pub consumed: MoneyCents,
    pub net: MoneyCents,
}

#[derive(Default)]
struct Totals {
    paid: MoneyCents,
    consumed: MoneyCents,
}

/// Computes the balances of `members`, in roster order.
///
/// Expenses whose `trip_id` differs from `trip_id` are skipped. Any expense of
/// the trip that breaks the share invariants aborts the computation with
/// [`EngineError::InvariantViolation`]; balances are never produced from
/// inconsistent data.
pub fn compute_balances(
    trip_id: Uuid,
    members: &[Member],
    expenses: &[Expense],
) -> ResultEngine<Vec<Balance>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    for (position, member) in members.iter().enumerate() {
        if index.insert(member.id.as_str(), position).is_some() {
            return Err(EngineError::ExistingKey(member.id.to_string()));
        }
    }

    let mut totals: Vec<Totals> = members.iter().map(|_| Totals::default()).collect();
    let overflow = |expense: &Expense| EngineError::InvariantViolation {
        expense_id: expense.id,
        reason: "balance exceeds the representable range".to_string(),
    };

    for expense in expenses {
        if expense.trip_id != trip_id {
            tracing::debug!(
                expense_id = %expense.id,
                %trip_id,
                "skipping expense of another trip"
            );
            continue;
        }

        if let Err(reason) = expense.check_invariants(|id| index.contains_key(id.as_str())) {
            tracing::warn!(expense_id = %expense.id, %trip_id, %reason, "corrupted expense");
            return Err(EngineError::InvariantViolation {
                expense_id: expense.id,
                reason,
            });
        }

        let mut credited = MoneyCents::ZERO;
        for share in &expense.shares {
            let holder = &mut totals[index[share.user_id.as_str()]];
            holder.consumed = holder
                .consumed
                .checked_add(share.amount)
                .ok_or_else(|| overflow(expense))?;
            credited = credited
                .checked_add(share.amount)
                .ok_or_else(|| overflow(expense))?;
        }
        if credited != expense.amount {
            tracing::debug!(
                expense_id = %expense.id,
                amount = %expense.amount,
                %credited,
                "crediting payer with the share total"
            );
        }

        let payer = &mut totals[index[expense.payer_id.as_str()]];
        payer.paid = payer
            .paid
            .checked_add(credited)
            .ok_or_else(|| overflow(expense))?;
    }

    // Both totals are sums of non-negative amounts, so the difference fits.
    Ok(members
        .iter()
        .zip(totals)
        .map(|(member, totals)| Balance {
            user_id: member.id.clone(),
            name: member.name.clone(),
            paid: totals.paid,
            consumed: totals.consumed,
            net: totals.paid - totals.consumed,
        })
        .collect())
}

/// Sum of all net balances, `None` if it overflows. Zero for any balance list
/// returned by [`compute_balances`].
#[must_use]
pub fn net_total(balances: &[Balance]) -> Option<MoneyCents> {
    balances
        .iter()
        .try_fold(MoneyCents::ZERO, |total, b| total.checked_add(b.net))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Currency, ExpenseDraft, SplitRequest, Trip};

    fn trip() -> Trip {
        Trip::new(
            Uuid::new_v4(),
            "Berlin",
            Currency::Eur,
            vec![
                Member::new("b", "Bob"),
                Member::new("a", "Alice"),
                Member::new("c", "Carol"),
            ],
        )
        .unwrap()
    }

    fn nets(balances: &[Balance]) -> Vec<(&str, i64)> {
        balances
            .iter()
            .map(|b| (b.user_id.as_str(), b.net.cents()))
            .collect()
    }

    #[test]
    fn empty_history_gives_zero_balances_in_roster_order() {
        let trip = trip();
        let balances = compute_balances(trip.id, trip.members(), &[]).unwrap();
        assert_eq!(nets(&balances), [("b", 0), ("a", 0), ("c", 0)]);
        assert_eq!(balances[1].name, "Alice");
    }

    #[test]
    fn tracks_paid_and_consumed() {
        let trip = trip();
        let expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(600), "a", ["a", "b", "c"])),
        )
        .unwrap();

        let balances = compute_balances(trip.id, trip.members(), &[expense]).unwrap();
        let alice = &balances[1];
        assert_eq!(alice.paid, MoneyCents::new(600));
        assert_eq!(alice.consumed, MoneyCents::new(200));
        assert_eq!(alice.net, MoneyCents::new(400));
        assert_eq!(net_total(&balances), Some(MoneyCents::ZERO));
    }

    #[test]
    fn skips_expenses_of_other_trips() {
        let trip = trip();
        let other = Trip::new(Uuid::new_v4(), "Paris", Currency::Eur, trip.members().to_vec())
            .unwrap();
        let foreign = Expense::create(
            &other,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(600), "a", ["b"])),
        )
        .unwrap();

        let balances = compute_balances(trip.id, trip.members(), &[foreign]).unwrap();
        assert!(balances.iter().all(|b| b.net.is_zero()));
    }

    #[test]
    fn reports_share_held_by_stranger() {
        let trip = trip();
        let mut expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(600), "a", ["a", "b"])),
        )
        .unwrap();
        expense.shares[1].user_id = "zed".into();

        let err = compute_balances(trip.id, trip.members(), &[expense.clone()]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvariantViolation { expense_id, .. } if expense_id == expense.id
        ));
    }

    #[test]
    fn custom_split_within_tolerance_stays_zero_sum() {
        let trip = trip();
        let expenses: Vec<Expense> = (0..3)
            .map(|_| {
                Expense::create(
                    &trip,
                    ExpenseDraft::new(SplitRequest::custom(
                        MoneyCents::new(10_000),
                        "a",
                        [("a", MoneyCents::new(5_000)), ("b", MoneyCents::new(4_999))],
                    )),
                )
                .unwrap()
            })
            .collect();
        assert_eq!(expenses[0].amount, MoneyCents::new(10_000));
        assert_eq!(expenses[0].shares_total(), MoneyCents::new(9_999));

        let balances = compute_balances(trip.id, trip.members(), &expenses).unwrap();
        assert_eq!(nets(&balances), [("b", -14_997), ("a", 14_997), ("c", 0)]);
        assert_eq!(balances[1].paid, MoneyCents::new(29_997));
        assert_eq!(net_total(&balances), Some(MoneyCents::ZERO));
    }

    #[test]
    fn overflow_names_the_offending_expense() {
        let trip = trip();
        let huge = || {
            Expense::create(
                &trip,
                ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(i64::MAX), "a", ["b"])),
            )
            .unwrap()
        };
        let (first, second) = (huge(), huge());

        let err = compute_balances(trip.id, trip.members(), &[first, second.clone()]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvariantViolation { expense_id, .. } if expense_id == second.id
        ));
    }

    #[test]
    fn net_total_detects_overflow() {
        let balance = |net| Balance {
            user_id: "a".into(),
            name: "Alice".to_string(),
            paid: MoneyCents::ZERO,
            consumed: MoneyCents::ZERO,
            net: MoneyCents::new(net),
        };
        assert_eq!(net_total(&[balance(i64::MAX), balance(1)]), None);
        assert_eq!(net_total(&[balance(5), balance(-5)]), Some(MoneyCents::ZERO));
    }

    #[test]
    fn rejects_duplicate_roster_entries() {
        let trip = trip();
        let mut members = trip.members().to_vec();
        members.push(Member::new("a", "Alice twin"));
        assert_eq!(
            compute_balances(trip.id, &members, &[]),
            Err(EngineError::ExistingKey("a".to_string()))
        );
    }
}
