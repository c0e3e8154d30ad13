use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Chf,
}

pub mod trip {
    use super::*;

    use crate::expense::ExpenseNew;

    /// A member of the trip roster.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripView {
        /// Trip id (UUID). A random one is used when missing.
        pub id: Option<Uuid>,
        pub name: String,
        pub currency: Option<Currency>,
        /// Roster, in joining order.
        pub members: Vec<MemberView>,
    }

    /// A trip with its expense history, as read from a trip file.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TripFile {
        pub trip: TripView,
        #[serde(default)]
        pub expenses: Vec<ExpenseNew>,
    }
}

pub mod expense {
    use std::collections::BTreeMap;

    use super::*;

    /// How an expense is divided among its participants.
    ///
    /// JSON: `"equal"` or `{"custom": {"alice": 12.5, "bob": 7.5}}`.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitKind {
        #[default]
        Equal,
        /// Amount per participant, in major units.
        Custom(BTreeMap<String, f64>),
    }

    /// Request body for recording an expense.
    ///
    /// Amounts are major units (e.g. `12.5`) and are snapped to the nearest cent.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub id: Option<Uuid>,
        pub payer: String,
        pub amount: f64,
        #[serde(default)]
        pub is_personal: bool,
        /// Ignored for personal expenses and custom splits.
        #[serde(default)]
        pub participants: Vec<String>,
        #[serde(default)]
        pub split: SplitKind,
        pub description: Option<String>,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub user_id: String,
        pub amount_minor: i64,
        pub paid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub payer: String,
        pub amount_minor: i64,
        pub is_personal: bool,
        pub description: Option<String>,
        pub shares: Vec<ShareView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: String,
        pub name: String,
        pub paid_minor: i64,
        pub consumed_minor: i64,
        /// Positive: the member is owed money. Negative: the member owes money.
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub trip_id: Uuid,
        pub currency: Currency,
        pub balances: Vec<BalanceView>,
    }
}

#[cfg(test)]
mod tests {
    use super::expense::{ExpenseNew, SplitKind};
    use super::trip::TripFile;

    #[test]
    fn expense_defaults_to_equal_split() {
        let expense: ExpenseNew =
            serde_json::from_str(r#"{"payer": "a", "amount": 12.5, "participants": ["a", "b"]}"#)
                .unwrap();
        assert_eq!(expense.split, SplitKind::Equal);
        assert!(!expense.is_personal);
        assert!(expense.occurred_at.is_none());
    }

    #[test]
    fn parses_custom_split_and_trip_file() {
        let file: TripFile = serde_json::from_str(
            r#"{
                "trip": {"name": "Oslo", "currency": "GBP", "members": [{"id": "a", "name": "Ann"}]},
                "expenses": [
                    {"payer": "a", "amount": 3, "split": {"custom": {"a": 3.0}},
                     "occurred_at": "2024-05-01T10:00:00+02:00"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(file.trip.currency, Some(super::Currency::Gbp));
        assert!(file.trip.id.is_none());
        match &file.expenses[0].split {
            SplitKind::Custom(amounts) => assert_eq!(amounts.get("a"), Some(&3.0)),
            other => panic!("unexpected split: {other:?}"),
        }
    }
}
