//! Expense-splitting and balance-ledger engine for shared trips.
//!
//! Two pure components:
//!
//! - the split calculator ([`compute_split`]) turns a requested expense into
//!   the [`Share`]s owed by each participant;
//! - the ledger ([`compute_balances`]) folds the expense history of a trip
//!   into one net [`Balance`] per member.
//!
//! All amounts are [`MoneyCents`]. The engine performs no I/O and holds no
//! state: loading and persisting trips and expenses is up to the caller.

pub use currency::Currency;
pub use error::EngineError;
pub use expense::{Expense, ExpenseDraft};
pub use ledger::{Balance, compute_balances, net_total};
pub use members::{Member, MemberId};
pub use money::MoneyCents;
pub use split::{SPLIT_TOLERANCE, Share, SplitPolicy, SplitRequest, compute_split};
pub use trip::Trip;

mod currency;
mod error;
mod expense;
mod ledger;
mod members;
mod money;
mod split;
mod trip;

pub type ResultEngine<T> = Result<T, EngineError>;
