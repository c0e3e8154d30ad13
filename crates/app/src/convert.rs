//! Mapping between the wire types of `api_types` and the engine model.

use api_types::{
    balance::{BalanceView, BalancesResponse},
    expense::{ExpenseNew, ExpenseView, ShareView, SplitKind},
    trip::TripView,
};
use chrono::Utc;
use engine::{Balance, Currency, Expense, ExpenseDraft, Member, MoneyCents, SplitRequest, Trip};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub fn currency(value: api_types::Currency) -> Currency {
    match value {
        api_types::Currency::Eur => Currency::Eur,
        api_types::Currency::Usd => Currency::Usd,
        api_types::Currency::Gbp => Currency::Gbp,
        api_types::Currency::Chf => Currency::Chf,
    }
}

fn currency_view(value: Currency) -> api_types::Currency {
    match value {
        Currency::Eur => api_types::Currency::Eur,
        Currency::Usd => api_types::Currency::Usd,
        Currency::Gbp => api_types::Currency::Gbp,
        Currency::Chf => api_types::Currency::Chf,
    }
}

pub fn trip(view: TripView, default_currency: api_types::Currency) -> Result<Trip> {
    let members = view
        .members
        .into_iter()
        .map(|m| Member::new(m.id.trim(), m.name.trim()))
        .collect();
    let trip = Trip::new(
        view.id.unwrap_or_else(Uuid::new_v4),
        view.name,
        currency(view.currency.unwrap_or(default_currency)),
        members,
    )?;
    Ok(trip)
}

pub fn draft(request: &ExpenseNew) -> Result<ExpenseDraft> {
    let total = MoneyCents::from_major(request.amount)?;
    let payer = request.payer.trim();

    let split = if request.is_personal {
        SplitRequest::personal(total, payer)
    } else {
        match &request.split {
            SplitKind::Equal => {
                SplitRequest::equal(total, payer, request.participants.iter().map(|p| p.trim()))
            }
            SplitKind::Custom(amounts) => {
                let amounts = amounts
                    .iter()
                    .map(|(id, amount)| -> Result<(String, MoneyCents)> {
                        Ok((id.trim().to_string(), MoneyCents::from_major(*amount)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                SplitRequest::custom(total, payer, amounts)
            }
        }
    };

    let mut draft = ExpenseDraft::new(split);
    if let Some(description) = &request.description {
        draft = draft.description(description.as_str());
    }
    if let Some(occurred_at) = request.occurred_at {
        draft = draft.occurred_at(occurred_at.with_timezone(&Utc));
    }
    Ok(draft)
}

/// Runs every request through the split calculator. The first invalid request
/// aborts the whole load.
pub fn expenses(trip: &Trip, requests: &[ExpenseNew]) -> Result<Vec<Expense>> {
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            let expense = draft(request)
                .and_then(|draft| Expense::create(trip, draft).map_err(AppError::from))
                .map_err(|err| match err {
                    AppError::Engine(source) => AppError::Expense {
                        index: index + 1,
                        source,
                    },
                    other => other,
                })?;
            Ok(match request.id {
                Some(id) => Expense { id, ..expense },
                None => expense,
            })
        })
        .collect()
}

pub fn expense_view(expense: &Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        payer: expense.payer_id.to_string(),
        amount_minor: expense.amount.cents(),
        is_personal: expense.is_personal,
        description: expense.description.clone(),
        shares: expense
            .shares
            .iter()
            .map(|s| ShareView {
                user_id: s.user_id.to_string(),
                amount_minor: s.amount.cents(),
                paid: s.paid,
            })
            .collect(),
    }
}

pub fn balances_response(trip: &Trip, balances: &[Balance]) -> BalancesResponse {
    BalancesResponse {
        trip_id: trip.id,
        currency: currency_view(trip.currency),
        balances: balances
            .iter()
            .map(|b| BalanceView {
                user_id: b.user_id.to_string(),
                name: b.name.clone(),
                paid_minor: b.paid.cents(),
                consumed_minor: b.consumed.cents(),
                net_minor: b.net.cents(),
            })
            .collect(),
    }
}
