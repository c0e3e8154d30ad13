//! Plain-text rendering of balances and splits.

use engine::{Balance, Expense, MoneyCents, Trip};

fn signed(amount: MoneyCents) -> String {
    if amount.is_positive() {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max(6)
}

pub fn balances_table(trip: &Trip, balances: &[Balance]) -> String {
    let width = name_width(balances.iter().map(|b| b.name.as_str()));
    let mut out = format!("{} ({})\n", trip.name, trip.currency);
    out.push_str(&format!(
        "{:<width$}  {:>12}  {:>12}  {:>12}\n",
        "MEMBER", "PAID", "SHARE", "NET"
    ));
    for balance in balances {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {:>12}  {:>12}\n",
            balance.name,
            balance.paid.to_string(),
            balance.consumed.to_string(),
            signed(balance.net),
        ));
    }
    out
}

pub fn split_table(trip: &Trip, expense: &Expense) -> String {
    let width = name_width(trip.members().iter().map(|m| m.name.as_str()));
    let mut out = format!(
        "{} paid by {}\n",
        trip.currency.format(expense.amount),
        display_name(trip, expense.payer_id.as_str())
    );
    for share in &expense.shares {
        out.push_str(&format!(
            "{:<width$}  {:>12}  {}\n",
            display_name(trip, share.user_id.as_str()),
            share.amount.to_string(),
            if share.paid { "paid" } else { "unpaid" },
        ));
    }
    out
}

fn display_name<'a>(trip: &'a Trip, id: &'a str) -> &'a str {
    trip.members()
        .iter()
        .find(|m| m.id.as_str() == id)
        .map_or(id, |m| m.name.as_str())
}

#[cfg(test)]
mod tests {
    use engine::{Currency, ExpenseDraft, Member, SplitRequest, compute_balances};
    use uuid::Uuid;

    use super::*;

    fn trip() -> Trip {
        Trip::new(
            Uuid::new_v4(),
            "Lisbon",
            Currency::Eur,
            vec![Member::new("a", "Anna"), Member::new("b", "Ben")],
        )
        .unwrap()
    }

    #[test]
    fn renders_signed_nets_in_roster_order() {
        let trip = trip();
        let expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(1000), "b", ["a", "b"])),
        )
        .unwrap();
        let balances = compute_balances(trip.id, trip.members(), &[expense]).unwrap();

        let table = balances_table(&trip, &balances);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(table.ends_with('\n'));
        assert_eq!(lines[0], "Lisbon (EUR)");
        assert!(lines[2].starts_with("Anna"));
        assert!(lines[2].ends_with("-5.00"));
        assert!(lines[3].starts_with("Ben"));
        assert!(lines[3].ends_with("+5.00"));
    }

    #[test]
    fn renders_split_with_paid_flags() {
        let trip = trip();
        let expense = Expense::create(
            &trip,
            ExpenseDraft::new(SplitRequest::equal(MoneyCents::new(1001), "a", ["a", "b"])),
        )
        .unwrap();

        let table = split_table(&trip, &expense);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "10.01 EUR paid by Anna");
        assert!(lines[1].contains("5.01") && lines[1].ends_with("paid"));
        assert!(lines[2].contains("5.00") && lines[2].ends_with("unpaid"));
    }
}
