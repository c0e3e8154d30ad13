//! Trips and their rosters.
//!
//! The roster is ordered and append-only: members join a trip but are never
//! removed, so every expense recorded so far keeps referring to valid members.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, EngineError, Member, MemberId, ResultEngine};

/// A trip and its roster. Built through [`Trip::new`] so the roster never
/// holds the same member twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    members: Vec<Member>,
}

impl Trip {
    /// Creates a trip, rejecting duplicated member ids.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        currency: Currency,
        members: Vec<Member>,
    ) -> ResultEngine<Self> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member.id.as_str()) {
                return Err(EngineError::ExistingKey(member.id.to_string()));
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            currency,
            members,
        })
    }

    /// Appends a member to the roster.
    pub fn add_member(&mut self, member: Member) -> ResultEngine<()> {
        if self.is_member(&member.id) {
            return Err(EngineError::ExistingKey(member.id.to_string()));
        }
        self.members.push(member);
        Ok(())
    }

    /// Roster in joining order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    #[must_use]
    pub fn is_member(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    /// Returns an error unless `id` is on the roster.
    pub fn ensure_member(&self, id: &MemberId) -> ResultEngine<()> {
        if self.is_member(id) {
            Ok(())
        } else {
            Err(EngineError::NotATripMember(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Member> {
        vec![Member::new("a", "Alice"), Member::new("b", "Bob")]
    }

    #[test]
    fn new_rejects_duplicate_members() {
        let mut members = roster();
        members.push(Member::new("a", "Another Alice"));
        let err = Trip::new(Uuid::new_v4(), "Lisbon", Currency::Eur, members).unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("a".to_string()));
    }

    #[test]
    fn add_member_appends_in_order() {
        let mut trip = Trip::new(Uuid::new_v4(), "Lisbon", Currency::Eur, roster()).unwrap();
        trip.add_member(Member::new("c", "Carol")).unwrap();

        let ids: Vec<&str> = trip.members().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(
            trip.add_member(Member::new("b", "Bob again")),
            Err(EngineError::ExistingKey("b".to_string()))
        );
    }

    #[test]
    fn ensure_member_reports_unknown_ids() {
        let trip = Trip::new(Uuid::new_v4(), "Lisbon", Currency::Eur, roster()).unwrap();
        assert!(trip.ensure_member(&MemberId::from("a")).is_ok());
        assert_eq!(
            trip.ensure_member(&MemberId::from("z")),
            Err(EngineError::NotATripMember(MemberId::from("z")))
        );
    }
}
