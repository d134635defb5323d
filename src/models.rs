//! Domain models that mirror the backend's JSON records and get passed
//! throughout the TUI. These types stay light-weight data holders so other
//! layers can focus on presentation and transport logic; the client never
//! mutates a fetched record, it re-fetches after every write.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A book record as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Book {
    /// Backend-assigned identifier. Kept around even when the UI only needs
    /// display information because edit/delete flows bubble it back to the
    /// API layer.
    #[serde(rename = "_id")]
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Available copies. Unsigned so the "never negative" invariant holds by
    /// type.
    pub copies: u32,
}

impl Book {
    /// A book can back a new loan only while copies remain.
    pub fn loanable(&self) -> bool {
        self.copies > 0
    }
}

/// Payload for creating or updating a book.
#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub copies: u32,
}

/// A library member record.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

/// Payload for creating or updating a member.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
}

/// A loan's member or book reference. The backend sometimes expands these
/// into full objects and sometimes sends a bare identifier, so we accept
/// both shapes and fall back to "Unknown" at render time when no label is
/// available.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoanParty {
    Expanded {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
    Reference(String),
}

impl LoanParty {
    /// Display label for the party: a member's name or a book's title,
    /// whichever the expanded object carries.
    pub fn label(&self) -> Option<&str> {
        match self {
            LoanParty::Expanded { name, title, .. } => name.as_deref().or(title.as_deref()),
            LoanParty::Reference(_) => None,
        }
    }
}

/// A loan record linking a member to a book.
#[derive(Debug, Clone, Deserialize)]
pub struct Loan {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "memberId")]
    pub member: Option<LoanParty>,
    #[serde(rename = "bookId")]
    pub book: Option<LoanParty>,
    #[serde(rename = "loanedAt")]
    pub loaned_at: DateTime<Utc>,
    #[serde(rename = "dueAt")]
    pub due_at: DateTime<Utc>,
    #[serde(rename = "returnedAt", default)]
    pub returned_at: Option<DateTime<Utc>>,
}

/// Display status for a loan. Derived at render time, never stored, so a
/// view left open can show a loan slipping overdue without a re-fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn text(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Overdue => "Overdue",
            LoanStatus::Returned => "Returned",
        }
    }
}

impl Loan {
    /// Compute the loan's status relative to `now`. A set return timestamp
    /// wins regardless of the due date; otherwise the loan is overdue once
    /// the due timestamp has passed.
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.returned_at.is_some() {
            LoanStatus::Returned
        } else if self.due_at < now {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// Payload for creating a loan. Field names match the backend contract.
#[derive(Debug, Clone, Serialize)]
pub struct NewLoan {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "bookId")]
    pub book_id: String,
    #[serde(rename = "dueAt")]
    pub due_at: NaiveDate,
}

/// Truncate a backend identifier for table display.
pub fn short_id(id: &str) -> String {
    if id.chars().count() > 8 {
        let prefix: String = id.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn loan(due_offset_hours: i64, returned: bool) -> Loan {
        Loan {
            id: "abc123".to_string(),
            member: None,
            book: None,
            loaned_at: now() - chrono::Duration::days(3),
            due_at: now() + chrono::Duration::hours(due_offset_hours),
            returned_at: returned.then(|| now() - chrono::Duration::hours(1)),
        }
    }

    #[test]
    fn active_before_due_date() {
        assert_eq!(loan(24, false).status_at(now()), LoanStatus::Active);
    }

    #[test]
    fn overdue_after_due_date() {
        assert_eq!(loan(-24, false).status_at(now()), LoanStatus::Overdue);
    }

    #[test]
    fn returned_wins_even_when_past_due() {
        assert_eq!(loan(-24, true).status_at(now()), LoanStatus::Returned);
        assert_eq!(loan(24, true).status_at(now()), LoanStatus::Returned);
    }

    #[test]
    fn short_id_truncates_long_identifiers() {
        assert_eq!(short_id("66f2a9c81b2d4e0012345678"), "66f2a9c8...");
        assert_eq!(short_id("tiny"), "tiny");
    }

    #[test]
    fn loan_party_accepts_both_wire_shapes() {
        let expanded: LoanParty = serde_json::from_str(r#"{"_id":"m1","name":"Ada"}"#).unwrap();
        assert_eq!(expanded.label(), Some("Ada"));

        let reference: LoanParty = serde_json::from_str(r#""m1""#).unwrap();
        assert_eq!(reference.label(), None);
    }
}
