//! Pure mapping from fetched collections to display rows. Nothing here
//! touches the network or the terminal; given the same records (and, for
//! loans, the same clock reading) the output is identical, which is what
//! makes the table content testable without a draw pass.

use chrono::{DateTime, Utc};

use crate::models::{short_id, Book, Loan, Member};

use super::command::Section;

pub const BOOK_HEADERS: [&str; 4] = ["ISBN", "Title", "Author", "Copies"];
pub const MEMBER_HEADERS: [&str; 4] = ["ID", "Name", "Email", "Joined"];
pub const LOAN_HEADERS: [&str; 6] = ["ID", "Member", "Book", "Loaned", "Due", "Status"];

/// One display row: the backend identifier the row stands for plus its
/// rendered cells in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowModel {
    pub id: String,
    pub cells: Vec<String>,
}

impl RowModel {
    /// Case-insensitive substring match over the row's rendered text. An
    /// empty term matches every row.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.cells
            .iter()
            .any(|cell| cell.to_lowercase().contains(&needle))
    }
}

pub fn book_rows(books: &[Book]) -> Vec<RowModel> {
    books
        .iter()
        .map(|book| RowModel {
            id: book.id.clone(),
            cells: vec![
                book.isbn.clone(),
                book.title.clone(),
                book.author.clone(),
                copies_cell(book.copies),
            ],
        })
        .collect()
}

/// Pluralized copies badge matching the backend's copy counts.
pub fn copies_cell(copies: u32) -> String {
    if copies == 1 {
        "1 copy".to_string()
    } else {
        format!("{copies} copies")
    }
}

pub fn member_rows(members: &[Member]) -> Vec<RowModel> {
    members
        .iter()
        .map(|member| RowModel {
            id: member.id.clone(),
            cells: vec![
                short_id(&member.id),
                member.name.clone(),
                member.email.clone(),
                member.joined_at.format("%Y-%m-%d").to_string(),
            ],
        })
        .collect()
}

/// Build loan rows with the status derived from `now`, not from fetch time,
/// so a page left open shows loans slipping overdue.
pub fn loan_rows(loans: &[Loan], now: DateTime<Utc>) -> Vec<RowModel> {
    loans
        .iter()
        .map(|loan| RowModel {
            id: loan.id.clone(),
            cells: vec![
                short_id(&loan.id),
                party_cell(loan.member.as_ref().and_then(|p| p.label())),
                party_cell(loan.book.as_ref().and_then(|p| p.label())),
                loan.loaned_at.format("%Y-%m-%d").to_string(),
                loan.due_at.format("%Y-%m-%d").to_string(),
                loan.status_at(now).text().to_string(),
            ],
        })
        .collect()
}

fn party_cell(label: Option<&str>) -> String {
    label.unwrap_or("Unknown").to_string()
}

/// Text shown as the single placeholder row when a collection is empty.
pub fn placeholder_text(section: Section) -> &'static str {
    match section {
        Section::Books => "No books found",
        Section::Members => "No members found",
        Section::Loans => "No loans found",
        Section::Config => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn book(title: &str, author: &str, copies: u32) -> Book {
        Book {
            id: format!("book-{title}"),
            isbn: "978-0".to_string(),
            title: title.to_string(),
            author: author.to_string(),
            copies,
        }
    }

    #[test]
    fn book_rows_keep_collection_order_and_pluralize_copies() {
        let rows = book_rows(&[book("Dune", "Herbert", 1), book("Emma", "Austen", 0)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells[1], "Dune");
        assert_eq!(rows[0].cells[3], "1 copy");
        assert_eq!(rows[1].cells[3], "0 copies");
    }

    #[test]
    fn empty_collection_maps_to_zero_rows_with_a_placeholder_available() {
        assert!(book_rows(&[]).is_empty());
        assert_eq!(placeholder_text(Section::Books), "No books found");
    }

    #[test]
    fn search_match_is_case_insensitive_substring() {
        let rows = book_rows(&[
            book("The Hobbit", "J.R.R. Tolkien", 2),
            book("Emma", "Jane Austen", 1),
        ]);
        assert!(rows[0].matches("tolkien"));
        assert!(!rows[1].matches("tolkien"));
        assert!(rows[1].matches(""));
    }

    #[test]
    fn loan_rows_derive_status_from_the_supplied_clock() {
        let loan = Loan {
            id: "loan-1".to_string(),
            member: None,
            book: None,
            loaned_at: now() - chrono::Duration::days(10),
            due_at: now() - chrono::Duration::days(1),
            returned_at: None,
        };
        let rows = loan_rows(&[loan.clone()], now());
        assert_eq!(rows[0].cells[5], "Overdue");

        // The same record rendered before its due date is still active.
        let earlier = now() - chrono::Duration::days(3);
        let rows = loan_rows(&[loan], earlier);
        assert_eq!(rows[0].cells[5], "Active");
    }

    #[test]
    fn missing_loan_parties_render_as_unknown() {
        let loan = Loan {
            id: "loan-2".to_string(),
            member: None,
            book: None,
            loaned_at: now(),
            due_at: now(),
            returned_at: None,
        };
        let rows = loan_rows(&[loan], now());
        assert_eq!(rows[0].cells[1], "Unknown");
        assert_eq!(rows[0].cells[2], "Unknown");
    }
}
