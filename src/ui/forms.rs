//! Modal form state for the three creation/edit surfaces, the delete
//! confirmation dialog, and the endpoint editor. Forms hold raw typed text;
//! validation happens in `crate::validate` and the resulting field errors
//! are attached here for display until they expire or the user types again.

use std::time::Instant;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, Member};
use crate::validate::FieldError;

/// How long field-scoped validation messages stay on screen.
pub(crate) const FIELD_ERROR_TTL_SECS: u64 = 3;

/// Shared field-error bookkeeping embedded in every form.
#[derive(Default, Clone)]
pub(crate) struct ErrorSet {
    errors: Vec<FieldError>,
    set_at: Option<Instant>,
}

impl ErrorSet {
    pub(crate) fn set(&mut self, errors: Vec<FieldError>, now: Instant) {
        self.set_at = (!errors.is_empty()).then_some(now);
        self.errors = errors;
    }

    pub(crate) fn clear(&mut self) {
        self.errors.clear();
        self.set_at = None;
    }

    /// Drop the whole set once the display window has elapsed. Returns true
    /// when something was cleared so the caller can trigger a redraw.
    pub(crate) fn expire(&mut self, now: Instant) -> bool {
        match self.set_at {
            Some(at) if now.duration_since(at).as_secs() >= FIELD_ERROR_TTL_SECS => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compose a form input line: label, value or placeholder, highlight for
/// the focused field, and the field's validation message when present.
fn input_line(
    label: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
    error: Option<&'static str>,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::raw(format!("{label}: ")), Span::styled(display, style)];
    if let Some(message) = error {
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

/// Fields available within the book form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Isbn,
    Title,
    Author,
    Copies,
}

/// Form state for book creation and editing.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) isbn: String,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) copies: String,
    pub(crate) active: BookField,
    pub(crate) errors: ErrorSet,
    pub(crate) server_error: Option<String>,
}

impl BookForm {
    /// Populate the form from a fetched book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            copies: book.copies.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn toggle_field(&mut self, forward: bool) {
        self.active = match (self.active, forward) {
            (BookField::Isbn, true) => BookField::Title,
            (BookField::Title, true) => BookField::Author,
            (BookField::Author, true) => BookField::Copies,
            (BookField::Copies, true) => BookField::Isbn,
            (BookField::Isbn, false) => BookField::Copies,
            (BookField::Title, false) => BookField::Isbn,
            (BookField::Author, false) => BookField::Title,
            (BookField::Copies, false) => BookField::Author,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Copies => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.copies.push(ch);
            }
            BookField::Isbn => self.isbn.push(ch),
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Isbn => {
                self.isbn.pop();
            }
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Copies => {
                self.copies.pop();
            }
        }
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            input_line(
                "ISBN",
                &self.isbn,
                "<required>",
                self.active == BookField::Isbn,
                self.errors.message_for("isbn"),
            ),
            input_line(
                "Title",
                &self.title,
                "<required>",
                self.active == BookField::Title,
                self.errors.message_for("title"),
            ),
            input_line(
                "Author",
                &self.author,
                "<required>",
                self.active == BookField::Author,
                self.errors.message_for("author"),
            ),
            input_line(
                "Copies",
                &self.copies,
                "<required>",
                self.active == BookField::Copies,
                self.errors.message_for("copies"),
            ),
        ]
    }
}

/// Fields available within the member form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum MemberField {
    #[default]
    Name,
    Email,
}

/// Form state for member creation and editing.
#[derive(Default, Clone)]
pub(crate) struct MemberForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) active: MemberField,
    pub(crate) errors: ErrorSet,
    pub(crate) server_error: Option<String>,
}

impl MemberForm {
    pub(crate) fn from_member(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            email: member.email.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            MemberField::Name => MemberField::Email,
            MemberField::Email => MemberField::Name,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            MemberField::Name => self.name.push(ch),
            MemberField::Email => self.email.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            MemberField::Name => {
                self.name.pop();
            }
            MemberField::Email => {
                self.email.pop();
            }
        }
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            input_line(
                "Name",
                &self.name,
                "<required>",
                self.active == MemberField::Name,
                self.errors.message_for("name"),
            ),
            input_line(
                "Email",
                &self.email,
                "<required>",
                self.active == MemberField::Email,
                self.errors.message_for("email"),
            ),
        ]
    }
}

/// One pickable option in the loan form's member/book selectors.
#[derive(Clone)]
pub(crate) struct SelectOption {
    pub(crate) id: String,
    pub(crate) label: String,
}

/// Fields available within the loan form. Member and book are selectors
/// cycled with the arrow keys; the due date is typed text.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoanField {
    #[default]
    Member,
    Book,
    DueDate,
}

/// Form state for loan creation. The selector options are captured from the
/// already-fetched collections when the form opens; books are restricted to
/// loanable ones.
#[derive(Default, Clone)]
pub(crate) struct LoanForm {
    pub(crate) members: Vec<SelectOption>,
    pub(crate) books: Vec<SelectOption>,
    pub(crate) member_index: Option<usize>,
    pub(crate) book_index: Option<usize>,
    pub(crate) due_date: String,
    pub(crate) active: LoanField,
    pub(crate) errors: ErrorSet,
    pub(crate) server_error: Option<String>,
}

impl LoanForm {
    pub(crate) fn new(
        members: Vec<SelectOption>,
        books: Vec<SelectOption>,
        default_due: String,
    ) -> Self {
        Self {
            members,
            books,
            due_date: default_due,
            ..Self::default()
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoanField::Member => LoanField::Book,
            LoanField::Book => LoanField::DueDate,
            LoanField::DueDate => LoanField::Member,
        };
    }

    /// Cycle the focused selector through its options, wrapping at both
    /// ends. No-op when the due-date field is focused or no options exist.
    pub(crate) fn cycle_selection(&mut self, delta: isize) {
        let (index, len) = match self.active {
            LoanField::Member => (&mut self.member_index, self.members.len()),
            LoanField::Book => (&mut self.book_index, self.books.len()),
            LoanField::DueDate => return,
        };
        if len == 0 {
            return;
        }
        let next = match *index {
            None => {
                if delta >= 0 {
                    0
                } else {
                    len - 1
                }
            }
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
        };
        *index = Some(next);
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active != LoanField::DueDate {
            return false;
        }
        if ch.is_ascii_digit() || ch == '-' {
            self.due_date.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == LoanField::DueDate {
            self.due_date.pop();
        }
    }

    pub(crate) fn selected_member_id(&self) -> &str {
        self.member_index
            .and_then(|i| self.members.get(i))
            .map(|o| o.id.as_str())
            .unwrap_or("")
    }

    pub(crate) fn selected_book_id(&self) -> &str {
        self.book_index
            .and_then(|i| self.books.get(i))
            .map(|o| o.id.as_str())
            .unwrap_or("")
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        let member_label = self
            .member_index
            .and_then(|i| self.members.get(i))
            .map(|o| o.label.clone())
            .unwrap_or_default();
        let book_label = self
            .book_index
            .and_then(|i| self.books.get(i))
            .map(|o| o.label.clone())
            .unwrap_or_default();

        vec![
            input_line(
                "Member",
                &member_label,
                "<select with \u{2190}\u{2192}>",
                self.active == LoanField::Member,
                self.errors.message_for("member"),
            ),
            input_line(
                "Book",
                &book_label,
                "<select with \u{2190}\u{2192}>",
                self.active == LoanField::Book,
                self.errors.message_for("book"),
            ),
            input_line(
                "Due date",
                &self.due_date,
                "<YYYY-MM-DD>",
                self.active == LoanField::DueDate,
                self.errors.message_for("due_date"),
            ),
        ]
    }
}

/// Which entity family a confirm dialog is about to delete.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum DeleteTarget {
    Book,
    Member,
}

impl DeleteTarget {
    pub(crate) fn noun(&self) -> &'static str {
        match self {
            DeleteTarget::Book => "book",
            DeleteTarget::Member => "member",
        }
    }
}

/// State for the delete confirmation dialog. Carries the label purely for
/// display so the prompt can name what is about to disappear.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) target: DeleteTarget,
    pub(crate) id: String,
    pub(crate) label: String,
}

/// Inline editor for the backend endpoint on the configuration screen.
#[derive(Default, Clone)]
pub(crate) struct EndpointForm {
    pub(crate) value: String,
}

impl EndpointForm {
    pub(crate) fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() || ch.is_whitespace() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn opts(ids: &[&str]) -> Vec<SelectOption> {
        ids.iter()
            .map(|id| SelectOption {
                id: id.to_string(),
                label: format!("label-{id}"),
            })
            .collect()
    }

    #[test]
    fn loan_selector_cycles_and_wraps() {
        let mut form = LoanForm::new(opts(&["m1", "m2"]), opts(&["b1"]), String::new());
        assert_eq!(form.selected_member_id(), "");

        form.cycle_selection(1);
        assert_eq!(form.selected_member_id(), "m1");
        form.cycle_selection(1);
        assert_eq!(form.selected_member_id(), "m2");
        form.cycle_selection(1);
        assert_eq!(form.selected_member_id(), "m1");
        form.cycle_selection(-1);
        assert_eq!(form.selected_member_id(), "m2");
    }

    #[test]
    fn loan_selector_with_no_options_stays_unselected() {
        let mut form = LoanForm::new(Vec::new(), Vec::new(), String::new());
        form.cycle_selection(1);
        assert_eq!(form.selected_member_id(), "");
    }

    #[test]
    fn due_date_accepts_only_date_characters() {
        let mut form = LoanForm::new(Vec::new(), Vec::new(), String::new());
        form.active = LoanField::DueDate;
        assert!(form.push_char('2'));
        assert!(form.push_char('-'));
        assert!(!form.push_char('x'));
        assert_eq!(form.due_date, "2-");
    }

    #[test]
    fn copies_field_rejects_non_digits() {
        let mut form = BookForm::default();
        form.active = BookField::Copies;
        assert!(form.push_char('3'));
        assert!(!form.push_char('a'));
        assert_eq!(form.copies, "3");
    }

    #[test]
    fn error_set_expires_after_the_display_window() {
        let mut errors = ErrorSet::default();
        let start = Instant::now();
        errors.set(
            vec![FieldError {
                field: "isbn",
                message: "ISBN is required",
            }],
            start,
        );
        assert_eq!(errors.message_for("isbn"), Some("ISBN is required"));

        assert!(!errors.expire(start + Duration::from_secs(1)));
        assert!(errors.expire(start + Duration::from_secs(FIELD_ERROR_TTL_SECS)));
        assert!(errors.is_empty());
    }

    #[test]
    fn endpoint_form_rejects_whitespace() {
        let mut form = EndpointForm::default();
        assert!(form.push_char('h'));
        assert!(!form.push_char(' '));
        assert_eq!(form.value, "h");
    }
}
