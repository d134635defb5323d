//! Pure per-form validators. Each function inspects raw form input and
//! returns field-scoped error messages; an empty set means the form may be
//! submitted. No validator performs I/O or touches form state, so the same
//! input always produces the same errors.

/// A single validation failure tagged to the form field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate raw book-form input. `copies` arrives as the typed text so a
/// non-numeric value is caught here instead of panicking at parse time.
pub fn validate_book(isbn: &str, title: &str, author: &str, copies: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if isbn.trim().is_empty() {
        errors.push(FieldError::new("isbn", "ISBN is required"));
    }
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if author.trim().is_empty() {
        errors.push(FieldError::new("author", "Author is required"));
    }
    match copies.trim().parse::<i64>() {
        Ok(count) if count >= 0 => {}
        Ok(_) => errors.push(FieldError::new("copies", "Copies cannot be negative")),
        Err(_) => errors.push(FieldError::new("copies", "Copies must be a whole number")),
    }

    errors
}

/// Validate raw member-form input.
pub fn validate_member(name: &str, email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if !is_valid_email(email.trim()) {
        errors.push(FieldError::new("email", "Valid email is required"));
    }

    errors
}

/// Validate raw loan-form input. The member/book arguments carry the
/// selected identifier, empty when nothing has been picked yet.
pub fn validate_loan(member_id: &str, book_id: &str, due_date: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if member_id.is_empty() {
        errors.push(FieldError::new("member", "Member is required"));
    }
    if book_id.is_empty() {
        errors.push(FieldError::new("book", "Book is required"));
    }
    if due_date.trim().is_empty() {
        errors.push(FieldError::new("due_date", "Due date is required"));
    } else if chrono::NaiveDate::parse_from_str(due_date.trim(), "%Y-%m-%d").is_err() {
        errors.push(FieldError::new("due_date", "Due date must be YYYY-MM-DD"));
    }

    errors
}

/// Basic email shape check: no whitespace, a non-empty local part before a
/// single `@`, and at least one `.` after it with non-empty segments around
/// the last dot.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn complete_book_input_is_valid() {
        assert!(validate_book("978-3-16", "Dune", "Herbert", "3").is_empty());
        assert!(validate_book("978-3-16", "Dune", "Herbert", "0").is_empty());
    }

    #[test]
    fn missing_isbn_is_tagged_to_the_isbn_field() {
        let errors = validate_book("", "X", "Y", "1");
        assert_eq!(fields(&errors), vec!["isbn"]);
    }

    #[test]
    fn negative_and_non_numeric_copies_are_rejected() {
        assert_eq!(fields(&validate_book("i", "t", "a", "-1")), vec!["copies"]);
        assert_eq!(fields(&validate_book("i", "t", "a", "many")), vec!["copies"]);
        assert_eq!(fields(&validate_book("i", "t", "a", "")), vec!["copies"]);
    }

    #[test]
    fn every_missing_book_field_is_reported_at_once() {
        let errors = validate_book("  ", "", " ", "x");
        assert_eq!(fields(&errors), vec!["isbn", "title", "author", "copies"]);
    }

    #[test]
    fn member_requires_name_and_well_formed_email() {
        assert!(validate_member("Ada", "ada@example.org").is_empty());
        assert_eq!(fields(&validate_member("", "ada@example.org")), vec!["name"]);
        assert_eq!(fields(&validate_member("Ada", "ada@example")), vec!["email"]);
    }

    #[test]
    fn email_shape_edge_cases() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.org"));
        assert!(!is_valid_email("@domain.org"));
        assert!(!is_valid_email("a@domain"));
        assert!(!is_valid_email("a@.org"));
        assert!(!is_valid_email("a@domain."));
        assert!(!is_valid_email("a b@domain.org"));
        assert!(!is_valid_email("a@b@c.org"));
    }

    #[test]
    fn loan_requires_selections_and_a_parseable_due_date() {
        assert!(validate_loan("m1", "b1", "2025-06-01").is_empty());
        assert_eq!(
            fields(&validate_loan("", "", "")),
            vec!["member", "book", "due_date"]
        );
        assert_eq!(
            fields(&validate_loan("m1", "b1", "tomorrow")),
            vec!["due_date"]
        );
    }

    #[test]
    fn validators_are_pure() {
        let a = validate_member("Ada", "not-an-email");
        let b = validate_member("Ada", "not-an-email");
        assert_eq!(a, b);
    }
}
