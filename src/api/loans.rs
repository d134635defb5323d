use crate::models::{Loan, NewLoan};

use super::client::{ApiClient, ApiError, ApiResult};

/// Retrieve the full loan collection; entries embed or reference their
/// member and book.
pub fn list_loans(client: &ApiClient) -> ApiResult<Vec<Loan>> {
    client.get("loans")
}

pub fn create_loan(client: &ApiClient, payload: &NewLoan) -> ApiResult<Loan> {
    client.post("loans", payload)
}

/// Mark a loan as returned. Repeating this on an already-returned loan is a
/// server-decided outcome; whatever error comes back is surfaced as-is.
pub fn return_loan(client: &ApiClient, id: &str) -> ApiResult<Loan> {
    client.put_empty(&format!("loans/{id}/return"))
}

/// The backend declares no loan-deletion endpoint. The action stays visible
/// in the UI so the user gets explicit feedback instead of a silent drop,
/// but no request is ever issued.
pub fn delete_loan(_client: &ApiClient, _id: &str) -> ApiResult<()> {
    Err(ApiError::Unsupported("Loan deletion"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_deletion_is_unsupported_without_touching_the_network() {
        // An unroutable endpoint: any issued request would fail with a
        // connectivity error, so the Unsupported variant proves no call
        // was attempted.
        let client = ApiClient::new("http://127.0.0.1:9/api");
        let err = delete_loan(&client, "abc").unwrap_err();
        assert!(matches!(err, ApiError::Unsupported(_)));
    }
}
