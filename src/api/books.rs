use crate::models::{Book, NewBook};

use super::client::{ApiClient, ApiResult};

/// Retrieve one page of the book collection. Page number and size are
/// forwarded to the backend as query parameters; ordering is server-owned.
pub fn list_books(client: &ApiClient, page: u32, limit: u32) -> ApiResult<Vec<Book>> {
    client.get_with_query(
        "books",
        &[("page", page.to_string()), ("limit", limit.to_string())],
    )
}

/// Fetch a single book, used to populate the edit modal.
pub fn get_book(client: &ApiClient, id: &str) -> ApiResult<Book> {
    client.get(&format!("books/{id}"))
}

/// Create a book, returning the hydrated record the server stored.
pub fn create_book(client: &ApiClient, payload: &NewBook) -> ApiResult<Book> {
    client.post("books", payload)
}

/// Replace a book's fields. The caller re-fetches the collection afterwards
/// rather than patching its local copy.
pub fn update_book(client: &ApiClient, id: &str, payload: &NewBook) -> ApiResult<Book> {
    client.put(&format!("books/{id}"), payload)
}

pub fn delete_book(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("books/{id}"))
}
