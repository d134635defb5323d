//! Remote resource client split across logical submodules, one per entity
//! family plus the shared HTTP core.

mod books;
mod client;
mod loans;
mod members;

pub use books::{create_book, delete_book, get_book, list_books, update_book};
pub use client::{ApiClient, ApiError, ApiResult, ApiStatus};
pub use loans::{create_loan, delete_loan, list_loans, return_loan};
pub use members::{create_member, delete_member, get_member, list_members, update_member};
