use crate::models::{Member, NewMember};

use super::client::{ApiClient, ApiResult};

/// Retrieve the full member collection; the backend exposes no pagination
/// contract for members.
pub fn list_members(client: &ApiClient) -> ApiResult<Vec<Member>> {
    client.get("members")
}

/// Fetch a single member, used to populate the edit modal.
pub fn get_member(client: &ApiClient, id: &str) -> ApiResult<Member> {
    client.get(&format!("members/{id}"))
}

pub fn create_member(client: &ApiClient, payload: &NewMember) -> ApiResult<Member> {
    client.post("members", payload)
}

pub fn update_member(client: &ApiClient, id: &str, payload: &NewMember) -> ApiResult<Member> {
    client.put(&format!("members/{id}"), payload)
}

pub fn delete_member(client: &ApiClient, id: &str) -> ApiResult<()> {
    client.delete(&format!("members/{id}"))
}
