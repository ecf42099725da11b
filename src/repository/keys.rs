//! Cache key naming
//!
//! Every key a repository reads or invalidates is built here, so a read path
//! and the writes that must invalidate it can never disagree on spelling.

use crate::cache::generate_key;
use crate::models::ClientStatus;

pub fn client(id: &str) -> String {
    generate_key("client", [id])
}

pub fn clients_by_user(user_id: &str) -> String {
    generate_key("clients", [user_id])
}

pub fn clients_by_status(status: ClientStatus) -> String {
    generate_key("clients", ["status", status.as_str()])
}

pub fn payment(id: &str) -> String {
    generate_key("payment", [id])
}

pub fn payments_by_client(client_id: &str) -> String {
    generate_key("payments", ["client", client_id])
}

pub fn payments_all() -> String {
    generate_key("payments", ["all"])
}

pub fn price_config(user_id: &str) -> String {
    generate_key("price_config", [user_id])
}

/// Keys a write to one client can make stale
///
/// Status lists are both included: a write may move the client from one to
/// the other.
pub fn client_write(id: &str, user_id: &str) -> Vec<String> {
    let mut keys = vec![client(id), clients_by_user(user_id)];
    keys.extend(ClientStatus::ALL.into_iter().map(clients_by_status));
    keys
}

/// Keys a write to one payment can make stale
pub fn payment_write(id: &str, client_id: &str) -> Vec<String> {
    vec![payment(id), payments_by_client(client_id), payments_all()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shapes() {
        assert_eq!(client("c1"), "client:c1");
        assert_eq!(clients_by_user("u1"), "clients:u1");
        assert_eq!(clients_by_status(ClientStatus::Inactive), "clients:status:inactive");
        assert_eq!(payment("p1"), "payment:p1");
        assert_eq!(payments_by_client("c1"), "payments:client:c1");
        assert_eq!(payments_all(), "payments:all");
        assert_eq!(price_config("u1"), "price_config:u1");
    }

    #[test]
    fn test_payment_write_covers_entity_owner_and_global_lists() {
        assert_eq!(
            payment_write("p1", "c1"),
            vec!["payment:p1", "payments:client:c1", "payments:all"]
        );
    }

    #[test]
    fn test_client_write_covers_both_status_lists() {
        let keys = client_write("c1", "u1");
        assert!(keys.contains(&"clients:status:active".to_string()));
        assert!(keys.contains(&"clients:status:inactive".to_string()));
        assert_eq!(keys.len(), 4);
    }
}
