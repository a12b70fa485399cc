use std::collections::BTreeMap;

/// Session collaborator: maps an admission ticket to a privilege tag.
pub trait TicketStore: Send + Sync {
    fn resolve(&self, ticket: Option<&str>) -> String;
}

/// Configured tickets; anything else is a guest with the default privilege.
pub struct StaticTicketStore {
    tickets: BTreeMap<String, String>,
    default_privilege: String,
}

impl StaticTicketStore {
    pub fn new(tickets: BTreeMap<String, String>, default_privilege: impl Into<String>) -> Self {
        Self {
            tickets,
            default_privilege: default_privilege.into(),
        }
    }
}

impl TicketStore for StaticTicketStore {
    fn resolve(&self, ticket: Option<&str>) -> String {
        ticket
            .and_then(|t| self.tickets.get(t))
            .cloned()
            .unwrap_or_else(|| self.default_privilege.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_or_missing_ticket_is_guest() {
        let mut tickets = BTreeMap::new();
        tickets.insert("s3cret".to_string(), "admin".to_string());
        let store = StaticTicketStore::new(tickets, "user");

        assert_eq!(store.resolve(Some("s3cret")), "admin");
        assert_eq!(store.resolve(Some("wrong")), "user");
        assert_eq!(store.resolve(None), "user");
    }
}
