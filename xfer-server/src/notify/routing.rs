//! Recipient routing for transfer notifications
//!
//! The inventory officer receives every notification. Additional recipients
//! come from routes keyed by the exact `(from, to)` location pair.

use serde::{Deserialize, Serialize};

/// Source location of the built-in technician route
pub const DEFAULT_ROUTE_FROM: &str = "Groskopf";

/// Destination location of the built-in technician route
pub const DEFAULT_ROUTE_TO: &str = "Donum - Tasting Room";

/// Extra recipients for one location pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRoute {
    pub from: String,
    pub to: String,
    pub recipients: Vec<String>,
}

impl RecipientRoute {
    fn matches(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

/// Computes the recipient list for a transfer
#[derive(Debug, Clone)]
pub struct RecipientRouter {
    officer: String,
    routes: Vec<RecipientRoute>,
}

impl RecipientRouter {
    pub fn new(officer: impl Into<String>, routes: Vec<RecipientRoute>) -> Self {
        Self {
            officer: officer.into(),
            routes,
        }
    }

    /// Router with the built-in technician route when a technician is known
    pub fn with_default_routes(officer: impl Into<String>, technician: Option<String>) -> Self {
        Self::with_technician(officer, Vec::new(), technician)
    }

    /// Configured routes plus the built-in technician route
    ///
    /// The technician route is skipped when `routes` already declares the
    /// Groskopf to tasting room pair.
    pub fn with_technician(
        officer: impl Into<String>,
        mut routes: Vec<RecipientRoute>,
        technician: Option<String>,
    ) -> Self {
        if let Some(tech) = technician {
            if !routes.iter().any(|r| r.matches(DEFAULT_ROUTE_FROM, DEFAULT_ROUTE_TO)) {
                routes.push(RecipientRoute {
                    from: DEFAULT_ROUTE_FROM.to_string(),
                    to: DEFAULT_ROUTE_TO.to_string(),
                    recipients: vec![tech],
                });
            }
        }
        Self::new(officer, routes)
    }

    pub fn officer(&self) -> &str {
        &self.officer
    }

    pub fn routes(&self) -> &[RecipientRoute] {
        &self.routes
    }

    /// Officer first, then every matching route's recipients, without repeats
    pub fn recipients(&self, from: &str, to: &str) -> Vec<String> {
        let mut recipients = vec![self.officer.clone()];
        for route in self.routes.iter().filter(|r| r.matches(from, to)) {
            for address in &route.recipients {
                if !recipients.iter().any(|r| r.eq_ignore_ascii_case(address)) {
                    recipients.push(address.clone());
                }
            }
        }
        recipients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICER: &str = "officer@example.com";
    const TECH: &str = "tech@example.com";

    #[test]
    fn test_default_route_adds_technician() {
        let router = RecipientRouter::with_default_routes(OFFICER, Some(TECH.to_string()));
        assert_eq!(
            router.recipients("Groskopf", "Donum - Tasting Room"),
            vec![OFFICER.to_string(), TECH.to_string()]
        );
    }

    #[test]
    fn test_other_pairs_get_officer_only() {
        let router = RecipientRouter::with_default_routes(OFFICER, Some(TECH.to_string()));
        for (from, to) in [
            ("Donum - Tasting Room", "Groskopf"),
            ("groskopf", "Donum - Tasting Room"),
            ("Groskopf", "Donum - Tasting Room "),
            ("A", "B"),
        ] {
            assert_eq!(router.recipients(from, to), vec![OFFICER.to_string()], "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_no_technician_means_no_default_route() {
        let router = RecipientRouter::with_default_routes(OFFICER, None);
        assert!(router.routes().is_empty());
        assert_eq!(router.recipients("Groskopf", "Donum - Tasting Room"), vec![OFFICER.to_string()]);
    }

    #[test]
    fn test_configured_routes_are_merged_and_deduplicated() {
        let router = RecipientRouter::new(
            OFFICER,
            vec![
                RecipientRoute {
                    from: "Cellar".to_string(),
                    to: "Shop".to_string(),
                    recipients: vec!["shop@example.com".to_string(), "OFFICER@example.com".to_string()],
                },
                RecipientRoute {
                    from: "Cellar".to_string(),
                    to: "Shop".to_string(),
                    recipients: vec!["shop@example.com".to_string(), "lead@example.com".to_string()],
                },
            ],
        );

        assert_eq!(
            router.recipients("Cellar", "Shop"),
            vec![
                OFFICER.to_string(),
                "shop@example.com".to_string(),
                "lead@example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_with_technician_appends_to_configured_routes() {
        let cellar = RecipientRoute {
            from: "Cellar".to_string(),
            to: "Shop".to_string(),
            recipients: vec!["shop@example.com".to_string()],
        };
        let router = RecipientRouter::with_technician(OFFICER, vec![cellar.clone()], Some(TECH.to_string()));

        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.routes()[0], cellar);
        assert_eq!(
            router.recipients("Groskopf", "Donum - Tasting Room"),
            vec![OFFICER.to_string(), TECH.to_string()]
        );
    }
}
