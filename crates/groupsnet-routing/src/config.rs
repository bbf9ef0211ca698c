//! Configuration for the GroupsNet router

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What to do with a created message that has no route
///
/// A message id that does not parse as an integer is treated the same way
/// as an id with no route table record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRoutePolicy {
    /// Admit the message with no route; it is never relayed and can only
    /// leave its origin by direct delivery
    #[default]
    FailClosed,
    /// Refuse to admit the message and report an error
    Reject,
}

/// Router settings, usually read from the `[router]` table of a scenario file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Path of the precomputed route file
    pub routes_file: PathBuf,
    /// Handling of messages without a route
    #[serde(default)]
    pub missing_route: MissingRoutePolicy,
}

impl RouterSettings {
    /// Create settings for a route file with the default missing-route policy
    pub fn new(routes_file: impl Into<PathBuf>) -> Self {
        Self {
            routes_file: routes_file.into(),
            missing_route: MissingRoutePolicy::default(),
        }
    }

    /// Set the missing-route policy
    pub fn with_missing_route(mut self, policy: MissingRoutePolicy) -> Self {
        self.missing_route = policy;
        self
    }

    /// Resolve a relative route file against a base directory
    ///
    /// Scenario files name their route file relative to themselves.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        if self.routes_file.is_relative() {
            self.routes_file = base.join(&self.routes_file);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_fails_closed() {
        let settings = RouterSettings::new("routes.txt");
        assert_eq!(settings.missing_route, MissingRoutePolicy::FailClosed);
    }

    #[test]
    fn test_deserialize_settings() {
        let settings: RouterSettings = toml::from_str(
            r#"
            routes_file = "routes/groups.txt"
            missing_route = "reject"
            "#,
        )
        .unwrap();

        assert_eq!(settings.routes_file, PathBuf::from("routes/groups.txt"));
        assert_eq!(settings.missing_route, MissingRoutePolicy::Reject);
    }

    #[test]
    fn test_missing_route_defaults_when_absent() {
        let settings: RouterSettings = toml::from_str(r#"routes_file = "r.txt""#).unwrap();
        assert_eq!(settings.missing_route, MissingRoutePolicy::FailClosed);
    }

    #[test]
    fn test_resolve_against() {
        let settings = RouterSettings::new("routes.txt").resolve_against(Path::new("/data"));
        assert_eq!(settings.routes_file, PathBuf::from("/data/routes.txt"));

        let absolute = RouterSettings::new("/etc/routes.txt").resolve_against(Path::new("/data"));
        assert_eq!(absolute.routes_file, PathBuf::from("/etc/routes.txt"));
    }
}
