//! Readiness check: are all declared configuration types registered?
//!
//! Pairs with the lenient policy. A service started with
//! `enforce_catalog(.., false)` comes up even when variables are missing; this
//! check then reports which types were skipped so an orchestrator can hold
//! traffic back.

use serde::Serialize;
use tracing::debug;

use crate::registry::{Catalog, Registry};

/// Name a check reports under unless overridden.
pub const DEFAULT_NAME: &str = "enforced_variables_check";

const HEALTHY_DESCRIPTION: &str = "Variables present.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Unhealthy,
    Degraded,
    Healthy,
}

/// Result of one check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub name: String,
    pub status: HealthStatus,
    pub description: String,
    pub tags: Vec<String>,
    /// Type names that are declared but not registered, in catalog order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unregistered: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Checks every type of a [`Catalog`] against a [`Registry`].
///
/// ```
/// use enforcevars::{Catalog, EnforcedVariablesHealthCheck, HealthStatus, Registry};
///
/// let check = EnforcedVariablesHealthCheck::new(&Catalog::new())
///     .failure_status(HealthStatus::Degraded)
///     .tags(["ready"]);
/// assert!(check.check(&Registry::new()).is_healthy());
/// ```
#[derive(Debug, Clone)]
pub struct EnforcedVariablesHealthCheck {
    catalog: Catalog,
    name: String,
    failure_status: HealthStatus,
    tags: Vec<String>,
}

impl EnforcedVariablesHealthCheck {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            catalog: catalog.clone(),
            name: DEFAULT_NAME.to_string(),
            failure_status: HealthStatus::Unhealthy,
            tags: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Status reported when something is unregistered. Defaults to
    /// [`HealthStatus::Unhealthy`].
    pub fn failure_status(mut self, status: HealthStatus) -> Self {
        self.failure_status = status;
        self
    }

    /// Labels hosts can use to filter checks.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn check(&self, registry: &Registry) -> HealthReport {
        let unregistered: Vec<String> = self
            .catalog
            .iter()
            .filter(|entry| !registry.contains(entry.type_id()))
            .map(|entry| entry.type_name())
            .collect();

        let (status, description) = if unregistered.is_empty() {
            (HealthStatus::Healthy, HEALTHY_DESCRIPTION.to_string())
        } else {
            (
                self.failure_status,
                format!(
                    "Following types are not registered: {}",
                    unregistered.join(",")
                ),
            )
        };
        debug!(name = %self.name, ?status, "enforced variables checked");

        HealthReport {
            name: self.name.clone(),
            status,
            description,
            tags: self.tags.clone(),
            unregistered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{TestModel, TestModel2, configuration};

    fn catalog() -> Catalog {
        Catalog::new().with::<TestModel>().with::<TestModel2>()
    }

    #[test]
    fn healthy_when_everything_registered() {
        let source = configuration(true, true).with("VariableEnforcedWithoutTag", "x");
        let mut registry = Registry::new();
        registry.enforce_catalog(&catalog(), &source, false).unwrap();

        let report = EnforcedVariablesHealthCheck::new(&catalog()).check(&registry);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.description, "Variables present.");
        assert_eq!(report.name, DEFAULT_NAME);
        assert!(report.unregistered.is_empty());
    }

    #[test]
    fn unhealthy_when_variables_missing() {
        let mut registry = Registry::new();
        registry
            .enforce_catalog(&catalog(), &configuration(false, false), false)
            .unwrap();

        let report = EnforcedVariablesHealthCheck::new(&catalog()).check(&registry);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(
            report.description,
            "Following types are not registered: TestModel,TestModel2"
        );
    }

    #[test]
    fn names_only_the_missing_types() {
        let mut registry = Registry::new();
        registry
            .enforce_catalog(&catalog(), &configuration(true, false), false)
            .unwrap();

        let report = EnforcedVariablesHealthCheck::new(&catalog()).check(&registry);
        assert_eq!(report.unregistered, vec!["TestModel2"]);
    }

    #[test]
    fn failure_status_and_labels_are_configurable() {
        let report = EnforcedVariablesHealthCheck::new(&catalog())
            .name("config")
            .failure_status(HealthStatus::Degraded)
            .tags(["ready", "startup"])
            .check(&Registry::new());
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.name, "config");
        assert_eq!(report.tags, vec!["ready", "startup"]);
        assert!(!report.is_healthy());
    }

    #[test]
    fn report_serializes_for_endpoints() {
        let report = EnforcedVariablesHealthCheck::new(&Catalog::new().with::<TestModel>())
            .check(&Registry::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "enforced_variables_check");
        assert_eq!(json["status"], "Unhealthy");
        assert_eq!(json["unregistered"][0], "TestModel");

        let healthy = EnforcedVariablesHealthCheck::new(&Catalog::new()).check(&Registry::new());
        let json = serde_json::to_value(&healthy).unwrap();
        assert_eq!(json["status"], "Healthy");
        assert!(json.get("unregistered").is_none());
    }
}
