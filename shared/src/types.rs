//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Global component ID singleton - set once at startup
static COMPONENT_ID: OnceLock<ComponentId> = OnceLock::new();

/// Identifier for the binary a log line originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentId {
    /// Planner CLI
    Planner,
    /// HTTP shell
    WebServer,
    /// Library use without an initialized binary (tests, embedding)
    Embedded,
}

static EMBEDDED: ComponentId = ComponentId::Embedded;

impl ComponentId {
    /// Initialize the global component ID for the planner CLI
    pub fn init_planner() -> &'static ComponentId {
        COMPONENT_ID.get_or_init(|| ComponentId::Planner)
    }

    /// Initialize the global component ID for the webserver
    pub fn init_webserver() -> &'static ComponentId {
        COMPONENT_ID.get_or_init(|| ComponentId::WebServer)
    }

    /// Get the global component ID, `Embedded` when no binary set one
    pub fn current() -> &'static ComponentId {
        COMPONENT_ID.get().unwrap_or(&EMBEDDED)
    }

    /// Tracing target prefix used when building the env filter
    pub fn crate_target(&self) -> &'static str {
        match self {
            ComponentId::Planner | ComponentId::Embedded => "planner",
            ComponentId::WebServer => "webserver",
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Planner => write!(f, "planner"),
            ComponentId::WebServer => write!(f, "webserver"),
            ComponentId::Embedded => write!(f, "embedded"),
        }
    }
}

/// Store identifier as it appears in the stores catalog
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// SKU identifier as it appears in the SKU catalog
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(String);

impl SkuId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkuId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Cluster index produced by the cluster assigner
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u32);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a published plan
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(Uuid);

impl PlanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_lexically() {
        let mut stores = vec![StoreId::from("S2"), StoreId::from("S10"), StoreId::from("S1")];
        stores.sort();
        let names: Vec<&str> = stores.iter().map(StoreId::as_str).collect();
        assert_eq!(names, vec!["S1", "S10", "S2"]);
    }

    #[test]
    fn test_plan_id_roundtrips_through_string() {
        let id = PlanId::new();
        let parsed = PlanId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(PlanId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_component_id_display() {
        assert_eq!(ComponentId::Planner.to_string(), "planner");
        assert_eq!(ComponentId::WebServer.to_string(), "webserver");
        assert_eq!(ComponentId::Embedded.crate_target(), "planner");
    }
}
