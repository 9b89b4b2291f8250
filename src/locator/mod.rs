/// Kind-to-endpoint resolution
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Whether instances of a kind live inside a namespace or at cluster level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    Namespaced,
    Cluster,
}

/// Concrete API coordinates for a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMapping {
    pub kind: String,
    pub group: String,
    pub version: String,
    /// Plural resource name used in API paths (e.g. "pods")
    pub resource: String,
    pub scope: ResourceScope,
}

impl ResourceMapping {
    pub fn new(
        kind: &str,
        group: &str,
        version: &str,
        resource: &str,
        scope: ResourceScope,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
            scope,
        }
    }

    /// The apiVersion string for this mapping ("v1" or "group/version")
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// Resolves a kind name to its API coordinates.
///
/// Kind names may carry an explicit group ("Ingress.networking.k8s.io");
/// a bare kind matches whatever group the locator knows it under.
pub trait KindLocator: Send + Sync {
    fn resolve(&self, kind: &str) -> Result<ResourceMapping>;
}

/// Splits "Kind.group" into kind and optional group
fn parse_kind(kind: &str) -> (&str, Option<&str>) {
    match kind.split_once('.') {
        Some((k, group)) => (k, Some(group)),
        None => (kind, None),
    }
}

fn lookup(table: &HashMap<String, ResourceMapping>, kind: &str) -> Result<ResourceMapping> {
    let (name, group) = parse_kind(kind);
    let mapping = table
        .get(name)
        .ok_or_else(|| Error::UnknownKind(kind.to_string()))?;
    if let Some(group) = group {
        if mapping.group != group {
            return Err(Error::UnknownKind(kind.to_string()));
        }
    }
    Ok(mapping.clone())
}

/// Locator backed by a fixed table of kinds.
///
/// `Default` covers the built-in kinds test workloads commonly touch; use
/// `insert` for CRDs known ahead of time, or switch to a
/// [`DiscoveryLocator`] when the API surface is not known up front.
pub struct StaticLocator {
    table: HashMap<String, ResourceMapping>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, mapping: ResourceMapping) {
        self.table.insert(mapping.kind.clone(), mapping);
    }
}

impl Default for StaticLocator {
    fn default() -> Self {
        let mut locator = Self::new();
        for mapping in builtin_mappings() {
            locator.insert(mapping);
        }
        locator
    }
}

impl KindLocator for StaticLocator {
    fn resolve(&self, kind: &str) -> Result<ResourceMapping> {
        lookup(&self.table, kind)
    }
}

/// The fixed set of kinds the static table knows out of the box
pub(crate) fn builtin_mappings() -> Vec<ResourceMapping> {
    use ResourceScope::{Cluster, Namespaced};
    vec![
        ResourceMapping::new("ConfigMap", "", "v1", "configmaps", Namespaced),
        ResourceMapping::new("Deployment", "apps", "v1", "deployments", Namespaced),
        ResourceMapping::new("Endpoints", "", "v1", "endpoints", Namespaced),
        ResourceMapping::new(
            "Ingress",
            "networking.k8s.io",
            "v1",
            "ingresses",
            Namespaced,
        ),
        ResourceMapping::new("Job", "batch", "v1", "jobs", Namespaced),
        ResourceMapping::new("Namespace", "", "v1", "namespaces", Cluster),
        ResourceMapping::new("Node", "", "v1", "nodes", Cluster),
        ResourceMapping::new("PersistentVolume", "", "v1", "persistentvolumes", Cluster),
        ResourceMapping::new(
            "PersistentVolumeClaim",
            "",
            "v1",
            "persistentvolumeclaims",
            Namespaced,
        ),
        ResourceMapping::new("Pod", "", "v1", "pods", Namespaced),
        ResourceMapping::new("Secret", "", "v1", "secrets", Namespaced),
        ResourceMapping::new("Service", "", "v1", "services", Namespaced),
        ResourceMapping::new("StatefulSet", "apps", "v1", "statefulsets", Namespaced),
    ]
}

/// Locator populated from the cluster's own API discovery.
///
/// The mapping table is built once and cached; `refresh` re-runs discovery
/// (e.g. after installing a CRD mid-run) and `invalidate` drops the cache.
/// Resolution is lock-read only, safe for many concurrent callers.
pub struct DiscoveryLocator {
    cache: RwLock<HashMap<String, ResourceMapping>>,
}

impl DiscoveryLocator {
    /// Run one discovery round-trip and build the locator from the result
    pub async fn discover(transport: &dyn Transport) -> Result<Self> {
        let locator = Self {
            cache: RwLock::new(HashMap::new()),
        };
        locator.refresh(transport).await?;
        Ok(locator)
    }

    /// Re-run discovery, replacing the cached table
    pub async fn refresh(&self, transport: &dyn Transport) -> Result<()> {
        let resources = transport.discover().await?;
        debug!("discovered {} resource kinds", resources.len());

        let mut table = HashMap::new();
        for mapping in resources {
            table.insert(mapping.kind.clone(), mapping);
        }
        *self.cache.write().expect("locator cache poisoned") = table;
        Ok(())
    }

    /// Drop the cached table. Every kind resolves to UnknownKind until the
    /// next `refresh`.
    pub fn invalidate(&self) {
        self.cache.write().expect("locator cache poisoned").clear();
    }
}

impl KindLocator for DiscoveryLocator {
    fn resolve(&self, kind: &str) -> Result<ResourceMapping> {
        lookup(&self.cache.read().expect("locator cache poisoned"), kind)
    }
}
