/// Generic CRUD and apply over loosely-typed resource documents
pub mod structured;

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::helpers::Helpers;
use crate::locator::{KindLocator, ResourceMapping, ResourceScope, StaticLocator};
use crate::transport::Transport;
use crate::utils::document::{self, GenericDocument};

pub use structured::Structured;

/// Field manager identity under which `apply` registers its field ownership
pub const FIELD_MANAGER: &str = "kube-harness";

/// Client for manipulating arbitrary resource kinds.
///
/// Kinds are resolved to API coordinates through a [`KindLocator`] (the
/// built-in static table by default) before any transport call; an
/// unresolvable kind fails without touching the network. The transport is
/// shared, so independent clients over the same connection are cheap.
pub struct GenericClient {
    transport: Arc<dyn Transport>,
    locator: Box<dyn KindLocator>,
}

impl GenericClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            locator: Box::new(StaticLocator::default()),
        }
    }

    /// Replace the kind locator (e.g. with a discovery-backed one)
    pub fn with_locator(mut self, locator: impl KindLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Typed-object view over this client
    pub fn structured(&self) -> Structured<'_> {
        Structured::new(self)
    }

    /// Condition helpers bound to the given namespace
    pub fn helpers(&self, namespace: &str) -> Helpers<'_> {
        Helpers::new(self, namespace)
    }

    fn resolve(&self, kind: &str) -> Result<ResourceMapping> {
        self.locator.resolve(kind)
    }

    /// The namespace argument the transport expects: the caller's namespace
    /// for namespaced kinds, nothing for cluster-scoped ones
    fn scope_namespace<'a>(mapping: &ResourceMapping, namespace: &'a str) -> Option<&'a str> {
        match mapping.scope {
            ResourceScope::Namespaced => Some(namespace),
            ResourceScope::Cluster => None,
        }
    }

    /// Resolve a document's own kind and default its namespace, returning
    /// the prepared document and endpoint
    fn prepare(
        &self,
        doc: GenericDocument,
    ) -> Result<(GenericDocument, ResourceMapping, Option<String>)> {
        let kind = document::kind(&doc)
            .ok_or_else(|| Error::Decode("document has no kind".into()))?
            .to_string();
        let mapping = self.resolve(&kind)?;

        let mut doc = doc;
        let namespace = match mapping.scope {
            ResourceScope::Namespaced => {
                let ns = document::namespace_or_default(&doc).to_string();
                document::set_namespace(&mut doc, &ns);
                Some(ns)
            }
            ResourceScope::Cluster => None,
        };
        Ok((doc, mapping, namespace))
    }

    /// Create the resource described by the document. The namespace defaults
    /// to "default" for namespaced kinds. Returns the server's response,
    /// including server-assigned fields (uid, resourceVersion).
    pub async fn create(&self, doc: GenericDocument) -> Result<GenericDocument> {
        let (doc, mapping, namespace) = self.prepare(doc)?;
        debug!(
            "create {} '{}' in '{}'",
            mapping.kind,
            document::name(&doc).unwrap_or(""),
            namespace.as_deref().unwrap_or("-")
        );
        self.transport
            .create(&mapping, namespace.as_deref(), &doc)
            .await
    }

    /// Fetch an object by kind, name and namespace
    pub async fn get(&self, kind: &str, name: &str, namespace: &str) -> Result<GenericDocument> {
        let mapping = self.resolve(kind)?;
        debug!("get {} '{}' in '{}'", mapping.kind, name, namespace);
        self.transport
            .get(&mapping, Self::scope_namespace(&mapping, namespace), name)
            .await
    }

    /// List objects of a kind in a namespace. An empty result is valid;
    /// the namespace is passed through as given, never widened to all
    /// namespaces.
    pub async fn list(&self, kind: &str, namespace: &str) -> Result<Vec<GenericDocument>> {
        let mapping = self.resolve(kind)?;
        debug!("list {} in '{}'", mapping.kind, namespace);
        self.transport
            .list(&mapping, Self::scope_namespace(&mapping, namespace))
            .await
    }

    /// Delete an object by kind, name and namespace
    pub async fn delete(&self, kind: &str, name: &str, namespace: &str) -> Result<()> {
        let mapping = self.resolve(kind)?;
        debug!("delete {} '{}' in '{}'", mapping.kind, name, namespace);
        self.transport
            .delete(&mapping, Self::scope_namespace(&mapping, namespace), name)
            .await
    }

    /// Replace an existing object with the document. Full-document replace,
    /// not a merge: the caller supplies the latest known document including
    /// its resourceVersion, and a stale version surfaces as Conflict.
    pub async fn update(&self, doc: GenericDocument) -> Result<GenericDocument> {
        let (doc, mapping, namespace) = self.prepare(doc)?;
        let name = document::name(&doc)
            .ok_or_else(|| Error::Decode("document has no name".into()))?
            .to_string();
        debug!(
            "update {} '{}' in '{}'",
            mapping.kind,
            name,
            namespace.as_deref().unwrap_or("-")
        );
        self.transport
            .replace(&mapping, namespace.as_deref(), &name, &doc)
            .await
    }

    /// Decode a YAML or JSON manifest and server-side apply it under this
    /// crate's field manager. Re-applying an identical manifest is
    /// idempotent; an apply owned by a different manager surfaces as
    /// Conflict.
    pub async fn apply(&self, manifest: &str) -> Result<()> {
        let doc = document::from_manifest(manifest)?;
        let (doc, mapping, namespace) = self.prepare(doc)?;
        let name = document::name(&doc)
            .ok_or_else(|| Error::Decode("manifest has no name".into()))?
            .to_string();
        debug!(
            "apply {} '{}' in '{}'",
            mapping.kind,
            name,
            namespace.as_deref().unwrap_or("-")
        );
        self.transport
            .apply(&mapping, namespace.as_deref(), &name, &doc, FIELD_MANAGER)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeTransport;
    use crate::utils::document::DEFAULT_NAMESPACE;
    use serde_json::{json, Value};

    fn doc(value: Value) -> GenericDocument {
        match value {
            Value::Object(doc) => doc,
            _ => unreachable!(),
        }
    }

    fn pod_doc(name: &str, namespace: &str) -> GenericDocument {
        doc(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": name, "namespace": namespace},
            "spec": {
                "containers": [
                    {"name": "busybox", "image": "busybox", "command": ["sh", "-c", "sleep 30"]}
                ]
            }
        }))
    }

    fn client() -> (Arc<FakeTransport>, GenericClient) {
        let transport = Arc::new(FakeTransport::new());
        let client = GenericClient::new(transport.clone());
        (transport, client)
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_, client) = client();
        let created = client.create(pod_doc("busybox", "testns")).await.unwrap();
        assert_eq!(document::name(&created), Some("busybox"));

        let fetched = client.get("Pod", "busybox", "testns").await.unwrap();
        assert_eq!(document::name(&fetched), Some("busybox"));
        assert_eq!(document::namespace(&fetched), Some("testns"));
    }

    #[tokio::test]
    async fn test_create_defaults_namespace() {
        let (_, client) = client();
        let mut pod = pod_doc("busybox", "");
        if let Some(Value::Object(metadata)) = pod.get_mut("metadata") {
            metadata.remove("namespace");
        }

        let created = client.create(pod).await.unwrap();
        assert_eq!(document::namespace(&created), Some(DEFAULT_NAMESPACE));

        client.get("Pod", "busybox", "default").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_twice_already_exists() {
        let (_, client) = client();
        client.create(pod_doc("busybox", "testns")).await.unwrap();

        let err = client
            .create(pod_doc("busybox", "testns"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());

        // failed create leaves the list unchanged
        let pods = client.list("Pod", "testns").await.unwrap();
        assert_eq!(pods.len(), 1);
    }

    #[tokio::test]
    async fn test_list_empty_is_valid() {
        let (_, client) = client();
        let pods = client.list("Pod", "testns").await.unwrap();
        assert!(pods.is_empty());
    }

    #[tokio::test]
    async fn test_list_scoped_to_namespace() {
        let (_, client) = client();
        client.create(pod_doc("pod-1", "ns-1")).await.unwrap();
        client.create(pod_doc("pod-2", "ns-2")).await.unwrap();

        let pods = client.list("Pod", "ns-1").await.unwrap();
        assert_eq!(pods.len(), 1);
        assert_eq!(document::name(&pods[0]), Some("pod-1"));
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let (_, client) = client();
        client.create(pod_doc("busybox", "testns")).await.unwrap();
        client.delete("Pod", "busybox", "testns").await.unwrap();

        let err = client.get("Pod", "busybox", "testns").await.unwrap_err();
        assert!(err.is_not_found());

        let pods = client.list("Pod", "testns").await.unwrap();
        assert!(pods.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_document() {
        let (_, client) = client();
        let created = client.create(pod_doc("busybox", "testns")).await.unwrap();

        let mut updated = created.clone();
        updated.insert("status".into(), json!({"phase": "Running"}));
        let result = client.update(updated).await.unwrap();
        assert_eq!(
            result.get("status").and_then(|s| s.get("phase")),
            Some(&json!("Running"))
        );

        let fetched = client.get("Pod", "busybox", "testns").await.unwrap();
        assert_eq!(
            fetched.get("status").and_then(|s| s.get("phase")),
            Some(&json!("Running"))
        );
    }

    #[tokio::test]
    async fn test_update_missing_object_not_found() {
        let (_, client) = client();
        let err = client.update(pod_doc("ghost", "testns")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_kind_short_circuits() {
        let (transport, client) = client();

        let err = client.get("Frobnicator", "x", "ns").await.unwrap_err();
        assert!(err.is_unknown_kind());
        let err = client.list("Frobnicator", "ns").await.unwrap_err();
        assert!(err.is_unknown_kind());
        let err = client.delete("Frobnicator", "x", "ns").await.unwrap_err();
        assert!(err.is_unknown_kind());

        // the locator failure never reached the transport
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_cluster_scoped_kind_ignores_namespace() {
        let (_, client) = client();
        let ns = doc(json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {"name": "testns"},
        }));
        client.create(ns).await.unwrap();

        // namespace argument is silently unused for cluster-scoped kinds
        let fetched = client.get("Namespace", "testns", "anything").await.unwrap();
        assert_eq!(document::name(&fetched), Some("testns"));
    }

    const POD_MANIFEST: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: busybox
  namespace: testns
spec:
  containers:
  - name: busybox
    image: busybox
"#;

    #[tokio::test]
    async fn test_apply_manifest() {
        let (_, client) = client();
        client.apply(POD_MANIFEST).await.unwrap();

        let fetched = client.get("Pod", "busybox", "testns").await.unwrap();
        assert_eq!(document::name(&fetched), Some("busybox"));

        // identical manifest applies again without error
        client.apply(POD_MANIFEST).await.unwrap();
        let pods = client.list("Pod", "testns").await.unwrap();
        assert_eq!(pods.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_malformed_manifest() {
        let (transport, client) = client();
        let err = client.apply("kind: [unclosed").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_apply_unknown_kind() {
        let (transport, client) = client();
        let manifest = "apiVersion: example.com/v1\nkind: Frobnicator\nmetadata:\n  name: x\n";
        let err = client.apply(manifest).await.unwrap_err();
        assert!(err.is_unknown_kind());
        assert_eq!(transport.calls(), 0);
    }
}
