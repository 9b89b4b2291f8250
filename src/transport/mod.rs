/// Transport boundary to the cluster API
pub mod fake;
pub mod kube;

use async_trait::async_trait;

use crate::error::Result;
use crate::locator::ResourceMapping;
use crate::utils::document::GenericDocument;

pub use self::fake::FakeTransport;
pub use self::kube::KubeTransport;

/// An authenticated channel to the cluster API.
///
/// The crate consumes this capability and never implements the wire
/// protocol itself; establishing the connection (kubeconfig, TLS,
/// in-cluster credentials) is the caller's concern. Operations receive the
/// resolved endpoint coordinates plus an optional namespace: `None` for
/// cluster-scoped kinds, the caller's namespace otherwise.
///
/// Implementations must be safe for many concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Enumerate the API's available kinds with their coordinates and scope
    async fn discover(&self) -> Result<Vec<ResourceMapping>>;

    /// Create the document; the response carries server-assigned fields
    /// (uid, resourceVersion, a generated name)
    async fn create(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        doc: &GenericDocument,
    ) -> Result<GenericDocument>;

    async fn get(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<GenericDocument>;

    async fn list(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
    ) -> Result<Vec<GenericDocument>>;

    async fn delete(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()>;

    /// Full-document replace; the server rejects a stale resourceVersion
    async fn replace(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
    ) -> Result<GenericDocument>;

    /// Server-side apply under the given field manager
    async fn apply(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
        field_manager: &str,
    ) -> Result<GenericDocument>;
}
