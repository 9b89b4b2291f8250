/// Typed view over the generic resource client
use k8s_openapi::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::GenericClient;
use crate::error::Result;
use crate::utils::document::{self, GenericDocument};

/// Exchanges statically-typed objects instead of loosely-typed documents.
///
/// Conversion is structural: values are rebuilt from the document shape, so
/// a returned value never aliases the input. Fields a type does not declare
/// are dropped on the way in; fields the live document lacks take the
/// type's defaults. The target type is fixed at the call site, replacing
/// the runtime type introspection the equivalent dynamic clients use.
pub struct Structured<'a> {
    client: &'a GenericClient,
}

impl<'a> Structured<'a> {
    pub(super) fn new(client: &'a GenericClient) -> Self {
        Self { client }
    }

    /// Serialize the value, stamping in the apiVersion/kind pair the typed
    /// representation leaves implicit
    fn to_document<T>(obj: &T) -> Result<GenericDocument>
    where
        T: Resource + Serialize,
    {
        let mut doc = document::to_document(obj)?;
        doc.entry("apiVersion")
            .or_insert_with(|| Value::String(T::API_VERSION.to_string()));
        doc.entry("kind")
            .or_insert_with(|| Value::String(T::KIND.to_string()));
        Ok(doc)
    }

    /// Create the resource and return the server's view of it as a new value
    pub async fn create<T>(&self, obj: &T) -> Result<T>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        let created = self.client.create(Self::to_document(obj)?).await?;
        document::from_document(created)
    }

    /// Fetch an object by kind, name and namespace into the given type
    pub async fn get<T>(&self, kind: &str, name: &str, namespace: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let doc = self.client.get(kind, name, namespace).await?;
        document::from_document(doc)
    }

    /// List objects of a kind in a namespace, converted one by one into the
    /// element type named at the call site
    pub async fn list<T>(&self, kind: &str, namespace: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let docs = self.client.list(kind, namespace).await?;
        docs.into_iter().map(document::from_document).collect()
    }

    /// Delete an object by kind, name and namespace
    pub async fn delete(&self, kind: &str, name: &str, namespace: &str) -> Result<()> {
        self.client.delete(kind, name, namespace).await
    }

    /// Replace the resource and return the server's view of it as a new value
    pub async fn update<T>(&self, obj: &T) -> Result<T>
    where
        T: Resource + Serialize + DeserializeOwned,
    {
        let updated = self.client.update(Self::to_document(obj)?).await?;
        document::from_document(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::FakeTransport;
    use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::sync::Arc;

    fn pod(name: &str, namespace: &str) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "busybox".to_string(),
                    image: Some("busybox".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn client() -> GenericClient {
        GenericClient::new(Arc::new(FakeTransport::new()))
    }

    #[tokio::test]
    async fn test_create_returns_new_typed_value() {
        let client = client();
        let input = pod("busybox", "testns");

        let created = client.structured().create(&input).await.unwrap();
        assert_eq!(created.metadata.name.as_deref(), Some("busybox"));
        assert_eq!(created.metadata.namespace.as_deref(), Some("testns"));
        // the result carries server-assigned fields the input never had
        assert!(created.metadata.resource_version.is_some());
        assert!(input.metadata.resource_version.is_none());
    }

    #[tokio::test]
    async fn test_get_typed() {
        let client = client();
        client.structured().create(&pod("busybox", "testns")).await.unwrap();

        let fetched: Pod = client
            .structured()
            .get("Pod", "busybox", "testns")
            .await
            .unwrap();
        assert_eq!(fetched.metadata.name.as_deref(), Some("busybox"));
        assert_eq!(
            fetched.spec.unwrap().containers[0].image.as_deref(),
            Some("busybox")
        );
    }

    #[tokio::test]
    async fn test_list_typed() {
        let client = client();
        let structured = client.structured();
        structured.create(&pod("pod-1", "testns")).await.unwrap();
        structured.create(&pod("pod-2", "testns")).await.unwrap();

        let mut pods: Vec<Pod> = structured.list("Pod", "testns").await.unwrap();
        pods.sort_by_key(|p| p.metadata.name.clone());
        assert_eq!(pods.len(), 2);
        assert_eq!(pods[0].metadata.name.as_deref(), Some("pod-1"));
        assert_eq!(pods[1].metadata.name.as_deref(), Some("pod-2"));
    }

    #[tokio::test]
    async fn test_update_typed() {
        let client = client();
        let structured = client.structured();
        let mut created = structured.create(&pod("busybox", "testns")).await.unwrap();

        created.metadata.labels =
            Some([("app".to_string(), "test".to_string())].into_iter().collect());
        let updated = structured.update(&created).await.unwrap();
        assert_eq!(
            updated.metadata.labels.as_ref().unwrap().get("app"),
            Some(&"test".to_string())
        );
    }

    #[tokio::test]
    async fn test_conversion_error_on_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            metadata: u32,
        }

        let client = client();
        client.structured().create(&pod("busybox", "testns")).await.unwrap();

        let err = client
            .structured()
            .get::<Strict>("Pod", "busybox", "testns")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[tokio::test]
    async fn test_delete_typed_passthrough() {
        let client = client();
        client.structured().create(&pod("busybox", "testns")).await.unwrap();
        client
            .structured()
            .delete("Pod", "busybox", "testns")
            .await
            .unwrap();

        let err = client
            .structured()
            .get::<Pod>("Pod", "busybox", "testns")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
