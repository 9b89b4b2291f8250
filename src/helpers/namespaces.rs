/// Namespace helpers
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use super::Helpers;
use crate::error::{Error, Result};

impl Helpers<'_> {
    /// Creates a namespace with a server-generated name starting with the
    /// given prefix (e.g. "test-" yields something like "test-af8hx") and
    /// returns the assigned name.
    pub async fn create_random_namespace(&self, prefix: &str) -> Result<String> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                generate_name: Some(prefix.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let created = self.client.structured().create(&namespace).await?;
        created
            .metadata
            .name
            .ok_or_else(|| Error::Decode("server returned a namespace without a name".into()))
    }
}
