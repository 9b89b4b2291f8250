/// Transport implementation over the Kubernetes API client
use async_trait::async_trait;
use kube::api::{
    Api, ApiResource, DeleteParams, DynamicObject, ListParams, Patch, PatchParams, PostParams,
};
use kube::discovery::{Discovery, Scope};
use kube::Client;
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::error::{Error, Result};
use crate::locator::{ResourceMapping, ResourceScope};
use crate::utils::document::GenericDocument;

/// Adapts a pre-configured `kube::Client` to the [`Transport`] contract.
///
/// Building the client (kubeconfig resolution, in-cluster config, TLS) is
/// left to the caller.
#[derive(Clone)]
pub struct KubeTransport {
    client: Client,
}

impl KubeTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn dynamic_api(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
    ) -> Api<DynamicObject> {
        let resource = ApiResource {
            group: mapping.group.clone(),
            version: mapping.version.clone(),
            api_version: mapping.api_version(),
            kind: mapping.kind.clone(),
            plural: mapping.resource.clone(),
        };
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

fn to_dynamic(doc: &GenericDocument) -> Result<DynamicObject> {
    serde_json::from_value(Value::Object(doc.clone())).map_err(Error::Conversion)
}

fn to_doc(obj: &DynamicObject) -> Result<GenericDocument> {
    match serde_json::to_value(obj).map_err(Error::Conversion)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(Error::Decode("response is not an object".into())),
    }
}

/// Maps an API status response onto the crate's error taxonomy, keeping the
/// original error as the cause for everything else
fn map_kube_error(err: kube::Error, kind: &str, name: &str) -> Error {
    if let kube::Error::Api(ref status) = err {
        match (status.reason.as_str(), status.code) {
            ("NotFound", _) | (_, 404) => {
                return Error::NotFound {
                    kind: kind.to_string(),
                    name: name.to_string(),
                }
            }
            ("AlreadyExists", _) => {
                return Error::AlreadyExists {
                    kind: kind.to_string(),
                    name: name.to_string(),
                }
            }
            (_, 409) => {
                return Error::Conflict {
                    kind: kind.to_string(),
                    name: name.to_string(),
                    reason: status.message.clone(),
                }
            }
            _ => {}
        }
    }
    Error::Transport(err.into())
}

#[async_trait]
impl Transport for KubeTransport {
    async fn discover(&self) -> Result<Vec<ResourceMapping>> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| Error::Transport(e.into()))?;

        let mut mappings = Vec::new();
        for group in discovery.groups() {
            for (resource, capabilities) in group.recommended_resources() {
                let scope = match capabilities.scope {
                    Scope::Namespaced => ResourceScope::Namespaced,
                    Scope::Cluster => ResourceScope::Cluster,
                };
                mappings.push(ResourceMapping::new(
                    &resource.kind,
                    &resource.group,
                    &resource.version,
                    &resource.plural,
                    scope,
                ));
            }
        }
        debug!("discovery returned {} kinds", mappings.len());
        Ok(mappings)
    }

    async fn create(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        doc: &GenericDocument,
    ) -> Result<GenericDocument> {
        let obj = to_dynamic(doc)?;
        let name = obj.metadata.name.clone().unwrap_or_default();
        let created = self
            .dynamic_api(mapping, namespace)
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, &name))?;
        to_doc(&created)
    }

    async fn get(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<GenericDocument> {
        let obj = self
            .dynamic_api(mapping, namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, name))?;
        to_doc(&obj)
    }

    async fn list(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
    ) -> Result<Vec<GenericDocument>> {
        let objs = self
            .dynamic_api(mapping, namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, ""))?;
        objs.items.iter().map(to_doc).collect()
    }

    async fn delete(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()> {
        self.dynamic_api(mapping, namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, name))?;
        Ok(())
    }

    async fn replace(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
    ) -> Result<GenericDocument> {
        let obj = to_dynamic(doc)?;
        let updated = self
            .dynamic_api(mapping, namespace)
            .replace(name, &PostParams::default(), &obj)
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, name))?;
        to_doc(&updated)
    }

    async fn apply(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
        field_manager: &str,
    ) -> Result<GenericDocument> {
        let params = PatchParams::apply(field_manager);
        let patch = Patch::Apply(Value::Object(doc.clone()));
        let applied = self
            .dynamic_api(mapping, namespace)
            .patch(name, &params, &patch)
            .await
            .map_err(|e| map_kube_error(e, &mapping.kind, name))?;
        to_doc(&applied)
    }
}
