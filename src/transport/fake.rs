/// In-memory transport for tests
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use super::Transport;
use crate::error::{Error, Result};
use crate::locator::{builtin_mappings, KindLocator, ResourceMapping, ResourceScope, StaticLocator};
use crate::utils::document::{self, GenericDocument};

/// Object identity inside the store: (group/resource, namespace, name)
type Key = (String, String, String);

#[derive(Default)]
struct Store {
    objects: HashMap<Key, GenericDocument>,
    /// Field manager that last applied each object
    managers: HashMap<Key, String>,
    next_version: u64,
}

/// A [`Transport`] double holding objects in memory.
///
/// Implements the server behaviors the crate's contracts depend on:
/// AlreadyExists on duplicate create, NotFound on missing objects, stale
/// resourceVersion rejection on replace, generateName completion, and
/// apply conflicts between different field managers. A call counter lets
/// tests assert that an operation never reached the transport.
pub struct FakeTransport {
    store: Mutex<Store>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of transport operations performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Upsert a document directly, bypassing create/replace semantics.
    /// Tests use this to simulate the cluster changing an object out of
    /// band (a pod entering Running, an endpoint gaining addresses).
    pub fn store(&self, doc: GenericDocument) -> Result<()> {
        let kind = document::kind(&doc)
            .ok_or_else(|| Error::Decode("document has no kind".into()))?
            .to_string();
        let mapping = StaticLocator::default().resolve(&kind)?;
        let namespace = match mapping.scope {
            ResourceScope::Namespaced => Some(document::namespace_or_default(&doc).to_string()),
            ResourceScope::Cluster => None,
        };
        let name = document::name(&doc)
            .ok_or_else(|| Error::Decode("document has no name".into()))?
            .to_string();

        let mut store = self.store.lock().expect("fake store poisoned");
        let key = key(&mapping, namespace.as_deref(), &name);
        let mut doc = doc;
        stamp_version(&mut doc, &mut store);
        store.objects.insert(key, doc);
        Ok(())
    }

    /// Build a transport pre-populated with the given documents
    pub fn with_objects(docs: impl IntoIterator<Item = GenericDocument>) -> Result<Self> {
        let transport = Self::new();
        for doc in docs {
            transport.store(doc)?;
        }
        Ok(transport)
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn key(mapping: &ResourceMapping, namespace: Option<&str>, name: &str) -> Key {
    (
        format!("{}/{}", mapping.group, mapping.resource),
        namespace.unwrap_or("").to_string(),
        name.to_string(),
    )
}

fn resource_version(doc: &GenericDocument) -> Option<&str> {
    doc.get("metadata")?.get("resourceVersion")?.as_str()
}

fn set_metadata_field(doc: &mut GenericDocument, field: &str, value: String) {
    let metadata = doc
        .entry("metadata")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if let Value::Object(metadata) = metadata {
        metadata.insert(field.to_string(), Value::String(value));
    }
}

fn stamp_version(doc: &mut GenericDocument, store: &mut Store) {
    store.next_version += 1;
    set_metadata_field(doc, "resourceVersion", store.next_version.to_string());
}

fn generate_name(doc: &GenericDocument) -> Option<String> {
    let prefix = doc.get("metadata")?.get("generateName")?.as_str()?;
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(5)
        .collect();
    Some(format!("{}{}", prefix, suffix))
}

#[async_trait]
impl Transport for FakeTransport {
    async fn discover(&self) -> Result<Vec<ResourceMapping>> {
        self.count_call();
        Ok(builtin_mappings())
    }

    async fn create(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        doc: &GenericDocument,
    ) -> Result<GenericDocument> {
        self.count_call();
        let mut doc = doc.clone();

        let name = match document::name(&doc).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let generated = generate_name(&doc)
                    .ok_or_else(|| Error::Decode("document has no name".into()))?;
                set_metadata_field(&mut doc, "name", generated.clone());
                generated
            }
        };

        let mut store = self.store.lock().expect("fake store poisoned");
        let key = key(mapping, namespace, &name);
        if store.objects.contains_key(&key) {
            return Err(Error::AlreadyExists {
                kind: mapping.kind.clone(),
                name,
            });
        }

        let uid: String = format!("{:032x}", rand::thread_rng().gen::<u128>());
        set_metadata_field(&mut doc, "uid", uid);
        stamp_version(&mut doc, &mut store);
        store.objects.insert(key, doc.clone());
        Ok(doc)
    }

    async fn get(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<GenericDocument> {
        self.count_call();
        let store = self.store.lock().expect("fake store poisoned");
        store
            .objects
            .get(&key(mapping, namespace, name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: mapping.kind.clone(),
                name: name.to_string(),
            })
    }

    async fn list(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
    ) -> Result<Vec<GenericDocument>> {
        self.count_call();
        let store = self.store.lock().expect("fake store poisoned");
        let group_resource = format!("{}/{}", mapping.group, mapping.resource);
        let namespace = namespace.unwrap_or("");
        Ok(store
            .objects
            .iter()
            .filter(|((gr, ns, _), _)| *gr == group_resource && *ns == namespace)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn delete(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()> {
        self.count_call();
        let mut store = self.store.lock().expect("fake store poisoned");
        let key = key(mapping, namespace, name);
        if store.objects.remove(&key).is_none() {
            return Err(Error::NotFound {
                kind: mapping.kind.clone(),
                name: name.to_string(),
            });
        }
        store.managers.remove(&key);
        Ok(())
    }

    async fn replace(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
    ) -> Result<GenericDocument> {
        self.count_call();
        let mut store = self.store.lock().expect("fake store poisoned");
        let key = key(mapping, namespace, name);

        let current = store.objects.get(&key).ok_or_else(|| Error::NotFound {
            kind: mapping.kind.clone(),
            name: name.to_string(),
        })?;

        if let (Some(submitted), Some(stored)) = (resource_version(doc), resource_version(current))
        {
            if submitted != stored {
                return Err(Error::Conflict {
                    kind: mapping.kind.clone(),
                    name: name.to_string(),
                    reason: format!(
                        "resourceVersion {} is stale (current {})",
                        submitted, stored
                    ),
                });
            }
        }

        let mut doc = doc.clone();
        stamp_version(&mut doc, &mut store);
        store.objects.insert(key, doc.clone());
        Ok(doc)
    }

    async fn apply(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
        doc: &GenericDocument,
        field_manager: &str,
    ) -> Result<GenericDocument> {
        self.count_call();
        let mut store = self.store.lock().expect("fake store poisoned");
        let key = key(mapping, namespace, name);

        if let Some(owner) = store.managers.get(&key) {
            if owner != field_manager {
                return Err(Error::Conflict {
                    kind: mapping.kind.clone(),
                    name: name.to_string(),
                    reason: format!("fields are owned by manager '{}'", owner),
                });
            }
        }

        let mut doc = doc.clone();
        stamp_version(&mut doc, &mut store);
        store.objects.insert(key.clone(), doc.clone());
        store.managers.insert(key, field_manager.to_string());
        Ok(doc)
    }
}
