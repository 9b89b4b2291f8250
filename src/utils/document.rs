/// Helpers for loosely-typed resource documents
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Namespace used when a namespaced document does not name one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Loosely-typed resource document, mirroring the wire representation
/// (apiVersion, kind, metadata, spec, status, ...)
pub type GenericDocument = serde_json::Map<String, Value>;

/// Decode a YAML or JSON manifest into a document
pub fn from_manifest(manifest: &str) -> Result<GenericDocument> {
    let value: Value =
        serde_yaml::from_str(manifest).map_err(|e| Error::Decode(e.to_string()))?;
    match value {
        Value::Object(doc) => Ok(doc),
        other => Err(Error::Decode(format!(
            "manifest is not an object: {}",
            other
        ))),
    }
}

/// Convert a typed value into its document form
pub fn to_document<T: Serialize>(obj: &T) -> Result<GenericDocument> {
    match serde_json::to_value(obj).map_err(Error::Conversion)? {
        Value::Object(doc) => Ok(doc),
        _ => Err(Error::Decode("object does not serialize to a map".into())),
    }
}

/// Convert a document into a typed value. Fields the type does not declare
/// are dropped; fields the document lacks take the type's defaults.
pub fn from_document<T: DeserializeOwned>(doc: GenericDocument) -> Result<T> {
    serde_json::from_value(Value::Object(doc)).map_err(Error::Conversion)
}

pub fn kind(doc: &GenericDocument) -> Option<&str> {
    doc.get("kind").and_then(Value::as_str)
}

pub fn api_version(doc: &GenericDocument) -> Option<&str> {
    doc.get("apiVersion").and_then(Value::as_str)
}

fn metadata_str<'a>(doc: &'a GenericDocument, field: &str) -> Option<&'a str> {
    doc.get("metadata")?.get(field)?.as_str()
}

pub fn name(doc: &GenericDocument) -> Option<&str> {
    metadata_str(doc, "name")
}

pub fn namespace(doc: &GenericDocument) -> Option<&str> {
    metadata_str(doc, "namespace")
}

/// The document's namespace, defaulted to "default" when absent or empty
pub fn namespace_or_default(doc: &GenericDocument) -> &str {
    match namespace(doc) {
        Some(ns) if !ns.is_empty() => ns,
        _ => DEFAULT_NAMESPACE,
    }
}

/// Set metadata.namespace, creating the metadata map if needed
pub fn set_namespace(doc: &mut GenericDocument, namespace: &str) {
    let metadata = doc
        .entry("metadata")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if let Value::Object(metadata) = metadata {
        metadata.insert("namespace".into(), Value::String(namespace.into()));
    }
}
