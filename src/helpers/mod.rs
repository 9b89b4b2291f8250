/// Condition helpers for commonly-awaited resources
pub mod jobs;
pub mod namespaces;
pub mod pods;
pub mod services;

use crate::resources::GenericClient;

/// Helper functions bound to one namespace.
///
/// Obtained from [`GenericClient::helpers`]; borrows the client for the
/// duration of the call, holds no other state.
pub struct Helpers<'a> {
    pub(crate) client: &'a GenericClient,
    pub(crate) namespace: String,
}

impl<'a> Helpers<'a> {
    pub(crate) fn new(client: &'a GenericClient, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}
