/// Service condition helpers
use std::time::Duration;

use k8s_openapi::api::core::v1::{Endpoints, Service};

use super::Helpers;
use crate::error::Result;
use crate::wait::{wait_for, wait_value, WaitOptions};

impl Helpers<'_> {
    /// Waits for the service's Endpoints object to have at least one subset
    /// with a ready address, up to `timeout`. Addresses that are only in the
    /// not-ready list never satisfy the wait.
    pub async fn wait_service_ready(&self, service: &str, timeout: Duration) -> Result<bool> {
        wait_for::<Endpoints, _>(
            self.client,
            "Endpoints",
            service,
            &self.namespace,
            WaitOptions::new(timeout),
            |endpoints| {
                let ready = endpoints
                    .subsets
                    .iter()
                    .flatten()
                    .any(|subset| subset.addresses.as_ref().is_some_and(|a| !a.is_empty()));
                Ok(ready)
            },
        )
        .await
    }

    /// Waits for the service to be assigned an external load-balancer
    /// address and returns the first ingress IP. An empty string means the
    /// timeout elapsed before one was assigned; that is not an error.
    pub async fn get_external_ip(&self, service: &str, timeout: Duration) -> Result<String> {
        let ip = wait_value::<Service, String, _>(
            self.client,
            "Service",
            service,
            &self.namespace,
            WaitOptions::new(timeout),
            |service| {
                let first = service
                    .status
                    .as_ref()
                    .and_then(|status| status.load_balancer.as_ref())
                    .and_then(|lb| lb.ingress.as_ref())
                    .and_then(|ingress| ingress.first());
                Ok(first.map(|entry| entry.ip.clone().unwrap_or_default()))
            },
        )
        .await?;
        Ok(ip.unwrap_or_default())
    }
}
