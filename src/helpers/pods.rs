/// Pod condition helpers
use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;

use super::Helpers;
use crate::error::{Error, Result};
use crate::wait::{wait_for, WaitOptions};

impl Helpers<'_> {
    /// Waits for the pod to reach phase Running, up to `timeout`. Returns
    /// whether it did; a pod that reaches phase Failed ends the wait early
    /// with an error.
    pub async fn wait_pod_running(&self, name: &str, timeout: Duration) -> Result<bool> {
        wait_for::<Pod, _>(
            self.client,
            "Pod",
            name,
            &self.namespace,
            WaitOptions::new(timeout),
            |pod| {
                let phase = pod
                    .status
                    .as_ref()
                    .and_then(|status| status.phase.as_deref())
                    .unwrap_or("");
                match phase {
                    "Failed" => Err(Error::WaitFailed("pod has failed".into())),
                    "Running" => Ok(true),
                    _ => Ok(false),
                }
            },
        )
        .await
    }
}
