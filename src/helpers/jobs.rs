/// Job condition helpers
use std::time::Duration;

use k8s_openapi::api::batch::v1::Job;

use super::Helpers;
use crate::error::{Error, Result};
use crate::wait::{wait_for, WaitOptions};

/// Whether the job carries a true Complete condition. A true Failed
/// condition is an error carrying the condition's reason.
fn is_completed(job: &Job) -> Result<bool> {
    let conditions = job
        .status
        .as_ref()
        .and_then(|status| status.conditions.as_deref())
        .unwrap_or(&[]);

    for condition in conditions {
        if condition.status != "True" {
            continue;
        }
        match condition.type_.as_str() {
            "Failed" => {
                return Err(Error::WaitFailed(format!(
                    "job failed with reason: {}",
                    condition.reason.as_deref().unwrap_or("")
                )))
            }
            "Complete" => return Ok(true),
            _ => {}
        }
    }
    Ok(false)
}

impl Helpers<'_> {
    /// Waits for the job to complete, up to `timeout`. Returns whether it
    /// did; a job that enters the Failed condition ends the wait early with
    /// an error carrying the failure reason.
    pub async fn wait_job_completed(&self, name: &str, timeout: Duration) -> Result<bool> {
        wait_for::<Job, _>(
            self.client,
            "Job",
            name,
            &self.namespace,
            WaitOptions::new(timeout),
            is_completed,
        )
        .await
    }
}
