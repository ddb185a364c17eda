//! Publisher: runs publication sessions and reports their outcome.
//!
//! Owns the progress event channel and the cancellation token shared by
//! every run it starts. Publishers hold no other state, so several can run
//! side by side on one runtime.

use cfupload_cma_client::{ManagementApi, RemoteCredentials};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::PublishError;
use crate::types::{PollPolicy, PublishEvent, PublishOutcome, UploadRequest};
use crate::workflow::AssetPublication;

/// Result of one publication run.
#[derive(Debug)]
pub struct PublishReport {
    pub run_id: Uuid,
    /// Display name from the request.
    pub name: String,
    pub result: Result<PublishOutcome, PublishError>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// ID of the published entry, if the run succeeded.
    pub fn entry_id(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|o| o.entry_id.as_str())
    }

    /// Single human-readable line describing the outcome.
    pub fn message(&self) -> String {
        match &self.result {
            Ok(outcome) => format!("Image \"{}\" uploaded successfully!", outcome.name),
            Err(e) => format!("Upload failed: {e}"),
        }
    }
}

/// Runs image publications and reports their outcome.
pub struct Publisher {
    events_tx: mpsc::Sender<PublishEvent>,
    events_rx: Option<mpsc::Receiver<PublishEvent>>,
    cancel: CancellationToken,
    policy: PollPolicy,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher {
    /// Creates a new publisher with the default poll policy.
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<PublishEvent>> {
        self.events_rx.take()
    }

    /// Returns the cancellation token for runs started by this publisher.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Publishes one image and returns its report.
    ///
    /// Failures are reported, never panicked on; already created remote
    /// resources are left in place.
    pub async fn publish(
        &self,
        api: &dyn ManagementApi,
        request: &UploadRequest,
        creds: &RemoteCredentials,
    ) -> PublishReport {
        let session = AssetPublication::new(api, self.cancel.clone()).with_policy(self.policy);
        let run_id = session.run_id();

        info!(run = %run_id, name = %request.name(), bytes = request.data().len(), "publish started");

        let result = session.run(request, creds, &self.events_tx).await;

        match &result {
            Ok(outcome) => {
                let _ = self.events_tx.try_send(PublishEvent::Completed {
                    run_id,
                    entry_id: outcome.entry_id.clone(),
                });
                info!(run = %run_id, asset = %outcome.asset_id, entry = %outcome.entry_id, "publish completed");
            }
            Err(e) => {
                let _ = self.events_tx.try_send(PublishEvent::Failed {
                    run_id,
                    step: e.step(),
                    error: e.to_string(),
                });
                error!(run = %run_id, step = %e.step(), error = %e, "publish failed");
            }
        }

        PublishReport {
            run_id,
            name: request.name().to_string(),
            result,
        }
    }
}
