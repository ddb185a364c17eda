//! Single-image publication session.
//!
//! `AssetPublication` drives one [`UploadRequest`] through the whole
//! pipeline against a [`ManagementApi`]. Each step feeds the identifier or
//! version it produced into the next; the first failure ends the run.

use cfupload_cma_client::{
    AssetRecord, ManagementApi, NewAsset, NewEntry, RemoteCredentials, ResourceKind,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PublishError, Step};
use crate::naming::sanitize_file_name;
use crate::types::{PollPolicy, PublishEvent, PublishOutcome, UploadRequest};

/// Manages the publication of one image.
pub struct AssetPublication<'a> {
    api: &'a dyn ManagementApi,
    cancel: CancellationToken,
    policy: PollPolicy,
    run_id: Uuid,
}

impl<'a> AssetPublication<'a> {
    /// Creates a new session with the default poll policy.
    pub fn new(api: &'a dyn ManagementApi, cancel: CancellationToken) -> Self {
        Self {
            api,
            cancel,
            policy: PollPolicy::default(),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Runs the full pipeline.
    ///
    /// Progress events are sent via `events_tx`:
    /// 1. Validate (0.0)
    /// 2. Upload binary (0.05)
    /// 3. Create asset (0.2)
    /// 4. Request processing (0.25)
    /// 5. Poll until processed (0.3–0.7)
    /// 6. Publish asset (0.75)
    /// 7. Create entry (0.85)
    /// 8. Publish entry (0.95–1.0)
    pub async fn run(
        &self,
        request: &UploadRequest,
        creds: &RemoteCredentials,
        events_tx: &mpsc::Sender<PublishEvent>,
    ) -> Result<PublishOutcome, PublishError> {
        // 1. Validate
        self.emit_progress(events_tx, Step::Validate, 0.0, "Validating...");
        validate(request.name(), creds)?;

        // 2. Upload binary
        self.check_cancelled(Step::Upload)?;
        self.emit_progress(events_tx, Step::Upload, 0.05, "Uploading image...");

        let ticket = self
            .api
            .upload_binary(creds, request.data())
            .await
            .map_err(|e| PublishError::from_client(Step::Upload, e))?;

        debug!(run = %self.run_id, upload = %ticket.id, bytes = request.data().len(), "binary uploaded");

        // 3. Create asset
        self.check_cancelled(Step::CreateAsset)?;
        self.emit_progress(events_tx, Step::CreateAsset, 0.2, "Creating asset...");

        let file_name = sanitize_file_name(request.name(), request.content_type());
        let new_asset = NewAsset::new(request.name(), file_name, request.content_type(), &ticket);
        let asset = self
            .api
            .create_asset(creds, &new_asset)
            .await
            .map_err(|e| PublishError::from_client(Step::CreateAsset, e))?;

        debug!(run = %self.run_id, asset = %asset.id, version = asset.version, "asset created");

        // 4. Request processing
        self.check_cancelled(Step::RequestProcessing)?;
        self.emit_progress(
            events_tx,
            Step::RequestProcessing,
            0.25,
            "Processing asset...",
        );

        self.api
            .request_processing(creds, &asset.id, asset.version)
            .await
            .map_err(|e| PublishError::from_client(Step::RequestProcessing, e))?;

        info!(run = %self.run_id, asset = %asset.id, "asset processing initiated");

        // 5. Poll until processed
        let processed = self.poll_until_processed(creds, &asset.id, events_tx).await?;

        // 6. Publish asset at the version the processed poll reported.
        self.check_cancelled(Step::PublishAsset)?;
        self.emit_progress(events_tx, Step::PublishAsset, 0.75, "Publishing asset...");

        self.api
            .publish(creds, ResourceKind::Asset, &processed.id, processed.version)
            .await
            .map_err(|e| PublishError::from_client(Step::PublishAsset, e))?;

        debug!(run = %self.run_id, asset = %processed.id, version = processed.version, "asset published");

        // 7. Create entry
        self.check_cancelled(Step::CreateEntry)?;
        self.emit_progress(events_tx, Step::CreateEntry, 0.85, "Creating entry...");

        let new_entry = NewEntry::new(
            request.name(),
            request.artist(),
            processed.id.clone(),
            request.spoiler(),
            request.homepage_feature(),
        );
        let entry = self
            .api
            .create_entry(creds, &new_entry)
            .await
            .map_err(|e| PublishError::from_client(Step::CreateEntry, e))?;

        debug!(run = %self.run_id, entry = %entry.id, version = entry.version, "entry created");

        // 8. Publish entry
        self.check_cancelled(Step::PublishEntry)?;
        self.emit_progress(events_tx, Step::PublishEntry, 0.95, "Publishing entry...");

        self.api
            .publish(creds, ResourceKind::Entry, &entry.id, entry.version)
            .await
            .map_err(|e| PublishError::from_client(Step::PublishEntry, e))?;

        self.emit_progress(events_tx, Step::PublishEntry, 1.0, "Upload complete!");

        Ok(PublishOutcome {
            asset_id: processed.id,
            entry_id: entry.id,
            name: request.name().to_string(),
        })
    }

    /// Fetches the asset until its file URL appears or the budget runs out.
    ///
    /// A failed fetch ends the run immediately; only "not yet processed"
    /// consumes the poll budget.
    async fn poll_until_processed(
        &self,
        creds: &RemoteCredentials,
        asset_id: &str,
        events_tx: &mpsc::Sender<PublishEvent>,
    ) -> Result<AssetRecord, PublishError> {
        let attempts = self.policy.attempts.max(1);

        for attempt in 1..=attempts {
            self.check_cancelled(Step::Poll)?;

            let asset = self
                .api
                .fetch_asset(creds, asset_id)
                .await
                .map_err(|e| PublishError::from_client(Step::Poll, e))?;

            if asset.is_processed() {
                debug!(run = %self.run_id, asset = %asset.id, version = asset.version, attempt, "asset processed");
                return Ok(asset);
            }

            debug!(run = %self.run_id, attempt, attempts, "asset still processing");

            // Progress: 0.3 to 0.7.
            let progress = 0.3 + (attempt as f64 / attempts as f64) * 0.4;
            let status = format!("Asset still processing... attempt {attempt}/{attempts}");
            self.emit_progress(events_tx, Step::Poll, progress, &status);

            if attempt < attempts {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        return Err(PublishError::Cancelled { step: Step::Poll });
                    }
                    _ = tokio::time::sleep(self.policy.delay_after(attempt)) => {}
                }
            }
        }

        warn!(run = %self.run_id, asset = %asset_id, attempts, "asset processing timed out");
        Err(PublishError::ProcessingTimeout { attempts })
    }

    fn check_cancelled(&self, step: Step) -> Result<(), PublishError> {
        if self.cancel.is_cancelled() {
            Err(PublishError::Cancelled { step })
        } else {
            Ok(())
        }
    }

    /// Never blocks; events are dropped when the buffer is full.
    fn emit_progress(
        &self,
        events_tx: &mpsc::Sender<PublishEvent>,
        step: Step,
        progress: f64,
        status: &str,
    ) {
        let _ = events_tx.try_send(PublishEvent::Progress {
            run_id: self.run_id,
            step,
            progress,
            status: status.to_string(),
        });
    }
}

/// Checks the display name and credentials without touching the network.
pub fn validate(name: &str, creds: &RemoteCredentials) -> Result<(), PublishError> {
    if name.trim().is_empty() {
        return Err(PublishError::ValidationFailed(
            "image name cannot be empty".into(),
        ));
    }
    if let Some(field) = creds.missing_field() {
        return Err(PublishError::ConfigurationMissing { field });
    }
    Ok(())
}
