//! Image asset publication workflow.
//!
//! This crate implements the **business logic** for publishing an image to
//! Contentful as a processed asset plus a linked entry. It has no UI or
//! configuration dependencies; callers supply a [`ManagementApi`]
//! implementation and the space credentials.
//!
//! # Pipeline
//!
//! 1. **Validate**: display name and credentials, no network calls
//! 2. **Upload**: raw bytes to the Upload API
//! 3. **Create asset**: draft asset linked to the upload
//! 4. **Process**: request asynchronous file processing
//! 5. **Poll**: fetch the asset until a file URL appears
//! 6. **Publish asset**: at the version seen by the last poll
//! 7. **Create entry**: metadata entry linking the asset
//! 8. **Publish entry**: at the version returned by creation
//!
//! [`ManagementApi`]: cfupload_cma_client::ManagementApi

pub mod error;
pub mod naming;
pub mod publisher;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use error::{PublishError, Step};
pub use naming::{detect_content_type, file_extension, sanitize_file_name, sniff_content_type};
pub use publisher::{PublishReport, Publisher};
pub use types::{PollPolicy, PublishEvent, PublishOutcome, UploadRequest};
pub use workflow::{AssetPublication, validate};
