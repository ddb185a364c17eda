//! Contentful API client for image asset publication.
//!
//! Provides a stateless async client for the Contentful Management API
//! and the separate Upload API. Every operation returns a typed record or a
//! [`ClientError`]; the client never retries and never interprets payloads
//! beyond parsing them into the schemas in [`types`].

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{ApiFuture, ManagementApi};
pub use client::Client;
pub use error::ClientError;
pub use types::{
    AssetRecord, EntryRecord, Link, Localized, NewAsset, NewEntry, RemoteCredentials,
    ResourceKind, UploadTicket,
};
