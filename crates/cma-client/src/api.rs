//! The `ManagementApi` trait.
//!
//! The publication workflow talks to Contentful only through this trait,
//! so it can be driven by the real [`Client`](crate::Client) or by a mock.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ClientError;
use crate::types::{
    AssetRecord, EntryRecord, NewAsset, NewEntry, RemoteCredentials, ResourceKind, UploadTicket,
};

/// Boxed future returned by every [`ManagementApi`] operation.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// One authenticated call per method; no retries, no state.
pub trait ManagementApi: Send + Sync {
    /// Uploads raw bytes to the Upload API.
    fn upload_binary<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        data: &'a [u8],
    ) -> ApiFuture<'a, UploadTicket>;

    /// Creates a draft asset linked to an upload.
    fn create_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset: &'a NewAsset,
    ) -> ApiFuture<'a, AssetRecord>;

    /// Starts asynchronous processing of the asset's file.
    fn request_processing<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()>;

    /// Fetches the current asset state.
    fn fetch_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
    ) -> ApiFuture<'a, AssetRecord>;

    /// Publishes an asset or entry at the given version.
    fn publish<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        kind: ResourceKind,
        id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()>;

    /// Creates a draft entry of the credentials' content model.
    fn create_entry<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        entry: &'a NewEntry,
    ) -> ApiFuture<'a, EntryRecord>;
}

impl<T: ManagementApi + ?Sized> ManagementApi for Arc<T> {
    fn upload_binary<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        data: &'a [u8],
    ) -> ApiFuture<'a, UploadTicket> {
        (**self).upload_binary(creds, data)
    }

    fn create_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset: &'a NewAsset,
    ) -> ApiFuture<'a, AssetRecord> {
        (**self).create_asset(creds, asset)
    }

    fn request_processing<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        (**self).request_processing(creds, asset_id, version)
    }

    fn fetch_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
    ) -> ApiFuture<'a, AssetRecord> {
        (**self).fetch_asset(creds, asset_id)
    }

    fn publish<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        kind: ResourceKind,
        id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        (**self).publish(creds, kind, id, version)
    }

    fn create_entry<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        entry: &'a NewEntry,
    ) -> ApiFuture<'a, EntryRecord> {
        (**self).create_entry(creds, entry)
    }
}
