//! Scripted `ManagementApi` used by the workflow tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use cfupload_cma_client::{
    ApiFuture, AssetRecord, ClientError, EntryRecord, ManagementApi, NewAsset, NewEntry,
    RemoteCredentials, ResourceKind, UploadTicket,
};

/// A call as observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Upload(usize),
    CreateAsset(NewAsset),
    Process { id: String, version: u64 },
    Fetch(String),
    Publish {
        kind: ResourceKind,
        id: String,
        version: u64,
    },
    CreateEntry(NewEntry),
}

type Script<T> = Mutex<VecDeque<Result<T, ClientError>>>;

/// Mock API that replays queued responses and records every call.
#[derive(Default)]
pub(crate) struct MockApi {
    pub uploads: Script<UploadTicket>,
    pub assets: Script<AssetRecord>,
    pub processes: Script<()>,
    pub fetches: Script<AssetRecord>,
    pub publishes: Script<()>,
    pub entries: Script<EntryRecord>,
    calls: Mutex<Vec<Call>>,
}

pub(crate) fn asset(id: &str, version: u64, url: Option<&str>) -> AssetRecord {
    AssetRecord {
        id: id.into(),
        version,
        file_url: url.map(Into::into),
    }
}

pub(crate) fn rejected(status: u16, body: &str) -> ClientError {
    ClientError::Api {
        status,
        body: body.into(),
    }
}

impl MockApi {
    /// The successful sequence: upload → A1 v1 → processed at v2 → E1 v1.
    pub fn happy() -> Self {
        let mock = Self::default();
        mock.uploads
            .lock()
            .unwrap()
            .push_back(Ok(UploadTicket { id: "up1".into() }));
        mock.assets
            .lock()
            .unwrap()
            .push_back(Ok(asset("A1", 1, None)));
        mock.processes.lock().unwrap().push_back(Ok(()));
        mock.push_fetch(Ok(asset("A1", 2, Some("//images.example/a1.png"))));
        mock.publishes.lock().unwrap().push_back(Ok(()));
        mock.publishes.lock().unwrap().push_back(Ok(()));
        mock.entries.lock().unwrap().push_back(Ok(EntryRecord {
            id: "E1".into(),
            version: 1,
        }));
        mock
    }

    /// Replaces the fetch script with `pending` unprocessed polls, then `then`.
    pub fn with_polls(self, pending: usize, then: Option<AssetRecord>) -> Self {
        {
            let mut fetches = self.fetches.lock().unwrap();
            fetches.clear();
            for i in 0..pending {
                fetches.push_back(Ok(asset("A1", 2 + i as u64, None)));
            }
            if let Some(record) = then {
                fetches.push_back(Ok(record));
            }
        }
        self
    }

    pub fn push_fetch(&self, result: Result<AssetRecord, ClientError>) {
        self.fetches.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next<T>(script: &Script<T>) -> Result<T, ClientError> {
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted response".into())))
    }
}

impl ManagementApi for MockApi {
    fn upload_binary<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        data: &'a [u8],
    ) -> ApiFuture<'a, UploadTicket> {
        self.record(Call::Upload(data.len()));
        Box::pin(async move { Self::next(&self.uploads) })
    }

    fn create_asset<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        asset: &'a NewAsset,
    ) -> ApiFuture<'a, AssetRecord> {
        self.record(Call::CreateAsset(asset.clone()));
        Box::pin(async move { Self::next(&self.assets) })
    }

    fn request_processing<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        asset_id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        self.record(Call::Process {
            id: asset_id.into(),
            version,
        });
        Box::pin(async move { Self::next(&self.processes) })
    }

    fn fetch_asset<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        asset_id: &'a str,
    ) -> ApiFuture<'a, AssetRecord> {
        self.record(Call::Fetch(asset_id.into()));
        Box::pin(async move { Self::next(&self.fetches) })
    }

    fn publish<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        kind: ResourceKind,
        id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        self.record(Call::Publish {
            kind,
            id: id.into(),
            version,
        });
        Box::pin(async move { Self::next(&self.publishes) })
    }

    fn create_entry<'a>(
        &'a self,
        _creds: &'a RemoteCredentials,
        entry: &'a NewEntry,
    ) -> ApiFuture<'a, EntryRecord> {
        self.record(Call::CreateEntry(entry.clone()));
        Box::pin(async move { Self::next(&self.entries) })
    }
}
