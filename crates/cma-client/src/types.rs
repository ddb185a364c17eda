//! Request and response schemas for the Contentful APIs.

use serde::{Deserialize, Serialize};

/// Locale every field value is written under.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Credentials for one Contentful space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCredentials {
    pub space_id: String,
    pub token: String,
    /// Content type (model) ID for created entries.
    pub model_id: String,
}

impl RemoteCredentials {
    pub fn new(
        space_id: impl Into<String>,
        token: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            space_id: space_id.into(),
            token: token.into(),
            model_id: model_id.into(),
        }
    }

    /// Returns the name of the first empty field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("space_id", &self.space_id),
            ("token", &self.token),
            ("model_id", &self.model_id),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Which collection a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Asset,
    Entry,
}

impl ResourceKind {
    /// Collection path segment.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Asset => "assets",
            Self::Entry => "entries",
        }
    }
}

/// A value written under the default locale: `{"en-US": value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localized<T> {
    #[serde(rename = "en-US")]
    pub value: T,
}

impl<T> Localized<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// A link to another resource: `{"sys": {"type": "Link", ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    #[serde(rename = "type")]
    pub kind: String,
    pub link_type: String,
    pub id: String,
}

impl Link {
    fn new(link_type: &str, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: "Link".into(),
                link_type: link_type.into(),
                id: id.into(),
            },
        }
    }

    /// Link to an upload created through the Upload API.
    pub fn upload(id: impl Into<String>) -> Self {
        Self::new("Upload", id)
    }

    /// Link to an asset.
    pub fn asset(id: impl Into<String>) -> Self {
        Self::new("Asset", id)
    }
}

/// Body of `POST .../assets`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAsset {
    pub fields: NewAssetFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAssetFields {
    pub title: Localized<String>,
    pub file: Localized<AssetFileLink>,
}

/// File description linking an asset to an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFileLink {
    pub file_name: String,
    pub content_type: String,
    pub upload_from: Link,
}

impl NewAsset {
    pub fn new(
        title: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        upload: &UploadTicket,
    ) -> Self {
        Self {
            fields: NewAssetFields {
                title: Localized::new(title.into()),
                file: Localized::new(AssetFileLink {
                    file_name: file_name.into(),
                    content_type: content_type.into(),
                    upload_from: Link::upload(upload.id.clone()),
                }),
            },
        }
    }
}

/// Body of `POST .../entries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    pub fields: NewEntryFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntryFields {
    pub title: Localized<String>,
    pub artist: Localized<String>,
    pub image: Localized<Link>,
    pub spoiler: Localized<bool>,
    pub featured_on_homepage: Localized<bool>,
}

impl NewEntry {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        asset_id: impl Into<String>,
        spoiler: bool,
        featured_on_homepage: bool,
    ) -> Self {
        Self {
            fields: NewEntryFields {
                title: Localized::new(title.into()),
                artist: Localized::new(artist.into()),
                image: Localized::new(Link::asset(asset_id)),
                spoiler: Localized::new(spoiler),
                featured_on_homepage: Localized::new(featured_on_homepage),
            },
        }
    }
}

/// Uploaded binary not yet attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub id: String,
}

/// Server-side asset state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: String,
    pub version: u64,
    /// Served file URL, populated once processing completes.
    pub file_url: Option<String>,
}

impl AssetRecord {
    /// Whether asynchronous processing has produced a file URL.
    pub fn is_processed(&self) -> bool {
        self.file_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Server-side entry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub id: String,
    pub version: u64,
}

/// `sys` block of every response (internal).
#[derive(Debug, Deserialize)]
pub(crate) struct SysMeta {
    pub id: String,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub sys: SysMeta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetResponse {
    pub sys: SysMeta,
    #[serde(default)]
    pub fields: AssetResponseFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssetResponseFields {
    #[serde(default)]
    pub file: Option<Localized<AssetFileState>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssetFileState {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntryResponse {
    pub sys: SysMeta,
}

impl From<UploadResponse> for UploadTicket {
    fn from(resp: UploadResponse) -> Self {
        Self { id: resp.sys.id }
    }
}

impl TryFrom<AssetResponse> for AssetRecord {
    type Error = String;

    fn try_from(resp: AssetResponse) -> Result<Self, Self::Error> {
        let version = resp
            .sys
            .version
            .ok_or_else(|| format!("asset {} has no sys.version", resp.sys.id))?;
        Ok(Self {
            id: resp.sys.id,
            version,
            file_url: resp.fields.file.and_then(|f| f.value.url),
        })
    }
}

impl TryFrom<EntryResponse> for EntryRecord {
    type Error = String;

    fn try_from(resp: EntryResponse) -> Result<Self, Self::Error> {
        let version = resp
            .sys
            .version
            .ok_or_else(|| format!("entry {} has no sys.version", resp.sys.id))?;
        Ok(Self {
            id: resp.sys.id,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_field_reports_first_empty() {
        let creds = RemoteCredentials::new("space", "", "");
        assert_eq!(creds.missing_field(), Some("token"));

        let creds = RemoteCredentials::new("space", "token", "   ");
        assert_eq!(creds.missing_field(), Some("model_id"));

        let creds = RemoteCredentials::new("space", "token", "artwork");
        assert_eq!(creds.missing_field(), None);
    }

    #[test]
    fn new_asset_shape() {
        let ticket = UploadTicket { id: "up1".into() };
        let body = NewAsset::new("My Art", "My-Art.png", "image/png", &ticket);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "fields": {
                    "title": {"en-US": "My Art"},
                    "file": {"en-US": {
                        "fileName": "My-Art.png",
                        "contentType": "image/png",
                        "uploadFrom": {"sys": {"type": "Link", "linkType": "Upload", "id": "up1"}}
                    }}
                }
            })
        );
    }

    #[test]
    fn new_entry_shape() {
        let body = NewEntry::new("My Art", "@artist", "A1", true, false);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["fields"]["image"]["en-US"]["sys"]["linkType"], "Asset");
        assert_eq!(value["fields"]["image"]["en-US"]["sys"]["id"], "A1");
        assert_eq!(value["fields"]["spoiler"]["en-US"], true);
        assert_eq!(value["fields"]["featuredOnHomepage"]["en-US"], false);
        assert_eq!(value["fields"]["artist"]["en-US"], "@artist");
    }

    #[test]
    fn asset_response_unprocessed() {
        let resp: AssetResponse = serde_json::from_value(json!({
            "sys": {"id": "A1", "version": 2},
            "fields": {"file": {"en-US": {"fileName": "a.png", "contentType": "image/png"}}}
        }))
        .unwrap();
        let record = AssetRecord::try_from(resp).unwrap();
        assert_eq!(record.version, 2);
        assert!(!record.is_processed());
    }

    #[test]
    fn asset_response_processed() {
        let resp: AssetResponse = serde_json::from_value(json!({
            "sys": {"id": "A1", "version": 3},
            "fields": {"file": {"en-US": {"url": "//images.ctfassets.net/a.png"}}}
        }))
        .unwrap();
        let record = AssetRecord::try_from(resp).unwrap();
        assert!(record.is_processed());
        assert_eq!(record.file_url.as_deref(), Some("//images.ctfassets.net/a.png"));
    }

    #[test]
    fn empty_url_is_not_processed() {
        let record = AssetRecord {
            id: "A1".into(),
            version: 1,
            file_url: Some(String::new()),
        };
        assert!(!record.is_processed());
    }

    #[test]
    fn asset_response_without_version_rejected() {
        let resp: AssetResponse = serde_json::from_value(json!({"sys": {"id": "A1"}})).unwrap();
        let err = AssetRecord::try_from(resp).unwrap_err();
        assert!(err.contains("sys.version"));
    }

    #[test]
    fn resource_kind_collections() {
        assert_eq!(ResourceKind::Asset.collection(), "assets");
        assert_eq!(ResourceKind::Entry.collection(), "entries");
    }

    #[test]
    fn localized_key_is_default_locale() {
        let value = serde_json::to_value(Localized::new(7)).unwrap();
        assert_eq!(value[DEFAULT_LOCALE], 7);
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
