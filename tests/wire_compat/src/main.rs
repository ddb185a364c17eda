fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use cfupload_cma_client::{
        Client, ClientError, Link, ManagementApi, NewAsset, NewEntry, RemoteCredentials,
        ResourceKind, UploadTicket,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Serializes `body` and compares it with a fixture (order-independent).
    fn request_matches<T: serde::Serialize>(body: &T, name: &str) {
        let fixture = load_fixture(name);
        let ours = serde_json::to_value(body)
            .unwrap_or_else(|e| panic!("failed to serialize {name}: {e}"));
        assert_eq!(
            fixture, ours,
            "request body mismatch for {name}:\n  API:  {fixture}\n  Rust: {ours}"
        );
    }

    fn creds() -> RemoteCredentials {
        RemoteCredentials::new("yadj1kx9rmg0", "CFPAT-test", "artwork")
    }

    /// Serves one response read from a fixture and returns a client pointed at it.
    async fn serve_fixture(status: u16, name: &str) -> Client {
        let body = read_fixture(name);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = vec![0u8; 8192];
            let header_end = loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break raw.len();
                }
            };
            let head = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while raw.len() < header_end + content_length {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }

            let resp = format!(
                "HTTP/1.1 {status} Fixture\r\nContent-Type: application/vnd.contentful.management.v1+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        });

        Client::new().unwrap().with_base_urls(base.clone(), base)
    }

    // --- Request bodies ---

    #[test]
    fn asset_create_request() {
        let upload = UploadTicket {
            id: "3HmfpnT4OaEuqwwOxb2rEs".into(),
        };
        let body = NewAsset::new(
            "Sunset Over Hills",
            "Sunset-Over-Hills.jpeg",
            "image/jpeg",
            &upload,
        );
        request_matches(&body, "asset_create_request.json");
    }

    #[test]
    fn entry_create_request() {
        let body = NewEntry::new(
            "Sunset Over Hills",
            "R. Vale",
            "5KsDBWseXY6QegucYAoacS",
            false,
            true,
        );
        request_matches(&body, "entry_create_request.json");
    }

    #[test]
    fn link_parses_from_entry_response() {
        let fixture = load_fixture("entry_response.json");
        let link: Link = serde_json::from_value(fixture["fields"]["image"]["en-US"].clone())
            .expect("asset link");
        assert_eq!(link, Link::asset("5KsDBWseXY6QegucYAoacS"));
    }

    // --- Response bodies ---

    #[tokio::test]
    async fn upload_response() {
        let client = serve_fixture(201, "upload_response.json").await;
        let ticket = client.upload_binary(&creds(), b"bytes").await.unwrap();
        assert_eq!(ticket.id, "3HmfpnT4OaEuqwwOxb2rEs");
    }

    #[tokio::test]
    async fn asset_response_pending() {
        let client = serve_fixture(200, "asset_response_pending.json").await;
        let asset = client
            .fetch_asset(&creds(), "5KsDBWseXY6QegucYAoacS")
            .await
            .unwrap();
        assert_eq!(asset.version, 1);
        assert!(!asset.is_processed());
    }

    #[tokio::test]
    async fn asset_response_processed() {
        let client = serve_fixture(200, "asset_response_processed.json").await;
        let asset = client
            .fetch_asset(&creds(), "5KsDBWseXY6QegucYAoacS")
            .await
            .unwrap();
        assert_eq!(asset.version, 3);
        assert!(asset.is_processed());
        assert!(asset.file_url.unwrap().starts_with("//images.ctfassets.net/"));
    }

    #[tokio::test]
    async fn entry_response() {
        let client = serve_fixture(201, "entry_response.json").await;
        let entry = client
            .create_entry(&creds(), &NewEntry::new("t", "a", "5KsDBWseXY6QegucYAoacS", false, true))
            .await
            .unwrap();
        assert_eq!(entry.id, "6gFsqFrTmoKkq0MYWuSwuE");
        assert_eq!(entry.version, 1);
    }

    #[tokio::test]
    async fn error_response_is_passed_through() {
        let client = serve_fixture(409, "error_response.json").await;
        let err = client
            .publish(&creds(), ResourceKind::Asset, "5KsDBWseXY6QegucYAoacS", 2)
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("VersionMismatch"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
