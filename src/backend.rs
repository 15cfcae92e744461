//! Access to the yard backend's HTTP endpoints.

use crate::config::ServerConfig;
use crate::errors::{YardError, YardResult};
use crate::snapshot::Snapshot;
use log::debug;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Method;
use std::path::{Path, PathBuf};

pub const CURRENT_GRID_PATH: &str = "/api/current_grid";
pub const NEXT_GRID_PATH: &str = "/api/next_grid";
pub const DOWNLOAD_MANIFEST_PATH: &str = "/download_manifest";
pub const CLOSE_PATH: &str = "/close";
pub const UPLOAD_PATH: &str = "/";
pub const LOG_PATH: &str = "/log";

/// Extension the backend accepts for uploaded manifests
pub const MANIFEST_EXTENSION: &str = "txt";

/// A file the backend sent as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name suggested by `Content-Disposition`, if any
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Write the attachment into `dir`, using `fallback` when no usable name was sent
    pub fn save_into(&self, dir: &Path, fallback: &str) -> YardResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let name = self
            .file_name
            .as_deref()
            .and_then(sanitize_file_name)
            .unwrap_or_else(|| fallback.to_string());
        let path = dir.join(name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Operations the viewer needs from the backend
pub trait YardBackend: Send + Sync {
    /// `GET /api/current_grid`
    fn current_grid(&self) -> YardResult<Snapshot>;
    /// `POST /api/next_grid`, advancing the plan one step
    fn next_grid(&self) -> YardResult<Snapshot>;
    /// `GET /download_manifest`
    fn download_manifest(&self) -> YardResult<Attachment>;
    /// `GET /close`, which hands back the operation log
    fn close(&self) -> YardResult<Attachment>;
    /// `POST /log` with an operator note
    fn post_log_message(&self, message: &str) -> YardResult<()>;
    /// `POST /` with a manifest file; starts a backend session
    fn upload_manifest(&self, path: &Path) -> YardResult<()>;
}

/// reqwest-backed client; keeps the session cookie between calls
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &ServerConfig) -> YardResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| YardError::transport(&base_url, e))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, path: &str, request: reqwest::blocking::RequestBuilder) -> YardResult<Response> {
        debug!("→ {}", path);
        let response = request.send().map_err(|e| YardError::transport(path, e))?;
        let status = response.status();
        debug!("← {} {}", path, status);
        if !status.is_success() {
            return Err(YardError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn fetch_snapshot(&self, method: Method, path: &str) -> YardResult<Snapshot> {
        let response = self.send(path, self.client.request(method, self.url(path)))?;
        let body = response.text().map_err(|e| YardError::transport(path, e))?;
        Snapshot::from_json(&body).map_err(|e| YardError::decode(path, e))
    }

    fn fetch_attachment(&self, path: &str) -> YardResult<Attachment> {
        let response = self.send(path, self.client.get(self.url(path)))?;
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition);
        let bytes = response.bytes().map_err(|e| YardError::transport(path, e))?;
        Ok(Attachment {
            file_name,
            bytes: bytes.to_vec(),
        })
    }
}

impl YardBackend for HttpBackend {
    fn current_grid(&self) -> YardResult<Snapshot> {
        self.fetch_snapshot(Method::GET, CURRENT_GRID_PATH)
    }

    fn next_grid(&self) -> YardResult<Snapshot> {
        self.fetch_snapshot(Method::POST, NEXT_GRID_PATH)
    }

    fn download_manifest(&self) -> YardResult<Attachment> {
        self.fetch_attachment(DOWNLOAD_MANIFEST_PATH)
    }

    fn close(&self) -> YardResult<Attachment> {
        self.fetch_attachment(CLOSE_PATH)
    }

    fn post_log_message(&self, message: &str) -> YardResult<()> {
        let request = self.client.post(self.url(LOG_PATH)).form(&[("message", message)]);
        self.send(LOG_PATH, request)?;
        Ok(())
    }

    fn upload_manifest(&self, path: &Path) -> YardResult<()> {
        check_manifest_name(path)?;
        // Visiting the start page first opens the backend's operation log
        self.send(UPLOAD_PATH, self.client.get(self.url(UPLOAD_PATH)))?;
        let form = multipart::Form::new().file("file", path)?;
        let request = self.client.post(self.url(UPLOAD_PATH)).multipart(form);
        self.send(UPLOAD_PATH, request)?;
        Ok(())
    }
}

/// Only `.txt` manifests are accepted by the backend
pub fn check_manifest_name(path: &Path) -> YardResult<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(MANIFEST_EXTENSION) => Ok(()),
        _ => Err(YardError::InvalidUpload(format!(
            "{} is not a .{} manifest",
            path.display(),
            MANIFEST_EXTENSION
        ))),
    }
}

/// File name from a `Content-Disposition` header value
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut extended = None;
    for part in value.split(';').map(str::trim) {
        if let Some(name) = part.strip_prefix("filename=") {
            let name = name.trim_matches('"');
            if !name.is_empty() {
                return Some(name.to_string());
            }
        } else if let Some(name) = part.strip_prefix("filename*=") {
            let name = name.split("''").last().unwrap_or(name).trim_matches('"');
            if !name.is_empty() {
                extended = Some(percent_decode(name));
            }
        }
    }
    extended
}

/// Decode `%XX` escapes of an RFC 5987 value; malformed escapes stay as written
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok());
            if let Some(byte) = hex.and_then(|pair| u8::from_str_radix(pair, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Last path component of a suggested name, refusing anything that escapes the directory
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition() {
        assert_eq!(
            parse_content_disposition("attachment; filename=ShipCase1OUTBOUND.txt").as_deref(),
            Some("ShipCase1OUTBOUND.txt")
        );
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="log file.txt""#).as_deref(),
            Some("log file.txt")
        );
        assert_eq!(
            parse_content_disposition("attachment; filename*=UTF-8''manifest.txt").as_deref(),
            Some("manifest.txt")
        );
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_extended_filename_is_percent_decoded() {
        assert_eq!(
            parse_content_disposition("attachment; filename*=UTF-8''Port%20Log.txt").as_deref(),
            Some("Port Log.txt")
        );
        assert_eq!(
            parse_content_disposition("attachment; filename*=UTF-8''Kr%C3%A4n.txt").as_deref(),
            Some("Krän.txt")
        );
        assert_eq!(percent_decode("100%_done%2"), "100%_done%2");
        assert_eq!(percent_decode("%+1.txt"), "%+1.txt");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name(r"C:\logs\Port.txt").as_deref(), Some("Port.txt"));
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("dir/"), None);
    }

    #[test]
    fn test_check_manifest_name() {
        assert!(check_manifest_name(Path::new("ShipCase1.txt")).is_ok());
        assert!(check_manifest_name(Path::new("SHIP.TXT")).is_ok());
        assert!(matches!(
            check_manifest_name(Path::new("ship.csv")),
            Err(YardError::InvalidUpload(_))
        ));
        assert!(check_manifest_name(Path::new("manifest")).is_err());
    }

    #[test]
    fn test_attachment_save_into() {
        let dir = tempfile::tempdir().unwrap();
        let named = Attachment {
            file_name: Some("../ShipOUTBOUND.txt".into()),
            bytes: b"[01,01], {00000}, NAN\n".to_vec(),
        };
        let path = named.save_into(dir.path(), "manifest.txt").unwrap();
        assert_eq!(path, dir.path().join("ShipOUTBOUND.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), named.bytes);

        let unnamed = Attachment {
            file_name: None,
            bytes: vec![1, 2, 3],
        };
        let path = unnamed.save_into(&dir.path().join("nested"), "log.txt").unwrap();
        assert!(path.ends_with("nested/log.txt"));
    }

    #[test]
    fn test_url_joining() {
        let backend = HttpBackend::new(&ServerConfig {
            base_url: "http://127.0.0.1:5000/".into(),
            request_timeout_ms: Some(500),
        })
        .unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(backend.url(CURRENT_GRID_PATH), "http://127.0.0.1:5000/api/current_grid");
    }
}
