//! # Cloud Image Helpers
//!
//! Path extraction plus thin upload/delete wrappers over the host
//! transport ([`host::UploadHost`]).
//!
//! ## Path Extraction
//!
//! Image references arrive in several shapes: bare cloud paths,
//! HTTP(S) URLs with nested segments and query strings, and the
//! `cloud://env.bucket/...` scheme. [`extract_cloud_path`] normalizes
//! all of them to the bucket-relative path through a three-tier
//! fallback: structured URL parse, then a pattern match, then the raw
//! input. Every tier percent-decodes and falls back to the undecoded
//! string when decoding fails.
//!
//! ## Upload Semantics
//!
//! Each upload races a 30 second timeout against the host call; the
//! timeout only stops waiting, since the host exposes no cancellation
//! primitive; the transfer may continue unobserved.
//! Multi-file uploads fan out concurrently and settle in any order;
//! the result list is assembled by input index, and the first failure
//! in completion order fails the whole batch, discarding the URLs of
//! any uploads that did succeed (no compensating deletes are issued).

use crate::error::{Result, WardrobeError};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub mod host;

use host::{ProgressFn, UploadHost, UploadRequest};

/// Cloud environment id baked into the upload endpoint.
pub const DEFAULT_ENV_ID: &str = "default";

/// How long one upload may run before the caller stops waiting.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

const UPLOAD_FIELD: &str = "file";
const DEFAULT_EXT: &str = "jpg";

// protocol://host/path[?query], for inputs the URL parser rejects.
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:]+://[^/]+/(.+?)(?:\?.*)?$").expect("pattern compiles"));

/// Local file handle handed over by the UI layer's picker.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Declared file name; its extension names the uploaded file.
    pub name: String,
    /// Host temp path of the picked file, when available.
    pub temp_file_path: Option<String>,
}

#[derive(Deserialize)]
struct UploadBody {
    url: Option<String>,
    message: Option<String>,
}

/// Extract the bucket-relative cloud path from a URL or bare path.
/// Unextractable input yields an empty string.
pub fn extract_cloud_path(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    // No scheme marker: treat the input as already being a cloud path.
    if !url.contains("://") {
        let path = match url.find('?') {
            Some(index) => &url[..index],
            None => url,
        };
        return decode_or_raw(path);
    }

    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            decode_or_raw(path.strip_prefix('/').unwrap_or(path))
        }
        Err(_) => PATH_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_or_raw(m.as_str()))
            .unwrap_or_default(),
    }
}

fn decode_or_raw(path: &str) -> String {
    match percent_decode_str(path).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.to_string(),
    }
}

fn make_cloud_path(file_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random: u32 = rand::rng().random_range(0..10_000);
    let ext = match file_name.rsplit('.').next() {
        Some("") | None => DEFAULT_EXT,
        Some(ext) => ext,
    };
    format!("clothing/{timestamp}-{random}.{ext}")
}

/// Upload/delete client bound to one host transport.
pub struct CloudClient<T: UploadHost> {
    host: T,
    upload_url: String,
}

impl<T: UploadHost> CloudClient<T> {
    pub fn new(host: T) -> Self {
        Self::with_env_id(host, DEFAULT_ENV_ID)
    }

    pub fn with_env_id(host: T, env_id: &str) -> Self {
        Self {
            host,
            upload_url: format!("https://{env_id}.tcb.qcloud.la/upload"),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Upload one image, returning its public URL.
    ///
    /// The destination is `clothing/{timestamp}-{random}.{ext}` with the
    /// extension taken from the file's declared name (`jpg` when it has
    /// none). Success requires HTTP 200 and a response body carrying a
    /// `url` field; the whole call races [`UPLOAD_TIMEOUT`].
    pub async fn upload_image(
        &self,
        file: &UploadFile,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<String> {
        let request = UploadRequest {
            url: self.upload_url.clone(),
            file_path: file
                .temp_file_path
                .clone()
                .unwrap_or_else(|| file.name.clone()),
            field_name: UPLOAD_FIELD.to_string(),
            cloud_path: make_cloud_path(&file.name),
        };

        let outcome =
            tokio::time::timeout(UPLOAD_TIMEOUT, self.host.upload_file(&request, on_progress))
                .await;
        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(cloud_path = %request.cloud_path, error = %e, "upload failed");
                return Err(WardrobeError::Upload(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(cloud_path = %request.cloud_path, "upload timed out");
                return Err(WardrobeError::Timeout(UPLOAD_TIMEOUT));
            }
        };

        let body: UploadBody = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(_) => return Err(WardrobeError::Upload("Invalid response data".to_string())),
        };
        match (response.status_code, body.url) {
            (200, Some(url)) => Ok(url),
            _ => Err(WardrobeError::Upload(
                body.message.unwrap_or_else(|| "Upload failed".to_string()),
            )),
        }
    }

    /// Delete one remote image given its URL or cloud path.
    pub async fn delete_image(&self, url: &str) -> Result<()> {
        let cloud_path = extract_cloud_path(url);
        if cloud_path.is_empty() {
            return Err(WardrobeError::InvalidUrl);
        }

        let outcomes = self
            .host
            .delete_files(std::slice::from_ref(&cloud_path))
            .await
            .map_err(|e| {
                tracing::warn!(cloud_path = %cloud_path, error = %e, "delete failed");
                WardrobeError::Delete(e.to_string())
            })?;

        match outcomes.first() {
            Some(outcome) if outcome.status == 0 => Ok(()),
            Some(outcome) => Err(WardrobeError::Delete(
                outcome
                    .message
                    .clone()
                    .unwrap_or_else(|| "Delete failed".to_string()),
            )),
            None => Err(WardrobeError::Delete("Delete failed".to_string())),
        }
    }

    /// Upload several images concurrently.
    ///
    /// `on_progress` receives `(input index, percent)`. On success the
    /// URL list matches the input order regardless of completion order.
    /// Any failure fails the batch with the first failure encountered in
    /// completion order; already-uploaded files are left behind remotely.
    pub async fn upload_multiple(
        &self,
        files: &[UploadFile],
        on_progress: Option<&(dyn Fn(usize, u8) + Send + Sync)>,
    ) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let mut uploads: FuturesUnordered<_> = files
            .iter()
            .enumerate()
            .map(|(index, file)| async move {
                let forward = on_progress.map(|cb| move |percent: u8| cb(index, percent));
                let sink: Option<ProgressFn<'_>> = match forward.as_ref() {
                    Some(f) => Some(f),
                    None => None,
                };
                (index, self.upload_image(file, sink).await)
            })
            .collect();

        let mut slots: Vec<Option<String>> = vec![None; files.len()];
        let mut first_error = None;
        while let Some((index, result)) = uploads.next().await {
            match result {
                Ok(url) => slots[index] = Some(url),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(slots.into_iter().flatten().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::host::{DeleteOutcome, TransportError, UploadResponse};
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::time::sleep;

    enum UploadScript {
        Respond {
            status: u16,
            body: String,
            delay: Duration,
            progress: Vec<u8>,
        },
        TransportFail(String),
        Hang,
    }

    fn ok_body(url: &str) -> String {
        format!(r#"{{"url":"{url}"}}"#)
    }

    #[derive(Default)]
    struct MockHost {
        scripts: Mutex<HashMap<String, UploadScript>>,
        delete_result: Mutex<Option<std::result::Result<Vec<DeleteOutcome>, TransportError>>>,
        requests: Mutex<Vec<UploadRequest>>,
        deleted_paths: Mutex<Vec<String>>,
    }

    impl MockHost {
        fn script(self, file_path: &str, script: UploadScript) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(file_path.to_string(), script);
            self
        }

        fn deletes(self, result: std::result::Result<Vec<DeleteOutcome>, TransportError>) -> Self {
            *self.delete_result.lock().unwrap() = Some(result);
            self
        }
    }

    #[async_trait]
    impl UploadHost for MockHost {
        async fn upload_file(
            &self,
            request: &UploadRequest,
            on_progress: Option<ProgressFn<'_>>,
        ) -> std::result::Result<UploadResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            let script = self.scripts.lock().unwrap().remove(&request.file_path);
            match script {
                Some(UploadScript::Respond {
                    status,
                    body,
                    delay,
                    progress,
                }) => {
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    if let Some(cb) = on_progress {
                        for percent in progress {
                            cb(percent);
                        }
                    }
                    Ok(UploadResponse {
                        status_code: status,
                        body,
                    })
                }
                Some(UploadScript::TransportFail(message)) => Err(TransportError(message)),
                Some(UploadScript::Hang) => {
                    sleep(Duration::from_secs(3600)).await;
                    Err(TransportError("host never settled".to_string()))
                }
                // Unscripted uploads echo their cloud path back as a URL.
                None => Ok(UploadResponse {
                    status_code: 200,
                    body: ok_body(&format!("https://cdn.example.com/{}", request.cloud_path)),
                }),
            }
        }

        async fn delete_files(
            &self,
            paths: &[String],
        ) -> std::result::Result<Vec<DeleteOutcome>, TransportError> {
            self.deleted_paths.lock().unwrap().extend_from_slice(paths);
            match self.delete_result.lock().unwrap().take() {
                Some(result) => result,
                None => Ok(paths
                    .iter()
                    .map(|p| DeleteOutcome {
                        path: p.clone(),
                        status: 0,
                        message: None,
                    })
                    .collect()),
            }
        }
    }

    fn file(name: &str, temp: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            temp_file_path: Some(temp.to_string()),
        }
    }

    mod extract {
        use super::*;

        #[test]
        fn empty_input_yields_empty_output() {
            assert_eq!(extract_cloud_path(""), "");
        }

        #[test]
        fn bare_path_passes_through() {
            assert_eq!(extract_cloud_path("bare/path.jpg"), "bare/path.jpg");
        }

        #[test]
        fn bare_path_loses_its_query() {
            assert_eq!(extract_cloud_path("bare/path.jpg?x=1"), "bare/path.jpg");
        }

        #[test]
        fn bare_path_percent_decodes() {
            assert_eq!(extract_cloud_path("a%20b.jpg"), "a b.jpg");
        }

        #[test]
        fn undecodable_input_comes_back_raw() {
            assert_eq!(extract_cloud_path("bare/%ff.jpg"), "bare/%ff.jpg");
        }

        #[test]
        fn https_url_keeps_nested_segments() {
            assert_eq!(
                extract_cloud_path("https://example.com/path/to/abc-123.jpg"),
                "path/to/abc-123.jpg"
            );
        }

        #[test]
        fn https_url_loses_its_query() {
            assert_eq!(
                extract_cloud_path("https://h/a/b.jpg?x=1&sign=zzz"),
                "a/b.jpg"
            );
        }

        #[test]
        fn https_url_percent_decodes() {
            assert_eq!(extract_cloud_path("https://h/a%20b.jpg"), "a b.jpg");
        }

        #[test]
        fn cloud_scheme_discards_env_and_bucket() {
            assert_eq!(
                extract_cloud_path("cloud://env-id.bucket/p/f.jpg?s=1"),
                "p/f.jpg"
            );
        }

        #[test]
        fn unparseable_url_falls_back_to_pattern_match() {
            // The space makes the host invalid for the URL parser.
            assert_eq!(
                extract_cloud_path("http://exa mple.com/path/file.jpg?a=1"),
                "path/file.jpg"
            );
        }

        #[test]
        fn hopeless_input_yields_empty() {
            assert_eq!(extract_cloud_path("http://no path"), "");
        }
    }

    #[tokio::test]
    async fn upload_returns_the_reported_url() {
        let client = CloudClient::new(MockHost::default());
        let url = client
            .upload_image(&file("image.jpg", "tmp/1"), None)
            .await
            .unwrap();
        assert!(url.starts_with("https://cdn.example.com/clothing/"));
        assert!(url.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn upload_request_carries_the_transport_contract() {
        let client = CloudClient::new(MockHost::default());
        client
            .upload_image(&file("photo.png", "tmp/photo"), None)
            .await
            .unwrap();

        let requests = client.host.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.url, "https://default.tcb.qcloud.la/upload");
        assert_eq!(request.file_path, "tmp/photo");
        assert_eq!(request.field_name, "file");
        let path_shape = Regex::new(r"^clothing/\d+-\d+\.png$").unwrap();
        assert!(path_shape.is_match(&request.cloud_path));
    }

    #[tokio::test]
    async fn upload_without_temp_path_sends_the_name() {
        let client = CloudClient::new(MockHost::default());
        let no_temp = UploadFile {
            name: "image.jpg".to_string(),
            temp_file_path: None,
        };
        client.upload_image(&no_temp, None).await.unwrap();
        assert_eq!(client.host.requests.lock().unwrap()[0].file_path, "image.jpg");
    }

    #[tokio::test]
    async fn nameless_file_defaults_to_jpg() {
        let client = CloudClient::new(MockHost::default());
        client.upload_image(&file("", "tmp/1"), None).await.unwrap();
        assert!(client.host.requests.lock().unwrap()[0]
            .cloud_path
            .ends_with(".jpg"));
    }

    #[tokio::test]
    async fn custom_env_id_lands_in_the_upload_url() {
        let client = CloudClient::with_env_id(MockHost::default(), "prod-7");
        assert_eq!(client.upload_url(), "https://prod-7.tcb.qcloud.la/upload");
    }

    #[tokio::test]
    async fn transport_failure_carries_the_host_message() {
        let host = MockHost::default().script(
            "tmp/1",
            UploadScript::TransportFail("uploadFile:fail".to_string()),
        );
        let err = CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), None)
            .await
            .unwrap_err();
        assert_matches!(&err, WardrobeError::Upload(_));
        assert!(err.to_string().contains("uploadFile:fail"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_upload_failure() {
        let host = MockHost::default().script(
            "tmp/1",
            UploadScript::Respond {
                status: 200,
                body: "not json".to_string(),
                delay: Duration::ZERO,
                progress: vec![],
            },
        );
        let err = CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid response data"));
    }

    #[tokio::test]
    async fn body_without_url_fails_with_its_message() {
        let host = MockHost::default().script(
            "tmp/1",
            UploadScript::Respond {
                status: 200,
                body: r#"{"message":"quota exceeded"}"#.to_string(),
                delay: Duration::ZERO,
                progress: vec![],
            },
        );
        let err = CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn non_200_status_fails_even_with_a_url() {
        let host = MockHost::default().script(
            "tmp/1",
            UploadScript::Respond {
                status: 500,
                body: ok_body("https://cdn.example.com/x.jpg"),
                delay: Duration::ZERO,
                progress: vec![],
            },
        );
        let err = CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), None)
            .await
            .unwrap_err();
        assert_matches!(err, WardrobeError::Upload(_));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_times_out_after_thirty_seconds() {
        let host = MockHost::default().script("tmp/1", UploadScript::Hang);
        let err = CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), None)
            .await
            .unwrap_err();
        assert_matches!(err, WardrobeError::Timeout(_));
        assert_eq!(err.to_string(), "Upload timeout after 30000ms");
    }

    #[tokio::test]
    async fn progress_events_are_forwarded_raw() {
        let host = MockHost::default().script(
            "tmp/1",
            UploadScript::Respond {
                status: 200,
                body: ok_body("https://cdn.example.com/x.jpg"),
                delay: Duration::ZERO,
                progress: vec![12, 50, 100],
            },
        );
        let seen = Mutex::new(Vec::new());
        let on_progress = |percent: u8| seen.lock().unwrap().push(percent);

        CloudClient::new(host)
            .upload_image(&file("a.jpg", "tmp/1"), Some(&on_progress))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![12, 50, 100]);
    }

    #[tokio::test]
    async fn delete_of_empty_url_is_invalid() {
        let err = CloudClient::new(MockHost::default())
            .delete_image("")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL");
    }

    #[tokio::test]
    async fn delete_extracts_the_cloud_path_first() {
        let client = CloudClient::new(MockHost::default());
        client
            .delete_image("https://h/a/b.jpg?sign=1")
            .await
            .unwrap();
        assert_eq!(
            *client.host.deleted_paths.lock().unwrap(),
            vec!["a/b.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_with_nonzero_status_fails_with_host_message() {
        let host = MockHost::default().deletes(Ok(vec![DeleteOutcome {
            path: "a.jpg".to_string(),
            status: -1,
            message: Some("no such file".to_string()),
        }]));
        let err = CloudClient::new(host)
            .delete_image("a.jpg")
            .await
            .unwrap_err();
        assert_matches!(&err, WardrobeError::Delete(_));
        assert!(err.to_string().contains("no such file"));
    }

    #[tokio::test]
    async fn delete_transport_failure_is_reported() {
        let host =
            MockHost::default().deletes(Err(TransportError("deleteFile:fail".to_string())));
        let err = CloudClient::new(host)
            .delete_image("a.jpg")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deleteFile:fail"));
    }

    #[tokio::test]
    async fn uploading_nothing_succeeds_with_an_empty_list() {
        let urls = CloudClient::new(MockHost::default())
            .upload_multiple(&[], None)
            .await
            .unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn batch_urls_come_back_in_input_order() {
        // The first file finishes last; slots are still filled by index.
        let host = MockHost::default()
            .script(
                "tmp/slow",
                UploadScript::Respond {
                    status: 200,
                    body: ok_body("https://cdn.example.com/first"),
                    delay: Duration::from_millis(300),
                    progress: vec![],
                },
            )
            .script(
                "tmp/fast",
                UploadScript::Respond {
                    status: 200,
                    body: ok_body("https://cdn.example.com/second"),
                    delay: Duration::from_millis(10),
                    progress: vec![],
                },
            );

        let urls = CloudClient::new(host)
            .upload_multiple(&[file("a.jpg", "tmp/slow"), file("b.jpg", "tmp/fast")], None)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/first".to_string(),
                "https://cdn.example.com/second".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn batch_fails_with_the_first_failure_in_completion_order() {
        let host = MockHost::default()
            .script(
                "tmp/0",
                UploadScript::Respond {
                    status: 200,
                    body: r#"{"message":"late failure"}"#.to_string(),
                    delay: Duration::from_millis(200),
                    progress: vec![],
                },
            )
            .script(
                "tmp/1",
                UploadScript::TransportFail("early failure".to_string()),
            );

        let err = CloudClient::new(host)
            .upload_multiple(&[file("a.jpg", "tmp/0"), file("b.jpg", "tmp/1")], None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("early failure"));
    }

    #[tokio::test]
    async fn one_failure_discards_successful_urls() {
        let host = MockHost::default().script(
            "tmp/bad",
            UploadScript::TransportFail("broken".to_string()),
        );
        let result = CloudClient::new(host)
            .upload_multiple(&[file("a.jpg", "tmp/ok"), file("b.jpg", "tmp/bad")], None)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn batch_progress_is_tagged_with_the_input_index() {
        let host = MockHost::default()
            .script(
                "tmp/0",
                UploadScript::Respond {
                    status: 200,
                    body: ok_body("https://cdn.example.com/0"),
                    delay: Duration::ZERO,
                    progress: vec![100],
                },
            )
            .script(
                "tmp/1",
                UploadScript::Respond {
                    status: 200,
                    body: ok_body("https://cdn.example.com/1"),
                    delay: Duration::ZERO,
                    progress: vec![40, 100],
                },
            );
        let seen: Mutex<Vec<(usize, u8)>> = Mutex::new(Vec::new());
        let on_progress = |index: usize, percent: u8| seen.lock().unwrap().push((index, percent));

        CloudClient::new(host)
            .upload_multiple(
                &[file("a.jpg", "tmp/0"), file("b.jpg", "tmp/1")],
                Some(&on_progress),
            )
            .await
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert!(seen.contains(&(0, 100)));
        assert!(seen.contains(&(1, 40)));
        assert!(seen.contains(&(1, 100)));
    }
}
