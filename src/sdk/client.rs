use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use crate::{Result, Error, Student, StudentFields, StudentReader, StudentWriter};

/// A remote Student Store reached over its HTTP API.
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl Client {
    /// Connects to a server at `addr` (`host:port` or a full `http://` URL).
    ///
    /// The server is probed once so that an unreachable address fails here
    /// rather than on first use.
    pub async fn connect(addr: &str) -> Result<Self> {
        let base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };
        let base_url = Url::parse(&base_url).map_err(|e| Error::Internal(format!("invalid address {}: {}", addr, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Internal(format!("invalid address {}", addr)));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let client = Self { base_url, http };
        client.list().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn request(&self, method: Method, id: Option<&str>) -> RequestBuilder {
        self.http.request(method, students_url(&self.base_url, id))
    }

    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        // Retry logic
        for i in 0..3u64 {
            match build().send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() && i < 2 => {
                    log::debug!("Connection to {} failed, retrying: {}", self.base_url, e);
                    tokio::time::sleep(Duration::from_millis((i + 1) * 200)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Internal("failed after 3 attempts".to_string()))
    }

    async fn expect_json<T: DeserializeOwned>(resp: Response, id: Option<&str>) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        let id = id.unwrap_or_default().to_string();
        Err(match status {
            StatusCode::BAD_REQUEST => Error::Validation(message),
            StatusCode::CONFLICT => Error::Conflict(id),
            StatusCode::NOT_FOUND => Error::NotFound(id),
            _ => Error::Internal(message),
        })
    }
}

/// `<base>/api/students[/<id>]`, with `id` percent-encoded as a single segment.
fn students_url(base: &Url, id: Option<&str>) -> Url {
    let mut url = base.clone();
    // `connect` rejects cannot-be-a-base URLs, so the segments are always available.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("api").push("students").extend(id);
    }
    url
}

#[async_trait]
impl StudentReader for Client {
    async fn list(&self) -> Result<Vec<Student>> {
        let resp = self.send(|| self.request(Method::GET, None)).await?;
        Self::expect_json(resp, None).await
    }

    async fn get(&self, id: &str) -> Result<Student> {
        let resp = self.send(|| self.request(Method::GET, Some(id))).await?;
        Self::expect_json(resp, Some(id)).await
    }
}

#[async_trait]
impl StudentWriter for Client {
    async fn create(&self, fields: StudentFields) -> Result<Student> {
        let resp = self.send(|| self.request(Method::POST, None).json(&fields)).await?;
        Self::expect_json(resp, fields.id.as_deref()).await
    }

    async fn update(&self, id: &str, fields: StudentFields) -> Result<Student> {
        let resp = self.send(|| self.request(Method::PUT, Some(id)).json(&fields)).await?;
        Self::expect_json(resp, Some(id)).await
    }

    async fn delete(&self, id: &str) -> Result<Student> {
        let resp = self.send(|| self.request(Method::DELETE, Some(id))).await?;
        Self::expect_json(resp, Some(id)).await
    }
}
