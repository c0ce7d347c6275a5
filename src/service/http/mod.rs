use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{
    cookie::Jar,
    header::{self, HeaderMap, HeaderValue},
    Client, StatusCode,
};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::{
    config::HttpConfig,
    thumbnail::{DownloadError, FetchedMedia, MediaDownloader},
};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outbound page-fetch capability shared by the resolution strategies.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<(StatusCode, String), reqwest::Error>;

    /// Non-success responses come back as `(status, Value::Null)` without
    /// attempting to decode the body.
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<(StatusCode, Value), reqwest::Error>;
}

#[derive(Clone)]
pub struct HttpService {
    client: Client,
}

impl HttpService {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let cookie_jar = Arc::new(Jar::default());

        if let Some(session_id) = &config.session_id {
            if let Ok(origin) = Url::parse("https://www.instagram.com/") {
                cookie_jar.add_cookie_str(
                    &format!("sessionid={}; Domain=.instagram.com; Path=/", session_id),
                    &origin,
                );
                info!("Instagram session cookie loaded");
            }
        }

        let client = Self::create_client(cookie_jar, config)?;

        Ok(Self { client })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers
    }

    fn create_client(cookie_jar: Arc<Jar>, config: &HttpConfig) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .cookie_provider(cookie_jar)
            .default_headers(Self::default_headers())
            .user_agent(DEFAULT_USER_AGENT);

        if let Some(proxy_url) = &config.proxy_url {
            info!("Routing outbound requests through proxy");
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        builder.build()
    }
}

#[async_trait]
impl HttpClient for HttpService {
    async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self.client.get(url).headers(headers).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<(StatusCode, Value), reqwest::Error> {
        let response = self.client.get(url).query(params).headers(headers).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, Value::Null));
        }
        Ok((status, response.json().await?))
    }
}

#[async_trait]
impl MediaDownloader for HttpService {
    async fn fetch(&self, url: &str, max_bytes: u64) -> Result<FetchedMedia, DownloadError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status));
        }

        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(DownloadError::TooLarge(max_bytes));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);

        let bytes: Bytes = response.bytes().await?;
        if bytes.len() as u64 > max_bytes {
            return Err(DownloadError::TooLarge(max_bytes));
        }

        Ok(FetchedMedia { bytes, content_type })
    }

    async fn download(&self, url: &str, dest: &Path, max_bytes: u64) -> Result<u64, DownloadError> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status));
        }

        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(DownloadError::TooLarge(max_bytes));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(DownloadError::TooLarge(max_bytes));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
