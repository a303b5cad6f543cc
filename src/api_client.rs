use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};

use crate::client::{Client, Page};
use crate::config::Config;
use crate::error::Error;

/// reqwest-backed [`Client`] with a per-request timeout.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "accept",
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .user_agent(config.user_agent.as_str())
                .timeout(config.timeout)
                .build()?,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Page, Error> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Page { status, body })
    }

    async fn get_once(&self, url: &str) -> Result<Page, Error> {
        let page = self.send(self.client.get(url)).await?;
        log::debug!("GET {url} -> {}", page.status);
        Ok(page)
    }

    async fn post_once(
        &self,
        url: &str,
        referer: &str,
        body: &serde_json::Value,
    ) -> Result<Page, Error> {
        let request = self.client.post(url).header(REFERER, referer).json(body);
        let page = self.send(request).await?;
        log::debug!("POST {url} -> {}", page.status);
        Ok(page)
    }
}

fn retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(20).map(jitter).take(3)
}

// a timeout already spent the whole budget, only refused connections are retried
fn is_retryable(err: &Error) -> bool {
    matches!(err, Error::Request(e) if e.is_connect())
}

#[async_trait]
impl Client for HttpClient {
    async fn get(&self, url: &str) -> Result<Page, Error> {
        RetryIf::spawn(retry_strategy(), || self.get_once(url), is_retryable).await
    }

    async fn post_json(
        &self,
        url: &str,
        referer: &str,
        body: &serde_json::Value,
    ) -> Result<Page, Error> {
        RetryIf::spawn(
            retry_strategy(),
            || self.post_once(url, referer, body),
            is_retryable,
        )
        .await
    }
}
