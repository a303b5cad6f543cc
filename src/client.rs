use async_trait::async_trait;
use url::Url;

use crate::error::Error;

/// Status and body of one upstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    /// Stand-in for a fetch that never got a response (timeout, refused connection).
    pub fn unreachable() -> Self {
        Self {
            status: 0,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Client: Send + Sync {
    async fn get(&self, url: &str) -> Result<Page, Error>;
    async fn post_json(
        &self,
        url: &str,
        referer: &str,
        body: &serde_json::Value,
    ) -> Result<Page, Error>;
}

/// Appends `segments` to the path of `base`, percent-encoding each one, so a
/// username carrying `/`, `?`, `#` or `;` stays inside its own segment.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, Error> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| Error::config("base url", format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// GET that folds transport failures into an unreachable page, leaving the
/// existence check to the caller.
pub async fn fetch(client: &dyn Client, url: &str) -> Page {
    match client.get(url).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("GET {url} failed: {e}");
            Page::unreachable()
        }
    }
}

pub async fn post(
    client: &dyn Client,
    url: &str,
    referer: &str,
    body: &serde_json::Value,
) -> Page {
    match client.post_json(url, referer, body).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("POST {url} failed: {e}");
            Page::unreachable()
        }
    }
}
