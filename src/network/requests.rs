use anyhow::anyhow;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around one `reqwest::Client` and the configured server base
/// URL. Every endpoint in the crate is resolved through here, so the base URL
/// exists in exactly one place.
///
/// Requests are single-shot: no retry, no backoff. The poller's fixed
/// schedule is the only retry mechanism this client has.
pub struct ApiClient {
  base_url: Url,
  client: reqwest::Client,
}

impl ApiClient {
  pub fn new(base_url: &str) -> anyhow::Result<ApiClient> {
    let base_url = Url::parse(base_url)
      .map_err(|e| anyhow!("invalid server URL {}: {}", base_url, e))?;
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()?;
    Ok(ApiClient { base_url, client })
  }

  /// Build an endpoint URL from path segments; each segment is percent-encoded,
  /// so raw search text is safe to pass through.
  pub fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| anyhow!("server URL cannot be a base: {}", self.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  pub async fn request_json(&self, method: Method, url: Url) -> anyhow::Result<Value> {
    let response = self
      .client
      .request(method, url.clone())
      .send()
      .await
      .map_err(|e| anyhow!("request to {} failed: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("jukebox API {} failed: {}", status, body));
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
      return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
  }

  pub async fn get_typed<T: DeserializeOwned>(&self, segments: &[&str]) -> anyhow::Result<T> {
    let url = self.endpoint(segments)?;
    let value = self.request_json(Method::GET, url).await?;
    Ok(serde_json::from_value(value)?)
  }

  /// POST whose response body is not consumed (play control).
  pub async fn post_ignored(&self, segments: &[&str]) -> anyhow::Result<()> {
    let url = self.endpoint(segments)?;
    self.request_json(Method::POST, url).await.map(|_| ())
  }
}
