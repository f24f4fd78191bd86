use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use url::Url;

use crate::api::wire::{reserialize, ApiErrorBody, ApiRowsResponse, ApiToggleResponse};
use crate::cache::Resource;
use crate::config::Config;
use crate::error::ApiError;
use crate::feed::{FeedItem, PageRequest};

/// Thin client over the Agora row-store API.
///
/// Carries no caching and no optimistic state; the cached client and the
/// engagement controller layer those on top.
#[derive(Clone)]
pub struct PlatformClient {
  http: reqwest::Client,
  base: Url,
  user_id: String,
}

impl PlatformClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
      .map_err(|e| eyre!("API token is not a valid header value: {}", e))?;
    auth.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    let base = Url::parse(&config.platform.url)
      .map_err(|e| eyre!("Invalid platform url {}: {}", config.platform.url, e))?;

    Ok(Self {
      http,
      base,
      user_id: config.platform.user_id.clone(),
    })
  }

  /// Fetch one page of raw rows, sorted and bounded server-side.
  pub async fn fetch_rows(&self, request: &PageRequest) -> Result<Vec<serde_json::Value>, ApiError> {
    let mut url = self.base.join(&format!("v1/{}", request.resource.as_str()))?;
    {
      let mut query = url.query_pairs_mut();
      query
        .append_pair("order", request.sort_field.as_str())
        .append_pair("direction", request.direction.as_str())
        .append_pair("limit", &request.limit.to_string());
      if let Some(after) = &request.after {
        query.append_pair("after", after.as_str());
      }
    }

    let response = self.http.get(url).send().await?;
    let response = check(response, request.resource.as_str()).await?;
    let body: ApiRowsResponse = response.json().await?;
    Ok(body.rows)
  }

  /// Fetch one page of rows lifted into a typed view model.
  pub async fn fetch_page<T: FeedItem>(&self, request: &PageRequest) -> Result<Vec<T>, ApiError> {
    let rows = self.fetch_rows(request).await?;
    rows
      .into_iter()
      .map(|row| reserialize(row).map_err(ApiError::from))
      .collect()
  }

  /// Toggle the viewer's like on an entity. Idempotent by intent: the backend
  /// flips the (user, entity) pair and returns the resulting state, so two
  /// racing calls converge instead of double-counting.
  pub async fn toggle_like(&self, entity_id: &str) -> Result<bool, ApiError> {
    let url = self.base.join("v1/likes/toggle")?;
    let payload = serde_json::json!({
      "entity_id": entity_id,
      "user_id": self.user_id,
    });

    let response = self.http.post(url).json(&payload).send().await?;
    let response = check(response, "likes").await?;
    let body: ApiToggleResponse = response.json().await?;
    Ok(body.liked)
  }

  /// Create a row. The caller (cached client) owns invalidation.
  pub async fn create_row(
    &self,
    resource: Resource,
    body: &serde_json::Value,
  ) -> Result<serde_json::Value, ApiError> {
    let url = self.base.join(&format!("v1/{}", resource.as_str()))?;
    let response = self.http.post(url).json(body).send().await?;
    let response = check(response, resource.as_str()).await?;
    Ok(response.json().await?)
  }

  /// Update a row by id.
  pub async fn update_row(
    &self,
    resource: Resource,
    id: &str,
    body: &serde_json::Value,
  ) -> Result<serde_json::Value, ApiError> {
    let url = self.base.join(&format!("v1/{}/{}", resource.as_str(), id))?;
    let response = self.http.patch(url).json(body).send().await?;
    let response = check(response, resource.as_str()).await?;
    Ok(response.json().await?)
  }

  /// Delete a row by id.
  pub async fn delete_row(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
    let url = self.base.join(&format!("v1/{}/{}", resource.as_str(), id))?;
    let response = self.http.delete(url).send().await?;
    check(response, resource.as_str()).await?;
    Ok(())
  }
}

/// Map a non-2xx response to the error taxonomy. The one case callers branch
/// on is a vanished pagination cursor; everything else is generic.
async fn check(response: reqwest::Response, resource: &str) -> Result<reqwest::Response, ApiError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body: ApiErrorBody = response.json().await.unwrap_or_default();
  if body.code == "cursor_not_found" {
    return Err(ApiError::CursorGone {
      resource: resource.to_string(),
    });
  }

  Err(ApiError::Status {
    status: status.as_u16(),
    message: if body.message.is_empty() {
      status.to_string()
    } else {
      body.message
    },
  })
}
