use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::json;
use url::Url;

use super::{ReviewModerator, ReviewSource, ReviewSubmitter};
use crate::config::BackendConfig;
use crate::review::{validate_new_review, NewReview, ReviewFilter, ReviewRecord};
use crate::{Error, Result};

const TABLE_PATH: &str = "rest/v1/reviews";

/// Backend over a hosted PostgREST `reviews` table
pub struct RestBackend {
    client: Client,
    base_url: Url,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let raw = config
            .rest_url
            .as_deref()
            .ok_or_else(|| Error::Config("backend.rest_url is not set".into()))?;

        // Url::join drops the last path segment unless it ends with a slash
        let base_url = if raw.ends_with('/') {
            Url::parse(raw)?
        } else {
            Url::parse(&format!("{}/", raw))?
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .default_headers(Self::build_headers(config.api_key.as_deref())?)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_headers(api_key: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = api_key {
            let apikey = HeaderValue::from_str(key)
                .map_err(|e| Error::Config(format!("Invalid API key: {}", e)))?;
            let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| Error::Config(format!("Invalid API key: {}", e)))?;
            headers.insert("apikey", apikey);
            headers.insert(AUTHORIZATION, bearer);
        }

        Ok(headers)
    }

    /// Build the table URL with PostgREST query parameters
    fn table_url(&self, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(TABLE_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn approved_page_url(&self, offset: u32, limit: u32) -> Result<Url> {
        self.table_url(&[
            ("select", "*".to_string()),
            ("is_approved", "eq.true".to_string()),
            ("order", "created_at.desc".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ])
    }

    fn by_id_url(&self, id: i64) -> Result<Url> {
        self.table_url(&[("id", format!("eq.{}", id))])
    }

    /// Decode a JSON array of rows one row at a time
    async fn decode_rows(response: Response) -> Result<Vec<ReviewRecord>> {
        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(rows.into_iter().map(ReviewRecord::from_json).collect())
    }

    /// Turn a non-2xx response into a backend error carrying the body text
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ReviewSource for RestBackend {
    async fn list_approved_reviews(&self, offset: u32, limit: u32) -> Result<Vec<ReviewRecord>> {
        let url = self.approved_page_url(offset, limit)?;
        tracing::debug!(%url, "Fetching review page");

        let response = Self::check(self.client.get(url).send().await?).await?;
        Self::decode_rows(response).await
    }
}

#[async_trait]
impl ReviewSubmitter for RestBackend {
    async fn submit_review(&self, review: &NewReview) -> Result<()> {
        let review = validate_new_review(review)?;
        let body = json!([{
            "client_name": review.name,
            "rating": review.rating,
            "comment": review.comment,
            "is_approved": false,
        }]);

        let response = self
            .client
            .post(self.table_url(&[])?)
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;

        tracing::info!("Review submitted for moderation");
        Ok(())
    }
}

#[async_trait]
impl ReviewModerator for RestBackend {
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<ReviewRecord>> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        match filter {
            ReviewFilter::All => {}
            ReviewFilter::Approved => params.push(("is_approved", "eq.true".to_string())),
            ReviewFilter::Pending => params.push(("is_approved", "eq.false".to_string())),
        }

        let response = Self::check(self.client.get(self.table_url(&params)?).send().await?).await?;
        Self::decode_rows(response).await
    }

    async fn approve_review(&self, id: i64) -> Result<bool> {
        let response = self
            .client
            .patch(self.by_id_url(id)?)
            .header("Prefer", "return=representation")
            .json(&json!({ "is_approved": true }))
            .send()
            .await?;

        let updated = Self::decode_rows(Self::check(response).await?).await?;
        Ok(!updated.is_empty())
    }

    async fn delete_review(&self, id: i64) -> Result<bool> {
        let response = self
            .client
            .delete(self.by_id_url(id)?)
            .header("Prefer", "return=representation")
            .send()
            .await?;

        let deleted = Self::decode_rows(Self::check(response).await?).await?;
        Ok(!deleted.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str) -> RestBackend {
        RestBackend::new(&BackendConfig {
            rest_url: Some(url.to_string()),
            api_key: Some("anon-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_page_url_uses_offset_and_limit() {
        let url = backend("https://demo.supabase.co")
            .approved_page_url(12, 6)
            .unwrap();

        assert_eq!(url.path(), "/rest/v1/reviews");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("is_approved".into(), "eq.true".into())));
        assert!(query.contains(&("order".into(), "created_at.desc".into())));
        assert!(query.contains(&("offset".into(), "12".into())));
        assert!(query.contains(&("limit".into(), "6".into())));
    }

    #[test]
    fn test_base_path_is_preserved() {
        let url = backend("https://example.com/project").by_id_url(9).unwrap();
        assert_eq!(url.path(), "/project/rest/v1/reviews");
        assert_eq!(url.query(), Some("id=eq.9"));
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let result = RestBackend::new(&BackendConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
