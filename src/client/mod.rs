use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use urlencoding::encode;

mod retry;
pub use retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.cristin.no/v2";

/// Cristin paginates list endpoints; 100 is the documented maximum page size.
pub const PAGE_SIZE: u32 = 100;

pub struct CristinClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CristinClient {
    pub fn new(base_url: &str, retry: RetryPolicy, timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// GET a JSON document, retrying transient statuses per the policy.
    /// Any other non-success status is a hard failure for this call only.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        self.get_json_with_query(url, &[]).await
    }

    async fn get_json_with_query(&self, url: &str, query: &[(String, String)]) -> Result<Value> {
        let mut attempt = 1;
        loop {
            if query.is_empty() {
                debug!("GET {}", url);
            } else {
                debug!("GET {} | params={:?}", url, query);
            }

            let response = self.http.get(url).query(query).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.json().await?);
            }

            if (self.retry.retryable)(status) && attempt < self.retry.max_attempts {
                warn!(
                    "HTTP {} from {}, retrying in {:?} (attempt {} of {})",
                    status, url, self.retry.delay, attempt, self.retry.max_attempts
                );
                tokio::time::sleep(self.retry.delay).await;
                attempt += 1;
                continue;
            }

            return Err(anyhow!("GET {} failed with HTTP {}", url, status));
        }
    }

    /// Display name for a person, via `/persons/{institution}/{id}`.
    pub async fn person_name(&self, institution: &str, person_id: &str) -> Result<String> {
        let url = format!(
            "{}/persons/{}/{}",
            self.base_url,
            encode(institution),
            encode(person_id)
        );
        let data = self.get_json(&url).await?;
        Ok(data
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or(crate::UNKNOWN_NAME)
            .to_string())
    }

    /// Paged results for one organizational unit, newest year first.
    pub fn unit_results(&self, unit_id: &str) -> ResultPages<'_> {
        let url = format!("{}/units/{}/results", self.base_url, encode(unit_id));
        ResultPages::new(
            self,
            url,
            vec![
                ("sort".to_string(), "year_published".to_string()),
                ("order".to_string(), "desc".to_string()),
            ],
        )
    }

    /// Paged results a person contributed to, bounded to a year range
    /// server-side (the caller still applies the inclusive filter itself).
    pub fn person_results(
        &self,
        institution: &str,
        person_id: &str,
        from_year: i32,
        to_year: i32,
    ) -> ResultPages<'_> {
        let url = format!("{}/results", self.base_url);
        ResultPages::new(
            self,
            url,
            vec![
                (
                    "contributor".to_string(),
                    format!("{}/{}", institution, person_id),
                ),
                ("from_year".to_string(), from_year.to_string()),
                ("to_year".to_string(), to_year.to_string()),
            ],
        )
    }

    /// Full record for one result, richer than the list representation.
    pub async fn result_details(&self, result_id: &str) -> Result<Value> {
        let url = format!("{}/results/{}", self.base_url, encode(result_id));
        self.get_json(&url).await
    }

    /// Complete contributor list for one result.
    pub async fn result_contributors(&self, result_id: &str) -> Result<Vec<Value>> {
        let url = format!("{}/results/{}/contributors", self.base_url, encode(result_id));
        match self.get_json(&url).await? {
            Value::Array(contributors) => Ok(contributors),
            _ => Ok(Vec::new()),
        }
    }

    /// Detail record for one organizational unit.
    pub async fn unit(&self, unit_id: &str) -> Result<Value> {
        let url = format!("{}/units/{}", self.base_url, encode(unit_id));
        self.get_json(&url).await
    }
}

/// Lazy page cursor over a Cristin list endpoint. One request per
/// `next_page` call; the sequence ends at the first empty page. Restart by
/// constructing a fresh cursor.
pub struct ResultPages<'a> {
    client: &'a CristinClient,
    url: String,
    query: Vec<(String, String)>,
    page: u32,
    done: bool,
}

impl<'a> ResultPages<'a> {
    fn new(client: &'a CristinClient, url: String, query: Vec<(String, String)>) -> Self {
        Self {
            client,
            url,
            query,
            page: 1,
            done: false,
        }
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        if self.done {
            return Ok(None);
        }

        let mut query = self.query.clone();
        query.push(("page".to_string(), self.page.to_string()));
        query.push(("per_page".to_string(), PAGE_SIZE.to_string()));

        let body = self.client.get_json_with_query(&self.url, &query).await?;
        let records = match body {
            Value::Array(records) => records,
            _ => Vec::new(),
        };

        if records.is_empty() {
            self.done = true;
            return Ok(None);
        }

        self.page += 1;
        Ok(Some(records))
    }
}
