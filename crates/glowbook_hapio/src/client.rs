// --- File: crates/glowbook_hapio/src/client.rs ---
use glowbook_common::HTTP_CLIENT;
use glowbook_config::AppConfig;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::HapioError;
use crate::models::{HapioService, Page, RecurringScheduleBlock, ScheduleBlock};

const PAGE_SIZE: u32 = 100;

/// Thin client over the Hapio REST API.
#[derive(Clone, Debug)]
pub struct HapioClient {
    http: Client,
    base_url: String,
    api_token: String,
}

impl HapioClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    /// Builds a client from the `hapio` section; fails when it is missing.
    pub fn from_config(config: &AppConfig) -> Result<Self, HapioError> {
        let hapio = config.hapio.as_ref().ok_or(HapioError::ConfigError)?;
        if hapio.api_token.is_empty() {
            return Err(HapioError::ConfigError);
        }
        Ok(Self::new(&hapio.api_base, &hapio.api_token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends a request and returns the JSON body, or `Value::Null` for empty
    /// responses such as `204 No Content` on delete.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HapioError> {
        let url = self.url(path);
        debug!("[Hapio] {} {}", method, url);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body_text);
            error!(
                "[Hapio] {} {} failed: {} - {}",
                method, url, status, message
            );
            return Err(HapioError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT || body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body_text)?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, HapioError> {
        let value = self.request(Method::GET, path, query, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Follows Hapio pagination until the last page.
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, HapioError> {
        let mut items = Vec::new();
        let mut page_number = 1u32;
        loop {
            let query = vec![
                ("page".to_string(), page_number.to_string()),
                ("per_page".to_string(), PAGE_SIZE.to_string()),
            ];
            let page: Page<T> = self.get_json(path, &query).await?;
            let more = page.has_more();
            items.extend(page.data);
            if !more {
                break;
            }
            page_number += 1;
        }
        Ok(items)
    }

    pub async fn list_services(&self) -> Result<Vec<HapioService>, HapioError> {
        let services: Vec<HapioService> = self.list_all("services").await?;
        info!("[Hapio] Loaded {} services", services.len());
        Ok(services)
    }

    pub async fn list_recurring_schedule_blocks(
        &self,
        resource_id: &str,
        recurring_schedule_id: &str,
    ) -> Result<Vec<RecurringScheduleBlock>, HapioError> {
        self.list_all(&format!(
            "resources/{}/recurring-schedules/{}/schedule-blocks",
            resource_id, recurring_schedule_id
        ))
        .await
    }

    pub async fn list_schedule_blocks(
        &self,
        resource_id: &str,
    ) -> Result<Vec<ScheduleBlock>, HapioError> {
        self.list_all(&format!("resources/{}/schedule-blocks", resource_id))
            .await
    }
}

/// Hapio reports errors as `{"message": "...", "errors": {...}}`.
fn error_message(body_text: &str) -> String {
    match serde_json::from_str::<Value>(body_text) {
        Ok(json) => json
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body_text.to_string()),
        Err(_) => body_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"The given data was invalid.","errors":{}}"#),
            "The given data was invalid."
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = HapioClient::new("https://hapio.test/v1/", "t");
        assert_eq!(client.url("/services"), "https://hapio.test/v1/services");
    }
}
