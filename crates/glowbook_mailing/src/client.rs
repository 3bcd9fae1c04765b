// --- File: crates/glowbook_mailing/src/client.rs ---
//! Klaviyo JSON:API client: profile import plus list subscription.

use glowbook_common::{ContactDetails, HTTP_CLIENT};
use glowbook_config::AppConfig;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::error::MailingError;

const JSON_API: &str = "application/vnd.api+json";

#[derive(Clone, Debug)]
pub struct KlaviyoClient {
    http: Client,
    base_url: String,
    api_key: String,
    list_id: String,
    revision: String,
}

/// Splits a full name into first name and the remainder.
pub fn split_name(name: &str) -> (String, Option<String>) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, (!rest.is_empty()).then_some(rest))
}

fn error_message(body_text: &str) -> String {
    serde_json::from_str::<Value>(body_text)
        .ok()
        .and_then(|v| {
            v.get("errors")?
                .as_array()?
                .first()?
                .get("detail")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.to_string())
}

impl KlaviyoClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        list_id: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            list_id: list_id.into(),
            revision: revision.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, MailingError> {
        let mailing = config.mailing.as_ref().ok_or(MailingError::ConfigError)?;
        if mailing.api_key.is_empty() || mailing.list_id.is_empty() {
            return Err(MailingError::ConfigError);
        }
        Ok(Self::new(
            &mailing.api_base,
            &mailing.api_key,
            &mailing.list_id,
            &mailing.revision,
        ))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MailingError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("[Klaviyo] POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Klaviyo-API-Key {}", self.api_key))
            .header("revision", &self.revision)
            .header("accept", JSON_API)
            .header("content-type", JSON_API)
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body_text);
            error!("[Klaviyo] POST {} failed: {} - {}", url, status, message);
            return Err(MailingError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }
        // Subscription jobs answer 202 with an empty body
        Ok(serde_json::from_str(&body_text).unwrap_or(Value::Null))
    }

    /// Creates or updates the profile. Returns the Klaviyo profile id.
    pub async fn import_profile(
        &self,
        contact: &ContactDetails,
        source: Option<&str>,
    ) -> Result<Option<String>, MailingError> {
        let (first_name, last_name) = split_name(&contact.name);
        let mut attributes = json!({
            "email": contact.email,
            "first_name": first_name,
        });
        if let Some(last_name) = last_name {
            attributes["last_name"] = json!(last_name);
        }
        // Klaviyo only accepts E.164 numbers
        if let Some(phone) = contact.phone.as_deref().filter(|p| p.starts_with('+')) {
            attributes["phone_number"] = json!(phone);
        }
        if let Some(source) = source {
            attributes["properties"] = json!({ "source": source });
        }

        let body = json!({ "data": { "type": "profile", "attributes": attributes } });
        let response = self.post("profile-import/", &body).await?;
        let id = response
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        info!("[Klaviyo] Imported profile {:?}", id);
        Ok(id)
    }

    /// Subscribes the email to marketing on the configured list.
    pub async fn subscribe_to_list(
        &self,
        email: &str,
        source: Option<&str>,
    ) -> Result<(), MailingError> {
        let mut attributes = json!({
            "profiles": {
                "data": [{
                    "type": "profile",
                    "attributes": {
                        "email": email,
                        "subscriptions": {
                            "email": { "marketing": { "consent": "SUBSCRIBED" } }
                        }
                    }
                }]
            }
        });
        if let Some(source) = source {
            attributes["custom_source"] = json!(source);
        }
        let body = json!({
            "data": {
                "type": "profile-subscription-bulk-create-job",
                "attributes": attributes,
                "relationships": {
                    "list": { "data": { "type": "list", "id": self.list_id } }
                }
            }
        });
        self.post("profile-subscription-bulk-create-jobs/", &body)
            .await?;
        info!("[Klaviyo] Subscription job queued for list {}", self.list_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_split_on_first_space() {
        assert_eq!(split_name("Dana"), ("Dana".to_string(), None));
        assert_eq!(
            split_name("  Dana  Maria Reyes "),
            ("Dana".to_string(), Some("Maria Reyes".to_string()))
        );
    }

    #[test]
    fn error_detail_is_extracted() {
        let body = r#"{"errors":[{"status":400,"detail":"Invalid email address"}]}"#;
        assert_eq!(error_message(body), "Invalid email address");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }
}
