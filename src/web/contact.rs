//! Contact form relay to Web3Forms

use axum::{extract::State, Json};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::ApiClient;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::operations::validate;
use crate::web::extract::JsonBody;
use crate::web::server::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Submission<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    from_name: &'static str,
}

/// Web3Forms client; `None` key means the form is disabled
#[derive(Debug, Clone)]
pub struct ContactRelay {
    client: ApiClient,
    access_key: Option<String>,
}

impl ContactRelay {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&config.contact.endpoint, config.request_timeout())?,
            access_key: config.contact.access_key.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.access_key.is_some()
    }

    pub async fn submit(&self, message: &ContactMessage) -> Result<Value> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or(Error::ContactNotConfigured)?;

        let submission = Submission {
            access_key,
            name: validate::required("name", Some(message.name.as_str()))?,
            email: validate::required("email", Some(message.email.as_str()))?,
            subject: validate::required("subject", Some(message.subject.as_str()))?,
            message: validate::required("message", Some(message.message.as_str()))?,
            from_name: "Secure Chain",
        };
        if !submission.email.contains('@') {
            return Err(Error::invalid("email", "is not an email address"));
        }

        let reply = self
            .client
            .send_json(Method::POST, "", &submission, None)
            .await?
            .into_result()?;
        info!("Contact message relayed");
        Ok(reply)
    }
}

pub async fn api_contact(
    State(state): State<AppState>,
    JsonBody(message): JsonBody<ContactMessage>,
) -> Result<Json<Value>> {
    let reply = state.contact.submit(&message).await?;
    let success = reply.get("success").and_then(Value::as_bool).unwrap_or(true);
    Ok(Json(json!({ "success": success })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Hi there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_relay() {
        let relay = ContactRelay::from_config(&Config::default()).unwrap();
        assert!(!relay.is_configured());
        let err = relay.submit(&message()).await.unwrap_err();
        assert_eq!(err.code(), "contact_not_configured");
    }

    #[tokio::test]
    async fn test_rejects_bad_email_before_sending() {
        let mut config = Config::default();
        config.contact.access_key = Some("key".to_string());
        config.contact.endpoint = "http://127.0.0.1:9".to_string();
        let relay = ContactRelay::from_config(&config).unwrap();

        let mut bad = message();
        bad.email = "not-an-address".to_string();
        assert_eq!(relay.submit(&bad).await.unwrap_err().code(), "invalid_parameter");
    }
}
