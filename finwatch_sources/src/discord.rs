//! Direct-message delivery through the Discord REST API.

use crate::error::DeliveryError;
use async_trait::async_trait;
use finwatch_traits::{BoxError, Message, Notifier};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::OnceCell;

pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    token: String,
    recipient_id: u64,
    channel: OnceCell<String>,
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordNotifier")
            .field("api_base", &self.api_base)
            .field("recipient_id", &self.recipient_id)
            .field("channel", &self.channel.get())
            .finish_non_exhaustive()
    }
}

impl DiscordNotifier {
    pub fn new(client: Client, api_base: &str, token: String, recipient_id: u64) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            recipient_id,
            channel: OnceCell::new(),
        }
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn post(&self, endpoint: &'static str, path: &str, body: &Value) -> Result<Value, DeliveryError> {
        let resp = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Value>().await.unwrap_or(Value::Null))
    }

    /// DM channel id for the recipient; opened once and reused.
    async fn channel(&self) -> Result<&String, DeliveryError> {
        self.channel
            .get_or_try_init(|| async {
                let v = self
                    .post(
                        "open dm",
                        "/users/@me/channels",
                        &json!({ "recipient_id": self.recipient_id.to_string() }),
                    )
                    .await?;
                let id = v
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(DeliveryError::MissingChannel)?
                    .to_string();
                tracing::debug!(channel = %id, "dm channel opened");
                Ok(id)
            })
            .await
    }
}

/// Embed body for one message.
pub fn embed(message: &Message) -> Value {
    let fields: Vec<Value> = message
        .fields
        .iter()
        .map(|f| json!({ "name": f.name, "value": f.value, "inline": f.inline }))
        .collect();
    json!({
        "embeds": [{
            "title": message.title,
            "description": message.description,
            "color": message.color,
            "fields": fields,
            "timestamp": message.timestamp.to_rfc3339(),
        }]
    })
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        let channel = self.channel().await?;
        self.post("create message", &format!("/channels/{channel}/messages"), &embed(message))
            .await?;
        Ok(())
    }
}
