use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Res};

#[derive(Debug, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub sound: &'static str,
}

impl PushMessage {
    pub fn new(to: &str, title: &str, body: &str) -> Self {
        PushMessage {
            to: to.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data: None,
            sound: "default",
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Sends one message to the push endpoint.
pub async fn send(client: &reqwest::Client, push_api_url: &str, message: &PushMessage) -> Res<()> {
    let response = client
        .post(push_api_url)
        .header("Accept", "application/json")
        .json(message)
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(AppError::BadGateway(format!(
            "Push API returned error status: {}",
            response.status()
        )))
    }
}

/// Sends a notification without failing the caller.
/// Missing tokens are skipped and delivery errors are only logged.
pub async fn notify_best_effort(
    client: &reqwest::Client,
    push_api_url: &str,
    token: Option<&str>,
    message: impl FnOnce(&str) -> PushMessage,
) {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        log::debug!("Push notification skipped, recipient has no push token");
        return;
    };

    if let Err(e) = send(client, push_api_url, &message(token)).await {
        log::warn!("Failed to send push notification: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_without_empty_data() {
        let message = PushMessage::new("ExponentPushToken[abc]", "Nuevo pedido", "Pedido asignado");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"], "ExponentPushToken[abc]");
        assert_eq!(json["sound"], "default");
        assert!(json.get("data").is_none());

        let json = serde_json::to_value(message.with_data(serde_json::json!({ "order": 1 }))).unwrap();
        assert_eq!(json["data"]["order"], 1);
    }

    #[tokio::test]
    async fn missing_token_is_skipped() {
        let client = reqwest::Client::new();
        // An unreachable URL would fail loudly if a request was attempted.
        notify_best_effort(&client, "http://127.0.0.1:1/push", None, |to| {
            PushMessage::new(to, "t", "b")
        })
        .await;
    }
}
