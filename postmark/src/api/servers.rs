//! Server API implementation

use serde::{Deserialize, Deserializer, Serialize};
use tfplug::Context;

use super::client::Client;
use super::error::ApiError;

/// Colors Postmark accepts for a server
pub const SERVER_COLORS: [&str; 8] = [
    "purple",
    "blue",
    "turquoise",
    "green",
    "red",
    "yellow",
    "grey",
    "orange",
];

/// Request body for POST /servers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateServerRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Server as returned by the Postmark account API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Server {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub api_tokens: Vec<String>,
    #[serde(default)]
    pub server_link: Option<String>,
    #[serde(default)]
    pub smtp_api_activated: Option<bool>,
    #[serde(default)]
    pub raw_email_enabled: Option<bool>,
    #[serde(default)]
    pub delivery_hook_url: Option<String>,
    #[serde(default)]
    pub inbound_address: Option<String>,
    #[serde(default)]
    pub inbound_hook_url: Option<String>,
    #[serde(default)]
    pub bounce_hook_url: Option<String>,
    #[serde(default)]
    pub include_bounce_content_in_hook: Option<bool>,
    #[serde(default)]
    pub open_hook_url: Option<String>,
    #[serde(default)]
    pub post_first_open_only: Option<bool>,
    #[serde(default)]
    pub track_opens: Option<bool>,
    #[serde(default)]
    pub track_links: Option<String>,
    #[serde(default)]
    pub click_hook_url: Option<String>,
    #[serde(default)]
    pub inbound_domain: Option<String>,
    #[serde(default)]
    pub inbound_hash: Option<String>,
    #[serde(default)]
    pub inbound_spam_threshold: Option<i64>,
}

/// Postmark sends `null` rather than `[]` for servers without tokens
fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Servers API for server operations
pub struct ServersApi<'a> {
    client: &'a Client,
}

impl<'a> ServersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// POST /servers
    pub async fn create(
        &self,
        ctx: &Context,
        request: &CreateServerRequest,
    ) -> Result<Server, ApiError> {
        let server: Server = self.client.post(ctx, "/servers", request).await?;
        tracing::debug!("Postmark assigned server ID {}", server.id);
        Ok(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server as MockServer};
    use serde_json::json;

    #[test]
    fn create_request_omits_unset_color() {
        let request = CreateServerRequest {
            name: "staging".to_string(),
            color: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"Name": "staging"})
        );

        let request = CreateServerRequest {
            name: "staging".to_string(),
            color: Some("red".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"Name": "staging", "Color": "red"})
        );
    }

    #[test]
    fn server_decodes_full_postmark_response() {
        let body = json!({
            "ID": 1,
            "Name": "Staging Testing",
            "ApiTokens": ["server token"],
            "Color": "red",
            "SmtpApiActivated": true,
            "RawEmailEnabled": false,
            "DeliveryHookUrl": "http://hooks.example.com/delivery",
            "ServerLink": "https://postmarkapp.com/servers/1/streams",
            "InboundAddress": "yourhash@inbound.postmarkapp.com",
            "InboundHookUrl": "http://hooks.example.com/inbound",
            "BounceHookUrl": "http://hooks.example.com/bounce",
            "IncludeBounceContentInHook": true,
            "OpenHookUrl": "http://hooks.example.com/open",
            "PostFirstOpenOnly": false,
            "TrackOpens": false,
            "TrackLinks": "None",
            "ClickHookUrl": "http://hooks.example.com/click",
            "InboundDomain": "",
            "InboundHash": "yourhash",
            "InboundSpamThreshold": 0
        });

        let server: Server = serde_json::from_value(body).unwrap();
        assert_eq!(server.id, 1);
        assert_eq!(server.name.as_deref(), Some("Staging Testing"));
        assert_eq!(server.color.as_deref(), Some("red"));
        assert_eq!(server.api_tokens, vec!["server token"]);
        assert_eq!(server.smtp_api_activated, Some(true));
        assert_eq!(server.track_links.as_deref(), Some("None"));
        assert_eq!(server.inbound_spam_threshold, Some(0));
    }

    #[test]
    fn server_tolerates_missing_or_null_tokens() {
        let server: Server = serde_json::from_str(r#"{"ID": 7, "Name": "a"}"#).unwrap();
        assert!(server.api_tokens.is_empty());
        assert!(server.color.is_none());

        let server: Server =
            serde_json::from_str(r#"{"ID": 7, "Name": "a", "ApiTokens": null}"#).unwrap();
        assert!(server.api_tokens.is_empty());
    }

    #[test]
    fn server_requires_id() {
        let result = serde_json::from_str::<Server>(r#"{"Name": "a", "ApiTokens": []}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_posts_name_and_color() {
        let mut server = MockServer::new_async().await;
        let mock = server
            .mock("POST", "/servers")
            .match_body(Matcher::Json(json!({"Name": "foo", "Color": "blue"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ID": 12345, "Name": "foo", "Color": "blue", "ApiTokens": ["tok1", "tok2"]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "account-token").unwrap();
        let created = client
            .servers()
            .create(
                &Context::new(),
                &CreateServerRequest {
                    name: "foo".to_string(),
                    color: Some("blue".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.id, 12345);
        assert_eq!(created.api_tokens, vec!["tok1", "tok2"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_surfaces_postmark_error_code() {
        let mut server = MockServer::new_async().await;
        let _mock = server
            .mock("POST", "/servers")
            .with_status(422)
            .with_body(r#"{"ErrorCode": 603, "Message": "This server name already exists."}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "account-token").unwrap();
        let result = client
            .servers()
            .create(
                &Context::new(),
                &CreateServerRequest {
                    name: "dup".to_string(),
                    color: None,
                },
            )
            .await;

        match result {
            Err(ApiError::ApiError {
                status, error_code, ..
            }) => {
                assert_eq!(status, 422);
                assert_eq!(error_code, 603);
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }
}
