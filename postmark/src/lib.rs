//! Terraform provider for the Postmark account API

pub mod api;
pub mod provider_data;
pub mod resources;

pub use provider_data::PostmarkProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::Provider;

pub const ACCOUNT_TOKEN_ENV: &str = "POSTMARK_ACCOUNT_TOKEN";
pub const ENDPOINT_ENV: &str = "POSTMARK_ENDPOINT";
pub const TIMEOUT_ENV: &str = "POSTMARK_TIMEOUT_SECONDS";

#[derive(Default)]
pub struct PostmarkProvider {
    provider_data: Option<PostmarkProviderData>,
}

impl PostmarkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.provider_data.is_some()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages Postmark account resources")
            .attribute(
                AttributeBuilder::new("account_token", AttributeType::String)
                    .description("Postmark account API token. Can also be set with POSTMARK_ACCOUNT_TOKEN")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Postmark API endpoint. Can also be set with POSTMARK_ENDPOINT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("timeout_seconds", AttributeType::Number)
                    .description("HTTP request timeout. Can also be set with POSTMARK_TIMEOUT_SECONDS")
                    .optional()
                    .build(),
            )
            .build()
    }
}

/// Provider block value, falling back to the environment. Empty strings count as unset.
fn string_setting(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    config
        .get_optional_string(&AttributePath::new(name))
        .ok()
        .flatten()
        .or_else(|| std::env::var(env).ok())
        .filter(|value| !value.trim().is_empty())
}

fn timeout_setting(config: &DynamicValue) -> Result<u64, Diagnostic> {
    let invalid = |got: String| {
        Diagnostic::error(
            "timeout_seconds must be a positive whole number of seconds",
            format!("Got {}", got),
        )
        .with_attribute(AttributePath::new("timeout_seconds"))
    };

    if let Ok(seconds) = config.get_number(&AttributePath::new("timeout_seconds")) {
        if seconds < 1.0 || seconds.fract() != 0.0 {
            return Err(invalid(seconds.to_string()));
        }
        return Ok(seconds as u64);
    }

    match std::env::var(TIMEOUT_ENV) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(seconds) if seconds > 0 => Ok(seconds),
            _ => Err(invalid(format!("'{}' from {}", raw, TIMEOUT_ENV))),
        },
        Err(_) => Ok(api::ClientConfig::default().timeout_seconds),
    }
}

#[async_trait]
impl Provider for PostmarkProvider {
    type Data = PostmarkProviderData;

    fn type_name(&self) -> &str {
        "postmark"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<PostmarkProviderData> {
        let mut diagnostics = Self::schema_static().validate_config(&request.config);
        if tfplug::has_errors(&diagnostics) {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let account_token = string_setting(&request.config, "account_token", ACCOUNT_TOKEN_ENV);
        let endpoint = string_setting(&request.config, "endpoint", ENDPOINT_ENV)
            .unwrap_or_else(|| api::DEFAULT_ENDPOINT.to_string());

        let timeout_seconds = match timeout_setting(&request.config) {
            Ok(seconds) => seconds,
            Err(diag) => {
                diagnostics.push(diag);
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        let Some(account_token) = account_token else {
            diagnostics.push(Diagnostic::error(
                "account_token is required (set in provider config or POSTMARK_ACCOUNT_TOKEN env var)",
                "The Postmark account API token authenticates every request",
            ));
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        };

        let config = api::ClientConfig {
            endpoint,
            timeout_seconds,
        };

        match api::Client::with_config(&account_token, config) {
            Ok(client) => {
                tracing::debug!("Configured Postmark client for {}", client.endpoint());
                let provider_data = PostmarkProviderData::new(client);
                self.provider_data = Some(provider_data.clone());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(provider_data),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory<PostmarkProviderData>> {
        let mut factories: HashMap<String, ResourceFactory<PostmarkProviderData>> =
            HashMap::new();
        factories.insert(
            resources::resource_server::SERVER_TYPE_NAME.to_string(),
            resources::server_resource,
        );
        factories
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::types::{ClientCapabilities, Dynamic};

    fn clear_env() {
        std::env::remove_var(ACCOUNT_TOKEN_ENV);
        std::env::remove_var(ENDPOINT_ENV);
        std::env::remove_var(TIMEOUT_ENV);
    }

    fn configure_request(values: &[(&str, Dynamic)]) -> ConfigureProviderRequest {
        let values = values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        ConfigureProviderRequest {
            terraform_version: "1.0.0".to_string(),
            config: DynamicValue::new(Dynamic::Map(values)),
            client_capabilities: ClientCapabilities::default(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        clear_env();
        std::env::set_var(ACCOUNT_TOKEN_ENV, "account-secret");
        std::env::set_var(ENDPOINT_ENV, "http://localhost:8080");
        std::env::set_var(TIMEOUT_ENV, "5");

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(&[]))
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(provider.is_configured());
        let data = response.provider_data.unwrap();
        assert_eq!(data.client.endpoint().as_str(), "http://localhost:8080/");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_takes_precedence_over_env() {
        clear_env();
        std::env::set_var(ENDPOINT_ENV, "http://from-env:1");

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[
                    ("account_token", Dynamic::from("account-secret")),
                    ("endpoint", Dynamic::from("http://from-config:2")),
                ]),
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let data = response.provider_data.unwrap();
        assert_eq!(data.client.endpoint().as_str(), "http://from-config:2/");

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_defaults_to_postmark_endpoint() {
        clear_env();

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[("account_token", Dynamic::from("account-secret"))]),
            )
            .await;

        let data = response.provider_data.unwrap();
        assert_eq!(
            data.client.endpoint().as_str(),
            "https://api.postmarkapp.com/"
        );
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_account_token() {
        clear_env();

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(&[]))
            .await;

        assert!(response.provider_data.is_none());
        assert!(!provider.is_configured());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .contains("account_token is required"));
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_rejects_invalid_endpoint() {
        clear_env();

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[
                    ("account_token", Dynamic::from("account-secret")),
                    ("endpoint", Dynamic::from("not a url")),
                ]),
            )
            .await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics[0].summary, "Failed to create API client");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_rejects_non_positive_timeout() {
        clear_env();

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[
                    ("account_token", Dynamic::from("account-secret")),
                    ("timeout_seconds", Dynamic::Number(0.0)),
                ]),
            )
            .await;
        assert!(response.provider_data.is_none());
        assert!(response.diagnostics[0].summary.contains("timeout_seconds"));

        std::env::set_var(TIMEOUT_ENV, "-3");
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[("account_token", Dynamic::from("account-secret"))]),
            )
            .await;
        assert!(response.provider_data.is_none());
        assert!(response.diagnostics[0].detail.contains(TIMEOUT_ENV));

        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_rejects_unknown_attributes() {
        clear_env();

        let mut provider = PostmarkProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(&[
                    ("account_token", Dynamic::from("account-secret")),
                    ("insecure", Dynamic::Bool(true)),
                ]),
            )
            .await;

        assert!(response.provider_data.is_none());
        assert_eq!(response.diagnostics[0].summary, "Unknown field: insecure");
    }

    #[tokio::test]
    async fn provider_schema_marks_token_sensitive() {
        let provider = PostmarkProvider::new();
        let response = provider
            .schema(Context::new(), ProviderSchemaRequest {})
            .await;

        let token = response.schema.attribute("account_token").unwrap();
        assert!(token.sensitive);
        assert!(token.optional);
    }

    #[test]
    fn provider_exposes_server_resource() {
        let provider = PostmarkProvider::new();
        let resources = provider.resources();

        assert_eq!(resources.len(), 1);
        let factory = resources.get("postmark_server").unwrap();
        assert_eq!(factory().type_name(), "postmark_server");
    }
}
