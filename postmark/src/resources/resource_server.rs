//! Postmark server resource implementation

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{ListLengthValidator, OneOfValidator, StringLengthValidator};

use crate::api::servers::{CreateServerRequest, Server, SERVER_COLORS};
use crate::PostmarkProviderData;

pub const SERVER_TYPE_NAME: &str = "postmark_server";

#[derive(Default)]
pub struct ServerResource {
    provider_data: Option<PostmarkProviderData>,
}

impl ServerResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a server on a Postmark account")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Postmark server ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Server name")
                    .required()
                    .validator(StringLengthValidator {
                        min: Some(1),
                        max: None,
                    })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("color", AttributeType::String)
                    .description("Color shown for the server in the Postmark UI")
                    .optional()
                    .computed()
                    .validator(OneOfValidator::new(SERVER_COLORS).ignore_case())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("apitokens", AttributeType::List(Box::new(AttributeType::String)))
                    .description("Server API tokens issued by Postmark")
                    .optional()
                    .computed()
                    .sensitive()
                    .validator(ListLengthValidator {
                        min: Some(1),
                        max: None,
                    })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_updated", AttributeType::String)
                    .description("Time the server was last written by Terraform (RFC 3339)")
                    .computed()
                    .build(),
            )
            .build()
    }

    /// Extract the create payload from terraform configuration
    fn extract_server_config(&self, config: &DynamicValue) -> Result<CreateServerRequest, Diagnostic> {
        let name = config.get_string(&AttributePath::new("name")).map_err(|_| {
            Diagnostic::error("Missing name", "The 'name' attribute is required")
                .with_attribute(AttributePath::new("name"))
        })?;

        let color = config
            .get_optional_string(&AttributePath::new("color"))
            .map_err(|e| {
                Diagnostic::error("Invalid color", e.to_string())
                    .with_attribute(AttributePath::new("color"))
            })?;

        Ok(CreateServerRequest { name, color })
    }

    /// Build the new state from the plan and the server Postmark returned.
    /// Configured values win over echoed ones so the result matches the plan.
    fn server_to_state(
        planned_state: &DynamicValue,
        request: &CreateServerRequest,
        server: &Server,
    ) -> tfplug::Result<DynamicValue> {
        let mut state = match planned_state.attributes() {
            Some(_) => planned_state.clone(),
            None => DynamicValue::object(),
        };

        state.set_string(&AttributePath::new("id"), server.id.to_string())?;
        state.set_string(&AttributePath::new("name"), request.name.clone())?;

        match request.color.as_ref().or(server.color.as_ref()) {
            Some(color) => state.set_string(&AttributePath::new("color"), color.clone())?,
            None => state.set_null(&AttributePath::new("color"))?,
        }

        state.set_string_list(&AttributePath::new("apitokens"), server.api_tokens.iter().cloned())?;
        state.set_string(
            &AttributePath::new("last_updated"),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;

        Ok(state)
    }
}

#[async_trait]
impl Resource for ServerResource {
    fn type_name(&self) -> &str {
        SERVER_TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: Self::schema_static().validate_config(&request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let create_request = match self.extract_server_config(&request.config) {
            Ok(create_request) => create_request,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        tracing::debug!("Creating Postmark server '{}'", create_request.name);

        let server = match provider_data
            .client
            .servers()
            .create(&ctx, &create_request)
            .await
        {
            Ok(server) => server,
            Err(e) => {
                tracing::error!("Failed to create server '{}': {}", create_request.name, e);
                diagnostics.push(Diagnostic::error("Failed to create server", e.to_string()));
                return CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        match Self::server_to_state(&request.planned_state, &create_request, &server) {
            Ok(new_state) => {
                tracing::info!(
                    "Created Postmark server {} ('{}')",
                    server.id,
                    server.name.as_deref().unwrap_or(&create_request.name)
                );
                CreateResourceResponse {
                    new_state,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create server",
                    format!("Server {} was created but its state could not be recorded: {}", server.id, e),
                ));
                CreateResourceResponse {
                    new_state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        // Postmark servers are never refreshed; state is kept as written by create
        let new_state = if request.current_state.is_null() {
            None
        } else {
            Some(request.current_state)
        };

        ReadResourceResponse {
            new_state,
            diagnostics: vec![],
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        tracing::warn!("Refusing in-place update of Postmark server {}", id);

        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "In-place update not supported",
                "Changes to a postmark_server require replacing the resource",
            )],
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let id = request
            .prior_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        tracing::warn!("Removing Postmark server {} from state without deleting it", id);

        DeleteResourceResponse {
            diagnostics: vec![Diagnostic::warning(
                "Server left in place",
                format!(
                    "Postmark server {} was removed from Terraform state but still exists on the account",
                    id
                ),
            )],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure<PostmarkProviderData> for ServerResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest<PostmarkProviderData>,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match request.provider_data {
            Some(data) => self.provider_data = Some(data),
            None => diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            )),
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[path = "./resource_server_test.rs"]
mod resource_server_test;
