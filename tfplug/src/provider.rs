//! Provider trait and related types

use crate::context::Context;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{ClientCapabilities, Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::HashMap;

/// Builds a fresh, unconfigured resource instance
pub type ResourceFactory<D> = fn() -> Box<dyn ResourceWithConfigure<D>>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Data handed to every resource after configure (API clients etc.)
    type Data: Clone + Send + Sync + 'static;

    /// Provider type name, the prefix of every resource type name
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once with the provider block configuration
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse<Self::Data>;

    /// Resource factories keyed by resource type name
    fn resources(&self) -> HashMap<String, ResourceFactory<Self::Data>>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
    pub client_capabilities: ClientCapabilities,
}

pub struct ConfigureProviderResponse<D> {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<D>,
}
