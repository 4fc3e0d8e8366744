//! Provider data handed to resources after the provider is configured

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct PostmarkProviderData {
    pub client: Arc<Client>,
}

impl PostmarkProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
