//! Resource implementations

pub mod resource_server;

pub use resource_server::ServerResource;

use crate::PostmarkProviderData;
use tfplug::ResourceWithConfigure;

pub fn server_resource() -> Box<dyn ResourceWithConfigure<PostmarkProviderData>> {
    Box::new(ServerResource::new())
}
