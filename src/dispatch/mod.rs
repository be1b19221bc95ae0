pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::ProviderRegistry;
