use crate::config::Config;
use crate::core::error::RelayError;
use crate::dispatch::Dispatcher;
use crate::history;
use crate::providers::factory::ProviderFactory;
use crate::server::{self, AppState};
use axum::Router;
use tracing::info;

pub struct Application {
    pub config: Config,
    pub dispatcher: Dispatcher,
}

impl Application {
    /// Connects the history store and registers every provider with a key.
    pub async fn new(config: Config) -> Result<Self, RelayError> {
        let store = history::connect(&config.storage).await?;
        info!(backend = ?config.storage.backend, "History store ready");

        let registry = ProviderFactory::new().build_registry(&config);
        let model_types: Vec<String> = registry
            .model_types()
            .iter()
            .map(|m| m.to_string())
            .collect();
        info!("Accepting model types: [{}]", model_types.join(", "));

        let dispatcher = Dispatcher::new(registry, store, &config.timeouts);

        Ok(Self { config, dispatcher })
    }

    pub fn router(&self) -> Router {
        server::router(AppState {
            dispatcher: self.dispatcher.clone(),
            history_limit: self.config.history_limit,
        })
    }

    pub async fn run(self) -> Result<(), RelayError> {
        let addr = self.config.server.bind_addr();
        server::serve(&addr, self.router()).await
    }
}
