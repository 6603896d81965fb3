use std::sync::Arc;

pub mod config;
pub mod driver;
pub mod error;
pub mod game_actions;
pub mod notifier;
pub mod registry;

use config::Config;
use notifier::Notifier;
use registry::GameRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: GameRegistry,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        AppState {
            registry: GameRegistry::new(),
            notifier,
            config,
        }
    }
}
