// Application state module
// Read-only runtime state shared across requests

use super::types::Config;

/// Application state
///
/// Holds the configuration loaded at startup. Nothing here is mutated after
/// construction; request handlers only ever read from it.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}
