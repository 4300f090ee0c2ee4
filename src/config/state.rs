// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::routing::RouteTable;

/// Application state
///
/// Built once before the listener starts and only read afterwards,
/// so it is shared through a plain `Arc` without locks.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            routes: RouteTable::from_config(&config.routes),
        }
    }
}
