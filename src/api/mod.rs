// src/api/mod.rs

pub mod health;
pub mod realms;
pub mod resources;

use std::sync::Arc;

// AppState definition
use crate::config::Config;
use crate::services::RealmService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub realms: Arc<RealmService>,
}
