//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use lumina_core::ports::{AuthStore, EntryStore};
use lumina_core::reflection::ReflectionService;

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntryStore>,
    pub auth: Arc<dyn AuthStore>,
    pub reflections: Arc<ReflectionService>,
    pub config: Arc<Config>,
}
