pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the handlers the binary wires into the router.
pub use middleware::require_auth;
pub use rest::{
    delete_entry_handler, get_entry_handler, list_entries_handler, reflect_handler,
    save_entry_handler,
};
