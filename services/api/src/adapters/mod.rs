pub mod auth;
pub mod db;
pub mod reflection_llm;

pub use auth::TokenAuthProvider;
pub use db::DbAdapter;
pub use reflection_llm::OpenAiReflectionAdapter;
