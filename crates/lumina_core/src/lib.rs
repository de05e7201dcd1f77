pub mod domain;
pub mod editor;
pub mod ports;
pub mod reflection;
pub mod repository;
pub mod session;

#[cfg(test)]
mod test_support;

pub use domain::{EntryDraft, JournalEntry, Reflection, User, UserCredentials};
pub use editor::{EditorPhase, EntryEditor};
pub use ports::{
    AuthProvider, AuthStore, EntryRow, EntryStore, PortError, PortResult, ReflectionModel,
};
pub use reflection::{ReflectionService, REFLECTION_SYSTEM_INSTRUCTION};
pub use repository::EntryRepository;
pub use session::{SessionManager, Subscription};
