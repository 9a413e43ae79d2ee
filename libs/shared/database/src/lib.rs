pub mod sqlite;

pub use sqlite::{connect, ensure_schema, AppState};
