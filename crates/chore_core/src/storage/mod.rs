pub mod snapshot_store;

pub use snapshot_store::{ChoreSnapshot, SCHEMA_VERSION, apply_decision, load_snapshot, save_snapshot};
