// State management module
// The reducer-backed store is the sole mutation path for UI state

pub mod store;

pub use store::{Action, AppState, Store};
