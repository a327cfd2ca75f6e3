mod database;
mod state_builder;

pub use state_builder::{RbacStore, build_app_state, build_store};
