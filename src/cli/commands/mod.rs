//! CLI command implementations.

mod config;
mod doctor;
mod fetch;
mod list;
mod query;

pub use config::run_config;
pub use doctor::run_doctor;
pub use fetch::run_fetch;
pub use list::run_list;
pub use query::run_query;
