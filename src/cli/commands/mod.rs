//! CLI command implementations.

mod config;
mod index;
mod init;
mod list;
mod search;
mod serve;

pub use config::run_config;
pub use index::run_index;
pub use init::run_init;
pub use list::run_list;
pub use search::run_search;
pub use serve::run_serve;
