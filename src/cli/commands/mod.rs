mod ask;
mod clear;
mod config;
mod index;
mod search;
mod status;

pub use ask::AskArgs;
pub use clear::ClearArgs;
pub use config::ConfigCommand;
pub use index::IndexArgs;
pub use search::SearchArgs;

pub use ask::handle_ask;
pub use clear::handle_clear;
pub use config::handle_config;
pub use index::{handle_index, parse_products};
pub use search::handle_search;
pub use status::handle_status;
