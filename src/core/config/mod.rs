pub mod data;
pub mod defaults;
pub mod io;
pub mod printing;
pub mod search;

pub use data::Config;
pub use io::ConfigError;
pub use search::ConfigSearch;
