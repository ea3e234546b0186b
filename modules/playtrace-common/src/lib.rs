pub mod config;
pub mod event;

pub use config::Config;
pub use event::{Event, UnixTime};
