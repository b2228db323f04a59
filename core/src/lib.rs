pub mod arn;
pub mod client;
pub mod config;
pub mod logging;
pub mod wait;
