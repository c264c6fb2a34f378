pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod observer;
pub mod session;
pub mod store;
