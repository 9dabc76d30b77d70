pub mod camera;
pub mod config;
pub mod debounce;
pub mod deeplink;
pub mod driver;
pub mod error;
pub mod feed;
pub mod geo;
pub mod guidance;
pub mod http;
pub mod model;
pub mod resolver;
pub mod route;
pub mod services;
pub mod session;

#[cfg(target_os = "android")]
pub mod android;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
