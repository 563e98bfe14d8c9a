pub mod api;
pub mod config;
pub mod domain;
pub mod middleware;
pub mod services;
pub mod upstream;

pub use config::Settings;
pub use upstream::OpenAiClient;
