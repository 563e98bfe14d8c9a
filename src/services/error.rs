use thiserror::Error;

use crate::config::ConfigError;
use crate::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}
