//! Front-end channels — thin surfaces over the router.
//!
//! A channel collects raw user text, hands it to the router, and displays
//! the result. No routing or agent logic lives here.

pub mod cli;
pub mod http;

pub use cli::CliChannel;
pub use http::HttpChannel;

use async_trait::async_trait;

use crate::error::ChannelError;

/// A front-end surface. `serve` runs until the user or the process stops it.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn serve(&self) -> Result<(), ChannelError>;
}
