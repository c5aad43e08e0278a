//! CLI channel — stdin/stdout REPL.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::Channel;
use crate::error::ChannelError;
use crate::router::Router;

/// A simple REPL that routes each line and prints the reply.
pub struct CliChannel {
    router: Arc<Router>,
}

impl CliChannel {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &'static str {
        "cli"
    }

    async fn serve(&self) -> Result<(), ChannelError> {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        eprintln!("Ask about technique, tournament plans, or injuries. /quit to exit.");
        eprint!("> ");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                eprint!("> ");
                continue;
            }
            if line == "/quit" || line == "/exit" {
                break;
            }

            let result = self.router.route(line).await;
            match result.subroute.as_deref() {
                Some(subroute) => println!("\n[{} · {}] {}\n", result.category, subroute, result.output),
                None => println!("\n[{}] {}\n", result.category, result.output),
            }
            eprint!("> ");
        }

        Ok(())
    }
}
