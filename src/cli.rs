mod burrow;
mod foxess;
mod poll;

use clap::{Parser, Subcommand};

use crate::{
    cli::{burrow::BurrowArgs, poll::PollArgs},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: poll the cloud and keep the sensors up to date.
    #[clap(name = "poll")]
    Poll(Box<PollArgs>),

    /// Development tools: one-off cloud calls.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}

impl Command {
    pub async fn run(self) -> Result {
        match self {
            Self::Poll(args) => args.run().await,
            Self::Burrow(args) => args.run().await,
        }
    }
}
