// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

mod cli;

use clap::Parser;
use mathmark::telemetry;

use crate::cli::{
    init::InitCommand, post::PostCommand, render::RenderCommand, watch::WatchCommand,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Write a default configuration file.
    #[command(visible_alias = "i")]
    Init(InitCommand),

    /// Render markdown comments with formulas to HTML.
    #[command(visible_alias = "r")]
    Render(RenderCommand),

    /// Re-render comments on change and run the typesetter over them.
    #[command(visible_alias = "w")]
    Watch(WatchCommand),

    /// Render a comment and submit it with the page's CSRF token.
    #[command(visible_alias = "p")]
    Post(PostCommand),
}

fn main() -> eyre::Result<()> {
    telemetry::init_subscriber(telemetry::get_subscriber(telemetry::DEFAULT_FILTER))?;

    let cli = Cli::parse();
    match &cli.command {
        Command::Init(command) => crate::cli::init::init(command)?,
        Command::Render(command) => crate::cli::render::render(command)?,
        Command::Watch(command) => crate::cli::watch::watch(command)?,
        Command::Post(command) => crate::cli::post::post(command)?,
    };
    Ok(())
}
