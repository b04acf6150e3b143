// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::WrapErr;
use mathmark::{
    config,
    path_utils,
    typeset::{CommandEngine, Debounce, TypesetTrigger},
};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::render::{render_dir, Publisher};

#[derive(clap::Args)]
pub struct WatchCommand {
    /// Directory (or single file) of markdown comments to watch.
    pub input: Utf8PathBuf,

    /// Output directory.
    #[arg(short, long)]
    pub output: Utf8PathBuf,

    /// Wrap each output in a standalone page.
    #[arg(long)]
    pub page: bool,

    /// Path to the configuration file (e.g., "mathmark.toml").
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    pub config: Utf8PathBuf,
}

type Trigger = TypesetTrigger<CommandEngine, Utf8PathBuf>;

pub fn watch(command: &WatchCommand) -> eyre::Result<()> {
    super::block_on(watch_async(command))?
}

async fn watch_async(command: &WatchCommand) -> eyre::Result<()> {
    let config = config::load_config(&command.config)?;
    let publisher = Publisher::new(&config, command.page, None);
    // notify reports absolute paths.
    let input = command
        .input
        .canonicalize_utf8()
        .wrap_err_with(|| eyre::eyre!("cannot watch `{}`", command.input))?;
    let input = input.as_path();
    let output = command.output.as_path();

    let trigger: Option<Trigger> = match config.typeset.command.is_empty() {
        true => {
            tracing::info!("no typesetting command configured, skipping typeset passes");
            None
        }
        false => {
            let engine = CommandEngine::new(config.typeset.command.clone())?
                .with_root(output.to_owned());
            Some(TypesetTrigger::new(engine, Debounce::from(&config.typeset)))
        }
    };

    let rendered = render_all(&publisher, input, output)?;
    color_print::cprintln!("<g>Rendered</> {} file(s) to {}", rendered, output);
    if let Some(trigger) = &trigger {
        trigger.typeset_all().await;
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            // The receiver only goes away on shutdown.
            let _ = tx.send(res);
        },
        Config::default(),
    )?;
    watcher.watch(input.as_std_path(), RecursiveMode::Recursive)?;
    println!("[watch] \"{}\"\n\nPress Ctrl+C to stop watching.\n", input);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            res = rx.recv() => {
                let Some(res) = res else { break };
                match res {
                    Ok(event) => {
                        // notify-rs only reports `Modify(Any)` on Windows, so
                        // every modification and creation is taken.
                        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            continue;
                        }
                        for path in event.paths {
                            let Ok(path) = Utf8PathBuf::try_from(path) else {
                                continue;
                            };
                            if let Err(err) = on_change(&publisher, trigger.as_ref(), input, output, &path) {
                                color_print::ceprintln!("<r>[watch] Error: {:?}</>", err);
                            }
                        }
                    }
                    Err(error) => color_print::ceprintln!("<r>[watch] Error: {:?}</>", error),
                }
            }
        }
    }

    Ok(())
}

fn render_all(publisher: &Publisher, input: &Utf8Path, output: &Utf8Path) -> eyre::Result<usize> {
    if input.is_dir() {
        return Ok(render_dir(publisher, input, output)?.len());
    }
    let target = path_utils::html_output_path(input, input, output);
    publisher.publish_file(input, &target)?;
    Ok(1)
}

fn on_change(
    publisher: &Publisher,
    trigger: Option<&Trigger>,
    input: &Utf8Path,
    output: &Utf8Path,
    path: &Utf8Path,
) -> eyre::Result<()> {
    if !path_utils::is_markdown(path) || !path.is_file() {
        return Ok(());
    }

    println!("[watch] Change: {}", path_utils::pretty_path(path));
    std::io::stdout().flush()?;

    let target = path_utils::html_output_path(input, path, output);
    publisher.publish_file(path, &target)?;
    if let Some(trigger) = trigger {
        trigger.request(target);
    }
    Ok(())
}
