// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use camino::Utf8PathBuf;
use eyre::WrapErr;
use mathmark::config::{self, Config};

#[derive(clap::Args)]
pub struct InitCommand {
    /// Where to write the configuration file.
    #[arg(default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    pub path: Utf8PathBuf,

    /// Overwrite an existing file.
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(command: &InitCommand) -> eyre::Result<()> {
    let path = &command.path;
    if path.exists() && !command.force {
        return Err(eyre::eyre!("Already exists: {}", path));
    }

    let toml = default_config_toml()?;
    mathmark::path_utils::create_parent_dirs(path)?;
    std::fs::write(path, toml).wrap_err_with(|| eyre::eyre!("failed to write file `{}`", path))?;
    color_print::cprintln!("<g>Created</> config file at: {}", path);
    Ok(())
}

fn default_config_toml() -> eyre::Result<String> {
    toml::to_string(&Config::default())
        .map_err(|e| eyre::eyre!("failed to serialize default config: {}", e))
}
