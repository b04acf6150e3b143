// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic), Spore (@s-cerevisiae)

pub mod csrf;
pub mod markdown;
pub mod page;
pub mod typeset;

use camino::{Utf8Path, Utf8PathBuf};
use csrf::Csrf;
use eyre::WrapErr;
use markdown::Markdown;
use page::Page;
use serde::{Deserialize, Serialize};
use typeset::Typeset;

pub const DEFAULT_CONFIG_PATH: &str = "./mathmark.toml";
pub const DEFAULT_CONFIG_NAME: &str = "mathmark.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    #[serde(default)]
    pub markdown: Markdown,

    #[serde(default)]
    pub typeset: Typeset,

    #[serde(default)]
    pub csrf: Csrf,

    #[serde(default)]
    pub page: Page,
}

/// Try to find toml file at the given path or in the parent directory.
pub fn find_config(toml_file: &Utf8Path) -> eyre::Result<Utf8PathBuf> {
    if toml_file.exists() {
        return Ok(toml_file.to_owned());
    }

    let current = Utf8Path::new(".").canonicalize_utf8()?;
    let fallback = current
        .parent()
        .map(|parent| parent.join(DEFAULT_CONFIG_NAME))
        .filter(|path| path.exists());

    fallback.ok_or_else(|| eyre::eyre!("cannot find configuration file: {}", toml_file))
}

pub fn parse_config(config: &str) -> eyre::Result<Config> {
    let config: Config =
        toml::from_str(config).map_err(|e| eyre::eyre!("failed to parse config file: {}", e))?;
    Ok(config)
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config(toml_file: &Utf8Path) -> eyre::Result<Config> {
    let toml_file = match find_config(toml_file) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!("{err}, using defaults");
            return Ok(Config::default());
        }
    };

    let toml = std::fs::read_to_string(&toml_file)
        .wrap_err_with(|| eyre::eyre!("failed to read file `{}`", toml_file))?;
    tracing::info!(path = %toml_file, "loaded configuration");
    parse_config(&toml)
}
