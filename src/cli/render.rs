// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{eyre, WrapErr};
use mathmark::{
    config::{self, Config},
    csrf::CsrfToken,
    html_flake,
    markdown::Renderer,
    path_utils,
};
use walkdir::WalkDir;

#[derive(clap::Args)]
pub struct RenderCommand {
    /// Markdown file, or a directory searched for `.md` files.
    pub input: Utf8PathBuf,

    /// Output file or directory. A single file goes to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Wrap the output in a standalone page that loads the typesetter.
    #[arg(long)]
    pub page: bool,

    /// Embed this CSRF token in the page metadata (requires `--page`).
    #[arg(long, requires = "page")]
    pub csrf_token: Option<String>,

    /// Path to the configuration file (e.g., "mathmark.toml").
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    pub config: Utf8PathBuf,
}

/// Turns comment sources into HTML documents.
pub struct Publisher {
    renderer: Renderer,
    page: Option<(String, String)>,
}

impl Publisher {
    pub fn new(config: &Config, page: bool, csrf_token: Option<CsrfToken>) -> Self {
        let page = page.then(|| {
            let mut head = config.page.math_script.clone();
            if let Some(token) = &csrf_token {
                head.push('\n');
                head.push_str(&html_flake::html_csrf_meta(&config.csrf.meta_name, token));
            }
            (config.page.title.clone(), head)
        });
        Self {
            renderer: Renderer::new(config.markdown),
            page,
        }
    }

    pub fn document(&self, source: &str) -> String {
        let comment = html_flake::html_comment(&self.renderer.render(source));
        match &self.page {
            Some((title, head)) => html_flake::html_page(title, &comment, head),
            None => comment,
        }
    }

    pub fn publish_file(&self, input: &Utf8Path, output: &Utf8Path) -> eyre::Result<()> {
        let source = fs::read_to_string(input)
            .wrap_err_with(|| eyre!("failed to read file `{}`", input))?;
        path_utils::create_parent_dirs(output)?;
        fs::write(output, self.document(&source))
            .wrap_err_with(|| eyre!("failed to write file `{}`", output))?;
        tracing::debug!(input = %input, output = %output, "rendered");
        Ok(())
    }
}

pub fn render(command: &RenderCommand) -> eyre::Result<()> {
    let config = config::load_config(&command.config)?;
    let token = command.csrf_token.clone().and_then(CsrfToken::new);
    let publisher = Publisher::new(&config, command.page, token);
    let input = &command.input;

    if input.is_dir() {
        let output = command
            .output
            .as_ref()
            .ok_or_else(|| eyre!("`--output` is required when rendering a directory"))?;
        let rendered = render_dir(&publisher, input, output)?;
        color_print::cprintln!("<g>Rendered</> {} file(s) to {}", rendered.len(), output);
        return Ok(());
    }

    match &command.output {
        Some(output) => {
            publisher.publish_file(input, output)?;
            color_print::cprintln!("<g>Rendered</> {}", path_utils::pretty_path(output));
        }
        None => {
            let source = fs::read_to_string(input)
                .wrap_err_with(|| eyre!("failed to read file `{}`", input))?;
            print!("{}", publisher.document(&source));
        }
    }
    Ok(())
}

/// Render every markdown file under `input` into the mirrored path under
/// `output`, returning the written files.
pub fn render_dir(
    publisher: &Publisher,
    input: &Utf8Path,
    output: &Utf8Path,
) -> eyre::Result<Vec<Utf8PathBuf>> {
    let mut written = vec![];
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.wrap_err_with(|| eyre!("failed to walk `{}`", input))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(entry.path())
            .ok_or_else(|| eyre!("non UTF-8 path: {}", entry.path().display()))?;
        if !path_utils::is_markdown(path) {
            continue;
        }

        let target = path_utils::html_output_path(input, path, output);
        publisher.publish_file(path, &target)?;
        written.push(target);
    }
    Ok(written)
}
