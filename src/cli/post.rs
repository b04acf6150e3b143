// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::io::Read;

use camino::Utf8PathBuf;
use eyre::{eyre, WrapErr};
use mathmark::{
    client::InterceptedClient,
    config::{self, Config},
    csrf::CsrfInterceptor,
    markdown::Renderer,
};
use reqwest::{Method, StatusCode};

#[derive(clap::Args)]
pub struct PostCommand {
    /// Endpoint receiving the comment.
    pub url: String,

    /// Markdown file with the comment text, `-` for stdin.
    pub input: String,

    /// Page serving the CSRF token. Defaults to the endpoint itself.
    #[arg(long)]
    pub page: Option<String>,

    /// HTTP method used to submit the comment.
    #[arg(short = 'X', long, default_value = "POST")]
    pub method: String,

    /// Field carrying the rendered HTML.
    #[arg(long, default_value = "content")]
    pub field: String,

    /// Also submit the raw markdown under this field.
    #[arg(long)]
    pub raw_field: Option<String>,

    /// Submit a JSON object instead of a form.
    #[arg(long)]
    pub json: bool,

    /// Path to the configuration file (e.g., "mathmark.toml").
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    pub config: Utf8PathBuf,
}

/// What to submit and where.
pub struct Submission {
    pub url: String,
    pub page: String,
    pub method: Method,
    pub fields: Vec<(String, String)>,
    pub json: bool,
}

pub fn post(command: &PostCommand) -> eyre::Result<()> {
    let config = config::load_config(&command.config)?;
    let source = read_input(&command.input)?;
    let html = Renderer::new(config.markdown).render(&source);

    let mut fields = vec![(command.field.clone(), html)];
    if let Some(raw_field) = &command.raw_field {
        fields.push((raw_field.clone(), source));
    }

    let method = Method::from_bytes(command.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| eyre!("invalid method `{}`: {}", command.method, e))?;
    let submission = Submission {
        url: command.url.clone(),
        page: command.page.clone().unwrap_or_else(|| command.url.clone()),
        method,
        fields,
        json: command.json,
    };

    let inner = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .wrap_err("failed to build HTTP client")?;
    let (status, body) = super::block_on(submit(inner, &config, submission))??;
    color_print::cprintln!("<g>Posted</> {} ({})", command.url, status);
    if !body.trim().is_empty() {
        tracing::debug!("response body: {}", body);
    }
    Ok(())
}

fn read_input(input: &str) -> eyre::Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .wrap_err("failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(input).wrap_err_with(|| eyre!("failed to read file `{}`", input))
}

/// Fetch the token page, then send the submission with the token attached.
///
/// The inner client should keep cookies, since servers usually bind the
/// token to the session.
pub async fn submit(
    inner: reqwest::Client,
    config: &Config,
    submission: Submission,
) -> eyre::Result<(StatusCode, String)> {
    let plain = InterceptedClient::new(inner.clone());
    let page = plain
        .send(plain.get(&submission.page))
        .await
        .wrap_err_with(|| eyre!("failed to fetch `{}`", submission.page))?
        .error_for_status()
        .wrap_err_with(|| eyre!("failed to fetch `{}`", submission.page))?
        .text()
        .await?;

    let client = InterceptedClient::new(inner).with(CsrfInterceptor::from_page(&config.csrf, &page)?);
    let builder = client.request(submission.method, &submission.url);
    let builder = match submission.json {
        true => {
            let object: serde_json::Map<String, serde_json::Value> = submission
                .fields
                .into_iter()
                .map(|(key, value)| (key, serde_json::Value::String(value)))
                .collect();
            builder.json(&object)
        }
        false => builder.form(&submission.fields),
    };

    let response = client
        .send(builder)
        .await
        .wrap_err_with(|| eyre!("failed to send to `{}`", submission.url))?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(eyre!("server answered {}: {}", status, body.trim()));
    }
    Ok((status, body))
}
