// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use tracing::{subscriber::set_global_default, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable overriding the default filter.
pub const LOG_ENV: &str = "MATHMARK_LOG";
pub const DEFAULT_FILTER: &str = "warn,mathmark=info";

pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Sync + Send {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let stderr = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    Registry::default().with(env_filter).with(stderr)
}

/// Register a subscriber as global default. Call once, from `main`.
pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> eyre::Result<()> {
    set_global_default(subscriber)
        .map_err(|e| eyre::eyre!("failed to install log subscriber: {}", e))
}
