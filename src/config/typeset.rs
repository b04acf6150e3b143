// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DELAY_MS: u64 = 300;

/// Placeholder in [`Typeset::command`] replaced by the region path.
pub const REGION_PLACEHOLDER: &str = "<region>";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Typeset {
    pub delay_ms: u64,

    /// External typesetting command, e.g. `["mathjax-cli", "<region>"]`.
    /// Empty disables the typesetting pass.
    pub command: Vec<String>,
}

impl Default for Typeset {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            command: vec![],
        }
    }
}

impl Typeset {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
