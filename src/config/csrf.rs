// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use serde::{Deserialize, Serialize};

pub const DEFAULT_META_NAME: &str = "csrf-token";
pub const DEFAULT_HEADER: &str = "X-CSRFToken";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Csrf {
    /// `name` attribute of the `<meta>` tag carrying the token.
    pub meta_name: String,
    pub header: String,
}

impl Default for Csrf {
    fn default() -> Self {
        Self {
            meta_name: DEFAULT_META_NAME.to_string(),
            header: DEFAULT_HEADER.to_string(),
        }
    }
}
