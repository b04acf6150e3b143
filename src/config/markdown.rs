// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

/// Switches for the markup pass. Math parsing is never turned on here,
/// formulas are shielded before the parser sees them.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Markdown {
    /// Turn every newline inside a paragraph into `<br />`.
    pub breaks: bool,
    pub gfm: bool,
    pub smartypants: bool,
    /// CommonMark already starts a new list when the bullet marker changes,
    /// so this only exists to be spelled out in the config file.
    pub smart_lists: bool,
}

impl Default for Markdown {
    fn default() -> Self {
        Self {
            breaks: true,
            gfm: true,
            smartypants: false,
            smart_lists: true,
        }
    }
}

impl Markdown {
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(
                Options::ENABLE_TABLES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_FOOTNOTES,
            );
        }
        if self.smartypants {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}
