// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

//! Keeps formulas out of reach of the markup pass.
//!
//! [`protect`] swaps every formula for an alphanumeric sentinel and remembers
//! the formula body, [`Shielded::restore`] puts the bodies back into the
//! rendered HTML wrapped in the delimiters MathJax expects: `$$..$$` for
//! display formulas, whatever they were written with, and `$..$` inline.
//!
//! Display formulas are scanned first. Otherwise the inline scan would pair
//! up the dollars of a `$$..$$` block.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

static DISPLAY_DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("display `$$` pattern"));

static DISPLAY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\[(.*?)\\\]").expect("display `\\[` pattern"));

/// Single line, non-greedy. Two amounts of money on one line will be taken
/// as one formula.
static INLINE_DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(.+?)\$").expect("inline `$` pattern"));

const SENTINEL_STEM: &str = "mathshield";
const NONCE_LEN: usize = 8;

/// Ends every sentinel, so `..D1E` is never a prefix of `..D12E`.
const SENTINEL_END: char = 'E';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathKind {
    Display,
    Inline,
}

impl MathKind {
    fn tag(self) -> char {
        match self {
            MathKind::Display => 'D',
            MathKind::Inline => 'I',
        }
    }

    fn from_tag(tag: &str) -> Option<MathKind> {
        match tag {
            "D" => Some(MathKind::Display),
            "I" => Some(MathKind::Inline),
            _ => None,
        }
    }

    /// Wrap a formula body in the canonical delimiters of this kind.
    pub fn wrap(self, formula: &str) -> String {
        match self {
            MathKind::Display => format!("$${}$$", formula),
            MathKind::Inline => format!("${}$", formula),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathRecord {
    pub id: usize,
    pub formula: String,
}

/// Text with its formulas replaced by sentinels.
#[derive(Debug)]
pub struct Shielded {
    /// The input text, formulas swapped out.
    pub text: String,
    pub display: Vec<MathRecord>,
    pub inline: Vec<MathRecord>,
    prefix: String,
}

impl Shielded {
    /// Put every recorded formula back in place of its sentinel.
    pub fn restore(&self, html: &str) -> String {
        if self.display.is_empty() && self.inline.is_empty() {
            return html.to_string();
        }

        let pattern = format!("{}([DI])([0-9]+){}", self.prefix, SENTINEL_END);
        let Ok(sentinels) = Regex::new(&pattern) else {
            // The prefix is plain ASCII alphanumerics, so this is unreachable.
            return html.to_string();
        };

        sentinels
            .replace_all(html, |caps: &Captures| {
                let whole = caps[0].to_string();
                let Some(kind) = MathKind::from_tag(&caps[1]) else {
                    return whole;
                };
                let Ok(id) = caps[2].parse::<usize>() else {
                    return whole;
                };
                let records = match kind {
                    MathKind::Display => &self.display,
                    MathKind::Inline => &self.inline,
                };
                records
                    .get(id)
                    .map(|record| kind.wrap(&record.formula))
                    .unwrap_or(whole)
            })
            .into_owned()
    }
}

fn sentinel(prefix: &str, kind: MathKind, id: usize) -> String {
    format!("{}{}{}{}", prefix, kind.tag(), id, SENTINEL_END)
}

/// Pick a sentinel prefix that does not occur anywhere in `text`.
fn fresh_prefix(text: &str) -> String {
    loop {
        let nonce: String = std::iter::repeat_with(fastrand::lowercase)
            .take(NONCE_LEN)
            .collect();
        let prefix = format!("{}{}", SENTINEL_STEM, nonce);
        if !text.contains(&prefix) {
            return prefix;
        }
    }
}

fn swap_out(
    text: &str,
    pattern: &Regex,
    kind: MathKind,
    prefix: &str,
    records: &mut Vec<MathRecord>,
) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let id = records.len();
            records.push(MathRecord {
                id,
                formula: caps[1].to_string(),
            });
            sentinel(prefix, kind, id)
        })
        .into_owned()
}

/// Replace every formula in `text` with a sentinel.
///
/// Order matters: `$$..$$`, then `\[..\]` (both numbered in one display
/// sequence), then inline `$..$` with its own numbering.
pub fn protect(text: &str) -> Shielded {
    let prefix = fresh_prefix(text);
    let mut display = Vec::new();
    let mut inline = Vec::new();

    let text = swap_out(text, &DISPLAY_DOLLARS, MathKind::Display, &prefix, &mut display);
    let text = swap_out(&text, &DISPLAY_BRACKETS, MathKind::Display, &prefix, &mut display);
    let text = swap_out(&text, &INLINE_DOLLARS, MathKind::Inline, &prefix, &mut inline);

    Shielded {
        text,
        display,
        inline,
        prefix,
    }
}
