// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

//! Render comments that mix Markdown with TeX formulas, and send them with
//! the page's anti-forgery token attached.

pub mod client;
pub mod config;
pub mod csrf;
pub mod html_flake;
pub mod markdown;
pub mod path_utils;
pub mod shield;
pub mod telemetry;
pub mod typeset;
