// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use serde::{Deserialize, Serialize};

pub const DEFAULT_MATH_SCRIPT: &str = r#"<script>
  window.MathJax = {
    tex: { inlineMath: [['$', '$']], displayMath: [['$$', '$$']] },
    options: { processHtmlClass: 'comment-content' }
  };
</script>
<script defer src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js"></script>"#;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Page {
    pub title: String,
    /// Raw HTML placed in `<head>` to load the typesetter.
    pub math_script: String,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            title: "Comments".to_string(),
            math_script: DEFAULT_MATH_SCRIPT.to_string(),
        }
    }
}
