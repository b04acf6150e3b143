// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic)

use crate::csrf::CsrfToken;

/// Class carried by every rendered comment, so the typesetter can be told
/// which regions to process and the renderer never processes them twice.
pub const COMMENT_CLASS: &str = "comment-content";

pub fn html_comment(content: &str) -> String {
    format!(r#"<div class="{}">{}</div>"#, COMMENT_CLASS, content)
}

pub fn html_csrf_meta(meta_name: &str, token: &CsrfToken) -> String {
    format!(
        r#"<meta name="{}" content="{}">"#,
        htmlize::escape_attribute(meta_name),
        htmlize::escape_attribute(token.as_str())
    )
}

/// A standalone page around one or more rendered comments.
pub fn html_page(title: &str, body: &str, head_extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<meta name="viewport" content="width=device-width">
<title>{}</title>
{}
</head>
<body>
{}
</body>
</html>
"#,
        htmlize::escape_text(title),
        head_extra,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment() {
        assert_eq!(
            html_comment("<p>$x$</p>\n"),
            "<div class=\"comment-content\"><p>$x$</p>\n</div>"
        );
    }

    #[test]
    fn test_csrf_meta_escaped() {
        let token = CsrfToken::new("a\"b&c").unwrap();
        let meta = html_csrf_meta("csrf-token", &token);
        assert_eq!(meta, r#"<meta name="csrf-token" content="a&quot;b&amp;c">"#);
        assert_eq!(
            CsrfToken::from_page(&meta, "csrf-token").unwrap().as_str(),
            "a\"b&c"
        );
    }

    #[test]
    fn test_page() {
        let page = html_page("<Comments>", "<p>hi</p>", "<script></script>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>&lt;Comments&gt;</title>"));
        assert!(page.contains("<script></script>\n</head>"));
        assert!(page.contains("<body>\n<p>hi</p>\n</body>"));
    }
}
