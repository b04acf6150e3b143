// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Kokic (@kokic), Spore (@s-cerevisiae)

use std::{collections::VecDeque, iter::Peekable, sync::LazyLock};

use pulldown_cmark::{html, CowStr, Event, LinkType, Parser, Tag, TagEnd};
use regex_lite::Regex;

use crate::{config::markdown::Markdown, shield};

static RE_BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:https?://|www\.)[A-Za-z0-9][^\s<>]*").expect("bare url pattern")
});

/// Turns soft line breaks into hard ones, so every newline a commenter
/// typed shows up as `<br />`.
pub struct HardBreaks<E> {
    events: E,
}

impl<E> HardBreaks<E> {
    pub fn new(events: E) -> Self {
        Self { events }
    }
}

impl<'e, E: Iterator<Item = Event<'e>>> Iterator for HardBreaks<E> {
    type Item = Event<'e>;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next().map(|e| match e {
            Event::SoftBreak => Event::HardBreak,
            _ => e,
        })
    }
}

/// Links bare `http://`, `https://` and `www.` addresses in text, as GFM
/// does. Text inside links, images and code blocks is left alone.
pub struct Autolinks<'e, E: Iterator<Item = Event<'e>>> {
    events: Peekable<E>,
    queue: VecDeque<Event<'e>>,
    opaque: usize,
    in_code_block: bool,
}

impl<'e, E: Iterator<Item = Event<'e>>> Autolinks<'e, E> {
    pub fn new(events: E) -> Self {
        Self {
            events: events.peekable(),
            queue: VecDeque::new(),
            opaque: 0,
            in_code_block: false,
        }
    }

    fn link_text(&mut self, mut text: CowStr<'e>) -> Option<Event<'e>> {
        // The parser may split one run of text into several events.
        while let Some(Event::Text(_)) = self.events.peek() {
            if let Some(Event::Text(more)) = self.events.next() {
                text = format!("{}{}", text, more).into();
            }
        }
        if !RE_BARE_URL.is_match(&text) {
            return Some(Event::Text(text));
        }

        let mut last = 0;
        for found in RE_BARE_URL.find_iter(&text) {
            let url = trim_url(found.as_str());
            if found.start() > last {
                self.queue
                    .push_back(Event::Text(text[last..found.start()].to_string().into()));
            }
            let dest_url = match url.starts_with("www.") {
                true => format!("http://{}", url),
                false => url.to_string(),
            };
            self.queue.push_back(Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: dest_url.into(),
                title: "".into(),
                id: "".into(),
            }));
            self.queue.push_back(Event::Text(url.to_string().into()));
            self.queue.push_back(Event::End(TagEnd::Link));
            last = found.start() + url.len();
        }
        if last < text.len() {
            self.queue.push_back(Event::Text(text[last..].to_string().into()));
        }
        self.queue.pop_front()
    }
}

impl<'e, E: Iterator<Item = Event<'e>>> Iterator for Autolinks<'e, E> {
    type Item = Event<'e>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.queue.pop_front() {
            return Some(event);
        }

        let event = self.events.next()?;
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => self.opaque += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => {
                self.opaque = self.opaque.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => self.in_code_block = true,
            Event::End(TagEnd::CodeBlock) => self.in_code_block = false,
            _ => {}
        }
        match event {
            Event::Text(text) if self.opaque == 0 && !self.in_code_block => self.link_text(text),
            _ => Some(event),
        }
    }
}

/// Drop trailing punctuation and unbalanced closing parentheses, which end
/// the sentence rather than the address.
fn trim_url(mut url: &str) -> &str {
    while let Some(last) = url.chars().last() {
        let trailing = match last {
            '?' | '!' | '.' | ',' | ':' | ';' | '*' | '_' | '~' | '\'' | '"' => true,
            ')' => url.matches('(').count() < url.matches(')').count(),
            _ => false,
        };
        if !trailing {
            break;
        }
        url = &url[..url.len() - 1];
    }
    url
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    markdown: Markdown,
}

impl Renderer {
    pub fn new(markdown: Markdown) -> Self {
        Self { markdown }
    }

    /// Render comment text to HTML, leaving every formula intact for the
    /// typesetter.
    pub fn render(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let shielded = shield::protect(text);
        tracing::trace!(
            display = shielded.display.len(),
            inline = shielded.inline.len(),
            "shielded formulas"
        );
        let html = self.render_plain(&shielded.text);
        shielded.restore(&html)
    }

    /// Markup pass alone, formulas included.
    pub fn render_plain(&self, text: &str) -> String {
        let mut events: Box<dyn Iterator<Item = Event<'_>> + '_> =
            Box::new(Parser::new_ext(text, self.markdown.parser_options()));
        if self.markdown.gfm {
            events = Box::new(Autolinks::new(events));
        }
        if self.markdown.breaks {
            events = Box::new(HardBreaks::new(events));
        }

        let mut html_output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut html_output, events);
        html_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        Renderer::default().render(text)
    }

    #[test]
    fn test_empty() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_display_dollars() {
        assert_eq!(render("$$a+b$$"), "<p>$$a+b$$</p>\n");
    }

    #[test]
    fn test_display_brackets() {
        assert_eq!(render("\\[x^2\\]"), "<p>$$x^2$$</p>\n");
    }

    #[test]
    fn test_inline() {
        assert_eq!(render("$x$"), "<p>$x$</p>\n");
    }

    #[test]
    fn test_without_math_matches_plain() {
        let renderer = Renderer::default();
        for text in [
            "# Title\n\nSome *emphasis* and **strong**.",
            "- one\n- two\n\n1. first\n2. second",
            "line one\nline two",
            "| a | b |\n| - | - |\n| c | d |",
            "~~gone~~ and `code`",
        ] {
            assert_eq!(renderer.render(text), renderer.render_plain(text));
        }
    }

    #[test]
    fn test_emphasis_inside_formula_untouched() {
        assert_eq!(
            render("see $a_1 * b_2 * c$ here"),
            "<p>see $a_1 * b_2 * c$ here</p>\n"
        );
    }

    #[test]
    fn test_display_body_identical() {
        let body = "\n\\begin{aligned} a &= b \\\\ c &= d_1 * e_2 \\end{aligned}\n";
        let html = render(&format!("before\n\n$${}$$\n\nafter", body));
        assert!(html.contains(&format!("$${}$$", body)));
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_mixed_display_and_inline() {
        let html = render("$$x$y$$ and $z$");
        assert_eq!(html, "<p>$$x$y$$ and $z$</p>\n");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(render("a\nb"), "<p>a<br />\nb</p>\n");

        let renderer = Renderer::new(Markdown {
            breaks: false,
            ..Markdown::default()
        });
        assert_eq!(renderer.render("a\nb"), "<p>a\nb</p>\n");
    }

    #[test]
    fn test_no_smart_punctuation() {
        let html = render("wait -- \"quoted\"");
        assert!(html.contains("wait --"));
        assert!(!html.contains('\u{201C}'));
        assert!(!html.contains('\u{2013}'));
    }

    #[test]
    fn test_formula_in_list() {
        let html = render("- $a$\n- $$b$$");
        assert_eq!(html, "<ul>\n<li>$a$</li>\n<li>$$b$$</li>\n</ul>\n");
    }

    #[test]
    fn test_gfm_table() {
        let html = render("| a | $b$ |\n| - | - |\n| c | d |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>$b$</th>"));
    }

    #[test]
    fn test_bare_url_linked() {
        assert_eq!(
            render("see https://example.com and $x$"),
            "<p>see <a href=\"https://example.com\">https://example.com</a> and $x$</p>\n"
        );
    }

    #[test]
    fn test_www_url_and_trailing_punctuation() {
        assert_eq!(
            render("visit www.example.com."),
            "<p>visit <a href=\"http://www.example.com\">www.example.com</a>.</p>\n"
        );
        let html = render("(docs at https://example.com/a_(b))");
        assert!(html.contains("<a href=\"https://example.com/a_(b)\">"));
        assert!(html.ends_with("</a>)</p>\n"));
    }

    #[test]
    fn test_existing_links_and_code_not_relinked() {
        let html = render("[site](https://a.org) and `https://b.org`\n\n    https://c.org\n");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<a href=\"https://a.org\">site</a>"));
        assert!(html.contains("<code>https://b.org</code>"));
        assert!(html.contains("<pre><code>https://c.org"));

        let html = render("<https://d.org>");
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn test_no_autolink_without_gfm() {
        let renderer = Renderer::new(Markdown {
            gfm: false,
            ..Markdown::default()
        });
        assert_eq!(
            renderer.render("see https://example.com"),
            "<p>see https://example.com</p>\n"
        );
    }
}
