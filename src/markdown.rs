//! Converts content bodies from Markdown to HTML.

use pulldown_cmark::{html, Options, Parser};

/// Converts CommonMark `markdown` to HTML. Tables, footnotes, strikethrough,
/// and task lists are enabled on top of plain CommonMark. Raw HTML in the
/// input passes through untouched, as do placeholder tokens such as
/// `{{ posts }}`.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
