//! Renders a [`Site`] into HTML pages and writes them to disk.
//!
//! Every renderer follows the same sequence: start from the layout, fill
//! `{{ site_name }}`, fill `{{ template }}` with a fragment, fill
//! `{{ title }}`, then fill the fields specific to that kind of page. See
//! [`crate::template`] for why the order matters. Renderers are pure: they
//! return an [`Output`] and leave writing to [`Writer`].

use crate::markdown;
use crate::post::{Page, Post, Site};
use crate::template::{self, Document, Placeholder, Templates};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The filename of the page which becomes the site's front page.
pub const INDEX_PAGE: &str = "index";

/// The fragment for the chronological list of all posts.
pub const ARCHIVE_TEMPLATE: &str = "archive.html";

/// The fragment for the alphabetical list of tags.
pub const TAG_ARCHIVE_TEMPLATE: &str = "tag_archive.html";

/// The fragment for the list of posts carrying a single tag.
pub const TAGGED_TEMPLATE: &str = "tagged.html";

/// A rendered HTML file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    /// Location relative to the output directory.
    pub path: PathBuf,
    pub html: String,
}

impl Output {
    fn at_dir(dir: impl AsRef<Path>, html: String) -> Output {
        Output {
            path: dir.as_ref().join("index.html"),
            html,
        }
    }
}

/// `<title> - <site_name>`, or just the site name.
fn page_title(site: &Site, title: Option<&str>) -> String {
    match title {
        Some(title) => format!("{} - {}", title, site.name),
        None => site.name.clone(),
    }
}

/// One `<li>` per post, in iteration order.
fn post_list<'a>(posts: impl Iterator<Item = &'a Post>) -> String {
    posts
        .map(|post| {
            format!(
                "<li><a href=\"/{}/\">{} - {}</a></li>\n",
                post.filename(),
                post.publish_date,
                post.title
            )
        })
        .collect()
}

fn tag_link(tag: &str) -> String {
    format!("<a href=\"/tag/{}/\">{}</a>", tag, tag)
}

/// Comma-separated tag links, or `no tags`.
fn tag_links(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::from("no tags");
    }
    tags.iter()
        .map(|t| tag_link(t))
        .collect::<Vec<_>>()
        .join(", ")
}

fn nav(class: &str, label: &str, post: Option<&Post>) -> String {
    match post {
        Some(post) => format!(
            "<div class=\"{}\">{}: <a href=\"/{}/\">{}</a></div>",
            class,
            label,
            post.filename(),
            post.title
        ),
        None => String::new(),
    }
}

/// Renders a non-post page. Pages without a `template` field put their body
/// straight into the layout's `{{ template }}` slot. The [`INDEX_PAGE`]
/// additionally gets the full post list in `{{ posts }}` and is written to
/// the output root.
pub fn render_page(page: &Page, site: &Site, templates: &Templates) -> template::Result<Output> {
    let fragment = match &page.template {
        Some(name) => templates.get(name)?.to_owned(),
        None => Placeholder::Content.token(),
    };

    let doc = Document::new(templates.layout()?)
        .fill(Placeholder::SiteName, &site.name)
        .fill(Placeholder::Template, &fragment)
        .fill(Placeholder::Title, &page_title(site, page.title.as_deref()))
        .fill(Placeholder::Content, &markdown::to_html(&page.meta.body));

    if page.filename() == INDEX_PAGE {
        let html = doc
            .fill(Placeholder::Posts, &post_list(site.posts.iter()))
            .into_string();
        return Ok(Output {
            path: PathBuf::from("index.html"),
            html,
        });
    }
    Ok(Output::at_dir(page.filename(), doc.into_string()))
}

/// Renders a post with its tag links and links to its neighbours: `prev`
/// points at the next-older post and `next` at the next-newer one. The body
/// is filled last so placeholder text inside a post is left alone.
pub fn render_post(post: &Post, site: &Site, templates: &Templates) -> template::Result<Output> {
    let html = Document::new(templates.layout()?)
        .fill(Placeholder::SiteName, &site.name)
        .fill(Placeholder::Template, templates.get(post.template())?)
        .fill(Placeholder::Tags, &tag_links(&post.tags))
        .fill(Placeholder::PublishDate, post.publish_date.as_str())
        .fill(Placeholder::Title, &page_title(site, Some(post.title.as_str())))
        .fill(Placeholder::Prev, &nav("prev-post", "Previous", site.older(post)))
        .fill(Placeholder::Next, &nav("next-post", "Next", site.newer(post)))
        .fill(Placeholder::Content, &markdown::to_html(&post.meta.body))
        .into_string();
    Ok(Output::at_dir(post.filename(), html))
}

/// Renders `archive/index.html`: every post, newest first.
pub fn render_archive(site: &Site, templates: &Templates) -> template::Result<Output> {
    let html = Document::new(templates.layout()?)
        .fill(Placeholder::SiteName, &site.name)
        .fill(Placeholder::Template, templates.get(ARCHIVE_TEMPLATE)?)
        .fill(Placeholder::Title, &page_title(site, Some("Archive")))
        .fill(Placeholder::Posts, &post_list(site.posts.iter()))
        .into_string();
    Ok(Output::at_dir("archive", html))
}

/// Renders `tags/index.html`: every tag, alphabetically.
pub fn render_tag_archive(site: &Site, templates: &Templates) -> template::Result<Output> {
    let tags: String = site
        .tags
        .tags()
        .map(|tag| format!("<li>{}</li>\n", tag_link(tag)))
        .collect();
    let html = Document::new(templates.layout()?)
        .fill(Placeholder::SiteName, &site.name)
        .fill(Placeholder::Template, templates.get(TAG_ARCHIVE_TEMPLATE)?)
        .fill(Placeholder::Title, &page_title(site, Some("Tags")))
        .fill(Placeholder::Tags, &tags)
        .into_string();
    Ok(Output::at_dir("tags", html))
}

/// Renders `tag/<tag>/index.html`: the posts carrying `tag` in tag-index
/// order (ascending post index, i.e. newest first).
pub fn render_tag(tag: &str, site: &Site, templates: &Templates) -> template::Result<Output> {
    let html = Document::new(templates.layout()?)
        .fill(Placeholder::SiteName, &site.name)
        .fill(Placeholder::Template, templates.get(TAGGED_TEMPLATE)?)
        .fill(Placeholder::Title, &page_title(site, Some(format!("Tag: {}", tag).as_str())))
        .fill(Placeholder::Tag, tag)
        .fill(Placeholder::Posts, &post_list(site.tagged(tag)))
        .into_string();
    Ok(Output::at_dir(Path::new("tag").join(tag), html))
}

/// Writes [`Output`]s beneath an output directory, creating parent
/// directories as needed. Existing files are overwritten in place.
pub struct Writer<'a> {
    /// The root of the generated site.
    output_directory: &'a Path,

    /// Directories already created during this build.
    seen_dirs: HashSet<PathBuf>,

    /// Every file written, in write order.
    written: Vec<PathBuf>,
}

impl<'a> Writer<'a> {
    pub fn new(output_directory: &'a Path) -> Writer<'a> {
        Writer {
            output_directory,
            seen_dirs: HashSet::new(),
            written: Vec::new(),
        }
    }

    /// Writes a single [`Output`] to disk.
    pub fn write(&mut self, output: &Output) -> Result<()> {
        let path = self.output_directory.join(&output.path);
        if let Some(dir) = path.parent() {
            if self.seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir).map_err(|err| Error::Io {
                    path: dir.to_owned(),
                    err,
                })?;
            }
        }
        std::fs::write(&path, &output.html).map_err(|err| Error::Io {
            path: path.clone(),
            err,
        })?;
        log::debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    /// Renders with `render` and writes the result.
    pub fn render<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce() -> template::Result<Output>,
    {
        let output = render()?;
        self.write(&output)
    }

    /// Consumes the writer, returning every path it wrote.
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(template::Error),

    /// An error writing the output files.
    Io { path: PathBuf, err: io::Error },
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible template operations.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser;
    use crate::post::Indexer;
    use crate::template::LAYOUT;

    fn templates() -> Templates {
        vec![
            (
                LAYOUT,
                "<title>{{ title }}</title><h1>{{ site_name }}</h1>{{ template }}",
            ),
            (
                "post.html",
                "<article>{{ tags }}|{{ publish_date }}|{{ prev }}|{{ next }}|{{ content }}</article>",
            ),
            ("page.html", "<section>{{ content }}</section>"),
            ("archive.html", "<ul>{{ posts }}</ul>"),
            ("tag_archive.html", "<ul>{{ tags }}</ul>"),
            ("tagged.html", "<h2>{{ tag }}</h2><ul>{{ posts }}</ul>"),
        ]
        .into_iter()
        .collect()
    }

    fn post(title: &str, date: &str, tags: &str) -> String {
        format!(
            "---\ntitle: \"{}\"\npublish_date: \"{}\"\ntemplate: \"post.html\"\ntags: {}\n---\n{} body\n",
            title, date, tags, title
        )
    }

    fn site(files: &[(&str, &str)]) -> Site {
        let mut indexer = Indexer::new();
        for (name, source) in files {
            indexer.add(name, parser::parse(name, source));
        }
        let (site, skipped) = indexer.finish("Blog");
        assert!(skipped.is_empty(), "{:?}", skipped);
        site
    }

    fn scenario() -> Site {
        let a = post("A", "2024-01-01", "[\"misc\"]");
        let b = post("B", "2024-01-02", "[\"misc\"]");
        site(&[
            ("a.md", a.as_str()),
            ("b.md", b.as_str()),
            ("index.md", "---\n---\nWelcome\n\n{{ posts }}\n"),
        ])
    }

    #[test]
    fn test_index_page_uses_content_slot_and_lists_posts() -> template::Result<()> {
        let site = scenario();
        let out = render_page(&site.pages[0], &site, &templates())?;
        assert_eq!(PathBuf::from("index.html"), out.path);
        assert_eq!(
            concat!(
                "<title>Blog</title><h1>Blog</h1><p>Welcome</p>\n",
                "<p><li><a href=\"/b/\">2024-01-02 - B</a></li>\n",
                "<li><a href=\"/a/\">2024-01-01 - A</a></li>\n",
                "</p>\n",
            ),
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_page_with_template_and_title() -> template::Result<()> {
        let site = site(&[(
            "about.md",
            "---\ntitle: \"About\"\ntemplate: \"page.html\"\n---\nHi\n",
        )]);
        let out = render_page(&site.pages[0], &site, &templates())?;
        assert_eq!(PathBuf::from("about/index.html"), out.path);
        assert_eq!(
            "<title>About - Blog</title><h1>Blog</h1><section><p>Hi</p>\n</section>",
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_non_index_page_leaves_posts_placeholder() -> template::Result<()> {
        let site = site(&[("other.md", "---\n---\n{{ posts }}\n")]);
        let out = render_page(&site.pages[0], &site, &templates())?;
        assert!(out.html.contains("{{ posts }}"));
        Ok(())
    }

    #[test]
    fn test_page_missing_template() {
        let site = site(&[("x.md", "---\ntemplate: \"nope.html\"\n---\n")]);
        match render_page(&site.pages[0], &site, &templates()) {
            Err(template::Error::MissingTemplate(name)) => assert_eq!("nope.html", name),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_post_navigation() -> template::Result<()> {
        let (a, b, c) = (
            post("A", "2024-01-01", "[]"),
            post("B", "2024-01-02", "[]"),
            post("C", "2024-01-03", "[]"),
        );
        let site = site(&[("a.md", a.as_str()), ("b.md", b.as_str()), ("c.md", c.as_str())]);
        let templates = templates();

        let newest = render_post(&site.posts[0], &site, &templates)?;
        assert_eq!(PathBuf::from("c/index.html"), newest.path);
        assert!(newest
            .html
            .contains("<div class=\"prev-post\">Previous: <a href=\"/b/\">B</a></div>|"));
        assert!(!newest.html.contains("next-post"));

        let middle = render_post(&site.posts[1], &site, &templates)?;
        assert!(middle.html.contains("Previous: <a href=\"/a/\">A</a>"));
        assert!(middle
            .html
            .contains("<div class=\"next-post\">Next: <a href=\"/c/\">C</a></div>"));

        let oldest = render_post(&site.posts[2], &site, &templates)?;
        assert!(!oldest.html.contains("prev-post"));
        assert!(oldest.html.contains("Next: <a href=\"/b/\">B</a>"));
        Ok(())
    }

    #[test]
    fn test_post_fields() -> template::Result<()> {
        let p = post("Hello", "2024-03-04", "[\"rust\", \"misc\"]");
        let site = site(&[("hello.md", p.as_str())]);
        let out = render_post(&site.posts[0], &site, &templates())?;
        assert_eq!(
            concat!(
                "<title>Hello - Blog</title><h1>Blog</h1><article>",
                "<a href=\"/tag/rust/\">rust</a>, <a href=\"/tag/misc/\">misc</a>",
                "|2024-03-04|||<p>Hello body</p>\n</article>",
            ),
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_post_without_tags() -> template::Result<()> {
        let p = post("Lonely", "2024-03-04", "[]");
        let site = site(&[("lonely.md", p.as_str())]);
        let out = render_post(&site.posts[0], &site, &templates())?;
        assert!(out.html.contains("<article>no tags|"));
        Ok(())
    }

    #[test]
    fn test_post_body_placeholders_untouched() -> template::Result<()> {
        let p = "---\ntitle: \"T\"\npublish_date: \"2024-01-01\"\ntemplate: \"post.html\"\n---\n{{ title }}\n";
        let site = site(&[("t.md", p)]);
        let out = render_post(&site.posts[0], &site, &templates())?;
        assert!(out.html.contains("<p>{{ title }}</p>"));
        Ok(())
    }

    #[test]
    fn test_archive() -> template::Result<()> {
        let site = scenario();
        let out = render_archive(&site, &templates())?;
        assert_eq!(PathBuf::from("archive/index.html"), out.path);
        assert_eq!(
            concat!(
                "<title>Archive - Blog</title><h1>Blog</h1><ul>",
                "<li><a href=\"/b/\">2024-01-02 - B</a></li>\n",
                "<li><a href=\"/a/\">2024-01-01 - A</a></li>\n",
                "</ul>",
            ),
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_tag_archive_is_alphabetical() -> template::Result<()> {
        let p = post("P", "2024-01-01", "[\"zig\", \"ada\", \"go\"]");
        let site = site(&[("p.md", p.as_str())]);
        let out = render_tag_archive(&site, &templates())?;
        assert_eq!(PathBuf::from("tags/index.html"), out.path);
        assert_eq!(
            concat!(
                "<title>Tags - Blog</title><h1>Blog</h1><ul>",
                "<li><a href=\"/tag/ada/\">ada</a></li>\n",
                "<li><a href=\"/tag/go/\">go</a></li>\n",
                "<li><a href=\"/tag/zig/\">zig</a></li>\n",
                "</ul>",
            ),
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_tag_page_lists_newest_first() -> template::Result<()> {
        let site = scenario();
        let out = render_tag("misc", &site, &templates())?;
        assert_eq!(PathBuf::from("tag/misc/index.html"), out.path);
        assert_eq!(
            concat!(
                "<title>Tag: misc - Blog</title><h1>Blog</h1><h2>misc</h2><ul>",
                "<li><a href=\"/b/\">2024-01-02 - B</a></li>\n",
                "<li><a href=\"/a/\">2024-01-01 - A</a></li>\n",
                "</ul>",
            ),
            out.html
        );
        Ok(())
    }

    #[test]
    fn test_writer_creates_directories() -> Result<()> {
        let dir = tempfile::TempDir::new().unwrap();
        let mut writer = Writer::new(dir.path());
        writer.write(&Output {
            path: PathBuf::from("tag/misc/index.html"),
            html: String::from("<p>hi</p>"),
        })?;
        writer.write(&Output {
            path: PathBuf::from("tag/misc/index.html"),
            html: String::from("<p>again</p>"),
        })?;

        let path = dir.path().join("tag/misc/index.html");
        assert_eq!("<p>again</p>", std::fs::read_to_string(&path).unwrap());
        assert_eq!(vec![path.clone(), path], writer.into_written());
        Ok(())
    }
}
