//! Defines the [`Post`], [`Page`], and [`Site`] types along with the
//! [`Indexer`], which partitions parsed content files into posts and pages,
//! sorts the posts newest first, and builds the [`TagIndex`].

use crate::parser::{self, Metadata};
use crate::tag::TagIndex;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt;

/// A content file whose `template` field is exactly this value is a post.
pub const POST_TEMPLATE: &str = "post.html";

/// The classification of a content file, decided once from its metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Post(Metadata),
    Page(Metadata),
}

impl Record {
    /// A record is a post iff its `template` field is the string
    /// [`POST_TEMPLATE`]; everything else is a page.
    pub fn classify(meta: Metadata) -> Record {
        match meta.get("template") {
            Some(Value::String(t)) if t == POST_TEMPLATE => Record::Post(meta),
            _ => Record::Page(meta),
        }
    }
}

/// Renders a metadata value as template text. Strings are used verbatim;
/// anything else is written as JSON.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A post's `publish_date`: the text as written, plus the point in time it
/// denotes, which is what posts are ordered by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishDate {
    text: String,
    value: NaiveDateTime,
}

impl PublishDate {
    /// The date exactly as written in the metadata.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }
}

impl std::str::FromStr for PublishDate {
    type Err = chrono::ParseError;

    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, or RFC 3339. Offsets
    /// are normalized to UTC.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            dt.naive_utc()
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            dt
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
            dt
        } else {
            NaiveDateTime::from(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
        };
        Ok(PublishDate {
            text: s.to_owned(),
            value,
        })
    }
}

impl fmt::Display for PublishDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A dated entry which appears in the archive and tag indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub meta: Metadata,
    pub title: String,
    pub publish_date: PublishDate,
    pub tags: Vec<String>,
    index: usize,
}

impl Post {
    /// Validates the fields a post needs for rendering. The index is assigned
    /// later by [`Indexer::finish`].
    pub fn from_metadata(meta: Metadata) -> Result<Post> {
        let title = field_text(meta.get("title").ok_or(Error::MissingField("title"))?);

        let publish_date = match meta.get("publish_date") {
            None => return Err(Error::MissingField("publish_date")),
            Some(Value::String(text)) => text.parse::<PublishDate>().map_err(|err| Error::InvalidDate {
                text: text.clone(),
                err,
            })?,
            Some(_) => {
                return Err(Error::InvalidField {
                    key: "publish_date",
                    expected: "a date string",
                })
            }
        };

        let tags = match meta.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| match v {
                    Value::String(tag) => validate_tag(tag),
                    _ => Err(Error::InvalidField {
                        key: "tags",
                        expected: "an array of strings",
                    }),
                })
                .collect::<Result<Vec<String>>>()?,
            Some(_) => {
                return Err(Error::InvalidField {
                    key: "tags",
                    expected: "an array of strings",
                })
            }
        };

        Ok(Post {
            meta,
            title,
            publish_date,
            tags,
            index: 0,
        })
    }

    /// Position in [`Site::posts`]: 0 is the most recent post.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn filename(&self) -> &str {
        &self.meta.filename
    }

    /// The post's fragment template (always [`POST_TEMPLATE`]).
    pub fn template(&self) -> &str {
        POST_TEMPLATE
    }
}

// Tags become output path segments (`tag/<tag>/index.html`), so anything that
// could escape that directory is rejected.
fn validate_tag(tag: &str) -> Result<String> {
    if tag.is_empty() || tag == "." || tag == ".." || tag.contains(|c| c == '/' || c == '\\') {
        return Err(Error::InvalidTag(tag.to_owned()));
    }
    Ok(tag.to_owned())
}

/// Any content file which isn't a post.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub meta: Metadata,
    pub title: Option<String>,
    pub template: Option<String>,
}

impl Page {
    pub fn from_metadata(meta: Metadata) -> Result<Page> {
        let template = match meta.get("template") {
            None | Some(Value::Null) => None,
            Some(Value::String(t)) => Some(t.clone()),
            Some(_) => {
                return Err(Error::InvalidField {
                    key: "template",
                    expected: "a template file name",
                })
            }
        };
        Ok(Page {
            title: meta.get("title").map(field_text),
            template,
            meta,
        })
    }

    pub fn filename(&self) -> &str {
        &self.meta.filename
    }
}

/// A content file left out of the build, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub file_name: String,
    pub reason: String,
}

/// Everything the renderers need to know about one build. Populated once by
/// [`Indexer::finish`] and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Site {
    /// The site's display name (substituted for `{{ site_name }}`).
    pub name: String,

    /// Posts ordered newest first; `posts[i].index() == i`.
    pub posts: Vec<Post>,

    /// Non-post content in discovery order.
    pub pages: Vec<Page>,

    /// Tag name to post indexes.
    pub tags: TagIndex,
}

impl Site {
    /// The posts carrying `tag`, in the order recorded by the [`TagIndex`].
    pub fn tagged(&self, tag: &str) -> impl Iterator<Item = &Post> {
        self.tags
            .get(tag)
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&i| self.posts.get(i))
    }

    /// The next-older post (index + 1), if any.
    pub fn older(&self, post: &Post) -> Option<&Post> {
        self.posts.get(post.index + 1)
    }

    /// The next-newer post (index - 1), if any.
    pub fn newer(&self, post: &Post) -> Option<&Post> {
        match post.index {
            0 => None,
            i => self.posts.get(i - 1),
        }
    }
}

/// Accumulates parsed content files, then sorts and indexes them into a
/// [`Site`]. Files that fail to parse or validate are recorded as
/// [`Skipped`] and never reach the site.
#[derive(Debug, Default)]
pub struct Indexer {
    posts: Vec<Post>,
    pages: Vec<Page>,
    skipped: Vec<Skipped>,
}

impl Indexer {
    pub fn new() -> Indexer {
        Indexer::default()
    }

    /// Classifies the result of parsing `file_name`. Call in discovery order;
    /// posts with equal dates keep the order they were added in.
    pub fn add(&mut self, file_name: &str, parsed: parser::Result<Metadata>) {
        let meta = match parsed {
            Ok(meta) => meta,
            Err(e) => return self.skip(file_name, &e),
        };
        if meta.is_empty() {
            log::debug!("`{}` has an empty metadata block", file_name);
        }

        match Record::classify(meta) {
            Record::Post(meta) => match Post::from_metadata(meta) {
                Ok(post) => self.posts.push(post),
                Err(e) => self.skip(file_name, &e),
            },
            Record::Page(meta) => match Page::from_metadata(meta) {
                Ok(page) => self.pages.push(page),
                Err(e) => self.skip(file_name, &e),
            },
        }
    }

    fn skip(&mut self, file_name: &str, reason: &dyn fmt::Display) {
        log::warn!("Failed to build page {}: {}", file_name, reason);
        self.skipped.push(Skipped {
            file_name: file_name.to_owned(),
            reason: reason.to_string(),
        });
    }

    /// Sorts posts newest first (stable), assigns each its index, and builds
    /// the tag index by appending every post's tags in ascending index order.
    pub fn finish(self, name: &str) -> (Site, Vec<Skipped>) {
        let Indexer {
            mut posts,
            pages,
            skipped,
        } = self;

        posts.sort_by(|a, b| b.publish_date.value.cmp(&a.publish_date.value));

        let mut tags = TagIndex::new();
        for (i, post) in posts.iter_mut().enumerate() {
            post.index = i;
            for tag in post.tags.iter() {
                tags.insert(tag, i);
            }
        }

        let site = Site {
            name: name.to_owned(),
            posts,
            pages,
            tags,
        };
        (site, skipped)
    }
}

/// The result of validating a classified record.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a reason a post or page record can't be rendered.
#[derive(Debug)]
pub enum Error {
    /// Returned when a required field is absent.
    MissingField(&'static str),

    /// Returned when a field holds the wrong kind of JSON value.
    InvalidField {
        key: &'static str,
        expected: &'static str,
    },

    /// Returned when `publish_date` isn't a recognized date.
    InvalidDate {
        text: String,
        err: chrono::ParseError,
    },

    /// Returned when a tag can't be used as a path segment.
    InvalidTag(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingField(key) => write!(f, "missing required field `{}`", key),
            Error::InvalidField { key, expected } => {
                write!(f, "field `{}` must be {}", key, expected)
            }
            Error::InvalidDate { text, err } => {
                write!(f, "invalid publish_date {:?}: {}", text, err)
            }
            Error::InvalidTag(tag) => write!(f, "invalid tag {:?}", tag),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidDate { text: _, err } => Some(err),
            _ => None,
        }
    }
}
