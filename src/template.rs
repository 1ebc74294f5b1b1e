//! Literal placeholder substitution and theme loading.
//!
//! Templates are plain HTML containing placeholders of the form
//! `{{ name }}`. There is no template language: a [`Document`] starts as the
//! layout text and each call to [`Document::fill`] replaces every occurrence
//! of one placeholder with a string. Placeholders nobody fills are left in
//! the output untouched.
//!
//! Fill order is part of the contract. Every renderer fills `site_name`
//! first, then `template`, then `title`, then its own fields, and `content`
//! wherever its page kind requires. Filling `template` with a fragment
//! introduces that fragment's placeholders (usually `{{ content }}`) into the
//! document, so those must be filled afterwards. Text substituted later in
//! the sequence is never rescanned for placeholders already filled.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The file name of the outer page layout.
pub const LAYOUT: &str = "layout.html";

/// The placeholders recognized across layouts and fragments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    SiteName,
    Template,
    Content,
    Title,
    Posts,
    Tags,
    Tag,
    PublishDate,
    Prev,
    Next,
}

impl Placeholder {
    /// The name between the braces.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::SiteName => "site_name",
            Placeholder::Template => "template",
            Placeholder::Content => "content",
            Placeholder::Title => "title",
            Placeholder::Posts => "posts",
            Placeholder::Tags => "tags",
            Placeholder::Tag => "tag",
            Placeholder::PublishDate => "publish_date",
            Placeholder::Prev => "prev",
            Placeholder::Next => "next",
        }
    }

    /// The literal text as it appears in a template, e.g. `{{ title }}`.
    pub fn token(self) -> String {
        format!("{{{{ {} }}}}", self.name())
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies `substitutions` to `text` in slice order. See the module docs for
/// why order matters.
pub fn substitute(text: &str, substitutions: &[(Placeholder, &str)]) -> String {
    substitutions
        .iter()
        .fold(Document::new(text), |doc, (placeholder, value)| {
            doc.fill(*placeholder, value)
        })
        .into_string()
}

/// An HTML document in the middle of being filled.
#[derive(Clone, Debug)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: &str) -> Document {
        Document {
            text: text.to_owned(),
        }
    }

    /// Replaces every occurrence of `placeholder` with `value`.
    pub fn fill(mut self, placeholder: Placeholder, value: &str) -> Document {
        let token = placeholder.token();
        if self.text.contains(&token) {
            self.text = self.text.replace(&token, value);
        }
        self
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Every file from a site's `templates/` directory, keyed by its path
/// relative to that directory with `/` separators (e.g. `post.html` or
/// `partials/nav.html`).
#[derive(Clone, Debug, Default)]
pub struct Templates {
    files: HashMap<String, String>,
}

impl Templates {
    /// Reads every file under `dir`. Fails if [`LAYOUT`] is absent since no
    /// page can be rendered without it.
    pub fn load(dir: &Path) -> Result<Templates> {
        let mut files = HashMap::new();
        for result in WalkDir::new(dir).sort_by_file_name() {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }

            // strip_prefix() shouldn't fail since `dir` is the walk root
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let contents = std::fs::read_to_string(entry.path()).map_err(|err| Error::Io {
                path: entry.path().to_owned(),
                err,
            })?;
            log::debug!("Loaded template `{}`", key);
            files.insert(key, contents);
        }

        let templates = Templates { files };
        templates.layout()?;
        Ok(templates)
    }

    /// Looks up a template by name.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.files
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingTemplate(name.to_owned()))
    }

    /// Shorthand for `get(LAYOUT)`.
    pub fn layout(&self) -> Result<&str> {
        self.get(LAYOUT)
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for Templates {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Templates {
        Templates {
            files: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or looking up templates.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template is referenced but no such file exists in the
    /// templates directory.
    MissingTemplate(String),

    /// Returned when a template file can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when the templates directory can't be walked.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingTemplate(name) => write!(f, "template `{}` not found", name),
            Error::Io { path, err } => {
                write!(f, "reading template file '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingTemplate(_) => None,
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the templates directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
