//! Creates new sites and new content files from the defaults bundled into
//! the binary.

use crate::exit;
use crate::template::{self, Placeholder};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The starter site written by [`new_site`], relative to the site root.
const SITE_FILES: &[(&str, &str)] = &[
    ("content/index.md", include_str!("../defaults/content/index.md")),
    ("content/about.md", include_str!("../defaults/content/about.md")),
    (
        "content/hello-world.md",
        include_str!("../defaults/content/hello-world.md"),
    ),
    ("templates/layout.html", include_str!("../defaults/templates/layout.html")),
    ("templates/post.html", include_str!("../defaults/templates/post.html")),
    ("templates/page.html", include_str!("../defaults/templates/page.html")),
    ("templates/archive.html", include_str!("../defaults/templates/archive.html")),
    (
        "templates/tag_archive.html",
        include_str!("../defaults/templates/tag_archive.html"),
    ),
    ("templates/tagged.html", include_str!("../defaults/templates/tagged.html")),
    ("static/style.css", include_str!("../defaults/static/style.css")),
];

const NEW_PAGE: &str = include_str!("../defaults/new_page.md");
const NEW_POST: &str = include_str!("../defaults/new_post.md");

/// Creates the directory `parent/name` and fills it with a starter site.
/// Fails without writing anything if the directory already exists.
pub fn new_site(parent: &Path, name: &str) -> Result<PathBuf> {
    let root = parent.join(name);
    if root.exists() {
        return Err(Error::AlreadyExists(root));
    }
    for (relative, contents) in SITE_FILES {
        write_new(&root.join(relative), contents)?;
    }
    log::info!("Initialized new site {}", name);
    Ok(root)
}

/// Writes a page skeleton to `path`.
pub fn new_page(path: &Path) -> Result<()> {
    write_new(path, NEW_PAGE)
}

/// Writes a post skeleton dated `today` to `path`.
pub fn new_post(path: &Path, today: chrono::NaiveDate) -> Result<()> {
    let date = today.format("%Y-%m-%d").to_string();
    let contents = template::substitute(NEW_POST, &[(Placeholder::PublishDate, &date)]);
    write_new(path, &contents)
}

// Creates `path` (and its parent directories) and writes `contents`, refusing
// to replace an existing file.
fn write_new(path: &Path, contents: &str) -> Result<()> {
    let annotate = |err: io::Error| match err.kind() {
        io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_owned()),
        _ => Error::Io {
            path: path.to_owned(),
            err,
        },
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(annotate)?;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents.as_bytes()))
        .map_err(annotate)?;
    log::debug!("Created {}", path.display());
    Ok(())
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a site or content file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the target directory or file already exists.
    AlreadyExists(PathBuf),

    /// Returned for other I/O errors, e.g. permission denied.
    Io { path: PathBuf, err: io::Error },
}

impl Error {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AlreadyExists(_) => exit::ALREADY_EXISTS,
            Error::Io { .. } => exit::IO,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyExists(path) => write!(f, "'{}' already exists", path.display()),
            Error::Io { path, err } => write!(f, "writing '{}': {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::AlreadyExists(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser;
    use tempfile::TempDir;

    #[test]
    fn test_new_site() -> Result<()> {
        let parent = TempDir::new().unwrap();
        let root = new_site(parent.path(), "blog")?;
        assert_eq!(parent.path().join("blog"), root);
        for dir in &["content", "templates", "static"] {
            assert!(root.join(dir).is_dir(), "missing {}", dir);
        }
        assert!(root.join("templates").join("layout.html").is_file());
        Ok(())
    }

    #[test]
    fn test_new_site_refuses_existing_directory() {
        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("blog")).unwrap();
        match new_site(parent.path(), "blog") {
            Err(err @ Error::AlreadyExists(_)) => {
                assert_eq!(exit::ALREADY_EXISTS, err.exit_code());
                assert_eq!(
                    format!("'{}' already exists", parent.path().join("blog").display()),
                    err.to_string()
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!parent.path().join("blog").join("content").exists());
    }

    #[test]
    fn test_default_content_parses() {
        for (relative, contents) in SITE_FILES.iter().filter(|(p, _)| p.ends_with(".md")) {
            assert!(parser::parse(relative, contents).is_ok(), "{}", relative);
        }
    }

    #[test]
    fn test_io_exit_code() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        match new_page(&blocker.join("sub").join("page.md")) {
            Err(err @ Error::Io { .. }) => assert_eq!(exit::IO, err.exit_code()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_new_post_is_dated() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("first.md");
        let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        new_post(&path, today)?;

        let meta = parser::parse("first.md", &fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(Some(&serde_json::json!("2024-05-06")), meta.get("publish_date"));
        assert_eq!(Some(&serde_json::json!("post.html")), meta.get("template"));
        Ok(())
    }

    #[test]
    fn test_new_page_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("about.md");
        fs::write(&path, "mine").unwrap();
        match new_page(&path) {
            Err(err @ Error::AlreadyExists(_)) => assert_eq!(exit::ALREADY_EXISTS, err.exit_code()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!("mine", fs::read_to_string(&path).unwrap());
    }
}
