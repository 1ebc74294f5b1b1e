//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing and indexing the content
//! files ([`crate::parser`], [`crate::post`]), rendering posts, pages,
//! archives and tag pages ([`crate::write`]), and copying the static source
//! directory into the static output directory.
//!
//! Every build starts from scratch. Output files are overwritten in place;
//! nothing from a previous build is read.

use crate::config::Config;
use crate::exit;
use crate::parser;
use crate::post::{Indexer, Site, Skipped};
use crate::template::{self, Templates};
use crate::write::{
    self, render_archive, render_page, render_post, render_tag, render_tag_archive, Writer,
};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = ".md";

/// What a successful build produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The root of the generated site.
    pub output_directory: PathBuf,

    pub posts: usize,
    pub pages: usize,
    pub tags: usize,

    /// Number of files copied from the static source directory.
    pub static_files: usize,

    /// Every HTML file written, in write order.
    pub written: Vec<PathBuf>,

    /// Content files left out because their metadata was unusable.
    pub skipped: Vec<Skipped>,
}

/// Builds the site described by `config`:
///
/// 1. check that the content, templates, and static directories exist
/// 2. parse every content file's metadata, skipping (and reporting) bad ones
/// 3. sort and index the posts
/// 4. render every post, then every page
/// 5. render the archive, the tag index, and one page per tag
/// 6. copy the static directory into the output directory
///
/// Missing directories, missing templates, and I/O failures abort the build;
/// whatever was already written stays on disk.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    for (kind, path) in [
        ("content", &config.content_directory),
        ("templates", &config.templates_directory),
        ("static", &config.static_source_directory),
    ]
    .iter()
    {
        if !path.is_dir() {
            return Err(Error::MissingDirectory {
                kind: *kind,
                path: path.to_path_buf(),
            });
        }
    }

    log::info!("Collecting site metadata...");
    let (site, skipped) = collect(config)?;
    let templates = Templates::load(&config.templates_directory)?;

    let mut writer = Writer::new(&config.output_directory);

    log::info!("Building pages...");
    for post in site.posts.iter() {
        writer.render(|| render_post(post, &site, &templates))?;
    }
    for page in site.pages.iter() {
        writer.render(|| render_page(page, &site, &templates))?;
    }

    log::info!("Building archives and tags...");
    writer.render(|| render_archive(&site, &templates))?;
    writer.render(|| render_tag_archive(&site, &templates))?;
    for tag in site.tags.tags() {
        writer.render(|| render_tag(tag, &site, &templates))?;
    }

    log::info!("Building static files...");
    let static_files = copy_dir(
        &config.static_source_directory,
        &config.static_output_directory,
    )?;

    Ok(BuildReport {
        output_directory: config.output_directory.clone(),
        posts: site.posts.len(),
        pages: site.pages.len(),
        tags: site.tags.len(),
        static_files,
        written: writer.into_written(),
        skipped,
    })
}

/// Deletes the output directory. A missing directory is not an error.
pub fn clean(config: &Config) -> Result<()> {
    rmdir(&config.output_directory)
}

// Parses every Markdown file directly inside the content directory, in file
// name order, and indexes the results.
fn collect(config: &Config) -> Result<(Site, Vec<Skipped>)> {
    let mut entries = Vec::new();
    for result in std::fs::read_dir(&config.content_directory)? {
        let entry = result?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_file() && file_name.ends_with(MARKDOWN_EXTENSION) {
            entries.push((file_name, entry.path()));
        } else {
            log::debug!("Ignoring {}", entry.path().display());
        }
    }
    entries.sort();

    let mut indexer = Indexer::new();
    for (file_name, path) in entries {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Error::Annotated(format!("reading content file `{}`", file_name), Box::new(e.into()))
        })?;
        indexer.add(&file_name, parser::parse(&file_name, &contents));
    }
    Ok(indexer.finish(&config.site_name))
}

// Copies `src` into `dst`, merging with whatever `dst` already holds. Returns
// the number of files copied.
fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for result in WalkDir::new(src).sort_by_file_name() {
        let entry = result?;
        // strip_prefix() shouldn't fail since `src` is the walk root
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            log::debug!("Copied {}", target.display());
            copied += 1;
        }
    }
    Ok(copied)
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be a missing site
/// directory, template problems, failures writing output, cleaning the output
/// directory, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when one of the required site directories is absent.
    MissingDirectory { kind: &'static str, path: PathBuf },

    /// Returned for errors loading or looking up templates.
    Template(template::Error),

    /// Returned for errors writing rendered pages to disk.
    Write(write::Error),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl Error {
    /// The process exit code for this error. Annotations are looked through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingDirectory { .. } => exit::MISSING_DIRECTORY,
            Error::Template(_) => exit::TEMPLATE,
            Error::Annotated(_, err) => err.exit_code(),
            Error::Write(_) | Error::Clean { .. } | Error::WalkDir(_) | Error::Io(_) => exit::IO,
        }
    }
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDirectory { kind, path } => write!(
                f,
                "{} directory not found: '{}'",
                kind,
                path.display()
            ),
            Error::Template(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingDirectory { .. } => None,
            Error::Template(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<template::Error> for Error {
    /// Converts [`template::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. A template error raised
    /// while rendering stays a template error.
    fn from(err: write::Error) -> Error {
        match err {
            write::Error::Template(err) => Error::Template(err),
            err => Error::Write(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
