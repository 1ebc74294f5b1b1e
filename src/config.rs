//! Resolves the directories and settings for building one site.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// The optional per-site settings file, relative to the site directory.
pub const PROJECT_FILE: &str = "dssb.yaml";

pub const CONTENT_DIR: &str = "content";
pub const TEMPLATES_DIR: &str = "templates";
pub const STATIC_DIR: &str = "static";
pub const OUTPUT_DIR: &str = "build";

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    /// Overrides the site name derived from the directory name.
    #[serde(default)]
    name: Option<String>,

    /// Overrides the output directory, relative to the site directory.
    #[serde(default)]
    output: Option<PathBuf>,
}

/// Where a site's sources live and where its output goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub site_name: String,
    pub site_directory: PathBuf,
    pub content_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub static_output_directory: PathBuf,
}

impl Config {
    /// Builds a [`Config`] for the site rooted at `dir`. The site name is the
    /// directory's final component unless [`PROJECT_FILE`] says otherwise.
    /// The directories themselves aren't checked here.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let site_directory = absolute(dir)?;
        let project = Self::load_project(&site_directory)?;

        let site_name = match project.name {
            Some(name) => name,
            None => site_directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    anyhow!(
                        "Can't derive a site name from '{}'; set `name` in {}",
                        site_directory.display(),
                        PROJECT_FILE
                    )
                })?,
        };
        let output_directory = resolve(
            &site_directory.join(project.output.unwrap_or_else(|| PathBuf::from(OUTPUT_DIR))),
        );

        let config = Config {
            site_name,
            content_directory: site_directory.join(CONTENT_DIR),
            templates_directory: site_directory.join(TEMPLATES_DIR),
            static_source_directory: site_directory.join(STATIC_DIR),
            static_output_directory: output_directory.join(STATIC_DIR),
            output_directory,
            site_directory,
        };
        config.check_output()?;
        Ok(config)
    }

    // The output directory is deleted by `build --clean` and written into by
    // every build, so it may not overlap the site directory itself or any of
    // the source directories.
    fn check_output(&self) -> Result<()> {
        let output = &self.output_directory;
        if self.site_directory.starts_with(output) {
            bail!(
                "Output directory '{}' must not be the site directory or one of its parents",
                output.display()
            );
        }
        for source in &[
            &self.content_directory,
            &self.templates_directory,
            &self.static_source_directory,
        ] {
            if source.starts_with(output) || output.starts_with(source) {
                bail!(
                    "Output directory '{}' overlaps source directory '{}'",
                    output.display(),
                    source.display()
                );
            }
        }
        Ok(())
    }

    fn load_project(site_directory: &Path) -> Result<Project> {
        let path = site_directory.join(PROJECT_FILE);
        if !path.is_file() {
            return Ok(Project::default());
        }
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        serde_yaml::from_reader(file)
            .map_err(|e| anyhow!("Loading configuration '{}': {}", path.display(), e))
    }
}

// Resolves `.` and `..` in `path`, following symlinks when it exists.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

// Resolves `dir` against the working directory, following symlinks and `..`
// when the directory exists.
fn absolute(dir: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = dir.canonicalize() {
        return Ok(canonical);
    }
    if dir.is_absolute() {
        Ok(dir.to_owned())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}
