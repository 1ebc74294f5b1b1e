//! The library code for the `dssb` static site generator. A site is a
//! directory holding `content/` (Markdown files with a metadata header),
//! `templates/` (HTML with `{{ placeholder }}` slots), and `static/` (assets
//! copied verbatim). Building it is a one-way pipeline:
//!
//! 1. Parsing each content file's metadata header ([`crate::parser`])
//! 2. Classifying files as posts or pages, sorting posts newest first, and
//!    indexing them by tag ([`crate::post`], [`crate::tag`])
//! 3. Rendering posts, pages, the archive, and tag pages into HTML
//!    ([`crate::write`], [`crate::template`], [`crate::markdown`])
//! 4. Copying static assets and reporting what happened ([`crate::build`])
//!
//! Content files whose metadata can't be used are skipped with a warning and
//! listed in the [`build::BuildReport`]; everything else that goes wrong
//! aborts the build.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod exit;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod scaffold;
pub mod tag;
pub mod template;
pub mod write;
