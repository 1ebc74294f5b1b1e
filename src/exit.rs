//! Process exit codes, one per failure category.

pub const SUCCESS: i32 = 0;

/// The command line couldn't be understood.
pub const USAGE: i32 = 1;

/// The content, templates, or static directory is missing.
pub const MISSING_DIRECTORY: i32 = 2;

/// A site, page, or post to be created already exists.
pub const ALREADY_EXISTS: i32 = 3;

/// The site's project file couldn't be used.
pub const CONFIG: i32 = 4;

pub const TEMPLATE: i32 = 5;
pub const IO: i32 = 6;
