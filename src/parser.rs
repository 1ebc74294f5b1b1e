//! Defines the [`Metadata`] and [`Error`] types along with [`parse`], which
//! splits a content file into its metadata header and its Markdown body.
//!
//! A content file is structured as follows:
//!
//! 1. Initial metadata fence (`---`)
//! 2. Zero or more `key: <JSON value>` lines
//! 3. Terminal metadata fence (`---`)
//! 4. Markdown body
//!
//! For example:
//!
//! ```md
//! ---
//! title: "Hello, world!"
//! publish_date: "2024-01-02"
//! template: "post.html"
//! tags: ["greet"]
//! ---
//! # Hello
//!
//! World
//! ```

use serde_json::{Map, Value};
use std::fmt;

/// The line which opens and closes the metadata block.
const FENCE: &str = "---";

/// The parsed header of a single content file.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    /// The source file name less its final extension (e.g., `hello.md` is
    /// `hello` and `v1.2.md` is `v1.2`). Unique across the site since it is
    /// derived from names within a single directory.
    pub filename: String,

    /// The header fields in the order they were declared.
    pub fields: Map<String, Value>,

    /// Everything after the terminal fence.
    pub body: String,
}

impl Metadata {
    /// Looks up a header field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` when the metadata block was present but declared no
    /// fields (the fence was closed immediately).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strips the final extension segment from `file_name`. Dots elsewhere in the
/// name are preserved.
pub fn stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(i) => &file_name[..i],
        None => file_name,
    }
}

/// Parses the metadata block of a content file named `file_name` whose
/// contents are `input`. Each line between the fences is split on its first
/// colon; the left side is the key and the right side must be a JSON literal.
pub fn parse(file_name: &str, input: &str) -> Result<Metadata> {
    // The stem becomes an output directory name, so it must stay a single
    // path segment beneath the output directory.
    let filename = stem(file_name);
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(|c| c == '/' || c == '\\')
    {
        return Err(Error::InvalidFileName(file_name.to_owned()));
    }

    let mut lines = input.split_inclusive('\n');
    let mut consumed = match lines.next() {
        Some(line) if line.trim() == FENCE => line.len(),
        _ => return Err(Error::MissingStartFence),
    };

    let mut fields = Map::new();
    loop {
        let raw = lines.next().ok_or(Error::MissingEndFence)?;
        consumed += raw.len();

        let line = raw.trim();
        if line == FENCE {
            break;
        }

        let (key, value) = line.split_once(':').ok_or_else(|| Error::MissingColon {
            line: line.to_owned(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::EmptyKey {
                line: line.to_owned(),
            });
        }

        let value: Value =
            serde_json::from_str(value.trim()).map_err(|err| Error::InvalidJson {
                key: key.to_owned(),
                err,
            })?;
        fields.insert(key.to_owned(), value);
    }

    Ok(Metadata {
        filename: filename.to_owned(),
        fields,
        body: input[consumed..].to_owned(),
    })
}

/// Represents the result of a metadata-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a reason for rejecting a content file's metadata.
#[derive(Debug)]
pub enum Error {
    /// Returned when the file name's stem is empty, `.`, or `..` (e.g.,
    /// `.md` or `...md`), or contains a path separator.
    InvalidFileName(String),

    /// Returned when the first line of the file isn't a metadata fence.
    MissingStartFence,

    /// Returned when the end of the file is reached before the terminal
    /// metadata fence.
    MissingEndFence,

    /// Returned when a metadata line has no `:` separator.
    MissingColon { line: String },

    /// Returned when a metadata line has nothing before its `:` separator.
    EmptyKey { line: String },

    /// Returned when the value of a metadata line isn't valid JSON.
    InvalidJson { key: String, err: serde_json::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFileName(name) => {
                write!(f, "invalid file name: {:?}", name)
            }
            Error::MissingStartFence => {
                write!(f, "no metadata fence: file must begin with `---`")
            }
            Error::MissingEndFence => write!(f, "missing closing `---`"),
            Error::MissingColon { line } => {
                write!(f, "malformed metadata line (no `:`): {:?}", line)
            }
            Error::EmptyKey { line } => {
                write!(f, "malformed metadata line (empty key): {:?}", line)
            }
            Error::InvalidJson { key, err } => {
                write!(f, "value for `{}` is not valid JSON: {}", key, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson { key: _, err } => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fields_and_body() -> Result<()> {
        let meta = parse(
            "hello.md",
            "---\ntitle: \"Hello\"\npublish_date: \"2024-01-02\"\n---\n# Hi\n",
        )?;
        assert_eq!("hello", meta.filename);
        assert_eq!(Some(&json!("Hello")), meta.get("title"));
        assert_eq!(Some(&json!("2024-01-02")), meta.get("publish_date"));
        assert_eq!("# Hi\n", meta.body);
        Ok(())
    }

    #[test]
    fn test_parse_preserves_value_types() -> Result<()> {
        let meta = parse(
            "typed.md",
            concat!(
                "---\n",
                "tags: [\"a\", \"b\"]\n",
                "count: 3\n",
                "ratio: 0.5\n",
                "draft: false\n",
                "extra: {\"nested\": [1, null]}\n",
                "---\n",
            ),
        )?;
        assert_eq!(Some(&json!(["a", "b"])), meta.get("tags"));
        assert_eq!(Some(&json!(3)), meta.get("count"));
        assert_eq!(Some(&json!(0.5)), meta.get("ratio"));
        assert_eq!(Some(&json!(false)), meta.get("draft"));
        assert_eq!(Some(&json!({"nested": [1, null]})), meta.get("extra"));

        let keys: Vec<&str> = meta.fields.keys().map(String::as_str).collect();
        assert_eq!(vec!["tags", "count", "ratio", "draft", "extra"], keys);
        Ok(())
    }

    #[test]
    fn test_parse_splits_on_first_colon() -> Result<()> {
        let meta = parse("colon.md", "---\ntitle: \"a: b: c\"\n---\n")?;
        assert_eq!(Some(&json!("a: b: c")), meta.get("title"));
        Ok(())
    }

    #[test]
    fn test_parse_empty_block() -> Result<()> {
        let meta = parse("empty.md", "---\n---\nbody")?;
        assert!(meta.is_empty());
        assert_eq!("body", meta.body);
        Ok(())
    }

    #[test]
    fn test_parse_is_deterministic() -> Result<()> {
        let input = "---\ntitle: \"Same\"\ntags: [\"x\"]\n---\ntext\n";
        assert_eq!(parse("same.md", input)?, parse("same.md", input)?);
        Ok(())
    }

    #[test]
    fn test_parse_crlf_line_endings() -> Result<()> {
        let meta = parse("dos.md", "---\r\ntitle: \"Dos\"\r\n---\r\nbody\r\n")?;
        assert_eq!(Some(&json!("Dos")), meta.get("title"));
        assert_eq!("body\r\n", meta.body);
        Ok(())
    }

    #[test]
    fn test_parse_missing_start_fence() {
        match parse("bare.md", "# Just markdown\n") {
            Err(Error::MissingStartFence) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_end_fence() {
        match parse("open.md", "---\ntitle: \"Open\"\n") {
            Err(Error::MissingEndFence) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_colon() {
        match parse("nocolon.md", "---\ntitle \"x\"\n---\n") {
            Err(Error::MissingColon { line }) => assert_eq!("title \"x\"", line),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_blank_line_in_block() {
        match parse("blank.md", "---\ntitle: \"x\"\n\n---\n") {
            Err(Error::MissingColon { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        match parse("bad.md", "---\ntitle: Unquoted\n---\n") {
            Err(Error::InvalidJson { key, .. }) => assert_eq!("title", key),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_key() {
        match parse("nokey.md", "---\n: 1\n---\n") {
            Err(Error::EmptyKey { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_extension_only_name() {
        match parse(".md", "---\n---\n") {
            Err(Error::InvalidFileName(name)) => assert_eq!(".md", name),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_dot_stems() {
        for name in &["...md", "..md", "a/b.md"] {
            match parse(name, "---\n---\n") {
                Err(Error::InvalidFileName(rejected)) => assert_eq!(*name, rejected),
                other => panic!("unexpected result for {}: {:?}", name, other),
            }
        }
        assert!(parse("v1..2.md", "---\n---\n").is_ok());
    }

    #[test]
    fn test_stem() {
        assert_eq!("hello", stem("hello.md"));
        assert_eq!("v1.2", stem("v1.2.md"));
        assert_eq!("README", stem("README"));
    }
}
