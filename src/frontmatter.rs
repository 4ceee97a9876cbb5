//! YAML frontmatter split/parse/render for vault notes.
//!
//! A note is annotatable only when it opens with a `---` line and a second
//! `---` line closes the header. Everything after the closing delimiter is the
//! body and is carried through a rewrite untouched.

use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub header: Mapping,
    pub body: String,
    pub line_ending: LineEnding,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.header.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.header.insert(Value::String(key.to_string()), value);
    }

    /// Removes `key` while keeping the remaining keys in their original order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let mut removed = None;
        self.header = std::mem::take(&mut self.header)
            .into_iter()
            .filter_map(|(k, v)| {
                if k.as_str() == Some(key) && removed.is_none() {
                    removed = Some(v);
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        removed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNote {
    NoHeader,
    Annotatable(Frontmatter),
}

/// Splits raw content into `(header_text, body, line_ending)`.
///
/// Returns `None` when the content does not start with a delimiter line or the
/// closing delimiter line is missing.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str, LineEnding)> {
    let (rest, line_ending) = if let Some(rest) = content.strip_prefix("---\n") {
        (rest, LineEnding::Lf)
    } else if let Some(rest) = content.strip_prefix("---\r\n") {
        (rest, LineEnding::CrLf)
    } else {
        return None;
    };

    let delimiter_line = format!("{}{}", DELIMITER, line_ending.as_str());
    if let Some(body) = rest.strip_prefix(delimiter_line.as_str()) {
        return Some(("", body, line_ending));
    }

    let closing = format!("{}{}", line_ending.as_str(), delimiter_line);
    let split_at = rest.find(&closing)?;
    let header = &rest[..(split_at + line_ending.as_str().len())];
    let body = &rest[(split_at + closing.len())..];
    Some((header, body, line_ending))
}

pub fn parse_note(content: &str) -> AppResult<ParsedNote> {
    let Some((header_text, body, line_ending)) = split_frontmatter(content) else {
        return Ok(ParsedNote::NoHeader);
    };

    let header = parse_header(header_text)?;
    Ok(ParsedNote::Annotatable(Frontmatter {
        header,
        body: body.to_string(),
        line_ending,
    }))
}

fn parse_header(header_text: &str) -> AppResult<Mapping> {
    if header_text.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(header_text).map_err(|error| AppError::MalformedHeader(error.to_string()))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(AppError::MalformedHeader(format!(
            "frontmatter is a {}, expected a mapping",
            value_kind(&other)
        ))),
    }
}

pub fn render_header(header: &Mapping) -> AppResult<String> {
    serde_yaml::to_string(header).map_err(|error| AppError::Serialize(error.to_string()))
}

/// Renders `delimiter + header + delimiter + body`, reusing the note's line ending.
pub fn render_note(frontmatter: &Frontmatter) -> AppResult<String> {
    let newline = frontmatter.line_ending.as_str();
    let mut header = render_header(&frontmatter.header)?;
    if frontmatter.line_ending == LineEnding::CrLf {
        header = header.replace('\n', "\r\n");
    }
    Ok(format!(
        "{delim}{newline}{header}{delim}{newline}{body}",
        delim = DELIMITER,
        body = frontmatter.body
    ))
}

pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotatable(content: &str) -> Frontmatter {
        match parse_note(content).expect("parse note") {
            ParsedNote::Annotatable(frontmatter) => frontmatter,
            ParsedNote::NoHeader => panic!("expected a header in {:?}", content),
        }
    }

    #[test]
    fn splits_header_and_body() {
        let (header, body, ending) =
            split_frontmatter("---\nQuality Score: 8\n---\n# Title\n").expect("split");
        assert_eq!(header, "Quality Score: 8\n");
        assert_eq!(body, "# Title\n");
        assert_eq!(ending, LineEnding::Lf);
    }

    #[test]
    fn empty_header_block_is_an_empty_mapping() {
        let frontmatter = annotatable("---\n---\nbody");
        assert!(frontmatter.header.is_empty());
        assert_eq!(frontmatter.body, "body");
    }

    #[test]
    fn missing_delimiters_mean_no_header() {
        for content in [
            "",
            "# Just a heading\n",
            "---\nQuality Score: 8\n",
            "---\nQuality Score: 8\n---",
            " ---\nQuality Score: 8\n---\n",
            "----\nQuality Score: 8\n---\n",
        ] {
            assert_eq!(parse_note(content).expect("parse"), ParsedNote::NoHeader, "{:?}", content);
        }
    }

    #[test]
    fn closing_delimiter_must_be_a_whole_line() {
        let frontmatter = annotatable("---\ntitle: a---b\nicon: LiBookmark\n---\nbody\n---\nmore\n");
        assert_eq!(frontmatter.get("title"), Some(&Value::String("a---b".to_string())));
        assert_eq!(frontmatter.body, "body\n---\nmore\n");
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let error = parse_note("---\nQuality Score: [unclosed\n---\nbody").expect_err("must fail");
        assert!(error.to_string().starts_with("MALFORMED_HEADER"));
    }

    #[test]
    fn non_mapping_header_is_reported() {
        let error = parse_note("---\n- a\n- b\n---\nbody").expect_err("must fail");
        assert!(error.to_string().contains("sequence"));
    }

    #[test]
    fn crlf_notes_keep_their_line_endings() {
        let content = "---\r\nscore: 8\r\n---\r\nline one\r\nline two\r\n";
        let mut frontmatter = annotatable(content);
        assert_eq!(frontmatter.line_ending, LineEnding::CrLf);
        assert_eq!(frontmatter.body, "line one\r\nline two\r\n");

        frontmatter.set("icon", Value::String("LiBookmark".to_string()));
        let rendered = render_note(&frontmatter).expect("render");
        assert_eq!(
            rendered,
            "---\r\nscore: 8\r\nicon: LiBookmark\r\n---\r\nline one\r\nline two\r\n"
        );
    }

    #[test]
    fn rewrite_preserves_body_bytes() {
        let body = "\n# Heading\n\n---\n\ntrailing spaces   \n\tindented\nno final newline";
        let content = format!("---\nQuality Score: 8\n---\n{}", body);
        let mut frontmatter = annotatable(&content);
        frontmatter.set("icon", Value::String("LiBookmark".to_string()));

        let rendered = render_note(&frontmatter).expect("render");
        let (_, rendered_body, _) = split_frontmatter(&rendered).expect("split rendered");
        assert_eq!(rendered_body, body);
    }

    #[test]
    fn header_round_trips_through_render() {
        let content = "---\ntitle: Café ☕ notes\nQuality Score: 7.5\ntags:\n  - reading\n  - \"2024\"\nmeta:\n  empty: ''\n  flag: false\n  none: null\n---\nbody";
        let frontmatter = annotatable(content);
        let rendered = render_note(&frontmatter).expect("render");
        assert!(rendered.contains("Café ☕ notes"));

        let reparsed = annotatable(&rendered);
        assert_eq!(reparsed.header, frontmatter.header);
        assert_eq!(reparsed.body, "body");
    }

    #[test]
    fn trailing_block_scalar_keeps_its_final_newline() {
        let content = "---\nQuality Score: 8\nsummary: |\n  line one\n  line two\n---\nbody";
        let mut frontmatter = annotatable(content);
        let summary = Value::String("line one\nline two\n".to_string());
        assert_eq!(frontmatter.get("summary"), Some(&summary));

        frontmatter.set("icon", Value::String("LiBookmark".to_string()));
        let rendered = render_note(&frontmatter).expect("render");
        let reparsed = annotatable(&rendered);
        assert_eq!(reparsed.get("summary"), Some(&summary));
        assert_eq!(reparsed.body, "body");
    }

    #[test]
    fn remove_keeps_key_order() {
        let mut frontmatter = annotatable("---\na: 1\nicon: LiBookmark\nb: 2\nc: 3\n---\n");
        let removed = frontmatter.remove("icon");
        assert_eq!(removed, Some(Value::String("LiBookmark".to_string())));

        let keys: Vec<_> = frontmatter
            .header
            .iter()
            .filter_map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(frontmatter.remove("icon"), None);
    }
}
