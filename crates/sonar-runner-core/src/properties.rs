//! Reader and writer for `.properties` files.
//!
//! Supports the subset of the format found in project descriptors:
//! `#`/`!` comments, `=`, `:` or whitespace separators, backslash line
//! continuations and the usual escapes (`\t \n \r \f \\ \uXXXX`).
//! Files are read as UTF-8 and fall back to ISO-8859-1 when they are not.

use crate::{Error, Result};
use sonar_runner_types::RunConfiguration;
use std::path::Path;

pub fn load(path: &Path) -> Result<RunConfiguration> {
    let bytes = std::fs::read(path).map_err(|err| Error::File {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let content = String::from_utf8(bytes)
        .unwrap_or_else(|err| err.into_bytes().iter().map(|&b| b as char).collect());
    Ok(parse(&content))
}

pub fn parse(content: &str) -> RunConfiguration {
    let mut config = RunConfiguration::new();
    for line in logical_lines(content) {
        let (key, value) = split_entry(&line);
        config.insert(unescape(key), unescape(value));
    }
    config
}

/// Join continuation lines and drop comments and blank lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in content.lines() {
        let trimmed = raw.trim_start();
        let mut current = match pending.take() {
            Some(mut joined) => {
                joined.push_str(trimmed);
                joined
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&current) {
            current.pop();
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }

    if let Some(last) = pending
        && !last.is_empty()
    {
        lines.push(last);
    }
    lines
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Render a configuration in `.properties` syntax, one entry per line.
pub fn render(config: &RunConfiguration) -> String {
    let mut out = String::from("# Generated by sonar-runner, do not edit\n");
    for (key, value) in config.iter() {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (idx, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && idx == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

pub fn write(path: &Path, config: &RunConfiguration) -> Result<()> {
    std::fs::write(path, render(config)).map_err(|err| Error::File {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators_and_comments() {
        let content = "\
# comment
! another comment
sonar.projectKey=java:sample
sonar.projectName : Java Sample, with comma
sonar.sources src
   sonar.projectVersion   =   1.2.3

";
        let config = parse(content);
        assert_eq!(config.get("sonar.projectKey"), Some("java:sample"));
        assert_eq!(config.get("sonar.projectName"), Some("Java Sample, with comma"));
        assert_eq!(config.get("sonar.sources"), Some("src"));
        assert_eq!(config.get("sonar.projectVersion"), Some("1.2.3"));
        assert_eq!(config.len(), 4);
    }

    #[test]
    fn test_parse_continuation_lines() {
        let content = "sonar.sources=src/main,\\\n    src/generated,\\\n    src/extra\nnext=1\n";
        let config = parse(content);
        assert_eq!(config.get("sonar.sources"), Some("src/main,src/generated,src/extra"));
        assert_eq!(config.get("next"), Some("1"));
    }

    #[test]
    fn test_parse_escapes() {
        let content = "key\\ with\\:colon=tab\\there\\u00e9\npath=C:\\\\work\\\\src\nempty=\n";
        let config = parse(content);
        assert_eq!(config.get("key with:colon"), Some("tab\there\u{e9}"));
        assert_eq!(config.get("path"), Some("C:\\work\\src"));
        assert_eq!(config.get("empty"), Some(""));
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let config = parse("a=ends with backslash\\\\\nb=2\n");
        assert_eq!(config.get("a"), Some("ends with backslash\\"));
        assert_eq!(config.get("b"), Some("2"));
    }

    #[test]
    fn test_later_entries_win() {
        let config = parse("a=1\na=2\n");
        assert_eq!(config.get("a"), Some("2"));
    }

    #[test]
    fn test_render_is_sorted_and_escaped() {
        let config: RunConfiguration = [
            ("sonar.sources", "src"),
            ("sonar.projectName", " Padded\tname"),
            ("odd key=1", "C:\\work"),
        ]
        .into_iter()
        .collect();

        insta::assert_snapshot!(render(&config), @r"
        # Generated by sonar-runner, do not edit
        odd\ key\=1=C:\\work
        sonar.projectName=\ Padded\tname
        sonar.sources=src
        ");
    }

    #[test]
    fn test_render_then_parse_preserves_entries() {
        let config: RunConfiguration = [
            ("sonar.projectName", " Leading space"),
            ("multi", "line\nvalue"),
            ("#hash", "x"),
        ]
        .into_iter()
        .collect();
        assert_eq!(parse(&render(&config)), config);
    }

    #[test]
    fn test_latin1_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sonar-project.properties");
        std::fs::write(&path, b"sonar.projectName=Caf\xe9\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.get("sonar.projectName"), Some("Caf\u{e9}"));
    }
}
