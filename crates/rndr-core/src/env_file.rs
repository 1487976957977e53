//! `.env` file parsing.

use std::collections::HashMap;

/// Parses `.env` content in the usual `KEY=value` format.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Exported: `export KEY=value`
/// - Whitespace around equals: `KEY = value`
/// - Values with equals signs: `URL=https://example.com?foo=bar`
///
/// Blank lines, `#` comments and lines without a key are skipped.
///
/// # Example
///
/// ```
/// use rndr_core::env_file::parse_env_file;
///
/// let vars = parse_env_file("# iOS\nIOS_SCHEME=\"My App\"\nAOS_VARIANT=release\n");
/// assert_eq!(vars.get("IOS_SCHEME").map(String::as_str), Some("My App"));
/// assert_eq!(vars.get("AOS_VARIANT").map(String::as_str), Some("release"));
/// ```
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = parse_line(line) {
            vars.insert(key, value);
        }
    }

    vars
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;

    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));

    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pairs() {
        let vars = parse_env_file("IOS_SCHEME=Demo\nAOS_MODULE=app\n");

        assert_eq!(vars.len(), 2);
        assert_eq!(vars["IOS_SCHEME"], "Demo");
        assert_eq!(vars["AOS_MODULE"], "app");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let content = r#"
# signing
IOS_CONFIGURATION=Release

   # indented comment
"#;

        let vars = parse_env_file(content);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["IOS_CONFIGURATION"], "Release");
    }

    #[test]
    fn strips_matching_quotes_only() {
        let vars = parse_env_file("A=\"x y\"\nB='z'\nC=\"unbalanced\nD=\"\n");

        assert_eq!(vars["A"], "x y");
        assert_eq!(vars["B"], "z");
        assert_eq!(vars["C"], "\"unbalanced");
        assert_eq!(vars["D"], "\"");
    }

    #[test]
    fn keeps_equals_in_value_and_trims_around_key() {
        let vars = parse_env_file("  URL = https://example.com?a=b  \n");
        assert_eq!(vars["URL"], "https://example.com?a=b");
    }

    #[test]
    fn ignores_lines_without_key() {
        let vars = parse_env_file("=value\nnot a pair\nEMPTY=\n");

        assert_eq!(vars.len(), 1);
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn handles_export_prefix_and_duplicates() {
        let vars = parse_env_file("export AOS_VARIANT=debug\nAOS_VARIANT=release\n");
        assert_eq!(vars["AOS_VARIANT"], "release");
    }
}
