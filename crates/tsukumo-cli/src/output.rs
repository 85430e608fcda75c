use std::io::Write;

use serde::Serialize;
use tsukumo_parse::{Elements, ParseResult, Token};

use crate::error::CliError;

/// What gets printed for one input filename.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub filename: &'a str,
    pub success: bool,
    pub elements: &'a Elements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<&'a [Token]>,
}

impl<'a> Report<'a> {
    pub fn new(filename: &'a str, result: &'a ParseResult, with_tokens: bool) -> Self {
        Self {
            filename,
            success: result.is_success(),
            elements: &result.elements,
            tokens: with_tokens.then_some(result.tokens.as_slice()),
        }
    }
}

pub fn write_json(out: &mut impl Write, report: &Report<'_>) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Aligned `kind  value` lines under the filename.
pub fn write_table(out: &mut impl Write, report: &Report<'_>) -> Result<(), CliError> {
    writeln!(out, "{}", report.filename)?;
    if !report.success {
        writeln!(out, "  (no title found)")?;
    }

    let width = report
        .elements
        .iter()
        .map(|e| e.kind.as_str().len())
        .max()
        .unwrap_or(0);
    for element in report.elements {
        writeln!(out, "  {:<width$}  {}", element.kind.as_str(), element.value)?;
    }

    if let Some(tokens) = report.tokens {
        writeln!(out, "  tokens:")?;
        for token in tokens {
            let element = token.element.map(|k| k.as_str()).unwrap_or("-");
            let kind = format!("{:?}", token.kind);
            writeln!(out, "    {kind:<14} {element:<18} {:?}", token.text)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &str, json: bool, with_tokens: bool) -> String {
        let result = tsukumo_parse::parse(input);
        let report = Report::new(input, &result, with_tokens);
        let mut out = Vec::new();
        if json {
            write_json(&mut out, &report).unwrap();
        } else {
            write_table(&mut out, &report).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_json_report() {
        let text = render("[Group] Title - 01.mkv", true, false);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["filename"], "[Group] Title - 01.mkv");
        assert_eq!(value["success"], true);
        assert!(value.get("tokens").is_none());
        assert!(value["elements"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["kind"] == "episode_number" && e["value"] == "01"));
    }

    #[test]
    fn test_json_report_with_tokens() {
        let text = render("Title - 01", true, true);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tokens"][0]["text"], "Title");
    }

    #[test]
    fn test_table_alignment() {
        let text = render("[Group] Title - 01.mkv", false, false);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("[Group] Title - 01.mkv"));
        assert!(text.contains("  episode_number  01\n"));
        assert!(text.contains("  title           Title\n"));
    }

    #[test]
    fn test_table_failure_marker() {
        let text = render("", false, false);
        assert!(text.contains("(no title found)"));
    }
}
