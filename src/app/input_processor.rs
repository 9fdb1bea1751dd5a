//! Assembly of batch items from positional identifiers and/or stdin.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use scidb_core::{BatchItem, normalize_identifier};
use tracing::debug;

/// Builds items from positional identifiers, or from stdin when none were
/// given and stdin is piped. Returns an empty list when neither is available.
pub(crate) fn collect_items(identifiers: &[String]) -> Result<Vec<BatchItem>> {
    if !identifiers.is_empty() {
        return Ok(items_from_identifiers(identifiers));
    }
    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read identifiers from stdin")?;
    Ok(parse_item_lines(&buffer))
}

pub(crate) fn items_from_identifiers(identifiers: &[String]) -> Vec<BatchItem> {
    identifiers.iter().map(|raw| item_from_parts(raw, None)).collect()
}

/// Parses `identifier[<TAB>title]` lines. Blank lines are skipped; a line
/// with an empty identifier column still yields an item (without identifier).
pub(crate) fn parse_item_lines(text: &str) -> Vec<BatchItem> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once('\t') {
            Some((identifier, title)) => item_from_parts(identifier, Some(title)),
            None => item_from_parts(line, None),
        })
        .collect()
}

fn item_from_parts(raw_identifier: &str, title: Option<&str>) -> BatchItem {
    let identifier = normalize_identifier(raw_identifier);
    let title = title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .or_else(|| identifier.clone())
        .unwrap_or_else(|| "Untitled".to_string());
    debug!(identifier = identifier.as_deref().unwrap_or_default(), title = %title, "Parsed item");
    BatchItem::new(identifier, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_from_identifiers_normalizes_and_titles() {
        let items = items_from_identifiers(&[
            "https://doi.org/10.1000/ABC".to_string(),
            "doi:10.2/x".to_string(),
        ]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].identifier.as_deref(), Some("10.1000/ABC"));
        assert_eq!(items[0].title, "10.1000/ABC");
        assert_eq!(items[1].identifier.as_deref(), Some("10.2/x"));
    }

    #[test]
    fn test_parse_item_lines_with_titles() {
        let items = parse_item_lines("10.1/a\tFirst paper\n\n10.1/b\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], BatchItem::new(Some("10.1/a".to_string()), "First paper"));
        assert_eq!(items[1], BatchItem::new(Some("10.1/b".to_string()), "10.1/b"));
    }

    #[test]
    fn test_parse_item_lines_empty_identifier_column() {
        let items = parse_item_lines("\tNo identifier here\n");
        assert_eq!(items.len(), 1);
        assert!(items[0].identifier.is_none());
        assert_eq!(items[0].title, "No identifier here");
    }

    #[test]
    fn test_parse_item_lines_blank_input() {
        assert!(parse_item_lines("\n  \n").is_empty());
    }
}
