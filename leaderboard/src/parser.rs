// Tolerant splitting of the spreadsheet CSV export.

use log::info;

use crate::config::DocumentError;
use crate::schema::COLUMN_COUNT;

/// One line of the source document, split into positional fields.
pub type RawRow = Vec<String>;

/// Splits a single CSV line into trimmed fields.
///
/// A double quote toggles the in-quotes flag and a comma only separates
/// fields while the flag is off. Unbalanced quotes are not an error: the
/// scan keeps consuming into the current field, matching the tolerant
/// nature of spreadsheet exports. An empty line yields a single empty
/// field.
pub fn parse_row(line: &str) -> RawRow {
    let mut fields: RawRow = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Splits a whole document into data rows.
///
/// The first line must be a header at least as wide as the schema. It is
/// never interpreted, only logged. Blank lines are dropped.
pub fn parse_document(text: &str) -> Result<Vec<RawRow>, DocumentError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DocumentError::TooShort);
    }

    let mut lines = trimmed.lines();
    let header = parse_row(lines.next().unwrap_or(""));
    if header.len() < COLUMN_COUNT {
        return Err(DocumentError::InvalidShape {
            columns: header.len(),
        });
    }
    info!(
        "parse_document: header with {} columns: {:?}",
        header.len(),
        header
    );

    Ok(lines
        .filter(|line| !line.trim().is_empty())
        .map(parse_row)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(parse_row("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_quoted_commas() {
        assert_eq!(parse_row(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_row(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn empty_line_is_one_empty_field() {
        assert_eq!(parse_row(""), vec![""]);
    }

    #[test]
    fn trailing_separator_emits_empty_field() {
        assert_eq!(parse_row("a,"), vec!["a", ""]);
    }

    #[test]
    fn unbalanced_quote_degrades_gracefully() {
        // The open quote swallows the separator; no error is raised.
        assert_eq!(parse_row(r#""a,b"#), vec!["a,b"]);
    }

    fn header() -> String {
        vec!["col"; COLUMN_COUNT].join(",")
    }

    #[test]
    fn document_with_rows() {
        let text = format!("{}\nts,e@x.com,Alice\n\nts,e2@x.com,Bob", header());
        let rows = parse_document(&text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "e@x.com");
        assert_eq!(rows[1][1], "e2@x.com");
    }

    #[test]
    fn header_only_document_is_valid_and_empty() {
        let rows = parse_document(&header()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_document_is_too_short() {
        assert_eq!(parse_document("  \n "), Err(DocumentError::TooShort));
    }

    #[test]
    fn narrow_header_is_invalid_shape() {
        assert_eq!(
            parse_document("a,b,c\nrow"),
            Err(DocumentError::InvalidShape { columns: 3 })
        );
    }
}
