// Positional layout of the published spreadsheet export.

/// Named positions for the thirteen columns of the source document.
///
/// The export always emits every column, so readers check a row once
/// against [`COLUMN_COUNT`] and then index by name.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Column {
    Timestamp,
    Email,
    Name,
    Challenge,
    Title,
    Author,
    Stars,
    Review,
    CoverUrl,
    CatalogUrl,
    Status,
    Verified,
    Publish,
}

/// Number of columns in the source schema.
pub const COLUMN_COUNT: usize = 13;

impl Column {
    pub const fn index(self) -> usize {
        match self {
            Column::Timestamp => 0,
            Column::Email => 1,
            Column::Name => 2,
            Column::Challenge => 3,
            Column::Title => 4,
            Column::Author => 5,
            Column::Stars => 6,
            Column::Review => 7,
            Column::CoverUrl => 8,
            Column::CatalogUrl => 9,
            Column::Status => 10,
            Column::Verified => 11,
            Column::Publish => 12,
        }
    }
}

/// The field for `col`, or `None` when the row is too short.
pub fn field(row: &[String], col: Column) -> Option<&str> {
    row.get(col.index()).map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_the_schema() {
        assert_eq!(Column::Timestamp.index(), 0);
        assert_eq!(Column::Publish.index(), COLUMN_COUNT - 1);
    }

    #[test]
    fn field_on_short_row() {
        let row = vec!["ts".to_string(), "e@x.com".to_string()];
        assert_eq!(field(&row, Column::Email), Some("e@x.com"));
        assert_eq!(field(&row, Column::Publish), None);
    }
}
