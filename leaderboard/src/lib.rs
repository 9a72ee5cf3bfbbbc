//! Reconciliation pipeline for a reading-challenge leaderboard.
//!
//! Raw CSV text from a published spreadsheet flows through the row parser
//! and field normalizer into [`aggregate`], which produces the
//! [`Snapshot`] held by the polling controller and consumed by rendering.
//! Everything in this crate is pure and synchronous; fetching and
//! snapshot ownership live with the caller.

mod builder;
mod config;
mod normalize;
mod parser;
pub mod schema;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::builder::Builder;
pub use crate::config::*;
pub use crate::normalize::*;
pub use crate::parser::{parse_document, parse_row, RawRow};

use crate::schema::{field, Column, COLUMN_COUNT};

// Reasons a row is dropped. Contained here: a bad row never fails a batch.
#[derive(Eq, PartialEq, Debug, Clone)]
enum RowSkip {
    Unpublished,
    Malformed { width: usize },
    RequiredFieldMissing { column: &'static str },
}

// The fields of one accepted row, trimmed and ready for normalization.
struct RowFields<'a> {
    email: &'a str,
    name: &'a str,
    challenge: &'a str,
    title: &'a str,
    author: &'a str,
    stars: u32,
    review: &'a str,
    cover_url: Option<&'a str>,
    catalog_url: &'a str,
    status: &'a str,
}

fn accept_row(row: &[String]) -> Result<RowFields<'_>, RowSkip> {
    if row.len() < COLUMN_COUNT {
        return Err(RowSkip::Malformed { width: row.len() });
    }

    // Only rows explicitly marked for publication are eligible.
    let publish = field(row, Column::Publish).unwrap_or("");
    if !publish.eq_ignore_ascii_case("TRUE") {
        return Err(RowSkip::Unpublished);
    }

    let email = field(row, Column::Email).unwrap_or("");
    let name = field(row, Column::Name).unwrap_or("");
    let title = field(row, Column::Title).unwrap_or("");
    if email.is_empty() {
        return Err(RowSkip::RequiredFieldMissing { column: "email" });
    }
    if name.is_empty() {
        return Err(RowSkip::RequiredFieldMissing { column: "name" });
    }
    if title.is_empty() {
        return Err(RowSkip::RequiredFieldMissing { column: "title" });
    }

    let cover = field(row, Column::CoverUrl).unwrap_or("");
    Ok(RowFields {
        email,
        name,
        challenge: field(row, Column::Challenge).unwrap_or(""),
        title,
        author: field(row, Column::Author).unwrap_or(""),
        stars: field(row, Column::Stars)
            .unwrap_or("")
            .parse::<u32>()
            .unwrap_or(0),
        review: field(row, Column::Review).unwrap_or(""),
        cover_url: if cover.is_empty() { None } else { Some(cover) },
        catalog_url: field(row, Column::CatalogUrl).unwrap_or(""),
        status: field(row, Column::Status).unwrap_or(""),
    })
}

/// Aggregates parsed rows into a fresh snapshot.
///
/// Rows are grouped by identity key in first-appearance order, with no
/// reordering and no dedup by display name. The book count and book list
/// of a participant grow together. Bad rows are logged and skipped; they
/// never abort the batch.
pub fn aggregate(rows: &[RawRow]) -> Snapshot {
    info!("aggregate: processing {} rows", rows.len());

    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut participants: Vec<Participant> = Vec::new();
    let mut reviews: Vec<ReviewEntry> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let lineno = idx + 1;
        let fields = match accept_row(row) {
            Ok(fields) => fields,
            Err(RowSkip::Unpublished) => {
                debug!("aggregate: row {} not marked for publication", lineno);
                continue;
            }
            Err(RowSkip::Malformed { width }) => {
                warn!(
                    "aggregate: row {} has {} fields, expected {}; skipping",
                    lineno, width, COLUMN_COUNT
                );
                continue;
            }
            Err(RowSkip::RequiredFieldMissing { column }) => {
                warn!(
                    "aggregate: row {} is missing required field {:?}; skipping",
                    lineno, column
                );
                continue;
            }
        };

        let slot = match by_key.get(fields.email) {
            Some(&slot) => slot,
            None => {
                by_key.insert(fields.email.to_string(), participants.len());
                participants.push(Participant {
                    key: fields.email.to_string(),
                    display_name: fields.name.to_string(),
                    status: if fields.status.is_empty() {
                        None
                    } else {
                        Some(fields.status.to_string())
                    },
                    completed_count: 0,
                    books: Vec::new(),
                });
                participants.len() - 1
            }
        };

        let identifier = extract_identifier(fields.cover_url);
        let entry = BookEntry {
            title: fields.title.to_string(),
            identifier: identifier.clone(),
            challenge: expand_challenge(fields.challenge),
            cover_url: Some(resolve_cover_url(fields.cover_url, &identifier)),
            catalog_url: if fields.catalog_url.starts_with("http") {
                Some(fields.catalog_url.to_string())
            } else {
                None
            },
        };

        // Count and book list move together.
        let participant = &mut participants[slot];
        participant.books.push(entry);
        participant.completed_count = participant.books.len();

        if fields.stars >= 4 && !fields.review.is_empty() {
            reviews.push(ReviewEntry {
                title: fields.title.to_string(),
                author: fields.author.to_string(),
                identifier,
                isbn: extract_isbn(fields.cover_url),
                cover_url: review_cover_url(fields.cover_url),
                description: format!(
                    "{} - {} Stars from {}",
                    fields.review, fields.stars, fields.name
                ),
            });
        }
    }

    debug!(
        "aggregate: {} participants, {} reviews",
        participants.len(),
        reviews.len()
    );
    Snapshot {
        participants,
        reviews,
    }
}

/// Parses and aggregates a whole CSV document.
///
/// This is the boundary the polling controller sees: shape problems
/// surface as [`DocumentError`], everything row-level is contained in
/// [`aggregate`].
pub fn snapshot_from_csv(text: &str) -> Result<Snapshot, DocumentError> {
    let rows = parse_document(text)?;
    Ok(aggregate(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW_ALICE_A: &str =
        r#"ts,e1@x.com,Alice,"With foo",Book A,Author A,5,"Great!",http://covers/olid/OL1M-M.jpg,,,-,TRUE"#;
    const ROW_ALICE_B: &str =
        "ts,e1@x.com,Alice,memoir,Book B,Author B,2,,https://covers/olid/OL2M-M.jpg,,,-,true";
    const ROW_BOB: &str =
        "ts,e2@x.com,Bob,about time travel,Book C,Author C,4,Solid.,,https://catalog/x,Champion,-,TRUE";

    fn rows(lines: &[&str]) -> Vec<RawRow> {
        lines.iter().map(|l| parse_row(l)).collect()
    }

    #[test]
    fn groups_rows_by_identity() {
        let snapshot = aggregate(&rows(&[ROW_ALICE_A, ROW_ALICE_B]));
        assert_eq!(snapshot.participants.len(), 1);

        let p = &snapshot.participants[0];
        assert_eq!(p.key, "e1@x.com");
        assert_eq!(p.display_name, "Alice");
        assert_eq!(p.completed_count, 2);
        assert_eq!(p.books.len(), 2);
        assert_eq!(p.books[0].title, "Book A");
        assert_eq!(p.books[0].identifier, "OL1M");
        assert_eq!(p.books[0].challenge, "Read a book with foo");
        assert_eq!(p.books[1].title, "Book B");

        // Only the five-star row qualifies for a review.
        assert_eq!(snapshot.reviews.len(), 1);
        assert_eq!(
            snapshot.reviews[0].description,
            "Great! - 5 Stars from Alice"
        );
    }

    #[test]
    fn keeps_first_appearance_order() {
        let snapshot = aggregate(&rows(&[ROW_ALICE_A, ROW_BOB, ROW_ALICE_B]));
        assert_eq!(snapshot.participants.len(), 2);
        assert_eq!(snapshot.participants[0].key, "e1@x.com");
        assert_eq!(snapshot.participants[1].key, "e2@x.com");
        assert_eq!(snapshot.participants[0].completed_count, 2);
        assert_eq!(snapshot.participants[1].completed_count, 1);
    }

    #[test]
    fn unpublished_rows_contribute_nothing() {
        for flag in ["FALSE", "", "maybe", "TRU"] {
            let line = format!("ts,e1@x.com,Alice,memoir,Book A,Author A,5,Great!,,,,-,{}", flag);
            let snapshot = aggregate(&rows(&[line.as_str()]));
            assert!(snapshot.is_empty(), "flag {:?} should be rejected", flag);
        }
    }

    #[test]
    fn publish_flag_is_case_insensitive() {
        for flag in ["TRUE", "true", "True"] {
            let line = format!("ts,e1@x.com,Alice,memoir,Book A,Author A,1,,,,,-,{}", flag);
            let snapshot = aggregate(&rows(&[line.as_str()]));
            assert_eq!(snapshot.participants.len(), 1, "flag {:?}", flag);
        }
    }

    #[test]
    fn missing_required_fields_skip_the_row() {
        let missing_email = "ts,,Alice,memoir,Book A,Author A,5,Great!,,,,-,TRUE";
        let missing_name = "ts,e1@x.com,,memoir,Book A,Author A,5,Great!,,,,-,TRUE";
        let missing_title = "ts,e1@x.com,Alice,memoir,,Author A,5,Great!,,,,-,TRUE";
        for line in [missing_email, missing_name, missing_title] {
            let snapshot = aggregate(&rows(&[line]));
            assert!(snapshot.is_empty(), "line {:?} should be skipped", line);
        }
    }

    #[test]
    fn short_rows_never_abort_the_batch() {
        let snapshot = aggregate(&rows(&["garbage,row", ROW_BOB]));
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(snapshot.participants[0].key, "e2@x.com");
    }

    #[test]
    fn count_always_matches_book_list() {
        let snapshot = aggregate(&rows(&[ROW_ALICE_A, ROW_BOB, ROW_ALICE_B, ROW_ALICE_A]));
        for p in &snapshot.participants {
            assert_eq!(p.completed_count, p.books.len());
        }
    }

    #[test]
    fn review_threshold_is_four_stars_with_text() {
        // Three stars with text: no review.
        let three_stars = "ts,e@x.com,Eve,memoir,Book,Auth,3,Nice read,,,,-,TRUE";
        assert!(aggregate(&rows(&[three_stars])).reviews.is_empty());

        // Four stars without text: no review.
        let no_text = "ts,e@x.com,Eve,memoir,Book,Auth,4,,,,,-,TRUE";
        assert!(aggregate(&rows(&[no_text])).reviews.is_empty());

        // Unparseable stars count as zero.
        let bad_stars = "ts,e@x.com,Eve,memoir,Book,Auth,many,Nice read,,,,-,TRUE";
        assert!(aggregate(&rows(&[bad_stars])).reviews.is_empty());

        // Four stars with text: exactly one review.
        let qualifying = "ts,e@x.com,Eve,memoir,Book,Auth,4,Nice read,,,,-,TRUE";
        let snapshot = aggregate(&rows(&[qualifying]));
        assert_eq!(snapshot.reviews.len(), 1);
        assert_eq!(
            snapshot.reviews[0].description,
            "Nice read - 4 Stars from Eve"
        );
    }

    #[test]
    fn review_carries_isbn_and_cover_when_present() {
        let line = "ts,e@x.com,Eve,memoir,Book,Auth,5,Lovely,https://covers.openlibrary.org/b/isbn/9781250811622-M.jpg,,,-,TRUE";
        let snapshot = aggregate(&rows(&[line]));
        assert_eq!(snapshot.reviews.len(), 1);
        let review = &snapshot.reviews[0];
        assert_eq!(review.isbn, Some("9781250811622".to_string()));
        assert_eq!(
            review.cover_url,
            Some("https://covers.openlibrary.org/b/isbn/9781250811622-M.jpg".to_string())
        );
        assert_eq!(review.identifier, "9781250811622");
    }

    #[test]
    fn status_and_catalog_url_are_optional() {
        let snapshot = aggregate(&rows(&[ROW_BOB]));
        let p = &snapshot.participants[0];
        assert_eq!(p.status, Some("Champion".to_string()));
        assert_eq!(
            p.books[0].catalog_url,
            Some("https://catalog/x".to_string())
        );

        let snapshot = aggregate(&rows(&[ROW_ALICE_A]));
        let p = &snapshot.participants[0];
        assert_eq!(p.status, None);
        assert_eq!(p.books[0].catalog_url, None);
    }

    #[test]
    fn missing_cover_synthesizes_placeholder_url() {
        let snapshot = aggregate(&rows(&[ROW_BOB]));
        let book = &snapshot.participants[0].books[0];
        assert_eq!(book.identifier, PLACEHOLDER_IDENTIFIER);
        assert_eq!(
            book.cover_url,
            Some(format!(
                "https://covers.openlibrary.org/b/olid/{}-M.jpg",
                PLACEHOLDER_IDENTIFIER
            ))
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let input = rows(&[ROW_ALICE_A, ROW_BOB, ROW_ALICE_B]);
        assert_eq!(aggregate(&input), aggregate(&input));
    }

    #[test]
    fn csv_document_end_to_end() {
        let text = format!(
            "Timestamp,Email,Name,Challenge,Title,Author,Stars,Review,Cover URL,Catalog URL,Status,Verified,Publish\n{}\n{}",
            ROW_ALICE_A, ROW_ALICE_B
        );
        let snapshot = snapshot_from_csv(&text).unwrap();
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(snapshot.participants[0].completed_count, 2);
        assert_eq!(snapshot.reviews.len(), 1);
    }

    #[test]
    fn empty_document_is_an_error_not_an_empty_snapshot() {
        assert_eq!(snapshot_from_csv(""), Err(DocumentError::TooShort));
    }
}
