// JSON rendering of snapshots and reference checking.

use std::fs;

use log::{info, warn};
use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use text_diff::print_diff;

use leaderboard::{BookEntry, Participant, ReviewEntry, Snapshot};

use crate::board::{
    BoardResult, OpeningJsonSnafu, ParsingJsonSnafu, RenderingJsonSnafu, WritingOutputSnafu,
};

fn book_to_json(b: &BookEntry) -> JSValue {
    json!({
        "title": b.title,
        "identifier": b.identifier,
        "challenge": b.challenge,
        "coverURL": b.cover_url,
        "catalogURL": b.catalog_url,
    })
}

fn participant_to_json(p: &Participant) -> JSValue {
    json!({
        "key": p.key,
        "name": p.display_name,
        "status": p.status,
        "booksRead": p.completed_count,
        "books": p.books.iter().map(book_to_json).collect::<Vec<JSValue>>(),
    })
}

fn review_to_json(r: &ReviewEntry) -> JSValue {
    json!({
        "title": r.title,
        "author": r.author,
        "identifier": r.identifier,
        "isbn": r.isbn,
        "coverURL": r.cover_url,
        "description": r.description,
    })
}

/// Renders a snapshot in the shape the rendering collaborators consume.
pub fn snapshot_to_json(snapshot: &Snapshot) -> JSValue {
    json!({
        "participants": snapshot
            .participants
            .iter()
            .map(participant_to_json)
            .collect::<Vec<JSValue>>(),
        "reviews": snapshot
            .reviews
            .iter()
            .map(review_to_json)
            .collect::<Vec<JSValue>>(),
    })
}

/// Writes the rendered snapshot to a file, or to the standard output when
/// the path is the literal `stdout`.
pub fn write_snapshot(path: &str, pretty: &str) -> BoardResult<()> {
    if path == "stdout" {
        println!("{}", pretty);
        return Ok(());
    }
    fs::write(path, pretty).context(WritingOutputSnafu { path })?;
    info!("wrote snapshot to {}", path);
    Ok(())
}

fn read_reference(path: &str) -> BoardResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Compares the rendered snapshot against a reference file, printing a
/// diff on mismatch.
pub fn check_reference(path: &str, pretty: &str) -> BoardResult<()> {
    let reference = read_reference(path)?;
    let pretty_ref = serde_json::to_string_pretty(&reference).context(RenderingJsonSnafu {})?;
    if pretty_ref != pretty {
        warn!("Found differences with the reference snapshot");
        print_diff(pretty_ref.as_str(), pretty, "\n");
        whatever!("Difference detected between reconciled snapshot and reference");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::placeholder::placeholder_snapshot;
    use leaderboard::{parse_row, aggregate};

    #[test]
    fn snapshot_json_shape() {
        let rows = vec![parse_row(
            "ts,e1@x.com,Alice,memoir,Book A,Author A,5,Great!,,,,-,TRUE",
        )];
        let js = snapshot_to_json(&aggregate(&rows));

        assert_eq!(js["participants"][0]["key"], "e1@x.com");
        assert_eq!(js["participants"][0]["name"], "Alice");
        assert_eq!(js["participants"][0]["booksRead"], 1);
        assert_eq!(js["participants"][0]["status"], JSValue::Null);
        assert_eq!(js["participants"][0]["books"][0]["title"], "Book A");
        assert_eq!(
            js["participants"][0]["books"][0]["challenge"],
            "Read a memoir"
        );
        assert_eq!(js["reviews"][0]["description"], "Great! - 5 Stars from Alice");
        assert_eq!(js["reviews"][0]["coverURL"], JSValue::Null);
    }

    #[test]
    fn placeholder_renders_without_nulls_in_counts() {
        let js = snapshot_to_json(&placeholder_snapshot());
        assert!(js["participants"].as_array().is_some());
        assert_eq!(js["participants"][0]["booksRead"], 5);
    }
}
