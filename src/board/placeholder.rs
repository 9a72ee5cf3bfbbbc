// Built-in content shown before any successful fetch.

use leaderboard::{BookEntry, Participant, ReviewEntry, Snapshot, PLACEHOLDER_IDENTIFIER};

fn book(title: &str, identifier: &str, challenge: &str) -> BookEntry {
    BookEntry {
        title: title.to_string(),
        identifier: identifier.to_string(),
        challenge: challenge.to_string(),
        cover_url: Some(format!(
            "https://covers.openlibrary.org/b/olid/{}-M.jpg",
            identifier
        )),
        catalog_url: None,
    }
}

fn participant(key: &str, name: &str, books: Vec<BookEntry>) -> Participant {
    Participant {
        key: key.to_string(),
        display_name: name.to_string(),
        status: None,
        completed_count: books.len(),
        books,
    }
}

/// The sample leaderboard served until a fetch succeeds, and permanently
/// when no source URL is configured.
pub fn placeholder_snapshot() -> Snapshot {
    Snapshot {
        participants: vec![
            participant(
                "caleb.r@example.com",
                "Caleb R.",
                vec![
                    book(
                        "The Seven Husbands of Evelyn Hugo",
                        "OL58008787M",
                        "Read a book recommended by a librarian",
                    ),
                    book(
                        "Klara and the Sun",
                        "OL59403559M",
                        "Read a book with alliteration in the title",
                    ),
                    book(
                        "The Midnight Library",
                        "OL59403559M",
                        "Read a book about time travel",
                    ),
                    book("Educated", "OL58008787M", "Read a memoir"),
                    book("Dune", "OL57572489M", "Read a science fiction novel"),
                ],
            ),
            participant(
                "sarah.m@example.com",
                "Sarah M.",
                vec![
                    book(
                        "Where the Crawdads Sing",
                        "OL27958946M",
                        "Read a book set in nature",
                    ),
                    book(
                        "The Guest List",
                        "OL28088032M",
                        "Read a mystery or thriller",
                    ),
                    book("Atomic Habits", "OL26431704M", "Read a self-help book"),
                ],
            ),
            participant(
                "emma.k@example.com",
                "Emma K.",
                vec![
                    book("Circe", "OL26430527M", "Read a mythological retelling"),
                    book(
                        "The Song of Achilles",
                        "OL25152344M",
                        "Read a book with LGBTQ+ themes",
                    ),
                ],
            ),
            participant(
                "david.l@example.com",
                "David L.",
                vec![book(
                    "Project Hail Mary",
                    "OL32338681M",
                    "Read a science fiction novel",
                )],
            ),
        ],
        reviews: vec![
            ReviewEntry {
                title: "Dogtown".to_string(),
                author: "Katherine Applegate; Gennifer Choldenko".to_string(),
                identifier: PLACEHOLDER_IDENTIFIER.to_string(),
                isbn: Some("9781250811622".to_string()),
                cover_url: None,
                description: "A cute nominee that would be perfect for fans of Charlotte's Web. \
                              - 4 Stars from Jessica O"
                    .to_string(),
            },
            ReviewEntry {
                title: "Hide".to_string(),
                author: "Kiersten White".to_string(),
                identifier: PLACEHOLDER_IDENTIFIER.to_string(),
                isbn: Some("9780593359235".to_string()),
                cover_url: None,
                description: "Thrilling adult horror that keeps you on edge. - 5 Stars from \
                              Marcus T"
                    .to_string(),
            },
        ],
    }
}
