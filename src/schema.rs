diesel::table! {
    found_items (id) {
        id -> Integer,
        caption -> Text,
        location -> Text,
        contact -> Text,
        image_path -> Text,
        matched -> Bool,
        embedding -> Nullable<Binary>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    lost_items (id) {
        id -> Integer,
        description -> Text,
        contact -> Text,
        email -> Text,
        status -> Text,
        embedding -> Nullable<Binary>,
        created_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(found_items, lost_items);

/// DDL applied when a connection pool is established.
pub(crate) const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS found_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        caption TEXT NOT NULL,
        location TEXT NOT NULL,
        contact TEXT NOT NULL,
        image_path TEXT NOT NULL,
        matched BOOLEAN NOT NULL DEFAULT 0,
        embedding BLOB,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS lost_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        description TEXT NOT NULL,
        contact TEXT NOT NULL,
        email TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'lost',
        embedding BLOB,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS lost_items_status_idx ON lost_items (status)",
];
