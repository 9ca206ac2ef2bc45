//! SQLite schema for the album catalog.
//!
//! Albums keep an integer rowid as primary key and the feed identifier as a
//! unique text column. Image slots are denormalized into three columns.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true), // feed identifier
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("artist_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist_url", &SqlType::Text),
        sqlite_column!("collection_name", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text, non_null = true), // 'YYYY-MM-DD'
        sqlite_column!("rank", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "is_top",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!("rights", &SqlType::Text, non_null = true),
        sqlite_column!("track_count", &SqlType::Integer),
        sqlite_column!("price", &SqlType::Real),
        sqlite_column!("currency", &SqlType::Text),
        sqlite_column!("store_url", &SqlType::Text),
        sqlite_column!("image_small_url", &SqlType::Text),
        sqlite_column!("image_medium_url", &SqlType::Text),
        sqlite_column!("image_large_url", &SqlType::Text),
    ],
    indices: &[
        ("idx_albums_id", "id"),
        ("idx_albums_is_top", "is_top"),
        ("idx_albums_rank", "rank"),
    ],
    unique_constraints: &[&["id"]],
};

const CATEGORIES_TABLE: Table = Table {
    name: "categories",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_categories_name", "name")],
    unique_constraints: &[&["name"]],
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "rowid",
};

const CATEGORY_FK: ForeignKey = ForeignKey {
    foreign_table: "categories",
    foreign_column: "rowid",
};

/// Album <-> Category relationship, `position` 0 is the primary category.
const ALBUM_CATEGORIES_TABLE: Table = Table {
    name: "album_categories",
    columns: &[
        sqlite_column!(
            "album_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ALBUM_FK)
        ),
        sqlite_column!(
            "category_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&CATEGORY_FK)
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_album_categories_album", "album_rowid"),
        ("idx_album_categories_category", "category_rowid"),
    ],
    unique_constraints: &[&["album_rowid", "category_rowid"]],
};

pub const ALBUM_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ALBUMS_TABLE, CATEGORIES_TABLE, ALBUM_CATEGORIES_TABLE],
}];
