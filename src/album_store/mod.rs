mod models;
mod query_sql;
mod schema;
mod store;
mod trait_def;

pub use models::{Album, AlbumImages, Category};
pub use schema::ALBUM_VERSIONED_SCHEMAS;
pub use store::{SqliteAlbumStore, SqliteWriteTransaction};
pub use trait_def::{AlbumQuery, AlbumStore, AlbumWindow, AlbumWriteTransaction, StoreError};
