//! SQLite-backed album store.
//!
//! One write connection guarded by a mutex serializes reconciliations; a
//! small pool of read-only WAL connections serves queries, which therefore
//! only ever observe committed batches.

use super::models::{Album, AlbumImages, Category};
use super::query_sql::{order_by_clause, where_clause};
use super::schema::ALBUM_VERSIONED_SCHEMAS;
use super::trait_def::{AlbumQuery, AlbumStore, AlbumWindow, AlbumWriteTransaction, StoreError};
use crate::sqlite_persistence::{check_schema, ensure_schema};
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

const ALBUM_COLUMNS: &str = "a.rowid, a.id, a.name, a.artist_name, a.artist_url,
    a.collection_name, a.release_date, a.rank, a.is_top, a.rights, a.track_count,
    a.price, a.currency, a.store_url, a.image_small_url, a.image_medium_url,
    a.image_large_url";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQL name of the Unicode-aware lowercase used by case-insensitive filters.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

/// SQLite's own `lower()` only folds ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

#[derive(Clone)]
pub struct SqliteAlbumStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

impl SqliteAlbumStore {
    /// Open (creating if needed) the album database at `db_path`.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of connections serving concurrent queries
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        ensure_schema(&write_conn, ALBUM_VERSIONED_SCHEMAS).map_err(StoreError::Schema)?;
        register_functions(&write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let (album_count, top_count): (i64, i64) = write_conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_top), 0) FROM albums",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let category_count: i64 =
            write_conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
        info!(
            "Opened album catalog at {:?}: {} albums ({} top), {} categories",
            db_path, album_count, top_count, category_count
        );

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            register_functions(&read_conn)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteAlbumStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Check that `db_path` holds a reachable album database without
    /// creating or modifying anything.
    pub fn check_existing<P: AsRef<Path>>(db_path: P) -> Result<(), StoreError> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        check_schema(&conn, ALBUM_VERSIONED_SCHEMAS).map_err(StoreError::Schema)?;
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }

    fn read_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index]
            .lock()
            .map_err(|_| StoreError::LockPoisoned)
    }
}

fn album_rowid(conn: &Connection, id: &str) -> Result<Option<i64>, StoreError> {
    Ok(conn
        .query_row("SELECT rowid FROM albums WHERE id = ?1", params![id], |r| {
            r.get(0)
        })
        .optional()?)
}

/// Parse `(rowid, album)` from a row selected with [`ALBUM_COLUMNS`].
/// Categories are left empty.
fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<(i64, Album)> {
    let release_date: String = row.get(6)?;
    let release_date = NaiveDate::parse_from_str(&release_date, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    let album = Album {
        id: row.get(1)?,
        name: row.get(2)?,
        artist_name: row.get(3)?,
        artist_url: row.get(4)?,
        collection_name: row.get(5)?,
        release_date,
        rank: row.get(7)?,
        is_top: row.get::<_, i64>(8)? != 0,
        rights: row.get(9)?,
        track_count: row.get(10)?,
        price: row.get(11)?,
        currency: row.get(12)?,
        store_url: row.get(13)?,
        images: AlbumImages {
            small_url: row.get(14)?,
            medium_url: row.get(15)?,
            large_url: row.get(16)?,
        },
        categories: Vec::new(),
    };
    Ok((row.get(0)?, album))
}

fn load_categories(conn: &Connection, album_rowid: i64) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.name FROM album_categories ac
         JOIN categories c ON c.rowid = ac.category_rowid
         WHERE ac.album_rowid = ?1
         ORDER BY ac.position",
    )?;
    let names = stmt
        .query_map(params![album_rowid], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

fn load_album(conn: &Connection, id: &str) -> Result<Option<Album>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM albums a WHERE a.id = ?1",
        ALBUM_COLUMNS
    ))?;
    let Some((rowid, mut album)) = stmt.query_row(params![id], parse_album_row).optional()?
    else {
        return Ok(None);
    };
    album.categories = load_categories(conn, rowid)?;
    Ok(Some(album))
}

impl AlbumStore for SqliteAlbumStore {
    fn begin_write(&self) -> Result<Box<dyn AlbumWriteTransaction + '_>, StoreError> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteWriteTransaction {
            conn,
            finished: false,
        }))
    }

    fn get_album(&self, id: &str) -> Result<Option<Album>, StoreError> {
        let conn = self.read_conn()?;
        load_album(&conn, id)
    }

    fn query_albums(&self, query: &AlbumQuery) -> Result<AlbumWindow, StoreError> {
        let mut conn = self.read_conn()?;
        // Count and window come from the same snapshot
        let tx = conn.transaction()?;

        let (where_sql, mut sql_params) = where_clause(&query.filters);
        let total_count: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM albums a{}", where_sql),
            params_from_iter(sql_params.iter()),
            |r| r.get(0),
        )?;

        let limit = query
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        sql_params.push(Value::Integer(limit));
        sql_params.push(Value::Integer(offset));

        let rows = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM albums a{}{} LIMIT ? OFFSET ?",
                ALBUM_COLUMNS,
                where_sql,
                order_by_clause(&query.sort)
            ))?;
            let rows = stmt
                .query_map(params_from_iter(sql_params.iter()), parse_album_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut albums = Vec::with_capacity(rows.len());
        for (rowid, mut album) in rows {
            album.categories = load_categories(&tx, rowid)?;
            albums.push(album);
        }
        tx.commit()?;

        Ok(AlbumWindow {
            albums,
            total_count: total_count as usize,
        })
    }

    fn count_albums(&self) -> Result<usize, StoreError> {
        let conn = self.read_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.read_conn()?;
        let mut stmt = conn.prepare_cached("SELECT rowid, name FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn health_check(&self) -> bool {
        let result = self.read_conn().and_then(|conn| {
            conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))
                .map_err(StoreError::from)
        });
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!("Album store health check failed: {}", e);
                false
            }
        }
    }
}

/// The open `BEGIN IMMEDIATE` transaction on the write connection.
/// Rolled back on drop unless committed.
pub struct SqliteWriteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl AlbumWriteTransaction for SqliteWriteTransaction<'_> {
    fn get_album(&self, id: &str) -> Result<Option<Album>, StoreError> {
        load_album(&self.conn, id)
    }

    fn upsert_album(&mut self, album: &Album) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO albums (id, name, artist_name, artist_url, collection_name,
                release_date, rank, is_top, rights, track_count, price, currency, store_url,
                image_small_url, image_medium_url, image_large_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                artist_name = excluded.artist_name,
                artist_url = excluded.artist_url,
                collection_name = excluded.collection_name,
                release_date = excluded.release_date,
                rank = excluded.rank,
                is_top = excluded.is_top,
                rights = excluded.rights,
                track_count = excluded.track_count,
                price = excluded.price,
                currency = excluded.currency,
                store_url = excluded.store_url,
                image_small_url = excluded.image_small_url,
                image_medium_url = excluded.image_medium_url,
                image_large_url = excluded.image_large_url",
            params![
                &album.id,
                &album.name,
                &album.artist_name,
                &album.artist_url,
                &album.collection_name,
                album.release_date.format(DATE_FORMAT).to_string(),
                album.rank,
                album.is_top,
                &album.rights,
                album.track_count,
                album.price,
                &album.currency,
                &album.store_url,
                &album.images.small_url,
                &album.images.medium_url,
                &album.images.large_url,
            ],
        )?;
        Ok(())
    }

    fn set_album_top_flag(&mut self, id: &str, is_top: bool) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE albums SET is_top = ?1 WHERE id = ?2",
            params![is_top, id],
        )?;
        if updated == 0 {
            return Err(StoreError::AlbumNotFound(id.to_string()));
        }
        Ok(())
    }

    fn top_album_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM albums WHERE is_top = 1 ORDER BY rank")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn get_or_create_category(&mut self, name: &str) -> Result<Category, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT rowid FROM categories WHERE name = ?1",
                params![name],
                |r| r.get(0),
            )
            .optional()?;
        let id = match existing {
            Some(id) => id,
            None => {
                self.conn
                    .execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
                debug!("Created category '{}'", name);
                self.conn.last_insert_rowid()
            }
        };
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    fn set_album_categories(
        &mut self,
        album_id: &str,
        categories: &[Category],
    ) -> Result<(), StoreError> {
        let rowid = album_rowid(&self.conn, album_id)?
            .ok_or_else(|| StoreError::AlbumNotFound(album_id.to_string()))?;
        self.conn.execute(
            "DELETE FROM album_categories WHERE album_rowid = ?1",
            params![rowid],
        )?;
        for (position, category) in categories.iter().enumerate() {
            self.conn.execute(
                "INSERT OR IGNORE INTO album_categories (album_rowid, category_rowid, position)
                 VALUES (?1, ?2, ?3)",
                params![rowid, category.id, position as i64],
            )?;
        }
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SqliteWriteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => warn!("Album write transaction rolled back"),
            Err(e) => error!("Failed to roll back album write transaction: {}", e),
        }
    }
}
