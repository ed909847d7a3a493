#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `store` persists hashed objects, their delta records, branch refs, and
//! free-form metadata in a single embedded relational database file. It is
//! the only crate in the workspace that touches disk.
//!
//! # Design
//!
//! Four tables back the store: `objects` (every blob/tree/commit, plus
//! zero-length placeholders for delta-compressed rows), `deltas` (the
//! companion payload for those placeholders), `refs` (branch name to commit
//! hash), and `metadata` (free-form key/value pairs). [`ObjectStore::open`]
//! accepts any path [`rusqlite::Connection::open`] would, including
//! `:memory:` for an ephemeral instance used by transfer and tests.
//!
//! # Invariants
//!
//! - `hash` uniquely determines an object's `(size, uncompressed payload)`;
//!   [`ObjectStore::store_object`] is insert-or-ignore and never rewrites an
//!   existing row.
//! - A delta row's chain always terminates at a non-delta object, within
//!   [`DEFAULT_MAX_CHAIN_DEPTH`] steps, and without revisiting a hash;
//!   [`ObjectStore::get_object`] enforces this via
//!   [`ObjectStore::validate_delta_chain`] before reconstructing.
//! - Multi-row mutations (delta + placeholder insert, ref updates under a
//!   larger operation) run inside [`ObjectStore::transaction`], which nests
//!   via savepoints.
//!
//! # Errors
//!
//! Low-level database and I/O failures are surfaced with their context via
//! [`StoreError::Database`] and [`StoreError::Inflate`]. Delta-chain
//! problems get their own variants so callers can distinguish a cycle from
//! a too-deep chain from a missing base object.

mod compression;
pub mod error;
pub mod types;

pub use error::StoreError;
pub use types::{Compression, DeltaDecisionReason, DeltaStoreOutcome, ObjectType, RawDelta, RawObject, RefEntry, RefType, StoreOutcome, StoredObject};

use rusqlite::{params, OptionalExtension};
use std::cell::Cell;

/// Default bound on delta-chain depth, matching the storage layer's recommended default.
pub const DEFAULT_MAX_CHAIN_DEPTH: u32 = 10;

/// A content-addressed object store backed by an embedded relational database.
pub struct ObjectStore {
    conn: rusqlite::Connection,
    savepoint_depth: Cell<u32>,
}

struct ObjectRow {
    data: Vec<u8>,
    size: usize,
    object_type: ObjectType,
    compression: Compression,
}

struct DeltaRow {
    base_hash: String,
    delta_data: Vec<u8>,
    original_size: usize,
    delta_size: usize,
    compression_ratio: f64,
}

impl ObjectStore {
    /// Opens (creating if absent) the database at `path`, which may be `:memory:`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection or schema
    /// migration fails.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = rusqlite::Connection::open(path)?;
        let store = Self {
            conn,
            savepoint_depth: Cell::new(0),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS objects (
                hash        TEXT PRIMARY KEY CHECK(length(hash) = 64),
                data        BLOB NOT NULL,
                size        INTEGER NOT NULL,
                type        TEXT NOT NULL,
                compression TEXT NOT NULL,
                created_at  INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_objects_type ON objects(type);
            CREATE INDEX IF NOT EXISTS idx_objects_created_at ON objects(created_at);

            CREATE TABLE IF NOT EXISTS deltas (
                hash               TEXT PRIMARY KEY REFERENCES objects(hash),
                base_hash          TEXT NOT NULL,
                delta_data         BLOB NOT NULL,
                original_size      INTEGER NOT NULL,
                delta_size         INTEGER NOT NULL,
                compression_ratio  REAL NOT NULL,
                created_at         INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_deltas_base_hash ON deltas(base_hash);

            CREATE TABLE IF NOT EXISTS refs (
                name        TEXT PRIMARY KEY,
                hash        TEXT NOT NULL,
                type        TEXT NOT NULL,
                created_at  INTEGER NOT NULL DEFAULT (strftime('%s','now')),
                updated_at  INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            );
            CREATE INDEX IF NOT EXISTS idx_refs_updated_at ON refs(updated_at);

            CREATE TABLE IF NOT EXISTS metadata (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
            );
            ",
        )?;
        Ok(())
    }

    /// Runs `f` inside a write transaction with all-or-nothing semantics.
    ///
    /// Implemented with `SAVEPOINT`/`RELEASE`/`ROLLBACK TO` rather than bare
    /// `BEGIN`/`COMMIT` so that a call made from within another transaction
    /// nests onto the outer one's commit boundary instead of failing.
    ///
    /// # Errors
    ///
    /// Propagates whatever error `f` returns, after rolling back this
    /// transaction's changes. Also returns [`StoreError::Database`] if the
    /// savepoint itself cannot be created or resolved.
    pub fn transaction<T>(&self, f: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let depth = self.savepoint_depth.get();
        let name = format!("webdvcs_sp_{depth}");
        self.conn.execute_batch(&format!("SAVEPOINT {name}"))?;
        self.savepoint_depth.set(depth + 1);

        let result = f();
        self.savepoint_depth.set(depth);

        match result {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE {name}"))?;
                Ok(value)
            }
            Err(err) => {
                self.conn.execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))?;
                Err(err)
            }
        }
    }

    fn fetch_row(&self, hash: &str) -> Result<Option<ObjectRow>, StoreError> {
        self.conn
            .query_row(
                "SELECT data, size, type, compression FROM objects WHERE hash = ?1",
                params![hash],
                |row| {
                    let data: Vec<u8> = row.get(0)?;
                    let size: i64 = row.get(1)?;
                    let object_type: String = row.get(2)?;
                    let compression: String = row.get(3)?;
                    Ok((data, size, object_type, compression))
                },
            )
            .optional()?
            .map(|(data, size, object_type, compression)| {
                Ok(ObjectRow {
                    data,
                    size: size as usize,
                    object_type: ObjectType::parse(&object_type)?,
                    compression: Compression::parse(&compression)?,
                })
            })
            .transpose()
    }

    fn fetch_delta(&self, hash: &str) -> Result<Option<DeltaRow>, StoreError> {
        self.conn
            .query_row(
                "SELECT base_hash, delta_data, original_size, delta_size, compression_ratio \
                 FROM deltas WHERE hash = ?1",
                params![hash],
                |row| {
                    let base_hash: String = row.get(0)?;
                    let delta_data: Vec<u8> = row.get(1)?;
                    let original_size: i64 = row.get(2)?;
                    let delta_size: i64 = row.get(3)?;
                    let compression_ratio: f64 = row.get(4)?;
                    Ok(DeltaRow {
                        base_hash,
                        delta_data,
                        original_size: original_size as usize,
                        delta_size: delta_size as usize,
                        compression_ratio,
                    })
                },
            )
            .optional()
            .map_err(StoreError::Database)
    }

    /// Stores `data` as a `type`-tagged object, compressed as requested.
    ///
    /// Insert-or-ignore on hash: if an object with this content's hash
    /// already exists, no write happens and `is_new` is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeltaCompressionNotDirectlyStorable`] if
    /// `compression` is [`Compression::Delta`] — only
    /// [`ObjectStore::store_blob_with_delta`] may write delta-compressed
    /// rows, since those require a companion `deltas` row written
    /// atomically. Otherwise returns [`StoreError::Database`] on failure.
    pub fn store_object(
        &self,
        data: &[u8],
        object_type: ObjectType,
        compression: Compression,
    ) -> Result<StoreOutcome, StoreError> {
        if compression == Compression::Delta {
            return Err(StoreError::DeltaCompressionNotDirectlyStorable);
        }

        let hash = hashing::hash(data);
        if self.fetch_row(&hash)?.is_some() {
            return Ok(StoreOutcome { hash, is_new: false });
        }

        let stored_bytes = match compression {
            Compression::None => data.to_vec(),
            Compression::Zlib => compression::compress(data),
            Compression::Delta => unreachable!("rejected above"),
        };

        self.conn.execute(
            "INSERT OR IGNORE INTO objects (hash, data, size, type, compression) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![hash, stored_bytes, data.len() as i64, object_type.as_str(), compression.as_str()],
        )?;

        Ok(StoreOutcome { hash, is_new: true })
    }

    /// Stores `data` as a blob, delta-compressed against `base_hash` when that
    /// turns out smaller than storing it in full.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure. Does not error when a
    /// delta turns out not worthwhile or the base is missing; those are
    /// reported via [`DeltaStoreOutcome::reason`] and a full store instead.
    pub fn store_blob_with_delta(
        &self,
        data: &[u8],
        base_hash: Option<&str>,
    ) -> Result<DeltaStoreOutcome, StoreError> {
        let hash = hashing::hash(data);
        if self.fetch_row(&hash)?.is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!(%hash, reason = "already_present", "delta decision");
            return Ok(DeltaStoreOutcome {
                hash,
                used_delta: false,
                reason: DeltaDecisionReason::AlreadyPresent,
                compression_ratio: None,
            });
        }

        let Some(base_hash) = base_hash else {
            self.store_object(data, ObjectType::Blob, Compression::Zlib)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(%hash, reason = "no_base_provided", "delta decision");
            return Ok(DeltaStoreOutcome {
                hash,
                used_delta: false,
                reason: DeltaDecisionReason::NoBaseProvided,
                compression_ratio: None,
            });
        };

        let Some(base) = self.get_object(base_hash)? else {
            self.store_object(data, ObjectType::Blob, Compression::Zlib)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(%hash, %base_hash, reason = "base_not_found", "delta decision");
            return Ok(DeltaStoreOutcome {
                hash,
                used_delta: false,
                reason: DeltaDecisionReason::BaseNotFound,
                compression_ratio: None,
            });
        };

        let built = delta::create(&base.data, data);
        if !built.is_worthwhile() {
            self.store_object(data, ObjectType::Blob, Compression::Zlib)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(%hash, %base_hash, reason = "delta_not_beneficial", ratio = built.compression_ratio(), "delta decision");
            return Ok(DeltaStoreOutcome {
                hash,
                used_delta: false,
                reason: DeltaDecisionReason::DeltaNotBeneficial,
                compression_ratio: Some(built.compression_ratio()),
            });
        }

        let delta_data = built.serialize();
        let delta_size = delta_data.len();
        let compression_ratio = built.compression_ratio();

        self.transaction(|| {
            self.conn.execute(
                "INSERT OR IGNORE INTO objects (hash, data, size, type, compression) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![hash, Vec::<u8>::new(), data.len() as i64, ObjectType::Blob.as_str(), Compression::Delta.as_str()],
            )?;
            self.conn.execute(
                "INSERT OR IGNORE INTO deltas (hash, base_hash, delta_data, original_size, delta_size, compression_ratio) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![hash, base_hash, delta_data, data.len() as i64, delta_size as i64, compression_ratio],
            )?;
            Ok(())
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%hash, %base_hash, reason = "delta_stored", ratio = compression_ratio, delta_size, "delta decision");

        Ok(DeltaStoreOutcome {
            hash,
            used_delta: true,
            reason: DeltaDecisionReason::DeltaStored,
            compression_ratio: Some(compression_ratio),
        })
    }

    /// Fetches and fully reconstructs an object by hash, resolving any delta chain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CyclicDeltaChain`] or [`StoreError::ChainTooDeep`]
    /// if the delta chain is malformed, [`StoreError::Reconstruct`] if the
    /// reconstructed bytes fail hash verification, and [`StoreError::Database`]
    /// on lower-level failures.
    pub fn get_object(&self, hash: &str) -> Result<Option<StoredObject>, StoreError> {
        let Some(row) = self.fetch_row(hash)? else {
            return Ok(None);
        };

        match row.compression {
            Compression::None => Ok(Some(StoredObject {
                hash: hash.to_string(),
                object_type: row.object_type,
                data: row.data,
                size: row.size,
            })),
            Compression::Zlib => Ok(Some(StoredObject {
                hash: hash.to_string(),
                object_type: row.object_type,
                data: compression::decompress(&row.data)?,
                size: row.size,
            })),
            Compression::Delta => {
                self.validate_delta_chain(hash, DEFAULT_MAX_CHAIN_DEPTH)?;

                let delta_row = self
                    .fetch_delta(hash)?
                    .ok_or_else(|| StoreError::MissingDeltaRecord(hash.to_string()))?;

                let base = self
                    .get_object(&delta_row.base_hash)?
                    .ok_or_else(|| StoreError::BaseObjectMissing(delta_row.base_hash.clone()))?;

                let operations = delta::deserialize_operations(&delta_row.delta_data)?;
                let data = delta::apply(&base.data, &operations, delta_row.original_size, hash)
                    .map_err(|source| StoreError::Reconstruct { hash: hash.to_string(), source })?;

                Ok(Some(StoredObject {
                    hash: hash.to_string(),
                    object_type: row.object_type,
                    data,
                    size: delta_row.original_size,
                }))
            }
        }
    }

    /// Fetches a blob's raw payload, or `None` if it is absent or not a blob.
    ///
    /// # Errors
    ///
    /// Same as [`ObjectStore::get_object`].
    pub fn get_blob(&self, hash: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .get_object(hash)?
            .filter(|object| matches!(object.object_type, ObjectType::Blob))
            .map(|object| object.data))
    }

    /// Fetches an object row exactly as stored, without decompressing or
    /// resolving a delta chain.
    ///
    /// Branch transfer uses this (rather than [`Self::get_object`]) so a
    /// pre-compressed or delta-compressed row can be copied into another
    /// store byte-for-byte.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn get_raw(&self, hash: &str) -> Result<Option<RawObject>, StoreError> {
        Ok(self.fetch_row(hash)?.map(|row| RawObject {
            hash: hash.to_string(),
            object_type: row.object_type,
            data: row.data,
            size: row.size,
            compression: row.compression,
        }))
    }

    /// Inserts an object row exactly as given, insert-or-ignore on hash.
    ///
    /// Returns `true` if a new row was inserted, `false` if `raw.hash` was
    /// already present (in which case the existing row is left untouched,
    /// matching [`Self::store_object`]'s dedup semantics).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn put_raw(&self, raw: &RawObject) -> Result<bool, StoreError> {
        if self.fetch_row(&raw.hash)?.is_some() {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO objects (hash, data, size, type, compression) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![raw.hash, raw.data, raw.size as i64, raw.object_type.as_str(), raw.compression.as_str()],
        )?;
        Ok(true)
    }

    /// Fetches a delta row exactly as stored, for verbatim transfer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn get_raw_delta(&self, hash: &str) -> Result<Option<RawDelta>, StoreError> {
        Ok(self.fetch_delta(hash)?.map(|row| RawDelta {
            hash: hash.to_string(),
            base_hash: row.base_hash,
            delta_data: row.delta_data,
            original_size: row.original_size,
            delta_size: row.delta_size,
            compression_ratio: row.compression_ratio,
        }))
    }

    /// Inserts a delta row exactly as given, insert-or-ignore on hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn put_raw_delta(&self, raw: &RawDelta) -> Result<bool, StoreError> {
        if self.fetch_delta(&raw.hash)?.is_some() {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO deltas (hash, base_hash, delta_data, original_size, delta_size, compression_ratio) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![raw.hash, raw.base_hash, raw.delta_data, raw.original_size as i64, raw.delta_size as i64, raw.compression_ratio],
        )?;
        Ok(true)
    }

    /// Lists every object hash currently stored, in no particular order.
    ///
    /// Used by branch import to enumerate a freshly-opened transfer file's
    /// rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn list_object_hashes(&self) -> Result<Vec<String>, StoreError> {
        let mut statement = self.conn.prepare("SELECT hash FROM objects")?;
        let hashes = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(hashes)
    }

    /// Walks a delta chain starting at `hash`, ensuring it terminates at a
    /// non-delta object within `max_depth` steps without revisiting a hash.
    ///
    /// A no-op if `hash` does not resolve to a delta-compressed row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CyclicDeltaChain`] on a revisit,
    /// [`StoreError::ChainTooDeep`] once `max_depth` is exceeded, and
    /// [`StoreError::MissingDeltaRecord`] / [`StoreError::BaseObjectMissing`]
    /// on a broken chain.
    pub fn validate_delta_chain(&self, hash: &str, max_depth: u32) -> Result<(), StoreError> {
        let mut visited = std::collections::HashSet::new();
        let mut current = hash.to_string();
        let mut depth = 0u32;

        loop {
            #[cfg(feature = "tracing")]
            tracing::trace!(%current, depth, "validating delta chain step");

            if !visited.insert(current.clone()) {
                return Err(StoreError::CyclicDeltaChain(current));
            }
            if depth > max_depth {
                return Err(StoreError::ChainTooDeep {
                    hash: hash.to_string(),
                    max_depth,
                });
            }

            let Some(row) = self.fetch_row(&current)? else {
                return Err(StoreError::BaseObjectMissing(current));
            };
            if row.compression != Compression::Delta {
                return Ok(());
            }

            let delta_row = self
                .fetch_delta(&current)?
                .ok_or_else(|| StoreError::MissingDeltaRecord(current.clone()))?;

            current = delta_row.base_hash;
            depth += 1;
        }
    }

    /// Points `name` at `hash`, replacing any previous target.
    ///
    /// `created_at` is preserved across an update to an existing ref;
    /// `updated_at` is always refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn set_ref(&self, name: &str, hash: &str, ref_type: RefType) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO refs (name, hash, type, created_at, updated_at) \
             VALUES (?1, ?2, ?3, strftime('%s','now'), strftime('%s','now')) \
             ON CONFLICT(name) DO UPDATE SET hash = excluded.hash, type = excluded.type, updated_at = excluded.updated_at",
            params![name, hash, ref_type.as_str()],
        )?;
        Ok(())
    }

    /// Looks up the ref `name`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn get_ref(&self, name: &str) -> Result<Option<RefEntry>, StoreError> {
        self.conn
            .query_row(
                "SELECT name, hash, type, created_at, updated_at FROM refs WHERE name = ?1",
                params![name],
                |row| {
                    let name: String = row.get(0)?;
                    let hash: String = row.get(1)?;
                    let ref_type: String = row.get(2)?;
                    let created_at: i64 = row.get(3)?;
                    let updated_at: i64 = row.get(4)?;
                    Ok((name, hash, ref_type, created_at, updated_at))
                },
            )
            .optional()?
            .map(|(name, hash, ref_type, created_at, updated_at)| {
                Ok(RefEntry {
                    name,
                    hash,
                    ref_type: RefType::parse(&ref_type)?,
                    created_at,
                    updated_at,
                })
            })
            .transpose()
    }

    /// Removes `name`, if it exists. A no-op if it does not.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn remove_ref(&self, name: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM refs WHERE name = ?1", params![name])?;
        Ok(())
    }

    /// Lists every ref, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn list_refs(&self) -> Result<Vec<RefEntry>, StoreError> {
        let mut statement = self.conn.prepare("SELECT name, hash, type, created_at, updated_at FROM refs ORDER BY name")?;
        let rows = statement
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let hash: String = row.get(1)?;
                let ref_type: String = row.get(2)?;
                let created_at: i64 = row.get(3)?;
                let updated_at: i64 = row.get(4)?;
                Ok((name, hash, ref_type, created_at, updated_at))
            })?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;

        rows.into_iter()
            .map(|(name, hash, ref_type, created_at, updated_at)| {
                Ok(RefEntry {
                    name,
                    hash,
                    ref_type: RefType::parse(&ref_type)?,
                    created_at,
                    updated_at,
                })
            })
            .collect()
    }

    /// Upserts a free-form metadata key/value pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO metadata (key, value, updated_at) VALUES (?1, ?2, strftime('%s','now')) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    /// Deletes every object (and companion delta row) whose hash is not in
    /// `keep`, returning the number of object rows removed.
    ///
    /// Callers compose this with a reachability walk over every ref (see
    /// the `graph` crate's `collect_reachable_from_refs`) to perform
    /// garbage collection: anything not transitively reachable from a
    /// branch or tag is deleted. Runs inside a single transaction so a
    /// concurrent reader never observes a partially-swept store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn sweep_unreachable(&self, keep: &std::collections::HashSet<String>) -> Result<usize, StoreError> {
        self.transaction(|| {
            let mut statement = self.conn.prepare("SELECT hash FROM objects")?;
            let all_hashes = statement
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, rusqlite::Error>>()?;

            let mut removed = 0usize;
            for hash in all_hashes {
                if keep.contains(&hash) {
                    continue;
                }
                self.conn.execute("DELETE FROM deltas WHERE hash = ?1", params![hash])?;
                self.conn.execute("DELETE FROM objects WHERE hash = ?1", params![hash])?;
                removed += 1;
            }

            Ok(removed)
        })
    }

    /// Looks up a metadata value by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on failure.
    pub fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?)
    }
}
