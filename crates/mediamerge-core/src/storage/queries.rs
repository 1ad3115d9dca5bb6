use super::models::*;
use super::sqlite::Database;
use crate::error::is_constraint_violation;
use rusqlite::{params, OptionalExtension, Result};
use tracing::{debug, warn};

impl Database {
    // ── Original Assets ──────────────────────────────────────────

    pub fn insert_original_assets(&self, assets: &[NewOriginalAsset]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO original_asset \
                 (distinct_name, file_name, file_path, file_size, capture_date) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(file_path) DO NOTHING",
            )?;
            for asset in assets {
                count += stmt.execute(params![
                    asset.distinct_name,
                    asset.file_name,
                    asset.file_path,
                    asset.file_size,
                    asset.capture_date,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} original assets", count);
        Ok(count)
    }

    pub fn count_original_assets(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM original_asset", [], |row| row.get(0))
    }

    pub fn find_originals_by_distinct_name(&self, name: &str) -> Result<Vec<OriginalAsset>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT id, distinct_name, file_name, file_path, file_size, capture_date \
             FROM original_asset WHERE distinct_name = ?1",
        )?;
        let assets = stmt
            .query_map(params![name], |row| {
                Ok(OriginalAsset {
                    id: row.get(0)?,
                    distinct_name: row.get(1)?,
                    file_name: row.get(2)?,
                    file_path: row.get(3)?,
                    file_size: row.get(4)?,
                    capture_date: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(assets)
    }

    // ── Duplicate Assets & Match Links ───────────────────────────

    /// Persist a discovered backup file, reusing its row when the same
    /// path was already recorded in an earlier run so the match-link
    /// uniqueness constraint applies across runs.
    pub fn insert_duplicate_asset(
        &self,
        file_path: &str,
        file_size: i64,
        capture_date: Option<&str>,
    ) -> Result<i64> {
        let existing: Option<i64> = self
            .connection()
            .query_row(
                "SELECT id FROM duplicate_asset WHERE file_path = ?1",
                params![file_path],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        self.connection().execute(
            "INSERT INTO duplicate_asset (file_path, file_size, capture_date) \
             VALUES (?1, ?2, ?3)",
            params![file_path, file_size, capture_date],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// Insert match links, one per confirmed (original, duplicate) pair.
    /// A link violating the pair uniqueness constraint is logged and
    /// skipped; rediscovering the same pair across runs must not crash the
    /// pipeline.
    pub fn insert_match_links(&self, links: &[NewMatchLink]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO match_link (original_id, duplicate_id, similarity) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for link in links {
                match stmt.execute(params![link.original_id, link.duplicate_id, link.similarity]) {
                    Ok(inserted) => count += inserted,
                    Err(err) if is_constraint_violation(&err) => {
                        warn!(
                            "Match link ({}, {}) already recorded, skipping",
                            link.original_id, link.duplicate_id
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        tx.commit()?;
        debug!("Inserted {} match links", count);
        Ok(count)
    }

    pub fn get_match_link(&self, link_id: i64) -> Result<MatchLink> {
        self.connection().query_row(
            "SELECT id, original_id, duplicate_id, similarity, staged_path, completed \
             FROM match_link WHERE id = ?1",
            params![link_id],
            |row| {
                Ok(MatchLink {
                    id: row.get(0)?,
                    original_id: row.get(1)?,
                    duplicate_id: row.get(2)?,
                    similarity: row.get(3)?,
                    staged_path: row.get(4)?,
                    completed: row.get::<_, Option<i64>>(5)?.is_some(),
                })
            },
        )
    }

    // ── Best-Copy Arbitration ────────────────────────────────────

    /// Match links whose duplicate outranks its original by size and which
    /// are neither staged nor completed, in store order, bounded by `limit`.
    /// Processed rows leave the predicate, so a draining re-query never
    /// yields the same row twice in a run.
    pub fn find_stageable_matches(&self, limit: usize) -> Result<Vec<StageableMatch>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT ml.id, da.file_path \
             FROM match_link ml \
             JOIN original_asset oa ON oa.id = ml.original_id \
             JOIN duplicate_asset da ON da.id = ml.duplicate_id \
             WHERE da.file_size > oa.file_size \
               AND ml.completed IS NULL \
               AND ml.staged_path IS NULL \
             LIMIT ?1",
        )?;
        let matches = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StageableMatch {
                    link_id: row.get(0)?,
                    duplicate_path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(matches)
    }

    /// Staged, uncompleted match links joined with the paths and capture
    /// dates finalization needs.
    pub fn find_finalizable_matches(&self, limit: usize) -> Result<Vec<FinalizableMatch>> {
        let mut stmt = self.connection().prepare_cached(
            "SELECT ml.id, ml.staged_path, oa.file_path, oa.capture_date, da.capture_date \
             FROM match_link ml \
             JOIN original_asset oa ON oa.id = ml.original_id \
             JOIN duplicate_asset da ON da.id = ml.duplicate_id \
             WHERE ml.staged_path IS NOT NULL \
               AND ml.completed IS NULL \
             LIMIT ?1",
        )?;
        let matches = stmt
            .query_map(params![limit as i64], |row| {
                Ok(FinalizableMatch {
                    link_id: row.get(0)?,
                    staged_path: row.get(1)?,
                    original_path: row.get(2)?,
                    original_capture_date: row.get(3)?,
                    duplicate_capture_date: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(matches)
    }

    pub fn set_staged_path(&self, link_id: i64, path: &str) -> Result<()> {
        self.connection().execute(
            "UPDATE match_link SET staged_path = ?1 WHERE id = ?2",
            params![path, link_id],
        )?;
        Ok(())
    }

    /// Terminal, irreversible state for a match link.
    pub fn mark_completed(&self, link_id: i64) -> Result<()> {
        self.connection().execute(
            "UPDATE match_link SET completed = 1 WHERE id = ?1",
            params![link_id],
        )?;
        Ok(())
    }
}
