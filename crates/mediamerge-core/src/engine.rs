use crate::config::{self, AppConfig};
use crate::error::Error;
use crate::matcher;
use crate::metadata::{MetadataReader, MetadataWriter};
use crate::placer;
use crate::reconcile::dates::{self, Decision};
use crate::scanner;
use crate::similarity::{FrameDecoder, SimilarityScorer};
use crate::storage::models::{FinalizableMatch, NewMatchLink, NewOriginalAsset};
use crate::storage::Database;
use chrono_tz::Tz;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// The reconciliation pipeline. Fully sequential: every frame decode,
/// similarity computation, store access, file copy, and metadata write runs
/// to completion before the next begins. Crash/resume safety comes from
/// persisted state alone: a staged-but-incomplete match link skips
/// placement on the next run and retries only reconciliation and
/// finalization.
pub struct ReconcileEngine<'a> {
    config: &'a AppConfig,
    db: &'a Database,
    decoder: &'a dyn FrameDecoder,
    reader: &'a dyn MetadataReader,
    writer: &'a dyn MetadataWriter,
    tz: Tz,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub originals_indexed: usize,
    pub duplicates_recorded: usize,
    pub links_recorded: usize,
    pub copies_staged: usize,
    pub matches_completed: usize,
    pub index_duration: Duration,
    pub detect_duration: Duration,
    pub reconcile_duration: Duration,
}

impl<'a> ReconcileEngine<'a> {
    pub fn new(
        config: &'a AppConfig,
        db: &'a Database,
        decoder: &'a dyn FrameDecoder,
        reader: &'a dyn MetadataReader,
        writer: &'a dyn MetadataWriter,
    ) -> Result<Self, Error> {
        let tz = config.timezone.parse::<Tz>().map_err(|err| {
            Error::Other(format!("Invalid timezone '{}': {}", config.timezone, err))
        })?;
        Ok(Self {
            config,
            db,
            decoder,
            reader,
            writer,
            tz,
        })
    }

    /// Run the full pipeline: index, detect over every backup root,
    /// reconcile. Passes are sequenced independently; a fatal failure
    /// aborts only its own pass.
    pub fn run(&self) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        let start = Instant::now();
        summary.originals_indexed = self.index_library()?;
        summary.index_duration = start.elapsed();

        let start = Instant::now();
        let backup_roots =
            config::non_overlapping_directories(self.config.backup_roots.clone());
        for root in &backup_roots {
            info!("Searching backup location for duplicates: {}", root);
            let (duplicates, links) = self.detect_duplicates(Path::new(root))?;
            summary.duplicates_recorded += duplicates;
            summary.links_recorded += links;
        }
        summary.detect_duration = start.elapsed();

        let start = Instant::now();
        let (staged, completed) = self.reconcile()?;
        summary.copies_staged = staged;
        summary.matches_completed = completed;
        summary.reconcile_duration = start.elapsed();

        Ok(summary)
    }

    /// Index the curated library into the store. Original assets are
    /// written once and immutable afterward, so a store that already holds
    /// them is left untouched.
    pub fn index_library(&self) -> Result<usize, Error> {
        if self.db.count_original_assets()? > 0 {
            info!("Library already indexed, skipping");
            return Ok(0);
        }

        info!("Indexing library: {}", self.config.library_root);
        let mut batch: Vec<NewOriginalAsset> = Vec::new();
        let mut inserted = 0;

        for path in scanner::media_files(Path::new(&self.config.library_root)) {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let file_size = match fs::metadata(&path) {
                Ok(metadata) => metadata.len() as i64,
                Err(err) => {
                    warn!("Could not stat {}: {}", path.display(), err);
                    continue;
                }
            };
            let capture_date = self.read_capture_date(&path);

            batch.push(NewOriginalAsset {
                distinct_name: matcher::distinct_name(file_name),
                file_name: file_name.to_string(),
                file_path: path.to_string_lossy().into_owned(),
                file_size,
                capture_date,
            });

            if batch.len() >= self.config.batch_size {
                inserted += self.db.insert_original_assets(&batch)?;
                info!("Indexed batch of {} library files", batch.len());
                batch.clear();
            }
        }
        if !batch.is_empty() {
            inserted += self.db.insert_original_assets(&batch)?;
        }

        info!("Indexed {} library files", inserted);
        Ok(inserted)
    }

    /// Detection pass over one backup root. Every file with at least one
    /// name candidate is scored against all of its candidates; a duplicate
    /// asset plus one match link per confirmed candidate is recorded.
    pub fn detect_duplicates(&self, root: &Path) -> Result<(usize, usize), Error> {
        let scorer = SimilarityScorer::new(self.decoder, self.config.frame_size);
        let mut duplicates = 0;
        let mut links = 0;

        for path in scanner::media_files(root) {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let candidates = matcher::find_candidates(self.db, file_name)?;
            if candidates.is_empty() {
                continue;
            }

            let mut confirmed: Vec<NewMatchLink> = Vec::new();
            for candidate in &candidates {
                // A matched original that vanished from disk is not an
                // error; the candidate is skipped.
                if !Path::new(&candidate.file_path).exists() {
                    debug!("Original no longer on disk: {}", candidate.file_path);
                    continue;
                }
                let score = scorer.compare(&path, Path::new(&candidate.file_path));
                debug!(
                    "Similarity {:.3} between {} and {}",
                    score,
                    path.display(),
                    candidate.file_path
                );
                if score >= self.config.similarity_threshold {
                    confirmed.push(NewMatchLink {
                        original_id: candidate.id,
                        duplicate_id: 0,
                        similarity: score,
                    });
                }
            }
            if confirmed.is_empty() {
                continue;
            }

            let file_size = match fs::metadata(&path) {
                Ok(metadata) => metadata.len() as i64,
                Err(err) => {
                    warn!("Could not stat {}: {}", path.display(), err);
                    continue;
                }
            };
            let capture_date = self.read_capture_date(&path);
            let duplicate_id = self.db.insert_duplicate_asset(
                &path.to_string_lossy(),
                file_size,
                capture_date.as_deref(),
            )?;
            for link in &mut confirmed {
                link.duplicate_id = duplicate_id;
            }
            links += self.db.insert_match_links(&confirmed)?;
            duplicates += 1;
        }

        info!(
            "Recorded {} duplicate assets and {} match links under {}",
            duplicates,
            links,
            root.display()
        );
        Ok((duplicates, links))
    }

    /// Reconciliation pass: stage every better copy, then finalize every
    /// staged match.
    pub fn reconcile(&self) -> Result<(usize, usize), Error> {
        let staged = self.stage_best_copies()?;
        let completed = self.finalize_matches()?;
        Ok((staged, completed))
    }

    /// Drain the stageable matches in batches, copying each duplicate into
    /// the staging area and persisting the staged path. Already-staged
    /// links are excluded by the query, so the placer is never invoked
    /// twice for the same link.
    pub fn stage_best_copies(&self) -> Result<usize, Error> {
        let staging_root = Path::new(&self.config.staging_root);
        let mut staged = 0;

        loop {
            let batch = self.db.find_stageable_matches(self.config.batch_size)?;
            if batch.is_empty() {
                break;
            }
            for entry in &batch {
                let dest = placer::stage_copy(Path::new(&entry.duplicate_path), staging_root)?;
                self.db
                    .set_staged_path(entry.link_id, &dest.to_string_lossy())?;
                staged += 1;
            }
            info!("Staged batch of {} better copies", batch.len());
        }

        Ok(staged)
    }

    /// Drain the staged, uncompleted matches in batches: apply the date
    /// decision to the staged file, move it over the original, mark the
    /// link complete. A record that fails stays staged and incomplete for
    /// a manual rerun; it is attempted at most once per run, and the rest
    /// of the batch continues.
    pub fn finalize_matches(&self) -> Result<usize, Error> {
        let mut completed = 0;
        let mut failed: HashSet<i64> = HashSet::new();

        loop {
            let batch = self.db.find_finalizable_matches(self.config.batch_size)?;
            // Failed records remain in the store's result set; filtering
            // them here keeps the drain to one attempt per record.
            let pending: Vec<&FinalizableMatch> = batch
                .iter()
                .filter(|entry| !failed.contains(&entry.link_id))
                .collect();
            if pending.is_empty() {
                break;
            }
            for entry in &pending {
                match self.finalize_one(entry) {
                    Ok(()) => completed += 1,
                    Err(err) => {
                        error!("Could not finalize match {}: {}", entry.link_id, err);
                        failed.insert(entry.link_id);
                    }
                }
            }
            info!("Finalized batch of {} matches", pending.len());
        }

        Ok(completed)
    }

    fn finalize_one(&self, entry: &FinalizableMatch) -> Result<(), Error> {
        let decision = dates::reconcile(
            entry.original_capture_date.as_deref(),
            entry.duplicate_capture_date.as_deref(),
            self.tz,
        )?;

        let staged = Path::new(&entry.staged_path);
        let original = Path::new(&entry.original_path);
        match &decision {
            Decision::CopyOriginalTags => self
                .writer
                .copy_all_tags_and_set_modify_date(original, staged)?,
            Decision::SetModifyDate(timestamp) => self
                .writer
                .set_modify_date(staged, &dates::format_exif(timestamp))?,
        }

        placer::move_replace(staged, original)?;
        self.db.mark_completed(entry.link_id)?;
        debug!(
            "Replaced {} with staged copy {}",
            entry.original_path, entry.staged_path
        );
        Ok(())
    }

    fn read_capture_date(&self, path: &Path) -> Option<String> {
        match self.reader.capture_date(path) {
            Ok(date) => date,
            Err(err) => {
                warn!("Could not read capture date for {}: {}", path.display(), err);
                None
            }
        }
    }
}
