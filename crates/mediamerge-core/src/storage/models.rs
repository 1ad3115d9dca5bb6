/// One file in the curated library. Written once by the indexing pass and
/// immutable afterward; never deleted by the pipeline.
#[derive(Debug, Clone)]
pub struct OriginalAsset {
    pub id: i64,
    /// Filename with parenthetical duplicate markers removed; the join key
    /// between library and backup files.
    pub distinct_name: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub capture_date: Option<String>,
}

/// Insert form for a library file (id assigned by the store).
#[derive(Debug, Clone)]
pub struct NewOriginalAsset {
    pub distinct_name: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub capture_date: Option<String>,
}

/// Join row for one (original, duplicate) pair judged similar enough, plus
/// its arbitration and completion state. At most one link exists per pair;
/// completion is monotonic and permanently excludes the link from
/// arbitration.
#[derive(Debug, Clone)]
pub struct MatchLink {
    pub id: i64,
    pub original_id: i64,
    pub duplicate_id: i64,
    pub similarity: f64,
    pub staged_path: Option<String>,
    pub completed: bool,
}

/// Insert form for a match link.
#[derive(Debug, Clone)]
pub struct NewMatchLink {
    pub original_id: i64,
    pub duplicate_id: i64,
    pub similarity: f64,
}

/// A match whose duplicate outranks its original by size and which has not
/// been staged or completed yet.
#[derive(Debug, Clone)]
pub struct StageableMatch {
    pub link_id: i64,
    pub duplicate_path: String,
}

/// A staged, unfinished match joined with everything finalization needs.
#[derive(Debug, Clone)]
pub struct FinalizableMatch {
    pub link_id: i64,
    pub staged_path: String,
    pub original_path: String,
    pub original_capture_date: Option<String>,
    pub duplicate_capture_date: Option<String>,
}
