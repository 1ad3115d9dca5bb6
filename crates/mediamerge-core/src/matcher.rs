use crate::storage::models::OriginalAsset;
use crate::storage::Database;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A space, an opening parenthesis, anything up to the closing
    // parenthesis, immediately followed by the extension dot.
    static ref DUPLICATE_MARKER: Regex = Regex::new(r"\s\([^)]*\)\.").unwrap();
}

/// Strip parenthetical duplicate markers from a filename, e.g.
/// `IMG_0001 (1).jpg` → `IMG_0001.jpg`. Markers without the preceding
/// space (`IMG_0001(edited).jpg`) are left untouched.
pub fn distinct_name(file_name: &str) -> String {
    DUPLICATE_MARKER.replace_all(file_name, ".").into_owned()
}

/// All original assets sharing the normalized name: zero, one, or several.
/// Ambiguous names are returned in full and evaluated exhaustively by the
/// detection pass rather than resolved to a single best match.
pub fn find_candidates(db: &Database, file_name: &str) -> rusqlite::Result<Vec<OriginalAsset>> {
    db.find_originals_by_distinct_name(&distinct_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_duplicate_marker() {
        assert_eq!(distinct_name("IMG_0001 (1).jpg"), "IMG_0001.jpg");
        assert_eq!(distinct_name("IMG_0001 (copy 2).jpg"), "IMG_0001.jpg");
        assert_eq!(distinct_name("holiday (1) (2).png"), "holiday (1).png");
    }

    #[test]
    fn test_marker_without_space_is_unchanged() {
        assert_eq!(distinct_name("IMG_0001(2).jpg"), "IMG_0001(2).jpg");
        assert_eq!(distinct_name("IMG_0001(edited).jpg"), "IMG_0001(edited).jpg");
    }

    #[test]
    fn test_plain_names_are_unchanged() {
        assert_eq!(distinct_name("IMG_0001.jpg"), "IMG_0001.jpg");
        assert_eq!(distinct_name("movie.mp4"), "movie.mp4");
    }
}
