use crate::error::Error;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Outcome of capture-date arbitration for one placed match.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The original's metadata is authoritative. All of its tags are copied
    /// onto the staged file, refreshing the modify date.
    CopyOriginalTags,
    /// The duplicate's own timestamp is authoritative, for the modify-date
    /// field only.
    SetModifyDate(DateTime<Tz>),
}

/// A capture-date string parsed from one of the three fixed layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedDate {
    /// Bare `YYYY:MM:DD HH:MM:SS`, no offset information.
    Naive(NaiveDateTime),
    /// Fractional seconds with an explicit `Z` or UTC offset.
    Zoned(DateTime<FixedOffset>),
}

/// Parse a capture-date string. The three layouts are distinguished by
/// length: 19 chars bare, 24 chars fractional with `Z`, 28 chars fractional
/// with explicit offset. Anything else is unknown.
pub fn parse_capture_date(value: &str) -> Option<ParsedDate> {
    match value.len() {
        19 => NaiveDateTime::parse_from_str(value, "%Y:%m:%d %H:%M:%S")
            .ok()
            .map(ParsedDate::Naive),
        24 => {
            let bare = value.strip_suffix('Z')?;
            NaiveDateTime::parse_from_str(bare, "%Y:%m:%d %H:%M:%S%.f")
                .ok()
                .map(|naive| ParsedDate::Zoned(naive.and_utc().fixed_offset()))
        }
        28 => DateTime::parse_from_str(value, "%Y:%m:%d %H:%M:%S%.f%z")
            .ok()
            .map(ParsedDate::Zoned),
        _ => None,
    }
}

/// Decide which capture-date signal is authoritative for a placed match.
///
/// The original's timestamp must parse; without it no safe decision exists
/// and the record fails. The original is always recorded without an offset
/// and is interpreted as UTC. A duplicate whose local time lands strictly
/// later than the original's is treated as metadata drift, not better
/// information, so the original's full metadata wins; otherwise the
/// duplicate's own timestamp wins for the modify date.
pub fn reconcile(
    original: Option<&str>,
    duplicate: Option<&str>,
    tz: Tz,
) -> Result<Decision, Error> {
    let parsed_original = original.and_then(parse_capture_date).ok_or(Error::DateParse {
        value: original.map(str::to_owned),
    })?;

    let original_utc: DateTime<Utc> = match parsed_original {
        ParsedDate::Naive(naive) => Utc.from_utc_datetime(&naive),
        ParsedDate::Zoned(zoned) => zoned.with_timezone(&Utc),
    };
    let original_local = original_utc.with_timezone(&tz);

    let parsed_duplicate = match duplicate.and_then(parse_capture_date) {
        Some(parsed) => parsed,
        None => return Ok(Decision::CopyOriginalTags),
    };

    let duplicate_local = match parsed_duplicate {
        // A bare timestamp on the backup side is read as local wall time.
        ParsedDate::Naive(naive) => match tz.from_local_datetime(&naive).earliest() {
            Some(local) => local,
            None => return Ok(Decision::CopyOriginalTags),
        },
        ParsedDate::Zoned(zoned) => zoned.with_timezone(&tz),
    };

    if duplicate_local > original_local {
        Ok(Decision::CopyOriginalTags)
    } else {
        Ok(Decision::SetModifyDate(duplicate_local))
    }
}

/// Render a reconciled timestamp in the layout the tag writer expects.
pub fn format_exif(timestamp: &DateTime<Tz>) -> String {
    timestamp.format("%Y:%m:%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    fn utc() -> Tz {
        "UTC".parse().unwrap()
    }

    #[test]
    fn test_parse_bare_layout() {
        let parsed = parse_capture_date("2020:01:01 10:00:00").unwrap();
        assert!(matches!(parsed, ParsedDate::Naive(_)));
    }

    #[test]
    fn test_parse_zulu_layout() {
        let parsed = parse_capture_date("2020:01:01 10:00:00.000Z").unwrap();
        assert!(matches!(parsed, ParsedDate::Zoned(_)));
    }

    #[test]
    fn test_parse_offset_layout() {
        let parsed = parse_capture_date("2020:01:01 10:00:00.000+0100").unwrap();
        let ParsedDate::Zoned(zoned) = parsed else {
            panic!("expected zoned");
        };
        assert_eq!(zoned.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_unknown_layouts_do_not_parse() {
        assert_eq!(parse_capture_date("2020-01-01 10:00:00"), None);
        assert_eq!(parse_capture_date("not a date at all!!"), None);
        assert_eq!(parse_capture_date(""), None);
        assert_eq!(parse_capture_date("2020:01:01"), None);
    }

    #[test]
    fn test_unparseable_original_is_fatal() {
        let result = reconcile(Some("garbage"), Some("2020:01:01 10:00:00"), utc());
        assert!(matches!(result, Err(Error::DateParse { .. })));

        let result = reconcile(None, Some("2020:01:01 10:00:00"), utc());
        assert!(matches!(result, Err(Error::DateParse { .. })));
    }

    #[test]
    fn test_missing_duplicate_date_copies_original_tags() {
        let decision = reconcile(Some("2020:01:01 10:00:00"), None, utc()).unwrap();
        assert_eq!(decision, Decision::CopyOriginalTags);

        let decision = reconcile(Some("2020:01:01 10:00:00"), Some("junk"), utc()).unwrap();
        assert_eq!(decision, Decision::CopyOriginalTags);
    }

    #[test]
    fn test_equal_times_use_duplicate_timestamp() {
        // Duplicate is not strictly later, so its own timestamp wins.
        let decision = reconcile(
            Some("2020:01:01 10:00:00"),
            Some("2020:01:01 10:00:00.000Z"),
            utc(),
        )
        .unwrap();
        let Decision::SetModifyDate(timestamp) = decision else {
            panic!("expected a modify-date decision");
        };
        assert_eq!(format_exif(&timestamp), "2020:01:01 10:00:00");
    }

    #[test]
    fn test_later_duplicate_copies_original_tags() {
        let decision = reconcile(
            Some("2020:01:01 10:00:00"),
            Some("2020:01:02 10:00:00.000+0000"),
            utc(),
        )
        .unwrap();
        assert_eq!(decision, Decision::CopyOriginalTags);
    }

    #[test]
    fn test_earlier_duplicate_uses_own_timestamp() {
        let decision = reconcile(
            Some("2020:01:01 10:00:00"),
            Some("2019:12:31 23:59:59.000Z"),
            utc(),
        )
        .unwrap();
        assert!(matches!(decision, Decision::SetModifyDate(_)));
    }

    #[test]
    fn test_offset_is_honored_in_comparison() {
        // 11:00 at +02:00 is 09:00 UTC, earlier than the original's 10:00.
        let tz: Tz = "Europe/Amsterdam".parse().unwrap();
        let decision = reconcile(
            Some("2020:06:01 10:00:00"),
            Some("2020:06:01 11:00:00.000+0200"),
            tz,
        )
        .unwrap();
        assert!(matches!(decision, Decision::SetModifyDate(_)));
    }
}
