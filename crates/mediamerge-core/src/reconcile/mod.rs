pub mod dates;

pub use dates::{parse_capture_date, reconcile, Decision};
