mod walk;

pub use walk::{is_media_file, media_files, MEDIA_EXTENSIONS};
