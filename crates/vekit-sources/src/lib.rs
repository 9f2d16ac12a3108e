pub mod download;

pub use download::{
    CHUNK_SIZE, DEFAULT_FILENAME, DEFAULT_TIMEOUT_SECS, Downloader, filename_from_url,
    unique_path,
};
