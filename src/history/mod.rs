//! Listening-history ingestion: file discovery, normalization and artist totals.

mod artists;
mod models;
mod normalizer;
mod source;

pub use artists::{ArtistTotal, ArtistTotals};
pub use models::{
    ArtistKey, PlayEvent, RawPlayRecord, SourceDocument, UNKNOWN_ARTIST, UNKNOWN_GENRE,
    UNKNOWN_TRACK,
};
pub use normalizer::{
    normalize_document, normalize_documents, normalize_record, parse_end_time, NormalizeError,
    NormalizedHistory,
};
pub use source::{
    find_history_files, load_history_dir, read_documents, SourceError, HISTORY_FILE_PATTERN,
};
