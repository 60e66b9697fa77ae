//! Stop directory, resolver and GTFS stop import.
//!
//! The directory is loaded from the static GTFS feed at startup (or from a
//! disk cache) and replaced wholesale once a day. Request handlers only ever
//! read a snapshot of it.

mod cache;
mod directory;
mod error;
mod import;
mod refresh;
mod resolve;

pub use cache::{StopCache, StopCacheConfig};
pub use directory::{StopDirectory, StopTable};
pub use error::{ResolveError, StopImportError};
pub use import::{GtfsImporter, GtfsImporterConfig, extract_stops_txt, parse_stops};
pub use refresh::{REFRESH_TZ, StopLoader, duration_until_next};
pub use resolve::{Candidate, StopResolver};
