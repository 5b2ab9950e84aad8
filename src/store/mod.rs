use crate::records::{AvailabilityRow, BookingRow, FreeTimeRow};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Coordinator-maintained availability table. Read-only from this crate.
pub trait AvailabilitySource {
    fn availability_rows(&self) -> StoreResult<Vec<AvailabilityRow>>;
}

/// Append-only booking table.
///
/// `append_booking` is the only serialization point between sessions. It is
/// expected to append one row atomically; it is not a check-and-append.
pub trait BookingStore {
    fn booking_rows(&self) -> StoreResult<Vec<BookingRow>>;
    fn append_booking(&self, row: &BookingRow) -> StoreResult<()>;
}

/// Destination of the derived free-time report, overwritten wholesale.
pub trait FreeTimeSink {
    fn replace_free_time(&self, rows: &[FreeTimeRow]) -> StoreResult<()>;
}

/// A backend that plays all three roles.
pub trait BookingBackend: AvailabilitySource + BookingStore + FreeTimeSink {}

impl<T> BookingBackend for T where T: AvailabilitySource + BookingStore + FreeTimeSink + ?Sized {}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::CsvStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
