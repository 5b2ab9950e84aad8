pub mod config;
pub mod gaps;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod interval;
pub mod overview;
pub mod records;
pub mod slots;
pub mod store;
pub mod time;
pub mod validator;
pub mod view;

pub use config::{BookingPolicy, PolicyError};
pub use gaps::{free_gaps, gaps_at_least};
pub use interval::{Interval, IntervalError};
pub use overview::{bookings_frame, free_time_frame};
pub use records::{
    AvailabilityRecord, AvailabilityRow, BookingRecord, BookingRequest, BookingRow, FormError,
    FreeTimeRecord, FreeTimeRow, ParseFailure,
};
pub use slots::candidates;
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use store::{
    AvailabilitySource, BookingBackend, BookingStore, CsvStore, FreeTimeSink, MemoryStore,
    StoreError, StoreResult,
};
pub use time::{TimeOfDay, format_date, parse_date, parse_range, parse_time};
pub use validator::{BookingCheck, Rejection, check, check_within};
pub use view::{AvailabilityView, BookingError, BookingOutcome, SlotLookup};
