use super::{AvailabilitySource, BookingStore, FreeTimeSink, StoreResult};
use crate::records::{AvailabilityRow, BookingRow, FreeTimeRow};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    availability: RwLock<Vec<AvailabilityRow>>,
    bookings: RwLock<Vec<BookingRow>>,
    free_time: RwLock<Vec<FreeTimeRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_availability<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = AvailabilityRow>,
    {
        let store = Self::default();
        store.availability.write().extend(rows);
        store
    }

    pub fn push_availability(&self, row: AvailabilityRow) {
        self.availability.write().push(row);
    }

    pub fn free_time_rows(&self) -> Vec<FreeTimeRow> {
        self.free_time.read().clone()
    }
}

impl AvailabilitySource for MemoryStore {
    fn availability_rows(&self) -> StoreResult<Vec<AvailabilityRow>> {
        Ok(self.availability.read().clone())
    }
}

impl BookingStore for MemoryStore {
    fn booking_rows(&self) -> StoreResult<Vec<BookingRow>> {
        Ok(self.bookings.read().clone())
    }

    fn append_booking(&self, row: &BookingRow) -> StoreResult<()> {
        self.bookings.write().push(row.clone());
        Ok(())
    }
}

impl FreeTimeSink for MemoryStore {
    fn replace_free_time(&self, rows: &[FreeTimeRow]) -> StoreResult<()> {
        *self.free_time.write() = rows.to_vec();
        Ok(())
    }
}
