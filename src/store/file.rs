use super::{AvailabilitySource, BookingStore, FreeTimeSink, StoreError, StoreResult};
use crate::records::{AvailabilityRow, BookingRow, FreeTimeRow};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub const AVAILABILITY_FILE: &str = "availability.csv";
pub const BOOKINGS_FILE: &str = "bookings.csv";
pub const FREE_TIME_FILE: &str = "free_time.csv";

/// Three CSV files in one directory, one per table.
#[derive(Debug)]
pub struct CsvStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn availability_path(&self) -> PathBuf {
        self.dir.join(AVAILABILITY_FILE)
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.dir.join(BOOKINGS_FILE)
    }

    pub fn free_time_path(&self) -> PathBuf {
        self.dir.join(FREE_TIME_FILE)
    }

    /// Replace the availability table. Coordinators normally edit the file
    /// directly; this exists for seeding.
    pub fn write_availability(&self, rows: &[AvailabilityRow]) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        write_replacing(&self.availability_path(), rows)
    }

    pub fn free_time_rows(&self) -> StoreResult<Vec<FreeTimeRow>> {
        read_rows(&self.free_time_path())
    }
}

impl AvailabilitySource for CsvStore {
    fn availability_rows(&self) -> StoreResult<Vec<AvailabilityRow>> {
        read_rows(&self.availability_path())
    }
}

impl BookingStore for CsvStore {
    fn booking_rows(&self) -> StoreResult<Vec<BookingRow>> {
        read_rows(&self.bookings_path())
    }

    fn append_booking(&self, row: &BookingRow) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.bookings_path())?;
        let needs_header = file.seek(SeekFrom::End(0))? == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}

impl FreeTimeSink for CsvStore {
    fn replace_free_time(&self, rows: &[FreeTimeRow]) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        write_replacing(&self.free_time_path(), rows)
    }
}

/// Missing files read as empty tables. Records that fail to decode are
/// skipped; I/O failures abort.
fn read_rows<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist yet; treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(err) if err.is_io_error() => return Err(StoreError::Csv(err)),
            Err(err) => log::warn!("skipping record #{idx} in {}: {err}", path.display()),
        }
    }
    Ok(rows)
}

/// Write to a sibling temp file, then rename over the target.
fn write_replacing<T: serde::Serialize>(path: &Path, rows: &[T]) -> StoreResult<()> {
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
