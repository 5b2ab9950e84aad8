use super::{AvailabilitySource, BookingStore, FreeTimeSink, StoreResult};
use crate::records::{AvailabilityRow, BookingRow, FreeTimeRow};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::path::Path;

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS availability (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project TEXT NOT NULL,
                date TEXT NOT NULL,
                time_range TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project TEXT NOT NULL,
                date TEXT NOT NULL,
                time_range TEXT NOT NULL,
                instrument TEXT NOT NULL,
                person TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS free_time (
                project TEXT NOT NULL,
                date TEXT NOT NULL,
                time_range TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    pub fn add_availability(&self, row: &AvailabilityRow) -> StoreResult<()> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO availability (project, date, time_range) VALUES (?1, ?2, ?3)",
            params![row.project, row.date, row.time_range],
        )?;
        Ok(())
    }

    pub fn free_time_rows(&self) -> StoreResult<Vec<FreeTimeRow>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT project, date, time_range FROM free_time ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(FreeTimeRow {
                project: row.get(0)?,
                date: row.get(1)?,
                time_range: row.get(2)?,
            })
        })?;
        let collected = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(collected)
    }
}

impl AvailabilitySource for SqliteStore {
    fn availability_rows(&self) -> StoreResult<Vec<AvailabilityRow>> {
        let conn = self.connection.lock();
        let mut stmt =
            conn.prepare("SELECT project, date, time_range FROM availability ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(AvailabilityRow {
                project: row.get(0)?,
                date: row.get(1)?,
                time_range: row.get(2)?,
            })
        })?;
        let collected = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(collected)
    }
}

impl BookingStore for SqliteStore {
    fn booking_rows(&self) -> StoreResult<Vec<BookingRow>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT project, date, time_range, instrument, person FROM bookings ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BookingRow {
                project: row.get(0)?,
                date: row.get(1)?,
                time_range: row.get(2)?,
                instrument: row.get(3)?,
                person: row.get(4)?,
            })
        })?;
        let collected = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(collected)
    }

    fn append_booking(&self, row: &BookingRow) -> StoreResult<()> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO bookings (project, date, time_range, instrument, person) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.project, row.date, row.time_range, row.instrument, row.person],
        )?;
        Ok(())
    }
}

impl FreeTimeSink for SqliteStore {
    fn replace_free_time(&self, rows: &[FreeTimeRow]) -> StoreResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM free_time", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO free_time (project, date, time_range) VALUES (?1, ?2, ?3)")?;
            for row in rows {
                stmt.execute(params![row.project, row.date, row.time_range])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
