use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Text encoding of `HistoryRecord::timestamp` (second precision, sorts lexicographically)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted calculation
/// Height is kept in meters, the unit the formula used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    #[serde(rename = "ID")]
    pub id: i64,

    #[serde(rename = "Date", serialize_with = "timestamp_text")]
    pub timestamp: NaiveDateTime,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Weight")]
    pub weight: f64,

    #[serde(rename = "Height")]
    pub height: f64,

    #[serde(rename = "BMI")]
    pub bmi: f64,

    #[serde(rename = "Category")]
    pub category: String,
}

fn timestamp_text<S: serde::Serializer>(
    ts: &NaiveDateTime,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Current local wall-clock time truncated to whole seconds
pub fn now_timestamp() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Create the history table if it does not exist yet
pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL keeps committed appends safe across a crash; in-memory databases ignore it
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bmi_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT,
            name TEXT,
            weight REAL,
            height REAL,
            bmi REAL,
            category TEXT
        )",
        [],
    )?;

    debug!("bmi_data table ready");
    Ok(())
}

// ============================================================================
// HISTORY STORE
// ============================================================================

/// Append-only log of calculations backed by a single SQLite connection
pub struct HistoryStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl HistoryStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        debug!(path = %path.display(), "history store opened");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Store that lives only as long as this value (tests, scratch sessions)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;

        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a record stamped with the current wall-clock time
    pub fn append(
        &self,
        name: &str,
        weight_kg: f64,
        height_m: f64,
        bmi: f64,
        category: &str,
    ) -> Result<HistoryRecord> {
        self.append_at(name, weight_kg, height_m, bmi, category, now_timestamp())
    }

    /// Append a record with an explicit timestamp
    /// Fields are written as given; bmi and category are not re-derived here.
    pub fn append_at(
        &self,
        name: &str,
        weight_kg: f64,
        height_m: f64,
        bmi: f64,
        category: &str,
        timestamp: NaiveDateTime,
    ) -> Result<HistoryRecord> {
        let timestamp = truncate_to_seconds(timestamp);
        let timestamp_str = timestamp.format(TIMESTAMP_FORMAT).to_string();

        // Single INSERT under autocommit: either the whole row lands or nothing does
        self.conn.execute(
            "INSERT INTO bmi_data (timestamp, name, weight, height, bmi, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![timestamp_str, name, weight_kg, height_m, bmi, category],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, %timestamp_str, bmi, category, "appended history record");

        Ok(HistoryRecord {
            id,
            timestamp,
            name: name.to_string(),
            weight: weight_kg,
            height: height_m,
            bmi,
            category: category.to_string(),
        })
    }

    /// Every record, ascending id (insertion order)
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, name, weight, height, bmi, category
             FROM bmi_data
             ORDER BY id ASC",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bmi_data", [], |row| row.get(0))?;

        Ok(count)
    }

    /// Write every record as CSV (header row included)
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.read_all()?;
        write_csv(&records, writer)?;
        Ok(records.len())
    }

    /// Flush and release the connection
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::PersistenceFailure(e))?;
        debug!("history store closed");
        Ok(())
    }
}

pub fn write_csv<W: Write>(records: &[HistoryRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let timestamp_str: String = row.get(1)?;
    let timestamp = NaiveDateTime::parse_from_str(&timestamp_str, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(HistoryRecord {
        id: row.get(0)?,
        timestamp,
        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        weight: row.get(3)?,
        height: row.get(4)?,
        bmi: row.get(5)?,
        category: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
    })
}
