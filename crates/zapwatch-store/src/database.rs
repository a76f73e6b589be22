//! SQLite store for scans and their findings

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use zapwatch_core::{
    Error, NewVulnerability, Result, RiskCounts, RiskLevel, Scan, ScanStatus, ScanType,
    Vulnerability,
};

const SCAN_COLUMNS: &str = "id, target_url, scan_type, start_time, end_time, total_alerts, \
                            high_risk, medium_risk, low_risk, status";

const NAIVE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const VULN_COLUMNS: &str =
    "id, scan_id, alert_name, risk_level, confidence, url, description, solution, reference";

/// Scan result store backed by a single SQLite connection
#[derive(Clone)]
pub struct ResultStore {
    conn: Arc<Mutex<Connection>>,
}

impl ResultStore {
    /// Open or create the result database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            Error::Database(format!("Failed to open result database {:?}: {}", path, e))
        })?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;
        debug!("Result store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            Error::Database(format!("Failed to create in-memory database: {}", e))
        })?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database(String::from("result store connection poisoned")))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS scans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                target_url TEXT NOT NULL,
                scan_type TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                total_alerts INTEGER DEFAULT 0,
                high_risk INTEGER DEFAULT 0,
                medium_risk INTEGER DEFAULT 0,
                low_risk INTEGER DEFAULT 0,
                status TEXT DEFAULT 'running'
            );

            CREATE TABLE IF NOT EXISTS vulnerabilities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scan_id INTEGER,
                alert_name TEXT,
                risk_level TEXT,
                confidence TEXT,
                url TEXT,
                description TEXT,
                solution TEXT,
                reference TEXT,
                FOREIGN KEY (scan_id) REFERENCES scans(id)
            );

            CREATE INDEX IF NOT EXISTS idx_vulnerabilities_scan ON vulnerabilities(scan_id);
            "#,
        )
        .map_err(|e| Error::Database(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    /// Record the start of a scan and return its id
    pub fn create_scan(&self, target_url: &str, scan_type: ScanType) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO scans (target_url, scan_type, start_time, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                target_url,
                scan_type.as_str(),
                Utc::now().to_rfc3339(),
                ScanStatus::Running.as_str(),
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to create scan: {}", e)))?;

        Ok(conn.last_insert_rowid())
    }

    /// Store a scan's findings and mark it completed, atomically.
    ///
    /// Either every finding is inserted and the summary reflects them, or
    /// nothing is written.
    pub fn complete_scan(&self, scan_id: i64, findings: &[NewVulnerability]) -> Result<RiskCounts> {
        let counts = RiskCounts::tally(findings.iter().map(|f| f.risk_level));

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(format!("Failed to begin transaction: {}", e)))?;

        write_summary(&tx, scan_id, &counts, ScanStatus::Completed)?;
        write_findings(&tx, scan_id, findings)?;

        tx.commit()
            .map_err(|e| Error::Database(format!("Failed to commit scan results: {}", e)))?;

        debug!(scan_id, total = counts.total, "Scan results stored");
        Ok(counts)
    }

    /// Insert findings for a scan without touching its summary
    pub fn insert_vulnerabilities(&self, scan_id: i64, findings: &[NewVulnerability]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(format!("Failed to begin transaction: {}", e)))?;

        ensure_scan_exists(&tx, scan_id)?;
        write_findings(&tx, scan_id, findings)?;

        tx.commit()
            .map_err(|e| Error::Database(format!("Failed to commit findings: {}", e)))
    }

    /// Set a scan's end time, counts and final status
    pub fn update_summary(&self, scan_id: i64, counts: &RiskCounts, status: ScanStatus) -> Result<()> {
        let conn = self.lock()?;
        write_summary(&conn, scan_id, counts, status)
    }

    /// Mark a scan as failed. Counts are left untouched.
    pub fn mark_failed(&self, scan_id: i64) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE scans SET status = ?1, end_time = ?2 WHERE id = ?3",
                params![ScanStatus::Failed.as_str(), Utc::now().to_rfc3339(), scan_id],
            )
            .map_err(|e| Error::Database(format!("Failed to mark scan failed: {}", e)))?;

        if updated == 0 {
            return Err(Error::ScanNotFound { id: scan_id });
        }
        Ok(())
    }

    /// Update only the status of a scan
    pub fn update_status(&self, scan_id: i64, status: ScanStatus) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE scans SET status = ?1 WHERE id = ?2",
                params![status.as_str(), scan_id],
            )
            .map_err(|e| Error::Database(format!("Failed to update scan status: {}", e)))?;

        if updated == 0 {
            return Err(Error::ScanNotFound { id: scan_id });
        }
        Ok(())
    }

    /// Fetch a scan by id
    pub fn get_scan(&self, scan_id: i64) -> Result<Option<Scan>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM scans WHERE id = ?1", SCAN_COLUMNS),
            [scan_id],
            scan_from_row,
        )
        .optional()
        .map_err(|e| Error::Database(format!("Failed to load scan {}: {}", scan_id, e)))
    }

    /// Fetch all findings of a scan, in insertion order
    pub fn get_vulnerabilities(&self, scan_id: i64) -> Result<Vec<Vulnerability>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM vulnerabilities WHERE scan_id = ?1 ORDER BY id",
                VULN_COLUMNS
            ))
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([scan_id], vulnerability_from_row)
            .map_err(|e| Error::Database(format!("Failed to load findings: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(format!("Failed to read finding: {}", e)))
    }

    /// Most recent scans, newest first
    pub fn recent_scans(&self, limit: u32) -> Result<Vec<Scan>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM scans ORDER BY id DESC LIMIT ?1",
                SCAN_COLUMNS
            ))
            .map_err(|e| Error::Database(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([limit], scan_from_row)
            .map_err(|e| Error::Database(format!("Failed to list scans: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(format!("Failed to read scan: {}", e)))
    }

    /// Number of stored findings for a scan
    pub fn vulnerability_count(&self, scan_id: i64) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM vulnerabilities WHERE scan_id = ?1",
                [scan_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(format!("Failed to count findings: {}", e)))?;
        Ok(count as u64)
    }
}

fn ensure_scan_exists(conn: &Connection, scan_id: i64) -> Result<()> {
    let exists = conn
        .query_row("SELECT 1 FROM scans WHERE id = ?1", [scan_id], |_| Ok(()))
        .optional()
        .map_err(|e| Error::Database(format!("Failed to look up scan: {}", e)))?
        .is_some();

    if exists {
        Ok(())
    } else {
        Err(Error::ScanNotFound { id: scan_id })
    }
}

fn write_summary(
    conn: &Connection,
    scan_id: i64,
    counts: &RiskCounts,
    status: ScanStatus,
) -> Result<()> {
    let updated = conn
        .execute(
            r#"
            UPDATE scans
            SET end_time = ?1, total_alerts = ?2, high_risk = ?3,
                medium_risk = ?4, low_risk = ?5, status = ?6
            WHERE id = ?7
            "#,
            params![
                Utc::now().to_rfc3339(),
                counts.total,
                counts.high,
                counts.medium,
                counts.low,
                status.as_str(),
                scan_id,
            ],
        )
        .map_err(|e| Error::Database(format!("Failed to update scan summary: {}", e)))?;

    if updated == 0 {
        return Err(Error::ScanNotFound { id: scan_id });
    }
    Ok(())
}

fn write_findings(conn: &Connection, scan_id: i64, findings: &[NewVulnerability]) -> Result<()> {
    let mut stmt = conn
        .prepare(
            r#"
            INSERT INTO vulnerabilities
                (scan_id, alert_name, risk_level, confidence, url, description, solution, reference)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .map_err(|e| Error::Database(format!("Failed to prepare insert: {}", e)))?;

    for f in findings {
        stmt.execute(params![
            scan_id,
            f.alert_name,
            f.risk_level.as_str(),
            f.confidence,
            f.url,
            f.description,
            f.solution,
            f.reference,
        ])
        .map_err(|e| Error::Database(format!("Failed to insert finding: {}", e)))?;
    }

    Ok(())
}

/// RFC 3339, or a naive ISO 8601 timestamp (no offset) read as UTC
fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw.trim(), NAIVE_TIME_FORMAT).map(|t| t.and_utc())
        })
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn scan_from_row(row: &Row<'_>) -> rusqlite::Result<Scan> {
    let scan_type: String = row.get(2)?;
    let status: String = row.get(9)?;
    let end_time = match row.get::<_, Option<String>>(4)? {
        Some(_) => Some(parse_time(row, 4)?),
        None => None,
    };

    Ok(Scan {
        id: row.get(0)?,
        target_url: row.get(1)?,
        scan_type: scan_type
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        start_time: parse_time(row, 3)?,
        end_time,
        total_alerts: row.get(5)?,
        high_risk: row.get(6)?,
        medium_risk: row.get(7)?,
        low_risk: row.get(8)?,
        status: status
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?,
    })
}

fn vulnerability_from_row(row: &Row<'_>) -> rusqlite::Result<Vulnerability> {
    let risk: Option<String> = row.get(3)?;
    Ok(Vulnerability {
        id: row.get(0)?,
        scan_id: row.get(1)?,
        alert_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        risk_level: RiskLevel::from_engine(risk.as_deref().unwrap_or_default()),
        confidence: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        solution: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        reference: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
    })
}
