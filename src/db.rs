// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Frontdesk", "frontdesk"));

pub const DB_ENV: &str = "FRONTDESK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("frontdesk.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "store opened");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS room_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        tariff TEXT NOT NULL,
        gst TEXT NOT NULL,
        total TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS rooms(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        room_no TEXT NOT NULL UNIQUE,
        category_id INTEGER,
        occupancy_count INTEGER NOT NULL DEFAULT 2,
        FOREIGN KEY(category_id) REFERENCES room_categories(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS bookings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guest_name TEXT NOT NULL,
        guest_phone TEXT,
        checkin_date TEXT NOT NULL,
        checkout_date TEXT NOT NULL,
        status TEXT NOT NULL CHECK(status IN ('Confirmed','Blocked','Cancelled')),
        checked_in INTEGER NOT NULL DEFAULT 0,
        checked_out INTEGER NOT NULL DEFAULT 0,
        advance_payment TEXT NOT NULL DEFAULT '0',
        invoice_no TEXT UNIQUE,
        version INTEGER NOT NULL DEFAULT 0,
        remote_id INTEGER UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_bookings_dates ON bookings(checkin_date, checkout_date);

    -- Snapshot of the rooms a booking holds
    CREATE TABLE IF NOT EXISTS booking_rooms(
        booking_id INTEGER NOT NULL,
        room_no TEXT NOT NULL,
        category TEXT,
        PRIMARY KEY(booking_id, room_no),
        FOREIGN KEY(booking_id) REFERENCES bookings(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_booking_rooms_room ON booking_rooms(room_no);

    CREATE TABLE IF NOT EXISTS restaurant_orders(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        table_no TEXT NOT NULL,
        guest_name TEXT,
        opened_on TEXT NOT NULL,
        invoice_no TEXT UNIQUE
    );

    -- One row per charge; owned by a booking or a restaurant order
    CREATE TABLE IF NOT EXISTS charge_tokens(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        booking_id INTEGER,
        order_id INTEGER,
        kind TEXT NOT NULL CHECK(kind IN ('room','service','food')),
        room_no TEXT,
        item TEXT NOT NULL,
        rate TEXT NOT NULL,
        qty TEXT NOT NULL,
        gst TEXT NOT NULL,
        amount TEXT NOT NULL,
        FOREIGN KEY(booking_id) REFERENCES bookings(id) ON DELETE CASCADE,
        FOREIGN KEY(order_id) REFERENCES restaurant_orders(id) ON DELETE CASCADE,
        CHECK((booking_id IS NULL) != (order_id IS NULL))
    );

    CREATE TABLE IF NOT EXISTS payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        booking_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        mode TEXT NOT NULL,
        amount TEXT NOT NULL,
        FOREIGN KEY(booking_id) REFERENCES bookings(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
