// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reads and writes of the local working copy.
//!
//! Money is stored as decimal TEXT. Bookings carry a `version` that every
//! mutation checks and bumps, so two desks editing the same booking get a
//! conflict instead of a silent overwrite.

use crate::billing::line_amount;
use crate::models::{
    Booking, BookingStatus, ChargeToken, PaymentToken, RestaurantOrder, Room, RoomCategory,
    RoomRef, TokenKind,
};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(
        "booking {id} was changed by someone else (expected version {expected}); reload and retry"
    )]
    Conflict { id: i64, expected: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOwner {
    Booking(i64),
    Order(i64),
}

fn dec(raw: &str, what: &str) -> Result<Decimal> {
    parse_decimal(raw).with_context(|| format!("Invalid {} '{}' in store", what, raw))
}

// ---------- categories & rooms ----------

pub fn upsert_category(
    conn: &Connection,
    name: &str,
    tariff: Decimal,
    gst: Decimal,
) -> Result<RoomCategory> {
    let total = line_amount(tariff, Decimal::ONE, gst);
    conn.execute(
        "INSERT INTO room_categories(name, tariff, gst, total) VALUES (?1,?2,?3,?4)
         ON CONFLICT(name) DO UPDATE
         SET tariff=excluded.tariff, gst=excluded.gst, total=excluded.total",
        params![name, tariff.to_string(), gst.to_string(), total.to_string()],
    )?;
    Ok(RoomCategory {
        name: name.to_string(),
        tariff,
        gst,
        total,
    })
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare_cached("SELECT id FROM room_categories WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Room category '{}' not found", name))?;
    Ok(id)
}

pub fn load_categories(conn: &Connection) -> Result<Vec<RoomCategory>> {
    let mut stmt =
        conn.prepare("SELECT name, tariff, gst, total FROM room_categories ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (name, tariff, gst, total) = row?;
        out.push(RoomCategory {
            tariff: dec(&tariff, "tariff")?,
            gst: dec(&gst, "gst")?,
            total: dec(&total, "total")?,
            name,
        });
    }
    Ok(out)
}

pub fn upsert_room(
    conn: &Connection,
    room_no: &str,
    category: Option<&str>,
    occupancy_count: i64,
) -> Result<()> {
    let category_id = match category {
        Some(c) => Some(id_for_category(conn, c)?),
        None => None,
    };
    conn.execute(
        "INSERT INTO rooms(room_no, category_id, occupancy_count) VALUES (?1,?2,?3)
         ON CONFLICT(room_no) DO UPDATE
         SET category_id=excluded.category_id, occupancy_count=excluded.occupancy_count",
        params![room_no, category_id, occupancy_count],
    )?;
    Ok(())
}

pub fn load_rooms(conn: &Connection) -> Result<Vec<Room>> {
    let mut stmt = conn.prepare(
        "SELECT r.room_no, r.occupancy_count, c.name, c.tariff, c.gst, c.total
         FROM rooms r LEFT JOIN room_categories c ON r.category_id=c.id
         ORDER BY r.room_no",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<String>>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (room_no, occupancy_count, name, tariff, gst, total) = row?;
        let category = match (name, tariff, gst, total) {
            (Some(name), Some(tariff), Some(gst), Some(total)) => Some(RoomCategory {
                tariff: dec(&tariff, "tariff")?,
                gst: dec(&gst, "gst")?,
                total: dec(&total, "total")?,
                name,
            }),
            _ => None,
        };
        out.push(Room {
            room_no,
            category,
            occupancy_count,
        });
    }
    Ok(out)
}

pub fn load_room(conn: &Connection, room_no: &str) -> Result<Room> {
    load_rooms(conn)?
        .into_iter()
        .find(|r| r.room_no == room_no)
        .ok_or_else(|| anyhow!("Room '{}' not found", room_no))
}

// ---------- bookings ----------

struct BookingRow {
    id: i64,
    guest_name: String,
    guest_phone: Option<String>,
    checkin: String,
    checkout: String,
    status: String,
    checked_in: bool,
    checked_out: bool,
    advance: String,
    invoice_no: Option<String>,
    version: i64,
    remote_id: Option<i64>,
}

const BOOKING_COLUMNS: &str = "id, guest_name, guest_phone, checkin_date, checkout_date, status, \
     checked_in, checked_out, advance_payment, invoice_no, version, remote_id";

fn booking_row(r: &Row<'_>) -> rusqlite::Result<BookingRow> {
    Ok(BookingRow {
        id: r.get(0)?,
        guest_name: r.get(1)?,
        guest_phone: r.get(2)?,
        checkin: r.get(3)?,
        checkout: r.get(4)?,
        status: r.get(5)?,
        checked_in: r.get(6)?,
        checked_out: r.get(7)?,
        advance: r.get(8)?,
        invoice_no: r.get(9)?,
        version: r.get(10)?,
        remote_id: r.get(11)?,
    })
}

fn hydrate(conn: &Connection, row: BookingRow) -> Result<Booking> {
    let mut booking = Booking {
        id: row.id,
        guest_name: row.guest_name,
        guest_phone: row.guest_phone,
        checkin_date: parse_date(&row.checkin)?,
        checkout_date: parse_date(&row.checkout)?,
        booking_status: row.status.parse::<BookingStatus>()?,
        checked_in: row.checked_in,
        checked_out: row.checked_out,
        rooms: Vec::new(),
        room_tokens: Vec::new(),
        service_tokens: Vec::new(),
        food_tokens: Vec::new(),
        payment_tokens: Vec::new(),
        advance_payment: dec(&row.advance, "advance payment")?,
        invoice_no: row.invoice_no,
        version: row.version,
        remote_id: row.remote_id,
    };

    let mut rooms_stmt = conn.prepare_cached(
        "SELECT room_no, category FROM booking_rooms WHERE booking_id=?1 ORDER BY room_no",
    )?;
    let rooms = rooms_stmt.query_map(params![booking.id], |r| {
        Ok(RoomRef {
            room_no: r.get(0)?,
            category: r.get(1)?,
        })
    })?;
    for room in rooms {
        booking.rooms.push(room?);
    }

    for token in load_tokens(conn, TokenOwner::Booking(booking.id))? {
        booking.tokens_mut(token.kind).push(token);
    }
    booking.payment_tokens = load_payments(conn, booking.id)?;
    Ok(booking)
}

pub fn load_bookings(conn: &Connection) -> Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {} FROM bookings ORDER BY checkin_date, id",
        BOOKING_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], booking_row)?;
    let mut raw = Vec::new();
    for row in rows {
        raw.push(row?);
    }
    raw.into_iter().map(|r| hydrate(conn, r)).collect()
}

pub fn load_booking(conn: &Connection, id: i64) -> Result<Booking> {
    let sql = format!("SELECT {} FROM bookings WHERE id=?1", BOOKING_COLUMNS);
    let row = conn
        .query_row(&sql, params![id], booking_row)
        .optional()?
        .ok_or_else(|| anyhow!("Booking {} not found", id))?;
    hydrate(conn, row)
}

/// Insert a booking with its rooms, tokens and payments. Returns the new id.
pub fn insert_booking(conn: &Connection, b: &Booking) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let id = insert_booking_rows(&tx, b)?;
    tx.commit()?;
    tracing::info!(
        booking_id = id,
        guest = %b.guest_name,
        rooms = b.rooms.len(),
        "booking created"
    );
    Ok(id)
}

/// The writes behind [`insert_booking`], for callers that already hold a transaction.
pub(crate) fn insert_booking_rows(tx: &Connection, b: &Booking) -> Result<i64> {
    tx.execute(
        "INSERT INTO bookings(guest_name, guest_phone, checkin_date, checkout_date, status,
                              checked_in, checked_out, advance_payment, invoice_no, remote_id)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            b.guest_name,
            b.guest_phone,
            b.checkin_date.to_string(),
            b.checkout_date.to_string(),
            b.booking_status.as_str(),
            b.checked_in,
            b.checked_out,
            b.advance_payment.to_string(),
            b.invoice_no,
            b.remote_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    for room in &b.rooms {
        tx.execute(
            "INSERT INTO booking_rooms(booking_id, room_no, category) VALUES (?1,?2,?3)",
            params![id, room.room_no, room.category],
        )?;
    }
    for token in b.tokens() {
        insert_token_row(tx, TokenOwner::Booking(id), token)?;
    }
    for p in &b.payment_tokens {
        insert_payment_row(tx, id, p)?;
    }
    Ok(id)
}

/// Bump a booking's version, failing when someone else changed it since `expected`.
pub fn claim_version(conn: &Connection, id: i64, expected: i64) -> Result<i64> {
    let changed = conn.execute(
        "UPDATE bookings SET version=version+1 WHERE id=?1 AND version=?2",
        params![id, expected],
    )?;
    if changed == 0 {
        tracing::warn!(booking_id = id, expected, "stale booking version");
        return Err(StoreError::Conflict { id, expected }.into());
    }
    Ok(expected + 1)
}

/// Persist the scalar fields of `b`. On success `b.version` is the new version.
///
/// The version check and the write are one statement, so this is safe to call
/// inside a caller's transaction.
pub fn save_booking(conn: &Connection, b: &mut Booking) -> Result<()> {
    let changed = conn.execute(
        "UPDATE bookings SET guest_name=?2, guest_phone=?3, checkin_date=?4, checkout_date=?5,
                status=?6, checked_in=?7, checked_out=?8, advance_payment=?9, invoice_no=?10,
                remote_id=?11, version=version+1
         WHERE id=?1 AND version=?12",
        params![
            b.id,
            b.guest_name,
            b.guest_phone,
            b.checkin_date.to_string(),
            b.checkout_date.to_string(),
            b.booking_status.as_str(),
            b.checked_in,
            b.checked_out,
            b.advance_payment.to_string(),
            b.invoice_no,
            b.remote_id,
            b.version
        ],
    )?;
    if changed == 0 {
        tracing::warn!(booking_id = b.id, expected = b.version, "stale booking version");
        return Err(StoreError::Conflict {
            id: b.id,
            expected: b.version,
        }
        .into());
    }
    b.version += 1;
    Ok(())
}

pub fn booking_id_for_remote(conn: &Connection, remote_id: i64) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM bookings WHERE remote_id=?1",
            params![remote_id],
            |r| r.get(0),
        )
        .optional()?)
}

/// Replace a booking's rooms, tokens and payments with the ones in `b`.
/// Used when the backend's copy wins during a pull.
/// The caller holds the transaction.
pub(crate) fn replace_booking(tx: &Connection, id: i64, b: &Booking) -> Result<()> {
    tx.execute(
        "UPDATE bookings SET guest_name=?2, guest_phone=?3, checkin_date=?4, checkout_date=?5,
                status=?6, checked_in=?7, checked_out=?8, advance_payment=?9, invoice_no=?10,
                version=version+1
         WHERE id=?1",
        params![
            id,
            b.guest_name,
            b.guest_phone,
            b.checkin_date.to_string(),
            b.checkout_date.to_string(),
            b.booking_status.as_str(),
            b.checked_in,
            b.checked_out,
            b.advance_payment.to_string(),
            b.invoice_no
        ],
    )?;
    tx.execute("DELETE FROM booking_rooms WHERE booking_id=?1", params![id])?;
    tx.execute("DELETE FROM charge_tokens WHERE booking_id=?1", params![id])?;
    tx.execute("DELETE FROM payments WHERE booking_id=?1", params![id])?;
    for room in &b.rooms {
        tx.execute(
            "INSERT INTO booking_rooms(booking_id, room_no, category) VALUES (?1,?2,?3)",
            params![id, room.room_no, room.category],
        )?;
    }
    for token in b.tokens() {
        insert_token_row(tx, TokenOwner::Booking(id), token)?;
    }
    for p in &b.payment_tokens {
        insert_payment_row(tx, id, p)?;
    }
    Ok(())
}

// ---------- charge tokens ----------

fn insert_token_row(conn: &Connection, owner: TokenOwner, t: &ChargeToken) -> Result<i64> {
    let (booking_id, order_id) = match owner {
        TokenOwner::Booking(id) => (Some(id), None),
        TokenOwner::Order(id) => (None, Some(id)),
    };
    conn.execute(
        "INSERT INTO charge_tokens
         (booking_id, order_id, kind, room_no, item, rate, qty, gst, amount)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            booking_id,
            order_id,
            t.kind.as_str(),
            t.room_no,
            t.item,
            t.rate.to_string(),
            t.qty.to_string(),
            t.gst.to_string(),
            t.amount.to_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

struct TokenRow {
    id: i64,
    booking_id: Option<i64>,
    order_id: Option<i64>,
    kind: String,
    room_no: Option<String>,
    item: String,
    rate: String,
    qty: String,
    gst: String,
    amount: String,
}

const TOKEN_COLUMNS: &str = "id, booking_id, order_id, kind, room_no, item, rate, qty, gst, amount";

fn token_row(r: &Row<'_>) -> rusqlite::Result<TokenRow> {
    Ok(TokenRow {
        id: r.get(0)?,
        booking_id: r.get(1)?,
        order_id: r.get(2)?,
        kind: r.get(3)?,
        room_no: r.get(4)?,
        item: r.get(5)?,
        rate: r.get(6)?,
        qty: r.get(7)?,
        gst: r.get(8)?,
        amount: r.get(9)?,
    })
}

impl TokenRow {
    fn owner(&self) -> Result<TokenOwner> {
        match (self.booking_id, self.order_id) {
            (Some(b), None) => Ok(TokenOwner::Booking(b)),
            (None, Some(o)) => Ok(TokenOwner::Order(o)),
            _ => Err(anyhow!("Charge token {} has no single owner", self.id)),
        }
    }

    fn into_token(self) -> Result<ChargeToken> {
        Ok(ChargeToken {
            id: self.id,
            kind: self.kind.parse::<TokenKind>()?,
            rate: dec(&self.rate, "rate")?,
            qty: dec(&self.qty, "qty")?,
            gst: dec(&self.gst, "gst")?,
            amount: dec(&self.amount, "amount")?,
            room_no: self.room_no,
            item: self.item,
        })
    }
}

pub fn load_tokens(conn: &Connection, owner: TokenOwner) -> Result<Vec<ChargeToken>> {
    let (column, id) = match owner {
        TokenOwner::Booking(id) => ("booking_id", id),
        TokenOwner::Order(id) => ("order_id", id),
    };
    let sql = format!(
        "SELECT {} FROM charge_tokens WHERE {}=?1 ORDER BY id",
        TOKEN_COLUMNS, column
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![id], token_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_token()?);
    }
    Ok(out)
}

pub fn load_token(conn: &Connection, id: i64) -> Result<(TokenOwner, ChargeToken)> {
    let sql = format!("SELECT {} FROM charge_tokens WHERE id=?1", TOKEN_COLUMNS);
    let row = conn
        .query_row(&sql, params![id], token_row)
        .optional()?
        .ok_or_else(|| anyhow!("Charge token {} not found", id))?;
    let owner = row.owner()?;
    Ok((owner, row.into_token()?))
}

pub fn add_token(
    conn: &Connection,
    owner: TokenOwner,
    expected_version: Option<i64>,
    t: &ChargeToken,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    if let (TokenOwner::Booking(id), Some(v)) = (owner, expected_version) {
        claim_version(&tx, id, v)?;
    }
    let id = insert_token_row(&tx, owner, t)?;
    tx.commit()?;
    Ok(id)
}

pub fn update_token(
    conn: &Connection,
    owner: TokenOwner,
    expected_version: Option<i64>,
    t: &ChargeToken,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if let (TokenOwner::Booking(id), Some(v)) = (owner, expected_version) {
        claim_version(&tx, id, v)?;
    }
    tx.execute(
        "UPDATE charge_tokens SET item=?2, room_no=?3, rate=?4, qty=?5, gst=?6, amount=?7
         WHERE id=?1",
        params![
            t.id,
            t.item,
            t.room_no,
            t.rate.to_string(),
            t.qty.to_string(),
            t.gst.to_string(),
            t.amount.to_string()
        ],
    )?;
    tx.commit()?;
    Ok(())
}

pub fn delete_token(
    conn: &Connection,
    owner: TokenOwner,
    expected_version: Option<i64>,
    token_id: i64,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    if let (TokenOwner::Booking(id), Some(v)) = (owner, expected_version) {
        claim_version(&tx, id, v)?;
    }
    tx.execute("DELETE FROM charge_tokens WHERE id=?1", params![token_id])?;
    tx.commit()?;
    Ok(())
}

// ---------- payments ----------

fn insert_payment_row(conn: &Connection, booking_id: i64, p: &PaymentToken) -> Result<i64> {
    conn.execute(
        "INSERT INTO payments(booking_id, date, mode, amount) VALUES (?1,?2,?3,?4)",
        params![booking_id, p.date.to_string(), p.mode, p.amount.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_payment(
    conn: &Connection,
    booking_id: i64,
    expected_version: i64,
    p: &PaymentToken,
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    claim_version(&tx, booking_id, expected_version)?;
    let id = insert_payment_row(&tx, booking_id, p)?;
    tx.commit()?;
    Ok(id)
}

pub fn load_payments(conn: &Connection, booking_id: i64) -> Result<Vec<PaymentToken>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, mode, amount FROM payments WHERE booking_id=?1 ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![booking_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, date, mode, amount) = row?;
        out.push(PaymentToken {
            id,
            date: parse_date(&date)?,
            mode,
            amount: dec(&amount, "payment amount")?,
        });
    }
    Ok(out)
}

// ---------- restaurant ----------

pub fn insert_order(
    conn: &Connection,
    table_no: &str,
    guest_name: Option<&str>,
    opened_on: chrono::NaiveDate,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO restaurant_orders(table_no, guest_name, opened_on) VALUES (?1,?2,?3)",
        params![table_no, guest_name, opened_on.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_order(conn: &Connection, id: i64) -> Result<RestaurantOrder> {
    let (table_no, guest_name, opened_on, invoice_no) = conn
        .query_row(
            "SELECT table_no, guest_name, opened_on, invoice_no FROM restaurant_orders WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, Option<String>>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| anyhow!("Restaurant order {} not found", id))?;
    Ok(RestaurantOrder {
        id,
        table_no,
        guest_name,
        opened_on: parse_date(&opened_on)?,
        food_tokens: load_tokens(conn, TokenOwner::Order(id))?,
        invoice_no,
    })
}

pub fn close_order(conn: &Connection, id: i64, invoice_no: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE restaurant_orders SET invoice_no=?2 WHERE id=?1 AND invoice_no IS NULL",
        params![id, invoice_no],
    )?;
    if changed == 0 {
        return Err(anyhow!("Restaurant order {} is missing or already closed", id));
    }
    Ok(())
}

// ---------- invoice numbering ----------

/// Next invoice number, e.g. `INV-2025-0007`. The sequence lives in `settings`.
pub fn next_invoice_no(conn: &Connection, year: i32) -> Result<String> {
    let prefix = crate::config::get_setting(conn, crate::config::INVOICE_PREFIX)?
        .unwrap_or_else(|| crate::config::DEFAULT_INVOICE_PREFIX.to_string());
    let current: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='invoice_seq'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    let seq = match current {
        Some(s) => s
            .parse::<u64>()
            .with_context(|| format!("Invalid invoice sequence '{}'", s))?
            + 1,
        None => 1,
    };
    crate::config::set_setting(conn, "invoice_seq", &seq.to_string())?;
    Ok(format!("{}-{}-{:04}", prefix, year, seq))
}
