// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{ApiClient, RESTAURANT_INVOICES, ROOM_BOOKINGS, ROOM_CATEGORIES, ROOMS};
use crate::config;
use crate::models::{Booking, RestaurantOrder};
use crate::store::{
    booking_id_for_remote, insert_booking_rows, load_booking, load_categories, load_order,
    replace_booking, save_booking, upsert_category, upsert_room,
};
use crate::utils::opt_arg;
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("pull", _)) => {
            let client = ApiClient::new(config::session(conn)?)?;
            let summary = pull(conn, &client)?;
            println!(
                "Pulled {} categories, {} rooms, {} bookings ({} new)",
                summary.categories, summary.rooms, summary.bookings, summary.new_bookings
            );
        }
        Some(("push", sub)) => {
            let client = ApiClient::new(config::session(conn)?)?;
            match (opt_arg(sub, "booking"), opt_arg(sub, "order")) {
                (Some(raw), None) => {
                    let id = raw
                        .parse::<i64>()
                        .with_context(|| format!("Invalid booking id '{}'", raw))?;
                    let remote = push_booking(conn, &client, id)?;
                    println!("Booking {} saved on backend as {}", id, remote);
                }
                (None, Some(raw)) => {
                    let id = raw
                        .parse::<i64>()
                        .with_context(|| format!("Invalid order id '{}'", raw))?;
                    let remote = push_order(conn, &client, id)?;
                    println!("Restaurant invoice for order {} saved on backend as {}", id, remote);
                }
                _ => return Err(anyhow!("Pass exactly one of --booking or --order")),
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RemoteCategory {
    pub name: String,
    pub tariff: Decimal,
    #[serde(default)]
    pub gst: Decimal,
}

fn default_occupancy() -> i64 {
    2
}

#[derive(Debug, Deserialize)]
pub struct RemoteRoom {
    pub room_no: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_occupancy")]
    pub occupancy_count: i64,
}

#[derive(Debug, Default, Serialize)]
pub struct PullSummary {
    pub categories: usize,
    pub rooms: usize,
    pub bookings: usize,
    pub new_bookings: usize,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: i64,
}

/// Replace the local reference data and bookings with the backend's copy.
pub fn pull(conn: &Connection, client: &ApiClient) -> Result<PullSummary> {
    let categories: Vec<RemoteCategory> = client.list(ROOM_CATEGORIES)?;
    let rooms: Vec<RemoteRoom> = client.list(ROOMS)?;
    let bookings: Vec<Booking> = client.list(ROOM_BOOKINGS)?;
    apply_pull(conn, categories, rooms, bookings)
}

/// Write fetched records into the store. Remote ids map onto local bookings via `remote_id`.
/// The whole batch is applied in one transaction.
pub fn apply_pull(
    conn: &Connection,
    categories: Vec<RemoteCategory>,
    rooms: Vec<RemoteRoom>,
    bookings: Vec<Booking>,
) -> Result<PullSummary> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = PullSummary::default();
    for c in &categories {
        upsert_category(&tx, &c.name, c.tariff, c.gst)?;
        summary.categories += 1;
    }
    let known: Vec<String> = load_categories(&tx)?.into_iter().map(|c| c.name).collect();
    for r in &rooms {
        let category = r.category.as_deref().filter(|c| known.iter().any(|k| k == c));
        if category.is_none() && r.category.is_some() {
            tracing::warn!(room = %r.room_no, "room references an unknown category");
        }
        upsert_room(&tx, &r.room_no, category, r.occupancy_count)?;
        summary.rooms += 1;
    }
    for mut b in bookings {
        let remote_id = b.id;
        b.remote_id = Some(remote_id);
        let existing = booking_id_for_remote(&tx, remote_id)?;
        let written = match existing {
            Some(local) => replace_booking(&tx, local, &b),
            None => insert_booking_rows(&tx, &b).map(|_| ()),
        };
        written.with_context(|| format!("Pulled booking {} could not be stored", remote_id))?;
        if existing.is_none() {
            summary.new_bookings += 1;
        }
        summary.bookings += 1;
    }
    tx.commit()?;
    tracing::info!(
        categories = summary.categories,
        rooms = summary.rooms,
        bookings = summary.bookings,
        "pull applied"
    );
    Ok(summary)
}

/// JSON body for a booking, without the fields that only mean something locally.
pub fn booking_payload(b: &Booking) -> Result<Value> {
    let mut v = serde_json::to_value(b)?;
    if let Some(obj) = v.as_object_mut() {
        obj.remove("id");
        obj.remove("version");
        obj.remove("remote_id");
    }
    Ok(v)
}

pub fn push_booking(conn: &Connection, client: &ApiClient, id: i64) -> Result<i64> {
    let mut b = load_booking(conn, id)?;
    let body = booking_payload(&b)?;
    let remote_id = match b.remote_id {
        Some(remote) => {
            let _: Value = client.update(ROOM_BOOKINGS, remote, &body)?;
            remote
        }
        None => {
            let created: Created = client.create(ROOM_BOOKINGS, &body)?;
            b.remote_id = Some(created.id);
            save_booking(conn, &mut b)?;
            created.id
        }
    };
    tracing::info!(booking_id = id, remote_id, "booking pushed");
    Ok(remote_id)
}

fn order_payload(o: &RestaurantOrder) -> Result<Value> {
    let mut v = serde_json::to_value(o)?;
    if let Some(obj) = v.as_object_mut() {
        obj.remove("id");
    }
    Ok(v)
}

pub fn push_order(conn: &Connection, client: &ApiClient, id: i64) -> Result<i64> {
    let order = load_order(conn, id)?;
    if order.invoice_no.is_none() {
        return Err(anyhow!("Restaurant order {} is still open; close it first", id));
    }
    let created: Created = client.create(RESTAURANT_INVOICES, &order_payload(&order)?)?;
    tracing::info!(order_id = id, remote_id = created.id, "restaurant invoice pushed");
    Ok(created.id)
}
