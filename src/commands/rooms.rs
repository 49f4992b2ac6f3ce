// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::availability::{StayRange, available_rooms};
use crate::models::Room;
use crate::occupancy::UNCATEGORIZED;
use crate::store::{load_bookings, load_rooms, upsert_room};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_date, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => {
            let rooms = load_rooms(conn)?;
            print_rooms(sub, &rooms.iter().collect::<Vec<_>>())?;
        }
        Some(("available", sub)) => {
            let rooms = query_available(conn, sub)?;
            print_rooms(sub, &rooms.iter().collect::<Vec<_>>())?;
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let room_no = arg(sub, "room")?;
    let category = opt_arg(sub, "category");
    let occupancy = sub.get_one::<i64>("occupancy").copied().unwrap_or(2);
    upsert_room(conn, room_no, category, occupancy)?;
    println!(
        "Room {} ({}, sleeps {})",
        room_no,
        category.unwrap_or(UNCATEGORIZED),
        occupancy
    );
    Ok(())
}

/// Rooms free for `--from/--to`, optionally limited to one category.
pub fn query_available(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Room>> {
    let range = StayRange::new(parse_date(arg(sub, "from")?)?, parse_date(arg(sub, "to")?)?)?;
    let exclude = match opt_arg(sub, "exclude") {
        Some(raw) => Some(
            raw.parse::<i64>()
                .with_context(|| format!("Invalid booking id '{}'", raw))?,
        ),
        None => None,
    };
    let category = opt_arg(sub, "category");

    let rooms = load_rooms(conn)?;
    let bookings = load_bookings(conn)?;
    let free = available_rooms(&rooms, &bookings, &range, exclude)
        .into_iter()
        .filter(|r| category.is_none_or(|c| r.category_name() == Some(c)))
        .cloned()
        .collect();
    Ok(free)
}

fn print_rooms(sub: &clap::ArgMatches, rooms: &[&Room]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rooms)? {
        return Ok(());
    }
    let rows = rooms
        .iter()
        .map(|r| {
            vec![
                r.room_no.clone(),
                r.category_name().unwrap_or(UNCATEGORIZED).to_string(),
                r.occupancy_count.to_string(),
                r.category
                    .as_ref()
                    .map(|c| fmt_money(&c.total))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Room", "Category", "Sleeps", "Tariff incl. GST"], rows)
    );
    Ok(())
}
