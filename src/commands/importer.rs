// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{non_negative, parse_amount};
use crate::store::{upsert_category, upsert_room};
use crate::utils::arg;
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("rooms", sub)) => import_rooms(conn, sub).map(|_| ()),
        _ => Ok(()),
    }
}

/// Rows: `room_no,category,tariff,gst,occupancy`. A category seen with a
/// tariff is created or updated; the first tariff seen for it wins.
pub fn import_rooms(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<usize> {
    let path = arg(sub, "path")?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut seen_categories: HashMap<String, (Decimal, Decimal)> = HashMap::new();
    let mut count = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row_no = line + 2;
        let room_no = rec
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .with_context(|| format!("room_no missing on line {}", row_no))?;
        let category = rec.get(1).unwrap_or("").trim();
        let tariff_raw = rec.get(2).unwrap_or("").trim();
        let gst_raw = rec.get(3).unwrap_or("").trim();
        let occupancy_raw = rec.get(4).unwrap_or("").trim();

        let occupancy = if occupancy_raw.is_empty() {
            2
        } else {
            occupancy_raw
                .parse::<i64>()
                .with_context(|| {
                    format!("Invalid occupancy '{}' on line {}", occupancy_raw, row_no)
                })?
        };

        if !category.is_empty() {
            if let Entry::Vacant(entry) = seen_categories.entry(category.to_string()) {
                if tariff_raw.is_empty() {
                    crate::store::id_for_category(&tx, category).with_context(|| {
                        format!("Category '{}' needs a tariff on line {}", category, row_no)
                    })?;
                } else {
                    let tariff = parse_amount(tariff_raw)
                        .and_then(|v| non_negative("tariff", v))
                        .map_err(|e| anyhow!("Line {}: {}", row_no, e))?;
                    let gst = if gst_raw.is_empty() {
                        Decimal::ZERO
                    } else {
                        parse_amount(gst_raw)
                            .and_then(|v| non_negative("gst", v))
                            .map_err(|e| anyhow!("Line {}: {}", row_no, e))?
                    };
                    upsert_category(&tx, category, tariff, gst)?;
                    entry.insert((tariff, gst));
                }
            }
        }

        let cat = if category.is_empty() { None } else { Some(category) };
        upsert_room(&tx, room_no, cat, occupancy)?;
        count += 1;
    }
    tx.commit()?;
    tracing::info!(rooms = count, path, "rooms imported");
    println!("Imported {} rooms from {}", count, path);
    Ok(count)
}
