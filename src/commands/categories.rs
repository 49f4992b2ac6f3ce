// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::billing::{non_negative, parse_amount};
use crate::store::{load_categories, upsert_category};
use crate::utils::{arg, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let tariff = non_negative("tariff", parse_amount(arg(sub, "tariff")?)?)?;
            let gst = non_negative("gst", parse_amount(arg(sub, "gst")?)?)?;
            let cat = upsert_category(conn, name, tariff, gst)?;
            println!(
                "Category '{}': tariff {} + GST {}% = {}",
                cat.name,
                fmt_money(&cat.tariff),
                cat.gst,
                fmt_money(&cat.total)
            );
        }
        Some(("list", sub)) => {
            let cats = load_categories(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let rows = cats
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            fmt_money(&c.tariff),
                            format!("{}%", c.gst),
                            fmt_money(&c.total),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Category", "Tariff", "GST", "Total"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
