// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, API_TOKEN, KNOWN_KEYS};
use crate::utils::{arg, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?;
            if !KNOWN_KEYS.contains(&key) {
                return Err(anyhow!(
                    "Unknown setting '{}' (use {})",
                    key,
                    KNOWN_KEYS.join(" | ")
                ));
            }
            config::set_setting(conn, key, value)?;
            tracing::info!(key, "setting updated");
            println!("Set {}", key);
        }
        Some(("unset", sub)) => {
            let key = arg(sub, "key")?;
            config::unset_setting(conn, key)?;
            println!("Unset {}", key);
        }
        Some(("show", _)) => {
            let mut rows = Vec::new();
            for key in KNOWN_KEYS {
                let value = config::get_setting(conn, key)?.unwrap_or_default();
                let shown = if key == API_TOKEN && !value.is_empty() {
                    "********".to_string()
                } else {
                    value
                };
                rows.push(vec![key.to_string(), shown]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
