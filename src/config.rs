// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::Session;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

pub const API_URL: &str = "api_url";
pub const API_TOKEN: &str = "api_token";
pub const INVOICE_PREFIX: &str = "invoice_prefix";
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

pub const API_URL_ENV: &str = "FRONTDESK_API_URL";
pub const API_TOKEN_ENV: &str = "FRONTDESK_API_TOKEN";

/// Keys `config set` accepts.
pub const KNOWN_KEYS: [&str; 3] = [API_URL, API_TOKEN, INVOICE_PREFIX];

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn unset_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

fn env_or(conn: &Connection, env: &str, key: &str) -> Result<Option<String>> {
    match std::env::var(env) {
        Ok(v) if !v.trim().is_empty() => Ok(Some(v.trim().to_string())),
        _ => get_setting(conn, key),
    }
}

/// Build the backend session from the environment, falling back to stored settings.
pub fn session(conn: &Connection) -> Result<Session> {
    let base_url = env_or(conn, API_URL_ENV, API_URL)?.ok_or_else(|| {
        anyhow!(
            "No backend configured; run `frontdesk config set {} <url>` or set {}",
            API_URL,
            API_URL_ENV
        )
    })?;
    let token = env_or(conn, API_TOKEN_ENV, API_TOKEN)?;
    Ok(Session::new(base_url, token))
}
