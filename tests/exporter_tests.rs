// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use frontdesk::commands::{bookings, exporter};
use frontdesk::{cli, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::upsert_category(&conn, "Deluxe", Decimal::new(1000, 0), Decimal::new(12, 0)).unwrap();
    store::upsert_room(&conn, "101", Some("Deluxe"), 2).unwrap();
    store::upsert_room(&conn, "102", Some("Deluxe"), 2).unwrap();
    let matches = cli::build_cli().get_matches_from([
        "frontdesk", "booking", "add", "--guest", "Asha, Rao", "--from", "2024-01-10", "--to",
        "2024-01-12", "--room", "101", "--room", "102", "--advance", "480",
    ]);
    if let Some(("booking", booking_m)) = matches.subcommand() {
        if let Some(("add", add_m)) = booking_m.subcommand() {
            bookings::add(&conn, add_m).unwrap();
        }
    }
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "frontdesk", "export", "bookings", "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn csv_export_writes_header_and_quotes_fields() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("bookings.csv");
    export(&conn, "csv", out.to_str().unwrap()).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,guest,phone,checkin,checkout,rooms,status,checked_in,checked_out,\
         payable,paid,balance,invoice"
    );
    let row = lines.next().unwrap();
    assert!(
        row.starts_with("1,\"Asha, Rao\",,2024-01-10,2024-01-12,101;102,Confirmed,false,false,")
    );
    // two rooms x 2 nights at 1000 + 12%
    assert!(row.contains(",4480.00,480.00,4000.00,"));
    assert!(lines.next().is_none());
}

#[test]
fn json_export_is_an_array() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("bookings.json");
    export(&conn, "JSON", out.to_str().unwrap()).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["guest"], "Asha, Rao");
    assert_eq!(rows[0]["balance"], "4000.00");
}

#[test]
fn unknown_format_writes_nothing() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("bookings.xml");
    assert!(export(&conn, "xml", out.to_str().unwrap()).is_err());
    assert!(!out.exists());
}
