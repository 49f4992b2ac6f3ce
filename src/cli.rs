// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .help("Local record id")
}

pub fn build_cli() -> Command {
    Command::new("frontdesk")
        .version(crate_version!())
        .about("Hotel and restaurant front desk: rooms, bookings, occupancy and GST billing")
        .subcommand(Command::new("init").about("Create the local store"))
        .subcommand(
            Command::new("config")
                .about("Backend and invoice settings")
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .help("api_url | api_token | invoice_prefix"),
                        )
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("unset").arg(Arg::new("key").required(true)))
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("category")
                .about("Room categories and tariffs")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(req("tariff", "Tariff per night before tax"))
                        .arg(opt("gst", "GST percent").default_value("12")),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("room")
                .about("Rooms and availability")
                .subcommand(
                    Command::new("add")
                        .arg(req("room", "Room number"))
                        .arg(opt("category", "Room category"))
                        .arg(
                            opt("occupancy", "Guests the room sleeps")
                                .value_parser(clap::value_parser!(i64))
                                .default_value("2"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(
                    Command::new("available")
                        .about("Rooms free for a stay")
                        .arg(req("from", "Check-in date YYYY-MM-DD"))
                        .arg(req("to", "Check-out date YYYY-MM-DD"))
                        .arg(opt("category", "Only this category"))
                        .arg(opt("exclude", "Ignore this booking id (when editing it)")),
                )),
        )
        .subcommand(
            Command::new("booking")
                .about("Room bookings")
                .subcommand(
                    Command::new("add")
                        .arg(req("guest", "Guest name"))
                        .arg(opt("phone", "Guest phone"))
                        .arg(req("from", "Check-in date YYYY-MM-DD"))
                        .arg(req("to", "Check-out date YYYY-MM-DD"))
                        .arg(
                            Arg::new("room")
                                .long("room")
                                .required(true)
                                .action(ArgAction::Append)
                                .help("Room number (repeat for several rooms)"),
                        )
                        .arg(opt("status", "confirmed | blocked").default_value("confirmed"))
                        .arg(opt("advance", "Advance payment received").default_value("0")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("date", "Only bookings staying on this date"))
                        .arg(opt("guest", "Guest name pattern (regex, case-insensitive)"))
                        .arg(opt("status", "confirmed | blocked | cancelled")),
                ))
                .subcommand(json_flags(Command::new("show").arg(id_arg("id"))))
                .subcommand(Command::new("cancel").arg(id_arg("id")))
                .subcommand(Command::new("confirm").arg(id_arg("id")))
                .subcommand(Command::new("checkin").arg(id_arg("id")))
                .subcommand(Command::new("checkout").arg(id_arg("id")))
                .subcommand(Command::new("invoice").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("token")
                .about("Room, service and food charges on a booking")
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("booking"))
                        .arg(req("kind", "room | service | food"))
                        .arg(req("item", "Description"))
                        .arg(req("rate", "Rate before tax"))
                        .arg(opt("qty", "Quantity").default_value("1"))
                        .arg(opt("gst", "GST percent (room charges default to the category's)"))
                        .arg(opt("room", "Room number the charge belongs to")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("id"))
                        .arg(req("field", "rate | qty | gst | amount"))
                        .arg(req("value", "New value")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id")))
                .subcommand(json_flags(Command::new("list").arg(id_arg("booking")))),
        )
        .subcommand(
            Command::new("payment")
                .about("Payments against a booking")
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("booking"))
                        .arg(req("amount", "Amount received"))
                        .arg(opt("mode", "cash | card | upi | ...").default_value("cash"))
                        .arg(opt("date", "Payment date YYYY-MM-DD (default today)")),
                )
                .subcommand(json_flags(Command::new("list").arg(id_arg("booking")))),
        )
        .subcommand(json_flags(
            Command::new("status")
                .about("Rooms by status for a date")
                .arg(opt("date", "Reference date YYYY-MM-DD (default today)"))
                .arg(
                    opt("view", "dashboard | grid")
                        .value_parser(["dashboard", "grid"])
                        .default_value("dashboard"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("bill")
                .about("Bill summary with SGST/CGST split")
                .arg(id_arg("booking")),
        ))
        .subcommand(
            Command::new("restaurant")
                .about("Restaurant table orders")
                .subcommand(
                    Command::new("open")
                        .arg(req("table", "Table number"))
                        .arg(opt("guest", "Guest name"))
                        .arg(opt("date", "Order date YYYY-MM-DD (default today)")),
                )
                .subcommand(
                    Command::new("add")
                        .arg(id_arg("order"))
                        .arg(req("item", "Dish"))
                        .arg(req("rate", "Rate before tax"))
                        .arg(opt("qty", "Quantity").default_value("1"))
                        .arg(opt("gst", "GST percent").default_value("5")),
                )
                .subcommand(json_flags(Command::new("bill").arg(id_arg("order"))))
                .subcommand(Command::new("close").arg(id_arg("order"))),
        )
        .subcommand(
            Command::new("import")
                .about("Import reference data")
                .subcommand(
                    Command::new("rooms")
                        .arg(req("path", "CSV: room_no,category,tariff,gst,occupancy")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export bookings")
                .subcommand(
                    Command::new("bookings")
                        .arg(opt("format", "csv | json").default_value("csv"))
                        .arg(req("out", "Output file")),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Exchange data with the REST backend")
                .subcommand(Command::new("pull").about("Fetch categories, rooms and bookings"))
                .subcommand(
                    Command::new("push")
                        .about("Send a booking, or a closed restaurant order, to the backend")
                        .arg(opt("booking", "Local booking id"))
                        .arg(opt("order", "Local restaurant order id").conflicts_with("booking")),
                ),
        )
        .subcommand(
            Command::new("doctor").about("Check the store for double bookings and billing drift"),
        )
}
