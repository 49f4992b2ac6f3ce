// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod availability;
pub mod billing;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod occupancy;
pub mod store;
pub mod utils;
