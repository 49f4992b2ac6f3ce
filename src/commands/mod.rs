// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod bill;
pub mod bookings;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod payments;
pub mod restaurant;
pub mod rooms;
pub mod settings;
pub mod status;
pub mod sync;
pub mod tokens;
