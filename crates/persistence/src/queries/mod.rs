// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audit`: Activity log queries
//! - `complaints`: Complaint, attachment, note and dashboard queries
//! - `login_attempts`: Login throttle records
//! - `users`: User and session queries

pub mod audit;
pub mod complaints;
pub mod login_attempts;
pub mod users;
