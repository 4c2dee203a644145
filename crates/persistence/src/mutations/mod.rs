// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audit`: Activity log inserts
//! - `complaints`: Ticket allocation and complaint writes
//! - `login_attempts`: Login throttle records
//! - `users`: User and session writes
//!
//! Functions here do not open transactions themselves; the `Persistence`
//! adapter wraps each operation and its log entry in one transaction.

pub mod audit;
pub mod complaints;
pub mod login_attempts;
pub mod users;
