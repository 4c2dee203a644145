// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod policy;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, authorize_delete, complaint_created_event, create_complaint};
pub use command::ComplaintCommand;
pub use error::CoreError;
pub use policy::{
    Principal, can_delete_complaint, can_delete_user, can_edit_profile, can_manage_complaints,
    can_manage_users, can_modify_complaint, can_read_logs, can_retract_note, denied,
    ensure_admin_remains,
};
pub use state::{ComplaintChange, ComplaintTransition};
