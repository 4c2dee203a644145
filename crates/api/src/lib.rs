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

//! API boundary for the complaint desk.
//!
//! Request and response types are plain strings and numbers; handlers
//! translate them into domain values and enforce authorization before
//! every write.

mod auth;
mod capabilities;
mod error;
mod handlers;
mod password_policy;
mod report;
mod request_response;
mod throttle;

#[cfg(test)]
mod tests;

pub use auth::{AuthConfig, AuthenticationService, LoginOutcome};
pub use capabilities::{
    compute_complaint_capabilities, compute_global_capabilities, compute_user_capabilities,
};
pub use error::{
    ApiError, AuthError, INVALID_CREDENTIALS, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    append_note, change_password, complaint_report, create_complaint, create_first_admin,
    create_user, dashboard, delete_complaint, delete_user, export_complaints_csv, get_complaint,
    list_complaints, list_logs, list_users, login, logout, reset_password, retract_note,
    set_status, update_complaint, update_user, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use report::{CSV_HEADERS, ComplaintReport, ReportHistoryLine, build_report};
pub use request_response::{
    AppendNoteRequest, AttachmentPayload, Capability, ChangePasswordRequest,
    ComplaintCapabilities, ComplaintInfo, ComplaintRequest, CreateFirstAdminRequest,
    CreateUserRequest, DashboardResponse, DeleteResponse, GlobalCapabilities,
    ListComplaintsQuery, ListComplaintsResponse, ListLogsResponse, ListUsersResponse,
    LogEntryInfo, LoginRequest, LoginResponse, MessageResponse, NoteInfo, ResetPasswordRequest,
    SetStatusRequest, UpdateUserRequest, UserCapabilities, UserInfo, WhoAmIResponse,
};
pub use throttle::{
    AttemptStore, InMemoryAttemptStore, ThrottleError, ThrottlePolicy, normalize_identifier,
};
