// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests carry plain strings; handlers parse them into domain values.

use std::collections::BTreeMap;

// ========================================================================
// Authentication
// ========================================================================

/// API request to log in and create a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub identifier: String,
    /// The password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
    /// The logged-in user.
    pub user: UserInfo,
}

/// API response for the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    /// The current user.
    pub user: UserInfo,
    /// What the current user may do.
    pub capabilities: GlobalCapabilities,
}

/// API request to change one's own password.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangePasswordRequest {
    /// The current password.
    pub current_password: String,
    /// The new password.
    pub new_password: String,
}

/// API request for an admin to reset another user's password.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResetPasswordRequest {
    /// The new password.
    pub new_password: String,
}

/// API request to create the first administrator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateFirstAdminRequest {
    /// The login name.
    pub username: String,
    /// The display name.
    pub full_name: String,
    /// The initial password.
    pub password: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    /// A human-readable message.
    pub message: String,
}

// ========================================================================
// Users
// ========================================================================

/// API request to create a user.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
    /// The login name.
    pub username: String,
    /// The display name.
    pub full_name: String,
    /// STAFF, MANAGER or ADMIN.
    pub role: String,
    /// The initial password.
    pub password: String,
    /// Country code of the phone number, e.g. TR.
    #[serde(default)]
    pub phone_country: Option<String>,
    /// Phone number as typed.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Branch or office.
    #[serde(default)]
    pub branch: Option<String>,
}

/// API request to update a user.
///
/// Every field replaces the stored value. A role of `None` keeps the
/// current role.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateUserRequest {
    /// The login name.
    pub username: String,
    /// The display name.
    pub full_name: String,
    /// New role; only admins may change roles.
    #[serde(default)]
    pub role: Option<String>,
    /// Country code of the phone number.
    #[serde(default)]
    pub phone_country: Option<String>,
    /// Phone number as typed.
    #[serde(default)]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Branch or office.
    #[serde(default)]
    pub branch: Option<String>,
}

/// A user as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub phone_country: Option<String>,
    /// Phone in the country's display mask.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub branch: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
    /// What the requesting user may do to this user, when listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<UserCapabilities>,
}

/// API response listing users.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

// ========================================================================
// Complaints
// ========================================================================

/// An inline image attached to a complaint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttachmentPayload {
    pub file_name: String,
    pub content_type: String,
    /// Standard base64 of the file contents.
    pub data_base64: String,
}

/// API request to create or update a complaint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComplaintRequest {
    pub passenger_name: String,
    /// Country code of the passenger's phone; TR if omitted.
    #[serde(default)]
    pub passenger_phone_country: Option<String>,
    pub passenger_phone: String,
    #[serde(default)]
    pub passenger_email: Option<String>,
    pub route: String,
    /// Travel date as `YYYY-MM-DD`.
    pub trip_date: String,
    /// Departure time as `HH:MM`.
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub pnr: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub ticket_price: Option<String>,
    #[serde(default)]
    pub purchase_channel: Option<String>,
    #[serde(default)]
    pub application_channel: Option<String>,
    /// Category code, e.g. `LUGGAGE`.
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

/// Query for complaint listings and exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListComplaintsQuery {
    /// Optional status code.
    #[serde(default)]
    pub status: Option<String>,
    /// Optional free-text search over ticket number, passenger name and phone.
    #[serde(default)]
    pub q: Option<String>,
}

/// API request to set a complaint's status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetStatusRequest {
    /// Status code, e.g. `RESOLVED`.
    pub status: String,
    /// Optional note recorded with the change.
    #[serde(default)]
    pub note: Option<String>,
}

/// API request to append a manager note.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppendNoteRequest {
    pub text: String,
    /// Action type code, e.g. `TICKET_REFUND`.
    #[serde(default)]
    pub action_type: Option<String>,
}

/// A manager note as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NoteInfo {
    pub note_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub created_at: String,
    pub text: String,
    pub action_type: Option<String>,
    pub retracted: bool,
    pub retracted_by_name: Option<String>,
    pub retracted_at: Option<String>,
}

/// A complaint as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComplaintInfo {
    pub complaint_id: i64,
    /// Ticket number, `YYYY/NNNN`.
    pub ticket: String,
    pub status: String,
    pub status_label: String,
    pub category: String,
    pub category_label: String,
    pub subcategory: Option<String>,
    pub passenger_name: String,
    pub passenger_phone_country: String,
    /// Phone in the country's display mask.
    pub passenger_phone: String,
    pub passenger_email: Option<String>,
    pub route: String,
    pub trip_date: String,
    pub departure_time: Option<String>,
    pub pnr: Option<String>,
    pub plate: Option<String>,
    pub ticket_price: Option<String>,
    pub purchase_channel: Option<String>,
    pub application_channel: Option<String>,
    pub description: String,
    pub attachments: Vec<AttachmentPayload>,
    pub created_by: i64,
    pub created_by_name: String,
    pub created_at: String,
    pub updated_at: String,
    pub notes: Vec<NoteInfo>,
    /// What the requesting user may do to this complaint.
    pub capabilities: ComplaintCapabilities,
}

/// API response listing complaints.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListComplaintsResponse {
    pub complaints: Vec<ComplaintInfo>,
}

/// API response for a delete request.
///
/// Deletion fails closed: `deleted` is `false` when the complaint does
/// not exist or the requester may not delete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

// ========================================================================
// Dashboard and activity log
// ========================================================================

/// API response for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardResponse {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    /// Counts keyed by category code.
    pub by_category: BTreeMap<String, usize>,
    /// Counts keyed by status code.
    pub by_status: BTreeMap<String, usize>,
}

/// One activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogEntryInfo {
    pub event_id: i64,
    pub recorded_at: String,
    pub actor_user_id: Option<i64>,
    pub actor_name: String,
    pub action: String,
    pub details: String,
}

/// API response listing activity log entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListLogsResponse {
    pub entries: Vec<LogEntryInfo>,
}

// ========================================================================
// Capability Model
// ========================================================================

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let allowed: bool = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(allowed))
    }
}

/// What a user may do across the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlobalCapabilities {
    pub can_create_complaints: Capability,
    pub can_manage_complaints: Capability,
    pub can_create_users: Capability,
    pub can_list_users: Capability,
    pub can_read_logs: Capability,
}

/// What a user may do to one complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ComplaintCapabilities {
    pub can_edit: Capability,
    pub can_delete: Capability,
    pub can_change_status: Capability,
    pub can_add_note: Capability,
}

/// What a user may do to another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserCapabilities {
    pub can_edit: Capability,
    pub can_change_role: Capability,
    pub can_reset_password: Capability,
    pub can_delete: Capability,
}
