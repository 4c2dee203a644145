// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers take the acting user resolved from the session, parse string
//! input into domain values, check permissions, and hand the write to the
//! persistence layer. `now` is always passed in.

use complaint_desk::{
    ComplaintCommand, ComplaintTransition, Principal, apply, authorize_delete, can_delete_user,
    can_edit_profile, can_manage_users, can_read_logs, create_complaint as build_complaint,
    denied, ensure_admin_remains,
};
use complaint_desk_audit::{Actor, AuditAction, AuditEvent};
use complaint_desk_domain::{
    ActionType, Attachment, Complaint, ComplaintCategory, ComplaintDetails, ComplaintStatus,
    Country, DashboardStats, DomainError, EmailAddress, ManagerNote, Passenger, PhoneNumber, Role,
    Trip, Tz, User, Username, ticket_year, validate_full_name, validate_user_fields,
};
use complaint_desk_persistence::{ComplaintFilter, Persistence, UserCredentials, format_timestamp};
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use tracing::{info, warn};

use crate::auth::{AuthConfig, AuthenticationService, LoginOutcome};
use crate::capabilities::{
    compute_complaint_capabilities, compute_global_capabilities, compute_user_capabilities,
};
use crate::error::{ApiError, AuthError};
use crate::password_policy::PasswordPolicy;
use crate::report::{ComplaintReport, build_report, export_complaints_csv as write_csv};
use crate::request_response::{
    AppendNoteRequest, AttachmentPayload, ChangePasswordRequest, ComplaintInfo,
    ComplaintRequest, CreateFirstAdminRequest, CreateUserRequest, DashboardResponse,
    DeleteResponse, ListComplaintsQuery, ListComplaintsResponse, ListLogsResponse,
    ListUsersResponse, LogEntryInfo, LoginRequest, LoginResponse, MessageResponse, NoteInfo,
    ResetPasswordRequest, SetStatusRequest, UpdateUserRequest, UserInfo, WhoAmIResponse,
};
use crate::throttle::{AttemptStore, ThrottlePolicy, normalize_identifier};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

const ADMIN: &str = "ADMIN";
const MANAGER_OR_ADMIN: &str = "MANAGER or ADMIN";

// ========================================================================
// Conversion helpers
// ========================================================================

fn principal_of(user: &User) -> Result<Principal, ApiError> {
    Principal::from_user(user).ok_or_else(|| ApiError::Internal {
        message: String::from("Acting user has no id"),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_optional_email(value: Option<&str>) -> Result<Option<EmailAddress>, ApiError> {
    non_blank(value)
        .map(|v| EmailAddress::parse(&v))
        .transpose()
        .map_err(ApiError::from)
}

fn parse_country(value: Option<&str>) -> Result<Country, ApiError> {
    non_blank(value).map_or_else(
        || Ok(Country::default()),
        |code| Country::from_str(&code).map_err(ApiError::from),
    )
}

fn parse_optional_phone(
    country: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<PhoneNumber>, ApiError> {
    let Some(phone) = non_blank(phone) else {
        return Ok(None);
    };
    let country: Country = parse_country(country)?;
    Ok(Some(PhoneNumber::parse(country, &phone)?))
}

fn parse_date(value: &str) -> Result<Date, ApiError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|e| {
        ApiError::from(DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        })
    })
}

fn parse_time(value: &str) -> Result<Time, ApiError> {
    Time::parse(value.trim(), TIME_FORMAT).map_err(|e| {
        ApiError::from(DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        })
    })
}

fn parse_details(request: &ComplaintRequest) -> Result<ComplaintDetails, ApiError> {
    let country: Country = parse_country(request.passenger_phone_country.as_deref())?;
    let phone: PhoneNumber = PhoneNumber::parse(country, &request.passenger_phone)?;

    let departure_time: Option<Time> = non_blank(request.departure_time.as_deref())
        .map(|t| parse_time(&t))
        .transpose()?;

    let attachments: Vec<Attachment> = request
        .attachments
        .iter()
        .map(|a| Attachment::new(&a.file_name, &a.content_type, &a.data_base64))
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(ComplaintDetails {
        passenger: Passenger {
            name: request.passenger_name.trim().to_string(),
            phone,
            email: parse_optional_email(request.passenger_email.as_deref())?,
        },
        trip: Trip {
            route: request.route.trim().to_string(),
            trip_date: parse_date(&request.trip_date)?,
            departure_time,
            pnr: non_blank(request.pnr.as_deref()),
            plate: non_blank(request.plate.as_deref()),
            ticket_price: non_blank(request.ticket_price.as_deref()),
            purchase_channel: non_blank(request.purchase_channel.as_deref()),
            application_channel: non_blank(request.application_channel.as_deref()),
        },
        category: ComplaintCategory::from_str(request.category.trim())?,
        subcategory: non_blank(request.subcategory.as_deref()),
        description: request.description.trim().to_string(),
        attachments,
    })
}

fn user_info(user: &User) -> Result<UserInfo, ApiError> {
    let user_id: i64 = user.user_id.ok_or_else(|| ApiError::Internal {
        message: String::from("User has no id"),
    })?;
    Ok(UserInfo {
        user_id,
        username: user.username.value().to_string(),
        full_name: user.full_name.clone(),
        role: user.role.as_str().to_string(),
        phone_country: user.phone.as_ref().map(|p| p.country().as_str().to_string()),
        phone: user.phone.as_ref().map(PhoneNumber::formatted),
        email: user.email.as_ref().map(|e| e.value().to_string()),
        branch: user.branch.clone(),
        created_at: format_timestamp(user.created_at)?,
        last_login_at: user.last_login_at.map(format_timestamp).transpose()?,
        capabilities: None,
    })
}

fn note_info(note: &ManagerNote) -> Result<NoteInfo, ApiError> {
    Ok(NoteInfo {
        note_id: note.note_id.unwrap_or_default(),
        author_id: note.author_id,
        author_name: note.author_name.clone(),
        created_at: format_timestamp(note.created_at)?,
        text: note.text.clone(),
        action_type: note.action_type.map(|a| a.as_str().to_string()),
        retracted: note.is_retracted(),
        retracted_by_name: note
            .retraction
            .as_ref()
            .map(|r| r.retracted_by_name.clone()),
        retracted_at: note
            .retraction
            .as_ref()
            .map(|r| format_timestamp(r.retracted_at))
            .transpose()?,
    })
}

fn complaint_info(complaint: &Complaint, principal: &Principal) -> Result<ComplaintInfo, ApiError> {
    let complaint_id: i64 = complaint.complaint_id.ok_or_else(|| ApiError::Internal {
        message: String::from("Complaint has no id"),
    })?;
    let details: &ComplaintDetails = &complaint.details;

    Ok(ComplaintInfo {
        complaint_id,
        ticket: complaint.ticket_display(),
        status: complaint.status.as_str().to_string(),
        status_label: complaint.status.label().to_string(),
        category: details.category.as_str().to_string(),
        category_label: details.category.label().to_string(),
        subcategory: details.subcategory.clone(),
        passenger_name: details.passenger.name.clone(),
        passenger_phone_country: details.passenger.phone.country().as_str().to_string(),
        passenger_phone: details.passenger.phone.formatted(),
        passenger_email: details
            .passenger
            .email
            .as_ref()
            .map(|e| e.value().to_string()),
        route: details.trip.route.clone(),
        trip_date: details
            .trip
            .trip_date
            .format(DATE_FORMAT)
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to format trip date: {e}"),
            })?,
        departure_time: details
            .trip
            .departure_time
            .map(|t| t.format(TIME_FORMAT))
            .transpose()
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to format departure time: {e}"),
            })?,
        pnr: details.trip.pnr.clone(),
        plate: details.trip.plate.clone(),
        ticket_price: details.trip.ticket_price.clone(),
        purchase_channel: details.trip.purchase_channel.clone(),
        application_channel: details.trip.application_channel.clone(),
        description: details.description.clone(),
        attachments: details
            .attachments
            .iter()
            .map(|a| AttachmentPayload {
                file_name: a.file_name().to_string(),
                content_type: a.content_type().to_string(),
                data_base64: a.data_base64().to_string(),
            })
            .collect(),
        created_by: complaint.created_by,
        created_by_name: complaint.created_by_name.clone(),
        created_at: format_timestamp(complaint.created_at)?,
        updated_at: format_timestamp(complaint.updated_at)?,
        notes: complaint
            .notes
            .iter()
            .map(note_info)
            .collect::<Result<Vec<_>, _>>()?,
        capabilities: compute_complaint_capabilities(principal, complaint),
    })
}

fn load_complaint(persistence: &mut Persistence, complaint_id: i64) -> Result<Complaint, ApiError> {
    persistence.get_complaint(complaint_id)?.ok_or_else(|| {
        ApiError::not_found("Complaint", format!("Complaint {complaint_id} does not exist"))
    })
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<User, ApiError> {
    persistence
        .get_user(user_id)?
        .ok_or_else(|| ApiError::not_found("User", format!("User {user_id} does not exist")))
}

fn admin_count(persistence: &mut Persistence) -> Result<usize, ApiError> {
    let count: i64 = persistence.count_admins()?;
    usize::try_from(count).map_err(|e| ApiError::Internal {
        message: format!("Invalid admin count: {e}"),
    })
}

fn complaint_filter(query: &ListComplaintsQuery) -> Result<ComplaintFilter, ApiError> {
    let status: Option<ComplaintStatus> = non_blank(query.status.as_deref())
        .map(|s| ComplaintStatus::from_str(&s))
        .transpose()?;
    Ok(ComplaintFilter {
        status,
        search: non_blank(query.q.as_deref()),
    })
}

/// Applies a command to a stored complaint and persists the transition.
fn run_command(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    command: ComplaintCommand,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let complaint: Complaint = load_complaint(persistence, complaint_id)?;

    let transition: ComplaintTransition =
        apply(&complaint, command, &principal, now).inspect_err(|e| {
            warn!(complaint_id, user_id = principal.user_id, error = %e, "Complaint command rejected");
        })?;
    let updated: Complaint = persistence.persist_transition(complaint_id, &transition)?;

    info!(complaint_id, action = %transition.audit_event.action, "Complaint changed");
    complaint_info(&updated, &principal)
}

// ========================================================================
// Authentication
// ========================================================================

/// Authenticates a user and opens a session.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `attempts` - The failed-login store
/// * `config` - Session and throttle settings
/// * `request` - The login request
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if the credentials are wrong, the identifier is
/// locked, or a store fails.
pub fn login(
    persistence: &mut Persistence,
    attempts: &mut dyn AttemptStore,
    config: &AuthConfig,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let outcome: LoginOutcome = AuthenticationService::login(
        persistence,
        attempts,
        config,
        &request.identifier,
        &request.password,
        now,
    )?;

    Ok(LoginResponse {
        session_token: outcome.session_token,
        expires_at: format_timestamp(outcome.expires_at)?,
        user: user_info(&outcome.user)?,
    })
}

/// Ends the caller's session.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn logout(
    persistence: &mut Persistence,
    actor: &User,
    session_token: &str,
    now: OffsetDateTime,
) -> Result<MessageResponse, ApiError> {
    AuthenticationService::logout(persistence, actor, session_token, now)?;
    Ok(MessageResponse {
        message: String::from("Logged out"),
    })
}

/// Returns the caller's account and global capabilities.
///
/// # Errors
///
/// Returns an error if the account cannot be rendered.
pub fn whoami(actor: &User) -> Result<WhoAmIResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    Ok(WhoAmIResponse {
        user: user_info(actor)?,
        capabilities: compute_global_capabilities(&principal),
    })
}

/// Changes the caller's own password.
///
/// The current password must be supplied. Wrong current passwords count
/// against the same failed-login record as logins for the caller's
/// username. All of the caller's sessions, including the current one, are
/// revoked.
///
/// # Errors
///
/// Returns an error if:
/// - The caller's username is locked after repeated failures
/// - The current password is wrong
/// - The new password violates the password policy
/// - A store fails
pub fn change_password(
    persistence: &mut Persistence,
    attempts: &mut dyn AttemptStore,
    policy: &ThrottlePolicy,
    actor: &User,
    request: &ChangePasswordRequest,
    now: OffsetDateTime,
) -> Result<MessageResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let key: String = normalize_identifier(actor.username.value());
    policy.check(attempts, &key, now)?;

    let credentials: UserCredentials = persistence
        .get_credentials(principal.user_id)?
        .ok_or_else(|| {
            ApiError::not_found("User", format!("User {} does not exist", principal.user_id))
        })?;

    if !persistence.verify_password(&request.current_password, &credentials.password_hash)? {
        policy
            .record_failure(attempts, &key, now)
            .map_err(AuthError::from)?;
        warn!(user_id = principal.user_id, "Password change with wrong current password");
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }
    ThrottlePolicy::record_success(attempts, &key).map_err(AuthError::from)?;

    PasswordPolicy::default().validate(
        &request.new_password,
        actor.username.value(),
        &actor.full_name,
    )?;

    let event: AuditEvent = AuditEvent::new(
        principal.to_actor(),
        AuditAction::PasswordChanged,
        format!("{} changed their password", actor.username.value()),
        now,
    );
    persistence.set_password(principal.user_id, &request.new_password, &event)?;

    info!(user_id = principal.user_id, "Password changed");
    Ok(MessageResponse {
        message: String::from("Password changed"),
    })
}

/// Resets another user's password. Admin only.
///
/// All sessions of the target are revoked.
///
/// # Errors
///
/// Returns an error if the caller is not an admin, the target does not
/// exist, the password violates the policy, or a store fails.
pub fn reset_password(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
    request: &ResetPasswordRequest,
    now: OffsetDateTime,
) -> Result<MessageResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !can_manage_users(&principal) {
        return Err(denied("reset password", ADMIN).into());
    }

    let target: User = load_user(persistence, user_id)?;
    PasswordPolicy::default().validate(
        &request.new_password,
        target.username.value(),
        &target.full_name,
    )?;

    let event: AuditEvent = AuditEvent::new(
        principal.to_actor(),
        AuditAction::PasswordChanged,
        format!("Reset password of {}", target.username.value()),
        now,
    );
    persistence.set_password(user_id, &request.new_password, &event)?;

    info!(user_id, by = principal.user_id, "Password reset");
    Ok(MessageResponse {
        message: format!("Password reset for {}", target.username.value()),
    })
}

/// Creates the first administrator account.
///
/// Only succeeds while no account exists.
///
/// # Errors
///
/// Returns an error if an account already exists, the input is invalid,
/// or the password violates the policy.
pub fn create_first_admin(
    persistence: &mut Persistence,
    request: &CreateFirstAdminRequest,
    now: OffsetDateTime,
) -> Result<UserInfo, ApiError> {
    let username: Username = Username::parse(&request.username)?;
    let full_name: String = request.full_name.trim().to_string();
    validate_full_name(&full_name)?;
    PasswordPolicy::default().validate(&request.password, username.value(), &full_name)?;

    let user: User = User::new(username, full_name, Role::Admin, now);
    let event: AuditEvent = AuditEvent::new(
        Actor::system(),
        AuditAction::UserCreated,
        format!("Created first administrator {}", user.username.value()),
        now,
    );

    let created: User = persistence.create_first_admin(&user, &request.password, &event)?;
    user_info(&created)
}

// ========================================================================
// Users
// ========================================================================

/// Lists all accounts with per-account capabilities. Managers and admins only.
///
/// # Errors
///
/// Returns an error if the caller is staff or a store fails.
pub fn list_users(persistence: &mut Persistence, actor: &User) -> Result<ListUsersResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !principal.role.is_elevated() {
        return Err(denied("list users", MANAGER_OR_ADMIN).into());
    }

    let admins: usize = admin_count(persistence)?;
    let users: Vec<UserInfo> = persistence
        .list_users()?
        .iter()
        .map(|user| {
            let mut info: UserInfo = user_info(user)?;
            info.capabilities = Some(compute_user_capabilities(&principal, user, admins));
            Ok(info)
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(ListUsersResponse { users })
}

/// Creates an account. Admin only.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not an admin
/// - Any field is invalid or the password violates the policy
/// - The username or email is taken
pub fn create_user(
    persistence: &mut Persistence,
    actor: &User,
    request: &CreateUserRequest,
    now: OffsetDateTime,
) -> Result<UserInfo, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !can_manage_users(&principal) {
        return Err(denied("create user", ADMIN).into());
    }

    let username: Username = Username::parse(&request.username)?;
    let role: Role = Role::from_str(request.role.trim())?;
    let mut user: User = User::new(username, request.full_name.trim().to_string(), role, now);
    user.phone = parse_optional_phone(request.phone_country.as_deref(), request.phone.as_deref())?;
    user.email = parse_optional_email(request.email.as_deref())?;
    user.branch = non_blank(request.branch.as_deref());
    validate_user_fields(&user)?;

    PasswordPolicy::default().validate(&request.password, user.username.value(), &user.full_name)?;

    let event: AuditEvent = AuditEvent::new(
        principal.to_actor(),
        AuditAction::UserCreated,
        format!("Created user {} ({})", user.username.value(), role),
        now,
    );
    let created: User = persistence.create_user(&user, &request.password, &event)?;

    info!(user_id = ?created.user_id, role = %role, "User created");
    user_info(&created)
}

/// Updates an account's profile and, for admins, its role.
///
/// Users may edit their own profile. Changing a role requires an admin and
/// may not remove the last administrator.
///
/// # Errors
///
/// Returns an error if the caller lacks permission, the target does not
/// exist, a field is invalid, or the change would leave no administrator.
pub fn update_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
    request: &UpdateUserRequest,
    now: OffsetDateTime,
) -> Result<UserInfo, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !can_edit_profile(&principal, user_id) {
        return Err(denied("update user", ADMIN).into());
    }

    let existing: User = load_user(persistence, user_id)?;
    let role: Role = match non_blank(request.role.as_deref()) {
        Some(code) => Role::from_str(&code)?,
        None => existing.role,
    };
    if role != existing.role {
        if !can_manage_users(&principal) {
            return Err(denied("change role", ADMIN).into());
        }
        ensure_admin_remains(existing.role, Some(role), admin_count(persistence)?)?;
    }

    let user: User = User {
        user_id: Some(user_id),
        username: Username::parse(&request.username)?,
        full_name: request.full_name.trim().to_string(),
        role,
        phone: parse_optional_phone(request.phone_country.as_deref(), request.phone.as_deref())?,
        email: parse_optional_email(request.email.as_deref())?,
        branch: non_blank(request.branch.as_deref()),
        created_at: existing.created_at,
        last_login_at: existing.last_login_at,
    };
    validate_user_fields(&user)?;

    let details: String = if role == existing.role {
        format!("Updated user {}", user.username.value())
    } else {
        format!(
            "Updated user {} (role {} -> {})",
            user.username.value(),
            existing.role,
            role
        )
    };
    let event: AuditEvent =
        AuditEvent::new(principal.to_actor(), AuditAction::UserUpdated, details, now);
    let updated: User = persistence.update_user(user_id, &user, &event)?;

    info!(user_id, by = principal.user_id, "User updated");
    user_info(&updated)
}

/// Deletes another account. Managers and admins only.
///
/// Nobody may delete their own account, and the last administrator may
/// not be deleted.
///
/// # Errors
///
/// Returns an error if the caller lacks permission, the target does not
/// exist, or the target is the last administrator.
pub fn delete_user(
    persistence: &mut Persistence,
    actor: &User,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<MessageResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !can_delete_user(&principal, user_id) {
        warn!(user_id, by = principal.user_id, "User deletion denied");
        return Err(denied("delete user", MANAGER_OR_ADMIN).into());
    }

    let target: User = load_user(persistence, user_id)?;
    ensure_admin_remains(target.role, None, admin_count(persistence)?)?;

    let event: AuditEvent = AuditEvent::new(
        principal.to_actor(),
        AuditAction::UserDeleted,
        format!("Deleted user {}", target.username.value()),
        now,
    );
    persistence.delete_user(user_id, &event)?;

    info!(user_id, by = principal.user_id, "User deleted");
    Ok(MessageResponse {
        message: format!("Deleted user {}", target.username.value()),
    })
}

// ========================================================================
// Complaints
// ========================================================================

/// Lists complaints, newest first.
///
/// The query may narrow by status code and by a search term matched
/// against the ticket number, passenger name and passenger phone.
///
/// # Errors
///
/// Returns an error if the status code is unknown or a store fails.
pub fn list_complaints(
    persistence: &mut Persistence,
    actor: &User,
    query: &ListComplaintsQuery,
) -> Result<ListComplaintsResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let filter: ComplaintFilter = complaint_filter(query)?;
    let complaints: Vec<ComplaintInfo> = persistence
        .list_complaints(filter)?
        .iter()
        .map(|c| complaint_info(c, &principal))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ListComplaintsResponse { complaints })
}

/// Retrieves one complaint with its history.
///
/// # Errors
///
/// Returns an error if the complaint does not exist.
pub fn get_complaint(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
) -> Result<ComplaintInfo, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let complaint: Complaint = load_complaint(persistence, complaint_id)?;
    complaint_info(&complaint, &principal)
}

/// Logs a new complaint under the next ticket number.
///
/// The ticket year is the calendar year of `now` in `zone`.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `actor` - The creating user
/// * `request` - The complaint fields
/// * `zone` - The business time zone
/// * `now` - The creation instant
///
/// # Errors
///
/// Returns an error if any field is invalid or a store fails.
pub fn create_complaint(
    persistence: &mut Persistence,
    actor: &User,
    request: &ComplaintRequest,
    zone: Tz,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let details: ComplaintDetails = parse_details(request)?;
    let complaint: Complaint = build_complaint(details, &principal, now)?;
    let year: i32 = ticket_year(now, zone)?;

    let created: Complaint = persistence.create_complaint(&complaint, &principal, year)?;

    info!(
        complaint_id = ?created.complaint_id,
        ticket = %created.ticket_display(),
        "Complaint created"
    );
    complaint_info(&created, &principal)
}

/// Replaces a complaint's details. Creator, managers and admins only.
///
/// # Errors
///
/// Returns an error if the caller lacks permission, the complaint does not
/// exist, or a field is invalid.
pub fn update_complaint(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    request: &ComplaintRequest,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    let details: ComplaintDetails = parse_details(request)?;
    run_command(
        persistence,
        actor,
        complaint_id,
        ComplaintCommand::UpdateDetails { details },
        now,
    )
}

/// Sets a complaint's status, optionally with a note. Managers and admins only.
///
/// # Errors
///
/// Returns an error if the caller lacks permission, the complaint does not
/// exist, or the status code is unknown.
pub fn set_status(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    request: &SetStatusRequest,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    let status: ComplaintStatus = ComplaintStatus::from_str(request.status.trim())?;
    run_command(
        persistence,
        actor,
        complaint_id,
        ComplaintCommand::SetStatus {
            status,
            note: request.note.clone(),
        },
        now,
    )
}

/// Appends a manager note. Managers and admins only.
///
/// # Errors
///
/// Returns an error if the caller lacks permission, the complaint does not
/// exist, or the text or action type is invalid.
pub fn append_note(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    request: &AppendNoteRequest,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    let action_type: Option<ActionType> = non_blank(request.action_type.as_deref())
        .map(|code| ActionType::from_str(&code))
        .transpose()?;
    run_command(
        persistence,
        actor,
        complaint_id,
        ComplaintCommand::AppendNote {
            text: request.text.clone(),
            action_type,
        },
        now,
    )
}

/// Retracts a manager note, leaving a tombstone in the history.
///
/// # Errors
///
/// Returns an error if the caller is neither the author nor a manager or
/// admin, the note does not exist, or it was already retracted.
pub fn retract_note(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    note_id: i64,
    now: OffsetDateTime,
) -> Result<ComplaintInfo, ApiError> {
    run_command(
        persistence,
        actor,
        complaint_id,
        ComplaintCommand::RetractNote { note_id },
        now,
    )
}

/// Deletes a complaint.
///
/// Fails closed: a missing complaint or a caller without permission
/// yields `deleted = false` rather than an error.
///
/// # Errors
///
/// Returns an error only if a store fails.
pub fn delete_complaint(
    persistence: &mut Persistence,
    actor: &User,
    complaint_id: i64,
    now: OffsetDateTime,
) -> Result<DeleteResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    let Some(complaint) = persistence.get_complaint(complaint_id)? else {
        return Ok(DeleteResponse { deleted: false });
    };

    let Some(event) = authorize_delete(&complaint, &principal, now) else {
        warn!(complaint_id, user_id = principal.user_id, "Complaint deletion denied");
        return Ok(DeleteResponse { deleted: false });
    };

    let deleted: bool = persistence.delete_complaint(complaint_id, &event)?;
    if deleted {
        info!(complaint_id, ticket = %complaint.ticket_display(), "Complaint deleted");
    }
    Ok(DeleteResponse { deleted })
}

/// Builds the printable report of a complaint.
///
/// # Errors
///
/// Returns an error if the complaint does not exist.
pub fn complaint_report(
    persistence: &mut Persistence,
    complaint_id: i64,
) -> Result<ComplaintReport, ApiError> {
    let complaint: Complaint = load_complaint(persistence, complaint_id)?;
    build_report(&complaint)
}

/// Exports complaints as CSV, filtered the same way as the listing.
///
/// # Errors
///
/// Returns an error if the status code is unknown or a store fails.
pub fn export_complaints_csv(
    persistence: &mut Persistence,
    query: &ListComplaintsQuery,
) -> Result<String, ApiError> {
    let filter: ComplaintFilter = complaint_filter(query)?;
    let complaints: Vec<Complaint> = persistence.list_complaints(filter)?;
    write_csv(&complaints)
}

// ========================================================================
// Dashboard and activity log
// ========================================================================

/// Returns complaint counts.
///
/// # Errors
///
/// Returns an error if a store fails.
pub fn dashboard(persistence: &mut Persistence) -> Result<DashboardResponse, ApiError> {
    let stats: DashboardStats = persistence.dashboard_stats()?;
    Ok(DashboardResponse {
        total: stats.total,
        open: stats.open,
        resolved: stats.resolved,
        by_category: stats
            .by_category
            .iter()
            .map(|(category, count)| (category.as_str().to_string(), *count))
            .collect(),
        by_status: stats
            .by_status
            .iter()
            .map(|(status, count)| (status.as_str().to_string(), *count))
            .collect(),
    })
}

/// Reads recent activity log entries, newest first. Managers and admins only.
///
/// The limit is clamped to 100.
///
/// # Errors
///
/// Returns an error if the caller is staff or a store fails.
pub fn list_logs(
    persistence: &mut Persistence,
    actor: &User,
    limit: Option<usize>,
) -> Result<ListLogsResponse, ApiError> {
    let principal: Principal = principal_of(actor)?;
    if !can_read_logs(&principal) {
        return Err(denied("read activity log", MANAGER_OR_ADMIN).into());
    }

    let entries: Vec<LogEntryInfo> = persistence
        .list_audit_events(limit)?
        .into_iter()
        .map(|event| {
            Ok(LogEntryInfo {
                event_id: event.event_id.unwrap_or_default(),
                recorded_at: format_timestamp(event.recorded_at)?,
                actor_user_id: event.actor.user_id,
                actor_name: event.actor.display_name,
                action: event.action.as_str().to_string(),
                details: event.details,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(ListLogsResponse { entries })
}
