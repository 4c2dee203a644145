// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Complaint queries.
//!
//! A complaint is assembled from its own row plus its attachment and
//! note rows. Listings load children for all selected complaints in two
//! batched queries.

use complaint_desk_domain::{
    ActionType, Attachment, Complaint, ComplaintCategory, ComplaintDetails, ComplaintStatus,
    Country, DashboardStats, EmailAddress, ManagerNote, Passenger, PhoneNumber, Retraction,
    TicketNumber, Trip,
};
use diesel::SqliteConnection;
use diesel::dsl::max;
use diesel::prelude::*;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{
    ComplaintFilter, parse_date, parse_optional_timestamp, parse_time, parse_timestamp,
};
use crate::diesel_schema::{complaint_attachments, complaint_notes, complaints};
use crate::error::PersistenceError;

/// Diesel Queryable struct for complaint rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct ComplaintRow {
    complaint_id: i64,
    ticket_year: i32,
    ticket_seq: i64,
    passenger_name: String,
    passenger_phone_country: String,
    passenger_phone_digits: String,
    passenger_email: Option<String>,
    route: String,
    trip_date: String,
    departure_time: Option<String>,
    pnr: Option<String>,
    plate: Option<String>,
    ticket_price: Option<String>,
    purchase_channel: Option<String>,
    application_channel: Option<String>,
    category: String,
    subcategory: Option<String>,
    description: String,
    status: String,
    created_by: i64,
    created_by_name: String,
    created_at: String,
    updated_at: String,
}

/// Diesel Queryable struct for attachment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = complaint_attachments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct AttachmentRow {
    complaint_id: i64,
    file_name: String,
    content_type: String,
    data_base64: String,
}

/// Diesel Queryable struct for note rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = complaint_notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct NoteRow {
    note_id: i64,
    complaint_id: i64,
    author_id: i64,
    author_name: String,
    created_at: String,
    note_text: String,
    action_type: Option<String>,
    retracted_at: Option<String>,
    retracted_by: Option<i64>,
    retracted_by_name: Option<String>,
}

impl AttachmentRow {
    fn into_attachment(self) -> Result<Attachment, PersistenceError> {
        Ok(Attachment::new(
            &self.file_name,
            &self.content_type,
            &self.data_base64,
        )?)
    }
}

impl NoteRow {
    fn into_note(self) -> Result<ManagerNote, PersistenceError> {
        let retraction: Option<Retraction> = match (
            parse_optional_timestamp(self.retracted_at.as_deref())?,
            self.retracted_by,
        ) {
            (Some(retracted_at), Some(retracted_by)) => Some(Retraction {
                retracted_by,
                retracted_by_name: self.retracted_by_name.unwrap_or_default(),
                retracted_at,
            }),
            _ => None,
        };

        Ok(ManagerNote {
            note_id: Some(self.note_id),
            author_id: self.author_id,
            author_name: self.author_name,
            created_at: parse_timestamp(&self.created_at)?,
            text: self.note_text,
            action_type: self
                .action_type
                .as_deref()
                .map(ActionType::from_str)
                .transpose()?,
            retraction,
        })
    }
}

impl ComplaintRow {
    /// Matches an already lowercased search term.
    ///
    /// Phone matching only applies to terms made of digits and phone
    /// punctuation, compared digit for digit.
    fn matches_search(&self, term: &str) -> bool {
        let ticket: Option<String> = u32::try_from(self.ticket_seq)
            .ok()
            .and_then(|seq| TicketNumber::new(self.ticket_year, seq).ok())
            .map(|ticket| ticket.to_string());
        if ticket.is_some_and(|t| t.contains(term)) {
            return true;
        }
        if self.passenger_name.to_lowercase().contains(term) {
            return true;
        }

        let phone_like: bool = term
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '+' | '-'));
        let digits: String = term.chars().filter(char::is_ascii_digit).collect();
        phone_like && !digits.is_empty() && self.passenger_phone_digits.contains(&digits)
    }

    fn into_complaint(
        self,
        attachments: Vec<Attachment>,
        notes: Vec<ManagerNote>,
    ) -> Result<Complaint, PersistenceError> {
        let sequence: u32 = u32::try_from(self.ticket_seq).map_err(|_| {
            PersistenceError::CorruptRecord(format!("ticket sequence {}", self.ticket_seq))
        })?;
        let country: Country = Country::from_str(&self.passenger_phone_country)?;

        let details: ComplaintDetails = ComplaintDetails {
            passenger: Passenger {
                name: self.passenger_name,
                phone: PhoneNumber::parse(country, &self.passenger_phone_digits)?,
                email: self
                    .passenger_email
                    .as_deref()
                    .map(EmailAddress::parse)
                    .transpose()?,
            },
            trip: Trip {
                route: self.route,
                trip_date: parse_date(&self.trip_date)?,
                departure_time: self.departure_time.as_deref().map(parse_time).transpose()?,
                pnr: self.pnr,
                plate: self.plate,
                ticket_price: self.ticket_price,
                purchase_channel: self.purchase_channel,
                application_channel: self.application_channel,
            },
            category: ComplaintCategory::from_str(&self.category)?,
            subcategory: self.subcategory,
            description: self.description,
            attachments,
        };

        Ok(Complaint {
            complaint_id: Some(self.complaint_id),
            ticket: Some(TicketNumber::new(self.ticket_year, sequence)?),
            details,
            status: ComplaintStatus::from_str(&self.status)?,
            created_by: self.created_by,
            created_by_name: self.created_by_name,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            notes,
        })
    }
}

/// Retrieves a complaint with its attachments and history.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is corrupt.
/// Returns `Ok(None)` if the complaint does not exist.
pub fn get_complaint(
    conn: &mut SqliteConnection,
    complaint_id: i64,
) -> Result<Option<Complaint>, PersistenceError> {
    debug!("Loading complaint {}", complaint_id);

    let row: Option<ComplaintRow> = complaints::table
        .filter(complaints::complaint_id.eq(complaint_id))
        .select(ComplaintRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(assemble(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Lists complaints, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is corrupt.
pub fn list_complaints(
    conn: &mut SqliteConnection,
    filter: ComplaintFilter,
) -> Result<Vec<Complaint>, PersistenceError> {
    let mut query = complaints::table
        .select(ComplaintRow::as_select())
        .order((complaints::created_at.desc(), complaints::complaint_id.desc()))
        .into_boxed();

    if let Some(status) = filter.status {
        query = query.filter(complaints::status.eq(status.as_str()));
    }

    let mut rows: Vec<ComplaintRow> = query.load(conn)?;
    if let Some(term) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let term: String = term.to_lowercase();
        rows.retain(|row| row.matches_search(&term));
    }
    debug!("Listing {} complaints", rows.len());
    assemble(conn, rows)
}

/// Returns whether a complaint exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn complaint_exists(
    conn: &mut SqliteConnection,
    complaint_id: i64,
) -> Result<bool, PersistenceError> {
    let found: Option<i64> = complaints::table
        .filter(complaints::complaint_id.eq(complaint_id))
        .select(complaints::complaint_id)
        .first(conn)
        .optional()?;
    Ok(found.is_some())
}

/// Returns the highest ticket sequence stored for a year, or 0.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn max_ticket_sequence(
    conn: &mut SqliteConnection,
    ticket_year: i32,
) -> Result<i64, PersistenceError> {
    let highest: Option<i64> = complaints::table
        .filter(complaints::ticket_year.eq(ticket_year))
        .select(max(complaints::ticket_seq))
        .first(conn)?;
    Ok(highest.unwrap_or(0))
}

/// Computes dashboard statistics over all complaints.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored code is unknown.
pub fn dashboard_stats(conn: &mut SqliteConnection) -> Result<DashboardStats, PersistenceError> {
    let rows: Vec<(String, String)> = complaints::table
        .select((complaints::category, complaints::status))
        .load(conn)?;

    let mut stats: DashboardStats = DashboardStats::default();
    for (category, status) in rows {
        stats.record(
            ComplaintCategory::from_str(&category)?,
            ComplaintStatus::from_str(&status)?,
        );
    }
    Ok(stats)
}

fn assemble(
    conn: &mut SqliteConnection,
    rows: Vec<ComplaintRow>,
) -> Result<Vec<Complaint>, PersistenceError> {
    let ids: Vec<i64> = rows.iter().map(|r| r.complaint_id).collect();

    let attachment_rows: Vec<AttachmentRow> = complaint_attachments::table
        .filter(complaint_attachments::complaint_id.eq_any(ids.clone()))
        .order((
            complaint_attachments::complaint_id.asc(),
            complaint_attachments::position.asc(),
        ))
        .select(AttachmentRow::as_select())
        .load(conn)?;

    let note_rows: Vec<NoteRow> = complaint_notes::table
        .filter(complaint_notes::complaint_id.eq_any(ids))
        .order(complaint_notes::note_id.asc())
        .select(NoteRow::as_select())
        .load(conn)?;

    let mut attachments: HashMap<i64, Vec<Attachment>> = HashMap::new();
    for row in attachment_rows {
        let complaint_id: i64 = row.complaint_id;
        attachments
            .entry(complaint_id)
            .or_default()
            .push(row.into_attachment()?);
    }

    let mut notes: HashMap<i64, Vec<ManagerNote>> = HashMap::new();
    for row in note_rows {
        let complaint_id: i64 = row.complaint_id;
        notes.entry(complaint_id).or_default().push(row.into_note()?);
    }

    rows.into_iter()
        .map(|row| {
            let id: i64 = row.complaint_id;
            row.into_complaint(
                attachments.remove(&id).unwrap_or_default(),
                notes.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}
