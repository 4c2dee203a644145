// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket allocation and complaint writes.

use complaint_desk_domain::{
    Attachment, Complaint, ComplaintDetails, ComplaintStatus, ManagerNote, Retraction,
    TicketNumber,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::last_insert_rowid;
use crate::data_models::{format_date, format_time, format_timestamp};
use crate::diesel_schema::{complaint_attachments, complaint_notes, complaints, ticket_counters};
use crate::error::PersistenceError;
use crate::queries::complaints::max_ticket_sequence;

/// Column values derived from complaint details.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = complaints)]
#[diesel(treat_none_as_null = true)]
struct DetailsColumns<'a> {
    passenger_name: &'a str,
    passenger_phone_country: &'a str,
    passenger_phone_digits: &'a str,
    passenger_email: Option<&'a str>,
    route: &'a str,
    trip_date: String,
    departure_time: Option<String>,
    pnr: Option<&'a str>,
    plate: Option<&'a str>,
    ticket_price: Option<&'a str>,
    purchase_channel: Option<&'a str>,
    application_channel: Option<&'a str>,
    category: &'a str,
    subcategory: Option<&'a str>,
    description: &'a str,
}

impl<'a> DetailsColumns<'a> {
    fn from_details(details: &'a ComplaintDetails) -> Result<Self, PersistenceError> {
        Ok(Self {
            passenger_name: details.passenger.name.trim(),
            passenger_phone_country: details.passenger.phone.country().as_str(),
            passenger_phone_digits: details.passenger.phone.digits(),
            passenger_email: details.passenger.email.as_ref().map(|e| e.value()),
            route: details.trip.route.trim(),
            trip_date: format_date(details.trip.trip_date)?,
            departure_time: details.trip.departure_time.map(format_time).transpose()?,
            pnr: details.trip.pnr.as_deref(),
            plate: details.trip.plate.as_deref(),
            ticket_price: details.trip.ticket_price.as_deref(),
            purchase_channel: details.trip.purchase_channel.as_deref(),
            application_channel: details.trip.application_channel.as_deref(),
            category: details.category.as_str(),
            subcategory: details.subcategory.as_deref(),
            description: details.description.trim(),
        })
    }
}

/// Allocates the next ticket number for a year.
///
/// Must run inside an immediate transaction so that concurrent writers
/// serialize on the counter row. A missing counter row is initialized
/// from the highest sequence already stored for the year.
///
/// # Errors
///
/// Returns an error if the counter cannot be read or written, or the
/// sequence would overflow.
pub fn allocate_ticket(
    conn: &mut SqliteConnection,
    ticket_year: i32,
) -> Result<TicketNumber, PersistenceError> {
    let counter: Option<i64> = ticket_counters::table
        .filter(ticket_counters::ticket_year.eq(ticket_year))
        .select(ticket_counters::last_seq)
        .first(conn)
        .optional()?;

    let last: i64 = match counter {
        Some(last) => last,
        None => max_ticket_sequence(conn, ticket_year)?,
    };
    let next: i64 = last + 1;
    let sequence: u32 =
        u32::try_from(next).map_err(|_| PersistenceError::TicketSequenceExhausted(ticket_year))?;

    diesel::replace_into(ticket_counters::table)
        .values((
            ticket_counters::ticket_year.eq(ticket_year),
            ticket_counters::last_seq.eq(next),
        ))
        .execute(conn)?;

    debug!(ticket_year, sequence, "Allocated ticket sequence");
    Ok(TicketNumber::new(ticket_year, sequence)?)
}

/// Inserts a complaint row with its attachments and any initial notes.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_complaint(
    conn: &mut SqliteConnection,
    complaint: &Complaint,
    ticket: TicketNumber,
) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(complaint.created_at)?;
    let updated_at: String = format_timestamp(complaint.updated_at)?;

    diesel::insert_into(complaints::table)
        .values((
            complaints::ticket_year.eq(i32::from(ticket.year())),
            complaints::ticket_seq.eq(i64::from(ticket.sequence())),
            DetailsColumns::from_details(&complaint.details)?,
            complaints::status.eq(complaint.status.as_str()),
            complaints::created_by.eq(complaint.created_by),
            complaints::created_by_name.eq(&complaint.created_by_name),
            complaints::created_at.eq(&created_at),
            complaints::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

    let complaint_id: i64 = last_insert_rowid(conn)?;
    insert_attachments(conn, complaint_id, &complaint.details.attachments)?;
    for note in &complaint.notes {
        insert_note(conn, complaint_id, note)?;
    }

    info!(complaint_id, %ticket, "Complaint created");
    Ok(complaint_id)
}

/// Replaces a complaint's details and attachments.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_details(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    details: &ComplaintDetails,
    updated_at: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::update(complaints::table)
        .filter(complaints::complaint_id.eq(complaint_id))
        .set((
            DetailsColumns::from_details(details)?,
            complaints::updated_at.eq(format_timestamp(updated_at)?),
        ))
        .execute(conn)?;

    diesel::delete(complaint_attachments::table)
        .filter(complaint_attachments::complaint_id.eq(complaint_id))
        .execute(conn)?;
    insert_attachments(conn, complaint_id, &details.attachments)?;

    Ok(rows_affected)
}

/// Sets a complaint's status.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_status(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    status: ComplaintStatus,
    updated_at: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    Ok(diesel::update(complaints::table)
        .filter(complaints::complaint_id.eq(complaint_id))
        .set((
            complaints::status.eq(status.as_str()),
            complaints::updated_at.eq(format_timestamp(updated_at)?),
        ))
        .execute(conn)?)
}

/// Bumps a complaint's modification time.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn touch_complaint(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    updated_at: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    Ok(diesel::update(complaints::table)
        .filter(complaints::complaint_id.eq(complaint_id))
        .set(complaints::updated_at.eq(format_timestamp(updated_at)?))
        .execute(conn)?)
}

/// Appends a note to a complaint's history.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_note(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    note: &ManagerNote,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(complaint_notes::table)
        .values((
            complaint_notes::complaint_id.eq(complaint_id),
            complaint_notes::author_id.eq(note.author_id),
            complaint_notes::author_name.eq(&note.author_name),
            complaint_notes::created_at.eq(format_timestamp(note.created_at)?),
            complaint_notes::note_text.eq(&note.text),
            complaint_notes::action_type.eq(note.action_type.map(|a| a.as_str())),
        ))
        .execute(conn)?;

    let note_id: i64 = last_insert_rowid(conn)?;
    debug!(complaint_id, note_id, "Note appended");
    Ok(note_id)
}

/// Marks a note as retracted.
///
/// Only a note that is not yet retracted is updated.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn retract_note(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    note_id: i64,
    retraction: &Retraction,
) -> Result<usize, PersistenceError> {
    Ok(diesel::update(complaint_notes::table)
        .filter(complaint_notes::note_id.eq(note_id))
        .filter(complaint_notes::complaint_id.eq(complaint_id))
        .filter(complaint_notes::retracted_at.is_null())
        .set((
            complaint_notes::retracted_at.eq(Some(format_timestamp(retraction.retracted_at)?)),
            complaint_notes::retracted_by.eq(Some(retraction.retracted_by)),
            complaint_notes::retracted_by_name.eq(Some(retraction.retracted_by_name.as_str())),
        ))
        .execute(conn)?)
}

/// Deletes a complaint. Attachments and notes go with it.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_complaint(
    conn: &mut SqliteConnection,
    complaint_id: i64,
) -> Result<usize, PersistenceError> {
    Ok(diesel::delete(complaints::table)
        .filter(complaints::complaint_id.eq(complaint_id))
        .execute(conn)?)
}

fn insert_attachments(
    conn: &mut SqliteConnection,
    complaint_id: i64,
    attachments: &[Attachment],
) -> Result<(), PersistenceError> {
    for (position, attachment) in attachments.iter().enumerate() {
        let position: i32 = i32::try_from(position).unwrap_or(i32::MAX);
        diesel::insert_into(complaint_attachments::table)
            .values((
                complaint_attachments::complaint_id.eq(complaint_id),
                complaint_attachments::position.eq(position),
                complaint_attachments::file_name.eq(attachment.file_name()),
                complaint_attachments::content_type.eq(attachment.content_type()),
                complaint_attachments::data_base64.eq(attachment.data_base64()),
            ))
            .execute(conn)?;
    }
    Ok(())
}
