// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session persistence tests.

use super::{create_test_persistence, seed_user, system_event, test_now};
use crate::{Persistence, SessionData};
use complaint_desk_audit::{AuditAction, AuditEvent};
use complaint_desk_domain::{Role, User};
use time::{Duration, OffsetDateTime};

fn login(persistence: &mut Persistence, token: &str, user_id: i64, expires_at: OffsetDateTime) {
    persistence
        .start_session(
            token,
            user_id,
            test_now(),
            expires_at,
            &system_event(AuditAction::Login, "login"),
        )
        .unwrap();
}

#[test]
fn test_start_session_records_login() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "sessioned", Role::Staff);
    let user_id: i64 = user.user_id.unwrap();

    login(
        &mut persistence,
        "abc123",
        user_id,
        test_now() + Duration::hours(24),
    );

    let session: SessionData = persistence.get_session_by_token("abc123").unwrap().unwrap();
    assert_eq!(session.user_id, user_id);
    assert_eq!(session.created_at, test_now());
    assert_eq!(session.expires_at, test_now() + Duration::hours(24));

    let stored: User = persistence.get_user(user_id).unwrap().unwrap();
    assert_eq!(stored.last_login_at, Some(test_now()));

    let events: Vec<AuditEvent> = persistence.list_audit_events(None).unwrap();
    assert_eq!(events[0].action, AuditAction::Login);
}

#[test]
fn test_touch_session_updates_activity() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "active", Role::Staff);
    login(
        &mut persistence,
        "touch-me",
        user.user_id.unwrap(),
        test_now() + Duration::hours(24),
    );
    let session: SessionData = persistence.get_session_by_token("touch-me").unwrap().unwrap();

    let later: OffsetDateTime = test_now() + Duration::minutes(30);
    persistence.touch_session(session.session_id, later).unwrap();

    let touched: SessionData = persistence.get_session_by_token("touch-me").unwrap().unwrap();
    assert_eq!(touched.last_activity_at, later);
    assert_eq!(touched.expires_at, session.expires_at);
}

#[test]
fn test_end_session_logs_logout_once() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "leaving", Role::Staff);
    login(
        &mut persistence,
        "bye",
        user.user_id.unwrap(),
        test_now() + Duration::hours(24),
    );
    let logout: AuditEvent = system_event(AuditAction::Logout, "leaving");

    assert!(persistence.end_session("bye", &logout).unwrap());
    assert!(!persistence.end_session("bye", &logout).unwrap());

    let logouts: usize = persistence
        .list_audit_events(None)
        .unwrap()
        .iter()
        .filter(|e| e.action == AuditAction::Logout)
        .count();
    assert_eq!(logouts, 1);
}

#[test]
fn test_delete_expired_sessions_keeps_live_ones() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "multi", Role::Staff);
    let user_id: i64 = user.user_id.unwrap();
    login(&mut persistence, "stale", user_id, test_now() + Duration::hours(1));
    login(&mut persistence, "fresh", user_id, test_now() + Duration::hours(48));

    let removed: usize = persistence
        .delete_expired_sessions(test_now() + Duration::hours(2))
        .unwrap();

    assert_eq!(removed, 1);
    assert!(persistence.get_session_by_token("stale").unwrap().is_none());
    assert!(persistence.get_session_by_token("fresh").unwrap().is_some());
}

#[test]
fn test_delete_session_without_logging() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "quiet", Role::Staff);
    login(
        &mut persistence,
        "quiet-token",
        user.user_id.unwrap(),
        test_now() + Duration::hours(1),
    );
    let before: usize = persistence.list_audit_events(None).unwrap().len();

    assert!(persistence.delete_session("quiet-token").unwrap());
    assert!(!persistence.delete_session("quiet-token").unwrap());
    assert_eq!(persistence.list_audit_events(None).unwrap().len(), before);
}
