// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity log persistence tests.

use super::{create_test_persistence, system_event};
use crate::Persistence;
use complaint_desk_audit::{AuditAction, AuditEvent, MAX_LOG_READ};

fn fill_log(persistence: &mut Persistence, count: usize) {
    for i in 0..count {
        persistence
            .persist_audit_event(&system_event(AuditAction::Login, &format!("entry {i}")))
            .unwrap();
    }
}

#[test]
fn test_audit_events_newest_first() {
    let mut persistence: Persistence = create_test_persistence();
    fill_log(&mut persistence, 3);

    let events: Vec<AuditEvent> = persistence.list_audit_events(None).unwrap();
    let details: Vec<&str> = events.iter().map(|e| e.details.as_str()).collect();
    assert_eq!(details, vec!["entry 2", "entry 1", "entry 0"]);
    assert!(events.iter().all(|e| e.event_id.is_some()));
    assert_eq!(events[0].actor.display_name, "system");
    assert_eq!(events[0].actor.user_id, None);
}

#[test]
fn test_audit_read_limit_is_clamped() {
    let mut persistence: Persistence = create_test_persistence();
    fill_log(&mut persistence, MAX_LOG_READ + 5);

    assert_eq!(
        persistence.list_audit_events(None).unwrap().len(),
        MAX_LOG_READ
    );
    assert_eq!(
        persistence.list_audit_events(Some(500)).unwrap().len(),
        MAX_LOG_READ
    );
    assert_eq!(persistence.list_audit_events(Some(10)).unwrap().len(), 10);
    assert_eq!(persistence.list_audit_events(Some(0)).unwrap().len(), 1);
}
