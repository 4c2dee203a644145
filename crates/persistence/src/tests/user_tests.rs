// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account persistence tests.

use super::{
    TEST_PASSWORD, create_test_persistence, create_test_user, seed_user, system_event, test_now,
};
use crate::{Persistence, PersistenceError, UserCredentials};
use complaint_desk_audit::{AuditAction, AuditEvent};
use complaint_desk_domain::{EmailAddress, Role, User, Username};
use time::Duration;

#[test]
fn test_create_user_assigns_id_and_logs() {
    let mut persistence: Persistence = create_test_persistence();

    let user: User = seed_user(&mut persistence, "ayse", Role::Staff);

    assert!(user.user_id.is_some());
    let stored: User = persistence.get_user(user.user_id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.username.value(), "ayse");
    assert_eq!(stored.role, Role::Staff);

    let events: Vec<AuditEvent> = persistence.list_audit_events(None).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserCreated);
}

#[test]
fn test_password_is_stored_hashed() {
    let mut persistence: Persistence = create_test_persistence();
    seed_user(&mut persistence, "hashed", Role::Staff);

    let credentials: UserCredentials = persistence.find_credentials("hashed").unwrap().unwrap();
    assert_ne!(credentials.password_hash, TEST_PASSWORD);
    assert!(credentials.password_hash.starts_with("$2"));
    assert!(
        persistence
            .verify_password(TEST_PASSWORD, &credentials.password_hash)
            .unwrap()
    );
    assert!(
        !persistence
            .verify_password("Wrong1234", &credentials.password_hash)
            .unwrap()
    );
}

#[test]
fn test_duplicate_username_rejected_case_insensitively() {
    let mut persistence: Persistence = create_test_persistence();
    seed_user(&mut persistence, "mehmet", Role::Staff);

    let result: Result<User, PersistenceError> = persistence.create_user(
        &create_test_user("MEHMET", Role::Manager),
        TEST_PASSWORD,
        &system_event(AuditAction::UserCreated, "MEHMET"),
    );

    assert_eq!(
        result,
        Err(PersistenceError::DuplicateUsername(String::from("mehmet")))
    );
    assert_eq!(persistence.count_users().unwrap(), 1);
    // The failed creation leaves no audit trace.
    assert_eq!(persistence.list_audit_events(None).unwrap().len(), 1);
}

#[test]
fn test_duplicate_email_rejected() {
    let mut persistence: Persistence = create_test_persistence();
    let mut first: User = create_test_user("first", Role::Staff);
    first.email = Some(EmailAddress::parse("desk@example.com").unwrap());
    persistence
        .create_user(
            &first,
            TEST_PASSWORD,
            &system_event(AuditAction::UserCreated, "first"),
        )
        .unwrap();

    let mut second: User = create_test_user("second", Role::Staff);
    second.email = Some(EmailAddress::parse("Desk@Example.com").unwrap());
    let result: Result<User, PersistenceError> = persistence.create_user(
        &second,
        TEST_PASSWORD,
        &system_event(AuditAction::UserCreated, "second"),
    );

    assert!(matches!(result, Err(PersistenceError::DuplicateEmail(_))));
}

#[test]
fn test_find_credentials_by_username_or_email() {
    let mut persistence: Persistence = create_test_persistence();
    let mut user: User = create_test_user("fatma", Role::Manager);
    user.email = Some(EmailAddress::parse("fatma@example.com").unwrap());
    persistence
        .create_user(
            &user,
            TEST_PASSWORD,
            &system_event(AuditAction::UserCreated, "fatma"),
        )
        .unwrap();

    let by_name: UserCredentials = persistence.find_credentials("FaTmA").unwrap().unwrap();
    let by_email: UserCredentials = persistence
        .find_credentials("FATMA@example.com")
        .unwrap()
        .unwrap();

    assert_eq!(by_name.user.user_id, by_email.user.user_id);
    assert!(persistence.find_credentials("nobody").unwrap().is_none());
    assert!(
        persistence
            .find_credentials("nobody@example.com")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_create_first_admin_only_while_empty() {
    let mut persistence: Persistence = create_test_persistence();
    let event: AuditEvent = system_event(AuditAction::UserCreated, "root_admin");

    let admin: User = persistence
        .create_first_admin(
            &create_test_user("root_admin", Role::Admin),
            TEST_PASSWORD,
            &event,
        )
        .unwrap();
    assert!(admin.user_id.is_some());

    let second: Result<User, PersistenceError> = persistence.create_first_admin(
        &create_test_user("another_admin", Role::Admin),
        TEST_PASSWORD,
        &event,
    );
    assert_eq!(second, Err(PersistenceError::AlreadyBootstrapped));
    assert_eq!(persistence.count_admins().unwrap(), 1);
}

#[test]
fn test_list_users_ordered_by_username() {
    let mut persistence: Persistence = create_test_persistence();
    seed_user(&mut persistence, "zeki", Role::Staff);
    seed_user(&mut persistence, "ali", Role::Admin);
    seed_user(&mut persistence, "murat", Role::Manager);

    let names: Vec<String> = persistence
        .list_users()
        .unwrap()
        .into_iter()
        .map(|u| u.username.value().to_string())
        .collect();
    assert_eq!(names, vec!["ali", "murat", "zeki"]);
    assert_eq!(persistence.count_admins().unwrap(), 1);
}

#[test]
fn test_update_user_changes_role_and_profile() {
    let mut persistence: Persistence = create_test_persistence();
    let mut user: User = seed_user(&mut persistence, "emre", Role::Staff);
    let user_id: i64 = user.user_id.unwrap();

    user.role = Role::Manager;
    user.branch = Some(String::from("Izmir"));
    persistence
        .update_user(
            user_id,
            &user,
            &system_event(AuditAction::UserUpdated, "emre"),
        )
        .unwrap();

    let stored: User = persistence.get_user(user_id).unwrap().unwrap();
    assert_eq!(stored.role, Role::Manager);
    assert_eq!(stored.branch.as_deref(), Some("Izmir"));
}

#[test]
fn test_update_user_rejects_taken_username() {
    let mut persistence: Persistence = create_test_persistence();
    seed_user(&mut persistence, "taken", Role::Staff);
    let mut user: User = seed_user(&mut persistence, "renamer", Role::Staff);

    user.username = Username::parse("taken").unwrap();
    let result: Result<User, PersistenceError> = persistence.update_user(
        user.user_id.unwrap(),
        &user,
        &system_event(AuditAction::UserUpdated, "renamer"),
    );
    assert!(matches!(result, Err(PersistenceError::DuplicateUsername(_))));
}

#[test]
fn test_update_missing_user_fails() {
    let mut persistence: Persistence = create_test_persistence();
    let result: Result<User, PersistenceError> = persistence.update_user(
        404,
        &create_test_user("ghost", Role::Staff),
        &system_event(AuditAction::UserUpdated, "ghost"),
    );
    assert_eq!(result, Err(PersistenceError::UserNotFound(404)));
}

#[test]
fn test_delete_user_removes_sessions() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "leaver", Role::Staff);
    let user_id: i64 = user.user_id.unwrap();
    persistence
        .start_session(
            "token-leaver",
            user_id,
            test_now(),
            test_now() + Duration::hours(24),
            &system_event(AuditAction::Login, "leaver"),
        )
        .unwrap();

    persistence
        .delete_user(user_id, &system_event(AuditAction::UserDeleted, "leaver"))
        .unwrap();

    assert!(persistence.get_user(user_id).unwrap().is_none());
    assert!(
        persistence
            .get_session_by_token("token-leaver")
            .unwrap()
            .is_none()
    );
    assert_eq!(
        persistence.delete_user(user_id, &system_event(AuditAction::UserDeleted, "again")),
        Err(PersistenceError::UserNotFound(user_id))
    );
}

#[test]
fn test_set_password_revokes_sessions() {
    let mut persistence: Persistence = create_test_persistence();
    let user: User = seed_user(&mut persistence, "rotator", Role::Staff);
    let user_id: i64 = user.user_id.unwrap();
    persistence
        .start_session(
            "token-rotator",
            user_id,
            test_now(),
            test_now() + Duration::hours(24),
            &system_event(AuditAction::Login, "rotator"),
        )
        .unwrap();

    persistence
        .set_password(
            user_id,
            "NewSecret456",
            &system_event(AuditAction::PasswordChanged, "rotator"),
        )
        .unwrap();

    let credentials: UserCredentials = persistence.get_credentials(user_id).unwrap().unwrap();
    assert!(
        persistence
            .verify_password("NewSecret456", &credentials.password_hash)
            .unwrap()
    );
    assert!(
        !persistence
            .verify_password(TEST_PASSWORD, &credentials.password_hash)
            .unwrap()
    );
    assert!(
        persistence
            .get_session_by_token("token-rotator")
            .unwrap()
            .is_none()
    );
}
