use std::time::Instant;

use super::*;

fn creds() -> Credentials {
    Credentials::new(Some("admin-secret"), Some("student-secret"), Some("action-secret"))
}

fn fresh_session() -> Session {
    Session::new(Instant::now())
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_from_username_known_accounts() {
    assert_eq!(Role::from_username("admin"), Some(Role::Admin));
    assert_eq!(Role::from_username(" student "), Some(Role::Student));
    assert_eq!(Role::from_username("Admin"), None);
    assert_eq!(Role::from_username("root"), None);
}

#[test]
fn role_as_str_matches_username() {
    assert_eq!(Role::Admin.as_str(), "admin");
    assert_eq!(Role::Student.as_str(), "student");
}

// =============================================================================
// login
// =============================================================================

#[test]
fn login_admin_sets_current_user() {
    let mut session = fresh_session();
    let role = login(&creds(), &mut session, "admin", "admin-secret").unwrap();

    assert_eq!(role, Role::Admin);
    assert!(session.logged_in);
    assert_eq!(session.current_user, Some(Role::Admin));
}

#[test]
fn login_student_sets_current_user() {
    let mut session = fresh_session();
    login(&creds(), &mut session, "student", "student-secret").unwrap();
    assert_eq!(session.current_user, Some(Role::Student));
}

#[test]
fn login_rejects_any_other_pair() {
    let pairs = [
        ("admin", "student-secret"),
        ("student", "admin-secret"),
        ("guest", "admin-secret"),
        ("admin", "admin-secret "),
        ("ADMIN", "admin-secret"),
    ];
    for (username, password) in pairs {
        let mut session = fresh_session();
        let err = login(&creds(), &mut session, username, password).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials), "{username}/{password}");
        assert!(!session.logged_in);
        assert_eq!(session.current_user, None);
    }
}

#[test]
fn login_requires_both_fields() {
    let mut session = fresh_session();
    let err = login(&creds(), &mut session, "admin", "").unwrap_err();
    assert!(matches!(err, AuthError::MissingLoginFields));
    assert_eq!(err.error_code(), "E_MISSING_FIELDS");

    let err = login(&creds(), &mut session, "  ", "x").unwrap_err();
    assert!(matches!(err, AuthError::MissingLoginFields));
}

#[test]
fn login_fails_for_unconfigured_account() {
    let creds = Credentials::new(Some("admin-secret"), None, None);
    let mut session = fresh_session();
    assert!(login(&creds, &mut session, "student", "anything").is_err());
    assert!(login(&creds, &mut session, "admin", "admin-secret").is_ok());
}

// =============================================================================
// admin action gate
// =============================================================================

#[test]
fn unlock_admin_with_correct_secret() {
    let mut session = fresh_session();
    unlock_admin(&creds(), &mut session, "action-secret").unwrap();
    assert!(session.admin_unlocked);
    assert!(!session.logged_in, "unlocking does not log in");
}

#[test]
fn unlock_admin_is_independent_of_login_secret() {
    let mut session = fresh_session();
    let err = unlock_admin(&creds(), &mut session, "admin-secret").unwrap_err();
    assert!(matches!(err, AuthError::InvalidAdminPassword));
    assert!(!session.admin_unlocked);
}

#[test]
fn unlock_admin_disabled_without_secret() {
    let creds = Credentials::new(Some("a"), Some("s"), None);
    let mut session = fresh_session();
    let err = unlock_admin(&creds, &mut session, "").unwrap_err();
    assert!(matches!(err, AuthError::AdminActionDisabled));
}

#[test]
fn credentials_debug_hides_secrets() {
    let debug = format!("{:?}", creds());
    assert!(!debug.contains("secret"));
    assert!(debug.contains("admin: true"));
}

// =============================================================================
// sign_up
// =============================================================================

#[test]
fn sign_up_acknowledges_complete_form() {
    let ack = sign_up(" dana ", "dana@example.edu", "pw").unwrap();
    assert_eq!(ack.username, "dana");
    assert_eq!(ack.email, "dana@example.edu");
    assert!(ack.message.contains("dana@example.edu"));
}

#[test]
fn sign_up_requires_every_field() {
    for (u, e, p) in [("", "a@b.c", "pw"), ("u", "", "pw"), ("u", "a@b.c", "")] {
        assert!(matches!(sign_up(u, e, p), Err(AuthError::MissingSignUpFields)));
    }
}

#[test]
fn sign_up_rejects_malformed_email() {
    for email in ["no-at-sign", "@example.edu", "dana@"] {
        assert!(matches!(sign_up("dana", email, "pw"), Err(AuthError::InvalidEmail(_))), "{email}");
    }
}

#[test]
fn sign_up_does_not_create_a_login() {
    sign_up("dana", "dana@example.edu", "pw").unwrap();
    assert_eq!(creds().verify_login("dana", "pw"), None);
}
