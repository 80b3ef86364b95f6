use todolist::auth::Accounts;
use todolist::error::AuthError;

#[test]
fn test_register_and_login() {
    let dir = tempfile::tempdir().unwrap();
    let accounts = Accounts::new(dir.path());

    let ada = accounts.create_user("ada", "secret", None).unwrap();
    let bob = accounts.create_user("bob", "hunter2", Some("Bob B.".into())).unwrap();
    assert_ne!(ada.id, bob.id);

    let session = accounts.login_with_password("ada", "secret").unwrap();
    assert_eq!(session.user_id(), Some(&ada.id));
    assert_eq!(session.user.unwrap().display_name(), "ada");
}

#[test]
fn test_bad_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let accounts = Accounts::new(dir.path());
    accounts.create_user("ada", "secret", None).unwrap();

    assert!(matches!(accounts.login_with_password("ada", "nope"), Err(AuthError::InvalidCredentials)));
    assert!(matches!(accounts.login_with_password("eve", "secret"), Err(AuthError::InvalidCredentials)));
    assert!(!accounts.current_session().unwrap().is_logged_in());
}

#[test]
fn test_duplicate_and_blank_usernames() {
    let dir = tempfile::tempdir().unwrap();
    let accounts = Accounts::new(dir.path());
    accounts.create_user("ada", "secret", None).unwrap();

    assert!(matches!(accounts.create_user("ada", "x", None), Err(AuthError::UserExists(_))));
    assert!(matches!(accounts.create_user("  ", "x", None), Err(AuthError::EmptyUsername)));
}

#[test]
fn test_session_survives_reopen_and_logout_clears_it() {
    let dir = tempfile::tempdir().unwrap();
    {
        let accounts = Accounts::new(dir.path());
        accounts.create_user("ada", "secret", None).unwrap();
        accounts.login_with_password("ada", "secret").unwrap();
    }

    let accounts = Accounts::new(dir.path());
    let session = accounts.current_session().unwrap();
    assert_eq!(session.user.as_ref().map(|u| u.username.as_str()), Some("ada"));

    accounts.logout().unwrap();
    assert!(!Accounts::new(dir.path()).current_session().unwrap().is_logged_in());
}

#[test]
fn test_session_file_keeps_only_the_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let accounts = Accounts::new(dir.path());
    let ada = accounts.create_user("ada", "secret", None).unwrap();
    accounts.login_with_password("ada", "secret").unwrap();

    let saved = std::fs::read_to_string(dir.path().join("session.json")).unwrap();
    assert!(saved.contains(&ada.id.0));
    assert!(!saved.contains("password_hash"));
    assert!(!saved.contains(&ada.password_hash));
}

#[test]
fn test_passwords_are_stored_salted() {
    let dir = tempfile::tempdir().unwrap();
    let accounts = Accounts::new(dir.path());
    let ada = accounts.create_user("ada", "same", None).unwrap();
    let bob = accounts.create_user("bob", "same", None).unwrap();

    assert!(ada.password_hash.starts_with("$argon2"));
    assert_ne!(ada.password_hash, bob.password_hash);
    assert!(accounts.login_with_password("bob", "same").is_ok());
}
