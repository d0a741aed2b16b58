use chrono::Utc;

use crate::errors::ModelError;
use crate::user::validate_email;
use crate::*;

fn book(id: u64, title: &str) -> Book {
    Book {
        id,
        categoryid: 1,
        title: title.into(),
        author: "Ursula K. Le Guin".into(),
        price: "12.50".into(),
        created_at: Utc::now(),
    }
}

#[test]
fn book_input_applies_defaults() {
    let new = BookInput { categoryid: Some(2), ..Default::default() }.into_new().unwrap();
    assert_eq!(new.title, "");
    assert_eq!(new.author, "");
    assert_eq!(new.price, "0");

    let err = BookInput { title: Some("Dune".into()), ..Default::default() }
        .into_new()
        .unwrap_err();
    assert_eq!(err, ModelError::Validation("categoryid is required".into()));
}

#[test]
fn book_merge_overrides_present_fields_only() {
    let stored = book(3, "A");
    let merged = stored.clone().merge(BookPatch { title: Some("B".into()), ..Default::default() });
    assert_eq!(merged.title, "B");
    assert_eq!(merged.id, stored.id);
    assert_eq!(merged.author, stored.author);
    assert_eq!(merged.price, stored.price);
    assert_eq!(merged.created_at, stored.created_at);
}

#[test]
fn book_deserializes_legacy_rows_with_missing_fields() {
    let raw = r#"{"id":7,"categoryid":1,"created_at":"2024-01-05T10:00:00.000Z"}"#;
    let b: Book = serde_json::from_str(raw).unwrap();
    assert_eq!(b.id, 7);
    assert_eq!(b.title, "");
    assert_eq!(b.price, "0");
}

#[test]
fn category_input_requires_name() {
    assert!(CategoryInput { name: Some("  ".into()) }.into_new().is_err());
    assert!(CategoryInput::default().into_new().is_err());
    let new = CategoryInput { name: Some(" Fantasy ".into()) }.into_new().unwrap();
    assert_eq!(new.name, "Fantasy");
    assert!(CategoryPatch { name: Some(String::new()) }.validate().is_err());
    assert!(CategoryPatch::default().validate().is_ok());
}

#[test]
fn user_defaults_role_when_missing() {
    let raw = r#"{
        "id": 1,
        "email": "a@b.com",
        "password": "$argon2id$x",
        "created_at": "2024-01-05T10:00:00Z"
    }"#;
    let u: User = serde_json::from_str(raw).unwrap();
    assert_eq!(u.role, "user");

    let created = User::from_draft(4, NewUser::with_default_role("c@d.com", "hash"));
    assert_eq!(created.id, 4);
    assert_eq!(created.role, user::DEFAULT_ROLE);
    assert_eq!(created.password, "hash");
}

#[test]
fn email_validation() {
    assert!(validate_email("a@b.com").is_ok());
    assert!(validate_email("no-at-sign").is_err());
    assert!(validate_email("@b.com").is_err());
    assert!(validate_email("a@").is_err());
    assert!(validate_email("a@b@c").is_err());
}
