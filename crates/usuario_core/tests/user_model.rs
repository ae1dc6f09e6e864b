use usuario_core::{UserDraft, UserRecord, ValidationError};

#[test]
fn valid_draft_passes_gate() {
    UserDraft::new("Ana", 30, "ana@x.com").validate().unwrap();
    UserDraft::new("Bob", 0, "b@x.io").validate().unwrap();
    UserDraft::new("Old Timer", 150, "old@mail.example.org")
        .validate()
        .unwrap();
}

#[test]
fn name_rules() {
    for name in ["", "   ", "ab", "  ab  "] {
        assert!(
            matches!(
                UserDraft::new(name, 30, "a@x.com").validate(),
                Err(ValidationError::InvalidName(_))
            ),
            "name {name:?} should be rejected"
        );
    }

    let max = "a".repeat(100);
    UserDraft::new(max.as_str(), 30, "a@x.com").validate().unwrap();
    let too_long = "a".repeat(101);
    assert!(UserDraft::new(too_long, 30, "a@x.com").validate().is_err());

    for name in ["ab\0cd", "Ana\tSilva", "Ana\nSilva", "Ana\u{7f}"] {
        assert!(
            matches!(
                UserDraft::new(name, 30, "a@x.com").validate(),
                Err(ValidationError::InvalidName(_))
            ),
            "name {name:?} with control characters should be rejected"
        );
    }

    // Length counts characters, not bytes.
    UserDraft::new("Zé", 30, "a@x.com").validate().unwrap_err();
    UserDraft::new("Zoé", 30, "a@x.com").validate().unwrap();
}

#[test]
fn age_rules() {
    assert_eq!(
        UserDraft::new("Ana", -1, "a@x.com").validate(),
        Err(ValidationError::InvalidAge(-1))
    );
    assert_eq!(
        UserDraft::new("Ana", 151, "a@x.com").validate(),
        Err(ValidationError::InvalidAge(151))
    );
}

#[test]
fn email_rules() {
    for email in [
        "",
        "   ",
        "not-an-email",
        "ana@x",
        "ana@.com ",
        "a na@x.com",
        "ana@@x.com",
    ] {
        assert!(
            matches!(
                UserDraft::new("Ana", 30, email).validate(),
                Err(ValidationError::InvalidEmail(_))
            ),
            "email {email:?} should be rejected"
        );
    }

    let local = "a".repeat(246);
    let exactly_255 = format!("{local}@x.com.br");
    assert_eq!(exactly_255.chars().count(), 255);
    UserDraft::new("Ana", 30, exactly_255.as_str())
        .validate()
        .unwrap();
    let too_long = format!("a{exactly_255}");
    assert!(UserDraft::new("Ana", 30, too_long).validate().is_err());
}

#[test]
fn user_record_serializes_with_snake_case_fields() {
    let user = UserRecord {
        id: 1,
        name: "Ana".to_string(),
        age: 30,
        email: "ana@x.com".to_string(),
        registered_at: 1_700_000_000_000,
        updated_at: None,
    };

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["registered_at"], 1_700_000_000_000_i64);
    assert!(json["updated_at"].is_null());

    let back: UserRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, user);
}
