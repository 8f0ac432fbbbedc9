use kidsapp_core::User;

#[test]
fn new_user_has_no_identity() {
    let user = User::new("Alice", 5);

    assert_eq!(user.id, None);
    assert_eq!(user.name, "Alice");
    assert_eq!(user.age, 5);
    assert!(!user.is_persisted());
}

#[test]
fn with_id_marks_user_as_persisted() {
    let user = User::with_id(7, "Bob", 7);

    assert_eq!(user.id, Some(7));
    assert!(user.is_persisted());
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let user = User::with_id(1, "Alice", 6);

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json, serde_json::json!({ "id": 1, "name": "Alice", "age": 6 }));

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}

#[test]
fn unpersisted_user_serializes_null_id() {
    let json = serde_json::to_value(User::new("Cara", 3)).unwrap();
    assert!(json["id"].is_null());
}
