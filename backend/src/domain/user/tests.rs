//! Tests for the domain user model.

use super::*;
use rstest::rstest;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[rstest]
fn user_id_parses_canonical_uuid() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(id.to_string(), VALID_ID);
    assert_eq!(id.as_uuid().to_string(), VALID_ID);
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn user_id_orders_by_uuid() {
    let low = UserId::new("00000000-0000-0000-0000-000000000001").expect("low id");
    let high = UserId::new("00000000-0000-0000-0000-000000000002").expect("high id");
    assert!(low < high);
}

#[rstest]
fn user_id_serde_uses_plain_string() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let value = serde_json::to_value(&id).expect("serialise id");
    assert_eq!(value, serde_json::json!(VALID_ID));

    let decoded: Result<UserId, _> = serde_json::from_value(serde_json::json!("nope"));
    assert!(decoded.is_err());
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
#[case(&"x".repeat(DISPLAY_NAME_MAX + 1), UserValidationError::DisplayNameTooLong { max: DISPLAY_NAME_MAX })]
fn display_name_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw), Err(expected));
}

#[rstest]
fn user_from_strings_exposes_components() {
    let user = User::try_from_strings(VALID_ID, "Ada Lovelace").expect("valid user");
    assert_eq!(user.id().as_ref(), VALID_ID);
    assert_eq!(user.display_name().as_ref(), "Ada Lovelace");
}
