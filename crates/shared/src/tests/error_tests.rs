use super::*;

#[test]
fn exception_converts_with_its_code() {
    let error: ApiError = ApiException::new(ErrorCode::Conflict, "already exists").into();
    assert_eq!(error.code, ErrorCode::Conflict);
    assert_eq!(error.message, "already exists");
    assert!(error.fields.is_empty());
}

#[test]
fn exception_survives_anyhow() {
    let err: anyhow::Error = ApiException::new(ErrorCode::Conflict, "gone").into();
    let exception = err.downcast::<ApiException>().expect("downcast");
    assert_eq!(exception.code, ErrorCode::Conflict);
}

#[test]
fn validation_message_counts_fields() {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), "Name is required".to_string());
    assert_eq!(ApiError::validation(fields.clone()).message, "1 field is invalid");
    fields.insert("email".to_string(), "Email must be an email address".to_string());
    assert_eq!(ApiError::validation(fields).message, "2 fields are invalid");
}

#[test]
fn codes_serialize_snake_case() {
    let json = serde_json::to_string(&ErrorCode::RateLimited).expect("json");
    assert_eq!(json, "\"rate_limited\"");
}
