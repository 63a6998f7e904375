
use super::path_date;
use crate::api::error::ApiError;

#[test]
fn test_path_date_accepts_iso_days_only() {
    assert_eq!(path_date("2024-02-29").unwrap().to_string(), "2024-02-29");
    assert!(matches!(path_date("2023-02-29"), Err(ApiError::BadRequest(_))));
    assert!(matches!(path_date("yesterday"), Err(ApiError::BadRequest(_))));
}
