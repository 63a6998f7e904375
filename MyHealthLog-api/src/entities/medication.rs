use my_health_log_data::models::medication::MedicationInput;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_i32, optional_text};

/// Body of medication create and update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MedicationRequest {
    #[validate(required(message = "药品名称不能为空。"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub dosage: Option<String>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub frequency: Option<String>,

    /// Units on hand; omit to stop tracking stock
    #[serde(default, deserialize_with = "optional_i32::deserialize")]
    pub stock: Option<i32>,

    /// Free-form reminder times, e.g. `08:00,20:00`
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub medication_times: Option<String>,
}

impl From<MedicationRequest> for MedicationInput {
    fn from(request: MedicationRequest) -> Self {
        MedicationInput {
            name: request.name.unwrap_or_default(),
            dosage: request.dosage,
            frequency: request.frequency,
            stock: request.stock,
            medication_times: request.medication_times,
        }
    }
}

/// Body of a dose; the amount defaults to one unit
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeRequest {
    #[serde(default, deserialize_with = "optional_i32::deserialize")]
    pub dosage_amount: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_values_are_coerced() {
        let request: MedicationRequest =
            serde_json::from_str(r#"{"name":"Vitamin D","dosage":1000,"stock":"30","medication_times":""}"#).unwrap();
        let input = MedicationInput::from(request);
        assert_eq!(input.dosage.as_deref(), Some("1000"));
        assert_eq!(input.stock, Some(30));
        assert_eq!(input.medication_times.as_deref(), Some(""));
    }

    #[test]
    fn test_take_amount_is_optional() {
        let request: TakeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.dosage_amount, None);
        let request: TakeRequest = serde_json::from_str(r#"{"dosageAmount":"2"}"#).unwrap();
        assert_eq!(request.dosage_amount, Some(2));
    }
}
