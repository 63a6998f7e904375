use my_health_log_domain::services::showapi::EncyclopediaQuery;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::{optional_i64, optional_text};

/// Page numbers below one are read as the first page
fn page_number(page: Option<i64>) -> u32 {
    page.and_then(|p| u32::try_from(p).ok()).filter(|p| *p > 0).unwrap_or(1)
}

/// Drug encyclopedia search
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EncyclopediaRequest {
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub search_key: Option<String>,

    /// `1` searches by name
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub search_type: Option<String>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub classify_id: Option<String>,

    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    pub page: Option<i64>,
}

impl From<EncyclopediaRequest> for EncyclopediaQuery {
    fn from(request: EncyclopediaRequest) -> Self {
        EncyclopediaQuery {
            search_key: request.search_key.unwrap_or_default(),
            search_type: request.search_type.unwrap_or_else(|| "1".to_string()),
            classify_id: request.classify_id.unwrap_or_default(),
            page: page_number(request.page),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseListRequest {
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub key: Option<String>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub classify_id: Option<String>,

    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    pub page: Option<i64>,
}

impl DiseaseListRequest {
    pub fn page(&self) -> u32 {
        page_number(self.page)
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct KnowledgeSearchRequest {
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub key: Option<String>,

    /// Knowledge category id
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub tid: Option<String>,

    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    pub page: Option<i64>,
}

impl KnowledgeSearchRequest {
    pub fn page(&self) -> u32 {
        page_number(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encyclopedia_defaults() {
        let query = EncyclopediaQuery::from(serde_json::from_str::<EncyclopediaRequest>(r#"{"searchKey":"阿莫西林"}"#).unwrap());
        assert_eq!(query.search_key, "阿莫西林");
        assert_eq!(query.search_type, "1");
        assert_eq!(query.classify_id, "");
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_page_numbers_are_clamped() {
        let request: DiseaseListRequest = serde_json::from_str(r#"{"key":"感冒","page":"3"}"#).unwrap();
        assert_eq!(request.page(), 3);
        let request: KnowledgeSearchRequest = serde_json::from_str(r#"{"page":-2}"#).unwrap();
        assert_eq!(request.page(), 1);
    }
}
