//! ShowAPI client backing the medication lookup and health-info routes
//!
//! Every call signs the request with the configured app id and key. The
//! envelope's `showapi_res_body` is passed through to the caller untouched,
//! except for barcode lookups which are mapped to [`BarcodeProduct`].

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::config::ShowApiConfig;
use crate::error::ServiceError;

const BARCODE_API: &str = "1145-2";
const DRUG_CATEGORIES_API: &str = "1468-1";
const DRUG_ENCYCLOPEDIA_API: &str = "1468-3";
const DISEASE_CATEGORIES_API: &str = "546-1";
const DISEASE_LIST_API: &str = "546-2";
const DISEASE_DETAIL_API: &str = "546-3";
const KNOWLEDGE_CATEGORIES_API: &str = "90-86";
const KNOWLEDGE_SEARCH_API: &str = "90-87";
const KNOWLEDGE_DETAIL_API: &str = "90-88";

/// Page size requested from the drug encyclopedia
pub const ENCYCLOPEDIA_PAGE_SIZE: u32 = 20;

/// Product details for a scanned barcode
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BarcodeProduct {
    pub name: Option<String>,
    pub spec: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    /// Upstream body as received
    #[schema(value_type = Object)]
    pub raw: Value,
}

/// Drug encyclopedia search
#[derive(Debug, Clone)]
pub struct EncyclopediaQuery {
    pub search_key: String,
    pub search_type: String,
    pub classify_id: String,
    pub page: u32,
}

/// Text of a string or number field
fn text(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric code that upstream sends either as a number or a string
fn code(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The envelope's body, or `{}` when absent
pub fn response_body(envelope: &Value) -> Value {
    match envelope.get("showapi_res_body") {
        Some(body) if !body.is_null() => body.clone(),
        _ => json!({}),
    }
}

/// Body of a successful envelope; an error envelope becomes `Upstream`
pub fn checked_body(envelope: &Value, fallback: &str) -> Result<Value, ServiceError> {
    if code(envelope, "showapi_res_code") == Some(0) {
        return Ok(response_body(envelope));
    }
    let message = text(envelope, &["showapi_res_error"]).unwrap_or_else(|| fallback.to_string());
    Err(ServiceError::Upstream(message))
}

/// Map a barcode envelope to a product, or `NotFound` with upstream's remark
pub fn barcode_product(envelope: &Value) -> Result<BarcodeProduct, ServiceError> {
    let body = checked_body(envelope, "ShowAPI 请求失败")?;
    if code(&body, "ret_code") != Some(0) {
        let remark = text(&body, &["remark"]).unwrap_or_else(|| "未找到该条码对应的药品信息".to_string());
        return Err(ServiceError::NotFound(remark));
    }
    Ok(BarcodeProduct {
        name: text(&body, &["name", "goodsName"]),
        spec: text(&body, &["spec", "standard"]),
        brand: text(&body, &["brandName"]),
        price: text(&body, &["price"]),
        raw: body,
    })
}

/// Error text with the request URL stripped, since its query carries `showapi_sign`
fn loggable(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

/// HTTP client for `route.showapi.com`
#[derive(Debug, Clone)]
pub struct ShowApiClient {
    http: reqwest::Client,
    config: ShowApiConfig,
}

impl ShowApiClient {
    pub fn new(config: ShowApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("MyHealthLog-api/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.config.app_id.as_deref().filter(|s| !s.is_empty())?;
        let key = self.config.app_key.as_deref().filter(|s| !s.is_empty())?;
        Some((id, key))
    }

    /// Signed GET returning the raw envelope; transport errors become `failure`
    async fn call(&self, api: &str, params: &[(&str, String)], failure: &str) -> Result<Value, ServiceError> {
        let (app_id, app_key) = self
            .credentials()
            .ok_or_else(|| ServiceError::Configuration("后端未配置 ShowAPI 凭据".to_string()))?;

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), api);
        let mut query = vec![("showapi_appid", app_id.to_string()), ("showapi_sign", app_key.to_string())];
        query.extend(params.iter().map(|(k, v)| (*k, v.clone())));

        let response = self.http.get(&url).query(&query).send().await.map_err(|e| {
            error!("ShowAPI {} request failed: {}", api, loggable(e));
            ServiceError::Upstream(failure.to_string())
        })?;
        response.json::<Value>().await.map_err(|e| {
            error!("ShowAPI {} returned an unreadable body: {}", api, loggable(e));
            ServiceError::Upstream(failure.to_string())
        })
    }

    #[instrument(skip(self))]
    pub async fn lookup_barcode(&self, barcode: &str) -> Result<BarcodeProduct, ServiceError> {
        let envelope = self
            .call(BARCODE_API, &[("code", barcode.to_string())], "服务器内部错误，无法连接到查询服务")
            .await?;
        barcode_product(&envelope)
    }

    pub async fn drug_categories(&self) -> Result<Value, ServiceError> {
        let envelope = self.call(DRUG_CATEGORIES_API, &[], "获取分类失败").await?;
        Ok(response_body(&envelope))
    }

    #[instrument(skip(self))]
    pub async fn drug_encyclopedia(&self, query: &EncyclopediaQuery) -> Result<Value, ServiceError> {
        let params = [
            ("searchKey", query.search_key.clone()),
            ("searchType", query.search_type.clone()),
            ("classifyId", query.classify_id.clone()),
            ("page", query.page.to_string()),
            ("maxResult", ENCYCLOPEDIA_PAGE_SIZE.to_string()),
        ];
        let envelope = self.call(DRUG_ENCYCLOPEDIA_API, &params, "连接百科服务失败").await?;
        checked_body(&envelope, "百科查询失败")
    }

    pub async fn disease_categories(&self) -> Result<Value, ServiceError> {
        let envelope = self.call(DISEASE_CATEGORIES_API, &[], "获取疾病分类失败").await?;
        Ok(response_body(&envelope))
    }

    pub async fn disease_list(&self, key: &str, classify_id: &str, page: u32) -> Result<Value, ServiceError> {
        let params = [
            ("key", key.to_string()),
            ("classifyId", classify_id.to_string()),
            ("page", page.to_string()),
        ];
        let envelope = self.call(DISEASE_LIST_API, &params, "查询疾病列表失败").await?;
        Ok(response_body(&envelope))
    }

    pub async fn disease_detail(&self, id: &str) -> Result<Value, ServiceError> {
        let envelope = self
            .call(DISEASE_DETAIL_API, &[("id", id.to_string())], "获取疾病详情失败")
            .await?;
        Ok(response_body(&envelope))
    }

    pub async fn knowledge_categories(&self) -> Result<Value, ServiceError> {
        let envelope = self.call(KNOWLEDGE_CATEGORIES_API, &[], "获取知识分类失败").await?;
        Ok(response_body(&envelope))
    }

    pub async fn knowledge_search(&self, key: &str, tid: &str, page: u32) -> Result<Value, ServiceError> {
        let params = [("key", key.to_string()), ("tid", tid.to_string()), ("page", page.to_string())];
        let envelope = self.call(KNOWLEDGE_SEARCH_API, &params, "搜索健康知识失败").await?;
        Ok(response_body(&envelope))
    }

    pub async fn knowledge_detail(&self, id: &str) -> Result<Value, ServiceError> {
        let envelope = self
            .call(KNOWLEDGE_DETAIL_API, &[("id", id.to_string())], "获取知识详情失败")
            .await?;
        Ok(response_body(&envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_error_is_logged_without_app_key() {
        let error = reqwest::Client::new()
            .get("http://127.0.0.1:1/1145-2")
            .query(&[("showapi_appid", "1001"), ("showapi_sign", "s3cret-app-key")])
            .send()
            .await
            .unwrap_err();
        assert!(error.to_string().contains("s3cret-app-key"));

        let line = loggable(error);
        assert!(!line.contains("s3cret-app-key"));
        assert!(!line.contains("showapi_sign"));
    }

    #[test]
    fn test_barcode_maps_alternate_field_names() {
        let envelope = json!({
            "showapi_res_code": 0,
            "showapi_res_body": {
                "ret_code": "0",
                "goodsName": "布洛芬缓释胶囊",
                "standard": "0.3g*20粒",
                "brandName": "芬必得",
                "price": 25.5
            }
        });
        let product = barcode_product(&envelope).unwrap();
        assert_eq!(product.name.as_deref(), Some("布洛芬缓释胶囊"));
        assert_eq!(product.spec.as_deref(), Some("0.3g*20粒"));
        assert_eq!(product.brand.as_deref(), Some("芬必得"));
        assert_eq!(product.price.as_deref(), Some("25.5"));
        assert_eq!(product.raw["goodsName"], "布洛芬缓释胶囊");
    }

    #[test]
    fn test_barcode_miss_uses_remark() {
        let envelope = json!({
            "showapi_res_code": 0,
            "showapi_res_body": { "ret_code": -1, "remark": "查询不到该条码" }
        });
        match barcode_product(&envelope) {
            Err(ServiceError::NotFound(message)) => assert_eq!(message, "查询不到该条码"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_is_upstream_failure() {
        let envelope = json!({ "showapi_res_code": -1, "showapi_res_error": "签名错误" });
        assert!(matches!(barcode_product(&envelope), Err(ServiceError::Upstream(m)) if m == "签名错误"));
        assert!(matches!(
            checked_body(&json!({}), "百科查询失败"),
            Err(ServiceError::Upstream(m)) if m == "百科查询失败"
        ));
    }

    #[test]
    fn test_missing_body_is_empty_object() {
        assert_eq!(response_body(&json!({ "showapi_res_code": 0 })), json!({}));
        assert_eq!(response_body(&json!({ "showapi_res_body": null })), json!({}));
        assert_eq!(
            response_body(&json!({ "showapi_res_body": { "list": [1] } })),
            json!({ "list": [1] })
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_reports_configuration_error() {
        let client = ShowApiClient::new(ShowApiConfig::default());
        assert!(!client.is_configured());
        assert!(matches!(
            client.disease_categories().await,
            Err(ServiceError::Configuration(_))
        ));
    }
}
