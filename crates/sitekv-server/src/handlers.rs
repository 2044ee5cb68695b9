//! Record handlers.
//!
//! Each handler parses its request body, calls the record store, and wraps
//! the outcome: reads return the stored document directly, writes and deletes
//! return `{"success": true, "key": …}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sitekv_core::RecordType;

use crate::error::AppError;
use crate::state::AppState;

type HandlerResult = Result<Response, AppError>;

// ── Request bodies ───────────────────────────────────────────────────

/// Body of list and delete requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBody {
    #[serde(alias = "websiteId")]
    pub tenant_id: Option<String>,
}

/// Body of create-or-update requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    #[serde(alias = "websiteId")]
    pub tenant_id: Option<String>,
    #[serde(alias = "data")]
    pub document: Option<Value>,
}

/// Body of bundle requests. Keys are full record keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleBody {
    pub page_key: Option<String>,
    pub navigation_key: Option<String>,
    pub footer_key: Option<String>,
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is required".to_owned()));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

fn written(key: &str) -> Response {
    Json(json!({ "success": true, "key": key })).into_response()
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `POST /api/{collection}/all`
pub async fn list(state: &AppState, record_type: RecordType, body: &[u8]) -> HandlerResult {
    let TenantBody { tenant_id } = parse_body(body)?;
    let tenant_id = required(tenant_id, "tenantId")?;
    let records = state.records.list(record_type, &tenant_id).await?;
    Ok(Json(records).into_response())
}

/// `POST /api/getAllData…`
pub async fn bundle(state: &AppState, body: &[u8]) -> HandlerResult {
    let BundleBody {
        page_key,
        navigation_key,
        footer_key,
    } = parse_body(body)?;
    let page_key = required(page_key, "pageKey")?;
    let bundle = state
        .records
        .bundle(&page_key, navigation_key.as_deref(), footer_key.as_deref())
        .await?;
    Ok(Json(bundle).into_response())
}

/// `GET /api/{collection}/{id}`
///
/// With `?tenantId=` the id is scoped to that tenant; without it the id must
/// be a full key.
pub async fn get(
    state: &AppState,
    record_type: RecordType,
    id: &str,
    tenant_id: Option<&str>,
) -> HandlerResult {
    let document = state.records.get(record_type, tenant_id, id).await?;
    Ok(Json(document).into_response())
}

/// `POST|PUT /api/{collection}/{id}`
pub async fn put(state: &AppState, record_type: RecordType, id: &str, body: &[u8]) -> HandlerResult {
    let DocumentBody {
        tenant_id,
        document,
    } = parse_body(body)?;
    let tenant_id = required(tenant_id, "tenantId")?;
    let document = document.ok_or_else(|| AppError::BadRequest("document is required".to_owned()))?;
    let key = state
        .records
        .put(record_type, &tenant_id, id, &document)
        .await?;
    Ok(written(&key))
}

/// `POST|DELETE /api/{collection}/delete/{id}`
pub async fn delete(
    state: &AppState,
    record_type: RecordType,
    id: &str,
    body: &[u8],
) -> HandlerResult {
    let TenantBody { tenant_id } = parse_body(body)?;
    let tenant_id = required(tenant_id, "tenantId")?;
    let key = state.records.delete(record_type, &tenant_id, id).await?;
    Ok(written(&key))
}

/// `GET /api/{navigation|footer}/{tenantId}`
///
/// An unconfigured singleton is `200 {"exists": false}`, not an error.
pub async fn get_singleton(
    state: &AppState,
    record_type: RecordType,
    tenant_id: &str,
) -> HandlerResult {
    let document = state
        .records
        .get_singleton(record_type, tenant_id)
        .await?
        .unwrap_or_else(|| json!({ "exists": false }));
    Ok(Json(document).into_response())
}

/// `POST /api/{navigation|footer}`
pub async fn put_singleton(state: &AppState, record_type: RecordType, body: &[u8]) -> HandlerResult {
    let DocumentBody {
        tenant_id,
        document,
    } = parse_body(body)?;
    let tenant_id = required(tenant_id, "tenantId")?;
    let document = document.ok_or_else(|| AppError::BadRequest("document is required".to_owned()))?;
    let key = state
        .records
        .put_singleton(record_type, &tenant_id, &document)
        .await?;
    Ok(written(&key))
}

/// Reply for any unmatched request.
#[must_use]
pub fn liveness() -> Response {
    Json(json!({ "status": "ok", "service": "sitekv" })).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn body_aliases() {
        let body: DocumentBody =
            serde_json::from_str(r#"{"websiteId":"site1","data":{"a":1}}"#).unwrap();
        assert_eq!(body.tenant_id.as_deref(), Some("site1"));
        assert_eq!(body.document, Some(json!({"a": 1})));

        let body: DocumentBody =
            serde_json::from_str(r#"{"tenantId":"site1","document":[1]}"#).unwrap();
        assert_eq!(body.tenant_id.as_deref(), Some("site1"));
        assert_eq!(body.document, Some(json!([1])));
    }

    #[test]
    fn empty_body_is_bad_request() {
        assert!(matches!(
            parse_body::<TenantBody>(b""),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_body::<TenantBody>(b"{oops"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        assert!(required(Some("  ".to_owned()), "tenantId").is_err());
        assert!(required(None, "tenantId").is_err());
        assert_eq!(required(Some("site1".to_owned()), "tenantId").unwrap(), "site1");
    }
}
