//! Grant administration endpoints

use crate::{error::HttpError, state::AppState};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json,
};
use bazaar_core::access::{Action, Grant, GrantFlags, Resource, RoleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::middleware::permission::{check_permission, permission_middleware};

/// Resource name guarding the administration routes when they are protected
pub const ADMINISTRATION_RESOURCE: &str = "Permission";

/// Body of `POST /set-permission`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionRequest {
    pub role_id: Option<String>,
    pub resource: Option<String>,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl SetPermissionRequest {
    /// Reject a missing or blank role or resource
    pub fn validate(self) -> Result<(RoleId, Resource, GrantFlags), HttpError> {
        let role_id = non_blank(self.role_id, "roleId")?;
        let resource = non_blank(self.resource, "resource")?;
        Ok((
            RoleId::from(role_id),
            Resource::from(resource),
            GrantFlags::new(self.can_view, self.can_edit, self.can_delete),
        ))
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<String, HttpError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(HttpError::BadRequest(format!("{field} is required"))),
    }
}

/// A stored grant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    pub role_id: String,
    pub resource: String,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Grant> for GrantResponse {
    fn from(grant: Grant) -> Self {
        Self {
            role_id: grant.role_id.to_string(),
            resource: grant.resource.to_string(),
            can_view: grant.can_view,
            can_edit: grant.can_edit,
            can_delete: grant.can_delete,
            updated_at: grant.updated_at,
        }
    }
}

/// Create or replace the grant for a role on a resource
#[utoipa::path(
    post,
    path = "/set-permission",
    request_body = SetPermissionRequest,
    responses(
        (status = 200, description = "Grant stored", body = GrantResponse),
        (status = 400, description = "Missing roleId or resource", body = crate::error::ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "permissions"
)]
#[instrument(name = "set_permission", skip_all, fields(role = tracing::field::Empty, resource = tracing::field::Empty))]
pub async fn set_permission(
    State(state): State<AppState>,
    body: Result<Json<SetPermissionRequest>, JsonRejection>,
) -> Result<Json<GrantResponse>, HttpError> {
    let Json(request) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let (role_id, resource, flags) = request.validate()?;

    let span = tracing::Span::current();
    span.record("role", role_id.as_str());
    span.record("resource", resource.as_str());

    let grant = state.store.upsert_grant(&role_id, &resource, flags).await?;
    info!(
        can_view = grant.can_view,
        can_edit = grant.can_edit,
        can_delete = grant.can_delete,
        "Grant stored"
    );

    Ok(Json(grant.into()))
}

/// List the live grants of a role
#[utoipa::path(
    get,
    path = "/permissions/{role_id}",
    params(("role_id" = String, Path, description = "Role identifier")),
    responses(
        (status = 200, description = "Live grants of the role", body = Vec<GrantResponse>),
        (status = 503, description = "Permission store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "permissions"
)]
#[instrument(name = "list_permissions", skip(state))]
pub async fn list_permissions(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> Result<Json<Vec<GrantResponse>>, HttpError> {
    let grants = state.store.list_grants(&RoleId::from(role_id)).await?;
    Ok(Json(grants.into_iter().map(Into::into).collect()))
}

/// Revoke the grant of a role on a resource
#[utoipa::path(
    delete,
    path = "/permissions/{role_id}/{resource}",
    params(
        ("role_id" = String, Path, description = "Role identifier"),
        ("resource" = String, Path, description = "Resource name")
    ),
    responses(
        (status = 204, description = "Grant revoked"),
        (status = 404, description = "No live grant", body = crate::error::ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "permissions"
)]
#[instrument(name = "revoke_permission", skip(state))]
pub async fn revoke_permission(
    State(state): State<AppState>,
    Path((role_id, resource)): Path<(String, String)>,
) -> Result<StatusCode, HttpError> {
    let role_id = RoleId::from(role_id);
    let resource = Resource::from(resource);

    if state.store.revoke_grant(&role_id, &resource).await? {
        info!("Grant revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::NotFound(format!(
            "no grant for role {role_id} on {resource}"
        )))
    }
}

/// Create the grant administration router
pub fn router(state: &AppState) -> OpenApiRouter<AppState> {
    let mut set = OpenApiRouter::new().routes(routes!(set_permission));
    let mut list = OpenApiRouter::new().routes(routes!(list_permissions));
    let mut revoke = OpenApiRouter::new().routes(routes!(revoke_permission));

    if state.protect_administration {
        let guard = |action| check_permission(&state.gate, ADMINISTRATION_RESOURCE, action);
        set = set.route_layer(from_fn_with_state(guard(Action::Edit), permission_middleware));
        list = list.route_layer(from_fn_with_state(guard(Action::View), permission_middleware));
        revoke = revoke.route_layer(from_fn_with_state(guard(Action::Edit), permission_middleware));
    }

    set.merge(list).merge(revoke)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flags_default_to_false() {
        let request: SetPermissionRequest =
            serde_json::from_str(r#"{"roleId":"admin","resource":"Order","canView":true}"#).unwrap();
        let (role_id, resource, flags) = request.validate().unwrap();

        assert_eq!(role_id.as_str(), "admin");
        assert_eq!(resource.as_str(), "Order");
        assert_eq!(flags, GrantFlags::view_only());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let missing_role = SetPermissionRequest {
            resource: Some("Order".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing_role.validate(),
            Err(HttpError::BadRequest(msg)) if msg.contains("roleId")
        ));

        let blank_resource = SetPermissionRequest {
            role_id: Some("admin".to_string()),
            resource: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            blank_resource.validate(),
            Err(HttpError::BadRequest(msg)) if msg.contains("resource")
        ));
    }

    #[test]
    fn test_grant_response_is_camel_case() {
        let grant = Grant::new(
            RoleId::from("admin"),
            Resource::from("Order"),
            GrantFlags::all(),
        );
        let json = serde_json::to_value(GrantResponse::from(grant)).unwrap();

        assert_eq!(json["roleId"], "admin");
        assert_eq!(json["canDelete"], true);
        assert!(json.get("updatedAt").is_some());
    }
}
