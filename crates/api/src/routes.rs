//! Route table and handlers.
//!
//! Collection routes also answer with a trailing slash (`/resource/`,
//! `/group/`).
//!
//! | route                              | operation                      |
//! |------------------------------------|--------------------------------|
//! | `POST /resource`                   | register a resource            |
//! | `GET  /resource`                   | list resources                 |
//! | `GET  /resource/{id}`              | get one resource               |
//! | `POST /group`                      | register a group               |
//! | `GET  /group`                      | list groups                    |
//! | `GET  /group/{id}`                 | get one group                  |
//! | `POST /group/{id}/user`            | attach members                 |
//! | `GET  /group/{id}/user`            | list members                   |
//! | `POST /group/{id}/authorize`       | attach grants                  |
//! | `GET  /group/{id}/resource`        | list granted resources         |
//! | `GET  /authorized?userId=&resourceName=` | decide                   |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use warden_core::{Decision, EntityId, Group, Resource};
use warden_engine::AuthorizationEngine;

use crate::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

/// Builds the router over a shared engine.
pub fn router(engine: AuthorizationEngine) -> Router {
    Router::new()
        .route("/resource", post(create_resource).get(list_resources))
        .route("/resource/", post(create_resource).get(list_resources))
        .route("/resource/{id}", get(get_resource))
        .route("/group", post(create_group).get(list_groups))
        .route("/group/", post(create_group).get(list_groups))
        .route("/group/{id}", get(get_group))
        .route("/group/{id}/user", post(attach_members).get(list_members))
        .route("/group/{id}/authorize", post(attach_grants))
        .route("/group/{id}/resource", get(list_grants))
        .route("/authorized", get(authorized))
        .with_state(engine)
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// `{"count": n, "items": [...]}`
#[derive(Debug, Serialize)]
struct Listing<T> {
    count: usize,
    items: Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Public view of a group: sets are only exposed through their own routes.
#[derive(Debug, Serialize)]
struct GroupView {
    #[serde(rename = "_id")]
    id: EntityId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl From<Group> for GroupView {
    fn from(g: Group) -> Self {
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewResource {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewGroup {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GrantEntry {
    #[serde(rename = "resourceId")]
    resource_id: String,
}

#[derive(Debug, Deserialize)]
struct AuthorizedQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "resourceName")]
    resource_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

fn parse_id(raw: &str) -> ApiResult<EntityId> {
    Ok(raw.parse::<EntityId>()?)
}

/// Every malformed body is a 400, whatever axum's default would be.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

async fn create_resource(
    State(engine): State<AuthorizationEngine>,
    payload: Result<Json<NewResource>, JsonRejection>,
) -> ApiResult<Json<Resource>> {
    let name = body(payload)?
        .name
        .ok_or_else(|| ApiError::bad_request("missing field 'name'"))?;
    Ok(Json(engine.resources().register(&name).await?))
}

async fn list_resources(
    State(engine): State<AuthorizationEngine>,
) -> ApiResult<Json<Listing<Resource>>> {
    Ok(Json(engine.resources().list_all().await?.into()))
}

async fn get_resource(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Resource>> {
    let id = parse_id(&id)?;
    Ok(Json(engine.resources().get_by_id(&id).await?))
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

async fn create_group(
    State(engine): State<AuthorizationEngine>,
    payload: Result<Json<NewGroup>, JsonRejection>,
) -> ApiResult<Json<GroupView>> {
    let new = body(payload)?;
    let name = new
        .name
        .ok_or_else(|| ApiError::bad_request("missing field 'name'"))?;
    let group = engine
        .groups()
        .register(&name, new.description.as_deref())
        .await?;
    Ok(Json(group.into()))
}

async fn list_groups(
    State(engine): State<AuthorizationEngine>,
) -> ApiResult<Json<Listing<GroupView>>> {
    let groups = engine.groups().list_all().await?;
    let views: Vec<GroupView> = groups.into_iter().map(GroupView::from).collect();
    Ok(Json(views.into()))
}

async fn get_group(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<GroupView>> {
    let id = parse_id(&id)?;
    Ok(Json(engine.groups().get_by_id(&id).await?.into()))
}

/// Body: `[{"userId": "..."}, ...]`. Entries without a string `userId`
/// count as malformed and are dropped with the rest.
async fn attach_members(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
    payload: Result<Json<Vec<Value>>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let candidates: Vec<String> = body(payload)?
        .iter()
        .filter_map(|entry| entry.get("userId").and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    engine.groups().attach_members(&id, candidates).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing<String>>> {
    let id = parse_id(&id)?;
    Ok(Json(engine.groups().list_members(&id).await?.into()))
}

/// Body: `[{"resourceId": "..."}, ...]`.
async fn attach_grants(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
    payload: Result<Json<Vec<GrantEntry>>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let resource_ids = body(payload)?.into_iter().map(|e| e.resource_id).collect();

    engine.groups().attach_grants(&id, resource_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_grants(
    State(engine): State<AuthorizationEngine>,
    Path(id): Path<String>,
) -> ApiResult<Json<Listing<Resource>>> {
    let id = parse_id(&id)?;
    Ok(Json(engine.groups().list_grants(&id).await?.into()))
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// 200 when authorized; 403 for both denied and unknown resource.
async fn authorized(
    State(engine): State<AuthorizationEngine>,
    Query(query): Query<AuthorizedQuery>,
) -> ApiResult<Response> {
    let (Some(user_id), Some(resource_name)) = (query.user_id, query.resource_name) else {
        return Err(ApiError::bad_request(
            "both 'userId' and 'resourceName' are required",
        ));
    };
    if !EntityId::is_well_formed(&user_id) {
        return Err(ApiError::bad_request(format!("malformed userId '{user_id}'")));
    }

    let decision = engine.is_authorized(&user_id, &resource_name).await?;
    let status = match decision {
        Decision::Authorized => StatusCode::OK,
        Decision::Denied | Decision::ResourceNotFound => StatusCode::FORBIDDEN,
    };

    Ok((status, Json(json!({ "authorized": decision.is_authorized() }))).into_response())
}
