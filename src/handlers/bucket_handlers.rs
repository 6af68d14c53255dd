//! HTTP handlers for buckets and the Kanban board read.

use super::task_handlers::TaskQuery;
use crate::{
    auth::Actor,
    errors::AppError,
    models::bucket::{Bucket, BucketUpdate, NewBucket},
    services::{board_service::BoardService, bucket_service::BucketService},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

/// `GET /projects/{project}/buckets`: all buckets with their filtered, paginated tasks.
pub async fn read_board(
    State(boards): State<BoardService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Bucket>>, AppError> {
    let opts = query.into_options()?;
    Ok(Json(boards.read_board(actor, project_id, &opts).await?))
}

/// `PUT /projects/{project}/buckets`
pub async fn create_bucket(
    State(buckets): State<BucketService>,
    Actor(actor): Actor,
    Path(project_id): Path<i64>,
    Json(new): Json<NewBucket>,
) -> Result<(StatusCode, Json<Bucket>), AppError> {
    let bucket = buckets.create(actor, project_id, new).await?;
    Ok((StatusCode::CREATED, Json(bucket)))
}

/// `GET /projects/{project}/buckets/{bucket}`: the bucket without its tasks.
pub async fn get_bucket(
    State(buckets): State<BucketService>,
    Actor(actor): Actor,
    Path((project_id, bucket_id)): Path<(i64, i64)>,
) -> Result<Json<Bucket>, AppError> {
    Ok(Json(buckets.get(actor, project_id, bucket_id).await?))
}

/// `POST /projects/{project}/buckets/{bucket}`
pub async fn update_bucket(
    State(buckets): State<BucketService>,
    Actor(actor): Actor,
    Path((project_id, bucket_id)): Path<(i64, i64)>,
    Json(patch): Json<BucketUpdate>,
) -> Result<Json<Bucket>, AppError> {
    Ok(Json(buckets.update(actor, project_id, bucket_id, patch).await?))
}

/// `DELETE /projects/{project}/buckets/{bucket}`
///
/// Tasks of the bucket move to the project's fallback bucket. The last bucket of a
/// project cannot be deleted.
pub async fn delete_bucket(
    State(buckets): State<BucketService>,
    Actor(actor): Actor,
    Path((project_id, bucket_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    buckets.delete(actor, project_id, bucket_id).await?;
    Ok(Json(json!({ "message": "Successfully deleted." })))
}
