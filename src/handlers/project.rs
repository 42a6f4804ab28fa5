//! Project handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};

use crate::entity::{department, employee, project};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{not_updated_as_not_found, parse_id};
use crate::serializer::{Mode, Payload, MAX_NAME_LEN};
use crate::state::AppState;

/// Writable project fields read from a request body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    pub emp_id: Option<i32>,
    pub dept_id: Option<i32>,
    pub proj_name: Option<String>,
}

impl ProjectInput {
    /// Validate a body; both foreign keys must resolve. The employee is not
    /// required to belong to the given department.
    pub async fn from_body<C: ConnectionTrait>(db: &C, body: &[u8], mode: Mode) -> AppResult<Self> {
        let mut payload = Payload::parse(body, mode)?;
        let input = Self {
            emp_id: payload.pk("emp_id"),
            dept_id: payload.pk("dept_id"),
            proj_name: payload.string("proj_name", MAX_NAME_LEN),
        };
        if let Some(emp_id) = input.emp_id {
            payload
                .require_exists::<employee::Entity, _>(db, "emp_id", emp_id)
                .await?;
        }
        if let Some(dept_id) = input.dept_id {
            payload
                .require_exists::<department::Entity, _>(db, "dept_id", dept_id)
                .await?;
        }
        payload.finish()?;
        Ok(input)
    }

    fn is_empty(&self) -> bool {
        self.emp_id.is_none() && self.dept_id.is_none() && self.proj_name.is_none()
    }

    fn apply(self, model: &mut project::ActiveModel) {
        if let Some(emp_id) = self.emp_id {
            model.emp_id = Set(emp_id);
        }
        if let Some(dept_id) = self.dept_id {
            model.dept_id = Set(dept_id);
        }
        if let Some(proj_name) = self.proj_name {
            model.proj_name = Set(proj_name);
        }
    }
}

async fn find_project<C: ConnectionTrait>(db: &C, id: &str) -> AppResult<project::Model> {
    let not_found = || format!("Project {} not found", id);
    let id = parse_id(id).ok_or_else(|| AppError::NotFound(not_found()))?;
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_not_found(not_found())
}

/// GET /api/projects/
pub async fn list_projects(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<project::Model>>> {
    let projects = project::Entity::find()
        .order_by_asc(project::Column::ProjId)
        .all(&state.db)
        .await?;
    Ok(Json(projects))
}

/// POST /api/projects/
pub async fn create_project(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<project::Model>)> {
    let input = ProjectInput::from_body(&state.db, &body, Mode::Full).await?;

    let mut new_proj = project::ActiveModel {
        ..Default::default()
    };
    input.apply(&mut new_proj);
    let proj = new_proj.insert(&state.db).await?;

    tracing::info!(
        "Created project {} for employee {} in department {}",
        proj.proj_id,
        proj.emp_id,
        proj.dept_id
    );
    Ok((StatusCode::CREATED, Json(proj)))
}

/// GET /api/projects/:id/
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<project::Model>> {
    Ok(Json(find_project(&state.db, &id).await?))
}

/// PUT /api/projects/:id/
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<project::Model>> {
    save_project(&state, &id, &body, Mode::Full).await
}

/// PATCH /api/projects/:id/
pub async fn partial_update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<project::Model>> {
    save_project(&state, &id, &body, Mode::Partial).await
}

async fn save_project(
    state: &AppState,
    id: &str,
    body: &[u8],
    mode: Mode,
) -> AppResult<Json<project::Model>> {
    let existing = find_project(&state.db, id).await?;
    let input = ProjectInput::from_body(&state.db, body, mode).await?;
    if input.is_empty() {
        return Ok(Json(existing));
    }

    let mut model: project::ActiveModel = existing.into();
    input.apply(&mut model);
    let proj = model
        .update(&state.db)
        .await
        .map_err(|e| not_updated_as_not_found(e, format!("Project {} not found", id)))?;

    tracing::info!("Updated project {}", proj.proj_id);
    Ok(Json(proj))
}

/// DELETE /api/projects/:id/
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let proj = find_project(&state.db, &id).await?;
    let result = project::Entity::delete_by_id(proj.proj_id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Project {} not found", id)));
    }

    tracing::info!("Deleted project {}", proj.proj_id);
    Ok(StatusCode::NO_CONTENT)
}
