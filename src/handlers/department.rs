//! Department handlers
//!
//! Implements department CRUD plus the read-only listings of a department's
//! employees and projects.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set,
};

use crate::entity::{department, employee, project};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{not_updated_as_not_found, parse_id};
use crate::serializer::{Mode, Payload, MAX_NAME_LEN};
use crate::state::AppState;

/// Writable department fields read from a request body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DepartmentInput {
    pub bldg_id: Option<i32>,
    pub dept_name: Option<String>,
}

impl DepartmentInput {
    /// Validate a body. `dept_id` is read-only and ignored if present.
    pub fn from_body(body: &[u8], mode: Mode) -> AppResult<Self> {
        let mut payload = Payload::parse(body, mode)?;
        let input = Self {
            bldg_id: payload.integer("bldg_id"),
            dept_name: payload.string("dept_name", MAX_NAME_LEN),
        };
        payload.finish()?;
        Ok(input)
    }

    fn is_empty(&self) -> bool {
        self.bldg_id.is_none() && self.dept_name.is_none()
    }

    fn apply(self, model: &mut department::ActiveModel) {
        if let Some(bldg_id) = self.bldg_id {
            model.bldg_id = Set(bldg_id);
        }
        if let Some(dept_name) = self.dept_name {
            model.dept_name = Set(dept_name);
        }
    }
}

async fn find_department<C: ConnectionTrait>(db: &C, id: &str) -> AppResult<department::Model> {
    let not_found = || format!("Department {} not found", id);
    let id = parse_id(id).ok_or_else(|| AppError::NotFound(not_found()))?;
    department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_not_found(not_found())
}

/// GET /api/departments/
pub async fn list_departments(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<department::Model>>> {
    let depts = department::Entity::find()
        .order_by_asc(department::Column::DeptId)
        .all(&state.db)
        .await?;
    Ok(Json(depts))
}

/// POST /api/departments/
pub async fn create_department(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<department::Model>)> {
    let input = DepartmentInput::from_body(&body, Mode::Full)?;

    let mut new_dept = department::ActiveModel {
        ..Default::default()
    };
    input.apply(&mut new_dept);
    let dept = new_dept.insert(&state.db).await?;

    tracing::info!("Created department {} ({})", dept.dept_id, dept.dept_name);
    Ok((StatusCode::CREATED, Json(dept)))
}

/// GET /api/departments/:id/
pub async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<department::Model>> {
    Ok(Json(find_department(&state.db, &id).await?))
}

/// PUT /api/departments/:id/
pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<department::Model>> {
    save_department(&state, &id, &body, Mode::Full).await
}

/// PATCH /api/departments/:id/
pub async fn partial_update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<department::Model>> {
    save_department(&state, &id, &body, Mode::Partial).await
}

async fn save_department(
    state: &AppState,
    id: &str,
    body: &[u8],
    mode: Mode,
) -> AppResult<Json<department::Model>> {
    let existing = find_department(&state.db, id).await?;
    let input = DepartmentInput::from_body(body, mode)?;
    if input.is_empty() {
        return Ok(Json(existing));
    }

    let mut model: department::ActiveModel = existing.into();
    input.apply(&mut model);
    let dept = model
        .update(&state.db)
        .await
        .map_err(|e| not_updated_as_not_found(e, format!("Department {} not found", id)))?;

    tracing::info!("Updated department {}", dept.dept_id);
    Ok(Json(dept))
}

/// DELETE /api/departments/:id/
///
/// Employees and projects of the department go with it.
pub async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let dept = find_department(&state.db, &id).await?;
    let result = department::Entity::delete_by_id(dept.dept_id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Department {} not found", id)));
    }

    tracing::info!("Deleted department {} ({})", dept.dept_id, dept.dept_name);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/departments/:id/employees/
pub async fn list_department_employees(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<employee::Model>>> {
    let dept = find_department(&state.db, &id).await?;
    let employees = dept
        .find_related(employee::Entity)
        .order_by_asc(employee::Column::EmpId)
        .all(&state.db)
        .await?;
    Ok(Json(employees))
}

/// GET /api/departments/:id/projects/
pub async fn list_department_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<project::Model>>> {
    let dept = find_department(&state.db, &id).await?;
    let projects = dept
        .find_related(project::Entity)
        .order_by_asc(project::Column::ProjId)
        .all(&state.db)
        .await?;
    Ok(Json(projects))
}
