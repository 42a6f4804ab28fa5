//! Employee handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set};

use crate::entity::{department, employee, project};
use crate::error::{AppError, AppResult, OptionExt};
use crate::handlers::{not_updated_as_not_found, parse_id};
use crate::serializer::{Mode, Payload, MAX_NAME_LEN};
use crate::state::AppState;

/// Writable employee fields read from a request body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    pub dept_id: Option<i32>,
    pub emp_name: Option<String>,
    pub emp_age: Option<i32>,
    pub emp_sex: Option<String>,
}

impl EmployeeInput {
    /// Validate a body and check that `dept_id` names an existing department
    pub async fn from_body<C: ConnectionTrait>(db: &C, body: &[u8], mode: Mode) -> AppResult<Self> {
        let mut payload = Payload::parse(body, mode)?;
        let input = Self {
            dept_id: payload.pk("dept_id"),
            emp_name: payload.string("emp_name", MAX_NAME_LEN),
            emp_age: payload.integer("emp_age"),
            emp_sex: payload.string("emp_sex", MAX_NAME_LEN),
        };
        if let Some(dept_id) = input.dept_id {
            payload
                .require_exists::<department::Entity, _>(db, "dept_id", dept_id)
                .await?;
        }
        payload.finish()?;
        Ok(input)
    }

    fn is_empty(&self) -> bool {
        self.dept_id.is_none()
            && self.emp_name.is_none()
            && self.emp_age.is_none()
            && self.emp_sex.is_none()
    }

    fn apply(self, model: &mut employee::ActiveModel) {
        if let Some(dept_id) = self.dept_id {
            model.dept_id = Set(dept_id);
        }
        if let Some(emp_name) = self.emp_name {
            model.emp_name = Set(emp_name);
        }
        if let Some(emp_age) = self.emp_age {
            model.emp_age = Set(emp_age);
        }
        if let Some(emp_sex) = self.emp_sex {
            model.emp_sex = Set(emp_sex);
        }
    }
}

async fn find_employee<C: ConnectionTrait>(db: &C, id: &str) -> AppResult<employee::Model> {
    let not_found = || format!("Employee {} not found", id);
    let id = parse_id(id).ok_or_else(|| AppError::NotFound(not_found()))?;
    employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_not_found(not_found())
}

/// GET /api/employees/
pub async fn list_employees(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<employee::Model>>> {
    let employees = employee::Entity::find()
        .order_by_asc(employee::Column::EmpId)
        .all(&state.db)
        .await?;
    Ok(Json(employees))
}

/// POST /api/employees/
pub async fn create_employee(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<employee::Model>)> {
    let input = EmployeeInput::from_body(&state.db, &body, Mode::Full).await?;

    let mut new_emp = employee::ActiveModel {
        ..Default::default()
    };
    input.apply(&mut new_emp);
    let emp = new_emp.insert(&state.db).await?;

    tracing::info!("Created employee {} in department {}", emp.emp_id, emp.dept_id);
    Ok((StatusCode::CREATED, Json(emp)))
}

/// GET /api/employees/:id/
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<employee::Model>> {
    Ok(Json(find_employee(&state.db, &id).await?))
}

/// PUT /api/employees/:id/
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<employee::Model>> {
    save_employee(&state, &id, &body, Mode::Full).await
}

/// PATCH /api/employees/:id/
pub async fn partial_update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Json<employee::Model>> {
    save_employee(&state, &id, &body, Mode::Partial).await
}

async fn save_employee(
    state: &AppState,
    id: &str,
    body: &[u8],
    mode: Mode,
) -> AppResult<Json<employee::Model>> {
    let existing = find_employee(&state.db, id).await?;
    let input = EmployeeInput::from_body(&state.db, body, mode).await?;
    if input.is_empty() {
        return Ok(Json(existing));
    }

    let mut model: employee::ActiveModel = existing.into();
    input.apply(&mut model);
    let emp = model
        .update(&state.db)
        .await
        .map_err(|e| not_updated_as_not_found(e, format!("Employee {} not found", id)))?;

    tracing::info!("Updated employee {}", emp.emp_id);
    Ok(Json(emp))
}

/// DELETE /api/employees/:id/
///
/// Projects assigned to the employee are removed with it.
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let emp = find_employee(&state.db, &id).await?;
    let result = employee::Entity::delete_by_id(emp.emp_id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Employee {} not found", id)));
    }

    tracing::info!("Deleted employee {}", emp.emp_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/employees/:id/projects/
pub async fn list_employee_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<project::Model>>> {
    let emp = find_employee(&state.db, &id).await?;
    let projects = emp
        .find_related(project::Entity)
        .order_by_asc(project::Column::ProjId)
        .all(&state.db)
        .await?;
    Ok(Json(projects))
}
