//! Employee entity
//!
//! Table: employee. `dept_id` references department and is removed with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub emp_id: i32,

    pub dept_id: i32,

    #[sea_orm(column_type = "String(Some(50))")]
    pub emp_name: String,

    pub emp_age: i32,

    #[sea_orm(column_type = "String(Some(50))")]
    pub emp_sex: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DeptId",
        to = "super::department::Column::DeptId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Department,
    #[sea_orm(has_many = "super::project::Entity")]
    Project,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
