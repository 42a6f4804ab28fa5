//! Project entity
//!
//! Table: project. Both `emp_id` and `dept_id` cascade on delete of the parent row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub proj_id: i32,

    pub emp_id: i32,

    pub dept_id: i32,

    #[sea_orm(column_type = "String(Some(50))")]
    pub proj_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmpId",
        to = "super::employee::Column::EmpId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DeptId",
        to = "super::department::Column::DeptId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Department,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
