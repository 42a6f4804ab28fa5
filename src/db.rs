use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Schema,
};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::{department, employee, project};

/// Initialize database connection and auto-migrate tables
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let database_url = config.connection_url();

    if config.url.is_some() {
        info!("Connecting to database from configured URL");
    } else if config.is_sqlite() {
        info!("Connecting to sqlite database: {}", config.path.display());
    } else {
        info!("Connecting to database: {}:{}/{}", config.host, config.port, config.name);
    }

    let db = connect(&database_url, config).await?;
    info!("Database connection established");

    auto_migrate(&db).await?;

    Ok(db)
}

async fn connect(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(config.max_connections.max(1))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    // An in-memory sqlite database lives as long as its single connection
    if !config.is_sqlite() {
        opt.min_connections(1)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .set_schema_search_path("public");
    }

    Database::connect(opt).await
}

/// Create the tables and foreign-key indexes if they are missing
pub async fn auto_migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    info!("Running auto-migration for all entities...");

    // Parents before children so the foreign keys resolve
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(department::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(employee::Entity)).await?;
    create_table_if_not_exists(db, backend, schema.create_table_from_entity(project::Entity)).await?;

    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("employee_dept_id_idx")
            .table(employee::Entity)
            .col(employee::Column::DeptId)
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("project_emp_id_idx")
            .table(project::Entity)
            .col(project::Column::EmpId)
            .to_owned(),
    )
    .await?;
    create_index_if_not_exists(
        db,
        backend,
        Index::create()
            .name("project_dept_id_idx")
            .table(project::Entity)
            .col(project::Column::DeptId)
            .to_owned(),
    )
    .await?;

    info!("Auto-migration completed successfully");
    Ok(())
}

/// Create a table if it doesn't exist
async fn create_table_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: TableCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

async fn create_index_if_not_exists(
    db: &DatabaseConnection,
    backend: DbBackend,
    mut stmt: IndexCreateStatement,
) -> Result<(), DbErr> {
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{EntityTrait, Statement};

    #[tokio::test]
    async fn test_auto_migrate_is_idempotent() {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        auto_migrate(&db).await.unwrap();

        let depts = department::Entity::find().all(&db).await.unwrap();
        assert!(depts.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_key_indexes_created() {
        let db = init_database(&DatabaseConfig::sqlite_memory()).await.unwrap();
        let rows = db
            .query_all(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE '%_idx'"
                    .to_string(),
            ))
            .await
            .unwrap();

        let mut names: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String>("", "name").unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["employee_dept_id_idx", "project_dept_id_idx", "project_emp_id_idx"]
        );
    }
}
