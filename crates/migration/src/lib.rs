//! Migrator registering shop tables in foreign-key order.
//! Indexes and seed rows are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_reference_tables;
mod m20240101_000002_create_customer;
mod m20240101_000003_create_mechanic;
mod m20240101_000004_create_part_description;
mod m20240101_000005_create_service_ticket;
mod m20240101_000006_create_serialized_part;
mod m20240101_000007_create_service_mechanic;
mod m20240101_000008_add_indexes;
mod m20240101_000009_seed_reference_data;

pub use m20240101_000009_seed_reference_data::{DEFAULT_PRIORITY, DEFAULT_STATUS};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_customer::Migration),
            Box::new(m20240101_000003_create_mechanic::Migration),
            Box::new(m20240101_000004_create_part_description::Migration),
            Box::new(m20240101_000005_create_service_ticket::Migration),
            Box::new(m20240101_000006_create_serialized_part::Migration),
            Box::new(m20240101_000007_create_service_mechanic::Migration),
            // Indexes should always be applied after the tables they cover
            Box::new(m20240101_000008_add_indexes::Migration),
            Box::new(m20240101_000009_seed_reference_data::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{ConnectOptions, ConnectionTrait, Database, Statement};

    #[tokio::test]
    async fn up_and_down_on_sqlite_memory() {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        let row = db
            .query_one(Statement::from_string(backend, "SELECT COUNT(*) AS n FROM ticket_status".to_owned()))
            .await
            .unwrap()
            .unwrap();
        let n: i64 = row.try_get("", "n").unwrap();
        assert_eq!(n, 4);

        Migrator::down(&db, None).await.unwrap();
    }
}
