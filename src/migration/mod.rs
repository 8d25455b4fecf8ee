pub use sea_orm_migration::prelude::*;

mod m20241022_000001_create_voltages_table;
mod m20241112_000001_create_power_table;
mod m20241117_000001_create_logs_table;
mod m20250127_000001_create_telemetry_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241022_000001_create_voltages_table::Migration),
            Box::new(m20241112_000001_create_power_table::Migration),
            Box::new(m20241117_000001_create_logs_table::Migration),
            Box::new(m20250127_000001_create_telemetry_table::Migration),
        ]
    }
}
