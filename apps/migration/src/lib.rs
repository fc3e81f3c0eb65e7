//! Schema migrations for the blog database.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_posts::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_users_first() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();

        assert_eq!(
            names,
            vec![
                "m20240101_000001_create_users".to_string(),
                "m20240101_000002_create_posts".to_string(),
            ]
        );
    }
}
