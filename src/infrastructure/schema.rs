use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tracing::info;

use entity::users;

/// Create the `users` table, with its unique email constraint, unless it
/// already exists.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_users = schema.create_table_from_entity(users::Entity);
    create_users.if_not_exists();
    db.execute(backend.build(&create_users)).await?;

    info!(table = "users", "schema ready");
    Ok(())
}
