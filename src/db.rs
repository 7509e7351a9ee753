//! SQLite connection pool.

use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Builds an r2d2 pool of at most `max_connections` SQLite connections.
pub fn establish_connection_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_connections.max(1))
        .build(manager)
}
