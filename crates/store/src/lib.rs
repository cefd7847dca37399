pub mod connection;
pub mod locks;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use locks::KeyedLocks;
pub use repositories::{InMemoryMenuRepository, MenuRepository, RepositoryError, SqlMenuRepository};
