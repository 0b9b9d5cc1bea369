mod schema;
mod sqlite_episode_repository;
mod sqlite_pool;
mod sqlite_user_repository;

pub use schema::migrate;
pub use sqlite_episode_repository::SqliteEpisodeRepository;
pub use sqlite_pool::create_pool;
pub use sqlite_user_repository::SqliteUserRepository;
