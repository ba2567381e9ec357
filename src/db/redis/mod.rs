pub mod store;

pub use store::create_redis_client;
pub use store::RedisSnapshotStore;
pub use store::SnapshotKey;
