//! Cache store implementations

pub mod redis;

pub use self::redis::{RedisCacheStore, RedisDriver};
