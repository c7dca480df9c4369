pub mod arc;
pub mod lfu;
pub mod lfu_avg;
pub mod lru;
pub mod lru_k;
#[cfg(feature = "concurrency")]
pub mod sharded;
