pub use crate::ds::{FrequencyBuckets, GhostList, IntrusiveList, SlotArena, SlotId};
pub use crate::error::{ConfigError, KeyNotFoundError};
pub use crate::policy::arc::ArcCore;
pub use crate::policy::lfu::LfuCore;
pub use crate::policy::lfu_avg::LfuAvgCore;
pub use crate::policy::lru::LruCore;
pub use crate::policy::lru_k::LrukCore;
pub use crate::traits::{ConcurrentCache, CoreCache, MutableCache};

#[cfg(feature = "concurrency")]
pub use crate::policy::arc::ConcurrentArcCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lfu::ConcurrentLfuCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lfu_avg::ConcurrentLfuAvgCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru_k::ConcurrentLrukCache;
#[cfg(feature = "concurrency")]
pub use crate::policy::sharded::{ShardedLfuCache, ShardedLruCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::MetricsSnapshot;
