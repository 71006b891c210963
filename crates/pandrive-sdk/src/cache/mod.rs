//! 集合缓存核心 - 合并 / 分页 cursor / 字段策略
//!
//! 三个相互独立的异步来源（分页响应、本地变更、实时事件）在这里
//! 汇成每个逻辑集合的单一有序视图：不重、不丢已加载页、cursor 三态
//! 语义明确。

pub mod collection;
pub mod cursor;
pub mod engine;
pub mod policy;

pub use collection::{merge, OrderedCollection};
pub use cursor::{CursorTracker, PageCursor};
pub use engine::{CacheEngine, MergeSource};
pub use policy::{
    lookup_policy, FieldPolicyKind, FilteredResultCache, FragmentWrite, MergeOutcome,
    RESOLVE_ORDER,
};
