//! Pandrive SDK - 网盘客户端对象缓存核心
//!
//! 为文件管理器 UI 提供实体级缓存，包括：
//! - 🗂️ 归一化实体存储：按身份去重，多个集合共享同一实体
//! - 📄 分页集合合并：已定位成员顺序稳定，散落成员不丢失
//! - 🔖 三态分页 cursor：续传位置 / 已加载完 / 状态未知
//! - 🔍 过滤结果集缓存：按过滤参数分区，首页请求整体重建
//! - 🔄 实时同步应用器：增删改事件与分页共用一套合并语义
//! - 📢 事件广播：集合变化推给 UI，无需轮询
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use pandrive_sdk::{CacheEngine, EntityStore, MergeSource, SortOrder};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let mut engine = CacheEngine::new(Arc::new(EntityStore::new()));
//!
//! // 目录实体先入存储（通常由查询层完成）
//! let parent = engine.folder_ref("root");
//! engine.store().write_fragment(&parent, &json!({
//!     "id": "root",
//!     "permissions": {"write": true},
//! }));
//!
//! // 合并第一页 children
//! engine.merge_children_page(
//!     &parent,
//!     SortOrder::NameAsc,
//!     &[json!({"kind": "file", "id": "f1", "name": "报表.xlsx"})],
//!     Some(25),
//!     MergeSource::Network,
//! );
//!
//! // 拍平读取 + cursor
//! let children = engine.children("root", SortOrder::NameAsc).unwrap();
//! let cursor = engine.children_cursor("root", SortOrder::NameAsc);
//! println!("children: {children:?}, cursor: {cursor:?}");
//! ```

pub mod cache;
pub mod error;
pub mod events;
pub mod store;
pub mod sync;
pub mod types;

pub use cache::{
    lookup_policy, merge, CacheEngine, CursorTracker, FieldPolicyKind, FilteredResultCache,
    FragmentWrite, MergeOutcome, MergeSource, OrderedCollection, PageCursor, RESOLVE_ORDER,
};
pub use error::{PandriveSDKError, Result};
pub use events::{CacheEvent, CacheEventBus};
pub use store::EntityStore;
pub use sync::{NodeEvent, NodeEventAction, NodeFetcher, SyncApplier};
pub use types::{ChildrenKey, FilterKey, NodeKind, NodeRef, SortOrder};
