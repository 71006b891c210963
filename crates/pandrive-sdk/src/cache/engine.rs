//! 缓存引擎 - 策略的组合方与集合的唯一持有者
//!
//! 引擎持有存储、cursor 跟踪器和全部集合对象，负责：
//! - 把查询层送来的页 payload 归一化进存储、换成引用
//! - 调用对应策略做位置合并，统一应用策略产出的派生写入
//! - 只在网络页合并时推进 cursor
//! - 合并/移除后广播集合变化事件
//!
//! 单集合串行：引擎方法都是同步的、跑完即止，同一集合上不存在
//! 并发的在途变更，引擎内部不需要锁。异步边界按需用
//! `Arc<RwLock<CacheEngine>>` 共享整个引擎。

use crate::cache::collection::OrderedCollection;
use crate::cache::cursor::{CursorTracker, PageCursor};
use crate::cache::policy::{
    self, FilteredResultCache, FragmentWrite, MergeOutcome,
};
use crate::events::{CacheEvent, CacheEventBus};
use crate::store::EntityStore;
use crate::types::{ChildrenKey, FilterKey, NodeKind, NodeRef, SortOrder};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 合并的触发来源
///
/// 只有网络分页会推进 cursor；本地变更与事件流合并不碰 cursor，
/// 以免把「已加载完」的确认改错。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    /// 网络分页响应
    Network,
    /// 客户端本地变更（乐观更新等）
    Local,
    /// 实时事件流（SyncApplier）
    EventStream,
}

/// 缓存引擎
pub struct CacheEngine {
    store: Arc<EntityStore>,
    cursors: CursorTracker,
    children: HashMap<ChildrenKey, OrderedCollection>,
    filtered: HashMap<FilterKey, FilteredResultCache>,
    versions: HashMap<String, OrderedCollection>,
    events: CacheEventBus,
}

impl CacheEngine {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self {
            store,
            cursors: CursorTracker::new(),
            children: HashMap::new(),
            filtered: HashMap::new(),
            versions: HashMap::new(),
            events: CacheEventBus::default(),
        }
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// 订阅集合变化事件
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// 把一页 payload 归一化进存储，换成引用序列
    ///
    /// 解析不出身份的 payload 在位置合并前丢弃（warn），其余按
    /// fragment 深合并写入存储（新值覆盖旧值）。
    fn normalize_page(&self, nodes: &[Value]) -> Vec<NodeRef> {
        let mut refs = Vec::with_capacity(nodes.len());
        for payload in nodes {
            match self.store.identify(payload) {
                Some(node) => {
                    self.store.write_fragment(&node, payload);
                    refs.push(node);
                }
                None => {
                    warn!("payload 无法解析身份，丢弃: {payload}");
                }
            }
        }
        refs
    }

    fn apply_writes(&self, writes: &[FragmentWrite]) {
        for write in writes {
            self.store.write_fragment(&write.target, &write.data);
        }
    }

    // ---- 目录 children ----

    /// 合并一页目录 children
    ///
    /// `page_size` 是本次查询配置的页大小；`source` 为 Network 时才
    /// 推进 cursor。返回实际参与合并的引用数。
    pub fn merge_children_page(
        &mut self,
        parent: &NodeRef,
        sort: SortOrder,
        nodes: &[Value],
        page_size: Option<u32>,
        source: MergeSource,
    ) -> usize {
        let refs = self.normalize_page(nodes);
        self.merge_children_refs(parent, sort, &refs, page_size, source);
        refs.len()
    }

    /// 用已归一化的引用序列合并（事件流的一元页也走这里）
    pub(crate) fn merge_children_refs(
        &mut self,
        parent: &NodeRef,
        sort: SortOrder,
        refs: &[NodeRef],
        page_size: Option<u32>,
        source: MergeSource,
    ) {
        let key = ChildrenKey::new(parent.id.clone(), sort);
        let MergeOutcome { collection, writes } =
            policy::merge_folder_children(&self.store, parent, self.children.get(&key), refs);
        self.apply_writes(&writes);

        if source == MergeSource::Network {
            self.cursors.update(&key, &collection, refs.len(), page_size);
        }

        debug!(
            parent_id = %key.parent_id,
            sort = %key.sort,
            incoming = refs.len(),
            total = collection.len(),
            ?source,
            "children 集合合并完成"
        );
        self.children.insert(key.clone(), collection);
        self.events.emit(CacheEvent::ChildrenChanged {
            parent_id: key.parent_id,
            sort,
        });
    }

    /// 读取目录 children：`ordered ++ unordered` 拍平后的引用序列
    ///
    /// 永远返回完整拍平结果，哪怕调用方只要一个子区间——否则重渲染
    /// 之间可能出现可见的顺序跳变。None = 该键尚未初始化。
    pub fn children(&self, parent_id: &str, sort: SortOrder) -> Option<Vec<NodeRef>> {
        self.children
            .get(&ChildrenKey::new(parent_id, sort))
            .map(OrderedCollection::flatten)
    }

    /// 读取分页 cursor（三态：Resume / Exhausted / None=未知）
    pub fn children_cursor(&self, parent_id: &str, sort: SortOrder) -> Option<&PageCursor> {
        self.cursors.read(&ChildrenKey::new(parent_id, sort))
    }

    /// 本地移除：从该目录所有已缓存排序的集合中去掉该成员
    ///
    /// 不是网络页，cursor 保持原样。没有任何集合包含该成员时为 no-op。
    pub fn remove_child_local(&mut self, parent_id: &str, node: &NodeRef) -> bool {
        self.remove_child(parent_id, node)
    }

    pub(crate) fn remove_child(&mut self, parent_id: &str, node: &NodeRef) -> bool {
        let mut removed = false;
        for (key, collection) in self.children.iter_mut() {
            if key.parent_id == parent_id && collection.contains(node) {
                collection.remove(node);
                removed = true;
            }
        }
        if removed {
            self.events.emit(CacheEvent::ChildRemoved {
                parent_id: parent_id.to_string(),
                node: node.clone(),
            });
        }
        removed
    }

    /// 该目录是否有任何已缓存的 children 集合
    pub(crate) fn parent_cached(&self, parent_id: &str) -> bool {
        self.children.keys().any(|k| k.parent_id == parent_id)
    }

    /// 该目录下所有已缓存的排序
    pub(crate) fn cached_sorts(&self, parent_id: &str) -> Vec<SortOrder> {
        self.children
            .keys()
            .filter(|k| k.parent_id == parent_id)
            .map(|k| k.sort)
            .collect()
    }

    // ---- 过滤结果集 ----

    /// 合并一页过滤/排序结果
    ///
    /// `request_token` 为 None 表示首页请求：该 FilterKey 下旧集合
    /// 整体作废后重建；否则增量合并。`response_token` 原样保存。
    pub fn merge_filtered_page(
        &mut self,
        args: &FilterKey,
        request_token: Option<&str>,
        nodes: &[Value],
        response_token: Option<String>,
    ) -> usize {
        let refs = self.normalize_page(nodes);
        let cache = policy::merge_filtered_results(
            self.filtered.get(args),
            args,
            request_token,
            &refs,
            response_token,
        );
        info!(
            sort = %args.sort,
            incoming = refs.len(),
            total = cache.nodes.len(),
            first_page = request_token.is_none(),
            "过滤结果集合并完成"
        );
        self.filtered.insert(args.clone(), cache);
        self.events.emit(CacheEvent::FilteredChanged { args: args.clone() });
        refs.len()
    }

    /// 读取过滤结果集（拍平）。None = 该 FilterKey 尚未初始化。
    pub fn filtered(&self, args: &FilterKey) -> Option<Vec<NodeRef>> {
        self.filtered.get(args).map(|c| c.nodes.flatten())
    }

    /// 读取过滤结果集的完整缓存（含续传 token）
    pub fn filtered_cache(&self, args: &FilterKey) -> Option<&FilteredResultCache> {
        self.filtered.get(args)
    }

    // ---- 文件版本历史 ----

    /// 合并一页文件版本历史
    pub fn merge_version_page(&mut self, file_id: &str, nodes: &[Value]) -> usize {
        let refs = self.normalize_page(nodes);
        let merged = policy::merge_version_list(self.versions.get(file_id), &refs);
        self.versions.insert(file_id.to_string(), merged);
        self.events.emit(CacheEvent::VersionsChanged {
            file_id: file_id.to_string(),
        });
        refs.len()
    }

    /// 读取文件版本历史（拍平）。None = 尚未初始化。
    pub fn versions(&self, file_id: &str) -> Option<Vec<NodeRef>> {
        self.versions.get(file_id).map(OrderedCollection::flatten)
    }

    // ---- 通用节点解析 ----

    /// 按 id 解析节点：按固定候选顺序探测，第一个缓存可读的命中
    pub fn resolve_node(&self, id: &str) -> Option<NodeRef> {
        policy::resolve_node(&self.store, id)
    }

    /// 构造目录引用的便捷方法
    pub fn folder_ref(&self, id: &str) -> NodeRef {
        self.store.to_reference(NodeKind::Folder, id)
    }
}
