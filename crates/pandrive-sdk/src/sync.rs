//! 实时同步应用器 - 把事件流里的增删改落到缓存集合
//!
//! 事件按到达顺序串行应用，与分页拉取共用同一套合并语义：
//! Updated/Added 都走一元页 merge，而不是单独的 patch 路径，
//! 因此去重与排序不变量自动成立，同一事件应用两次是安全的。
//!
//! 事件流不保证回放/补发：漏掉一个 Added 只意味着该节点在下一次
//! 整页拉取之前不可见，应用器对空洞容忍、不报错。

use crate::cache::engine::{CacheEngine, MergeSource};
use crate::error::Result;
use crate::types::NodeRef;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 事件动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEventAction {
    Added,
    Updated,
    Deleted,
}

/// 事件流投递的单条事件（以父集合为作用域）
#[derive(Debug, Clone)]
pub struct NodeEvent {
    pub action: NodeEventAction,
    /// 所属父目录 id
    pub parent_id: String,
    /// 事件携带的节点 payload（至少含身份）
    pub node: Value,
}

/// 查询层的节点拉取接口
///
/// Added 事件需要绕开可能过期的本地投影、按身份拉全量实体。
/// 传输层错误由实现方上报，应用器原样向上传递、不做重试。
#[async_trait]
pub trait NodeFetcher: Send + Sync {
    async fn fetch_node(&self, node: &NodeRef) -> Result<Value>;
}

/// 同步应用器
pub struct SyncApplier<F: NodeFetcher> {
    engine: Arc<RwLock<CacheEngine>>,
    fetcher: F,
}

impl<F: NodeFetcher> SyncApplier<F> {
    pub fn new(engine: Arc<RwLock<CacheEngine>>, fetcher: F) -> Self {
        Self { engine, fetcher }
    }

    /// 应用单条事件（幂等）
    ///
    /// 身份解析不出、或父集合根本没缓存过的事件都是 no-op，不是错误。
    pub async fn apply(&self, event: NodeEvent) -> Result<()> {
        let store = self.engine.read().store().clone();
        let Some(node) = store.identify(&event.node) else {
            warn!(parent_id = %event.parent_id, "事件 payload 无法解析身份，忽略");
            return Ok(());
        };

        match event.action {
            NodeEventAction::Deleted => {
                // 直接从两个分区过滤，不走 merge
                let removed = self.engine.write().remove_child(&event.parent_id, &node);
                debug!(%node, parent_id = %event.parent_id, removed, "Deleted 事件已应用");
                Ok(())
            }
            NodeEventAction::Updated => {
                if !self.engine.read().parent_cached(&event.parent_id) {
                    debug!(%node, parent_id = %event.parent_id, "父集合未缓存，Updated 事件忽略");
                    return Ok(());
                }
                if store.can_read(&node) {
                    // 缓存命中是常态：事件 payload 合并进存储后按存储态 merge
                    store.write_fragment(&node, &event.node);
                } else {
                    // 命中落空时退化为全量拉取
                    let full = self.fetcher.fetch_node(&node).await?;
                    store.write_fragment(&node, &full);
                }
                self.merge_into_parent(&event.parent_id, &node);
                Ok(())
            }
            NodeEventAction::Added => {
                if !self.engine.read().parent_cached(&event.parent_id) {
                    debug!(%node, parent_id = %event.parent_id, "父集合未缓存，Added 事件忽略");
                    return Ok(());
                }
                // 绕开可能过期的本地投影，按身份拉全量
                let full = self.fetcher.fetch_node(&node).await?;
                store.write_fragment(&node, &full);
                self.merge_into_parent(&event.parent_id, &node);
                Ok(())
            }
        }
    }

    /// 以一元页走标准 merge，落到该目录所有已缓存排序的集合
    ///
    /// 不带页大小 => cursor 跟踪器不会被评估，事件永远不改 cursor。
    fn merge_into_parent(&self, parent_id: &str, node: &NodeRef) {
        let mut engine = self.engine.write();
        let parent = engine.folder_ref(parent_id);
        for sort in engine.cached_sorts(parent_id) {
            engine.merge_children_refs(
                &parent,
                sort,
                std::slice::from_ref(node),
                None,
                MergeSource::EventStream,
            );
        }
    }

    /// 事件循环：按到达顺序串行消费，直到发送端关闭
    pub async fn run(&self, mut events: mpsc::Receiver<NodeEvent>) {
        info!("同步事件循环启动");
        while let Some(event) = events.recv().await {
            if let Err(e) = self.apply(event).await {
                warn!("事件应用失败: {e}");
            }
        }
        info!("同步事件循环结束（事件流已关闭）");
    }
}
