//! 缓存事件广播 - 集合变化的向上通知
//!
//! 文件管理器 UI 订阅这里的广播即可在集合变化时重渲染，不需要轮询。
//! 只做通知边界：渲染本身不在 SDK 范围内。

use crate::types::{FilterKey, NodeRef, SortOrder};
use tokio::sync::broadcast;
use tracing::debug;

/// 集合级变化事件
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// 某目录某排序的 children 集合发生合并
    ChildrenChanged { parent_id: String, sort: SortOrder },
    /// 某过滤结果集发生合并/重建
    FilteredChanged { args: FilterKey },
    /// 某文件的版本列表发生合并
    VersionsChanged { file_id: String },
    /// 某成员被从集合中移除（本地删除或 Deleted 事件）
    ChildRemoved { parent_id: String, node: NodeRef },
}

/// 事件广播器
///
/// 无订阅者时发送静默丢弃（broadcast 语义），缓存路径不因 UI
/// 缺席而报错。
#[derive(Debug)]
pub struct CacheEventBus {
    sender: broadcast::Sender<CacheEvent>,
}

impl CacheEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅集合变化
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(&self, event: CacheEvent) {
        debug!(?event, "缓存事件广播");
        let _ = self.sender.send(event);
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    #[tokio::test]
    async fn subscriber_receives_emitted_events() {
        let bus = CacheEventBus::new(8);
        let mut rx = bus.subscribe();

        bus.emit(CacheEvent::ChildrenChanged {
            parent_id: "d1".into(),
            sort: SortOrder::NameAsc,
        });
        bus.emit(CacheEvent::ChildRemoved {
            parent_id: "d1".into(),
            node: NodeRef::new(NodeKind::File, "f1"),
        });

        match rx.recv().await.unwrap() {
            CacheEvent::ChildrenChanged { parent_id, sort } => {
                assert_eq!(parent_id, "d1");
                assert_eq!(sort, SortOrder::NameAsc);
            }
            other => panic!("意外事件: {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            CacheEvent::ChildRemoved { .. }
        ));
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = CacheEventBus::new(8);
        // 不应 panic 或报错
        bus.emit(CacheEvent::VersionsChanged { file_id: "f1".into() });
    }
}
