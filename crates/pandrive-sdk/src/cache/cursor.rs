//! 分页游标跟踪 - 三态 cursor 语义
//!
//! cursor 的三种状态各有含义：
//! - `Resume(ref)`：还有后续页，ref 是下一页的续传位置
//! - `Exhausted`：已确认全部加载完（不允许被无关的本地编辑覆盖）
//! - 键不存在：状态未知，消费方应从第一页重新拉取
//!
//! 跟踪器是显式对象、生命周期由组合方注入：测试各自 new 一个，
//! 不依赖任何进程级全局状态。

use crate::cache::collection::OrderedCollection;
use crate::types::{ChildrenKey, NodeRef};
use std::collections::HashMap;
use tracing::debug;

/// 单个集合键的 cursor 值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// 还有后续页，从该成员之后续传
    Resume(NodeRef),
    /// 已确认没有更多页
    Exhausted,
}

/// 按集合键跟踪分页 cursor
#[derive(Debug, Default)]
pub struct CursorTracker {
    cursors: HashMap<ChildrenKey, PageCursor>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 网络页合并后更新 cursor
    ///
    /// 只在 `page_size` 已配置时评估；非网络触发的合并（本地变更、
    /// 事件流）不得调用本方法，以免把 `Exhausted`/`Resume` 改错。
    ///
    /// 整页到达（`incoming_len > 0` 且是 `page_size` 的整数倍）=>
    /// cursor 指向合并结果 ordered 的最后一个成员；否则视为尾页，
    /// cursor 置为 `Exhausted`。
    pub fn update(
        &mut self,
        key: &ChildrenKey,
        merged: &OrderedCollection,
        incoming_len: usize,
        page_size: Option<u32>,
    ) {
        let Some(page_size) = page_size else {
            return;
        };
        if page_size == 0 {
            return;
        }

        let cursor = if incoming_len > 0 && incoming_len % page_size as usize == 0 {
            match merged.ordered.last() {
                Some(last) => PageCursor::Resume(last.clone()),
                None => PageCursor::Exhausted,
            }
        } else {
            PageCursor::Exhausted
        };

        debug!(
            parent_id = %key.parent_id,
            sort = %key.sort,
            exhausted = matches!(cursor, PageCursor::Exhausted),
            "分页 cursor 更新"
        );
        self.cursors.insert(key.clone(), cursor);
    }

    /// 读取 cursor：None = 状态未知（应从第一页重拉）
    pub fn read(&self, key: &ChildrenKey) -> Option<&PageCursor> {
        self.cursors.get(key)
    }
}
