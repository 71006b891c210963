//! 有序集合与分页合并 - 集合层的核心不变量在这里维护
//!
//! 集合用两个分区表示一页页拉回来的结果：
//! - `ordered`：被分页拉取定过位的成员，插入顺序有意义
//! - `unordered`：只通过单实体读取/事件进来、还没被任何分页定位的成员
//!
//! 不变量：同一身份最多出现在一个分区里；`ordered` 内无重复。
//! 字段级深合并是存储层 `write_fragment` 的职责，这里只做位置合并，
//! 因此 `merge` 是纯函数，可独立测试。

use crate::types::NodeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 分页集合的两分区表示
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedCollection {
    /// 已定位成员（插入顺序有意义，按身份去重）
    pub ordered: Vec<NodeRef>,
    /// 未定位成员（顺序无意义，按身份去重）
    pub unordered: Vec<NodeRef>,
}

impl OrderedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取视图：`ordered ++ unordered`
    ///
    /// 任何集合的对外读取都必须走这里：保证已定位成员顺序稳定，
    /// 未定位成员也不会被悄悄丢掉（代价是排在所有已定位成员之后）。
    pub fn flatten(&self) -> Vec<NodeRef> {
        let mut out = self.ordered.clone();
        out.extend(self.unordered.iter().cloned());
        out
    }

    pub fn contains(&self, node: &NodeRef) -> bool {
        self.ordered.contains(node) || self.unordered.contains(node)
    }

    /// 从两个分区中移除该身份（幂等）
    pub fn remove(&mut self, node: &NodeRef) {
        self.ordered.retain(|n| n != node);
        self.unordered.retain(|n| n != node);
    }

    pub fn len(&self) -> usize {
        self.ordered.len() + self.unordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty() && self.unordered.is_empty()
    }

    /// 把未定位成员塞进集合（按身份去重；已在任一分区则不动）
    pub fn insert_unordered(&mut self, node: NodeRef) {
        if !self.contains(&node) {
            self.unordered.push(node);
        }
    }
}

/// 把一页新到的引用合并进已有集合（existing 为 None 时从空集合起步）
///
/// - 身份已在 `ordered`：位置保持不变（字段合并已由存储层完成）
/// - 身份在 `unordered`：本次分页把它定了位，从 `unordered` 移出、按到达顺序追加
/// - 新身份：按到达顺序追加
///
/// 同一页合并两次结果不变（按身份去重 + 位置保持 => 幂等）。
pub fn merge(existing: Option<&OrderedCollection>, incoming: &[NodeRef]) -> OrderedCollection {
    let mut ordered = existing.map(|c| c.ordered.clone()).unwrap_or_default();
    let mut unordered = existing.map(|c| c.unordered.clone()).unwrap_or_default();

    let mut seen: HashSet<NodeRef> = ordered.iter().cloned().collect();
    let mut staged: Vec<NodeRef> = Vec::new();

    for node in incoming {
        if seen.contains(node) {
            // 已定位（或本页前面已出现过），位置保持
            continue;
        }
        if let Some(pos) = unordered.iter().position(|n| n == node) {
            unordered.remove(pos);
        }
        seen.insert(node.clone());
        staged.push(node.clone());
    }

    ordered.extend(staged);
    OrderedCollection { ordered, unordered }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn file(id: &str) -> NodeRef {
        NodeRef::new(NodeKind::File, id)
    }

    fn assert_partition_exclusive(c: &OrderedCollection) {
        for node in &c.ordered {
            assert!(!c.unordered.contains(node), "{} 同时在两个分区", node);
        }
        let ids: HashSet<_> = c.ordered.iter().collect();
        assert_eq!(ids.len(), c.ordered.len(), "ordered 内有重复");
    }

    #[test]
    fn merge_first_page_into_empty() {
        // 场景：空集合 + [a,b,c] => ordered=[a,b,c]
        let merged = merge(None, &[file("a"), file("b"), file("c")]);
        assert_eq!(merged.ordered, vec![file("a"), file("b"), file("c")]);
        assert!(merged.unordered.is_empty());
        assert_partition_exclusive(&merged);
    }

    #[test]
    fn merge_keeps_position_of_known_ids_and_appends_new() {
        // 场景：ordered=[a,b] + [b,c] => ordered=[a,b,c]
        let existing = merge(None, &[file("a"), file("b")]);
        let merged = merge(Some(&existing), &[file("b"), file("c")]);
        assert_eq!(merged.ordered, vec![file("a"), file("b"), file("c")]);
        assert_partition_exclusive(&merged);
    }

    #[test]
    fn merge_deduplicates_across_pages() {
        let p1 = [file("a"), file("b")];
        let p2 = [file("b"), file("c")];
        let merged = merge(Some(&merge(None, &p1)), &p2);
        assert_eq!(
            merged.flatten().iter().filter(|n| **n == file("b")).count(),
            1
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = merge(None, &[file("a"), file("b")]);
        let page = [file("b"), file("c"), file("d")];
        let once = merge(Some(&existing), &page);
        let twice = merge(Some(&once), &page);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_preserves_relative_order_of_previously_ordered() {
        let existing = merge(None, &[file("a"), file("b"), file("c")]);
        // 重新包含 b（哪怕本页里 b 排最前），a/b/c 相对顺序不变
        let merged = merge(Some(&existing), &[file("b"), file("d")]);
        let pos = |id: &str| merged.ordered.iter().position(|n| n.id == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn merge_promotes_unordered_member_on_first_positioning() {
        let mut existing = merge(None, &[file("a")]);
        existing.insert_unordered(file("x"));
        assert!(existing.unordered.contains(&file("x")));

        // 分页首次覆盖 x => 从 unordered 移出、按到达顺序进入 ordered
        let merged = merge(Some(&existing), &[file("b"), file("x")]);
        assert_eq!(merged.ordered, vec![file("a"), file("b"), file("x")]);
        assert!(merged.unordered.is_empty());
        assert_partition_exclusive(&merged);
    }

    #[test]
    fn merge_ignores_duplicate_within_single_page() {
        let merged = merge(None, &[file("a"), file("a"), file("b")]);
        assert_eq!(merged.ordered, vec![file("a"), file("b")]);
    }

    #[test]
    fn flatten_appends_unordered_after_ordered() {
        let mut c = merge(None, &[file("a"), file("b")]);
        c.insert_unordered(file("x"));
        assert_eq!(c.flatten(), vec![file("a"), file("b"), file("x")]);
    }

    #[test]
    fn remove_clears_both_partitions() {
        let mut c = merge(None, &[file("a"), file("b")]);
        c.insert_unordered(file("x"));
        c.remove(&file("b"));
        c.remove(&file("x"));
        assert_eq!(c.flatten(), vec![file("a")]);
        // 幂等
        c.remove(&file("b"));
        assert_eq!(c.flatten(), vec![file("a")]);
    }
}
