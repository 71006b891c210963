//! 归一化实体存储 - 按身份去重的内存文档库
//!
//! 本模块提供：
//! - 按身份（kind + id）存取实体文档
//! - fragment 级局部读写（深合并，新值覆盖旧值）
//! - 身份解析与可读性检查
//!
//! 存储是进程内的：跨进程共享与重启持久化均为非目标。
//! 实体状态的唯一持有者是本存储，集合层只持有 [`NodeRef`]。

use crate::types::{NodeKind, NodeRef};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// 归一化实体存储
#[derive(Debug, Default)]
pub struct EntityStore {
    nodes: RwLock<HashMap<NodeRef, Value>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 payload 中解析身份（`kind` + `id` 字段）
    ///
    /// 解析不出身份的 payload 无法归一化，由调用方决定丢弃策略。
    pub fn identify(&self, payload: &Value) -> Option<NodeRef> {
        let kind = payload.get("kind")?.as_str()?;
        let kind = NodeKind::from_str(kind).ok()?;
        let id = payload.get("id")?.as_str()?;
        Some(NodeRef::new(kind, id))
    }

    /// 构造实体引用（不检查实体是否存在）
    pub fn to_reference(&self, kind: NodeKind, id: &str) -> NodeRef {
        NodeRef::new(kind, id)
    }

    /// 按身份读取完整实体
    pub fn read(&self, node: &NodeRef) -> Option<Value> {
        self.nodes.read().get(node).cloned()
    }

    /// fragment 级局部读：只取指定字段
    ///
    /// 任一字段缺失时整体返回 None（fragment 要么完整要么不可用）。
    pub fn read_fragment(&self, node: &NodeRef, fields: &[&str]) -> Option<Value> {
        let nodes = self.nodes.read();
        let entity = nodes.get(node)?;
        let mut out = serde_json::Map::new();
        for field in fields {
            out.insert((*field).to_string(), entity.get(*field)?.clone());
        }
        Some(Value::Object(out))
    }

    /// fragment 级局部写：深合并进已有文档，新值覆盖旧值
    ///
    /// 同一 fragment 重复写入是幂等的。
    pub fn write_fragment(&self, node: &NodeRef, data: &Value) {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(node) {
            Some(existing) => deep_merge(existing, data),
            None => {
                nodes.insert(node.clone(), data.clone());
            }
        }
    }

    /// 实体是否已入缓存且可读
    pub fn can_read(&self, node: &NodeRef) -> bool {
        self.nodes.read().contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

/// 深合并：逐字段合并 object，非 object 字段新值覆盖旧值
fn deep_merge(dst: &mut Value, src: &Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (key, src_val) in src_map {
                match dst_map.get_mut(key) {
                    Some(dst_val) if dst_val.is_object() && src_val.is_object() => {
                        deep_merge(dst_val, src_val);
                    }
                    _ => {
                        dst_map.insert(key.clone(), src_val.clone());
                    }
                }
            }
        }
        (dst, src) => *dst = src.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identify_extracts_kind_and_id() {
        let store = EntityStore::new();
        let payload = json!({"kind": "file", "id": "f1", "name": "报表.xlsx"});
        assert_eq!(
            store.identify(&payload),
            Some(NodeRef::new(NodeKind::File, "f1"))
        );
        // 缺 id / kind 非法 => 无法解析
        assert_eq!(store.identify(&json!({"kind": "file"})), None);
        assert_eq!(store.identify(&json!({"kind": "blob", "id": "x"})), None);
    }

    #[test]
    fn write_fragment_deep_merges_incoming_wins() {
        let store = EntityStore::new();
        let node = NodeRef::new(NodeKind::File, "f1");
        store.write_fragment(&node, &json!({"name": "a.txt", "meta": {"size": 10, "star": true}}));
        store.write_fragment(&node, &json!({"name": "b.txt", "meta": {"size": 20}}));

        let entity = store.read(&node).unwrap();
        assert_eq!(entity["name"], "b.txt");
        assert_eq!(entity["meta"]["size"], 20);
        // 未覆盖的嵌套字段保留
        assert_eq!(entity["meta"]["star"], true);
    }

    #[test]
    fn write_fragment_is_idempotent() {
        let store = EntityStore::new();
        let node = NodeRef::new(NodeKind::Folder, "d1");
        let fragment = json!({"name": "docs", "permissions": {"write": true}});
        store.write_fragment(&node, &fragment);
        let once = store.read(&node).unwrap();
        store.write_fragment(&node, &fragment);
        assert_eq!(store.read(&node).unwrap(), once);
    }

    #[test]
    fn read_fragment_requires_all_fields() {
        let store = EntityStore::new();
        let node = NodeRef::new(NodeKind::Folder, "d1");
        store.write_fragment(&node, &json!({"id": "d1", "permissions": {"write": true}}));

        let fragment = store.read_fragment(&node, &["id", "permissions"]).unwrap();
        assert_eq!(fragment["id"], "d1");
        assert_eq!(fragment["permissions"]["write"], true);
        // 缺字段 => 整体 None
        assert!(store.read_fragment(&node, &["id", "name"]).is_none());
    }

    #[test]
    fn can_read_reflects_presence() {
        let store = EntityStore::new();
        let node = NodeRef::new(NodeKind::Share, "s1");
        assert!(!store.can_read(&node));
        store.write_fragment(&node, &json!({"id": "s1"}));
        assert!(store.can_read(&node));
    }
}
