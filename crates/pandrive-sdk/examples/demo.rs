//! 缓存核心演示：分页合并 + cursor + 实时事件
//!
//! 运行：`cargo run --example demo`

use pandrive_sdk::{
    CacheEngine, EntityStore, MergeSource, NodeEvent, NodeEventAction, NodeFetcher, NodeRef,
    Result, SortOrder, SyncApplier,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;

/// 演示用的节点拉取器：本地拼一个全量 payload
struct DemoFetcher;

#[async_trait]
impl NodeFetcher for DemoFetcher {
    async fn fetch_node(&self, node: &NodeRef) -> Result<Value> {
        Ok(json!({
            "kind": node.kind.as_str(),
            "id": node.id,
            "name": format!("{}.pdf", node.id),
            "size": 1024,
        }))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let mut engine = CacheEngine::new(Arc::new(EntityStore::new()));

    // 目录实体入存储
    let parent = engine.folder_ref("root");
    engine.store().write_fragment(
        &parent,
        &json!({"id": "root", "permissions": {"write": true, "share": true}}),
    );

    // 合并整页（页大小 3）=> cursor 指向续传位置
    engine.merge_children_page(
        &parent,
        SortOrder::NameAsc,
        &[
            json!({"kind": "folder", "id": "d1", "name": "文档"}),
            json!({"kind": "file", "id": "f1", "name": "报表.xlsx"}),
            json!({"kind": "file", "id": "f2", "name": "合同.pdf"}),
        ],
        Some(3),
        MergeSource::Network,
    );
    println!("第一页后: {:?}", engine.children("root", SortOrder::NameAsc));
    println!("cursor: {:?}", engine.children_cursor("root", SortOrder::NameAsc));

    // 尾页（1 < 3）=> Exhausted
    engine.merge_children_page(
        &parent,
        SortOrder::NameAsc,
        &[json!({"kind": "file", "id": "f3", "name": "备忘.txt"})],
        Some(3),
        MergeSource::Network,
    );
    println!("尾页后 cursor: {:?}", engine.children_cursor("root", SortOrder::NameAsc));

    // 实时事件：新增 + 删除
    let engine = Arc::new(RwLock::new(engine));
    let applier = SyncApplier::new(engine.clone(), DemoFetcher);
    applier
        .apply(NodeEvent {
            action: NodeEventAction::Added,
            parent_id: "root".into(),
            node: json!({"kind": "file", "id": "f9"}),
        })
        .await
        .expect("Added 事件应用失败");
    applier
        .apply(NodeEvent {
            action: NodeEventAction::Deleted,
            parent_id: "root".into(),
            node: json!({"kind": "file", "id": "f1"}),
        })
        .await
        .expect("Deleted 事件应用失败");

    println!("事件后: {:?}", engine.read().children("root", SortOrder::NameAsc));
}
