//! 字段级缓存策略 - 封闭的策略集合
//!
//! 每个可缓存字段对应一个策略变体，按 `(type, field)` 显式查表分发，
//! 不做任何动态属性探测。策略的 merge 一律是两段式：先算出新集合 +
//! 一组派生写入（derived writes），由组合方（engine）统一落到存储，
//! merge 本身不碰存储之外的任何可变状态。

use crate::cache::collection::{merge, OrderedCollection};
use crate::store::EntityStore;
use crate::types::{FilterKey, NodeKind, NodeRef};
use serde_json::{json, Value};
use tracing::debug;

/// 可缓存字段的策略变体（受控枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicyKind {
    FolderChildren,
    FilteredResults,
    VersionList,
    SingleNodeResolve,
}

/// `(type, field)` -> 策略 的显式查表
pub fn lookup_policy(type_name: &str, field_name: &str) -> Option<FieldPolicyKind> {
    match (type_name, field_name) {
        ("Folder", "children") => Some(FieldPolicyKind::FolderChildren),
        ("Query", "searchNodes") => Some(FieldPolicyKind::FilteredResults),
        ("File", "versions") => Some(FieldPolicyKind::VersionList),
        ("Query", "node") => Some(FieldPolicyKind::SingleNodeResolve),
        _ => None,
    }
}

/// 一条派生写入：merge 产出、由组合方应用到存储
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentWrite {
    pub target: NodeRef,
    pub data: Value,
}

/// 两段式 merge 的产出
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub collection: OrderedCollection,
    pub writes: Vec<FragmentWrite>,
}

/// 目录 children 的合并策略
///
/// 位置合并之后，若父目录当前可读，则读出其 `id` + `permissions`
/// fragment，为合并结果里的每个成员（ordered 与 unordered 都算）派生
/// 一条 parent 反向引用写入。面包屑/权限 UI 因此不需要对每个子节点
/// 再发一次查询。
pub fn merge_folder_children(
    store: &EntityStore,
    parent: &NodeRef,
    existing: Option<&OrderedCollection>,
    incoming: &[NodeRef],
) -> MergeOutcome {
    let collection = merge(existing, incoming);

    let mut writes = Vec::new();
    if store.can_read(parent) {
        if let Some(parent_fragment) = store.read_fragment(parent, &["id", "permissions"]) {
            for member in collection.flatten() {
                writes.push(FragmentWrite {
                    target: member,
                    data: json!({ "parent": parent_fragment }),
                });
            }
        }
    }

    MergeOutcome { collection, writes }
}

/// 过滤结果集缓存：过滤参数 + 最近一次的续传 token + 节点集合
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResultCache {
    pub args: FilterKey,
    /// 服务端返回的续传 token，原样保存、原样回传
    pub page_token: Option<String>,
    pub nodes: OrderedCollection,
}

/// 过滤/排序结果集的合并策略
///
/// 请求不带续传 token = 首页请求：丢弃该 FilterKey 下的旧集合再合并
/// （服务端重新过滤后，本地旧状态整体作废）；否则增量合并。
/// 响应里的 `page_token` 原样保存。
pub fn merge_filtered_results(
    existing: Option<&FilteredResultCache>,
    args: &FilterKey,
    request_token: Option<&str>,
    incoming: &[NodeRef],
    response_token: Option<String>,
) -> FilteredResultCache {
    let base = match request_token {
        None => {
            if existing.is_some() {
                debug!(sort = %args.sort, "过滤结果首页请求，丢弃旧集合");
            }
            None
        }
        Some(_) => existing.map(|c| &c.nodes),
    };

    FilteredResultCache {
        args: args.clone(),
        page_token: response_token,
        nodes: merge(base, incoming),
    }
}

/// 文件版本历史的合并策略：纯位置合并，无 cursor、无反向引用
pub fn merge_version_list(
    existing: Option<&OrderedCollection>,
    incoming: &[NodeRef],
) -> OrderedCollection {
    merge(existing, incoming)
}

/// 通用「按 id 取节点」的候选类型探测顺序
///
/// 各类型的 id 空间由服务端保证互不相交，顺序在实践中不可观测；
/// 固定下来作为万一失守时的裁决顺序。Version 不参与通用解析。
pub const RESOLVE_ORDER: [NodeKind; 3] = [NodeKind::Folder, NodeKind::File, NodeKind::Share];

/// 按固定优先级探测各候选类型，第一个缓存可读的命中即返回
pub fn resolve_node(store: &EntityStore, id: &str) -> Option<NodeRef> {
    for kind in RESOLVE_ORDER {
        let candidate = store.to_reference(kind, id);
        if store.can_read(&candidate) {
            return Some(candidate);
        }
    }
    None
}
