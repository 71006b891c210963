//! 节点类型与集合键 - 受控枚举
//!
//! node kind 为受控枚举，新增需 SDK 与 Server 同步升级。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 节点类型（与查询协议一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    File,
    Share,
    Version,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
            Self::Share => "share",
            Self::Version => "version",
        }
    }
}

impl FromStr for NodeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            "share" => Ok(Self::Share),
            "version" => Ok(Self::Version),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 实体引用 - 只含身份（type + id），不携带任何实体数据
///
/// 同一实体可以同时出现在多个集合里，集合之间共享的永远是身份，
/// 实体状态的唯一持有者是底层 [`EntityStore`](crate::store::EntityStore)。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeRef {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// 排序方式 - 不同排序各自独立缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    UpdatedAsc,
    UpdatedDesc,
    SizeAsc,
    SizeDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::UpdatedAsc => "updated_asc",
            Self::UpdatedDesc => "updated_desc",
            Self::SizeAsc => "size_asc",
            Self::SizeDesc => "size_desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            "updated_asc" => Ok(Self::UpdatedAsc),
            "updated_desc" => Ok(Self::UpdatedDesc),
            "size_asc" => Ok(Self::SizeAsc),
            "size_desc" => Ok(Self::SizeDesc),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 目录 children 集合键：父目录 + 排序方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildrenKey {
    pub parent_id: String,
    pub sort: SortOrder,
}

impl ChildrenKey {
    pub fn new(parent_id: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            parent_id: parent_id.into(),
            sort,
        }
    }
}

/// 过滤结果集的分区键
///
/// 参与服务端过滤/排序的全部参数；键不同的结果集绝不共享缓存集合。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterKey {
    /// 限定节点类型（None = 不限）
    pub kind: Option<NodeKind>,
    /// 仅收藏
    pub favorites_only: bool,
    /// 包含回收站
    pub include_trashed: bool,
    /// 限定范围（如某个共享空间 id）
    pub scope: Option<String>,
    /// 排序方式
    pub sort: SortOrder,
}

impl FilterKey {
    pub fn new(sort: SortOrder) -> Self {
        Self {
            kind: None,
            favorites_only: false,
            include_trashed: false,
            scope: None,
            sort,
        }
    }
}
