//! Recursive enumeration of a subtree

use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::error::{ItemError, ItemResult};
use crate::item::{Info, Item};
use crate::session::Session;

/// One node of an enumerated subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.info.name == name)
    }
}

/// Enumerate `item` and everything below it
///
/// Directories are listed; files and non-listable nodes are leaves. A
/// directory more than `max_depth` levels below `item` is an error.
pub async fn walk_tree(item: &dyn Item, session: &Session, max_depth: usize) -> ItemResult<TreeNode> {
    boxed_walk(item, session, max_depth).await
}

fn boxed_walk<'a>(
    item: &'a dyn Item,
    session: &'a Session,
    depth_left: usize,
) -> Pin<Box<dyn Future<Output = ItemResult<TreeNode>> + Send + 'a>> {
    Box::pin(async move {
        let info = item.info(session).await?;
        if !info.kind.is_dir() {
            return Ok(TreeNode {
                info,
                children: Vec::new(),
            });
        }
        if depth_left == 0 {
            return Err(ItemError::invalid_operation(format!(
                "{}: tree too deep",
                info.name
            )));
        }

        let mut children = Vec::new();
        for child in item.list_content(session).await? {
            children.push(boxed_walk(child.as_ref(), session, depth_left - 1).await?);
        }
        Ok(TreeNode { info, children })
    })
}
