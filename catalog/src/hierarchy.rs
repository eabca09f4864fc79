//! Tag Hierarchy Store
//!
//! In-memory arena of tag nodes keyed by tag id. Each node keeps its parent
//! id and the ids of its children, so closure queries are iterative
//! id-following and never hold references between nodes.
//!
//! All reads take the read lock for the whole traversal, so a query sees the
//! forest as it was when the call started even while other callers insert.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{DomainError, DomainResult, Tag};

struct TagNode {
    tag: Arc<Tag>,
    children: Vec<i64>,
}

/// Forest of tag trees; zero or more roots
#[derive(Default)]
pub struct TagForest {
    nodes: RwLock<HashMap<i64, TagNode>>,
}

impl TagForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a forest from stored tags, in any order
    pub fn from_tags(tags: Vec<Tag>) -> DomainResult<Self> {
        let forest = Self::new();
        {
            let mut nodes = forest.write()?;
            for tag in &tags {
                nodes.insert(
                    tag.id,
                    TagNode {
                        tag: Arc::new(tag.clone()),
                        children: Vec::new(),
                    },
                );
            }
            for tag in &tags {
                if let Some(parent_id) = tag.parent_tag_id {
                    let parent = nodes.get_mut(&parent_id).ok_or_else(|| {
                        DomainError::Internal(format!(
                            "Tag {} references missing parent tag {}",
                            tag.id, parent_id
                        ))
                    })?;
                    parent.children.push(tag.id);
                }
            }
        }

        for tag in &tags {
            // A stored cycle would make every closure query loop
            forest.ancestors(tag.id)?;
        }
        Ok(forest)
    }

    /// Replace every node with those built from `tags`, in one swap
    pub fn reload(&self, tags: Vec<Tag>) -> DomainResult<()> {
        let fresh = Self::from_tags(tags)?;
        let nodes = fresh
            .nodes
            .into_inner()
            .map_err(|e| DomainError::Internal(format!("Tag hierarchy lock poisoned: {}", e)))?;
        *self.write()? = nodes;
        Ok(())
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<i64, TagNode>>> {
        self.nodes
            .read()
            .map_err(|e| DomainError::Internal(format!("Tag hierarchy lock poisoned: {}", e)))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<i64, TagNode>>> {
        self.nodes
            .write()
            .map_err(|e| DomainError::Internal(format!("Tag hierarchy lock poisoned: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.read().map(|nodes| nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: i64) -> bool {
        self.read().map(|nodes| nodes.contains_key(&id)).unwrap_or(false)
    }

    pub fn get(&self, id: i64) -> DomainResult<Arc<Tag>> {
        let nodes = self.read()?;
        nodes
            .get(&id)
            .map(|node| Arc::clone(&node.tag))
            .ok_or_else(|| tag_not_found(id))
    }

    /// Insert a node. Its parent, if any, must already be present.
    pub fn insert(&self, tag: Tag) -> DomainResult<Arc<Tag>> {
        let mut nodes = self.write()?;

        if nodes.contains_key(&tag.id) {
            return Err(DomainError::AlreadyExists(format!(
                "Tag {} is already part of the hierarchy",
                tag.id
            )));
        }
        if let Some(parent_id) = tag.parent_tag_id {
            if parent_id == tag.id {
                return Err(DomainError::InvalidInput(format!(
                    "Tag {} cannot be its own parent",
                    tag.id
                )));
            }
            let parent = nodes.get_mut(&parent_id).ok_or_else(|| tag_not_found(parent_id))?;
            parent.children.push(tag.id);
        }

        let id = tag.id;
        let tag = Arc::new(tag);
        nodes.insert(
            id,
            TagNode {
                tag: Arc::clone(&tag),
                children: Vec::new(),
            },
        );
        Ok(tag)
    }

    /// Replace the stored attributes of a node, moving it if the parent changed.
    ///
    /// Rejects a parent that is the node itself or one of its descendants.
    pub fn update(&self, tag: Tag) -> DomainResult<Arc<Tag>> {
        let mut nodes = self.write()?;

        let old_parent = nodes
            .get(&tag.id)
            .map(|node| node.tag.parent_tag_id)
            .ok_or_else(|| tag_not_found(tag.id))?;

        if tag.parent_tag_id != old_parent {
            if let Some(new_parent) = tag.parent_tag_id {
                if !nodes.contains_key(&new_parent) {
                    return Err(tag_not_found(new_parent));
                }
                if collect_descendants(&nodes, tag.id).contains(&new_parent) {
                    return Err(DomainError::InvalidInput(format!(
                        "Tag {} cannot be moved under its own descendant {}",
                        tag.id, new_parent
                    )));
                }
                if let Some(parent) = nodes.get_mut(&new_parent) {
                    parent.children.push(tag.id);
                }
            }
            if let Some(old) = old_parent.and_then(|id| nodes.get_mut(&id)) {
                old.children.retain(|child| *child != tag.id);
            }
        }

        let id = tag.id;
        let tag = Arc::new(tag);
        if let Some(node) = nodes.get_mut(&id) {
            node.tag = Arc::clone(&tag);
        }
        Ok(tag)
    }

    /// Remove a leaf node
    pub fn remove(&self, id: i64) -> DomainResult<Arc<Tag>> {
        let mut nodes = self.write()?;

        let node = nodes.get(&id).ok_or_else(|| tag_not_found(id))?;
        if !node.children.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "Tag {} has child tags and cannot be removed",
                id
            )));
        }
        let parent_id = node.tag.parent_tag_id;

        if let Some(parent) = parent_id.and_then(|pid| nodes.get_mut(&pid)) {
            parent.children.retain(|child| *child != id);
        }
        nodes
            .remove(&id)
            .map(|node| node.tag)
            .ok_or_else(|| tag_not_found(id))
    }

    /// The tag itself followed by every tag reachable through child edges
    pub fn descendants_and_self(&self, id: i64) -> DomainResult<Vec<Arc<Tag>>> {
        let nodes = self.read()?;
        if !nodes.contains_key(&id) {
            return Err(tag_not_found(id));
        }

        Ok(collect_descendants(&nodes, id)
            .into_iter()
            .filter_map(|tag_id| nodes.get(&tag_id).map(|node| Arc::clone(&node.tag)))
            .collect())
    }

    /// Parent chain of a tag, nearest first
    pub fn ancestors(&self, id: i64) -> DomainResult<Vec<Arc<Tag>>> {
        let nodes = self.read()?;
        let mut current = nodes.get(&id).ok_or_else(|| tag_not_found(id))?;

        let mut result = Vec::new();
        while let Some(parent_id) = current.tag.parent_tag_id {
            if parent_id == id || result.len() > nodes.len() {
                return Err(DomainError::Internal(format!(
                    "Tag {} is part of a parent cycle",
                    id
                )));
            }
            current = nodes.get(&parent_id).ok_or_else(|| tag_not_found(parent_id))?;
            result.push(Arc::clone(&current.tag));
        }
        Ok(result)
    }
}

/// Ids of `id` and all its descendants, in pre-order
fn collect_descendants(nodes: &HashMap<i64, TagNode>, id: i64) -> Vec<i64> {
    let mut result = Vec::new();
    let mut to_visit = vec![id];

    while let Some(current_id) = to_visit.pop() {
        result.push(current_id);
        if let Some(node) = nodes.get(&current_id) {
            // Reverse so children are visited in insertion order
            to_visit.extend(node.children.iter().rev().copied());
        }
    }
    result
}

fn tag_not_found(id: i64) -> DomainError {
    DomainError::NotFound(format!("Tag with id {} doesn't exist.", id))
}
