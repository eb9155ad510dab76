use crate::{SharedStore, StorageError, comments_key};
use chrono::{DateTime, Utc};
use orgraph_core::{Comment, NodeId, StructureType};
use serde::Deserialize;

/// Older clients stored comments as bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredComment {
    Full(Comment),
    Legacy(String),
}

/// Per-node annotations, persisted locally.
#[derive(Clone)]
pub struct CommentStore {
    kv: SharedStore,
    clock: fn() -> DateTime<Utc>,
}

impl CommentStore {
    pub fn new(kv: SharedStore) -> Self {
        Self { kv, clock: Utc::now }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn add_comment(
        &self,
        node: &NodeId,
        structure: StructureType,
        text: &str,
    ) -> Result<Comment, StorageError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StorageError::EmptyComment);
        }
        let mut comments = self.load_comments(node, structure);
        let comment = Comment::new(text, (self.clock)());
        comments.push(comment.clone());
        self.save_comments(node, structure, &comments)?;
        Ok(comment)
    }

    /// Flip `completed` on the comment at `index` and return it.
    pub fn toggle_comment(
        &self,
        node: &NodeId,
        structure: StructureType,
        index: usize,
    ) -> Result<Comment, StorageError> {
        let mut comments = self.load_comments(node, structure);
        let len = comments.len();
        let Some(comment) = comments.get_mut(index) else {
            return Err(StorageError::CommentIndex {
                node: node.clone(),
                index,
                len,
            });
        };
        comment.completed = !comment.completed;
        let toggled = comment.clone();
        self.save_comments(node, structure, &comments)?;
        Ok(toggled)
    }

    pub fn load_comments(&self, node: &NodeId, structure: StructureType) -> Vec<Comment> {
        let key = comments_key(structure, node);
        let blob = match self.kv.get(&key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read comments for {}: {}", node, e);
                return Vec::new();
            }
        };
        let stored = match serde_json::from_str::<Vec<StoredComment>>(&blob) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring corrupt comments for {}: {}", node, e);
                return Vec::new();
            }
        };

        let mut upgraded = false;
        let comments: Vec<Comment> = stored
            .into_iter()
            .map(|entry| match entry {
                StoredComment::Full(comment) => comment,
                StoredComment::Legacy(text) => {
                    upgraded = true;
                    Comment::new(text, (self.clock)())
                }
            })
            .collect();

        if upgraded && let Err(e) = self.save_comments(node, structure, &comments) {
            tracing::warn!("Failed to upgrade legacy comments for {}: {}", node, e);
        }
        comments
    }

    pub fn save_comments(
        &self,
        node: &NodeId,
        structure: StructureType,
        comments: &[Comment],
    ) -> Result<(), StorageError> {
        let blob = serde_json::to_string(comments)?;
        self.kv.set(&comments_key(structure, node), &blob)
    }
}

/// Combine an in-memory list with the persisted one. Persisted entries only
/// fill an empty in-memory list; a non-empty one is kept as is.
pub fn merge_comments(in_memory: Vec<Comment>, persisted: Vec<Comment>) -> Vec<Comment> {
    if in_memory.is_empty() {
        persisted
    } else {
        in_memory
    }
}
