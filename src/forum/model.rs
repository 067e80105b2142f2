use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PostId = String;

/// A post or reply as stored. Replies carry the id of the node they answer;
/// top-level posts have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub event_id: String,
    #[serde(default)]
    pub parent_id: Option<PostId>,
    pub text: String,
    #[serde(default)]
    pub image_id: Option<String>,
    pub username: String,
    pub timestamp: DateTime<Utc>,
    /// Usernames that upvoted this node. A name appears at most once.
    #[serde(default)]
    pub upvotes: BTreeSet<String>,
}

impl PostRecord {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn upvote_count(&self) -> usize {
        self.upvotes.len()
    }

    pub fn upvoted_by(&self, username: &str) -> bool {
        self.upvotes.contains(username)
    }

    /// Flip `username`'s upvote. Returns whether the user now upvotes.
    pub fn toggle_upvote(&mut self, username: &str) -> bool {
        if self.upvotes.remove(username) {
            false
        } else {
            self.upvotes.insert(username.to_string());
            true
        }
    }
}

/// User input for a new post or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub event_id: String,
    pub username: String,
    pub text: String,
}

impl NewPost {
    pub fn new(
        event_id: impl Into<String>,
        username: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            username: username.into(),
            text: text.into(),
        }
    }
}

/// An attached image blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Partial update applied by `ForumStore::update_post`. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub text: Option<String>,
    pub upvotes: Option<BTreeSet<String>>,
}

impl PostPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, record: &mut PostRecord) {
        if let Some(text) = self.text {
            record.text = text;
        }
        if let Some(upvotes) = self.upvotes {
            record.upvotes = upvotes;
        }
    }
}

/// A post with its image resolved and its replies assembled, recursively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub post: PostRecord,
    pub image: Option<Image>,
    pub replies: Vec<Thread>,
}

impl Thread {
    /// Depth-first walk yielding `(depth, node)`; the thread root has depth 0.
    pub fn walk(&self) -> Vec<(usize, &Thread)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for reply in node.replies.iter().rev() {
                stack.push((depth + 1, reply));
            }
        }
        out
    }

    /// Number of nodes below this one.
    pub fn reply_count(&self) -> usize {
        self.replies
            .iter()
            .map(|reply| 1 + reply.reply_count())
            .sum()
    }
}

/// Flat storage of every post and reply, keyed by id, with a secondary index
/// on event id.
#[derive(Debug, Clone, Default)]
pub struct PostArena {
    records: BTreeMap<PostId, PostRecord>,
    by_event: BTreeMap<String, BTreeSet<PostId>>,
}

#[derive(Serialize, Deserialize)]
struct ArenaFile {
    version: u32,
    posts: Vec<PostRecord>,
}

const ARENA_FILE_VERSION: u32 = 1;

impl PostArena {
    pub fn from_records(records: impl IntoIterator<Item = PostRecord>) -> Self {
        let mut arena = Self::default();
        for record in records {
            arena.insert(record);
        }
        arena
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        let file: ArenaFile = serde_json::from_slice(bytes)?;
        Ok(Self::from_records(file.posts))
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let file = ArenaFile {
            version: ARENA_FILE_VERSION,
            posts: self.records.values().cloned().collect(),
        };
        serde_json::to_vec_pretty(&file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PostRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PostRecord> {
        self.records.get_mut(id)
    }

    /// Insert or replace a record, keeping the event index in step.
    pub fn insert(&mut self, record: PostRecord) {
        self.remove(&record.id);
        self.by_event
            .entry(record.event_id.clone())
            .or_default()
            .insert(record.id.clone());
        self.records.insert(record.id.clone(), record);
    }

    pub fn remove(&mut self, id: &str) -> Option<PostRecord> {
        let record = self.records.remove(id)?;
        if let Some(ids) = self.by_event.get_mut(&record.event_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_event.remove(&record.event_id);
            }
        }
        Some(record)
    }

    /// Every record (posts and replies) attached to `event_id`.
    pub fn event_records(&self, event_id: &str) -> Vec<&PostRecord> {
        self.by_event
            .get(event_id)
            .map(|ids| ids.iter().filter_map(|id| self.records.get(id)).collect())
            .unwrap_or_default()
    }

    /// `id` and all of its descendants, parents before children. Each node
    /// is listed once even when a corrupt parent chain loops back on itself.
    pub fn subtree(&self, id: &str) -> Vec<PostId> {
        let Some(root) = self.records.get(id) else {
            return Vec::new();
        };
        let children = self.children_index(&root.event_id);
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut out = Vec::new();
        let mut queue = vec![root.id.as_str()];
        while let Some(next) = queue.pop() {
            if !visited.insert(next) {
                tracing::warn!(id = next, "reply chain loops back, skipping repeat");
                continue;
            }
            if let Some(kids) = children.get(next) {
                queue.extend(kids.iter().map(|r| r.id.as_str()));
            }
            out.push(next.to_string());
        }
        out
    }

    pub fn records(&self) -> impl Iterator<Item = &PostRecord> {
        self.records.values()
    }

    /// Parent id -> children for one event, each list in creation order.
    pub(crate) fn children_index(&self, event_id: &str) -> BTreeMap<&str, Vec<&PostRecord>> {
        let mut index: BTreeMap<&str, Vec<&PostRecord>> = BTreeMap::new();
        for record in self.event_records(event_id) {
            if let Some(parent) = record.parent_id.as_deref() {
                index.entry(parent).or_default().push(record);
            }
        }
        for children in index.values_mut() {
            children.sort_by(|a, b| creation_order(a, b));
        }
        index
    }
}

pub(crate) fn creation_order(a: &PostRecord, b: &PostRecord) -> std::cmp::Ordering {
    a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id))
}
