//! File-backed forum store.
//!
//! Layout under the data directory:
//!
//! - `posts.json`: every post and reply, flat, each reply pointing at its
//!   parent. Rewritten atomically on each change.
//! - `images/<image-id>`: attached image blobs.
//!
//! Public operations never return errors. Failures are logged and reported as
//! `false`, `None` or an empty list so callers decide how to tell the user.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};

use super::model::{
    Image, NewPost, PostArena, PostId, PostPatch, PostRecord, Thread, creation_order,
};
use super::quota::{DirectoryQuota, QuotaEstimator};
use super::{ForumError, ForumResult};
use crate::constants::FORUM_RETENTION_DAYS;

const POSTS_FILE: &str = "posts.json";
const IMAGES_DIR: &str = "images";

/// Identity of `posts.json` as last written or read. Every write replaces the
/// file through a rename, so the file id changes even when another session's
/// write keeps the same length within one timestamp tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
    file_id: u64,
}

impl Fingerprint {
    fn of(meta: &fs::Metadata) -> Self {
        Self {
            modified: meta.modified().ok(),
            len: meta.len(),
            file_id: file_id(meta),
        }
    }
}

#[cfg(unix)]
fn file_id(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn file_id(_meta: &fs::Metadata) -> u64 {
    0
}

pub struct ForumStore {
    root: PathBuf,
    quota: Box<dyn QuotaEstimator>,
    arena: PostArena,
    live: bool,
    seen: Option<Fingerprint>,
    seq: u64,
}

impl std::fmt::Debug for ForumStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForumStore")
            .field("root", &self.root)
            .field("posts", &self.arena.len())
            .field("live", &self.live)
            .finish()
    }
}

impl ForumStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_quota(root, DirectoryQuota::unlimited())
    }

    pub fn with_quota(root: impl Into<PathBuf>, quota: impl QuotaEstimator + 'static) -> Self {
        Self {
            root: root.into(),
            quota: Box::new(quota),
            arena: PostArena::default(),
            live: false,
            seen: None,
            seq: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_initialized(&self) -> bool {
        self.live
    }

    /// Create the directory layout and load existing posts.
    pub fn init(&mut self) -> bool {
        match self.try_init() {
            Ok(()) => {
                self.live = true;
                tracing::info!(
                    root = %self.root.display(),
                    posts = self.arena.len(),
                    "forum store ready"
                );
                true
            }
            Err(err) => {
                self.live = false;
                tracing::error!(error = %err, root = %self.root.display(), "forum store init failed");
                false
            }
        }
    }

    fn try_init(&mut self) -> ForumResult<()> {
        fs::create_dir_all(self.root.join(IMAGES_DIR))?;
        self.arena = self.read_arena()?;
        self.seen = self.fingerprint();
        Ok(())
    }

    /// Store a new top-level post, optionally with an image.
    pub fn add_post(&mut self, post: NewPost, image: Option<Image>) -> bool {
        let result = self.insert(post, None, image);
        self.report_write("add_post", result).is_some()
    }

    /// Attach a reply to any existing post or reply, at any depth. The reply
    /// joins the event of the node it answers.
    pub fn add_reply(&mut self, parent_id: &str, reply: NewPost, image: Option<Image>) -> bool {
        let result = self.insert(reply, Some(parent_id), image);
        self.report_write("add_reply", result).is_some()
    }

    /// Every thread for `event_id` with images inlined, oldest first.
    pub fn get_posts_by_event(&self, event_id: &str) -> Vec<Thread> {
        if !self.live {
            tracing::warn!(event_id, "get_posts_by_event on uninitialized store");
            return Vec::new();
        }
        let children = self.arena.children_index(event_id);
        let mut roots: Vec<&PostRecord> = self
            .arena
            .event_records(event_id)
            .into_iter()
            .filter(|record| !record.is_reply())
            .collect();
        roots.sort_by(|a, b| creation_order(a, b));
        roots
            .into_iter()
            .map(|root| self.assemble(root, &children))
            .collect()
    }

    fn assemble(
        &self,
        record: &PostRecord,
        children: &BTreeMap<&str, Vec<&PostRecord>>,
    ) -> Thread {
        let replies = children
            .get(record.id.as_str())
            .map(|kids| {
                kids.iter()
                    .map(|child| self.assemble(child, children))
                    .collect()
            })
            .unwrap_or_default();
        Thread {
            post: record.clone(),
            image: record.image_id.as_deref().and_then(|id| self.load_image(id)),
            replies,
        }
    }

    pub fn get_post_by_id(&self, id: &str) -> Option<PostRecord> {
        if !self.live {
            return None;
        }
        self.arena.get(id).cloned()
    }

    /// Apply `patch` to an existing post or reply. Returns `false` when the
    /// node does not exist or the write failed; nothing changes in that case.
    pub fn update_post(&mut self, id: &str, patch: PostPatch) -> bool {
        let result = self.try_update(id, |record| {
            patch.apply(record);
        });
        self.report_write("update_post", result).is_some()
    }

    /// Flip `username`'s upvote on a post or reply. Returns whether the user
    /// now upvotes the node, or `None` if the toggle could not be stored.
    pub fn toggle_upvote(&mut self, id: &str, username: &str) -> Option<bool> {
        let result = self.try_update(id, |record| record.toggle_upvote(username));
        self.report_write("toggle_upvote", result)
    }

    /// Purge posts past the retention window. See [`Self::cleanup_expired_at`].
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    /// Delete every node older than the retention window as of `now`,
    /// together with its whole reply subtree and any images they reference.
    /// Returns the number of removed nodes.
    pub fn cleanup_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        if !self.live {
            return 0;
        }
        let cutoff = now - Duration::days(FORUM_RETENTION_DAYS);
        let expired: Vec<PostId> = self
            .arena
            .records()
            .filter(|record| record.timestamp < cutoff)
            .map(|record| record.id.clone())
            .collect();
        if expired.is_empty() {
            return 0;
        }
        let mut removed = Vec::new();
        for id in expired {
            for victim in self.arena.subtree(&id) {
                if let Some(record) = self.arena.remove(&victim) {
                    removed.push(record);
                }
            }
        }
        if let Err(err) = self.persist() {
            tracing::error!(error = %err, "retention cleanup could not be persisted");
            for record in removed {
                self.arena.insert(record);
            }
            return 0;
        }
        for image_id in removed.iter().filter_map(|r| r.image_id.as_deref()) {
            self.remove_image(image_id);
        }
        tracing::info!(removed = removed.len(), %cutoff, "expired forum posts purged");
        removed.len()
    }

    /// Re-read `posts.json` when another process changed it since this store
    /// last read or wrote it. Returns whether the in-memory posts changed.
    pub fn reload_if_changed(&mut self) -> bool {
        if !self.live {
            return false;
        }
        let current = self.fingerprint();
        if current == self.seen {
            return false;
        }
        match self.read_arena() {
            Ok(arena) => {
                self.arena = arena;
                self.seen = current;
                tracing::debug!(posts = self.arena.len(), "forum store re-hydrated");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "forum store reload failed");
                false
            }
        }
    }

    fn insert(
        &mut self,
        post: NewPost,
        parent_id: Option<&str>,
        image: Option<Image>,
    ) -> ForumResult<PostId> {
        if !self.live {
            return Err(ForumError::NotInitialized);
        }
        // Another session may have written since; build on its state.
        self.reload_if_changed();
        let event_id = match parent_id {
            Some(parent) => self
                .arena
                .get(parent)
                .map(|record| record.event_id.clone())
                .ok_or_else(|| ForumError::NotFound(parent.to_string()))?,
            None => post.event_id,
        };
        // The image goes first so a stored post never references a missing blob.
        let image_id = match image {
            Some(image) => Some(self.store_image(&image)?),
            None => None,
        };
        let record = PostRecord {
            id: self.mint_id(""),
            event_id,
            parent_id: parent_id.map(str::to_string),
            text: post.text,
            image_id,
            username: post.username,
            timestamp: Utc::now(),
            upvotes: Default::default(),
        };
        let id = record.id.clone();
        self.arena.insert(record);
        if let Err(err) = self.persist() {
            if let Some(record) = self.arena.remove(&id)
                && let Some(image_id) = record.image_id
            {
                self.remove_image(&image_id);
            }
            return Err(err);
        }
        tracing::debug!(%id, parent = ?parent_id, "forum post stored");
        Ok(id)
    }

    fn try_update<T>(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut PostRecord) -> T,
    ) -> ForumResult<T> {
        if !self.live {
            return Err(ForumError::NotInitialized);
        }
        self.reload_if_changed();
        let record = self
            .arena
            .get_mut(id)
            .ok_or_else(|| ForumError::NotFound(id.to_string()))?;
        let before = record.clone();
        let out = change(record);
        if let Err(err) = self.persist() {
            self.arena.insert(before);
            return Err(err);
        }
        Ok(out)
    }

    fn report_write<T>(&mut self, op: &'static str, result: ForumResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) if err.is_quota() => {
                tracing::warn!(op, error = %err, "forum write rejected, running retention cleanup");
                self.cleanup_expired();
                None
            }
            Err(err) => {
                tracing::warn!(op, error = %err, "forum write failed");
                None
            }
        }
    }

    fn store_image(&mut self, image: &Image) -> ForumResult<String> {
        let needed = image.len() as u64;
        if let Some(estimate) = self.quota.estimate(&self.root)
            && needed > estimate.available()
        {
            return Err(ForumError::QuotaExceeded {
                needed,
                available: estimate.available(),
            });
        }
        let id = self.mint_id("img-");
        let dir = self.root.join(IMAGES_DIR);
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&image.bytes)?;
        tmp.persist(dir.join(&id))?;
        Ok(id)
    }

    fn load_image(&self, id: &str) -> Option<Image> {
        match fs::read(self.image_path(id)) {
            Ok(bytes) => Some(Image::new(bytes)),
            Err(err) => {
                tracing::warn!(image_id = id, error = %err, "attached image unavailable");
                None
            }
        }
    }

    fn remove_image(&self, id: &str) {
        if let Err(err) = fs::remove_file(self.image_path(id)) {
            tracing::debug!(image_id = id, error = %err, "image blob not removed");
        }
    }

    fn image_path(&self, id: &str) -> PathBuf {
        self.root.join(IMAGES_DIR).join(id)
    }

    fn posts_path(&self) -> PathBuf {
        self.root.join(POSTS_FILE)
    }

    fn read_arena(&self) -> ForumResult<PostArena> {
        match fs::read(self.posts_path()) {
            Ok(bytes) => Ok(PostArena::from_json(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PostArena::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&mut self) -> ForumResult<()> {
        let bytes = self.arena.to_json()?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        // Taken from the handle so a write racing the rename is not adopted.
        let written = Fingerprint::of(&tmp.as_file().metadata()?);
        tmp.persist(self.posts_path())?;
        self.seen = Some(written);
        Ok(())
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        fs::metadata(self.posts_path())
            .ok()
            .map(|meta| Fingerprint::of(&meta))
    }

    /// Time-based id, zero padded so lexical order follows creation order.
    fn mint_id(&mut self, prefix: &str) -> String {
        loop {
            self.seq += 1;
            let id = format!(
                "{prefix}{:013}-{:06}",
                Utc::now().timestamp_millis(),
                self.seq
            );
            if !self.arena.contains(&id) {
                return id;
            }
        }
    }
}
