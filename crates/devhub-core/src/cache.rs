//! Ordered id-keyed cache containers.
//!
//! A [`Cache`] holds the latest known server state for one view. Insertion
//! order is display order. `update` and `remove` never reorder the survivors,
//! and `add` never overwrites: the first write of an id wins until an explicit
//! `update`.
//!
//! Caches are never persisted and never fail. Absent ids are silent no-ops.

use devhub_proto::entities::{
    Message, MessagePatch, Notification, NotificationPatch, Project, ProjectPatch, Workspace,
    WorkspacePatch,
};
use indexmap::IndexMap;

/// An entity with a stable id and a partial-update type.
pub trait Entity: Clone {
    /// Partial update: every field optional, present fields replace.
    type Patch;

    /// Stable identifier.
    fn id(&self) -> &str;

    /// Shallow-merge `patch` into `self`.
    fn apply(&mut self, patch: Self::Patch);
}

/// Ordered id → entity container.
#[derive(Debug, Clone)]
pub struct Cache<E: Entity> {
    entries: IndexMap<String, E>,
}

impl<E: Entity> Default for Cache<E> {
    fn default() -> Self {
        Self { entries: IndexMap::new() }
    }
}

impl<E: Entity> Cache<E> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole contents. Later duplicates of an id are dropped.
    pub fn set_all(&mut self, entities: impl IntoIterator<Item = E>) {
        self.entries.clear();
        for entity in entities {
            self.add(entity);
        }
    }

    /// Append `entity` unless its id is already present.
    ///
    /// Returns `false` (and changes nothing) on collision.
    pub fn add(&mut self, entity: E) -> bool {
        if self.entries.contains_key(entity.id()) {
            tracing::trace!(id = entity.id(), "duplicate add ignored");
            return false;
        }
        self.entries.insert(entity.id().to_string(), entity);
        true
    }

    /// Merge `patch` into the entity with `id`. Returns `false` if absent.
    pub fn update(&mut self, id: &str, patch: E::Patch) -> bool {
        match self.entries.get_mut(id) {
            Some(entity) => {
                entity.apply(patch);
                true
            },
            None => false,
        }
    }

    /// Remove by id, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<E> {
        self.entries.shift_remove(id)
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entity with `id`.
    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.get(id)
    }

    /// Whether `id` is cached.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Entities in display order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &E> + ExactSizeIterator {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.values_mut()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Owned snapshot in display order.
    pub fn to_vec(&self) -> Vec<E> {
        self.entries.values().cloned().collect()
    }
}

impl<E: Entity> FromIterator<E> for Cache<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        let mut cache = Self::new();
        cache.set_all(iter);
        cache
    }
}

macro_rules! merge {
    ($target:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    };
}

macro_rules! merge_optional {
    ($target:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

impl Entity for Message {
    type Patch = MessagePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: MessagePatch) {
        merge!(self, patch; topic_id, content, kind, created_at, updated_at);
        merge_optional!(self, patch; user_id, metadata, parent_id, user, reactions);
    }
}

impl Entity for Notification {
    type Patch = NotificationPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: NotificationPatch) {
        merge!(self, patch; title, body, is_read);
        merge_optional!(self, patch; link, read_at);
    }
}

impl Entity for Project {
    type Patch = ProjectPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: ProjectPatch) {
        merge!(self, patch; name, notifications_muted, updated_at);
        merge_optional!(self, patch; description, avatar_url, access_level, visibility);
    }
}

impl Entity for Workspace {
    type Patch = WorkspacePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: WorkspacePatch) {
        merge!(self, patch; name);
        merge_optional!(self, patch; description);
    }
}
