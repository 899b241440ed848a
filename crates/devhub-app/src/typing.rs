//! Typing indicators, inbound and outbound.
//!
//! [`TypingIndicators`] tracks who else is typing in the open topic: every
//! `typing` event with `is_typing` refreshes the user's expiry, and a user who
//! stops sending events disappears after [`TYPING_INDICATOR_TTL`].
//!
//! [`TypingNotifier`] is the outbound half. It turns a stream of keystrokes
//! into at most one `typing(true)` per burst and one `typing(false)` once the
//! draft has been idle for [`TYPING_IDLE_TIMEOUT`].

use std::{ops::Sub, time::Duration};

use devhub_proto::TypingUpdate;

/// How long a remote user stays "typing" without a fresh event.
pub const TYPING_INDICATOR_TTL: Duration = Duration::from_secs(3);

/// Draft inactivity after which the local user stops "typing".
pub const TYPING_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// A user currently typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typist {
    /// User id.
    pub user_id: String,
    /// Display name, when the server sent one.
    pub name: Option<String>,
}

impl Typist {
    /// Name to show, falling back to the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }
}

#[derive(Debug, Clone)]
struct Entry<I> {
    typist: Typist,
    last_seen: I,
}

/// Remote users typing in one topic, in the order they started.
#[derive(Debug, Clone)]
pub struct TypingIndicators<I> {
    ttl: Duration,
    entries: Vec<Entry<I>>,
}

impl<I> Default for TypingIndicators<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> TypingIndicators<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Indicators with the default expiry.
    pub fn new() -> Self {
        Self::with_ttl(TYPING_INDICATOR_TTL)
    }

    /// Indicators with a custom expiry.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, entries: Vec::new() }
    }

    /// Apply a `typing` event. Returns whether the set of typists changed.
    ///
    /// Events without a user id are ignored.
    pub fn apply(&mut self, update: TypingUpdate, now: I) -> bool {
        let Some(user_id) = update.user_id else {
            tracing::debug!("typing event without user id");
            return false;
        };

        let position = self.entries.iter().position(|e| e.typist.user_id == user_id);

        match (update.is_typing, position) {
            (true, Some(index)) => {
                let entry = &mut self.entries[index];
                entry.last_seen = now;
                if update.name.is_some() && entry.typist.name != update.name {
                    entry.typist.name = update.name;
                    return true;
                }
                false
            },
            (true, None) => {
                let typist = Typist { user_id, name: update.name };
                self.entries.push(Entry { typist, last_seen: now });
                true
            },
            (false, Some(index)) => {
                self.entries.remove(index);
                true
            },
            (false, None) => false,
        }
    }

    /// Drop typists not refreshed within the expiry. Returns whether any
    /// were dropped.
    pub fn expire(&mut self, now: I) -> bool {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|e| now < e.last_seen || now - e.last_seen < ttl);
        self.entries.len() != before
    }

    /// Current typists.
    pub fn iter(&self) -> impl Iterator<Item = &Typist> {
        self.entries.iter().map(|e| &e.typist)
    }

    /// Whether `user_id` is typing.
    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.iter().any(|e| e.typist.user_id == user_id)
    }

    /// Number of typists.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is typing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everyone.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Outbound typing debounce for the local draft.
#[derive(Debug, Clone)]
pub struct TypingNotifier<I> {
    idle: Duration,
    last_input: Option<I>,
}

impl<I> Default for TypingNotifier<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> TypingNotifier<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Notifier with the default idle timeout.
    pub fn new() -> Self {
        Self::with_idle_timeout(TYPING_IDLE_TIMEOUT)
    }

    /// Notifier with a custom idle timeout.
    pub fn with_idle_timeout(idle: Duration) -> Self {
        Self { idle, last_input: None }
    }

    /// Record a keystroke. Returns `true` when this starts a burst and
    /// `typing(true)` should be sent.
    pub fn input(&mut self, now: I) -> bool {
        let started = self.last_input.is_none();
        self.last_input = Some(now);
        started
    }

    /// Returns `true` when the burst has been idle long enough that
    /// `typing(false)` should be sent.
    pub fn tick(&mut self, now: I) -> bool {
        match self.last_input {
            Some(last) if now >= last && now - last >= self.idle => {
                self.last_input = None;
                true
            },
            _ => false,
        }
    }

    /// End the burst on submit. Returns whether one was in progress.
    pub fn submit(&mut self) -> bool {
        self.last_input.take().is_some()
    }

    /// Whether a burst is in progress.
    pub fn is_typing(&self) -> bool {
        self.last_input.is_some()
    }
}
