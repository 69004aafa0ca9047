use crate::protocol::Message;
use serde_json::Value;

/// Minimum wall-clock spacing between outbound flushes.
///
/// Voice-platform channels behave best as low-frequency batched updates;
/// per-event sends would throttle or desync with speech timing.
pub const MIN_SEND_INTERVAL_MS: u64 = 1000;

/// The player's save data as the client sees it: an opaque object plus a
/// dirty flag. Mutations that skip [`PersistentData::mark_dirty`] are lost
/// on the next save cycle.
#[derive(Debug, Clone)]
pub struct PersistentData {
    data: Value,
    dirty: bool,
}

impl PersistentData {
    pub fn new(data: Value) -> Self {
        Self { data, dirty: false }
    }

    pub fn get(&self) -> &Value {
        &self.data
    }

    /// Mutable access for game logic; call [`Self::mark_dirty`] afterwards
    /// or the change will not be saved.
    pub fn get_mut(&mut self) -> &mut Value {
        &mut self.data
    }

    /// Replace the whole object, e.g. when the cloud copy arrives at connect.
    pub fn replace(&mut self, data: Value) {
        self.data = data;
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Default for PersistentData {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

/// Coalescing buffer for outbound message fragments.
///
/// Fragments queued between flushes merge into one pending frame
/// (last write wins per key, `transform` merged by sub-key). A flush is
/// produced at most once per [`MIN_SEND_INTERVAL_MS`], and also happens
/// with no pending fragment at all when save data is dirty.
#[derive(Debug)]
pub struct Outbox {
    pending: Option<Message>,
    last_send_ms: u64,
    min_interval_ms: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::with_interval(MIN_SEND_INTERVAL_MS)
    }

    pub fn with_interval(min_interval_ms: u64) -> Self {
        Self {
            pending: None,
            last_send_ms: 0,
            min_interval_ms,
        }
    }

    /// Merge a fragment into the pending message.
    pub fn queue_fragment(&mut self, frag: Message) {
        self.pending
            .get_or_insert_with(Message::default)
            .merge_fragment(frag);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Produce the next frame to send, if one is due.
    ///
    /// When the interval has elapsed and there is either a pending message
    /// or dirty save data, this returns the composed frame (with the save
    /// data attached and its dirty flag cleared), records the send time,
    /// and clears the pending message. Delivery is the caller's problem.
    pub fn flush_if_due(&mut self, now_ms: u64, persistence: &mut PersistentData) -> Option<Message> {
        if self.pending.is_none() && !persistence.is_dirty() {
            return None;
        }

        let elapsed = now_ms.saturating_sub(self.last_send_ms);
        if elapsed <= self.min_interval_ms {
            return None;
        }

        let mut msg = self.pending.take().unwrap_or_default();
        if persistence.is_dirty() {
            msg.persistent_data = Some(persistence.get().clone());
            persistence.dirty = false;
        }

        self.last_send_ms = now_ms;
        Some(msg)
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}
