use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// A message that may belong to a multi-part group (an album).
pub trait GroupedMessage {
    /// Shared id of the group, `None` for standalone messages.
    fn group_id(&self) -> Option<&str>;
    /// Position within the group; batches are sorted by this, not by arrival.
    fn sequence(&self) -> i64;
}

/// What a single [`GroupAggregator::aggregate`] call produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Aggregation<M> {
    /// The message has no group id and is handed straight back.
    Ungrouped(M),
    /// The message joined a group another call is waiting on.
    Buffered,
    /// The debounce window closed; the whole group, sorted by sequence.
    Batch(Vec<M>),
    /// The group was swept as stale before its window closed.
    Expired,
}

impl<M> Aggregation<M> {
    pub fn into_batch(self) -> Option<Vec<M>> {
        match self {
            Self::Batch(members) => Some(members),
            _ => None,
        }
    }
}

struct MessageGroup<M> {
    members: Vec<M>,
    first_seen: Instant,
    generation: u64,
}

/// Collects messages sharing a group id for a fixed window, then releases
/// them as one ordered batch.
///
/// The call that opens a group waits out the window and receives the batch;
/// later members return [`Aggregation::Buffered`] immediately. The window is
/// not extended by late members. Groups older than `stale_after` are dropped
/// on the next arrival without being emitted.
pub struct GroupAggregator<M> {
    latency: Duration,
    stale_after: Duration,
    groups: Mutex<HashMap<String, MessageGroup<M>>>,
    next_generation: AtomicU64,
}

impl<M> GroupAggregator<M>
where
    M: GroupedMessage,
{
    pub fn new(latency: Duration, stale_after: Duration) -> Self {
        Self {
            latency,
            stale_after,
            groups: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub async fn aggregate(&self, message: M) -> Aggregation<M> {
        let now = Instant::now();
        let Some(group_id) = message.group_id().map(str::to_owned) else {
            self.sweep(&mut self.lock(), now);
            return Aggregation::Ungrouped(message);
        };

        let generation = {
            let mut groups = self.lock();
            self.sweep(&mut groups, now);
            if let Some(group) = groups.get_mut(&group_id) {
                group.members.push(message);
                tracing::debug!(group = %group_id, members = group.members.len(), "album member buffered");
                return Aggregation::Buffered;
            }
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            groups.insert(
                group_id.clone(),
                MessageGroup {
                    members: vec![message],
                    first_seen: now,
                    generation,
                },
            );
            tracing::debug!(group = %group_id, "album buffering started");
            generation
        };

        tokio::time::sleep(self.latency).await;

        let group = {
            let mut groups = self.lock();
            match groups.get(&group_id) {
                Some(group) if group.generation == generation => groups.remove(&group_id),
                _ => None,
            }
        };

        match group {
            Some(group) => {
                let mut members = group.members;
                members.sort_by_key(|m| m.sequence());
                tracing::info!(group = %group_id, members = members.len(), "album released");
                Aggregation::Batch(members)
            }
            None => {
                tracing::debug!(group = %group_id, "album expired before release");
                Aggregation::Expired
            }
        }
    }

    /// Whether a group with this id is currently buffering.
    pub fn is_buffering(&self, group_id: &str) -> bool {
        self.lock().contains_key(group_id)
    }

    pub fn buffered_groups(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MessageGroup<M>>> {
        self.groups
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn sweep(&self, groups: &mut HashMap<String, MessageGroup<M>>, now: Instant) {
        groups.retain(|group_id, group| {
            let keep = now.duration_since(group.first_seen) <= self.stale_after;
            if !keep {
                tracing::warn!(
                    group = %group_id,
                    members = group.members.len(),
                    "stale album dropped"
                );
            }
            keep
        });
    }
}
