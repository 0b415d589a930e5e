//! Typed publish/subscribe registry with group-wise suspension.
//!
//! Listeners are keyed by (event kind, subscriber group). The two groups map
//! to the two consumer classes of fetched task state: a live display surface
//! and the file-sync path. Suspending a group around a bulk operation is what
//! keeps a sync from re-triggering itself through its own side effects.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use habitica::{Task, TaskCategory};

/// Category-scoped event kinds fanned out after a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Habits,
    Dailies,
    Todos,
}

impl EventKind {
    /// Every event kind the hub knows about.
    pub const ALL: [Self; 3] = [Self::Habits, Self::Dailies, Self::Todos];

    /// Fixed category → event mapping. Rewards and completed todos have no
    /// event kind and are skipped by the fan-out.
    #[must_use]
    pub const fn for_category(category: TaskCategory) -> Option<Self> {
        match category {
            TaskCategory::Habit => Some(Self::Habits),
            TaskCategory::Daily => Some(Self::Dailies),
            TaskCategory::Todo => Some(Self::Todos),
            TaskCategory::Reward | TaskCategory::CompletedTodo | TaskCategory::Unknown => None,
        }
    }
}

/// Consumer classes whose listeners can be suspended as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriberGroup {
    /// Live display surface
    Panel,
    /// Note reconciliation path
    FileSync,
}

/// Handle returned by [`EventHub::subscribe`]; closures have no identity of
/// their own, so membership is tracked by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&[Task]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    listeners: HashMap<(EventKind, SubscriberGroup), BTreeMap<ListenerId, Listener>>,
    next_id: u64,
}

/// Listener registry. All mutation goes through the inner lock; `emit` clones
/// the relevant listeners out of the lock before invoking them, so a listener
/// may itself subscribe or unsubscribe.
#[derive(Default)]
pub struct EventHub {
    inner: Mutex<Registry>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one (event, group) slot.
    pub fn subscribe<F>(&self, event: EventKind, group: SubscriberGroup, listener: F) -> ListenerId
    where
        F: Fn(&[Task]) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock().expect("event registry poisoned");
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry
            .listeners
            .entry((event, group))
            .or_default()
            .insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener. Removing an id that is absent (or already removed)
    /// is a no-op.
    pub fn unsubscribe(&self, event: EventKind, group: SubscriberGroup, id: ListenerId) {
        let mut registry = self.inner.lock().expect("event registry poisoned");
        if let Some(slot) = registry.listeners.get_mut(&(event, group)) {
            slot.remove(&id);
        }
    }

    /// Invoke every listener registered for `event` across all groups,
    /// synchronously. A panicking listener aborts the batch; there is no
    /// isolation between listeners.
    pub fn emit(&self, event: EventKind, tasks: &[Task]) {
        let listeners: Vec<Listener> = {
            let registry = self.inner.lock().expect("event registry poisoned");
            registry
                .listeners
                .iter()
                .filter(|((kind, _), _)| *kind == event)
                .flat_map(|(_, slot)| slot.values().cloned())
                .collect()
        };
        for listener in listeners {
            listener(tasks);
        }
    }

    /// Partition `tasks` by category and emit one event per category present
    /// that has an event kind; the rest are silently skipped.
    pub fn emit_by_category(&self, tasks: &[Task]) {
        for event in EventKind::ALL {
            let bucket: Vec<Task> = tasks
                .iter()
                .filter(|task| EventKind::for_category(task.category) == Some(event))
                .cloned()
                .collect();
            if !bucket.is_empty() {
                self.emit(event, &bucket);
            }
        }
    }

    /// Run `fut` with the (event, group) listeners detached, then reattach
    /// exactly the detached set. Listeners added inside the window keep their
    /// registration but are not part of the snapshot; listeners removed
    /// inside the window come back with it.
    pub async fn run_suspended<F>(
        &self,
        event: EventKind,
        group: SubscriberGroup,
        fut: F,
    ) -> F::Output
    where
        F: Future,
    {
        let snapshot = self.detach(&[(event, group)]);
        let output = fut.await;
        self.reattach(snapshot);
        output
    }

    /// Run `fut` with the whole group silenced across every event kind.
    pub async fn run_all_suspended<F>(&self, group: SubscriberGroup, fut: F) -> F::Output
    where
        F: Future,
    {
        let slots: Vec<(EventKind, SubscriberGroup)> =
            EventKind::ALL.iter().map(|&event| (event, group)).collect();
        let snapshot = self.detach(&slots);
        let output = fut.await;
        self.reattach(snapshot);
        output
    }

    fn detach(&self, slots: &[(EventKind, SubscriberGroup)]) -> Snapshot {
        let mut registry = self.inner.lock().expect("event registry poisoned");
        slots
            .iter()
            .filter_map(|slot| {
                let detached = registry.listeners.remove(slot)?;
                Some((*slot, detached))
            })
            .collect()
    }

    fn reattach(&self, snapshot: Snapshot) {
        let mut registry = self.inner.lock().expect("event registry poisoned");
        for (slot, detached) in snapshot {
            registry.listeners.entry(slot).or_default().extend(detached);
        }
    }
}

type Snapshot = Vec<((EventKind, SubscriberGroup), BTreeMap<ListenerId, Listener>)>;
