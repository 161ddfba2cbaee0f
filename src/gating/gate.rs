use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use chrono::Utc;
use tokio::sync::watch;

use crate::apps::BlockedAppRegistry;
use crate::error::Result;
use crate::models::{BlockedApp, FocusEvent, GateSnapshot, Task, TaskId};
use crate::tasks::TaskStore;

use super::policy::{decide, Decision};

struct GateInner {
    tasks: Mutex<TaskStore>,
    registry: Mutex<BlockedAppRegistry>,
    revision: AtomicU64,
    changes: watch::Sender<GateSnapshot>,
}

/// Process-wide owner of the task store and app registry.
///
/// Each store sits behind its own mutex. Paths that need both take the task
/// lock first, then the registry lock. Every mutation is visible to the next
/// `evaluate` call as soon as it returns.
#[derive(Clone)]
pub struct Gate {
    inner: Arc<GateInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Gate {
    pub fn new(tasks: TaskStore, registry: BlockedAppRegistry) -> Self {
        let (changes, _) = watch::channel(tasks.snapshot());
        Self {
            inner: Arc::new(GateInner {
                tasks: Mutex::new(tasks),
                registry: Mutex::new(registry),
                revision: AtomicU64::new(0),
                changes,
            }),
        }
    }

    pub fn add_task(&self, title: &str, allowed_minutes: i64) -> Result<Task> {
        let mut tasks = lock(&self.inner.tasks);
        let task = tasks.add_task(title, allowed_minutes, Utc::now())?;
        self.publish(&tasks);
        Ok(task)
    }

    pub fn complete_task(&self, id: TaskId) -> Result<Task> {
        let mut tasks = lock(&self.inner.tasks);
        let task = tasks.complete_task(id, Utc::now())?;
        self.publish(&tasks);
        Ok(task)
    }

    pub fn remove_task(&self, id: TaskId) -> Result<Task> {
        let mut tasks = lock(&self.inner.tasks);
        let task = tasks.remove_task(id)?;
        self.publish(&tasks);
        Ok(task)
    }

    /// Toggles an app using the unlock state read under the same task lock,
    /// so a task added concurrently cannot slip in between check and write.
    pub fn toggle_selection(&self, package_identifier: &str) -> Result<BlockedApp> {
        let tasks = lock(&self.inner.tasks);
        let unlocked = tasks.is_unlocked();
        let app = lock(&self.inner.registry).toggle_selection(package_identifier, unlocked)?;
        self.publish(&tasks);
        Ok(app)
    }

    pub fn is_unlocked(&self) -> bool {
        lock(&self.inner.tasks).is_unlocked()
    }

    pub fn evaluate(&self, event: &FocusEvent) -> Decision {
        let tasks = lock(&self.inner.tasks);
        let registry = lock(&self.inner.registry);
        decide(event, tasks.is_unlocked(), &registry)
    }

    pub fn snapshot(&self) -> GateSnapshot {
        let tasks = lock(&self.inner.tasks);
        GateSnapshot {
            revision: self.inner.revision.load(Ordering::SeqCst),
            ..tasks.snapshot()
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.inner.tasks).tasks().to_vec()
    }

    pub fn apps(&self) -> Vec<BlockedApp> {
        lock(&self.inner.registry).list_apps().to_vec()
    }

    pub fn next_task_id(&self) -> TaskId {
        lock(&self.inner.tasks).next_id()
    }

    /// Change notifications for the UI; the value is the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<GateSnapshot> {
        self.inner.changes.subscribe()
    }

    fn publish(&self, tasks: &TaskStore) {
        let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.changes.send_replace(GateSnapshot {
            revision,
            ..tasks.snapshot()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::default_blocked_apps;
    use crate::error::GateError;
    use std::thread;

    const INSTAGRAM: &str = "com.instagram.android";

    fn gate() -> Gate {
        Gate::new(TaskStore::new(), BlockedAppRegistry::seeded(default_blocked_apps()))
    }

    #[test]
    fn scenario_incomplete_task_intercepts() {
        let gate = gate();
        gate.add_task("T1", 30).unwrap();
        let event = FocusEvent::foreground(INSTAGRAM);
        assert_eq!(gate.evaluate(&event), Decision::Intercept);
    }

    #[test]
    fn scenario_completing_task_allows_next_event() {
        let gate = gate();
        let task = gate.add_task("T1", 30).unwrap();
        let event = FocusEvent::foreground(INSTAGRAM);
        assert_eq!(gate.evaluate(&event), Decision::Intercept);

        gate.complete_task(task.id).unwrap();
        assert!(gate.is_unlocked());
        assert_eq!(gate.evaluate(&event), Decision::Allow);
    }

    #[test]
    fn scenario_empty_task_set_intercepts() {
        let gate = gate();
        for app in gate.apps() {
            let event = FocusEvent::foreground(app.package_identifier);
            assert_eq!(gate.evaluate(&event), Decision::Intercept);
        }
    }

    #[test]
    fn scenario_unregistered_app_allowed_while_locked() {
        let gate = gate();
        gate.add_task("T1", 30).unwrap();
        let event = FocusEvent::foreground("com.android.chrome");
        assert_eq!(gate.evaluate(&event), Decision::Allow);
    }

    #[test]
    fn scenario_toggle_rejected_with_partial_completion() {
        let gate = gate();
        let done = gate.add_task("T1", 30).unwrap();
        gate.add_task("T2", 30).unwrap();
        gate.complete_task(done.id).unwrap();

        assert_eq!(gate.toggle_selection(INSTAGRAM), Err(GateError::LockedState));
        assert!(gate.apps().iter().all(|app| !app.is_selected));
    }

    #[test]
    fn toggle_allowed_once_unlocked() {
        let gate = gate();
        let task = gate.add_task("T1", 30).unwrap();
        gate.complete_task(task.id).unwrap();

        let app = gate.toggle_selection(INSTAGRAM).unwrap();
        assert!(app.is_selected);
        assert!(gate.apps()[0].is_selected);
    }

    #[test]
    fn failed_mutations_publish_nothing() {
        let gate = gate();
        let rx = gate.subscribe();
        let _ = gate.add_task("", 10);
        let _ = gate.complete_task(3);
        let _ = gate.toggle_selection(INSTAGRAM);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(gate.snapshot().revision, 0);
    }

    #[test]
    fn subscribers_see_each_mutation() {
        let gate = gate();
        let mut rx = gate.subscribe();

        let task = gate.add_task("T1", 30).unwrap();
        assert!(rx.has_changed().unwrap());
        let snapshot = *rx.borrow_and_update();
        assert_eq!((snapshot.completed, snapshot.total, snapshot.unlocked), (0, 1, false));

        gate.complete_task(task.id).unwrap();
        let snapshot = *rx.borrow_and_update();
        assert_eq!((snapshot.completed, snapshot.total, snapshot.unlocked), (1, 1, true));
        assert_eq!(snapshot.revision, 2);
        assert_eq!(gate.snapshot(), snapshot);
    }

    #[test]
    fn completion_on_another_thread_is_visible_immediately() {
        let gate = gate();
        let ids: Vec<_> = (0..50)
            .map(|i| gate.add_task(&format!("task {i}"), 5).unwrap().id)
            .collect();

        let writer = {
            let gate = gate.clone();
            thread::spawn(move || {
                for id in ids {
                    gate.complete_task(id).unwrap();
                }
            })
        };

        let event = FocusEvent::foreground(INSTAGRAM);
        while !writer.is_finished() {
            let snapshot = gate.snapshot();
            assert!(snapshot.completed <= snapshot.total);
            let _ = gate.evaluate(&event);
        }
        writer.join().unwrap();

        assert_eq!(gate.evaluate(&event), Decision::Allow);
    }
}
