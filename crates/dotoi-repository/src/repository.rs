//! Task repository - volatile, thread-safe task storage.
//!
//! Concurrency pattern:
//! - `RwLock<Arc<Vec<SharedTask>>>` copy-on-write list. Reads clone the
//!   `Arc` and never block on each other; writes copy the list when a reader
//!   still holds the old snapshot, then swap.

use std::sync::{Arc, PoisonError, RwLock};

use dotoi_models::{SharedTask, Task, TaskId};
use tracing::{debug, info, warn};

use crate::filter::TaskFilter;

/// Storage operations needed by the task service.
///
/// Tasks are addressed by identity (their [`TaskId`]). There is no upsert:
/// replacing a task means deleting it and saving the new version.
pub trait TaskRepository: Send + Sync {
    /// Stores a task unless one with the same id is already present.
    ///
    /// Returns false, and logs a warning, for a duplicate.
    fn save(&self, task: SharedTask) -> bool;

    /// Removes the task with the same id.
    ///
    /// Returns false, and logs a warning, if no such task is stored.
    fn delete(&self, task: &Task) -> bool;

    /// Returns a snapshot of all stored tasks, in insertion order.
    ///
    /// Later saves and deletes do not affect the returned vector.
    fn find_all(&self) -> Vec<SharedTask>;

    /// Looks a task up by id.
    fn find_by_id(&self, id: &TaskId) -> Option<SharedTask> {
        self.find_all().into_iter().find(|t| t.id() == id)
    }

    /// Returns the stored tasks matching `filter`.
    fn find_matching(&self, filter: &TaskFilter) -> Vec<SharedTask> {
        self.find_all()
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    /// Returns the number of stored tasks.
    fn len(&self) -> usize {
        self.find_all().len()
    }

    /// Returns true if no task is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory repository. Contents are lost when it is dropped.
///
/// Optimised for reads: `find_all` and the filtering done by periodic
/// checks only clone an `Arc`.
pub struct InMemoryTaskRepository {
    tasks: RwLock<Arc<Vec<SharedTask>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        info!("task repository initialized");
        Self {
            tasks: RwLock::new(Arc::new(Vec::new())),
        }
    }

    fn snapshot(&self) -> Arc<Vec<SharedTask>> {
        let guard = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn save(&self, task: SharedTask) -> bool {
        let mut guard = self.tasks.write().unwrap_or_else(PoisonError::into_inner);

        if guard.iter().any(|t| t.id() == task.id()) {
            warn!(task_id = %task.id(), title = %task.title(), "attempted to add a redundant task");
            return false;
        }

        debug!(task_id = %task.id(), title = %task.title(), "saving task");
        Arc::make_mut(&mut *guard).push(task);
        true
    }

    fn delete(&self, task: &Task) -> bool {
        let mut guard = self.tasks.write().unwrap_or_else(PoisonError::into_inner);

        let Some(index) = guard.iter().position(|t| t.id() == task.id()) else {
            warn!(task_id = %task.id(), title = %task.title(), "attempted to delete a non-existing task");
            return false;
        };

        debug!(task_id = %task.id(), title = %task.title(), "deleting task");
        Arc::make_mut(&mut *guard).remove(index);
        true
    }

    fn find_all(&self) -> Vec<SharedTask> {
        debug!("fetching all tasks");
        Vec::clone(&self.snapshot())
    }

    fn find_by_id(&self, id: &TaskId) -> Option<SharedTask> {
        self.snapshot().iter().find(|t| t.id() == id).cloned()
    }

    fn find_matching(&self, filter: &TaskFilter) -> Vec<SharedTask> {
        self.snapshot()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.snapshot().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn make_task(title: &str) -> SharedTask {
        Arc::new(Task::builder(title).build().unwrap())
    }

    #[test]
    fn test_new_repository_is_empty() {
        let repository = InMemoryTaskRepository::new();
        assert!(repository.is_empty());
        assert!(repository.find_all().is_empty());
    }

    #[test]
    fn test_save_and_find() {
        let repository = InMemoryTaskRepository::new();
        let task = make_task("Pay rent");

        assert!(repository.save(Arc::clone(&task)));

        let found = repository.find_by_id(task.id()).unwrap();
        assert!(Arc::ptr_eq(&found, &task));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_save_duplicate_is_noop() {
        let repository = InMemoryTaskRepository::new();
        let task = make_task("Pay rent");

        assert!(repository.save(Arc::clone(&task)));
        assert!(!repository.save(Arc::clone(&task)));
        assert_eq!(repository.len(), 1);

        // Same id, different fields: still a duplicate.
        let edited = Arc::new(task.to_builder().description("edited").build().unwrap());
        assert!(!repository.save(edited));
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.find_all()[0].description(), "");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let repository = InMemoryTaskRepository::new();
        let stored = make_task("Stored");
        let missing = make_task("Missing");
        repository.save(Arc::clone(&stored));

        assert!(!repository.delete(&missing));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_delete_by_identity() {
        let repository = InMemoryTaskRepository::new();
        let task = make_task("Original");
        repository.save(Arc::clone(&task));

        let renamed = task.to_builder().description("renamed").build().unwrap();
        assert!(repository.delete(&renamed));
        assert!(repository.is_empty());
    }

    #[test]
    fn test_replace_by_delete_then_save() {
        let repository = InMemoryTaskRepository::new();
        let task = make_task("Draft");
        repository.save(Arc::clone(&task));

        let edited = Arc::new(task.to_builder().content("final").build().unwrap());
        repository.delete(&edited);
        repository.save(Arc::clone(&edited));

        let stored = repository.find_by_id(task.id()).unwrap();
        assert_eq!(stored.content(), "final");
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_find_all_is_snapshot() {
        let repository = InMemoryTaskRepository::new();
        let first = make_task("First");
        repository.save(Arc::clone(&first));

        let snapshot = repository.find_all();

        repository.save(make_task("Second"));
        repository.delete(&first);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title(), "First");
        assert_eq!(repository.find_all()[0].title(), "Second");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let repository = InMemoryTaskRepository::new();
        for title in ["a", "b", "c"] {
            repository.save(make_task(title));
        }

        let titles: Vec<_> = repository
            .find_all()
            .iter()
            .map(|t| t.title().to_string())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find_matching() {
        let repository = InMemoryTaskRepository::new();
        let done = make_task("Done");
        done.complete();
        repository.save(done);
        repository.save(make_task("Open"));

        let open = repository.find_matching(&TaskFilter::new().with_completed(false));
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].title(), "Open");
    }

    #[test]
    fn test_concurrent_saves_and_reads() {
        let repository = Arc::new(InMemoryTaskRepository::new());

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let repo = Arc::clone(&repository);
                thread::spawn(move || {
                    for j in 0..25 {
                        repo.save(make_task(&format!("task {i}-{j}")));
                    }
                })
            })
            .collect();

        let reader = {
            let repo = Arc::clone(&repository);
            thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = repo.find_all();
                    assert!(snapshot.len() <= 100);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(repository.len(), 100);
    }
}
