use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = HashMap<Uuid, Arc<AsyncMutex<()>>>;

/// One async lock per teacher.
///
/// Holding the guard makes check-then-commit atomic for that teacher within
/// this process. A teacher's lock is created on first use and removed when
/// the last holder or waiter lets go of it.
#[derive(Default)]
pub struct TeacherLocks {
    locks: Mutex<LockMap>,
}

impl TeacherLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `teacher_id`'s timeline.
    pub async fn acquire(&self, teacher_id: Uuid) -> TeacherGuard<'_> {
        let lock = self.map().entry(teacher_id).or_default().clone();
        let guard = lock.lock_owned().await;
        TeacherGuard {
            locks: self,
            teacher_id,
            guard: Some(guard),
        }
    }

    /// Number of teachers with a live lock.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map is only touched in short synchronous sections, so a poisoned
    // mutex still holds a consistent map.
    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive access to one teacher's timeline. Released on drop.
pub struct TeacherGuard<'a> {
    locks: &'a TeacherLocks,
    teacher_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TeacherGuard<'_> {
    fn drop(&mut self) {
        // Waiters clone the lock under the map mutex, so a count of one here
        // means nobody else can be waiting for it.
        let mut locks = self.locks.map();
        self.guard.take();
        if locks
            .get(&self.teacher_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.teacher_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_teacher_is_exclusive() {
        let locks = TeacherLocks::new();
        let teacher_id = Uuid::new_v4();

        let _guard = locks.acquire(teacher_id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(teacher_id)).await;

        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_different_teachers_do_not_block() {
        let locks = TeacherLocks::new();

        let _first = locks.acquire(Uuid::new_v4()).await;
        let second =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;

        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_lock_is_released_on_drop() {
        let locks = TeacherLocks::new();
        let teacher_id = Uuid::new_v4();

        drop(locks.acquire(teacher_id).await);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.acquire(teacher_id)).await;

        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = TeacherLocks::new();

        let first = locks.acquire(Uuid::new_v4()).await;
        let second = locks.acquire(Uuid::new_v4()).await;
        assert_eq!(locks.len(), 2);

        drop(first);
        drop(second);

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_with_waiter_is_kept() {
        let locks = Arc::new(TeacherLocks::new());
        let teacher_id = Uuid::new_v4();
        let guard = locks.acquire(teacher_id).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(teacher_id).await;
            })
        };
        while Arc::strong_count(&locks.map()[&teacher_id]) < 2 {
            tokio::task::yield_now().await;
        }

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
