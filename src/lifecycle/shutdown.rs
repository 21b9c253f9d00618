//! Bounded shutdown of a running HTTP server.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::net::ConnectionTracker;

/// How long `stop` waits for connections to drain before forcing them closed.
pub const GRACE_PERIOD: Duration = Duration::from_millis(3000);

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every connection finished inside the grace period.
    Drained,
    /// The deadline passed; the server task and its connections were aborted.
    ForceClosed { open_connections: usize },
    /// The server task had already ended (error or panic).
    Exited,
}

/// Control handle for one spawned server task.
///
/// Dropping the handle aborts the task, so a drain whose future is cancelled
/// still tears down the listener and every connection it was waiting on.
pub struct Shutdown {
    trigger: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), std::io::Error>>,
    connections: ConnectionTracker,
}

impl Shutdown {
    pub fn new(
        trigger: oneshot::Sender<()>,
        task: JoinHandle<Result<(), std::io::Error>>,
        connections: ConnectionTracker,
    ) -> Self {
        Self {
            trigger: Some(trigger),
            task,
            connections,
        }
    }

    pub fn open_connections(&self) -> usize {
        self.connections.active_count()
    }

    /// Stop immediately without waiting. Used when the owner is dropped.
    pub fn abort(mut self) {
        if let Some(trigger) = self.trigger.take() {
            let _ = trigger.send(());
        }
        // Drop aborts the task.
    }

    /// Signal the server to stop accepting and wait at most `grace` for it
    /// to finish. Returns whichever happens first.
    pub async fn drain(mut self, grace: Duration) -> DrainOutcome {
        // Err means the server already dropped its receiver.
        let signalled = self
            .trigger
            .take()
            .is_some_and(|trigger| trigger.send(()).is_ok());

        match tokio::time::timeout(grace, &mut self.task).await {
            Ok(Ok(Ok(()))) if signalled => DrainOutcome::Drained,
            Ok(Ok(Ok(()))) => DrainOutcome::Exited,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "HTTP server exited with error");
                DrainOutcome::Exited
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "HTTP server task failed");
                DrainOutcome::Exited
            }
            Err(_) => DrainOutcome::ForceClosed {
                open_connections: self.connections.active_count(),
            },
        }
    }
}

impl Drop for Shutdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn cooperative_task_drains() {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _ = rx.await;
            Ok(())
        });

        let outcome = Shutdown::new(tx, task, ConnectionTracker::new())
            .drain(Duration::from_secs(1))
            .await;
        assert_eq!(outcome, DrainOutcome::Drained);
    }

    #[tokio::test]
    async fn hung_task_is_force_closed_at_deadline() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();
        let (tx, _rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<Result<(), std::io::Error>>().await
        });

        let started = Instant::now();
        let outcome = Shutdown::new(tx, task, tracker.clone())
            .drain(Duration::from_millis(200))
            .await;

        assert_eq!(outcome, DrainOutcome::ForceClosed { open_connections: 1 });
        assert!(started.elapsed() < Duration::from_millis(700));

        // Abort lands at the next poll; the guard goes with the task.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn already_exited_task() {
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            drop(rx);
            Err(std::io::Error::other("accept loop died"))
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let outcome = Shutdown::new(tx, task, ConnectionTracker::new())
            .drain(Duration::from_secs(1))
            .await;
        assert_eq!(outcome, DrainOutcome::Exited);
    }

    #[tokio::test]
    async fn dropping_the_handle_aborts_the_task() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();
        let (tx, _rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<Result<(), std::io::Error>>().await
        });

        drop(Shutdown::new(tx, task, tracker.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_drain_still_aborts_the_task() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();
        let (tx, _rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<Result<(), std::io::Error>>().await
        });

        let shutdown = Shutdown::new(tx, task, tracker.clone());
        let cancelled =
            tokio::time::timeout(Duration::from_millis(50), shutdown.drain(Duration::from_secs(10)))
                .await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tracker.active_count(), 0);
    }
}
