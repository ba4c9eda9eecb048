use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinSet};


/// Background work bound to the lifetime of one live body.
pub struct TaskScope {
    runtime: Handle,
    tasks: JoinSet<()>,
    cancel: watch::Sender<bool>,
}

/// Lets a task notice that its scope was cancelled before it touches anything the body owned.
#[derive(Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the scope is cancelled or gone.
    pub async fn cancelled(&mut self) {
        let _ = self.0.wait_for(|cancelled| *cancelled).await;
    }
}

impl TaskScope {
    pub fn new(runtime: Handle) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            runtime,
            tasks: JoinSet::new(),
            cancel,
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken(self.cancel.subscribe())
    }

    pub fn spawn<F, Fut>(&mut self, task: F) -> AbortHandle
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.reap();
        let future = task(self.token());
        self.tasks.spawn_on(future, &self.runtime)
    }

    fn reap(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    /// Tasks still running. Finished ones are reaped first.
    pub fn len(&mut self) -> usize {
        self.reap();
        self.tasks.len()
    }

    /// Flags every token, then aborts every task.
    pub fn cancel_all(mut self) {
        self.cancel.send_replace(true);
        self.tasks.abort_all();
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn cancel_flags_tokens() {
        let rt = runtime();
        let scope = TaskScope::new(rt.handle().clone());
        let token = scope.token();
        assert!(!token.is_cancelled());

        scope.cancel_all();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_aborts_running_tasks() {
        let rt = runtime();
        let mut scope = TaskScope::new(rt.handle().clone());
        let (guard, released) = oneshot::channel::<()>();

        scope.spawn(move |_token| async move {
            let _guard = guard;
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        assert_eq!(scope.len(), 1);

        scope.cancel_all();

        // The sender is dropped without sending once the task is torn down.
        assert!(rt.block_on(released).is_err());
    }

    #[test]
    fn finished_tasks_are_reaped() {
        let rt = runtime();
        let mut scope = TaskScope::new(rt.handle().clone());

        for _ in 0..1000 {
            scope.spawn(|_token| async {});
        }
        rt.block_on(async { tokio::time::sleep(Duration::from_millis(50)).await });
        assert_eq!(scope.len(), 0);

        scope.spawn(|mut token| async move { token.cancelled().await });
        assert_eq!(scope.len(), 1);
        scope.cancel_all();
    }

    #[test]
    fn tasks_can_wait_for_cancellation() {
        let rt = runtime();
        let mut scope = TaskScope::new(rt.handle().clone());
        let (done, finished) = oneshot::channel();

        scope.spawn(move |mut token| async move {
            token.cancelled().await;
            let _ = done.send(token.is_cancelled());
        });

        scope.cancel.send_replace(true);

        assert!(rt.block_on(finished).unwrap());
    }
}
