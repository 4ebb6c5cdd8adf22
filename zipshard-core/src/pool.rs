use crate::error::{Result, ShardError};
use std::sync::mpsc;

/// Bounded pool of OS threads. Tasks are queued all at once, each reports
/// through its own slot on a results channel, and `run` returns only after
/// every task has finished.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("zipshard-worker-{i}"))
            .build()
            .map_err(|e| ShardError::Io(std::io::Error::other(e)))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `f` over every task and returns the outcomes in task order.
    /// Failures do not cancel siblings: the queue is always drained.
    pub fn run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Vec<Result<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Sync,
    {
        let n = tasks.len();
        let (tx, rx) = mpsc::channel::<(usize, Result<R>)>();
        let f = &f;

        self.pool.scope(move |s| {
            for (i, task) in tasks.into_iter().enumerate() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    // receiver outlives the scope
                    let _ = tx.send((i, f(task)));
                });
            }
        });

        let mut slots: Vec<Option<Result<R>>> = (0..n).map(|_| None).collect();
        for (i, out) in rx.try_iter() {
            slots[i] = Some(out);
        }
        slots
            .into_iter()
            .map(|s| {
                s.unwrap_or_else(|| {
                    Err(ShardError::Io(std::io::Error::other("worker dropped its result")))
                })
            })
            .collect()
    }

    /// Like [`run`](Self::run) but fails with the first error in task order
    /// once all tasks are done.
    pub fn try_run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Sync,
    {
        self.run(tasks, f).into_iter().collect()
    }
}
