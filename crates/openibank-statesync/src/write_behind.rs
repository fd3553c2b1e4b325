//! Debounced, serialized, crash-tolerant writes.
//!
//! `AsyncSerialQueue` and `WriteBuffer` are the two primitives the flush
//! protocol is built from. Neither understands IPNS or merging — they
//! only guarantee "at most one blocking save runs at a time" and "the most
//! recent staged write survives a failed attempt". The actual blocking
//! save (`_doSave`: upload, sign, publish, commit chain state) is supplied
//! by `crate::provider::StateSyncProvider` as a closure, keeping this
//! module's responsibility narrow the way `resonancex-trading-bot`
//! separates its scheduling loop from the strategy callback it drives.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::document::TxfData;
use crate::error::StateSyncResult;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Ensures at most one async operation runs at a time, without queueing
/// unbounded work behind it. A rejected [`AsyncSerialQueue::try_run`] is
/// not an error: the caller's debounce timer (or the next `save()`) will
/// simply try again later, so a momentarily busy queue never breaks the
/// write chain.
pub struct AsyncSerialQueue {
    lock: Mutex<()>,
}

impl AsyncSerialQueue {
    pub fn new() -> Self {
        Self { lock: Mutex::new(()) }
    }

    /// Run `f` if the queue is free; otherwise return `None` immediately.
    pub async fn try_run<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.lock.try_lock() {
            Ok(_guard) => Some(f().await),
            Err(_) => None,
        }
    }

    /// Run `f`, waiting for any in-flight operation to finish first. Used
    /// where skipping is not acceptable (`shutdown`, `sync`).
    pub async fn run_exclusive<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        f().await
    }
}

impl Default for AsyncSerialQueue {
    fn default() -> Self {
        Self::new()
    }
}

struct Staged {
    doc: TxfData,
    staged_at: i64,
}

/// A single staging cell holding the most recent not-yet-persisted
/// document. `merge_from` is newer-wins: used to roll a failed flush
/// attempt back in without clobbering a write that was staged while that
/// attempt was in flight.
pub struct WriteBuffer {
    slot: Mutex<Option<Staged>>,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.lock().await.is_none()
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }

    /// Unconditionally stage `doc`, timestamped `at` (use [`now_millis`]
    /// semantics: larger means newer).
    pub async fn stage(&self, doc: TxfData, at: i64) {
        *self.slot.lock().await = Some(Staged { doc, staged_at: at });
    }

    /// Stage `doc` only if nothing newer is already staged.
    pub async fn merge_from(&self, doc: TxfData, at: i64) {
        let mut slot = self.slot.lock().await;
        let should_replace = match slot.as_ref() {
            Some(existing) => at >= existing.staged_at,
            None => true,
        };
        if should_replace {
            *slot = Some(Staged { doc, staged_at: at });
        }
    }

    /// Remove and return the staged document, leaving the buffer empty.
    pub async fn take(&self) -> Option<TxfData> {
        self.slot.lock().await.take().map(|s| s.doc)
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The blocking save operation (`_doSave`): upload, sign, publish, commit
/// chain state. Supplied by the provider; returns the document as actually
/// persisted (merges may have happened upstream of this call).
pub type DoSave =
    Arc<dyn Fn(TxfData) -> Pin<Box<dyn Future<Output = StateSyncResult<TxfData>> + Send>> + Send + Sync>;

/// Debounced write-behind coordinator. `save()` stages a document and
/// returns immediately; a background timer calls `execute_flush` once the
/// debounce window elapses.
pub struct WriteBehind {
    buffer: WriteBuffer,
    queue: AsyncSerialQueue,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    do_save: DoSave,
}

impl WriteBehind {
    pub fn new(debounce: Duration, do_save: DoSave) -> Arc<Self> {
        Arc::new(Self {
            buffer: WriteBuffer::new(),
            queue: AsyncSerialQueue::new(),
            debounce,
            timer: Mutex::new(None),
            do_save,
        })
    }

    /// Stage `doc` and (re)start the debounce timer. No I/O happens here.
    pub async fn save(self: &Arc<Self>, doc: TxfData) {
        self.buffer.stage(doc, now_millis()).await;
        self.reschedule().await;
    }

    async fn reschedule(self: &Arc<Self>) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        let this = Arc::clone(self);
        let debounce = self.debounce;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            this.execute_flush().await;
        }));
    }

    /// Swap the buffer and attempt one blocking save. On failure, the
    /// document is rolled back into the buffer (newer-wins against
    /// whatever staged while the attempt was in flight) and the debounce
    /// timer is restarted.
    pub async fn execute_flush(self: &Arc<Self>) {
        let ran = self
            .queue
            .try_run(|| async {
                let Some(doc) = self.buffer.take().await else {
                    return;
                };
                if let Err(err) = (self.do_save)(doc.clone()).await {
                    tracing::warn!(error = %err, "[statesync] flush attempt failed, rolling back");
                    self.buffer.merge_from(doc, now_millis()).await;
                    self.reschedule().await;
                }
            })
            .await;
        if ran.is_none() {
            tracing::debug!("[statesync] flush already in progress, skipping");
        }
    }

    /// Cancel the debounce timer and hand back the staged document (if
    /// any), leaving the buffer empty. Used by `Provider::sync` to fold a
    /// pending local write into a remote-driven merge before saving it.
    pub async fn take_staged(&self) -> Option<TxfData> {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
        self.buffer.take().await
    }

    /// Run `_doSave` directly, without acquiring the serial queue. For
    /// callers that already hold the queue's exclusivity (`Provider::sync`
    /// runs its whole merge-then-save sequence inside one
    /// [`WriteBehind::run_exclusive`] call) — going through `force_save`
    /// there would deadlock on the non-reentrant queue mutex.
    pub async fn call_do_save(&self, doc: TxfData) -> StateSyncResult<TxfData> {
        (self.do_save)(doc).await
    }

    /// Run `doc` through `_doSave` immediately, waiting for any in-flight
    /// flush to finish first. Used after `take_staged` to persist a merge
    /// result, and by `shutdown` for the final drain.
    pub async fn force_save(&self, doc: TxfData) -> StateSyncResult<TxfData> {
        self.queue.run_exclusive(|| self.call_do_save(doc)).await
    }

    /// Run an arbitrary operation with the same exclusivity `force_save`
    /// uses, without necessarily calling `_doSave` at all. `Provider::sync`
    /// uses this to run its whole load-merge-save sequence as one
    /// serialized unit (spec §5, "Save→Sync ordering").
    pub async fn run_exclusive<F, Fut, R>(&self, f: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.queue.run_exclusive(f).await
    }

    /// Drain any staged write with one final blocking attempt. Errors are
    /// logged, not propagated — there is nowhere left to report them by
    /// the time shutdown runs.
    pub async fn shutdown(self: &Arc<Self>) {
        let staged = self.take_staged().await;
        if let Some(doc) = staged {
            if let Err(err) = self.force_save(doc).await {
                tracing::warn!(error = %err, "[statesync] shutdown drain failed, staged write lost");
            }
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.buffer.is_empty().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TxfData;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn doc(version: u64) -> TxfData {
        let mut d = TxfData::new("0xabc");
        d.meta.version = version;
        d
    }

    fn counting_save(calls: Arc<AtomicU32>) -> DoSave {
        Arc::new(move |doc: TxfData| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(doc)
            })
        })
    }

    fn failing_then_succeeding_save(calls: Arc<AtomicU32>) -> DoSave {
        Arc::new(move |doc: TxfData| {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(crate::error::StateSyncError::UploadFailed { attempted: 1 })
                } else {
                    Ok(doc)
                }
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn save_returns_immediately_without_flushing() {
        let calls = Arc::new(AtomicU32::new(0));
        let wb = WriteBehind::new(Duration::from_secs(2), counting_save(calls.clone()));
        wb.save(doc(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!wb.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_flush_runs_after_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let wb = WriteBehind::new(Duration::from_secs(2), counting_save(calls.clone()));
        wb.save(doc(1)).await;

        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(wb.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_saves_within_window_coalesce_to_one_flush() {
        let calls = Arc::new(AtomicU32::new(0));
        let wb = WriteBehind::new(Duration::from_secs(2), counting_save(calls.clone()));
        wb.save(doc(1)).await;
        tokio::time::advance(Duration::from_millis(500)).await;
        wb.save(doc(2)).await;
        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_flush_rolls_back_and_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let wb = WriteBehind::new(Duration::from_secs(2), failing_then_succeeding_save(calls.clone()));
        wb.save(doc(1)).await;

        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!wb.is_empty().await, "failed write should roll back into the buffer");

        tokio::time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(wb.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_staged_write() {
        let calls = Arc::new(AtomicU32::new(0));
        let wb = WriteBehind::new(Duration::from_secs(2), counting_save(calls.clone()));
        wb.save(doc(1)).await;
        wb.shutdown().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn write_buffer_merge_from_is_newer_wins() {
        let buf = WriteBuffer::new();
        buf.stage(doc(1), 100).await;
        buf.merge_from(doc(2), 50).await;
        let staged = buf.take().await.unwrap();
        assert_eq!(staged.meta.version, 1, "older merge_from must not clobber a newer stage");
    }

    #[tokio::test]
    async fn serial_queue_rejects_concurrent_attempt() {
        let queue = Arc::new(AsyncSerialQueue::new());
        let q2 = queue.clone();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let holder = tokio::spawn(async move {
            queue
                .try_run(|| async {
                    let _ = rx.await;
                })
                .await
        });
        tokio::task::yield_now().await;

        let rejected = q2.try_run(|| async {}).await;
        assert_eq!(rejected, None);

        let _ = tx.send(());
        holder.await.unwrap();
    }
}
