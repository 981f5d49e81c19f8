use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};
use tokio::{
    sync::mpsc::UnboundedReceiver,
    time::{sleep_until, Instant},
};

use crate::{
    debounce::{DebouncePolicy, Debouncer},
    render::RenderPlan,
};

/// Notifications from the host that should lead to a fresh render plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostSignal {
    /// The open document's content changed.
    DocumentChanged,
    /// A different document became active, or the active one was opened or closed.
    ActiveDocumentChanged,
    /// Stop the refresh loop, firing any refresh still pending.
    Shutdown,
}

impl Display for HostSignal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            HostSignal::DocumentChanged => write!(f, "DocumentChanged"),
            HostSignal::ActiveDocumentChanged => write!(f, "ActiveDocumentChanged"),
            HostSignal::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Output of a running session, forwarded to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A fresh plan for the watched document.
    Plan(RenderPlan),
}

/// Far enough out that a disabled timer branch never wins a `select!`.
const IDLE_WAKE: Duration = Duration::from_secs(3600);

/// Drive `refresh` from a stream of host signals, coalescing bursts according to `policy`.
///
/// Runs until the channel closes or a [HostSignal::Shutdown] arrives; a refresh still
/// waiting on its trailing edge fires before returning. Returns the number of refreshes.
pub async fn run_refresh_loop<F>(
    mut signals: UnboundedReceiver<HostSignal>,
    policy: DebouncePolicy,
    mut refresh: F,
) -> usize
where
    F: FnMut(),
{
    let mut debouncer = Debouncer::new(policy);
    let mut refreshes = 0;
    let mut fire = |refreshes: &mut usize| {
        refresh();
        *refreshes += 1;
    };

    loop {
        let deadline = debouncer.deadline();
        let wake = deadline
            .map(Instant::from_std)
            .unwrap_or_else(|| Instant::now() + IDLE_WAKE);

        tokio::select! {
            maybe_signal = signals.recv() => match maybe_signal {
                Some(HostSignal::Shutdown) | None => {
                    tracing::debug!("[refresh loop] stopping");
                    if debouncer.flush() {
                        fire(&mut refreshes);
                    }
                    break;
                }
                Some(signal) => {
                    tracing::trace!("[refresh loop] received {signal}");
                    if debouncer.signal(Instant::now().into_std()) {
                        fire(&mut refreshes);
                    }
                }
            },
            _ = sleep_until(wake), if deadline.is_some() => {
                if debouncer.poll(Instant::now().into_std()) {
                    fire(&mut refreshes);
                }
            }
        }
    }
    refreshes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use test_log::test;
    use tokio::{sync::mpsc::unbounded_channel, time::sleep};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut()) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_burst_is_coalesced() {
        let (tx, rx) = unbounded_channel();
        let (count, refresh) = counter();
        let task = tokio::spawn(run_refresh_loop(rx, DebouncePolicy::default(), refresh));

        for _ in 0..3 {
            tx.send(HostSignal::DocumentChanged).unwrap();
        }
        sleep(Duration::from_millis(299)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(tx);
        assert_eq!(task.await.unwrap(), 1);
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_leading_edge_fires_immediately() {
        let (tx, rx) = unbounded_channel();
        let (count, refresh) = counter();
        let policy = DebouncePolicy::leading(Duration::from_millis(300));
        let task = tokio::spawn(run_refresh_loop(rx, policy, refresh));

        tx.send(HostSignal::ActiveDocumentChanged).unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tx.send(HostSignal::DocumentChanged).unwrap();
        sleep(Duration::from_millis(400)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tx.send(HostSignal::Shutdown).unwrap();
        assert_eq!(task.await.unwrap(), 2);
    }

    #[test(tokio::test(start_paused = true))]
    async fn test_shutdown_flushes_pending_refresh() {
        let (tx, rx) = unbounded_channel();
        let (count, refresh) = counter();
        let task = tokio::spawn(run_refresh_loop(rx, DebouncePolicy::default(), refresh));

        tx.send(HostSignal::DocumentChanged).unwrap();
        tx.send(HostSignal::Shutdown).unwrap();
        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
