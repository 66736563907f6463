//! Driving a future while consuming its progress channel.
//!
//! The dispatcher and the batch runner report progress over unbounded
//! channels. Callers (the CLI spinners, the pipeline forwarding dispatch
//! events) run the work and the consumer side together with
//! [`run_with_events`].

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on draining events once the work has finished. Senders held
/// by detached tasks (stragglers past a dispatch deadline) would otherwise
/// keep the channel open.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, passing every event from `events` to
/// `on_event`, then drain what is left in the channel.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut events: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut seen: u64 = 0;

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = events.recv() => match event {
                Some(e) => {
                    seen += 1;
                    on_event(e);
                }
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        log::debug!("Event channel closed after {} events, awaiting task", seen);
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(e)) => {
                seen += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "Gave up draining events after {}s ({} received)",
                    DRAIN_TIMEOUT.as_secs(),
                    seen
                );
                break;
            }
        }
    }
    result
}
