//! The posting pump
//!
//! Wires the posting pipeline to an in-process session: one producer loop
//! posts the configured series of messages while a consumer thread drains
//! the session's outbound buffer. Watermark transitions are logged and
//! counted through the queue's event sink.

use crate::app::config::ResolvedConfig;
use crate::posting::{
    FileLogger, InProcessSession, Poster, PostingError, Session, StatContext, StatSnapshot,
};
use crate::queue::{QueueState, TimedPopError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long the consumer waits for an element before re-checking for
/// shutdown.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Outcome of one pump run.
#[derive(Debug, Clone, Copy)]
pub struct PumpReport {
    pub snapshot: StatSnapshot,
    pub drained: u64,
}

/// Run one posting series to completion and drain everything posted.
pub fn run_pump(config: &ResolvedConfig) -> Result<PumpReport, PostingError> {
    let stats = Arc::new(StatContext::new());
    let message_logger = config
        .message_log
        .as_deref()
        .map(FileLogger::create)
        .transpose()?
        .map(Arc::new);

    let session = Arc::new(InProcessSession::new(&config.queue));
    install_load_sink(&session, &stats);

    let posting_done = Arc::new(AtomicBool::new(false));
    let consumer = {
        let queue = Arc::clone(session.queue());
        let stats = Arc::clone(&stats);
        let posting_done = Arc::clone(&posting_done);
        thread::spawn(move || {
            let mut drained: u64 = 0;
            loop {
                match queue.timed_pop_front(DRAIN_POLL_INTERVAL) {
                    Ok(message) => {
                        stats.record_delivery();
                        drained += 1;
                        log::trace!(
                            "drained message {} ({} bytes)",
                            drained,
                            message.len()
                        );
                    }
                    Err(TimedPopError::Timeout) => {
                        if posting_done.load(Ordering::Acquire) && queue.is_empty() {
                            break;
                        }
                    }
                }
            }
            drained
        })
    };

    let poster = Poster::new(message_logger.clone(), Arc::clone(&stats));
    let posting_result = post_series(&poster, Arc::clone(&session) as Arc<dyn Session>, config);

    // Always release the consumer, even when posting failed midway.
    session.close();
    posting_done.store(true, Ordering::Release);
    let drained = consumer.join().expect("consumer thread panicked");

    posting_result?;
    if let Some(logger) = &message_logger {
        logger.flush()?;
        log::debug!("message log written to {}", logger.path().display());
    }

    Ok(PumpReport {
        snapshot: stats.snapshot(),
        drained,
    })
}

fn post_series(
    poster: &Poster,
    session: Arc<dyn Session>,
    config: &ResolvedConfig,
) -> Result<(), PostingError> {
    let mut context = poster.create_posting_context(session, config.posting.clone())?;

    while context.pending_post() {
        context.post_next()?;
    }

    log::debug!("posted {} messages", context.messages_posted());
    Ok(())
}

fn install_load_sink(session: &Arc<InProcessSession>, stats: &Arc<StatContext>) {
    let stats = Arc::clone(stats);
    session.queue().set_event_sink(
        move |old: QueueState, new: QueueState, size: usize| {
            stats.record_state_transition();
            match new {
                QueueState::Normal => {
                    log::info!("outbound buffer recovered: {old} -> {new} at {size} elements");
                }
                _ => {
                    log::warn!("outbound buffer load rising: {old} -> {new} at {size} elements");
                }
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::PostingParameters;
    use crate::queue::QueueConfig;

    fn config(count: u64, capacity: usize) -> ResolvedConfig {
        let mut queue = QueueConfig::new(capacity);
        queue.timed_pops = true;
        ResolvedConfig {
            queue,
            posting: PostingParameters::new("inproc://pump-test", count),
            message_log: None,
        }
    }

    #[test]
    fn test_pump_posts_and_drains_everything() {
        let report = run_pump(&config(200, 16)).unwrap();

        assert_eq!(report.snapshot.messages_posted, 200);
        assert_eq!(report.snapshot.messages_delivered, 200);
        assert_eq!(report.drained, 200);
    }

    #[test]
    fn test_pump_records_load_transitions_on_tiny_buffer() {
        // With the high watermarks at one element, the first post already
        // crosses them no matter how fast the consumer drains.
        let mut config = config(100, 4);
        config.queue.low_watermark = Some(0);
        config.queue.high_watermark = Some(1);
        config.queue.high_watermark2 = Some(1);

        let report = run_pump(&config).unwrap();

        assert_eq!(report.drained, 100);
        assert!(report.snapshot.state_transitions > 0);
    }

    #[test]
    fn test_pump_writes_message_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted.log");

        let mut config = config(10, 8);
        config.message_log = Some(path.clone());

        let report = run_pump(&config).unwrap();
        assert_eq!(report.snapshot.messages_posted, 10);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 10);
        assert!(content.contains("queue=inproc://pump-test"));
    }
}
