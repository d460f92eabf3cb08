//! The replay loop.
//!
//! One spawned task per replay walks the play sequence from the session's
//! cursor. Before every play it reloads the session from the store and stops
//! if the session is paused; after every delivered play it persists the
//! advanced cursor and sleeps for the session's interval.

use std::sync::Arc;

use playcast_domain::{PlayRecord, ReplayInterval, ReplayRunId, ReplaySession, UserId};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::infrastructure::pause_signals::{PauseSignals, PauseSubscription};
use crate::infrastructure::ports::{ClockPort, CommentaryPort, ReplaySessionRepo};

use super::types::{ReplayError, ReplayEvent, ReplayStream, GENERATION_FAILED_TEXT};

/// At most one event waits between the loop and the client.
const STREAM_CAPACITY: usize = 1;

/// Spawns replay loops.
pub struct ReplayRunner {
    sessions: Arc<dyn ReplaySessionRepo>,
    commentary: Arc<dyn CommentaryPort>,
    signals: Arc<PauseSignals>,
    clock: Arc<dyn ClockPort>,
}

impl ReplayRunner {
    pub fn new(
        sessions: Arc<dyn ReplaySessionRepo>,
        commentary: Arc<dyn CommentaryPort>,
        signals: Arc<PauseSignals>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            sessions,
            commentary,
            signals,
            clock,
        }
    }

    /// Start streaming `plays` for `user_id` from `entry_cursor`.
    ///
    /// A cursor past the end of the sequence is treated as the end.
    pub fn spawn(&self, user_id: UserId, plays: Vec<PlayRecord>, entry_cursor: usize) -> ReplayStream {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let run_id = ReplayRunId::new();
        let span = tracing::info_span!("replay", run_id = %run_id.short(), user_id = %user_id);

        let run = ReplayRun {
            sessions: self.sessions.clone(),
            commentary: self.commentary.clone(),
            signals: self.signals.clone(),
            clock: self.clock.clone(),
            pause: self.signals.subscribe(&user_id),
            entry_cursor: entry_cursor.min(plays.len()),
            user_id,
            plays,
            tx,
        };

        tokio::spawn(run.drive().instrument(span));
        rx
    }

    /// A stream that carries a single failure event and ends.
    pub fn aborted(message: String) -> ReplayStream {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let _ = tx.try_send(ReplayEvent::Aborted { message });
        rx
    }
}

/// Why the loop stopped before the end of the sequence.
#[derive(Debug, PartialEq, Eq)]
enum Stopped {
    Paused,
    ClientGone,
}

enum Wake {
    Elapsed,
    PauseSignalled,
    ClientGone,
}

struct ReplayRun {
    sessions: Arc<dyn ReplaySessionRepo>,
    commentary: Arc<dyn CommentaryPort>,
    signals: Arc<PauseSignals>,
    clock: Arc<dyn ClockPort>,
    pause: PauseSubscription,
    user_id: UserId,
    plays: Vec<PlayRecord>,
    entry_cursor: usize,
    tx: mpsc::Sender<ReplayEvent>,
}

impl ReplayRun {
    async fn drive(mut self) {
        tracing::info!(
            plays = self.plays.len(),
            cursor = self.entry_cursor,
            "Replay started"
        );

        match self.run().await {
            Ok(None) => tracing::info!("Replay complete"),
            Ok(Some(Stopped::Paused)) => tracing::info!("Replay paused"),
            Ok(Some(Stopped::ClientGone)) => tracing::info!("Client disconnected, replay stopped"),
            Err(e) => {
                tracing::error!(error = %e, "Replay aborted");
                let _ = self
                    .tx
                    .send(ReplayEvent::Aborted {
                        message: e.to_string(),
                    })
                    .await;
            }
        }

        self.signals.release(&self.user_id, &self.pause);
    }

    async fn run(&mut self) -> Result<Option<Stopped>, ReplayError> {
        let len = self.plays.len();

        for index in self.entry_cursor..len {
            let mut session = self.load().await?;
            if session.is_paused {
                session.checkpoint(index);
                self.sessions.save(&session).await?;
                return Ok(Some(Stopped::Paused));
            }

            let event = self.describe(index, &session).await;
            if self.tx.send(event).await.is_err() {
                return Ok(Some(Stopped::ClientGone));
            }

            // Re-read so a pause written while the model was busy survives.
            let mut latest = self.load().await?;
            latest.advance_to(index + 1, self.clock.now());
            self.sessions.save(&latest).await?;

            match self.wait(session.interval_seconds).await {
                Wake::Elapsed => {}
                Wake::PauseSignalled => {
                    tracing::debug!(next = index + 1, "Woken by pause signal");
                    let woken = std::mem::replace(
                        &mut self.pause,
                        self.signals.subscribe(&self.user_id),
                    );
                    self.signals.release(&self.user_id, &woken);
                }
                Wake::ClientGone => return Ok(Some(Stopped::ClientGone)),
            }
        }

        let mut latest = self.load().await?;
        latest.complete(len, self.clock.now());
        self.sessions.save(&latest).await?;

        // The client may already be gone; the completion is persisted either way.
        let _ = self.tx.send(ReplayEvent::Completed).await;
        Ok(None)
    }

    async fn load(&self) -> Result<ReplaySession, ReplayError> {
        self.sessions
            .get(&self.user_id)
            .await?
            .ok_or(ReplayError::NoActiveReplay)
    }

    async fn describe(&self, index: usize, session: &ReplaySession) -> ReplayEvent {
        match self
            .commentary
            .generate(&self.plays[index], session.mode)
            .await
        {
            Ok(text) => ReplayEvent::Commentary { index, text },
            Err(e) if e.is_malformed_play() => {
                tracing::warn!(index, error = %e, "Skipping malformed play");
                ReplayEvent::PlayFailed {
                    index,
                    message: format!("Error processing play {index}: {e}"),
                }
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Commentary generation failed");
                ReplayEvent::PlayFailed {
                    index,
                    message: GENERATION_FAILED_TEXT.to_string(),
                }
            }
        }
    }

    async fn wait(&self, interval: ReplayInterval) -> Wake {
        tokio::select! {
            _ = tokio::time::sleep(interval.as_duration()) => Wake::Elapsed,
            _ = self.pause.cancelled() => Wake::PauseSignalled,
            _ = self.tx.closed() => Wake::ClientGone,
        }
    }
}
