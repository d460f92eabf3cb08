//! End-to-end replay flows against the in-memory session store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use playcast_domain::{
    GameId, PlayFieldError, PlayRecord, PlayValue, ReplayInterval, ReplaySession,
    ReplayState, UserId,
};
use tokio::time::timeout;

use super::*;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::memory_sessions::InMemoryReplaySessionRepo;
use crate::infrastructure::pause_signals::PauseSignals;
use crate::infrastructure::ports::{
    ClockPort, CommentaryError, LlmError, MockCommentaryPort, MockPlaySourcePort,
    MockReplaySessionRepo, PlaySourceError, RepoError, ReplaySessionRepo,
};

const USER: &str = "user-1";
const GAME: &str = "NYA202404070";

fn user() -> UserId {
    UserId::new(USER).unwrap()
}

fn plays(n: usize) -> Vec<PlayRecord> {
    (0..n)
        .map(|i| PlayRecord::new().with("event", PlayValue::Text(format!("play-{i}"))))
        .collect()
}

fn request(mode: &str, interval_seconds: f64) -> ReplayRequest {
    ReplayRequest {
        user_id: Some(USER.into()),
        game_id: Some(GAME.into()),
        mode: Some(mode.into()),
        interval_seconds: Some(interval_seconds),
    }
}

fn resume_request() -> ResumeRequest {
    ResumeRequest {
        user_id: Some(USER.into()),
    }
}

/// Commentary that names the mode and the play's event, failing on request.
fn commentary() -> MockCommentaryPort {
    let mut commentary = MockCommentaryPort::new();
    commentary.expect_generate().returning(|play, mode| {
        let event = play.display("event")?;
        match event.as_str() {
            "llm-down" => Err(CommentaryError::Llm(LlmError::RequestFailed(
                "503 Service Unavailable".into(),
            ))),
            "bad-row" => Err(PlayFieldError::Missing {
                field: "outs_pre".into(),
            }
            .into()),
            "slugger" => Ok(format!("{mode}: {} hits", play.sum(&["single", "hr"])?)),
            _ => Ok(format!("{mode}: {event}")),
        }
    });
    commentary
}

fn play_source(plays: Vec<PlayRecord>) -> MockPlaySourcePort {
    let mut source = MockPlaySourcePort::new();
    source
        .expect_fetch_plays()
        .returning(move |_| Ok(plays.clone()));
    source
}

/// Session store that remembers every record written to it.
#[derive(Default)]
struct RecordingRepo {
    inner: InMemoryReplaySessionRepo,
    writes: Mutex<Vec<ReplaySession>>,
}

#[async_trait]
impl ReplaySessionRepo for RecordingRepo {
    async fn get(&self, user_id: &UserId) -> Result<Option<ReplaySession>, RepoError> {
        self.inner.get(user_id).await
    }

    async fn save(&self, session: &ReplaySession) -> Result<(), RepoError> {
        self.writes.lock().unwrap().push(session.clone());
        self.inner.save(session).await
    }
}

fn use_cases(
    sessions: Arc<dyn ReplaySessionRepo>,
    source: MockPlaySourcePort,
    commentary: MockCommentaryPort,
    clock: Arc<dyn ClockPort>,
) -> ReplayUseCases {
    use_cases_with_signals(sessions, source, commentary, clock, Arc::new(PauseSignals::new()))
}

fn use_cases_with_signals(
    sessions: Arc<dyn ReplaySessionRepo>,
    source: MockPlaySourcePort,
    commentary: MockCommentaryPort,
    clock: Arc<dyn ClockPort>,
    signals: Arc<PauseSignals>,
) -> ReplayUseCases {
    let source = Arc::new(source);
    let runner = Arc::new(ReplayRunner::new(
        sessions.clone(),
        Arc::new(commentary),
        signals.clone(),
        clock.clone(),
    ));
    ReplayUseCases::new(
        Arc::new(StartReplay::new(
            sessions.clone(),
            source.clone(),
            runner.clone(),
            clock.clone(),
            ReplayInterval::default(),
        )),
        Arc::new(PauseReplay::new(
            sessions.clone(),
            signals,
            clock.clone(),
            ReplayInterval::default(),
        )),
        Arc::new(ResumeReplay::new(sessions, source, runner, clock)),
    )
}

fn clock() -> Arc<dyn ClockPort> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 4, 7, 19, 5, 0).unwrap()))
}

async fn collect(mut stream: ReplayStream) -> Vec<ReplayEvent> {
    timeout(Duration::from_secs(10), async move {
        let mut events = Vec::new();
        while let Some(event) = stream.recv().await {
            events.push(event);
        }
        events
    })
    .await
    .expect("replay stream did not end")
}

async fn next_event(stream: &mut ReplayStream) -> ReplayEvent {
    timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("no event in time")
        .expect("stream ended early")
}

async fn stored(sessions: &dyn ReplaySessionRepo) -> ReplaySession {
    sessions.get(&user()).await.unwrap().expect("session stored")
}

async fn wait_for_cursor(sessions: &dyn ReplaySessionRepo, cursor: usize) {
    timeout(Duration::from_secs(5), async {
        loop {
            if stored(sessions).await.current_play_index == cursor {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("cursor never reached");
}

fn indexes(events: &[ReplayEvent]) -> Vec<usize> {
    events.iter().filter_map(ReplayEvent::play_index).collect()
}

#[tokio::test]
async fn three_plays_run_to_completion() {
    let sessions = Arc::new(RecordingRepo::default());
    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());

    let stream = replay.start.execute(request("casual", 0.01)).await.unwrap();
    let events = collect(stream).await;

    assert_eq!(
        events,
        vec![
            ReplayEvent::Commentary {
                index: 0,
                text: "casual: play-0".into()
            },
            ReplayEvent::Commentary {
                index: 1,
                text: "casual: play-1".into()
            },
            ReplayEvent::Commentary {
                index: 2,
                text: "casual: play-2".into()
            },
            ReplayEvent::Completed,
        ]
    );

    let session = stored(sessions.as_ref()).await;
    assert_eq!(session.current_play_index, 3);
    assert!(session.is_paused);
    assert_eq!(session.state(3), ReplayState::Completed);
    assert_eq!(session.last_active_at, Some(clock().now()));

    let writes = sessions.writes.lock().unwrap();
    assert!(writes.iter().all(|s| s.cursor_within(3)));
    let cursors: Vec<usize> = writes.iter().map(|s| s.current_play_index).collect();
    assert_eq!(cursors, vec![0, 1, 2, 3, 3]);
}

#[tokio::test]
async fn failing_plays_become_inline_errors() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let mut sequence = plays(4);
    sequence[1] = PlayRecord::new().with("event", PlayValue::Text("llm-down".into()));
    sequence[2] = PlayRecord::new().with("event", PlayValue::Text("bad-row".into()));
    let replay = use_cases(sessions.clone(), play_source(sequence), commentary(), clock());

    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;
    let texts: Vec<String> = events.iter().map(ReplayEvent::text).collect();

    assert_eq!(
        texts,
        vec![
            "casual: play-0".to_string(),
            GENERATION_FAILED_TEXT.to_string(),
            "Error processing play 2: malformed play: field 'outs_pre' is missing".to_string(),
            "casual: play-3".to_string(),
            REPLAY_COMPLETE_TEXT.to_string(),
        ]
    );
    assert_eq!(stored(sessions.as_ref()).await.current_play_index, 4);
}

#[tokio::test]
async fn counting_stat_overflow_is_reported_inline() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let mut sequence = plays(2);
    sequence[0] = PlayRecord::new()
        .with("event", PlayValue::Text("slugger".into()))
        .with("single", PlayValue::Int(i64::MAX))
        .with("hr", PlayValue::Int(1));
    let replay = use_cases(sessions.clone(), play_source(sequence), commentary(), clock());

    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;
    let texts: Vec<String> = events.iter().map(ReplayEvent::text).collect();

    assert_eq!(
        texts,
        vec![
            "Error processing play 0: malformed play: field 'hr' is out of range for a counting stat"
                .to_string(),
            "casual: play-1".to_string(),
            REPLAY_COMPLETE_TEXT.to_string(),
        ]
    );
    assert_eq!(stored(sessions.as_ref()).await.current_play_index, 2);
}

#[tokio::test]
async fn finished_replays_leave_no_pause_listeners() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let signals = Arc::new(PauseSignals::new());
    let replay = use_cases_with_signals(
        sessions.clone(),
        play_source(plays(3)),
        commentary(),
        clock(),
        signals.clone(),
    );

    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;
    assert_eq!(events.last(), Some(&ReplayEvent::Completed));
    assert!(signals.is_empty());

    // A replay stopped by a pause releases its listener too.
    let mut session = stored(sessions.as_ref()).await;
    session.current_play_index = 0;
    session.is_paused = false;
    sessions.save(&session).await.unwrap();
    let mut stream = replay.start.execute(request("casual", 5.0)).await.unwrap();
    next_event(&mut stream).await;
    replay.pause.execute(request("casual", 5.0)).await.unwrap();
    collect(stream).await;
    assert!(signals.is_empty());
}

#[tokio::test]
async fn pause_then_resume_delivers_every_play_once() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let replay = use_cases(sessions.clone(), play_source(plays(5)), commentary(), clock());

    let mut stream = replay.start.execute(request("casual", 0.2)).await.unwrap();
    let mut first_run = vec![next_event(&mut stream).await, next_event(&mut stream).await];

    // Pause while the loop sleeps after the second play; switch mode too.
    wait_for_cursor(sessions.as_ref(), 2).await;
    replay
        .pause
        .execute(request("technical", 0.2))
        .await
        .unwrap();

    first_run.extend(collect(stream).await);
    assert_eq!(indexes(&first_run), vec![0, 1]);

    let paused = stored(sessions.as_ref()).await;
    assert!(paused.is_paused);
    assert_eq!(paused.current_play_index, 2);
    assert_eq!(paused.state(5), ReplayState::Paused);

    let ResumeOutcome::Resumed(stream) = replay.resume.execute(resume_request()).await.unwrap()
    else {
        panic!("expected the paused session to resume");
    };
    let second_run = collect(stream).await;

    assert_eq!(indexes(&second_run), vec![2, 3, 4]);
    assert_eq!(second_run.last(), Some(&ReplayEvent::Completed));
    assert_eq!(second_run[0].text(), "technical: play-2");

    let mut all = indexes(&first_run);
    all.extend(indexes(&second_run));
    assert_eq!(all, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn pause_wakes_a_sleeping_replay() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());

    // Long interval: without the signal the loop would sleep for a minute.
    let mut stream = replay.start.execute(request("casual", 60.0)).await.unwrap();
    next_event(&mut stream).await;
    wait_for_cursor(sessions.as_ref(), 1).await;

    replay.pause.execute(request("casual", 60.0)).await.unwrap();

    let rest = timeout(Duration::from_secs(2), collect(stream))
        .await
        .expect("paused replay kept sleeping");
    assert!(rest.is_empty());
    assert_eq!(stored(sessions.as_ref()).await.current_play_index, 1);
}

#[tokio::test]
async fn pause_is_idempotent() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());

    let first = replay.pause.execute(request("casual", 5.0)).await.unwrap();
    let second = replay.pause.execute(request("casual", 5.0)).await.unwrap();

    assert_eq!(first, second);
    assert!(second.is_paused);
    assert_eq!(second.current_play_index, 0);
    assert_eq!(second.game_id, GameId::new(GAME).ok());
}

#[tokio::test]
async fn resume_when_running_changes_nothing() {
    let mut session = ReplaySession::new(user(), ReplayInterval::default());
    session.current_play_index = 2;

    let mut sessions = MockReplaySessionRepo::new();
    sessions
        .expect_get()
        .returning(move |_| Ok(Some(session.clone())));
    sessions.expect_save().never();

    let replay = use_cases(Arc::new(sessions), MockPlaySourcePort::new(), MockCommentaryPort::new(), clock());

    let outcome = replay.resume.execute(resume_request()).await.unwrap();
    assert!(matches!(outcome, ResumeOutcome::AlreadyRunning));
}

#[tokio::test]
async fn resume_without_a_game_is_rejected() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let mut session = ReplaySession::new(user(), ReplayInterval::default());
    session.is_paused = true;
    sessions.save(&session).await.unwrap();

    let replay = use_cases(sessions, MockPlaySourcePort::new(), MockCommentaryPort::new(), clock());

    let err = replay.resume.execute(resume_request()).await.unwrap_err();
    assert!(matches!(err, ReplayError::NoActiveReplay));
}

#[tokio::test]
async fn start_with_missing_interval_touches_nothing() {
    let mut sessions = MockReplaySessionRepo::new();
    sessions.expect_get().never();
    sessions.expect_save().never();

    let replay = use_cases(Arc::new(sessions), MockPlaySourcePort::new(), MockCommentaryPort::new(), clock());

    let err = replay
        .start
        .execute(ReplayRequest {
            interval_seconds: None,
            ..request("casual", 1.0)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::MissingField("intervalSeconds")));
}

#[tokio::test]
async fn start_on_a_shorter_game_clamps_the_cursor() {
    let sessions = Arc::new(RecordingRepo::default());
    let mut session = ReplaySession::new(user(), ReplayInterval::default());
    session.game_id = GameId::new("BOS202404060").ok();
    session.current_play_index = 7;
    sessions.inner.save(&session).await.unwrap();

    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());
    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;

    assert_eq!(events, vec![ReplayEvent::Completed]);
    let session = stored(sessions.as_ref()).await;
    assert_eq!(session.game_id, GameId::new(GAME).ok());
    assert_eq!(session.current_play_index, 3);
    assert!(session.is_paused);
}

#[tokio::test]
async fn start_keeps_an_existing_pause() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let mut session = ReplaySession::new(user(), ReplayInterval::default());
    session.current_play_index = 1;
    session.is_paused = true;
    sessions.save(&session).await.unwrap();

    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());
    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;

    assert!(events.is_empty());
    let session = stored(sessions.as_ref()).await;
    assert_eq!(session.current_play_index, 1);
    assert!(session.is_paused);
}

#[tokio::test]
async fn disconnected_client_stops_the_replay() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let replay = use_cases(sessions.clone(), play_source(plays(3)), commentary(), clock());

    let mut stream = replay.start.execute(request("casual", 1.0)).await.unwrap();
    next_event(&mut stream).await;
    drop(stream);

    wait_for_cursor(sessions.as_ref(), 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let session = stored(sessions.as_ref()).await;
    assert_eq!(session.current_play_index, 1);
    assert!(!session.is_paused);
}

#[tokio::test]
async fn unavailable_plays_end_the_stream_with_an_error() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let mut source = MockPlaySourcePort::new();
    source
        .expect_fetch_plays()
        .returning(|_| Err(PlaySourceError::Timeout));
    let replay = use_cases(sessions, source, MockCommentaryPort::new(), clock());

    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].text(),
        "Error: Warehouse query did not finish in time"
    );
}

#[tokio::test]
async fn store_failure_mid_replay_aborts_the_stream() {
    let mut sessions = MockReplaySessionRepo::new();
    let mut session = ReplaySession::new(user(), ReplayInterval::default());
    session.game_id = GameId::new(GAME).ok();
    sessions
        .expect_get()
        .returning(move |_| Ok(Some(session.clone())));
    let mut saves = 0;
    sessions.expect_save().returning(move |_| {
        saves += 1;
        if saves == 1 {
            Ok(())
        } else {
            Err(RepoError::database("replay_sessions.save", "disk full"))
        }
    });

    let replay = use_cases(Arc::new(sessions), play_source(plays(3)), commentary(), clock());
    let events = collect(replay.start.execute(request("casual", 0.01)).await.unwrap()).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].play_index(), Some(0));
    assert_eq!(
        events[1].text(),
        "Error: Session store error: Database error in replay_sessions.save: disk full"
    );
}

/// Two Starts for the same user run side by side on one session record.
/// Neither stream is lost and the record stays within the game.
#[tokio::test]
async fn double_start_keeps_the_session_consistent() {
    let sessions = Arc::new(InMemoryReplaySessionRepo::new());
    let signals = Arc::new(PauseSignals::new());
    let replay = use_cases_with_signals(
        sessions.clone(),
        play_source(plays(3)),
        commentary(),
        clock(),
        signals.clone(),
    );

    let first = replay.start.execute(request("casual", 0.05)).await.unwrap();
    let second = replay.start.execute(request("casual", 0.05)).await.unwrap();
    let (first, second) = tokio::join!(collect(first), collect(second));

    for events in [&first, &second] {
        let delivered = indexes(events);
        assert!(!delivered.is_empty());
        assert!(delivered.windows(2).all(|pair| pair[0] < pair[1]));
    }
    assert!([&first, &second]
        .iter()
        .any(|events| events.last() == Some(&ReplayEvent::Completed)));

    let session = stored(sessions.as_ref()).await;
    assert!(session.cursor_within(3));
    assert!(session.is_paused);
    assert!(matches!(
        session.state(3),
        ReplayState::Completed | ReplayState::Paused
    ));
    assert!(signals.is_empty());
}
