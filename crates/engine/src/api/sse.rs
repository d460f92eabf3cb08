//! Replay streams as server-sent events.
//!
//! Every replay event becomes one unnamed SSE event whose data is the text
//! shown to the listener. Play events carry the play index as their id.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::use_cases::replay::{ReplayEvent, ReplayStream};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Wrap a replay stream in an SSE response. Dropping the response (client
/// disconnect) drops the receiver, which stops the replay loop.
pub fn replay_sse(
    stream: ReplayStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = ReceiverStream::new(stream).map(|event| Ok(to_sse_event(&event)));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

fn to_sse_event(event: &ReplayEvent) -> Event {
    let sse = Event::default().data(event.text());
    match event.play_index() {
        Some(index) => sse.id(index.to_string()),
        None => sse,
    }
}
