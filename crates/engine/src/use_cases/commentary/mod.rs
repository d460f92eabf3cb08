//! Commentary generation.
//!
//! Resolves the batter and pitcher names, assembles the mode's prompt and
//! asks the model for one paragraph about the play.

mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use playcast_domain::{CommentaryMode, PlayRecord, PlayValue, PlayerId};

use crate::infrastructure::player_directory::display_name;
use crate::infrastructure::ports::{
    ChatMessage, CommentaryError, CommentaryPort, LlmPort, LlmRequest, PlayerDirectoryPort,
};

use prompts::build_prompt;

#[cfg(test)]
pub(crate) use prompts::tests::sample_play;

const MAX_TOKENS: u32 = 8192;
const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 0.95;

/// LLM-backed [`CommentaryPort`].
pub struct PlayCommentator {
    llm: Arc<dyn LlmPort>,
    players: Arc<dyn PlayerDirectoryPort>,
}

impl PlayCommentator {
    pub fn new(llm: Arc<dyn LlmPort>, players: Arc<dyn PlayerDirectoryPort>) -> Self {
        Self { llm, players }
    }
}

/// Player id stored in a play column, if any.
fn player_id(play: &PlayRecord, field: &str) -> Option<PlayerId> {
    match play.get(field)? {
        PlayValue::Null => None,
        value => PlayerId::new(value.to_string()).ok(),
    }
}

#[async_trait]
impl CommentaryPort for PlayCommentator {
    async fn generate(
        &self,
        play: &PlayRecord,
        mode: CommentaryMode,
    ) -> Result<String, CommentaryError> {
        let batter = display_name(self.players.as_ref(), player_id(play, "batter")).await;
        let pitcher = display_name(self.players.as_ref(), player_id(play, "pitcher")).await;

        let prompt = build_prompt(play, mode, &batter, &pitcher)?;
        let request = LlmRequest::new(vec![ChatMessage::user(prompt.context)])
            .with_system_prompt(prompt.instructions)
            .with_temperature(TEMPERATURE)
            .with_top_p(TOP_P)
            .with_max_tokens(Some(MAX_TOKENS));

        let response = self.llm.generate(request).await?;
        let text = response.content.trim();
        if text.is_empty() {
            return Err(CommentaryError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        FinishReason, LlmError, LlmResponse, MockPlayerDirectoryPort,
    };
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    struct RecordingLlm {
        reply: Result<String, LlmError>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl RecordingLlm {
        fn replying(reply: Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmPort for RecordingLlm {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            self.reply.clone().map(|content| LlmResponse {
                content,
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }
    }

    fn players() -> Arc<MockPlayerDirectoryPort> {
        let mut players = MockPlayerDirectoryPort::new();
        players.expect_lookup().returning(|id| {
            Ok(match id.as_str() {
                "judga001" => Some("Aaron Judge".to_string()),
                _ => None,
            })
        });
        Arc::new(players)
    }

    #[tokio::test]
    async fn sends_mode_prompt_with_generation_settings() {
        let llm = RecordingLlm::replying(Ok("  Judge launches one to center!  ".into()));
        let commentator = PlayCommentator::new(llm.clone(), players());

        let text = commentator
            .generate(&sample_play(), CommentaryMode::Technical)
            .await
            .unwrap();

        assert_eq!(text, "Judge launches one to center!");
        let requests = llm.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.max_tokens, Some(8192));
        assert_eq!(request.temperature, Some(1.0));
        assert_eq!(request.top_p, Some(0.95));
        assert!(request
            .system_prompt
            .as_deref()
            .unwrap()
            .contains("baseball analyst"));
        assert!(request.messages[0].content.contains("Batter - Aaron Judge,"));
        // Pitcher id is not in the directory
        assert!(request.messages[0].content.contains("Pitcher - Unknown Player,"));
    }

    #[tokio::test]
    async fn malformed_play_never_reaches_the_model() {
        let llm = RecordingLlm::replying(Ok("unused".into()));
        let commentator = PlayCommentator::new(llm.clone(), players());
        let play = PlayRecord::new().with("event", PlayValue::Text("K".into()));

        let err = commentator
            .generate(&play, CommentaryMode::Casual)
            .await
            .unwrap_err();

        assert!(err.is_malformed_play());
        assert!(llm.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let llm = RecordingLlm::replying(Ok("   ".into()));
        let commentator = PlayCommentator::new(llm, players());

        let err = commentator
            .generate(&sample_play(), CommentaryMode::Casual)
            .await
            .unwrap_err();

        assert!(matches!(err, CommentaryError::EmptyResponse));
    }

    #[tokio::test]
    async fn model_failure_is_passed_through() {
        let llm = RecordingLlm::replying(Err(LlmError::RequestFailed("503".into())));
        let commentator = PlayCommentator::new(llm, players());

        let err = commentator
            .generate(&sample_play(), CommentaryMode::Casual)
            .await
            .unwrap_err();

        assert!(matches!(err, CommentaryError::Llm(_)));
    }

    #[test]
    fn player_id_ignores_null_and_missing_columns() {
        let play = PlayRecord::new()
            .with("batter", PlayValue::Text("judga001".into()))
            .with("pitcher", PlayValue::Null);
        assert_eq!(player_id(&play, "batter"), PlayerId::new("judga001").ok());
        assert_eq!(player_id(&play, "pitcher"), None);
        assert_eq!(player_id(&play, "catcher"), None);
    }
}
