//! Application context.
//!
//! [`AppContext`] is built once at startup and owns everything a review
//! needs: the gateway, the card source, the review log, the shared stream
//! accumulator and the per-card conversation memory. Nothing is global;
//! callers hold the context and pass it where it is needed.

use crate::config::ReviewParams;
use crate::ports::card_source::{CardError, CardSource};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use crate::ports::review_logger::{NoReviewLogger, ReviewLogger};
use crate::use_cases::evaluate_answer::{
    EvaluateAnswerError, EvaluateAnswerInput, EvaluateAnswerOutput, EvaluateAnswerUseCase,
};
use crate::use_cases::follow_up::{FollowUpError, FollowUpInput, FollowUpOutput, FollowUpUseCase};
use checker_domain::{
    CardContent, ConversationTurn, ErrorKind, PreviousExchange, RequestKind, ReviewSession,
    StreamingAccumulator,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Any failure of a review operation.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Evaluate(#[from] EvaluateAnswerError),

    #[error(transparent)]
    FollowUp(#[from] FollowUpError),
}

impl ReviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::Card(e) => e.kind(),
            ReviewError::Evaluate(e) => e.kind(),
            ReviewError::FollowUp(e) => e.kind(),
        }
    }
}

/// Everything a review needs, constructed once.
pub struct AppContext<G: LlmGateway + 'static> {
    card_source: Arc<dyn CardSource>,
    params: ReviewParams,
    accumulator: Arc<Mutex<StreamingAccumulator>>,
    session: Mutex<ReviewSession>,
    evaluate: EvaluateAnswerUseCase<G>,
    follow_up: FollowUpUseCase<G>,
}

impl<G: LlmGateway + 'static> AppContext<G> {
    pub fn new(gateway: Arc<G>, card_source: Arc<dyn CardSource>, params: ReviewParams) -> Self {
        Self::with_review_logger(gateway, card_source, params, Arc::new(NoReviewLogger))
    }

    pub fn with_review_logger(
        gateway: Arc<G>,
        card_source: Arc<dyn CardSource>,
        params: ReviewParams,
        logger: Arc<dyn ReviewLogger>,
    ) -> Self {
        let accumulator = Arc::new(Mutex::new(StreamingAccumulator::new(
            params.response_timeout,
        )));
        let evaluate = EvaluateAnswerUseCase::new(gateway.clone(), params.clone())
            .with_accumulator(accumulator.clone())
            .with_review_logger(logger.clone());
        let follow_up = FollowUpUseCase::new(gateway, params.clone())
            .with_accumulator(accumulator.clone())
            .with_review_logger(logger);

        Self {
            card_source,
            params,
            accumulator,
            session: Mutex::new(ReviewSession::new()),
            evaluate,
            follow_up,
        }
    }

    pub fn params(&self) -> &ReviewParams {
        &self.params
    }

    /// The accumulator shared by every streamed request of this context.
    pub fn accumulator(&self) -> Arc<Mutex<StreamingAccumulator>> {
        self.accumulator.clone()
    }

    /// The exchange follow-ups will refer to.
    pub async fn last_exchange(&self) -> PreviousExchange {
        self.session.lock().await.last_exchange().clone()
    }

    /// Grade `user_answer` for the current card and remember the result.
    pub async fn evaluate_answer(
        &self,
        user_answer: &str,
        elapsed_seconds: u64,
        progress: &dyn ProgressNotifier,
    ) -> Result<EvaluateAnswerOutput, ReviewError> {
        let card = self.current_card().await?;
        let input = EvaluateAnswerInput::new(card, user_answer, elapsed_seconds);

        let result = self.evaluate.execute_streaming(input, progress).await;

        let evaluation = result.as_ref().ok().and_then(|o| o.record().cloned());
        self.session
            .lock()
            .await
            .record_evaluation(user_answer, elapsed_seconds, evaluation);

        result.map_err(ReviewError::from)
    }

    /// Ask a follow-up of kind `kind_name` about the current card.
    ///
    /// Question exchanges are added to the conversation so later prompts
    /// can refer back to them.
    pub async fn follow_up(
        &self,
        kind_name: &str,
        question: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Result<FollowUpOutput, ReviewError> {
        let card = self.current_card().await?;
        let (previous, history) = {
            let session = self.session.lock().await;
            (
                session.last_exchange().clone(),
                session.history.recent(self.params.context_window).to_vec(),
            )
        };

        let mut input = FollowUpInput::new(kind_name, card)
            .with_previous(previous)
            .with_history(history);
        if let Some(question) = question {
            input = input.with_question(question);
        }

        let output = self.follow_up.execute(input, progress).await?;

        if output.kind == RequestKind::Question
            && let Some(question) = question
        {
            let mut session = self.session.lock().await;
            session.history.push(ConversationTurn::user(question));
            session.history.push(ConversationTurn::assistant(&output.reply));
        }
        Ok(output)
    }

    /// Read the current card and switch the conversation to it.
    async fn current_card(&self) -> Result<CardContent, CardError> {
        let card = self.card_source.card_content()?;
        if let Some(card_id) = self.card_source.card_id() {
            debug!("Reviewing card {}", card_id);
            self.session.lock().await.bind_card(card_id);
        }
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use checker_domain::{CardId, DifficultyLevel, PromptPair};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ==================== Test Mocks ====================

    struct ScriptedGateway {
        replies: StdMutex<VecDeque<String>>,
        prompts: StdMutex<Vec<PromptPair>>,
    }

    impl ScriptedGateway {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: StdMutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn call(&self, prompt: &PromptPair) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("No more replies".to_string()))
        }
    }

    struct FixedCard {
        id: StdMutex<i64>,
        content: Option<CardContent>,
    }

    impl FixedCard {
        fn new() -> Self {
            Self {
                id: StdMutex::new(1),
                content: Some(CardContent::new(
                    "Capital of France?",
                    vec!["Paris".to_string()],
                )),
            }
        }
    }

    impl CardSource for FixedCard {
        fn card_id(&self) -> Option<CardId> {
            Some(CardId(*self.id.lock().unwrap()))
        }

        fn card_content(&self) -> Result<CardContent, CardError> {
            self.content.clone().ok_or(CardError::NoCard)
        }
    }

    const RECORD: &str = r#"{"evaluation": "Right.", "recommendation": "Good", "answer": "Paris", "reference": "Atlas"}"#;

    #[tokio::test]
    async fn test_evaluation_is_remembered_for_follow_ups() {
        let gateway = Arc::new(ScriptedGateway::new(&[RECORD, "Because of the Seine."]));
        let ctx = AppContext::new(
            gateway.clone(),
            Arc::new(FixedCard::new()),
            ReviewParams::default(),
        );

        let output = ctx.evaluate_answer("Paris", 12, &NoProgress).await.unwrap();
        assert_eq!(output.recommendation(), DifficultyLevel::Good);

        let previous = ctx.last_exchange().await;
        assert_eq!(previous.user_answer.as_deref(), Some("Paris"));
        assert_eq!(previous.elapsed_seconds, Some(12));

        ctx.follow_up("question", Some("Why Paris?"), &NoProgress)
            .await
            .unwrap();
        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[1].user.contains("User's Previous Answer: Paris"));
        assert!(prompts[1].user.contains("Previous Recommendation: Good"));
    }

    #[tokio::test]
    async fn test_question_turns_feed_the_next_prompt() {
        let gateway = Arc::new(ScriptedGateway::new(&["First reply.", "Second reply."]));
        let ctx = AppContext::new(
            gateway.clone(),
            Arc::new(FixedCard::new()),
            ReviewParams::default(),
        );

        ctx.follow_up("question", Some("First question?"), &NoProgress)
            .await
            .unwrap();
        ctx.follow_up("joke", None, &NoProgress).await.unwrap();

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[1].user.contains("User: First question?"));
        assert!(prompts[1].user.contains("Assistant: First reply."));
    }

    #[tokio::test]
    async fn test_switching_cards_clears_history() {
        let gateway = Arc::new(ScriptedGateway::new(&["First reply.", "Second reply."]));
        let card = Arc::new(FixedCard::new());
        let ctx = AppContext::new(gateway.clone(), card.clone(), ReviewParams::default());

        ctx.follow_up("question", Some("First question?"), &NoProgress)
            .await
            .unwrap();
        *card.id.lock().unwrap() = 2;
        ctx.follow_up("joke", None, &NoProgress).await.unwrap();

        let prompts = gateway.prompts.lock().unwrap();
        assert!(!prompts[1].user.contains("First question?"));
    }

    #[tokio::test]
    async fn test_missing_card() {
        let gateway = Arc::new(ScriptedGateway::new(&[]));
        let card = FixedCard {
            id: StdMutex::new(1),
            content: None,
        };
        let ctx = AppContext::new(gateway, Arc::new(card), ReviewParams::default());

        let err = ctx.evaluate_answer("Paris", 3, &NoProgress).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CardUnavailable);
    }

    #[tokio::test]
    async fn test_failed_evaluation_still_records_answer() {
        let gateway = Arc::new(ScriptedGateway::new(&["No idea."]));
        let ctx = AppContext::new(gateway, Arc::new(FixedCard::new()), ReviewParams::default());

        let err = ctx.evaluate_answer("Lyon", 30, &NoProgress).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionMiss);
        let previous = ctx.last_exchange().await;
        assert_eq!(previous.user_answer.as_deref(), Some("Lyon"));
        assert!(previous.evaluation.is_none());
    }
}
