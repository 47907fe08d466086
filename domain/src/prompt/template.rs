//! Prompt templates for answer grading and follow-up requests

use super::thresholds::TimeThresholds;
use crate::core::error::DomainError;
use crate::review::conversation::{ConversationTurn, DEFAULT_CONTEXT_WINDOW};
use crate::review::difficulty::DifficultyLevel;
use crate::review::request::{RequestContext, RequestKind};
use serde::{Deserialize, Serialize};

/// User message of the sentinel pair returned for an unknown request kind.
pub const INVALID_REQUEST_TYPE: &str = "Invalid request type";

const NOT_AVAILABLE: &str = "Not available";

/// A (system, user) message pair ready for the LLM gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// The degenerate pair for a request kind the builder does not know.
    pub fn invalid(system: impl Into<String>) -> Self {
        Self::new(system, INVALID_REQUEST_TYPE)
    }

    /// Callers must check this before sending the pair anywhere.
    pub fn is_invalid(&self) -> bool {
        self.user == INVALID_REQUEST_TYPE
    }
}

/// Builds prompt pairs from a [`RequestContext`].
///
/// The answer rubric ends with a mandatory JSON footer; the reply extractor
/// relies on that footer being the last thing in the reply. Follow-up kinds
/// are free text and carry the recent conversation instead.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    thresholds: TimeThresholds,
    system_prompt: String,
    language: String,
    context_window: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            thresholds: TimeThresholds::default(),
            system_prompt: "You are a helpful assistant.".to_string(),
            language: "English".to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }
}

impl PromptBuilder {
    pub fn new(thresholds: TimeThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_context_window(mut self, turns: usize) -> Self {
        self.context_window = turns;
        self
    }

    pub fn thresholds(&self) -> &TimeThresholds {
        &self.thresholds
    }

    // ==================== Building ====================

    /// Build the pair for `ctx`.
    ///
    /// Fails only when `ctx` lacks a field its kind requires.
    pub fn build(
        &self,
        ctx: &RequestContext,
        history: &[ConversationTurn],
    ) -> Result<PromptPair, DomainError> {
        ctx.validate()?;

        let system = self.system_message(ctx.kind);
        let user = match ctx.kind {
            RequestKind::Answer => self.answer_prompt(ctx),
            RequestKind::Question => format!(
                "{}\n\nAdditional Question: {}\n\nBased on all this context, please provide a detailed answer to the additional question.",
                self.follow_up_context(ctx, history),
                ctx.question.as_deref().unwrap_or_default()
            ),
            RequestKind::Joke => format!(
                "{}\n\nBased on this context and especially considering how well the user performed, please create a funny and encouraging joke related to this card's content.",
                self.follow_up_context(ctx, history)
            ),
            RequestKind::EditAdvice => format!(
                "{}\n\nBased on the user's performance and all available context, please provide detailed, actionable advice for improving this card.",
                self.follow_up_context(ctx, history)
            ),
        };

        Ok(PromptPair::new(system, user))
    }

    /// Build the pair for a request kind given by name.
    ///
    /// An unrecognised name yields [`PromptPair::invalid`] instead of an error.
    pub fn build_named(
        &self,
        kind_name: &str,
        ctx: RequestContext,
        history: &[ConversationTurn],
    ) -> Result<PromptPair, DomainError> {
        match kind_name.parse::<RequestKind>() {
            Ok(kind) => self.build(&RequestContext { kind, ..ctx }, history),
            Err(_) => Ok(PromptPair::invalid(self.helpful_system())),
        }
    }

    fn helpful_system(&self) -> String {
        format!(
            "{} Always answer in {}.",
            self.system_prompt.trim(),
            self.language
        )
    }

    fn system_message(&self, kind: RequestKind) -> String {
        match kind {
            RequestKind::Answer | RequestKind::Question => self.helpful_system(),
            RequestKind::Joke => format!("You are a comedian. Always answer in {}.", self.language),
            RequestKind::EditAdvice => format!(
                "You are an Anki card editing expert. Always answer in {}.",
                self.language
            ),
        }
    }

    fn follow_up_context(&self, ctx: &RequestContext, history: &[ConversationTurn]) -> String {
        let previous = &ctx.previous;
        let evaluation = previous.evaluation.as_ref();

        let mut context = format!(
            r#"Context about this Anki card:
Card Content: {}
Correct Answer(s): {}
User's Previous Answer: {}
Time Taken: {}
Previous Evaluation: {}
Previous Recommendation: {}"#,
            ctx.card.question_text,
            ctx.card.joined_answers(),
            previous.user_answer.as_deref().unwrap_or(NOT_AVAILABLE),
            previous
                .elapsed_seconds
                .map(|s| format!("{s} seconds"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            evaluation.map(|e| e.evaluation.as_str()).unwrap_or(NOT_AVAILABLE),
            evaluation
                .map(|e| e.recommendation.as_str())
                .unwrap_or(NOT_AVAILABLE),
        );

        let start = history.len().saturating_sub(self.context_window);
        let recent = &history[start..];
        if !recent.is_empty() {
            context.push_str("\n\nConversation so far:");
            for turn in recent {
                context.push_str(&format!("\n{}: {}", turn.role, turn.content));
            }
        }

        context
    }

    fn answer_prompt(&self, ctx: &RequestContext) -> String {
        let TimeThresholds { easy, good, hard } = self.thresholds;
        let [again_l, hard_l, good_l, easy_l] = DifficultyLevel::ALL.map(|l| l.as_str());

        let cloze_rule = ctx
            .card
            .cloze_number()
            .map(|n| {
                format!(
                    "\n        - This is a cloze card: judge the answer for blank number {n}, reading it in the context of the sentence"
                )
            })
            .unwrap_or_default();

        format!(
            r#"Evaluate the user's answer to an Anki card and recommend exactly one of: '{again_l}', '{hard_l}', '{good_l}', '{easy_l}'.

Your evaluation should include:
    - An assessment of the semantic accuracy of the user's answer
    - Consideration of the time taken to answer
    - The correct answer and its acceptable variations
    - Additional reference information to help the user understand

Evaluation Criteria:
    1. Content Accuracy (judge meaning, not wording):
        - Decide whether the answer captures the core meaning of the correct answer
        - Accept synonyms, paraphrases, informal or regional forms that convey the same idea
        - Accept minor spelling, typing or grammatical slips when the meaning is clear{cloze_rule}
        - Treat as incorrect: answers that change or negate the meaning, unrelated answers, and answers too vague to show understanding
        - When several concepts are expected, all of them must be present (in any order)

    2. Response Time (only for semantically correct answers):
        - Easy: less than {easy} seconds
        - Good: {easy} seconds or more, but less than {good} seconds
        - Hard: {good} seconds or more, but less than {hard} seconds
        - Again: {hard} seconds or more, regardless of correctness

Recommendation Rules:
    {again_l}: the answer is wrong, irrelevant or too vague (regardless of time), or the time is {hard} seconds or more
    {hard_l}: the answer is correct and the time is between {good} and {hard} seconds
    {good_l}: the answer is correct and the time is between {easy} and {good} seconds
    {easy_l}: the answer is correct and the time is under {easy} seconds

Feedback:
    - Acknowledge a correct meaning even when the form differs, and give the standard form
    - Explain briefly why a variation is or is not acceptable

Data Provided:
    Card Content: {content}
    Correct Answer(s): {answers}
    User's Answer: {user_answer}
    Time Taken: {elapsed} seconds

Output contract:
    - Write your assessment first.
    - End your reply with exactly one JSON object and write nothing after it.
    - The object must have the keys "evaluation", "recommendation", "answer" and "reference", all non-empty strings.
    - "recommendation" must be exactly one of "{again_l}", "{hard_l}", "{good_l}", "{easy_l}" (same spelling and capitalization).

{{
    "evaluation": "<assessment of semantic accuracy and response time>",
    "recommendation": "<one of {again_l} | {hard_l} | {good_l} | {easy_l}>",
    "answer": "<the correct answer(s) and acceptable variations>",
    "reference": "<additional helpful information, including standard forms>"
}}"#,
            content = ctx.card.question_text,
            answers = ctx.card.joined_answers(),
            user_answer = ctx.user_answer.as_deref().unwrap_or_default(),
            elapsed = ctx.elapsed_seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::card::CardContent;
    use crate::review::evaluation::EvaluationRecord;
    use crate::review::request::PreviousExchange;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(TimeThresholds::new(5, 15, 50).unwrap()).with_language("Korean")
    }

    fn card() -> CardContent {
        CardContent::new(
            "Meaning of 'gonna'?",
            vec!["going to".to_string(), "about to".to_string()],
        )
    }

    #[test]
    fn test_answer_prompt_embeds_data() {
        let ctx = RequestContext::answer(card(), "gonna do", 8);
        let pair = builder().build(&ctx, &[]).unwrap();

        assert_eq!(pair.system, "You are a helpful assistant. Always answer in Korean.");
        assert!(pair.user.contains("Card Content: Meaning of 'gonna'?"));
        assert!(pair.user.contains("Correct Answer(s): going to, about to"));
        assert!(pair.user.contains("User's Answer: gonna do"));
        assert!(pair.user.contains("Time Taken: 8 seconds"));
        assert!(!pair.is_invalid());
    }

    #[test]
    fn test_answer_prompt_embeds_thresholds() {
        let ctx = RequestContext::answer(card(), "x", 1);
        let pair = builder().build(&ctx, &[]).unwrap();
        assert!(pair.user.contains("Easy: less than 5 seconds"));
        assert!(pair.user.contains("Hard: 15 seconds or more, but less than 50 seconds"));
        assert!(pair.user.contains("Again: 50 seconds or more, regardless of correctness"));
    }

    #[test]
    fn test_answer_prompt_ends_with_json_contract() {
        let ctx = RequestContext::answer(card(), "x", 1);
        let pair = builder().build(&ctx, &[]).unwrap();
        let tail = pair.user.trim_end();
        assert!(tail.ends_with('}'));
        for key in ["\"evaluation\"", "\"recommendation\"", "\"answer\"", "\"reference\""] {
            assert!(pair.user.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_cloze_rule_names_blank() {
        let ctx = RequestContext::answer(card().with_ordinal(2), "x", 1);
        let pair = builder().build(&ctx, &[]).unwrap();
        assert!(pair.user.contains("blank number 3"));

        let basic = RequestContext::answer(card(), "x", 1);
        assert!(!builder().build(&basic, &[]).unwrap().user.contains("cloze card"));
    }

    #[test]
    fn test_system_prompt_override() {
        let pair = builder()
            .with_system_prompt("You grade vocabulary.")
            .build(&RequestContext::answer(card(), "x", 1), &[])
            .unwrap();
        assert_eq!(pair.system, "You grade vocabulary. Always answer in Korean.");
    }

    #[test]
    fn test_answer_without_user_answer_is_contract_violation() {
        let ctx = RequestContext::new(RequestKind::Answer, card());
        assert!(builder().build(&ctx, &[]).is_err());
    }

    #[test]
    fn test_joke_and_edit_advice_personas() {
        let joke = builder()
            .build(&RequestContext::new(RequestKind::Joke, card()), &[])
            .unwrap();
        assert_eq!(joke.system, "You are a comedian. Always answer in Korean.");
        assert!(joke.user.contains("joke"));
        assert!(!joke.user.contains("\"recommendation\""));

        let advice = builder()
            .build(&RequestContext::new(RequestKind::EditAdvice, card()), &[])
            .unwrap();
        assert!(advice.system.contains("card editing expert"));
        assert!(advice.user.contains("improving this card"));
    }

    #[test]
    fn test_question_includes_previous_exchange_and_history() {
        let previous = PreviousExchange {
            user_answer: Some("gonna".to_string()),
            elapsed_seconds: Some(7),
            evaluation: Some(EvaluationRecord::new(
                "Correct, informal",
                DifficultyLevel::Good,
                "going to",
                "informal contraction",
            )),
        };
        let ctx = RequestContext::new(RequestKind::Question, card())
            .with_question("Is it rude?")
            .with_previous(previous);
        let history = vec![
            ConversationTurn::user("Where does it come from?"),
            ConversationTurn::assistant("From 'going to'."),
        ];
        let pair = builder().build(&ctx, &history).unwrap();

        assert!(pair.user.contains("User's Previous Answer: gonna"));
        assert!(pair.user.contains("Time Taken: 7 seconds"));
        assert!(pair.user.contains("Previous Recommendation: Good"));
        assert!(pair.user.contains("User: Where does it come from?"));
        assert!(pair.user.contains("Assistant: From 'going to'."));
        assert!(pair.user.contains("Additional Question: Is it rude?"));
    }

    #[test]
    fn test_history_is_capped_to_window() {
        let history: Vec<_> = (0..6)
            .map(|i| ConversationTurn::user(format!("turn-{i}")))
            .collect();
        let ctx = RequestContext::new(RequestKind::Joke, card());
        let pair = builder().with_context_window(2).build(&ctx, &history).unwrap();
        assert!(!pair.user.contains("turn-3"));
        assert!(pair.user.contains("turn-4"));
        assert!(pair.user.contains("turn-5"));
    }

    #[test]
    fn test_missing_previous_shows_not_available() {
        let pair = builder()
            .build(&RequestContext::new(RequestKind::EditAdvice, card()), &[])
            .unwrap();
        assert!(pair.user.contains("User's Previous Answer: Not available"));
        assert!(pair.user.contains("Previous Recommendation: Not available"));
        assert!(!pair.user.contains("Conversation so far"));
    }

    #[test]
    fn test_unknown_kind_name_yields_sentinel() {
        let ctx = RequestContext::new(RequestKind::Joke, card());
        let pair = builder().build_named("poem", ctx, &[]).unwrap();
        assert!(pair.is_invalid());
        assert_eq!(pair.user, INVALID_REQUEST_TYPE);
    }

    #[test]
    fn test_known_kind_name_overrides_context_kind() {
        let ctx = RequestContext::new(RequestKind::Answer, card());
        let pair = builder().build_named("joke", ctx, &[]).unwrap();
        assert!(pair.system.starts_with("You are a comedian"));
    }
}
