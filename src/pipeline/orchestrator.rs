//! Turn orchestrator

use super::traits::{CompletionClient, DocumentFetcher};
use crate::llm::LlmError;
use crate::prompts::Prompts;
use crate::stages::{AnswerStage, LinkStage, QueryStage};
use crate::state_machine::{
    transition, Effect, Stage, TransitionError, TurnContext, TurnEvent, TurnState,
};
use crate::transcript::{Session, TranscriptStore, Turn, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Fatal per-message failures; no reply is produced
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: LlmError,
    },
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// The in-progress turn, threaded through the stages.
///
/// Stage output is folded into `user_content` here; the transcript store only
/// sees it when the state machine asks for a persist.
#[derive(Debug)]
struct WorkingTurn {
    state: TurnState,
    user_content: String,
    answer: Option<String>,
    reply: Option<String>,
}

impl WorkingTurn {
    fn new(text: &str) -> Self {
        Self {
            state: TurnState::Received,
            user_content: text.to_string(),
            answer: None,
            reply: None,
        }
    }

    /// Stored history followed by the in-progress user turn
    fn transcript(&self, history: &[Turn]) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.extend_from_slice(history);
        turns.push(Turn::user(self.user_content.clone()));
        turns
    }
}

/// Composes the three stages into the per-message pipeline
///
/// Messages from one identity are processed strictly one after another;
/// different identities proceed concurrently.
pub struct TurnOrchestrator<C, F>
where
    C: CompletionClient + 'static,
    F: DocumentFetcher + 'static,
{
    store: Arc<TranscriptStore>,
    client: Arc<C>,
    fetcher: Arc<F>,
    query: QueryStage,
    link: LinkStage,
    answer: AnswerStage,
}

impl<C, F> TurnOrchestrator<C, F>
where
    C: CompletionClient + 'static,
    F: DocumentFetcher + 'static,
{
    pub fn new(
        store: Arc<TranscriptStore>,
        client: Arc<C>,
        fetcher: Arc<F>,
        prompts: &Prompts,
        max_message_characters: usize,
    ) -> Self {
        Self {
            store,
            client,
            fetcher,
            query: QueryStage::new(prompts.query.clone()),
            link: LinkStage::new(prompts.link.clone()),
            answer: AnswerStage::new(prompts.answer.clone(), max_message_characters),
        }
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }

    /// Run the full pipeline for one message and return the reply text
    pub async fn handle_message(&self, user: &UserId, text: &str) -> Result<String, PipelineError> {
        let context = TurnContext::new(user.clone(), text);
        let span = tracing::info_span!(
            "turn",
            turn_id = %context.turn_id,
            user_id = %context.user_id
        );

        async {
            let mut session = self.store.lock(user).await;
            tracing::info!(chars = text.chars().count(), "Processing message");
            self.run(&context, &mut session).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, context: &TurnContext, session: &mut Session) -> Result<String, PipelineError> {
        let history = session.context_turns();
        let mut working = WorkingTurn::new(&context.question);
        let client = self.client.as_ref();
        let fetcher = self.fetcher.as_ref();

        // Received -> Queried
        let transcript = working.transcript(&history);
        let results = match self.query.run(client, fetcher, &transcript).await {
            Ok(results) => results,
            Err(e) => return Err(self.fail(context, session, &mut working, Stage::Query, e)),
        };
        self.advance(context, session, &mut working, TurnEvent::SearchCompleted { results })?;

        // Queried -> LinkChecked
        let transcript = working.transcript(&history);
        let document = match self.link.run(client, fetcher, &transcript).await {
            Ok(document) => document,
            Err(e) => return Err(self.fail(context, session, &mut working, Stage::Link, e)),
        };
        self.advance(context, session, &mut working, TurnEvent::LinkChecked { document })?;

        // LinkChecked -> Answered
        let transcript = working.transcript(&history);
        let text = match self.answer.run(client, &transcript).await {
            Ok(text) => text,
            Err(e) => return Err(self.fail(context, session, &mut working, Stage::Answer, e)),
        };
        self.advance(context, session, &mut working, TurnEvent::AnswerReady { text })?;

        // Answered -> Persisted
        self.advance(context, session, &mut working, TurnEvent::Stored)?;

        tracing::info!(
            stored_turns = session.stored_len(),
            identities = self.store.identities(),
            "Turn complete"
        );
        Ok(working.reply.take().unwrap_or_default())
    }

    fn fail(
        &self,
        context: &TurnContext,
        session: &mut Session,
        working: &mut WorkingTurn,
        stage: Stage,
        error: LlmError,
    ) -> PipelineError {
        tracing::error!(stage = %stage, kind = error.kind.as_str(), error = %error, "Stage failed, no reply sent");

        let event = TurnEvent::StageFailed {
            stage,
            message: error.message.clone(),
        };
        if let Err(e) = self.advance(context, session, working, event) {
            return e.into();
        }

        PipelineError::Stage {
            stage,
            source: error,
        }
    }

    /// Feed an event through the state machine and apply its effects
    #[allow(clippy::unused_self)]
    fn advance(
        &self,
        context: &TurnContext,
        session: &mut Session,
        working: &mut WorkingTurn,
        event: TurnEvent,
    ) -> Result<(), TransitionError> {
        let result = transition(&working.state, context, event)?;
        tracing::debug!(
            from = working.state.name(),
            to = result.new_state.name(),
            effects = result.effects.len(),
            "Turn transition"
        );
        working.state = result.new_state;

        for effect in result.effects {
            match effect {
                Effect::FoldIn { block } => working.user_content.push_str(&block),
                Effect::RecordAnswer { text } => working.answer = Some(text),
                Effect::Persist => {
                    session.append(Turn::user(working.user_content.clone()));
                    if let Some(answer) = &working.answer {
                        session.append(Turn::assistant(answer.clone()));
                    }
                }
                Effect::Reply => working.reply.clone_from(&working.answer),
            }
        }

        Ok(())
    }
}
