//! The reading pipeline: start and continue operations over injected
//! collaborators. Single-pass state machines, no retries at this layer.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use arcana_auth::IdentityVerifier;
use arcana_provider::LlmMessage;
use arcana_schema::{Conversation, Locale, Message, TarotCard, VoiceGender};
use arcana_speech::{ssml, SpeechSynthesizer, SynthesizedAudio};
use arcana_store::{ConversationStore, ConversationSummary};

use crate::error::ReadingError;
use crate::generator::ReadingGenerator;
use crate::prompts;
use crate::tokens::TokenCounter;
use crate::validator::QuestionValidator;

/// Persistence seam for the pipeline. `ConversationStore` is the sqlite
/// implementation; tests substitute fakes.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create(
        &self,
        user_id: &str,
        cards: &[TarotCard],
        question: &str,
        reading_text: &str,
        token_count: u32,
    ) -> anyhow::Result<String>;

    async fn get(&self, id: &str) -> anyhow::Result<Option<Conversation>>;

    async fn append_messages(
        &self,
        id: &str,
        user_msg: Message,
        model_msg: Message,
        expected_revision: i64,
    ) -> anyhow::Result<()>;

    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<ConversationSummary>>;
}

#[async_trait]
impl ConversationRepository for ConversationStore {
    async fn create(
        &self,
        user_id: &str,
        cards: &[TarotCard],
        question: &str,
        reading_text: &str,
        token_count: u32,
    ) -> anyhow::Result<String> {
        ConversationStore::create(self, user_id, cards, question, reading_text, token_count).await
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Conversation>> {
        ConversationStore::get(self, id).await
    }

    async fn append_messages(
        &self,
        id: &str,
        user_msg: Message,
        model_msg: Message,
        expected_revision: i64,
    ) -> anyhow::Result<()> {
        ConversationStore::append_messages(self, id, user_msg, model_msg, expected_revision).await
    }

    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<ConversationSummary>> {
        ConversationStore::list_for_user(self, user_id).await
    }
}

#[derive(Debug, Clone)]
pub struct StartReadingRequest {
    pub cards: Vec<TarotCard>,
    pub question: String,
    pub locale: Locale,
    pub generate_audio: bool,
    pub voice_gender: VoiceGender,
}

#[derive(Debug, Clone)]
pub struct StartedReading {
    /// JSON-encoded `TarotReadingResponse`, exactly as the model emitted it.
    pub reading: String,
    pub conversation_id: String,
    pub audio: Option<SynthesizedAudio>,
}

#[derive(Debug, Clone)]
pub struct ContinuedReading {
    pub response: String,
    pub updated_history: Vec<Message>,
}

pub struct ReadingPipeline {
    verifier: Arc<dyn IdentityVerifier>,
    validator: QuestionValidator,
    generator: ReadingGenerator,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn ConversationRepository>,
    tokens: Arc<dyn TokenCounter>,
}

impl ReadingPipeline {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        validator: QuestionValidator,
        generator: ReadingGenerator,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn ConversationRepository>,
        tokens: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            verifier,
            validator,
            generator,
            synthesizer,
            store,
            tokens,
        }
    }

    /// Identity verification gates every operation; rejection is terminal.
    async fn verify(&self, credential: &str) -> Result<String, ReadingError> {
        match self.verifier.verify(credential).await {
            Some(user) => Ok(user.subject_id),
            None => Err(ReadingError::AuthRequired),
        }
    }

    /// Generates the initial reading, optionally narrates it, and persists
    /// the new conversation with the reading as `history[0]`.
    pub async fn start_reading(
        &self,
        credential: &str,
        request: StartReadingRequest,
    ) -> Result<StartedReading, ReadingError> {
        let user_id = self.verify(credential).await?;
        validate_spread(&request.cards)?;

        if !request.question.trim().is_empty()
            && !self.validator.validate(&request.question, request.locale).await
        {
            return Err(ReadingError::InvalidQuestion);
        }

        let prompt =
            prompts::compose_reading_prompt(&request.cards, &request.question, request.locale);
        let generated = self.generator.generate_initial(&prompt).await?;

        // Synthesis is best-effort: the reading is delivered either way.
        let audio = if request.generate_audio {
            let markup = ssml::render(&generated.parsed);
            self.synthesizer
                .synthesize(&markup, request.locale, request.voice_gender)
                .await
        } else {
            None
        };

        let token_count = self.tokens.count(&generated.text);
        let conversation_id = self
            .store
            .create(
                &user_id,
                &request.cards,
                &request.question,
                &generated.text,
                token_count,
            )
            .await
            .map_err(|e| {
                tracing::error!("failed to persist conversation: {e:#}");
                ReadingError::Generation(e)
            })?;
        tracing::info!(conversation_id = %conversation_id, "initial reading saved");

        Ok(StartedReading {
            reading: generated.text,
            conversation_id,
            audio,
        })
    }

    /// Answers a follow-up question over the stored conversation context
    /// and appends both turns atomically.
    pub async fn continue_reading(
        &self,
        credential: &str,
        conversation_id: &str,
        question: &str,
    ) -> Result<ContinuedReading, ReadingError> {
        let user_id = self.verify(credential).await?;
        if question.trim().is_empty() {
            return Err(ReadingError::EmptyFollowUp);
        }

        let conversation = self
            .store
            .get(conversation_id)
            .await
            .map_err(ReadingError::Generation)?;
        // A missing record and another user's record are indistinguishable.
        let conversation = match conversation {
            Some(c) if c.user_id == user_id => c,
            _ => return Err(ReadingError::NotFoundOrUnauthorized),
        };

        let initial_reading = conversation
            .history
            .first()
            .map(|m| m.text())
            .unwrap_or_default();
        let system = prompts::compose_followup_system(
            &conversation.initial_cards,
            &conversation.initial_question,
            &initial_reading,
        );
        let llm_history: Vec<LlmMessage> = conversation
            .history
            .iter()
            .map(|m| LlmMessage {
                role: m.role.as_str().to_string(),
                text: m.text(),
            })
            .collect();

        // The full prompt size for this turn is attributed to the user's
        // message, a cost-tracking convention rather than a per-text count.
        let historical = conversation
            .history
            .iter()
            .map(|m| m.text())
            .collect::<Vec<_>>()
            .join("");
        let prompt_tokens = self.tokens.count(&system)
            + self.tokens.count(&historical)
            + self.tokens.count(question);

        let reply = self
            .generator
            .generate_followup(system, llm_history, question)
            .await?;
        let reply_tokens = self.tokens.count(&reply);

        let user_msg = Message::user(question, Some(prompt_tokens));
        let model_msg = Message::model(reply.clone(), Some(reply_tokens));
        self.store
            .append_messages(
                conversation_id,
                user_msg.clone(),
                model_msg.clone(),
                conversation.revision,
            )
            .await
            .map_err(|e| {
                tracing::error!(conversation_id, "failed to append follow-up turns: {e:#}");
                ReadingError::Generation(e)
            })?;

        let mut updated_history = conversation.history;
        updated_history.push(user_msg);
        updated_history.push(model_msg);

        Ok(ContinuedReading {
            response: reply,
            updated_history,
        })
    }

    /// Lists the verified caller's past readings, newest first.
    pub async fn list_readings(
        &self,
        credential: &str,
    ) -> Result<Vec<ConversationSummary>, ReadingError> {
        let user_id = self.verify(credential).await?;
        self.store
            .list_for_user(&user_id)
            .await
            .map_err(ReadingError::Generation)
    }
}

/// A spread is valid when it is non-empty, every card carries a non-blank
/// name and position, and no position repeats.
fn validate_spread(cards: &[TarotCard]) -> Result<(), ReadingError> {
    if cards.is_empty() {
        return Err(ReadingError::InvalidSelection);
    }
    let mut positions = HashSet::new();
    for card in cards {
        if card.name.trim().is_empty() || card.position.trim().is_empty() {
            return Err(ReadingError::InvalidSelection);
        }
        if !positions.insert(card.position.as_str()) {
            return Err(ReadingError::InvalidSelection);
        }
    }
    Ok(())
}
