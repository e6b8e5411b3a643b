//! Application controller
//!
//! `VisionChat` owns the whole session: the conversation store, the current request
//! parameters, the last upload and the in-flight exchange. Every presentation intent
//! goes through it. The state lock is only held between awaits on the transport, so
//! selecting or deleting a conversation while an answer streams is always possible and
//! cancels that exchange.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use vision_core::{
    build_request, AppendOutcome, ConversationId, ConversationStore, ConversationSummary,
    ImageAttachment, RequestParameters, Speaker, StoreError, Turn,
};
use vision_llm::VisionProvider;

use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::events::ExchangeEvent;
use crate::stream::consume_vision_stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub conversation_id: ConversationId,
    /// False when the upload repeated the previous one and its conversation was reused.
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOutcome {
    pub conversation_id: ConversationId,
    pub content: String,
}

/// Snapshot of the active conversation for rendering.
#[derive(Debug, Clone)]
pub struct ActiveConversationView {
    pub id: ConversationId,
    pub title: String,
    pub image: ImageAttachment,
    pub turns: Vec<Turn>,
}

struct InFlight {
    exchange_id: u64,
    conversation_id: ConversationId,
    cancel_token: CancellationToken,
}

struct SessionState {
    store: ConversationStore,
    params: RequestParameters,
    last_upload: Option<(ImageAttachment, ConversationId)>,
    in_flight: Option<InFlight>,
    next_exchange_id: u64,
}

impl SessionState {
    fn cancel_in_flight_where(&mut self, predicate: impl Fn(ConversationId) -> bool) -> bool {
        match self.in_flight.take() {
            Some(in_flight) if predicate(in_flight.conversation_id) => {
                log::info!(
                    "Cancelling in-flight exchange for {}",
                    in_flight.conversation_id
                );
                in_flight.cancel_token.cancel();
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }
}

pub struct VisionChat {
    state: Mutex<SessionState>,
    provider: Arc<dyn VisionProvider>,
    config: ExchangeConfig,
}

impl VisionChat {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self::with_config(provider, ExchangeConfig::default())
    }

    pub fn with_config(provider: Arc<dyn VisionProvider>, config: ExchangeConfig) -> Self {
        Self {
            state: Mutex::new(SessionState {
                store: ConversationStore::with_append_policy(config.append_policy),
                params: RequestParameters::default(),
                last_upload: None,
                in_flight: None,
                next_exchange_id: 0,
            }),
            provider,
            config,
        }
    }

    /// Start a conversation for an uploaded image and make it active.
    ///
    /// Repeating the previous upload (same name, same image) re-selects its conversation
    /// instead of creating another one.
    pub async fn upload_image(
        &self,
        bytes: &[u8],
        name: impl Into<String>,
    ) -> Result<UploadOutcome, StoreError> {
        let image = ImageAttachment::from_upload(bytes, name)?;
        let mut state = self.state.lock().await;

        let repeated = state
            .last_upload
            .as_ref()
            .filter(|(last_image, last_id)| {
                *last_image == image && state.store.get(*last_id).is_some()
            })
            .map(|(_, last_id)| *last_id);
        if let Some(last_id) = repeated {
            state.store.select_conversation(last_id)?;
            state.cancel_in_flight_where(|id| id != last_id);
            return Ok(UploadOutcome {
                conversation_id: last_id,
                created: false,
            });
        }

        let id = state.store.create_conversation(image.clone());
        state.cancel_in_flight_where(|_| true);
        state.store.select_conversation(id)?;
        state.last_upload = Some((image, id));
        Ok(UploadOutcome {
            conversation_id: id,
            created: true,
        })
    }

    /// Switch conversations. An exchange streaming into another conversation is cancelled.
    pub async fn select_conversation(&self, id: ConversationId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.store.select_conversation(id)?;
        state.cancel_in_flight_where(|in_flight| in_flight != id);
        Ok(())
    }

    /// Delete a conversation, cancelling its in-flight exchange if there is one.
    pub async fn delete_conversation(&self, id: ConversationId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.store.delete_conversation(id)?;
        state.cancel_in_flight_where(|in_flight| in_flight == id);
        Ok(())
    }

    /// Stop the current exchange, if any.
    pub async fn cancel_in_flight(&self) -> bool {
        self.state.lock().await.cancel_in_flight_where(|_| true)
    }

    pub async fn list_conversations(&self) -> Vec<ConversationSummary> {
        self.state.lock().await.store.list_conversations()
    }

    pub async fn active_view(&self) -> Option<ActiveConversationView> {
        let state = self.state.lock().await;
        state
            .store
            .active_conversation()
            .map(|conversation| ActiveConversationView {
                id: conversation.id(),
                title: conversation.title().to_string(),
                image: conversation.image().clone(),
                turns: conversation.turns().to_vec(),
            })
    }

    pub async fn parameters(&self) -> RequestParameters {
        self.state.lock().await.params
    }

    pub async fn set_parameters(&self, params: RequestParameters) -> Result<(), StoreError> {
        params.validate()?;
        self.state.lock().await.params = params;
        Ok(())
    }

    pub async fn set_parameter(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.state.lock().await.params.set(name, value)
    }

    pub async fn reset_parameters(&self) {
        self.state.lock().await.params = RequestParameters::default();
    }

    /// Ask a question about the active conversation's image.
    ///
    /// The user turn is stored before the request goes out. The assistant turn is stored
    /// once, only when the stream completes normally and the exchange was not cancelled
    /// in the meantime. Progress is reported on `event_tx`.
    pub async fn submit_query(
        &self,
        query: &str,
        event_tx: &mpsc::Sender<ExchangeEvent>,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        if query.trim().is_empty() {
            return Err(ExchangeError::EmptyQuery);
        }

        let (exchange_id, conversation_id, messages, params, cancel_token) = {
            let mut state = self.state.lock().await;
            let conversation = state
                .store
                .active_conversation()
                .ok_or(StoreError::NoActiveConversation)?;
            let conversation_id = conversation.id();
            let messages = build_request(
                state.store.active_context(),
                conversation.image(),
                query,
            );

            state.store.append_turn(Speaker::User, query)?;
            state.cancel_in_flight_where(|_| true);

            state.next_exchange_id += 1;
            let exchange_id = state.next_exchange_id;
            let cancel_token = CancellationToken::new();
            state.in_flight = Some(InFlight {
                exchange_id,
                conversation_id,
                cancel_token: cancel_token.clone(),
            });
            (exchange_id, conversation_id, messages, state.params, cancel_token)
        };

        let label = conversation_id.to_string();
        log::info!(
            "[{}] Sending query with {} context messages",
            label,
            messages.len().saturating_sub(2)
        );

        let stream = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                let _ = event_tx.send(ExchangeEvent::Cancelled).await;
                return Err(ExchangeError::Cancelled { partial: String::new() });
            }
            result = self.provider.chat_stream(&messages, &params) => result,
        };

        let result = match stream {
            Ok(stream) => {
                consume_vision_stream(stream, event_tx, &cancel_token, &self.config, &label).await
            }
            Err(error) => {
                log::warn!("[{}] Request failed: {}", label, error);
                let _ = event_tx
                    .send(ExchangeEvent::Failed {
                        partial: String::new(),
                        message: error.to_string(),
                    })
                    .await;
                Err(ExchangeError::LLM {
                    source: error,
                    partial: String::new(),
                })
            }
        };

        let mut state = self.state.lock().await;
        if state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.exchange_id == exchange_id)
        {
            state.in_flight = None;
        }

        let content = result?;

        // A cancel that raced with the last fragment still wins.
        if cancel_token.is_cancelled() || state.store.active_id() != Some(conversation_id) {
            drop(state);
            let _ = event_tx.send(ExchangeEvent::Cancelled).await;
            return Err(ExchangeError::Cancelled { partial: content });
        }

        match state.store.append_turn(Speaker::Assistant, content.clone())? {
            AppendOutcome::Appended => {}
            AppendOutcome::Ignored => log::debug!("[{}] Assistant turn ignored", label),
        }
        drop(state);

        let _ = event_tx
            .send(ExchangeEvent::Complete {
                content: content.clone(),
            })
            .await;

        Ok(ExchangeOutcome {
            conversation_id,
            content,
        })
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
