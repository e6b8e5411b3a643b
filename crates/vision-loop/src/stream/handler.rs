use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use vision_llm::{LLMChunk, LLMStream};

use crate::config::ExchangeConfig;
use crate::error::ExchangeError;
use crate::events::ExchangeEvent;
use crate::stream::coalescer::ChunkCoalescer;

/// Drive one completion stream to its end.
///
/// Emits coalesced `Increment` events while fragments arrive and returns the full text
/// on normal completion. A transport error flushes the buffered remainder, emits
/// `Failed` with the partial text and returns it inside the error. Cancellation stops
/// reading immediately and emits `Cancelled`.
pub async fn consume_vision_stream(
    mut stream: LLMStream,
    event_tx: &mpsc::Sender<ExchangeEvent>,
    cancel_token: &CancellationToken,
    config: &ExchangeConfig,
    label: &str,
) -> Result<String, ExchangeError> {
    let mut content = String::new();
    let mut coalescer = ChunkCoalescer::new(config.flush_threshold);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log::debug!("[{}] Exchange cancelled after {} chars", label, content.len());
                let _ = event_tx.send(ExchangeEvent::Cancelled).await;
                return Err(ExchangeError::Cancelled { partial: content });
            }
            next = stream.next() => next,
        };

        match next {
            Some(Ok(LLMChunk::Token(token))) => {
                content.push_str(&token);
                if let Some(increment) = coalescer.push(&token) {
                    let _ = event_tx
                        .send(ExchangeEvent::Increment { content: increment })
                        .await;
                    if !config.pacing.is_zero() {
                        tokio::time::sleep(config.pacing).await;
                    }
                }
            }
            Some(Ok(LLMChunk::Done)) | None => {
                log::debug!("[{}] Stream completed", label);
                break;
            }
            Some(Err(error)) => {
                log::warn!("[{}] Stream failed: {}", label, error);
                if let Some(rest) = coalescer.finish() {
                    let _ = event_tx.send(ExchangeEvent::Increment { content: rest }).await;
                }
                let _ = event_tx
                    .send(ExchangeEvent::Failed {
                        partial: content.clone(),
                        message: error.to_string(),
                    })
                    .await;
                return Err(ExchangeError::LLM {
                    source: error,
                    partial: content,
                });
            }
        }
    }

    if let Some(rest) = coalescer.finish() {
        let _ = event_tx.send(ExchangeEvent::Increment { content: rest }).await;
    }

    Ok(content)
}
