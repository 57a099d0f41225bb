use std::pin::Pin;
use std::task::{Context, Poll, ready};

use neuro_chat_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::{Sse, SseError};
use crate::proto::{ChatCompletionChunk, ErrorEnvelope};

struct PartialState {
    sse: Sse,
    // Set when a chunk carries both a delta and a finish reason. The delta
    // is emitted first, the completion on the next poll.
    pending_finish_reason: Option<ModelFinishReason>,
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            pending_finish_reason: None,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(
    mut partial_state: PartialState,
) -> Result<(Option<ModelResponseEvent>, PartialState), Error> {
    if let Some(reason) = partial_state.pending_finish_reason.take() {
        return Ok((Some(ModelResponseEvent::Completed(reason)), partial_state));
    }

    loop {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(SseError::ChunksError(_)) => {
                return Err(Error::new(
                    "response stream was interrupted",
                    ErrorKind::Network,
                ));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event.trim() == "[DONE]" {
            break;
        }

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&sse_event)
        {
            return Err(Error::new(envelope.error.message, ErrorKind::Other));
        }

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(
            &sse_event,
        ) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!("skipping malformed chunk: {err}");
                continue;
            }
        };

        let Some(choice) = chunk.choices.into_iter().next() else {
            // Usage-only chunks carry no choices.
            continue;
        };

        if let Some(finish_reason) = choice.finish_reason {
            partial_state.pending_finish_reason =
                Some(if finish_reason == "length" {
                    ModelFinishReason::Length
                } else {
                    ModelFinishReason::Stop
                });
        }

        let delta = choice.delta.content.unwrap_or_default();
        if !delta.is_empty() {
            return Ok((
                Some(ModelResponseEvent::MessageDelta(delta)),
                partial_state,
            ));
        }

        if let Some(reason) = partial_state.pending_finish_reason.take() {
            return Ok((
                Some(ModelResponseEvent::Completed(reason)),
                partial_state,
            ));
        }
    }

    Ok((None, partial_state))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;

    use super::*;
    use crate::io::{Chunks, ChunksError};

    async fn collect(
        chunks: Chunks,
    ) -> Result<(String, Option<ModelFinishReason>), Error> {
        let mut resp = pin!(OpenAIResponse::from_sse(Sse::new(chunks)));
        let mut text = String::new();
        let mut finish_reason = None;
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await?
        {
            match event {
                ModelResponseEvent::MessageDelta(delta) => {
                    text.push_str(&delta);
                }
                ModelResponseEvent::Completed(reason) => {
                    finish_reason = Some(reason);
                }
            }
        }
        Ok((text, finish_reason))
    }

    fn chunks_of(data: &[&'static str]) -> Chunks {
        let chunks: VecDeque<Bytes> =
            data.iter().map(|s| Bytes::from_static(s.as_bytes())).collect();
        Chunks::from_vec_deque(chunks)
    }

    #[tokio::test]
    async fn test_simple_events() {
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(include_bytes!(
                "../fixtures/test_response.txt"
            ))]
            .into(),
        );
        let (text, finish_reason) = collect(chunks).await.unwrap();
        assert_eq!(
            text,
            "Hello! It sounds like you're preparing for exams.\n\
             What subject worries you most?"
        );
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_malformed_chunks_are_skipped() {
        let chunks = chunks_of(&[
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
            "data: {not json}\n\n",
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{},\"finish_reason\":null}]}\n\n",
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n\n",
            "data: [DONE]\n\n",
        ]);
        let (text, finish_reason) = collect(chunks).await.unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(finish_reason, None);
    }

    #[tokio::test]
    async fn test_undecodable_event_is_skipped() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(
                    b"data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                ),
                Bytes::from_static(
                    b"data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"\xFF\"}}]}\n\n",
                ),
                Bytes::from_static(
                    b"data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
                ),
                Bytes::from_static(b"data: [DONE]\n\n"),
            ]
            .into(),
        );
        let (text, finish_reason) = collect(chunks).await.unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_delta_with_finish_reason() {
        let chunks = chunks_of(&[
            "data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Cut\"},\"finish_reason\":\"length\"}]}\n\n",
            "data: [DONE]\n\n",
        ]);
        let mut resp = pin!(OpenAIResponse::from_sse(Sse::new(chunks)));
        let mut events = vec![];
        while let Some(event) = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
            .await
            .unwrap()
        {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("Cut".to_owned()),
                ModelResponseEvent::Completed(ModelFinishReason::Length),
            ]
        );

        // Exhausted responses stay exhausted.
        let next = poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await;
        assert!(matches!(next, Ok(None)));
    }

    #[tokio::test]
    async fn test_interrupted_stream() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(
                    b"data: {\"id\":\"1\",\"choices\":[{\"delta\":{\"content\":\"Partial\"},\"finish_reason\":null}]}\n\n",
                )),
                Err(ChunksError),
            ]
            .into(),
        );
        let err = collect(chunks).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_error_event() {
        let chunks = chunks_of(&[
            "data: {\"error\":{\"message\":\"Service Unavailable\",\"type\":\"internal_server_error\"}}\n\n",
        ]);
        let err = collect(chunks).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Other);
        assert_eq!(err.message(), "Service Unavailable");
    }
}
