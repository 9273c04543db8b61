//! Streaming answer session: one question in, incremental answer out.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lchat::{AnswerChannel, FixedSettings, Session, StreamingAnswerSession};
//! use lprovider::HttpCompletionTransport;
//!
//! # async fn run() -> Result<(), lchat::ChatError> {
//! let answers = StreamingAnswerSession::builder(
//!     Arc::new(HttpCompletionTransport::default()),
//!     Arc::new(FixedSettings::default()),
//! )
//! .build();
//!
//! let (channel, mut notifications) = AnswerChannel::new();
//! let mut session = Session::new();
//! let outcome = answers.ask(&channel, &mut session, "hello").await?;
//! assert!(outcome.is_completed());
//! while let Ok(notification) = notifications.try_recv() {
//!     println!("{}", serde_json::to_string(&notification).unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use lcommon::RequestId;
use lprovider::{
    CompletionTransport, FormatterRegistry, LlamaCppEndpoint, PromptRequest, ProviderError,
    ProviderErrorKind, StreamEvent, TransportRequest, decode_event,
};
use tokio_util::sync::CancellationToken;

use crate::channel::ListenerGuard;
use crate::store::{build_prompt_turns, commit};
use crate::{
    AbortReason, AnswerChannel, AnswerNotification, AnswerSettings, ChatError, NoopSessionHooks,
    Session, SessionHooks, SessionOutcome, SessionState, SettingsSource,
};

#[derive(Clone)]
pub struct StreamingAnswerSession {
    transport: Arc<dyn CompletionTransport>,
    settings: Arc<dyn SettingsSource>,
    endpoint: LlamaCppEndpoint,
    formatters: Arc<FormatterRegistry>,
    hooks: Arc<dyn SessionHooks>,
}

impl StreamingAnswerSession {
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        Self::builder(transport, settings).build()
    }

    pub fn builder(
        transport: Arc<dyn CompletionTransport>,
        settings: Arc<dyn SettingsSource>,
    ) -> StreamingAnswerSessionBuilder {
        StreamingAnswerSessionBuilder::new(transport, settings)
    }

    pub fn endpoint(&self) -> &LlamaCppEndpoint {
        &self.endpoint
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Streams an answer to `question` through `channel`.
    ///
    /// `session` is only modified when the server sends its stop event. A
    /// request that is cancelled, replaced, or disconnected returns
    /// `Ok(SessionOutcome::Aborted)` and leaves `session` untouched.
    pub async fn ask(
        &self,
        channel: &AnswerChannel,
        session: &mut Session,
        question: &str,
    ) -> Result<SessionOutcome, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::invalid_request("question must not be empty"));
        }

        let guard = channel.attach()?;
        let mut active = ActiveAnswer::new(channel, &guard, self.hooks.as_ref());
        self.drive(&mut active, session, question).await
    }

    async fn drive(
        &self,
        active: &mut ActiveAnswer<'_>,
        session: &mut Session,
        question: &str,
    ) -> Result<SessionOutcome, ChatError> {
        active.transition(SessionState::Requesting);

        let loaded = match active.interruptible(self.settings.load()).await {
            Ok(loaded) => loaded,
            Err(reason) => return Ok(active.abort(reason)),
        };
        let (request, model_id) =
            match loaded.and_then(|settings| self.prepare_request(&settings, session, question)) {
                Ok(prepared) => prepared,
                Err(error) => return Err(active.fail(error)),
            };
        active.on_request_start(&model_id);

        let opened = match active
            .interruptible(self.transport.send(request, active.cancellation().clone()))
            .await
        {
            Ok(opened) => opened,
            Err(reason) => return Ok(active.abort(reason)),
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(error) => return active.fail_provider(error),
        };
        active.on_stream_start();

        loop {
            let next = match active.interruptible(stream.next()).await {
                Ok(next) => next,
                Err(reason) => return Ok(active.abort(reason)),
            };

            let payload = match next {
                Some(Ok(payload)) => payload,
                Some(Err(error)) => return active.fail_provider(error),
                None => return Ok(active.on_end()),
            };

            match active.on_message(&payload) {
                Flow::Continue => {}
                Flow::Stop => break,
                Flow::Disconnected => return Ok(active.abort(AbortReason::Disconnected)),
            }
        }

        drop(stream);
        Ok(active.complete(session, question))
    }

    fn prepare_request(
        &self,
        settings: &AnswerSettings,
        session: &Session,
        question: &str,
    ) -> Result<(TransportRequest, String), ChatError> {
        settings.validate()?;

        let template = self.formatters.resolve(&settings.model_id);
        let history = session.windowed(settings.max_conversation_context_length);
        let turns = build_prompt_turns(history, &settings.system_prompt, question);
        let request = PromptRequest::new(template.format(&turns), settings.sampling_for(template));

        let transport_request = self.endpoint.build_request(&request)?;
        Ok((transport_request, settings.model_id.clone()))
    }
}

pub struct StreamingAnswerSessionBuilder {
    transport: Arc<dyn CompletionTransport>,
    settings: Arc<dyn SettingsSource>,
    endpoint: LlamaCppEndpoint,
    formatters: Arc<FormatterRegistry>,
    hooks: Arc<dyn SessionHooks>,
}

impl StreamingAnswerSessionBuilder {
    pub fn new(transport: Arc<dyn CompletionTransport>, settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            transport,
            settings,
            endpoint: LlamaCppEndpoint::default(),
            formatters: Arc::new(FormatterRegistry::default()),
            hooks: Arc::new(NoopSessionHooks),
        }
    }

    pub fn endpoint(mut self, endpoint: LlamaCppEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn formatters(mut self, formatters: Arc<FormatterRegistry>) -> Self {
        self.formatters = formatters;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> StreamingAnswerSession {
        StreamingAnswerSession {
            transport: self.transport,
            settings: self.settings,
            endpoint: self.endpoint,
            formatters: self.formatters,
            hooks: self.hooks,
        }
    }
}

enum Flow {
    Continue,
    Stop,
    Disconnected,
}

/// Per-request state. Dropped together with its listener guard.
struct ActiveAnswer<'a> {
    channel: &'a AnswerChannel,
    guard: &'a ListenerGuard,
    hooks: &'a dyn SessionHooks,
    state: SessionState,
    answer: String,
    deltas: usize,
    started: Instant,
}

impl<'a> ActiveAnswer<'a> {
    fn new(channel: &'a AnswerChannel, guard: &'a ListenerGuard, hooks: &'a dyn SessionHooks) -> Self {
        Self {
            channel,
            guard,
            hooks,
            state: SessionState::Idle,
            answer: String::new(),
            deltas: 0,
            started: Instant::now(),
        }
    }

    fn request_id(&self) -> &RequestId {
        self.guard.request_id()
    }

    fn cancellation(&self) -> &CancellationToken {
        self.guard.cancellation()
    }

    async fn interruptible<F>(&self, future: F) -> Result<F::Output, AbortReason>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancellation().cancelled() => Err(AbortReason::Cancelled),
            _ = self.channel.disconnected() => Err(AbortReason::Disconnected),
            output = future => Ok(output),
        }
    }

    fn transition(&mut self, state: SessionState) {
        tracing::debug!(
            phase = "session",
            event = "state_change",
            request_id = %self.request_id(),
            from = ?self.state,
            to = ?state
        );
        self.state = state;
        self.hooks.on_state_change(self.guard.request_id(), state);
    }

    fn on_request_start(&self, model_id: &str) {
        self.hooks.on_request_start(self.request_id(), model_id);
    }

    fn on_stream_start(&mut self) {
        self.transition(SessionState::Streaming);
        self.hooks.on_stream_start(self.guard.request_id());
    }

    fn on_message(&mut self, payload: &str) -> Flow {
        tracing::debug!(
            phase = "session",
            event = "payload",
            request_id = %self.request_id(),
            payload
        );

        match decode_event(payload) {
            StreamEvent::Delta(text) => {
                self.answer.push_str(&text);
                self.deltas += 1;
                let posted = self.channel.post(AnswerNotification::Progress {
                    answer: self.answer.clone(),
                });
                if posted {
                    Flow::Continue
                } else {
                    Flow::Disconnected
                }
            }
            StreamEvent::Malformed => {
                tracing::debug!(
                    phase = "session",
                    event = "malformed_payload",
                    request_id = %self.request_id(),
                    payload
                );
                self.hooks.on_malformed_payload(self.request_id(), payload);
                Flow::Continue
            }
            StreamEvent::Stop => Flow::Stop,
        }
    }

    fn complete(&mut self, session: &mut Session, question: &str) -> SessionOutcome {
        commit(session, question, self.answer.as_str());
        self.transition(SessionState::Completed);

        self.channel.post(AnswerNotification::Completed {
            session: session.clone(),
        });
        self.channel.post(AnswerNotification::StreamEnd);

        self.hooks
            .on_completed(self.guard.request_id(), self.deltas, self.started.elapsed());
        SessionOutcome::Completed {
            answer: std::mem::take(&mut self.answer),
        }
    }

    /// The server closed the stream without a stop event.
    fn on_end(&mut self) -> SessionOutcome {
        self.channel.post(AnswerNotification::StreamEnd);
        self.abort(AbortReason::StreamClosed)
    }

    fn abort(&mut self, reason: AbortReason) -> SessionOutcome {
        self.transition(SessionState::Aborted);
        self.hooks
            .on_aborted(self.guard.request_id(), reason, self.started.elapsed());

        SessionOutcome::Aborted {
            reason,
            partial_answer: std::mem::take(&mut self.answer),
        }
    }

    fn fail(&mut self, error: ChatError) -> ChatError {
        self.transition(SessionState::Failed);
        self.hooks
            .on_failed(self.guard.request_id(), &error, self.started.elapsed());
        error
    }

    fn fail_provider(&mut self, error: ProviderError) -> Result<SessionOutcome, ChatError> {
        if error.kind == ProviderErrorKind::Cancelled && self.cancellation().is_cancelled() {
            return Ok(self.abort(AbortReason::Cancelled));
        }

        Err(self.fail(error.into()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use lcommon::RequestId;
    use lprovider::{
        BoxedMessageStream, CompletionTransport, ProviderError, ProviderFuture, TransportRequest,
        VecMessageStream,
    };
    use tokio_util::sync::CancellationToken;

    use super::StreamingAnswerSession;
    use crate::{
        AbortReason, AnswerChannel, AnswerNotification, AnswerSettings, ChatErrorKind,
        FixedSettings, Session, SessionHooks, SessionOutcome, SessionState,
    };

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        payloads: Vec<String>,
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(payloads: &[&str]) -> Self {
            Self {
                payloads: payloads.iter().map(|payload| payload.to_string()).collect(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionTransport for ScriptedTransport {
        fn send<'a>(
            &'a self,
            request: TransportRequest,
            _cancellation: CancellationToken,
        ) -> ProviderFuture<'a, Result<BoxedMessageStream<'a>, ProviderError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                let stream: BoxedMessageStream<'a> =
                    Box::pin(VecMessageStream::from_payloads(self.payloads.clone()));
                Ok(stream)
            })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        states: Mutex<Vec<SessionState>>,
        malformed: Mutex<Vec<String>>,
        aborted: Mutex<Vec<AbortReason>>,
    }

    impl SessionHooks for RecordingHooks {
        fn on_state_change(&self, _request_id: &RequestId, state: SessionState) {
            self.states.lock().expect("states lock").push(state);
        }

        fn on_malformed_payload(&self, _request_id: &RequestId, payload: &str) {
            self.malformed
                .lock()
                .expect("malformed lock")
                .push(payload.to_string());
        }

        fn on_aborted(&self, _request_id: &RequestId, reason: AbortReason, _elapsed: Duration) {
            self.aborted.lock().expect("aborted lock").push(reason);
        }
    }

    fn session_with(
        transport: Arc<ScriptedTransport>,
        hooks: Arc<RecordingHooks>,
    ) -> StreamingAnswerSession {
        StreamingAnswerSession::builder(
            transport,
            Arc::new(FixedSettings::new(AnswerSettings::default())),
        )
        .hooks(hooks)
        .build()
    }

    #[tokio::test]
    async fn stop_event_commits_and_posts_completion_then_end() {
        let transport = Arc::new(ScriptedTransport::new(&[
            r#"{"content":"Hel"}"#,
            r#"{"content":"lo"}"#,
            r#"{"content":"","stop":true}"#,
        ]));
        let hooks = Arc::new(RecordingHooks::default());
        let answers = session_with(transport, hooks.clone());

        let (channel, mut notifications) = AnswerChannel::new();
        let mut session = Session::new();
        let outcome = answers
            .ask(&channel, &mut session, "hi")
            .await
            .expect("ask should succeed");

        assert_eq!(
            outcome,
            SessionOutcome::Completed {
                answer: "Hello".to_string()
            }
        );
        assert_eq!(session.conversation_records.len(), 2);
        assert_eq!(session.conversation_records[1].content, "Hello");

        let mut received = Vec::new();
        while let Ok(notification) = notifications.try_recv() {
            received.push(notification);
        }
        assert_eq!(
            received,
            vec![
                AnswerNotification::Progress {
                    answer: "Hel".to_string()
                },
                AnswerNotification::Progress {
                    answer: "Hello".to_string()
                },
                AnswerNotification::Completed {
                    session: session.clone()
                },
                AnswerNotification::StreamEnd,
            ]
        );
        assert_eq!(
            *hooks.states.lock().expect("states lock"),
            vec![
                SessionState::Requesting,
                SessionState::Streaming,
                SessionState::Completed
            ]
        );
        assert!(channel.active_request().is_none());
    }

    #[tokio::test]
    async fn stream_closed_without_stop_aborts_without_commit() {
        let transport = Arc::new(ScriptedTransport::new(&[r#"{"content":"partial"}"#]));
        let hooks = Arc::new(RecordingHooks::default());
        let answers = session_with(transport, hooks.clone());

        let (channel, mut notifications) = AnswerChannel::new();
        let mut session = Session::new();
        let outcome = answers
            .ask(&channel, &mut session, "hi")
            .await
            .expect("ask should not fail");

        assert_eq!(
            outcome,
            SessionOutcome::Aborted {
                reason: AbortReason::StreamClosed,
                partial_answer: "partial".to_string()
            }
        );
        assert!(session.conversation_records.is_empty());
        assert!(matches!(
            notifications.try_recv(),
            Ok(AnswerNotification::Progress { .. })
        ));
        assert_eq!(notifications.try_recv(), Ok(AnswerNotification::StreamEnd));
        assert!(notifications.try_recv().is_err());
        assert_eq!(
            *hooks.aborted.lock().expect("aborted lock"),
            vec![AbortReason::StreamClosed]
        );
    }

    #[tokio::test]
    async fn malformed_payloads_are_reported_and_skipped() {
        let transport = Arc::new(ScriptedTransport::new(&[
            "garbage",
            r#"{"content":"ok"}"#,
            r#"{"unexpected":1}"#,
            r#"{"stop":true}"#,
        ]));
        let hooks = Arc::new(RecordingHooks::default());
        let answers = session_with(transport, hooks.clone());

        let (channel, _notifications) = AnswerChannel::new();
        let mut session = Session::new();
        let outcome = answers
            .ask(&channel, &mut session, "hi")
            .await
            .expect("ask should succeed");

        assert_eq!(
            outcome,
            SessionOutcome::Completed {
                answer: "ok".to_string()
            }
        );
        assert_eq!(
            *hooks.malformed.lock().expect("malformed lock"),
            vec!["garbage".to_string(), r#"{"unexpected":1}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn empty_question_is_rejected_before_attaching() {
        let transport = Arc::new(ScriptedTransport::new(&[]));
        let answers = session_with(transport.clone(), Arc::new(RecordingHooks::default()));

        let (channel, mut notifications) = AnswerChannel::new();
        let mut session = Session::new();
        let error = answers
            .ask(&channel, &mut session, "   ")
            .await
            .expect_err("empty question should fail");

        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
        assert_eq!(error.message, "question must not be empty");

        let error = answers
            .ask(&channel, &mut session, "")
            .await
            .expect_err("empty question should fail");
        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);

        assert!(notifications.try_recv().is_err());
        assert!(transport.requests.lock().expect("requests lock").is_empty());
        assert!(channel.active_request().is_none());
        assert!(session.conversation_records.is_empty());
    }

    #[tokio::test]
    async fn invalid_settings_fail_without_sending() {
        let transport = Arc::new(ScriptedTransport::new(&[]));
        let answers = StreamingAnswerSession::new(
            transport.clone(),
            Arc::new(FixedSettings::new(
                AnswerSettings::default().with_temperature(9.0),
            )),
        );

        let (channel, _notifications) = AnswerChannel::new();
        let mut session = Session::new();
        let error = answers
            .ask(&channel, &mut session, "hi")
            .await
            .expect_err("settings should be rejected");

        assert_eq!(error.kind, ChatErrorKind::Settings);
        assert!(transport.requests.lock().expect("requests lock").is_empty());
        assert!(channel.active_request().is_none());
    }

    #[tokio::test]
    async fn cancel_without_active_request_is_a_noop() {
        let transport = Arc::new(ScriptedTransport::new(&[r#"{"stop":true}"#]));
        let answers = session_with(transport, Arc::new(RecordingHooks::default()));
        let (channel, _notifications) = AnswerChannel::new();

        assert!(!channel.cancel());
        let mut session = Session::new();
        let outcome = answers
            .ask(&channel, &mut session, "hi")
            .await
            .expect("ask should succeed");
        assert!(outcome.is_completed());
    }
}
