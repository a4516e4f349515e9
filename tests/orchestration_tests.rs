use async_trait::async_trait;
use roundtable::client_wrapper::{ClientError, ClientWrapper, GenerationParams, Message, Role};
use roundtable::completion::{ERROR_REPLY, NO_CONTENT_REPLY};
use roundtable::event::{EventHandler, SessionEvent};
use roundtable::orchestration::{
    Orchestration, OrchestrationError, SessionSettings, SessionState, ADMIN_CONTEXT_PREFIX,
};
use roundtable::{Agent, AgentRegistry};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Replies `"<model> #<call>"` and records every request it sees.
#[derive(Default)]
struct MockClient {
    requests: Mutex<Vec<(Vec<Message>, GenerationParams)>>,
}

impl MockClient {
    fn requests(&self) -> Vec<(Vec<Message>, GenerationParams)> {
        self.requests.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    async fn send_message(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Option<String>, ClientError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push((messages.to_vec(), params.clone()));
        Ok(Some(format!("{} #{}", params.model, requests.len())))
    }
}

struct FailingClient {
    calls: Mutex<usize>,
}

#[async_trait]
impl ClientWrapper for FailingClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _params: &GenerationParams,
    ) -> Result<Option<String>, ClientError> {
        *self.calls.lock().unwrap() += 1;
        Err(ClientError::Transport("connection refused".to_string()))
    }
}

struct EmptyClient;

#[async_trait]
impl ClientWrapper for EmptyClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _params: &GenerationParams,
    ) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

/// Answers normally until call `cancel_on_call` (1-based), then cancels and hangs.
struct CancellingClient {
    cancel_on_call: usize,
    token: CancellationToken,
    calls: Mutex<usize>,
}

#[async_trait]
impl ClientWrapper for CancellingClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _params: &GenerationParams,
    ) -> Result<Option<String>, ClientError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if call == self.cancel_on_call {
            self.token.cancel();
            std::future::pending::<()>().await;
        }
        Ok(Some(format!("reply {}", call)))
    }
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<SessionEvent>>,
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn on_session_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Cancels the session as soon as the given zero-based turn has been displayed.
struct CancelAfterTurn {
    turn: usize,
    token: CancellationToken,
}

#[async_trait]
impl EventHandler for CancelAfterTurn {
    async fn on_session_event(&self, event: &SessionEvent) {
        if let SessionEvent::TurnCompleted { turn, .. } = event {
            if *turn == self.turn {
                self.token.cancel();
            }
        }
    }
}

fn registry(models: &[&str]) -> AgentRegistry {
    AgentRegistry::new(
        models
            .iter()
            .enumerate()
            .map(|(i, model)| {
                Agent::new(format!("Agent {}", i + 1), format!("persona {}", i), *model)
                    .with_display_tag(if i % 2 == 0 { "purple" } else { "cyan" })
            })
            .collect(),
    )
    .unwrap()
}

fn settings(max_turns: usize, history_window_size: usize) -> SessionSettings {
    SessionSettings {
        max_turns,
        history_window_size,
        inter_turn_delay: Duration::ZERO,
        seed_prompt: "start".to_string(),
        admin_instruction: "solve the puzzle".to_string(),
    }
}

fn assistant_contents(orchestration: &Orchestration) -> Vec<String> {
    orchestration
        .history()
        .messages()
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.to_string())
        .collect()
}

#[tokio::test]
async fn test_two_agents_four_turns_alternate() {
    let client = Arc::new(MockClient::default());
    let mut orchestration =
        Orchestration::new(registry(&["model-a", "model-b"]), client.clone())
            .with_settings(settings(4, 40));

    let outcome = orchestration.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.state, SessionState::Completed);
    assert_eq!(orchestration.state(), SessionState::Completed);
    assert_eq!(outcome.turns_completed, 4);
    assert_eq!(orchestration.history().len(), 8);

    let speakers: Vec<String> = client
        .requests()
        .iter()
        .map(|(_, params)| params.model.clone())
        .collect();
    assert_eq!(speakers, vec!["model-a", "model-b", "model-a", "model-b"]);

    // final message is agent[1]'s reply on turn 4
    assert_eq!(outcome.final_message, "model-b #4");

    // each input is the previous reply; the first is the seed
    let history = orchestration.history().messages();
    assert_eq!(&*history[0].content, "start");
    for t in 1..4 {
        assert_eq!(history[2 * t].content, history[2 * t - 1].content);
        assert_eq!(history[2 * t].role, Role::User);
    }
}

#[tokio::test]
async fn test_rotation_is_round_robin_for_three_agents() {
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["m0", "m1", "m2"]), client.clone())
        .with_settings(settings(7, 40));

    orchestration.run(CancellationToken::new()).await.unwrap();

    let requests = client.requests();
    for (t, (messages, params)) in requests.iter().enumerate() {
        assert_eq!(params.model, format!("m{}", t % 3));
        assert_eq!(&*messages[0].content, format!("persona {}", t % 3));
    }
}

#[tokio::test]
async fn test_history_grows_by_two_and_window_is_bounded() {
    let window = 5;
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(8, window));

    orchestration.run(CancellationToken::new()).await.unwrap();

    assert_eq!(orchestration.history().len(), 16);
    for (t, (messages, _)) in client.requests().iter().enumerate() {
        let admin = usize::from(t == 0);
        let history_segment = messages.len() - 2 - admin;
        assert_eq!(history_segment, (2 * t).min(window), "turn {}", t);
    }
}

#[tokio::test]
async fn test_admin_context_only_on_first_turn() {
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(4, 40));

    orchestration.run(CancellationToken::new()).await.unwrap();

    let requests = client.requests();
    let first = &requests[0].0;
    assert_eq!(first[1].role, Role::System);
    assert_eq!(
        &*first[1].content,
        format!("{}solve the puzzle", ADMIN_CONTEXT_PREFIX)
    );

    for (messages, _) in &requests[1..] {
        let systems = messages.iter().filter(|m| m.role == Role::System).count();
        assert_eq!(systems, 1);
        assert!(messages
            .iter()
            .all(|m| !m.content.starts_with(ADMIN_CONTEXT_PREFIX)));
    }
}

#[tokio::test]
async fn test_window_of_two_after_five_turns() {
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(6, 2));

    orchestration.run(CancellationToken::new()).await.unwrap();

    // the sixth request is assembled after five completed turns (ten messages)
    let (messages, _) = &client.requests()[5];
    assert_eq!(messages.len(), 4);
    let history = orchestration.history().messages();
    assert_eq!(&messages[1..3], &history[8..10]);
    assert_eq!(messages[3], Message::user(&*history[9].content));
}

#[tokio::test]
async fn test_always_failing_client_still_completes() {
    let client = Arc::new(FailingClient {
        calls: Mutex::new(0),
    });
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(3, 40));

    let outcome = orchestration.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.state, SessionState::Completed);
    assert_eq!(outcome.turns_completed, 3);
    assert_eq!(*client.calls.lock().unwrap(), 3);
    assert_eq!(orchestration.history().len(), 6);
    assert_eq!(
        assistant_contents(&orchestration),
        vec![ERROR_REPLY, ERROR_REPLY, ERROR_REPLY]
    );
    // the fallback is passed on as the next input
    assert_eq!(&*orchestration.history().messages()[2].content, ERROR_REPLY);
}

#[tokio::test]
async fn test_empty_response_records_no_content_reply() {
    let mut orchestration =
        Orchestration::new(registry(&["a", "b"]), Arc::new(EmptyClient)).with_settings(settings(2, 40));

    orchestration.run(CancellationToken::new()).await.unwrap();

    assert_eq!(
        assistant_contents(&orchestration),
        vec![NO_CONTENT_REPLY, NO_CONTENT_REPLY]
    );
}

#[tokio::test]
async fn test_cancellation_during_remote_call_drops_the_turn() {
    let token = CancellationToken::new();
    let client = Arc::new(CancellingClient {
        cancel_on_call: 3,
        token: token.clone(),
        calls: Mutex::new(0),
    });
    let handler = Arc::new(RecordingHandler::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(10, 40))
        .with_event_handler(handler.clone());

    let outcome = orchestration.run(token).await.unwrap();

    assert_eq!(outcome.state, SessionState::Cancelled);
    assert_eq!(outcome.turns_completed, 2);
    assert_eq!(outcome.final_message, "reply 2");
    assert_eq!(orchestration.history().len(), 4);
    assert_eq!(*client.calls.lock().unwrap(), 3);

    let events = handler.events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(SessionEvent::SessionCancelled {
            turns_completed: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cancellation_during_pacing_delay_keeps_completed_turn() {
    let token = CancellationToken::new();
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(SessionSettings {
            inter_turn_delay: Duration::from_secs(60),
            ..settings(10, 40)
        })
        .with_event_handler(Arc::new(CancelAfterTurn {
            turn: 1,
            token: token.clone(),
        }));

    let outcome = tokio::time::timeout(Duration::from_secs(5), orchestration.run(token))
        .await
        .expect("cancellation must interrupt the pacing delay")
        .unwrap();

    assert_eq!(outcome.state, SessionState::Cancelled);
    assert_eq!(outcome.turns_completed, 2);
    assert_eq!(orchestration.history().len() % 2, 0);
    assert_eq!(orchestration.history().len(), 4);
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_pre_cancelled_token_makes_no_calls() {
    let token = CancellationToken::new();
    token.cancel();
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(5, 40));

    let outcome = orchestration.run(token).await.unwrap();

    assert_eq!(outcome.state, SessionState::Cancelled);
    assert_eq!(outcome.turns_completed, 0);
    assert_eq!(outcome.final_message, "start");
    assert!(orchestration.history().is_empty());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_events_follow_the_session() {
    let handler = Arc::new(RecordingHandler::default());
    let mut orchestration =
        Orchestration::new(registry(&["a", "b"]), Arc::new(MockClient::default()))
            .with_settings(settings(2, 40))
            .with_event_handler(handler.clone());

    orchestration.run(CancellationToken::new()).await.unwrap();

    let events = handler.events.lock().unwrap();
    assert_eq!(events.len(), 7);
    match &events[0] {
        SessionEvent::SessionStarted {
            agent_names,
            max_turns,
            ..
        } => {
            assert_eq!(agent_names, &vec!["Agent 1".to_string(), "Agent 2".to_string()]);
            assert_eq!(*max_turns, 2);
        }
        other => panic!("unexpected first event: {:?}", other),
    }
    assert!(matches!(&events[1], SessionEvent::AdminInstruction { text, .. } if text == "solve the puzzle"));
    assert!(matches!(&events[2], SessionEvent::AgentThinking { turn: 0, agent_name, .. } if agent_name == "Agent 1"));
    match &events[3] {
        SessionEvent::TurnCompleted {
            turn,
            agent_name,
            message,
            display_tag,
            ..
        } => {
            assert_eq!(*turn, 0);
            assert_eq!(agent_name, "Agent 1");
            assert_eq!(message, "a #1");
            assert_eq!(display_tag, "purple");
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(matches!(&events[5], SessionEvent::TurnCompleted { turn: 1, display_tag, .. } if display_tag == "cyan"));
    assert!(matches!(
        &events[6],
        SessionEvent::SessionCompleted {
            turns_completed: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_each_run_starts_from_empty_history() {
    let client = Arc::new(MockClient::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(3, 40));

    let first = orchestration.run(CancellationToken::new()).await.unwrap();
    let second = orchestration.run(CancellationToken::new()).await.unwrap();

    assert_ne!(first.session_id, second.session_id);
    assert_eq!(orchestration.history().len(), 6);
    assert_eq!(&*orchestration.history().messages()[0].content, "start");
    // the second session's first prompt carries no leftover history
    let (messages, _) = &client.requests()[3];
    assert_eq!(messages.len(), 3);
}

#[tokio::test]
async fn test_invalid_settings_fail_the_session_and_allow_a_rerun() {
    let client = Arc::new(MockClient::default());
    let handler = Arc::new(RecordingHandler::default());
    let mut orchestration = Orchestration::new(registry(&["a", "b"]), client.clone())
        .with_settings(settings(3, 0))
        .with_event_handler(handler.clone());

    let err = orchestration.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, OrchestrationError::ExecutionFailed(_)));
    assert_eq!(orchestration.state(), SessionState::Failed);
    assert!(orchestration.history().is_empty());
    assert_eq!(client.call_count(), 0);
    {
        let events = handler.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], SessionEvent::SessionStarted { .. }));
        match &events[1] {
            SessionEvent::SessionFailed {
                turns_completed,
                error_kind,
                error,
                ..
            } => {
                assert_eq!(*turns_completed, 0);
                assert_eq!(error_kind, "ExecutionFailed");
                assert!(error.contains("history_window_size"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    let mut orchestration = orchestration.with_settings(settings(3, 40));
    let outcome = orchestration.run(CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.state, SessionState::Completed);
    assert_eq!(orchestration.state(), SessionState::Completed);
    assert_eq!(orchestration.history().len(), 6);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test]
async fn test_registry_requires_two_agents() {
    let result = AgentRegistry::new(vec![Agent::new("Solo", "persona", "model")]);
    assert!(matches!(result, Err(OrchestrationError::TooFewAgents(1))));
}
