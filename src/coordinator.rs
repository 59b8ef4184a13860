use crate::error::{ ChatError, GENERIC_APOLOGY };
use crate::history::{ format_history_for_log, ConversationStore };
use crate::llm::{ ChatClient, ChatCompletionRequest };
use crate::models::chat::ChatMessage;
use crate::models::events::{ ChatEvent, CoordinatorState };

use chrono::Utc;
use log::{ debug, error, info };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Runs one request/response exchange at a time against a [`ChatClient`],
/// keeping the transcript in a [`ConversationStore`].
pub struct RequestCoordinator {
    session_id: String,
    client: Arc<dyn ChatClient>,
    store: Mutex<ConversationStore>,
    busy: AtomicBool,
    events: broadcast::Sender<ChatEvent>,
}

/// Clears the busy flag when the exchange ends, however it ends.
struct BusyGuard<'a> {
    coordinator: &'a RequestCoordinator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.busy.store(false, Ordering::Release);
        self.coordinator.publish(ChatEvent::State { state: CoordinatorState::Idle });
    }
}

impl RequestCoordinator {
    pub fn new(client: Arc<dyn ChatClient>, store: ConversationStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session_id = Uuid::new_v4().to_string();
        info!("Chat session {} talking to {}", session_id, client.endpoint());

        Self {
            session_id,
            client,
            store: Mutex::new(store),
            busy: AtomicBool::new(false),
            events,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> CoordinatorState {
        if self.busy.load(Ordering::Acquire) {
            CoordinatorState::Busy
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock_store().snapshot()
    }

    /// Submits one user turn.
    ///
    /// Blank input fails with [`ChatError::EmptyInput`] and a submission made
    /// while another is in flight fails with [`ChatError::Busy`]; neither
    /// touches the transcript or publishes anything. Any other failure leaves
    /// the user message in place without a reply and publishes the generic
    /// apology.
    pub async fn submit(&self, user_text: &str) -> Result<String, ChatError> {
        let text = user_text.trim();
        if text.is_empty() {
            debug!("[{}] Ignoring empty submission", self.session_id);
            return Err(ChatError::EmptyInput);
        }

        if
            self.busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            debug!("[{}] Ignoring submission while a request is in flight", self.session_id);
            return Err(ChatError::Busy);
        }
        self.publish(ChatEvent::State { state: CoordinatorState::Busy });
        let _guard = BusyGuard { coordinator: self };

        match self.exchange(text).await {
            Ok(reply) => {
                info!("[{}] Reply received ({} chars)", self.session_id, reply.len());
                self.publish(ChatEvent::Response {
                    content: reply.clone(),
                    timestamp: Utc::now().timestamp(),
                });
                Ok(reply)
            }
            Err(e) => {
                error!("[{}] Error: {}", self.session_id, e);
                self.publish(ChatEvent::Error {
                    message: GENERIC_APOLOGY.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn exchange(&self, text: &str) -> Result<String, ChatError> {
        let snapshot = {
            let mut store = self.lock_store();
            store.append(ChatMessage::user(text))?;
            store.snapshot()
        };
        self.publish(ChatEvent::User {
            content: text.to_string(),
            timestamp: Utc::now().timestamp(),
        });
        debug!("[{}] Sending transcript:\n{}", self.session_id, format_history_for_log(&snapshot));

        let request = ChatCompletionRequest::new(snapshot);
        let reply = self.client.complete(&request).await?;

        self.lock_store().append(ChatMessage::assistant(reply.clone()))?;
        Ok(reply)
    }

    fn publish(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_store(&self) -> MutexGuard<'_, ConversationStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
