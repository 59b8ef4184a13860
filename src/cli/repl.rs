use crate::coordinator::RequestCoordinator;
use crate::models::events::{ ChatEvent, CoordinatorState };

use chrono::DateTime;
use log::{ debug, warn };
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

const BUSY_INDICATOR: &str = "... thinking";
const PROMPT: &str = "> ";

/// Text shown for an event, if any.
pub fn render_event(event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::State { state: CoordinatorState::Busy } => Some(BUSY_INDICATOR.to_string()),
        ChatEvent::State { state: CoordinatorState::Idle } => None,
        ChatEvent::User { content, timestamp } => {
            Some(format!("[{}] You: {}", format_time(*timestamp), content))
        }
        ChatEvent::Response { content, timestamp } => {
            Some(format!("[{}] Assistant: {}", format_time(*timestamp), content))
        }
        ChatEvent::Error { message } => Some(format!("! {}", message)),
    }
}

fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Collects lines into one submission. A trailing backslash continues the
/// input on the next line.
#[derive(Default)]
pub struct InputBuffer {
    pending: String,
}

impl InputBuffer {
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if let Some(continued) = line.strip_suffix('\\') {
            self.pending.push_str(continued);
            self.pending.push('\n');
            return None;
        }
        self.pending.push_str(line);
        Some(std::mem::take(&mut self.pending))
    }
}

fn print_prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}

pub async fn run_repl(coordinator: Arc<RequestCoordinator>) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut events = coordinator.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(text) = render_event(&event) {
                        println!("{}", text);
                    }
                    if event == (ChatEvent::State { state: CoordinatorState::Idle }) {
                        print_prompt();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Transcript renderer skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("Chat session {}. Type a message and press Enter; end a line with \\ to continue it.", coordinator.session_id());
    print_prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input = InputBuffer::default();
    let mut in_flight: Option<JoinHandle<()>> = None;

    while let Some(line) = lines.next_line().await? {
        let Some(text) = input.push_line(&line) else {
            continue;
        };
        if coordinator.state() == CoordinatorState::Busy {
            debug!("Input disabled while a request is in flight; dropping line");
            continue;
        }
        if text.trim().is_empty() {
            print_prompt();
            continue;
        }

        let coordinator = coordinator.clone();
        in_flight = Some(
            tokio::spawn(async move {
                if let Err(e) = coordinator.submit(&text).await {
                    if e.is_silent() {
                        debug!("Submission dropped: {}", e);
                    }
                }
            })
        );
    }

    if let Some(handle) = in_flight {
        handle.await?;
    }
    drop(coordinator);
    renderer.await?;
    println!();
    Ok(())
}
