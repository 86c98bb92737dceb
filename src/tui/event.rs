//! Terminal input and network completions, funnelled into one channel

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

use crate::controls::PageRequest;
use crate::models::{Agent, Calendar, CallLog, KnowledgeFile, PhoneNumber, Tool, User, Voice};
use crate::onboarding::OnboardingResult;
use super::pages::PageId;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Terminal key press
    Key(KeyEvent),
    /// Mouse event (click, scroll)
    Mouse(MouseEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick for toast expiry and spinners
    Tick,
    /// A request finished
    Api(ApiEvent),
    /// A request failed; already normalized for display
    ApiError(String),
}

/// Which kind of request failed, so its page can drop loading flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Load,
    /// One call-log page; the ticket identifies which request failed
    CallPage(PageRequest),
    Save,
    Delete,
    Upload,
    Onboarding,
}

/// Successful network completions
#[derive(Debug, Clone)]
pub enum ApiEvent {
    Agents(Vec<Agent>),
    AgentSaved(Agent),
    AgentDeleted(String),
    Phones(Vec<PhoneNumber>),
    PhoneSaved(PhoneNumber),
    PhoneDeleted(String),
    /// One page of calls, answering `request`
    CallPage {
        request: PageRequest,
        logs: Vec<CallLog>,
    },
    CallDetail(CallLog),
    Tools(Vec<Tool>),
    ToolSaved(Tool),
    ToolDeleted(String),
    Calendars(Vec<Calendar>),
    KnowledgeFiles(Vec<KnowledgeFile>),
    KnowledgeUploaded(KnowledgeFile),
    KnowledgeDeleted(String),
    Voices(Vec<Voice>),
    VoiceAdded(Voice),
    User(User),
    OnboardingDone(OnboardingResult),
    /// A request started on `page` failed
    Failed { page: PageId, kind: RequestKind },
}

/// Event handler that polls for terminal events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        std::thread::spawn(move || loop {
            let event = if event::poll(tick_rate).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                        Some(AppEvent::Key(key))
                    }
                    Ok(Event::Mouse(mouse)) => Some(AppEvent::Mouse(mouse)),
                    Ok(Event::Resize(w, h)) => Some(AppEvent::Resize(w, h)),
                    _ => None,
                }
            } else {
                Some(AppEvent::Tick)
            };

            if let Some(event) = event {
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender for network completions
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}
