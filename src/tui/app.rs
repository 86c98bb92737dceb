//! Main TUI application state and event loop

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::Terminal;
use tokio::sync::mpsc::UnboundedSender;

use super::context::Ctx;
use super::event::{ApiEvent, AppEvent, EventHandler, RequestKind};
use super::hit_test::{ClickTarget, HitTestRegistry};
use super::pages::{Page, PageId, Pages};
use super::ui::{self, View};
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::controls::ToastQueue;
use crate::session::{Session, SessionProvider};

/// Spinner frames and toast expiry advance on this tick.
const TICK_RATE: Duration = Duration::from_millis(100);

/// Main TUI application
pub struct TuiApp {
    /// Terminal instance
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Event handler (optional so we can take it out in run loop)
    events: Option<EventHandler>,
    /// Sender for network completions
    tx: UnboundedSender<AppEvent>,
    /// Whether the app should quit
    should_quit: bool,
    client: ApiClient,
    session: Arc<Session>,
    config: Config,
    pages: Pages,
    active: PageId,
    toasts: ToastQueue,
    /// Hit test registry for mouse interaction
    hit_registry: HitTestRegistry,
    /// Last known mouse position
    last_mouse_pos: Option<(u16, u16)>,
    /// Whether the first account fetch has come back
    user_checked: bool,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(config: Config, session: Arc<Session>) -> Result<Self> {
        let events = EventHandler::new(TICK_RATE);
        let tx = events.sender();

        // every failed request becomes one error toast
        let hook_tx = tx.clone();
        let client = ApiClient::new(&config, session.clone())?.with_error_hook(Arc::new(
            move |e: &ApiError| {
                let _ = hook_tx.send(AppEvent::ApiError(e.to_string()));
            },
        ));

        // Initialize terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let pages = Pages::new(&config);
        Ok(Self {
            terminal,
            events: Some(events),
            tx,
            should_quit: false,
            client,
            session,
            config,
            pages,
            active: PageId::default(),
            toasts: ToastQueue::new(),
            hit_registry: HitTestRegistry::new(),
            last_mouse_pos: None,
            user_checked: false,
        })
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> Result<()> {
        // Take events out of self to avoid borrow conflicts in select! loop
        let Some(mut events) = self.events.take() else {
            return Ok(());
        };

        self.start();

        while !self.should_quit {
            self.draw()?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    self.should_quit = true;
                }
            }
        }

        self.events = Some(events);
        Ok(())
    }

    fn start(&mut self) {
        if !self.session.is_authenticated() {
            self.toasts
                .warning("No API token: set VOXDESK_API_TOKEN or pass --token");
        }
        let client = self.client.clone();
        self.with_page(|page, ctx| {
            ctx.spawn(
                async move { client.refresh_current_user().await },
                ApiEvent::User,
                RequestKind::Load,
            );
            page.enter(ctx);
        });
    }

    fn draw(&mut self) -> Result<()> {
        let view = View {
            pages: &mut self.pages,
            active: self.active,
            toasts: &self.toasts,
            user: self.session.current_user(),
            hits: &mut self.hit_registry,
            mouse_pos: self.last_mouse_pos,
        };
        self.terminal.draw(|frame| ui::render(frame, view))?;
        Ok(())
    }

    /// Run `f` against the active page with a fresh context, then follow any
    /// navigation the page asked for.
    fn with_page<R>(&mut self, f: impl FnOnce(&mut dyn Page, &mut Ctx) -> R) -> R {
        let mut navigate = None;
        let result = {
            let mut ctx = Ctx {
                client: &self.client,
                tx: &self.tx,
                toasts: &mut self.toasts,
                config: &self.config,
                session: &self.session,
                page: self.active,
                navigate: &mut navigate,
            };
            f(self.pages.get_mut(self.active), &mut ctx)
        };
        if let Some(page) = navigate {
            self.switch_to(page);
        }
        result
    }

    fn switch_to(&mut self, page: PageId) {
        if page == self.active {
            return;
        }
        tracing::debug!(from = ?self.active, to = ?page, "Switching page");
        self.active = page;
        self.with_page(|page, ctx| page.enter(ctx));
    }

    /// Handle an application event
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Resize(_, _) => {}
            AppEvent::Tick => self.toasts.prune(Instant::now()),
            AppEvent::ApiError(message) => self.toasts.error(message),
            AppEvent::Api(event) => self.handle_api(event),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Global shortcuts that bypass pages
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('q') | KeyCode::Char('c')) => {
                self.should_quit = true;
                return;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.with_page(|page, ctx| page.reload(ctx));
                return;
            }
            _ => {}
        }

        if !self.pages.get(self.active).is_capturing() {
            let target = match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => PageId::from_digit(c),
                KeyCode::Tab | KeyCode::Char(']') => Some(self.active.next()),
                KeyCode::BackTab | KeyCode::Char('[') => Some(self.active.prev()),
                _ => None,
            };
            if let Some(page) = target {
                self.switch_to(page);
                return;
            }
        }

        self.with_page(|page, ctx| page.handle_key(key, ctx));
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        self.last_mouse_pos = Some((mouse.column, mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = self
                    .hit_registry
                    .hit_test(mouse.column, mouse.row)
                    .cloned();
                if let Some(ClickTarget::Tab(page)) = target {
                    self.switch_to(page);
                    return;
                }
                self.with_page(|page, ctx| page.handle_click(target.as_ref(), ctx));
            }
            MouseEventKind::ScrollDown => self.with_page(|page, ctx| page.handle_scroll(true, ctx)),
            MouseEventKind::ScrollUp => self.with_page(|page, ctx| page.handle_scroll(false, ctx)),
            _ => {}
        }
    }

    fn handle_api(&mut self, event: ApiEvent) {
        if let ApiEvent::User(user) = &event {
            // first look at the account: send new operators through onboarding
            if !self.user_checked {
                self.user_checked = true;
                if !user.onboarded {
                    tracing::info!("Account not onboarded; opening the wizard");
                    self.switch_to(PageId::Onboarding);
                }
            }
        }

        let mut navigate = None;
        {
            let mut ctx = Ctx {
                client: &self.client,
                tx: &self.tx,
                toasts: &mut self.toasts,
                config: &self.config,
                session: &self.session,
                page: self.active,
                navigate: &mut navigate,
            };
            self.pages.broadcast(&event, &mut ctx);
        }
        if let Some(page) = navigate {
            self.switch_to(page);
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
