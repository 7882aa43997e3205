//! Presentation surface: owns the transcript and session indicators and turns
//! gestures into local updates or a single backend call.
//!
//! Network gestures release the state lock while awaiting the backend, so
//! several may be in flight at once. Their replies land in the transcript in
//! completion order, and the hours indicator shows whichever finished last.

use neura_chat_client::{Backend, Config, GatewayError, RemainingHours};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::commands::Gesture;
use crate::render::Renderer;
use crate::session::{Message, Sender, SessionState, UserId};

/// Bot message shown when a backend call fails.
pub const FAILURE_TEXT: &str = "Something went wrong - please try again.";

/// Outcome of one gesture.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing to do (blank input, or a gesture the surface does not handle).
    Dropped,
    Completed,
    /// The backend call failed; a failure message was already appended.
    Failed(GatewayError),
    /// A local selection was refused; transcript and session are unchanged.
    Rejected(SurfaceError),
}

impl Dispatch {
    pub fn is_completed(&self) -> bool {
        matches!(self, Dispatch::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("unknown background {theme:?} (available: {available})")]
    UnknownTheme { theme: String, available: String },
    #[error("unknown language {code:?} (available: {available})")]
    UnknownLanguage { code: String, available: String },
}

struct State {
    transcript: Vec<Message>,
    session: SessionState,
}

pub struct Surface<B, R> {
    backend: B,
    renderer: R,
    user_id: UserId,
    backgrounds: Vec<String>,
    languages: Vec<String>,
    state: Mutex<State>,
}

impl<B: Backend, R: Renderer> Surface<B, R> {
    /// Build a surface with the user, selectors, and initial indicators from `config`.
    ///
    /// A configured background or language outside its enumeration falls back
    /// to the first enumerated value. The renderer is told the starting theme.
    pub fn new(backend: B, renderer: R, config: &Config) -> Self {
        let backgrounds = config.ui.backgrounds();
        let languages = config.ui.languages();
        let session = SessionState {
            remaining_hours: None,
            voice_enabled: config.ui.voice_enabled(),
            background: initial_selection("background", config.ui.background(), &backgrounds),
            language: initial_selection("language", config.ui.language(), &languages),
        };
        renderer.apply_theme("", &session.background);
        Self {
            backend,
            renderer,
            user_id: UserId::new(config.session.user_id()),
            backgrounds,
            languages,
            state: Mutex::new(State {
                transcript: Vec::new(),
                session,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Snapshot of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    pub fn session(&self) -> SessionState {
        self.lock().session.clone()
    }

    pub fn append_message(&self, sender: Sender, text: impl Into<String>) {
        let mut state = self.lock();
        self.push(&mut state, Message {
            sender,
            text: text.into(),
        });
    }

    fn push(&self, state: &mut State, message: Message) {
        self.renderer.show_message(&message);
        state.transcript.push(message);
    }

    /// Append a bot reply and mirror the hours that came with it.
    fn complete(&self, text: String, hours: RemainingHours) {
        let mut state = self.lock();
        self.push(&mut state, Message::bot(text));
        state.session.remaining_hours = Some(hours);
        self.renderer.show_remaining_hours(hours);
    }

    fn fail(&self, action: &str, err: GatewayError) -> Dispatch {
        warn!(action, user_id = %self.user_id, "backend call failed: {}", err);
        self.append_message(Sender::Bot, FAILURE_TEXT);
        Dispatch::Failed(err)
    }

    /// Send `text` to the backend. Blank input is dropped without a request.
    pub async fn submit_user_message(&self, text: &str) -> Dispatch {
        let text = text.trim();
        if text.is_empty() {
            return Dispatch::Dropped;
        }
        self.append_message(Sender::User, text);

        // The client never asks for premium service on its own.
        match self
            .backend
            .send_chat_message(text, self.user_id.as_str(), false)
            .await
        {
            Ok(reply) => {
                self.complete(reply.reply, reply.remaining_hours);
                Dispatch::Completed
            }
            Err(e) => self.fail("chat", e),
        }
    }

    /// Ask the backend to upgrade this user. Eligibility is the backend's call.
    pub async fn request_upgrade(&self) -> Dispatch {
        match self.backend.request_upgrade(self.user_id.as_str()).await {
            Ok(reply) => {
                self.complete(reply.message, reply.remaining_hours);
                Dispatch::Completed
            }
            Err(e) => self.fail("upgrade", e),
        }
    }

    pub async fn check_health(&self) -> Dispatch {
        match self.backend.health().await {
            Ok(health) => {
                let text = match health.model {
                    Some(model) => format!("Backend status: {} (model: {}).", health.status, model),
                    None => format!("Backend status: {}.", health.status),
                };
                self.append_message(Sender::Bot, text);
                Dispatch::Completed
            }
            Err(e) => self.fail("health", e),
        }
    }

    pub fn set_background_theme(&self, theme: &str) -> Result<(), SurfaceError> {
        if !self.backgrounds.iter().any(|b| b == theme) {
            return Err(SurfaceError::UnknownTheme {
                theme: theme.to_string(),
                available: self.backgrounds.join(", "),
            });
        }
        let mut state = self.lock();
        let previous = std::mem::replace(&mut state.session.background, theme.to_string());
        self.renderer.apply_theme(&previous, theme);
        Ok(())
    }

    /// Record the selected language and announce it. Strings are not localized.
    pub fn set_language(&self, code: &str) -> Result<(), SurfaceError> {
        if !self.languages.iter().any(|l| l == code) {
            return Err(SurfaceError::UnknownLanguage {
                code: code.to_string(),
                available: self.languages.join(", "),
            });
        }
        let mut state = self.lock();
        state.session.language = code.to_string();
        self.push(&mut state, Message::bot(format!("Language switched to {}.", code)));
        Ok(())
    }

    /// Flip the voice flag and announce the new state. Returns the new value.
    pub fn toggle_voice(&self) -> bool {
        let mut state = self.lock();
        state.session.voice_enabled = !state.session.voice_enabled;
        let enabled = state.session.voice_enabled;
        let text = if enabled {
            "Voice is now ON."
        } else {
            "Voice is now OFF."
        };
        self.push(&mut state, Message::bot(text));
        enabled
    }

    fn reject(&self, err: SurfaceError) -> Dispatch {
        warn!("selection refused: {}", err);
        Dispatch::Rejected(err)
    }

    /// Run one gesture to completion.
    pub async fn dispatch(&self, gesture: Gesture) -> Dispatch {
        match gesture {
            Gesture::Send(text) => self.submit_user_message(&text).await,
            Gesture::Upgrade => self.request_upgrade().await,
            Gesture::Health => self.check_health().await,
            Gesture::Background(theme) => match self.set_background_theme(&theme) {
                Ok(()) => Dispatch::Completed,
                Err(e) => self.reject(e),
            },
            Gesture::Language(code) => match self.set_language(&code) {
                Ok(()) => Dispatch::Completed,
                Err(e) => self.reject(e),
            },
            Gesture::ToggleVoice => {
                self.toggle_voice();
                Dispatch::Completed
            }
            Gesture::Quit => Dispatch::Dropped,
        }
    }
}

/// `selected` if it is one of `allowed`, otherwise the first allowed value.
fn initial_selection(kind: &str, selected: String, allowed: &[String]) -> String {
    if allowed.contains(&selected) {
        return selected;
    }
    let fallback = allowed.first().cloned().unwrap_or_default();
    warn!(kind, selected = %selected, fallback = %fallback, "configured selection is not enumerated");
    fallback
}

impl<B, R> Surface<B, R>
where
    B: Backend + 'static,
    R: Renderer + 'static,
{
    /// Run `gesture` as an independent task. Tasks are not ordered or cancelled.
    pub fn spawn(self: &Arc<Self>, gesture: Gesture) -> JoinHandle<Dispatch> {
        let surface = Arc::clone(self);
        tokio::spawn(async move { surface.dispatch(gesture).await })
    }
}
