//! User actions coming back from the presentation layer.
//!
//! Handlers are registered per [`UiEventKind`]; every handler registered for
//! a kind runs, in registration order. Handlers get the context they act on
//! as an argument instead of capturing it.

use std::collections::HashMap;

/// How the player picked an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Exact answer text.
    Text(String),
    /// Position of the answer within the current question.
    Choice(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    BeginQuiz,
    AnswerSubmitted(Submission),
    InitialsSubmitted(String),
    ReturnToWelcome,
    ShowScoreboard,
    ClearScoreboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    BeginQuiz,
    AnswerSubmitted,
    InitialsSubmitted,
    ReturnToWelcome,
    ShowScoreboard,
    ClearScoreboard,
}

impl UiEvent {
    pub fn kind(&self) -> UiEventKind {
        match self {
            UiEvent::BeginQuiz => UiEventKind::BeginQuiz,
            UiEvent::AnswerSubmitted(_) => UiEventKind::AnswerSubmitted,
            UiEvent::InitialsSubmitted(_) => UiEventKind::InitialsSubmitted,
            UiEvent::ReturnToWelcome => UiEventKind::ReturnToWelcome,
            UiEvent::ShowScoreboard => UiEventKind::ShowScoreboard,
            UiEvent::ClearScoreboard => UiEventKind::ClearScoreboard,
        }
    }
}

pub type Handler<C> = Box<dyn FnMut(&mut C, &UiEvent)>;

pub struct EventHandlers<C> {
    handlers: HashMap<UiEventKind, Vec<Handler<C>>>,
}

impl<C> EventHandlers<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, kind: UiEventKind, handler: F)
    where
        F: FnMut(&mut C, &UiEvent) + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    pub fn handler_count(&self, kind: UiEventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Runs every handler for the event's kind; returns how many ran.
    pub fn dispatch(&mut self, ctx: &mut C, event: &UiEvent) -> usize {
        match self.handlers.get_mut(&event.kind()) {
            Some(handlers) => {
                for handler in handlers.iter_mut() {
                    handler(ctx, event);
                }
                handlers.len()
            }
            None => 0,
        }
    }
}

impl<C> Default for EventHandlers<C> {
    fn default() -> Self {
        Self::new()
    }
}
