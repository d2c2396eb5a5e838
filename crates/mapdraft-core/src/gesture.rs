//! A small state machine runtime for pointer gestures.
//!
//! States are self-contained values implementing [`GestureState`]; the
//! [`Interpreter`] holds exactly one at a time and swaps it atomically when a
//! handler asks for a transition. Events a state has no handler for pass
//! through untouched.

use log::debug;

/// What a state's event handler decided.
pub enum Transition<E, C> {
    /// The event was consumed; the current state remains active.
    Stay,
    /// The event was consumed and the machine moves to a new state.
    To(Box<dyn GestureState<E, C>>),
}

/// One state of a gesture machine.
///
/// `on_event` returns `None` when the state has no handler for the event;
/// the interpreter then leaves the state untouched and reports the event as
/// unhandled. Side effects go through the shared context `C`, never through
/// the interpreter.
pub trait GestureState<E, C> {
    fn name(&self) -> &'static str;

    fn on_event(&mut self, event: &E, context: &mut C) -> Option<Transition<E, C>>;
}

/// Drives a [`GestureState`] machine over a stream of events.
pub struct Interpreter<E, C> {
    state: Box<dyn GestureState<E, C>>,
}

impl<E, C> Interpreter<E, C> {
    pub fn new(initial: Box<dyn GestureState<E, C>>) -> Self {
        Self { state: initial }
    }

    /// Name of the active state.
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Feed one event through the active state. Returns whether the state
    /// consumed it.
    pub fn handle(&mut self, event: &E, context: &mut C) -> bool {
        match self.state.on_event(event, context) {
            None => false,
            Some(Transition::Stay) => true,
            Some(Transition::To(next)) => {
                debug!("gesture: {} -> {}", self.state.name(), next.name());
                self.state = next;
                true
            }
        }
    }

    /// Force the machine into `state`, discarding the active one.
    pub fn reset(&mut self, state: Box<dyn GestureState<E, C>>) {
        debug!("gesture: {} -> {} (reset)", self.state.name(), state.name());
        self.state = state;
    }
}
