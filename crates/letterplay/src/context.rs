use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::api::types::Letter;

/// Snapshot handed from one mini-game scene to the next.
///
/// Each field is consumed by the scene that needs it; taking a field clears it
/// so a stale value never leaks into a later transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    /// Where the learner was on the map when leaving it.
    pub position: Option<Vec2>,
    /// Letter chosen for the upcoming mini-game.
    pub letter: Option<Letter>,
    /// Word chosen for the upcoming mini-game (speech, detection).
    pub word: Option<String>,
}

/// Shared handle to the session context. Cloning shares the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Rc<RefCell<SessionContext>>);

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&self, pos: Vec2) {
        self.0.borrow_mut().position = Some(pos);
    }

    pub fn set_letter(&self, letter: impl Into<Letter>) {
        self.0.borrow_mut().letter = Some(letter.into());
    }

    pub fn set_word(&self, word: impl Into<String>) {
        self.0.borrow_mut().word = Some(word.into());
    }

    pub fn take_position(&self) -> Option<Vec2> {
        self.0.borrow_mut().position.take()
    }

    pub fn take_letter(&self) -> Option<Letter> {
        self.0.borrow_mut().letter.take()
    }

    pub fn take_word(&self) -> Option<String> {
        self.0.borrow_mut().word.take()
    }

    /// Copy of the current snapshot without consuming it.
    pub fn peek(&self) -> SessionContext {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = SessionContext::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_field() {
        let handle = SessionHandle::new();
        handle.set_letter('M');
        handle.set_word("moon");

        assert_eq!(handle.take_letter(), Some(Letter::from('M')));
        assert_eq!(handle.take_letter(), None);
        assert_eq!(handle.peek().word.as_deref(), Some("moon"));
    }

    #[test]
    fn clones_share_state() {
        let a = SessionHandle::new();
        let b = a.clone();
        a.set_position(Vec2::new(3.0, 4.0));
        assert_eq!(b.take_position(), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(a.take_position(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let handle = SessionHandle::new();
        handle.set_letter('A');
        handle.set_word("apple");
        handle.clear();
        assert_eq!(handle.peek(), SessionContext::default());
    }
}
