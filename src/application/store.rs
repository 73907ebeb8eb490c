//! Interaction state shared by the list and the map.
//!
//! The store is the single source of truth for which business is focused
//! (hovered, highlighted) and which one is selected (opened). Focus carries
//! the view that produced it so each view can tell its own focus apart from
//! focus coming from the other view.

use crate::domain::BusinessId;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// The view that produced the current focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusSource {
    List,
    Map,
}

/// Focus sub-state. The source only exists together with an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Unfocused,
    FocusedByList(BusinessId),
    FocusedByMap(BusinessId),
}

impl FocusState {
    fn focused(id: BusinessId, source: FocusSource) -> Self {
        match source {
            FocusSource::List => FocusState::FocusedByList(id),
            FocusSource::Map => FocusState::FocusedByMap(id),
        }
    }

    pub fn business_id(&self) -> Option<&BusinessId> {
        match self {
            FocusState::Unfocused => None,
            FocusState::FocusedByList(id) | FocusState::FocusedByMap(id) => Some(id),
        }
    }

    pub fn source(&self) -> Option<FocusSource> {
        match self {
            FocusState::Unfocused => None,
            FocusState::FocusedByList(_) => Some(FocusSource::List),
            FocusState::FocusedByMap(_) => Some(FocusSource::Map),
        }
    }
}

/// A consistent snapshot of focus and selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub focus: FocusState,
    pub selected: Option<BusinessId>,
}

impl InteractionState {
    pub fn focused_business_id(&self) -> Option<&BusinessId> {
        self.focus.business_id()
    }

    pub fn focus_source(&self) -> Option<FocusSource> {
        self.focus.source()
    }

    pub fn selected_business_id(&self) -> Option<&BusinessId> {
        self.selected.as_ref()
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Focus { id: Some(id), source } => self.focus = FocusState::focused(id, source),
            Action::Focus { id: None, .. } => self.focus = FocusState::Unfocused,
            Action::Select(id) => self.selected = id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Focus {
        id: Option<BusinessId>,
        source: FocusSource,
    },
    Select(Option<BusinessId>),
}

pub type SubscriptionId = usize;

type Listener = Rc<RefCell<dyn FnMut(&InteractionState)>>;

#[derive(Default)]
struct Inner {
    state: InteractionState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    pending: VecDeque<Action>,
    dispatching: bool,
}

/// Handle to one results session's interaction state.
///
/// Clones share the same state. Every action notifies all subscribers
/// synchronously with the post-transition snapshot, including no-op
/// transitions. Actions issued from inside a subscriber are queued and run
/// once the current notification round has finished, so transitions never
/// interleave.
///
/// # Examples
///
/// ```
/// use bizscope::application::{FocusSource, InteractionStore};
/// use bizscope::domain::BusinessId;
///
/// let store = InteractionStore::new();
/// store.focus_on_business_id(Some(BusinessId::new("2")), FocusSource::Map);
/// assert_eq!(store.snapshot().focus_source(), Some(FocusSource::Map));
///
/// store.focus_on_business_id(None, FocusSource::Map);
/// assert_eq!(store.snapshot().focus_source(), None);
/// ```
#[derive(Clone, Default)]
pub struct InteractionStore {
    inner: Rc<RefCell<Inner>>,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InteractionState {
        self.inner.borrow().state.clone()
    }

    /// Focuses `id` on behalf of `source`, or clears focus when `id` is
    /// `None` (the source is then ignored).
    pub fn focus_on_business_id(&self, id: Option<BusinessId>, source: FocusSource) {
        self.dispatch(Action::Focus { id, source });
    }

    /// Replaces the selection. `None` deselects.
    pub fn set_selected_business_id(&self, id: Option<BusinessId>) {
        self.dispatch(Action::Select(id));
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&InteractionState) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_subscription;
        inner.next_subscription += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn dispatch(&self, action: Action) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.pending.push_back(action);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        loop {
            let (snapshot, listeners) = {
                let mut inner = self.inner.borrow_mut();
                let Some(action) = inner.pending.pop_front() else {
                    inner.dispatching = false;
                    break;
                };
                trace!(?action, "interaction transition");
                inner.state.apply(action);
                let listeners = inner
                    .listeners
                    .iter()
                    .map(|(_, listener)| Rc::clone(listener))
                    .collect::<Vec<_>>();
                (inner.state.clone(), listeners)
            };

            for listener in listeners {
                (&mut *listener.borrow_mut())(&snapshot);
            }
        }
    }
}

impl fmt::Debug for InteractionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("InteractionStore")
            .field("state", &inner.state)
            .field("subscribers", &inner.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> BusinessId {
        BusinessId::new(s)
    }

    fn assert_focus_invariant(state: &InteractionState) {
        assert_eq!(state.focused_business_id().is_none(), state.focus_source().is_none());
    }

    #[test]
    fn test_initial_state_is_empty() {
        let state = InteractionStore::new().snapshot();
        assert_eq!(state.focus, FocusState::Unfocused);
        assert!(state.focused_business_id().is_none());
        assert!(state.focus_source().is_none());
        assert!(state.selected_business_id().is_none());
    }

    #[test]
    fn test_focus_transitions() {
        let store = InteractionStore::new();

        store.focus_on_business_id(Some(id("1")), FocusSource::List);
        assert_eq!(store.snapshot().focus, FocusState::FocusedByList(id("1")));

        store.focus_on_business_id(Some(id("2")), FocusSource::Map);
        assert_eq!(store.snapshot().focus, FocusState::FocusedByMap(id("2")));

        store.focus_on_business_id(None, FocusSource::List);
        assert_eq!(store.snapshot().focus, FocusState::Unfocused);
    }

    #[test]
    fn test_map_focus_then_clear_leaves_no_source() {
        let store = InteractionStore::new();
        store.focus_on_business_id(Some(id("x")), FocusSource::Map);
        store.focus_on_business_id(None, FocusSource::Map);

        let state = store.snapshot();
        assert_eq!(state.focus, FocusState::Unfocused);
        assert_eq!(state.focus_source(), None);
    }

    #[test]
    fn test_focus_invariant_over_action_sequence() {
        let store = InteractionStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |state| sink.borrow_mut().push(state.clone()));

        let ids = ["a", "b", "c"];
        for step in 0..60usize {
            let source = if step % 3 == 0 { FocusSource::Map } else { FocusSource::List };
            match step % 5 {
                0 | 3 => store.focus_on_business_id(Some(id(ids[step % 3])), source),
                1 => store.focus_on_business_id(None, source),
                2 => store.set_selected_business_id(Some(id(ids[(step + 1) % 3]))),
                _ => store.set_selected_business_id(None),
            }
            assert_focus_invariant(&store.snapshot());
        }

        assert_eq!(seen.borrow().len(), 60);
        for state in seen.borrow().iter() {
            assert_focus_invariant(state);
        }
    }

    #[test]
    fn test_selection_replaces_previous() {
        let store = InteractionStore::new();
        store.set_selected_business_id(Some(id("1")));
        store.set_selected_business_id(Some(id("2")));
        assert_eq!(store.snapshot().selected_business_id(), Some(&id("2")));

        store.set_selected_business_id(None);
        assert_eq!(store.snapshot().selected_business_id(), None);
    }

    #[test]
    fn test_selection_independent_of_focus() {
        let store = InteractionStore::new();
        store.set_selected_business_id(Some(id("1")));
        store.focus_on_business_id(Some(id("2")), FocusSource::List);
        store.focus_on_business_id(None, FocusSource::List);

        let state = store.snapshot();
        assert_eq!(state.selected_business_id(), Some(&id("1")));
        assert_eq!(state.focus, FocusState::Unfocused);
    }

    #[test]
    fn test_unknown_ids_are_tolerated() {
        let store = InteractionStore::new();
        store.set_selected_business_id(Some(id("not-in-results")));
        assert_eq!(store.snapshot().selected_business_id(), Some(&id("not-in-results")));
    }

    #[test]
    fn test_redundant_actions_still_notify() {
        let store = InteractionStore::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.focus_on_business_id(Some(id("1")), FocusSource::List);
        store.focus_on_business_id(Some(id("1")), FocusSource::List);
        assert_eq!(*count.borrow(), 2);
        assert_eq!(store.snapshot().focus, FocusState::FocusedByList(id("1")));
    }

    #[test]
    fn test_all_subscribers_see_same_snapshot() {
        let store = InteractionStore::new();
        let first = Rc::new(RefCell::new(None));
        let second = Rc::new(RefCell::new(None));
        let (a, b) = (Rc::clone(&first), Rc::clone(&second));
        store.subscribe(move |state| *a.borrow_mut() = Some(state.clone()));
        store.subscribe(move |state| *b.borrow_mut() = Some(state.clone()));

        store.focus_on_business_id(Some(id("7")), FocusSource::Map);
        assert_eq!(*first.borrow(), *second.borrow());
        assert_eq!(first.borrow().as_ref().map(|s| s.focus.clone()), Some(FocusState::FocusedByMap(id("7"))));
    }

    #[test]
    fn test_actions_from_subscriber_are_queued() {
        let store = InteractionStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let reactor = store.clone();
        store.subscribe(move |state| {
            if state.focus == FocusState::FocusedByMap(BusinessId::new("1")) && state.selected.is_none() {
                reactor.set_selected_business_id(Some(BusinessId::new("1")));
            }
        });
        let sink = Rc::clone(&log);
        store.subscribe(move |state| sink.borrow_mut().push(state.clone()));

        store.focus_on_business_id(Some(id("1")), FocusSource::Map);

        // The second subscriber saw the focus transition before the queued
        // selection, never a mix of the two.
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].selected, None);
        assert_eq!(log[1].selected, Some(id("1")));
    }

    #[test]
    fn test_unsubscribe() {
        let store = InteractionStore::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let subscription = store.subscribe(move |_| *counter.borrow_mut() += 1);

        store.set_selected_business_id(None);
        assert!(store.unsubscribe(subscription));
        assert!(!store.unsubscribe(subscription));
        store.set_selected_business_id(None);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }
}
