//! Reactive logic of the result list.
//!
//! Rows keep the order of the data source and have a fixed height. The list
//! emits list-sourced focus on hover and keyboard movement, selects on
//! click, and scrolls a row into view when the map focuses it.

use super::store::{FocusSource, FocusState, InteractionState, InteractionStore, SubscriptionId};
use crate::domain::{is_fully_within, Business, BusinessId, ScreenRect};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowParity {
    Even,
    Odd,
}

impl RowParity {
    pub fn of(index: usize) -> Self {
        if index % 2 == 0 { RowParity::Even } else { RowParity::Odd }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVariant {
    Default,
    /// The map is pointing at this row.
    Emphasized,
}

/// Visual variant of the row for `id`.
///
/// Only map-sourced focus emphasizes a row. Other rows keep their default
/// look; dimming is left to the map.
pub fn row_variant(state: &InteractionState, id: &BusinessId) -> RowVariant {
    match &state.focus {
        FocusState::FocusedByMap(focused) if focused == id => RowVariant::Emphasized,
        _ => RowVariant::Default,
    }
}

/// Edge detector for the auto-scroll effect.
///
/// Fires once per change of the focus state into map-sourced focus and never
/// for focus the list produced itself.
#[derive(Debug, Clone, Default)]
pub struct ScrollTrigger {
    last: FocusState,
}

impl ScrollTrigger {
    pub fn observe(&mut self, state: &InteractionState) -> Option<BusinessId> {
        if self.last == state.focus {
            return None;
        }
        self.last = state.focus.clone();
        match &state.focus {
            FocusState::FocusedByMap(id) => Some(id.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ListReaction {
    state: InteractionState,
    trigger: ScrollTrigger,
    scroll_request: Option<BusinessId>,
}

/// A row as it should be drawn this frame.
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    pub index: usize,
    pub business: &'a Business,
    /// Unclipped rectangle; may extend past the viewport.
    pub rect: ScreenRect,
    pub parity: RowParity,
    pub variant: RowVariant,
    /// Under the pointer or the keyboard cursor.
    pub tinted: bool,
}

#[derive(Debug)]
pub struct ListView {
    store: InteractionStore,
    businesses: Rc<[Business]>,
    row_height: u16,
    viewport: ScreenRect,
    scroll_offset: u16,
    animation_target: Option<u16>,
    hovered: Option<usize>,
    cursor: Option<usize>,
    reaction: Rc<RefCell<ListReaction>>,
    subscription: SubscriptionId,
}

impl ListView {
    pub fn new(store: InteractionStore, businesses: Rc<[Business]>, row_height: u16) -> Self {
        let reaction = Rc::new(RefCell::new(ListReaction {
            state: store.snapshot(),
            trigger: ScrollTrigger { last: store.snapshot().focus },
            scroll_request: None,
        }));

        let sink = Rc::clone(&reaction);
        let subscription = store.subscribe(move |state| {
            let mut reaction = sink.borrow_mut();
            reaction.state = state.clone();
            if let Some(id) = reaction.trigger.observe(state) {
                // A newer request supersedes one that has not run yet.
                reaction.scroll_request = Some(id);
            }
        });

        Self {
            store,
            businesses,
            row_height: row_height.max(1),
            viewport: ScreenRect::default(),
            scroll_offset: 0,
            animation_target: None,
            hovered: None,
            cursor: None,
            reaction,
            subscription,
        }
    }

    pub fn set_viewport(&mut self, viewport: ScreenRect) {
        self.viewport = viewport;
        let max_offset = self.max_offset();
        self.scroll_offset = self.scroll_offset.min(max_offset);
        // A taller viewport can leave the animation aiming past the end.
        self.animation_target = self
            .animation_target
            .map(|target| target.min(max_offset))
            .filter(|&target| target != self.scroll_offset);
    }

    pub fn viewport(&self) -> ScreenRect {
        self.viewport
    }

    pub fn state(&self) -> InteractionState {
        self.reaction.borrow().state.clone()
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    pub fn is_animating(&self) -> bool {
        self.animation_target.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// The business waiting to be scrolled into view on the next tick.
    pub fn pending_scroll(&self) -> Option<BusinessId> {
        self.reaction.borrow().scroll_request.clone()
    }

    fn content_height(&self) -> u32 {
        self.businesses.len() as u32 * u32::from(self.row_height)
    }

    fn max_offset(&self) -> u16 {
        let visible = self.viewport.height.max(0.0) as u32;
        self.content_height().saturating_sub(visible).min(u32::from(u16::MAX)) as u16
    }

    pub fn row_rect(&self, index: usize) -> ScreenRect {
        let top = index as f64 * f64::from(self.row_height) - f64::from(self.scroll_offset);
        ScreenRect::new(
            self.viewport.left,
            self.viewport.top + top,
            self.viewport.width,
            f64::from(self.row_height),
        )
    }

    pub fn row_at(&self, x: f64, y: f64) -> Option<usize> {
        if !self.viewport.contains(x, y) {
            return None;
        }
        let content_y = y - self.viewport.top + f64::from(self.scroll_offset);
        let index = (content_y / f64::from(self.row_height)).floor() as usize;
        (index < self.businesses.len()).then_some(index)
    }

    pub fn visible_rows(&self) -> Vec<RowView<'_>> {
        if self.viewport.is_empty() || self.businesses.is_empty() {
            return Vec::new();
        }
        let reaction = self.reaction.borrow();
        let row_height = usize::from(self.row_height);
        let first = usize::from(self.scroll_offset) / row_height;
        let visible = (self.viewport.height.ceil() as usize).max(1);
        let last_line = usize::from(self.scroll_offset) + visible - 1;
        let last = (last_line / row_height).min(self.businesses.len() - 1);

        (first..=last)
            .map(|index| {
                let business = &self.businesses[index];
                RowView {
                    index,
                    business,
                    rect: self.row_rect(index),
                    parity: RowParity::of(index),
                    variant: row_variant(&reaction.state, &business.id),
                    tinted: self.hovered == Some(index) || self.cursor == Some(index),
                }
            })
            .collect()
    }

    /// Pointer moved to `(x, y)`; emits enter/leave focus as rows change.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        match self.row_at(x, y) {
            Some(index) => self.enter_row(index),
            None => self.pointer_left(),
        }
    }

    pub fn enter_row(&mut self, index: usize) {
        if self.hovered == Some(index) {
            return;
        }
        let Some(business) = self.businesses.get(index) else {
            return;
        };
        if self.hovered.is_some() {
            self.store.focus_on_business_id(None, FocusSource::List);
        }
        self.hovered = Some(index);
        self.store.focus_on_business_id(Some(business.id.clone()), FocusSource::List);
    }

    pub fn pointer_left(&mut self) {
        if self.hovered.take().is_some() {
            self.store.focus_on_business_id(None, FocusSource::List);
        }
    }

    pub fn click(&mut self, x: f64, y: f64) {
        if let Some(index) = self.row_at(x, y) {
            self.select_row(index);
        }
    }

    pub fn select_row(&mut self, index: usize) {
        if let Some(business) = self.businesses.get(index) {
            self.store.set_selected_business_id(Some(business.id.clone()));
        }
    }

    /// Keyboard navigation: moves the cursor and focuses its row.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.businesses.is_empty() {
            return;
        }
        let last = self.businesses.len() - 1;
        let index = match self.cursor {
            None if delta < 0 => last,
            None => 0,
            Some(current) => current.saturating_add_signed(delta).min(last),
        };
        self.cursor = Some(index);
        self.reveal_row(index);
        let id = self.businesses[index].id.clone();
        self.store.focus_on_business_id(Some(id), FocusSource::List);
    }

    pub fn activate_cursor(&mut self) {
        if let Some(index) = self.cursor {
            self.select_row(index);
        }
    }

    /// Drops the keyboard cursor and any hover, clearing list focus.
    pub fn blur(&mut self) {
        let had_focus = self.cursor.take().is_some() | self.hovered.take().is_some();
        if had_focus {
            self.store.focus_on_business_id(None, FocusSource::List);
        }
    }

    pub fn scroll_by(&mut self, lines: i32) {
        self.animation_target = None;
        let offset = i32::from(self.scroll_offset) + lines;
        self.scroll_offset = offset.clamp(0, i32::from(self.max_offset())) as u16;
    }

    // Keeps the cursor row on screen with the smallest jump, no animation.
    fn reveal_row(&mut self, index: usize) {
        self.animation_target = None;
        let rect = self.row_rect(index);
        if self.viewport.is_empty() || is_fully_within(&rect, &self.viewport) {
            return;
        }
        let row_top = index as i32 * i32::from(self.row_height);
        let offset = if rect.top < self.viewport.top {
            row_top
        } else {
            row_top + i32::from(self.row_height) - self.viewport.height as i32
        };
        self.scroll_offset = offset.clamp(0, i32::from(self.max_offset())) as u16;
    }

    fn centered_offset(&self, index: usize) -> u16 {
        let row_height = i32::from(self.row_height);
        let center = index as i32 * row_height + row_height / 2 - self.viewport.height as i32 / 2;
        center.clamp(0, i32::from(self.max_offset())) as u16
    }

    /// Runs the pending auto-scroll request and advances the animation.
    pub fn tick(&mut self) {
        let request = self.reaction.borrow_mut().scroll_request.take();
        if let Some(id) = request {
            self.start_auto_scroll(&id);
        }

        if let Some(target) = self.animation_target {
            let current = i32::from(self.scroll_offset);
            let distance = i32::from(target) - current;
            if distance == 0 {
                self.animation_target = None;
            } else {
                let step = (distance.abs() / 3).max(1) * distance.signum();
                self.scroll_offset = (current + step) as u16;
                if self.scroll_offset == target {
                    self.animation_target = None;
                }
            }
        }
    }

    fn start_auto_scroll(&mut self, id: &BusinessId) {
        self.animation_target = None;
        if self.viewport.is_empty() {
            debug!(business = %id, "auto-scroll skipped, list not measured");
            return;
        }
        let Some(index) = self.businesses.iter().position(|b| &b.id == id) else {
            return;
        };
        if is_fully_within(&self.row_rect(index), &self.viewport) {
            return;
        }
        let target = self.centered_offset(index);
        debug!(business = %id, from = self.scroll_offset, to = target, "auto-scrolling list");
        self.animation_target = Some(target);
    }
}

impl Drop for ListView {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
