//! Application state for the results explorer.
//!
//! Owns the interaction store for the session and the two views that share
//! it, plus the UI chrome state (mode, active pane, status line).

use super::list_view::ListView;
use super::map_view::{MapView, MarkerGeometry};
use super::store::{InteractionState, InteractionStore};
use crate::domain::{Business, BusinessId, ScreenRect};
use crate::infrastructure::Config;
use std::rc::Rc;

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing results in the list and the map
    Normal,
    /// Help screen is displayed
    Help,
}

/// The pane keyboard input goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    List,
    Map,
}

/// Main application state: one results session.
///
/// # Examples
///
/// ```
/// use bizscope::application::{App, AppMode};
/// use bizscope::domain::Business;
/// use bizscope::infrastructure::Config;
///
/// let app = App::new(vec![Business::new("1", "Cafe")], &Config::default(), "demo");
/// assert_eq!(app.mode, AppMode::Normal);
/// assert!(app.state().selected.is_none());
/// ```
#[derive(Debug)]
pub struct App {
    pub store: InteractionStore,
    pub businesses: Rc<[Business]>,
    pub list: ListView,
    pub map: MapView,
    pub mode: AppMode,
    pub active_pane: ActivePane,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Where the results came from, shown in the header
    pub source_label: String,
}

impl App {
    pub fn new(businesses: Vec<Business>, config: &Config, source_label: impl Into<String>) -> Self {
        let businesses: Rc<[Business]> = businesses.into();
        let store = InteractionStore::new();
        let list = ListView::new(store.clone(), Rc::clone(&businesses), config.list.row_height);
        let map = MapView::new(
            store.clone(),
            Rc::clone(&businesses),
            config.map.fit_options(),
            config.map.cell_size(),
            MarkerGeometry::default(),
        );

        let unplaced = businesses.iter().filter(|b| b.location().is_none()).count();
        let status_message = (unplaced > 0).then(|| format!("{} of {} results have no location and are not on the map", unplaced, businesses.len()));

        Self {
            store,
            businesses,
            list,
            map,
            mode: AppMode::Normal,
            active_pane: ActivePane::List,
            help_scroll: 0,
            status_message,
            source_label: source_label.into(),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.store.snapshot()
    }

    pub fn business(&self, id: &BusinessId) -> Option<&Business> {
        self.businesses.iter().find(|b| &b.id == id)
    }

    pub fn selected_business(&self) -> Option<&Business> {
        self.state().selected.and_then(|id| self.business(&id))
    }

    pub fn focused_business(&self) -> Option<&Business> {
        self.state().focus.business_id().and_then(|id| self.business(id))
    }

    /// Layout measurement callback, run before every frame is drawn.
    pub fn on_layout(&mut self, list_area: ScreenRect, map_area: ScreenRect) {
        self.list.set_viewport(list_area);
        self.map.set_container(map_area);
    }

    pub fn tick(&mut self) {
        self.list.tick();
    }

    pub fn toggle_pane(&mut self) {
        self.active_pane = match self.active_pane {
            ActivePane::List => {
                self.list.blur();
                ActivePane::Map
            }
            ActivePane::Map => {
                self.map.pointer_left();
                ActivePane::List
            }
        };
    }

    /// Clears the active pane's focus and the selection.
    pub fn clear_active(&mut self) {
        match self.active_pane {
            ActivePane::List => self.list.blur(),
            ActivePane::Map => self.map.pointer_left(),
        }
        self.store.set_selected_business_id(None);
    }

    pub fn open_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{FocusSource, FocusState, MarkerVariant, RowVariant};

    fn scenario() -> Vec<Business> {
        vec![
            Business::new("1", "Cafe").with_coordinates(10.0, 20.0),
            Business::new("2", "Diner").with_coordinates(12.0, 22.0),
        ]
    }

    fn laid_out(businesses: Vec<Business>) -> App {
        let mut app = App::new(businesses, &Config::default(), "test");
        app.on_layout(ScreenRect::new(0.0, 1.0, 40.0, 9.0), ScreenRect::new(40.0, 1.0, 100.0, 37.5));
        app
    }

    #[test]
    fn test_app_default_state() {
        let app = App::new(scenario(), &Config::default(), "test");
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.active_pane, ActivePane::List);
        assert_eq!(app.state(), InteractionState::default());
        assert!(app.status_message.is_none());
        assert_eq!(app.store.subscriber_count(), 2);
    }

    #[test]
    fn test_unplaced_businesses_are_reported() {
        let mut businesses = scenario();
        businesses.push(Business::new("3", "Nowhere"));
        let app = App::new(businesses, &Config::default(), "test");
        assert!(app.status_message.unwrap().contains("1 of 3"));
    }

    #[test]
    fn test_map_focus_reaches_list() {
        let mut app = laid_out(scenario());
        app.store.focus_on_business_id(Some(BusinessId::new("2")), FocusSource::Map);

        let rows = app.list.visible_rows();
        let variants = rows.iter().map(|r| r.variant).collect::<Vec<_>>();
        assert_eq!(variants, vec![RowVariant::Default, RowVariant::Emphasized]);
        drop(rows);

        // Row 2 is on screen, so nothing scrolls.
        app.tick();
        assert!(!app.list.is_animating());
        assert_eq!(app.focused_business().map(|b| b.name.as_str()), Some("Diner"));
    }

    #[test]
    fn test_list_hover_does_not_dim_map() {
        let mut app = laid_out(scenario());
        app.list.pointer_moved(2.0, 4.0);
        assert_eq!(app.state().focus, FocusState::FocusedByList(BusinessId::new("2")));

        assert!(app.map.markers().iter().all(|(_, v)| *v == MarkerVariant::Normal));
        assert_eq!(app.list.pending_scroll(), None);
    }

    #[test]
    fn test_list_click_opens_map_popup() {
        let mut app = laid_out(scenario());
        app.list.click(2.0, 1.0);
        assert_eq!(app.selected_business().map(|b| b.name.as_str()), Some("Cafe"));
        assert_eq!(app.map.popup().map(|p| p.id), Some(BusinessId::new("1")));
    }

    #[test]
    fn test_toggle_pane_blurs_previous_pane() {
        let mut app = laid_out(scenario());
        app.list.move_cursor(1);
        assert!(app.state().focus.business_id().is_some());

        app.toggle_pane();
        assert_eq!(app.active_pane, ActivePane::Map);
        assert_eq!(app.state().focus, FocusState::Unfocused);

        app.map.cycle_focus(1);
        app.toggle_pane();
        assert_eq!(app.active_pane, ActivePane::List);
        assert_eq!(app.state().focus, FocusState::Unfocused);
    }

    #[test]
    fn test_clear_active_clears_selection() {
        let mut app = laid_out(scenario());
        app.list.move_cursor(1);
        app.list.activate_cursor();
        assert!(app.state().selected.is_some());

        app.clear_active();
        assert_eq!(app.state(), InteractionState::default());
    }

    #[test]
    fn test_help_mode() {
        let mut app = App::new(Vec::new(), &Config::default(), "test");
        app.help_scroll = 4;
        app.open_help();
        assert_eq!(app.mode, AppMode::Help);
        assert_eq!(app.help_scroll, 0);
        app.close_help();
        assert_eq!(app.mode, AppMode::Normal);
    }
}
