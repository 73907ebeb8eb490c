use crate::application::{ActivePane, App, AppMode};
use crate::presentation::help_line_count;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, _modifiers: KeyModifiers) {
        app.status_message = None;

        match key {
            KeyCode::Tab | KeyCode::BackTab => app.toggle_pane(),
            KeyCode::Up | KeyCode::Char('k') => match app.active_pane {
                ActivePane::List => app.list.move_cursor(-1),
                ActivePane::Map => app.map.cycle_focus(-1),
            },
            KeyCode::Down | KeyCode::Char('j') => match app.active_pane {
                ActivePane::List => app.list.move_cursor(1),
                ActivePane::Map => app.map.cycle_focus(1),
            },
            KeyCode::Enter | KeyCode::Char(' ') => match app.active_pane {
                ActivePane::List => app.list.activate_cursor(),
                ActivePane::Map => app.map.toggle_hovered(),
            },
            KeyCode::PageUp => {
                let page = app.list.viewport().height as i32;
                app.list.scroll_by(-page);
            }
            KeyCode::PageDown => {
                let page = app.list.viewport().height as i32;
                app.list.scroll_by(page);
            }
            KeyCode::Esc => app.clear_active(),
            KeyCode::F(1) | KeyCode::Char('?') => app.open_help(),
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        let max_scroll = help_line_count().saturating_sub(1);
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => app.close_help(),
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll = (app.help_scroll + 1).min(max_scroll);
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll = (app.help_scroll + 5).min(max_scroll);
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
        if app.mode != AppMode::Normal {
            return;
        }
        let (x, y) = (f64::from(event.column), f64::from(event.row));
        let in_list = app.list.viewport().contains(x, y);

        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => Self::route_pointer(app, x, y),
            MouseEventKind::Down(MouseButton::Left) => {
                Self::route_pointer(app, x, y);
                if in_list {
                    app.active_pane = ActivePane::List;
                    app.list.click(x, y);
                } else if app.map.area().contains(x, y) {
                    app.active_pane = ActivePane::Map;
                    app.map.click(x, y);
                }
            }
            MouseEventKind::ScrollUp if in_list => app.list.scroll_by(-1),
            MouseEventKind::ScrollDown if in_list => app.list.scroll_by(1),
            _ => {}
        }
    }

    // The view being left releases its focus before the other one claims it.
    fn route_pointer(app: &mut App, x: f64, y: f64) {
        if app.list.viewport().contains(x, y) {
            app.map.pointer_left();
            app.list.pointer_moved(x, y);
        } else if app.map.area().contains(x, y) {
            app.list.pointer_left();
            app.map.pointer_moved(x, y);
        } else {
            app.list.pointer_left();
            app.map.pointer_left();
        }
    }
}
