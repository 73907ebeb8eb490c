use crate::application::{ActivePane, App, AppMode, FocusSource, MarkerVariant, Popup, RowParity, RowVariant, RowView};
use crate::domain::ScreenRect;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const MARKER_GLYPH: &str = "(●)";
const POPUP_WIDTH: u16 = 34;
const POPUP_HEIGHT: u16 = 5;

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    let list_block = pane_block("Results", app.active_pane == ActivePane::List);
    let map_block = pane_block("Map", app.active_pane == ActivePane::Map);
    let list_area = list_block.inner(panes[0]);
    let map_area = map_block.inner(panes[1]);

    // Measure before drawing so both views derive this frame from the
    // current sizes.
    app.on_layout(to_screen_rect(list_area), to_screen_rect(map_area));

    render_header(f, app, chunks[0]);
    f.render_widget(list_block, panes[0]);
    render_list(f, app, list_area);
    f.render_widget(map_block, panes[1]);
    render_map(f, app, map_area);
    render_status_bar(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

pub fn to_screen_rect(area: Rect) -> ScreenRect {
    ScreenRect::new(
        f64::from(area.x),
        f64::from(area.y),
        f64::from(area.width),
        f64::from(area.height),
    )
}

/// Intersects `rect` with `bounds`, returning the visible cells and how many
/// leading lines were cut off.
fn clip(rect: ScreenRect, bounds: Rect) -> Option<(Rect, u16)> {
    let left = rect.left.max(f64::from(bounds.x));
    let top = rect.top.max(f64::from(bounds.y));
    let right = rect.right().min(f64::from(bounds.right()));
    let bottom = rect.bottom().min(f64::from(bounds.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    let skipped = (top - rect.top) as u16;
    Some((
        Rect::new(left as u16, top as u16, (right - left) as u16, (bottom - top) as u16),
        skipped,
    ))
}

fn pane_block(title: &str, active: bool) -> Block<'_> {
    let border = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default().borders(Borders::ALL).border_style(border).title(title)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let placed = app.map.placements().len();
    let header = Paragraph::new(format!(
        "bizscope - {} results from {} | {} on map",
        app.businesses.len(),
        app.source_label,
        placed
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn row_style(row: &RowView<'_>) -> Style {
    let background = match (row.variant, row.tinted, row.parity) {
        (RowVariant::Emphasized, _, _) => Color::Indexed(239),
        (RowVariant::Default, true, _) => Color::Indexed(58),
        (RowVariant::Default, false, RowParity::Even) => Color::Reset,
        (RowVariant::Default, false, RowParity::Odd) => Color::Indexed(235),
    };
    Style::default().bg(background)
}

fn row_lines<'a>(row: &RowView<'a>) -> Vec<Line<'a>> {
    let business = row.business;
    let gutter = match row.variant {
        RowVariant::Emphasized => Span::styled("▌", Style::default().fg(Color::Yellow)),
        RowVariant::Default => Span::raw(" "),
    };
    let mut name_style = Style::default().add_modifier(Modifier::BOLD);
    if row.variant == RowVariant::Emphasized {
        name_style = name_style.fg(Color::Yellow);
    }

    let mut lines = vec![Line::from(vec![gutter.clone(), Span::styled(business.name.as_str(), name_style)])];
    if let Some(reviews) = business.review_line() {
        lines.push(Line::from(vec![
            gutter.clone(),
            Span::styled(reviews, Style::default().fg(Color::LightRed)),
        ]));
    }
    let categories = business.category_line();
    if !categories.is_empty() {
        lines.push(Line::from(vec![gutter, Span::styled(categories, Style::default().fg(Color::Gray))]));
    }
    lines
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    if app.list.is_empty() {
        f.render_widget(Paragraph::new(" No results").style(Style::default().fg(Color::DarkGray)), area);
        return;
    }

    for row in app.list.visible_rows() {
        let Some((cells, skipped)) = clip(row.rect, area) else {
            continue;
        };
        let paragraph = Paragraph::new(row_lines(&row))
            .style(row_style(&row))
            .scroll((skipped, 0));
        f.render_widget(paragraph, cells);
    }
}

fn render_map(f: &mut Frame, app: &App, area: Rect) {
    // Until the container has a size there is no camera and nothing to draw.
    if app.map.camera().is_none() {
        return;
    }

    for (placement, variant) in app.map.markers() {
        let Some((cells, _)) = clip(placement.rect, area) else {
            continue;
        };
        let style = match variant {
            MarkerVariant::Normal => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            MarkerVariant::Deemphasized => Style::default().fg(Color::DarkGray),
        };
        f.render_widget(Paragraph::new(MARKER_GLYPH).style(style), cells);
    }

    if let Some(popup) = app.map.popup() {
        render_popup(f, app, &popup, area);
    }
}

/// Places the popup under its anchor, or above it when there is no room,
/// kept inside the map.
fn popup_area(anchor: (f64, f64), area: Rect) -> Rect {
    let width = POPUP_WIDTH.min(area.width);
    let height = POPUP_HEIGHT.min(area.height);
    let (anchor_x, anchor_y) = (anchor.0 as i32, anchor.1 as i32);

    let max_x = i32::from(area.right()) - i32::from(width);
    let x = (anchor_x - i32::from(width) / 2).clamp(i32::from(area.x), max_x.max(i32::from(area.x)));

    let below = anchor_y + 1;
    let y = if below + i32::from(height) <= i32::from(area.bottom()) {
        below
    } else {
        (anchor_y - i32::from(height)).max(i32::from(area.y))
    };

    Rect::new(x as u16, y as u16, width, height)
}

fn render_popup(f: &mut Frame, app: &App, popup: &Popup, area: Rect) {
    let Some(business) = app.businesses.get(popup.index) else {
        return;
    };
    let target = popup_area(popup.anchor, area);

    let mut lines = Vec::new();
    lines.push(Line::from(business.review_line().unwrap_or_else(|| "No rating".to_string())));
    let categories = business.category_line();
    if !categories.is_empty() {
        lines.push(Line::from(categories));
    }
    lines.push(Line::from(Span::styled(
        format!("{:.4}, {:.4}", popup.location.lat, popup.location.lng),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, target);
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(business.name.as_str()),
    );
    f.render_widget(widget, target);
}

fn interaction_summary(app: &App) -> String {
    let state = app.state();
    let focus = match (app.focused_business(), state.focus_source()) {
        (Some(business), Some(FocusSource::List)) => format!("Focus: {} (list)", business.name),
        (Some(business), Some(FocusSource::Map)) => format!("Focus: {} (map)", business.name),
        _ => "Focus: -".to_string(),
    };
    let selected = app
        .selected_business()
        .map(|b| format!("Selected: {}", b.name))
        .unwrap_or_else(|| "Selected: -".to_string());
    format!("{} | {}", focus, selected)
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => match &app.status_message {
            Some(status) => status.clone(),
            None => {
                let hints = match app.active_pane {
                    ActivePane::List => "↑↓: move | Enter: select",
                    ActivePane::Map => "↑↓: next marker | Enter: toggle popup",
                };
                format!("{} | {} | Tab: switch pane | Esc: clear | ?: help | q: quit", interaction_summary(app), hints)
            }
        },
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
    };

    let style = match app.mode {
        AppMode::Normal => Style::default(),
        AppMode::Help => Style::default().fg(Color::Cyan),
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("bizscope Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

pub fn help_line_count() -> usize {
    get_help_text().lines().count()
}

fn get_help_text() -> &'static str {
    r#"BIZSCOPE - BUSINESS SEARCH EXPLORER

=== LAYOUT ===
Left pane       Results, in the order the search returned them
Right pane      Map with one marker per result that has a location
Header          Result count and how many are on the map
Status bar      Current focus and selection

=== FOCUS AND SELECTION ===
Focus           The result under the pointer or the keyboard cursor.
                At most one result is focused at a time.
Selection       The result whose details are open on the map.
                At most one result is selected at a time.

Hovering a result in the list focuses it without moving the list.
Hovering a marker focuses it from the map: the other markers are
dimmed, the matching result is highlighted in the list and, if it
is off screen, the list scrolls to center it.

=== MOUSE ===
Move            Focus the result or marker under the pointer
Click result    Select it and open its popup on the map
Click marker    Open its popup; click again to close it
Wheel           Scroll the result list

=== KEYBOARD ===
Tab             Switch between the list and the map
↑↓ or j/k       List: move the cursor   Map: cycle through markers
Enter/Space     List: select            Map: toggle the popup
PgUp/PgDn       Scroll the result list
Esc             Clear focus and selection
F1 or ?         Show this help
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

Results without coordinates are listed but not placed on the map."#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::App;
    use crate::domain::{Business, BusinessId};
    use crate::infrastructure::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn scenario() -> Vec<Business> {
        let mut cafe = Business::new("1", "Cafe").with_coordinates(10.0, 20.0);
        cafe.rating = Some(4.0);
        cafe.review_count = Some(8);
        vec![cafe, Business::new("2", "Diner").with_coordinates(12.0, 22.0)]
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_lists_and_places_results() {
        let mut app = App::new(scenario(), &Config::default(), "test");
        let screen = draw(&mut app, 120, 40);

        assert!(screen.contains("Cafe"));
        assert!(screen.contains("Diner"));
        assert!(screen.contains("★★★★☆ 8 reviews"));
        assert_eq!(screen.matches("●").count(), 2);
        assert!(app.map.camera().is_some());
    }

    #[test]
    fn test_render_popup_for_selection() {
        let mut app = App::new(scenario(), &Config::default(), "test");
        draw(&mut app, 120, 40);

        app.store.set_selected_business_id(Some(BusinessId::new("2")));
        let screen = draw(&mut app, 120, 40);
        assert!(screen.contains("12.0000, 22.0000"));
        assert!(screen.contains("No rating"));

        app.store.set_selected_business_id(None);
        let screen = draw(&mut app, 120, 40);
        assert!(!screen.contains("12.0000, 22.0000"));
    }

    #[test]
    fn test_render_without_map_space() {
        // 2 columns leave the map pane with no inner area.
        let mut app = App::new(scenario(), &Config::default(), "test");
        draw(&mut app, 2, 20);
        assert!(app.map.camera().is_none());
        assert!(app.map.markers().is_empty());
    }

    #[test]
    fn test_render_empty_results() {
        let mut app = App::new(Vec::new(), &Config::default(), "test");
        let screen = draw(&mut app, 80, 20);
        assert!(screen.contains("No results"));
    }

    #[test]
    fn test_clip() {
        let bounds = Rect::new(0, 1, 20, 10);
        assert_eq!(clip(ScreenRect::new(0.0, -1.0, 20.0, 3.0), bounds), Some((Rect::new(0, 1, 20, 1), 2)));
        assert_eq!(clip(ScreenRect::new(0.0, 11.0, 20.0, 3.0), bounds), None);
        assert_eq!(clip(ScreenRect::new(18.0, 2.0, 3.0, 1.0), bounds), Some((Rect::new(18, 2, 2, 1), 0)));
    }

    #[test]
    fn test_popup_area_stays_inside_map() {
        let area = Rect::new(50, 1, 60, 30);
        let below = popup_area((80.0, 5.0), area);
        assert_eq!(below, Rect::new(63, 6, POPUP_WIDTH, POPUP_HEIGHT));

        let above = popup_area((52.0, 29.0), area);
        assert_eq!(above.x, 50);
        assert_eq!(above.y, 24);
    }
}
