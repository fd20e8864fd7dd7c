//! Rendering for the browser

use super::app::{BrowseApp, Focus, SearchTarget, Status};
use super::theme::Theme;
use accessmap_foundation::role_label;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut BrowseApp, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, theme);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[1]);
    render_roles(frame, body[0], app, theme);
    render_tree(frame, body[1], app, theme);

    render_status(frame, chunks[2], app, theme);
    render_help(frame, chunks[3], theme);
}

fn render_header(frame: &mut Frame, area: Rect, app: &BrowseApp, theme: &Theme) {
    let role = app.store.active_role().unwrap_or("-");
    let c = app.store.counters();
    let mut spans = vec![
        Span::styled(" AccessMap ", theme.header()),
        Span::styled(format!("role {} ", role), theme.text()),
        Span::styled(format!("{} active ", c.active), theme.granted()),
        Span::styled(format!("{} denied ", c.denied), theme.text_muted()),
    ];
    if app.has_unsaved() {
        spans.push(Span::styled("● unsaved", theme.warning()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn pane_block<'a>(title: String, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border()
        })
        .title(title)
}

fn render_roles(frame: &mut Frame, area: Rect, app: &mut BrowseApp, theme: &Theme) {
    let active = app.store.active_role().map(str::to_string);
    let items: Vec<ListItem> = app
        .store
        .filtered_roles()
        .iter()
        .map(|role| {
            let marker = if active.as_deref() == Some(role.role_id.as_str()) {
                "● "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, theme.granted()),
                Span::styled(role.role_id.clone(), theme.text()),
                Span::styled(format!("  {}", role_label(&role.role_id)), theme.text_muted()),
            ]))
        })
        .collect();

    let title = match app.store.role_query() {
        "" => " Roles ".to_string(),
        query => format!(" Roles /{} ", query),
    };
    let list = List::new(items)
        .block(pane_block(title, app.focus == Focus::Roles, theme))
        .highlight_style(theme.selected());
    frame.render_stateful_widget(list, area, &mut app.role_list);
}

fn render_tree(frame: &mut Frame, area: Rect, app: &mut BrowseApp, theme: &Theme) {
    let items: Vec<ListItem> = app
        .store
        .visible_rows()
        .into_iter()
        .map(|row| {
            let branch = match (row.has_children, row.expanded) {
                (true, true) => "▾ ",
                (true, false) => "▸ ",
                (false, _) => "  ",
            };
            let (check, style) = if row.checked {
                ("[x] ", theme.granted())
            } else {
                ("[ ] ", theme.text_muted())
            };
            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(branch, theme.text_muted()),
                Span::styled(check, style),
                Span::styled(row.name, theme.text()),
                Span::styled(format!("  {}", row.id), theme.text_muted()),
            ]))
        })
        .collect();

    let title = match app.store.tree_query() {
        "" => " Markers ".to_string(),
        query => format!(" Markers /{} ", query),
    };
    let list = List::new(items)
        .block(pane_block(title, app.focus == Focus::Tree, theme))
        .highlight_style(theme.selected());
    frame.render_stateful_widget(list, area, &mut app.tree_list);
}

fn render_status(frame: &mut Frame, area: Rect, app: &BrowseApp, theme: &Theme) {
    let line = match (app.search, &app.status) {
        (Some(SearchTarget::Roles), _) => Line::styled(
            format!("search roles: {}▏", app.store.role_query()),
            theme.header(),
        ),
        (Some(SearchTarget::Tree), _) => Line::styled(
            format!("search markers: {}▏", app.store.tree_query()),
            theme.header(),
        ),
        (None, Some(Status::Info(msg))) => Line::styled(msg.clone(), theme.granted()),
        (None, Some(Status::Error(msg))) => Line::styled(msg.clone(), theme.error()),
        (None, None) => Line::raw(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let keys = [
        ("tab", "pane"),
        ("space", "toggle"),
        ("enter", "open/select"),
        ("e/c", "expand/collapse all"),
        ("a/n", "all/none"),
        ("/", "search"),
        ("s", "apply"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (key, desc) in keys {
        spans.push(Span::styled(format!(" {} ", key), theme.keybind()));
        spans.push(Span::styled(format!("{} ", desc), theme.keybind_desc()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
