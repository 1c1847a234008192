use ecoleta_core::{
    form::{FormController, SubmissionStatus},
    model::ContactField,
};
use ratatui::{
    layout::{Margin, Position},
    prelude::*,
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Map, MapResolution},
    },
};

use crate::app::{App, Focus, Notice, Screen};
use crate::map::MapView;

/// Areas of the registration screen, shared by drawing and mouse handling.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormLayout {
    pub name: Rect,
    pub email: Rect,
    pub whatsapp: Rect,
    pub items: Rect,
    pub submit: Rect,
    pub map: Rect,
    pub state: Rect,
    pub city: Rect,
}

impl FormLayout {
    fn new(content: Rect) -> Option<Self> {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(content);
        let &[left, right] = columns.as_ref() else {
            return None;
        };

        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // name
                Constraint::Length(3), // email
                Constraint::Length(3), // whatsapp
                Constraint::Min(3),    // items
                Constraint::Length(3), // submit
            ])
            .split(left);
        let &[name, email, whatsapp, items, submit] = left_rows.as_ref() else {
            return None;
        };

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(right);
        let &[map, selectors] = right_rows.as_ref() else {
            return None;
        };

        let selector_columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(selectors);
        let &[state, city] = selector_columns.as_ref() else {
            return None;
        };

        Some(Self {
            name,
            email,
            whatsapp,
            items,
            submit,
            map,
            state,
            city,
        })
    }

    /// Drawable part of the map, inside its border.
    pub(crate) fn map_inner(&self) -> Rect {
        self.map.inner(Margin::new(1, 1))
    }

    /// Catalog index shown on `row`, given the item highlighted when the list was drawn.
    pub(crate) fn item_at(&self, row: u16, highlighted: Option<usize>) -> Option<usize> {
        let inner = self.items.inner(Margin::new(1, 1));
        if row < inner.y || row >= inner.bottom() {
            return None;
        }
        // The list scrolls just enough to keep the highlighted item on the last row.
        let offset = highlighted.map_or(0, |index| {
            (index + 1).saturating_sub(usize::from(inner.height))
        });
        Some(offset + usize::from(row - inner.y))
    }

    pub(crate) fn focus_at(&self, column: u16, row: u16) -> Option<Focus> {
        let position = Position::new(column, row);
        [
            (self.name, Focus::Name),
            (self.email, Focus::Email),
            (self.whatsapp, Focus::Whatsapp),
            (self.map, Focus::Map),
            (self.state, Focus::State),
            (self.city, Focus::City),
            (self.items, Focus::Items),
            (self.submit, Focus::Submit),
        ]
        .into_iter()
        .find(|(area, _)| area.contains(position))
        .map(|(_, focus)| focus)
    }
}

fn screen_areas(area: Rect) -> Option<[Rect; 3]> {
    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let &[header, content, status] = layout_chunks.as_ref() else {
        return None;
    };
    Some([header, content, status])
}

/// Layout of the registration screen for a terminal of the given size.
pub(crate) fn form_layout(viewport: Rect) -> Option<FormLayout> {
    let [_, content, _] = screen_areas(viewport)?;
    FormLayout::new(content)
}

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();
    let Some([header_area, content_area, status_area]) = screen_areas(area) else {
        return;
    };

    let header = Paragraph::new("Ecoleta – your waste collection marketplace")
        .block(Block::default().borders(Borders::ALL).title("Ecoleta"));
    frame.render_widget(header, header_area);

    match (app.screen, app.form.as_ref()) {
        (Screen::CreatePoint, Some(form)) => {
            if let Some(layout) = FormLayout::new(content_area) {
                draw_form(frame, app, form, &layout);
            }
        }
        _ => draw_landing(frame, content_area),
    }

    draw_status(frame, app, status_area);

    if let Some(notice) = &app.notice {
        draw_notice(frame, notice, area);
    }
}

fn draw_landing(frame: &mut Frame<'_>, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from("Your waste collection marketplace.").style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from("We help people find collection points efficiently."),
        Line::from(""),
        Line::from("▶ Press Enter to register a collection point")
            .style(Style::default().fg(Color::Yellow)),
    ];

    let landing = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(landing, area);
}

fn draw_form(frame: &mut Frame<'_>, app: &App, form: &FormController, layout: &FormLayout) {
    let contact_areas = [layout.name, layout.email, layout.whatsapp];
    for (field, area) in ContactField::ALL.into_iter().zip(contact_areas) {
        let focused = app.focus.contact_field() == Some(field);
        let mut value = form.draft().contact.get(field).to_owned();
        if focused {
            value.push('▏');
        }
        let input = Paragraph::new(value).block(focused_block(field.label(), focused));
        frame.render_widget(input, area);
    }

    draw_map(frame, app, form, layout.map);
    draw_state_selector(frame, app, form, layout.state);
    draw_city_selector(frame, app, form, layout.city);
    draw_items(frame, app, form, layout.items);
    draw_submit(frame, app, form, layout.submit);
}

fn draw_map(frame: &mut Frame<'_>, app: &App, form: &FormController, area: Rect) {
    let focused = app.focus == Focus::Map;
    let selected = form.draft().position;
    let title = if selected.is_unset() {
        "Address · pick the point on the map".to_owned()
    } else {
        format!("Address · {selected}")
    };

    let block = focused_block(&title, focused);
    let inner = block.inner(area);
    let view = MapView::new(form.map_center(), app.map_span);
    let cursor = app.cursor_position();

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(view.lon_bounds(inner))
        .y_bounds(view.lat_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::Green,
                resolution: MapResolution::High,
            });
            ctx.layer();
            if !selected.is_unset() {
                ctx.print(
                    selected.longitude,
                    selected.latitude,
                    Span::styled("●", Style::default().fg(Color::Red)),
                );
            }
            if let (true, Some(cursor)) = (focused, cursor) {
                ctx.print(
                    cursor.longitude,
                    cursor.latitude,
                    Span::styled("+", Style::default().fg(Color::Yellow)),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_state_selector(frame: &mut Frame<'_>, app: &App, form: &FormController, area: Rect) {
    let text = match &form.draft().state {
        Some(state) => format!("◀ {state} ▶"),
        None if form.states().is_empty() && form.is_loading() => "Loading…".to_owned(),
        None if form.states().is_empty() => "No states available".to_owned(),
        None => "◀ Select a state ▶".to_owned(),
    };
    let selector = Paragraph::new(text).block(focused_block("State (UF)", app.focus == Focus::State));
    frame.render_widget(selector, area);
}

fn draw_city_selector(frame: &mut Frame<'_>, app: &App, form: &FormController, area: Rect) {
    let text = match (&form.draft().state, &form.draft().city) {
        (_, Some(city)) => format!("◀ {city} ▶"),
        (None, None) => "Select a state first".to_owned(),
        (Some(_), None) if form.cities().is_empty() && form.is_loading() => {
            "Loading…".to_owned()
        }
        (Some(_), None) if form.cities().is_empty() => "No cities available".to_owned(),
        (Some(_), None) => format!("◀ Select a city ({}) ▶", form.cities().len()),
    };
    let selector = Paragraph::new(text)
        .block(focused_block("City", app.focus == Focus::City))
        .wrap(Wrap { trim: true });
    frame.render_widget(selector, area);
}

fn draw_items(frame: &mut Frame<'_>, app: &App, form: &FormController, area: Rect) {
    let focused = app.focus == Focus::Items;
    let block = focused_block("Collection items (Space to toggle)", focused);

    if form.catalog().is_empty() {
        let text = if form.is_loading() {
            "Loading items…"
        } else {
            "No items available."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let items = form
        .catalog()
        .iter()
        .map(|item| {
            if form.draft().is_selected(item.id) {
                ListItem::new(format!("[x] {}", item.title)).style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("[ ] {}", item.title))
            }
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.item_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_submit(frame: &mut Frame<'_>, app: &App, form: &FormController, area: Rect) {
    let focused = app.focus == Focus::Submit;
    let (label, mut style) = match form.submission() {
        SubmissionStatus::InFlight => ("Submitting…", Style::default().fg(Color::DarkGray)),
        SubmissionStatus::Idle | SubmissionStatus::Failed(_) | SubmissionStatus::Completed => (
            "Register collection point",
            Style::default().fg(Color::Green),
        ),
    };
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(focused_block("", focused));
    frame.render_widget(button, area);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint = match (app.screen, app.focus) {
        (Screen::Landing, _) => "Enter register a point · q/Ctrl-C quit",
        (Screen::CreatePoint, Focus::Name | Focus::Email | Focus::Whatsapp) => {
            "Type to edit · Tab/Shift-Tab move · Ctrl-S submit · Esc home · Ctrl-C quit"
        }
        (Screen::CreatePoint, Focus::Map) => {
            "Arrows move · Enter/Space pick · +/- zoom · click to pick · Tab move · Esc home"
        }
        (Screen::CreatePoint, Focus::State | Focus::City) => {
            "←/→ change · Tab move · Ctrl-S submit · Esc home · q quit"
        }
        (Screen::CreatePoint, Focus::Items) => {
            "↑/↓ move · Space toggle · Tab move · Ctrl-S submit · Esc home · q quit"
        }
        (Screen::CreatePoint, Focus::Submit) => "Enter submit · Tab move · Esc home · q quit",
    };

    let loading = app.form.as_ref().is_some_and(FormController::is_loading);
    let status_text = if let Some(msg) = &app.status_message {
        format!("{msg} · {nav_hint}")
    } else if loading {
        format!("Loading… · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.status_message.is_some() {
        Style::default().fg(Color::Red)
    } else if loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}

fn draw_notice(frame: &mut Frame<'_>, notice: &Notice, area: Rect) {
    let (title, message, color) = match notice {
        Notice::Created => (
            "Done",
            "Collection point created!".to_owned(),
            Color::Green,
        ),
        Notice::Failed(reason) => (
            "Registration failed",
            format!("{reason}\nYour data was kept; fix it and submit again."),
            Color::Red,
        ),
    };

    let popup = centered(area, 60, 7);
    let paragraph = Paragraph::new(format!("{message}\n\nPress Enter to continue"))
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn focused_block(title: &str, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title.to_owned())
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x) / 100;
    let height = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use ecoleta_core::model::StateCode;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::fakes;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 40)).expect("test terminal");
        terminal
            .draw(|frame| draw(frame, app))
            .expect("draws");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn landing_invites_to_register() {
        let app = App::new(fakes::backends(), fakes::CENTER);

        let screen = render(&app);

        assert!(screen.contains("Your waste collection marketplace."));
        assert!(screen.contains("Press Enter to register a collection point"));
    }

    #[tokio::test]
    async fn form_shows_selection_state() {
        let mut app = App::new(fakes::backends(), fakes::CENTER);
        app.open_form();
        if let Some(form) = app.form.as_mut() {
            form.settle().await;
        }
        app.move_item_cursor(true);
        app.toggle_current_item();
        app.cycle_state(true);

        let screen = render(&app);

        assert!(screen.contains("[x] Pilhas e Baterias"));
        assert!(screen.contains("[ ] Lâmpadas"));
        assert!(screen.contains("◀ RJ ▶"));
        assert!(screen.contains("pick the point on the map"));
        for field in ContactField::ALL {
            assert!(screen.contains(field.label()), "{field:?} input is drawn");
        }
    }

    #[tokio::test]
    async fn city_selector_reports_an_empty_lookup() {
        let mut app = App::new(fakes::backends(), fakes::CENTER);
        app.open_form();
        if let Some(form) = app.form.as_mut() {
            form.settle().await;
            form.select_state(Some(StateCode::from("AC")));
            form.settle().await;
        }

        let screen = render(&app);

        assert!(screen.contains("No cities available"));
        assert!(!screen.contains("Loading…"));
    }

    #[test]
    fn notice_is_drawn_on_top() {
        let mut app = App::new(fakes::backends(), fakes::CENTER);
        app.notice = Some(Notice::Failed("Rejected by server (400): name is required".to_owned()));

        let screen = render(&app);

        assert!(screen.contains("Registration failed"));
        assert!(screen.contains("Press Enter to continue"));
    }

    #[test]
    fn item_rows_follow_the_list_scroll() {
        let layout = form_layout(Rect::new(0, 0, 110, 40)).expect("fits");
        let first_row = layout.items.y + 1;
        let visible = usize::from(layout.items.height - 2);

        assert_eq!(layout.item_at(layout.items.y, None), None);
        assert_eq!(layout.item_at(first_row, None), Some(0));
        assert_eq!(layout.item_at(first_row + 2, Some(1)), Some(2));
        assert_eq!(layout.item_at(first_row, Some(visible + 3)), Some(4));
    }

    #[test]
    fn map_area_is_found_by_position() {
        let layout = form_layout(Rect::new(0, 0, 110, 40)).expect("fits");
        let inner = layout.map_inner();

        assert_eq!(
            layout.focus_at(inner.x + inner.width / 2, inner.y + inner.height / 2),
            Some(Focus::Map)
        );
        assert_eq!(layout.focus_at(layout.name.x + 1, layout.name.y + 1), Some(Focus::Name));
        assert_eq!(layout.focus_at(0, 0), None);
    }
}
