use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, Focus, Screen};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Char, Enter, Esc, Tab};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // A notice blocks everything until acknowledged
    if app.notice.is_some() {
        if matches!(key.code, Enter | Esc | Char(' ')) {
            app.notice = None;
        }
        return Action::None;
    }

    let typing = app.screen == Screen::CreatePoint && app.focus.contact_field().is_some();
    if key.code == Char('q') && key.modifiers.is_empty() && !typing {
        return Action::Quit;
    }

    match app.screen {
        Screen::Landing => {
            if matches!(key.code, Enter | Char(' ')) {
                app.open_form();
            }
        }

        Screen::CreatePoint => {
            if key.code == Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.submit();
                return Action::None;
            }

            match key.code {
                Esc => app.close_form(),
                Tab => app.focus = app.focus.next(),
                BackTab => app.focus = app.focus.prev(),
                _ => handle_focused_key(key, app),
            }
        }
    }

    Action::None
}

fn handle_focused_key(key: KeyEvent, app: &mut App) {
    use KeyCode::{Backspace, Char, Down, Enter, Left, Right, Up};

    match app.focus {
        Focus::Name | Focus::Email | Focus::Whatsapp => match key.code {
            Char(character)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                app.type_char(character);
            }
            Backspace => app.backspace(),
            Enter | Down => app.focus = app.focus.next(),
            Up => app.focus = app.focus.prev(),
            _ => {}
        },

        Focus::Map => match key.code {
            Up | Char('k') => app.move_map_cursor(1, 0),
            Down | Char('j') => app.move_map_cursor(-1, 0),
            Left | Char('h') => app.move_map_cursor(0, -1),
            Right | Char('l') => app.move_map_cursor(0, 1),
            Enter | Char(' ') => app.pick_cursor(),
            Char('+' | '=') => app.zoom_in(),
            Char('-') => app.zoom_out(),
            Char('c') => app.map_cursor = None,
            _ => {}
        },

        Focus::State => match key.code {
            Right | Char('l') => app.cycle_state(true),
            Left | Char('h') => app.cycle_state(false),
            Enter | Down => app.focus = app.focus.next(),
            Up => app.focus = app.focus.prev(),
            _ => {}
        },

        Focus::City => match key.code {
            Right | Char('l') => app.cycle_city(true),
            Left | Char('h') => app.cycle_city(false),
            Enter | Down => app.focus = app.focus.next(),
            Up => app.focus = app.focus.prev(),
            _ => {}
        },

        Focus::Items => match key.code {
            Up | Char('k') => app.move_item_cursor(false),
            Down | Char('j') => app.move_item_cursor(true),
            Enter | Char(' ') => app.toggle_current_item(),
            _ => {}
        },

        Focus::Submit => {
            if matches!(key.code, Enter | Char(' ')) {
                app.submit();
            }
        }
    }
}

pub(crate) fn handle_mouse_event(mouse: MouseEvent, app: &mut App) -> Action {
    if app.notice.is_some() || app.screen != Screen::CreatePoint {
        return Action::None;
    }
    let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
        return Action::None;
    };
    let Some(layout) = ui::form_layout(app.viewport) else {
        return Action::None;
    };

    let Some(focus) = layout.focus_at(mouse.column, mouse.row) else {
        return Action::None;
    };
    let highlighted = (app.focus == Focus::Items).then_some(app.item_index);
    app.focus = focus;

    match focus {
        Focus::Map => {
            let picked = app
                .map_view()
                .and_then(|view| view.coordinate_at(layout.map_inner(), mouse.column, mouse.row));
            if let Some(position) = picked {
                app.click_map(position);
            }
        }
        Focus::Items => {
            if let Some(index) = layout.item_at(mouse.row, highlighted) {
                app.click_item(index);
            }
        }
        Focus::Submit => app.submit(),
        Focus::Name | Focus::Email | Focus::Whatsapp | Focus::State | Focus::City => {}
    }

    Action::None
}
