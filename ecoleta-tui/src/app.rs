use ecoleta_core::{
    backends::Backends,
    form::{FormController, SubmissionStatus},
    model::{ContactField, Coordinate},
};
use ratatui::layout::Rect;
use tracing::info;

use crate::map::{self, MapView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Landing,
    CreatePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Name,
    Email,
    Whatsapp,
    Map,
    State,
    City,
    Items,
    Submit,
}

impl Focus {
    const ORDER: [Focus; 8] = [
        Focus::Name,
        Focus::Email,
        Focus::Whatsapp,
        Focus::Map,
        Focus::State,
        Focus::City,
        Focus::Items,
        Focus::Submit,
    ];

    pub(crate) fn next(self) -> Self {
        let index = self.index();
        Self::ORDER.get(index + 1).copied().unwrap_or(Focus::Name)
    }

    pub(crate) fn prev(self) -> Self {
        match self.index().checked_sub(1) {
            Some(index) => Self::ORDER.get(index).copied().unwrap_or(Focus::Submit),
            None => Focus::Submit,
        }
    }

    pub(crate) fn contact_field(self) -> Option<ContactField> {
        match self {
            Focus::Name => Some(ContactField::Name),
            Focus::Email => Some(ContactField::Email),
            Focus::Whatsapp => Some(ContactField::Whatsapp),
            Focus::Map | Focus::State | Focus::City | Focus::Items | Focus::Submit => None,
        }
    }

    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0)
    }
}

/// Blocking message that must be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Created,
    Failed(String),
}

pub(crate) struct App {
    pub backends: Backends,
    pub default_center: Coordinate,

    pub screen: Screen,
    pub form: Option<FormController>,

    pub focus: Focus,
    pub map_cursor: Option<Coordinate>,
    pub map_span: f64,
    pub item_index: usize,

    pub notice: Option<Notice>,
    pub status_message: Option<String>,
    pub awaiting_submission: bool,
    pub viewport: Rect,
}

impl App {
    pub(crate) fn new(backends: Backends, default_center: Coordinate) -> Self {
        Self {
            backends,
            default_center,
            screen: Screen::Landing,
            form: None,
            focus: Focus::Name,
            map_cursor: None,
            map_span: map::DEFAULT_SPAN,
            item_index: 0,
            notice: None,
            status_message: None,
            awaiting_submission: false,
            viewport: Rect::default(),
        }
    }

    /// Mount the registration screen with a fresh draft.
    pub(crate) fn open_form(&mut self) {
        info!("opening registration form");
        let mut form = FormController::new(self.backends.clone(), self.default_center);
        form.initialize();

        self.form = Some(form);
        self.screen = Screen::CreatePoint;
        self.focus = Focus::Name;
        self.map_cursor = None;
        self.map_span = map::DEFAULT_SPAN;
        self.item_index = 0;
        self.status_message = None;
        self.awaiting_submission = false;
    }

    /// Leave the registration screen; the draft and any late results are dropped.
    pub(crate) fn close_form(&mut self) {
        self.form = None;
        self.screen = Screen::Landing;
        self.status_message = None;
        self.awaiting_submission = false;
    }

    /// Merge finished background requests and react to a finished submission.
    pub(crate) fn sync(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        form.drain();
        if !self.awaiting_submission {
            return;
        }

        let status = form.submission().clone();
        match status {
            SubmissionStatus::Completed => {
                self.close_form();
                self.notice = Some(Notice::Created);
            }
            SubmissionStatus::Failed(message) => {
                self.awaiting_submission = false;
                self.notice = Some(Notice::Failed(message));
            }
            SubmissionStatus::Idle | SubmissionStatus::InFlight => {}
        }
    }

    pub(crate) fn submit(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit() {
            Ok(()) => {
                self.awaiting_submission = true;
                self.status_message = None;
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.form
            .as_ref()
            .is_some_and(|form| *form.submission() == SubmissionStatus::InFlight)
    }

    pub(crate) fn type_char(&mut self, character: char) {
        self.edit_focused_field(|value| value.push(character));
    }

    pub(crate) fn backspace(&mut self) {
        self.edit_focused_field(|value| {
            value.pop();
        });
    }

    fn edit_focused_field(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(field) = self.focus.contact_field() else {
            return;
        };
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let mut value = form.draft().contact.get(field).to_owned();
        edit(&mut value);
        form.edit_contact(field, value);
    }

    /// Move the state selector; position 0 is "no state".
    pub(crate) fn cycle_state(&mut self, forward: bool) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let current = form
            .draft()
            .state
            .as_ref()
            .and_then(|state| form.states().iter().position(|known| known == state))
            .map_or(0, |index| index + 1);
        let next = cycle(current, form.states().len() + 1, forward);
        let state = next
            .checked_sub(1)
            .and_then(|index| form.states().get(index).cloned());
        form.select_state(state);
    }

    /// Move the city selector; position 0 is "no city".
    pub(crate) fn cycle_city(&mut self, forward: bool) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let current = form
            .draft()
            .city
            .as_ref()
            .and_then(|city| form.cities().iter().position(|known| known == city))
            .map_or(0, |index| index + 1);
        let next = cycle(current, form.cities().len() + 1, forward);
        let city = next
            .checked_sub(1)
            .and_then(|index| form.cities().get(index).cloned());
        form.select_city(city);
    }

    pub(crate) fn map_view(&self) -> Option<MapView> {
        let form = self.form.as_ref()?;
        Some(MapView::new(form.map_center(), self.map_span))
    }

    /// Keyboard cursor on the map; follows the center until moved.
    pub(crate) fn cursor_position(&self) -> Option<Coordinate> {
        let view = self.map_view()?;
        Some(self.map_cursor.unwrap_or(view.center))
    }

    pub(crate) fn move_map_cursor(&mut self, north: i8, east: i8) {
        let (Some(view), Some(cursor)) = (self.map_view(), self.cursor_position()) else {
            return;
        };
        let step = view.step();
        self.map_cursor = Some(Coordinate::new(
            (cursor.latitude + f64::from(north) * step).clamp(-90.0, 90.0),
            (cursor.longitude + f64::from(east) * step).clamp(-180.0, 180.0),
        ));
    }

    pub(crate) fn pick_cursor(&mut self) {
        if let Some(cursor) = self.cursor_position() {
            self.click_map(cursor);
        }
    }

    pub(crate) fn click_map(&mut self, position: Coordinate) {
        if let Some(form) = self.form.as_mut() {
            form.click_map(position);
            self.map_cursor = Some(position);
        }
    }

    pub(crate) fn zoom_in(&mut self) {
        self.map_span = map::zoom_in(self.map_span);
    }

    pub(crate) fn zoom_out(&mut self) {
        self.map_span = map::zoom_out(self.map_span);
    }

    pub(crate) fn move_item_cursor(&mut self, forward: bool) {
        let count = self.form.as_ref().map_or(0, |form| form.catalog().len());
        if count == 0 {
            self.item_index = 0;
            return;
        }
        self.item_index = if forward {
            (self.item_index + 1).min(count - 1)
        } else {
            self.item_index.saturating_sub(1)
        };
    }

    /// Highlight and toggle the item at `index`, if the catalog has one there.
    pub(crate) fn click_item(&mut self, index: usize) {
        let count = self.form.as_ref().map_or(0, |form| form.catalog().len());
        if index < count {
            self.item_index = index;
            self.toggle_current_item();
        }
    }

    pub(crate) fn toggle_current_item(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if let Some(id) = form.catalog().get(self.item_index).map(|item| item.id) {
            form.toggle_item(id);
        }
    }
}

fn cycle(current: usize, len: usize, forward: bool) -> usize {
    if forward {
        if current + 1 >= len { 0 } else { current + 1 }
    } else if current == 0 {
        len.saturating_sub(1)
    } else {
        current - 1
    }
}

#[cfg(test)]
mod tests {
    use ecoleta_core::model::{CityName, ItemId, StateCode};

    use super::*;
    use crate::fakes;

    async fn settle(app: &mut App) {
        if let Some(form) = app.form.as_mut() {
            form.settle().await;
        }
    }

    async fn opened(backends: Backends) -> App {
        let mut app = App::new(backends, Coordinate::UNSET);
        app.open_form();
        settle(&mut app).await;
        app
    }

    #[test]
    fn focus_wraps_around() {
        assert_eq!(Focus::Submit.next(), Focus::Name);
        assert_eq!(Focus::Name.prev(), Focus::Submit);
        assert_eq!(Focus::Whatsapp.next(), Focus::Map);
    }

    #[test]
    fn cycling_wraps_through_the_unset_slot() {
        assert_eq!(cycle(0, 3, true), 1);
        assert_eq!(cycle(2, 3, true), 0);
        assert_eq!(cycle(0, 3, false), 2);
        assert_eq!(cycle(0, 1, true), 0);
    }

    #[tokio::test]
    async fn opening_the_form_loads_everything() {
        let app = opened(fakes::backends()).await;

        assert_eq!(app.screen, Screen::CreatePoint);
        let form = app.form.as_ref().expect("form is open");
        assert_eq!(form.states().len(), 2);
        assert_eq!(form.catalog().len(), 3);
        assert_eq!(form.map_center(), fakes::CENTER);
    }

    #[tokio::test]
    async fn state_selector_loads_cities_and_can_be_cleared() {
        let mut app = opened(fakes::backends()).await;

        app.cycle_state(true);
        settle(&mut app).await;
        app.cycle_city(true);
        app.cycle_city(true);

        let form = app.form.as_ref().expect("form is open");
        assert_eq!(form.draft().state, Some(StateCode::from("RJ")));
        assert_eq!(form.draft().city, Some(CityName::from("Petrópolis")));

        app.cycle_state(false);
        let form = app.form.as_ref().expect("form is open");
        assert_eq!(form.draft().state, None);
        assert_eq!(form.draft().city, None);
        assert!(form.cities().is_empty());
    }

    #[tokio::test]
    async fn map_cursor_starts_at_center_and_picks_points() {
        let mut app = opened(fakes::backends()).await;

        assert_eq!(app.cursor_position(), Some(fakes::CENTER));
        app.move_map_cursor(1, -1);
        app.pick_cursor();

        let step = map::DEFAULT_SPAN / 10.0;
        let expected = Coordinate::new(
            fakes::CENTER.latitude + step,
            fakes::CENTER.longitude - step,
        );
        let form = app.form.as_ref().expect("form is open");
        assert_eq!(form.draft().position, expected);
    }

    #[tokio::test]
    async fn item_cursor_toggles_the_highlighted_item() {
        let mut app = opened(fakes::backends()).await;

        app.move_item_cursor(true);
        app.toggle_current_item();
        app.move_item_cursor(true);
        app.move_item_cursor(true);
        app.toggle_current_item();

        let form = app.form.as_ref().expect("form is open");
        assert_eq!(form.draft().items, vec![ItemId(2), ItemId(3)]);
    }

    #[tokio::test]
    async fn successful_submission_returns_home_with_a_notice() {
        let mut app = opened(fakes::backends()).await;

        app.submit();
        assert!(app.is_submitting());
        settle(&mut app).await;
        app.sync();

        assert_eq!(app.screen, Screen::Landing);
        assert!(app.form.is_none());
        assert_eq!(app.notice, Some(Notice::Created));
    }

    #[tokio::test]
    async fn failed_submission_keeps_the_form() {
        let mut app = opened(fakes::rejecting_backends()).await;
        app.focus = Focus::Name;
        app.type_char('E');
        app.type_char('x');

        app.submit();
        settle(&mut app).await;
        app.sync();

        assert_eq!(app.screen, Screen::CreatePoint);
        assert!(matches!(app.notice, Some(Notice::Failed(_))));
        let form = app.form.as_ref().expect("form is still open");
        assert_eq!(form.draft().contact.name, "Ex");
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_refused() {
        let mut app = opened(fakes::backends()).await;

        app.submit();
        app.submit();

        assert!(app.status_message.is_some());
    }
}
