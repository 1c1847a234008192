//! Registration form controller.
//!
//! [`FormController`] owns the [`RegistrationDraft`] together with the lists that feed
//! its selection widgets. Every lookup runs as a background task whose result is sent
//! back over a channel; results are only merged when the owner drains them, so all
//! state changes happen on the caller's loop.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::backends::Backends;
use crate::model::{
    CityName, ContactField, Coordinate, Item, ItemId, RegistrationDraft, StateCode,
};
use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Lifecycle of the single allowed submission attempt at a time.
pub enum SubmissionStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A `POST /points` is outstanding.
    InFlight,
    /// The backend acknowledged the point; the draft is done.
    Completed,
    /// The last attempt failed; the draft is untouched and can be resubmitted.
    Failed(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a submit request is refused before anything is sent.
pub enum FormError {
    /// Another submission has not finished yet.
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    /// The draft was already registered.
    #[error("This collection point was already registered")]
    AlreadySubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What changed after a background result was merged.
pub enum FormUpdate {
    /// Item catalog arrived (or failed and stays empty).
    Items,
    /// State list arrived (or failed and stays empty).
    States,
    /// City list for the current state arrived.
    Cities,
    /// Map center resolved (or kept its default).
    Center,
    /// Submission finished; see [`FormController::submission`].
    Submission,
    /// Result belonged to an outdated state selection and was dropped.
    Discarded,
}

enum FormEvent {
    ItemsLoaded(Result<Vec<Item>, PortError>),
    StatesLoaded(Result<Vec<StateCode>, PortError>),
    CitiesLoaded {
        token: u64,
        state: StateCode,
        result: Result<Vec<CityName>, PortError>,
    },
    PositionResolved(Result<Coordinate, PortError>),
    Submitted(Result<(), PortError>),
}

/// State container for the registration screen.
pub struct FormController {
    backends: Backends,
    events_tx: UnboundedSender<FormEvent>,
    events_rx: UnboundedReceiver<FormEvent>,
    pending: usize,
    initialized: bool,
    city_token: u64,

    catalog: Vec<Item>,
    states: Vec<StateCode>,
    cities: Vec<CityName>,
    map_center: Coordinate,

    draft: RegistrationDraft,
    submission: SubmissionStatus,
}

impl FormController {
    /// Create a controller with an empty draft and the given default map center.
    #[must_use]
    pub fn new(backends: Backends, default_center: Coordinate) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backends,
            events_tx,
            events_rx,
            pending: 0,
            initialized: false,
            city_token: 0,
            catalog: Vec::new(),
            states: Vec::new(),
            cities: Vec::new(),
            map_center: default_center,
            draft: RegistrationDraft::default(),
            submission: SubmissionStatus::Idle,
        }
    }

    /// Start the item, state and position lookups. Must be called from within a tokio
    /// runtime; calling it again is a no-op.
    pub fn initialize(&mut self) {
        if self.initialized {
            debug!("form already initialized");
            return;
        }
        self.initialized = true;

        let catalog = Arc::clone(&self.backends.catalog);
        self.spawn(
            async move { FormEvent::ItemsLoaded(catalog.list_items().await) },
            |err| FormEvent::ItemsLoaded(Err(err)),
        );

        let geography = Arc::clone(&self.backends.geography);
        self.spawn(
            async move { FormEvent::StatesLoaded(geography.list_states().await) },
            |err| FormEvent::StatesLoaded(Err(err)),
        );

        let geolocation = Arc::clone(&self.backends.geolocation);
        self.spawn(
            async move { FormEvent::PositionResolved(geolocation.current_position().await) },
            |err| FormEvent::PositionResolved(Err(err)),
        );
    }

    /// Choose a state. The city is reset and the city list is reloaded for the new
    /// state; `None` just clears both.
    pub fn select_state(&mut self, state: Option<StateCode>) {
        self.city_token = self.city_token.wrapping_add(1);
        let token = self.city_token;

        self.draft.state.clone_from(&state);
        self.draft.city = None;
        self.cities.clear();

        let Some(state) = state else {
            debug!("state selection cleared");
            return;
        };

        debug!(%state, token, "loading cities");
        let geography = Arc::clone(&self.backends.geography);
        let requested = state.clone();
        self.spawn(
            async move {
                let result = geography.list_cities(&requested).await;
                FormEvent::CitiesLoaded {
                    token,
                    state: requested,
                    result,
                }
            },
            move |err| FormEvent::CitiesLoaded {
                token,
                state,
                result: Err(err),
            },
        );
    }

    /// Choose a city.
    pub fn select_city(&mut self, city: Option<CityName>) {
        self.draft.city = city;
    }

    /// Set the collection point's position.
    pub fn click_map(&mut self, position: Coordinate) {
        self.draft.position = position;
    }

    /// Select the item if it is not selected yet, deselect it otherwise.
    pub fn toggle_item(&mut self, id: ItemId) {
        if let Some(index) = self.draft.items.iter().position(|selected| *selected == id) {
            self.draft.items.remove(index);
        } else {
            self.draft.items.push(id);
        }
    }

    /// Overwrite one contact field.
    pub fn edit_contact(&mut self, field: ContactField, value: impl Into<String>) {
        self.draft.contact.set(field, value.into());
    }

    /// Send the current draft to the backend.
    ///
    /// The payload is taken from the draft right away; edits made while the request is
    /// outstanding do not affect it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SubmissionInFlight`] while a previous submission is pending
    /// and [`FormError::AlreadySubmitted`] once the point was registered.
    pub fn submit(&mut self) -> Result<(), FormError> {
        match self.submission {
            SubmissionStatus::InFlight => return Err(FormError::SubmissionInFlight),
            SubmissionStatus::Completed => return Err(FormError::AlreadySubmitted),
            SubmissionStatus::Idle | SubmissionStatus::Failed(_) => {}
        }

        let point = self.draft.to_new_point();
        info!(
            uf = %point.uf,
            city = %point.city,
            items = point.items.len(),
            "submitting collection point"
        );

        self.submission = SubmissionStatus::InFlight;
        let catalog = Arc::clone(&self.backends.catalog);
        self.spawn(
            async move { FormEvent::Submitted(catalog.create_point(&point).await) },
            |err| FormEvent::Submitted(Err(err)),
        );
        Ok(())
    }

    /// Merge every result that is already available without waiting.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next background result and merge it. Returns `None` when nothing
    /// is outstanding.
    pub async fn next_event(&mut self) -> Option<FormUpdate> {
        if self.pending == 0 {
            return None;
        }
        let event = self.events_rx.recv().await?;
        Some(self.apply(event))
    }

    /// Wait until every outstanding lookup and submission has been merged.
    pub async fn settle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    /// Whether any background request is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Selectable item categories.
    #[must_use]
    pub fn catalog(&self) -> &[Item] {
        &self.catalog
    }

    /// Selectable state codes.
    #[must_use]
    pub fn states(&self) -> &[StateCode] {
        &self.states
    }

    /// Cities of the currently selected state.
    #[must_use]
    pub fn cities(&self) -> &[CityName] {
        &self.cities
    }

    /// Where the map is centered.
    #[must_use]
    pub fn map_center(&self) -> Coordinate {
        self.map_center
    }

    /// Current draft.
    #[must_use]
    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Status of the last submission.
    #[must_use]
    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// Run `request` in the background. Every spawned request reports exactly once:
    /// if its task panics or is cancelled, `aborted` builds the failed event instead.
    fn spawn<F, A>(&mut self, request: F, aborted: A)
    where
        F: Future<Output = FormEvent> + Send + 'static,
        A: FnOnce(PortError) -> FormEvent + Send + 'static,
    {
        let sender = self.events_tx.clone();
        self.pending += 1;
        let task = tokio::spawn(request);
        tokio::spawn(async move {
            let event = match task.await {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "background request aborted");
                    aborted(PortError::Aborted(err.to_string()))
                }
            };
            if sender.send(event).is_err() {
                debug!("form closed before request finished");
            }
        });
    }

    fn apply(&mut self, event: FormEvent) -> FormUpdate {
        self.pending = self.pending.saturating_sub(1);

        match event {
            FormEvent::ItemsLoaded(Ok(items)) => {
                debug!(count = items.len(), "item catalog loaded");
                self.catalog = items;
                FormUpdate::Items
            }
            FormEvent::ItemsLoaded(Err(err)) => {
                warn!(error = %err, "could not load item catalog");
                FormUpdate::Items
            }
            FormEvent::StatesLoaded(Ok(states)) => {
                debug!(count = states.len(), "states loaded");
                self.states = states;
                FormUpdate::States
            }
            FormEvent::StatesLoaded(Err(err)) => {
                warn!(error = %err, "could not load states");
                FormUpdate::States
            }
            FormEvent::CitiesLoaded { token, state, .. } if token != self.city_token => {
                debug!(%state, token, current = self.city_token, "dropping stale city list");
                FormUpdate::Discarded
            }
            FormEvent::CitiesLoaded {
                state,
                result: Ok(cities),
                ..
            } => {
                debug!(%state, count = cities.len(), "cities loaded");
                self.cities = cities;
                FormUpdate::Cities
            }
            FormEvent::CitiesLoaded {
                state,
                result: Err(err),
                ..
            } => {
                warn!(%state, error = %err, "could not load cities");
                self.cities.clear();
                FormUpdate::Cities
            }
            FormEvent::PositionResolved(Ok(center)) => {
                debug!(%center, "map centered on current position");
                self.map_center = center;
                FormUpdate::Center
            }
            FormEvent::PositionResolved(Err(err)) => {
                warn!(error = %err, "keeping default map center");
                FormUpdate::Center
            }
            FormEvent::Submitted(Ok(())) => {
                info!("collection point registered");
                self.submission = SubmissionStatus::Completed;
                FormUpdate::Submission
            }
            FormEvent::Submitted(Err(err)) => {
                warn!(error = %err, "collection point registration failed");
                self.submission = SubmissionStatus::Failed(err.to_string());
                FormUpdate::Submission
            }
        }
    }
}
