use chrono::{DateTime, Local};

use crate::collection::WorkoutCollection;
use crate::dlog;
use crate::error::MaptyError;
use crate::render::{render_on_list, render_on_map};
use crate::surfaces::{FormSurface, GeolocationProvider, ListSurface, MapProvider, MapView, Notifier};
use crate::types::{Coords, FormValues};
use crate::validation::validate;
use crate::workout::{SpeedFormula, Workout, WorkoutFactory};

pub const DEFAULT_ZOOM: f64 = 13.0;
pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub zoom: f64,
    pub tile_url: String,
    pub tile_attribution: String,
    pub speed_formula: SpeedFormula,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            tile_url: OSM_TILE_URL.to_string(),
            tile_attribution: OSM_ATTRIBUTION.to_string(),
            speed_formula: SpeedFormula::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No map click waiting for a submission.
    Idle,
    /// A location was clicked and the entry form is showing.
    FormOpen,
}

/// Events the controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    MapClicked(Coords),
    TypeChanged,
    Submit(FormValues),
}

/// Mutable session state owned by the controller.
#[derive(Debug)]
pub struct AppState<M> {
    map: Option<M>,
    startup_failure: Option<MaptyError>,
    pending: Option<Coords>,
    phase: Phase,
    workouts: WorkoutCollection,
}

impl<M> Default for AppState<M> {
    fn default() -> Self {
        Self {
            map: None,
            startup_failure: None,
            pending: None,
            phase: Phase::Idle,
            workouts: WorkoutCollection::new(),
        }
    }
}

impl<M> AppState<M> {
    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    /// Why startup failed, if it did.
    pub const fn startup_failure(&self) -> Option<&MaptyError> {
        self.startup_failure.as_ref()
    }

    pub const fn pending_location(&self) -> Option<Coords> {
        self.pending
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn workouts(&self) -> &WorkoutCollection {
        &self.workouts
    }
}

/// Coordinates the click -> form -> validate -> store -> render flow.
pub struct App<F, L, N, M> {
    config: AppConfig,
    form: F,
    list: L,
    notifier: N,
    state: AppState<M>,
    factory: WorkoutFactory,
    clock: fn() -> DateTime<Local>,
}

impl<F, L, N, M> App<F, L, N, M>
where
    F: FormSurface,
    L: ListSurface,
    N: Notifier,
    M: MapView,
{
    pub fn new(config: AppConfig, form: F, list: L, notifier: N) -> Self {
        let factory = WorkoutFactory::new(config.speed_formula);
        Self {
            config,
            form,
            list,
            notifier,
            state: AppState::default(),
            factory,
            clock: Local::now,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Asks for the current position once and loads the map around it.
    ///
    /// A failure is surfaced to the user and leaves the map unloaded for
    /// the rest of the session.
    pub fn start<G, P>(&mut self, geo: &mut G, maps: &mut P) -> Result<(), MaptyError>
    where
        G: GeolocationProvider,
        P: MapProvider<View = M>,
    {
        if self.state.map.is_some() {
            dlog!("start skipped: map already loaded");
            return Ok(());
        }
        if let Some(err) = &self.state.startup_failure {
            dlog!("start skipped: {err}");
            return Err(err.clone());
        }

        let outcome = match geo.current_position() {
            Ok(pos) => self.load_map(pos, maps),
            Err(msg) => {
                tracing::warn!(reason = %msg, "geolocation unavailable");
                self.notifier.warn(&msg);
                Err(MaptyError::GeolocationUnavailable(msg))
            }
        };
        if let Err(err) = &outcome {
            self.state.startup_failure = Some(err.clone());
        }
        outcome
    }

    fn load_map<P>(&mut self, pos: Coords, maps: &mut P) -> Result<(), MaptyError>
    where
        P: MapProvider<View = M>,
    {
        if !pos.is_valid() {
            let err = MaptyError::MalformedPosition {
                lat: pos.lat,
                lng: pos.lng,
            };
            tracing::warn!(%pos, "position unusable");
            self.notifier.warn(&err.user_message());
            return Err(err);
        }

        let mut view = maps.create_view(pos, self.config.zoom);
        view.add_tile_layer(&self.config.tile_url, &self.config.tile_attribution);
        view.listen_for_clicks();
        self.state.map = Some(view);
        tracing::info!(center = %pos, zoom = self.config.zoom, "map loaded");
        Ok(())
    }

    pub fn dispatch(&mut self, event: AppEvent) -> Result<(), MaptyError> {
        match event {
            AppEvent::MapClicked(at) => self.on_map_click(at),
            AppEvent::TypeChanged => {
                self.on_type_changed();
                Ok(())
            }
            AppEvent::Submit(values) => self.on_submit(&values).map(|_| ()),
        }
    }

    /// Remembers the clicked location and opens the form.
    pub fn on_map_click(&mut self, at: Coords) -> Result<(), MaptyError> {
        if self.state.map.is_none() {
            return Err(MaptyError::MapNotLoaded);
        }
        dlog!("map click at {at}");
        self.state.pending = Some(at);
        self.state.phase = Phase::FormOpen;
        self.form.show();
        self.form.focus_distance();
        Ok(())
    }

    pub fn on_type_changed(&mut self) {
        self.form.toggle_extra_field();
    }

    /// Validates the form and, on success, stores and renders a new workout.
    ///
    /// On invalid input the user is warned and the form stays open with its
    /// values untouched.
    pub fn on_submit(&mut self, values: &FormValues) -> Result<&Workout, MaptyError> {
        let Some(map) = self.state.map.as_mut() else {
            return Err(MaptyError::MapNotLoaded);
        };
        let Some(at) = self.state.pending else {
            tracing::warn!("submit without a selected location ignored");
            return Err(MaptyError::NoPendingLocation);
        };

        let input = match validate(values) {
            Ok(input) => input,
            Err(err) => {
                tracing::warn!(kind = %values.kind, error = %err, "workout rejected");
                self.notifier.warn(&err.user_message());
                return Err(err);
            }
        };

        let workout = self.factory.build(input, at, (self.clock)());
        let total = self.state.workouts.len() + 1;
        let workout = self.state.workouts.push(workout)?;

        render_on_map(map, workout);
        render_on_list(&mut self.list, workout);

        self.form.hide();
        self.form.clear();
        self.state.pending = None;
        self.state.phase = Phase::Idle;

        tracing::info!(
            id = %workout.id(),
            kind = %workout.kind(),
            at = %workout.coords(),
            total,
            "workout logged"
        );
        Ok(workout)
    }

    pub const fn state(&self) -> &AppState<M> {
        &self.state
    }

    pub const fn workouts(&self) -> &WorkoutCollection {
        &self.state.workouts
    }

    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    pub const fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}
