//! Terminal host: in-memory surfaces plus a JSON-lines event script that
//! stands in for the browser's event loop.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::app::{App, AppConfig, AppEvent};
use crate::dlog;
use crate::error::MaptyError;
use crate::render::{ListEntry, MarkerPopup};
use crate::surfaces::{
    FormSurface, GeolocationProvider, ListSurface, MapProvider, MapView, Notifier,
};
use crate::types::{Coords, FormValues, WorkoutKind};

/// Which extra metric row the form currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraField {
    Cadence,
    Elevation,
}

impl ExtraField {
    pub const fn for_kind(kind: WorkoutKind) -> Self {
        match kind {
            WorkoutKind::Running => Self::Cadence,
            WorkoutKind::Cycling => Self::Elevation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryForm {
    values: FormValues,
    visible: bool,
    distance_focused: bool,
    extra: ExtraField,
}

impl Default for MemoryForm {
    fn default() -> Self {
        Self {
            values: FormValues::default(),
            visible: false,
            distance_focused: false,
            extra: ExtraField::Cadence,
        }
    }
}

impl MemoryForm {
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_distance_focused(&self) -> bool {
        self.distance_focused
    }

    pub const fn extra_field(&self) -> ExtraField {
        self.extra
    }

    pub fn fields_mut(&mut self) -> &mut FormValues {
        &mut self.values
    }
}

impl FormSurface for MemoryForm {
    fn values(&self) -> FormValues {
        self.values.clone()
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.distance_focused = false;
    }

    fn clear(&mut self) {
        self.values.distance.clear();
        self.values.duration.clear();
        self.values.cadence.clear();
        self.values.elevation.clear();
    }

    fn focus_distance(&mut self) {
        self.distance_focused = true;
    }

    fn toggle_extra_field(&mut self) {
        self.extra = match self.extra {
            ExtraField::Cadence => ExtraField::Elevation,
            ExtraField::Elevation => ExtraField::Cadence,
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub at: Coords,
    pub popup: MarkerPopup,
}

#[derive(Debug, Clone)]
pub struct MemoryMap {
    center: Coords,
    zoom: f64,
    tiles: Option<(String, String)>,
    listening: bool,
    markers: Vec<PlacedMarker>,
}

impl MemoryMap {
    pub const fn center(&self) -> Coords {
        self.center
    }

    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Tile URL template and attribution, once added.
    pub fn tiles(&self) -> Option<(&str, &str)> {
        self.tiles.as_ref().map(|(u, a)| (u.as_str(), a.as_str()))
    }

    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }
}

impl MapView for MemoryMap {
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str) {
        self.tiles = Some((url_template.to_string(), attribution.to_string()));
    }

    fn listen_for_clicks(&mut self) {
        self.listening = true;
    }

    fn place_marker(&mut self, at: Coords, popup: &MarkerPopup) {
        dlog!("marker at {at}: {}", popup.content);
        self.markers.push(PlacedMarker {
            at,
            popup: popup.clone(),
        });
    }
}

#[derive(Debug, Default)]
pub struct MemoryMaps;

impl MapProvider for MemoryMaps {
    type View = MemoryMap;

    fn create_view(&mut self, center: Coords, zoom: f64) -> MemoryMap {
        MemoryMap {
            center,
            zoom,
            tiles: None,
            listening: false,
            markers: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryList {
    entries: Vec<ListEntry>,
}

impl MemoryList {
    /// Entries in the order they were rendered.
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }
}

impl ListSurface for MemoryList {
    fn append_entry_after_form(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }
}

/// Collects warnings and echoes them to stderr.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    warnings: Vec<String>,
    echo: bool,
}

impl MemoryNotifier {
    pub const fn echoing() -> Self {
        Self {
            warnings: Vec::new(),
            echo: true,
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Notifier for MemoryNotifier {
    fn warn(&mut self, message: &str) {
        if self.echo {
            eprintln!("⚠ {message}");
        }
        self.warnings.push(message.to_string());
    }
}

/// A geolocation provider with a predetermined answer.
#[derive(Debug, Clone)]
pub struct FixedPosition(Result<Coords, String>);

impl FixedPosition {
    pub const fn at(pos: Coords) -> Self {
        Self(Ok(pos))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self(Err(message.into()))
    }
}

impl GeolocationProvider for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, String> {
        self.0.clone()
    }
}

/// A field value in a `fill` event; numbers and strings are both accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Text(String),
    Number(serde_json::Number),
}

impl RawField {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// One line of a session script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Click(Coords),
    Select {
        kind: String,
    },
    Fill {
        distance: Option<RawField>,
        duration: Option<RawField>,
        cadence: Option<RawField>,
        elevation: Option<RawField>,
    },
    Submit,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStats {
    pub events: usize,
    pub logged: usize,
    pub rejected: usize,
}

pub type HostApp = App<MemoryForm, MemoryList, MemoryNotifier, MemoryMap>;

pub struct Session {
    app: HostApp,
}

impl Session {
    /// Builds the controller and runs its startup position request.
    ///
    /// A geolocation failure is not fatal; the session continues without a
    /// map and clicks are dropped.
    pub fn start<G: GeolocationProvider>(config: AppConfig, notifier: MemoryNotifier, geo: &mut G) -> Self {
        let app = App::new(config, MemoryForm::default(), MemoryList::default(), notifier);
        Self::start_app(app, geo)
    }

    pub fn start_app<G: GeolocationProvider>(mut app: HostApp, geo: &mut G) -> Self {
        if let Err(e) = app.start(geo, &mut MemoryMaps) {
            tracing::warn!(error = %e, "map-driven entry unavailable this session");
        }
        Self { app }
    }

    pub const fn app(&self) -> &HostApp {
        &self.app
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        self.app
            .state()
            .map()
            .map(MemoryMap::markers)
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[ListEntry] {
        self.app.list().entries()
    }

    pub fn apply(&mut self, event: ScriptEvent) -> Result<(), MaptyError> {
        match event {
            ScriptEvent::Click(at) => {
                let listening = self.app.state().map().is_some_and(MemoryMap::is_listening);
                if !listening {
                    tracing::warn!(%at, "click dropped: map not loaded");
                    return Err(MaptyError::MapNotLoaded);
                }
                self.app.dispatch(AppEvent::MapClicked(at))
            }
            ScriptEvent::Select { kind } => {
                let selected = kind.parse::<WorkoutKind>().ok();
                self.app.form_mut().fields_mut().kind = kind;
                if let Some(selected) = selected
                    && self.app.form().extra_field() != ExtraField::for_kind(selected)
                {
                    return self.app.dispatch(AppEvent::TypeChanged);
                }
                Ok(())
            }
            ScriptEvent::Fill {
                distance,
                duration,
                cadence,
                elevation,
            } => {
                let fields = self.app.form_mut().fields_mut();
                for (slot, value) in [
                    (&mut fields.distance, distance),
                    (&mut fields.duration, duration),
                    (&mut fields.cadence, cadence),
                    (&mut fields.elevation, elevation),
                ] {
                    if let Some(v) = value {
                        *slot = v.into_text();
                    }
                }
                Ok(())
            }
            ScriptEvent::Submit => {
                let values = self.app.form().values();
                self.app.dispatch(AppEvent::Submit(values))
            }
        }
    }

    /// Feeds every event of a JSON-lines script through the session.
    ///
    /// Blank lines and `#` comments are skipped. A line that does not parse
    /// aborts the run; a rejected event is counted and the run continues.
    pub fn run_script<R: BufRead>(&mut self, reader: R) -> Result<ScriptStats> {
        let mut stats = ScriptStats::default();

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.with_context(|| format!("reading script line {line_no}"))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event: ScriptEvent = serde_json::from_str(trimmed)
                .with_context(|| format!("parsing script line {line_no}: {trimmed}"))?;
            stats.events += 1;

            let is_submit = matches!(event, ScriptEvent::Submit);
            match self.apply(event) {
                Ok(()) if is_submit => stats.logged += 1,
                Ok(()) => {}
                Err(e) => {
                    dlog!("line {line_no} rejected: {e}");
                    stats.rejected += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Opens the script file, or stdin when no path is given.
pub fn open_script(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(p) => {
            let f = File::open(p).with_context(|| format!("opening script: {}", p.display()))?;
            tracing::info!(path = %p.display(), "reading event script");
            Ok(Box::new(BufReader::new(f)))
        }
        None => {
            tracing::info!("reading event script from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(lat: f64, lng: f64) -> Session {
        Session::start(
            AppConfig::default(),
            MemoryNotifier::default(),
            &mut FixedPosition::at(Coords::new(lat, lng)),
        )
    }

    #[test]
    fn parses_each_event_kind() {
        let click: ScriptEvent = serde_json::from_str(r#"{"event":"click","lat":1.5,"lng":-2}"#).unwrap();
        assert!(matches!(click, ScriptEvent::Click(at) if at == Coords::new(1.5, -2.0)));

        let fill: ScriptEvent =
            serde_json::from_str(r#"{"event":"fill","distance":5,"duration":"25"}"#).unwrap();
        let ScriptEvent::Fill { distance, duration, cadence, .. } = fill else {
            panic!("expected fill");
        };
        assert_eq!(distance.unwrap().into_text(), "5");
        assert_eq!(duration.unwrap().into_text(), "25");
        assert!(cadence.is_none());

        let submit: ScriptEvent = serde_json::from_str(r#"{"event":"submit"}"#).unwrap();
        assert!(matches!(submit, ScriptEvent::Submit));
    }

    #[test]
    fn map_is_centered_on_position_with_tiles() {
        let s = session_at(48.1, -1.7);
        let map = s.app().state().map().unwrap();
        assert_eq!(map.center(), Coords::new(48.1, -1.7));
        assert!((map.zoom() - 13.0).abs() < f64::EPSILON);
        assert!(map.is_listening());
        let (url, attribution) = map.tiles().unwrap();
        assert!(url.contains("tile.openstreetmap.org"));
        assert!(attribution.contains("OpenStreetMap"));
    }

    #[test]
    fn select_toggles_extra_field_only_on_change() {
        let mut s = session_at(0.0, 0.0);
        s.apply(ScriptEvent::Select { kind: "running".into() }).unwrap();
        assert_eq!(s.app().form().extra_field(), ExtraField::Cadence);
        s.apply(ScriptEvent::Select { kind: "cycling".into() }).unwrap();
        assert_eq!(s.app().form().extra_field(), ExtraField::Elevation);
    }

    #[test]
    fn select_of_an_unknown_kind_keeps_the_extra_field() {
        let mut s = session_at(0.0, 0.0);
        for kind in ["swimming", "Cycling", ""] {
            s.apply(ScriptEvent::Select { kind: kind.into() }).unwrap();
            assert_eq!(s.app().form().extra_field(), ExtraField::Cadence);
            assert_eq!(s.app().form().values().kind, kind);
        }
        s.apply(ScriptEvent::Select { kind: "cycling".into() }).unwrap();
        assert_eq!(s.app().form().extra_field(), ExtraField::Elevation);
        s.apply(ScriptEvent::Select { kind: "swimming".into() }).unwrap();
        s.apply(ScriptEvent::Select { kind: "running".into() }).unwrap();
        assert_eq!(s.app().form().extra_field(), ExtraField::Cadence);
    }

    #[test]
    fn click_without_coordinates_does_not_parse() {
        assert!(serde_json::from_str::<ScriptEvent>(r#"{"event":"click","lat":1.0}"#).is_err());
    }

    #[test]
    fn clicks_are_dropped_without_a_map() {
        let mut s = Session::start(
            AppConfig::default(),
            MemoryNotifier::default(),
            &mut FixedPosition::failing("User denied Geolocation"),
        );
        assert_eq!(
            s.apply(ScriptEvent::Click(Coords::new(1.0, 1.0))),
            Err(MaptyError::MapNotLoaded)
        );
        assert_eq!(s.app().notifier().warnings(), ["User denied Geolocation"]);
        assert!(!s.app().form().is_visible());
    }

    #[test]
    fn script_counts_logged_and_rejected() {
        let script = r#"
# two workouts, one bad submit
{"event":"click","lat":40.0,"lng":-75.0}
{"event":"fill","distance":5,"duration":25,"cadence":180}
{"event":"submit"}
{"event":"click","lat":40.1,"lng":-75.1}
{"event":"select","kind":"cycling"}
{"event":"fill","distance":10,"duration":0,"elevation":-20}
{"event":"submit"}
{"event":"fill","duration":30}
{"event":"submit"}
"#;
        let mut s = session_at(40.0, -75.0);
        let stats = s.run_script(script.as_bytes()).unwrap();
        assert_eq!(
            stats,
            ScriptStats {
                events: 9,
                logged: 2,
                rejected: 1
            }
        );
        assert_eq!(s.markers().len(), 2);
        assert_eq!(s.entries().len(), 2);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let mut s = session_at(0.0, 0.0);
        let err = s
            .run_script("{\"event\":\"submit\"}\n{\"event\":\"jump\"}\n".as_bytes())
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
