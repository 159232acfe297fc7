//! Collaborators the controller drives. Anything that draws, reads
//! widgets or talks to a device sits behind one of these.

use crate::render::{ListEntry, MarkerPopup};
use crate::types::{Coords, FormValues};

/// One-shot position lookup made at startup.
pub trait GeolocationProvider {
    /// Current position, or the provider's failure message.
    fn current_position(&mut self) -> Result<Coords, String>;
}

/// Creates the map view once a position is known.
pub trait MapProvider {
    type View: MapView;

    fn create_view(&mut self, center: Coords, zoom: f64) -> Self::View;
}

pub trait MapView {
    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);

    /// Start delivering click events to the controller.
    fn listen_for_clicks(&mut self);

    fn place_marker(&mut self, at: Coords, popup: &MarkerPopup);
}

/// The workout entry form.
pub trait FormSurface {
    fn values(&self) -> FormValues;
    fn show(&mut self);
    fn hide(&mut self);
    /// Empties the numeric fields. The type selection is left alone.
    fn clear(&mut self);
    fn focus_distance(&mut self);
    /// Swap which of cadence / elevation is visible.
    fn toggle_extra_field(&mut self);
}

pub trait ListSurface {
    fn append_entry_after_form(&mut self, entry: &ListEntry);
}

/// User-visible warnings.
pub trait Notifier {
    fn warn(&mut self, message: &str);
}
