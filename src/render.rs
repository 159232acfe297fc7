use std::fmt;

use crate::surfaces::{ListSurface, MapView};
use crate::types::{Coords, PopupOptions, WorkoutKind};
use crate::workout::{Workout, WorkoutDetails, WorkoutId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPopup {
    pub content: String,
    pub options: PopupOptions,
}

impl MarkerPopup {
    pub fn for_workout(workout: &Workout) -> Self {
        let kind = workout.kind();
        Self {
            content: format!("{}{}", kind.icon(), workout.description()),
            options: PopupOptions::for_kind(kind),
        }
    }
}

/// Places a marker with an open popup at the workout's location.
pub fn render_on_map<M: MapView>(map: &mut M, workout: &Workout) {
    let popup = MarkerPopup::for_workout(workout);
    map.place_marker(workout.coords(), &popup);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

/// A workout projected into a list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: WorkoutId,
    pub kind: WorkoutKind,
    pub title: String,
    pub coords: String,
    pub details: Vec<Detail>,
}

impl ListEntry {
    pub fn for_workout(workout: &Workout) -> Self {
        let kind = workout.kind();
        let mut details = vec![
            Detail {
                icon: kind.icon(),
                value: workout.distance_km().to_string(),
                unit: "km",
            },
            Detail {
                icon: "⏱",
                value: workout.duration_min().to_string(),
                unit: "min",
            },
        ];

        match workout.details() {
            WorkoutDetails::Running(r) => {
                details.push(Detail {
                    icon: "⚡️",
                    value: r.pace_min_per_km.to_string(),
                    unit: "min/km",
                });
                details.push(Detail {
                    icon: "🦶🏼",
                    value: r.cadence_spm.to_string(),
                    unit: "spm",
                });
            }
            WorkoutDetails::Cycling(c) => {
                details.push(Detail {
                    icon: "⚡️",
                    value: c.speed_km_per_h.to_string(),
                    unit: "km/h",
                });
                details.push(Detail {
                    icon: "⛰",
                    value: c.elevation_gain_m.to_string(),
                    unit: "m",
                });
            }
        }

        Self {
            id: workout.id().clone(),
            kind,
            title: workout.description().to_string(),
            coords: coords_label(workout.coords()),
            details,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<li class=\"workout workout--{}\" data-id={}>\n  <h2 class=\"workout__title\">{}</h2>\n",
            self.kind, self.id, self.title
        );
        for d in &self.details {
            html.push_str(&format!(
                "  <div class=\"workout__details\">\n    <span class=\"workout__icon\">{}</span>\n    <span class=\"workout__value\">{}</span>\n    <span class=\"workout__unit\">{}</span>\n  </div>\n",
                d.icon, d.value, d.unit
            ));
        }
        html.push_str("</li>\n");
        html
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.id, self.coords, self.title)?;
        for d in &self.details {
            write!(f, "\t{} {} {}", d.icon, d.value, d.unit)?;
        }
        Ok(())
    }
}

fn coords_label(c: Coords) -> String {
    format!("{:.4},{:.4}", c.lat, c.lng)
}

/// Appends the workout's entry below the form.
pub fn render_on_list<L: ListSurface>(list: &mut L, workout: &Workout) {
    let entry = ListEntry::for_workout(workout);
    list.append_entry_after_form(&entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::SpeedFormula;
    use chrono::{Local, TimeZone};

    fn at() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 14, 9, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct Markers(Vec<(Coords, MarkerPopup)>);

    impl MapView for Markers {
        fn add_tile_layer(&mut self, _url_template: &str, _attribution: &str) {}
        fn listen_for_clicks(&mut self) {}
        fn place_marker(&mut self, at: Coords, popup: &MarkerPopup) {
            self.0.push((at, popup.clone()));
        }
    }

    #[derive(Default)]
    struct Entries(Vec<ListEntry>);

    impl ListSurface for Entries {
        fn append_entry_after_form(&mut self, entry: &ListEntry) {
            self.0.push(entry.clone());
        }
    }

    #[test]
    fn running_popup_has_icon_and_description() {
        let w = Workout::running(WorkoutId::from_millis(9), at(), Coords::new(40.0, -75.0), 5.0, 25.0, 180.0);
        let mut map = Markers::default();
        render_on_map(&mut map, &w);

        assert_eq!(map.0.len(), 1);
        let (where_, popup) = &map.0[0];
        assert_eq!(*where_, Coords::new(40.0, -75.0));
        assert_eq!(popup.content, "🏃Running on April 14");
        assert_eq!(popup.options.class_name, "running-popup");
    }

    #[test]
    fn running_entry_lists_pace_and_cadence() {
        let w = Workout::running(WorkoutId::from_millis(9), at(), Coords::new(40.0, -75.0), 5.0, 25.0, 180.0);
        let entry = ListEntry::for_workout(&w);
        let values: Vec<(&str, &str)> = entry
            .details
            .iter()
            .map(|d| (d.value.as_str(), d.unit))
            .collect();
        assert_eq!(
            values,
            [("5", "km"), ("25", "min"), ("5", "min/km"), ("180", "spm")]
        );
    }

    #[test]
    fn cycling_entry_lists_speed_and_elevation() {
        let w = Workout::cycling(
            WorkoutId::from_millis(9),
            at(),
            Coords::new(1.0, 2.0),
            12.5,
            40.0,
            -20.0,
            SpeedFormula::Literal,
        );
        let entry = ListEntry::for_workout(&w);
        assert_eq!(entry.kind, WorkoutKind::Cycling);
        assert_eq!(entry.details[0].icon, "🚴‍♀️");
        assert_eq!(entry.details[0].value, "12.5");
        assert_eq!(entry.details[2].value, "60");
        assert_eq!(entry.details[2].unit, "km/h");
        assert_eq!(entry.details[3].value, "-20");
        assert_eq!(entry.details[3].unit, "m");
    }

    #[test]
    fn html_matches_list_markup() {
        let w = Workout::running(WorkoutId::from_millis(1234), at(), Coords::new(0.0, 0.0), 5.0, 25.0, 180.0);
        let html = ListEntry::for_workout(&w).to_html();
        assert!(html.starts_with("<li class=\"workout workout--running\" data-id=1234>"));
        assert!(html.contains("<h2 class=\"workout__title\">Running on April 14</h2>"));
        assert_eq!(html.matches("class=\"workout__details\"").count(), 4);
        assert!(html.contains("<span class=\"workout__unit\">min/km</span>"));
        assert!(html.trim_end().ends_with("</li>"));
    }

    #[test]
    fn each_call_appends_one_entry() {
        let w = Workout::running(WorkoutId::from_millis(1), at(), Coords::new(0.0, 0.0), 5.0, 25.0, 180.0);
        let mut list = Entries::default();
        render_on_list(&mut list, &w);
        assert_eq!(list.0.len(), 1);
        render_on_list(&mut list, &w);
        assert_eq!(list.0.len(), 2);
    }
}
