use std::collections::HashMap;

use crate::error::MaptyError;
use crate::workout::{Workout, WorkoutId};

/// Session workouts in the order they were logged. Append-only.
#[derive(Debug, Default)]
pub struct WorkoutCollection {
    workouts: Vec<Workout>,
    index: HashMap<WorkoutId, usize>,
}

impl WorkoutCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Ids must be unique within the collection.
    pub fn push(&mut self, workout: Workout) -> Result<&Workout, MaptyError> {
        if self.index.contains_key(workout.id()) {
            return Err(MaptyError::DuplicateId(workout.id().to_string()));
        }
        let pos = self.workouts.len();
        self.index.insert(workout.id().clone(), pos);
        self.workouts.push(workout);
        Ok(&self.workouts[pos])
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.index.get(id).map(|&i| &self.workouts[i])
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn last(&self) -> Option<&Workout> {
        self.workouts.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }
}

impl<'a> IntoIterator for &'a WorkoutCollection {
    type Item = &'a Workout;
    type IntoIter = std::slice::Iter<'a, Workout>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coords;
    use chrono::{Local, TimeZone};

    fn running(ms: i64) -> Workout {
        let at = Local.with_ymd_and_hms(2024, 4, 14, 9, 0, 0).unwrap();
        Workout::running(
            WorkoutId::from_millis(ms),
            at,
            Coords::new(1.0, 2.0),
            5.0,
            25.0,
            180.0,
        )
    }

    #[test]
    fn keeps_insertion_order() {
        let mut c = WorkoutCollection::new();
        for ms in [30, 10, 20] {
            c.push(running(ms)).unwrap();
        }
        let ids: Vec<&str> = c.iter().map(|w| w.id().as_str()).collect();
        assert_eq!(ids, ["30", "10", "20"]);
        assert_eq!(c.last().map(|w| w.id().as_str()), Some("20"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut c = WorkoutCollection::new();
        c.push(running(7)).unwrap();
        assert_eq!(
            c.push(running(7)).unwrap_err(),
            MaptyError::DuplicateId("7".to_string())
        );
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn looks_up_by_id() {
        let mut c = WorkoutCollection::new();
        c.push(running(1)).unwrap();
        c.push(running(2)).unwrap();
        let found = c.get(&WorkoutId::from_millis(2)).unwrap();
        assert_eq!(found.id().as_str(), "2");
        assert!(c.get(&WorkoutId::from_millis(3)).is_none());
    }
}
