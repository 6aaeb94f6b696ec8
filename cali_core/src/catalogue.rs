//! Exercise catalogue.
//!
//! The catalogue is a static JSON array bundled with the crate. Loading
//! never fails to the caller: a missing or malformed source is logged and
//! yields an empty catalogue, which generation treats as "nothing to show".

use crate::types::Exercise;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

/// Bundled exercise data
const BUNDLED_EXERCISES: &str = include_str!("../data/exercises.json");

/// Body region a muscle belongs to, for browsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MuscleRegion {
    Arms,
    Back,
    Chest,
    Core,
    Forearms,
    Glutes,
    Legs,
    Shoulders,
    Other,
}

impl MuscleRegion {
    /// Region for an anatomical muscle name; unknown names map to `Other`
    pub fn of(muscle: &str) -> MuscleRegion {
        match muscle {
            "Rectus Abdominis" | "Obliques" | "Transversus Abdominis" => MuscleRegion::Core,
            "Anterior Deltoid" | "Lateral Deltoid" | "Posterior Deltoid" => MuscleRegion::Shoulders,
            "Latissimus Dorsi" | "Upper Trapezius" | "Rhomboids" | "Lower Trapezius"
            | "Middle Trapezius" | "Erector Spinae" => MuscleRegion::Back,
            "Gluteus Maximus" | "Gluteus Medius" => MuscleRegion::Glutes,
            "Rectus Femoris" | "Sartorius" | "Quadriceps" | "Hamstrings" | "Adductors"
            | "Calves" => MuscleRegion::Legs,
            "Forearm Flexors" | "Forearm Extensors" => MuscleRegion::Forearms,
            "Triceps Brachii" | "Biceps Brachii" => MuscleRegion::Arms,
            "Pectoralis Major" | "Pectoralis Minor" | "Serratus Anterior" => MuscleRegion::Chest,
            _ => MuscleRegion::Other,
        }
    }
}

impl fmt::Display for MuscleRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The loaded set of exercises, in source order
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    exercises: Vec<Exercise>,
}

impl Catalogue {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    /// Parse a JSON array of exercises
    pub fn from_json_str(json: &str) -> Result<Self> {
        let exercises: Vec<Exercise> = serde_json::from_str(json)?;
        Ok(Self { exercises })
    }

    /// The catalogue compiled into the crate
    pub fn bundled() -> Self {
        Self::parse_or_empty(BUNDLED_EXERCISES, "bundled catalogue")
    }

    /// Load a catalogue file, falling back to an empty catalogue
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_or_empty(&contents, &path.display().to_string()),
            Err(e) => {
                tracing::warn!(
                    "Failed to read catalogue at {:?}: {}. Using empty catalogue.",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    /// Load from `path` when given, otherwise the bundled catalogue
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::bundled(),
        }
    }

    fn parse_or_empty(json: &str, origin: &str) -> Self {
        match Self::from_json_str(json) {
            Ok(catalogue) => {
                tracing::info!("Loaded {} exercises from {}", catalogue.len(), origin);
                catalogue
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {}: {}. Using empty catalogue.",
                    origin,
                    e
                );
                Self::default()
            }
        }
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercise with exactly this name
    pub fn find(&self, name: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.name == name)
    }

    /// Every muscle named anywhere in the catalogue, sorted
    pub fn all_muscles(&self) -> BTreeSet<String> {
        self.exercises
            .iter()
            .flat_map(|e| e.muscles.all())
            .map(str::to_string)
            .collect()
    }

    /// Exercises grouped by region, then by primary muscle
    pub fn grouped_by_region(&self) -> BTreeMap<MuscleRegion, BTreeMap<String, Vec<&Exercise>>> {
        let mut grouped: BTreeMap<MuscleRegion, BTreeMap<String, Vec<&Exercise>>> = BTreeMap::new();
        for exercise in &self.exercises {
            for muscle in &exercise.muscles.primary {
                grouped
                    .entry(MuscleRegion::of(muscle))
                    .or_default()
                    .entry(muscle.clone())
                    .or_default()
                    .push(exercise);
            }
        }
        grouped
    }

    /// Validate the catalogue for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for exercise in &self.exercises {
            if exercise.name.trim().is_empty() {
                errors.push("Exercise has empty name".to_string());
            }
            if !names.insert(exercise.name.as_str()) {
                errors.push(format!("Duplicate exercise '{}'", exercise.name));
            }
            if !(1..=10).contains(&exercise.difficulty) {
                errors.push(format!(
                    "Exercise '{}': difficulty {} outside 1-10",
                    exercise.name, exercise.difficulty
                ));
            }
            if exercise.muscles.primary.is_empty() {
                errors.push(format!("Exercise '{}' has no primary muscles", exercise.name));
            }
        }

        errors
    }

    /// Like `validate`, as a `Result`
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CatalogueValidation(errors.join("; ")))
        }
    }
}
