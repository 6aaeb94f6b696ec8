//! Local workout generator.
//!
//! Selection logic:
//! - Gate: drop exercises whose required skills aren't all unlocked
//! - Focus skill: rank by weighted muscle overlap with the reference exercise,
//!   sample from the top of the ranking, then summarize the training focus
//! - Otherwise: keep exercises touching any target muscle and sample
//!
//! Randomness is injected, so a seeded RNG gives repeatable workouts. Ties
//! in the ranking keep catalogue order.

use crate::types::Exercise;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Smallest candidate pool drawn from in focus mode
pub const MIN_CANDIDATE_POOL: usize = 12;

const PRIMARY_WEIGHT: u32 = 3;
const SECONDARY_WEIGHT: u32 = 2;
const TERTIARY_WEIGHT: u32 = 1;

/// Inputs to local generation
#[derive(Clone, Debug, Default)]
pub struct WorkoutRequest {
    pub unlocked_skills: BTreeSet<String>,
    pub focus_skill: Option<String>,
    pub target_muscles: BTreeSet<String>,
    pub count: usize,
}

/// How the exercises were chosen
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationMode {
    /// Ranked against the muscle profile of this catalogue exercise
    Focus { skill: String },
    /// Filtered by target muscles
    Muscles,
}

/// A generated session
#[derive(Clone, Debug)]
pub struct GeneratedWorkout {
    pub exercises: Vec<Exercise>,
    pub focus_scores: BTreeMap<String, u32>,
    pub mode: GenerationMode,
    /// How many catalogue exercises passed the skill gate
    pub eligible: usize,
}

impl GeneratedWorkout {
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Focus scores, highest first (ties by muscle name)
    pub fn sorted_focus(&self) -> Vec<(&str, u32)> {
        let mut sorted: Vec<(&str, u32)> = self
            .focus_scores
            .iter()
            .map(|(muscle, score)| (muscle.as_str(), *score))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

/// Muscle tiers of a reference exercise
struct Reference<'a> {
    primary: BTreeSet<&'a str>,
    secondary: BTreeSet<&'a str>,
    tertiary: BTreeSet<&'a str>,
}

impl<'a> Reference<'a> {
    fn of(exercise: &'a Exercise) -> Self {
        Self {
            primary: exercise.muscles.primary_set(),
            secondary: exercise.muscles.secondary_set(),
            tertiary: exercise.muscles.tertiary_set(),
        }
    }

    /// Tier-by-tier overlap, weighted 3/2/1, counting distinct names
    fn score(&self, exercise: &Exercise) -> u32 {
        let muscles = &exercise.muscles;
        PRIMARY_WEIGHT * overlap(&muscles.primary_set(), &self.primary)
            + SECONDARY_WEIGHT * overlap(&muscles.secondary_set(), &self.secondary)
            + TERTIARY_WEIGHT * overlap(&muscles.tertiary_set(), &self.tertiary)
    }

    fn union(&self) -> BTreeSet<&'a str> {
        self.primary
            .iter()
            .chain(&self.secondary)
            .chain(&self.tertiary)
            .copied()
            .collect()
    }
}

fn overlap(mine: &BTreeSet<&str>, theirs: &BTreeSet<&str>) -> u32 {
    mine.intersection(theirs).count() as u32
}

/// Generate a workout from `catalogue`
///
/// An empty catalogue or an empty eligible set gives an empty workout with
/// no focus scores; that's a normal outcome, not an error.
pub fn generate<R: Rng + ?Sized>(
    catalogue: &[Exercise],
    request: &WorkoutRequest,
    rng: &mut R,
) -> GeneratedWorkout {
    let eligible: Vec<&Exercise> = catalogue
        .iter()
        .filter(|e| e.is_eligible(&request.unlocked_skills))
        .collect();

    let reference = request
        .focus_skill
        .as_deref()
        .and_then(|skill| catalogue.iter().find(|e| e.name == skill));

    let workout = match reference {
        Some(reference) => generate_focused(&eligible, reference, request.count, rng),
        None => {
            if let Some(skill) = &request.focus_skill {
                tracing::debug!(
                    "Focus skill '{}' has no reference exercise, filtering by muscles",
                    skill
                );
            }
            generate_by_muscles(&eligible, &request.target_muscles, request.count, rng)
        }
    };

    if eligible.is_empty() {
        tracing::warn!("No eligible exercises available for current skill unlocks");
    }
    tracing::info!(
        "Generated {} of {} requested exercises ({} eligible, {:?})",
        workout.exercises.len(),
        request.count,
        eligible.len(),
        workout.mode
    );

    workout
}

fn generate_focused<R: Rng + ?Sized>(
    eligible: &[&Exercise],
    reference_exercise: &Exercise,
    count: usize,
    rng: &mut R,
) -> GeneratedWorkout {
    let mode = GenerationMode::Focus {
        skill: reference_exercise.name.clone(),
    };
    let reference = Reference::of(reference_exercise);

    let mut ranked: Vec<(&Exercise, u32)> = eligible
        .iter()
        .map(|e| (*e, reference.score(e)))
        .collect();
    // sort_by is stable: equal scores keep catalogue order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let pool_size = count.saturating_mul(2).max(MIN_CANDIDATE_POOL);
    let mut pool: Vec<&Exercise> = ranked.into_iter().take(pool_size).map(|(e, _)| e).collect();
    pool.shuffle(rng);
    pool.truncate(count);

    let exercises: Vec<Exercise> = pool.into_iter().cloned().collect();
    let focus_scores = focus_scores(&exercises, &reference);

    GeneratedWorkout {
        exercises,
        focus_scores,
        mode,
        eligible: eligible.len(),
    }
}

fn generate_by_muscles<R: Rng + ?Sized>(
    eligible: &[&Exercise],
    targets: &BTreeSet<String>,
    count: usize,
    rng: &mut R,
) -> GeneratedWorkout {
    let mut matching: Vec<&Exercise> = eligible
        .iter()
        .copied()
        .filter(|e| {
            targets.is_empty() || e.muscles.all().iter().any(|m| targets.contains(*m))
        })
        .collect();
    matching.shuffle(rng);
    matching.truncate(count);

    GeneratedWorkout {
        exercises: matching.into_iter().cloned().collect(),
        focus_scores: BTreeMap::new(),
        mode: GenerationMode::Muscles,
        eligible: eligible.len(),
    }
}

/// Per-muscle emphasis of the selected exercises, limited to reference muscles
fn focus_scores(exercises: &[Exercise], reference: &Reference<'_>) -> BTreeMap<String, u32> {
    let important = reference.union();
    let mut scores = BTreeMap::new();

    for exercise in exercises {
        let tiers = [
            (exercise.muscles.primary_set(), PRIMARY_WEIGHT),
            (exercise.muscles.secondary_set(), SECONDARY_WEIGHT),
            (exercise.muscles.tertiary_set(), TERTIARY_WEIGHT),
        ];
        for (muscles, weight) in tiers {
            for muscle in muscles.into_iter().filter(|m| important.contains(m)) {
                *scores.entry(muscle.to_string()).or_insert(0) += weight;
            }
        }
    }

    scores
}

/// Union of the reference exercise's muscle tiers
///
/// Empty when the skill doesn't name a catalogue exercise.
pub fn key_muscles(catalogue: &[Exercise], focus_skill: &str) -> BTreeSet<String> {
    catalogue
        .iter()
        .find(|e| e.name == focus_skill)
        .map(|e| e.muscles.all().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}
