//! Client for the remote workout planner.
//!
//! The planner is an HTTP service taking the user's targets and unlocked
//! skills and returning a named plan. Returned names are mapped back onto
//! the catalogue; anything that can't be matched is kept as a placeholder
//! with no muscle data so the plan still shows in full.

use crate::config::PlannerConfig;
use crate::engine::key_muscles;
use crate::types::{Exercise, Muscles};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Body of `POST /plan`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub target_muscles: Vec<String>,
    pub number_of_exercises: usize,
    pub min_difficulty: u8,
    pub max_difficulty: u8,
    pub user_skills: Vec<String>,
    pub gate_by_skills: bool,
    pub use_llm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_minutes: Option<u32>,
}

impl PlanRequest {
    /// Build a request from the same inputs the local generator takes
    ///
    /// Targets are the key muscles of `focus_skill` when it names a catalogue
    /// exercise, otherwise `selected_muscles`. The goal is the focus skill, or
    /// the configured default.
    pub fn build(
        settings: &PlannerConfig,
        catalogue: &[Exercise],
        unlocked_skills: &BTreeSet<String>,
        focus_skill: Option<&str>,
        selected_muscles: &BTreeSet<String>,
    ) -> Self {
        let skill_targets = focus_skill
            .map(|skill| key_muscles(catalogue, skill))
            .unwrap_or_default();
        let targets = if skill_targets.is_empty() {
            selected_muscles.clone()
        } else {
            skill_targets
        };

        Self {
            target_muscles: targets.into_iter().collect(),
            number_of_exercises: settings.number_of_exercises,
            min_difficulty: settings.min_difficulty,
            max_difficulty: settings.max_difficulty,
            user_skills: unlocked_skills.iter().cloned().collect(),
            gate_by_skills: settings.gate_by_skills,
            use_llm: settings.use_llm,
            goal: Some(
                focus_skill
                    .map(str::to_string)
                    .unwrap_or_else(|| settings.default_goal.clone()),
            ),
            session_minutes: settings.session_minutes,
        }
    }
}

/// One entry of the returned plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    #[serde(default)]
    pub reps: Option<String>,
}

/// Body of the planner's response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan: Vec<PlanItem>,
    #[serde(default)]
    pub focus_scores: BTreeMap<String, u32>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// A plan mapped back onto the catalogue
#[derive(Clone, Debug, PartialEq)]
pub struct RemotePlan {
    pub exercises: Vec<Exercise>,
    pub focus_scores: BTreeMap<String, u32>,
    pub notes: Vec<String>,
}

impl RemotePlan {
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

/// Result of asking the planner for a workout
///
/// `NoTargets` and `Failed` both mean "no workout, no focus scores".
#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    Planned(RemotePlan),
    /// Neither a resolvable focus skill nor any selected muscles
    NoTargets,
    Failed { reason: String },
}

/// Transport to the planner service
pub trait PlanClient {
    fn plan(&self, request: &PlanRequest) -> Result<PlanResponse>;
}

/// Blocking HTTP client for `<base_url>/plan`
pub struct HttpPlanClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpPlanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            endpoint: format!("{}/plan", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PlanClient for HttpPlanClient {
    fn plan(&self, request: &PlanRequest) -> Result<PlanResponse> {
        tracing::debug!("POST {} ({} targets)", self.endpoint, request.target_muscles.len());
        let response = self.client.post(&self.endpoint).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Planner(format!(
                "planner returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(response.json()?)
    }
}

/// Ask the planner for a workout and map it onto `catalogue`
///
/// An empty target set never reaches the client. Transport and decode
/// errors are reported as `Failed`; there is no retry.
pub fn request_plan<C: PlanClient + ?Sized>(
    client: &C,
    request: &PlanRequest,
    catalogue: &[Exercise],
) -> PlanOutcome {
    if request.target_muscles.is_empty() {
        tracing::warn!("No planner targets: select a skill or some muscles");
        return PlanOutcome::NoTargets;
    }

    match client.plan(request) {
        Ok(response) => {
            tracing::info!("Planner returned {} items", response.plan.len());
            let plan = map_response(response, catalogue);
            PlanOutcome::Planned(plan)
        }
        Err(e) => {
            tracing::warn!("Planner request failed: {}", e);
            PlanOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Map plan items onto catalogue exercises
pub fn map_response(response: PlanResponse, catalogue: &[Exercise]) -> RemotePlan {
    let exercises = response
        .plan
        .into_iter()
        .map(|item| map_item(item, catalogue))
        .collect();

    RemotePlan {
        exercises,
        focus_scores: response.focus_scores,
        notes: response.notes,
    }
}

fn map_item(item: PlanItem, catalogue: &[Exercise]) -> Exercise {
    let normalized = normalize_name(&item.name);
    let matched = catalogue
        .iter()
        .find(|e| e.name == item.name)
        .or_else(|| catalogue.iter().find(|e| normalize_name(&e.name) == normalized));

    match matched {
        Some(exercise) => Exercise {
            reps: item.reps,
            ..exercise.clone()
        },
        None => {
            tracing::debug!("No catalogue match for planned '{}'", item.name);
            Exercise {
                name: item.name,
                description: item.description,
                difficulty: item.difficulty,
                muscles: Muscles::default(),
                reps: item.reps,
                required_skills: vec![],
            }
        }
    }
}

/// Loose form of an exercise name for matching planner output
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2011}' | '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            c => c,
        })
        .collect();
    folded.replace(" push ups", " push up").trim().to_string()
}
