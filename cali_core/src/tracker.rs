//! Live skill progression state.
//!
//! `SkillTracker` owns the merged tree for the session and writes it back to
//! its store after every change, with no batching.

use crate::merge::{load_merged, unlocked_skill_names, LoadSource};
use crate::store::BlobStore;
use crate::types::*;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Where a step lives in the tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepLocation {
    pub category: CategoryKey,
    pub title: String,
    pub step: String,
}

/// Unlocked skill names, for feeding external tools
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedExport {
    pub unlocked_skill_names: Vec<String>,
    pub unlocked_by_category: BTreeMap<String, Vec<String>>,
}

pub struct SkillTracker<S: BlobStore> {
    tree: CategoryMap,
    source: LoadSource,
    store: S,
}

impl<S: BlobStore> SkillTracker<S> {
    /// Load the saved tree from `store` and merge it over `template`
    pub fn open(store: S, template: &CategoryMap) -> Result<Self> {
        let blob = store.load()?;
        let loaded = load_merged(template, blob.as_deref());
        tracing::info!(
            "Opened skill tracker ({:?}, {} unlocked)",
            loaded.source,
            unlocked_skill_names(&loaded.tree).len()
        );
        Ok(Self {
            tree: loaded.tree,
            source: loaded.source,
            store,
        })
    }

    pub fn tree(&self) -> &CategoryMap {
        &self.tree
    }

    pub fn source(&self) -> &LoadSource {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the unlocked step names
    pub fn unlocked_skills(&self) -> BTreeSet<String> {
        unlocked_skill_names(&self.tree)
    }

    /// `(unlocked, total)` step counts for one category
    pub fn counts(&self, category: &CategoryKey) -> (usize, usize) {
        let steps = self
            .tree
            .get(category)
            .into_iter()
            .flatten()
            .flat_map(|p| &p.steps);
        steps.fold((0, 0), |(unlocked, total), step| {
            (unlocked + usize::from(step.is_unlocked), total + 1)
        })
    }

    /// First step named `name`, optionally restricted to a category or progression
    pub fn find_step(
        &self,
        name: &str,
        category: Option<&CategoryKey>,
        title: Option<&str>,
    ) -> Option<StepLocation> {
        self.tree
            .iter()
            .filter(|(key, _)| category.map_or(true, |c| c == *key))
            .flat_map(|(key, progs)| progs.iter().map(move |p| (key, p)))
            .filter(|(_, p)| title.map_or(true, |t| t == p.title))
            .find(|(_, p)| p.step(name).is_some())
            .map(|(key, p)| StepLocation {
                category: key.clone(),
                title: p.title.clone(),
                step: name.to_string(),
            })
    }

    /// `(unlocked, total)` step counts for one progression
    pub fn progression_counts(&self, category: &CategoryKey, title: &str) -> Option<(usize, usize)> {
        self.tree
            .get(category)?
            .iter()
            .find(|p| p.title == title)
            .map(Progression::counts)
    }

    /// Flip a step's unlock flag and persist; returns the new flag
    pub fn toggle(&mut self, location: &StepLocation) -> Result<bool> {
        let previous = self.tree.clone();
        let step = self.step_mut(location)?;
        step.is_unlocked = !step.is_unlocked;
        let now = step.is_unlocked;
        tracing::info!("Toggled '{}' to {}", location.step, now);
        self.persist_or_revert(previous)?;
        Ok(now)
    }

    /// Set a step's unlock flag and persist
    pub fn set_unlocked(&mut self, location: &StepLocation, unlocked: bool) -> Result<()> {
        let previous = self.tree.clone();
        self.step_mut(location)?.is_unlocked = unlocked;
        tracing::info!("Set '{}' to {}", location.step, unlocked);
        self.persist_or_revert(previous)
    }

    /// Unlock every step of the progression up to and including this one
    pub fn unlock_through(&mut self, location: &StepLocation) -> Result<usize> {
        let previous = self.tree.clone();
        let progression = self.progression_mut(&location.category, &location.title)?;
        let end = progression
            .steps
            .iter()
            .position(|s| s.name == location.step)
            .ok_or_else(|| Error::UnknownStep(location.step.clone()))?;

        for step in &mut progression.steps[..=end] {
            step.is_unlocked = true;
        }

        tracing::info!(
            "Unlocked {} steps of '{}' through '{}'",
            end + 1,
            location.title,
            location.step
        );
        self.persist_or_revert(previous)?;
        Ok(end + 1)
    }

    /// Set every step of a progression and persist; returns the step count
    pub fn set_progression(
        &mut self,
        category: &CategoryKey,
        title: &str,
        unlocked: bool,
    ) -> Result<usize> {
        let previous = self.tree.clone();
        let progression = self.progression_mut(category, title)?;
        for step in &mut progression.steps {
            step.is_unlocked = unlocked;
        }
        let count = progression.steps.len();

        tracing::info!("Set all {} steps of '{}' to {}", count, title, unlocked);
        self.persist_or_revert(previous)?;
        Ok(count)
    }

    /// Clear a complete progression, otherwise unlock all of it
    ///
    /// Returns whether the progression is now fully unlocked.
    pub fn toggle_progression(&mut self, category: &CategoryKey, title: &str) -> Result<bool> {
        let complete = self.progression_mut(category, title)?.is_complete();
        self.set_progression(category, title, !complete)?;
        Ok(!complete)
    }

    /// Unlocked names, overall (sorted) and per category
    pub fn export_unlocked(&self) -> UnlockedExport {
        let unlocked_by_category = self
            .tree
            .iter()
            .map(|(key, progs)| {
                let names = progs
                    .iter()
                    .flat_map(|p| &p.steps)
                    .filter(|s| s.is_unlocked)
                    .map(|s| s.name.clone())
                    .collect();
                (key.to_string(), names)
            })
            .collect();

        UnlockedExport {
            unlocked_skill_names: self.unlocked_skills().into_iter().collect(),
            unlocked_by_category,
        }
    }

    fn progression_mut(&mut self, category: &CategoryKey, title: &str) -> Result<&mut Progression> {
        self.tree
            .get_mut(category)
            .and_then(|progs| progs.iter_mut().find(|p| p.title == title))
            .ok_or_else(|| Error::UnknownStep(format!("{} / {}", category, title)))
    }

    fn step_mut(&mut self, location: &StepLocation) -> Result<&mut ProgressionStep> {
        self.progression_mut(&location.category, &location.title)?
            .steps
            .iter_mut()
            .find(|s| s.name == location.step)
            .ok_or_else(|| Error::UnknownStep(location.step.clone()))
    }

    fn persist(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.tree)?;
        self.store.save(&blob)
    }

    /// Persist, or restore `previous` so memory matches the stored blob
    fn persist_or_revert(&mut self, previous: CategoryMap) -> Result<()> {
        if let Err(e) = self.persist() {
            tracing::warn!("Failed to save progressions, reverting change: {}", e);
            self.tree = previous;
            return Err(e);
        }
        Ok(())
    }
}
