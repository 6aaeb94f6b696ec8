//! Core domain types for Calicraft.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their muscle involvement
//! - Skill categories, progressions and steps
//! - The category-keyed progression tree that gets persisted

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Exercise Types
// ============================================================================

/// Muscle involvement of an exercise, by training emphasis
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Muscles {
    #[serde(default)]
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub tertiary: Vec<String>,
}

impl Muscles {
    /// Distinct primary muscle names
    pub fn primary_set(&self) -> BTreeSet<&str> {
        self.primary.iter().map(String::as_str).collect()
    }

    /// Distinct secondary muscle names
    pub fn secondary_set(&self) -> BTreeSet<&str> {
        self.secondary.iter().map(String::as_str).collect()
    }

    /// Distinct tertiary muscle names
    pub fn tertiary_set(&self) -> BTreeSet<&str> {
        self.tertiary.iter().map(String::as_str).collect()
    }

    /// Every muscle named in any tier
    pub fn all(&self) -> BTreeSet<&str> {
        self.primary
            .iter()
            .chain(&self.secondary)
            .chain(&self.tertiary)
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty() && self.tertiary.is_empty()
    }
}

/// A catalogue exercise (e.g., "Archer Push Up")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub description: String,
    pub difficulty: u8,
    pub muscles: Muscles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

impl Exercise {
    /// True when every required skill is in `unlocked`
    pub fn is_eligible(&self, unlocked: &BTreeSet<String>) -> bool {
        self.required_skills
            .iter()
            .all(|skill| unlocked.contains(skill))
    }
}

// ============================================================================
// Skill Progression Types
// ============================================================================

/// Movement-pattern grouping of progressions
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Horizontal Pull")]
    HorizontalPull,
    #[serde(rename = "Vertical Pull")]
    VerticalPull,
    #[serde(rename = "Vertical Push")]
    VerticalPush,
    #[serde(rename = "Horizontal Push")]
    HorizontalPush,
    #[serde(rename = "Core")]
    Core,
    #[serde(rename = "Legs")]
    Legs,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::HorizontalPull,
        Category::VerticalPull,
        Category::VerticalPush,
        Category::HorizontalPush,
        Category::Core,
        Category::Legs,
    ];

    /// Persisted name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HorizontalPull => "Horizontal Pull",
            Category::VerticalPull => "Vertical Pull",
            Category::VerticalPush => "Vertical Push",
            Category::HorizontalPush => "Horizontal Push",
            Category::Core => "Core",
            Category::Legs => "Legs",
        }
    }

    /// Exact match against the persisted name
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Lenient parse for user input: "vertical_pull", "vertical-pull", "Vertical Pull"
    pub fn parse_loose(input: &str) -> Option<Category> {
        let wanted: String = input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Category::ALL.into_iter().find(|c| {
            let name: String = c
                .as_str()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric())
                .map(|ch| ch.to_ascii_lowercase())
                .collect();
            name == wanted
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of the persisted progression map
///
/// Keys that don't name a known category survive a load/save cycle untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryKey {
    Known(Category),
    Other(String),
}

impl CategoryKey {
    pub fn category(&self) -> Option<Category> {
        match self {
            CategoryKey::Known(category) => Some(*category),
            CategoryKey::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryKey::Known(category) => category.as_str(),
            CategoryKey::Other(name) => name,
        }
    }
}

impl From<String> for CategoryKey {
    fn from(name: String) -> Self {
        match Category::from_name(&name) {
            Some(category) => CategoryKey::Known(category),
            None => CategoryKey::Other(name),
        }
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        match key {
            CategoryKey::Known(category) => category.as_str().to_string(),
            CategoryKey::Other(name) => name,
        }
    }
}

impl From<Category> for CategoryKey {
    fn from(category: Category) -> Self {
        CategoryKey::Known(category)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unlockable milestone within a progression (e.g., "Tuck Planche")
///
/// The name is the identity: steps match across versions iff names are equal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionStep {
    pub name: String,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ProgressionStep {
    /// A locked step without a note
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_unlocked: false,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn unlocked(mut self) -> Self {
        self.is_unlocked = true;
        self
    }
}

/// An ordered chain of steps toward a skill goal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Progression {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<ProgressionStep>,
}

impl Progression {
    pub fn new(title: impl Into<String>, steps: Vec<ProgressionStep>) -> Self {
        Self {
            title: title.into(),
            steps,
        }
    }

    /// First step with exactly this name
    pub fn step(&self, name: &str) -> Option<&ProgressionStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// `(unlocked, total)` step counts
    pub fn counts(&self) -> (usize, usize) {
        let unlocked = self.steps.iter().filter(|s| s.is_unlocked).count();
        (unlocked, self.steps.len())
    }

    /// Every step unlocked (false for an empty progression)
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.is_unlocked)
    }
}

/// Category-keyed progression tree, as persisted
pub type CategoryMap = BTreeMap<CategoryKey, Vec<Progression>>;
