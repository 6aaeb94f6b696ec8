#![forbid(unsafe_code)]

//! Core domain model and business logic for Calicraft.
//!
//! This crate provides:
//! - Domain types (exercises, progressions, categories)
//! - The default progression template and saved-state merge
//! - Skill tracking over a pluggable blob store
//! - Exercise catalogue loading
//! - Local workout generation and the remote planner client
//! - Workout log and configuration

pub mod types;
pub mod error;
pub mod template;
pub mod merge;
pub mod store;
pub mod tracker;
pub mod catalogue;
pub mod engine;
pub mod planner;
pub mod workout_log;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use template::{default_template, validated_default_template};
pub use merge::{load_merged, merge, unlocked_skill_names, LoadSource, LoadedProgressions};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use tracker::{SkillTracker, StepLocation, UnlockedExport};
pub use catalogue::{Catalogue, MuscleRegion};
pub use engine::{generate, key_muscles, GeneratedWorkout, GenerationMode, WorkoutRequest};
pub use planner::{request_plan, HttpPlanClient, PlanClient, PlanOutcome, PlanRequest, RemotePlan};
pub use workout_log::{WorkoutLog, WorkoutRecord, WorkoutSource};
pub use config::Config;
