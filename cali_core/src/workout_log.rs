//! Append-only log of generated workouts.
//!
//! Workouts are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::engine::{GeneratedWorkout, GenerationMode};
use crate::planner::RemotePlan;
use crate::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Log file name inside the data directory
pub const WORKOUT_LOG_FILE: &str = "workouts.jsonl";

/// Which generator produced a workout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSource {
    Local,
    Remote,
}

/// One logged workout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: WorkoutSource,
    #[serde(default)]
    pub focus_skill: Option<String>,
    pub exercises: Vec<String>,
    #[serde(default)]
    pub focus_scores: BTreeMap<String, u32>,
}

impl WorkoutRecord {
    pub fn from_local(workout: &GeneratedWorkout) -> Self {
        let focus_skill = match &workout.mode {
            GenerationMode::Focus { skill } => Some(skill.clone()),
            GenerationMode::Muscles => None,
        };
        Self::new(
            WorkoutSource::Local,
            focus_skill,
            workout.exercises.iter().map(|e| e.name.clone()).collect(),
            workout.focus_scores.clone(),
        )
    }

    pub fn from_remote(plan: &RemotePlan, focus_skill: Option<&str>) -> Self {
        Self::new(
            WorkoutSource::Remote,
            focus_skill.map(str::to_string),
            plan.exercises.iter().map(|e| e.name.clone()).collect(),
            plan.focus_scores.clone(),
        )
    }

    fn new(
        source: WorkoutSource,
        focus_skill: Option<String>,
        exercises: Vec<String>,
        focus_scores: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            source,
            focus_skill,
            exercises,
            focus_scores,
        }
    }
}

/// JSONL workout log with file locking
pub struct WorkoutLog {
    path: PathBuf,
}

impl WorkoutLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log at `<data_dir>/workouts.jsonl`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(WORKOUT_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &WorkoutRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended workout {} to {:?}", record.id, self.path);
        Ok(())
    }
}

/// Read every record in file order, skipping lines that don't parse
pub fn read_all(path: &Path) -> Result<Vec<WorkoutRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from {:?}", records.len(), path);
    Ok(records)
}

/// Up to `limit` most recent records, newest first
pub fn read_recent(path: &Path, limit: usize) -> Result<Vec<WorkoutRecord>> {
    let mut records = read_all(path)?;
    // Stable: records sharing a timestamp stay newest-appended first after reverse
    records.reverse();
    records.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
    records.truncate(limit);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(exercises: &[&str], minutes_ago: i64) -> WorkoutRecord {
        WorkoutRecord {
            id: Uuid::new_v4(),
            generated_at: Utc::now() - Duration::minutes(minutes_ago),
            source: WorkoutSource::Local,
            focus_skill: None,
            exercises: exercises.iter().map(|e| e.to_string()).collect(),
            focus_scores: BTreeMap::new(),
        }
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut log = WorkoutLog::in_dir(temp_dir.path());

        let entry = record(&["Squat"], 0);
        log.append(&entry).unwrap();

        let records = read_all(log.path()).unwrap();
        assert_eq!(records, vec![entry]);
    }

    #[test]
    fn test_read_recent_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut log = WorkoutLog::in_dir(temp_dir.path());

        log.append(&record(&["Old"], 30)).unwrap();
        log.append(&record(&["Newest"], 1)).unwrap();
        log.append(&record(&["Middle"], 10)).unwrap();

        let recent = read_recent(log.path(), 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].exercises, vec!["Newest"]);
        assert_eq!(recent[1].exercises, vec!["Middle"]);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(WORKOUT_LOG_FILE);

        assert!(read_recent(&path, 10).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut log = WorkoutLog::in_dir(temp_dir.path());
        log.append(&record(&["Squat"], 5)).unwrap();

        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{ not json").unwrap();
        writeln!(file).unwrap();
        drop(file);

        log.append(&record(&["Pull Up"], 0)).unwrap();

        let records = read_all(log.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_record_from_local_workout() {
        let workout = GeneratedWorkout {
            exercises: vec![],
            focus_scores: [("Quadriceps".to_string(), 3)].into_iter().collect(),
            mode: GenerationMode::Focus {
                skill: "Pistol Squat".into(),
            },
            eligible: 4,
        };

        let entry = WorkoutRecord::from_local(&workout);
        assert_eq!(entry.source, WorkoutSource::Local);
        assert_eq!(entry.focus_skill.as_deref(), Some("Pistol Squat"));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["source"], "local");
        assert_eq!(json["focus_scores"]["Quadriceps"], 3);
    }
}
