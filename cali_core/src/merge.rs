//! Reconciling saved progressions with the default template.
//!
//! The template decides which progressions and steps exist and in what
//! order. The saved tree decides the unlock state (and note) of every step
//! whose name still matches. Anything only present in saved data is kept so
//! a downgrade or a renamed template never destroys user data.

use crate::types::*;
use std::collections::BTreeSet;

/// Where a loaded tree came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// Saved data decoded and merged over the template
    Saved,
    /// Nothing persisted yet; the template is used as-is
    NoSavedData,
    /// Saved data could not be decoded; the template is used as-is
    Recovered { reason: String },
}

/// Result of loading the progression tree
#[derive(Clone, Debug)]
pub struct LoadedProgressions {
    pub tree: CategoryMap,
    pub source: LoadSource,
}

/// Merge a saved tree over the template
///
/// Matching is by exact title, then exact step name; first match wins.
/// Steps that only exist in a matched saved progression are dropped, saved
/// progressions with no template title are appended after the template ones,
/// and saved categories the template doesn't know are copied over.
pub fn merge(template: &CategoryMap, saved: &CategoryMap) -> CategoryMap {
    let mut result = CategoryMap::new();

    for (key, defaults) in template {
        let saved_progs: &[Progression] = saved.get(key).map(Vec::as_slice).unwrap_or(&[]);
        let mut merged = Vec::with_capacity(defaults.len());

        for default in defaults {
            match saved_progs.iter().find(|p| p.title == default.title) {
                Some(saved_prog) => {
                    let steps = default
                        .steps
                        .iter()
                        .map(|step| saved_prog.step(&step.name).unwrap_or(step).clone())
                        .collect();
                    merged.push(Progression::new(default.title.clone(), steps));
                }
                None => merged.push(default.clone()),
            }
        }

        for extra in saved_progs {
            if !defaults.iter().any(|d| d.title == extra.title) {
                tracing::debug!(
                    "Keeping saved-only progression '{}' in '{}'",
                    extra.title,
                    key
                );
                merged.push(extra.clone());
            }
        }

        result.insert(key.clone(), merged);
    }

    for (key, progs) in saved {
        if !result.contains_key(key) {
            tracing::debug!("Keeping saved-only category '{}'", key);
            result.insert(key.clone(), progs.clone());
        }
    }

    result
}

/// Decode a persisted blob and merge it over the template
///
/// A blob that doesn't decode leaves the template untouched.
pub fn load_merged(template: &CategoryMap, blob: Option<&str>) -> LoadedProgressions {
    let Some(blob) = blob else {
        tracing::info!("No saved progressions, using default template");
        return LoadedProgressions {
            tree: template.clone(),
            source: LoadSource::NoSavedData,
        };
    };

    match serde_json::from_str::<CategoryMap>(blob) {
        Ok(saved) => {
            tracing::debug!("Merging {} saved categories over template", saved.len());
            LoadedProgressions {
                tree: merge(template, &saved),
                source: LoadSource::Saved,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Failed to decode saved progressions: {}. Using default template.",
                e
            );
            LoadedProgressions {
                tree: template.clone(),
                source: LoadSource::Recovered {
                    reason: e.to_string(),
                },
            }
        }
    }
}

/// Flatten a tree to the set of unlocked step names
pub fn unlocked_skill_names(tree: &CategoryMap) -> BTreeSet<String> {
    tree.values()
        .flatten()
        .flat_map(|p| &p.steps)
        .filter(|s| s.is_unlocked)
        .map(|s| s.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::build_default_template;

    fn legs_template() -> CategoryMap {
        let mut template = CategoryMap::new();
        template.insert(
            CategoryKey::Known(Category::Legs),
            vec![Progression::new(
                "Squat",
                vec![
                    ProgressionStep::new("Assisted Squat"),
                    ProgressionStep::new("Parallel Squat"),
                    ProgressionStep::new("Full Squat"),
                ],
            )],
        );
        template
    }

    fn step_names(tree: &CategoryMap, category: Category, title: &str) -> Vec<String> {
        tree[&CategoryKey::Known(category)]
            .iter()
            .find(|p| p.title == title)
            .unwrap()
            .steps
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// (category, title, step, unlocked) tuples for whole-tree comparison
    fn tuples(tree: &CategoryMap) -> BTreeSet<(String, String, String, bool)> {
        tree.iter()
            .flat_map(|(key, progs)| {
                progs.iter().flat_map(move |p| {
                    p.steps.iter().map(move |s| {
                        (
                            key.to_string(),
                            p.title.clone(),
                            s.name.clone(),
                            s.is_unlocked,
                        )
                    })
                })
            })
            .collect()
    }

    #[test]
    fn test_squat_example() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[{"title":"Squat","steps":[{"name":"Parallel Squat","isUnlocked":true}]}]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        let squat = &merged[&CategoryKey::Known(Category::Legs)][0];

        let flags: Vec<(&str, bool)> = squat
            .steps
            .iter()
            .map(|s| (s.name.as_str(), s.is_unlocked))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("Assisted Squat", false),
                ("Parallel Squat", true),
                ("Full Squat", false),
            ]
        );
    }

    #[test]
    fn test_saved_state_and_note_win() {
        let mut saved = legs_template();
        let step = &mut saved.get_mut(&CategoryKey::Known(Category::Legs)).unwrap()[0].steps[2];
        step.is_unlocked = true;
        step.note = Some("hit it on 2024-05-01".into());

        let mut template = legs_template();
        template.get_mut(&CategoryKey::Known(Category::Legs)).unwrap()[0].steps[2].note =
            Some("template note".into());

        let merged = merge(&template, &saved);
        let full = &merged[&CategoryKey::Known(Category::Legs)][0].steps[2];
        assert!(full.is_unlocked);
        assert_eq!(full.note.as_deref(), Some("hit it on 2024-05-01"));
    }

    #[test]
    fn test_template_order_wins() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[{"title":"Squat","steps":[
                {"name":"Full Squat","isUnlocked":true},
                {"name":"Assisted Squat","isUnlocked":true}
            ]}]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        assert_eq!(
            step_names(&merged, Category::Legs, "Squat"),
            vec!["Assisted Squat", "Parallel Squat", "Full Squat"]
        );
    }

    #[test]
    fn test_saved_only_step_dropped_from_matched_progression() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[{"title":"Squat","steps":[{"name":"Box Squat","isUnlocked":true}]}]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        assert!(!step_names(&merged, Category::Legs, "Squat").contains(&"Box Squat".to_string()));
    }

    #[test]
    fn test_saved_only_progression_appended() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[
                {"title":"Jump Squat","steps":[{"name":"Tuck Jump","isUnlocked":true}]},
                {"title":"Squat","steps":[]}
            ]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        let titles: Vec<&str> = merged[&CategoryKey::Known(Category::Legs)]
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Squat", "Jump Squat"]);
        assert!(merged[&CategoryKey::Known(Category::Legs)][1].steps[0].is_unlocked);
    }

    #[test]
    fn test_unknown_category_passes_through() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Mobility":[{"title":"Pancake","steps":[{"name":"Seated Pancake","isUnlocked":true}]}]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        let key = CategoryKey::Other("Mobility".into());
        assert_eq!(merged[&key], saved[&key]);
        assert!(merged.contains_key(&CategoryKey::Known(Category::Legs)));
    }

    #[test]
    fn test_first_duplicate_title_wins() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[
                {"title":"Squat","steps":[{"name":"Full Squat","isUnlocked":true}]},
                {"title":"Squat","steps":[{"name":"Full Squat","isUnlocked":false}]}
            ]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        let legs = &merged[&CategoryKey::Known(Category::Legs)];
        assert_eq!(legs.len(), 1);
        assert!(legs[0].steps[2].is_unlocked);
    }

    #[test]
    fn test_never_drops_template_category() {
        let template = build_default_template();
        let saved: CategoryMap = serde_json::from_str(r#"{"Core":[]}"#).unwrap();

        let merged = merge(&template, &saved);
        for key in template.keys() {
            assert!(merged.contains_key(key));
        }
    }

    #[test]
    fn test_merge_with_itself_is_identity() {
        let mut template = build_default_template();
        template.get_mut(&CategoryKey::Known(Category::Core)).unwrap()[0].steps[0].is_unlocked = true;

        let merged = merge(&template, &template);
        assert_eq!(tuples(&merged), tuples(&template));
        assert_eq!(merged, template);
    }

    #[test]
    fn test_legacy_fields_ignored() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[{"id":"6F1A","title":"Squat","steps":[
                {"id":"A1","name":"Assisted Squat","isUnlocked":true}
            ]}]}"#,
        )
        .unwrap();

        let merged = merge(&legs_template(), &saved);
        assert!(merged[&CategoryKey::Known(Category::Legs)][0].steps[0].is_unlocked);
    }

    #[test]
    fn test_load_without_blob() {
        let loaded = load_merged(&legs_template(), None);
        assert_eq!(loaded.source, LoadSource::NoSavedData);
        assert_eq!(loaded.tree, legs_template());
    }

    #[test]
    fn test_load_malformed_blob_returns_template() {
        crate::logging::init_test();

        let loaded = load_merged(&legs_template(), Some("{ invalid json }"));
        assert!(matches!(loaded.source, LoadSource::Recovered { .. }));
        assert_eq!(loaded.tree, legs_template());
    }

    #[test]
    fn test_load_schema_mismatch_returns_template() {
        let loaded = load_merged(&legs_template(), Some(r#"{"Legs": "not a list"}"#));
        assert!(matches!(loaded.source, LoadSource::Recovered { .. }));
        assert_eq!(loaded.tree, legs_template());
    }

    #[test]
    fn test_unlocked_names() {
        let saved: CategoryMap = serde_json::from_str(
            r#"{"Legs":[{"title":"Squat","steps":[
                {"name":"Assisted Squat","isUnlocked":true},
                {"name":"Parallel Squat","isUnlocked":true}
            ]}]}"#,
        )
        .unwrap();
        let blob = serde_json::to_string(&saved).unwrap();
        let loaded = load_merged(&legs_template(), Some(blob.as_str()));

        let names = unlocked_skill_names(&loaded.tree);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["Assisted Squat".to_string(), "Parallel Squat".to_string()]
        );
    }
}
