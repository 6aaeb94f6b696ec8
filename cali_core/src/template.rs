//! Default skill progression template.
//!
//! The template is the authority for which progressions and steps exist.
//! It follows the v5.4 bodyweight fitness progression charts, grouped into
//! the six movement-pattern categories.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default template - built once and reused across loads
static DEFAULT_TEMPLATE: Lazy<CategoryMap> = Lazy::new(build_default_template);

/// Get a reference to the cached default template
pub fn default_template() -> &'static CategoryMap {
    &DEFAULT_TEMPLATE
}

/// Get the default template, refusing to hand out an inconsistent one
pub fn validated_default_template() -> Result<&'static CategoryMap> {
    let template = default_template();
    let errors = validate_template(template);
    if errors.is_empty() {
        Ok(template)
    } else {
        Err(Error::TemplateValidation(errors.join("; ")))
    }
}

/// Builds the default template with every step locked
pub fn build_default_template() -> CategoryMap {
    Category::ALL
        .into_iter()
        .map(|category| {
            let progressions = match category {
                Category::HorizontalPull => horizontal_pull(),
                Category::VerticalPull => vertical_pull(),
                Category::VerticalPush => vertical_push(),
                Category::HorizontalPush => horizontal_push(),
                Category::Core => core_strength(),
                Category::Legs => legs(),
            };
            (CategoryKey::Known(category), progressions)
        })
        .collect()
}

/// Validate a template for consistency
///
/// Titles and step names are merge keys, so a duplicate inside one category
/// would make the merge ambiguous. Returns a list of validation errors, or
/// empty Vec if valid.
pub fn validate_template(template: &CategoryMap) -> Vec<String> {
    let mut errors = Vec::new();

    for category in Category::ALL {
        match template.get(&CategoryKey::Known(category)) {
            None => errors.push(format!("Template is missing category '{}'", category)),
            Some(progressions) if progressions.is_empty() => {
                errors.push(format!("Category '{}' has no progressions", category))
            }
            Some(_) => {}
        }
    }

    for (key, progressions) in template {
        let mut titles = HashSet::new();
        let mut step_names = HashSet::new();

        for progression in progressions {
            if progression.title.trim().is_empty() {
                errors.push(format!("Category '{}' has a progression with empty title", key));
            }
            if !titles.insert(progression.title.as_str()) {
                errors.push(format!(
                    "Category '{}' has duplicate progression '{}'",
                    key, progression.title
                ));
            }
            if progression.steps.is_empty() {
                errors.push(format!(
                    "Progression '{}' in '{}' has no steps",
                    progression.title, key
                ));
            }

            for step in &progression.steps {
                if step.name.trim().is_empty() {
                    errors.push(format!(
                        "Progression '{}' in '{}' has a step with empty name",
                        progression.title, key
                    ));
                }
                if !step_names.insert(step.name.as_str()) {
                    errors.push(format!(
                        "Category '{}' has duplicate step '{}'",
                        key, step.name
                    ));
                }
            }
        }
    }

    errors
}

fn step(name: &str) -> ProgressionStep {
    ProgressionStep::new(name)
}

fn horizontal_pull() -> Vec<Progression> {
    vec![
        Progression::new(
            "Skin the Cat",
            vec![
                step("German Hang"),
                step("Tuck Skin the Cat"),
                step("Advanced Tuck Skin the Cat"),
                step("Pike Skin the Cat"),
            ],
        ),
        Progression::new(
            "Rows",
            vec![
                step("Vertical Row"),
                step("Incline Row"),
                step("Row"),
                step("Wide Row"),
                step("Archer Row"),
                step("Archer-In Row"),
                step("Straddle One Arm Row"),
                step("One Arm Row"),
                step("Straight One Arm Row"),
            ],
        ),
        Progression::new(
            "Back Lever",
            vec![
                step("Tuck Back Lever"),
                step("Advanced Tuck Back Lever"),
                step("One Leg Back Lever"),
                step("Straddle Back Lever"),
                step("Back Lever"),
                step("Back Lever Pullout"),
                step("German Hang Pullout"),
                step("Bent Arm Pull Up to Back Lever"),
                step("Handstand Lower to Back Lever"),
            ],
        ),
        Progression::new(
            "Front Lever",
            vec![
                step("L Hang"),
                step("Tuck Front Lever"),
                step("Advanced Tuck Front Lever"),
                step("One Leg Front Lever"),
                step("Straddle Front Lever"),
                step("Front Lever"),
            ],
        ),
        Progression::new(
            "Front Lever Rows (post Adv Tuck FL)",
            vec![
                step("Tuck Ice Cream Maker"),
                step("Tuck Front Lever Row"),
                step("Advanced Tuck Front Lever Row"),
                step("Straddle Front Lever Row"),
                step("Front Lever Row"),
            ],
        ),
        Progression::new(
            "Front Lever – Transitions",
            vec![
                step("Front Lever to Inverted"),
                step("Hanging Pull FL to Inverted"),
                step("360° Pull"),
                step("Circle Front Lever"),
            ],
        ),
        Progression::new(
            "Iron Cross",
            vec![
                step("Iron Cross Progression"),
                step("Iron Cross"),
                step("Iron Cross to Back Lever"),
            ],
        ),
    ]
}

fn vertical_pull() -> Vec<Progression> {
    vec![
        Progression::new(
            "Pull Up",
            vec![
                step("Scapular Pull"),
                step("Arch Hang"),
                step("Pull Up Negative"),
                step("Pull Up"),
            ],
        ),
        Progression::new(
            "One Arm Pull Up (post Pull Up)",
            vec![
                step("Ring L‑Sit Pull Up"),
                step("Ring Wide Pull Up"),
                step("Ring Wide L‑Pull Up"),
                step("Typewriter Pull Up"),
                step("Archer Pull Up"),
                step("One Arm Pull Up Negative"),
                step("One Arm Pull Up"),
                step("High One Arm Pull Up"),
            ],
        ),
        Progression::new(
            "Pullover",
            vec![
                step("L‑Sit Pull Up"),
                ProgressionStep::new("Pullover")
                    .with_note("Recommended post 'Kipping Muscle Up'"),
            ],
        ),
        Progression::new(
            "Muscle Up (post Pull Up)",
            vec![
                step("Chest to Bar Pull Up"),
                step("Muscle Up Negative"),
                step("Kipping Muscle Up"),
                ProgressionStep::new("Muscle Up")
                    .with_note("Recommended post 'Pullover'"),
                step("Wide Muscle Up"),
                step("Strict Bar Muscle Up"),
                step("L‑Sit Muscle Up"),
                ProgressionStep::new("One Arm Straight Muscle Up")
                    .with_note("Recommended post 'One Arm Pull Up'"),
            ],
        ),
        Progression::new(
            "Human Flag",
            vec![
                step("Side Plank"),
                step("Vertical Flag"),
                step("Advanced Tuck Flag"),
                step("Straddle Flag"),
                step("Human Flag"),
            ],
        ),
    ]
}

fn vertical_push() -> Vec<Progression> {
    vec![
        Progression::new(
            "Handstand / HSPU",
            vec![
                step("Wall Plank"),
                step("Wall Headstand"),
                step("Wall Handstand"),
                step("Handstand"),
                ProgressionStep::new("Press Handstand")
                    .with_note("optional at this stage"),
                step("Wall HS Push Up Negative"),
                step("Wall HS Push Up"),
                step("Headstand Push Up"),
                step("Handstand Push Up"),
                step("Ring Handstand Push Up"),
                step("RTO L‑Sit Handstand Push Up"),
            ],
        ),
        Progression::new(
            "L‑Sit / V‑Sit / Manna",
            vec![
                step("Foot Supported L‑Sit"),
                step("One Leg L‑Sit"),
                step("Tuck L‑Sit"),
                step("One Leg Bent L‑Sit"),
                step("L‑Sit"),
                step("Straddle L‑Sit"),
                step("Rings Turned Out L‑Sit"),
                step("45° V‑Sit"),
                step("75° V‑Sit"),
                step("90° V‑Sit"),
                step("120° V‑Sit"),
                step("140° V‑Sit"),
                step("155° V‑Sit"),
                step("170° V‑Sit"),
                step("Manna"),
            ],
        ),
        Progression::new(
            "Ring Support & Dips",
            vec![
                step("Support Hold"),
                step("Ring Support Hold"),
                step("RTO Support Hold"),
                step("Ring Dip Negative"),
                step("Ring Dip"),
                step("Bulgarian Dip"),
                step("Ring Wide Dip"),
                step("RTO 45° Dip"),
                step("RTO 90° Dip"),
                step("Ring L‑Sit Dip"),
            ],
        ),
        Progression::new(
            "Ring Balances",
            vec![
                step("Ring Shoulder Stand"),
                step("Ring Handstand"),
            ],
        ),
        Progression::new(
            "Bridge / Wheel",
            vec![
                step("Shoulder Bridge"),
                step("Table Bridge"),
                step("Angled Bridge"),
                step("Bridge / Wheel"),
                step("Decline Bridge"),
                step("One Leg Bridge"),
                step("Decline One Leg Bridge"),
                step("OA Head Bridge"),
                step("One Arm Bridge"),
            ],
        ),
    ]
}

fn horizontal_push() -> Vec<Progression> {
    vec![
        Progression::new(
            "Push Up",
            vec![
                step("Incline Push Up"),
                step("Push Up"),
                step("Diamond Push Up"),
                step("Archer Push Up"),
            ],
        ),
        Progression::new(
            "Ring Push Up",
            vec![
                step("Ring Push Up"),
                step("Ring Wide Push Up"),
                step("RTO Push Up"),
                step("RTO Archer Push Up"),
            ],
        ),
        Progression::new(
            "Pseudo Planche Push Up",
            vec![
                step("Pseudo Planche Push Up"),
                step("Ring Pseudo Planche Push Up"),
                step("Wall Pseudo Planche Push Up"),
                step("Ring Wall Pseudo Planche Push Up"),
            ],
        ),
        Progression::new(
            "Plank / One Arm Plank",
            vec![
                step("Plank"),
                step("One Arm Plank"),
                step("Straddle One Arm Plank"),
            ],
        ),
        Progression::new(
            "One Arm Push Up",
            vec![
                step("Incline One Arm Push Up"),
                step("Straddle One Arm Push Up"),
                step("One Arm Push Up"),
            ],
        ),
        Progression::new(
            "Frog/Crane → Elbow Lever",
            vec![
                step("Frog Stand / Crow Pose"),
                step("Straight Arm Frog Stand / Crane Pose"),
                step("Ring Frog Stand"),
                step("Bent Leg / Straddle Elbow Lever"),
                step("Elbow Lever"),
                step("One Arm Straight Elbow Lever"),
                step("One Arm Elbow Lever"),
            ],
        ),
        Progression::new(
            "Planche Progression",
            vec![
                step("Planche Lean"),
                step("Tuck Planche"),
                step("Advanced Tuck Planche"),
                step("Straddle Planche"),
                step("Full Planche"),
            ],
        ),
        Progression::new(
            "Maltese",
            vec![
                step("Ring Wall Maltese Push Up"),
                step("Wall Maltese Push Up"),
                step("Ring Maltese Push Up"),
                step("Maltese"),
            ],
        ),
        Progression::new(
            "Planche Push Up",
            vec![
                step("Tuck Planche Push Up"),
                step("Advanced Tuck Planche Push Up"),
                step("Straddle Planche Push Up"),
                step("Planche Push Up"),
            ],
        ),
        Progression::new(
            "Ring Planche",
            vec![
                step("Ring Tuck Planche"),
                step("Ring Straddle Planche"),
                step("Ring One Leg Planche"),
                step("Ring Planche"),
            ],
        ),
    ]
}

fn core_strength() -> Vec<Progression> {
    vec![
        Progression::new(
            "Posterior Chain (Extensions)",
            vec![
                step("Rev Hyperextension"),
                step("Hyperextension"),
                step("Arch Body Hold"),
            ],
        ),
        Progression::new(
            "Anti‑Rotation (Pallof)",
            vec![
                step("Banded Pallof Press"),
                step("Ring Pallof Press"),
            ],
        ),
        Progression::new(
            "Hollow & Compression",
            vec![
                step("Hollow Hold"),
                step("Tuck Up Crunch"),
                step("Seated Pike Leg Lift"),
            ],
        ),
        Progression::new(
            "Core Planks",
            vec![
                step("OA Plank"),
                step("OA OL Plank"),
            ],
        ),
        Progression::new(
            "HLR / T2B",
            vec![
                step("Hanging Knees to Chest"),
                step("Hanging Leg Raise / T2B"),
                step("Ankle Weight HLR / T2B"),
                step("One Arm HLR / T2B"),
            ],
        ),
        Progression::new(
            "Ab Wheel",
            vec![
                step("Knees Ab Wheel"),
                step("Straight Leg Ab Wheel (Ramp)"),
                step("Straight Leg Ab Wheel Negative"),
                step("Straight Leg Ab Wheel"),
                step("Weighted Ab Wheel"),
                step("One Arm Ab Wheel"),
            ],
        ),
        Progression::new(
            "Ring Ab Rollout",
            vec![
                step("Ring Ab Rollout"),
            ],
        ),
        Progression::new(
            "Dragon Flag",
            vec![
                step("Tuck Dragon Flag Negative"),
                step("Advanced Tuck Dragon Flag"),
                step("Straddle / One Leg Dragon Flag"),
                step("Dragon Flag"),
                step("Ankle Weight Dragon Flag"),
                step("One Arm Dragon Flag"),
            ],
        ),
    ]
}

fn legs() -> Vec<Progression> {
    vec![
        Progression::new(
            "Squat",
            vec![
                step("Assisted Squat"),
                step("Parallel Squat"),
                step("Full Squat"),
            ],
        ),
        Progression::new(
            "Split Squat",
            vec![
                step("Split Squat"),
                step("Bulgarian Split Squat"),
            ],
        ),
        Progression::new(
            "Step Up",
            vec![
                step("Step Up"),
                step("Deep Step Up"),
            ],
        ),
        Progression::new(
            "Pistol Squat",
            vec![
                step("Cossack Squat"),
                step("Partial Pistol Squat"),
                step("Assisted Pistol Squat"),
                step("Pistol Squat"),
                step("Weighted Pistol Squat"),
                step("Elevated Friction Pistol Squat"),
            ],
        ),
        Progression::new(
            "Shrimp Squat",
            vec![
                step("Beginner Shrimp Squat"),
                step("Intermediate Shrimp Squat"),
                step("Advanced Shrimp Squat"),
                step("Two Hand Shrimp Squat"),
                step("Elevated Two Hand Shrimp Squat"),
            ],
        ),
        Progression::new(
            "Nordic Curl",
            vec![
                step("Nordic Curl Negative"),
                step("Nordic Curl"),
                step("Nordic Curl (Arms Overhead)"),
                step("One Leg Nordic Curl"),
            ],
        ),
        Progression::new(
            "Single‑Leg Hinge",
            vec![
                step("One Leg Deadlift (OL Deadlift)"),
            ],
        ),
    ]
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_all_categories() {
        let template = build_default_template();
        assert_eq!(template.len(), 6);
        for category in Category::ALL {
            assert!(template.contains_key(&CategoryKey::Known(category)));
        }
    }

    #[test]
    fn test_template_counts() {
        let template = build_default_template();
        let progressions: usize = template.values().map(Vec::len).sum();
        assert_eq!(progressions, 42);
    }

    #[test]
    fn test_template_starts_locked() {
        let template = build_default_template();
        let unlocked = template
            .values()
            .flatten()
            .flat_map(|p| &p.steps)
            .filter(|s| s.is_unlocked)
            .count();
        assert_eq!(unlocked, 0);
    }

    #[test]
    fn test_default_template_validates() {
        let errors = validate_template(default_template());
        assert!(
            errors.is_empty(),
            "Default template has validation errors: {:?}",
            errors
        );
        assert!(validated_default_template().is_ok());
    }

    #[test]
    fn test_notes_survive() {
        let template = build_default_template();
        let pull = &template[&CategoryKey::Known(Category::VerticalPull)];
        let muscle_up = pull.iter().find(|p| p.title == "Muscle Up (post Pull Up)").unwrap();
        assert_eq!(
            muscle_up.step("Muscle Up").unwrap().note.as_deref(),
            Some("Recommended post 'Pullover'")
        );
    }

    #[test]
    fn test_duplicate_titles_flagged() {
        let mut template = build_default_template();
        let legs = template
            .get_mut(&CategoryKey::Known(Category::Legs))
            .unwrap();
        legs.push(Progression::new("Squat", vec![step("Box Squat")]));

        let errors = validate_template(&template);
        assert!(errors.iter().any(|e| e.contains("duplicate progression 'Squat'")));
    }

    #[test]
    fn test_duplicate_steps_flagged() {
        let mut template = build_default_template();
        let core = template
            .get_mut(&CategoryKey::Known(Category::Core))
            .unwrap();
        core.push(Progression::new("Holds", vec![step("Hollow Hold")]));

        let errors = validate_template(&template);
        assert!(errors.iter().any(|e| e.contains("duplicate step 'Hollow Hold'")));
    }

    #[test]
    fn test_missing_category_flagged() {
        let mut template = build_default_template();
        template.remove(&CategoryKey::Known(Category::Core));

        let errors = validate_template(&template);
        assert!(errors.iter().any(|e| e.contains("missing category 'Core'")));
    }
}
