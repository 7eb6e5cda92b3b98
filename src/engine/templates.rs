//! Local response templates
//!
//! The local path always succeeds. It picks the template for the intent,
//! personalises the intro with the goal and activity phrases, adds the
//! retrieved facts and a few context notes, and closes with a follow-up.
//! Parts are joined with a blank line.

use crate::engine::context::CoachContext;
use crate::intent::Intent;
use crate::knowledge::retrieval::mentions_allergen;
use crate::knowledge::KnowledgeFact;
use crate::profile::{ExternalEvent, Goal};

/// Separator between response parts
pub const PART_SEPARATOR: &str = "\n\n";

/// Intro and ordered tips for one intent
#[derive(Debug, Clone, Copy)]
pub struct Template {
    /// Intro line; `{goal}` and `{activity}` are substituted
    pub intro: &'static str,
    /// Tips in the order they are shown
    pub tips: &'static [&'static str],
}

/// Template for `intent`; `General` doubles as the generic template
pub fn template_for(intent: Intent) -> Template {
    match intent {
        Intent::ProteinInquiry => Template {
            intro: "Protein matters a lot when you're focused on {goal}. As someone {activity}, here's how to get it right:",
            tips: &[
                "Include a palm-sized protein source at every meal.",
                "Mix animal and plant proteins such as fish, eggs, dhal and chickpeas.",
                "Have a protein-rich snack after training.",
            ],
        },
        Intent::CarbInquiry => Template {
            intro: "Carbohydrates fuel your day. For {goal} while staying {activity}, focus on quality and timing:",
            tips: &[
                "Build meals around whole grains like red rice, oats or whole-wheat roti.",
                "Keep refined sugar and sweet drinks occasional.",
                "Time most of your carbohydrates around your workouts.",
            ],
        },
        Intent::FatInquiry => Template {
            intro: "Healthy fats support hormones and vitamin absorption. Here's how they fit {goal}:",
            tips: &[
                "Use small amounts of oil and measure coconut milk rather than pouring.",
                "Eat oily fish like sardines or mackerel twice a week.",
                "Snack on a small handful of seeds instead of fried foods.",
            ],
        },
        Intent::Hydration => Template {
            intro: "Staying hydrated helps energy, digestion and training. For someone {activity}:",
            tips: &[
                "Start the day with a glass of water.",
                "Keep a bottle nearby and sip through the day.",
                "King coconut water is a good option after sweating heavily.",
            ],
        },
        Intent::WorkoutNutrition => Template {
            intro: "Fuelling around training makes a big difference for {goal}. Since you're {activity}:",
            tips: &[
                "Eat a carbohydrate-rich meal 2-3 hours before training.",
                "Have protein and carbohydrate within two hours after.",
                "Drink water before, during and after your session.",
            ],
        },
        Intent::WeightLoss => Template {
            intro: "Sustainable weight loss comes from small, steady changes. As someone {activity}:",
            tips: &[
                "Aim for a moderate calorie deficit rather than skipping meals.",
                "Fill half your plate with vegetables.",
                "Keep protein high to stay full and protect muscle.",
            ],
        },
        Intent::WeightGain => Template {
            intro: "Gaining weight healthily means eating a bit more, consistently. Since you're {activity}:",
            tips: &[
                "Add an extra snack or meal each day.",
                "Choose energy-dense foods like nuts, bananas and whole milk.",
                "Pair the surplus with strength training so it becomes muscle.",
            ],
        },
        Intent::MuscleGain => Template {
            intro: "Building muscle takes training, protein and recovery together. As someone {activity}:",
            tips: &[
                "Eat slightly above maintenance calories.",
                "Spread protein across four meals.",
                "Sleep 7-9 hours so your muscles can repair.",
            ],
        },
        Intent::MealPlanning => Template {
            intro: "A little planning makes {goal} much easier. Here's a simple approach:",
            tips: &[
                "Plan the week's main meals on one day.",
                "Cook grains and legumes in batches.",
                "Keep quick balanced options ready for busy evenings.",
            ],
        },
        Intent::SriLankanFood => Template {
            intro: "Sri Lankan food can fit {goal} nicely with a few tweaks:",
            tips: &[
                "Make vegetables and mallung the largest part of your rice and curry.",
                "Choose red rice or string hoppers over white bread.",
                "Go easy on coconut milk and fried sides like papadam.",
            ],
        },
        Intent::General => Template {
            intro: "Happy to help with your nutrition. With your focus on {goal} and being {activity}, here are some basics:",
            tips: &[
                "Eat regular meals built around vegetables, protein and whole grains.",
                "Drink water through the day.",
                "Keep treats as treats rather than daily habits.",
            ],
        },
    }
}

/// Daily protein guidance in g/kg for a goal
pub fn protein_range(goal: Goal) -> (f64, f64) {
    match goal {
        Goal::MuscleGain => (1.6, 2.2),
        Goal::WeightLoss => (1.2, 1.6),
        Goal::WeightGain => (1.4, 1.8),
        Goal::Maintenance => (1.0, 1.2),
    }
}

/// Numeric protein suggestion line
///
/// # Examples
///
/// ```
/// use coachkit::engine::templates::protein_line;
/// use coachkit::profile::Goal;
///
/// assert!(protein_line(Goal::MuscleGain, Some(70.0)).contains("112-154 g"));
/// assert!(protein_line(Goal::MuscleGain, None).contains("1.6-2.2 g"));
/// ```
pub fn protein_line(goal: Goal, weight_kg: Option<f64>) -> String {
    let (low, high) = protein_range(goal);
    match weight_kg.filter(|w| *w > 0.0) {
        Some(weight) => format!(
            "Protein target: {:.1}-{:.1} g per kg of body weight daily, which is about {:.0}-{:.0} g a day at {:.0} kg.",
            low,
            high,
            low * weight,
            high * weight,
            weight
        ),
        None => format!(
            "Protein target: {:.1}-{:.1} g per kg of body weight daily.",
            low, high
        ),
    }
}

/// Composes the local response for a context and its retrieved facts
pub fn compose_local(context: &CoachContext, facts: &[KnowledgeFact]) -> String {
    let template = template_for(context.intent);
    let mut parts: Vec<String> = Vec::new();

    let mut intro = template
        .intro
        .replace("{goal}", context.goal_phrase())
        .replace("{activity}", context.activity_phrase());
    if let Some(name) = context.profile.name.as_deref().filter(|n| !n.trim().is_empty()) {
        intro = format!("Hi {}! {}", name.trim(), intro);
    }
    parts.push(intro);

    let allergies = &context.profile.allergies;
    let tips: Vec<&str> = template
        .tips
        .iter()
        .copied()
        .filter(|tip| !allergies.iter().any(|a| mentions_allergen(tip, a)))
        .collect();
    if !tips.is_empty() {
        parts.push(bullets(tips.into_iter()));
    }

    if matches!(context.intent, Intent::ProteinInquiry | Intent::MuscleGain) {
        parts.push(protein_line(context.profile.goal, context.profile.weight_kg));
    }

    if !facts.is_empty() {
        parts.push(format!(
            "Good to know:\n{}",
            bullets(facts.iter().map(|f| f.content))
        ));
    }

    if let Some(note) = workout_note(context) {
        parts.push(note);
    }

    if let Some(average) = context.average_calories() {
        parts.push(format!(
            "Your recent logs average about {:.0} kcal per entry.",
            average
        ));
    }

    if let Some(note) = personalization_note(context) {
        parts.push(note);
    }

    parts.push(follow_up(context.intent).to_string());
    parts.join(PART_SEPARATOR)
}

fn bullets<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|item| format!("• {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn workout_note(context: &CoachContext) -> Option<String> {
    match &context.event {
        Some(ExternalEvent::WorkoutCompleted {
            activity,
            duration_minutes,
            calories_burned,
        }) => {
            let mut note = format!(
                "Nice work on your {}-minute {} session",
                duration_minutes, activity
            );
            if let Some(burned) = calories_burned {
                note.push_str(&format!(" (about {:.0} kcal burned)", burned));
            }
            note.push_str("; your next meal is a good time to refuel.");
            Some(note)
        }
        None => None,
    }
}

fn personalization_note(context: &CoachContext) -> Option<String> {
    let profile = &context.profile;
    let mut sentences = Vec::new();
    let allergies = join_list(&profile.allergies);
    if !allergies.is_empty() {
        sentences.push(format!(
            "Since you're allergic to {}, I've left out suggestions that contain them; always check labels.",
            allergies
        ));
    }
    let restrictions = join_list(&profile.dietary_restrictions);
    if !restrictions.is_empty() {
        sentences.push(format!(
            "These suggestions keep your {} preferences in mind.",
            restrictions
        ));
    }
    if sentences.is_empty() {
        None
    } else {
        Some(sentences.join(" "))
    }
}

fn follow_up(intent: Intent) -> &'static str {
    if intent.is_general() {
        "Would you like to ask about protein, meal planning, hydration or Sri Lankan dishes next?"
    } else {
        "Would you like a sample meal plan that puts this into practice?"
    }
}

/// Joins items as "a", "a and b" or "a, b and c"
fn join_list(items: &[String]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    match items.as_slice() {
        [] => String::new(),
        [one] => one.to_string(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}
