// Built-in fact tables. Order within a topic is the order facts are offered.

use super::KnowledgeFact;
use super::KnowledgeFact as F;
use super::Specialization::{Diet, Goal as ForGoal, Mood as ForMood, Workout};
use crate::intent::Mood;
use crate::profile::{Goal, WorkoutKind};

pub(super) const NUTRITION_FACTS: &[KnowledgeFact] = &[
    // Macronutrients
    F::new(
        "protein",
        "Protein repairs and builds tissue; most adults need at least 0.8 g per kg of body weight each day.",
    ),
    F::new(
        "protein",
        "Spreading protein across meals (about 20-40 g each) supports muscle protein synthesis better than one large serving.",
    ),
    F::special(
        "protein",
        ForGoal(Goal::MuscleGain),
        "For muscle gain, aim for 1.6-2.2 g of protein per kg of body weight daily alongside progressive resistance training.",
    ),
    F::special(
        "protein",
        ForGoal(Goal::WeightLoss),
        "While losing weight, 1.2-1.6 g of protein per kg helps preserve lean mass and keeps you fuller for longer.",
    ),
    F::special(
        "protein",
        Diet("vegetarian"),
        "Vegetarian protein sources include dhal, chickpeas, tofu, tempeh, eggs, Greek yogurt and paneer; pair legumes with grains for a complete amino acid profile.",
    ),
    F::special(
        "protein",
        Diet("vegan"),
        "Vegan protein comes from soy, lentils, chickpeas, seitan and peanut butter; add a reliable vitamin B12 source.",
    ),
    F::new(
        "carbohydrates",
        "Carbohydrates are the body's preferred fuel for high-intensity activity and the brain.",
    ),
    F::new(
        "carbohydrates",
        "Choose whole grains, red rice, oats and legumes over refined starches for steadier energy and more fibre.",
    ),
    F::special(
        "carbohydrates",
        ForGoal(Goal::WeightLoss),
        "When cutting calories, keep carbohydrates around training and lean on vegetables for volume at other meals.",
    ),
    F::special(
        "carbohydrates",
        ForGoal(Goal::MuscleGain),
        "Building muscle goes better with 4-7 g of carbohydrate per kg to fuel training and recovery.",
    ),
    F::new(
        "fats",
        "Dietary fat supports hormone production and the absorption of vitamins A, D, E and K.",
    ),
    F::new(
        "fats",
        "Favour unsaturated fats from fish, seeds, avocado and olive oil, and keep saturated fat under 10% of calories.",
    ),
    F::new(
        "hydration",
        "Aim for roughly 30-35 ml of water per kg of body weight daily, more in hot weather.",
    ),
    F::new(
        "hydration",
        "Pale yellow urine is a simple sign of good hydration.",
    ),
    F::special(
        "hydration",
        Workout(WorkoutKind::Cardio),
        "After long cardio sessions, replace fluids with about 1.5 times the weight lost and include some sodium.",
    ),
    F::new(
        "workout",
        "A meal with carbohydrate and some protein 2-3 hours before training improves performance.",
    ),
    F::new(
        "workout",
        "Within two hours after training, combine 20-40 g of protein with carbohydrate to support recovery.",
    ),
    F::special(
        "workout",
        Workout(WorkoutKind::Cardio),
        "After cardio, prioritise carbohydrate to refill glycogen, for example rice, fruit or bread.",
    ),
    F::special(
        "workout",
        Workout(WorkoutKind::Strength),
        "After strength training, a protein-rich meal with about 0.3 g protein per kg helps muscle repair.",
    ),
    F::special(
        "workout",
        Workout(WorkoutKind::Hiit),
        "HIIT burns through glycogen quickly; a snack with fast carbohydrate and protein aids recovery.",
    ),
    F::special(
        "workout",
        Workout(WorkoutKind::Flexibility),
        "Yoga and stretching sessions need little extra fuel; a normal balanced meal and water are enough.",
    ),
    // Goals
    F::new(
        "weight_loss",
        "A moderate deficit of about 300-500 kcal a day supports steady, sustainable weight loss.",
    ),
    F::new(
        "weight_loss",
        "Filling half the plate with vegetables adds volume and fibre for very few calories.",
    ),
    F::new(
        "weight_gain",
        "A surplus of about 300-500 kcal a day supports gradual weight gain.",
    ),
    F::new(
        "weight_gain",
        "Energy-dense foods like nuts, dried fruit and whole milk make a surplus easier to reach.",
    ),
    F::new(
        "muscle_gain",
        "Muscle gain needs a small calorie surplus, enough protein and progressive overload in training.",
    ),
    F::new(
        "muscle_gain",
        "Sleep of 7-9 hours is when most muscle repair happens.",
    ),
    F::new(
        "maintenance",
        "To maintain weight, match intake to expenditure and check trends weekly rather than daily.",
    ),
    F::new(
        "maintenance",
        "Consistent meal timing helps keep energy and appetite stable.",
    ),
    F::new(
        "calories",
        "Calorie needs depend on age, size and activity; tracking a few typical days gives a useful baseline.",
    ),
    F::new(
        "fiber",
        "Adults benefit from 25-30 g of fibre a day from vegetables, fruit, legumes and whole grains.",
    ),
    F::new(
        "sugar",
        "Keep added sugar under 10% of daily calories; sweet drinks are the easiest place to cut.",
    ),
    F::new(
        "vitamins",
        "A colourful variety of vegetables and fruit covers most vitamin needs without supplements.",
    ),
    F::new(
        "sleep",
        "Short sleep increases appetite hormones, so a regular bedtime supports nutrition goals.",
    ),
    // Planning
    F::new(
        "meal_planning",
        "Plan meals around a protein source, a vegetable, a whole-grain carbohydrate and a little healthy fat.",
    ),
    F::new(
        "meal_planning",
        "Batch-cooking grains and legumes twice a week makes balanced meals quick on busy days.",
    ),
    F::new(
        "sri_lankan",
        "Rice and curry is balanced when the plate is half vegetables, a quarter rice and a quarter dhal, fish or chicken.",
    ),
    F::new(
        "sri_lankan",
        "Swap white rice for red or brown rice and use less coconut milk to lower calories while keeping flavour.",
    ),
    F::new(
        "sri_lankan",
        "Gotu kola sambol and mallung add greens and fibre; hoppers and kottu are best as occasional meals.",
    ),
    F::new(
        "balance",
        "No single food makes or breaks a diet; overall patterns over weeks matter most.",
    ),
    F::new(
        "balance",
        "Aim for mostly whole, minimally processed foods while leaving room for foods you enjoy.",
    ),
];

pub(super) const MOOD_FACTS: &[KnowledgeFact] = &[
    // Sad
    F::special(
        "talking_point",
        ForMood(Mood::Sad),
        "It's okay to have low days; naming the feeling is already a step toward easing it.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Sad),
        "Step outside for a 10-minute walk in daylight.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Sad),
        "Send a short message to someone you trust.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Sad),
        "Write down three small things that went okay today.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Sad),
        "Place a hand on your chest, breathe slowly and say to yourself: this is hard, and I'm doing my best.",
    ),
    F::special(
        "music",
        ForMood(Mood::Sad),
        "Here Comes the Sun - The Beatles",
    ),
    F::special("music", ForMood(Mood::Sad), "Lovely Day - Bill Withers"),
    // Anxious
    F::special(
        "talking_point",
        ForMood(Mood::Anxious),
        "Anxiety is your body trying to protect you; slowing the breath tells it you're safe.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Anxious),
        "Try the 5-4-3-2-1 grounding exercise: name 5 things you see, 4 you feel, 3 you hear, 2 you smell, 1 you taste.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Anxious),
        "Write down what's worrying you, then one small thing you can control about it.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Anxious),
        "Take a slow walk and focus on the feeling of each step.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Anxious),
        "Box breathing: inhale for 4 seconds, hold for 4, exhale for 4, hold for 4, and repeat four times.",
    ),
    F::special("music", ForMood(Mood::Anxious), "Weightless - Marconi Union"),
    F::special("music", ForMood(Mood::Anxious), "Clair de Lune - Claude Debussy"),
    // Angry
    F::special(
        "talking_point",
        ForMood(Mood::Angry),
        "Anger often points at something that matters to you; give it a moment before acting on it.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Angry),
        "Do a short burst of physical activity, like 20 jumping jacks or a brisk walk.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Angry),
        "Write an unsent letter saying everything you feel, then tear it up.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Angry),
        "Breathe in for 4 counts and out for 8 counts, ten times, letting your shoulders drop on each exhale.",
    ),
    F::special("music", ForMood(Mood::Angry), "Breathe Me - Sia"),
    F::special("music", ForMood(Mood::Angry), "Orinoco Flow - Enya"),
    // Stressed
    F::special(
        "talking_point",
        ForMood(Mood::Stressed),
        "When everything feels urgent, picking just the next small step makes the load lighter.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Stressed),
        "List everything on your mind, then circle only the one task for the next hour.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Stressed),
        "Stretch your neck, shoulders and back for five minutes.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Stressed),
        "Progressive relaxation: tense each muscle group for 5 seconds, then release, from your toes to your face.",
    ),
    F::special("music", ForMood(Mood::Stressed), "Sunset Lover - Petit Biscuit"),
    F::special("music", ForMood(Mood::Stressed), "Gymnopedie No.1 - Erik Satie"),
    // Happy
    F::special(
        "talking_point",
        ForMood(Mood::Happy),
        "Good days are worth savouring; noticing what made today good helps you repeat it.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Happy),
        "Share the good news with a friend.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Happy),
        "Pause for thirty seconds and notice exactly where in your body you feel good.",
    ),
    F::special("music", ForMood(Mood::Happy), "Walking on Sunshine - Katrina and the Waves"),
    // Neutral
    F::special(
        "talking_point",
        ForMood(Mood::Neutral),
        "Steady days are a good time to build small habits.",
    ),
    F::special(
        "activity",
        ForMood(Mood::Neutral),
        "Drink a glass of water and take a short stretch break.",
    ),
    F::special(
        "mindfulness",
        ForMood(Mood::Neutral),
        "Take three slow breaths and notice the sounds around you.",
    ),
    F::special("music", ForMood(Mood::Neutral), "Banana Pancakes - Jack Johnson"),
];
