// Local jokes and games. Always available, shown in this order.

pub(super) const JOKES: &[&str] = &[
    "Why did the banana go to the doctor? It wasn't peeling well.",
    "Why did the cookie cry? Its mother had been a wafer so long.",
    "Why don't eggs tell jokes? They'd crack each other up.",
    "I told my fridge a joke. It was a little cold, but it warmed up to me.",
    "Why did the tomato blush? It saw the salad dressing.",
    "What did the grape do when it got stepped on? It let out a little wine.",
];

pub(super) const GAMES: &[&str] = &[
    "Name an animal for every letter from A to G, as fast as you can.",
    "Count backwards from 100 in steps of 7.",
    "List five foods that are green, then five that are orange.",
    "Look around and find three things that are round and two that are soft.",
    "Think of a song title that starts with each letter of your name.",
];
