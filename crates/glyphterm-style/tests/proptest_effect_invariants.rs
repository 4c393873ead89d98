//! Property-based invariant tests for glyph effects and highlight rules.
//!
//! 1. Applying a cloned effect reproduces the original's sequence exactly.
//! 2. `a.and(b)` behaves exactly like applying `a` then `b`.
//! 3. Jitter offsets stay within their bounds.
//! 4. Cycle always resolves to a palette entry.
//! 5. Wave offsets never exceed the amplitude.
//! 6. Styling produces one glyph per character, and with no rules every glyph
//!    keeps the ambient style.

use glyphterm_render::Rgb;
use glyphterm_style::{Appearance, Axis, Effect, Glyph, Rule, RuleSet};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn palette_strategy() -> impl Strategy<Value = Vec<Rgb>> {
    prop::collection::vec(any::<u32>().prop_map(Rgb::from_u32), 1..8)
}

fn leaf_strategy() -> impl Strategy<Value = Effect> {
    prop_oneof![
        any::<u32>().prop_map(Effect::color),
        (-2.0f64..2.0, palette_strategy())
            .prop_map(|(speed, palette)| Effect::cycle(speed, palette).unwrap()),
        any::<u64>().prop_map(|seed| Effect::random().with_seed(seed)),
        (0u16..20, 0u16..20, any::<u64>())
            .prop_map(|(x, y, seed)| Effect::jitter(x, y).with_seed(seed)),
        (0.0f64..16.0, 0.0f64..4.0, -1.0f64..1.0, any::<bool>()).prop_map(
            |(a, f, s, vertical)| {
                let axis = if vertical { Axis::Vertical } else { Axis::Horizontal };
                Effect::wave(a, f, s, axis).unwrap()
            }
        ),
    ]
}

fn run(effect: &mut Effect, ticks: usize) -> Vec<Appearance> {
    let mut look = Appearance::default();
    (0..ticks)
        .map(|_| {
            effect.apply(&mut look, 1.0);
            look
        })
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Clone determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clone_is_deterministic(effect in leaf_strategy(), warmup in 0usize..10, ticks in 1usize..40) {
        let mut original = effect;
        run(&mut original, warmup);
        let mut copy = original.clone();
        prop_assert_eq!(run(&mut original, ticks), run(&mut copy, ticks));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Multi equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn and_matches_sequential_application(
        a in leaf_strategy(),
        b in leaf_strategy(),
        ticks in 1usize..30,
    ) {
        let mut composed = a.clone().and(b.clone());
        let (mut a, mut b) = (a, b);
        let mut look = Appearance::default();
        let mut expected = Vec::new();
        for _ in 0..ticks {
            a.apply(&mut look, 1.0);
            b.apply(&mut look, 1.0);
            expected.push(look);
        }
        prop_assert_eq!(run(&mut composed, ticks), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Jitter bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn jitter_within_bounds(mx in 0u16..100, my in 0u16..100, seed in any::<u64>()) {
        let mut effect = Effect::jitter(mx, my).with_seed(seed);
        for look in run(&mut effect, 64) {
            prop_assert!(look.offset_x.abs() <= i32::from(mx));
            prop_assert!(look.offset_y.abs() <= i32::from(my));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Cycle stays in palette
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cycle_resolves_to_palette(
        speed in -3.0f64..3.0,
        phase in -50.0f64..50.0,
        palette in palette_strategy(),
    ) {
        let mut effect = Effect::cycle_from(speed, palette.clone(), phase).unwrap();
        for look in run(&mut effect, 32) {
            prop_assert!(palette.contains(&look.color));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Wave amplitude bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wave_within_amplitude(
        amplitude in 0.0f64..64.0,
        frequency in -8.0f64..8.0,
        speed in -2.0f64..2.0,
    ) {
        let mut effect = Effect::wave(amplitude, frequency, speed, Axis::Vertical).unwrap();
        let bound = amplitude.round() as i32;
        for look in run(&mut effect, 32) {
            prop_assert!(look.offset_y.abs() <= bound);
            prop_assert_eq!(look.offset_x, 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Styling
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_glyph_per_char(text in "\\PC{0,40}", pattern in "[a-z]{1,3}") {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("p", &pattern, Effect::RED, true).unwrap());
        let glyphs = rules.styled(&text, &Effect::WHITE, false);
        prop_assert_eq!(glyphs.len(), text.chars().count());
        let chars: String = glyphs.iter().map(Glyph::ch).collect();
        prop_assert_eq!(chars, text);
    }
}

proptest! {
    #[test]
    fn no_rules_keeps_ambient(text in "[ -~]{0,40}", invert in any::<bool>()) {
        let rules = RuleSet::new();
        let mut glyphs = rules.styled(&text, &Effect::GREEN, invert);
        for glyph in &mut glyphs {
            glyph.update(1.0);
            prop_assert_eq!(glyph.color(), Rgb::GREEN);
            prop_assert_eq!(glyph.invert(), invert);
        }
    }
}
