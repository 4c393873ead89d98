#![forbid(unsafe_code)]

//! Regex-driven highlight rules.
//!
//! A [`RuleSet`] is consulted once per write: every rule's pattern is run
//! over the text, and each character takes the effect and inversion of the
//! first rule (in insertion order) whose match covers it. Characters no rule
//! covers keep the ambient style. Replacing a rule by name keeps its
//! position, so precedence only changes through removal and re-insertion.

use std::ops::Range;

use regex::Regex;

use crate::effect::Effect;
use crate::error::StyleError;
use crate::glyph::Glyph;

/// A named pattern with the style it applies.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Regex,
    effect: Effect,
    invert: bool,
}

impl Rule {
    /// Compile `pattern` into a rule.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        effect: Effect,
        invert: bool,
    ) -> Result<Self, StyleError> {
        let name = name.into();
        match Regex::new(pattern) {
            Ok(pattern) => Ok(Self::from_regex(name, pattern, effect, invert)),
            Err(source) => Err(StyleError::InvalidPattern { name, source }),
        }
    }

    /// Build a rule from an already compiled pattern.
    pub fn from_regex(name: impl Into<String>, pattern: Regex, effect: Effect, invert: bool) -> Self {
        Self {
            name: name.into(),
            pattern,
            effect,
            invert,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    /// Replace the rule's effect.
    pub fn set_effect(&mut self, effect: Effect) {
        self.effect = effect;
    }

    /// Compose `extra` after the rule's current effect.
    pub fn and_effect(&mut self, extra: Effect) {
        let current = std::mem::take(&mut self.effect);
        self.effect = current.and(extra);
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    /// Byte ranges of every non-empty match in `text`.
    fn ranges(&self, text: &str) -> Vec<Range<usize>> {
        self.pattern
            .find_iter(text)
            .map(|m| m.range())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

/// Insertion-ordered, name-keyed rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `rule`, replacing (in place) any rule with the same name.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        if let Some(slot) = self.rules.iter_mut().find(|r| r.name == rule.name) {
            glyphterm_core::debug!(name = %rule.name, "highlight rule replaced");
            return Some(std::mem::replace(slot, rule));
        }
        glyphterm_core::debug!(name = %rule.name, "highlight rule added");
        self.rules.push(rule);
        None
    }

    pub fn remove(&mut self, name: &str) -> Option<Rule> {
        let index = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Style `text` into glyphs.
    ///
    /// Each character gets a fresh instance of the effect chosen for it: the
    /// first covering rule's, or `ambient`/`ambient_invert` when none match.
    pub fn styled(&self, text: &str, ambient: &Effect, ambient_invert: bool) -> Vec<Glyph> {
        if self.rules.is_empty() {
            return Glyph::run(text, ambient, ambient_invert);
        }

        let matches: Vec<Vec<Range<usize>>> = self.rules.iter().map(|r| r.ranges(text)).collect();
        // Per-rule index of the first range that has not ended yet.
        let mut cursors = vec![0usize; matches.len()];

        text.char_indices()
            .map(|(at, ch)| {
                let mut chosen = None;
                for (k, ranges) in matches.iter().enumerate() {
                    let cursor = &mut cursors[k];
                    while *cursor < ranges.len() && ranges[*cursor].end <= at {
                        *cursor += 1;
                    }
                    if chosen.is_none() && ranges.get(*cursor).is_some_and(|r| r.start <= at) {
                        chosen = Some(k);
                    }
                }
                match chosen {
                    Some(k) => {
                        let rule = &self.rules[k];
                        Glyph::new(ch, rule.effect.fresh(), rule.invert)
                    }
                    None => Glyph::new(ch, ambient.fresh(), ambient_invert),
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl Extend<Rule> for RuleSet {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, iter: I) {
        for rule in iter {
            self.insert(rule);
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphterm_render::Rgb;

    fn colors(glyphs: &mut [Glyph]) -> Vec<Rgb> {
        glyphs
            .iter_mut()
            .map(|g| {
                g.update(1.0);
                g.color()
            })
            .collect()
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = Rule::new("bad", "[", Effect::RED, false).unwrap_err();
        assert!(matches!(err, StyleError::InvalidPattern { ref name, .. } if name == "bad"));
    }

    #[test]
    fn matched_chars_take_rule_style() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("num", r"\d+", Effect::RED, true).unwrap());
        let mut glyphs = rules.styled("a12b", &Effect::WHITE, false);
        assert_eq!(
            colors(&mut glyphs),
            vec![Rgb::WHITE, Rgb::RED, Rgb::RED, Rgb::WHITE]
        );
        let inverted: Vec<bool> = glyphs.iter().map(Glyph::invert).collect();
        assert_eq!(inverted, vec![false, true, true, false]);
    }

    #[test]
    fn first_inserted_rule_wins_overlap() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("word", r"[a-z]+", Effect::GREEN, false).unwrap());
        rules.insert(Rule::new("vowel", r"[aeiou]", Effect::BLUE, false).unwrap());
        let mut glyphs = rules.styled("hi A", &Effect::WHITE, false);
        assert_eq!(
            colors(&mut glyphs),
            vec![Rgb::GREEN, Rgb::GREEN, Rgb::WHITE, Rgb::WHITE]
        );
    }

    #[test]
    fn later_rule_covers_what_earlier_misses() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("x", "x", Effect::RED, false).unwrap());
        rules.insert(Rule::new("any", ".", Effect::BLUE, false).unwrap());
        let mut glyphs = rules.styled("axb", &Effect::WHITE, false);
        assert_eq!(colors(&mut glyphs), vec![Rgb::BLUE, Rgb::RED, Rgb::BLUE]);
    }

    #[test]
    fn replacing_keeps_position() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("a", "a", Effect::RED, false).unwrap());
        rules.insert(Rule::new("b", "b", Effect::BLUE, false).unwrap());
        let old = rules.insert(Rule::new("a", "z", Effect::GREEN, false).unwrap());
        assert_eq!(old.map(|r| r.pattern().as_str().to_string()), Some("a".into()));
        let names: Vec<&str> = rules.iter().map(Rule::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn styling_same_text_twice_matches() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("num", r"\d+", Effect::RED, true).unwrap());
        rules.insert(Rule::new("word", r"[a-z]+", Effect::GREEN, false).unwrap());
        let text = "ab 12 cd3";
        let first = rules.styled(text, &Effect::WHITE, false);
        let second = rules.styled(text, &Effect::WHITE, false);
        assert_eq!(first, second);
    }

    #[test]
    fn multibyte_text_aligns_with_chars() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("e", "é+", Effect::RED, false).unwrap());
        let mut glyphs = rules.styled("aééb", &Effect::WHITE, false);
        assert_eq!(glyphs.len(), 4);
        assert_eq!(
            colors(&mut glyphs),
            vec![Rgb::WHITE, Rgb::RED, Rgb::RED, Rgb::WHITE]
        );
    }

    #[test]
    fn empty_matches_cover_nothing() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("empty", "z*", Effect::RED, false).unwrap());
        let mut glyphs = rules.styled("ab", &Effect::WHITE, false);
        assert_eq!(colors(&mut glyphs), vec![Rgb::WHITE, Rgb::WHITE]);
    }

    #[test]
    fn remove_get_contains() {
        let mut rules: RuleSet = [
            Rule::new("a", "a", Effect::RED, false).unwrap(),
            Rule::new("b", "b", Effect::BLUE, false).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(rules.len(), 2);
        assert!(rules.contains("a"));
        assert!(rules.remove("a").is_some());
        assert!(rules.remove("a").is_none());
        assert!(!rules.contains("a"));
        assert_eq!(rules.get("b").map(Rule::invert), Some(false));
        rules.clear();
        assert!(rules.is_empty());
    }

    #[test]
    fn and_effect_composes() {
        let mut rule = Rule::new("a", "a", Effect::RED, false).unwrap();
        rule.and_effect(Effect::jitter(1, 0));
        match rule.effect() {
            Effect::Multi(members) => assert_eq!(members.len(), 2),
            other => panic!("expected Multi, got {other:?}"),
        }
    }

    #[test]
    fn each_char_gets_fresh_effect() {
        let mut rules = RuleSet::new();
        let cycle = Effect::cycle(1.0, [Rgb::RED, Rgb::BLUE]).unwrap();
        rules.insert(Rule::new("all", ".+", cycle, false).unwrap());
        let mut glyphs = rules.styled("ab", &Effect::WHITE, false);
        assert_eq!(colors(&mut glyphs), vec![Rgb::RED, Rgb::RED]);
    }
}
