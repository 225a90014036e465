//! Skill system: levels, experience, practice, and effectiveness.
//!
//! Every agent tracks one [`Skill`] per [`SkillType`]. Experience comes from
//! completed actions and from deliberate practice; accumulating enough of
//! it raises the level.
//!
//! # Level-Up Formula
//!
//! XP required to advance from level L to L+1 is
//! `base_xp_per_level * xp_scaling^L`. With the stock curve (100, 1.5)
//! level 0 to 1 takes 100 XP, 1 to 2 takes 150, 2 to 3 takes 225.
//! Reaching `max_level` discards any leftover experience.
//!
//! # Practice
//!
//! Practice yields `hours * base_xp_per_hour / (1 + level * 0.1)`, so
//! skilled agents learn more slowly.
//!
//! # Effectiveness
//!
//! `0.5 + (level / max_level) * 1.5`: a linear multiplier from 0.5 at
//! level 0 to 2.0 at max level.

use std::collections::BTreeMap;

use lifesim_types::{SkillRecord, SkillType};
use tracing::debug;

use crate::config::{SkillConfig, SkillsConfig};
use crate::events::{EventHub, Observer, SkillEvent, SkillEventKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Practice XP multiplier lost per level (diminishing returns).
const PRACTICE_FALLOFF_PER_LEVEL: f64 = 0.1;

/// Effectiveness multiplier at level 0.
const MIN_EFFECTIVENESS: f64 = 0.5;

/// Effectiveness gained between level 0 and max level.
const EFFECTIVENESS_SPAN: f64 = 1.5;

/// XP per practice hour used when the caller has no better figure.
pub const DEFAULT_PRACTICE_XP_PER_HOUR: f64 = 10.0;

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// Progress in a single skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skill {
    /// Which skill this is.
    pub skill_type: SkillType,
    /// Progression curve.
    pub config: SkillConfig,
    level: u32,
    experience: f64,
    total_practice_time: f64,
}

impl Skill {
    /// Create an untrained skill.
    pub const fn new(skill_type: SkillType, config: SkillConfig) -> Self {
        Self {
            skill_type,
            config,
            level: 0,
            experience: 0.0,
            total_practice_time: 0.0,
        }
    }

    /// Current level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience toward the next level.
    pub const fn experience(&self) -> f64 {
        self.experience
    }

    /// Hours spent practicing.
    pub const fn total_practice_time(&self) -> f64 {
        self.total_practice_time
    }

    /// Whether the skill is at its maximum level.
    pub const fn is_maxed(&self) -> bool {
        self.level >= self.config.max_level
    }

    /// XP needed to advance from the current level.
    pub fn xp_for_current_level(&self) -> f64 {
        if self.level == 0 {
            return self.config.base_xp_per_level;
        }
        let exponent = i32::try_from(self.level).unwrap_or(i32::MAX);
        self.config.base_xp_per_level * self.config.xp_scaling.powi(exponent)
    }

    /// Fraction of the way to the next level; 1.0 when maxed.
    pub fn xp_progress(&self) -> f64 {
        if self.is_maxed() {
            return 1.0;
        }
        let needed = self.xp_for_current_level();
        if needed <= 0.0 {
            return 0.0;
        }
        (self.experience / needed).min(1.0)
    }

    /// Linear performance multiplier from 0.5 (level 0) to 2.0 (max level).
    pub fn effectiveness(&self) -> f64 {
        if self.config.max_level == 0 {
            return MIN_EFFECTIVENESS + EFFECTIVENESS_SPAN;
        }
        let ratio = f64::from(self.level) / f64::from(self.config.max_level);
        MIN_EFFECTIVENESS + ratio.min(1.0) * EFFECTIVENESS_SPAN
    }

    /// Add experience and return the number of levels gained.
    ///
    /// A maxed skill ignores the call. Negative amounts reduce experience
    /// toward zero but never lower the level.
    pub fn add_experience(&mut self, amount: f64) -> u32 {
        if self.is_maxed() || !amount.is_finite() {
            return 0;
        }
        self.experience = (self.experience + amount).max(0.0);

        let start_level = self.level;
        loop {
            if self.is_maxed() {
                // At max level, zero out remaining XP
                self.experience = 0.0;
                break;
            }
            let threshold = self.xp_for_current_level();
            if threshold <= 0.0 || self.experience < threshold {
                break;
            }
            self.experience -= threshold;
            self.level = self.level.saturating_add(1);
        }
        self.level.saturating_sub(start_level)
    }

    /// XP that `hours` of practice would grant at the current level.
    pub fn practice_xp(&self, hours: f64, base_xp_per_hour: f64) -> f64 {
        let falloff = f64::from(self.level).mul_add(PRACTICE_FALLOFF_PER_LEVEL, 1.0);
        hours.max(0.0) * base_xp_per_hour / falloff
    }

    /// Lose `dt` hours of experience decay. Levels never drop.
    pub fn decay(&mut self, dt: f64) {
        if self.config.decay_rate > 0.0 && dt > 0.0 {
            self.experience = (self.experience - self.config.decay_rate * dt).max(0.0);
        }
    }

    /// Serialized form.
    pub const fn to_record(&self) -> SkillRecord {
        SkillRecord {
            level: self.level,
            experience: self.experience,
            total_practice_time: self.total_practice_time,
        }
    }

    /// Load state from a record, clamping the level to `max_level`.
    ///
    /// Experience at or above the level threshold is carried into further
    /// levels, so the restored skill always sits below its next threshold
    /// (or at zero experience when maxed).
    pub fn restore(&mut self, record: &SkillRecord) {
        self.level = record.level.min(self.config.max_level);
        self.experience = 0.0;
        self.add_experience(record.experience);
        self.total_practice_time = record.total_practice_time.max(0.0);
    }
}

// ---------------------------------------------------------------------------
// SkillSystem
// ---------------------------------------------------------------------------

/// Per-agent skill tracking with XP accumulation and level-up mechanics.
///
/// Holds one [`Skill`] per [`SkillType`], iterated in enumeration order.
#[derive(Debug)]
pub struct SkillSystem {
    skills: BTreeMap<SkillType, Skill>,
    events: EventHub<SkillEvent>,
}

impl SkillSystem {
    /// Create a system with every skill at level 0.
    pub fn new(config: &SkillsConfig) -> Self {
        let skills = SkillType::ALL
            .iter()
            .map(|skill| (*skill, Skill::new(*skill, config.get(*skill))))
            .collect();
        Self {
            skills,
            events: EventHub::new(),
        }
    }

    /// Register an observer for one event kind.
    pub fn subscribe(&mut self, kind: SkillEventKind, observer: Observer<SkillEvent>) {
        self.events.subscribe(kind, observer);
    }

    /// Add experience points to a skill.
    ///
    /// If enough XP accumulates, the skill levels up (possibly multiple
    /// times from a single large gain). Returns the number of levels gained.
    pub fn add_experience(&mut self, skill_type: SkillType, amount: f64) -> u32 {
        let Some(skill) = self.skills.get_mut(&skill_type) else {
            return 0;
        };
        if skill.is_maxed() {
            return 0;
        }
        let old_level = skill.level();
        let gained = skill.add_experience(amount);
        let new_level = skill.level();

        self.events.emit(&SkillEvent::SkillGain {
            skill: skill_type,
            amount,
        });
        if gained > 0 {
            debug!(skill = %skill_type, old_level, new_level, "skill level up");
            self.events.emit(&SkillEvent::LevelUp {
                skill: skill_type,
                old_level,
                new_level,
            });
        }
        gained
    }

    /// Add experience to a skill named by string.
    ///
    /// Returns `None` if the name is not a known skill.
    pub fn add_experience_by_name(&mut self, name: &str, amount: f64) -> Option<u32> {
        let skill_type = name.parse::<SkillType>().ok()?;
        Some(self.add_experience(skill_type, amount))
    }

    /// Practice a skill for `hours`, returning the XP granted.
    ///
    /// Practice time is logged even when the skill is maxed, in which case
    /// no XP is granted.
    pub fn practice(&mut self, skill_type: SkillType, hours: f64, base_xp_per_hour: f64) -> f64 {
        let Some(skill) = self.skills.get_mut(&skill_type) else {
            return 0.0;
        };
        let hours = hours.max(0.0);
        skill.total_practice_time += hours;
        if skill.is_maxed() {
            return 0.0;
        }
        let xp = skill.practice_xp(hours, base_xp_per_hour);
        self.add_experience(skill_type, xp);
        xp
    }

    /// Apply `dt` hours of experience decay to every skill.
    pub fn update(&mut self, dt: f64) {
        for skill in self.skills.values_mut() {
            skill.decay(dt);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The full skill record.
    pub fn get(&self, skill_type: SkillType) -> Option<&Skill> {
        self.skills.get(&skill_type)
    }

    /// Current level of a skill.
    pub fn level(&self, skill_type: SkillType) -> u32 {
        self.skills.get(&skill_type).map_or(0, Skill::level)
    }

    /// Effectiveness multiplier of a skill.
    pub fn effectiveness(&self, skill_type: SkillType) -> f64 {
        self.skills
            .get(&skill_type)
            .map_or(MIN_EFFECTIVENESS, Skill::effectiveness)
    }

    /// Every skill's level.
    pub fn all_levels(&self) -> BTreeMap<SkillType, u32> {
        self.skills
            .iter()
            .map(|(skill_type, skill)| (*skill_type, skill.level()))
            .collect()
    }

    /// The `count` highest skills by level, then experience.
    pub fn strongest(&self, count: usize) -> Vec<&Skill> {
        let mut ranked: Vec<&Skill> = self.skills.values().collect();
        ranked.sort_by(|a, b| {
            b.level()
                .cmp(&a.level())
                .then_with(|| b.experience().total_cmp(&a.experience()))
        });
        ranked.truncate(count);
        ranked
    }

    /// The `count` lowest skills by level, then experience.
    pub fn weakest(&self, count: usize) -> Vec<&Skill> {
        let mut ranked: Vec<&Skill> = self.skills.values().collect();
        ranked.sort_by(|a, b| {
            a.level()
                .cmp(&b.level())
                .then_with(|| a.experience().total_cmp(&b.experience()))
        });
        ranked.truncate(count);
        ranked
    }

    /// Sum of all levels.
    pub fn total_skill_points(&self) -> u32 {
        self.skills
            .values()
            .fold(0_u32, |total, skill| total.saturating_add(skill.level()))
    }

    /// Mean level, or 0 with no skills.
    pub fn average_level(&self) -> f64 {
        let count = u32::try_from(self.skills.len()).unwrap_or(u32::MAX);
        if count == 0 {
            return 0.0;
        }
        f64::from(self.total_skill_points()) / f64::from(count)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Skill records keyed by skill name.
    pub fn to_snapshot(&self) -> BTreeMap<String, SkillRecord> {
        self.skills
            .iter()
            .map(|(skill_type, skill)| (String::from(skill_type.as_str()), skill.to_record()))
            .collect()
    }

    /// Load skill records; unknown names are ignored.
    pub fn restore(&mut self, snapshot: &BTreeMap<String, SkillRecord>) {
        for (name, record) in snapshot {
            if let Ok(skill_type) = name.parse::<SkillType>()
                && let Some(skill) = self.skills.get_mut(&skill_type)
            {
                skill.restore(record);
            }
        }
    }
}

impl Default for SkillSystem {
    fn default() -> Self {
        Self::new(&SkillsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn flat_curve() -> SkillsConfig {
        SkillsConfig {
            defaults: SkillConfig {
                xp_scaling: 1.0,
                ..SkillConfig::default()
            },
            overrides: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Thresholds
    // -------------------------------------------------------------------

    #[test]
    fn threshold_grows_geometrically() {
        let mut skill = Skill::new(SkillType::Music, SkillConfig::default());
        assert!(approx(skill.xp_for_current_level(), 100.0));
        skill.add_experience(100.0);
        assert_eq!(skill.level(), 1);
        assert!(approx(skill.xp_for_current_level(), 150.0));
        skill.add_experience(150.0);
        assert!(approx(skill.xp_for_current_level(), 225.0));
    }

    // -------------------------------------------------------------------
    // Experience
    // -------------------------------------------------------------------

    #[test]
    fn multi_level_gain_keeps_leftover() {
        let mut skills = SkillSystem::new(&flat_curve());
        let gained = skills.add_experience(SkillType::Cooking, 350.0);
        assert_eq!(gained, 3);
        assert_eq!(skills.level(SkillType::Cooking), 3);
        let exp = skills.get(SkillType::Cooking).map(Skill::experience);
        assert!(exp.is_some_and(|e| approx(e, 50.0)));
    }

    #[test]
    fn reaching_max_discards_leftover() {
        let mut skills = SkillSystem::new(&flat_curve());
        let gained = skills.add_experience(SkillType::Logic, 5000.0);
        assert_eq!(gained, 10);
        let skill = skills.get(SkillType::Logic);
        assert!(skill.is_some_and(|s| s.is_maxed() && approx(s.experience(), 0.0)));
        assert!(skill.is_some_and(|s| approx(s.xp_progress(), 1.0)));
    }

    #[test]
    fn maxed_skill_ignores_experience() {
        let mut skills = SkillSystem::new(&flat_curve());
        skills.add_experience(SkillType::Logic, 5000.0);
        assert_eq!(skills.add_experience(SkillType::Logic, 100.0), 0);
        let exp = skills.get(SkillType::Logic).map(Skill::experience);
        assert!(exp.is_some_and(|e| approx(e, 0.0)));
    }

    #[test]
    fn unknown_skill_name_is_none() {
        let mut skills = SkillSystem::default();
        assert_eq!(skills.add_experience_by_name("juggling", 10.0), None);
        assert_eq!(skills.add_experience_by_name("cooking", 100.0), Some(1));
    }

    #[test]
    fn events_report_gain_and_level_up() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut skills = SkillSystem::default();
        for kind in [SkillEventKind::SkillGain, SkillEventKind::LevelUp] {
            let sink = Arc::clone(&log);
            skills.subscribe(
                kind,
                Box::new(move |event| {
                    if let Ok(mut entries) = sink.lock() {
                        entries.push(*event);
                    }
                }),
            );
        }
        skills.add_experience(SkillType::Painting, 120.0);
        let entries = log.lock().map(|e| e.clone()).unwrap_or_default();
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            entries.get(1),
            Some(SkillEvent::LevelUp {
                skill: SkillType::Painting,
                old_level: 0,
                new_level: 1
            })
        ));
    }

    // -------------------------------------------------------------------
    // Practice
    // -------------------------------------------------------------------

    #[test]
    fn practice_has_diminishing_returns() {
        let mut skills = SkillSystem::new(&flat_curve());
        let first = skills.practice(SkillType::Fitness, 2.0, 10.0);
        assert!(approx(first, 20.0));

        skills.add_experience(SkillType::Fitness, 480.0);
        assert_eq!(skills.level(SkillType::Fitness), 5);
        let later = skills.practice(SkillType::Fitness, 2.0, 10.0);
        assert!(approx(later, 20.0 / 1.5));

        let time = skills.get(SkillType::Fitness).map(Skill::total_practice_time);
        assert!(time.is_some_and(|t| approx(t, 4.0)));
    }

    #[test]
    fn practicing_maxed_skill_grants_nothing() {
        let mut skills = SkillSystem::new(&flat_curve());
        skills.add_experience(SkillType::Gaming, 5000.0);
        assert!(approx(skills.practice(SkillType::Gaming, 3.0, 10.0), 0.0));
        let time = skills.get(SkillType::Gaming).map(Skill::total_practice_time);
        assert!(time.is_some_and(|t| approx(t, 3.0)));
    }

    // -------------------------------------------------------------------
    // Effectiveness and decay
    // -------------------------------------------------------------------

    #[test]
    fn effectiveness_is_linear() {
        let mut skills = SkillSystem::new(&flat_curve());
        assert!(approx(skills.effectiveness(SkillType::Writing), 0.5));
        skills.add_experience(SkillType::Writing, 500.0);
        assert!(approx(skills.effectiveness(SkillType::Writing), 1.25));
        skills.add_experience(SkillType::Writing, 500.0);
        assert!(approx(skills.effectiveness(SkillType::Writing), 2.0));
    }

    #[test]
    fn decay_never_drops_level() {
        let config = SkillsConfig {
            defaults: SkillConfig {
                decay_rate: 5.0,
                ..SkillConfig::default()
            },
            overrides: BTreeMap::new(),
        };
        let mut skills = SkillSystem::new(&config);
        skills.add_experience(SkillType::Dancing, 130.0);
        skills.update(2.0);
        let skill = skills.get(SkillType::Dancing);
        assert!(skill.is_some_and(|s| s.level() == 1 && approx(s.experience(), 20.0)));
        skills.update(100.0);
        let skill = skills.get(SkillType::Dancing);
        assert!(skill.is_some_and(|s| s.level() == 1 && approx(s.experience(), 0.0)));
    }

    #[test]
    fn default_curve_has_no_decay() {
        let mut skills = SkillSystem::default();
        skills.add_experience(SkillType::Comedy, 40.0);
        skills.update(1000.0);
        let exp = skills.get(SkillType::Comedy).map(Skill::experience);
        assert!(exp.is_some_and(|e| approx(e, 40.0)));
    }

    // -------------------------------------------------------------------
    // Rankings
    // -------------------------------------------------------------------

    #[test]
    fn strongest_and_weakest() {
        let mut skills = SkillSystem::new(&flat_curve());
        skills.add_experience(SkillType::Music, 250.0);
        skills.add_experience(SkillType::Logic, 210.0);
        skills.add_experience(SkillType::Cooking, 100.0);

        let top: Vec<SkillType> = skills.strongest(3).iter().map(|s| s.skill_type).collect();
        assert_eq!(top, vec![SkillType::Music, SkillType::Logic, SkillType::Cooking]);

        // Ties at level 0 keep enumeration order.
        let bottom: Vec<SkillType> = skills.weakest(2).iter().map(|s| s.skill_type).collect();
        assert_eq!(bottom, vec![SkillType::Gardening, SkillType::Fishing]);

        assert_eq!(skills.total_skill_points(), 5);
        assert!(approx(skills.average_level(), 5.0 / 15.0));
    }

    // -------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------

    #[test]
    fn snapshot_round_trip() {
        let mut source = SkillSystem::default();
        source.practice(SkillType::Cooking, 3.0, 50.0);
        source.add_experience(SkillType::Charisma, 20.0);

        let mut target = SkillSystem::default();
        target.restore(&source.to_snapshot());
        for skill in SkillType::ALL {
            assert_eq!(
                target.get(*skill).map(Skill::to_record),
                source.get(*skill).map(Skill::to_record)
            );
        }
    }

    #[test]
    fn restore_clamps_level_and_ignores_unknown() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            String::from("music"),
            SkillRecord {
                level: 42,
                experience: 10.0,
                total_practice_time: 1.0,
            },
        );
        snapshot.insert(String::from("juggling"), SkillRecord::default());
        let mut skills = SkillSystem::default();
        skills.restore(&snapshot);
        let music = skills.get(SkillType::Music);
        assert!(music.is_some_and(|s| s.level() == 10 && approx(s.experience(), 0.0)));
    }

    #[test]
    fn restore_carries_excess_experience_into_levels() {
        let mut skill = Skill::new(SkillType::Cooking, SkillConfig::default());
        skill.restore(&SkillRecord {
            level: 1,
            experience: 200.0,
            total_practice_time: 3.0,
        });
        // Level 1 needs 150, leaving 50 toward level 2's 225.
        assert_eq!(skill.level(), 2);
        assert!(approx(skill.experience(), 50.0));
        assert!(skill.experience() < skill.xp_for_current_level());
        assert!(approx(skill.total_practice_time(), 3.0));

        let mut near_max = Skill::new(SkillType::Cooking, SkillConfig::default());
        near_max.restore(&SkillRecord {
            level: 9,
            experience: 1.0e9,
            total_practice_time: 0.0,
        });
        assert!(near_max.is_maxed());
        assert!(approx(near_max.experience(), 0.0));
    }
}
