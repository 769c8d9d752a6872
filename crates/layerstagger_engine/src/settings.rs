// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted staggering settings.
//!
//! Settings live in a flat string store, one section per tool. Booleans are
//! written as `"1"`/`"0"`. Out-of-range values fall back to their defaults
//! when read.

use crate::error::SettingsError;
use crate::range::RangeStrategy;
use crate::schedule::{ScheduleMode, SpeedOperator, SpeedUnit, Velocity};
use crate::split::SplitPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Section the staggering settings are stored under
pub const SETTINGS_SECTION: &str = "LayerRepeater";

/// String key/value settings storage
pub trait SettingsStore {
    /// Read a raw value
    fn get(&self, section: &str, key: &str) -> Option<String>;

    /// Write a raw value
    fn set(&mut self, section: &str, key: &str, value: String);
}

/// In-memory settings store, persisted as RON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySettings {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemorySettings {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key is present
    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|values| values.contains_key(key))
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section)?.get(key).cloned()
    }

    fn set(&mut self, section: &str, key: &str, value: String) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

fn read_int(store: &dyn SettingsStore, key: &str, default: i64) -> i64 {
    store
        .get(SETTINGS_SECTION, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn read_double(store: &dyn SettingsStore, key: &str, default: f64) -> f64 {
    store
        .get(SETTINGS_SECTION, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn read_bool(store: &dyn SettingsStore, key: &str, default: bool) -> bool {
    match store.get(SETTINGS_SECTION, key).as_deref().map(str::trim) {
        Some("1") => true,
        Some("0") => false,
        Some(other) => other.parse().unwrap_or(default),
        None => default,
    }
}

fn write(store: &mut dyn SettingsStore, key: &str, value: impl ToString) {
    store.set(SETTINGS_SECTION, key, value.to_string());
}

fn write_bool(store: &mut dyn SettingsStore, key: &str, value: bool) {
    write(store, key, if value { "1" } else { "0" });
}

/// Count or velocity scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModeType {
    /// Fixed number of copies
    #[default]
    FixedCount,
    /// Copies at a fixed rate
    FixedVelocity,
}

impl ModeType {
    /// Mode for a persisted setting value
    pub fn from_index(index: i64) -> Self {
        if index == 1 {
            Self::FixedVelocity
        } else {
            Self::FixedCount
        }
    }

    /// Persisted setting value
    pub fn index(self) -> i64 {
        match self {
            Self::FixedCount => 0,
            Self::FixedVelocity => 1,
        }
    }
}

/// Everything a staggering run is configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaggerSettings {
    /// Scheduling mode
    pub mode: ModeType,
    /// Copy count for fixed-count mode
    pub count: u32,
    /// Rate for fixed-velocity mode
    pub velocity: Velocity,
    /// Requested range strategy
    pub range: RangeStrategy,
    /// Fall back to other strategies when the requested one fails
    pub range_adapt: bool,
    /// Reverse the slot order
    pub reverse: bool,
    /// Mute the source clip afterwards
    pub mute: bool,
    /// Move the source track's motion to its parent side
    pub transfer_to_parent_motion: bool,
    /// Apply the source track's effects after compositing
    pub transfer_to_parent_fx: bool,
    /// Effect splitting policy
    pub split_policy: SplitPolicy,
}

impl Default for StaggerSettings {
    fn default() -> Self {
        Self {
            mode: ModeType::FixedCount,
            count: 50,
            velocity: Velocity::default(),
            range: RangeStrategy::MotionKeyframes,
            range_adapt: true,
            reverse: false,
            mute: true,
            transfer_to_parent_motion: true,
            transfer_to_parent_fx: true,
            split_policy: SplitPolicy::AskEachTime,
        }
    }
}

impl StaggerSettings {
    /// Read settings, substituting defaults for missing or invalid values
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();

        let count = match read_int(store, "Count", i64::from(defaults.count)) {
            n if n < 2 => defaults.count,
            n => u32::try_from(n).unwrap_or(defaults.count),
        };
        let speed = match read_double(store, "Speed", defaults.velocity.speed) {
            s if s <= 0.0 => defaults.velocity.speed,
            s => s,
        };
        let multiplier = match read_double(store, "SpeedMultiplier", defaults.velocity.multiplier) {
            m if m <= 0.0 => defaults.velocity.multiplier,
            m => m,
        };

        Self {
            mode: ModeType::from_index(read_int(store, "ModeType", defaults.mode.index())),
            count,
            velocity: Velocity {
                speed,
                unit: SpeedUnit::from_index(read_int(store, "SpeedType", 0)),
                operator: SpeedOperator::from_index(read_int(store, "SpeedOperatorType", 0)),
                multiplier,
            },
            range: RangeStrategy::from_index(read_int(store, "RangeType", defaults.range.index())),
            range_adapt: read_bool(store, "RangeAdapt", defaults.range_adapt),
            reverse: read_bool(store, "Reverse", defaults.reverse),
            mute: read_bool(store, "Mute", defaults.mute),
            transfer_to_parent_motion: read_bool(
                store,
                "TransferToParentMotion",
                defaults.transfer_to_parent_motion,
            ),
            transfer_to_parent_fx: read_bool(
                store,
                "TransferToParentFx",
                defaults.transfer_to_parent_fx,
            ),
            split_policy: SplitPolicy::from_index(read_int(
                store,
                "FxSplitType",
                defaults.split_policy.index(),
            )),
        }
    }

    /// Write settings back.
    ///
    /// The mode, count and speed are only written when they hold a usable value.
    pub fn save(&self, store: &mut dyn SettingsStore) {
        let count_set = self.count > 1;
        let speed_set = self.velocity.speed > 0.0;
        if count_set || speed_set {
            write(store, "ModeType", self.mode.index());
            if count_set {
                write(store, "Count", self.count);
            }
            if speed_set {
                write(store, "Speed", self.velocity.speed);
            }
        }
        write(store, "SpeedType", self.velocity.unit.index());
        write(store, "SpeedOperatorType", self.velocity.operator.index());
        write(store, "SpeedMultiplier", self.velocity.multiplier);
        write(store, "RangeType", self.range.index());
        write_bool(store, "Reverse", self.reverse);
        write_bool(store, "Mute", self.mute);
        write_bool(store, "TransferToParentMotion", self.transfer_to_parent_motion);
        write_bool(store, "TransferToParentFx", self.transfer_to_parent_fx);
        write_bool(store, "RangeAdapt", self.range_adapt);
        write(store, "FxSplitType", self.split_policy.index());
    }

    /// Scheduling mode with its parameters
    pub fn schedule_mode(&self) -> ScheduleMode {
        match self.mode {
            ModeType::FixedCount => ScheduleMode::FixedCount(self.count),
            ModeType::FixedVelocity => ScheduleMode::FixedVelocity(self.velocity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_gives_defaults() {
        let settings = StaggerSettings::load(&MemorySettings::new());
        assert_eq!(settings, StaggerSettings::default());
        assert_eq!(settings.count, 50);
        assert_eq!(settings.velocity.speed, 2.0);
        assert_eq!(settings.range, RangeStrategy::MotionKeyframes);
        assert!(settings.mute);
    }

    #[test]
    fn test_invalid_values_are_clamped() {
        let mut store = MemorySettings::new();
        store.set(SETTINGS_SECTION, "Count", "1".into());
        store.set(SETTINGS_SECTION, "Speed", "-3".into());
        store.set(SETTINGS_SECTION, "SpeedMultiplier", "0".into());
        store.set(SETTINGS_SECTION, "RangeType", "not a number".into());

        let settings = StaggerSettings::load(&store);
        assert_eq!(settings.count, 50);
        assert_eq!(settings.velocity.speed, 2.0);
        assert_eq!(settings.velocity.multiplier, 1.0);
        assert_eq!(settings.range, RangeStrategy::MotionKeyframes);
    }

    #[test]
    fn test_save_then_load() {
        let settings = StaggerSettings {
            mode: ModeType::FixedVelocity,
            count: 7,
            velocity: Velocity {
                speed: 120.0,
                unit: SpeedUnit::Bpm,
                operator: SpeedOperator::Divide,
                multiplier: 4.0,
            },
            range: RangeStrategy::LoopRegion,
            range_adapt: false,
            reverse: true,
            mute: false,
            transfer_to_parent_motion: false,
            transfer_to_parent_fx: true,
            split_policy: SplitPolicy::NeverSplit,
        };
        let mut store = MemorySettings::new();
        settings.save(&mut store);

        assert_eq!(store.get(SETTINGS_SECTION, "Reverse").as_deref(), Some("1"));
        assert_eq!(store.get(SETTINGS_SECTION, "Mute").as_deref(), Some("0"));
        assert_eq!(store.get(SETTINGS_SECTION, "Speed").as_deref(), Some("120"));
        assert_eq!(StaggerSettings::load(&store), settings);
    }

    #[test]
    fn test_unusable_count_and_speed_are_not_written() {
        let mut settings = StaggerSettings::default();
        settings.count = 0;
        settings.velocity.speed = 0.0;

        let mut store = MemorySettings::new();
        settings.save(&mut store);
        assert!(!store.contains(SETTINGS_SECTION, "ModeType"));
        assert!(!store.contains(SETTINGS_SECTION, "Count"));
        assert!(!store.contains(SETTINGS_SECTION, "Speed"));
        assert!(store.contains(SETTINGS_SECTION, "RangeType"));

        settings.count = 3;
        settings.save(&mut store);
        assert!(store.contains(SETTINGS_SECTION, "ModeType"));
        assert!(!store.contains(SETTINGS_SECTION, "Speed"));
    }

    #[test]
    fn test_bool_accepts_words() {
        let mut store = MemorySettings::new();
        store.set(SETTINGS_SECTION, "Reverse", "true".into());
        assert!(StaggerSettings::load(&store).reverse);
    }

    #[test]
    fn test_store_ron_round_trip() {
        let mut store = MemorySettings::new();
        StaggerSettings::default().save(&mut store);
        let ron_str = store.to_ron().unwrap();
        assert_eq!(MemorySettings::from_ron(&ron_str).unwrap(), store);
    }

    #[test]
    fn test_schedule_mode_follows_mode_type() {
        let mut settings = StaggerSettings::default();
        assert_eq!(settings.schedule_mode(), ScheduleMode::FixedCount(50));
        settings.mode = ModeType::FixedVelocity;
        assert!(!settings.schedule_mode().is_fixed_count());
    }
}
