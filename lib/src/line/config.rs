// SPDX-FileCopyrightText: 2024 The linedev developers
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Offset, SettingKind, SettingValue, Settings, Value};
use crate::{Error, Result};
use bitflags::bitflags;
use linedev_uapi::v2;
use nohash_hasher::IntMap;

bitflags! {
    // One bit per SettingKind, marking the attributes an override carries.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    struct KindMask: u8 {
        const DIRECTION = 1;
        const EDGE_DETECTION = 2;
        const BIAS = 4;
        const DRIVE = 8;
        const ACTIVE_LOW = 16;
        const DEBOUNCE_PERIOD = 32;
        const EVENT_CLOCK = 64;
        const OUTPUT_VALUE = 128;
    }
}

impl From<SettingKind> for KindMask {
    fn from(kind: SettingKind) -> Self {
        match kind {
            SettingKind::Direction => KindMask::DIRECTION,
            SettingKind::EdgeDetection => KindMask::EDGE_DETECTION,
            SettingKind::Bias => KindMask::BIAS,
            SettingKind::Drive => KindMask::DRIVE,
            SettingKind::ActiveLow => KindMask::ACTIVE_LOW,
            SettingKind::DebouncePeriod => KindMask::DEBOUNCE_PERIOD,
            SettingKind::EventClock => KindMask::EVENT_CLOCK,
            SettingKind::OutputValue => KindMask::OUTPUT_VALUE,
        }
    }
}

// The overridden attributes for one line.
//
// Fields not marked in the mask are held at their Settings default so
// overrides that carry the same attributes compare equal.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Override {
    settings: Settings,
    mask: KindMask,
}

/// The configuration for a set of lines.
///
/// Holds one set of default [`Settings`] that applies to every line, plus
/// per-line attribute overrides. The effective settings for a line are the
/// defaults with any overrides for that line applied on top.
///
/// The configuration is not tied to a particular request. Overrides may be
/// set for any offset, but only those on requested lines have any effect
/// when the configuration is applied.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    defaults: Settings,
    overrides: IntMap<Offset, Override>,
    // override identities in the order they were first set
    order: Vec<(Offset, SettingKind)>,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Set one attribute of the default settings.
    pub fn set_default(&mut self, value: SettingValue) -> &mut Self {
        self.defaults.set(value);
        self
    }

    /// Replace the default settings.
    pub fn set_defaults(&mut self, settings: Settings) -> &mut Self {
        self.defaults = settings;
        self
    }

    /// The value of one attribute of the default settings.
    pub fn default_value(&self, kind: SettingKind) -> SettingValue {
        self.defaults.get(kind)
    }

    /// The default settings.
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Override one attribute for one line.
    ///
    /// Setting an attribute that is already overridden replaces the
    /// previous value.
    pub fn set_override(&mut self, offset: Offset, value: SettingValue) -> &mut Self {
        let kind = value.kind();
        let ov = self.overrides.entry(offset).or_default();
        if !ov.mask.contains(kind.into()) {
            ov.mask.insert(kind.into());
            self.order.push((offset, kind));
        }
        ov.settings.set(value);
        self
    }

    /// Remove an attribute override from a line.
    ///
    /// The attribute reverts to the default. Clearing an attribute that is
    /// not overridden is a no-op.
    pub fn clear_override(&mut self, offset: Offset, kind: SettingKind) -> &mut Self {
        if let Some(ov) = self.overrides.get_mut(&offset) {
            if ov.mask.contains(kind.into()) {
                ov.mask.remove(kind.into());
                ov.settings.set(Settings::default().get(kind));
                self.order.retain(|o| *o != (offset, kind));
                if ov.mask.is_empty() {
                    self.overrides.remove(&offset);
                }
            }
        }
        self
    }

    /// Whether an attribute is overridden for a line.
    pub fn is_overridden(&self, offset: Offset, kind: SettingKind) -> bool {
        self.overrides
            .get(&offset)
            .map(|ov| ov.mask.contains(kind.into()))
            .unwrap_or(false)
    }

    /// The effective value of one attribute for a line.
    pub fn effective(&self, offset: Offset, kind: SettingKind) -> SettingValue {
        if let Some(ov) = self.overrides.get(&offset) {
            if ov.mask.contains(kind.into()) {
                return ov.settings.get(kind);
            }
        }
        self.defaults.get(kind)
    }

    /// The effective settings for a line.
    pub fn effective_settings(&self, offset: Offset) -> Settings {
        let mut settings = self.defaults.clone();
        if let Some(ov) = self.overrides.get(&offset) {
            for kind in SettingKind::ALL {
                if ov.mask.contains(kind.into()) {
                    settings.set(ov.settings.get(kind));
                }
            }
        }
        settings
    }

    /// The number of attribute overrides in the configuration.
    pub fn num_overrides(&self) -> usize {
        self.order.len()
    }

    /// The attribute overrides, in the order they were first set.
    pub fn overrides(&self) -> &[(Offset, SettingKind)] {
        &self.order
    }

    /// Override the output value of each of the given lines.
    ///
    /// The offsets and values are paired by index. Excess offsets or
    /// values are ignored.
    pub fn set_output_values(&mut self, offsets: &[Offset], values: &[Value]) -> &mut Self {
        for (offset, value) in offsets.iter().zip(values.iter()) {
            self.set_override(*offset, SettingValue::OutputValue(*value));
        }
        self
    }

    /// Override the output value of lines from (offset, value) pairs.
    pub fn set_output_values_map<V>(&mut self, values: V) -> &mut Self
    where
        V: IntoIterator<Item = (Offset, Value)>,
    {
        for (offset, value) in values {
            self.set_override(offset, SettingValue::OutputValue(value));
        }
        self
    }

    /// Partition the requested lines into groups of identical effective
    /// settings.
    ///
    /// Groups are ordered by the first requested line they contain.
    /// Overrides on lines not in `offsets` are ignored.
    pub(crate) fn groups(&self, offsets: &[Offset]) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = Vec::new();
        for (idx, offset) in offsets.iter().enumerate() {
            let settings = self.effective_settings(*offset);
            let bit = 0x01 << idx;
            match groups.iter().position(|g| g.settings == settings) {
                Some(gidx) => groups[gidx].mask |= bit,
                None => groups.push(Group { settings, mask: bit }),
            }
        }
        if groups.len() > v2::NUM_ATTRS_MAX {
            return Err(Error::TooManyDistinctConfigurations {
                required: groups.len(),
                max: v2::NUM_ATTRS_MAX,
            });
        }
        Ok(groups)
    }

    /// Build the uAPI line config covering the requested lines.
    ///
    /// The flags shared by the most lines become the base flags, with the
    /// remaining groups, output values and debounce periods carried in
    /// attribute slots. Fails if the configuration requires more slots than
    /// the uAPI provides.
    pub(crate) fn to_uapi(&self, offsets: &[Offset]) -> Result<v2::LineConfig> {
        let mut lc = v2::LineConfig::default();
        if offsets.is_empty() {
            return Ok(lc);
        }
        let groups = self.groups(offsets)?;

        // merge groups with identical flags
        let mut flag_groups: Vec<(v2::LineFlags, u64, u32)> = Vec::new();
        let mut debounce: Vec<(u32, u64)> = Vec::new();
        let mut values = v2::LineValues::default();
        for g in &groups {
            let flags = v2::LineFlags::from(&g.settings);
            let lines = g.mask.count_ones();
            match flag_groups.iter().position(|fg| fg.0 == flags) {
                Some(idx) => {
                    flag_groups[idx].1 |= g.mask;
                    flag_groups[idx].2 += lines;
                }
                None => flag_groups.push((flags, g.mask, lines)),
            }
            if g.settings.edge_detection == super::EdgeDetection::None
                && g.settings.direction == super::Direction::Output
            {
                values.mask |= g.mask;
                if g.settings.output_value == Value::Active {
                    values.bits |= g.mask;
                }
            }
            let period_us = g.settings.debounce_period_us();
            if period_us != 0 {
                match debounce.iter().position(|d| d.0 == period_us) {
                    Some(idx) => debounce[idx].1 |= g.mask,
                    None => debounce.push((period_us, g.mask)),
                }
            }
        }

        // the flags covering the most lines, earliest set winning ties
        let mut base = 0;
        for (idx, fg) in flag_groups.iter().enumerate() {
            if fg.2 > flag_groups[base].2 {
                base = idx;
            }
        }

        let required = flag_groups.len() - 1 + debounce.len() + usize::from(values.mask != 0);
        if required > v2::NUM_ATTRS_MAX {
            return Err(Error::TooManyDistinctConfigurations {
                required,
                max: v2::NUM_ATTRS_MAX,
            });
        }

        lc.flags = flag_groups[base].0;
        for (idx, fg) in flag_groups.iter().enumerate() {
            if idx != base {
                lc.add_flags(fg.0, fg.1);
            }
        }
        if values.mask != 0 {
            lc.add_values(values.bits, values.mask);
        }
        for d in &debounce {
            lc.add_debounce(d.0, d.1);
        }
        Ok(lc)
    }
}

// A set of requested lines sharing one effective settings.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct Group {
    pub(crate) settings: Settings,

    // bit numbers are the index into the requested offsets
    pub(crate) mask: u64,
}
