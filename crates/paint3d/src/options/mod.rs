//! Tool options and their persisted form.
//!
//! [`ToolOptions`] is a plain typed struct read by the stroke engine on every
//! event. Persistence goes through [`OPTION_TABLE`], a static list of
//! descriptors mapping each field to a flat named value in an [`OptionStore`].
//! The table is only used for (de)serialization; the engine never looks
//! options up by name.
//!
//! A persisted set is loaded all-or-nothing: a missing or mistyped entry, or a
//! version different from [`TOOL_VERSION`], invalidates the whole set.
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod store;

pub use store::{MemoryOptionStore, OptionStore};

/// Version stamped into persisted options.
pub const TOOL_VERSION: f64 = 2022.0;

/// Decimals kept on persisted floats when loading.
const LOAD_DECIMALS: i32 = 2;

/// What throttles commits along a paint stroke.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FluxMode {
    /// Commit once the cursor moved [`ToolOptions::paint_distance`] world units.
    #[default]
    Distance,
    /// Commit once [`ToolOptions::paint_timer`] seconds elapsed.
    Time,
}

/// Which transform components the stroke ramp attenuates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampFx {
    #[default]
    None,
    Rotate,
    Scale,
    Both,
}

impl RampFx {
    pub fn affects_rotation(&self) -> bool {
        matches!(self, RampFx::Rotate | RampFx::Both)
    }

    pub fn affects_scale(&self) -> bool {
        matches!(self, RampFx::Scale | RampFx::Both)
    }

    fn code(&self) -> f64 {
        match self {
            RampFx::None => 0.0,
            RampFx::Rotate => 1.0,
            RampFx::Scale => 2.0,
            RampFx::Both => 3.0,
        }
    }

    fn from_code(code: f64) -> Self {
        match code.round() as i64 {
            1 => RampFx::Rotate,
            2 => RampFx::Scale,
            3 => RampFx::Both,
            _ => RampFx::None,
        }
    }
}

/// Scope of the output group when hierarchy grouping is on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// One group for the whole tool session.
    #[default]
    Session,
    /// One group per stroke.
    Stroke,
    /// One group per source object.
    Source,
}

impl GroupBy {
    fn code(&self) -> f64 {
        match self {
            GroupBy::Session => 0.0,
            GroupBy::Stroke => 1.0,
            GroupBy::Source => 2.0,
        }
    }

    fn from_code(code: f64) -> Self {
        match code.round() as i64 {
            1 => GroupBy::Stroke,
            2 => GroupBy::Source,
            _ => GroupBy::Session,
        }
    }
}

/// Effective grouping of committed objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingPolicy {
    None,
    Session,
    Stroke,
    Source,
}

/// Every user-facing tool setting.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOptions {
    /// Randomize rotation with the sampler ranges.
    pub transform_rotate: bool,
    /// Randomize scale with the sampler ranges.
    pub transform_scale: bool,
    pub transform_scale_uniform: bool,
    /// Instance sources instead of copying them.
    pub instance: bool,
    /// Random distribution of sources; round robin otherwise.
    pub random: bool,
    /// Random distribution honours entry probabilities.
    pub weighted: bool,
    /// Align objects to the surface normal.
    pub align: bool,
    pub flux: FluxMode,
    pub ramp_fx: RampFx,
    /// Re-ramp the stroke after every commit instead of once on release.
    pub real_time_ramp_fx: bool,
    /// Seconds between commits in [`FluxMode::Time`].
    pub paint_timer: f32,
    /// World distance between commits in [`FluxMode::Distance`].
    pub paint_distance: f32,
    /// Offset along the surface normal.
    pub up_offset: f32,
    /// Spin snapping step in degrees for place mode.
    pub place_rotate: f32,
    /// Place mode: re-roll random deltas on every drag tick.
    pub continuous_transform: bool,
    /// Offset along the surface with the U/V jitter ranges.
    pub jitter: bool,
    pub preserve_connections: bool,
    /// Use smoothed normals rather than raw face normals.
    pub smooth_normal: bool,
    /// Group committed objects.
    pub hierarchy: bool,
    pub group: GroupBy,
    pub version: f64,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            transform_rotate: true,
            transform_scale: true,
            transform_scale_uniform: true,
            instance: false,
            random: true,
            weighted: true,
            align: true,
            flux: FluxMode::Distance,
            ramp_fx: RampFx::None,
            real_time_ramp_fx: false,
            paint_timer: 0.05,
            paint_distance: 10.0,
            up_offset: 0.0,
            place_rotate: 45.0,
            continuous_transform: false,
            jitter: false,
            preserve_connections: false,
            smooth_normal: true,
            hierarchy: false,
            group: GroupBy::Session,
            version: TOOL_VERSION,
        }
    }
}

/// A flat persisted value. Booleans persist as integers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Float(f64),
}

impl OptionValue {
    pub fn from_bool(value: bool) -> Self {
        OptionValue::Int(value as i64)
    }

    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Int(_) => OptionKind::Bool,
            OptionValue::Float(_) => OptionKind::Float,
        }
    }

    pub fn as_bool(&self) -> bool {
        match *self {
            OptionValue::Int(v) => v != 0,
            OptionValue::Float(v) => v != 0.0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            OptionValue::Int(v) => v as f64,
            OptionValue::Float(v) => v,
        }
    }

    fn rounded(self) -> Self {
        match self {
            OptionValue::Float(v) => {
                let factor = 10f64.powi(LOAD_DECIMALS);
                OptionValue::Float((v * factor).round() / factor)
            }
            other => other,
        }
    }
}

/// Declared type of a persisted option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Float,
}

/// Serialization descriptor for one [`ToolOptions`] field.
pub struct OptionDescriptor {
    pub name: &'static str,
    pub kind: OptionKind,
    /// Absent from stores written before the option existed; the default is kept when missing.
    pub required: bool,
    pub get: fn(&ToolOptions) -> OptionValue,
    pub set: fn(&mut ToolOptions, OptionValue),
}

impl OptionDescriptor {
    /// Compiled-in default value.
    pub fn default_value(&self) -> OptionValue {
        (self.get)(&ToolOptions::default())
    }
}

impl std::fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

macro_rules! bool_option {
    ($name:literal, $field:ident) => {
        OptionDescriptor {
            name: $name,
            kind: OptionKind::Bool,
            required: true,
            get: |o| OptionValue::from_bool(o.$field),
            set: |o, v| o.$field = v.as_bool(),
        }
    };
}

macro_rules! float_option {
    ($name:literal, $field:ident) => {
        OptionDescriptor {
            name: $name,
            kind: OptionKind::Float,
            required: true,
            get: |o| OptionValue::Float(o.$field as f64),
            set: |o, v| o.$field = v.as_f64() as f32,
        }
    };
}

/// Persisted schema of [`ToolOptions`].
pub static OPTION_TABLE: &[OptionDescriptor] = &[
    bool_option!("sp3dTransformRotate", transform_rotate),
    bool_option!("sp3dTransformScale", transform_scale),
    bool_option!("sp3dTransformScaleUniform", transform_scale_uniform),
    bool_option!("sp3dInstance", instance),
    bool_option!("sp3dRandom", random),
    OptionDescriptor {
        name: "sp3dWeighted",
        kind: OptionKind::Bool,
        required: false,
        get: |o| OptionValue::from_bool(o.weighted),
        set: |o, v| o.weighted = v.as_bool(),
    },
    bool_option!("sp3dAlign", align),
    OptionDescriptor {
        name: "sp3dPaintFlux",
        kind: OptionKind::Bool,
        required: true,
        get: |o| OptionValue::from_bool(o.flux == FluxMode::Distance),
        set: |o, v| {
            o.flux = if v.as_bool() {
                FluxMode::Distance
            } else {
                FluxMode::Time
            }
        },
    },
    OptionDescriptor {
        name: "sp3dRampFX",
        kind: OptionKind::Float,
        required: true,
        get: |o| OptionValue::Float(o.ramp_fx.code()),
        set: |o, v| o.ramp_fx = RampFx::from_code(v.as_f64()),
    },
    bool_option!("sp3dRealTimeRampFX", real_time_ramp_fx),
    float_option!("sp3dPaintTimer", paint_timer),
    float_option!("sp3dPaintDistance", paint_distance),
    float_option!("sp3dPaintOffset", up_offset),
    float_option!("sp3dPlaceRotate", place_rotate),
    bool_option!("sp3dContinuousTransform", continuous_transform),
    bool_option!("sp3dJitter", jitter),
    bool_option!("sp3dPreserveInConn", preserve_connections),
    bool_option!("sp3dSmoothNormal", smooth_normal),
    bool_option!("sp3dSetupHierarchy", hierarchy),
    OptionDescriptor {
        name: "sp3dGroup",
        kind: OptionKind::Float,
        required: true,
        get: |o| OptionValue::Float(o.group.code()),
        set: |o, v| o.group = GroupBy::from_code(v.as_f64()),
    },
    OptionDescriptor {
        name: "sp3dVersion",
        kind: OptionKind::Float,
        required: true,
        get: |o| OptionValue::Float(o.version),
        set: |o, v| o.version = v.as_f64(),
    },
];

/// Why a persisted option set cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsInvalid {
    #[error("persisted option '{name}' is missing")]
    Missing { name: &'static str },

    #[error("persisted option '{name}' has the wrong type")]
    WrongKind { name: &'static str },

    #[error("persisted options were saved by version {stored}, running {expected}")]
    VersionMismatch { stored: f64, expected: f64 },
}

/// Outcome of [`ToolOptions::load_or_reset`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(ToolOptions),
    /// Persisted options were unusable and were overwritten with defaults.
    Reset {
        options: ToolOptions,
        reason: OptionsInvalid,
    },
}

impl LoadOutcome {
    pub fn options(&self) -> &ToolOptions {
        match self {
            LoadOutcome::Loaded(options) | LoadOutcome::Reset { options, .. } => options,
        }
    }

    pub fn into_options(self) -> ToolOptions {
        match self {
            LoadOutcome::Loaded(options) | LoadOutcome::Reset { options, .. } => options,
        }
    }
}

/// Boolean settings editable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOption {
    TransformRotate,
    TransformScale,
    TransformScaleUniform,
    Instance,
    Random,
    Weighted,
    Align,
    RealTimeRampFx,
    ContinuousTransform,
    Jitter,
    PreserveConnections,
    SmoothNormal,
    Hierarchy,
}

/// Numeric settings editable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatOption {
    PaintTimer,
    PaintDistance,
    UpOffset,
    PlaceRotate,
}

/// A single edit emitted by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionIntent {
    Toggle(BoolOption, bool),
    Set(FloatOption, f32),
    Flux(FluxMode),
    Ramp(RampFx),
    GroupBy(GroupBy),
}

impl ToolOptions {
    /// Load a complete option set, refusing partial or stale data.
    pub fn load(store: &dyn OptionStore) -> Result<Self, OptionsInvalid> {
        let mut options = Self::default();
        for desc in OPTION_TABLE {
            let Some(value) = store.get(desc.name) else {
                if desc.required {
                    return Err(OptionsInvalid::Missing { name: desc.name });
                }
                continue;
            };
            if value.kind() != desc.kind {
                return Err(OptionsInvalid::WrongKind { name: desc.name });
            }
            (desc.set)(&mut options, value.rounded());
        }

        if options.version != TOOL_VERSION {
            return Err(OptionsInvalid::VersionMismatch {
                stored: options.version,
                expected: TOOL_VERSION,
            });
        }

        debug!("Loaded tool options: {:?}.", options);
        Ok(options)
    }

    /// Write every compiled-in default to `store`, then load it back.
    pub fn reset_to_defaults(store: &mut dyn OptionStore) -> Result<Self, OptionsInvalid> {
        Self::default().commit(store);
        Self::load(store)
    }

    /// Load persisted options, resetting the store to defaults when they are unusable.
    pub fn load_or_reset(store: &mut dyn OptionStore) -> Result<LoadOutcome, OptionsInvalid> {
        match Self::load(store) {
            Ok(options) => Ok(LoadOutcome::Loaded(options)),
            Err(reason) => {
                tracing::warn!("Resetting tool options to defaults: {}.", reason);
                let options = Self::reset_to_defaults(store)?;
                Ok(LoadOutcome::Reset { options, reason })
            }
        }
    }

    /// Write every field to `store`.
    pub fn commit(&self, store: &mut dyn OptionStore) {
        for desc in OPTION_TABLE {
            store.set(desc.name, (desc.get)(self));
        }
    }

    /// Apply a UI edit in place.
    pub fn apply(&mut self, intent: OptionIntent) {
        match intent {
            OptionIntent::Toggle(option, value) => {
                let field = match option {
                    BoolOption::TransformRotate => &mut self.transform_rotate,
                    BoolOption::TransformScale => &mut self.transform_scale,
                    BoolOption::TransformScaleUniform => &mut self.transform_scale_uniform,
                    BoolOption::Instance => &mut self.instance,
                    BoolOption::Random => &mut self.random,
                    BoolOption::Weighted => &mut self.weighted,
                    BoolOption::Align => &mut self.align,
                    BoolOption::RealTimeRampFx => &mut self.real_time_ramp_fx,
                    BoolOption::ContinuousTransform => &mut self.continuous_transform,
                    BoolOption::Jitter => &mut self.jitter,
                    BoolOption::PreserveConnections => &mut self.preserve_connections,
                    BoolOption::SmoothNormal => &mut self.smooth_normal,
                    BoolOption::Hierarchy => &mut self.hierarchy,
                };
                *field = value;
            }
            OptionIntent::Set(option, value) => match option {
                FloatOption::PaintTimer => self.paint_timer = value.max(0.0),
                FloatOption::PaintDistance => self.paint_distance = value.max(0.0),
                FloatOption::UpOffset => self.up_offset = value,
                FloatOption::PlaceRotate => self.place_rotate = value.abs(),
            },
            OptionIntent::Flux(mode) => self.flux = mode,
            OptionIntent::Ramp(ramp) => self.ramp_fx = ramp,
            OptionIntent::GroupBy(group) => self.group = group,
        }
    }

    /// Apply a UI edit and persist the whole set.
    pub fn update(&mut self, intent: OptionIntent, store: &mut dyn OptionStore) {
        self.apply(intent);
        self.commit(store);
    }

    pub fn grouping(&self) -> GroupingPolicy {
        if !self.hierarchy {
            return GroupingPolicy::None;
        }
        match self.group {
            GroupBy::Session => GroupingPolicy::Session,
            GroupBy::Stroke => GroupingPolicy::Stroke,
            GroupBy::Source => GroupingPolicy::Source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        let mut names: Vec<_> = OPTION_TABLE.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), OPTION_TABLE.len());
    }

    #[test]
    fn table_kinds_match_default_values() {
        for desc in OPTION_TABLE {
            assert_eq!(desc.default_value().kind(), desc.kind, "{}", desc.name);
        }
    }

    #[test]
    fn commit_then_load_returns_same_options() {
        let mut store = MemoryOptionStore::new();
        let options = ToolOptions {
            instance: true,
            flux: FluxMode::Time,
            ramp_fx: RampFx::Scale,
            paint_timer: 0.25,
            paint_distance: 3.5,
            hierarchy: true,
            group: GroupBy::Source,
            ..ToolOptions::default()
        };
        options.commit(&mut store);
        assert_eq!(store.len(), OPTION_TABLE.len());
        assert_eq!(ToolOptions::load(&store).unwrap(), options);
    }

    #[test]
    fn store_without_weighted_flag_still_loads() {
        let mut store = MemoryOptionStore::new();
        let options = ToolOptions {
            weighted: false,
            jitter: true,
            ..ToolOptions::default()
        };
        options.commit(&mut store);
        store.remove("sp3dWeighted");

        let loaded = ToolOptions::load(&store).unwrap();
        assert!(loaded.jitter);
        assert_eq!(loaded.weighted, ToolOptions::default().weighted);
        assert!(OPTION_TABLE.iter().all(|d| d.name.starts_with("sp3d")));
    }

    #[test]
    fn empty_store_is_invalid() {
        let store = MemoryOptionStore::new();
        assert!(matches!(
            ToolOptions::load(&store),
            Err(OptionsInvalid::Missing { .. })
        ));
    }

    #[test]
    fn any_missing_key_invalidates_everything() {
        let mut store = MemoryOptionStore::new();
        ToolOptions::default().commit(&mut store);
        store.remove("sp3dJitter");
        assert_eq!(
            ToolOptions::load(&store),
            Err(OptionsInvalid::Missing { name: "sp3dJitter" })
        );
    }

    #[test]
    fn mistyped_value_invalidates_everything() {
        let mut store = MemoryOptionStore::new();
        ToolOptions::default().commit(&mut store);
        store.set("sp3dAlign", OptionValue::Float(1.0));
        assert_eq!(
            ToolOptions::load(&store),
            Err(OptionsInvalid::WrongKind { name: "sp3dAlign" })
        );
    }

    #[test]
    fn version_mismatch_then_reset_yields_defaults() {
        let mut store = MemoryOptionStore::new();
        ToolOptions {
            paint_distance: 99.0,
            ..ToolOptions::default()
        }
        .commit(&mut store);
        store.set("sp3dVersion", OptionValue::Float(2021.0));

        assert_eq!(
            ToolOptions::load(&store),
            Err(OptionsInvalid::VersionMismatch {
                stored: 2021.0,
                expected: 2022.0
            })
        );

        let reset = ToolOptions::reset_to_defaults(&mut store).unwrap();
        assert_eq!(reset, ToolOptions::default());
        assert_eq!(ToolOptions::load(&store).unwrap(), ToolOptions::default());
        for desc in OPTION_TABLE {
            assert_eq!(store.get(desc.name), Some(desc.default_value()));
        }
    }

    #[test]
    fn load_or_reset_reports_reason_once() {
        let mut store = MemoryOptionStore::new();
        let outcome = ToolOptions::load_or_reset(&mut store).unwrap();
        assert!(matches!(
            outcome,
            LoadOutcome::Reset {
                reason: OptionsInvalid::Missing { .. },
                ..
            }
        ));
        assert_eq!(outcome.options(), &ToolOptions::default());

        let again = ToolOptions::load_or_reset(&mut store).unwrap();
        assert!(matches!(again, LoadOutcome::Loaded(_)));
    }

    #[test]
    fn floats_are_rounded_on_load() {
        let mut store = MemoryOptionStore::new();
        ToolOptions::default().commit(&mut store);
        store.set("sp3dPaintDistance", OptionValue::Float(4.256));
        assert_eq!(ToolOptions::load(&store).unwrap().paint_distance, 4.26);
    }

    #[test]
    fn update_applies_and_persists() {
        let mut store = MemoryOptionStore::new();
        let mut options = ToolOptions::default();
        options.commit(&mut store);

        options.update(OptionIntent::Toggle(BoolOption::Jitter, true), &mut store);
        options.update(OptionIntent::Set(FloatOption::PaintDistance, -4.0), &mut store);
        options.update(OptionIntent::Ramp(RampFx::Both), &mut store);

        assert!(options.jitter);
        assert_eq!(options.paint_distance, 0.0);
        assert_eq!(store.get("sp3dJitter"), Some(OptionValue::Int(1)));
        assert_eq!(store.get("sp3dRampFX"), Some(OptionValue::Float(3.0)));
        assert_eq!(ToolOptions::load(&store).unwrap(), options);
    }

    #[test]
    fn grouping_requires_hierarchy() {
        let mut options = ToolOptions {
            group: GroupBy::Stroke,
            ..ToolOptions::default()
        };
        assert_eq!(options.grouping(), GroupingPolicy::None);
        options.apply(OptionIntent::Toggle(BoolOption::Hierarchy, true));
        assert_eq!(options.grouping(), GroupingPolicy::Stroke);
        options.apply(OptionIntent::GroupBy(GroupBy::Source));
        assert_eq!(options.grouping(), GroupingPolicy::Source);
    }

    #[test]
    fn ramp_codes_round_trip_through_descriptors() {
        for ramp in [RampFx::None, RampFx::Rotate, RampFx::Scale, RampFx::Both] {
            assert_eq!(RampFx::from_code(ramp.code()), ramp);
        }
        assert!(RampFx::Both.affects_rotation() && RampFx::Both.affects_scale());
        assert!(!RampFx::Scale.affects_rotation());
    }
}
