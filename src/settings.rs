use crate::{diffusion::Neighborhood, errors::SlimeError, presets, steering::EdgePolicy};
use log::info;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};
use std::ops::RangeInclusive;

pub const DEFAULT_SETTINGS_FILE: &str = "settings";

// General settings
pub const DISPLAY_WIDTH: u32 = 1600;
pub const DISPLAY_HEIGHT: u32 = 900;
pub const RESOLUTION_SCALE: u32 = 2;

// Agent settings
/// A multiple of 64 so parallel batches divide evenly
pub const AGENT_COUNT: usize = 64 * 1024;

// Tunable ranges. Values outside these are clamped, never rejected.
pub const SENSOR_OFFSET_RANGE: RangeInclusive<f32> = 5.0..=20.0;
pub const SENSOR_ANGLE_RANGE: RangeInclusive<f32> = FRAC_PI_6..=FRAC_PI_2;
pub const SENSOR_SIZE_RANGE: RangeInclusive<u32> = 2..=6;
pub const TURN_RATE_RANGE: RangeInclusive<f32> = 6.0..=10.0;
pub const MOVE_SPEED_RANGE: RangeInclusive<f32> = 5.0..=30.0;
pub const DECAY_FACTOR_RANGE: RangeInclusive<f32> = f32::MIN_POSITIVE..=1.0;
/// The narrower band decay factors are drawn from when re-randomizing
pub const DECAY_FACTOR_RANDOM_RANGE: RangeInclusive<f32> = 0.97..=0.99;

pub const SENSOR_OFFSET: f32 = 9.0;
pub const SENSOR_ANGLE: f32 = FRAC_PI_4;
pub const SENSOR_SIZE: u32 = 2;
pub const TURN_RATE: f32 = 8.0;
pub const MOVE_SPEED: f32 = 20.0;
pub const DECAY_FACTOR: f32 = 0.99;

// Pheromone settings
pub const DEPOSIT_VALUE: f32 = 1.0;
pub const PERTURBATION_RADIUS: f32 = 8.0;

// Runner settings
pub const FRAME_DT: f32 = 1.0 / 60.0;
pub const FRAME_COUNT: u64 = 600;
pub const SNAPSHOT_INTERVAL: u64 = 60;
pub const OUTPUT_DIR: &str = "frames";

/// How the trail field is mapped to pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ColorMode {
    Grayscale,
    /// Trail intensity scales the current trail color
    Tinted,
    /// Trail intensity picks a color from a viridis gradient
    Gradient,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Tinted
    }
}

/// A scripted pointer click for the headless runner, in display pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ScriptedPointer {
    pub frame: u64,
    pub x: f32,
    pub y: f32,
}

/// The parameters the steering and maintenance kernels read every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tunables {
    /// How far out a sensor is from the agent
    pub sensor_offset: f32,
    /// The side sensors sit this many radians either side of the heading
    pub sensor_angle: f32,
    /// Half-width, in cells, of the square each sensor sums over
    pub sensor_size: u32,
    /// Radians per second
    pub turn_rate: f32,
    /// Cells per second
    pub move_speed: f32,
    pub decay_factor: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            sensor_offset: SENSOR_OFFSET,
            sensor_angle: SENSOR_ANGLE,
            sensor_size: SENSOR_SIZE,
            turn_rate: TURN_RATE,
            move_speed: MOVE_SPEED,
            decay_factor: DECAY_FACTOR,
        }
    }
}

impl Tunables {
    /// Pull every parameter into its valid range. NaN falls back to the default.
    pub fn clamped(self) -> Self {
        let defaults = Tunables::default();
        Self {
            sensor_offset: clamp_f32(self.sensor_offset, SENSOR_OFFSET_RANGE, defaults.sensor_offset),
            sensor_angle: clamp_f32(self.sensor_angle, SENSOR_ANGLE_RANGE, defaults.sensor_angle),
            sensor_size: self
                .sensor_size
                .clamp(*SENSOR_SIZE_RANGE.start(), *SENSOR_SIZE_RANGE.end()),
            turn_rate: clamp_f32(self.turn_rate, TURN_RATE_RANGE, defaults.turn_rate),
            move_speed: clamp_f32(self.move_speed, MOVE_SPEED_RANGE, defaults.move_speed),
            decay_factor: clamp_f32(self.decay_factor, DECAY_FACTOR_RANGE, defaults.decay_factor),
        }
    }

    /// A fresh parameter set drawn uniformly from the documented ranges.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            sensor_offset: rng.gen_range(SENSOR_OFFSET_RANGE),
            sensor_angle: rng.gen_range(SENSOR_ANGLE_RANGE),
            sensor_size: rng.gen_range(SENSOR_SIZE_RANGE),
            turn_rate: rng.gen_range(TURN_RATE_RANGE),
            move_speed: rng.gen_range(MOVE_SPEED_RANGE),
            decay_factor: rng.gen_range(DECAY_FACTOR_RANDOM_RANGE),
        }
    }
}

fn clamp_f32(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

// Keys are snake_case since config lowercases every key it reads
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub display_width: u32,
    pub display_height: u32,
    /// The field is the display size divided by this, rounded up
    pub resolution_scale: u32,
    pub agent_count: usize,
    /// Fixes every random draw of a run. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Named tunables from `presets`; overrides the individual tunable keys
    pub preset: Option<String>,
    pub sensor_offset: f32,
    pub sensor_angle: f32,
    pub sensor_size: u32,
    pub turn_rate: f32,
    pub move_speed: f32,
    pub decay_factor: f32,
    pub deposit_value: f32,
    pub edge_policy: EdgePolicy,
    pub neighborhood: Neighborhood,
    pub perturbation_radius: f32,
    /// Re-roll the tunables and trail color on every pointer click
    pub randomize_on_interaction: bool,
    pub color_mode: ColorMode,
    pub trail_color: [f32; 3],
    pub frame_dt: f32,
    pub frame_count: u64,
    /// Save a PNG every this many frames; 0 disables snapshots
    pub snapshot_interval: u64,
    pub output_dir: String,
    pub watch_settings: bool,
    pub pointer_events: Vec<ScriptedPointer>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_width: DISPLAY_WIDTH,
            display_height: DISPLAY_HEIGHT,
            resolution_scale: RESOLUTION_SCALE,
            agent_count: AGENT_COUNT,
            seed: None,
            preset: None,
            sensor_offset: SENSOR_OFFSET,
            sensor_angle: SENSOR_ANGLE,
            sensor_size: SENSOR_SIZE,
            turn_rate: TURN_RATE,
            move_speed: MOVE_SPEED,
            decay_factor: DECAY_FACTOR,
            deposit_value: DEPOSIT_VALUE,
            edge_policy: EdgePolicy::default(),
            neighborhood: Neighborhood::default(),
            perturbation_radius: PERTURBATION_RADIUS,
            randomize_on_interaction: true,
            color_mode: ColorMode::default(),
            trail_color: [1.0, 1.0, 1.0],
            frame_dt: FRAME_DT,
            frame_count: FRAME_COUNT,
            snapshot_interval: SNAPSHOT_INTERVAL,
            output_dir: OUTPUT_DIR.to_string(),
            watch_settings: false,
            pointer_events: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load_from_file(settings_file_name: &str) -> Result<Self, SlimeError> {
        let mut settings = config::Config::default();
        settings.merge(config::File::with_name(settings_file_name))?;
        let settings: Settings = settings.try_into()?;

        info!(
            "successfully loaded settings from '{}'",
            &settings_file_name
        );

        Ok(settings)
    }

    /// The simulation grid size: the display size scaled down, rounded up.
    pub fn field_extent(&self) -> (u32, u32) {
        let scale = self.resolution_scale.max(1);
        (
            (self.display_width + scale - 1) / scale,
            (self.display_height + scale - 1) / scale,
        )
    }

    /// The tunables this file asks for, with the preset applied and ranges clamped.
    pub fn tunables(&self) -> Result<Tunables, SlimeError> {
        let tunables = match &self.preset {
            Some(name) => presets::init_preset_manager()
                .get_preset(name)
                .map(|preset| preset.tunables)
                .ok_or_else(|| SlimeError::UnknownPreset(name.clone()))?,
            None => Tunables {
                sensor_offset: self.sensor_offset,
                sensor_angle: self.sensor_angle,
                sensor_size: self.sensor_size,
                turn_rate: self.turn_rate,
                move_speed: self.move_speed,
                decay_factor: self.decay_factor,
            },
        };

        Ok(tunables.clamped())
    }

    /// Deposits are clamped to be non-negative.
    pub fn deposit_value(&self) -> f32 {
        if self.deposit_value.is_nan() {
            DEPOSIT_VALUE
        } else {
            self.deposit_value.max(0.0)
        }
    }

    pub fn did_tunable_settings_change(&self, other: &Self) -> bool {
        self.preset != other.preset
            || self.sensor_offset != other.sensor_offset
            || self.sensor_angle != other.sensor_angle
            || self.sensor_size != other.sensor_size
            || self.turn_rate != other.turn_rate
            || self.move_speed != other.move_speed
            || self.decay_factor != other.decay_factor
    }

    pub fn did_field_settings_change(&self, other: &Self) -> bool {
        self.field_extent() != other.field_extent()
    }
}
