//! Presets for the simulation

use crate::settings::Tunables;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

pub struct Preset {
    pub name: String,
    pub tunables: Tunables,
}

impl Preset {
    pub fn new(name: String, tunables: Tunables) -> Self {
        Self { name, tunables }
    }
}

pub struct PresetManager {
    presets: Vec<Preset>,
}

impl PresetManager {
    pub fn new() -> Self {
        Self { presets: vec![] }
    }

    pub fn add_preset(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn get_preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_preset_manager() -> PresetManager {
    let mut preset_manager = PresetManager::new();
    preset_manager.add_preset(Preset::new("Default".to_string(), Tunables::default()));
    preset_manager.add_preset(Preset::new(
        "Sponge".to_string(),
        Tunables {
            sensor_offset: 20.0,
            sensor_angle: FRAC_PI_6,
            sensor_size: 3,
            turn_rate: 6.0,
            move_speed: 25.0,
            decay_factor: 0.99,
        },
    ));
    preset_manager.add_preset(Preset::new(
        "Spiky".to_string(),
        Tunables {
            sensor_offset: 20.0,
            sensor_angle: FRAC_PI_6,
            sensor_size: 2,
            turn_rate: 7.0,
            move_speed: 30.0,
            decay_factor: 0.97,
        },
    ));
    preset_manager.add_preset(Preset::new(
        "Curls".to_string(),
        Tunables {
            sensor_offset: 12.0,
            sensor_angle: FRAC_PI_4,
            sensor_size: 4,
            turn_rate: 10.0,
            move_speed: 30.0,
            decay_factor: 0.97,
        },
    ));
    preset_manager.add_preset(Preset::new(
        "Waves".to_string(),
        Tunables {
            sensor_offset: 16.0,
            sensor_angle: FRAC_PI_4,
            sensor_size: 6,
            turn_rate: 9.0,
            move_speed: 15.0,
            decay_factor: 0.98,
        },
    ));
    preset_manager.add_preset(Preset::new(
        "Snake".to_string(),
        Tunables {
            sensor_offset: 5.0,
            sensor_angle: FRAC_PI_2,
            sensor_size: 2,
            turn_rate: 6.5,
            move_speed: 10.0,
            decay_factor: 0.99,
        },
    ));
    preset_manager
}
