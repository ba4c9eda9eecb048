use serde::{Serialize, Deserialize};
use std::fs::File;
use std::io::prelude::*;

use anyhow::{bail, Context};


#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsSettings,
    pub stage: StageSettings,
    /// Physics Body Editor document loaded into the scene's body editor.
    pub bodies: Option<String>,
}


#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: (f32, f32),
    /// How many stage units make up one physics meter.
    pub ui_per_meter: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Also remove the body from the physics world when its wrapper is destroyed.
    /// Off by default: the world is expected to clean bodies up itself.
    pub destroy_body_in_world: bool,
}


impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: (0.0, -10.0),
            ui_per_meter: 10.0,
            velocity_iterations: 6,
            position_iterations: 2,
            destroy_body_in_world: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StageSettings {
    pub width: f32,
    pub height: f32,
}


impl Default for StageSettings {
    fn default() -> Self {
        Self {
            width: 1400.0, // Default stage size
            height: 700.0,
        }
    }
}


impl Settings {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let mut file = File::open(file_path)
            .with_context(|| format!("opening settings file {file_path}"))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("parsing settings file {file_path}"))?;
        settings.validate().with_context(|| format!("checking settings file {file_path}"))?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let ui_per_meter = self.physics.ui_per_meter;
        if ui_per_meter.is_nan() || ui_per_meter <= 0.0 {
            bail!("physics.ui_per_meter must be positive, got {ui_per_meter}");
        }
        Ok(())
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        let mut file = File::create(file_path)
            .with_context(|| format!("creating settings file {file_path}"))?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
