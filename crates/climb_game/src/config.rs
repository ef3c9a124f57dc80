//! Game configuration loaded from JSON.
//!
//! Every field has a default, so an empty object `{}` describes the stock
//! game: a 300 second climb to y = 30000 on `assets/map/map_highres.png`.

use climb_core::input::ControlBindings;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::MovementConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub base_height: f32,
    /// Window width for a single full-screen view (16:10).
    pub base_width_single: f32,
    /// Window width for each half of a split screen.
    pub base_width_split: f32,
    pub smoothing: f32,
    pub zoom_smoothing: f32,
    pub zoom_out_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            base_height: 400.0,
            base_width_single: 640.0,
            base_width_split: 375.0,
            smoothing: 0.15,
            zoom_smoothing: 0.1,
            zoom_out_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_path: String,
    pub goal_y: f32,
    pub time_limit_secs: f64,
    pub spawn_y: f32,
    /// One spawn column per player slot.
    pub spawn_x: Vec<f32>,
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    /// One binding table per player slot.
    pub bindings: Vec<ControlBindings>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_path: "assets/map/map_highres.png".to_string(),
            goal_y: 30000.0,
            time_limit_secs: 300.0,
            spawn_y: 200.0,
            spawn_x: vec![2800.0, 3200.0],
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            bindings: vec![ControlBindings::player_one(), ControlBindings::player_two()],
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    log::info!(
        "Config loaded: {} (goal y={}, time limit {}s)",
        path.display(),
        config.goal_y,
        config.time_limit_secs
    );
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let movement = &config.movement;
    let positive = [
        ("movement.body_width", movement.body_width),
        ("movement.body_height", movement.body_height),
        ("movement.max_speed", movement.max_speed),
        ("movement.accel_ground", movement.accel_ground),
        ("movement.accel_air", movement.accel_air),
        ("movement.jump_speed", movement.jump_speed),
        ("movement.gravity", movement.gravity),
        ("camera.base_height", config.camera.base_height),
        ("camera.base_width_single", config.camera.base_width_single),
        ("camera.base_width_split", config.camera.base_width_split),
        ("camera.zoom_out_scale", config.camera.zoom_out_scale),
        ("goal_y", config.goal_y),
    ];
    for (name, value) in positive {
        if !(value > 0.0) {
            return Err(format!("Config validation failed: {name} must be > 0"));
        }
    }
    if !(config.time_limit_secs > 0.0) {
        return Err("Config validation failed: time_limit_secs must be > 0".to_string());
    }

    for (name, value) in [
        ("camera.smoothing", config.camera.smoothing),
        ("camera.zoom_smoothing", config.camera.zoom_smoothing),
    ] {
        if !(value > 0.0 && value < 1.0) {
            return Err(format!("Config validation failed: {name} must be in (0, 1)"));
        }
    }

    if config.bindings.is_empty() || config.bindings.len() > 2 {
        return Err(format!(
            "Config validation failed: expected 1 or 2 binding tables, got {}",
            config.bindings.len()
        ));
    }
    if let Some(slot) = config.bindings.iter().position(|b| b.is_empty()) {
        return Err(format!(
            "Config validation failed: binding table {} is empty",
            slot + 1
        ));
    }
    if config.spawn_x.len() < config.bindings.len() {
        return Err(format!(
            "Config validation failed: {} binding tables but only {} spawn columns",
            config.bindings.len(),
            config.spawn_x.len()
        ));
    }
    if config.spawn_y < 0.0 {
        return Err("Config validation failed: spawn_y must be >= 0".to_string());
    }
    Ok(())
}

/// The first `slots` spawn columns must leave room for the body inside the map.
pub fn validate_spawns(
    config: &GameConfig,
    slots: usize,
    map_width: u32,
    map_height: u32,
) -> Result<(), String> {
    if config.spawn_x.len() < slots {
        return Err(format!(
            "Config validation failed: {slots} spawn columns needed, got {}",
            config.spawn_x.len()
        ));
    }
    let max_x = map_width as f32 - config.movement.body_width;
    for (slot, &x) in config.spawn_x[..slots].iter().enumerate() {
        if x < 0.0 || x > max_x {
            return Err(format!(
                "Config validation failed: spawn_x[{slot}] = {x} outside map width {map_width}"
            ));
        }
    }
    if config.spawn_y >= map_height as f32 {
        return Err(format!(
            "Config validation failed: spawn_y = {} outside map height {map_height}",
            config.spawn_y
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use climb_core::input::{Action, Key};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "climb_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn empty_object_yields_stock_game() {
        let config: GameConfig = serde_json::from_str("{}").expect("empty config parses");
        assert_eq!(config.goal_y, 30000.0);
        assert_eq!(config.time_limit_secs, 300.0);
        assert_eq!(config.spawn_x, vec![2800.0, 3200.0]);
        assert_eq!(config.movement.jump_speed, 3.24);
        assert_eq!(config.camera.base_width_single, 640.0);
        assert_eq!(config.bindings[0], ControlBindings::player_one());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{
              "goal_y": 1200.0,
              "movement": { "gravity": 0.1, "facing_mode": "mirrored" },
              "bindings": [ { "move_left": "Left", "move_right": "Right", "jump": "Space" } ]
            }"#,
        )
        .expect("partial config parses");
        assert_eq!(config.goal_y, 1200.0);
        assert_eq!(config.movement.gravity, 0.1);
        assert_eq!(config.movement.max_speed, 2.5);
        assert_eq!(
            config.movement.facing_mode,
            crate::controller::FacingMode::Mirrored
        );
        assert_eq!(config.bindings.len(), 1);
        assert_eq!(config.bindings[0].key_for(Action::Jump), Some(Key::Space));
        assert_eq!(config.bindings[0].key_for(Action::ZoomOut), None);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn validation_rejects_bad_smoothing() {
        let mut config = GameConfig::default();
        config.camera.smoothing = 1.5;
        let err = validate_config(&config).expect_err("smoothing > 1 must fail");
        assert!(err.contains("camera.smoothing"));

        config.camera.smoothing = 0.0;
        assert!(validate_config(&config).is_err());

        config.camera.smoothing = 0.15;
        config.camera.zoom_smoothing = 1.0;
        let err = validate_config(&config).expect_err("smoothing of 1 never lags");
        assert!(err.contains("camera.zoom_smoothing must be in (0, 1)"));
    }

    #[test]
    fn validation_rejects_non_positive_physics() {
        let mut config = GameConfig::default();
        config.movement.max_speed = 0.0;
        let err = validate_config(&config).expect_err("zero speed must fail");
        assert!(err.contains("movement.max_speed"));

        let mut config = GameConfig::default();
        config.movement.gravity = f32::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn validation_requires_spawn_per_binding_table() {
        let mut config = GameConfig::default();
        config.spawn_x = vec![2800.0];
        let err = validate_config(&config).expect_err("missing spawn must fail");
        assert!(err.contains("spawn columns"));

        let mut config = GameConfig::default();
        config.bindings.push(ControlBindings::player_one());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn spawns_must_fit_the_map() {
        let config = GameConfig::default();
        assert!(validate_spawns(&config, 2, 6000, 30000).is_ok());
        let err = validate_spawns(&config, 2, 3000, 30000).expect_err("3200 is outside");
        assert!(err.contains("spawn_x[1]"));
        assert!(validate_spawns(&config, 2, 6000, 150).is_err());
        assert!(validate_spawns(&config, 3, 6000, 30000).is_err());
    }

    #[test]
    fn unused_spawn_slots_are_not_checked() {
        let config = GameConfig::default();
        assert!(validate_spawns(&config, 1, 3000, 30000).is_ok());
    }

    #[test]
    fn load_config_from_file() {
        let path = temp_file_path("valid");
        fs::write(&path, r#"{ "time_limit_secs": 60.0 }"#).expect("write temp file");
        let config = load_config_from_path(&path).expect("config should load");
        assert_eq!(config.time_limit_secs, 60.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let path = temp_file_path("broken");
        fs::write(&path, r#"{ "goal_y": "high" }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("bad type must fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }
}
