//! Simulation tuning
//!
//! Every constant the stepping function reads lives here so both widget
//! flavours (calm floating pills, Plinko board) share one integrator.

use serde::{Deserialize, Serialize};

use crate::consts::{BALL_RADIUS, GATE_Y};

/// How the arena is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Bodies scattered across the arena, drifting gently
    #[default]
    Floating,
    /// Bodies held in a row above a gate, dropped through pegs
    Plinko,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Floating => "floating",
            Layout::Plinko => "plinko",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "floating" | "calm" => Some(Layout::Floating),
            "plinko" => Some(Layout::Plinko),
            _ => None,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub layout: Layout,

    // === Drift ===
    /// Peak drift acceleration (px/s²)
    pub drift_amplitude: f32,
    /// Drift oscillation rate on the x axis (Hz)
    pub drift_frequency_x: f32,
    /// Drift oscillation rate on the y axis (Hz)
    pub drift_frequency_y: f32,
    /// Constant downward acceleration (px/s², 0 = none)
    pub gravity: f32,

    // === Integration ===
    /// Per-frame velocity multiplier, in (0, 1)
    pub damping: f32,
    /// Velocity magnitude cap (px/s)
    pub max_speed: f32,
    /// Largest time increment a single step will integrate (s)
    pub max_dt: f32,

    // === Containment / collisions ===
    /// Restitution applied on wall and obstacle contact
    pub wall_bounce: f32,
    /// Extra gap kept between bodies
    pub collision_buffer: f32,
    /// Position-correction passes per step
    pub collision_iterations: u32,
    /// Inset from every wall
    pub padding: f32,
    /// Additional inset from the top wall (title safe area)
    pub top_offset: f32,

    // === Population ===
    /// Fixed body radius (None = sized from the label)
    pub body_radius: Option<f32>,
    /// Peg rows (Plinko only)
    pub peg_rows: u32,
    /// Bottom barriers (Plinko only)
    pub barriers: bool,
    /// Holding gate (Plinko only)
    pub gate: bool,
    /// Gate centre line as a fraction of arena height
    pub gate_y: f32,
    /// Speed below which a released body counts as settled (px/s)
    pub settle_speed: f32,
    /// Seed for phases, velocities and scattered placement
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::floating()
    }
}

impl SimulationConfig {
    /// Calm drifting pills
    pub fn floating() -> Self {
        Self {
            layout: Layout::Floating,

            drift_amplitude: 69.0,
            drift_frequency_x: 0.15,
            drift_frequency_y: 0.1,
            gravity: 0.0,

            damping: 0.90,
            max_speed: 100.0,
            max_dt: 0.032,

            wall_bounce: 0.4,
            collision_buffer: 6.0,
            collision_iterations: 2,
            padding: 12.0,
            top_offset: 56.0,

            body_radius: None,
            peg_rows: 0,
            barriers: false,
            gate: false,
            gate_y: GATE_Y,
            settle_speed: 0.0,
            seed: 0x5EED,
        }
    }

    /// Gated drop through a peg board
    pub fn plinko() -> Self {
        Self {
            layout: Layout::Plinko,

            drift_amplitude: 20.0,
            drift_frequency_x: 0.15,
            drift_frequency_y: 0.1,
            gravity: 600.0,

            damping: 0.98,
            max_speed: 700.0,
            max_dt: 1.0 / 30.0,

            wall_bounce: 0.4,
            collision_buffer: 2.0,
            collision_iterations: 3,
            padding: 0.0,
            top_offset: 0.0,

            body_radius: Some(BALL_RADIUS),
            peg_rows: 7,
            barriers: true,
            gate: true,
            gate_y: GATE_Y,
            settle_speed: 25.0,
            seed: 0x5EED,
        }
    }

    /// Preset for a layout
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Floating => Self::floating(),
            Layout::Plinko => Self::plinko(),
        }
    }

    /// Parse a (possibly partial) JSON config. Missing fields take the values
    /// of the preset for the given `layout` (floating if absent).
    pub fn from_json(json: &str) -> Option<Self> {
        let parsed = serde_json::from_str::<serde_json::Value>(json).and_then(|value| {
            let named = value
                .get("layout")
                .and_then(|l| l.as_str())
                .and_then(Layout::from_str);
            let layout = named.unwrap_or_default();
            let mut merged = serde_json::to_value(Self::for_layout(layout))?;
            if let (Some(base), Some(overrides)) = (merged.as_object_mut(), value.as_object()) {
                for (key, v) in overrides {
                    base.insert(key.clone(), v.clone());
                }
                // Aliases and other casings resolve to the canonical name
                if named.is_some() {
                    base.insert("layout".into(), layout.as_str().into());
                }
            }
            serde_json::from_value::<Self>(merged)
        });

        match parsed {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring invalid simulation config: {}", e);
                None
            }
        }
    }

    /// Clamp a frame gap to what one step may integrate
    #[inline]
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_str() {
        assert_eq!(Layout::from_str("Plinko"), Some(Layout::Plinko));
        assert_eq!(Layout::from_str("calm"), Some(Layout::Floating));
        assert_eq!(Layout::from_str("pachinko"), None);
        assert_eq!(Layout::from_str(Layout::Plinko.as_str()), Some(Layout::Plinko));
    }

    #[test]
    fn test_presets() {
        let calm = SimulationConfig::default();
        assert_eq!(calm.layout, Layout::Floating);
        assert_eq!(calm.collision_iterations, 2);
        assert!(!calm.gate);

        let plinko = SimulationConfig::plinko();
        assert!(plinko.gate);
        assert!(plinko.gravity > 0.0);
        assert!(plinko.damping > 0.0 && plinko.damping < 1.0);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SimulationConfig::from_json(r#"{ "layout": "plinko", "max_speed": 50.0 }"#)
            .expect("valid json");
        assert_eq!(config.layout, Layout::Plinko);
        assert_eq!(config.max_speed, 50.0);
        // Missing fields come from the plinko preset
        assert_eq!(config.collision_buffer, 2.0);
        assert_eq!(config.body_radius, Some(BALL_RADIUS));

        let calm = SimulationConfig::from_json(r#"{ "damping": 0.5 }"#).expect("valid json");
        assert_eq!(calm, SimulationConfig { damping: 0.5, ..SimulationConfig::floating() });

        assert!(SimulationConfig::from_json("{ not json").is_none());
        assert!(SimulationConfig::from_json(r#"{ "layout": "spiral" }"#).is_none());
        assert!(SimulationConfig::from_json(r#"{ "max_speed": "fast" }"#).is_none());
    }

    #[test]
    fn test_from_json_accepts_layout_aliases() {
        let calm = SimulationConfig::from_json(r#"{ "layout": "calm" }"#).expect("known alias");
        assert_eq!(calm, SimulationConfig::floating());

        let shouted = SimulationConfig::from_json(r#"{ "layout": "Plinko", "seed": 7 }"#)
            .expect("layout names ignore case");
        assert_eq!(shouted, SimulationConfig { seed: 7, ..SimulationConfig::plinko() });
    }

    #[test]
    fn test_clamp_dt() {
        let config = SimulationConfig::plinko();
        assert_eq!(config.clamp_dt(1.0), config.max_dt);
        assert_eq!(config.clamp_dt(-0.5), 0.0);
        assert_eq!(config.clamp_dt(f32::NAN), 0.0);
        assert_eq!(config.clamp_dt(0.01), 0.01);
    }
}
