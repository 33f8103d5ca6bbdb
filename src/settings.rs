//! Display settings and preferences
//!
//! Read as JSON from LocalStorage, separately from anything the simulation
//! owns. The host page writes them; native builds always use defaults.

use serde::{Deserialize, Serialize};

use crate::renderer::Theme;
use crate::sim::SimulationConfig;

/// Drift scale applied when reduced motion is requested
const REDUCED_MOTION_DRIFT: f32 = 0.25;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Whether to draw the scanline overlay
    pub fn scanlines_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Whether pegs pulse
    pub fn peg_glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Extra collision passes on top of the configured count
    pub fn extra_iterations(&self) -> u32 {
        match self {
            QualityPreset::Low | QualityPreset::Medium => 0,
            QualityPreset::High => 1,
        }
    }
}

/// Widget settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Draw payload labels on bodies
    pub show_labels: bool,
    /// Stop the loop while the tab is hidden
    pub pause_when_hidden: bool,

    // === Accessibility ===
    /// Reduced motion (gentler drift, no pulsing)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            show_labels: true,
            pause_when_hidden: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective peg glow (respects reduced_motion)
    pub fn effective_peg_glow(&self) -> bool {
        self.quality.peg_glow_enabled() && !self.reduced_motion
    }

    /// Adjust a simulation config to these preferences
    pub fn apply(&self, config: &mut SimulationConfig) {
        config.collision_iterations += self.quality.extra_iterations();
        if self.reduced_motion {
            config.drift_amplitude *= REDUCED_MOTION_DRIFT;
        }
    }

    /// `base` with effects switched to match these preferences
    pub fn theme(&self, base: Theme) -> Theme {
        Theme {
            scanlines: base.scanlines && self.quality.scanlines_enabled(),
            peg_glow: base.peg_glow && self.effective_peg_glow(),
            show_labels: base.show_labels && self.show_labels,
            ..base
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "plinko_field_settings";

    /// Parse stored settings; missing fields keep their defaults
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                None
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|storage| storage.get_item(Self::STORAGE_KEY).ok().flatten());

        if let Some(settings) = stored.as_deref().and_then(Self::from_json) {
            log::info!("Loaded settings from LocalStorage");
            return settings;
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("Settings key {} unused on native", Self::STORAGE_KEY);
        Self::default()
    }
}
