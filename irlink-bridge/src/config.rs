//! Configuration for the bridge binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use irlink_core::ControllerOptions;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Controller identity, topics and heartbeat.
    pub controller: ControllerOptions,
    /// Simulated IR transceiver.
    pub simulator: SimulatorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Behaviour of the simulated IR transceiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Pulse buffer delivered when a recording completes (microseconds).
    pub capture: Vec<u32>,
    /// Time between arming the receiver and the capture arriving.
    pub capture_delay_ms: u64,
    /// Upper bound on how long a simulated playback takes.
    pub max_play_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            // NEC-style header followed by a few bits.
            capture: vec![9000, 4500, 560, 560, 560, 1690, 560, 560, 560, 1690, 560],
            capture_delay_ms: 1500,
            max_play_ms: 500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Effective log filter: the debug toggle wins over the level.
    pub fn log_level(&self) -> &str {
        if self.controller.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
