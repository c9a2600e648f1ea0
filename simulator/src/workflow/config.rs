use crate::generator::shots::ShotGeneratorConfig;
use anyhow::Context;
use lasercore::target::TargetGeometry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub geometry: TargetGeometry,
    pub warning_ms: u64,
    pub bind: SocketAddr,
    pub generator: ShotGeneratorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: TargetGeometry::reference(),
            warning_ms: 3_000,
            bind: SocketAddr::from(([127, 0, 0, 1], 8765)),
            generator: ShotGeneratorConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating session config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.geometry
            .validate()
            .context("validating target geometry")?;
        anyhow::ensure!(self.warning_ms > 0, "warning_ms must be positive");
        self.generator
            .validate()
            .context("validating generator settings")
    }

    pub fn from_args(bind: SocketAddr, seed: u64) -> Self {
        let mut config = Self {
            bind,
            ..Default::default()
        };
        config.generator.seed = seed;
        config
    }

    pub fn warning_lifetime(&self) -> Duration {
        Duration::from_millis(self.warning_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_reference_geometry() {
        let cfg = SessionConfig::from_args(SocketAddr::from(([0, 0, 0, 0], 9100)), 7);
        assert_eq!(cfg.geometry, TargetGeometry::reference());
        assert_eq!(cfg.generator.seed, 7);
        assert_eq!(cfg.bind.port(), 9100);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"geometry:\n  center_x: 400\n  center_y: 300\n  bull_radius: 20\n  target_radius: 150\n  ring_width: 15\nwarning_ms: 1500\ngenerator:\n  seed: 9\n  spread: 25.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SessionConfig::load(&path).unwrap();
        assert_eq!(cfg.geometry.ring_count(), 10);
        assert_eq!(cfg.warning_lifetime(), Duration::from_millis(1500));
        assert_eq!(cfg.generator.seed, 9);
        assert_eq!(cfg.generator.frame_width, 320);
        assert_eq!(cfg.bind.port(), 8765);
    }

    #[test]
    fn config_load_rejects_bad_geometry() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"geometry:\n  center_x: 0\n  center_y: 0\n  bull_radius: 10\n  target_radius: 100\n  ring_width: 0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let err = SessionConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("ring width"));
    }

    #[test]
    fn config_load_rejects_zero_warning_lifetime() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"warning_ms: 0\n").unwrap();
        let path = temp.into_temp_path();
        let err = SessionConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("warning_ms"));
    }

    #[test]
    fn config_load_rejects_bad_generator() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"generator:\n  idle_ratio: 2.0\n").unwrap();
        let path = temp.into_temp_path();
        let err = SessionConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("idle_ratio"));
    }
}
