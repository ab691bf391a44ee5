//! Swarm configuration (parsed from TOML)
//!
//! ```toml
//! [swarm]
//! particle_count = 100
//! mass = [15, 17]
//! radius = [0.02, 0.08]
//! max_speed = [0.2, 0.4]
//! color = "#5689a0"
//!
//! [tail]
//! capacity = 8
//! curve = "centripetal"
//!
//! [tube]
//! radius = 0.037
//!
//! [target]
//! orbit_step = 0.15
//! ```

use crate::tail::TailSettings;
use crate::tube::TubeSettings;
use comet_core::spline::CurveType;
use comet_core::{Color, CometError, Result};
use rand::Rng;
use std::path::Path;

pub const MIN_PARTICLES: usize = 1;
pub const MAX_PARTICLES: usize = 1000;

/// Inclusive-exclusive range a per-particle value is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in `[min, max)`; a collapsed range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.min + rng.gen::<f32>() * (self.max - self.min)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CometError::config(format!("{field} range must be finite")));
        }
        if self.min > self.max {
            return Err(CometError::config(format!(
                "{field} range is inverted: [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Everything needed to spawn and drive a swarm
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub particle_count: usize,
    pub mass: ValueRange,
    pub radius: ValueRange,
    pub max_speed: ValueRange,
    /// Magnitude of the random initial velocity
    pub drift_speed: ValueRange,
    pub color: Color,
    pub tail: TailSettings,
    pub tube: TubeSettings,
    /// Simulation steps once every this many frames
    pub update_interval: u32,
    /// Orbit angle advance per frame, radians
    pub orbit_step: f32,
    pub orbit_radius: f32,
    /// Side length of the square pick plane
    pub plane_size: f32,
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            particle_count: 100,
            mass: ValueRange::new(15.0, 17.0),
            radius: ValueRange::new(0.02, 0.08),
            max_speed: ValueRange::new(0.2, 0.4),
            drift_speed: ValueRange::new(0.3, 2.3),
            color: Color::from_hex(0x5689a0),
            tail: TailSettings::default(),
            tube: TubeSettings::default(),
            update_interval: 3,
            orbit_step: 0.15,
            orbit_radius: 0.5,
            plane_size: 20.0,
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Parse a SwarmConfig from a TOML document table. Missing keys keep
    /// their defaults; the result is validated.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = Self::default();

        if let Some(swarm) = section(table, "swarm")? {
            if let Some(v) = swarm.get("particle_count") {
                config.particle_count = toml_count(v, "swarm.particle_count")?;
            }
            if let Some(v) = swarm.get("mass") {
                config.mass = toml_range(v, "swarm.mass")?;
            }
            if let Some(v) = swarm.get("radius") {
                config.radius = toml_range(v, "swarm.radius")?;
            }
            if let Some(v) = swarm.get("max_speed") {
                config.max_speed = toml_range(v, "swarm.max_speed")?;
            }
            if let Some(v) = swarm.get("drift_speed") {
                config.drift_speed = toml_range(v, "swarm.drift_speed")?;
            }
            if let Some(v) = swarm.get("color") {
                let s = v
                    .as_str()
                    .ok_or_else(|| CometError::config("swarm.color must be a string"))?;
                config.color = Color::from_hex_str(s)?;
            }
            if let Some(v) = swarm.get("update_interval") {
                let n = toml_count(v, "swarm.update_interval")?;
                config.update_interval =
                    u32::try_from(n).map_err(|_| CometError::ValueOutOfRange {
                        field: "swarm.update_interval".into(),
                        min: 1.0,
                        max: u32::MAX as f64,
                        value: n as f64,
                    })?;
            }
            if let Some(v) = swarm.get("seed") {
                let n = v
                    .as_integer()
                    .ok_or_else(|| CometError::config("swarm.seed must be an integer"))?;
                let seed = u64::try_from(n).map_err(|_| CometError::ValueOutOfRange {
                    field: "swarm.seed".into(),
                    min: 0.0,
                    max: u64::MAX as f64,
                    value: n as f64,
                })?;
                config.seed = Some(seed);
            }
        }

        if let Some(tail) = section(table, "tail")? {
            if let Some(v) = tail.get("capacity") {
                config.tail.capacity = toml_count(v, "tail.capacity")?;
            }
            if let Some(v) = tail.get("min_length") {
                config.tail.min_length = toml_f32(v, "tail.min_length")?;
            }
            if let Some(v) = tail.get("min_distance") {
                config.tail.min_distance = toml_f32(v, "tail.min_distance")?;
            }
            if let Some(v) = tail.get("max_distance") {
                config.tail.max_distance = toml_f32(v, "tail.max_distance")?;
            }
            let tension = match tail.get("tension") {
                Some(v) => toml_f32(v, "tail.tension")?,
                None => 0.5,
            };
            if let Some(v) = tail.get("curve") {
                let name = v
                    .as_str()
                    .ok_or_else(|| CometError::config("tail.curve must be a string"))?;
                config.tail.curve_type = match name {
                    "centripetal" => CurveType::Centripetal,
                    "chordal" => CurveType::Chordal,
                    "catmullrom" | "uniform" => CurveType::Uniform { tension },
                    other => {
                        return Err(CometError::config(format!(
                            "unknown tail curve type '{other}'"
                        )))
                    }
                };
            }
        }

        if let Some(tube) = section(table, "tube")? {
            if let Some(v) = tube.get("tubular_segments") {
                config.tube.tubular_segments = toml_count(v, "tube.tubular_segments")?;
            }
            if let Some(v) = tube.get("radial_segments") {
                config.tube.radial_segments = toml_count(v, "tube.radial_segments")?;
            }
            if let Some(v) = tube.get("radius") {
                config.tube.radius = toml_f32(v, "tube.radius")?;
            }
            if let Some(v) = tube.get("closed") {
                config.tube.closed = v
                    .as_bool()
                    .ok_or_else(|| CometError::config("tube.closed must be true or false"))?;
            }
        }

        if let Some(target) = section(table, "target")? {
            if let Some(v) = target.get("orbit_step") {
                config.orbit_step = toml_f32(v, "target.orbit_step")?;
            }
            if let Some(v) = target.get("orbit_radius") {
                config.orbit_radius = toml_f32(v, "target.orbit_radius")?;
            }
            if let Some(v) = target.get("plane_size") {
                config.plane_size = toml_f32(v, "target.plane_size")?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PARTICLES..=MAX_PARTICLES).contains(&self.particle_count) {
            return Err(CometError::ValueOutOfRange {
                field: "particle_count".into(),
                min: MIN_PARTICLES as f64,
                max: MAX_PARTICLES as f64,
                value: self.particle_count as f64,
            });
        }
        self.mass.validate("mass")?;
        if self.mass.min <= 0.0 {
            return Err(CometError::config(format!(
                "mass must be positive, got minimum {}",
                self.mass.min
            )));
        }
        self.radius.validate("radius")?;
        if self.radius.min <= 0.0 {
            return Err(CometError::config("radius must be positive"));
        }
        self.max_speed.validate("max_speed")?;
        if self.max_speed.min < 0.0 {
            return Err(CometError::config("max_speed must be non-negative"));
        }
        self.drift_speed.validate("drift_speed")?;
        self.tail.validate()?;
        self.tube.validate()?;
        if self.update_interval == 0 {
            return Err(CometError::config("update_interval must be at least 1"));
        }
        if !self.orbit_step.is_finite() || !self.orbit_radius.is_finite() {
            return Err(CometError::config("orbit parameters must be finite"));
        }
        if !self.plane_size.is_finite() || self.plane_size <= 0.0 {
            return Err(CometError::config("plane_size must be positive"));
        }
        Ok(())
    }
}

/// Read and parse a swarm config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SwarmConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let table: toml::value::Table = toml::from_str(&text)?;
    SwarmConfig::from_toml(&table)
}

fn section<'a>(table: &'a toml::value::Table, name: &str) -> Result<Option<&'a toml::value::Table>> {
    match table.get(name) {
        None => Ok(None),
        Some(v) => v
            .as_table()
            .map(Some)
            .ok_or_else(|| CometError::config(format!("[{name}] must be a table"))),
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, field: &str) -> Result<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .ok_or_else(|| CometError::config(format!("{field} must be a number")))
}

fn toml_count(v: &toml::Value, field: &str) -> Result<usize> {
    let n = v
        .as_integer()
        .ok_or_else(|| CometError::config(format!("{field} must be an integer")))?;
    usize::try_from(n).map_err(|_| CometError::ValueOutOfRange {
        field: field.into(),
        min: 0.0,
        max: usize::MAX as f64,
        value: n as f64,
    })
}

/// A `[min, max]` pair, or a single number for a fixed value.
fn toml_range(v: &toml::Value, field: &str) -> Result<ValueRange> {
    match v.as_array() {
        Some(arr) if arr.len() == 2 => Ok(ValueRange::new(
            toml_f32(&arr[0], field)?,
            toml_f32(&arr[1], field)?,
        )),
        Some(_) => Err(CometError::config(format!(
            "{field} must be a [min, max] pair"
        ))),
        None => {
            let x = toml_f32(v, field)?;
            Ok(ValueRange::new(x, x))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn default_config_is_sane() {
        let config = SwarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.update_interval, 3);
        assert_eq!(config.tail.capacity, 8);
        assert_eq!(config.tube.tubular_segments, 6);
    }

    #[test]
    fn parse_from_toml() {
        let toml_str = r##"
[swarm]
particle_count = 250
mass = [10, 12.5]
color = "#ff0000"
seed = 42

[tail]
capacity = 12
curve = "chordal"

[tube]
radial_segments = 8
closed = true

[target]
orbit_step = 0.1
"##;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let config = SwarmConfig::from_toml(&table).unwrap();
        assert_eq!(config.particle_count, 250);
        assert!((config.mass.min - 10.0).abs() < 1e-6);
        assert!((config.mass.max - 12.5).abs() < 1e-6);
        assert!((config.color.r - 1.0).abs() < 1e-6);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tail.capacity, 12);
        assert_eq!(config.tail.curve_type, CurveType::Chordal);
        assert_eq!(config.tube.radial_segments, 8);
        assert!(config.tube.closed);
        assert!((config.orbit_step - 0.1).abs() < 1e-6);
        // untouched keys keep defaults
        assert!((config.radius.max - 0.08).abs() < 1e-6);
    }

    #[test]
    fn toml_integer_float_coercion() {
        let table: toml::value::Table = toml::from_str("[tube]\nradius = 1").unwrap();
        let config = SwarmConfig::from_toml(&table).unwrap();
        assert!((config.tube.radius - 1.0).abs() < 1e-6);
    }

    #[test]
    fn particle_count_bounds() {
        for bad in ["0", "1001"] {
            let table: toml::value::Table =
                toml::from_str(&format!("[swarm]\nparticle_count = {bad}")).unwrap();
            let err = SwarmConfig::from_toml(&table).unwrap_err();
            assert!(matches!(err, CometError::ValueOutOfRange { .. }));
        }
    }

    #[test]
    fn degenerate_values_fail_fast() {
        let cases = [
            "[swarm]\nmass = [0, 1]",
            "[swarm]\nmass = [17, 15]",
            "[swarm]\ncolor = \"blue\"",
            "[tail]\ncapacity = 3",
            "[tail]\ncurve = \"bezier\"",
            "[tube]\ntubular_segments = 0",
            "[swarm]\nupdate_interval = 0",
            "swarm = 5",
        ];
        for case in cases {
            let table: toml::value::Table = toml::from_str(case).unwrap();
            assert!(SwarmConfig::from_toml(&table).is_err(), "accepted: {case}");
        }
    }

    #[test]
    fn mistyped_values_name_their_field() {
        let cases = [
            ("[tube]\nradius = \"0.1\"", "tube.radius"),
            ("[swarm]\nmass = \"heavy\"", "swarm.mass"),
            ("[swarm]\nmax_speed = [0.2]", "swarm.max_speed"),
            ("[target]\norbit_step = true", "target.orbit_step"),
            ("[tail]\ncurve = 3", "tail.curve"),
            ("[tube]\nclosed = \"yes\"", "tube.closed"),
            ("[swarm]\nseed = 1.5", "swarm.seed"),
        ];
        for (case, field) in cases {
            let table: toml::value::Table = toml::from_str(case).unwrap();
            let err = SwarmConfig::from_toml(&table).unwrap_err();
            assert!(err.to_string().contains(field), "{case}: {err}");
        }
    }

    #[test]
    fn integers_outside_target_type_are_rejected() {
        let table: toml::value::Table = toml::from_str("[swarm]\nseed = -1").unwrap();
        let err = SwarmConfig::from_toml(&table).unwrap_err();
        assert!(matches!(err, CometError::ValueOutOfRange { ref field, .. } if field == "swarm.seed"));

        let table: toml::value::Table =
            toml::from_str("[swarm]\nupdate_interval = 4294967296").unwrap();
        let err = SwarmConfig::from_toml(&table).unwrap_err();
        assert!(
            matches!(err, CometError::ValueOutOfRange { ref field, .. } if field == "swarm.update_interval")
        );
    }

    #[test]
    fn range_sampling_stays_inside() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = ValueRange::new(15.0, 17.0);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
        assert_eq!(ValueRange::new(2.0, 2.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_config("/nonexistent/comet/swarm.toml").unwrap_err();
        assert!(matches!(err, CometError::IoError(_)));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let table: toml::value::Table =
            toml::from_str(include_str!("../../../configs/swarm.toml")).unwrap();
        let config = SwarmConfig::from_toml(&table).unwrap();
        let defaults = SwarmConfig::default();
        assert_eq!(config.particle_count, defaults.particle_count);
        assert_eq!(config.mass, defaults.mass);
        assert_eq!(config.tail, defaults.tail);
        assert_eq!(config.tube, defaults.tube);
        assert_eq!(config.color, defaults.color);
    }
}
