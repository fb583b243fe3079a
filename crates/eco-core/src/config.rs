//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::genome::{Genome, GENE_NAMES};
use crate::types::{Humidity, Species};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

pub const XSIZE: &str = "xsize";
pub const YSIZE: &str = "ysize";
pub const TIMELAPSE: &str = "timelapse";
pub const STOP_AT: &str = "stopAt";
pub const AUTORUN: &str = "autorun";
pub const WATER_TILES: &str = "waterTiles";
pub const HUMIDITY: &str = "humidity";
pub const START_GRASS_DENSITY: &str = "startGrassDensity";
pub const START_NO_CARNIVORES: &str = "startNoCarnivores";
pub const START_NO_HERBIVORES: &str = "startNoHerbivores";
pub const START_ENERGY_CARNIVORES: &str = "startEnergyCarnivores";
pub const START_ENERGY_HERBIVORES: &str = "startEnergyHerbivores";

/// Largest map area, in fields, that `xsize` and `ysize` may span together.
pub const MAX_FIELDS: i64 = 4_000_000;

/// Every known parameter with its default value and accepted range.
const PARAMETERS: [(&str, i64, std::ops::RangeInclusive<i64>); 12] = [
    (XSIZE, 100, 1..=10_000),
    (YSIZE, 100, 1..=10_000),
    (TIMELAPSE, 100, 0..=i64::MAX),
    (STOP_AT, 200, -1..=i64::MAX),
    (AUTORUN, -1, -1..=i64::MAX),
    (WATER_TILES, 10, 0..=i64::MAX),
    (HUMIDITY, 1, -2..=2),
    (START_GRASS_DENSITY, 100, 0..=100),
    (START_NO_CARNIVORES, 50, 0..=i64::MAX),
    (START_NO_HERBIVORES, 200, 0..=i64::MAX),
    (START_ENERGY_CARNIVORES, 150, 1..=i32::MAX as i64),
    (START_ENERGY_HERBIVORES, 100, 1..=i32::MAX as i64),
];

/// Config-file spellings accepted for parameter keys.
fn canonical_key(key: &str) -> &str {
    match key {
        "width" => XSIZE,
        "height" => YSIZE,
        "startHerbivores" => START_NO_HERBIVORES,
        "startCarnivores" => START_NO_CARNIVORES,
        other => other,
    }
}

/// String-keyed integer world settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct ParameterStore {
    values: BTreeMap<String, i64>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            values: PARAMETERS
                .iter()
                .map(|(key, default, _)| (key.to_string(), *default))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, i64>> for ParameterStore {
    type Error = Error;

    fn try_from(overrides: BTreeMap<String, i64>) -> Result<Self> {
        let mut store = ParameterStore::default();
        for (key, value) in overrides {
            store.set(&key, value)?;
        }
        Ok(store)
    }
}

impl From<ParameterStore> for BTreeMap<String, i64> {
    fn from(store: ParameterStore) -> Self {
        store.values
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Result<i64> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownParameter(key.to_string()))
    }

    /// Set a parameter. Unknown keys and out-of-range values are rejected
    /// and leave the store unchanged.
    pub fn set(&mut self, key: &str, value: i64) -> Result<()> {
        let (_, _, range) = PARAMETERS
            .iter()
            .find(|(name, _, _)| *name == key)
            .ok_or_else(|| Error::UnknownParameter(key.to_string()))?;
        let area = match key {
            XSIZE => value.saturating_mul(self.value(YSIZE)),
            YSIZE => value.saturating_mul(self.value(XSIZE)),
            _ => 0,
        };
        if !range.contains(&value) || area > MAX_FIELDS {
            return Err(Error::InvalidParameter {
                key: key.to_string(),
                value,
            });
        }
        debug!(parameter = key, value, "Parameter set");
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn value(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub fn width(&self) -> i32 {
        self.value(XSIZE) as i32
    }

    pub fn height(&self) -> i32 {
        self.value(YSIZE) as i32
    }

    pub fn timelapse_ms(&self) -> u64 {
        self.value(TIMELAPSE) as u64
    }

    /// Turn at which a running simulation pauses, if enabled.
    pub fn stop_at(&self) -> Option<u64> {
        u64::try_from(self.value(STOP_AT)).ok().filter(|t| *t > 0)
    }

    /// Number of turns for an unattended run, if enabled.
    pub fn autorun(&self) -> Option<u64> {
        u64::try_from(self.value(AUTORUN)).ok().filter(|t| *t > 0)
    }

    pub fn water_tiles(&self) -> usize {
        self.value(WATER_TILES) as usize
    }

    pub fn humidity(&self) -> Humidity {
        Humidity::from_value(self.value(HUMIDITY)).unwrap_or_default()
    }

    pub fn start_grass_density(&self) -> i32 {
        self.value(START_GRASS_DENSITY) as i32
    }

    pub fn start_population(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.value(START_NO_HERBIVORES) as usize,
            Species::Carnivore => self.value(START_NO_CARNIVORES) as usize,
        }
    }

    pub fn start_energy(&self, species: Species) -> i32 {
        match species {
            Species::Herbivore => self.value(START_ENERGY_HERBIVORES) as i32,
            Species::Carnivore => self.value(START_ENERGY_CARNIVORES) as i32,
        }
    }
}

/// Everything needed to build a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// World parameters
    #[serde(default)]
    pub parameters: ParameterStore,
    /// Genome given to wild-spawned herbivores
    #[serde(default = "herbivore_default_genome")]
    pub herbivore_genome: Genome,
    /// Genome given to wild-spawned carnivores
    #[serde(default = "carnivore_default_genome")]
    pub carnivore_genome: Genome,
    /// Random seed; `None` draws from system entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

pub fn herbivore_default_genome() -> Genome {
    Genome::from_values([0, 2, 10, 4, 10, 150, 10, 120, 15, 10, 2])
}

pub fn carnivore_default_genome() -> Genome {
    Genome::from_values([0, 3, 10, 4, 18, 200, 11, 200, 30, 10, 1])
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            parameters: ParameterStore::default(),
            herbivore_genome: herbivore_default_genome(),
            carnivore_genome: carnivore_default_genome(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    World,
    Genome(Species),
}

impl SimulationConfig {
    pub fn default_genome(&self, species: Species) -> &Genome {
        match species {
            Species::Herbivore => &self.herbivore_genome,
            Species::Carnivore => &self.carnivore_genome,
        }
    }

    pub fn set_default_genome(&mut self, species: Species, genome: Genome) {
        match species {
            Species::Herbivore => self.herbivore_genome = genome,
            Species::Carnivore => self.carnivore_genome = genome,
        }
    }

    /// Load a configuration file. `.json` files are read as serialized
    /// `SimulationConfig`s, anything else as an Ecologia config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&text)?,
            _ => Self::from_conf_str(&text)?,
        };
        info!(path = %path.display(), "Parsed config file");
        Ok(config)
    }

    /// Parse the line-oriented Ecologia config format:
    ///
    /// ```text
    /// [world]
    /// xsize 50
    /// humidity -1
    ///
    /// [herbivore]
    /// speed 3
    /// ```
    pub fn from_conf_str(text: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut genes: HashMap<Species, HashMap<String, i64>> = [Species::Herbivore, Species::Carnivore]
            .into_iter()
            .map(|species| {
                let map = config
                    .default_genome(species)
                    .to_map()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value as i64))
                    .collect();
                (species, map)
            })
            .collect();
        let mut section = None;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = Some(match name {
                    "world" => Section::World,
                    "herbivore" => Section::Genome(Species::Herbivore),
                    "carnivore" => Section::Genome(Species::Carnivore),
                    other => {
                        return Err(Error::Config {
                            line,
                            message: format!("unknown section [{}]", other),
                        })
                    }
                });
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let key = parts.next().unwrap_or_default();
            let value = parts
                .next()
                .ok_or_else(|| Error::Config {
                    line,
                    message: format!("missing value for configuration variable {}", key),
                })?
                .parse::<i64>()
                .map_err(|_| Error::Config {
                    line,
                    message: format!("invalid integer for configuration variable {}", key),
                })?;

            match section {
                None => {
                    return Err(Error::Config {
                        line,
                        message: format!("variable {} outside of any section", key),
                    })
                }
                Some(Section::World) => config
                    .parameters
                    .set(canonical_key(key), value)
                    .map_err(|err| Error::Config {
                        line,
                        message: err.to_string(),
                    })?,
                Some(Section::Genome(species)) => {
                    if !GENE_NAMES.contains(&key) {
                        return Err(Error::Config {
                            line,
                            message: format!("invalid config variable in the [{}] section: {}", species.to_string().to_lowercase(), key),
                        });
                    }
                    if let Some(map) = genes.get_mut(&species) {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }

        for (species, map) in &genes {
            config.set_default_genome(*species, Genome::from_map(map)?);
        }
        Ok(config)
    }
}
