//! Heritable trait bundles and their mutation on reproduction.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Gene names in canonical trait order, as used by config files and snapshots.
pub const GENE_NAMES: [&str; 11] = [
    "mutationRate",
    "speed",
    "stamina",
    "sight",
    "metabolism",
    "ageLimit",
    "strength",
    "reproductiveEnergy",
    "maturityAge",
    "gestation",
    "reproductionRate",
];

/// Mutation rate an offspring genome holds before it has inherited anything.
/// It gates the mutation of the mutation rate itself.
const PRELIMINARY_MUTATION_RATE: u32 = 0;

/// Step size for age limit and reproductive energy mutations.
const COARSE_COEFFICIENT: i64 = 10;
/// Step size for every other trait.
const FINE_COEFFICIENT: i64 = 1;

/// An immutable set of non-negative integer traits ("genes").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawGenome")]
pub struct Genome {
    /// Probability of a mutation per gene, in percent
    mutation_rate: u32,
    /// Fields the animal may move per turn
    speed: u32,
    /// Exhaustion the animal tolerates before it has to rest
    stamina: u32,
    /// How many fields away the animal can see
    sight: u32,
    /// Efficiency of turning food into energy
    metabolism: u32,
    /// Age at which the animal dies of old age
    age_limit: u32,
    /// Fighting strength
    strength: u32,
    /// Energy needed before the animal will reproduce
    reproductive_energy: u32,
    /// Age of sexual maturity
    maturity_age: u32,
    /// Minimum number of turns between two litters
    gestation: u32,
    /// Offspring per litter
    reproduction_rate: u32,
}

/// Unchecked gene values as they arrive from configuration input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenome {
    mutation_rate: i64,
    speed: i64,
    stamina: i64,
    sight: i64,
    metabolism: i64,
    age_limit: i64,
    strength: i64,
    reproductive_energy: i64,
    maturity_age: i64,
    gestation: i64,
    reproduction_rate: i64,
}

impl From<RawGenome> for Genome {
    fn from(raw: RawGenome) -> Self {
        Genome::from_values([
            raw.mutation_rate,
            raw.speed,
            raw.stamina,
            raw.sight,
            raw.metabolism,
            raw.age_limit,
            raw.strength,
            raw.reproductive_energy,
            raw.maturity_age,
            raw.gestation,
            raw.reproduction_rate,
        ])
    }
}

impl Default for Genome {
    /// Species-neutral baseline, only used for bootstrapping.
    fn default() -> Self {
        Genome::from_values([5, 1, 10, 3, 10, 180, 10, 140, 20, 10, 1])
    }
}

fn gene(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// `+coefficient` or `-coefficient` with probability `rate`%, otherwise zero.
fn mutation<R: Rng + ?Sized>(rng: &mut R, rate: u32, coefficient: i64) -> i64 {
    if rng.gen_range(0..100u32) < rate {
        if rng.gen_range(0..2) == 0 {
            coefficient
        } else {
            -coefficient
        }
    } else {
        0
    }
}

impl Genome {
    /// Build a genome from values in canonical trait order (see [`GENE_NAMES`]).
    /// Negative values are clamped to zero.
    pub fn from_values(values: [i64; 11]) -> Self {
        let [mutation_rate, speed, stamina, sight, metabolism, age_limit, strength, reproductive_energy, maturity_age, gestation, reproduction_rate] =
            values;
        Self {
            mutation_rate: gene(mutation_rate),
            speed: gene(speed),
            stamina: gene(stamina),
            sight: gene(sight),
            metabolism: gene(metabolism),
            age_limit: gene(age_limit),
            strength: gene(strength),
            reproductive_energy: gene(reproductive_energy),
            maturity_age: gene(maturity_age),
            gestation: gene(gestation),
            reproduction_rate: gene(reproduction_rate),
        }
    }

    /// Build a genome from a name/value map. Every gene in [`GENE_NAMES`] must be present.
    pub fn from_map(genes: &HashMap<String, i64>) -> Result<Self> {
        let mut values = [0i64; 11];
        for (slot, name) in values.iter_mut().zip(GENE_NAMES) {
            *slot = *genes
                .get(name)
                .ok_or_else(|| Error::MissingGene(name.to_string()))?;
        }
        Ok(Self::from_values(values))
    }

    /// Derive an offspring genome, mutating every gene of the parent.
    ///
    /// The mutation rate is mutated first, gated by the offspring's preliminary
    /// rate; all other genes are then gated by the resulting rate.
    pub fn from_parent<R: Rng + ?Sized>(parent: &Genome, rng: &mut R) -> Self {
        let mutation_rate = parent.mutation_rate as i64
            + mutation(rng, PRELIMINARY_MUTATION_RATE, FINE_COEFFICIENT);
        let rate = gene(mutation_rate);
        let mut mutate =
            |value: u32, coefficient: i64| value as i64 + mutation(rng, rate, coefficient);

        Self::from_values([
            mutation_rate,
            mutate(parent.speed, FINE_COEFFICIENT),
            mutate(parent.stamina, FINE_COEFFICIENT),
            mutate(parent.sight, FINE_COEFFICIENT),
            mutate(parent.metabolism, FINE_COEFFICIENT),
            mutate(parent.age_limit, COARSE_COEFFICIENT),
            mutate(parent.strength, FINE_COEFFICIENT),
            mutate(parent.reproductive_energy, COARSE_COEFFICIENT),
            mutate(parent.maturity_age, FINE_COEFFICIENT),
            mutate(parent.gestation, FINE_COEFFICIENT),
            mutate(parent.reproduction_rate, FINE_COEFFICIENT),
        ])
    }

    /// Gene values in canonical trait order.
    pub fn values(&self) -> [u32; 11] {
        [
            self.mutation_rate,
            self.speed,
            self.stamina,
            self.sight,
            self.metabolism,
            self.age_limit,
            self.strength,
            self.reproductive_energy,
            self.maturity_age,
            self.gestation,
            self.reproduction_rate,
        ]
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, u32> {
        GENE_NAMES.into_iter().zip(self.values()).collect()
    }

    pub fn mutation_rate(&self) -> u32 {
        self.mutation_rate
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn stamina(&self) -> u32 {
        self.stamina
    }

    pub fn sight(&self) -> u32 {
        self.sight
    }

    pub fn metabolism(&self) -> u32 {
        self.metabolism
    }

    pub fn age_limit(&self) -> u32 {
        self.age_limit
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn reproductive_energy(&self) -> u32 {
        self.reproductive_energy
    }

    pub fn maturity_age(&self) -> u32 {
        self.maturity_age
    }

    pub fn gestation(&self) -> u32 {
        self.gestation
    }

    pub fn reproduction_rate(&self) -> u32 {
        self.reproduction_rate
    }
}
