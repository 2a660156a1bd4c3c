//! Parallel entry points.
//!
//! Independent universes resolve in parallel, each one sequentially inside.
//! Units of one resolved class instantiate in parallel, each with its own
//! [Rng] seeded from `base_seed + unit index`, so results match a sequential
//! run and come back in unit order.

use rayon::prelude::*;

use crate::classdef::{resolve_text, ResolvedClass, ResolvedUniverse};
use crate::error::ConfigError;
use crate::loadout::{Instantiator, Loadout};
use crate::parallel::pool::WorkerPool;
use crate::rng::Rng;
use crate::settings::{LoadoutSettings, ParseSettings};

/// Resolve several universes at once. Results keep input order.
pub fn resolve_universes<S>(
    texts: &[S],
    settings: &ParseSettings,
    pool: &WorkerPool,
) -> Vec<Result<ResolvedUniverse, ConfigError>>
where
    S: AsRef<str> + Sync,
{
    pool.install(|| {
        texts
            .par_iter()
            .map(|text| resolve_text(text.as_ref(), settings))
            .collect()
    })
}

/// Instantiate `count` units of `class`.
pub fn instantiate_units(
    class: &ResolvedClass,
    count: usize,
    base_seed: u64,
    settings: &LoadoutSettings,
    pool: &WorkerPool,
) -> Vec<Loadout> {
    let instantiator = Instantiator::new(settings);
    pool.install(|| {
        (0..count)
            .into_par_iter()
            .map(|index| {
                let mut rng = Rng::new(Rng::unit_seed(base_seed, index));
                instantiator.instantiate(class, &mut rng)
            })
            .collect()
    })
}
