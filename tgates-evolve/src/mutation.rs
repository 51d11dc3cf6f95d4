// SPDX-License-Identifier: Apache-2.0

//! Gene initialization and two-tier mutation.

use tgates::decode::{Gene, GeneLayout};

use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationRates {
    /// Probability that a circuit is mutated at all in a generation.
    pub gate: f64,
    /// Per-locus redraw probability, applied only when the gate fires.
    pub locus: f64,
}

impl Default for MutationRates {
    fn default() -> Self {
        Self {
            gate: 0.7,
            locus: 0.001,
        }
    }
}

fn draw_gene<R: RandomSource + ?Sized>(layout: &GeneLayout, rng: &mut R) -> Gene {
    rng.uniform_int(0, layout.address_count() as u32) as Gene
}

/// A fresh gene sequence with every locus uniform over the address domain.
pub fn random_genes<R: RandomSource + ?Sized>(layout: &GeneLayout, rng: &mut R) -> Vec<Gene> {
    (0..layout.gene_count())
        .map(|_| draw_gene(layout, rng))
        .collect()
}

/// With probability `rates.gate`, redraws one uniformly chosen locus and then
/// independently redraws every locus with probability `rates.locus`.
///
/// Returns whether the mutation gate fired.
pub fn mutate<R: RandomSource + ?Sized>(
    genes: &mut [Gene],
    layout: &GeneLayout,
    rates: MutationRates,
    rng: &mut R,
) -> bool {
    debug_assert_eq!(genes.len(), layout.gene_count());
    if rng.uniform_unit() >= rates.gate {
        return false;
    }
    let locus = rng.uniform_int(0, genes.len() as u32) as usize;
    genes[locus] = draw_gene(layout, rng);
    for gene in genes.iter_mut() {
        if rng.uniform_unit() < rates.locus {
            *gene = draw_gene(layout, rng);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn layout() -> GeneLayout {
        GeneLayout::new(3, 20, 6)
    }

    #[test]
    fn test_random_genes_in_domain() {
        let layout = layout();
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let genes = random_genes(&layout, &mut rng);
        assert_eq!(genes.len(), 46);
        assert!(genes
            .iter()
            .all(|g| (*g as usize) < layout.address_count()));
    }

    #[test]
    fn test_zero_gate_rate_never_mutates() {
        let layout = layout();
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let original = random_genes(&layout, &mut rng);
        let mut genes = original.clone();
        let rates = MutationRates {
            gate: 0.0,
            locus: 1.0,
        };
        for _ in 0..100 {
            assert!(!mutate(&mut genes, &layout, rates, &mut rng));
        }
        assert_eq!(genes, original);
    }

    #[test]
    fn test_forced_locus_only_changes_one_gene() {
        let layout = layout();
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let rates = MutationRates {
            gate: 1.0,
            locus: 0.0,
        };
        for _ in 0..100 {
            let original = random_genes(&layout, &mut rng);
            let mut genes = original.clone();
            assert!(mutate(&mut genes, &layout, rates, &mut rng));
            let changed = genes
                .iter()
                .zip(original.iter())
                .filter(|(a, b)| a != b)
                .count();
            assert!(changed <= 1, "{} loci changed", changed);
        }
    }

    #[test]
    fn test_full_locus_rate_stays_in_domain() {
        let layout = layout();
        let mut rng = Pcg64Mcg::seed_from_u64(4);
        let mut genes = vec![0; layout.gene_count()];
        let rates = MutationRates {
            gate: 1.0,
            locus: 1.0,
        };
        mutate(&mut genes, &layout, rates, &mut rng);
        assert!(genes
            .iter()
            .all(|g| (*g as usize) < layout.address_count()));
        assert!(genes.iter().any(|g| *g != 0));
    }

    #[test]
    fn test_mutation_is_reproducible_from_seed() {
        let layout = layout();
        let run = |seed: u64| {
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            let mut genes = random_genes(&layout, &mut rng);
            for _ in 0..50 {
                mutate(&mut genes, &layout, MutationRates::default(), &mut rng);
            }
            genes
        };
        assert_eq!(run(18), run(18));
    }
}
