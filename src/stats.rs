//! Statistics tracking for the evolution run.

use crate::graph::Network;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for one generation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation counter
    pub epoch: usize,
    /// Population size after refill and dedup
    pub population: usize,
    /// Total error of the best-ranked network
    pub best_error: f64,
    /// Average error of the best-ranked network per sample
    pub best_average_error: f64,
    /// Edge count of the best-ranked network
    pub best_edges: usize,
    /// Node count of the best-ranked network
    pub best_nodes: usize,
    /// Mean total error across the population
    pub mean_error: f64,
    /// Duplicates discarded by structural-hash dedup this generation
    pub duplicates_culled: usize,
}

impl GenerationStats {
    /// Capture stats from a population sorted best-first.
    pub fn capture(epoch: usize, population: &[Network], duplicates_culled: usize) -> Self {
        let mut stats = Self {
            epoch,
            population: population.len(),
            duplicates_culled,
            ..Self::default()
        };

        if let Some(best) = population.first() {
            stats.best_error = best.total_error;
            stats.best_average_error = best.average_error;
            stats.best_edges = best.edge_count();
            stats.best_nodes = best.node_count();
        }

        if !population.is_empty() {
            stats.mean_error = population.iter().map(|n| n.total_error).sum::<f64>()
                / population.len() as f64;
        }

        stats
    }

    /// One-line summary for log output.
    pub fn summary(&self) -> String {
        format!(
            "epoch {:>4} | pop {:>4} | best err {:.5} (edges {}, nodes {}) | mean err {:.5} | culled {}",
            self.epoch,
            self.population,
            self.best_error,
            self.best_edges,
            self.best_nodes,
            self.mean_error,
            self.duplicates_culled,
        )
    }
}

/// Bounded history of generation stats.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    entries: Vec<GenerationStats>,
    capacity: usize,
}

impl StatsHistory {
    /// History keeping at most `capacity` recent generations (0 = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, stats: GenerationStats) {
        self.entries.push(stats);
        if self.capacity > 0 && self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[GenerationStats] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&GenerationStats> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Operator;

    #[test]
    fn test_capture_from_sorted_population() {
        let mut best = Network::new_with_operator(2, 1, Operator::Identity);
        best.total_error = 0.5;
        best.average_error = 0.125;
        let mut other = Network::new_with_operator(2, 1, Operator::Identity);
        other.total_error = 1.5;

        let stats = GenerationStats::capture(3, &[best, other], 2);
        assert_eq!(stats.epoch, 3);
        assert_eq!(stats.population, 2);
        assert_eq!(stats.best_error, 0.5);
        assert_eq!(stats.best_edges, 2);
        assert_eq!(stats.mean_error, 1.0);
        assert_eq!(stats.duplicates_culled, 2);

        assert!(stats.summary().contains("epoch"));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = StatsHistory::new(3);
        for epoch in 0..10 {
            history.push(GenerationStats {
                epoch,
                ..GenerationStats::default()
            });
        }

        assert_eq!(history.entries().len(), 3);
        assert_eq!(history.latest().unwrap().epoch, 9);
        assert_eq!(history.entries()[0].epoch, 7);
    }
}
