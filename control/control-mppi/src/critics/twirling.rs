//! Spin suppression critic.

use control_types::TwirlingCriticConfig;

use crate::critics::{weighted_cost, CriticData, CriticFunction};

/// Penalizes mean angular rate to discourage pathological spinning.
#[derive(Debug, Clone, Copy)]
pub struct TwirlingCritic {
    config: TwirlingCriticConfig,
}

impl TwirlingCritic {
    /// Build from config.
    #[must_use]
    pub const fn new(config: TwirlingCriticConfig) -> Self {
        Self { config }
    }
}

impl CriticFunction for TwirlingCritic {
    fn name(&self) -> &'static str {
        "Twirling"
    }

    fn score(&self, data: &mut CriticData<'_>) {
        let layout = data.state.layout;
        let wz = data.state.column(layout.wz());
        let steps = data.state.time_steps();

        for (b, row) in wz.outer_iter().enumerate() {
            let spin: f64 = row.iter().map(|&w| w.abs()).sum();
            let mean = spin / steps as f64;
            data.costs[b] += weighted_cost(mean, self.config.weight, self.config.power);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::critics::test_support::CriticFixture;
    use approx::assert_relative_eq;

    #[test]
    fn spinning_costs_more_than_straight() {
        let mut fixture = CriticFixture::new(2, 5, false);
        let layout = fixture.state.layout;
        fixture
            .state
            .data
            .slice_mut(ndarray::s![1, .., layout.wz()])
            .fill(1.0);

        let mut data = fixture.data();
        TwirlingCritic::new(TwirlingCriticConfig::default()).score(&mut data);

        assert_eq!(data.costs[0], 0.0);
        // mean |wz| = 1.0, weight 10, power 1.
        assert_relative_eq!(data.costs[1], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn sign_of_spin_is_irrelevant() {
        let mut fixture = CriticFixture::new(2, 5, false);
        let layout = fixture.state.layout;
        fixture
            .state
            .data
            .slice_mut(ndarray::s![0, .., layout.wz()])
            .fill(0.7);
        fixture
            .state
            .data
            .slice_mut(ndarray::s![1, .., layout.wz()])
            .fill(-0.7);

        let mut data = fixture.data();
        TwirlingCritic::new(TwirlingCriticConfig::default()).score(&mut data);

        assert_relative_eq!(data.costs[0], data.costs[1], epsilon = 1e-12);
    }
}
