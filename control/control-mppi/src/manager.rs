//! Critic chain orchestration.

use tracing::debug;

use control_types::{ControlError, CriticsConfig, Result};

use crate::critics::{
    CriticData, CriticFunction, GoalAngleCritic, GoalCritic, ObstaclesCritic, PathAlignCritic,
    PathAngleCritic, PathFollowCritic, PreferForwardCritic, TwirlingCritic,
};

/// Owns the configured critics and runs them in order.
///
/// Ordering is configuration-driven; the goal-detector critics are listed
/// first so their `goal_reached` flag short-circuits the path critics, which
/// would otherwise fight the final approach.
pub struct CriticManager {
    critics: Vec<Box<dyn CriticFunction>>,
}

impl std::fmt::Debug for CriticManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriticManager")
            .field("critics", &self.critics.iter().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl CriticManager {
    /// Build the critic chain from config.
    ///
    /// Disabled critics are left out entirely; an unrecognized name is a
    /// configuration error.
    pub fn from_config(config: &CriticsConfig) -> Result<Self> {
        let mut critics: Vec<Box<dyn CriticFunction>> = Vec::with_capacity(config.critics.len());

        for name in &config.critics {
            match name.as_str() {
                "Goal" => {
                    if config.goal.enabled {
                        critics.push(Box::new(GoalCritic::new(config.goal)));
                    }
                }
                "GoalAngle" => {
                    if config.goal_angle.enabled {
                        critics.push(Box::new(GoalAngleCritic::new(config.goal_angle)));
                    }
                }
                "Obstacles" => {
                    if config.obstacles.enabled {
                        critics.push(Box::new(ObstaclesCritic::new(config.obstacles)));
                    }
                }
                "PathAlign" => {
                    if config.path_align.enabled {
                        critics.push(Box::new(PathAlignCritic::new(config.path_align)));
                    }
                }
                "PathFollow" => {
                    if config.path_follow.enabled {
                        critics.push(Box::new(PathFollowCritic::new(config.path_follow)));
                    }
                }
                "PathAngle" => {
                    if config.path_angle.enabled {
                        critics.push(Box::new(PathAngleCritic::new(config.path_angle)));
                    }
                }
                "PreferForward" => {
                    if config.prefer_forward.enabled {
                        critics.push(Box::new(PreferForwardCritic::new(config.prefer_forward)));
                    }
                }
                "Twirling" => {
                    if config.twirling.enabled {
                        critics.push(Box::new(TwirlingCritic::new(config.twirling)));
                    }
                }
                other => {
                    return Err(ControlError::invalid_config(format!(
                        "unknown critic: {other}"
                    )));
                }
            }
        }

        debug!(count = critics.len(), "critic chain configured");
        Ok(Self { critics })
    }

    /// Names of the active critics, in evaluation order.
    #[must_use]
    pub fn critic_names(&self) -> Vec<&'static str> {
        self.critics.iter().map(|c| c.name()).collect()
    }

    /// Run every critic over the shared data, honoring the goal
    /// short-circuit.
    pub fn eval_trajectories_scores(&self, data: &mut CriticData<'_>) {
        for critic in &self.critics {
            if data.goal_reached && !critic.enabled_after_goal() {
                continue;
            }
            critic.score(data);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::critics::test_support::CriticFixture;
    use control_types::{Path, Pose};

    #[test]
    fn builds_default_chain_in_order() {
        let manager = CriticManager::from_config(&CriticsConfig::default()).unwrap();
        assert_eq!(
            manager.critic_names(),
            vec![
                "Goal",
                "GoalAngle",
                "Obstacles",
                "PathAlign",
                "PathFollow",
                "PathAngle",
                "PreferForward",
                "Twirling"
            ]
        );
    }

    #[test]
    fn disabled_critics_are_dropped() {
        let mut config = CriticsConfig::default();
        config.twirling.enabled = false;
        config.obstacles.enabled = false;

        let manager = CriticManager::from_config(&config).unwrap();
        let names = manager.critic_names();
        assert!(!names.contains(&"Twirling"));
        assert!(!names.contains(&"Obstacles"));
        assert!(names.contains(&"Goal"));
    }

    #[test]
    fn unknown_critic_is_rejected() {
        let mut config = CriticsConfig::default();
        config.critics.push("Teleport".to_string());

        let err = CriticManager::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("Teleport"));
    }

    #[test]
    fn goal_short_circuits_path_critics() {
        let mut config = CriticsConfig::default();
        // Only the goal detector and one path critic, to isolate the skip.
        config.critics = vec!["Goal".to_string(), "Twirling".to_string()];
        let manager = CriticManager::from_config(&config).unwrap();

        let mut fixture = CriticFixture::new(1, 4, false);
        // Robot within tolerance of the goal; trajectories spinning hard.
        fixture.path = Path::from_poses(&[Pose::new(0.1, 0.0, 0.0)], 0.0);
        let layout = fixture.state.layout;
        fixture
            .state
            .data
            .slice_mut(ndarray::s![.., .., layout.wz()])
            .fill(1.0);

        let mut data = fixture.data();
        manager.eval_trajectories_scores(&mut data);

        assert!(data.goal_reached);
        // Twirling was skipped: the only contribution is the goal distance.
        let goal_only = data.costs[0];
        assert!(goal_only < 10.0, "twirling leaked into costs: {goal_only}");
    }
}
