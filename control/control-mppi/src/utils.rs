//! Small helpers shared by the optimizer and critics: angle wrapping, goal
//! proximity checks, and path-progress queries.

use control_types::{GoalChecker, Path, Pose};

use crate::trajectory::Trajectories;

/// Wrap an angle to `[-pi, pi]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(two_pi);
    wrapped - std::f64::consts::PI
}

/// Shortest signed angular distance from `from` to `to`, in `[-pi, pi]`.
#[must_use]
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Whether the robot is within `tolerance` meters of the path's final pose.
///
/// False for an empty path.
#[must_use]
pub fn within_position_goal_tolerance(tolerance: f64, pose: &Pose, path: &Path) -> bool {
    let Some(goal) = path.goal() else {
        return false;
    };
    let dx = pose.x - goal.x;
    let dy = pose.y - goal.y;
    dx * dx + dy * dy < tolerance * tolerance
}

/// Like [`within_position_goal_tolerance`], using the goal checker's x
/// position tolerance.
#[must_use]
pub fn within_goal_checker_tolerance(
    goal_checker: &dyn GoalChecker,
    pose: &Pose,
    path: &Path,
) -> bool {
    let (pos_tolerance_x, _) = goal_checker.tolerances();
    within_position_goal_tolerance(pos_tolerance_x, pose, path)
}

/// Index of the furthest path point reached by any trajectory.
///
/// For each trajectory, find the path point nearest to its endpoint; return
/// the largest such index over the batch. Zero for an empty path.
#[must_use]
pub fn furthest_reached_path_point(trajectories: &Trajectories, path: &Path) -> usize {
    if path.is_empty() {
        return 0;
    }

    let batch = trajectories.batch_size();
    let last = trajectories.time_steps() - 1;
    let mut furthest = 0;

    for b in 0..batch {
        let tx = trajectories.data[[b, last, 0]];
        let ty = trajectories.data[[b, last, 1]];

        let mut nearest = 0;
        let mut nearest_dist_sq = f64::INFINITY;
        for p in 0..path.len() {
            let dx = path.x[p] - tx;
            let dy = path.y[p] - ty;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq < nearest_dist_sq {
                nearest_dist_sq = dist_sq;
                nearest = p;
            }
        }
        furthest = furthest.max(nearest);
    }

    furthest
}

/// Absolute bearing error from the pose heading to the direction of a point.
#[must_use]
pub fn pose_point_angle(pose: &Pose, point_x: f64, point_y: f64) -> f64 {
    let bearing = (point_y - pose.y).atan2(point_x - pose.x);
    shortest_angular_distance(pose.yaw, bearing).abs()
}
