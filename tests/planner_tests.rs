//! Integration tests for the jerk-motion planner.
//!
//! These tests exercise the complete workflow: input setup, planning,
//! synchronization, and trajectory sampling.

use jerk_motion::{
    DurationDiscretization, InputParameter, SyncMode, TrajectoryPlanner, TrajectorySection,
};

/// Four equal ramps of cbrt(1/2): the fastest rest-to-rest unit stroke
/// under unit bounds (the velocity and acceleration bounds stay inactive).
const UNIT_STROKE_DURATION: f64 = 3.174_802_103_936_399;

fn unit_input(target: f64) -> InputParameter<1> {
    let mut input = InputParameter::<1>::new();
    input.target_position = [target];
    input.max_velocity = [1.0];
    input.max_acceleration = [1.0];
    input.max_jerk = [1.0];
    input
}

// =============================================================================
// Single-DoF scenarios
// =============================================================================

#[test]
fn rest_to_rest_unit_stroke() {
    let planner = TrajectoryPlanner::<1>::new();
    let trajectory = planner.calculate(&unit_input(1.0), 0.01).unwrap();

    assert!((trajectory.duration() - UNIT_STROKE_DURATION).abs() < 1e-8);

    // Symmetric stroke: half the distance at half the time, peak velocity,
    // zero acceleration.
    let mid = trajectory.at_time(trajectory.duration() / 2.0);
    assert!((mid.position[0] - 0.5).abs() < 1e-8);
    let v_peak = libm::cbrt(0.5) * libm::cbrt(0.5);
    assert!((mid.velocity[0] - v_peak).abs() < 1e-8);
    assert!(mid.acceleration[0].abs() < 1e-8);
    assert_eq!(mid.section, TrajectorySection::Within);
}

#[test]
fn start_and_end_states_are_exact() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.0);
    input.current_position = [-0.25];
    input.current_velocity = [0.2];
    input.current_acceleration = [-0.1];
    let trajectory = planner.calculate(&input, 0.01).unwrap();

    let start = trajectory.at_time(0.0);
    assert_eq!(start.position[0], -0.25);
    assert_eq!(start.velocity[0], 0.2);
    assert_eq!(start.acceleration[0], -0.1);

    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 1.0).abs() < 1e-8);
    assert!(end.velocity[0].abs() < 1e-8);
    assert!(end.acceleration[0].abs() < 1e-8);
    assert_eq!(end.section, TrajectorySection::Beyond);
}

#[test]
fn brake_restores_violated_velocity() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.0);
    input.current_velocity = [2.0];
    let trajectory = planner.calculate(&input, 0.01).unwrap();

    let brake_duration = trajectory.profiles()[0].brake.duration;
    assert!(brake_duration > 0.0);

    // The initial state is reported as given.
    let start = trajectory.at_time(0.0);
    assert_eq!(start.velocity[0], 2.0);

    // After the brake prefix the velocity is back inside its bound.
    let (_, v_after, _) = trajectory.start_state(0);
    assert!(v_after <= 1.0 + 1e-9);
    for k in 0..=100 {
        let t = brake_duration + (trajectory.duration() - brake_duration) * (k as f64) / 100.0;
        let state = trajectory.at_time(t);
        assert!(state.velocity[0] <= 1.0 + 1e-6);
        assert!(state.velocity[0] >= -1.0 - 1e-6);
    }

    // Braking costs time compared to an in-bounds start.
    let mut legal = unit_input(1.0);
    legal.current_velocity = [1.0];
    let reference = planner.calculate(&legal, 0.01).unwrap();
    assert!(trajectory.duration() > reference.duration());

    // The target is still reached.
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 1.0).abs() < 1e-8);
}

#[test]
fn zero_motion_is_a_working_zero_duration_plan() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = InputParameter::<1>::new();
    input.max_velocity = [1.0];
    input.max_acceleration = [1.0];
    input.max_jerk = [1.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    assert_eq!(trajectory.duration(), 0.0);

    let state = trajectory.at_time(0.0);
    assert_eq!(state.position[0], 0.0);
    assert_eq!(state.velocity[0], 0.0);
    assert_eq!(state.acceleration[0], 0.0);
}

#[test]
fn extrapolation_beyond_duration() {
    let planner = TrajectoryPlanner::<1>::new();
    let trajectory = planner.calculate(&unit_input(1.0), 0.01).unwrap();

    let dt = 0.5;
    let state = trajectory.at_time(trajectory.duration() + dt);
    assert_eq!(state.section, TrajectorySection::Beyond);
    // Zero final velocity and acceleration: the position holds.
    assert!((state.position[0] - 1.0).abs() < 1e-8);
    assert!(state.velocity[0].abs() < 1e-8);

    // Non-zero final velocity keeps integrating.
    let mut input = unit_input(1.0);
    input.target_velocity = [0.5];
    let moving = planner.calculate(&input, 0.01).unwrap();
    let state = moving.at_time(moving.duration() + dt);
    assert!((state.position[0] - (1.0 + 0.5 * dt)).abs() < 1e-7);
}

#[test]
fn planning_is_deterministic() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.7);
    input.current_velocity = [0.3];
    input.current_acceleration = [-0.2];

    let first = planner.calculate(&input, 0.01).unwrap();
    let second = planner.calculate(&input, 0.01).unwrap();
    assert_eq!(first.duration(), second.duration());

    for k in 0..=50 {
        let t = first.duration() * (k as f64) / 50.0;
        let a = first.at_time(t);
        let b = second.at_time(t);
        assert_eq!(a.position[0], b.position[0]);
        assert_eq!(a.velocity[0], b.velocity[0]);
        assert_eq!(a.acceleration[0], b.acceleration[0]);
    }
}

// =============================================================================
// Duration quantization
// =============================================================================

#[test]
fn discrete_duration_is_a_cycle_multiple() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.0);
    input.duration_discretization = DurationDiscretization::Discrete;

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let cycles = trajectory.duration() / 0.01;
    assert!((cycles - libm::round(cycles)).abs() < 1e-9);
    assert!((trajectory.duration() - 3.18).abs() < 1e-9);

    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 1.0).abs() < 1e-8);
    assert!(end.velocity[0].abs() < 1e-8);
}

#[test]
fn coarse_quantization_stretches_the_profile() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.0);
    input.duration_discretization = DurationDiscretization::Discrete;

    let trajectory = planner.calculate(&input, 0.4).unwrap();
    assert!((trajectory.duration() - 3.2).abs() < 1e-9);

    // The stretched profile still meets the target exactly.
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 1.0).abs() < 1e-8);
    assert!(end.velocity[0].abs() < 1e-8);
    assert!(end.acceleration[0].abs() < 1e-8);
}

#[test]
fn minimum_duration_floor_is_respected() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(1.0);
    input.minimum_duration = Some(5.0);

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    assert!((trajectory.duration() - 5.0).abs() < 1e-9);

    let end = trajectory.at_time(5.0);
    assert!((end.position[0] - 1.0).abs() < 1e-8);
}

// =============================================================================
// Multi-DoF synchronization
// =============================================================================

#[test]
fn time_synchronization_follows_the_slowest_dof() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.target_position = [1.0, 2.0];
    input.max_velocity = [1.0, 1.0];
    input.max_acceleration = [1.0, 1.0];
    input.max_jerk = [1.0, 1.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let mins = trajectory.independent_min_durations();

    // DoF 1 has the longer stroke and sets the pace.
    assert!(mins[1] > mins[0]);
    assert!((trajectory.duration() - mins[1]).abs() < 1e-9);
    assert!(mins[0] <= trajectory.duration());

    // Both DoFs arrive together.
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 1.0).abs() < 1e-8);
    assert!((end.position[1] - 2.0).abs() < 1e-8);
    assert!(end.velocity[0].abs() < 1e-8);
    assert!(end.velocity[1].abs() < 1e-8);
}

#[test]
fn synchronized_duration_is_not_blocked() {
    let planner = TrajectoryPlanner::<3>::new();
    let mut input = InputParameter::<3>::new();
    input.target_position = [1.0, -0.5, 0.2];
    input.current_velocity = [0.0, 0.1, -0.2];
    input.max_velocity = [1.0, 1.0, 1.0];
    input.max_acceleration = [1.0, 1.0, 1.0];
    input.max_jerk = [1.0, 1.0, 1.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    for dof in 0..3 {
        assert!(trajectory.independent_min_durations()[dof] <= trajectory.duration() + 1e-9);
        let end = trajectory.at_time(trajectory.duration());
        assert!((end.position[dof] - input.target_position[dof]).abs() < 1e-8);
    }
}

#[test]
fn none_synchronization_keeps_each_dof_optimal() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.target_position = [1.0, 2.0];
    input.max_velocity = [1.0, 1.0];
    input.max_acceleration = [1.0, 1.0];
    input.max_jerk = [1.0, 1.0];
    input.synchronization = SyncMode::None;

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let mins = trajectory.independent_min_durations();

    // DoF 0 finishes early and then holds its target.
    let at_min0 = trajectory.at_time(mins[0]);
    assert!((at_min0.position[0] - 1.0).abs() < 1e-8);
    let later = trajectory.at_time((mins[0] + mins[1]) / 2.0);
    assert!((later.position[0] - 1.0).abs() < 1e-8);
    assert!(later.position[1] < 2.0 - 1e-6);
}

#[test]
fn velocity_envelope_holds_throughout() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.target_position = [3.0, -2.0];
    input.current_velocity = [0.4, -0.3];
    input.current_acceleration = [0.2, 0.1];
    input.max_velocity = [1.0, 0.8];
    input.max_acceleration = [1.0, 0.6];
    input.max_jerk = [1.0, 2.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    for k in 0..=400 {
        let t = trajectory.duration() * (k as f64) / 400.0;
        let state = trajectory.at_time(t);
        for dof in 0..2 {
            assert!(state.velocity[dof].abs() <= input.max_velocity[dof] + 1e-6);
            assert!(state.acceleration[dof].abs() <= input.max_acceleration[dof] + 1e-6);
        }
    }
}

// =============================================================================
// Phase synchronization
// =============================================================================

#[test]
fn phase_synchronization_scales_the_motion() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.target_position = [2.0, 1.0];
    input.max_velocity = [1.0, 1.0];
    input.max_acceleration = [1.0, 1.0];
    input.max_jerk = [1.0, 1.0];
    input.synchronization = SyncMode::Phase;

    let trajectory = planner.calculate(&input, 0.01).unwrap();

    // Both DoFs share the duration and the whole motion stays on the line
    // p0 = 2 * p1.
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 2.0).abs() < 1e-8);
    assert!((end.position[1] - 1.0).abs() < 1e-8);

    for k in 1..20 {
        let t = trajectory.duration() * (k as f64) / 20.0;
        let state = trajectory.at_time(t);
        assert!((state.position[0] - 2.0 * state.position[1]).abs() < 1e-6);
        assert!((state.velocity[0] - 2.0 * state.velocity[1]).abs() < 1e-6);
    }

    // The scaled DoF uses half the jerk.
    let j0 = trajectory.profiles()[0].j[0].abs();
    let j1 = trajectory.profiles()[1].j[0].abs();
    assert!((j1 - 0.5 * j0).abs() < 1e-9);
}

#[test]
fn phase_synchronization_falls_back_when_not_collinear() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.target_position = [2.0, 1.0];
    input.current_velocity = [0.5, 0.0]; // breaks collinearity
    input.max_velocity = [1.0, 1.0];
    input.max_acceleration = [1.0, 1.0];
    input.max_jerk = [1.0, 1.0];
    input.synchronization = SyncMode::Phase;

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.position[0] - 2.0).abs() < 1e-8);
    assert!((end.position[1] - 1.0).abs() < 1e-8);
}

// =============================================================================
// Disabled DoFs and velocity control
// =============================================================================

#[test]
fn disabled_dof_holds_its_state() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut input = InputParameter::<2>::new();
    input.enabled = [true, false];
    input.target_position = [1.0, 9.0];
    input.current_position = [0.0, 0.5];
    input.max_velocity = [1.0, 0.0];
    input.max_acceleration = [1.0, 0.0];
    input.max_jerk = [1.0, 0.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let state = trajectory.at_time(trajectory.duration() / 2.0);
    assert_eq!(state.position[1], 0.5);
    assert_eq!(state.velocity[1], 0.0);
}

#[test]
fn velocity_control_reaches_target_velocity() {
    use jerk_motion::ControlMode;

    let planner = TrajectoryPlanner::<1>::new();
    let mut input = InputParameter::<1>::new();
    input.control_mode = ControlMode::Velocity;
    input.target_velocity = [0.8];
    input.max_velocity = [10.0];
    input.max_acceleration = [1.0];
    input.max_jerk = [1.0];

    let trajectory = planner.calculate(&input, 0.01).unwrap();
    let end = trajectory.at_time(trajectory.duration());
    assert!((end.velocity[0] - 0.8).abs() < 1e-8);
    assert!(end.acceleration[0].abs() < 1e-8);

    for k in 0..=100 {
        let t = trajectory.duration() * (k as f64) / 100.0;
        let state = trajectory.at_time(t);
        assert!(state.acceleration[0].abs() <= 1.0 + 1e-6);
    }
}

// =============================================================================
// Position queries
// =============================================================================

#[test]
fn position_extrema_of_a_monotonic_stroke() {
    let planner = TrajectoryPlanner::<1>::new();
    let trajectory = planner.calculate(&unit_input(1.0), 0.01).unwrap();

    let extrema = trajectory.position_extrema();
    assert!(extrema[0].min.abs() < 1e-9);
    assert!((extrema[0].max - 1.0).abs() < 1e-8);
    assert!(extrema[0].t_max > extrema[0].t_min);
}

#[test]
fn position_extrema_with_overshoot() {
    // Strong forward velocity toward a target behind: the axis overshoots
    // forward before coming back.
    let planner = TrajectoryPlanner::<1>::new();
    let mut input = unit_input(-0.5);
    input.current_velocity = [1.0];
    let trajectory = planner.calculate(&input, 0.01).unwrap();

    let extrema = trajectory.position_extrema();
    assert!(extrema[0].max > 0.1);
    assert!((extrema[0].min - (-0.5)).abs() < 1e-7);
}

#[test]
fn first_time_at_position_finds_the_crossing() {
    let planner = TrajectoryPlanner::<1>::new();
    let trajectory = planner.calculate(&unit_input(1.0), 0.01).unwrap();

    let t_half = trajectory.first_time_at_position(0, 0.5).unwrap();
    assert!((t_half - trajectory.duration() / 2.0).abs() < 1e-6);

    let state = trajectory.at_time(t_half);
    assert!((state.position[0] - 0.5).abs() < 1e-7);

    assert!(trajectory.first_time_at_position(0, 5.0).is_none());
    assert!(trajectory.first_time_at_position(7, 0.5).is_none());
}

// =============================================================================
// Randomized sweeps (deterministic xorshift)
// =============================================================================

struct XorShift(u64);

impl XorShift {
    fn next_f64(&mut self) -> f64 {
        // xorshift64* in [0, 1)
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11) as f64 / (1u64 << 53) as f64
    }

    fn in_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

#[test]
fn random_feasible_inputs_plan_and_integrate() {
    let planner = TrajectoryPlanner::<1>::new();
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);

    for _ in 0..60 {
        let mut input = InputParameter::<1>::new();
        input.current_position = [rng.in_range(-1.0, 1.0)];
        input.current_velocity = [rng.in_range(-0.4, 0.4)];
        input.current_acceleration = [rng.in_range(-0.4, 0.4)];
        input.target_position = [rng.in_range(-3.0, 3.0)];
        input.max_velocity = [1.0];
        input.max_acceleration = [1.0];
        input.max_jerk = [1.0];

        let trajectory = planner
            .calculate(&input, 0.01)
            .unwrap_or_else(|e| panic!("planning failed for {:?}: {}", input, e));

        // Boundary states.
        let start = trajectory.at_time(0.0);
        assert_eq!(start.position[0], input.current_position[0]);
        assert_eq!(start.velocity[0], input.current_velocity[0]);

        let end = trajectory.at_time(trajectory.duration());
        assert!((end.position[0] - input.target_position[0]).abs() < 1e-7);
        assert!(end.velocity[0].abs() < 1e-7);
        assert!(end.acceleration[0].abs() < 1e-7);

        // Envelopes.
        for k in 0..=100 {
            let t = trajectory.duration() * (k as f64) / 100.0;
            let state = trajectory.at_time(t);
            assert!(state.velocity[0].abs() <= 1.0 + 1e-6);
            assert!(state.acceleration[0].abs() <= 1.0 + 1e-6);
        }
    }
}

#[test]
fn random_synchronized_pairs_share_their_duration() {
    let planner = TrajectoryPlanner::<2>::new();
    let mut rng = XorShift(0xDEAD_BEEF_CAFE_F00D);

    for _ in 0..30 {
        let mut input = InputParameter::<2>::new();
        for dof in 0..2 {
            input.current_position[dof] = rng.in_range(-1.0, 1.0);
            input.target_position[dof] = rng.in_range(-2.0, 2.0);
            input.max_velocity[dof] = 1.0;
            input.max_acceleration[dof] = 1.0;
            input.max_jerk[dof] = 1.0;
        }

        let trajectory = planner
            .calculate(&input, 0.01)
            .unwrap_or_else(|e| panic!("planning failed for {:?}: {}", input, e));

        let end = trajectory.at_time(trajectory.duration());
        for dof in 0..2 {
            assert!(trajectory.independent_min_durations()[dof] <= trajectory.duration() + 1e-9);
            assert!((end.position[dof] - input.target_position[dof]).abs() < 1e-7);
            assert!(end.velocity[dof].abs() < 1e-7);
        }
    }
}
