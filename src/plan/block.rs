//! Feasible-duration bookkeeping per degree of freedom.
//!
//! The time-optimal search produces a set of valid extremal profiles. The fastest one gives
//! the minimum duration; the remaining ones pair up into at most two open
//! intervals of total durations for which no valid profile exists. The
//! synchronizer only ever picks durations outside these intervals.

use heapless::Vec;
use libm::fabs;

use crate::profile::Profile;

/// Upper bound on simultaneously valid extremal profiles per DoF.
pub const MAX_VALID_PROFILES: usize = 12;

/// Candidate set collected during the time-optimal search.
pub type ValidProfiles = Vec<Profile, MAX_VALID_PROFILES>;

/// Open interval of forbidden total durations.
///
/// The right endpoint belongs to the slower of the two paired profiles and
/// that profile is stored with the interval: it is the one to materialize if
/// synchronization lands exactly on `right`.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    /// Left endpoint in seconds (feasible).
    pub left: f64,
    /// Right endpoint in seconds (feasible).
    pub right: f64,
    /// Profile whose total duration equals `right`.
    pub profile: Profile,
}

impl Interval {
    fn new(first: &Profile, second: &Profile) -> Self {
        let first_duration = first.total_duration();
        let second_duration = second.total_duration();
        if first_duration < second_duration {
            Self { left: first_duration, right: second_duration, profile: *second }
        } else {
            Self { left: second_duration, right: first_duration, profile: *first }
        }
    }
}

/// Fastest profile plus up to two forbidden duration intervals for one DoF.
#[derive(Debug, Clone, Copy, Default)]
pub struct Block {
    /// The fastest valid profile.
    pub p_min: Profile,
    /// Duration of the fastest profile including its brake prefix.
    pub t_min: f64,
    /// First forbidden interval.
    pub a: Option<Interval>,
    /// Second forbidden interval.
    pub b: Option<Interval>,
}

impl Block {
    /// Block with a single feasible minimum and no forbidden intervals.
    pub fn from_profile(p_min: Profile) -> Self {
        Self { t_min: p_min.total_duration(), p_min, a: None, b: None }
    }

    /// Assemble a block from the extremal candidate set.
    ///
    /// Candidates are ordered by duration. Odd counts are the well-behaved
    /// cases; the even counts arise from numerical near-degeneracy and are
    /// collapsed with empirical epsilon multiples, or rejected.
    pub fn calculate(valid: &mut ValidProfiles) -> Option<Self> {
        valid
            .as_mut_slice()
            .sort_unstable_by(|x, y| x.t_sum[6].partial_cmp(&y.t_sum[6]).unwrap());

        if valid.len() == 2 {
            if fabs(valid[0].t_sum[6] - valid[1].t_sum[6]) < 8.0 * f64::EPSILON {
                return Some(Self::from_profile(valid[0]));
            }
            let mut block = Self::from_profile(valid[0]);
            block.a = Some(Interval::new(&valid[0], &valid[1]));
            return Some(block);
        }

        if valid.len() == 4 {
            // Collapse "identical" profiles that differ only in direction.
            if fabs(valid[0].t_sum[6] - valid[1].t_sum[6]) < 32.0 * f64::EPSILON
                && valid[0].direction != valid[1].direction
            {
                valid.remove(1);
            } else if fabs(valid[2].t_sum[6] - valid[3].t_sum[6]) < 256.0 * f64::EPSILON
                && valid[2].direction != valid[3].direction
            {
                valid.remove(3);
            } else if fabs(valid[0].t_sum[6] - valid[3].t_sum[6]) < 256.0 * f64::EPSILON
                && valid[0].direction != valid[3].direction
            {
                valid.remove(3);
            } else {
                return None;
            }
        }

        match valid.len() {
            1 => Some(Self::from_profile(valid[0])),
            3 => {
                let mut block = Self::from_profile(valid[0]);
                block.a = Some(Interval::new(&valid[1], &valid[2]));
                Some(block)
            }
            5 => {
                let mut block = Self::from_profile(valid[0]);
                if valid[1].direction == valid[2].direction {
                    block.a = Some(Interval::new(&valid[1], &valid[2]));
                    block.b = Some(Interval::new(&valid[3], &valid[4]));
                } else {
                    block.a = Some(Interval::new(&valid[1], &valid[4]));
                    block.b = Some(Interval::new(&valid[2], &valid[3]));
                }
                Some(block)
            }
            _ => None,
        }
    }

    /// Whether no valid profile exists at total duration `t`.
    ///
    /// Interval endpoints are feasible, hence the strict inequalities.
    #[inline]
    pub fn is_blocked(&self, t: f64) -> bool {
        t < self.t_min
            || self.a.map_or(false, |i| i.left < t && t < i.right)
            || self.b.map_or(false, |i| i.left < t && t < i.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Direction;

    fn profile_with_duration(duration: f64, direction: Direction) -> Profile {
        let mut p = Profile::default();
        p.t = [duration, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        p.t_sum = [duration; 7];
        p.direction = direction;
        p
    }

    #[test]
    fn test_single_profile() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(2.0, Direction::Up)).unwrap();
        let block = Block::calculate(&mut valid).unwrap();
        assert!((block.t_min - 2.0).abs() < 1e-12);
        assert!(block.a.is_none() && block.b.is_none());
    }

    #[test]
    fn test_two_profiles_form_interval() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(3.0, Direction::Up)).unwrap();
        valid.push(profile_with_duration(2.0, Direction::Up)).unwrap();
        let block = Block::calculate(&mut valid).unwrap();
        assert!((block.t_min - 2.0).abs() < 1e-12);
        let a = block.a.unwrap();
        assert!((a.left - 2.0).abs() < 1e-12);
        assert!((a.right - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_nearly_identical_profiles_merge() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(2.0, Direction::Up)).unwrap();
        valid
            .push(profile_with_duration(2.0 + f64::EPSILON, Direction::Down))
            .unwrap();
        let block = Block::calculate(&mut valid).unwrap();
        assert!(block.a.is_none());
    }

    #[test]
    fn test_three_profiles() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(5.0, Direction::Down)).unwrap();
        valid.push(profile_with_duration(2.0, Direction::Up)).unwrap();
        valid.push(profile_with_duration(4.0, Direction::Down)).unwrap();
        let block = Block::calculate(&mut valid).unwrap();
        assert!((block.t_min - 2.0).abs() < 1e-12);
        let a = block.a.unwrap();
        assert!((a.left - 4.0).abs() < 1e-12);
        assert!((a.right - 5.0).abs() < 1e-12);
        assert!(block.b.is_none());
    }

    #[test]
    fn test_five_profiles_two_intervals() {
        let mut valid = ValidProfiles::new();
        for (d, dir) in [
            (1.0, Direction::Up),
            (2.0, Direction::Up),
            (3.0, Direction::Up),
            (4.0, Direction::Down),
            (5.0, Direction::Down),
        ] {
            valid.push(profile_with_duration(d, dir)).unwrap();
        }
        let block = Block::calculate(&mut valid).unwrap();
        assert!((block.t_min - 1.0).abs() < 1e-12);
        let a = block.a.unwrap();
        let b = block.b.unwrap();
        assert!((a.left - 2.0).abs() < 1e-12 && (a.right - 3.0).abs() < 1e-12);
        assert!((b.left - 4.0).abs() < 1e-12 && (b.right - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_four_profiles_without_collapse_fail() {
        let mut valid = ValidProfiles::new();
        for d in [1.0, 2.0, 3.0, 4.0] {
            valid.push(profile_with_duration(d, Direction::Up)).unwrap();
        }
        assert!(Block::calculate(&mut valid).is_none());
    }

    #[test]
    fn test_four_profiles_collapse() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(1.0, Direction::Up)).unwrap();
        valid
            .push(profile_with_duration(1.0 + f64::EPSILON, Direction::Down))
            .unwrap();
        valid.push(profile_with_duration(3.0, Direction::Up)).unwrap();
        valid.push(profile_with_duration(4.0, Direction::Up)).unwrap();
        let block = Block::calculate(&mut valid).unwrap();
        assert!((block.t_min - 1.0).abs() < 1e-12);
        assert!(block.a.is_some());
    }

    #[test]
    fn test_is_blocked() {
        let mut valid = ValidProfiles::new();
        valid.push(profile_with_duration(3.0, Direction::Up)).unwrap();
        valid.push(profile_with_duration(2.0, Direction::Up)).unwrap();
        let block = Block::calculate(&mut valid).unwrap();

        assert!(block.is_blocked(1.0));
        assert!(!block.is_blocked(2.0)); // endpoints are feasible
        assert!(block.is_blocked(2.5));
        assert!(!block.is_blocked(3.0));
        assert!(!block.is_blocked(10.0));
    }
}
