//! Reward signals and potential-based shaping

use serde::{Deserialize, Serialize};

/// Reward signal from the environment
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Reward {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Reward> for f64 {
    fn from(reward: Reward) -> Self {
        reward.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::ops::Add<f64> for Reward {
    type Output = Self;

    fn add(self, other: f64) -> Self::Output {
        Self(self.0 + other)
    }
}

impl std::ops::AddAssign<f64> for Reward {
    fn add_assign(&mut self, other: f64) {
        self.0 += other;
    }
}

impl std::ops::Mul<f64> for Reward {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self(self.0 * scalar)
    }
}

/// Potential-based shaping term `gamma * phi(s') - phi(s)`.
///
/// Adding this term to a reward signal leaves the set of optimal policies
/// unchanged (Ng, Harada & Russell, 1999).
#[must_use]
pub fn potential_shaping(gamma: f64, phi_from: f64, phi_to: f64) -> f64 {
    gamma * phi_to - phi_from
}
