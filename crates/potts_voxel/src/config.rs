//! Immutable tuning context for location splitting.
//!
//! Passed into every `Location` at construction; never global.

use serde::{Deserialize, Serialize};

/// Rule for turning measured diameters into a split-plane normal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitRule {
  /// Cut across the longest extent. Directions within
  /// `diameter_ratio` of the maximum are treated as ties.
  #[default]
  LongestAxis,
  /// Older rule: bisect the shortest extent (exact ties only).
  ShortestAxis,
}

/// Split and repair parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
  /// Allowed size gap between split halves as a fraction of the total.
  pub balance_tolerance: f64,
  /// Fraction of the maximum diameter counted as a near-tie.
  pub diameter_ratio: f64,
  /// Probability that the splitting location keeps the first half.
  pub split_probability: f64,
  pub split_rule: SplitRule,
  /// Maximum connect passes per split (0 = unlimited).
  pub max_connect_iterations: usize,
  /// Maximum voxel moves while balancing (0 = unlimited).
  pub max_balance_iterations: usize,
  /// Maximum neighbor-growth rounds when selecting voxels (0 = unlimited).
  pub max_growth_iterations: usize,
}

impl LocationConfig {
  pub const DEFAULT: Self = Self {
    balance_tolerance: 0.05,
    diameter_ratio: 0.9,
    split_probability: 0.5,
    split_rule: SplitRule::LongestAxis,
    max_connect_iterations: 256,
    max_balance_iterations: 10_000,
    max_growth_iterations: 1_000,
  };

  pub fn with_balance_tolerance(mut self, tolerance: f64) -> Self {
    self.balance_tolerance = tolerance;
    self
  }

  pub fn with_diameter_ratio(mut self, ratio: f64) -> Self {
    self.diameter_ratio = ratio;
    self
  }

  pub fn with_split_probability(mut self, probability: f64) -> Self {
    self.split_probability = probability;
    self
  }

  pub fn with_split_rule(mut self, rule: SplitRule) -> Self {
    self.split_rule = rule;
    self
  }

  pub fn with_max_connect_iterations(mut self, iterations: usize) -> Self {
    self.max_connect_iterations = iterations;
    self
  }

  pub fn with_max_balance_iterations(mut self, iterations: usize) -> Self {
    self.max_balance_iterations = iterations;
    self
  }

  pub fn with_max_growth_iterations(mut self, iterations: usize) -> Self {
    self.max_growth_iterations = iterations;
    self
  }

  /// Largest size gap between halves that counts as balanced.
  #[inline]
  pub fn balance_limit(&self, total: usize) -> usize {
    (total as f64 * self.balance_tolerance).ceil() as usize
  }
}

impl Default for LocationConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Whether another iteration is allowed under a cap (0 = unlimited).
#[inline]
pub(crate) fn within_cap(cap: usize, performed: usize) -> bool {
  cap == 0 || performed < cap
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_matches_const() {
    assert_eq!(LocationConfig::default(), LocationConfig::DEFAULT);
    assert_eq!(LocationConfig::DEFAULT.split_rule, SplitRule::LongestAxis);
  }

  #[test]
  fn test_builders() {
    let config = LocationConfig::DEFAULT
      .with_balance_tolerance(0.1)
      .with_split_probability(1.0)
      .with_split_rule(SplitRule::ShortestAxis)
      .with_max_connect_iterations(0);

    assert_eq!(config.balance_tolerance, 0.1);
    assert_eq!(config.split_probability, 1.0);
    assert_eq!(config.split_rule, SplitRule::ShortestAxis);
    assert_eq!(config.max_connect_iterations, 0);
    assert_eq!(config.diameter_ratio, 0.9);
  }

  #[test]
  fn test_balance_limit_rounds_up() {
    let config = LocationConfig::DEFAULT;
    assert_eq!(config.balance_limit(0), 0);
    assert_eq!(config.balance_limit(6), 1);
    assert_eq!(config.balance_limit(21), 2);
  }

  #[test]
  fn test_within_cap() {
    assert!(within_cap(0, usize::MAX - 1));
    assert!(within_cap(3, 2));
    assert!(!within_cap(3, 3));
  }

  #[test]
  fn test_deserialize_from_json() {
    let json = r#"{
      "balance_tolerance": 0.05,
      "diameter_ratio": 0.8,
      "split_probability": 0.5,
      "split_rule": "ShortestAxis",
      "max_connect_iterations": 16,
      "max_balance_iterations": 100,
      "max_growth_iterations": 10
    }"#;
    let config: LocationConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.diameter_ratio, 0.8);
    assert_eq!(config.split_rule, SplitRule::ShortestAxis);
    assert_eq!(config.max_connect_iterations, 16);
  }
}
