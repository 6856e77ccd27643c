use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PricingError, Result};

/// Bucket label to weight. Ordered by label so iteration and serialization
/// are deterministic.
pub type Buckets = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Age,
    Gender,
    Location,
    Interest,
    Income,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Age,
        Dimension::Gender,
        Dimension::Location,
        Dimension::Interest,
        Dimension::Income,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Age => "age",
            Dimension::Gender => "gender",
            Dimension::Location => "location",
            Dimension::Interest => "interest",
            Dimension::Income => "income",
        }
    }
}

/// Audience breakdown across the five demographic dimensions. Weights are
/// fractions in `0..=1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicDistribution {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub age: Buckets,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub gender: Buckets,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub location: Buckets,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub interest: Buckets,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub income: Buckets,
}

impl DemographicDistribution {
    pub fn get(&self, dimension: Dimension) -> &Buckets {
        match dimension {
            Dimension::Age => &self.age,
            Dimension::Gender => &self.gender,
            Dimension::Location => &self.location,
            Dimension::Interest => &self.interest,
            Dimension::Income => &self.income,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> &mut Buckets {
        match dimension {
            Dimension::Age => &mut self.age,
            Dimension::Gender => &mut self.gender,
            Dimension::Location => &mut self.location,
            Dimension::Interest => &mut self.interest,
            Dimension::Income => &mut self.income,
        }
    }

    pub fn with_bucket(
        mut self,
        dimension: Dimension,
        label: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.get_mut(dimension).insert(label.into(), weight);
        self
    }

    pub fn is_empty(&self) -> bool {
        Dimension::ALL.iter().all(|dim| self.get(*dim).is_empty())
    }

    pub fn populated_dimensions(&self) -> usize {
        Dimension::ALL
            .iter()
            .filter(|dim| !self.get(**dim).is_empty())
            .count()
    }

    /// Converts a payload expressed in 0-100 percentages into fractions.
    pub fn percentages_to_fractions(mut self) -> Self {
        for dimension in Dimension::ALL {
            for weight in self.get_mut(dimension).values_mut() {
                *weight /= 100.0;
            }
        }
        self
    }

    /// Rejects any bucket weight that is not a finite fraction in `0..=1`.
    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            for (label, weight) in self.get(dimension) {
                if !weight.is_finite() || *weight < 0.0 || *weight > 1.0 {
                    return Err(PricingError::invalid_input(format!(
                        "{} bucket '{}' has weight {} outside 0..1",
                        dimension.label(),
                        label,
                        weight
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn normalized(&self) -> Self {
        let mut result = self.clone();
        for dimension in Dimension::ALL {
            normalize_buckets(result.get_mut(dimension));
        }
        result
    }

    /// Highest-weight bucket per dimension. Ties go to the lexicographically
    /// smallest label.
    pub fn top_buckets(&self) -> Self {
        let mut result = Self::default();
        for dimension in Dimension::ALL {
            if let Some((label, weight)) = top_bucket(self.get(dimension)) {
                result.get_mut(dimension).insert(label.to_string(), weight);
            }
        }
        result
    }
}

/// Rescales buckets so they sum to 1.0. A dimension with no mass is cleared
/// rather than left holding zero weights.
pub fn normalize_buckets(buckets: &mut Buckets) {
    let total: f64 = buckets.values().sum();
    if total > 0.0 && total.is_finite() {
        for weight in buckets.values_mut() {
            *weight /= total;
        }
    } else {
        buckets.clear();
    }
}

pub fn top_bucket(buckets: &Buckets) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    // BTreeMap iterates in label order, so a strict comparison keeps the
    // smallest label on ties.
    for (label, weight) in buckets {
        match best {
            Some((_, best_weight)) if *weight <= best_weight => {}
            _ => best = Some((label.as_str(), *weight)),
        }
    }
    best
}

/// Lower bound of an age bucket such as `"25-34"` or `"65+"`.
pub fn age_lower_bound(label: &str) -> Option<u32> {
    let head = label.split('-').next().unwrap_or(label);
    head.trim().trim_end_matches('+').trim().parse().ok()
}
