use serde::{Deserialize, Serialize};

/// The two deal categories purchasers can express a preference between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealKind {
    Prepay,
    #[serde(rename = "PPA")]
    Ppa,
}

/// A discrete unit of value to be assigned to at most one purchaser.
///
/// Deals of size zero are never allocated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Deal {
    pub size: u64,
    pub kind: DealKind,
}

/// Which deal kind a purchaser would rather receive, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    Prepay,
    #[serde(rename = "PPA")]
    Ppa,
    #[default]
    NoPreference,
}

/// An entity receiving deal assignments, up to its capacity.
///
/// A capacity of zero means the purchaser must receive nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Purchaser {
    pub capacity: u64,
    #[serde(default)]
    pub preference: Preference,
}

/// A complete allocation instance: the deals to place and the
/// purchasers available to take them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Problem {
    pub deals: Vec<Deal>,
    pub purchasers: Vec<Purchaser>,
}

/// Solver controls.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Wall-clock limit handed to the solver, in seconds. The best
    /// incumbent found within the limit is accepted even when it is
    /// not proven optimal.
    pub time_limit_secs: Option<u64>,
    /// Minimum acceptable optimality gap. Accepted for forward
    /// compatibility but not currently forwarded to the solver.
    pub target_gap: Option<f64>,
    /// Require every purchaser large enough to take a deal to take at
    /// least one.
    pub min_deal: bool,
    /// Penalize assignments that go against purchaser preferences.
    pub pref_penalty: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit_secs: None,
            target_gap: None,
            min_deal: true,
            pref_penalty: true,
        }
    }
}

/// The result of a solve: one entry per deal, in deal order, where 0
/// means unallocated and k > 0 means assigned to purchaser k - 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub allocation: Vec<u32>,
}
