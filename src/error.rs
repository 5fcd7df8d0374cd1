use good_lp::ResolutionError;

/// Failures surfaced by [`Problem::solve`](crate::Problem::solve).
///
/// Input-shape problems (unknown kind labels, malformed documents) are
/// reported by the deserializer before a model is ever built, and I/O
/// failures belong to whatever transport feeds the solver, so neither
/// appears here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The solver proved that no assignment satisfies the hard
    /// constraints.
    #[error("no feasible allocation exists")]
    Infeasible,

    /// The solver failed to run or rejected the model.
    #[error("solver execution failed: {0}")]
    Solver(ResolutionError),

    /// The solver claimed a deal was assigned to more than one
    /// purchaser, which the uniqueness constraint rules out.
    #[error("deal {deal} resolved to more than one purchaser")]
    InconsistentAssignment { deal: usize },
}
