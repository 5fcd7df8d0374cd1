use good_lp::Solution as LpSolution;
use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, SolverModel, Variable, variable, variables,
};

pub mod error;
pub mod types;

pub use error::Error;
pub use types::{Allocation, Deal, DealKind, Preference, Problem, Purchaser, SolveOptions};

impl Problem {
    /// Find the allocation of deals to purchasers that maximizes the
    /// total allocated size, subject to purchaser capacities, single
    /// assignment of each deal, the minimum-deal rule, and penalized
    /// purchaser preferences.
    ///
    /// Returns one entry per deal in input order; see [`Allocation`].
    pub fn solve(&self, options: &SolveOptions) -> Result<Allocation, Error> {
        let deals = &self.deals;
        let purchasers = &self.purchasers;

        // Create all variables upfront: the (deal, purchaser) assignment
        // matrix, one usage indicator per purchaser, and the deviation
        // variables backing the elastic preference constraints.
        let mut problem_vars = variables!();
        let assignment = init_assignment_variables(deals, purchasers, &mut problem_vars);
        let usage = init_usage_indicators(purchasers, &mut problem_vars);
        let deviations = if options.pref_penalty {
            init_preference_deviations(purchasers, &mut problem_vars)
        } else {
            Vec::new()
        };

        // Build objective function
        let objective =
            create_objective_function(deals, &assignment, preference_penalty(deals), &deviations);
        let model = create_model(problem_vars, objective, options);

        // Add constraints
        let model = constrain_capacities(model, deals, purchasers, &assignment, &usage);
        let model = constrain_single_assignment(model, deals, &assignment);
        let model = if options.min_deal {
            constrain_minimum_utilization(model, deals, purchasers, &assignment)
        } else {
            model
        };
        let model = constrain_preference_targets(model, deals, &assignment, &deviations);

        // Solve. A time-limited incumbent comes back as a regular
        // solution, so it is accepted like any other.
        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(Error::Infeasible),
            Err(e) => return Err(Error::Solver(e)),
        };

        // Convert the solver's solution into the final per-deal allocation
        extract_allocation(&solution, &assignment)
    }
}

/// Deviation variables for one purchaser's elastic preference
/// equalities. `over`/`under` absorb assignments above or below the
/// target count for the corresponding deal kind.
struct PreferenceDeviation {
    purchaser: usize,
    /// Target count of PPA deals for this purchaser: 1.0 when PPA is
    /// preferred, else 0.0. The Prepay target is the complement.
    ppa_target: f64,
    ppa_over: Variable,
    ppa_under: Variable,
    prepay_over: Variable,
    prepay_under: Variable,
}

fn init_assignment_variables(
    deals: &[Deal],
    purchasers: &[Purchaser],
    problem_vars: &mut ProblemVariables,
) -> Vec<Vec<Variable>> {
    // Dense matrix indexed [deal][purchaser], in input order.
    deals
        .iter()
        .map(|_| {
            purchasers
                .iter()
                .map(|_| problem_vars.add(variable().binary()))
                .collect()
        })
        .collect()
}

fn init_usage_indicators(
    purchasers: &[Purchaser],
    problem_vars: &mut ProblemVariables,
) -> Vec<Variable> {
    purchasers
        .iter()
        .map(|_| problem_vars.add(variable().binary()))
        .collect()
}

fn init_preference_deviations(
    purchasers: &[Purchaser],
    problem_vars: &mut ProblemVariables,
) -> Vec<PreferenceDeviation> {
    purchasers
        .iter()
        .enumerate()
        .filter(|(_, purchaser)| {
            purchaser.capacity > 0 && purchaser.preference != Preference::NoPreference
        })
        .map(|(p, purchaser)| PreferenceDeviation {
            purchaser: p,
            ppa_target: if purchaser.preference == Preference::Ppa {
                1.0
            } else {
                0.0
            },
            ppa_over: problem_vars.add(variable().min(0)),
            ppa_under: problem_vars.add(variable().min(0)),
            prepay_over: problem_vars.add(variable().min(0)),
            prepay_under: problem_vars.add(variable().min(0)),
        })
        .collect()
}

/// Penalty applied to each unit of preference deviation. One more than
/// the total deal size, so honoring preferences always outranks any
/// allocation gain, and hard constraints outrank both.
fn preference_penalty(deals: &[Deal]) -> f64 {
    deals.iter().map(|deal| deal.size).sum::<u64>() as f64 + 1.0
}

fn create_objective_function(
    deals: &[Deal],
    assignment: &[Vec<Variable>],
    penalty: f64,
    deviations: &[PreferenceDeviation],
) -> Expression {
    let mut objective = deals.iter().zip(assignment).fold(
        Expression::from(0.0),
        |sum, (deal, purchaser_vars)| {
            purchaser_vars
                .iter()
                .fold(sum, |sum, &var| sum + var * deal.size as f64)
        },
    );

    for dev in deviations {
        objective -=
            (dev.ppa_over + dev.ppa_under + dev.prepay_over + dev.prepay_under) * penalty;
    }

    objective
}

/// Create a model with the given objective function
fn create_model(
    variables: ProblemVariables,
    objective: Expression,
    options: &SolveOptions,
) -> impl SolverModel<Error = ResolutionError> {
    let mut model = variables.maximise(objective).using(coin_cbc);
    if let Some(secs) = options.time_limit_secs {
        model.set_parameter("sec", &secs.to_string());
    }
    #[cfg(not(debug_assertions))]
    model.set_parameter("loglevel", "0");
    model
}

/// Keep every purchaser's assigned size within its capacity.
///
/// Positive-capacity purchasers are bounded through their usage
/// indicator; zero-capacity purchasers must receive exactly nothing.
fn constrain_capacities<Model: SolverModel>(
    model: Model,
    deals: &[Deal],
    purchasers: &[Purchaser],
    assignment: &[Vec<Variable>],
    usage: &[Variable],
) -> Model {
    purchasers.iter().enumerate().fold(model, |m, (p, purchaser)| {
        let assigned_size = deals
            .iter()
            .enumerate()
            .fold(Expression::from(0.0), |sum, (d, deal)| {
                sum + assignment[d][p] * deal.size as f64
            });

        if purchaser.capacity > 0 {
            m.with(assigned_size.leq(usage[p] * purchaser.capacity as f64))
        } else {
            m.with(assigned_size.eq(0.0))
        }
    })
}

/// A positive-size deal goes to at most one purchaser; a zero-size
/// deal goes to none.
fn constrain_single_assignment<Model: SolverModel>(
    model: Model,
    deals: &[Deal],
    assignment: &[Vec<Variable>],
) -> Model {
    deals.iter().enumerate().fold(model, |m, (d, deal)| {
        let times_assigned = assignment[d]
            .iter()
            .fold(Expression::from(0.0), |sum, &var| sum + var);

        if deal.size > 0 {
            m.with(times_assigned.leq(1.0))
        } else {
            m.with(times_assigned.eq(0.0))
        }
    })
}

/// Every purchaser whose capacity can hold the smallest positive deal
/// must receive at least one positive-size deal.
fn constrain_minimum_utilization<Model: SolverModel>(
    model: Model,
    deals: &[Deal],
    purchasers: &[Purchaser],
    assignment: &[Vec<Variable>],
) -> Model {
    let Some(smallest) = smallest_positive_size(deals) else {
        return model;
    };

    purchasers.iter().enumerate().fold(model, |m, (p, purchaser)| {
        if purchaser.capacity < smallest {
            return m;
        }

        let deals_taken = deals
            .iter()
            .enumerate()
            .filter(|(_, deal)| deal.size > 0)
            .fold(Expression::from(0.0), |sum, (d, _)| sum + assignment[d][p]);

        m.with(deals_taken.geq(1.0))
    })
}

fn smallest_positive_size(deals: &[Deal]) -> Option<u64> {
    deals.iter().map(|deal| deal.size).filter(|&s| s > 0).min()
}

/// Elastic preference equalities: for each purchaser with a
/// preference, the count of deals of each kind it receives should
/// equal the preference target. The deviation variables make the
/// equality soft; they are penalized in the objective rather than
/// forbidden.
fn constrain_preference_targets<Model: SolverModel>(
    model: Model,
    deals: &[Deal],
    assignment: &[Vec<Variable>],
    deviations: &[PreferenceDeviation],
) -> Model {
    deviations.iter().fold(model, |m, dev| {
        let ppa_count = count_of_kind(deals, assignment, dev.purchaser, DealKind::Ppa);
        let prepay_count = count_of_kind(deals, assignment, dev.purchaser, DealKind::Prepay);

        let m = m.with((ppa_count - dev.ppa_over + dev.ppa_under).eq(dev.ppa_target));
        m.with((prepay_count - dev.prepay_over + dev.prepay_under).eq(1.0 - dev.ppa_target))
    })
}

fn count_of_kind(
    deals: &[Deal],
    assignment: &[Vec<Variable>],
    purchaser: usize,
    kind: DealKind,
) -> Expression {
    deals
        .iter()
        .enumerate()
        .filter(|(_, deal)| deal.kind == kind)
        .fold(Expression::from(0.0), |sum, (d, _)| {
            sum + assignment[d][purchaser]
        })
}

/// Map the solved assignment matrix back onto the deals, in input
/// order. Binary values come back as floats, so anything above 0.5
/// counts as assigned.
fn extract_allocation(
    solution: &impl LpSolution,
    assignment: &[Vec<Variable>],
) -> Result<Allocation, Error> {
    let mut allocation = Vec::with_capacity(assignment.len());

    for (d, purchaser_vars) in assignment.iter().enumerate() {
        let mut assigned = 0u32;
        for (p, &var) in purchaser_vars.iter().enumerate() {
            if solution.value(var) > 0.5 {
                if assigned != 0 {
                    return Err(Error::InconsistentAssignment { deal: d });
                }
                assigned = p as u32 + 1;
            }
        }
        allocation.push(assigned);
    }

    Ok(Allocation { allocation })
}
