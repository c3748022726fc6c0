use std::time::{Duration, Instant};

use log::debug;

use super::model::{IlpModel, Relation};
use super::solver::{IlpSolver, SolverStatus};
use crate::utils::constants::EPSILON;
use crate::utils::SolverError;

/// How often, in explored nodes, the clock is read.
const CLOCK_CHECK_INTERVAL: u64 = 1024;

/// Exact depth-first branch-and-bound over binary variables.
///
/// Variables are fixed in model order, `1` before `0`. Every constraint keeps the
/// sum of its fixed terms together with the positive and negative mass of its
/// free terms, so a branch is cut as soon as some constraint can no longer be
/// met whatever the free variables become.
///
/// Rows of the form `sum(x) = 1` over disjoint variables are additionally checked
/// against the sum of every non-negative `<=` row: each open choice row must still
/// spend at least its cheapest free variable, and the total may not exceed the
/// summed capacity. This refutes overloaded packings without enumerating them.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
}

impl BranchAndBound {
    pub fn new(time_limit: Option<Duration>, node_limit: Option<u64>) -> Self {
        Self { time_limit, node_limit }
    }
}

impl IlpSolver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn solve(&self, model: &IlpModel) -> Result<SolverStatus, SolverError> {
        let mut search = Search::new(model, self)?;

        // rows already out of reach before branching, e.g. an empty `= 1` row
        if !search.rows.iter().all(|r| r.is_attainable()) || !search.within_budget(0) {
            debug!("{}: infeasible at the root", model.name());
            return Ok(SolverStatus::Infeasible);
        }

        let found = search.descend(0)?;
        debug!(
            "{}: {} nodes explored, {}",
            model.name(),
            search.nodes,
            if found { "feasible" } else { "infeasible" }
        );

        if found {
            Ok(SolverStatus::Optimal(search.values))
        } else {
            Ok(SolverStatus::Infeasible)
        }
    }
}

/// Running bounds of one constraint.
#[derive(Debug, Clone)]
struct Row {
    relation: Relation,
    rhs: f64,
    fixed: f64,     // Sum of coefficients of variables fixed to 1
    free_pos: f64,  // Sum of positive coefficients of free variables
    free_neg: f64,  // Sum of negative coefficients of free variables
}

impl Row {
    fn is_attainable(&self) -> bool {
        let low = self.fixed + self.free_neg;
        let high = self.fixed + self.free_pos;
        match self.relation {
            Relation::Equal => low <= self.rhs + EPSILON && high + EPSILON >= self.rhs,
            Relation::LessOrEqual => low <= self.rhs + EPSILON,
        }
    }
}

/// Row `sum(x) = 1` whose variables belong to no other choice row.
#[derive(Debug, Clone)]
struct Choice {
    row: usize,
    vars: Vec<usize>,
}

struct Search<'a> {
    rows: Vec<Row>,
    columns: Vec<Vec<(usize, f64)>>, // Per variable: (row, coefficient)
    values: Vec<bool>,
    choices: Vec<Choice>,
    weights: Vec<f64>, // Per variable: summed coefficient over the capacity rows
    capacity: f64,     // Summed right-hand side of the capacity rows
    load: f64,         // Summed weight of the variables fixed to 1
    nodes: u64,
    started: Instant,
    config: &'a BranchAndBound,
}

impl<'a> Search<'a> {
    fn new(model: &IlpModel, config: &'a BranchAndBound) -> Result<Self, SolverError> {
        let mut rows = Vec::with_capacity(model.constraints().len());
        let mut columns = vec![Vec::new(); model.variable_count()];
        let mut choices = Vec::new();
        let mut claimed = vec![false; model.variable_count()];
        let mut weights = vec![0.0; model.variable_count()];
        let mut capacity = 0.0;

        for (index, constraint) in model.constraints().iter().enumerate() {
            if !constraint.rhs.is_finite() {
                return Err(SolverError::MalformedModel(format!(
                    "constraint `{}` has a non-finite right-hand side",
                    constraint.name
                )));
            }

            let mut row = Row {
                relation: constraint.relation,
                rhs: constraint.rhs,
                fixed: 0.0,
                free_pos: 0.0,
                free_neg: 0.0,
            };

            for &(var, coefficient) in constraint.terms.iter() {
                if var.0 >= model.variable_count() || !coefficient.is_finite() {
                    return Err(SolverError::MalformedModel(format!(
                        "constraint `{}` has an invalid term on x{}",
                        constraint.name, var.0
                    )));
                }
                if coefficient > 0.0 {
                    row.free_pos += coefficient;
                } else {
                    row.free_neg += coefficient;
                }
                columns[var.0].push((index, coefficient));
            }

            match constraint.relation {
                Relation::LessOrEqual if constraint.terms.iter().all(|&(_, c)| c >= 0.0) => {
                    capacity += constraint.rhs;
                    for &(var, coefficient) in constraint.terms.iter() {
                        weights[var.0] += coefficient;
                    }
                }
                Relation::Equal
                    if (constraint.rhs - 1.0).abs() <= EPSILON
                        && constraint.terms.iter().all(|&(v, c)| c == 1.0 && !claimed[v.0]) =>
                {
                    let mut vars: Vec<usize> = constraint.terms.iter().map(|&(v, _)| v.0).collect();
                    vars.sort_unstable();
                    vars.dedup();
                    if vars.len() == constraint.terms.len() {
                        vars.iter().for_each(|&v| claimed[v] = true);
                        choices.push(Choice { row: index, vars });
                    }
                }
                _ => {}
            }

            rows.push(row);
        }

        Ok(Self {
            rows,
            columns,
            values: vec![false; model.variable_count()],
            choices,
            weights,
            capacity,
            load: 0.0,
            nodes: 0,
            started: Instant::now(),
            config,
        })
    }

    /// Explores every completion of the variables `var..`.
    fn descend(&mut self, var: usize) -> Result<bool, SolverError> {
        self.tick()?;

        if var == self.values.len() {
            return Ok(self.rows.iter().all(|r| r.is_attainable()));
        }

        if !self.within_budget(var) {
            return Ok(false);
        }

        for value in [true, false] {
            if self.fix(var, value) && self.descend(var + 1)? {
                return Ok(true);
            }
            self.unfix(var, value);
        }

        Ok(false)
    }

    /// Lower bound on the capacity still to be spent, against the summed capacity.
    /// Variables `free..` are not fixed yet.
    fn within_budget(&self, free: usize) -> bool {
        if self.choices.is_empty() {
            return true;
        }

        let pending: f64 = self
            .choices
            .iter()
            .filter(|c| self.rows[c.row].fixed < 1.0 - EPSILON)
            .map(|c| {
                c.vars
                    .iter()
                    .filter(|&&v| v >= free)
                    .map(|&v| self.weights[v])
                    .fold(f64::INFINITY, f64::min)
            })
            .filter(|w| w.is_finite())
            .sum();

        self.load + pending <= self.capacity + EPSILON
    }

    /// Fixes a variable and reports whether every touched row stays attainable.
    fn fix(&mut self, var: usize, value: bool) -> bool {
        self.values[var] = value;
        if value {
            self.load += self.weights[var];
        }
        let mut attainable = true;

        for &(row, coefficient) in self.columns[var].iter() {
            let row = &mut self.rows[row];
            if coefficient > 0.0 {
                row.free_pos -= coefficient;
            } else {
                row.free_neg -= coefficient;
            }
            if value {
                row.fixed += coefficient;
            }
            attainable &= row.is_attainable();
        }

        attainable
    }

    fn unfix(&mut self, var: usize, value: bool) {
        self.values[var] = false;
        if value {
            self.load -= self.weights[var];
        }

        for &(row, coefficient) in self.columns[var].iter() {
            let row = &mut self.rows[row];
            if coefficient > 0.0 {
                row.free_pos += coefficient;
            } else {
                row.free_neg += coefficient;
            }
            if value {
                row.fixed -= coefficient;
            }
        }
    }

    fn tick(&mut self) -> Result<(), SolverError> {
        self.nodes += 1;

        if let Some(limit) = self.config.node_limit {
            if self.nodes > limit {
                return Err(SolverError::NodeLimitExceeded { nodes: self.nodes - 1 });
            }
        }

        if let Some(limit) = self.config.time_limit {
            if self.nodes % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() > limit {
                return Err(SolverError::TimeLimitExceeded { limit });
            }
        }

        Ok(())
    }
}
