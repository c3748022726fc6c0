use std::fmt;

use crate::utils::constants::EPSILON;

/// Index of a binary decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    LessOrEqual,
}

/// `sum(coefficient * x) relation rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn lhs(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|(var, _)| values[var.0])
            .map(|(_, coefficient)| coefficient)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs = self.lhs(values);
        match self.relation {
            Relation::Equal => (lhs - self.rhs).abs() <= EPSILON,
            Relation::LessOrEqual => lhs <= self.rhs + EPSILON,
        }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match self.relation {
            Relation::Equal => "=",
            Relation::LessOrEqual => "<=",
        };
        write!(f, "{}: ", self.name)?;
        for (i, (var, coefficient)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{} x{}", coefficient, var.0)?;
        }
        write!(f, " {} {}", relation, self.rhs)
    }
}

/// A pure 0-1 feasibility model: binary variables, linear constraints, no objective.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IlpModel {
    name: String,
    variables: Vec<String>,
    constraints: Vec<LinearConstraint>,
}

impl IlpModel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_binary(&mut self, name: String) -> VarId {
        self.variables.push(name);
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(&mut self, name: String, terms: Vec<(VarId, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(LinearConstraint { name, terms, relation, rhs });
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, var: VarId) -> &str {
        &self.variables[var.0]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// The first constraint violated by `values`, if any.
    pub fn first_violation(&self, values: &[bool]) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| !c.is_satisfied(values))
    }
}
