//! Algebraic expressions over model variables.
//!
//! An [`Expr`] is a constant plus a list of [`Term`]s. Terms are kept in
//! insertion order and may repeat a variable; [`Expr::normalized_terms`]
//! merges them. A bilinear term makes the expression nonlinear, which is
//! what bound-based Big-M estimation rejects.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::ids::VariableId;
use std::collections::BTreeMap;

/// One monomial of an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// `coeff * var`
    Linear { var: VariableId, coeff: f64 },
    /// `coeff * a * b`
    Bilinear {
        a: VariableId,
        b: VariableId,
        coeff: f64,
    },
}

impl Term {
    pub fn coeff(&self) -> f64 {
        match self {
            Term::Linear { coeff, .. } | Term::Bilinear { coeff, .. } => *coeff,
        }
    }

    fn scaled(self, by: f64) -> Self {
        match self {
            Term::Linear { var, coeff } => Term::Linear {
                var,
                coeff: coeff * by,
            },
            Term::Bilinear { a, b, coeff } => Term::Bilinear {
                a,
                b,
                coeff: coeff * by,
            },
        }
    }

    fn value<F>(&self, value_of: &F) -> Option<f64>
    where
        F: Fn(VariableId) -> Option<f64>,
    {
        match self {
            Term::Linear { var, coeff } => Some(coeff * value_of(*var)?),
            Term::Bilinear { a, b, coeff } => Some(coeff * value_of(*a)? * value_of(*b)?),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    constant: f64,
    terms: Vec<Term>,
}

impl Expr {
    /// Linear expression `sum(coeff * var) + constant`.
    pub fn new(linear: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self {
            constant,
            terms: linear
                .into_iter()
                .map(|(var, coeff)| Term::Linear { var, coeff })
                .collect(),
        }
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            terms: Vec::new(),
        }
    }

    /// `coeff * var`; a zero coefficient gives the empty expression.
    pub fn term(var: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self::new(vec![(var, coeff)], 0.0)
    }

    pub fn var(var: VariableId) -> Self {
        Self::new(vec![(var, 1.0)], 0.0)
    }

    /// `coeff * a * b`; a zero coefficient gives the empty expression.
    pub fn product(a: VariableId, b: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            constant: 0.0,
            terms: vec![Term::Bilinear { a, b, coeff }],
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn linear_terms(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.terms.iter().filter_map(|term| match term {
            Term::Linear { var, coeff } => Some((*var, *coeff)),
            Term::Bilinear { .. } => None,
        })
    }

    pub fn bilinear_terms(&self) -> impl Iterator<Item = (VariableId, VariableId, f64)> + '_ {
        self.terms.iter().filter_map(|term| match term {
            Term::Bilinear { a, b, coeff } => Some((*a, *b, *coeff)),
            Term::Linear { .. } => None,
        })
    }

    /// 0 for a constant, 1 for linear, 2 once any bilinear term is present.
    pub fn degree(&self) -> usize {
        self.terms
            .iter()
            .map(|term| match term {
                Term::Linear { .. } => 1,
                Term::Bilinear { .. } => 2,
            })
            .max()
            .unwrap_or(0)
    }

    /// Sorted, deduplicated variables of the expression.
    pub fn variables(&self) -> Vec<VariableId> {
        let mut vars: Vec<VariableId> = self
            .terms
            .iter()
            .flat_map(|term| match term {
                Term::Linear { var, .. } => vec![*var],
                Term::Bilinear { a, b, .. } => vec![*a, *b],
            })
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            terms: self
                .terms
                .iter()
                .map(|term| term.scaled(by))
                .filter(|term| term.coeff() != 0.0)
                .collect(),
        }
    }

    /// Concatenate terms and sum constants.
    pub fn add(&self, other: &Expr) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        terms.extend_from_slice(&self.terms);
        terms.extend_from_slice(&other.terms);
        Self {
            constant: self.constant + other.constant,
            terms,
        }
    }

    pub fn add_constant(&self, value: f64) -> Self {
        Self {
            constant: self.constant + value,
            terms: self.terms.clone(),
        }
    }

    pub fn without_constant(&self) -> Self {
        self.add_constant(-self.constant)
    }

    /// Linear coefficients by variable, duplicates merged and zeros dropped.
    pub fn normalized_terms(&self) -> Vec<(VariableId, f64)> {
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var, coeff) in self.linear_terms() {
            *merged.entry(var).or_insert(0.0) += coeff;
        }
        merged.into_iter().filter(|(_, c)| *c != 0.0).collect()
    }

    /// Value under an assignment; `None` if a variable has no value.
    pub fn evaluate<F>(&self, value_of: F) -> Option<f64>
    where
        F: Fn(VariableId) -> Option<f64>,
    {
        self.terms
            .iter()
            .try_fold(self.constant, |total, term| Some(total + term.value(&value_of)?))
    }

    /// `self <sense> rhs` with the constant moved to the right-hand side.
    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(self.without_constant(), sense, rhs - self.constant)
    }

    pub fn compare_expr(&self, other: &Expr, sense: ComparisonSense) -> ConstraintExpr {
        self.add(&other.scale(-1.0)).compare_scalar(0.0, sense)
    }

    pub fn le_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::Equal)
    }

    pub fn le_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::GreaterEqual)
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs.scale(-1.0))
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}
