//! # Weak-form normalization
//!
//! Turns a gelatized integrand into the flat, basis-indexed expression handed to quadrature
//! assembly:
//!
//! - every partial-derivative chain becomes one symbol, `dx(dy(u)) -> u_xy`,
//!   `dx(v[0]) -> v_x[0]`; axis letters are sorted so the written order does not matter
//! - with a basis-name map (`{V: "Nj", W: "Ni"}`) the map's name replaces the function name in
//!   derivative symbols (`dx(w) -> Ni_x`) and every remaining test/trial occurrence becomes the
//!   plain basis symbol (`w -> Ni`, `v[1] -> Nj[1]`)
//!
//! Derivative chains are substituted longest first, so a chain is always named as a whole.

use crate::fem::calculus::{Axis, CoefficientRegistry, DEFAULT_COEFFICIENTS};
use crate::fem::errors::FormError;
use crate::fem::form::WeakForm;
use crate::fem::gelatize::{Gelatizer, check_input_kind};
use crate::fem::space::FunctionSpace;
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashMap;

/// Basis-function display name per function space.
pub type BasisNames = HashMap<FunctionSpace, String>;

/// Flat symbol name for a partial-derivative chain.
///
/// `hint` replaces the function name when the differentiated function's space is named in
/// `names`. Every link of the chain must have exactly one operand.
pub fn partial_derivative_as_symbol(
    derivative: &Expr,
    names: Option<&BasisNames>,
) -> Result<String, FormError> {
    let mut axes: Vec<Axis> = Vec::new();
    let mut atom = derivative;
    while let Expr::Partial(axis, args) = atom {
        let [arg] = args.as_slice() else {
            return Err(FormError::ArityMismatch(format!(
                "expecting only one argument for partial derivatives, got {} in `{}`",
                args.len(),
                atom
            )));
        };
        axes.push(*axis);
        atom = arg;
    }
    let suffix: String = axes.iter().sorted().map(|a| a.to_string()).collect();
    let hint = |space: &FunctionSpace| names.and_then(|names| names.get(space));
    let name = match atom {
        Expr::Function(func) => {
            let base = hint(func.space()).map_or(func.name(), |h| h.as_str());
            format!("{}_{}", base, suffix)
        }
        Expr::Component(func, i) => {
            let base = hint(func.space()).map_or(func.name(), |h| h.as_str());
            format!("{}_{}[{}]", base, suffix, i)
        }
        Expr::Field(name) | Expr::Var(name) => format!("{}_{}", name, suffix),
        other => {
            return Err(FormError::UnsupportedInputType(format!(
                "{} under a partial derivative",
                other.kind_name()
            )));
        }
    };
    Ok(name)
}

/// Normalization pass: gelatize, flatten derivatives, substitute basis names.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'r> {
    gelatizer: Gelatizer<'r>,
    names: Option<&'r BasisNames>,
    simplify: bool,
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Normalizer::new(&DEFAULT_COEFFICIENTS)
    }
}

impl<'r> Normalizer<'r> {
    pub fn new(coefficients: &'r CoefficientRegistry) -> Self {
        Self {
            gelatizer: Gelatizer::new(coefficients),
            names: None,
            simplify: false,
        }
    }

    /// basis-function name per space
    pub fn with_names(mut self, names: &'r BasisNames) -> Self {
        self.names = Some(names);
        self
    }

    /// fold constants in the final expression
    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    pub fn normalize(&self, input: impl Into<WeakForm>) -> Result<WeakForm, FormError> {
        match input.into() {
            WeakForm::Bilinear(form) => {
                let gelatized = self
                    .gelatizer
                    .gelatize(form)?
                    .into_bilinear()
                    .ok_or_else(|| {
                        FormError::UnsupportedInputType("gelatized bilinear form".to_string())
                    })?;
                let expr = self.flatten(gelatized.expr())?;
                info!("normalized bilinear form: {}", expr);
                Ok(WeakForm::Bilinear(gelatized.with_expr(expr)))
            }
            WeakForm::Linear(_) => Err(FormError::NotImplemented(
                "normalization of linear forms".to_string(),
            )),
            WeakForm::Expr(expr) => {
                check_input_kind(&expr)?;
                Ok(WeakForm::Expr(self.normalize_expr(&expr)?))
            }
        }
    }

    /// Raw-expression path: distributes over sums and keeps coefficients out of the
    /// operand product, like gelatization does.
    pub fn normalize_expr(&self, expr: &Expr) -> Result<Expr, FormError> {
        match expr {
            Expr::Add(lhs, rhs) => Ok(self.normalize_expr(lhs)? + self.normalize_expr(rhs)?),
            Expr::Sub(lhs, rhs) => Ok(self.normalize_expr(lhs)? - self.normalize_expr(rhs)?),
            Expr::Mul(..) => {
                let (coeffs, operands) = self
                    .gelatizer
                    .coefficients()
                    .split_factors(expr.factors());
                let operands = match Expr::product(operands) {
                    Some(product) => Some(self.normalize_term(&product)?),
                    None => None,
                };
                Ok(match (Expr::product(coeffs), operands) {
                    (Some(c), Some(o)) => c * o,
                    (Some(c), None) => c,
                    (None, Some(o)) => o,
                    (None, None) => Expr::Const(1.0),
                })
            }
            _ => self.normalize_term(expr),
        }
    }

    fn normalize_term(&self, expr: &Expr) -> Result<Expr, FormError> {
        if expr.contains_generic() {
            let gelatized = self.gelatizer.gelatize_expr(expr)?;
            self.flatten(&gelatized)
        } else {
            self.flatten(expr)
        }
    }

    /// Replaces derivative chains by flat symbols, then test/trial functions by basis symbols.
    fn flatten(&self, expr: &Expr) -> Result<Expr, FormError> {
        let derivatives = expr.partial_derivatives().into_iter().sorted_by(|a, b| {
            b.derivative_order()
                .cmp(&a.derivative_order())
                .then_with(|| a.to_string().cmp(&b.to_string()))
        });
        let mut pairs: Vec<(Expr, Expr)> = Vec::new();
        for derivative in derivatives {
            let symbol = Expr::Var(partial_derivative_as_symbol(derivative, self.names)?);
            if pairs.iter().any(|(known, _)| known == derivative) {
                continue;
            }
            debug!("{} -> {}", derivative, symbol);
            pairs.push((derivative.clone(), symbol));
        }
        let mut result = expr.substitute_map(&pairs);

        if let Some(names) = self.names {
            let mut basis = Vec::new();
            for func in result.free_functions() {
                let Some(name) = names.get(func.space()) else {
                    continue;
                };
                debug!("{} -> {}", func, name);
                for (i, component) in func.components().into_iter().enumerate() {
                    basis.push((component, Expr::Var(format!("{}[{}]", name, i))));
                }
                basis.push((func.expr(), Expr::Var(name.clone())));
            }
            result = result.substitute_map(&basis);
        }

        Ok(if self.simplify {
            result.simplify_()
        } else {
            result
        })
    }
}

/// Normalizes with the default coefficient registry and an optional basis-name map.
pub fn normalize_weak_from(
    input: impl Into<WeakForm>,
    names: Option<&BasisNames>,
) -> Result<WeakForm, FormError> {
    let normalizer = Normalizer::new(&DEFAULT_COEFFICIENTS);
    match names {
        Some(names) => normalizer.with_names(names).normalize(input),
        None => normalizer.normalize(input),
    }
}
