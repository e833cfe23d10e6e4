//! # Gelatization
//!
//! Resolves dimension-generic operators (`Grad`, `Div`, `Curl`, `Rot`, `Dot`, `Cross`,
//! `Inner`) into their 1D/2D/3D counterparts.
//!
//! ## Algorithm
//!
//! 1. **Type gate**: raw expressions must be sums, products, tuples or operator nodes
//! 2. **Dimension**: read off the form's test space, or off the space of the first test/trial
//!    function found under the first generic operator (pre-order)
//! 3. **Sums**: every addend is rewritten on its own and the sum is rebuilt
//! 4. **Products**: coefficients (numbers, constants, fields) are split off and only the
//!    remaining operand product is rewritten
//! 5. **Substitution**: every distinct generic tag is resolved in the operator registry and its
//!    nodes are replaced, innermost first, by the expanded concrete rule
//!
//! A raw expression without any generic operator is returned unchanged as long as it already
//! carries dimension-resolved content (partial derivatives, concrete operators, components),
//! which makes the pass idempotent. Anything else with nothing to infer a dimension from fails.
//! One consequence: `Dot`/`Inner` of two scalar operands resolves to a plain product such as
//! `w * v`, which holds neither a generic operator nor resolved content, so a second raw
//! pass over it reports `DimensionInference`. Wrap the integrand in a form to keep the pass
//! repeatable.

use crate::fem::calculus::{
    CoefficientRegistry, ConcreteOperator, DEFAULT_COEFFICIENTS, OperatorRegistry, partial,
};
use crate::fem::errors::FormError;
use crate::fem::form::WeakForm;
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use log::{debug, info};

/// Rejects leaves (symbols, numbers, lone functions) at the top level of a raw expression.
pub(crate) fn check_input_kind(expr: &Expr) -> Result<(), FormError> {
    match expr {
        Expr::Add(..)
        | Expr::Sub(..)
        | Expr::Mul(..)
        | Expr::Tuple(_)
        | Expr::Generic(..)
        | Expr::Concrete(..)
        | Expr::Partial(..) => Ok(()),
        other => Err(FormError::UnsupportedInputType(other.kind_name().to_string())),
    }
}

/// Dimension of a raw expression: the `ldim` of the space of the first test/trial function
/// found inside the first generic operator (pre-order).
pub fn discover_dimension(expr: &Expr) -> Result<usize, FormError> {
    let Some(Expr::Generic(tag, args)) = expr
        .preorder()
        .into_iter()
        .find(|node| matches!(node, Expr::Generic(..)))
    else {
        return Err(FormError::DimensionInference(format!(
            "`{}` holds no generic operator and is not wrapped in a form",
            expr
        )));
    };
    args.iter()
        .flat_map(|arg| arg.preorder())
        .find_map(|node| match node {
            Expr::Function(func) | Expr::Component(func, _) => Some(func.space().ldim()),
            _ => None,
        })
        .ok_or_else(|| {
            FormError::DimensionInference(format!(
                "operator {} has no test or trial function operand",
                tag
            ))
        })
}

/// Replaces generic nodes bottom-up so that outer operators see expanded operands.
///
/// A derivative over a rewritten operand is rebuilt through [`partial`], so `dx(div(v))`
/// distributes over the expanded sum instead of wrapping it.
fn substitute_generic(expr: &Expr, table: &[ConcreteOperator]) -> Result<Expr, FormError> {
    match expr {
        Expr::Partial(axis, args) if args.len() == 1 && args[0].contains_generic() => {
            Ok(partial(*axis, substitute_generic(&args[0], table)?))
        }
        Expr::Generic(tag, args) => {
            let args = args
                .iter()
                .map(|arg| substitute_generic(arg, table))
                .collect::<Result<Vec<_>, _>>()?;
            match table.iter().find(|op| op.tag == *tag) {
                Some(op) => op.apply(args),
                None => Ok(Expr::Generic(*tag, args)),
            }
        }
        other => other.try_map_children(|child| substitute_generic(child, table)),
    }
}

/// Dimension-resolving rewrite pass parameterized by its coefficient registry.
#[derive(Debug, Clone, Copy)]
pub struct Gelatizer<'r> {
    coefficients: &'r CoefficientRegistry,
}

impl Default for Gelatizer<'static> {
    fn default() -> Self {
        Gelatizer {
            coefficients: &DEFAULT_COEFFICIENTS,
        }
    }
}

impl<'r> Gelatizer<'r> {
    pub fn new(coefficients: &'r CoefficientRegistry) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &CoefficientRegistry {
        self.coefficients
    }

    /// Gelatizes a form or a raw expression; forms come back as forms over the same spaces.
    pub fn gelatize(&self, input: impl Into<WeakForm>) -> Result<WeakForm, FormError> {
        match input.into() {
            WeakForm::Bilinear(form) => {
                let dim = match form.ldim() {
                    Some(dim) => dim,
                    None => discover_dimension(form.expr())?,
                };
                info!("gelatizing bilinear form in dimension {}", dim);
                let expr = self.rewrite(form.expr(), dim)?;
                Ok(WeakForm::Bilinear(form.with_expr(expr)))
            }
            WeakForm::Linear(form) => {
                let dim = match form.ldim() {
                    Some(dim) => dim,
                    None => discover_dimension(form.expr())?,
                };
                info!("gelatizing linear form in dimension {}", dim);
                let expr = self.rewrite(form.expr(), dim)?;
                Ok(WeakForm::Linear(form.with_expr(expr)))
            }
            WeakForm::Expr(expr) => Ok(WeakForm::Expr(self.gelatize_expr(&expr)?)),
        }
    }

    /// Gelatizes a raw expression.
    pub fn gelatize_expr(&self, expr: &Expr) -> Result<Expr, FormError> {
        check_input_kind(expr)?;
        if !expr.contains_generic() && expr.is_dimension_resolved() {
            debug!("`{}` has no generic operator left", expr);
            return Ok(expr.clone());
        }
        let dim = discover_dimension(expr)?;
        info!("gelatizing expression in dimension {}", dim);
        self.rewrite(expr, dim)
    }

    /// Recursive rewrite with a known dimension: distributes over sums, keeps coefficients
    /// factored out of products and resolves operators in the rest.
    pub fn rewrite(&self, expr: &Expr, dim: usize) -> Result<Expr, FormError> {
        match expr {
            Expr::Add(lhs, rhs) => Ok(self.rewrite(lhs, dim)? + self.rewrite(rhs, dim)?),
            Expr::Sub(lhs, rhs) => Ok(self.rewrite(lhs, dim)? - self.rewrite(rhs, dim)?),
            Expr::Mul(..) => {
                let (coeffs, operands) = self.coefficients.split_factors(expr.factors());
                let operands = match Expr::product(operands) {
                    Some(product) => Some(self.resolve(&product, dim)?),
                    None => None,
                };
                Ok(match (Expr::product(coeffs), operands) {
                    (Some(c), Some(o)) => c * o,
                    (Some(c), None) => c,
                    (None, Some(o)) => o,
                    (None, None) => Expr::Const(1.0),
                })
            }
            _ => self.resolve(expr, dim),
        }
    }

    /// Substitutes every generic operator of `expr` with its concrete variant in `dim`.
    fn resolve(&self, expr: &Expr, dim: usize) -> Result<Expr, FormError> {
        let tags = expr.generic_tags();
        if tags.is_empty() {
            return Ok(expr.clone());
        }
        let table = tags
            .into_iter()
            .map(|tag| OperatorRegistry::resolve(tag, dim))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("resolving {}", table.iter().join(", "));
        substitute_generic(expr, &table)
    }
}

/// Gelatizes with the default coefficient registry.
pub fn gelatize(input: impl Into<WeakForm>) -> Result<WeakForm, FormError> {
    Gelatizer::default().gelatize(input)
}
