//! # Calculus: operator registry and coefficient registry
//!
//! Generic operators (`Grad`, `Div`, `Curl`, `Rot`, `Dot`, `Cross`, `Inner`) are tagged by
//! [`OperatorTag`] and stay dimension-agnostic until gelatization. The [`OperatorRegistry`] is
//! a static table keyed by `(OperatorTag, dimension)` that hands out the matching
//! [`ConcreteOperator`]; [`ConcreteOperator::apply`] expands it into components made of partial
//! derivatives, sums and products.
//!
//! The [`CoefficientRegistry`] decides which factors of a product are plain multipliers
//! (numbers, constants, fields) and therefore never operands of an operator.
//!
//! Builders mirror the usual notation: `grad(w)`, `inner(grad(w), grad(v))`, `dx(v[0])`.

use crate::fem::errors::FormError;
use crate::symbolic::symbolic_engine::Expr;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Dimension-agnostic operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum OperatorTag {
    Grad,
    Div,
    Curl,
    Rot,
    Dot,
    Cross,
    Inner,
}

impl OperatorTag {
    /// number of operands the operator takes
    pub fn arity(&self) -> usize {
        match self {
            OperatorTag::Grad | OperatorTag::Div | OperatorTag::Curl | OperatorTag::Rot => 1,
            OperatorTag::Dot | OperatorTag::Cross | OperatorTag::Inner => 2,
        }
    }
}

/// Axis of a partial derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Axis {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    #[strum(serialize = "z")]
    Z,
}

impl Axis {
    /// axes spanning a space of dimension `dim` (at most three)
    pub fn for_dimension(dim: usize) -> &'static [Axis] {
        static ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
        &ALL[..dim.min(3)]
    }
}

//___________________________________BUILDERS____________________________________

/// Partial derivative of `expr` along `axis`.
///
/// The derivative is linear over sums and tuples, constants differentiate to zero, constant
/// factors are pulled out of products and the product rule splits the remaining factors.
/// Anything else becomes a `Partial(axis, [expr])` node.
pub fn partial(axis: Axis, expr: Expr) -> Expr {
    match expr {
        Expr::Const(_) | Expr::Constant(_) => Expr::Const(0.0),
        Expr::Add(lhs, rhs) => partial(axis, *lhs) + partial(axis, *rhs),
        Expr::Sub(lhs, rhs) => partial(axis, *lhs) - partial(axis, *rhs),
        Expr::Tuple(items) => Expr::Tuple(items.into_iter().map(|i| partial(axis, i)).collect()),
        product @ Expr::Mul(..) => {
            let (constants, variables): (Vec<Expr>, Vec<Expr>) = product
                .factors()
                .into_iter()
                .partition(|f| matches!(f, Expr::Const(_) | Expr::Constant(_)));
            // product rule over the non-constant factors
            let terms: Vec<Expr> = (0..variables.len())
                .filter_map(|i| {
                    let factors = variables
                        .iter()
                        .enumerate()
                        .map(|(j, f)| {
                            if i == j {
                                partial(axis, f.clone())
                            } else {
                                f.clone()
                            }
                        })
                        .collect();
                    Expr::product(factors)
                })
                .collect();
            let Some(derivative) = Expr::sum(terms) else {
                return Expr::Const(0.0);
            };
            match Expr::product(constants) {
                Some(coefficient) => coefficient * derivative,
                None => derivative,
            }
        }
        other => Expr::Partial(axis, vec![other]),
    }
}

pub fn dx(expr: Expr) -> Expr {
    partial(Axis::X, expr)
}

pub fn dy(expr: Expr) -> Expr {
    partial(Axis::Y, expr)
}

pub fn dz(expr: Expr) -> Expr {
    partial(Axis::Z, expr)
}

pub fn grad(expr: Expr) -> Expr {
    Expr::Generic(OperatorTag::Grad, vec![expr])
}

pub fn div(expr: Expr) -> Expr {
    Expr::Generic(OperatorTag::Div, vec![expr])
}

pub fn curl(expr: Expr) -> Expr {
    Expr::Generic(OperatorTag::Curl, vec![expr])
}

pub fn rot(expr: Expr) -> Expr {
    Expr::Generic(OperatorTag::Rot, vec![expr])
}

pub fn dot(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Generic(OperatorTag::Dot, vec![lhs, rhs])
}

pub fn cross(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Generic(OperatorTag::Cross, vec![lhs, rhs])
}

pub fn inner(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Generic(OperatorTag::Inner, vec![lhs, rhs])
}

//___________________________________OPERATOR REGISTRY____________________________________

/// Dimension-specific counterpart of a generic operator, printed as `Grad_2d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConcreteOperator {
    pub tag: OperatorTag,
    pub dim: usize,
}

impl fmt::Display for ConcreteOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}d", self.tag, self.dim)
    }
}

/// Static `(OperatorTag, dimension) -> ConcreteOperator` table.
pub struct OperatorRegistry;

impl OperatorRegistry {
    /// true if `tag` has a concrete variant in dimension `dim`
    pub const fn supports(tag: OperatorTag, dim: usize) -> bool {
        use OperatorTag::*;
        matches!(
            (tag, dim),
            (Grad | Div | Dot | Inner, 1..=3) | (Cross, 2..=3) | (Rot, 2) | (Curl, 3)
        )
    }

    pub fn resolve(tag: OperatorTag, dim: usize) -> Result<ConcreteOperator, FormError> {
        if Self::supports(tag, dim) {
            Ok(ConcreteOperator { tag, dim })
        } else {
            Err(FormError::UnsupportedDimension { op: tag, dim })
        }
    }
}

/// Components of a vector-valued operand: the items of a tuple or the components of a
/// vector/block test/trial function. `None` for anything scalar or of unknown shape.
pub fn components(expr: &Expr) -> Option<Vec<Expr>> {
    match expr {
        Expr::Tuple(items) => Some(items.clone()),
        Expr::Function(func) if func.space().is_vector_valued() => Some(func.components()),
        _ => None,
    }
}

impl ConcreteOperator {
    fn unevaluated(&self, args: Vec<Expr>) -> Expr {
        Expr::Concrete(*self, args)
    }

    fn checked(&self, parts: Vec<Expr>) -> Result<Vec<Expr>, FormError> {
        if parts.len() == self.dim {
            Ok(parts)
        } else {
            Err(FormError::ShapeMismatch {
                op: self.tag,
                expected: self.dim,
                found: parts.len(),
            })
        }
    }

    /// Applies the algebraic rule of the operator to its operands.
    ///
    /// Operands whose shape does not fit the rule (a scalar where a vector is expected or the
    /// reverse) leave an unevaluated `Concrete` node behind.
    pub fn apply(&self, args: Vec<Expr>) -> Result<Expr, FormError> {
        if args.len() != self.tag.arity() {
            return Err(FormError::ArityMismatch(format!(
                "{} expects {} operand(s), got {}",
                self, self.tag.arity(), args.len()
            )));
        }
        let axes = Axis::for_dimension(self.dim);
        let expanded = match self.tag {
            OperatorTag::Grad => match components(&args[0]) {
                Some(_) => None,
                None if self.dim == 1 => Some(dx(args[0].clone())),
                None => Some(Expr::Tuple(
                    axes.iter().map(|a| partial(*a, args[0].clone())).collect(),
                )),
            },
            OperatorTag::Div => match components(&args[0]) {
                Some(parts) => {
                    let parts = self.checked(parts)?;
                    Expr::sum(axes.iter().zip(parts).map(|(a, p)| partial(*a, p)).collect())
                }
                None if self.dim == 1 => Some(dx(args[0].clone())),
                None => None,
            },
            OperatorTag::Rot => match components(&args[0]) {
                Some(parts) => {
                    let u = self.checked(parts)?;
                    Some(dy(u[0].clone()) - dx(u[1].clone()))
                }
                None => None,
            },
            OperatorTag::Curl => match components(&args[0]) {
                Some(parts) => {
                    let u = self.checked(parts)?;
                    Some(Expr::Tuple(vec![
                        dy(u[2].clone()) - dz(u[1].clone()),
                        dz(u[0].clone()) - dx(u[2].clone()),
                        dx(u[1].clone()) - dy(u[0].clone()),
                    ]))
                }
                None => None,
            },
            OperatorTag::Dot | OperatorTag::Inner => {
                match (components(&args[0]), components(&args[1])) {
                    (Some(a), Some(b)) => {
                        let (a, b) = (self.checked(a)?, self.checked(b)?);
                        Expr::sum(a.into_iter().zip(b).map(|(x, y)| x * y).collect())
                    }
                    (None, None) => Some(args[0].clone() * args[1].clone()),
                    _ => None,
                }
            }
            OperatorTag::Cross => match (components(&args[0]), components(&args[1])) {
                (Some(a), Some(b)) => {
                    let (a, b) = (self.checked(a)?, self.checked(b)?);
                    if self.dim == 2 {
                        Some(a[0].clone() * b[1].clone() - a[1].clone() * b[0].clone())
                    } else {
                        Some(Expr::Tuple(vec![
                            a[1].clone() * b[2].clone() - a[2].clone() * b[1].clone(),
                            a[2].clone() * b[0].clone() - a[0].clone() * b[2].clone(),
                            a[0].clone() * b[1].clone() - a[1].clone() * b[0].clone(),
                        ]))
                    }
                }
                _ => None,
            },
        };
        Ok(expanded.unwrap_or_else(|| self.unevaluated(args)))
    }
}

//___________________________________COEFFICIENT REGISTRY____________________________________

/// Kinds of factors that act as multipliers rather than operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CoefficientKind {
    Number,
    Constant,
    Field,
}

impl CoefficientKind {
    /// the coefficient kind of a leaf, `None` for anything that is not a coefficient
    pub fn of(expr: &Expr) -> Option<CoefficientKind> {
        match expr {
            Expr::Const(_) => Some(CoefficientKind::Number),
            Expr::Constant(_) => Some(CoefficientKind::Constant),
            Expr::Field(_) => Some(CoefficientKind::Field),
            _ => None,
        }
    }
}

/// Immutable set of coefficient kinds, queried by [`CoefficientRegistry::is_coefficient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientRegistry {
    kinds: &'static [CoefficientKind],
}

impl CoefficientRegistry {
    /// numbers, constants and fields
    pub const DEFAULT: CoefficientRegistry = CoefficientRegistry::new(&[
        CoefficientKind::Number,
        CoefficientKind::Constant,
        CoefficientKind::Field,
    ]);

    pub const fn new(kinds: &'static [CoefficientKind]) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &[CoefficientKind] {
        self.kinds
    }

    pub fn is_coefficient(&self, expr: &Expr) -> bool {
        CoefficientKind::of(expr).is_some_and(|kind| self.kinds.contains(&kind))
    }

    /// Splits product factors into (coefficients, operands), keeping the original order
    /// inside each group.
    pub fn split_factors(&self, factors: Vec<Expr>) -> (Vec<Expr>, Vec<Expr>) {
        factors.into_iter().partition(|f| self.is_coefficient(f))
    }
}

/// Process-wide registry used by the free `gelatize` / `normalize_weak_from` functions.
pub static DEFAULT_COEFFICIENTS: CoefficientRegistry = CoefficientRegistry::DEFAULT;

impl Default for CoefficientRegistry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fem::space::{FunctionSpace, FunctionSymbol};
    use strum::IntoEnumIterator;

    #[test]
    fn test_registry_table() {
        assert!(OperatorRegistry::supports(OperatorTag::Grad, 1));
        assert!(OperatorRegistry::supports(OperatorTag::Cross, 3));
        assert!(!OperatorRegistry::supports(OperatorTag::Cross, 1));
        assert!(OperatorRegistry::supports(OperatorTag::Rot, 2));
        assert!(!OperatorRegistry::supports(OperatorTag::Rot, 3));
        assert!(!OperatorRegistry::supports(OperatorTag::Curl, 2));
        for tag in OperatorTag::iter() {
            assert!(!OperatorRegistry::supports(tag, 0));
            assert!(!OperatorRegistry::supports(tag, 4));
        }
        assert_eq!(
            OperatorRegistry::resolve(OperatorTag::Curl, 2),
            Err(FormError::UnsupportedDimension {
                op: OperatorTag::Curl,
                dim: 2
            })
        );
        let op = OperatorRegistry::resolve(OperatorTag::Grad, 2).unwrap();
        assert_eq!(op.to_string(), "Grad_2d");
    }

    #[test]
    fn test_partial_rules() {
        let space = FunctionSpace::new("V", 2);
        let u = FunctionSymbol::trial(&space, "u").expr();
        let w = FunctionSymbol::test(&space, "w").expr();
        assert_eq!(dx(Expr::Const(3.0)), Expr::Const(0.0));
        assert_eq!(dy(Expr::constant("c")), Expr::Const(0.0));
        assert_eq!(
            dx(u.clone() + w.clone()),
            Expr::Partial(Axis::X, vec![u.clone()]) + Expr::Partial(Axis::X, vec![w.clone()])
        );
        assert_eq!(
            dx(Expr::Const(2.0) * u.clone()),
            Expr::Const(2.0) * Expr::Partial(Axis::X, vec![u.clone()])
        );
        // product rule
        assert_eq!(
            dy(u.clone() * w.clone()),
            Expr::Partial(Axis::Y, vec![u.clone()]) * w.clone()
                + u.clone() * Expr::Partial(Axis::Y, vec![w.clone()])
        );
        assert_eq!(dx(dy(u.clone())).derivative_order(), 2);
    }

    #[test]
    fn test_apply_shapes() {
        let scalar = FunctionSpace::new("W", 2);
        let vector = FunctionSpace::vector("V", 2, 2);
        let w = FunctionSymbol::test(&scalar, "w").expr();
        let v = FunctionSymbol::test(&vector, "v").expr();
        let div_2d = OperatorRegistry::resolve(OperatorTag::Div, 2).unwrap();
        // scalar operand: left unevaluated
        assert_eq!(
            div_2d.apply(vec![w.clone()]).unwrap(),
            Expr::Concrete(div_2d, vec![w.clone()])
        );
        let div_3d = OperatorRegistry::resolve(OperatorTag::Div, 3).unwrap();
        assert_eq!(
            div_3d.apply(vec![v.clone()]),
            Err(FormError::ShapeMismatch {
                op: OperatorTag::Div,
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            div_2d.apply(vec![v.clone(), w.clone()]),
            Err(FormError::ArityMismatch(_))
        ));
    }

    #[test]
    fn test_coefficient_registry() {
        let registry = CoefficientRegistry::default();
        assert!(registry.is_coefficient(&Expr::Const(0.2)));
        assert!(registry.is_coefficient(&Expr::constant("bx")));
        assert!(registry.is_coefficient(&Expr::field("F")));
        assert!(!registry.is_coefficient(&Expr::Var("x".to_string())));
        let numbers_only = CoefficientRegistry::new(&[CoefficientKind::Number]);
        assert!(!numbers_only.is_coefficient(&Expr::field("F")));
        let (coeffs, rest) = registry.split_factors(vec![
            Expr::Const(0.2),
            Expr::Var("a".to_string()),
            Expr::field("F"),
        ]);
        assert_eq!(coeffs, vec![Expr::Const(0.2), Expr::field("F")]);
        assert_eq!(rest, vec![Expr::Var("a".to_string())]);
    }
}
