//! # Symbolic Engine Module
//!
//! This module provides the expression tree the weak-form pipeline rewrites. An [`Expr`] is a
//! recursive, `Box`ed enum describing a bilinear/linear form integrand: numeric constants,
//! flat symbols, test/trial functions and their vector components, coefficient symbols
//! (constants and fields), tuples, the three arithmetic operations and the three families of
//! operator nodes (generic, concrete and partial derivative).
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Leaves**: `Const(f64)`, `Var(String)`, `Function(FunctionSymbol)`,
//!   `Component(FunctionSymbol, usize)`, `Field(String)`, `Constant(String)`
//! - **Algebra**: `Add`, `Sub`, `Mul` - binary, boxed; `Tuple(Vec<Expr>)` for vector values
//! - **Operators**: `Generic(OperatorTag, args)` (dimension-agnostic, built by the user),
//!   `Concrete(ConcreteOperator, args)` (dimension-specific, built only by the gelatizer),
//!   `Partial(Axis, args)` (partial derivative, consumed by the normalizer)
//!
//! ### Key Methods
//! - `preorder()` - pre-order traversal of the tree
//! - `factors()` / `product()` - flatten and rebuild products
//! - `substitute()` / `substitute_map()` - structural substitution
//! - `rename_functions()` - swap test/trial functions (and their components)
//! - `free_functions()` / `free_fields()` - deduplicated free symbols
//! - `generic_tags()` - distinct generic operator tags in pre-order
//! - `derivative_order()` - length of a partial-derivative chain
//!
//! ## Interesting Code Features
//!
//! 1. **Operator Overloading**: `std::ops` traits (Add, Sub, Mul, Neg) give natural syntax:
//!    `inner(grad(w), grad(v)) + 0.2 * w * v`
//!
//! 2. **Structural Equality**: `PartialEq` is derived, so two expressions are equal exactly when
//!    their trees coincide. The pipeline never simplifies implicitly, which keeps results
//!    comparable with hand-built expected trees.

#![allow(non_camel_case_types)]

use crate::fem::calculus::{Axis, ConcreteOperator, OperatorTag};
use crate::fem::space::FunctionSymbol;
use itertools::Itertools;
use std::fmt;

/// Core symbolic expression enum representing a weak-form integrand as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedWeakForm::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numerical constant value
    Const(f64),
    /// Plain flat symbol (derivative symbols, basis-function symbols)
    Var(String),
    /// Test or trial function bound to a function space
    Function(FunctionSymbol),
    /// i-th component of a vector-valued test or trial function
    Component(FunctionSymbol, usize),
    /// Externally supplied field coefficient
    Field(String),
    /// Named constant coefficient
    Constant(String),
    /// Vector-valued expression
    Tuple(Vec<Expr>),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Dimension-agnostic operator application, e.g. `Grad(w)`
    Generic(OperatorTag, Vec<Expr>),
    /// Dimension-specific operator application left unevaluated, e.g. `Div_2d(w)`
    Concrete(ConcreteOperator, Vec<Expr>),
    /// Partial derivative along an axis
    Partial(Axis, Vec<Expr>),
}

fn join_args(args: &[Expr]) -> String {
    args.iter().map(|a| a.to_string()).join(", ")
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Arithmetic is fully parenthesized; operators print as `Name(args)`, components as `v[i]`
/// and partial derivatives as `dx(..)`, `dy(..)`, `dz(..)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Function(func) => write!(f, "{}", func.name()),
            Expr::Component(func, i) => write!(f, "{}", func.component_name(*i)),
            Expr::Field(name) => write!(f, "{}", name),
            Expr::Constant(name) => write!(f, "{}", name),
            Expr::Tuple(items) => write!(f, "({})", join_args(items)),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Generic(tag, args) => write!(f, "{}({})", tag, join_args(args)),
            Expr::Concrete(op, args) => write!(f, "{}({})", op, join_args(args)),
            Expr::Partial(axis, args) => write!(f, "d{}({})", axis, join_args(args)),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

/// `0.2 * w` builds `Mul(Const(0.2), w)`
impl std::ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(self)), rhs.boxed())
    }
}

impl std::ops::AddAssign for Expr {
    fn add_assign(&mut self, rhs: Self) {
        *self = Expr::Add(Box::new(self.clone()), Box::new(rhs));
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl From<FunctionSymbol> for Expr {
    fn from(func: FunctionSymbol) -> Self {
        Expr::Function(func)
    }
}

impl From<&FunctionSymbol> for Expr {
    fn from(func: &FunctionSymbol) -> Self {
        Expr::Function(func.clone())
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Named constant coefficient
    pub fn constant(name: &str) -> Expr {
        Expr::Constant(name.to_string())
    }

    /// Field coefficient
    pub fn field(name: &str) -> Expr {
        Expr::Field(name.to_string())
    }

    /// Vector-valued expression from its components
    pub fn tuple(items: Vec<Expr>) -> Expr {
        Expr::Tuple(items)
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Short name of the node kind, used in error messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Const(_) => "Const",
            Expr::Var(_) => "Var",
            Expr::Function(func) if func.is_test() => "TestFunction",
            Expr::Function(_) => "TrialFunction",
            Expr::Component(..) => "Component",
            Expr::Field(_) => "Field",
            Expr::Constant(_) => "Constant",
            Expr::Tuple(_) => "Tuple",
            Expr::Add(..) => "Add",
            Expr::Sub(..) => "Sub",
            Expr::Mul(..) => "Mul",
            Expr::Generic(..) => "GenericOperator",
            Expr::Concrete(..) => "ConcreteOperator",
            Expr::Partial(..) => "PartialDerivative",
        }
    }

    //___________________________________TRAVERSAL____________________________________

    /// Direct sub-expressions of this node, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) => {
                vec![lhs.as_ref(), rhs.as_ref()]
            }
            Expr::Tuple(args)
            | Expr::Generic(_, args)
            | Expr::Concrete(_, args)
            | Expr::Partial(_, args) => args.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Pre-order traversal: the node itself first, then its children left to right.
    pub fn preorder(&self) -> Vec<&Expr> {
        let mut nodes = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        nodes
    }

    /// Rebuilds the node with every direct child mapped through `f`.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Tuple(args) => Expr::Tuple(args.iter().map(&mut f).collect()),
            Expr::Generic(tag, args) => Expr::Generic(*tag, args.iter().map(&mut f).collect()),
            Expr::Concrete(op, args) => Expr::Concrete(*op, args.iter().map(&mut f).collect()),
            Expr::Partial(axis, args) => Expr::Partial(*axis, args.iter().map(&mut f).collect()),
            _ => self.clone(),
        }
    }

    /// Fallible version of [`Expr::map_children`]; stops at the first error.
    pub fn try_map_children<F, E>(&self, mut f: F) -> Result<Expr, E>
    where
        F: FnMut(&Expr) -> Result<Expr, E>,
    {
        Ok(match self {
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)?), Box::new(f(rhs)?)),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)?), Box::new(f(rhs)?)),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)?), Box::new(f(rhs)?)),
            Expr::Tuple(args) => Expr::Tuple(args.iter().map(&mut f).collect::<Result<_, E>>()?),
            Expr::Generic(tag, args) => {
                Expr::Generic(*tag, args.iter().map(&mut f).collect::<Result<_, E>>()?)
            }
            Expr::Concrete(op, args) => {
                Expr::Concrete(*op, args.iter().map(&mut f).collect::<Result<_, E>>()?)
            }
            Expr::Partial(axis, args) => {
                Expr::Partial(*axis, args.iter().map(&mut f).collect::<Result<_, E>>()?)
            }
            _ => self.clone(),
        })
    }

    //___________________________________PRODUCTS____________________________________

    /// Flattens nested products into their factors, left to right.
    /// A non-product expression is its own single factor.
    pub fn factors(&self) -> Vec<Expr> {
        match self {
            Expr::Mul(lhs, rhs) => {
                let mut factors = lhs.factors();
                factors.extend(rhs.factors());
                factors
            }
            _ => vec![self.clone()],
        }
    }

    /// Flattens nested sums and differences into signed addends: `a - (b + c)` gives
    /// `[(1, a), (-1, b), (-1, c)]`.
    pub fn terms(&self) -> Vec<(f64, Expr)> {
        match self {
            Expr::Add(lhs, rhs) => {
                let mut terms = lhs.terms();
                terms.extend(rhs.terms());
                terms
            }
            Expr::Sub(lhs, rhs) => {
                let mut terms = lhs.terms();
                terms.extend(rhs.terms().into_iter().map(|(sign, t)| (-sign, t)));
                terms
            }
            _ => vec![(1.0, self.clone())],
        }
    }

    /// Left-associated product of `factors`, `None` for an empty list.
    pub fn product(factors: Vec<Expr>) -> Option<Expr> {
        factors.into_iter().reduce(|acc, factor| acc * factor)
    }

    /// Left-associated sum of `terms`, `None` for an empty list.
    pub fn sum(terms: Vec<Expr>) -> Option<Expr> {
        terms.into_iter().reduce(|acc, term| acc + term)
    }

    //___________________________________SUBSTITUTION____________________________________

    /// Replaces every occurrence of the sub-tree `old` with `new`.
    pub fn substitute(&self, old: &Expr, new: &Expr) -> Expr {
        if self == old {
            return new.clone();
        }
        self.map_children(|child| child.substitute(old, new))
    }

    /// Simultaneous substitution: each node is compared against the pairs in order and
    /// replaced by the first match; replacements are not rewritten again.
    pub fn substitute_map(&self, pairs: &[(Expr, Expr)]) -> Expr {
        if let Some((_, new)) = pairs.iter().find(|(old, _)| old == self) {
            return new.clone();
        }
        self.map_children(|child| child.substitute_map(pairs))
    }

    /// Swaps test/trial functions, carrying component indices over.
    pub fn rename_functions(&self, bindings: &[(FunctionSymbol, FunctionSymbol)]) -> Expr {
        let lookup = |func: &FunctionSymbol| {
            bindings
                .iter()
                .find(|(old, _)| old == func)
                .map(|(_, new)| new.clone())
        };
        match self {
            Expr::Function(func) => match lookup(func) {
                Some(new) => Expr::Function(new),
                None => self.clone(),
            },
            Expr::Component(func, i) => match lookup(func) {
                Some(new) => Expr::Component(new, *i),
                None => self.clone(),
            },
            _ => self.map_children(|child| child.rename_functions(bindings)),
        }
    }

    //___________________________________QUERIES____________________________________

    /// Test/trial functions occurring in the expression, deduplicated in pre-order.
    /// Components report their parent function.
    pub fn free_functions(&self) -> Vec<FunctionSymbol> {
        self.preorder()
            .into_iter()
            .filter_map(|node| match node {
                Expr::Function(func) | Expr::Component(func, _) => Some(func.clone()),
                _ => None,
            })
            .unique()
            .collect()
    }

    /// Names of the fields occurring in the expression, deduplicated in pre-order.
    pub fn free_fields(&self) -> Vec<String> {
        self.preorder()
            .into_iter()
            .filter_map(|node| match node {
                Expr::Field(name) => Some(name.clone()),
                _ => None,
            })
            .unique()
            .collect()
    }

    /// true if any generic operator node is left in the tree
    pub fn contains_generic(&self) -> bool {
        self.preorder()
            .into_iter()
            .any(|node| matches!(node, Expr::Generic(..)))
    }

    /// true if the tree holds nodes that only exist once a dimension is fixed:
    /// partial derivatives, concrete operators or vector components
    pub fn is_dimension_resolved(&self) -> bool {
        self.preorder().into_iter().any(|node| {
            matches!(
                node,
                Expr::Partial(..) | Expr::Concrete(..) | Expr::Component(..)
            )
        })
    }

    /// Distinct generic operator tags, in the order of their first pre-order occurrence.
    pub fn generic_tags(&self) -> Vec<OperatorTag> {
        self.preorder()
            .into_iter()
            .filter_map(|node| match node {
                Expr::Generic(tag, _) => Some(*tag),
                _ => None,
            })
            .unique()
            .collect()
    }

    /// Every partial-derivative node of the tree, outer chains included with their inner links.
    pub fn partial_derivatives(&self) -> Vec<&Expr> {
        self.preorder()
            .into_iter()
            .filter(|node| matches!(node, Expr::Partial(..)))
            .collect()
    }

    /// Length of the partial-derivative chain starting at this node: `dx(dy(u))` has order 2,
    /// anything that is not a derivative has order 0.
    pub fn derivative_order(&self) -> usize {
        match self {
            Expr::Partial(_, args) => {
                1 + args.first().map_or(0, |arg| arg.derivative_order())
            }
            _ => 0,
        }
    }
}

//___________________________________MACROS____________________________________

/// Macro to create constant coefficients from a comma-separated list
/// Usage: constants!(bx, by) -> creates Constant("bx"), Constant("by")
#[macro_export]
macro_rules! constants {
    ($($var:ident),+ $(,)?) => {
        ($(
            $crate::symbolic::symbolic_engine::Expr::Constant(stringify!($var).to_string())
        ),+)
    };
}
