#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// expression tree of weak-form integrands: test/trial functions, coefficients, tuples,
/// arithmetic and operator nodes, with traversal and substitution
///# Example#
/// ```
/// use RustedWeakForm::fem::calculus::{grad, inner};
/// use RustedWeakForm::fem::space::{FunctionSpace, TestFunction, TrialFunction};
/// let space = FunctionSpace::new("V", 2);
/// let u = TrialFunction::new(&space, "u").expr();
/// let v = TestFunction::new(&space, "v").expr();
/// let expr = inner(grad(u.clone()), grad(v.clone())) + 0.2 * u * v;
/// assert_eq!(expr.to_string(), "(Inner(Grad(u), Grad(v)) + ((0.2 * u) * v))");
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
///______________________________________________________________________________________________________________________________________________
/// constant folding and identity removal
pub mod symbolic_simplify;
