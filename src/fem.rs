//! # Weak-form compiler
//!
//! Rewrites bilinear/linear forms written with dimension-generic operators into
//! dimension-specific, basis-indexed expressions:
//!
//! ```
//! use RustedWeakForm::fem::calculus::{grad, inner};
//! use RustedWeakForm::fem::form::BilinearForm;
//! use RustedWeakForm::fem::gelatize::gelatize;
//! use RustedWeakForm::fem::normalize::{BasisNames, normalize_weak_from};
//! use RustedWeakForm::fem::space::{FunctionSpace, TestFunction, TrialFunction};
//!
//! let trial_space = FunctionSpace::new("V", 2);
//! let test_space = FunctionSpace::new("W", 2);
//! let u = TrialFunction::new(&trial_space, "u").expr();
//! let w = TestFunction::new(&test_space, "w").expr();
//! let form = BilinearForm::new(
//!     inner(grad(w), grad(u)),
//!     Some(trial_space.clone()),
//!     Some(test_space.clone()),
//! )
//! .unwrap();
//! let gelatized = gelatize(&form).unwrap();
//! assert_eq!(gelatized.to_string(), "((dx(w) * dx(u)) + (dy(w) * dy(u)))");
//!
//! let names = BasisNames::from([(trial_space, "Nj".to_string()), (test_space, "Ni".to_string())]);
//! let normalized = normalize_weak_from(&form, Some(&names)).unwrap();
//! assert_eq!(normalized.to_string(), "((Ni_x * Nj_x) + (Ni_y * Nj_y))");
//! ```

/// generic/concrete operators, partial derivatives and the coefficient registry
pub mod calculus;
/// settings document: basis names, log level, simplification
pub mod config;
pub mod errors;
/// bilinear and linear form containers
pub mod form;
mod form_tests;
/// dimension resolution of generic operators
pub mod gelatize;
/// derivative flattening and basis-name substitution
pub mod normalize;
mod normalize_tests;
/// function spaces and test/trial function symbols
pub mod space;
