// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
pub mod Utils;
pub mod fem;
pub mod symbolic;

pub use fem::calculus::{
    CoefficientRegistry, OperatorRegistry, OperatorTag, cross, curl, div, dot, dx, dy, dz, grad,
    inner, rot,
};
pub use fem::errors::FormError;
pub use fem::form::{BilinearForm, LinearForm, WeakForm};
pub use fem::gelatize::{Gelatizer, gelatize};
pub use fem::normalize::{BasisNames, Normalizer, normalize_weak_from};
pub use fem::space::{FunctionSpace, FunctionSymbol, TestFunction, TrialFunction};
pub use symbolic::symbolic_engine::Expr;
