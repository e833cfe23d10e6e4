//! Form containers: [`BilinearForm`], [`LinearForm`] and the [`WeakForm`] input/output
//! wrapper accepted by the gelatizer and the normalizer.
//!
//! Forms are values: re-binding, addition, gelatization and normalization all return new forms.

use crate::fem::errors::FormError;
use crate::fem::space::{FunctionSpace, FunctionSymbol, Role};
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use log::debug;
use std::fmt;

/// functions of `role` in `expr`, deduplicated and sorted by name
fn functions_with_role(expr: &Expr, role: Role) -> Vec<FunctionSymbol> {
    expr.free_functions()
        .into_iter()
        .filter(|f| f.role() == role)
        .sorted()
        .collect()
}

fn space_name(space: &Option<FunctionSpace>) -> &str {
    space.as_ref().map_or("<none>", |s| s.name())
}

/// One function or an ordered collection of functions for call-application.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    One(FunctionSymbol),
    Many(Vec<FunctionSymbol>),
}

impl Arguments {
    pub fn into_vec(self) -> Vec<FunctionSymbol> {
        match self {
            Arguments::One(f) => vec![f],
            Arguments::Many(fs) => fs,
        }
    }
}

impl From<FunctionSymbol> for Arguments {
    fn from(f: FunctionSymbol) -> Self {
        Arguments::One(f)
    }
}

impl From<&FunctionSymbol> for Arguments {
    fn from(f: &FunctionSymbol) -> Self {
        Arguments::One(f.clone())
    }
}

impl From<Vec<FunctionSymbol>> for Arguments {
    fn from(fs: Vec<FunctionSymbol>) -> Self {
        Arguments::Many(fs)
    }
}

impl From<&[FunctionSymbol]> for Arguments {
    fn from(fs: &[FunctionSymbol]) -> Self {
        Arguments::Many(fs.to_vec())
    }
}

/// Pairs the form's own functions of `role` with the supplied replacements, positionally.
fn positional_bindings(
    current: Vec<FunctionSymbol>,
    supplied: Arguments,
    role: Role,
) -> Result<Vec<(FunctionSymbol, FunctionSymbol)>, FormError> {
    let supplied = supplied.into_vec();
    if let Some(wrong) = supplied.iter().find(|f| f.role() != role) {
        return Err(FormError::WrongArgumentType(format!(
            "expecting {} functions, `{}` is a {} function",
            role,
            wrong.name(),
            wrong.role()
        )));
    }
    if supplied.len() != current.len() {
        return Err(FormError::ArityMismatch(format!(
            "the form has {} {} function(s), {} supplied",
            current.len(),
            role,
            supplied.len()
        )));
    }
    Ok(current.into_iter().zip(supplied).collect())
}

/// Bilinear form `a(u, v)`: an integrand together with its trial and test spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct BilinearForm {
    expr: Expr,
    trial_space: Option<FunctionSpace>,
    test_space: Option<FunctionSpace>,
}

impl BilinearForm {
    /// Fails with `DimensionMismatch` when both spaces are given and their `ldim` differ.
    pub fn new(
        expr: Expr,
        trial_space: Option<FunctionSpace>,
        test_space: Option<FunctionSpace>,
    ) -> Result<Self, FormError> {
        if let (Some(trial), Some(test)) = (&trial_space, &test_space) {
            if trial.ldim() != test.ldim() {
                return Err(FormError::DimensionMismatch {
                    trial: trial.ldim(),
                    test: test.ldim(),
                });
            }
        }
        Ok(Self {
            expr,
            trial_space,
            test_space,
        })
    }

    /// Same spaces, new integrand.
    pub(crate) fn with_expr(&self, expr: Expr) -> Self {
        Self {
            expr,
            trial_space: self.trial_space.clone(),
            test_space: self.test_space.clone(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn trial_space(&self) -> Option<&FunctionSpace> {
        self.trial_space.as_ref()
    }

    pub fn test_space(&self) -> Option<&FunctionSpace> {
        self.test_space.as_ref()
    }

    /// dimension of the test space, or of the trial space when no test space is declared
    pub fn ldim(&self) -> Option<usize> {
        self.test_space
            .as_ref()
            .or(self.trial_space.as_ref())
            .map(|s| s.ldim())
    }

    /// trial functions of the integrand, sorted by name
    pub fn trial_functions(&self) -> Vec<FunctionSymbol> {
        functions_with_role(&self.expr, Role::Trial)
    }

    /// test functions of the integrand, sorted by name
    pub fn test_functions(&self) -> Vec<FunctionSymbol> {
        functions_with_role(&self.expr, Role::Test)
    }

    /// field names of the integrand, sorted
    pub fn fields(&self) -> Vec<String> {
        self.expr.free_fields().into_iter().sorted().collect()
    }

    /// Call-application `a(tests, trials)`.
    ///
    /// The form's own test and trial functions, in their name-sorted order, are replaced
    /// positionally by the supplied ones. Callers must therefore pass the replacements in
    /// that same order; [`BilinearForm::rebind`] avoids the positional contract.
    pub fn apply(
        &self,
        tests: impl Into<Arguments>,
        trials: impl Into<Arguments>,
    ) -> Result<Self, FormError> {
        let mut bindings = positional_bindings(self.test_functions(), tests.into(), Role::Test)?;
        bindings.extend(positional_bindings(
            self.trial_functions(),
            trials.into(),
            Role::Trial,
        )?);
        debug!(
            "re-binding {}",
            bindings.iter().map(|(old, new)| format!("{old} -> {new}")).join(", ")
        );
        Ok(self.with_expr(self.expr.rename_functions(&bindings)))
    }

    /// Named re-binding: every `(old, new)` pair replaces `old` by `new`.
    /// Both functions of a pair must have the same role.
    pub fn rebind(&self, bindings: &[(FunctionSymbol, FunctionSymbol)]) -> Result<Self, FormError> {
        if let Some((old, new)) = bindings.iter().find(|(old, new)| old.role() != new.role()) {
            return Err(FormError::WrongArgumentType(format!(
                "cannot replace {} function `{}` by {} function `{}`",
                old.role(),
                old.name(),
                new.role(),
                new.name()
            )));
        }
        Ok(self.with_expr(self.expr.rename_functions(bindings)))
    }

    /// Sum of two forms over the same trial and test spaces.
    pub fn try_add(&self, other: &BilinearForm) -> Result<Self, FormError> {
        if self.trial_space != other.trial_space || self.test_space != other.test_space {
            return Err(FormError::SpaceMismatch(format!(
                "({}, {}) and ({}, {})",
                space_name(&self.trial_space),
                space_name(&self.test_space),
                space_name(&other.trial_space),
                space_name(&other.test_space)
            )));
        }
        Ok(self.with_expr(self.expr.clone() + other.expr.clone()))
    }
}

impl std::ops::Add<&BilinearForm> for &BilinearForm {
    type Output = Result<BilinearForm, FormError>;

    fn add(self, rhs: &BilinearForm) -> Self::Output {
        self.try_add(rhs)
    }
}

impl fmt::Display for BilinearForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Linear form `l(v)`: an integrand and its test space.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearForm {
    expr: Expr,
    test_space: Option<FunctionSpace>,
}

impl LinearForm {
    pub fn new(expr: Expr, test_space: Option<FunctionSpace>) -> Self {
        Self { expr, test_space }
    }

    pub(crate) fn with_expr(&self, expr: Expr) -> Self {
        Self {
            expr,
            test_space: self.test_space.clone(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn test_space(&self) -> Option<&FunctionSpace> {
        self.test_space.as_ref()
    }

    pub fn ldim(&self) -> Option<usize> {
        self.test_space.as_ref().map(|s| s.ldim())
    }

    pub fn test_functions(&self) -> Vec<FunctionSymbol> {
        functions_with_role(&self.expr, Role::Test)
    }

    pub fn fields(&self) -> Vec<String> {
        self.expr.free_fields().into_iter().sorted().collect()
    }
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Anything the pipeline accepts and returns: a form or a raw expression.
#[derive(Debug, Clone, PartialEq)]
pub enum WeakForm {
    Bilinear(BilinearForm),
    Linear(LinearForm),
    Expr(Expr),
}

impl WeakForm {
    /// the integrand, whatever the wrapper
    pub fn expr(&self) -> &Expr {
        match self {
            WeakForm::Bilinear(form) => form.expr(),
            WeakForm::Linear(form) => form.expr(),
            WeakForm::Expr(expr) => expr,
        }
    }

    pub fn into_expr(self) -> Expr {
        match self {
            WeakForm::Bilinear(form) => form.expr,
            WeakForm::Linear(form) => form.expr,
            WeakForm::Expr(expr) => expr,
        }
    }

    pub fn into_bilinear(self) -> Option<BilinearForm> {
        match self {
            WeakForm::Bilinear(form) => Some(form),
            _ => None,
        }
    }

    pub fn into_linear(self) -> Option<LinearForm> {
        match self {
            WeakForm::Linear(form) => Some(form),
            _ => None,
        }
    }
}

impl From<BilinearForm> for WeakForm {
    fn from(form: BilinearForm) -> Self {
        WeakForm::Bilinear(form)
    }
}

impl From<&BilinearForm> for WeakForm {
    fn from(form: &BilinearForm) -> Self {
        WeakForm::Bilinear(form.clone())
    }
}

impl From<LinearForm> for WeakForm {
    fn from(form: LinearForm) -> Self {
        WeakForm::Linear(form)
    }
}

impl From<Expr> for WeakForm {
    fn from(expr: Expr) -> Self {
        WeakForm::Expr(expr)
    }
}

impl From<&Expr> for WeakForm {
    fn from(expr: &Expr) -> Self {
        WeakForm::Expr(expr.clone())
    }
}

impl fmt::Display for WeakForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr())
    }
}
