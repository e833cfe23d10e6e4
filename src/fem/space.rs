//! Function spaces and the test/trial function symbols bound to them.
//!
//! A [`FunctionSpace`] is a shared handle: cloning it keeps the identity, creating a new one
//! (even with identical parameters) gives a distinct space. Equality and hashing go by that
//! identity, which is what lets a basis-name map be keyed by space.

use crate::fem::errors::FormError;
use crate::symbolic::symbolic_engine::Expr;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use strum_macros::Display;

static NEXT_SPACE_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SpaceKind {
    Scalar,
    Vector,
    Block,
}

#[derive(Debug)]
struct SpaceData {
    id: usize,
    name: String,
    ldim: usize,
    kind: SpaceKind,
    shape: usize,
}

/// Scalar, vector or block finite-element space.
#[derive(Debug, Clone)]
pub struct FunctionSpace(Arc<SpaceData>);

impl FunctionSpace {
    fn with_kind(name: &str, ldim: usize, kind: SpaceKind, shape: usize) -> Self {
        FunctionSpace(Arc::new(SpaceData {
            id: NEXT_SPACE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.to_string(),
            ldim,
            kind,
            shape,
        }))
    }

    /// scalar space of dimension `ldim`
    pub fn new(name: &str, ldim: usize) -> Self {
        Self::with_kind(name, ldim, SpaceKind::Scalar, 1)
    }

    /// vector space whose functions have `shape` components
    pub fn vector(name: &str, ldim: usize, shape: usize) -> Self {
        Self::with_kind(name, ldim, SpaceKind::Vector, shape)
    }

    /// block space whose functions have `shape` components
    pub fn block(name: &str, ldim: usize, shape: usize) -> Self {
        Self::with_kind(name, ldim, SpaceKind::Block, shape)
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ldim(&self) -> usize {
        self.0.ldim
    }

    pub fn kind(&self) -> SpaceKind {
        self.0.kind
    }

    /// number of components, `None` for scalar spaces
    pub fn shape(&self) -> Option<usize> {
        self.is_vector_valued().then_some(self.0.shape)
    }

    pub fn is_vector_valued(&self) -> bool {
        self.0.kind != SpaceKind::Scalar
    }
}

impl PartialEq for FunctionSpace {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for FunctionSpace {}

impl Hash for FunctionSpace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for FunctionSpace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FunctionSpace {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.id().cmp(&other.id()))
    }
}

impl fmt::Display for FunctionSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a function is tested against or solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Role {
    Test,
    Trial,
}

/// A test or trial function bound to exactly one space.
///
/// Ordering is by name first, which is the order forms expose their functions in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionSymbol {
    name: String,
    role: Role,
    space: FunctionSpace,
}

impl FunctionSymbol {
    pub fn new(space: &FunctionSpace, name: &str, role: Role) -> Self {
        Self {
            name: name.to_string(),
            role,
            space: space.clone(),
        }
    }

    /// test function `name` on `space`
    pub fn test(space: &FunctionSpace, name: &str) -> Self {
        Self::new(space, name, Role::Test)
    }

    /// trial function `name` on `space`
    pub fn trial(space: &FunctionSpace, name: &str) -> Self {
        Self::new(space, name, Role::Trial)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn space(&self) -> &FunctionSpace {
        &self.space
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_test(&self) -> bool {
        self.role == Role::Test
    }

    pub fn is_trial(&self) -> bool {
        self.role == Role::Trial
    }

    pub fn expr(&self) -> Expr {
        Expr::Function(self.clone())
    }

    /// display name of the i-th component, `v[i]`
    pub fn component_name(&self, index: usize) -> String {
        format!("{}[{}]", self.name, index)
    }

    /// i-th component of a vector/block function
    pub fn component(&self, index: usize) -> Result<Expr, FormError> {
        match self.space.shape() {
            Some(shape) if index < shape => Ok(Expr::Component(self.clone(), index)),
            shape => Err(FormError::IndexOutOfRange {
                function: self.name.clone(),
                index,
                shape: shape.unwrap_or(0),
            }),
        }
    }

    /// all components, empty for a scalar function
    pub fn components(&self) -> Vec<Expr> {
        (0..self.space.shape().unwrap_or(0))
            .map(|i| Expr::Component(self.clone(), i))
            .collect()
    }
}

/// Builder for test-role symbols: `TestFunction::new(&space, "w")`.
pub struct TestFunction;

impl TestFunction {
    pub fn new(space: &FunctionSpace, name: &str) -> FunctionSymbol {
        FunctionSymbol::test(space, name)
    }
}

/// Builder for trial-role symbols: `TrialFunction::new(&space, "u")`.
pub struct TrialFunction;

impl TrialFunction {
    pub fn new(space: &FunctionSpace, name: &str) -> FunctionSymbol {
        FunctionSymbol::trial(space, name)
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
