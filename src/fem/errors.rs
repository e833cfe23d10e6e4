use crate::fem::calculus::OperatorTag;

/// Errors raised by the weak-form pipeline.
///
/// Every transformation either returns a complete result or one of these; no partially
/// rewritten form is ever handed back.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// The top-level input is not a form, a sum, a product, a tuple or an operator node.
    #[error(
        "wrong input type `{0}`: expecting BilinearForm, LinearForm, Add, Mul, partial derivatives or calculus operators"
    )]
    UnsupportedInputType(String),
    /// The ambient dimension could not be read off a form or an operator operand.
    #[error("cannot infer the dimension: {0}")]
    DimensionInference(String),
    /// The operator has no concrete variant in the inferred dimension.
    #[error("operator {op} is not defined in dimension {dim}")]
    UnsupportedDimension { op: OperatorTag, dim: usize },
    /// A vector operand has the wrong number of components for the dimension.
    #[error("operator {op} expects {expected} components, got {found}")]
    ShapeMismatch {
        op: OperatorTag,
        expected: usize,
        found: usize,
    },
    /// Wrong number of operands or of re-bound functions.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),
    /// A test function was supplied where a trial function is expected, or the reverse.
    #[error("wrong argument type: {0}")]
    WrongArgumentType(String),
    #[error("component {index} of `{function}` is out of range (shape {shape})")]
    IndexOutOfRange {
        function: String,
        index: usize,
        shape: usize,
    },
    /// Trial and test spaces of a bilinear form live in different dimensions.
    #[error("trial space dimension {trial} does not match test space dimension {test}")]
    DimensionMismatch { trial: usize, test: usize },
    /// Two forms over different spaces were added.
    #[error("cannot combine forms over different spaces: {0}")]
    SpaceMismatch(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// Malformed task document.
    #[error("configuration error: {0}")]
    Config(String),
}
