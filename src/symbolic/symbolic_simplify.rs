//! # Symbolic Expression Simplification Module
//!
//! Light algebraic clean-up for normalized integrands. Gelatization and normalization never
//! simplify on their own (results stay structurally comparable); callers opt in through
//! `Normalizer::with_simplify` or by calling [`Expr::simplify_`] directly.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: evaluates arithmetic on numerical constants
//! 2. **Algebraic Identities**: `x + 0 = x`, `x - 0 = x`, `0 - x = -1 * x`, `x * 1 = x`
//! 3. **Zero Elimination**: `0 * x = 0`, `0 * (x, y) = (0, 0)`
//!
//! Operator and tuple nodes are simplified argument-wise.

use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Recursive constant folding and identity removal.
    ///
    /// ## Examples
    ///
    /// - `0 * (x + y)` → `0`
    /// - `(2 * 3) * x` → `6 * x`
    /// - `x + 0` → `x`
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                    _ if lhs.is_zero() => rhs,
                    _ if rhs.is_zero() => lhs,
                    _ => lhs + rhs,
                }
            }
            Expr::Sub(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                    _ if rhs.is_zero() => lhs,
                    _ if lhs.is_zero() => Expr::Const(-1.0) * rhs,
                    _ => lhs - rhs,
                }
            }
            Expr::Mul(lhs, rhs) => {
                let (lhs, rhs) = (lhs.simplify_(), rhs.simplify_());
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                    // a zero factor keeps the shape of a tuple operand
                    (Expr::Tuple(items), _) | (_, Expr::Tuple(items))
                        if lhs.is_zero() || rhs.is_zero() =>
                    {
                        Expr::Tuple(vec![Expr::Const(0.0); items.len()])
                    }
                    _ if lhs.is_zero() || rhs.is_zero() => Expr::Const(0.0),
                    (Expr::Const(a), _) if *a == 1.0 => rhs,
                    (_, Expr::Const(b)) if *b == 1.0 => lhs,
                    // keep the numeric factor in front: (2 * x) * 3 -> 6 * x
                    (Expr::Mul(inner_lhs, inner_rhs), Expr::Const(b)) => {
                        match inner_lhs.as_ref() {
                            Expr::Const(a) => Expr::Const(a * b) * inner_rhs.as_ref().clone(),
                            _ => lhs.clone() * rhs.clone(),
                        }
                    }
                    _ => lhs * rhs,
                }
            }
            _ => self.map_children(|child| child.simplify_()),
        }
    }
}
