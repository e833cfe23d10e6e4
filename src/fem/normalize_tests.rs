#[cfg(test)]
mod tests {
    use crate::fem::calculus::{Axis, OperatorTag, curl, div, dx, dy, grad, inner};
    use crate::fem::errors::FormError;
    use crate::fem::form::{BilinearForm, LinearForm, WeakForm};
    use crate::fem::normalize::{
        BasisNames, Normalizer, normalize_weak_from, partial_derivative_as_symbol,
    };
    use crate::fem::space::{FunctionSpace, FunctionSymbol};
    use crate::symbolic::symbolic_engine::Expr;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// trial space V, test space W, both scalar and two-dimensional
    struct Setup {
        trial_space: FunctionSpace,
        test_space: FunctionSpace,
        v: Expr,
        w: Expr,
        names: BasisNames,
    }

    fn setup() -> Setup {
        let trial_space = FunctionSpace::new("V", 2);
        let test_space = FunctionSpace::new("W", 2);
        let v = FunctionSymbol::trial(&trial_space, "v").expr();
        let w = FunctionSymbol::test(&test_space, "w").expr();
        let names = BasisNames::from([
            (trial_space.clone(), "Nj".to_string()),
            (test_space.clone(), "Ni".to_string()),
        ]);
        Setup {
            trial_space,
            test_space,
            v,
            w,
            names,
        }
    }

    fn normalized(input: impl Into<WeakForm>, names: Option<&BasisNames>) -> Expr {
        normalize_weak_from(input, names).unwrap().into_expr()
    }

    #[test]
    fn test_mass_form_basis_names() {
        let s = setup();
        let form = BilinearForm::new(
            s.w.clone() * s.v.clone(),
            Some(s.trial_space.clone()),
            Some(s.test_space.clone()),
        )
        .unwrap();
        let result = normalize_weak_from(&form, Some(&s.names))
            .unwrap()
            .into_bilinear()
            .unwrap();
        assert_eq!(*result.expr(), var("Ni") * var("Nj"));
        assert_eq!(result.trial_space(), Some(&s.trial_space));
        assert_eq!(result.test_space(), Some(&s.test_space));
    }

    #[test]
    fn test_stiffness_form() {
        let s = setup();
        let form = BilinearForm::new(
            inner(grad(s.w.clone()), grad(s.v.clone())),
            Some(s.trial_space.clone()),
            Some(s.test_space.clone()),
        )
        .unwrap();
        assert_eq!(
            normalized(&form, Some(&s.names)),
            var("Ni_x") * var("Nj_x") + var("Ni_y") * var("Nj_y")
        );
        assert_eq!(
            normalized(&form, None),
            var("w_x") * var("v_x") + var("w_y") * var("v_y")
        );
    }

    #[test]
    fn test_derivative_symbols_without_names() {
        let s = setup();
        assert_eq!(normalized(dx(s.w.clone()), None), var("w_x"));
        assert_eq!(normalized(dx(s.w.clone()), Some(&s.names)), var("Ni_x"));
        assert_eq!(normalized(dy(Expr::field("F")), None), var("F_y"));
    }

    #[test]
    fn test_mixed_derivative_order_independent() {
        let space = FunctionSpace::new("U", 2);
        let u = FunctionSymbol::trial(&space, "u").expr();
        let xy = normalized(dx(dy(u.clone())), None);
        let yx = normalized(dy(dx(u.clone())), None);
        assert_eq!(xy, var("u_xy"));
        assert_eq!(xy, yx);
        assert_eq!(normalized(dx(dx(u.clone())), None), var("u_xx"));
    }

    #[test]
    fn test_chains_named_as_a_whole() {
        let space = FunctionSpace::new("U", 2);
        let u = FunctionSymbol::trial(&space, "u").expr();
        let expr = dx(dy(u.clone())) * dy(u.clone());
        assert_eq!(normalized(expr, None), var("u_xy") * var("u_y"));
    }

    #[test]
    fn test_vector_components() {
        let space = FunctionSpace::vector("V", 2, 2);
        let v = FunctionSymbol::test(&space, "v");
        let v0 = v.component(0).unwrap();
        let v1 = v.component(1).unwrap();
        let expr = dx(v0.clone()) * v1.clone();
        assert_eq!(normalized(&expr, None), var("v_x[0]") * v1.clone());

        let names = BasisNames::from([(space.clone(), "Nj".to_string())]);
        assert_eq!(
            normalized(&expr, Some(&names)),
            var("Nj_x[0]") * var("Nj[1]")
        );
    }

    #[test]
    fn test_names_carried_through_sums() {
        let s = setup();
        let expr = dx(s.w.clone()) * dx(s.v.clone()) + s.w.clone() * s.v.clone();
        assert_eq!(
            normalized(expr, Some(&s.names)),
            var("Ni_x") * var("Nj_x") + var("Ni") * var("Nj")
        );
    }

    #[test]
    fn test_unmapped_space_keeps_function_name() {
        let s = setup();
        let only_trial = BasisNames::from([(s.trial_space.clone(), "Nj".to_string())]);
        let expr = dx(s.w.clone()) * s.v.clone() + s.w.clone() * dy(s.v.clone());
        assert_eq!(
            normalized(expr, Some(&only_trial)),
            var("w_x") * var("Nj") + s.w.clone() * var("Nj_y")
        );
    }

    #[test]
    fn test_raw_generic_expression() {
        let s = setup();
        assert_eq!(
            normalized(grad(s.w.clone()), None),
            Expr::Tuple(vec![var("w_x"), var("w_y")])
        );
        let expr = Expr::constant("k") * inner(grad(s.w.clone()), grad(s.v.clone()));
        assert_eq!(
            normalized(expr, Some(&s.names)),
            Expr::constant("k") * (var("Ni_x") * var("Nj_x") + var("Ni_y") * var("Nj_y"))
        );
    }

    #[test]
    fn test_linearity() {
        let s = setup();
        let a = inner(grad(s.w.clone()), grad(s.v.clone()));
        let b = 0.5 * s.w.clone() * s.v.clone();
        let form = |expr: Expr| {
            BilinearForm::new(
                expr,
                Some(s.trial_space.clone()),
                Some(s.test_space.clone()),
            )
            .unwrap()
        };
        let sum = form(a.clone()).try_add(&form(b.clone())).unwrap();
        assert_eq!(
            normalized(&sum, Some(&s.names)),
            normalized(&form(a), Some(&s.names)) + normalized(&form(b), Some(&s.names))
        );
    }

    #[test]
    fn test_simplify_option() {
        let s = setup();
        let expr = 1.0 * s.w.clone() * s.v.clone() + 0.0 * dx(s.w.clone()) * s.v.clone();
        let form = BilinearForm::new(
            expr,
            Some(s.trial_space.clone()),
            Some(s.test_space.clone()),
        )
        .unwrap();
        let normalizer = Normalizer::default()
            .with_names(&s.names)
            .with_simplify(true);
        let result = normalizer.normalize(&form).unwrap().into_expr();
        assert_eq!(result, var("Ni") * var("Nj"));
    }

    #[test]
    fn test_linear_form_not_implemented() {
        let s = setup();
        let form = LinearForm::new(Expr::field("f") * s.w.clone(), Some(s.test_space.clone()));
        assert!(matches!(
            normalize_weak_from(form, Some(&s.names)),
            Err(FormError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_derivative_of_generic_operator() {
        let trial_space = FunctionSpace::new("V", 2);
        let test_space = FunctionSpace::vector("W", 2, 2);
        let w = FunctionSymbol::trial(&trial_space, "w").expr();
        let v = FunctionSymbol::test(&test_space, "v").expr();
        let names = BasisNames::from([
            (trial_space.clone(), "Nj".to_string()),
            (test_space.clone(), "Ni".to_string()),
        ]);
        let form = BilinearForm::new(
            dx(div(v)) * w.clone(),
            Some(trial_space.clone()),
            Some(test_space),
        )
        .unwrap();
        assert_eq!(
            normalized(&form, Some(&names)),
            (var("Ni_xx[0]") + var("Ni_xy[1]")) * var("Nj")
        );
        assert_eq!(
            normalized(dx(grad(w)), None),
            Expr::Tuple(vec![var("w_xx"), var("w_xy")])
        );
    }

    #[test]
    fn test_multi_argument_partial() {
        let s = setup();
        let bad = Expr::Partial(Axis::X, vec![s.w.clone(), s.v.clone()]);
        assert!(matches!(
            normalize_weak_from(bad.clone(), None),
            Err(FormError::ArityMismatch(_))
        ));
        assert!(matches!(
            partial_derivative_as_symbol(&bad, None),
            Err(FormError::ArityMismatch(_))
        ));
    }

    #[test]
    fn test_partial_of_unsupported_operand() {
        let tuple = Expr::Partial(Axis::Y, vec![Expr::tuple(vec![var("a"), var("b")])]);
        assert!(matches!(
            partial_derivative_as_symbol(&tuple, None),
            Err(FormError::UnsupportedInputType(_))
        ));
    }

    #[test]
    fn test_errors_propagate() {
        let space = FunctionSpace::vector("V", 2, 2);
        let v = FunctionSymbol::test(&space, "v").expr();
        assert_eq!(
            normalize_weak_from(curl(v), None),
            Err(FormError::UnsupportedDimension {
                op: OperatorTag::Curl,
                dim: 2
            })
        );
        assert!(matches!(
            normalize_weak_from(var("x"), None),
            Err(FormError::UnsupportedInputType(_))
        ));
    }
}
