#[cfg(test)]
mod tests {
    use crate::fem::calculus::{grad, inner};
    use crate::fem::errors::FormError;
    use crate::fem::form::{Arguments, BilinearForm, LinearForm, WeakForm};
    use crate::fem::space::{FunctionSpace, FunctionSymbol};
    use crate::symbolic::symbolic_engine::Expr;

    fn names(functions: &[FunctionSymbol]) -> Vec<&str> {
        functions.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_function_ordering() {
        let space = FunctionSpace::new("V", 2);
        let b = FunctionSymbol::trial(&space, "b").expr();
        let a = FunctionSymbol::trial(&space, "a").expr();
        let z = FunctionSymbol::test(&space, "z").expr();
        let c = FunctionSymbol::test(&space, "c").expr();
        let expr = Expr::field("G") * b.clone() * z.clone()
            + Expr::field("F") * a.clone() * c.clone()
            + b * c;
        let form = BilinearForm::new(expr, Some(space.clone()), Some(space)).unwrap();
        assert_eq!(names(&form.trial_functions()), vec!["a", "b"]);
        assert_eq!(names(&form.test_functions()), vec!["c", "z"]);
        assert_eq!(form.fields(), vec!["F".to_string(), "G".to_string()]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let trial_space = FunctionSpace::new("V", 2);
        let test_space = FunctionSpace::new("W", 3);
        let u = FunctionSymbol::trial(&trial_space, "u").expr();
        let w = FunctionSymbol::test(&test_space, "w").expr();
        assert_eq!(
            BilinearForm::new(u * w, Some(trial_space), Some(test_space)),
            Err(FormError::DimensionMismatch { trial: 2, test: 3 })
        );
    }

    #[test]
    fn test_apply_rebinds_and_keeps_spaces() {
        let trial_space = FunctionSpace::new("V", 2);
        let test_space = FunctionSpace::new("W", 2);
        let u = FunctionSymbol::trial(&trial_space, "u");
        let v = FunctionSymbol::test(&test_space, "v");
        let u1 = FunctionSymbol::trial(&trial_space, "u1");
        let v1 = FunctionSymbol::test(&test_space, "v1");
        let form = BilinearForm::new(
            inner(grad(u.expr()), grad(v.expr())) + u.expr() * v.expr(),
            Some(trial_space.clone()),
            Some(test_space.clone()),
        )
        .unwrap();
        let applied = form.apply(&v1, &u1).unwrap();
        assert_eq!(
            *applied.expr(),
            inner(grad(u1.expr()), grad(v1.expr())) + u1.expr() * v1.expr()
        );
        assert_eq!(applied.trial_space(), Some(&trial_space));
        assert_eq!(applied.test_space(), Some(&test_space));
        // `form` itself is unchanged
        assert_eq!(names(&form.trial_functions()), vec!["u"]);
    }

    #[test]
    fn test_apply_positional_order() {
        let space = FunctionSpace::vector("V", 2, 2);
        let p = FunctionSymbol::test(&space, "p");
        let q = FunctionSymbol::test(&space, "q");
        let u = FunctionSymbol::trial(&space, "u");
        let x = FunctionSymbol::test(&space, "x");
        let y = FunctionSymbol::test(&space, "y");
        // written q first, exposed p first
        let form = BilinearForm::new(
            q.component(0).unwrap() * u.expr() + p.expr() * u.component(1).unwrap(),
            Some(space.clone()),
            Some(space.clone()),
        )
        .unwrap();
        let applied = form.apply(vec![x.clone(), y.clone()], &u).unwrap();
        assert_eq!(
            *applied.expr(),
            y.component(0).unwrap() * u.expr() + x.expr() * u.component(1).unwrap()
        );
    }

    #[test]
    fn test_apply_errors() {
        let space = FunctionSpace::new("V", 2);
        let u = FunctionSymbol::trial(&space, "u");
        let v = FunctionSymbol::test(&space, "v");
        let other = FunctionSymbol::test(&space, "o");
        let form =
            BilinearForm::new(u.expr() * v.expr(), Some(space.clone()), Some(space)).unwrap();
        assert!(matches!(
            form.apply(vec![v.clone(), other.clone()], &u),
            Err(FormError::ArityMismatch(_))
        ));
        assert!(matches!(
            form.apply(&u, &u),
            Err(FormError::WrongArgumentType(_))
        ));
        assert!(matches!(
            form.apply(&v, Vec::<FunctionSymbol>::new()),
            Err(FormError::ArityMismatch(_))
        ));
    }

    #[test]
    fn test_rebind_by_name() {
        let space = FunctionSpace::new("V", 2);
        let u = FunctionSymbol::trial(&space, "u");
        let v = FunctionSymbol::test(&space, "v");
        let u1 = FunctionSymbol::trial(&space, "u1");
        let form =
            BilinearForm::new(u.expr() * v.expr(), Some(space.clone()), Some(space)).unwrap();
        let rebound = form.rebind(&[(u.clone(), u1.clone())]).unwrap();
        assert_eq!(*rebound.expr(), u1.expr() * v.expr());
        assert!(matches!(
            form.rebind(&[(u.clone(), v.clone())]),
            Err(FormError::WrongArgumentType(_))
        ));
    }

    #[test]
    fn test_addition() {
        let trial_space = FunctionSpace::new("V", 2);
        let test_space = FunctionSpace::new("W", 2);
        let u = FunctionSymbol::trial(&trial_space, "u").expr();
        let w = FunctionSymbol::test(&test_space, "w").expr();
        let stiffness = BilinearForm::new(
            inner(grad(u.clone()), grad(w.clone())),
            Some(trial_space.clone()),
            Some(test_space.clone()),
        )
        .unwrap();
        let mass = BilinearForm::new(
            u.clone() * w.clone(),
            Some(trial_space.clone()),
            Some(test_space.clone()),
        )
        .unwrap();
        let sum = (&stiffness + &mass).unwrap();
        assert_eq!(*sum.expr(), stiffness.expr().clone() + mass.expr().clone());
        assert_eq!(sum.trial_space(), Some(&trial_space));

        // same name and dimension, different space
        let lookalike = FunctionSpace::new("W", 2);
        let other = BilinearForm::new(
            u.clone() * w.clone(),
            Some(trial_space.clone()),
            Some(lookalike),
        )
        .unwrap();
        assert!(matches!(
            stiffness.try_add(&other),
            Err(FormError::SpaceMismatch(_))
        ));
    }

    #[test]
    fn test_display_and_weak_form() {
        let space = FunctionSpace::new("V", 2);
        let u = FunctionSymbol::trial(&space, "u").expr();
        let v = FunctionSymbol::test(&space, "v").expr();
        let form = BilinearForm::new(u.clone() * v.clone(), None, Some(space.clone())).unwrap();
        assert_eq!(form.to_string(), "(u * v)");
        assert_eq!(form.ldim(), Some(2));

        let linear = LinearForm::new(Expr::field("f") * v.clone(), Some(space));
        assert_eq!(names(&linear.test_functions()), vec!["v"]);
        assert_eq!(linear.fields(), vec!["f".to_string()]);

        let wrapped = WeakForm::from(linear.clone());
        assert_eq!(wrapped.to_string(), "(f * v)");
        assert_eq!(wrapped.clone().into_bilinear(), None);
        assert_eq!(wrapped.into_linear(), Some(linear));
        assert_eq!(WeakForm::from(&form).into_expr(), u * v);
    }

    #[test]
    fn test_arguments_conversion() {
        let space = FunctionSpace::new("V", 2);
        let v = FunctionSymbol::test(&space, "v");
        assert_eq!(Arguments::from(&v).into_vec(), vec![v.clone()]);
        let many: &[FunctionSymbol] = &[v.clone(), v.clone()];
        assert_eq!(Arguments::from(many).into_vec().len(), 2);
    }
}
