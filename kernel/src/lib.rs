//! The kernel of a small dependently typed functional language: a
//! bidirectional type checker over well-scoped de Bruijn syntax, with a
//! weak-head normalizer, a definitional-equality engine, a first-order
//! unifier producing refinements, and user-defined datatypes with
//! dependent pattern matching.
//!
//! The crate is a pure library: terms come in through [`syntax`], are
//! judged by [`checker`], and failures come back as
//! [`checker::TypeError`] values for the embedding driver to render.

pub mod checker;
pub mod subst;
pub mod syntax;
pub mod telescope;
pub mod unify;
pub mod whnf;

#[cfg(test)]
mod test_support;

pub use checker::{
    check, check_module, declare_pat, declare_pats, ensure_tycon, infer, tc_entry, Context,
    ErrorKind, Globals, TypeError,
};
pub use subst::Sub;
pub use syntax::{
    Bind, Branch, ConstructorDef, DataDef, Entry, Module, ModuleEntry, Pattern, SourcePos,
    Telescope, Term,
};
pub use telescope::{subst_tele, tc_arg_tele, tc_type_tele};
pub use unify::{alpha_eq, equate, unify, Refinement};
pub use whnf::{pattern_matches, whnf};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::term;

    fn nat_globals() -> Globals {
        let mut globals = Globals::new();
        globals
            .add_datatype(
                "Nat",
                DataDef::new(
                    Telescope::empty(),
                    vec![
                        ConstructorDef::new("Z", Telescope::empty()),
                        ConstructorDef::new(
                            "S",
                            Telescope::new(vec![Entry::decl("n", Term::tycon("Nat", vec![]))]),
                        ),
                    ],
                ),
            )
            .expect("Nat is accepted");
        globals
    }

    #[test]
    fn test_identity_function() {
        // id : (A : Type) -> A -> A ; id = \A. \x. x
        let ty = term("(pi A Type (pi x 0 1))");
        let id = term("(lam A (lam x 0))");
        let globals = Globals::new();
        check(&globals, &Context::new(), &id, &ty).expect("id checks");
    }

    #[test]
    fn test_annotated_identity_infers() {
        let id = term("(ann (lam A (lam x 0)) (pi A Type (pi x 0 1)))");
        let globals = Globals::new();
        let inferred = infer(&globals, &Context::new(), &id).expect("annotation infers");
        assert_eq!(inferred, term("(pi A Type (pi x 0 1))"));
    }

    #[test]
    fn test_unannotated_lambda_rejected() {
        let globals = Globals::new();
        let err = infer(&globals, &Context::new(), &term("(lam x 0)")).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingAnnotation(_)));
    }

    #[test]
    fn test_nat_constructors_check() {
        let globals = nat_globals();
        let ctx = Context::new();
        let one = term("(dcon S (dcon Z))");
        check(&globals, &ctx, &one, &term("(tycon Nat)")).expect("S Z : Nat");

        // a unique constructor of a parameterless datatype also infers
        let inferred = infer(&globals, &ctx, &one).expect("S Z infers");
        assert_eq!(inferred, term("(tycon Nat)"));
    }

    #[test]
    fn test_whnf_beta_reduction() {
        let globals = Globals::new();
        let t = term("(app (lam x 0) (dcon Z))");
        let nf = whnf(&globals, &t).expect("whnf");
        assert_eq!(nf, term("(dcon Z)"));
    }

    #[test]
    fn test_whnf_strips_annotations() {
        let globals = Globals::new();
        let t = term("(ann (dcon Z) (tycon Nat))");
        assert_eq!(whnf(&globals, &t).expect("whnf"), term("(dcon Z)"));
    }

    #[test]
    fn test_whnf_unfolds_definitions() {
        let mut globals = nat_globals();
        globals
            .add_def("two", term("(dcon S (dcon S (dcon Z)))"))
            .expect("two is accepted");
        let nf = whnf(&globals, &term("two")).expect("whnf");
        assert_eq!(nf, term("(dcon S (dcon S (dcon Z)))"));
    }

    #[test]
    fn test_whnf_case_picks_branch() {
        let globals = nat_globals();
        let t = term("(case (dcon S (dcon Z)) (arm (con Z) (dcon Z)) (arm (con S k) 0))");
        let nf = whnf(&globals, &t).expect("whnf");
        assert_eq!(nf, term("(dcon Z)"));
    }

    #[test]
    fn test_case_with_concrete_scrutinee_checks() {
        // the Z branch can never run; it must not make checking fail
        let globals = nat_globals();
        let t = term("(case (dcon S (dcon Z)) (arm (con Z) (dcon Z)) (arm (con S k) 0))");
        check(&globals, &Context::new(), &t, &term("(tycon Nat)")).expect("case checks");
    }

    #[test]
    fn test_case_on_variable_checks() {
        let globals = nat_globals();
        let pred = term("(lam n (case 0 (arm (con Z) (dcon Z)) (arm (con S k) 0)))");
        let ty = term("(pi n (tycon Nat) (tycon Nat))");
        check(&globals, &Context::new(), &pred, &ty).expect("pred checks");
    }

    #[test]
    fn test_refl_checks_equal_sides() {
        let globals = nat_globals();
        check(
            &globals,
            &Context::new(),
            &term("refl"),
            &term("(eq (tycon Nat) (tycon Nat))"),
        )
        .expect("refl : Nat = Nat");
    }

    #[test]
    fn test_refl_rejects_distinct_sides() {
        let globals = nat_globals();
        let err = check(
            &globals,
            &Context::new(),
            &term("refl"),
            &term("(eq (dcon Z) (dcon S (dcon Z)))"),
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Mismatch { .. }));
    }

    #[test]
    fn test_contra_on_distinct_constructors() {
        // absurd : (Z = S Z) -> Nat ; absurd = \p. contra p
        let globals = nat_globals();
        let ty = term("(pi p (eq (dcon Z) (dcon S (dcon Z))) (tycon Nat))");
        let absurd = term("(lam p (contra 0))");
        check(&globals, &Context::new(), &absurd, &ty).expect("contra checks");
    }

    #[test]
    fn test_subst_proves_symmetry() {
        // sym : (A : Type) -> (x : A) -> (y : A) -> (x = y) -> y = x
        let globals = Globals::new();
        let ty = term("(pi A Type (pi x 0 (pi y 1 (pi p (eq 1 0) (eq 1 2)))))");
        let sym = term("(lam A (lam x (lam y (lam p (subst refl 0)))))");
        check(&globals, &Context::new(), &sym, &ty).expect("sym checks");
    }

    #[test]
    fn test_trustme_checks_anywhere() {
        let globals = nat_globals();
        check(
            &globals,
            &Context::new(),
            &term("trustme"),
            &term("(eq (dcon Z) (dcon S (dcon Z)))"),
        )
        .expect("trustme is admitted");
    }

    #[test]
    fn test_printme_reports_goal() {
        let globals = nat_globals();
        let err = check(
            &globals,
            &Context::new(),
            &term("printme"),
            &term("(tycon Nat)"),
        )
        .unwrap_err();
        match err.kind {
            ErrorKind::UnmetObligation { goal, context } => {
                assert_eq!(goal, term("(tycon Nat)"));
                assert!(context.is_empty());
            }
            other => panic!("expected UnmetObligation, got {:?}", other),
        }
    }

    #[test]
    fn test_let_substitutes_eagerly() {
        let globals = nat_globals();
        let t = term("(let z (dcon Z) (dcon S 0))");
        check(&globals, &Context::new(), &t, &term("(tycon Nat)")).expect("let checks");
        assert_eq!(
            whnf(&globals, &t).expect("whnf"),
            term("(dcon S (dcon Z))")
        );
    }

    #[test]
    fn test_printme_reduces_to_unit() {
        let globals = Globals::new();
        let nf = whnf(&globals, &term("printme")).expect("whnf");
        assert_eq!(nf, Term::datacon(syntax::UNIT_DATACON, vec![]));
    }

    #[test]
    fn test_parser_shapes() {
        assert_eq!(term("0"), Term::var(0));
        assert_eq!(term("f"), Term::global("f"));
        assert_eq!(term("Type"), Term::ty());
        assert!(matches!(&*term("(pi x Type 0)"), Term::Pi(_, _)));
        assert!(matches!(&*term("(case 0 (arm x 0))"), Term::Case(_, _)));
    }
}
