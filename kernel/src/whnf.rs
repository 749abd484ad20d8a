//! Weak-head normalization.
//!
//! Reduces only the outermost head: definitions unfold, beta and let
//! redexes fire, annotations and positions are stripped, a case whose
//! scrutinee reduces to a constructor picks its branch, and a `subst`
//! whose proof reduces to `Refl` disappears. Everything else is returned
//! unchanged. Lookups that can miss return `Option`s; no control flow
//! runs through errors.

use std::rc::Rc;

use crate::checker::{ErrorKind, Globals, TypeError};
use crate::syntax::{Branch, Pattern, Term, UNIT_DATACON};

/// Reduces a term to weak-head normal form.
pub fn whnf(globals: &Globals, t: &Rc<Term>) -> Result<Rc<Term>, TypeError> {
    match &**t {
        Term::Global(name) => match globals.definition(name) {
            Some(def) => whnf(globals, &def),
            None => Ok(t.clone()),
        },
        Term::App(f, a) => {
            let f = whnf(globals, f)?;
            match &*f {
                Term::Lam(b) => whnf(globals, &b.instantiate(a)),
                _ => Ok(Rc::new(Term::App(f, a.clone()))),
            }
        }
        Term::Ann(tm, _) => whnf(globals, tm),
        Term::Pos(_, tm) => whnf(globals, tm),
        Term::Let(rhs, b) => whnf(globals, &b.instantiate(rhs)),
        Term::Case(scrut, branches) => {
            let scrut = whnf(globals, scrut)?;
            if matches!(&*scrut, Term::DataCon(_, _)) {
                reduce_match(globals, &scrut, branches)
            } else {
                Ok(Rc::new(Term::Case(scrut, branches.clone())))
            }
        }
        Term::Subst(a, p) => {
            let p = whnf(globals, p)?;
            if matches!(&*p, Term::Refl) {
                whnf(globals, a)
            } else {
                Ok(Rc::new(Term::Subst(a.clone(), p)))
            }
        }
        Term::PrintMe => Ok(Term::datacon(UNIT_DATACON, vec![])),
        _ => Ok(t.clone()),
    }
}

/// Picks the first branch matching a constructor scrutinee and reduces its
/// instantiated body. The checker admits non-exhaustive matches, so a
/// constructor that no branch covers is an internal invariant violation.
fn reduce_match(
    globals: &Globals,
    scrut: &Rc<Term>,
    branches: &[Branch],
) -> Result<Rc<Term>, TypeError> {
    for branch in branches {
        if let Some(args) = pattern_matches(scrut, &branch.pat) {
            return whnf(globals, &branch.instantiate(&args));
        }
    }
    Err(ErrorKind::Internal("no case branch matches the scrutinee").into())
}

/// Matches a weak-head-normal scrutinee against a pattern. On success the
/// result holds one term per pattern variable, in binding order; its
/// length is the pattern's size.
pub fn pattern_matches(scrut: &Rc<Term>, pat: &Pattern) -> Option<Vec<Rc<Term>>> {
    match pat {
        Pattern::Var(_) => Some(vec![scrut.clone()]),
        Pattern::Con(name, pats) => match &**scrut {
            Term::DataCon(dc, args) if dc == name && args.len() == pats.len() => {
                let mut bound = Vec::with_capacity(pat.size());
                for (arg, sub_pat) in args.iter().zip(pats) {
                    bound.extend(pattern_matches(arg, sub_pat)?);
                }
                Some(bound)
            }
            _ => None,
        },
    }
}
