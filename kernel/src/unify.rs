//! First-order unification and definitional equality.
//!
//! The unifier produces a [`Refinement`]: an idempotent partial map from
//! variables to terms that makes two terms alpha-equal after whnf.
//! Equality ([`equate`]) is the simpler judgment: alpha-equivalence up to
//! weak-head reduction, with no refinement produced.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::checker::{ErrorKind, Globals, TypeError};
use crate::syntax::{Bind, Branch, Term};
use crate::whnf::whnf;

/// Alpha-equivalence. Binder names are already ignored by the term
/// equality, so this is the derived comparison under its proper name.
pub fn alpha_eq(a: &Term, b: &Term) -> bool {
    a == b
}

/// An idempotent partial map from variables to terms.
///
/// Invariants: a mapped variable never occurs free in its own target, and
/// every target is normal with respect to the other entries. `join`
/// preserves both or fails; it never produces a partial map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refinement {
    map: BTreeMap<usize, Rc<Term>>,
}

impl Refinement {
    pub fn new() -> Self {
        Refinement::default()
    }

    pub fn singleton(var: usize, t: Rc<Term>) -> Self {
        debug_assert!(!t.occurs_free(var));
        let mut map = BTreeMap::new();
        map.insert(var, t);
        Refinement { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, var: usize) -> Option<&Rc<Term>> {
        self.map.get(&var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Rc<Term>)> + '_ {
        self.map.iter().map(|(v, t)| (*v, t))
    }

    /// Replaces every mapped free variable in `t` by its target. Targets
    /// are weakened when the replacement happens under binders.
    pub fn apply(&self, t: &Rc<Term>) -> Rc<Term> {
        if self.map.is_empty() {
            return t.clone();
        }
        self.apply_at(t, 0)
    }

    fn apply_at(&self, t: &Rc<Term>, depth: usize) -> Rc<Term> {
        match &**t {
            Term::Var(i) => {
                if *i >= depth {
                    match self.map.get(&(i - depth)) {
                        Some(target) => target.shift(0, depth),
                        None => t.clone(),
                    }
                } else {
                    t.clone()
                }
            }
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => t.clone(),
            Term::Pi(dom, b) => Rc::new(Term::Pi(
                self.apply_at(dom, depth),
                self.apply_bind(b, depth),
            )),
            Term::Lam(b) => Rc::new(Term::Lam(self.apply_bind(b, depth))),
            Term::App(f, a) => Rc::new(Term::App(
                self.apply_at(f, depth),
                self.apply_at(a, depth),
            )),
            Term::Ann(tm, ty) => Rc::new(Term::Ann(
                self.apply_at(tm, depth),
                self.apply_at(ty, depth),
            )),
            Term::Pos(p, tm) => Rc::new(Term::Pos(*p, self.apply_at(tm, depth))),
            Term::Let(rhs, b) => Rc::new(Term::Let(
                self.apply_at(rhs, depth),
                self.apply_bind(b, depth),
            )),
            Term::TyCon(n, args) => Rc::new(Term::TyCon(
                n.clone(),
                args.iter().map(|a| self.apply_at(a, depth)).collect(),
            )),
            Term::DataCon(n, args) => Rc::new(Term::DataCon(
                n.clone(),
                args.iter().map(|a| self.apply_at(a, depth)).collect(),
            )),
            Term::Case(s, branches) => Rc::new(Term::Case(
                self.apply_at(s, depth),
                branches
                    .iter()
                    .map(|br| Branch {
                        pat: br.pat.clone(),
                        body: self.apply_at(&br.body, depth + br.pat.size()),
                    })
                    .collect(),
            )),
            Term::TyEq(a, b) => Rc::new(Term::TyEq(
                self.apply_at(a, depth),
                self.apply_at(b, depth),
            )),
            Term::Subst(a, p) => Rc::new(Term::Subst(
                self.apply_at(a, depth),
                self.apply_at(p, depth),
            )),
            Term::Contra(p) => Rc::new(Term::Contra(self.apply_at(p, depth))),
        }
    }

    fn apply_bind(&self, b: &Bind, depth: usize) -> Bind {
        Bind {
            name: b.name.clone(),
            body: self.apply_at(&b.body, depth + 1),
        }
    }

    /// Adds one entry, keeping the map idempotent: the target is first
    /// normalized against the existing entries, the occurs check runs on
    /// the result, and existing targets are rewritten with the new entry.
    fn insert(&mut self, var: usize, target: Rc<Term>) -> Result<(), TypeError> {
        let target = self.apply(&target);
        if let Some(existing) = self.map.get(&var) {
            if alpha_eq(existing, &target) {
                return Ok(());
            }
            return Err(ErrorKind::IncompatibleRefinement {
                var,
                left: existing.clone(),
                right: target,
            }
            .into());
        }
        if let Term::Var(w) = &*target {
            if *w == var {
                return Ok(());
            }
        }
        if target.occurs_free(var) {
            return Err(ErrorKind::IncompatibleRefinement {
                var,
                left: Term::var(var),
                right: target,
            }
            .into());
        }
        let entry = Refinement::singleton(var, target.clone());
        for existing in self.map.values_mut() {
            *existing = entry.apply(existing);
        }
        self.map.insert(var, target);
        Ok(())
    }

    /// Unifies two refinements into one. Fails with
    /// `IncompatibleRefinement` if the union would be contradictory or
    /// cyclic.
    pub fn join(&self, other: &Refinement) -> Result<Refinement, TypeError> {
        let mut out = self.clone();
        for (var, target) in &other.map {
            out.insert(*var, target.clone())?;
        }
        Ok(out)
    }
}

/// A neutral elimination whose reduction could still change under a
/// future substitution. The unifier refuses to commit on these.
fn ambiguous(t: &Term) -> bool {
    matches!(t, Term::App(_, _) | Term::Case(_, _) | Term::Subst(_, _))
}

/// Tries to solve `Var(var) ~ t`. Both must strengthen out of the `depth`
/// binders entered since the unifier was called, and the variable must
/// not occur in the target.
fn solve(var: usize, t: &Rc<Term>, depth: usize) -> Option<Refinement> {
    if var < depth {
        return None;
    }
    let target = t.strengthen(0, depth)?;
    let var = var - depth;
    if target.occurs_free(var) {
        return None;
    }
    Some(Refinement::singleton(var, target))
}

/// Produces a refinement equating `x` and `y` up to whnf, or fails with a
/// `Mismatch`. An unsolvable variable or an ambiguous neutral yields the
/// empty refinement rather than a failure.
pub fn unify(
    globals: &Globals,
    depth: usize,
    x: &Rc<Term>,
    y: &Rc<Term>,
) -> Result<Refinement, TypeError> {
    let x = whnf(globals, x)?;
    let y = whnf(globals, y)?;
    if alpha_eq(&x, &y) {
        return Ok(Refinement::new());
    }
    match (&*x, &*y) {
        (Term::Var(i), _) => {
            if let Some(r) = solve(*i, &y, depth) {
                return Ok(r);
            }
            if let Term::Var(j) = &*y {
                if let Some(r) = solve(*j, &x, depth) {
                    return Ok(r);
                }
            }
            Ok(Refinement::new())
        }
        (_, Term::Var(j)) => Ok(solve(*j, &x, depth).unwrap_or_default()),
        (Term::DataCon(c1, args1), Term::DataCon(c2, args2))
            if c1 == c2 && args1.len() == args2.len() =>
        {
            unify_args(globals, depth, args1, args2)
        }
        (Term::TyCon(c1, args1), Term::TyCon(c2, args2))
            if c1 == c2 && args1.len() == args2.len() =>
        {
            unify_args(globals, depth, args1, args2)
        }
        (Term::Lam(b1), Term::Lam(b2)) => unify(globals, depth + 1, &b1.body, &b2.body),
        (Term::Pi(d1, b1), Term::Pi(d2, b2)) => {
            let doms = unify(globals, depth, d1, d2)?;
            let bodies = unify(globals, depth + 1, &b1.body, &b2.body)?;
            doms.join(&bodies)
        }
        (Term::TyEq(l1, r1), Term::TyEq(l2, r2)) => {
            let lefts = unify(globals, depth, l1, l2)?;
            let rights = unify(globals, depth, r1, r2)?;
            lefts.join(&rights)
        }
        _ if ambiguous(&x) || ambiguous(&y) => Ok(Refinement::new()),
        _ => Err(ErrorKind::Mismatch {
            expected: x.clone(),
            found: y.clone(),
        }
        .into()),
    }
}

fn unify_args(
    globals: &Globals,
    depth: usize,
    args1: &[Rc<Term>],
    args2: &[Rc<Term>],
) -> Result<Refinement, TypeError> {
    let mut out = Refinement::new();
    for (a1, a2) in args1.iter().zip(args2) {
        let r = unify(globals, depth, a1, a2)?;
        out = out.join(&r)?;
    }
    Ok(out)
}

/// Definitional equality: succeeds iff the weak-head normal forms of the
/// two terms are structurally alpha-equal, recursing through subterms.
/// Neutral terms are compared structurally, never up to unfolding, and
/// case branches are compared in order only.
pub fn equate(globals: &Globals, a: &Rc<Term>, b: &Rc<Term>) -> Result<(), TypeError> {
    if alpha_eq(a, b) {
        return Ok(());
    }
    let a = whnf(globals, a)?;
    let b = whnf(globals, b)?;
    match (&*a, &*b) {
        (Term::Var(i), Term::Var(j)) if i == j => Ok(()),
        (Term::Global(x), Term::Global(y)) if x == y => Ok(()),
        (Term::Type, Term::Type) | (Term::Refl, Term::Refl) | (Term::TrustMe, Term::TrustMe) => {
            Ok(())
        }
        (Term::Lam(b1), Term::Lam(b2)) => equate(globals, &b1.body, &b2.body),
        (Term::Pi(d1, b1), Term::Pi(d2, b2)) => {
            equate(globals, d1, d2)?;
            equate(globals, &b1.body, &b2.body)
        }
        (Term::App(f1, a1), Term::App(f2, a2)) => {
            equate(globals, f1, f2)?;
            equate(globals, a1, a2)
        }
        (Term::TyCon(c1, args1), Term::TyCon(c2, args2))
            if c1 == c2 && args1.len() == args2.len() =>
        {
            equate_args(globals, args1, args2)
        }
        (Term::DataCon(c1, args1), Term::DataCon(c2, args2))
            if c1 == c2 && args1.len() == args2.len() =>
        {
            equate_args(globals, args1, args2)
        }
        (Term::TyEq(l1, r1), Term::TyEq(l2, r2)) => {
            equate(globals, l1, l2)?;
            equate(globals, r1, r2)
        }
        (Term::Subst(t1, p1), Term::Subst(t2, p2)) => {
            equate(globals, t1, t2)?;
            equate(globals, p1, p2)
        }
        (Term::Contra(p1), Term::Contra(p2)) => equate(globals, p1, p2),
        (Term::Case(s1, br1), Term::Case(s2, br2)) if br1.len() == br2.len() => {
            equate(globals, s1, s2)?;
            for (b1, b2) in br1.iter().zip(br2) {
                if b1.pat != b2.pat {
                    return Err(ErrorKind::Mismatch {
                        expected: a.clone(),
                        found: b.clone(),
                    }
                    .into());
                }
                equate(globals, &b1.body, &b2.body)?;
            }
            Ok(())
        }
        _ => Err(ErrorKind::Mismatch {
            expected: a.clone(),
            found: b.clone(),
        }
        .into()),
    }
}

fn equate_args(globals: &Globals, args1: &[Rc<Term>], args2: &[Rc<Term>]) -> Result<(), TypeError> {
    for (a1, a2) in args1.iter().zip(args2) {
        equate(globals, a1, a2)?;
    }
    Ok(())
}
