//! De Bruijn index manipulation: shifting, strengthening, occurrence
//! checks, and simultaneous substitutions.
//!
//! Scope sizes are ordinary `usize`s carried by contexts and checked with
//! debug assertions; there is no type-level scope tracking.

use std::rc::Rc;

use crate::syntax::{Bind, Branch, Term};

impl Term {
    /// Shifts free indices at or above `cutoff` up by `amount`.
    pub fn shift(&self, cutoff: usize, amount: usize) -> Rc<Term> {
        if amount == 0 {
            return Rc::new(self.clone());
        }
        match self {
            Term::Var(i) => {
                if *i < cutoff {
                    Term::var(*i)
                } else {
                    Term::var(i + amount)
                }
            }
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => {
                Rc::new(self.clone())
            }
            Term::Pi(dom, b) => Rc::new(Term::Pi(
                dom.shift(cutoff, amount),
                shift_bind(b, cutoff, amount),
            )),
            Term::Lam(b) => Rc::new(Term::Lam(shift_bind(b, cutoff, amount))),
            Term::App(f, a) => Rc::new(Term::App(f.shift(cutoff, amount), a.shift(cutoff, amount))),
            Term::Ann(t, ty) => Rc::new(Term::Ann(t.shift(cutoff, amount), ty.shift(cutoff, amount))),
            Term::Pos(p, t) => Rc::new(Term::Pos(*p, t.shift(cutoff, amount))),
            Term::Let(rhs, b) => Rc::new(Term::Let(
                rhs.shift(cutoff, amount),
                shift_bind(b, cutoff, amount),
            )),
            Term::TyCon(n, args) => Rc::new(Term::TyCon(
                n.clone(),
                args.iter().map(|a| a.shift(cutoff, amount)).collect(),
            )),
            Term::DataCon(n, args) => Rc::new(Term::DataCon(
                n.clone(),
                args.iter().map(|a| a.shift(cutoff, amount)).collect(),
            )),
            Term::Case(s, branches) => Rc::new(Term::Case(
                s.shift(cutoff, amount),
                branches
                    .iter()
                    .map(|br| Branch {
                        pat: br.pat.clone(),
                        body: br.body.shift(cutoff + br.pat.size(), amount),
                    })
                    .collect(),
            )),
            Term::TyEq(a, b) => Rc::new(Term::TyEq(a.shift(cutoff, amount), b.shift(cutoff, amount))),
            Term::Subst(a, p) => {
                Rc::new(Term::Subst(a.shift(cutoff, amount), p.shift(cutoff, amount)))
            }
            Term::Contra(p) => Rc::new(Term::Contra(p.shift(cutoff, amount))),
        }
    }

    /// The partial inverse of [`Term::shift`]: moves free indices at or
    /// above `cutoff + amount` down by `amount`. Returns `None` if any
    /// index in `cutoff .. cutoff + amount` occurs, i.e. the term actually
    /// uses a variable it must strengthen out of.
    pub fn strengthen(&self, cutoff: usize, amount: usize) -> Option<Rc<Term>> {
        if amount == 0 {
            return Some(Rc::new(self.clone()));
        }
        match self {
            Term::Var(i) => {
                if *i < cutoff {
                    Some(Term::var(*i))
                } else if *i < cutoff + amount {
                    None
                } else {
                    Some(Term::var(i - amount))
                }
            }
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => {
                Some(Rc::new(self.clone()))
            }
            Term::Pi(dom, b) => Some(Rc::new(Term::Pi(
                dom.strengthen(cutoff, amount)?,
                strengthen_bind(b, cutoff, amount)?,
            ))),
            Term::Lam(b) => Some(Rc::new(Term::Lam(strengthen_bind(b, cutoff, amount)?))),
            Term::App(f, a) => Some(Rc::new(Term::App(
                f.strengthen(cutoff, amount)?,
                a.strengthen(cutoff, amount)?,
            ))),
            Term::Ann(t, ty) => Some(Rc::new(Term::Ann(
                t.strengthen(cutoff, amount)?,
                ty.strengthen(cutoff, amount)?,
            ))),
            Term::Pos(p, t) => Some(Rc::new(Term::Pos(*p, t.strengthen(cutoff, amount)?))),
            Term::Let(rhs, b) => Some(Rc::new(Term::Let(
                rhs.strengthen(cutoff, amount)?,
                strengthen_bind(b, cutoff, amount)?,
            ))),
            Term::TyCon(n, args) => Some(Rc::new(Term::TyCon(
                n.clone(),
                args.iter()
                    .map(|a| a.strengthen(cutoff, amount))
                    .collect::<Option<Vec<_>>>()?,
            ))),
            Term::DataCon(n, args) => Some(Rc::new(Term::DataCon(
                n.clone(),
                args.iter()
                    .map(|a| a.strengthen(cutoff, amount))
                    .collect::<Option<Vec<_>>>()?,
            ))),
            Term::Case(s, branches) => Some(Rc::new(Term::Case(
                s.strengthen(cutoff, amount)?,
                branches
                    .iter()
                    .map(|br| {
                        Some(Branch {
                            pat: br.pat.clone(),
                            body: br.body.strengthen(cutoff + br.pat.size(), amount)?,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?,
            ))),
            Term::TyEq(a, b) => Some(Rc::new(Term::TyEq(
                a.strengthen(cutoff, amount)?,
                b.strengthen(cutoff, amount)?,
            ))),
            Term::Subst(a, p) => Some(Rc::new(Term::Subst(
                a.strengthen(cutoff, amount)?,
                p.strengthen(cutoff, amount)?,
            ))),
            Term::Contra(p) => Some(Rc::new(Term::Contra(p.strengthen(cutoff, amount)?))),
        }
    }

    /// Whether the free variable `idx` occurs in the term.
    pub fn occurs_free(&self, idx: usize) -> bool {
        match self {
            Term::Var(i) => *i == idx,
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => false,
            Term::Pi(dom, b) => dom.occurs_free(idx) || b.body.occurs_free(idx + 1),
            Term::Lam(b) => b.body.occurs_free(idx + 1),
            Term::App(f, a) => f.occurs_free(idx) || a.occurs_free(idx),
            Term::Ann(t, ty) => t.occurs_free(idx) || ty.occurs_free(idx),
            Term::Pos(_, t) => t.occurs_free(idx),
            Term::Let(rhs, b) => rhs.occurs_free(idx) || b.body.occurs_free(idx + 1),
            Term::TyCon(_, args) | Term::DataCon(_, args) => {
                args.iter().any(|a| a.occurs_free(idx))
            }
            Term::Case(s, branches) => {
                s.occurs_free(idx)
                    || branches
                        .iter()
                        .any(|br| br.body.occurs_free(idx + br.pat.size()))
            }
            Term::TyEq(a, b) => a.occurs_free(idx) || b.occurs_free(idx),
            Term::Subst(a, p) => a.occurs_free(idx) || p.occurs_free(idx),
            Term::Contra(p) => p.occurs_free(idx),
        }
    }

    /// Whether every free index is below `n`. Used by debug assertions.
    pub fn is_scoped(&self, n: usize) -> bool {
        match self {
            Term::Var(i) => *i < n,
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => true,
            Term::Pi(dom, b) => dom.is_scoped(n) && b.body.is_scoped(n + 1),
            Term::Lam(b) => b.body.is_scoped(n + 1),
            Term::App(f, a) => f.is_scoped(n) && a.is_scoped(n),
            Term::Ann(t, ty) => t.is_scoped(n) && ty.is_scoped(n),
            Term::Pos(_, t) => t.is_scoped(n),
            Term::Let(rhs, b) => rhs.is_scoped(n) && b.body.is_scoped(n + 1),
            Term::TyCon(_, args) | Term::DataCon(_, args) => args.iter().all(|a| a.is_scoped(n)),
            Term::Case(s, branches) => {
                s.is_scoped(n)
                    && branches
                        .iter()
                        .all(|br| br.body.is_scoped(n + br.pat.size()))
            }
            Term::TyEq(a, b) => a.is_scoped(n) && b.is_scoped(n),
            Term::Subst(a, p) => a.is_scoped(n) && p.is_scoped(n),
            Term::Contra(p) => p.is_scoped(n),
        }
    }
}

fn shift_bind(b: &Bind, cutoff: usize, amount: usize) -> Bind {
    Bind {
        name: b.name.clone(),
        body: b.body.shift(cutoff + 1, amount),
    }
}

fn strengthen_bind(b: &Bind, cutoff: usize, amount: usize) -> Option<Bind> {
    Some(Bind {
        name: b.name.clone(),
        body: b.body.strengthen(cutoff + 1, amount)?,
    })
}

/// A simultaneous substitution. Variable `i` maps to `terms[i]` when
/// `i < terms.len()` and to `Var(i - terms.len() + shift)` otherwise.
#[derive(Debug, Clone)]
pub struct Sub {
    terms: Vec<Rc<Term>>,
    shift: usize,
}

impl Sub {
    /// The identity substitution.
    pub fn id() -> Self {
        Sub {
            terms: Vec::new(),
            shift: 0,
        }
    }

    /// Instantiates the innermost binder with `t`.
    pub fn single(t: Rc<Term>) -> Self {
        Sub {
            terms: vec![t],
            shift: 0,
        }
    }

    /// Instantiates the innermost binder with `t` while weakening the rest
    /// of the scope by `weaken`. Used when one declared variable is
    /// replaced by a pattern binding `weaken` fresh variables.
    pub fn single_shifted(t: Rc<Term>, weaken: usize) -> Self {
        Sub {
            terms: vec![t],
            shift: weaken,
        }
    }

    /// Instantiates a block of binders with `args`, given first-bound
    /// first. Reversed internally so that index 0 picks the innermost
    /// (last-bound) binding; telescope parameters use the same order.
    pub fn bindings(args: &[Rc<Term>]) -> Self {
        Sub {
            terms: args.iter().rev().cloned().collect(),
            shift: 0,
        }
    }

    /// Pushes the substitution under one binder.
    pub fn lift(&self) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + 1);
        terms.push(Term::var(0));
        terms.extend(self.terms.iter().map(|t| t.shift(0, 1)));
        Sub {
            terms,
            shift: self.shift + 1,
        }
    }

    pub fn lift_by(&self, k: usize) -> Self {
        let mut sub = self.clone();
        for _ in 0..k {
            sub = sub.lift();
        }
        sub
    }

    fn lookup(&self, i: usize) -> Rc<Term> {
        match self.terms.get(i) {
            Some(t) => t.clone(),
            None => Term::var(i - self.terms.len() + self.shift),
        }
    }

    /// Applies the substitution to every free variable of the term.
    pub fn apply(&self, t: &Term) -> Rc<Term> {
        match t {
            Term::Var(i) => self.lookup(*i),
            Term::Global(_) | Term::Type | Term::Refl | Term::TrustMe | Term::PrintMe => {
                Rc::new(t.clone())
            }
            Term::Pi(dom, b) => Rc::new(Term::Pi(self.apply(dom), self.apply_bind(b))),
            Term::Lam(b) => Rc::new(Term::Lam(self.apply_bind(b))),
            Term::App(f, a) => Rc::new(Term::App(self.apply(f), self.apply(a))),
            Term::Ann(tm, ty) => Rc::new(Term::Ann(self.apply(tm), self.apply(ty))),
            Term::Pos(p, tm) => Rc::new(Term::Pos(*p, self.apply(tm))),
            Term::Let(rhs, b) => Rc::new(Term::Let(self.apply(rhs), self.apply_bind(b))),
            Term::TyCon(n, args) => Rc::new(Term::TyCon(
                n.clone(),
                args.iter().map(|a| self.apply(a)).collect(),
            )),
            Term::DataCon(n, args) => Rc::new(Term::DataCon(
                n.clone(),
                args.iter().map(|a| self.apply(a)).collect(),
            )),
            Term::Case(s, branches) => Rc::new(Term::Case(
                self.apply(s),
                branches
                    .iter()
                    .map(|br| Branch {
                        pat: br.pat.clone(),
                        body: self.lift_by(br.pat.size()).apply(&br.body),
                    })
                    .collect(),
            )),
            Term::TyEq(a, b) => Rc::new(Term::TyEq(self.apply(a), self.apply(b))),
            Term::Subst(a, p) => Rc::new(Term::Subst(self.apply(a), self.apply(p))),
            Term::Contra(p) => Rc::new(Term::Contra(self.apply(p))),
        }
    }

    fn apply_bind(&self, b: &Bind) -> Bind {
        Bind {
            name: b.name.clone(),
            body: self.lift().apply(&b.body),
        }
    }
}

impl Bind {
    /// Opens the binder with `arg` in place of the bound variable.
    pub fn instantiate(&self, arg: &Rc<Term>) -> Rc<Term> {
        Sub::single(arg.clone()).apply(&self.body)
    }
}

impl Branch {
    /// Opens the branch body with the bindings a successful pattern match
    /// produced, given first-bound first.
    pub fn instantiate(&self, args: &[Rc<Term>]) -> Rc<Term> {
        debug_assert_eq!(args.len(), self.pat.size());
        Sub::bindings(args).apply(&self.body)
    }
}
