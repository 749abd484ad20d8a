//! The telescope engine: well-formedness of telescopes, checking argument
//! lists against them, and instantiating a constructor telescope with its
//! datatype's parameters.

use std::rc::Rc;

use crate::checker::{check, Context, ErrorKind, Globals, TypeError};
use crate::subst::Sub;
use crate::syntax::{Entry, Telescope, Term};
use crate::unify::equate;

/// Checks that a telescope is well formed under `ctx`: every declared type
/// is a type, every equation's right side has the equated variable's type.
/// Returns the context extended with the declarations.
pub fn tc_type_tele(
    globals: &Globals,
    tele: &Telescope,
    ctx: &Context,
) -> Result<Context, TypeError> {
    let mut ctx = ctx.clone();
    for entry in &tele.entries {
        match entry {
            Entry::Decl(_, ty) => {
                check(globals, &ctx, ty, &Term::ty())?;
                ctx = ctx.push(ty.clone());
            }
            Entry::Def(lhs, rhs) => {
                let Term::Var(idx) = &**lhs else {
                    return Err(
                        ErrorKind::Internal("telescope equation with non-variable left side").into(),
                    );
                };
                let ty = ctx
                    .get(*idx)
                    .ok_or_else(|| TypeError::from(ErrorKind::UnknownVariable(*idx)))?;
                check(globals, &ctx, rhs, &ty)?;
            }
        }
    }
    Ok(ctx)
}

/// Checks an argument list against a telescope. Each declared entry
/// consumes one argument, which is checked and substituted through the
/// tail; each equation must hold, by `equate`, under the arguments
/// consumed so far. Returns the checked arguments.
pub fn tc_arg_tele(
    globals: &Globals,
    args: &[Rc<Term>],
    tele: &Telescope,
    ctx: &Context,
    what: &'static str,
) -> Result<Vec<Rc<Term>>, TypeError> {
    let expected = tele.decl_count();
    if args.len() != expected {
        return Err(ErrorKind::ArityMismatch {
            what,
            expected,
            got: args.len(),
        }
        .into());
    }
    let mut checked = Vec::with_capacity(args.len());
    tc_arg_entries(globals, args, &tele.entries, ctx, &mut checked)?;
    Ok(checked)
}

fn tc_arg_entries(
    globals: &Globals,
    args: &[Rc<Term>],
    entries: &[Entry],
    ctx: &Context,
    checked: &mut Vec<Rc<Term>>,
) -> Result<(), TypeError> {
    match entries.split_first() {
        None => {
            debug_assert!(args.is_empty());
            Ok(())
        }
        Some((Entry::Decl(_, ty), rest)) => {
            let (arg, args_rest) = args.split_first().expect("arity checked by caller");
            check(globals, ctx, arg, ty)?;
            let rest = subst_entries(rest, &Sub::single(arg.clone()));
            checked.push(arg.clone());
            tc_arg_entries(globals, args_rest, &rest, ctx, checked)
        }
        Some((Entry::Def(lhs, rhs), rest)) => {
            equate(globals, lhs, rhs)?;
            tc_arg_entries(globals, args, rest, ctx, checked)
        }
    }
}

/// Propagates a substitution through telescope entries, lifting it under
/// each declaration.
pub fn subst_entries(entries: &[Entry], sub: &Sub) -> Vec<Entry> {
    let mut sub = sub.clone();
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Decl(name, ty) => {
                out.push(Entry::Decl(name.clone(), sub.apply(ty)));
                sub = sub.lift();
            }
            Entry::Def(lhs, rhs) => out.push(Entry::Def(sub.apply(lhs), sub.apply(rhs))),
        }
    }
    out
}

/// Instantiates a constructor telescope with its datatype's parameters,
/// reversed to match de Bruijn order, producing it in the caller's scope.
pub fn subst_tele(params: &[Rc<Term>], theta: &Telescope) -> Telescope {
    Telescope::new(subst_entries(&theta.entries, &Sub::bindings(params)))
}
