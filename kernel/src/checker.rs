//! The bidirectional checker: local contexts, the global signature, the
//! `infer`/`check` judgments, pattern elaboration, and the top-level
//! module entry checker.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::syntax::{
    ConstructorDef, DataDef, Entry, Module, ModuleEntry, Pattern, SourcePos, Telescope, Term,
};
use crate::telescope::{subst_tele, tc_arg_tele, tc_type_tele};
use crate::unify::{equate, unify, Refinement};
use crate::whnf::whnf;

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("types do not match: expected {expected:?}, found {found:?}")]
    Mismatch {
        expected: Rc<Term>,
        found: Rc<Term>,
    },
    #[error("expected a function type, found {0:?}")]
    NotAFunction(Rc<Term>),
    #[error("expected an equality type, found {0:?}")]
    NotAnEquality(Rc<Term>),
    #[error("expected a datatype, found {0:?}")]
    NotADatatype(Rc<Term>),
    #[error("wrong number of {what}s: expected {expected}, got {got}")]
    ArityMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("data constructor {0} appears in more than one datatype; annotate its type")]
    AmbiguousConstructor(String),
    #[error("cannot infer a type for {0:?}; an annotation is required")]
    MissingAnnotation(Rc<Term>),
    #[error("duplicate binding for {0}")]
    DuplicateBinding(String),
    #[error("duplicate constructor {0}")]
    DuplicateConstructor(String),
    #[error("equation between {left:?} and {right:?} is not contradictory")]
    NotContradictory {
        left: Rc<Term>,
        right: Rc<Term>,
    },
    #[error("variable {var} cannot be refined to both {left:?} and {right:?}")]
    IncompatibleRefinement {
        var: usize,
        left: Rc<Term>,
        right: Rc<Term>,
    },
    #[error("unmet obligation: goal {goal:?} under {} context entries", .context.len())]
    UnmetObligation {
        context: Vec<Rc<Term>>,
        goal: Rc<Term>,
    },
    #[error("pattern takes the wrong number of arguments: expected {expected}, got {got}")]
    PatternArity { expected: usize, got: usize },
    #[error("unknown variable index {0}")]
    UnknownVariable(usize),
    #[error("unknown global {0}")]
    UnknownGlobal(String),
    #[error("unknown datatype {0}")]
    UnknownDatatype(String),
    #[error("unknown data constructor {0}")]
    UnknownConstructor(String),
    #[error("data constructor {name} does not belong to datatype {tycon}")]
    NotAConstructorOf { name: String, tycon: String },
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

impl ErrorKind {
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            ErrorKind::Mismatch { .. } => "K0001",
            ErrorKind::NotAFunction(_) => "K0002",
            ErrorKind::NotAnEquality(_) => "K0003",
            ErrorKind::NotADatatype(_) => "K0004",
            ErrorKind::ArityMismatch { .. } => "K0005",
            ErrorKind::AmbiguousConstructor(_) => "K0006",
            ErrorKind::MissingAnnotation(_) => "K0007",
            ErrorKind::DuplicateBinding(_) => "K0008",
            ErrorKind::DuplicateConstructor(_) => "K0009",
            ErrorKind::NotContradictory { .. } => "K0010",
            ErrorKind::IncompatibleRefinement { .. } => "K0011",
            ErrorKind::UnmetObligation { .. } => "K0012",
            ErrorKind::PatternArity { .. } => "K0013",
            ErrorKind::UnknownVariable(_) => "K0014",
            ErrorKind::UnknownGlobal(_) => "K0015",
            ErrorKind::UnknownDatatype(_) => "K0016",
            ErrorKind::UnknownConstructor(_) => "K0017",
            ErrorKind::NotAConstructorOf { .. } => "K0018",
            ErrorKind::Internal(_) => "K0019",
        }
    }
}

/// A checking failure: the error kind plus whatever source position and
/// enclosing declaration were known when it propagated out. Positions come
/// from `Pos` wrappers passed on the way down; the declaration name is
/// attached by the module driver.
#[derive(Debug)]
pub struct TypeError {
    pub pos: Option<SourcePos>,
    pub decl: Option<String>,
    pub kind: ErrorKind,
}

impl TypeError {
    pub fn with_pos(mut self, pos: SourcePos) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }

    pub fn with_decl(mut self, name: &str) -> Self {
        if self.decl.is_none() {
            self.decl = Some(name.to_string());
        }
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.diagnostic_code()
    }
}

impl From<ErrorKind> for TypeError {
    fn from(kind: ErrorKind) -> Self {
        TypeError {
            pos: None,
            decl: None,
            kind,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(decl) = &self.decl {
            write!(f, "in {}: ", decl)?;
        }
        if let Some(pos) = &self.pos {
            write!(f, "{}:{}: ", pos.line, pos.col)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// The local typing context. Entry types are stored already weakened to
/// the current scope, so extending shifts every existing entry.
#[derive(Debug, Clone, Default)]
pub struct Context {
    types: Vec<Rc<Term>>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn push(&self, ty: Rc<Term>) -> Context {
        let mut types: Vec<Rc<Term>> = self.types.iter().map(|t| t.shift(0, 1)).collect();
        types.push(ty.shift(0, 1));
        Context { types }
    }

    /// De Bruijn lookup: index 0 is the most recently pushed entry.
    pub fn get(&self, idx: usize) -> Option<Rc<Term>> {
        if idx < self.types.len() {
            Some(self.types[self.types.len() - 1 - idx].clone())
        } else {
            None
        }
    }

    /// All entry types, outermost first, in the current scope.
    pub fn entries(&self) -> &[Rc<Term>] {
        &self.types
    }

    pub fn apply_refinement(&self, r: &Refinement) -> Context {
        Context {
            types: self.types.iter().map(|t| r.apply(t)).collect(),
        }
    }
}

/// The global signature: declared types and definitions of top-level
/// names, datatype definitions, an index from data constructor names to
/// the datatypes declaring them, and pending type hints from declarations
/// whose definition has not arrived yet.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    decls: HashMap<String, Rc<Term>>,
    defs: HashMap<String, Rc<Term>>,
    datatypes: HashMap<String, DataDef>,
    constructor_index: BTreeMap<String, Vec<String>>,
    hints: HashMap<String, Rc<Term>>,
    allow_redefinition: bool,
}

impl Globals {
    pub fn new() -> Self {
        Globals::default()
    }

    /// Lets an interactive driver overwrite existing entries instead of
    /// receiving `DuplicateBinding`.
    pub fn set_allow_redefinition(&mut self, allow: bool) {
        self.allow_redefinition = allow;
    }

    pub fn allows_redefinition(&self) -> bool {
        self.allow_redefinition
    }

    pub fn decl_type(&self, name: &str) -> Option<Rc<Term>> {
        self.decls.get(name).cloned()
    }

    pub fn definition(&self, name: &str) -> Option<Rc<Term>> {
        self.defs.get(name).cloned()
    }

    pub fn datatype(&self, name: &str) -> Option<&DataDef> {
        self.datatypes.get(name)
    }

    pub fn hint(&self, name: &str) -> Option<Rc<Term>> {
        self.hints.get(name).cloned()
    }

    /// The constructor's argument telescope paired with its datatype's
    /// parameter telescope.
    pub fn scoped_constructor(
        &self,
        dcon: &str,
        tycon: &str,
    ) -> Option<(&Telescope, &ConstructorDef)> {
        let def = self.datatypes.get(tycon)?;
        let ctor = def.ctors.iter().find(|c| c.name == dcon)?;
        Some((&def.params, ctor))
    }

    /// Every datatype declaring a constructor of this name, in
    /// deterministic order.
    pub fn constructor_candidates(&self, dcon: &str) -> Vec<(&str, &DataDef, &ConstructorDef)> {
        let Some(tycons) = self.constructor_index.get(dcon) else {
            return Vec::new();
        };
        tycons
            .iter()
            .filter_map(|tycon| {
                let def = self.datatypes.get(tycon)?;
                let ctor = def.ctors.iter().find(|c| c.name == dcon)?;
                Some((tycon.as_str(), def, ctor))
            })
            .collect()
    }

    /// Checks and records a type declaration.
    pub fn add_decl(&mut self, name: &str, ty: Rc<Term>) -> Result<(), TypeError> {
        tc_entry(self, &ModuleEntry::Decl(name.to_string(), ty)).map(|_| ())
    }

    /// Checks and records a definition.
    pub fn add_def(&mut self, name: &str, term: Rc<Term>) -> Result<(), TypeError> {
        tc_entry(self, &ModuleEntry::Def(name.to_string(), term)).map(|_| ())
    }

    /// Checks and records a datatype.
    pub fn add_datatype(&mut self, name: &str, def: DataDef) -> Result<(), TypeError> {
        tc_entry(self, &ModuleEntry::Data(name.to_string(), def)).map(|_| ())
    }
}

/// Reduces a type to weak-head normal form and requires a type-constructor
/// application, yielding its name and parameters.
pub fn ensure_tycon(
    globals: &Globals,
    ty: &Rc<Term>,
) -> Result<(String, Vec<Rc<Term>>), TypeError> {
    let ty = whnf(globals, ty)?;
    match &*ty {
        Term::TyCon(name, params) => Ok((name.clone(), params.clone())),
        _ => Err(ErrorKind::NotADatatype(ty.clone()).into()),
    }
}

/// Infers a type for a term. Only forms with a synthesizable type are
/// accepted; everything else reports that an annotation is required.
pub fn infer(globals: &Globals, ctx: &Context, term: &Rc<Term>) -> Result<Rc<Term>, TypeError> {
    debug_assert!(term.is_scoped(ctx.len()), "term escapes its scope");
    match &**term {
        Term::Var(idx) => ctx
            .get(*idx)
            .ok_or_else(|| TypeError::from(ErrorKind::UnknownVariable(*idx))),
        Term::Global(name) => globals
            .decl_type(name)
            .ok_or_else(|| TypeError::from(ErrorKind::UnknownGlobal(name.clone()))),
        Term::Type => Ok(Term::ty()),
        Term::Pi(dom, bind) => {
            check(globals, ctx, dom, &Term::ty())?;
            let ctx = ctx.push(dom.clone());
            check(globals, &ctx, &bind.body, &Term::ty())?;
            Ok(Term::ty())
        }
        Term::App(f, arg) => {
            let fty = whnf(globals, &infer(globals, ctx, f)?)?;
            let Term::Pi(dom, bind) = &*fty else {
                return Err(ErrorKind::NotAFunction(fty.clone()).into());
            };
            check(globals, ctx, arg, dom)?;
            Ok(bind.instantiate(arg))
        }
        Term::Ann(tm, ty) => {
            check(globals, ctx, ty, &Term::ty())?;
            check(globals, ctx, tm, ty)?;
            Ok(ty.clone())
        }
        Term::Pos(pos, tm) => infer(globals, ctx, tm).map_err(|e| e.with_pos(*pos)),
        Term::TyCon(name, params) => {
            let def = globals
                .datatype(name)
                .ok_or_else(|| TypeError::from(ErrorKind::UnknownDatatype(name.clone())))?;
            tc_arg_tele(globals, params, &def.params, ctx, "parameter")?;
            Ok(Term::ty())
        }
        Term::DataCon(name, args) => {
            // inferable only for a unique constructor of a parameterless
            // datatype; anything else needs the expected type
            let candidates = globals.constructor_candidates(name);
            match candidates.as_slice() {
                [] => Err(ErrorKind::UnknownConstructor(name.clone()).into()),
                [(tycon, def, ctor)] => {
                    if !def.params.is_empty() {
                        return Err(ErrorKind::MissingAnnotation(term.clone()).into());
                    }
                    tc_arg_tele(globals, args, &ctor.args, ctx, "argument")?;
                    Ok(Term::tycon(tycon, vec![]))
                }
                _ => Err(ErrorKind::AmbiguousConstructor(name.clone()).into()),
            }
        }
        Term::TyEq(a, b) => {
            let aty = infer(globals, ctx, a)?;
            check(globals, ctx, b, &aty)?;
            Ok(Term::ty())
        }
        _ => Err(ErrorKind::MissingAnnotation(term.clone()).into()),
    }
}

/// Checks a term against an expected type. The expected type is reduced
/// to weak-head normal form before the term's shape is inspected.
pub fn check(
    globals: &Globals,
    ctx: &Context,
    term: &Rc<Term>,
    expected: &Rc<Term>,
) -> Result<(), TypeError> {
    debug_assert!(term.is_scoped(ctx.len()), "term escapes its scope");
    debug_assert!(expected.is_scoped(ctx.len()), "type escapes its scope");
    let expected = whnf(globals, expected)?;
    match &**term {
        Term::Pos(pos, tm) => check(globals, ctx, tm, &expected).map_err(|e| e.with_pos(*pos)),
        Term::Lam(bind) => {
            let Term::Pi(dom, pi_bind) = &*expected else {
                return Err(ErrorKind::NotAFunction(expected.clone()).into());
            };
            let ctx = ctx.push(dom.clone());
            check(globals, &ctx, &bind.body, &pi_bind.body)
        }
        Term::TrustMe => Ok(()),
        Term::PrintMe => Err(ErrorKind::UnmetObligation {
            context: ctx.entries().to_vec(),
            goal: expected.clone(),
        }
        .into()),
        Term::Let(rhs, bind) => check(globals, ctx, &bind.instantiate(rhs), &expected),
        Term::Refl => {
            let Term::TyEq(a, b) = &*expected else {
                return Err(ErrorKind::NotAnEquality(expected.clone()).into());
            };
            equate(globals, a, b)
        }
        Term::Subst(body, proof) => {
            let pty = whnf(globals, &infer(globals, ctx, proof)?)?;
            let Term::TyEq(m, n) = &*pty else {
                return Err(ErrorKind::NotAnEquality(pty.clone()).into());
            };
            let sides = unify(globals, 0, m, n)?;
            let by_refl = unify(globals, 0, proof, &Term::refl())?;
            let refinement = sides.join(&by_refl)?;
            let ctx = ctx.apply_refinement(&refinement);
            check(globals, &ctx, body, &refinement.apply(&expected))
        }
        Term::Contra(proof) => {
            let pty = whnf(globals, &infer(globals, ctx, proof)?)?;
            let Term::TyEq(m, n) = &*pty else {
                return Err(ErrorKind::NotAnEquality(pty.clone()).into());
            };
            let m = whnf(globals, m)?;
            let n = whnf(globals, n)?;
            match (&*m, &*n) {
                (Term::DataCon(c1, _), Term::DataCon(c2, _)) if c1 != c2 => Ok(()),
                _ => Err(ErrorKind::NotContradictory {
                    left: m.clone(),
                    right: n.clone(),
                }
                .into()),
            }
        }
        Term::DataCon(name, args) => match &*expected {
            Term::TyCon(tycon, params) => {
                let (delta, ctor) = globals.scoped_constructor(name, tycon).ok_or_else(|| {
                    TypeError::from(ErrorKind::NotAConstructorOf {
                        name: name.clone(),
                        tycon: tycon.clone(),
                    })
                })?;
                debug_assert_eq!(params.len(), delta.decl_count());
                let theta = subst_tele(params, &ctor.args);
                tc_arg_tele(globals, args, &theta, ctx, "argument")?;
                Ok(())
            }
            _ => check_by_inference(globals, ctx, term, &expected),
        },
        Term::Case(scrut, branches) => {
            let sty = infer(globals, ctx, scrut)?;
            let (tycon, params) = ensure_tycon(globals, &sty)?;
            let scrut_nf = whnf(globals, scrut)?;
            let scrut_concrete = matches!(&*scrut_nf, Term::DataCon(_, _));
            let scrut_ty = Term::tycon(&tycon, params);
            for branch in branches {
                let size = branch.pat.size();
                let (branch_ctx, pat_term) = declare_pat(globals, &branch.pat, &scrut_ty, ctx)?;
                let defs = match unify(globals, 0, &scrut_nf.shift(0, size), &pat_term) {
                    Ok(defs) => defs,
                    // a concrete scrutinee clashing with the pattern makes
                    // the branch unreachable
                    Err(err)
                        if scrut_concrete
                            && matches!(
                                err.kind,
                                ErrorKind::Mismatch { .. }
                                    | ErrorKind::IncompatibleRefinement { .. }
                            ) =>
                    {
                        continue;
                    }
                    Err(err) => return Err(err),
                };
                let branch_ctx = branch_ctx.apply_refinement(&defs);
                let goal = defs.apply(&expected.shift(0, size));
                check(globals, &branch_ctx, &branch.body, &goal)?;
            }
            Ok(())
        }
        _ => check_by_inference(globals, ctx, term, &expected),
    }
}

fn check_by_inference(
    globals: &Globals,
    ctx: &Context,
    term: &Rc<Term>,
    expected: &Rc<Term>,
) -> Result<(), TypeError> {
    let inferred = infer(globals, ctx, term)?;
    equate(globals, &inferred, expected)
}

/// Elaborates a pattern against a type: returns the context extended with
/// the pattern's bindings and the term the pattern stands for, used to
/// unify against the scrutinee.
pub fn declare_pat(
    globals: &Globals,
    pat: &Pattern,
    ty: &Rc<Term>,
    ctx: &Context,
) -> Result<(Context, Rc<Term>), TypeError> {
    match pat {
        Pattern::Var(_) => Ok((ctx.push(ty.clone()), Term::var(0))),
        Pattern::Con(name, pats) => {
            let (tycon, params) = ensure_tycon(globals, ty)?;
            let (_, ctor) = globals.scoped_constructor(name, &tycon).ok_or_else(|| {
                TypeError::from(ErrorKind::NotAConstructorOf {
                    name: name.clone(),
                    tycon: tycon.clone(),
                })
            })?;
            let expected = ctor.args.decl_count();
            if pats.len() != expected {
                return Err(ErrorKind::PatternArity {
                    expected,
                    got: pats.len(),
                }
                .into());
            }
            let theta = subst_tele(&params, &ctor.args);
            let (ctx, args) = declare_pats(globals, pats, &theta, ctx)?;
            Ok((ctx, Term::datacon(name, args)))
        }
    }
}

/// Elaborates a pattern list against a telescope. Equations are skipped
/// (a successful match satisfies them); each declaration consumes one
/// pattern, and the telescope's tail moves under that pattern's bindings
/// with the declared variable instantiated to the pattern's term.
pub fn declare_pats(
    globals: &Globals,
    pats: &[Pattern],
    tele: &Telescope,
    ctx: &Context,
) -> Result<(Context, Vec<Rc<Term>>), TypeError> {
    let expected = tele.decl_count();
    if pats.len() != expected {
        return Err(ErrorKind::PatternArity {
            expected,
            got: pats.len(),
        }
        .into());
    }
    let mut terms = Vec::with_capacity(pats.len());
    let ctx = declare_pat_entries(globals, pats, &tele.entries, ctx, &mut terms)?;
    Ok((ctx, terms))
}

fn declare_pat_entries(
    globals: &Globals,
    pats: &[Pattern],
    entries: &[Entry],
    ctx: &Context,
    terms: &mut Vec<Rc<Term>>,
) -> Result<Context, TypeError> {
    use crate::subst::Sub;
    use crate::telescope::subst_entries;

    match entries.split_first() {
        None => {
            debug_assert!(pats.is_empty());
            Ok(ctx.clone())
        }
        Some((Entry::Def(_, _), rest)) => declare_pat_entries(globals, pats, rest, ctx, terms),
        Some((Entry::Decl(_, ty), rest)) => {
            let (pat, pats_rest) = pats.split_first().expect("arity checked by caller");
            let size = pat.size();
            let (ctx, tm) = declare_pat(globals, pat, ty, ctx)?;
            let rest = subst_entries(rest, &Sub::single_shifted(tm.clone(), size));
            for earlier in terms.iter_mut() {
                *earlier = earlier.shift(0, size);
            }
            terms.push(tm);
            declare_pat_entries(globals, pats_rest, &rest, &ctx, terms)
        }
    }
}

/// Checks one module entry against (and into) the global signature,
/// returning the entries it contributes to the checked module: a
/// definition without a prior declaration also yields the inferred
/// declaration, placed before it.
pub fn tc_entry(globals: &mut Globals, entry: &ModuleEntry) -> Result<Vec<ModuleEntry>, TypeError> {
    match entry {
        ModuleEntry::Def(name, term) => {
            if globals.defs.contains_key(name) && !globals.allow_redefinition {
                return Err(ErrorKind::DuplicateBinding(name.clone()).into());
            }
            let ctx = Context::new();
            match globals.hint(name) {
                Some(hint) => {
                    // the declared type is visible while checking the body,
                    // so the definition may refer to itself
                    globals.decls.insert(name.clone(), hint.clone());
                    if let Err(err) = check(globals, &ctx, term, &hint) {
                        globals.decls.remove(name);
                        return Err(err);
                    }
                    globals.hints.remove(name);
                    globals.defs.insert(name.clone(), term.clone());
                    Ok(vec![ModuleEntry::Def(name.clone(), term.clone())])
                }
                None => {
                    let ty = infer(globals, &ctx, term)?;
                    globals.decls.insert(name.clone(), ty.clone());
                    globals.defs.insert(name.clone(), term.clone());
                    Ok(vec![
                        ModuleEntry::Decl(name.clone(), ty),
                        ModuleEntry::Def(name.clone(), term.clone()),
                    ])
                }
            }
        }
        ModuleEntry::Decl(name, ty) => {
            let duplicate = globals.decls.contains_key(name) || globals.hints.contains_key(name);
            if duplicate && !globals.allow_redefinition {
                return Err(ErrorKind::DuplicateBinding(name.clone()).into());
            }
            check(globals, &Context::new(), ty, &Term::ty())?;
            globals.hints.insert(name.clone(), ty.clone());
            Ok(vec![ModuleEntry::Decl(name.clone(), ty.clone())])
        }
        ModuleEntry::Data(name, def) => {
            if globals.datatypes.contains_key(name) && !globals.allow_redefinition {
                return Err(ErrorKind::DuplicateBinding(name.clone()).into());
            }
            if !matches!(&*def.sort, Term::Type) {
                return Err(ErrorKind::Internal("datatype sort must be the universe").into());
            }
            if def
                .params
                .entries
                .iter()
                .any(|e| matches!(e, Entry::Def(_, _)))
            {
                return Err(ErrorKind::Internal("parameter telescope contains an equation").into());
            }
            if let Some(old) = globals.datatypes.get(name) {
                let old_ctors: Vec<String> = old.ctors.iter().map(|c| c.name.clone()).collect();
                for ctor in old_ctors {
                    if let Some(tycons) = globals.constructor_index.get_mut(&ctor) {
                        tycons.retain(|t| t != name);
                    }
                }
            }
            // the datatype goes in first, constructors may mention it
            globals.datatypes.insert(
                name.clone(),
                DataDef {
                    params: def.params.clone(),
                    sort: def.sort.clone(),
                    ctors: Vec::new(),
                },
            );
            match tc_datadef(globals, def) {
                Ok(()) => {
                    globals.datatypes.insert(name.clone(), def.clone());
                    for ctor in &def.ctors {
                        globals
                            .constructor_index
                            .entry(ctor.name.clone())
                            .or_default()
                            .push(name.clone());
                    }
                    Ok(vec![ModuleEntry::Data(name.clone(), def.clone())])
                }
                Err(err) => {
                    globals.datatypes.remove(name);
                    Err(err)
                }
            }
        }
    }
}

fn tc_datadef(globals: &Globals, def: &DataDef) -> Result<(), TypeError> {
    let param_ctx = tc_type_tele(globals, &def.params, &Context::new())?;
    let mut seen: HashSet<&str> = HashSet::new();
    for ctor in &def.ctors {
        if !seen.insert(ctor.name.as_str()) {
            return Err(ErrorKind::DuplicateConstructor(ctor.name.clone()).into());
        }
        tc_type_tele(globals, &ctor.args, &param_ctx)?;
    }
    Ok(())
}

/// Checks a module entry by entry, growing the global signature. Errors
/// are tagged with the entry they arose in; at most one error is reported
/// per run. The returned module carries inferred declarations ahead of
/// the definitions that lacked one.
pub fn check_module(globals: &mut Globals, module: &Module) -> Result<Module, TypeError> {
    let mut entries = Vec::new();
    for entry in &module.entries {
        let produced = tc_entry(globals, entry).map_err(|e| e.with_decl(entry.name()))?;
        entries.extend(produced);
    }
    Ok(Module {
        name: module.name.clone(),
        imports: module.imports.clone(),
        entries,
    })
}
