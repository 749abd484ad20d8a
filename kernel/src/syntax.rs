use std::rc::Rc;

/// A source position attached by the surface parser. Purely diagnostic:
/// the checker only carries it into error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePos {
    pub line: u32,
    pub col: u32,
}

/// The name whnf gives to the unit value a `PrintMe` hole reduces to.
pub const UNIT_DATACON: &str = "()";

/// The core terms of the language, using de Bruijn indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Bound variable (de Bruijn index)
    Var(usize),
    /// Top-level identifier, resolved through the global signature
    Global(String),
    /// The universe of types. Typed by itself; there is no hierarchy.
    Type,
    /// Dependent function type: (x : A) -> B
    Pi(Rc<Term>, Bind),
    /// Function: \x. b
    Lam(Bind),
    /// Application: f a
    App(Rc<Term>, Rc<Term>),
    /// Type ascription: (t : A). Erased by whnf.
    Ann(Rc<Term>, Rc<Term>),
    /// Source-position wrapper. Erased by whnf.
    Pos(SourcePos, Rc<Term>),
    /// Local definition: let x = v in b
    Let(Rc<Term>, Bind),
    /// Type-constructor application
    TyCon(String, Vec<Rc<Term>>),
    /// Data-constructor application
    DataCon(String, Vec<Rc<Term>>),
    /// Pattern match on a scrutinee
    Case(Rc<Term>, Vec<Branch>),
    /// Propositional equality type: a = b
    TyEq(Rc<Term>, Rc<Term>),
    /// Reflexivity proof
    Refl,
    /// Rewrite the body's type with an equality proof: subst a by p
    Subst(Rc<Term>, Rc<Term>),
    /// Absurdity from an equation between distinct constructors
    Contra(Rc<Term>),
    /// Admitted obligation
    TrustMe,
    /// Debug hole: checking it reports the goal and context
    PrintMe,
}

/// A binder: the bound variable's display name and a body living one scope
/// deeper. Names exist for display only; equality ignores them, so the
/// derived equality on [`Term`] is exactly alpha-equivalence.
#[derive(Debug, Clone, Eq)]
pub struct Bind {
    pub name: String,
    pub body: Rc<Term>,
}

impl PartialEq for Bind {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl Bind {
    pub fn new(name: &str, body: Rc<Term>) -> Self {
        Bind {
            name: name.to_string(),
            body,
        }
    }
}

/// One arm of a case expression. The body lives under `pat.size()` extra
/// binders, innermost variable bound last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub pat: Pattern,
    pub body: Rc<Term>,
}

impl Branch {
    pub fn new(pat: Pattern, body: Rc<Term>) -> Self {
        Branch { pat, body }
    }
}

/// A pattern: either a variable (binding one term) or a constructor applied
/// to sub-patterns. Variable names are display-only and ignored by equality.
#[derive(Debug, Clone, Eq)]
pub enum Pattern {
    Var(String),
    Con(String, Vec<Pattern>),
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Pattern::Var(_), Pattern::Var(_)) => true,
            (Pattern::Con(c, ps), Pattern::Con(d, qs)) => c == d && ps == qs,
            _ => false,
        }
    }
}

impl Pattern {
    pub fn var(name: &str) -> Self {
        Pattern::Var(name.to_string())
    }

    pub fn con(name: &str, pats: Vec<Pattern>) -> Self {
        Pattern::Con(name.to_string(), pats)
    }

    /// The number of variables this pattern binds.
    pub fn size(&self) -> usize {
        match self {
            Pattern::Var(_) => 1,
            Pattern::Con(_, pats) => pats.iter().map(Pattern::size).sum(),
        }
    }
}

/// One telescope entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Binds one variable of the given type; later entries live one scope
    /// deeper.
    Decl(String, Rc<Term>),
    /// An equation the argument list must satisfy; binds nothing. The left
    /// side is a variable when the telescope is first formed, but
    /// substitution may turn it into a concrete term.
    Def(Rc<Term>, Rc<Term>),
}

impl Entry {
    pub fn decl(name: &str, ty: Rc<Term>) -> Self {
        Entry::Decl(name.to_string(), ty)
    }

    pub fn def(var: usize, rhs: Rc<Term>) -> Self {
        Entry::Def(Term::var(var), rhs)
    }
}

/// An ordered dependent sequence of variable typings and equations, used
/// both for datatype parameters and constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Telescope {
    pub entries: Vec<Entry>,
}

impl Telescope {
    pub fn new(entries: Vec<Entry>) -> Self {
        Telescope { entries }
    }

    pub fn empty() -> Self {
        Telescope::default()
    }

    /// The number of variables the telescope binds.
    pub fn decl_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Decl(_, _)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A constructor's argument telescope, scoped under its datatype's
/// parameter telescope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDef {
    pub name: String,
    pub args: Telescope,
}

impl ConstructorDef {
    pub fn new(name: &str, args: Telescope) -> Self {
        ConstructorDef {
            name: name.to_string(),
            args,
        }
    }
}

/// A datatype definition: a closed parameter telescope, the sort the type
/// lives in, and the constructors (each scoped under the parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDef {
    pub params: Telescope,
    pub sort: Rc<Term>,
    pub ctors: Vec<ConstructorDef>,
}

impl DataDef {
    pub fn new(params: Telescope, ctors: Vec<ConstructorDef>) -> Self {
        DataDef {
            params,
            sort: Term::ty(),
            ctors,
        }
    }
}

/// One top-level entry of a module, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleEntry {
    /// A type declaration: name : type
    Decl(String, Rc<Term>),
    /// A definition: name = term
    Def(String, Rc<Term>),
    /// A datatype declaration
    Data(String, DataDef),
}

impl ModuleEntry {
    pub fn name(&self) -> &str {
        match self {
            ModuleEntry::Decl(n, _) | ModuleEntry::Def(n, _) | ModuleEntry::Data(n, _) => n,
        }
    }
}

/// A module as handed over by the surface pipeline: entries in dependency
/// order plus the names of imported modules (already resolved upstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub imports: Vec<String>,
    pub entries: Vec<ModuleEntry>,
}

impl Module {
    pub fn new(name: &str, entries: Vec<ModuleEntry>) -> Self {
        Module {
            name: name.to_string(),
            imports: Vec::new(),
            entries,
        }
    }
}

// Helper constructors for convenience
impl Term {
    pub fn var(i: usize) -> Rc<Self> {
        Rc::new(Term::Var(i))
    }

    pub fn global(name: &str) -> Rc<Self> {
        Rc::new(Term::Global(name.to_string()))
    }

    pub fn ty() -> Rc<Self> {
        Rc::new(Term::Type)
    }

    pub fn pi(name: &str, dom: Rc<Term>, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Pi(dom, Bind::new(name, body)))
    }

    /// Non-dependent function type; the codomain is weakened under the
    /// fresh binder.
    pub fn arrow(dom: Rc<Term>, cod: Rc<Term>) -> Rc<Self> {
        let cod = cod.shift(0, 1);
        Rc::new(Term::Pi(dom, Bind::new("_", cod)))
    }

    pub fn lam(name: &str, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Lam(Bind::new(name, body)))
    }

    pub fn app(f: Rc<Term>, a: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::App(f, a))
    }

    pub fn apps(f: Rc<Term>, args: Vec<Rc<Term>>) -> Rc<Self> {
        args.into_iter().fold(f, Term::app)
    }

    pub fn ann(t: Rc<Term>, ty: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Ann(t, ty))
    }

    pub fn pos(p: SourcePos, t: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Pos(p, t))
    }

    pub fn let_(rhs: Rc<Term>, name: &str, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Let(rhs, Bind::new(name, body)))
    }

    pub fn tycon(name: &str, params: Vec<Rc<Term>>) -> Rc<Self> {
        Rc::new(Term::TyCon(name.to_string(), params))
    }

    pub fn datacon(name: &str, args: Vec<Rc<Term>>) -> Rc<Self> {
        Rc::new(Term::DataCon(name.to_string(), args))
    }

    pub fn case(scrut: Rc<Term>, branches: Vec<Branch>) -> Rc<Self> {
        Rc::new(Term::Case(scrut, branches))
    }

    pub fn tyeq(a: Rc<Term>, b: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::TyEq(a, b))
    }

    pub fn refl() -> Rc<Self> {
        Rc::new(Term::Refl)
    }

    pub fn subst(body: Rc<Term>, proof: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Subst(body, proof))
    }

    pub fn contra(proof: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Contra(proof))
    }
}
