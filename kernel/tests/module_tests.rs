//! The top-level entry checker: declarations, definitions, hints, output
//! ordering, and the redefinition flag.

use std::rc::Rc;

use kernel::{
    check_module, tc_entry, Branch, ConstructorDef, DataDef, Entry, ErrorKind, Globals, Module,
    ModuleEntry, Pattern, SourcePos, Telescope, Term,
};

fn nat() -> Rc<Term> {
    Term::tycon("Nat", vec![])
}

fn zero() -> Rc<Term> {
    Term::datacon("Z", vec![])
}

fn succ(t: Rc<Term>) -> Rc<Term> {
    Term::datacon("S", vec![t])
}

fn nat_def() -> DataDef {
    DataDef::new(
        Telescope::empty(),
        vec![
            ConstructorDef::new("Z", Telescope::empty()),
            ConstructorDef::new("S", Telescope::new(vec![Entry::decl("n", nat())])),
        ],
    )
}

#[test]
fn declared_definition_keeps_its_entry_order() {
    let mut globals = Globals::new();
    let id_ty = Term::pi("A", Term::ty(), Term::pi("x", Term::var(0), Term::var(1)));
    let id = Term::lam("A", Term::lam("x", Term::var(0)));
    let module = Module::new(
        "Id",
        vec![
            ModuleEntry::Decl("id".to_string(), id_ty.clone()),
            ModuleEntry::Def("id".to_string(), id.clone()),
        ],
    );
    let checked = check_module(&mut globals, &module).expect("module checks");
    assert_eq!(
        checked.entries,
        vec![
            ModuleEntry::Decl("id".to_string(), id_ty),
            ModuleEntry::Def("id".to_string(), id),
        ]
    );
}

#[test]
fn missing_declaration_is_filled_in_by_inference() {
    let mut globals = Globals::new();
    let module = Module::new(
        "Two",
        vec![
            ModuleEntry::Data("Nat".to_string(), nat_def()),
            ModuleEntry::Def("two".to_string(), succ(succ(zero()))),
        ],
    );
    let checked = check_module(&mut globals, &module).expect("module checks");
    assert_eq!(checked.entries.len(), 3);
    assert_eq!(
        checked.entries[1],
        ModuleEntry::Decl("two".to_string(), nat())
    );
    assert_eq!(
        checked.entries[2],
        ModuleEntry::Def("two".to_string(), succ(succ(zero())))
    );
}

#[test]
fn recursive_definition_sees_its_own_declaration() {
    // plus : Nat -> Nat -> Nat
    // plus = \m. \n. case m of { Z -> n ; S k -> S (plus k n) }
    let mut globals = Globals::new();
    let plus_ty = Term::arrow(nat(), Term::arrow(nat(), nat()));
    let plus = Term::lam(
        "m",
        Term::lam(
            "n",
            Term::case(
                Term::var(1),
                vec![
                    Branch::new(Pattern::con("Z", vec![]), Term::var(0)),
                    Branch::new(
                        Pattern::con("S", vec![Pattern::var("k")]),
                        succ(Term::apps(
                            Term::global("plus"),
                            vec![Term::var(0), Term::var(1)],
                        )),
                    ),
                ],
            ),
        ),
    );
    let module = Module::new(
        "Plus",
        vec![
            ModuleEntry::Data("Nat".to_string(), nat_def()),
            ModuleEntry::Decl("plus".to_string(), plus_ty),
            ModuleEntry::Def("plus".to_string(), plus),
        ],
    );
    check_module(&mut globals, &module).expect("plus checks");

    // and the closed program reduces
    let two = succ(succ(zero()));
    let sum = Term::apps(Term::global("plus"), vec![succ(zero()), succ(zero())]);
    let nf = kernel::whnf(&globals, &sum).expect("whnf");
    // weak head only exposes the outer constructor
    let Term::DataCon(name, args) = &*nf else {
        panic!("expected a constructor, got {:?}", nf);
    };
    assert_eq!(name, "S");
    kernel::equate(&globals, &sum, &two).expect("1 + 1 = 2");
    assert_eq!(args.len(), 1);
}

#[test]
fn definition_body_is_checked_against_its_hint() {
    let mut globals = Globals::new();
    let module = Module::new(
        "Bad",
        vec![
            ModuleEntry::Data("Nat".to_string(), nat_def()),
            ModuleEntry::Decl("f".to_string(), nat()),
            ModuleEntry::Def("f".to_string(), Term::lam("x", Term::var(0))),
        ],
    );
    let err = check_module(&mut globals, &module).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotAFunction(_)));
    assert_eq!(err.decl.as_deref(), Some("f"));
}

#[test]
fn duplicate_definitions_are_rejected() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    globals.add_def("x", zero()).expect("first definition");
    let err = globals.add_def("x", zero()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateBinding(_)));
}

#[test]
fn duplicate_declarations_are_rejected() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    globals.add_decl("x", nat()).expect("first declaration");
    let err = globals.add_decl("x", nat()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateBinding(_)));
}

#[test]
fn duplicate_datatypes_are_rejected() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    let err = globals.add_datatype("Nat", nat_def()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateBinding(_)));
}

#[test]
fn redefinition_flag_allows_overwriting() {
    let mut globals = Globals::new();
    globals.set_allow_redefinition(true);
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    globals.add_def("x", zero()).expect("first");
    globals.add_def("x", succ(zero())).expect("second");
    let nf = kernel::whnf(&globals, &Term::global("x")).expect("whnf");
    assert_eq!(nf, succ(zero()));

    // re-adding a datatype keeps the constructor index consistent
    globals.add_datatype("Nat", nat_def()).expect("Nat again");
    assert_eq!(globals.constructor_candidates("Z").len(), 1);
}

#[test]
fn declarations_must_be_types() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    let err = globals.add_decl("f", zero()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Mismatch { .. }));
}

#[test]
fn use_before_declaration_fails() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    let err = globals.add_def("f", Term::global("g")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownGlobal(_)));
}

#[test]
fn source_positions_reach_the_error() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    let pos = SourcePos { line: 4, col: 11 };
    let module = Module::new(
        "Positions",
        vec![ModuleEntry::Def(
            "bad".to_string(),
            Term::pos(pos, Term::app(zero(), zero())),
        )],
    );
    let err = check_module(&mut globals, &module).unwrap_err();
    assert_eq!(err.pos, Some(pos));
    assert_eq!(err.decl.as_deref(), Some("bad"));
    assert!(matches!(err.kind, ErrorKind::NotAFunction(_)));
}

#[test]
fn datatype_entry_roundtrips_through_tc_entry() {
    let mut globals = Globals::new();
    let entry = ModuleEntry::Data("Nat".to_string(), nat_def());
    let produced = tc_entry(&mut globals, &entry).expect("Nat checks");
    assert_eq!(produced, vec![entry]);
    assert!(globals.datatype("Nat").is_some());
    assert_eq!(globals.constructor_candidates("S").len(), 1);
}

#[test]
fn hint_is_consumed_by_its_definition() {
    let mut globals = Globals::new();
    globals.add_datatype("Nat", nat_def()).expect("Nat");
    globals.add_decl("x", nat()).expect("decl");
    assert!(globals.hint("x").is_some());
    globals.add_def("x", zero()).expect("def");
    assert!(globals.hint("x").is_none());
    assert_eq!(globals.decl_type("x"), Some(nat()));
    assert_eq!(globals.definition("x"), Some(zero()));
}
