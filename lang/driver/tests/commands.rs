//! End-to-end tests of the command interface: one call per top-level item,
//! the way a frontend drives the kernel.

use ast::*;
use elaborator::typechecker::decls::RuleDecl;
use modulo_lang_driver::{Database, FileSource};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn var(name: &str) -> Variable {
    Variable::fresh(VarBind::from_string(name))
}

fn sym(path: &ModulePath, name: &str, kind: SymbolKind) -> Exp {
    Exp::Sym(Sym::new(IdBound::new(path.clone(), name), kind))
}

fn church(path: &ModulePath, n: usize) -> Exp {
    let mut exp = sym(path, "z", SymbolKind::Static);
    for _ in 0..n {
        exp = Exp::app(sym(path, "s", SymbolKind::Static), exp);
    }
    exp
}

fn plus(path: &ModulePath, lhs: Exp, rhs: Exp) -> Exp {
    Exp::app_spine(sym(path, "plus", SymbolKind::Definable), [lhs, rhs])
}

/// Declares `Nat`, `z`, `s`, and a definable `plus` with its two rules.
fn nat_database() -> (Database, ModulePath) {
    init_logging();
    let path = ModulePath::from_dotted("nat");
    let mut db = Database::in_memory(path.clone());

    db.new_symbol(SymbolKind::Static, "Nat", Exp::TypeUniv(TypeUniv)).unwrap();
    let nat = sym(&path, "Nat", SymbolKind::Static);
    db.new_symbol(SymbolKind::Static, "z", nat.clone()).unwrap();
    db.new_symbol(SymbolKind::Static, "s", Exp::arrow(nat.clone(), nat.clone())).unwrap();
    db.new_symbol(
        SymbolKind::Definable,
        "plus",
        Exp::arrow(nat.clone(), Exp::arrow(nat.clone(), nat)),
    )
    .unwrap();

    // plus z y ↪ y  and  plus (s x) y ↪ s (plus x y)
    let y = var("y");
    let zero_rule = RuleDecl {
        params: vec![],
        lhs: Box::new(plus(&path, church(&path, 0), Exp::Variable(y.clone()))),
        rhs: Box::new(Exp::Variable(y)),
    };
    let x = var("x");
    let y = var("y");
    let succ_rule = RuleDecl {
        params: vec![],
        lhs: Box::new(plus(
            &path,
            Exp::app(sym(&path, "s", SymbolKind::Static), Exp::Variable(x.clone())),
            Exp::Variable(y.clone()),
        )),
        rhs: Box::new(Exp::app(
            sym(&path, "s", SymbolKind::Static),
            plus(&path, Exp::Variable(x), Exp::Variable(y)),
        )),
    };
    db.add_rules(vec![zero_rule, succ_rule]).unwrap();

    (db, path)
}

#[test]
fn infer_successor_application() {
    let (db, path) = nat_database();
    let typ = db.infer(&church(&path, 2)).unwrap();
    assert_eq!(*typ, sym(&path, "Nat", SymbolKind::Static));
}

#[test]
fn evaluate_addition() {
    let (db, path) = nat_database();
    // plus (s (s z)) (s z) ▷ s (s (s z))
    let exp = plus(&path, church(&path, 2), church(&path, 1));
    assert_eq!(db.evaluate(&exp).unwrap(), church(&path, 3));

    // plus (s z) z ≡ s z
    let exp = plus(&path, church(&path, 1), church(&path, 0));
    assert!(db.check_convertible(&exp, &church(&path, 1)).unwrap());
}

#[test]
fn convertibility_under_rewriting() {
    let (db, path) = nat_database();
    assert!(db
        .check_convertible(&plus(&path, church(&path, 1), church(&path, 1)), &church(&path, 2))
        .unwrap());
    assert!(!db
        .check_convertible(&plus(&path, church(&path, 0), church(&path, 0)), &church(&path, 1))
        .unwrap());
}

#[test]
fn polymorphic_identity() {
    let (mut db, path) = nat_database();

    // id : Π(A : Type). A → A defined by id A x := x
    let a = var("A");
    let x = var("x");
    let id_typ = Exp::pi(
        Exp::TypeUniv(TypeUniv),
        Binder::bind(
            a.clone(),
            Exp::arrow(Exp::Variable(a.clone()), Exp::Variable(a.clone())),
        ),
    );
    let id_body = Exp::lam(
        Exp::TypeUniv(TypeUniv),
        Binder::bind(
            a.clone(),
            Exp::lam(Exp::Variable(a.clone()), Binder::bind(x.clone(), Exp::Variable(x))),
        ),
    );
    db.define("id", Some(id_typ), id_body).unwrap();

    let nat = sym(&path, "Nat", SymbolKind::Static);
    let applied = Exp::app_spine(
        sym(&path, "id", SymbolKind::Definable),
        [nat.clone(), church(&path, 0)],
    );

    db.check(&applied, &nat).unwrap();
    assert!(db.check(&applied, &Exp::arrow(nat.clone(), nat.clone())).is_err());

    // The degenerate rule unfolds the definition during evaluation.
    assert_eq!(db.evaluate(&applied).unwrap(), church(&path, 0));

    // The assertion commands agree.
    db.assert_typing(&applied, &nat).unwrap();
    db.assert_not_typing(&applied, &Exp::arrow(nat.clone(), nat)).unwrap();
}

#[test]
fn define_with_inferred_type() {
    let (mut db, path) = nat_database();
    db.define("two", None, church(&path, 2)).unwrap();
    let two = db.current().find("two").unwrap();
    assert_eq!(*two.typ, sym(&path, "Nat", SymbolKind::Static));
    assert!(db
        .check_convertible(&sym(&path, "two", SymbolKind::Definable), &church(&path, 2))
        .unwrap());
}

#[test]
fn ill_typed_rule_is_rejected() {
    let (mut db, path) = nat_database();
    let nat = sym(&path, "Nat", SymbolKind::Static);
    db.new_symbol(SymbolKind::Definable, "f", Exp::arrow(nat.clone(), nat)).unwrap();

    // f x ↪ x x
    let x = var("x");
    let decl = RuleDecl {
        params: vec![],
        lhs: Box::new(Exp::app(sym(&path, "f", SymbolKind::Definable), Exp::Variable(x.clone()))),
        rhs: Box::new(Exp::app(Exp::Variable(x.clone()), Exp::Variable(x))),
    };
    assert!(db.add_rules(vec![decl]).is_err());
    // The rejected rule was not attached.
    assert!(db.current().find("f").unwrap().rules.is_empty());
}

#[test]
fn non_linear_type_checking() {
    let (mut db, path) = nat_database();
    let nat = sym(&path, "Nat", SymbolKind::Static);

    // eq : Π(A : Type). A → A → Type
    let a = var("A");
    let eq_typ = Exp::pi(
        Exp::TypeUniv(TypeUniv),
        Binder::bind(
            a.clone(),
            Exp::arrow(
                Exp::Variable(a.clone()),
                Exp::arrow(Exp::Variable(a.clone()), Exp::TypeUniv(TypeUniv)),
            ),
        ),
    );
    db.new_symbol(SymbolKind::Static, "eq", eq_typ).unwrap();

    // refl : Π(A : Type). Π(x : A). eq A x x
    let a = var("A");
    let x = var("x");
    let refl_typ = Exp::pi(
        Exp::TypeUniv(TypeUniv),
        Binder::bind(
            a.clone(),
            Exp::pi(
                Exp::Variable(a.clone()),
                Binder::bind(
                    x.clone(),
                    Exp::app_spine(
                        sym(&path, "eq", SymbolKind::Static),
                        [Exp::Variable(a), Exp::Variable(x.clone()), Exp::Variable(x)],
                    ),
                ),
            ),
        ),
    );
    db.new_symbol(SymbolKind::Static, "refl", refl_typ).unwrap();

    let refl_nat_z = Exp::app_spine(
        sym(&path, "refl", SymbolKind::Static),
        [nat.clone(), church(&path, 0)],
    );
    let eq_z_z = Exp::app_spine(
        sym(&path, "eq", SymbolKind::Static),
        [nat.clone(), church(&path, 0), church(&path, 0)],
    );
    let eq_z_sz = Exp::app_spine(
        sym(&path, "eq", SymbolKind::Static),
        [nat.clone(), church(&path, 0), church(&path, 1)],
    );

    db.check(&refl_nat_z, &eq_z_z).unwrap();
    assert!(db.check(&refl_nat_z, &eq_z_sz).is_err());
}

#[test]
fn signature_round_trip_through_an_object_file() {
    let (db, path) = nat_database();

    let dir = tempfile::tempdir().unwrap();
    let object_file = dir.path().join("nat.mdo");
    db.write_signature(&path, &object_file).unwrap();

    // A fresh session imports the module from its object file.
    let main = ModulePath::from_dotted("main");
    let mut db2 = Database::from_source(main, Box::new(FileSource::new(dir.path())));
    db2.load_signature(&path).unwrap();

    // Symbol identity survived: the rewrite rules still compute.
    let exp = plus(&path, church(&path, 2), church(&path, 2));
    assert_eq!(db2.evaluate(&exp).unwrap(), church(&path, 4));
    db2.assert_convertible(&plus(&path, church(&path, 1), church(&path, 1)), &church(&path, 2))
        .unwrap();

    // Repeated loads are served from the registry, not from disk.
    drop(dir);
    db2.load_signature(&path).unwrap();
}

#[test]
fn redeclaration_replaces_the_symbol() {
    let (mut db, path) = nat_database();
    // Redeclaring z as definable is a warning, not an error.
    db.new_symbol(SymbolKind::Definable, "z", sym(&path, "Nat", SymbolKind::Static)).unwrap();
    assert_eq!(db.current().find("z").unwrap().kind, SymbolKind::Definable);
}

#[test]
fn checking_against_an_unsorted_type_fails() {
    let (db, path) = nat_database();
    // z cannot serve as a type.
    assert!(db.check(&church(&path, 1), &church(&path, 0)).is_err());
}
