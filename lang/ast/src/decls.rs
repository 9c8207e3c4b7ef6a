use log::warn;
use miette::Diagnostic;
use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{COLON, DEF, HOOK_ARROW};
use printer::{Alloc, Builder, Precedence, Print, PrintCfg};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::exp::{Exp, MultiBinder};
use crate::ident::{IdBind, IdBound, ModulePath};
use crate::HashMap;

// Symbols
//
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Never carries rewrite rules; only reducible by β within its arguments.
    Static,
    /// May carry rewrite rules; rewritten when applied to sufficiently many
    /// arguments.
    Definable,
}

/// A rewrite rule attached to a definable symbol.
///
/// Both sides are closed binders over the same `k` rule variables. The
/// left-hand side produces the `arity` argument patterns the rule matches
/// against; the right-hand side produces the replacement term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub arity: usize,
    pub lhs: MultiBinder<Vec<Exp>>,
    pub rhs: MultiBinder<Box<Exp>>,
}

/// A signature entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: IdBind,
    pub kind: SymbolKind,
    pub typ: Box<Exp>,
    pub rules: Vec<Rule>,
}

// Signature
//
//

/// The symbol table of one module: an ordered map from names to entries.
#[derive(Debug, Clone, Serialize)]
pub struct Signature {
    pub path: ModulePath,
    symbols: Vec<Symbol>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Signature {
    pub fn new(path: ModulePath) -> Self {
        Signature { path, symbols: Vec::new(), index: HashMap::default() }
    }

    fn from_parts(path: ModulePath, symbols: Vec<Symbol>) -> Self {
        let mut sig = Signature { path, symbols, index: HashMap::default() };
        sig.index = sig
            .symbols
            .iter()
            .enumerate()
            .map(|(position, symbol)| (symbol.name.id.clone(), position))
            .collect();
        sig
    }

    pub fn add_static(&mut self, name: IdBind, typ: Box<Exp>) -> IdBound {
        self.insert(Symbol { name, kind: SymbolKind::Static, typ, rules: Vec::new() })
    }

    pub fn add_definable(&mut self, name: IdBind, typ: Box<Exp>) -> IdBound {
        self.insert(Symbol { name, kind: SymbolKind::Definable, typ, rules: Vec::new() })
    }

    fn insert(&mut self, symbol: Symbol) -> IdBound {
        let bound = IdBound::new(self.path.clone(), &symbol.name.id);
        match self.index.get(&symbol.name.id) {
            Some(&position) => {
                warn!("Redeclaration of symbol {} in module {}", symbol.name, self.path);
                self.symbols[position] = symbol;
            }
            None => {
                self.index.insert(symbol.name.id.clone(), self.symbols.len());
                self.symbols.push(symbol);
            }
        }
        bound
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&position| &self.symbols[position])
    }

    pub fn find_expect(&self, name: &str) -> Result<&Symbol, LookupError> {
        self.find(name).ok_or_else(|| LookupError::UndefinedSymbol {
            name: name.to_owned(),
            module: self.path.to_string(),
        })
    }

    /// Attach a checked rule to a definable symbol. The rule checker must
    /// have accepted the rule before it is attached here.
    pub fn attach_rule(&mut self, name: &str, rule: Rule) -> Result<(), LookupError> {
        let position = *self.index.get(name).ok_or_else(|| LookupError::UndefinedSymbol {
            name: name.to_owned(),
            module: self.path.to_string(),
        })?;
        let symbol = &mut self.symbols[position];
        if symbol.kind != SymbolKind::Definable {
            return Err(LookupError::ExpectedDefinable { name: name.to_owned() });
        }
        symbol.rules.push(rule);
        Ok(())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SignatureData {
            path: ModulePath,
            symbols: Vec<Symbol>,
        }
        let SignatureData { path, symbols } = SignatureData::deserialize(deserializer)?;
        Ok(Signature::from_parts(path, symbols))
    }
}

// Signatures
//
//

/// The registry of all loaded signatures, keyed by module path.
#[derive(Debug, Clone, Default)]
pub struct Signatures {
    map: HashMap<ModulePath, Signature>,
}

impl Signatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sig: Signature) {
        self.map.insert(sig.path.clone(), sig);
    }

    pub fn contains(&self, path: &ModulePath) -> bool {
        self.map.contains_key(path)
    }

    pub fn get(&self, path: &ModulePath) -> Option<&Signature> {
        self.map.get(path)
    }

    pub fn get_mut(&mut self, path: &ModulePath) -> Option<&mut Signature> {
        self.map.get_mut(path)
    }

    /// Resolve a symbol reference through the registry.
    pub fn lookup(&self, name: &IdBound) -> Result<&Symbol, LookupError> {
        let sig = self
            .map
            .get(&name.path)
            .ok_or_else(|| LookupError::UnknownModule { module: name.path.to_string() })?;
        sig.find_expect(&name.id)
    }
}

// Lookup errors
//
//

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Undefined symbol {name} in module {module}")]
    #[diagnostic(code("S-001"))]
    UndefinedSymbol { name: String, module: String },
    #[error("Unknown module {module}")]
    #[diagnostic(code("S-002"))]
    UnknownModule { module: String },
    #[error("Symbol {name} is static and cannot carry rewrite rules")]
    #[diagnostic(code("S-003"))]
    ExpectedDefinable { name: String },
}

// Prettyprinting
//
//

impl Print for Rule {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let sep = alloc.space();
        alloc
            .intersperse(
                self.lhs.body.iter().map(|pat| pat.print_prec(cfg, alloc, Precedence::Atom)),
                sep,
            )
            .append(alloc.space())
            .append(HOOK_ARROW)
            .append(alloc.space())
            .append(self.rhs.body.print(cfg, alloc))
    }
}

impl Print for Symbol {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let head = match self.kind {
            SymbolKind::Static => alloc.nil(),
            SymbolKind::Definable => alloc.keyword(DEF).append(alloc.space()),
        };
        let decl = head
            .append(alloc.sym(&self.name.id))
            .append(alloc.space())
            .append(COLON)
            .append(alloc.space())
            .append(self.typ.print(cfg, alloc));
        let rules = self.rules.iter().map(|rule| {
            alloc
                .hardline()
                .append(alloc.sym(&self.name.id))
                .append(alloc.space())
                .append(rule.print(cfg, alloc))
                .nest(cfg.indent)
        });
        decl.append(alloc.concat(rules))
    }
}

impl Print for Signature {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        let sep = alloc.hardline();
        alloc.intersperse(self.symbols.iter().map(|symbol| symbol.print(cfg, alloc)), sep)
    }
}

#[cfg(test)]
mod tests {
    use crate::exp::TypeUniv;

    use super::*;

    fn nat_module() -> Signature {
        let mut sig = Signature::new(ModulePath::from_dotted("nat"));
        sig.add_static(IdBind::from_string("Nat"), Box::new(Exp::TypeUniv(TypeUniv)));
        sig
    }

    #[test]
    fn find_returns_the_entry() {
        let sig = nat_module();
        let symbol = sig.find("Nat").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Static);
        assert!(sig.find("Bool").is_none());
    }

    #[test]
    fn redeclaration_replaces_the_entry() {
        let mut sig = nat_module();
        sig.add_definable(IdBind::from_string("Nat"), Box::new(Exp::Kind(crate::exp::Kind)));
        assert_eq!(sig.symbols().count(), 1);
        assert_eq!(sig.find("Nat").unwrap().kind, SymbolKind::Definable);
    }

    #[test]
    fn rules_cannot_be_attached_to_static_symbols() {
        let mut sig = nat_module();
        let rule = Rule {
            arity: 0,
            lhs: MultiBinder::bind(vec![], vec![]),
            rhs: MultiBinder::bind(vec![], Box::new(Exp::TypeUniv(TypeUniv))),
        };
        let err = sig.attach_rule("Nat", rule).unwrap_err();
        assert_eq!(err, LookupError::ExpectedDefinable { name: "Nat".to_owned() });
    }

    #[test]
    fn serialization_round_trip_preserves_identity() {
        let mut sig = nat_module();
        sig.add_definable(
            IdBind::from_string("plus"),
            Box::new(Exp::TypeUniv(TypeUniv)),
        );
        sig.attach_rule(
            "plus",
            Rule {
                arity: 0,
                lhs: MultiBinder::bind(vec![], vec![]),
                rhs: MultiBinder::bind(vec![], Box::new(Exp::TypeUniv(TypeUniv))),
            },
        )
        .unwrap();

        let json = serde_json::to_string(&sig).unwrap();
        let restored: Signature = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.path, sig.path);
        let plus = restored.find_expect("plus").unwrap();
        assert_eq!(plus.kind, SymbolKind::Definable);
        assert_eq!(plus.rules.len(), 1);
    }
}
