use std::path::Path;

use log::trace;

use ast::*;
use elaborator::conversion_checking::unify;
use elaborator::typechecker::ctx::Ctx;
use elaborator::typechecker::decls::{check_rule, elaborate_rule, RuleDecl};
use elaborator::typechecker::exprs::{sort_of, CheckInfer};
use elaborator::normalizer::whnf::eval;
use printer::PrintToString;

use crate::fs::{self, ModuleSource, NoSource};
use crate::result::{DriverError, Error};

/// A database tracking the signatures of a compilation session.
///
/// One module is current at a time; commands arriving from the frontend
/// extend its signature or query the kernel against the full registry.
pub struct Database {
    /// The provider of foreign module signatures
    pub source: Box<dyn ModuleSource>,
    /// All loaded signatures, including the module being checked
    pub sigs: Signatures,
    /// The stack of modules currently being compiled
    pub module_stack: Vec<ModulePath>,
}

impl Database {
    pub fn from_source(path: ModulePath, source: Box<dyn ModuleSource>) -> Self {
        let mut sigs = Signatures::new();
        sigs.insert(Signature::new(path.clone()));
        Self { source, sigs, module_stack: vec![path] }
    }

    /// A self-contained database without a module source behind it.
    pub fn in_memory(path: ModulePath) -> Self {
        Self::from_source(path, Box::new(NoSource))
    }

    pub fn current_module(&self) -> &ModulePath {
        self.module_stack.last().expect("the module stack is never empty")
    }

    pub fn current(&self) -> &Signature {
        self.sigs.get(self.current_module()).expect("the current module is always loaded")
    }

    fn current_mut(&mut self) -> &mut Signature {
        let path = self.current_module().clone();
        self.sigs.get_mut(&path).expect("the current module is always loaded")
    }

    // Commands extending the signature
    //
    //

    /// Declare a new symbol. Its declared type must be sorted.
    pub fn new_symbol(&mut self, kind: SymbolKind, name: &str, typ: Exp) -> Result<IdBound, Error> {
        {
            let mut ctx = Ctx::new(&self.sigs);
            sort_of(&mut ctx, &typ)?;
        }
        trace!("Declaring symbol {}", name);
        let sig = self.current_mut();
        let bound = match kind {
            SymbolKind::Static => sig.add_static(IdBind::from_string(name), Box::new(typ)),
            SymbolKind::Definable => sig.add_definable(IdBind::from_string(name), Box::new(typ)),
        };
        Ok(bound)
    }

    /// Define a symbol: sugar for a definable symbol together with a
    /// degenerate rewrite rule of arity zero that unfolds to the body.
    pub fn define(&mut self, name: &str, typ: Option<Exp>, body: Exp) -> Result<IdBound, Error> {
        let typ = {
            let mut ctx = Ctx::new(&self.sigs);
            match typ {
                Some(typ) => {
                    sort_of(&mut ctx, &typ)?;
                    body.check(&mut ctx, &typ)?;
                    typ
                }
                None => {
                    let typ = *body.infer(&mut ctx)?;
                    sort_of(&mut ctx, &typ)?;
                    typ
                }
            }
        };
        trace!("Defining symbol {}", name);
        let sig = self.current_mut();
        let bound = sig.add_definable(IdBind::from_string(name), Box::new(typ));
        sig.attach_rule(
            name,
            Rule {
                arity: 0,
                lhs: MultiBinder::bind(vec![], vec![]),
                rhs: MultiBinder::bind(vec![], Box::new(body)),
            },
        )?;
        Ok(bound)
    }

    /// Elaborate, check and attach a batch of rewrite rules. Each rule is
    /// attached as soon as it passes the rule checker, so a later rule in
    /// the batch already sees the earlier ones.
    pub fn add_rules(&mut self, decls: Vec<RuleDecl>) -> Result<(), Error> {
        for decl in decls {
            let elab = elaborate_rule(&self.sigs, &decl)?;
            let rule = check_rule(&self.sigs, &elab)?;
            let owner = elab.sym.clone();
            let sig = self
                .sigs
                .get_mut(&owner.path)
                .ok_or_else(|| LookupError::UnknownModule { module: owner.path.to_string() })?;
            sig.attach_rule(&owner.id, rule)?;
        }
        Ok(())
    }

    // Queries
    //
    //

    pub fn infer(&self, exp: &Exp) -> Result<Box<Exp>, Error> {
        let mut ctx = Ctx::new(&self.sigs);
        Ok(exp.infer(&mut ctx)?)
    }

    pub fn check(&self, exp: &Exp, typ: &Exp) -> Result<(), Error> {
        let mut ctx = Ctx::new(&self.sigs);
        Ok(exp.check(&mut ctx, typ)?)
    }

    pub fn evaluate(&self, exp: &Exp) -> Result<Exp, Error> {
        Ok(eval(&self.sigs, exp.clone())?)
    }

    pub fn check_convertible(&self, lhs: &Exp, rhs: &Exp) -> Result<bool, Error> {
        let mut conv = unify::Ctx::new(&self.sigs, None);
        Ok(conv.eq_modulo(lhs, rhs)?.is_yes())
    }

    // Assertions
    //
    //

    pub fn assert_typing(&self, exp: &Exp, typ: &Exp) -> Result<(), Error> {
        self.assert_typing_holds(exp, typ, true)
    }

    pub fn assert_not_typing(&self, exp: &Exp, typ: &Exp) -> Result<(), Error> {
        self.assert_typing_holds(exp, typ, false)
    }

    pub fn assert_convertible(&self, lhs: &Exp, rhs: &Exp) -> Result<(), Error> {
        self.assert_convertible_holds(lhs, rhs, true)
    }

    pub fn assert_not_convertible(&self, lhs: &Exp, rhs: &Exp) -> Result<(), Error> {
        self.assert_convertible_holds(lhs, rhs, false)
    }

    fn assert_typing_holds(&self, exp: &Exp, typ: &Exp, expected: bool) -> Result<(), Error> {
        let holds = self.check(exp, typ).is_ok();
        if holds == expected {
            Ok(())
        } else {
            Err(DriverError::AssertionFailed {
                message: format!(
                    "{} {} {}",
                    exp.print_to_string(None),
                    if expected { ":" } else { "does not have type" },
                    typ.print_to_string(None)
                ),
            }
            .into())
        }
    }

    fn assert_convertible_holds(&self, lhs: &Exp, rhs: &Exp, expected: bool) -> Result<(), Error> {
        let holds = self.check_convertible(lhs, rhs)?;
        if holds == expected {
            Ok(())
        } else {
            Err(DriverError::AssertionFailed {
                message: format!(
                    "{} {} {}",
                    lhs.print_to_string(None),
                    if expected { "≡" } else { "≢" },
                    rhs.print_to_string(None)
                ),
            }
            .into())
        }
    }

    // Module loading and persistence
    //
    //

    /// Resolve a foreign module, loading it through the source on first use.
    /// Repeated calls for the same path return the cached signature.
    pub fn load_signature(&mut self, path: &ModulePath) -> Result<&Signature, Error> {
        if !self.sigs.contains(path) {
            let current = self.current_module().clone();
            let sig = self.source.load_signature(&current, path)?;
            self.sigs.insert(sig);
        }
        Ok(self.sigs.get(path).expect("the signature was just inserted"))
    }

    /// Write the signature of a loaded module to an object file.
    pub fn write_signature(&self, path: &ModulePath, file: &Path) -> Result<(), Error> {
        let sig = self
            .sigs
            .get(path)
            .ok_or_else(|| LookupError::UnknownModule { module: path.to_string() })?;
        fs::write_signature(sig, file)?;
        Ok(())
    }
}
