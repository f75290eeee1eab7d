//! The logical context: interners and banks owned by one prover instance
//!
//! All constructors take the context explicitly; there is no global state,
//! so a process can host several independent prover instances and clear
//! the tables between problems.

use super::interner::{Interner, Signature, SignatureConflict, SymbolAttrs, SymbolId};
use super::literal::Literal;
use super::substitution::{Renaming, Scope, Scoped, Substitution};
use super::term::{TermBank, TermError, TermId, TermView, VarId};
use super::types::{TypeBank, TypeId};

/// Handles to the builtin symbols and types of the base signature.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    /// The type of individuals ($i)
    pub indiv: TypeId,
    /// The type of booleans ($o)
    pub bool_ty: TypeId,
    pub true_sym: SymbolId,
    pub false_sym: SymbolId,
    pub not_sym: SymbolId,
    pub and_sym: SymbolId,
    pub or_sym: SymbolId,
    pub imply_sym: SymbolId,
    pub eq_sym: SymbolId,
    pub forall_sym: SymbolId,
    pub exists_sym: SymbolId,
    /// The interned term `$true`, right side of encoded predicate atoms
    pub top: TermId,
    /// The interned term `$false`
    pub bottom: TermId,
}

/// Symbol, type and term interners plus the signature, bundled per prover
/// instance.
#[derive(Debug, Clone)]
pub struct Context {
    pub symbols: Interner,
    pub types: TypeBank,
    pub terms: TermBank,
    pub signature: Signature,
    builtins: Builtins,
}

impl Context {
    /// A context with the base signature installed: the builtin
    /// connectives and the $i / $o type constants.
    pub fn new() -> Self {
        let mut symbols = Interner::new();
        let mut types = TypeBank::new();
        let mut terms = TermBank::new();
        let mut signature = Signature::new();

        let indiv = types.atom(symbols.intern("$i"));
        let bool_ty = types.atom(symbols.intern("$o"));

        let true_sym = symbols.intern("$true");
        let false_sym = symbols.intern("$false");
        let not_sym = symbols.intern("~");
        let and_sym = symbols.intern_with_attrs("&", SymbolAttrs::AC.union(SymbolAttrs::INFIX));
        let or_sym = symbols.intern_with_attrs("|", SymbolAttrs::AC.union(SymbolAttrs::INFIX));
        let imply_sym = symbols.intern_with_attrs("=>", SymbolAttrs::INFIX);
        let eq_sym = symbols.intern_with_attrs("=", SymbolAttrs::COMMUTATIVE.union(SymbolAttrs::INFIX));
        let forall_sym = symbols.intern_with_attrs("!", SymbolAttrs::BINDER);
        let exists_sym = symbols.intern_with_attrs("?", SymbolAttrs::BINDER);

        let unary_o = types.function(vec![bool_ty], bool_ty);
        let binary_o = types.function(vec![bool_ty, bool_ty], bool_ty);
        let eq_ty = types.function(vec![indiv, indiv], bool_ty);
        let pred_body = types.function(vec![indiv], bool_ty);
        let binder_ty = types.function(vec![pred_body], bool_ty);

        // The base signature never conflicts with itself
        let _ = signature.declare(true_sym, bool_ty);
        let _ = signature.declare(false_sym, bool_ty);
        let _ = signature.declare(not_sym, unary_o);
        let _ = signature.declare(and_sym, binary_o);
        let _ = signature.declare(or_sym, binary_o);
        let _ = signature.declare(imply_sym, binary_o);
        let _ = signature.declare(eq_sym, eq_ty);
        let _ = signature.declare(forall_sym, binder_ty);
        let _ = signature.declare(exists_sym, binder_ty);

        let top = terms.cst(true_sym, bool_ty);
        let bottom = terms.cst(false_sym, bool_ty);

        Context {
            symbols,
            types,
            terms,
            signature,
            builtins: Builtins {
                indiv,
                bool_ty,
                true_sym,
                false_sym,
                not_sym,
                and_sym,
                or_sym,
                imply_sym,
                eq_sym,
                forall_sym,
                exists_sym,
                top,
                bottom,
            },
        }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// The `$true` term closing encoded predicate atoms
    pub fn top(&self) -> TermId {
        self.builtins.top
    }

    /// The type of individuals
    pub fn indiv(&self) -> TypeId {
        self.builtins.indiv
    }

    /// The type of booleans
    pub fn bool_ty(&self) -> TypeId {
        self.builtins.bool_ty
    }

    /// Immutable view of the term bank
    pub fn bank(&self) -> &TermBank {
        &self.terms
    }

    // === Declarations ===

    /// Declare a function symbol over individuals with the given arity.
    pub fn declare_fun(&mut self, name: &str, arity: usize) -> SymbolId {
        let sym = self.symbols.intern(name);
        let ty = self
            .types
            .function(vec![self.builtins.indiv; arity], self.builtins.indiv);
        // Redeclaration with the same arity is idempotent; a caller that
        // wants conflict detection goes through `declare`
        let _ = self.signature.declare(sym, ty);
        sym
    }

    /// Declare a predicate symbol over individuals with the given arity.
    pub fn declare_pred(&mut self, name: &str, arity: usize) -> SymbolId {
        let sym = self.symbols.intern(name);
        let ty = self
            .types
            .function(vec![self.builtins.indiv; arity], self.builtins.bool_ty);
        let _ = self.signature.declare(sym, ty);
        sym
    }

    /// Declare a symbol with an explicit type, surfacing conflicts.
    pub fn declare(&mut self, name: &str, ty: TypeId) -> Result<SymbolId, SignatureConflict> {
        let sym = self.symbols.intern(name);
        self.signature.declare(sym, ty)?;
        Ok(sym)
    }

    // === Term construction ===

    /// A free variable of individual type
    pub fn var(&mut self, id: u32) -> TermId {
        self.terms.var(VarId(id), self.builtins.indiv)
    }

    /// A free variable with an explicit type
    pub fn var_typed(&mut self, id: u32, ty: TypeId) -> TermId {
        self.terms.var(VarId(id), ty)
    }

    /// An individual constant, declared on first use
    pub fn parse_const(&mut self, name: &str) -> TermId {
        let sym = self.declare_fun(name, 0);
        self.terms.cst(sym, self.builtins.indiv)
    }

    /// Apply a declared function symbol to arguments
    pub fn fun(&mut self, sym: SymbolId, args: Vec<TermId>) -> Result<TermId, TermError> {
        let ty = self
            .signature
            .type_of(sym)
            .unwrap_or(self.builtins.indiv);
        let head = self.terms.cst(sym, ty);
        self.terms.app(&self.types, head, args)
    }

    /// Apply a declared predicate symbol to arguments, yielding an atom
    /// (a boolean-typed term)
    pub fn atom(&mut self, sym: SymbolId, args: Vec<TermId>) -> Result<TermId, TermError> {
        self.fun(sym, args)
    }

    /// Encode a signed propositional atom as a literal `atom = $true`
    pub fn prop(&mut self, atom: TermId, positive: bool) -> Literal {
        Literal::new(positive, atom, self.builtins.top)
    }

    // === Substitution application ===

    /// Materialize a scoped term under a substitution, renaming the free
    /// variables that survive through `renaming`. Ground subtrees are
    /// returned as-is without rebuilding.
    pub fn apply_subst(
        &mut self,
        subst: &Substitution,
        renaming: &mut Renaming,
        t: Scoped<TermId>,
    ) -> TermId {
        if self.terms.is_ground(t.0) {
            return t.0;
        }
        let t = subst.resolve(&self.terms, t);
        match self.terms.view(t.0) {
            TermView::Var(v, ty) => {
                let fresh = renaming.rename(Scoped(v, t.1));
                self.terms.var(fresh, ty)
            }
            TermView::Bound(_, _) | TermView::Const(_, _) => t.0,
            TermView::App { head, args } => {
                let ty = self.terms.ty(t.0);
                let args: Vec<TermId> = args.to_vec();
                let new_head = self.apply_subst(subst, renaming, Scoped(head, t.1));
                let mut new_args = Vec::with_capacity(args.len());
                for a in args {
                    new_args.push(self.apply_subst(subst, renaming, Scoped(a, t.1)));
                }
                self.terms.app_unchecked(new_head, new_args, ty)
            }
            TermView::Lambda { arg, body } => {
                // Bindings substitute closed terms for free variables, so
                // nothing is captured by the binder
                let new_body = self.apply_subst(subst, renaming, Scoped(body, t.1));
                self.terms.lambda(&mut self.types, arg, new_body)
            }
        }
    }

    /// Apply a substitution to a whole literal at the given scope.
    pub fn apply_literal(
        &mut self,
        subst: &Substitution,
        renaming: &mut Renaming,
        lit: &Literal,
        scope: Scope,
    ) -> Literal {
        Literal {
            left: self.apply_subst(subst, renaming, Scoped(lit.left, scope)),
            right: self.apply_subst(subst, renaming, Scoped(lit.right, scope)),
            positive: lit.positive,
        }
    }

    /// Drop all interned data. Existing handles become dangling.
    pub fn clear(&mut self) {
        *self = Context::new();
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}
