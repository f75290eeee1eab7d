//! Discrimination tree term index
//!
//! Indexed terms are flattened into their preorder symbol traversal with
//! variables collapsed to a wildcard, and stored in a trie. A query walks
//! the trie following exact symbol matches and wildcard branches, skipping
//! whole subterms where a wildcard stands for one.
//!
//! Retrieval is candidate generation only: it returns at least every
//! indexed term in the requested relation to the query (unifiable,
//! generalization, instance) and may return false positives, which the
//! caller weeds out with a real unification or matching call.

use std::collections::HashMap;

use crate::logic::clause::ClauseId;
use crate::logic::interner::SymbolId;
use crate::logic::position::Position;
use crate::logic::term::{TermBank, TermId, TermView};

/// Key of one node in the flattened preorder traversal of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlatKey {
    /// Function or constant symbol with arity (arity drives skip counts)
    Sym(SymbolId, u8),
    /// Any variable, or an opaque non-first-order subterm
    Star,
}

impl FlatKey {
    fn arity(self) -> usize {
        match self {
            FlatKey::Sym(_, a) => a as usize,
            FlatKey::Star => 0,
        }
    }
}

/// Payload attached to an indexed term occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub clause: ClauseId,
    pub literal: usize,
    pub position: Position,
}

#[derive(Debug, Default)]
struct TreeNode {
    children: HashMap<FlatKey, TreeNode>,
    /// Leaf entries: the indexed term and its payload
    entries: Vec<(TermId, IndexEntry)>,
}

/// Trie over flattened terms with unifiable / generalization / instance
/// retrieval.
#[derive(Debug, Default)]
pub struct DiscriminationTree {
    root: TreeNode,
    len: usize,
}

/// Flatten a term into preorder keys. Variables and non-first-order
/// subterms (binders, applied variables) become `Star`, which
/// over-approximates; verification happens at the caller.
fn flatten(bank: &TermBank, t: TermId, keys: &mut Vec<FlatKey>) {
    match bank.view(t) {
        TermView::Var(_, _) | TermView::Bound(_, _) | TermView::Lambda { .. } => {
            keys.push(FlatKey::Star)
        }
        TermView::Const(s, _) => keys.push(FlatKey::Sym(s, 0)),
        TermView::App { head, args } => match bank.view(head) {
            TermView::Const(s, _) => {
                keys.push(FlatKey::Sym(s, args.len() as u8));
                for &a in args {
                    flatten(bank, a, keys);
                }
            }
            _ => keys.push(FlatKey::Star),
        },
    }
}

/// Number of flat keys the subterm starting at `pos` occupies.
fn subterm_size(keys: &[FlatKey], pos: usize) -> usize {
    if pos >= keys.len() {
        return 0;
    }
    let mut size = 1;
    for _ in 0..keys[pos].arity() {
        size += subterm_size(keys, pos + size);
    }
    size
}

/// Collect every node reachable from `node` by consuming exactly `count`
/// whole terms from the trie.
fn skip_terms<'a>(node: &'a TreeNode, count: usize, out: &mut Vec<&'a TreeNode>) {
    if count == 0 {
        out.push(node);
        return;
    }
    for (key, child) in &node.children {
        skip_terms(child, count - 1 + key.arity(), out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unifiable,
    Generalizations,
    Instances,
}

impl DiscriminationTree {
    pub fn new() -> Self {
        DiscriminationTree::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Associate a payload with a term.
    pub fn insert(&mut self, bank: &TermBank, term: TermId, entry: IndexEntry) {
        let mut keys = Vec::new();
        flatten(bank, term, &mut keys);

        let mut node = &mut self.root;
        for key in keys {
            node = node.children.entry(key).or_default();
        }
        node.entries.push((term, entry));
        self.len += 1;
    }

    /// Remove one previously inserted (term, payload) association.
    pub fn remove(&mut self, bank: &TermBank, term: TermId, entry: &IndexEntry) -> bool {
        let mut keys = Vec::new();
        flatten(bank, term, &mut keys);

        let mut node = &mut self.root;
        for key in keys {
            node = match node.children.get_mut(&key) {
                Some(n) => n,
                None => return false,
            };
        }
        if let Some(i) = node
            .entries
            .iter()
            .position(|(t, e)| *t == term && e == entry)
        {
            node.entries.remove(i);
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Candidates that may unify with the query.
    pub fn retrieve_unifiable(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.retrieve(bank, query, Mode::Unifiable)
    }

    /// Candidates that may generalize the query (the indexed term is the
    /// pattern side).
    pub fn retrieve_generalizations(
        &self,
        bank: &TermBank,
        query: TermId,
    ) -> Vec<(TermId, IndexEntry)> {
        self.retrieve(bank, query, Mode::Generalizations)
    }

    /// Candidates that may be instances of the query (the query is the
    /// pattern side).
    pub fn retrieve_instances(&self, bank: &TermBank, query: TermId) -> Vec<(TermId, IndexEntry)> {
        self.retrieve(bank, query, Mode::Instances)
    }

    fn retrieve(&self, bank: &TermBank, query: TermId, mode: Mode) -> Vec<(TermId, IndexEntry)> {
        let mut keys = Vec::new();
        flatten(bank, query, &mut keys);
        let mut results = Vec::new();
        self.retrieve_rec(&self.root, &keys, 0, mode, &mut results);
        results
    }

    fn retrieve_rec(
        &self,
        node: &TreeNode,
        keys: &[FlatKey],
        pos: usize,
        mode: Mode,
        results: &mut Vec<(TermId, IndexEntry)>,
    ) {
        if pos == keys.len() {
            results.extend(node.entries.iter().cloned());
            return;
        }

        let key = keys[pos];
        match key {
            FlatKey::Star => {
                // A query variable: in unifiable and instance modes it can
                // stand for any one indexed subterm
                match mode {
                    Mode::Unifiable | Mode::Instances => {
                        let mut reached = Vec::new();
                        skip_terms(node, 1, &mut reached);
                        for n in reached {
                            self.retrieve_rec(n, keys, pos + 1, mode, results);
                        }
                    }
                    Mode::Generalizations => {
                        // Only an indexed variable generalizes a variable
                        if let Some(child) = node.children.get(&FlatKey::Star) {
                            self.retrieve_rec(child, keys, pos + 1, mode, results);
                        }
                    }
                }
            }
            FlatKey::Sym(_, _) => {
                if let Some(child) = node.children.get(&key) {
                    self.retrieve_rec(child, keys, pos + 1, mode, results);
                }
                // An indexed variable can stand for this whole query
                // subterm, except when looking for instances
                if mode != Mode::Instances {
                    if let Some(star_child) = node.children.get(&FlatKey::Star) {
                        let skip = subterm_size(keys, pos);
                        self.retrieve_rec(star_child, keys, pos + skip, mode, results);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::context::Context;

    fn entry(clause: u32) -> IndexEntry {
        IndexEntry {
            clause: ClauseId(clause),
            literal: 0,
            position: Position::root(),
        }
    }

    fn found(results: &[(TermId, IndexEntry)], clause: u32) -> bool {
        results.iter().any(|(_, e)| e.clause == ClauseId(clause))
    }

    #[test]
    fn test_insert_and_retrieve_exact() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let f = ctx.declare_fun("f", 1);
        let fa = ctx.fun(f, vec![a]).unwrap();
        let fb = ctx.fun(f, vec![b]).unwrap();

        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), fa, entry(0));

        assert!(found(&tree.retrieve_unifiable(ctx.bank(), fa), 0));
        assert!(!found(&tree.retrieve_unifiable(ctx.bank(), fb), 0));
        assert!(!found(&tree.retrieve_unifiable(ctx.bank(), b), 0));
    }

    #[test]
    fn test_indexed_variable_generalizes() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let g = ctx.declare_fun("g", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let fx = ctx.fun(f, vec![x]).unwrap();

        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), fx, entry(0));

        // f(a) and f(g(a)) are instances of the indexed f(X)
        let fa = ctx.fun(f, vec![a]).unwrap();
        let ga = ctx.fun(g, vec![a]).unwrap();
        let fga = ctx.fun(f, vec![ga]).unwrap();
        assert!(found(&tree.retrieve_generalizations(ctx.bank(), fa), 0));
        assert!(found(&tree.retrieve_generalizations(ctx.bank(), fga), 0));
        assert!(found(&tree.retrieve_unifiable(ctx.bank(), fa), 0));
        // but g(a) is not
        assert!(!found(&tree.retrieve_generalizations(ctx.bank(), ga), 0));
    }

    #[test]
    fn test_instances_mode() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 1);
        let x = ctx.var(0);
        let a = ctx.parse_const("a");
        let fa = ctx.fun(f, vec![a]).unwrap();
        let fx = ctx.fun(f, vec![x]).unwrap();

        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), fa, entry(0));
        tree.insert(ctx.bank(), fx, entry(1));

        // Instances of f(X): both f(a) and f(X) itself
        let instances = tree.retrieve_instances(ctx.bank(), fx);
        assert!(found(&instances, 0));
        assert!(found(&instances, 1));

        // Instances of f(a): only f(a); the indexed f(X) is more general
        let instances = tree.retrieve_instances(ctx.bank(), fa);
        assert!(found(&instances, 0));
        assert!(!found(&instances, 1));

        // Generalizations of f(a): both
        let gens = tree.retrieve_generalizations(ctx.bank(), fa);
        assert!(found(&gens, 0));
        assert!(found(&gens, 1));
    }

    #[test]
    fn test_query_variable_unifies_with_anything() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 2);
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");
        let fab = ctx.fun(f, vec![a, b]).unwrap();

        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), fab, entry(0));
        tree.insert(ctx.bank(), a, entry(1));

        let y = ctx.var(9);
        let results = tree.retrieve_unifiable(ctx.bank(), y);
        assert!(found(&results, 0));
        assert!(found(&results, 1));

        // A variable query has no generalizations except variables
        let gens = tree.retrieve_generalizations(ctx.bank(), y);
        assert!(gens.is_empty());
    }

    #[test]
    fn test_skip_counts_nested_terms() {
        let mut ctx = Context::new();
        let f = ctx.declare_fun("f", 2);
        let g = ctx.declare_fun("g", 1);
        let x = ctx.var(0);
        let y = ctx.var(1);
        let a = ctx.parse_const("a");
        let b = ctx.parse_const("b");

        // Index f(X, b)
        let f_x_b = ctx.fun(f, vec![x, b]).unwrap();
        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), f_x_b, entry(0));

        // Query f(g(g(a)), b): the star must skip the whole nested term
        let ga = ctx.fun(g, vec![a]).unwrap();
        let gga = ctx.fun(g, vec![ga]).unwrap();
        let query = ctx.fun(f, vec![gga, b]).unwrap();
        assert!(found(&tree.retrieve_generalizations(ctx.bank(), query), 0));

        // Query f(g(g(a)), a) differs in the second argument
        let query2 = ctx.fun(f, vec![gga, a]).unwrap();
        assert!(!found(&tree.retrieve_generalizations(ctx.bank(), query2), 0));

        // Query f(Y, b) must skip one indexed subterm (the star)
        let query3 = ctx.fun(f, vec![y, b]).unwrap();
        assert!(found(&tree.retrieve_unifiable(ctx.bank(), query3), 0));
    }

    #[test]
    fn test_remove() {
        let mut ctx = Context::new();
        let a = ctx.parse_const("a");

        let mut tree = DiscriminationTree::new();
        tree.insert(ctx.bank(), a, entry(0));
        tree.insert(ctx.bank(), a, entry(1));
        assert_eq!(tree.len(), 2);

        assert!(tree.remove(ctx.bank(), a, &entry(0)));
        assert!(!tree.remove(ctx.bank(), a, &entry(0)));
        assert_eq!(tree.len(), 1);

        let results = tree.retrieve_unifiable(ctx.bank(), a);
        assert!(!found(&results, 0));
        assert!(found(&results, 1));
    }
}
