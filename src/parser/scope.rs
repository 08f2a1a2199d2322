//! Bracket scopes recorded while parsing.
//!
//! Every matched `(` `)` pair becomes one [`BracketScope`]. Scopes live in an
//! arena ([`ScopeTree`]) and refer to their parent and children by
//! [`ScopeId`].

/// What a bracket pair delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    /// Grouping parenthesis, parsed as an independent sub-expression
    Group,
    /// Right operand list of `IN`
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketScope {
    pub kind: BracketKind,
    /// Offset of the opening bracket
    pub start: usize,
    /// Offset of the closing bracket, `None` while still open
    pub end: Option<usize>,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

impl BracketScope {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeTree {
    scopes: Vec<BracketScope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn open(&mut self, kind: BracketKind, parent: Option<ScopeId>, start: usize) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(BracketScope {
            kind,
            start,
            end: None,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent.and_then(|p| self.scopes.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    pub(crate) fn close(&mut self, id: ScopeId, end: usize) {
        if let Some(scope) = self.scopes.get_mut(id.0) {
            scope.end = Some(end);
        }
    }

    pub fn get(&self, id: ScopeId) -> Option<&BracketScope> {
        self.scopes.get(id.0)
    }

    /// Top-level scopes in source order.
    pub fn roots(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(_, scope)| scope.parent.is_none())
            .map(|(i, _)| ScopeId(i))
    }

    /// Number of enclosing scopes; top-level scopes have depth 0.
    pub fn depth(&self, id: ScopeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(|s| s.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(|s| s.parent);
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &BracketScope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }
}

#[test]
fn test_parent_and_children_links() {
    let mut tree = ScopeTree::new();
    let outer = tree.open(BracketKind::Group, None, 0);
    let inner = tree.open(BracketKind::List, Some(outer), 5);
    tree.close(inner, 9);

    assert_eq!(tree.get(outer).unwrap().children(), &[inner]);
    assert_eq!(tree.get(inner).unwrap().parent(), Some(outer));
    assert_eq!(tree.depth(inner), 1);
    assert!(tree.get(inner).unwrap().is_closed());
    assert!(!tree.get(outer).unwrap().is_closed());
    assert_eq!(tree.roots().collect::<Vec<_>>(), vec![outer]);
}
