use super::WhereBuilder;
use crate::binding::Bindings;
use crate::condition::ConditionNode;

/// A nested condition scope handed to `or_where` / `where_nested` callbacks.
///
/// The scope starts with an empty condition sequence but allocates from the
/// parent's binding table, so names stay unique at any depth.
#[derive(Debug)]
pub struct Nested<'a> {
    nodes: Vec<ConditionNode>,
    bindings: &'a mut Bindings,
}

impl<'a> Nested<'a> {
    pub(crate) fn new(bindings: &'a mut Bindings) -> Self {
        Self {
            nodes: Vec::new(),
            bindings,
        }
    }

    /// Conditions collected in this scope.
    pub fn conditions(&self) -> &[ConditionNode] {
        &self.nodes
    }

    pub(crate) fn into_nodes(self) -> Vec<ConditionNode> {
        self.nodes
    }
}

impl WhereBuilder for Nested<'_> {
    fn parts_mut(&mut self) -> (&mut Vec<ConditionNode>, &mut Bindings) {
        (&mut self.nodes, &mut *self.bindings)
    }
}
