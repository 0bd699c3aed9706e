use crate::traversal::value::ResultValue;

/// Set of document nodes the next query is applied to.
///
/// `Document` is the session root: the whole loaded page. It only appears
/// before the first selector narrows it down to element nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Context<N> {
    Document,
    Nodes(Vec<N>),
}

impl<N: Clone> Context<N> {
    pub fn len(&self) -> usize {
        match self {
            Context::Document => 1,
            Context::Nodes(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Splits the context into single-item contexts, in order.
    pub fn items(&self) -> Vec<Context<N>> {
        match self {
            Context::Document => vec![Context::Document],
            Context::Nodes(nodes) => nodes
                .iter()
                .map(|node| Context::Nodes(vec![node.clone()]))
                .collect(),
        }
    }

    pub fn first(&self) -> Option<&N> {
        match self {
            Context::Document => None,
            Context::Nodes(nodes) => nodes.first(),
        }
    }
}

impl<N> From<Vec<N>> for Context<N> {
    fn from(nodes: Vec<N>) -> Self {
        Context::Nodes(nodes)
    }
}

/// Result of applying one query: a narrowed context, or extracted data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<N> {
    Context(Context<N>),
    Data(ResultValue),
}
