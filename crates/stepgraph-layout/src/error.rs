#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("cycle detected at node `{node}` after {enqueued} re-enqueues")]
    CycleDetected {
        node: String,
        enqueued: usize,
        /// Members of the offending cycle, in node insertion order.
        cycle: Vec<String>,
    },

    #[error("cycle detected: {} node(s) are not reachable from any source", nodes.len())]
    Unreachable { nodes: Vec<String> },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
