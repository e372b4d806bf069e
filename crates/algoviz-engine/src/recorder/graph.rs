//! Breadth-first and depth-first traversal recorders.

use std::collections::{BTreeSet, VecDeque};

use super::StepLog;
use crate::input::{Graph, NodeId};
use crate::step::{ContainerState, Counters, Step, StepKind};

struct TraversalTape {
    visited: Vec<NodeId>,
    seen: BTreeSet<NodeId>,
    log: StepLog,
}

impl TraversalTape {
    fn new(frontier_counter: &str) -> Self {
        Self {
            visited: Vec::new(),
            seen: BTreeSet::new(),
            log: StepLog::new(&[Counters::VISITED, frontier_counter]),
        }
    }

    fn snapshot(&self, frontier: impl IntoIterator<Item = NodeId>) -> ContainerState {
        ContainerState::Traversal {
            visited: self.visited.clone(),
            frontier: frontier.into_iter().collect(),
        }
    }

    /// Appends the closing step, unless the run was a single lone visit.
    fn finish(mut self) -> Vec<Step> {
        if self.log.len() > 1 {
            let order = self
                .visited
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            let state = self.snapshot([]);
            self.log.push(
                StepKind::NoOp,
                [],
                state,
                format!("Traversal complete: {order}"),
            );
        }
        self.log.into_steps()
    }
}

pub(super) fn breadth_first(graph: &Graph, start: NodeId) -> Vec<Step> {
    let mut tape = TraversalTape::new(Counters::ENQUEUED);
    let mut queue = VecDeque::from([start]);
    tape.seen.insert(start);

    while let Some(node) = queue.pop_front() {
        tape.visited.push(node);
        tape.log.count(Counters::VISITED);
        let state = tape.snapshot(queue.iter().copied());
        tape.log
            .push(StepKind::Visit, [node], state, format!("Visit node {node}"));

        for neighbor in graph.neighbors(node) {
            if tape.seen.insert(neighbor) {
                queue.push_back(neighbor);
                tape.log.count(Counters::ENQUEUED);
                let state = tape.snapshot(queue.iter().copied());
                tape.log.push(
                    StepKind::Enqueue,
                    [neighbor],
                    state,
                    format!("Enqueue node {neighbor} (neighbor of {node})"),
                );
            }
        }
    }

    tape.finish()
}

pub(super) fn depth_first(graph: &Graph, start: NodeId) -> Vec<Step> {
    let mut tape = TraversalTape::new(Counters::PUSHED);
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if tape.seen.contains(&node) {
            let state = tape.snapshot(stack.iter().copied());
            tape.log.push(
                StepKind::NoOp,
                [node],
                state,
                format!("Skip node {node}: already visited"),
            );
            continue;
        }

        tape.seen.insert(node);
        tape.visited.push(node);
        tape.log.count(Counters::VISITED);
        let state = tape.snapshot(stack.iter().copied());
        tape.log
            .push(StepKind::Visit, [node], state, format!("Visit node {node}"));

        // Highest id goes in first so the lowest is popped next.
        for neighbor in graph.neighbors(node).rev() {
            if !tape.seen.contains(&neighbor) {
                stack.push(neighbor);
                tape.log.count(Counters::PUSHED);
                let state = tape.snapshot(stack.iter().copied());
                tape.log.push(
                    StepKind::Push,
                    [neighbor],
                    state,
                    format!("Push node {neighbor} (neighbor of {node})"),
                );
            }
        }
    }

    tape.finish()
}
