//! Stack and queue recorders.

use std::collections::VecDeque;

use super::StepLog;
use crate::algorithm::AlgorithmId;
use crate::error::{Result, VizError};
use crate::input::ContainerOp;
use crate::step::{ContainerState, Counters, Step, StepKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discipline {
    Lifo,
    Fifo,
}

impl Discipline {
    const fn noun(self) -> &'static str {
        match self {
            Self::Lifo => "stack",
            Self::Fifo => "queue",
        }
    }
}

/// Stack kept bottom to top, queue kept front to rear.
struct LinearTape {
    discipline: Discipline,
    items: VecDeque<String>,
    last_removed: Option<String>,
    log: StepLog,
}

impl LinearTape {
    fn snapshot(&self) -> ContainerState {
        ContainerState::Linear {
            items: self.items.iter().cloned().collect(),
            last_removed: self.last_removed.clone(),
        }
    }

    fn record(&mut self, kind: StepKind, subjects: Vec<usize>, narrative: String) {
        let state = self.snapshot();
        self.log.push(kind, subjects, state, narrative);
    }

    fn apply(&mut self, op: &ContainerOp) {
        let noun = self.discipline.noun();
        match (op, self.discipline) {
            (ContainerOp::Insert(value), Discipline::Lifo) => {
                self.items.push_back(value.clone());
                self.log.count(Counters::INSERTIONS);
                let top = self.items.len() - 1;
                self.record(StepKind::Push, vec![top], format!("Push {value} onto the stack"));
            }
            (ContainerOp::Insert(value), Discipline::Fifo) => {
                self.items.push_back(value.clone());
                self.log.count(Counters::INSERTIONS);
                let rear = self.items.len() - 1;
                self.record(
                    StepKind::Enqueue,
                    vec![rear],
                    format!("Enqueue {value} at the rear"),
                );
            }
            (ContainerOp::Remove, discipline) => {
                let removed = match discipline {
                    Discipline::Lifo => self.items.pop_back(),
                    Discipline::Fifo => self.items.pop_front(),
                };
                let Some(value) = removed else {
                    let verb = if discipline == Discipline::Lifo { "pop" } else { "dequeue" };
                    self.record(
                        StepKind::NoOp,
                        Vec::new(),
                        format!("{} underflow: nothing to {verb}", capitalize(noun)),
                    );
                    return;
                };
                self.log.count(Counters::REMOVALS);
                self.last_removed = Some(value.clone());
                if discipline == Discipline::Lifo {
                    let old_top = self.items.len();
                    self.record(StepKind::Pop, vec![old_top], format!("Pop {value} off the stack"));
                } else {
                    let narrative = match self.items.front() {
                        Some(front) => format!("Dequeue {value}; {front} is now at the front"),
                        None => format!("Dequeue {value}; the queue is now empty"),
                    };
                    self.record(StepKind::Dequeue, vec![0], narrative);
                }
            }
            (ContainerOp::Peek, discipline) => {
                let (position, label) = match discipline {
                    Discipline::Lifo => (self.items.len().checked_sub(1), "Top"),
                    Discipline::Fifo => (Some(0), "Front"),
                };
                self.peek(position, label);
            }
            (ContainerOp::PeekRear, _) => {
                self.peek(self.items.len().checked_sub(1), "Rear");
            }
            (ContainerOp::Clear, _) => {
                let removed = self.items.len();
                self.items.clear();
                self.record(
                    StepKind::NoOp,
                    Vec::new(),
                    format!("Clear the {noun} ({removed} removed)"),
                );
            }
        }
    }

    fn peek(&mut self, position: Option<usize>, label: &str) {
        let noun = self.discipline.noun();
        match position.and_then(|p| self.items.get(p).map(|value| (p, value.clone()))) {
            Some((p, value)) => {
                self.record(StepKind::NoOp, vec![p], format!("{label} of the {noun} is {value}"));
            }
            None => {
                self.record(
                    StepKind::NoOp,
                    Vec::new(),
                    format!("The {noun} is empty, nothing to peek"),
                );
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

pub(super) fn run(algorithm: AlgorithmId, ops: &[ContainerOp]) -> Result<Vec<Step>> {
    let discipline = if algorithm == AlgorithmId::Stack {
        Discipline::Lifo
    } else {
        Discipline::Fifo
    };

    if discipline == Discipline::Lifo && ops.contains(&ContainerOp::PeekRear) {
        return Err(VizError::invalid_input(
            "a stack has no rear to look at",
            "Use peek/top to look at the top of the stack",
        ));
    }

    let mut tape = LinearTape {
        discipline,
        items: VecDeque::new(),
        last_removed: None,
        log: StepLog::new(&[Counters::INSERTIONS, Counters::REMOVALS]),
    };

    if ops.is_empty() {
        let noun = discipline.noun();
        tape.record(
            StepKind::NoOp,
            Vec::new(),
            format!("The {noun} is empty"),
        );
    }
    for op in ops {
        tape.apply(op);
    }
    Ok(tape.log.into_steps())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn insert(value: &str) -> ContainerOp {
        ContainerOp::Insert(value.to_string())
    }

    fn final_items(steps: &[Step]) -> Vec<String> {
        steps
            .last()
            .unwrap()
            .container_state_after
            .items()
            .unwrap()
            .to_vec()
    }

    // ------------------------------------------------------------------------
    // Stack
    // ------------------------------------------------------------------------

    #[test]
    fn test_stack_push_push_pop() {
        let steps = run(
            AlgorithmId::Stack,
            &[insert("A"), insert("B"), ContainerOp::Remove],
        )
        .unwrap();

        assert_eq!(final_items(&steps), vec!["A"]);
        let last = steps.last().unwrap();
        assert_eq!(last.kind, StepKind::Pop);
        assert_eq!(last.container_state_after.last_removed(), Some("B"));
        assert_eq!(last.counters.get(Counters::INSERTIONS), 2);
        assert_eq!(last.counters.get(Counters::REMOVALS), 1);
        // The popped position no longer exists in the snapshot.
        assert!(!last.container_state_after.contains_element(1));
    }

    #[test]
    fn test_stack_underflow_is_no_op() {
        let steps = run(AlgorithmId::Stack, &[ContainerOp::Remove]).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::NoOp);
        assert_eq!(steps[0].narrative, "Stack underflow: nothing to pop");
        assert_eq!(steps[0].counters.get(Counters::REMOVALS), 0);
    }

    #[test]
    fn test_stack_peek_targets_top() {
        let steps = run(
            AlgorithmId::Stack,
            &[insert("A"), insert("B"), ContainerOp::Peek],
        )
        .unwrap();
        let peek = steps.last().unwrap();
        assert_eq!(peek.kind, StepKind::NoOp);
        assert_eq!(peek.subject_ids, [1].into_iter().collect());
        assert_eq!(peek.narrative, "Top of the stack is B");
    }

    #[test]
    fn test_stack_rejects_peek_rear() {
        let err = run(AlgorithmId::Stack, &[insert("A"), ContainerOp::PeekRear]).unwrap_err();
        assert!(matches!(err, VizError::InvalidInputError { .. }));
    }

    // ------------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------------

    #[test]
    fn test_queue_enqueue_enqueue_dequeue() {
        let steps = run(
            AlgorithmId::Queue,
            &[insert("X"), insert("Y"), ContainerOp::Remove],
        )
        .unwrap();

        assert_eq!(final_items(&steps), vec!["Y"]);
        let last = steps.last().unwrap();
        assert_eq!(last.kind, StepKind::Dequeue);
        assert_eq!(last.container_state_after.last_removed(), Some("X"));
        assert_eq!(last.narrative, "Dequeue X; Y is now at the front");
    }

    #[test]
    fn test_queue_front_and_rear() {
        let steps = run(
            AlgorithmId::Queue,
            &[insert("X"), insert("Y"), ContainerOp::Peek, ContainerOp::PeekRear],
        )
        .unwrap();
        assert_eq!(steps[2].narrative, "Front of the queue is X");
        assert_eq!(steps[3].narrative, "Rear of the queue is Y");
        assert_eq!(steps[3].subject_ids, [1].into_iter().collect());
    }

    #[test]
    fn test_queue_underflow_and_empty_peek() {
        let steps = run(AlgorithmId::Queue, &[ContainerOp::Remove, ContainerOp::Peek]).unwrap();
        assert_eq!(steps[0].narrative, "Queue underflow: nothing to dequeue");
        assert_eq!(steps[1].narrative, "The queue is empty, nothing to peek");
    }

    #[test]
    fn test_clear_ends_empty() {
        let steps = run(
            AlgorithmId::Queue,
            &[insert("X"), insert("Y"), ContainerOp::Clear],
        )
        .unwrap();
        let last = steps.last().unwrap();
        assert_eq!(last.kind, StepKind::NoOp);
        assert!(final_items(&steps).is_empty());
        assert_eq!(last.narrative, "Clear the queue (2 removed)");
    }

    #[test]
    fn test_empty_script_yields_single_no_op() {
        for algorithm in [AlgorithmId::Stack, AlgorithmId::Queue] {
            let steps = run(algorithm, &[]).unwrap();
            assert_eq!(steps.len(), 1);
            assert_eq!(steps[0].kind, StepKind::NoOp);
            assert!(final_items(&steps).is_empty());
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("stack"), "Stack");
        assert_eq!(capitalize(""), "");
    }
}
