//! Bubble, selection and insertion sort recorders.
//!
//! All three compare with a strict greater-than, so equal values never swap.

use std::collections::BTreeSet;

use super::StepLog;
use crate::step::{ContainerState, Counters, ElementId, Step, StepKind};

/// The array being sorted plus the indices already in their final position.
struct SortTape {
    values: Vec<i64>,
    sorted: BTreeSet<ElementId>,
    log: StepLog,
}

impl SortTape {
    fn new(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
            sorted: BTreeSet::new(),
            log: StepLog::new(&[Counters::COMPARISONS, Counters::SWAPS]),
        }
    }

    fn snapshot(&self) -> ContainerState {
        ContainerState::Array {
            values: self.values.clone(),
            sorted: self.sorted.clone(),
        }
    }

    /// Records a comparison and returns `true` if `values[a] > values[b]`.
    fn compare(&mut self, a: usize, b: usize, narrative: String) -> bool {
        self.log.count(Counters::COMPARISONS);
        let state = self.snapshot();
        self.log.push(StepKind::Compare, [a, b], state, narrative);
        self.values[a] > self.values[b]
    }

    fn swap(&mut self, a: usize, b: usize) {
        let (left, right) = (self.values[a], self.values[b]);
        self.values.swap(a, b);
        self.log.count(Counters::SWAPS);
        let state = self.snapshot();
        self.log.push(
            StepKind::Swap,
            [a, b],
            state,
            format!("Swap {left} and {right}"),
        );
    }

    fn mark_sorted(&mut self, indices: impl IntoIterator<Item = usize>, narrative: String) {
        let indices: Vec<usize> = indices.into_iter().collect();
        if indices.is_empty() {
            return;
        }
        self.sorted.extend(indices.iter().copied());
        let state = self.snapshot();
        self.log.push(StepKind::MarkSorted, indices, state, narrative);
    }

    /// Handles arrays with fewer than two elements. Returns `true` if done.
    fn trivial(&mut self) -> bool {
        let n = self.values.len();
        if n > 1 {
            return false;
        }
        self.sorted.extend(0..n);
        let state = self.snapshot();
        let narrative = if n == 0 {
            "The array is empty, nothing to sort".to_string()
        } else {
            format!("A single element ({}) is already sorted", self.values[0])
        };
        self.log.push(StepKind::MarkSorted, 0..n, state, narrative);
        true
    }

    fn into_steps(self) -> Vec<Step> {
        self.log.into_steps()
    }
}

pub(super) fn bubble_sort(values: &[i64]) -> Vec<Step> {
    let mut tape = SortTape::new(values);
    if tape.trivial() {
        return tape.into_steps();
    }

    let n = tape.values.len();
    let mut finished_early = false;
    for pass in 0..n - 1 {
        let mut swapped = false;
        for j in 0..n - 1 - pass {
            let narrative = format!("Compare {} and {}", tape.values[j], tape.values[j + 1]);
            if tape.compare(j, j + 1, narrative) {
                tape.swap(j, j + 1);
                swapped = true;
            }
        }

        let settled = n - 1 - pass;
        let narrative = format!(
            "Pass {} done: {} is in its final position",
            pass + 1,
            tape.values[settled]
        );
        tape.mark_sorted([settled], narrative);

        if !swapped {
            tape.mark_sorted(
                0..settled,
                "No swaps in this pass, so the rest of the array is already sorted".to_string(),
            );
            finished_early = true;
            break;
        }
    }

    if !finished_early {
        let narrative = format!("{} is in its final position", tape.values[0]);
        tape.mark_sorted([0], narrative);
    }
    tape.into_steps()
}

pub(super) fn selection_sort(values: &[i64]) -> Vec<Step> {
    let mut tape = SortTape::new(values);
    if tape.trivial() {
        return tape.into_steps();
    }

    let n = tape.values.len();
    for i in 0..n - 1 {
        let mut min = i;
        for j in i + 1..n {
            let narrative = format!(
                "Compare {} with the current minimum {}",
                tape.values[j], tape.values[min]
            );
            if tape.compare(min, j, narrative) {
                min = j;
            }
        }
        if min != i {
            tape.swap(i, min);
        }
        let narrative = format!("{} is in its final position", tape.values[i]);
        tape.mark_sorted([i], narrative);
    }

    let narrative = format!("{} is in its final position", tape.values[n - 1]);
    tape.mark_sorted([n - 1], narrative);
    tape.into_steps()
}

pub(super) fn insertion_sort(values: &[i64]) -> Vec<Step> {
    let mut tape = SortTape::new(values);
    if tape.trivial() {
        return tape.into_steps();
    }

    let n = tape.values.len();
    for i in 1..n {
        let mut j = i;
        while j > 0 {
            let narrative = format!("Compare {} and {}", tape.values[j - 1], tape.values[j]);
            if !tape.compare(j - 1, j, narrative) {
                break;
            }
            tape.swap(j - 1, j);
            j -= 1;
        }
    }

    tape.mark_sorted(0..n, "Every element is in its final position".to_string());
    tape.into_steps()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    type Recorder = fn(&[i64]) -> Vec<Step>;

    const RECORDERS: [(&str, Recorder); 3] = [
        ("bubble", bubble_sort),
        ("selection", selection_sort),
        ("insertion", insertion_sort),
    ];

    fn final_values(steps: &[Step]) -> Vec<i64> {
        steps
            .last()
            .unwrap()
            .container_state_after
            .values()
            .unwrap()
            .to_vec()
    }

    fn final_sorted(steps: &[Step]) -> BTreeSet<ElementId> {
        match &steps.last().unwrap().container_state_after {
            ContainerState::Array { sorted, .. } => sorted.clone(),
            other => panic!("expected array state, got {other:?}"),
        }
    }

    fn edge_inputs() -> Vec<Vec<i64>> {
        vec![
            vec![],
            vec![7],
            vec![4, 4, 4, 4],
            vec![1, 2, 3, 4, 5],
            vec![5, 4, 3, 2, 1],
            vec![3, -1, 3, 0, -7, 12, 3],
            vec![2, 1],
            vec![i64::MAX, i64::MIN, 0],
        ]
    }

    // ------------------------------------------------------------------------
    // Properties shared by every sort
    // ------------------------------------------------------------------------

    #[test]
    fn test_final_state_is_sorted_permutation() {
        for (name, recorder) in RECORDERS {
            for input in edge_inputs() {
                let steps = recorder(&input);
                assert!(!steps.is_empty(), "{name} produced no steps for {input:?}");

                let mut expected = input.clone();
                expected.sort_unstable();
                assert_eq!(final_values(&steps), expected, "{name} on {input:?}");
                assert_eq!(
                    final_sorted(&steps),
                    (0..input.len()).collect(),
                    "{name} left indices unmarked on {input:?}"
                );
            }
        }
    }

    #[test]
    fn test_counters_never_decrease() {
        for (name, recorder) in RECORDERS {
            for input in edge_inputs() {
                let steps = recorder(&input);
                for pair in steps.windows(2) {
                    for counter in [Counters::COMPARISONS, Counters::SWAPS] {
                        assert!(
                            pair[1].counters.get(counter) >= pair[0].counters.get(counter),
                            "{name} decreased {counter} on {input:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_equal_elements_never_swap() {
        for (name, recorder) in RECORDERS {
            let steps = recorder(&[4, 4, 4, 4]);
            assert!(
                steps.iter().all(|step| step.kind != StepKind::Swap),
                "{name} swapped equal elements"
            );
        }
    }

    #[test]
    fn test_trivial_arrays_yield_single_mark_sorted() {
        for (_, recorder) in RECORDERS {
            for input in [vec![], vec![42]] {
                let steps = recorder(&input);
                assert_eq!(steps.len(), 1);
                assert_eq!(steps[0].kind, StepKind::MarkSorted);
            }
        }
    }

    #[test]
    fn test_recording_is_deterministic() {
        for (_, recorder) in RECORDERS {
            let input = vec![9, 2, 7, 2, 5];
            assert_eq!(recorder(&input), recorder(&input));
        }
    }

    // ------------------------------------------------------------------------
    // Bubble sort
    // ------------------------------------------------------------------------

    #[test]
    fn test_bubble_sort_three_elements() {
        let steps = bubble_sort(&[5, 3, 1]);
        assert_eq!(final_values(&steps), vec![1, 3, 5]);

        let last = steps.last().unwrap();
        assert_eq!(last.counters.get(Counters::SWAPS), 3);
        assert_eq!(last.counters.get(Counters::COMPARISONS), 3);

        let kinds: Vec<StepKind> = steps.iter().map(|step| step.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Compare,
                StepKind::Swap,
                StepKind::Compare,
                StepKind::Swap,
                StepKind::MarkSorted,
                StepKind::Compare,
                StepKind::Swap,
                StepKind::MarkSorted,
                StepKind::MarkSorted,
            ]
        );
        assert_eq!(steps[0].narrative, "Compare 5 and 3");
        assert_eq!(steps[1].narrative, "Swap 5 and 3");
    }

    #[test]
    fn test_bubble_sort_exits_early_on_sorted_input() {
        let steps = bubble_sort(&[1, 2, 3, 4]);
        let last = steps.last().unwrap();
        assert_eq!(last.counters.get(Counters::COMPARISONS), 3);
        assert_eq!(last.counters.get(Counters::SWAPS), 0);
        assert_eq!(last.kind, StepKind::MarkSorted);
        assert_eq!(last.subject_ids, [0, 1, 2].into_iter().collect());
    }

    #[test]
    fn test_bubble_sort_pass_marks_largest() {
        let steps = bubble_sort(&[3, 1, 2]);
        let first_mark = steps
            .iter()
            .find(|step| step.kind == StepKind::MarkSorted)
            .unwrap();
        assert_eq!(first_mark.subject_ids, [2].into_iter().collect());
        assert_eq!(first_mark.container_state_after.values().unwrap()[2], 3);
    }

    // ------------------------------------------------------------------------
    // Selection sort
    // ------------------------------------------------------------------------

    #[test]
    fn test_selection_sort_swaps_only_when_minimum_moves() {
        let steps = selection_sort(&[1, 3, 2]);
        let last = steps.last().unwrap();
        // 2 + 1 comparisons, one swap (3 <-> 2).
        assert_eq!(last.counters.get(Counters::COMPARISONS), 3);
        assert_eq!(last.counters.get(Counters::SWAPS), 1);
    }

    #[test]
    fn test_selection_sort_keeps_first_minimum_among_equals() {
        let steps = selection_sort(&[2, 1, 1]);
        let swap = steps
            .iter()
            .find(|step| step.kind == StepKind::Swap)
            .unwrap();
        assert_eq!(swap.subject_ids, [0, 1].into_iter().collect());
    }

    // ------------------------------------------------------------------------
    // Insertion sort
    // ------------------------------------------------------------------------

    #[test]
    fn test_insertion_sort_counts() {
        let steps = insertion_sort(&[3, 2, 1]);
        let last = steps.last().unwrap();
        assert_eq!(last.counters.get(Counters::COMPARISONS), 3);
        assert_eq!(last.counters.get(Counters::SWAPS), 3);
        assert_eq!(last.kind, StepKind::MarkSorted);
        assert_eq!(last.subject_ids.len(), 3);
    }

    #[test]
    fn test_insertion_sort_stops_at_smaller_neighbor() {
        let steps = insertion_sort(&[1, 2, 3]);
        let last = steps.last().unwrap();
        assert_eq!(last.counters.get(Counters::COMPARISONS), 2);
        assert_eq!(last.counters.get(Counters::SWAPS), 0);
    }
}
