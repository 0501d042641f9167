// Copyright 2025 Cornell University
// released under MIT License

use crate::encoding::flags::FlagMonitor;
use crate::encoding::{Monitor, Verdict};
use crate::errors::{CompileError, CompileResult};
use crate::ir::Automaton;

/// Independent subset encodings of the conjuncts of a specification.
/// A step updates the fragments in order and stops at the first fragment
/// without active states.
#[derive(Debug, Clone)]
pub struct FragmentedMonitor<'a> {
    fragments: Vec<FlagMonitor<'a>>,
}

impl<'a> FragmentedMonitor<'a> {
    pub fn new(automata: &'a [Automaton]) -> CompileResult<Self> {
        if automata.is_empty() {
            return Err(CompileError::configuration(
                "the fragmented encoding needs at least one automaton",
            ));
        }
        Ok(Self {
            fragments: automata.iter().map(FlagMonitor::subset).collect(),
        })
    }

    pub fn fragment(&self, index: usize) -> &FlagMonitor<'a> {
        &self.fragments[index]
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Monitor for FragmentedMonitor<'_> {
    fn step(&mut self, valuation: &[bool]) -> Verdict {
        for fragment in self.fragments.iter_mut() {
            fragment.update(valuation);
            if fragment.is_violated() {
                return Verdict::Violation;
            }
        }
        Verdict::Ok
    }

    fn reset(&mut self) {
        self.fragments.iter_mut().for_each(|f| f.reset());
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::ir::tests::{build, np, p, props};
    use crate::ir::Guard;

    fn conjuncts() -> Vec<Automaton> {
        let table = props(&["a", "b", "c"]);
        vec![
            // G !(a & b)
            build(
                1,
                &[0],
                &[(0, Guard::Or(vec![np(0), np(1)]), 0)],
                &table,
            ),
            // G (a -> X c)
            build(
                2,
                &[0],
                &[
                    (0, np(0), 0),
                    (0, p(0), 1),
                    (1, Guard::And(vec![np(0), p(2)]), 0),
                    (1, Guard::And(vec![p(0), p(2)]), 1),
                ],
                &table,
            ),
        ]
    }

    #[test]
    fn violation_iff_some_fragment_dies() {
        let automata = conjuncts();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let trace: Vec<Vec<bool>> = (0..10)
                .map(|_| (0..3).map(|_| rng.gen_bool(0.4)).collect())
                .collect();
            let mut combined = FragmentedMonitor::new(&automata).unwrap();
            let combined_verdicts = combined.run(&trace);

            let mut alone: Vec<FlagMonitor> = automata.iter().map(FlagMonitor::subset).collect();
            for (step, valuation) in trace.iter().enumerate() {
                let any = alone
                    .iter_mut()
                    .fold(false, |acc, m| m.step(valuation).is_violation() || acc);
                assert_eq!(combined_verdicts[step].is_violation(), any, "step {step} of {trace:?}");
            }
        }
    }

    #[test]
    fn later_fragments_are_not_updated_after_a_violation() {
        let automata = conjuncts();
        let mut mon = FragmentedMonitor::new(&automata).unwrap();
        assert_eq!(mon.len(), 2);
        // a & b kills the first fragment, the second one keeps its flags
        assert_eq!(mon.step(&[true, true, false]), Verdict::Violation);
        assert!(mon.fragment(1).is_active(crate::ir::StateId::from_u32(0)));
        assert!(!mon.fragment(1).is_active(crate::ir::StateId::from_u32(1)));

        mon.reset();
        assert_eq!(mon.step(&[true, false, false]), Verdict::Ok);
    }

    #[test]
    fn needs_a_fragment() {
        assert!(FragmentedMonitor::new(&[]).is_err());
    }
}
