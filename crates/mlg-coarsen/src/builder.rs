//! The builder (spec §4.9): parses a coarsening plan string into a FIFO
//! queue of [`NeighborCoarsener`] runs and executes them in order.

use mlg_core::{Error, Id, Result};
use mlg_store::StoreAdapter;

use crate::coarsener::NeighborCoarsener;
use crate::merger::AdditiveMerger;
use crate::selector::{HeavyHLinkSelector, XSelector};

/// Which selector family a plan step names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    HeavyHLink,
    X,
}

/// One `(selector, fraction)` step in a parsed plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStep {
    pub kind: SelectorKind,
    pub memory: bool,
    pub fraction: f64,
}

fn parse_name(name: &str) -> Result<(SelectorKind, bool)> {
    match name {
        "Hs" => Ok((SelectorKind::HeavyHLink, false)),
        "Hm" => Ok((SelectorKind::HeavyHLink, true)),
        "Xs" => Ok((SelectorKind::X, false)),
        "Xm" => Ok((SelectorKind::X, true)),
        other => Err(Error::invalid_argument(format!(
            "unknown coarsener step name '{other}'"
        ))),
    }
}

/// Parses a plan string into a strictly-fraction-increasing sequence of
/// steps. On any malformed token or fraction-ordering violation, returns
/// an error (the caller is expected to drop whatever it had queued).
pub fn parse_plan(input: &str) -> Result<Vec<PlanStep>> {
    let mut steps = Vec::new();
    let mut last_fraction = f64::NEG_INFINITY;

    for token in input.split_whitespace() {
        let token_trimmed = token
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .or_else(|| token.strip_prefix('(').and_then(|s| s.strip_suffix(')')))
            .unwrap_or(token);

        let (name, fractions_str) = token_trimmed.split_once(':').ok_or_else(|| {
            Error::invalid_argument(format!("malformed plan step '{token}' (missing ':')"))
        })?;
        let (kind, memory) = parse_name(name)?;

        // brackets may instead wrap just the fraction list, e.g. "Hs:[0.1,0.3]"
        let fractions_str = fractions_str
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .or_else(|| fractions_str.strip_prefix('(').and_then(|s| s.strip_suffix(')')))
            .unwrap_or(fractions_str);

        for frac_str in fractions_str.split(',') {
            let fraction: f64 = frac_str.trim().parse().map_err(|_| {
                Error::invalid_argument(format!("malformed fraction '{frac_str}' in '{token}'"))
            })?;
            if fraction <= last_fraction {
                return Err(Error::invalid_argument(format!(
                    "plan fractions must strictly increase, got {fraction} after {last_fraction}"
                )));
            }
            last_fraction = fraction;
            steps.push(PlanStep {
                kind,
                memory,
                fraction,
            });
        }
    }
    Ok(steps)
}

/// Dequeues and runs [`PlanStep`]s FIFO, each as its own
/// `NeighborCoarsener` with the additive merger. A parse or run failure
/// clears the remaining queue and surfaces the error.
#[derive(Debug, Default)]
pub struct Builder {
    queue: Vec<PlanStep>,
}

impl Builder {
    pub fn new() -> Self {
        Builder { queue: Vec::new() }
    }

    /// Parses `plan` and replaces the queue with its steps. Clears the
    /// queue (rather than leaving stale state) on a parse error.
    pub fn load(&mut self, plan: &str) -> Result<()> {
        match parse_plan(plan) {
            Ok(steps) => {
                self.queue = steps;
                Ok(())
            }
            Err(e) => {
                self.queue.clear();
                Err(e)
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Runs every queued step in order, returning the final top layer.
    /// Any failure clears the remaining queue and surfaces the error.
    pub fn run(&mut self, store: &mut dyn StoreAdapter) -> Result<Id> {
        let mut last_top = Id::INVALID;
        while !self.queue.is_empty() {
            let step = self.queue.remove(0);
            let result = match step.kind {
                SelectorKind::HeavyHLink => NeighborCoarsener::new(
                    HeavyHLinkSelector::new(step.memory),
                    AdditiveMerger::new(),
                    step.fraction,
                )
                .run(store),
                SelectorKind::X => NeighborCoarsener::new(
                    XSelector::new(step.memory),
                    AdditiveMerger::new(),
                    step.fraction,
                )
                .run(store),
            };
            match result {
                Ok(top) => last_top = top,
                Err(e) => {
                    self.queue.clear();
                    return Err(e);
                }
            }
        }
        Ok(last_top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_step_with_multiple_fractions() {
        let steps = parse_plan("Hs:0.1,0.5").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].kind, SelectorKind::HeavyHLink);
        assert_eq!(steps[0].fraction, 0.1);
        assert_eq!(steps[1].fraction, 0.5);
    }

    #[test]
    fn parses_multiple_steps_and_brackets() {
        let steps = parse_plan("[Hs:0.1] Xm:0.5,0.9").unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].kind, SelectorKind::X);
        assert!(steps[1].memory);
    }

    #[test]
    fn non_increasing_fraction_is_rejected() {
        assert!(parse_plan("Hs:0.5,0.4").is_err());
        assert!(parse_plan("Hs:0.5 Xm:0.5").is_err());
    }

    #[test]
    fn unknown_step_name_is_rejected() {
        assert!(parse_plan("Zz:0.1").is_err());
    }

    #[test]
    fn load_failure_clears_any_stale_queue() {
        let mut b = Builder::new();
        b.load("Hs:0.1,0.5").unwrap();
        assert_eq!(b.pending(), 2);
        assert!(b.load("Hs:0.5,0.1").is_err());
        assert_eq!(b.pending(), 0);
    }
}
