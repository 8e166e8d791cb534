//! Run summaries and pipeline descriptions.

use crate::evolution::driver::ReplicateState;
use crate::evolution::mating::MatingScheme;
use crate::evolution::operator::Operator;
use std::fmt;

/// Per-replicate progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicateSummary {
    pub index: usize,
    pub generation: usize,
    pub evolved: usize,
    pub active: bool,
}

/// Summary of a simulator's replicate set after an `evolve` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    replicates: Vec<ReplicateSummary>,
    stop_message: Option<String>,
}

impl RunReport {
    pub(crate) fn from_replicates(
        replicates: &[ReplicateState],
        stop_message: Option<String>,
    ) -> Self {
        Self {
            replicates: replicates
                .iter()
                .enumerate()
                .map(|(index, rep)| ReplicateSummary {
                    index,
                    generation: rep.generation(),
                    evolved: rep.evolved(),
                    active: rep.is_active(),
                })
                .collect(),
            stop_message,
        }
    }

    #[inline]
    pub fn replicates(&self) -> &[ReplicateSummary] {
        &self.replicates
    }

    /// Message carried by the global stop that ended the run, if any.
    #[inline]
    pub fn stop_message(&self) -> Option<&str> {
        self.stop_message.as_deref()
    }

    /// Cumulative generations evolved, in replicate order.
    pub fn evolved(&self) -> Vec<usize> {
        self.replicates.iter().map(|r| r.evolved).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} replicate(s):", self.replicates.len())?;
        for rep in &self.replicates {
            writeln!(
                f,
                "  replicate {}: generation {}, {} evolved, {}",
                rep.index,
                rep.generation,
                rep.evolved,
                if rep.active { "active" } else { "inactive" }
            )?;
        }
        if let Some(msg) = &self.stop_message {
            writeln!(f, "stopped: {msg}")?;
        }
        Ok(())
    }
}

/// Human-readable trace of a configured evolution pipeline. Diagnostic
/// output only; nothing parses it.
pub fn describe_pipeline(
    init_ops: &[Box<dyn Operator>],
    pre_ops: &[Box<dyn Operator>],
    mating: &dyn MatingScheme,
    post_ops: &[Box<dyn Operator>],
    final_ops: &[Box<dyn Operator>],
    generations: Option<usize>,
) -> String {
    let mut out = String::new();
    match generations {
        Some(g) => out.push_str(&format!("Evolve for {g} generation(s)\n")),
        None => out.push_str("Evolve until an operator stops the run\n"),
    }
    let stage = |out: &mut String, name: &str, ops: &[Box<dyn Operator>]| {
        if ops.is_empty() {
            return;
        }
        out.push_str(name);
        out.push('\n');
        for op in ops {
            out.push_str(&format!("  - {}\n", op.describe()));
        }
    };
    stage(&mut out, "Initial operators:", init_ops);
    stage(&mut out, "Pre-mating operators:", pre_ops);
    out.push_str(&format!("Mating: {}\n", mating.describe()));
    stage(&mut out, "Post-mating operators:", post_ops);
    stage(&mut out, "Final operators:", final_ops);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::mating::RandomMating;
    use crate::evolution::operator::{FnOperator, OpFlow, OperatorContext};
    use crate::population::Population;
    use crate::transmission::CloneTransmitter;

    #[test]
    fn test_describe_pipeline() {
        let pre: Vec<Box<dyn Operator>> = vec![Box::new(FnOperator::new(
            "cull the weak",
            |_: &mut Population, _: &OperatorContext| OpFlow::Continue,
        ))];
        let mating = RandomMating::new(Box::new(CloneTransmitter::new()));

        let text = describe_pipeline(&[], &pre, &mating, &[], &[], Some(10));
        assert!(text.contains("10 generation(s)"));
        assert!(text.contains("cull the weak"));
        assert!(text.contains("random mating with clonal inheritance"));
        assert!(!text.contains("Post-mating"));
    }
}
