//! Pipelines of deployment steps
//!
//! A pipeline is an ordered list of named steps. Steps run one at a time and
//! the first failure stops the pipeline.

use crate::error::Result;
use crate::runner::Context;
use std::time::Instant;

/// Function run by a step
pub type StepFn = fn(&mut Context) -> Result<()>;

/// A single named step
#[derive(Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    pub run: StepFn,
}

impl Step {
    pub fn new(name: &'static str, run: StepFn) -> Self {
        Step { name, run }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// Ordered list of steps
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Pipeline {
            name: name.into(),
            steps,
        }
    }

    /// Append another pipeline's steps after this one's
    pub fn then(mut self, next: Pipeline) -> Self {
        self.name = format!("{} + {}", self.name, next.name);
        self.steps.extend(next.steps);
        self
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Run every step in order
    pub fn execute(&self, ctx: &mut Context) -> Result<()> {
        let started = Instant::now();
        let total = self.steps.len();
        ctx.print_debug(&format!("Running pipeline: {}", self.name));

        for (i, step) in self.steps.iter().enumerate() {
            ctx.print_step_start(i + 1, total, step.name);
            let step_started = Instant::now();

            if let Err(e) = (step.run)(ctx) {
                tracing::debug!(step = step.name, error = %e, "step failed");
                return Err(e);
            }

            tracing::debug!(step = step.name, elapsed = ?step_started.elapsed(), "step finished");
        }

        ctx.print_info(&format!(
            "Finished {} in {}s",
            self.name,
            started.elapsed().as_secs()
        ));
        Ok(())
    }
}
