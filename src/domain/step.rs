//! Reveal steps of a slide.

use serde::{Deserialize, Serialize};

/// One discrete reveal state of a slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position within the slide
    pub no: usize,

    pub title: String,
}

/// Append-only list of steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepCollector {
    steps: Vec<Step>,
}

impl StepCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Its number is the position in the list.
    pub fn add(&mut self, title: impl Into<String>) {
        let no = self.steps.len() + 1;
        self.steps.push(Step {
            no,
            title: title.into(),
        });
    }

    /// The steps in append order. Empty if the slide has no steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// A slide without steps still has one state.
    pub fn step_count(&self) -> usize {
        self.steps.len().max(1)
    }
}
