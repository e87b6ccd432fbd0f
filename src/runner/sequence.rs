//! Sequence executor
//!
//! A sequence runs its children strictly left to right and stops at the
//! first failure. Completed children are not rolled back.

use crate::error::TaskError;

/// Lifecycle of one sequence run
#[derive(Debug)]
pub enum SequenceState {
    Pending,
    Running(usize),
    Succeeded,
    Failed { child: String, cause: TaskError },
}

/// Drives a sequence through its states, one child at a time
#[derive(Debug)]
pub struct SequenceExecutor<'a> {
    name: &'a str,
    children: &'a [String],
    state: SequenceState,
}

impl<'a> SequenceExecutor<'a> {
    pub fn new(name: &'a str, children: &'a [String]) -> Self {
        SequenceExecutor {
            name,
            children,
            state: SequenceState::Pending,
        }
    }

    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    /// Whether the sequence reached `Succeeded` or `Failed`
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SequenceState::Succeeded | SequenceState::Failed { .. }
        )
    }

    /// Advance one transition.
    ///
    /// `run_child` is invoked exactly once per entered `Running(i)` state.
    pub fn step<F>(&mut self, run_child: &mut F)
    where
        F: FnMut(&str) -> Result<(), TaskError>,
    {
        let children = self.children;
        let state = std::mem::replace(&mut self.state, SequenceState::Pending);
        self.state = match state {
            SequenceState::Pending if children.is_empty() => SequenceState::Succeeded,
            SequenceState::Pending => SequenceState::Running(0),
            SequenceState::Running(i) => {
                let child = &children[i];
                match run_child(child) {
                    Ok(()) if i + 1 < children.len() => SequenceState::Running(i + 1),
                    Ok(()) => SequenceState::Succeeded,
                    Err(cause) => SequenceState::Failed {
                        child: child.clone(),
                        cause,
                    },
                }
            }
            finished => finished,
        };
    }

    /// Run to completion and report the outcome
    pub fn run<F>(mut self, mut run_child: F) -> Result<(), TaskError>
    where
        F: FnMut(&str) -> Result<(), TaskError>,
    {
        while !self.is_finished() {
            self.step(&mut run_child);
        }

        match self.state {
            SequenceState::Failed { child, cause } => Err(TaskError::ChildFailed {
                sequence: self.name.to_string(),
                child,
                cause: Box::new(cause),
            }),
            _ => Ok(()),
        }
    }
}
