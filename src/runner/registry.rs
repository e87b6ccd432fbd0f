//! Task registry
//!
//! Holds the name-to-task mapping. A sequence may only reference tasks that
//! are already registered, so the graph is acyclic by construction.

use crate::error::{GraphError, TaskError};
use crate::runner::{Reporter, SequenceExecutor};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info_span};

/// A leaf task body
pub type TaskFn<C> = Box<dyn Fn(&C) -> Result<(), TaskError>>;

/// A registered task
pub enum Task<C> {
    /// Delegates to one function
    Leaf(TaskFn<C>),

    /// Runs the named children in order, fail-fast
    Sequence(Vec<String>),
}

impl<C> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Leaf(_) => f.write_str("Leaf"),
            Task::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
        }
    }
}

/// Name-to-task mapping, generic over the environment leaves receive
pub struct Registry<C> {
    tasks: HashMap<String, Task<C>>,
    order: Vec<String>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Registry {
            tasks: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a leaf task
    pub fn register<F>(&mut self, name: &str, task: F) -> Result<(), GraphError>
    where
        F: Fn(&C) -> Result<(), TaskError> + 'static,
    {
        self.insert(name, Task::Leaf(Box::new(task)))
    }

    /// Register a composite task running `children` in order
    pub fn sequence(&mut self, name: &str, children: &[&str]) -> Result<(), GraphError> {
        if let Some(unknown) = children.iter().find(|child| !self.contains(child)) {
            return Err(GraphError::UnknownTask(unknown.to_string()));
        }
        let children = children.iter().map(|c| c.to_string()).collect();
        self.insert(name, Task::Sequence(children))
    }

    fn insert(&mut self, name: &str, task: Task<C>) -> Result<(), GraphError> {
        if self.tasks.contains_key(name) {
            return Err(GraphError::DuplicateTask(name.to_string()));
        }
        self.tasks.insert(name.to_string(), task);
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Children of a sequence; `None` for leaves and unknown names
    pub fn children(&self, name: &str) -> Option<&[String]> {
        match self.tasks.get(name)? {
            Task::Sequence(children) => Some(children),
            Task::Leaf(_) => None,
        }
    }

    /// Run a task, leaf or composite, to completion or first failure
    pub fn run(&self, name: &str, env: &C, reporter: &Reporter) -> Result<(), TaskError> {
        let task = self
            .tasks
            .get(name)
            .ok_or_else(|| GraphError::UnknownTask(name.to_string()))?;

        let span = info_span!("task", task = name);
        let _guard = span.enter();

        reporter.task_start(name);
        let result = match task {
            Task::Leaf(body) => body(env),
            Task::Sequence(children) => {
                debug!(children = ?children, "running sequence");
                SequenceExecutor::new(name, children)
                    .run(|child| self.run(child, env, reporter))
            }
        };

        match &result {
            Ok(()) => reporter.task_complete(name),
            // Sequences only relay a child's failure, which was already reported
            Err(err) if matches!(task, Task::Leaf(_)) => {
                reporter.task_failed(name, &err.to_string())
            }
            Err(_) => {}
        }

        result
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
