//! Error types for sitepipe

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sitepipe operations
pub type Result<T> = std::result::Result<T, SiteError>;

/// Main error type for sitepipe
#[derive(Error, Debug)]
pub enum SiteError {
    /// Project descriptor errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task graph misconfiguration
    #[error("Task graph error: {0}")]
    Graph(#[from] GraphError),

    /// A task failed while running
    #[error("{0}")]
    Task(#[from] TaskError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SiteError {
    /// Process exit code for this error.
    ///
    /// A tool that exited with a code propagates it; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            SiteError::Task(err) => err.exit_code(),
            _ => 1,
        }
    }
}

/// Project descriptor discovery and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find project descriptor (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

/// Task registry errors, raised while the graph is declared
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Task '{0}' is not defined")]
    UnknownTask(String),
}

/// Failure of a leaf or composite task
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Lint failed ({linter}, {count} file(s) checked): {source}")]
    LintViolation {
        linter: &'static str,
        count: usize,
        #[source]
        source: ToolError,
    },

    #[error("Compilation failed ({count} file(s)): {source}")]
    CompileError {
        count: usize,
        #[source]
        source: ToolError,
    },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Deploy failed: {0}")]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Task graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("'{sequence}' failed at '{child}': {cause}")]
    ChildFailed {
        sequence: String,
        child: String,
        #[source]
        cause: Box<TaskError>,
    },
}

impl TaskError {
    /// Build an I/O error bound to the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TaskError::Io {
            path: path.into(),
            source,
        }
    }

    /// The leaf failure underneath any number of sequence layers
    pub fn root_cause(&self) -> &TaskError {
        let mut err = self;
        while let TaskError::ChildFailed { cause, .. } = err {
            err = cause;
        }
        err
    }

    /// Name of the leaf task that failed, if this error came from a sequence
    pub fn failed_leaf(&self) -> Option<&str> {
        let mut leaf = None;
        let mut err = self;
        while let TaskError::ChildFailed { child, cause, .. } = err {
            leaf = Some(child.as_str());
            err = cause;
        }
        leaf
    }

    pub fn exit_code(&self) -> i32 {
        let tool_err = match self.root_cause() {
            TaskError::Tool(source)
            | TaskError::LintViolation { source, .. }
            | TaskError::CompileError { source, .. } => source,
            _ => return 1,
        };
        match tool_err {
            ToolError::Failed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Deployment failures
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("credential variable '{0}' is not set")]
    MissingCredential(String),

    #[error("publishing to project '{project}' failed: {source}")]
    PublishFailed {
        project: String,
        #[source]
        source: ToolError,
    },
}

/// External tool invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} exited with code {code:?}")]
    Failed { tool: String, code: Option<i32> },

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid command for {tool}: {error}")]
    Interpolation {
        tool: String,
        #[source]
        error: InterpolationError,
    },
}

/// Template rendering errors
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("include nesting deeper than {0} levels")]
    IncludeDepth(usize),

    #[error("failed to include '{path}': {source}")]
    Include {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Variable interpolation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for task operations
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
