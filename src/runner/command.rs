//! External tool execution
//!
//! Leaf tasks never spawn processes themselves. They describe an invocation
//! as a [`Tool`] plus [`ToolArgs`] and hand it to a [`Toolchain`].

use crate::error::ToolError;
use crate::runner::{interpolate_strict, shell_quote, Verbosity};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

/// External collaborators the pipeline delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    HtmlLint,
    JsLint,
    CssMinify,
    ImageResize,
    ScriptCompile,
    JsMinify,
    HtmlMinify,
    ImageMinify,
    Deploy,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::HtmlLint,
        Tool::JsLint,
        Tool::CssMinify,
        Tool::ImageResize,
        Tool::ScriptCompile,
        Tool::JsMinify,
        Tool::HtmlMinify,
        Tool::ImageMinify,
        Tool::Deploy,
    ];

    /// Key used in the descriptor's `tools` section
    pub fn key(self) -> &'static str {
        match self {
            Tool::HtmlLint => "htmlhint",
            Tool::JsLint => "jshint",
            Tool::CssMinify => "cleancss",
            Tool::ImageResize => "resize",
            Tool::ScriptCompile => "tsc",
            Tool::JsMinify => "uglifyjs",
            Tool::HtmlMinify => "html-minifier",
            Tool::ImageMinify => "imagemin",
            Tool::Deploy => "firebase",
        }
    }

    pub fn from_key(key: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.key() == key)
    }

    /// Command template used when the descriptor does not override it
    pub fn default_command(self) -> &'static str {
        match self {
            Tool::HtmlLint => "htmlhint ${files}",
            Tool::JsLint => "jshint --config ${config} ${files}",
            Tool::CssMinify => "cleancss -o ${output} ${input}",
            Tool::ImageResize => "convert ${input} -resize ${width} ${output}",
            Tool::ScriptCompile => {
                "tsc --target ${target} --module ${module} ${flags} --rootDir ${root_dir} --outDir ${out_dir} ${files}"
            }
            Tool::JsMinify => "uglifyjs ${input} -o ${output}",
            Tool::HtmlMinify => "html-minifier --minify-js true -o ${output} ${input}",
            Tool::ImageMinify => "imagemin ${input} > ${output}",
            Tool::Deploy => {
                "firebase deploy --non-interactive --project ${project} --public ${public_dir}"
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Named arguments for one tool invocation
///
/// Every argument is a list of values; single values are one-element lists.
/// Environment entries are handed to the child process and never appear on
/// its command line, so credentials belong there.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    values: BTreeMap<String, Vec<String>>,
    env: BTreeMap<String, String>,
}

impl fmt::Debug for ToolArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolArgs")
            .field("values", &self.values)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), vec![value.into()]);
        self
    }

    pub fn values<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn path(self, name: &str, path: &Path) -> Self {
        self.value(name, path.to_string_lossy())
    }

    pub fn paths<'a, I>(self, name: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        self.values(name, paths.into_iter().map(|p| p.to_string_lossy().into_owned()))
    }

    /// Set an environment variable for the child process
    pub fn env(mut self, name: &str, value: impl Into<String>) -> Self {
        self.env.insert(name.to_string(), value.into());
        self
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    pub fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// First value of an argument
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Shell-quoted, space-joined rendering of every argument
    pub fn quoted(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(name, values)| {
                let joined = values
                    .iter()
                    .map(|v| shell_quote(v))
                    .collect::<Vec<_>>()
                    .join(" ");
                (name.clone(), joined)
            })
            .collect()
    }
}

/// The seam between leaf tasks and external tools
pub trait Toolchain {
    /// Run a tool to completion; a non-zero exit is an error
    fn invoke(&self, tool: Tool, args: &ToolArgs) -> Result<(), ToolError>;
}

/// Runs tools as shell commands built from command templates
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    /// Directory commands run in
    pub working_dir: PathBuf,

    /// Interpreter (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    /// Command template overrides keyed by tool
    pub commands: HashMap<Tool, String>,

    /// Verbosity level; commands are echoed at Normal and above
    pub verbosity: Verbosity,
}

impl CommandToolchain {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        CommandToolchain {
            working_dir: working_dir.into(),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            commands: HashMap::new(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    /// Override command templates by descriptor key; unknown keys are ignored
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, command) in overrides {
            if let Some(tool) = Tool::from_key(key) {
                self.commands.insert(tool, command.clone());
            }
        }
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Command template for a tool
    pub fn template(&self, tool: Tool) -> &str {
        self.commands
            .get(&tool)
            .map(String::as_str)
            .unwrap_or_else(|| tool.default_command())
    }

    /// Fully rendered command line for an invocation
    pub fn render(&self, tool: Tool, args: &ToolArgs) -> Result<String, ToolError> {
        interpolate_strict(self.template(tool), &args.quoted()).map_err(|error| {
            ToolError::Interpolation {
                tool: tool.to_string(),
                error,
            }
        })
    }
}

impl Toolchain for CommandToolchain {
    fn invoke(&self, tool: Tool, args: &ToolArgs) -> Result<(), ToolError> {
        let exec_str = self.render(tool, args)?;

        if self.verbosity >= Verbosity::Normal {
            eprintln!("[RUN] {}", exec_str);
        }
        debug!(%tool, dir = %self.working_dir.display(), "spawning tool");

        let mut command = StdCommand::new(&self.interpreter[0]);
        if self.interpreter.len() > 1 {
            command.args(&self.interpreter[1..]);
        }
        command.arg(&exec_str);
        command.current_dir(&self.working_dir);
        command.envs(args.env_vars());

        // The tool's own diagnostics are the user-facing failure output
        command.stdin(Stdio::null());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        // status() waits for the child, so no handle outlives the call
        let status = command.status().map_err(|source| ToolError::Spawn {
            tool: tool.to_string(),
            source,
        })?;

        if !status.success() {
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_toolchain(dir: &Path) -> CommandToolchain {
        CommandToolchain::new(dir).with_verbosity(Verbosity::Silent)
    }

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_tool_keys_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_key(tool.key()), Some(tool));
        }
        assert_eq!(Tool::from_key("gulp"), None);
    }

    #[test]
    fn test_render_default_template() {
        let toolchain = quiet_toolchain(Path::new("."));
        let args = ToolArgs::new()
            .value("input", "public/app.js")
            .value("output", "public/app.js");
        assert_eq!(
            toolchain.render(Tool::JsMinify, &args).unwrap(),
            "uglifyjs public/app.js -o public/app.js"
        );
    }

    #[test]
    fn test_render_quotes_lists() {
        let toolchain = quiet_toolchain(Path::new("."));
        let args = ToolArgs::new().values("files", ["a.html", "my page.html"]);
        assert_eq!(
            toolchain.render(Tool::HtmlLint, &args).unwrap(),
            "htmlhint a.html 'my page.html'"
        );
    }

    #[test]
    fn test_render_missing_argument() {
        let toolchain = quiet_toolchain(Path::new("."));
        let result = toolchain.render(Tool::ImageResize, &ToolArgs::new());
        assert!(matches!(result, Err(ToolError::Interpolation { .. })));
    }

    #[test]
    fn test_env_stays_off_the_command_line() {
        let toolchain = quiet_toolchain(Path::new("."));
        let args = ToolArgs::new()
            .value("project", "landing")
            .value("public_dir", "public")
            .env("FIREBASE_TOKEN", "s3cret");

        let rendered = toolchain.render(Tool::Deploy, &args).unwrap();
        assert_eq!(
            rendered,
            "firebase deploy --non-interactive --project landing --public public"
        );
        assert!(!format!("{:?}", args).contains("s3cret"));
        assert_eq!(args.env_var("FIREBASE_TOKEN"), Some("s3cret"));
    }

    #[test]
    fn test_invoke_passes_env_to_child() {
        let temp_dir = TempDir::new().unwrap();
        let toolchain = quiet_toolchain(temp_dir.path()).with_overrides(&overrides(&[(
            "firebase",
            "test \"$FIREBASE_TOKEN\" = s3cret && test ${project} = landing",
        )]));
        let args = ToolArgs::new()
            .value("project", "landing")
            .env("FIREBASE_TOKEN", "s3cret");
        toolchain.invoke(Tool::Deploy, &args).unwrap();

        let wrong = ToolArgs::new()
            .value("project", "landing")
            .env("FIREBASE_TOKEN", "other");
        assert!(toolchain.invoke(Tool::Deploy, &wrong).is_err());
    }

    #[test]
    fn test_invoke_success() {
        let temp_dir = TempDir::new().unwrap();
        let toolchain =
            quiet_toolchain(temp_dir.path()).with_overrides(&overrides(&[("htmlhint", "true")]));
        assert!(toolchain.invoke(Tool::HtmlLint, &ToolArgs::new()).is_ok());
    }

    #[test]
    fn test_invoke_failure_carries_code() {
        let temp_dir = TempDir::new().unwrap();
        let toolchain =
            quiet_toolchain(temp_dir.path()).with_overrides(&overrides(&[("htmlhint", "exit 4")]));
        let result = toolchain.invoke(Tool::HtmlLint, &ToolArgs::new());
        assert!(matches!(
            result,
            Err(ToolError::Failed { code: Some(4), .. })
        ));
    }

    #[test]
    fn test_invoke_runs_in_working_dir() {
        let temp_dir = TempDir::new().unwrap();
        let toolchain = quiet_toolchain(temp_dir.path())
            .with_overrides(&overrides(&[("uglifyjs", "cp ${input} ${output}")]));
        fs::write(temp_dir.path().join("in.js"), "var a;").unwrap();

        let args = ToolArgs::new().value("input", "in.js").value("output", "out.js");
        toolchain.invoke(Tool::JsMinify, &args).unwrap();

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("out.js")).unwrap(),
            "var a;"
        );
    }

    #[test]
    fn test_spawn_failure() {
        let temp_dir = TempDir::new().unwrap();
        let toolchain = quiet_toolchain(temp_dir.path())
            .with_interpreter(vec!["definitely-not-a-shell-xyz".to_string()]);
        let args = ToolArgs::new()
            .value("project", "p")
            .value("public_dir", "public");
        let result = toolchain.invoke(Tool::Deploy, &args);
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }
}
