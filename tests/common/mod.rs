//! Common test utilities
#![allow(dead_code)]

use sitepipe::config::parse_config_file;
use sitepipe::error::ToolError;
use sitepipe::runner::{BuildContext, Tool, ToolArgs, Toolchain};
use sitepipe::tasks::Site;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Descriptor used by the fixture project
pub const SITE_YML: &str = r##"
name: landing-page
displayName: Landing Page
description: Forecasts for everyone
vars:
  theme:
    primary: "#0044aa"
    accent: "#ff8800"
    background: "#ffffff"
    text-on-background: "#222222"
  analytics:
    id: UA-TEST
deploy:
  token_env: SITEPIPE_TEST_TOKEN_UNSET
"##;

/// A fixture source tree with every kind of asset
pub const FILES: &[(&str, &str)] = &[
    (
        "webpage/index.html",
        "<html><head><title>{{ name }}</title></head>\
         <body><include src=\"partials/footer.tpl.html\"></include></body></html>",
    ),
    (
        "webpage/partials/footer.tpl.html",
        "<footer>{{ env }} {{ year }} {{ analytics.id }}</footer>",
    ),
    ("webpage/embed/chart.frame.html", "<div>{{ description }}</div>"),
    ("webpage/style.css", "body { color: {{ theme-primary }}; }"),
    ("webpage/static/logo.png", "PNG"),
    ("webpage/static/app.js", "var answer = 42;"),
    ("webpage/static/favicon.ico", "ICO"),
    ("webpage/main.ts", "export const answer: number = 42;"),
    ("output/forecast.json", "{\"cases\": 1}"),
    ("output/forecast.csv", "cases\n1\n"),
    ("output/world/map.json", "{}"),
];

/// Create a temporary project with the fixture tree
pub fn create_project() -> TempDir {
    create_project_with(SITE_YML)
}

/// Create a temporary project with a custom descriptor
pub fn create_project_with(site_yml: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("site.yml"), site_yml).unwrap();
    for (path, contents) in FILES {
        write(temp_dir.path(), path, contents);
    }
    temp_dir
}

/// Write a file under `root`, creating directories
pub fn write(root: &Path, path: &str, contents: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, contents).unwrap();
}

/// One recorded tool call
#[derive(Debug, Clone)]
pub struct Call {
    pub tool: Tool,
    pub args: ToolArgs,
}

/// Toolchain that records calls and simulates each tool's output
#[derive(Clone, Default)]
pub struct RecordingToolchain {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub failing: Rc<RefCell<HashSet<Tool>>>,
}

impl RecordingToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `tool` exit with code 1
    pub fn fail(&self, tool: Tool) {
        self.failing.borrow_mut().insert(tool);
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.calls.borrow().iter().map(|c| c.tool).collect()
    }

    pub fn calls_to(&self, tool: Tool) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.tool == tool)
            .cloned()
            .collect()
    }
}

impl Toolchain for RecordingToolchain {
    fn invoke(&self, tool: Tool, args: &ToolArgs) -> Result<(), ToolError> {
        self.calls.borrow_mut().push(Call {
            tool,
            args: args.clone(),
        });

        let failed = || ToolError::Failed {
            tool: tool.to_string(),
            code: Some(1),
        };
        if self.failing.borrow().contains(&tool) {
            return Err(failed());
        }

        match tool {
            // The stand-in HTML rule: <center> is not allowed
            Tool::HtmlLint => {
                for file in args.get("files").unwrap_or_default() {
                    if fs::read_to_string(file).unwrap().contains("<center>") {
                        return Err(failed());
                    }
                }
            }
            Tool::ImageResize => {
                let output = args.first("output").unwrap();
                let width = args.first("width").unwrap();
                fs::write(output, format!("resized to {}", width)).unwrap();
            }
            Tool::ImageMinify => {
                let input = args.first("input").unwrap();
                fs::copy(input, args.first("output").unwrap()).unwrap();
            }
            Tool::ScriptCompile => {
                let out_dir = PathBuf::from(args.first("out_dir").unwrap());
                for file in args.get("files").unwrap_or_default() {
                    let stem = Path::new(file)
                        .file_stem()
                        .unwrap()
                        .to_string_lossy()
                        .into_owned();
                    fs::write(
                        out_dir.join(format!("{}.js", stem)),
                        "exports.answer = 42;",
                    )
                    .unwrap();
                    fs::write(
                        out_dir.join(format!("{}.d.ts", stem)),
                        "export declare const answer: number;",
                    )
                    .unwrap();
                }
            }
            Tool::CssMinify | Tool::JsMinify | Tool::HtmlMinify => {
                let path = args.first("output").unwrap();
                let contents = fs::read_to_string(path).unwrap();
                let collapsed = contents.split_whitespace().collect::<Vec<_>>().join(" ");
                fs::write(path, collapsed).unwrap();
            }
            // The options file must exist while the linter runs
            Tool::JsLint => {
                let options = fs::read_to_string(args.first("config").unwrap()).unwrap();
                let options: serde_json::Value = serde_json::from_str(&options).unwrap();
                assert_eq!(options["newcap"], false);
                assert_eq!(options["sub"], true);
            }
            Tool::Deploy => {}
        }

        Ok(())
    }
}

/// Assemble a site for the project at `root`
pub fn site(root: &Path, toolchain: &RecordingToolchain) -> Site {
    site_with_env(root, toolchain, "development")
}

pub fn site_with_env(root: &Path, toolchain: &RecordingToolchain, env: &str) -> Site {
    let config = parse_config_file(&root.join("site.yml")).unwrap();
    let context = BuildContext::new(config, root)
        .with_env(env)
        .with_year(2021);
    Site::new(context, Box::new(toolchain.clone()))
}
