//! The external collaborators.
//!
//! Every generator is an opaque executable.  The pipeline only talks to them through [Toolchain], which has one
//! operation per tool, so the drivers can be exercised against fakes without spawning anything.  The real
//! implementation, [ExternalToolchain], turns each operation into a [ToolInvocation] and hands it to a
//! [CommandRunner]; [ProcessRunner] is the runner which actually spawns processes.
mod process_runner;

pub use process_runner::*;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::ToolError;
use crate::parameters::{Parameters, ToolPaths};

/// Which collaborator an invocation is for.  Used in logs and failure reports.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, derive_more::Display)]
pub enum Tool {
    #[display(fmt = "template expander")]
    TemplateExpander,
    #[display(fmt = "schema generator")]
    SchemaGenerator,
    #[display(fmt = "Avro type generator")]
    AvroGenerator,
    #[display(fmt = "JSON schema type generator")]
    TypeGenerator,
    #[display(fmt = "protocol buffer compiler")]
    ProtobufCompiler,
    #[display(fmt = "envoy generator")]
    EnvoyGenerator,
    #[display(fmt = "test case generator")]
    CaseGenerator,
    #[display(fmt = "test code generator")]
    TestCodeGenerator,
    #[display(fmt = "test runner")]
    TestRunner,
}

/// What to do with a tool's stdout and stderr.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// Capture both.  Stdout goes to the debug log; stderr is kept for the failure report.
    Captured,

    /// Let the tool write straight to our console.  Used for the test runner, whose output is the point.
    Inherited,
}

/// A fully-resolved command line for one tool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub output: OutputMode,
}

impl ToolInvocation {
    pub fn new(tool: Tool, program: &Path) -> Self {
        ToolInvocation {
            tool,
            program: program.to_path_buf(),
            args: vec![],
            output: OutputMode::Captured,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherited;
        self
    }

    /// The command line, for logs.  Not shell-quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Something which can run a [ToolInvocation] to completion.
pub trait CommandRunner: Send + Sync {
    /// Run the invocation and wait for it.  A nonzero exit is an error.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;
}

/// One operation per external collaborator.
pub trait Toolchain: Send + Sync {
    /// Expand a text template.  `args` are named substitutions, e.g. `("modelId", "dtmi:jsonTest:FooTogether;1")`.
    fn expand_template(
        &self,
        template: &Path,
        args: &[(&str, &str)],
        output: &Path,
    ) -> Result<(), ToolError>;

    fn generate_schemas(&self, model: &Path, schemas_dir: &Path) -> Result<(), ToolError>;

    fn generate_avro_types(&self, avsc: &Path, out_dir: &Path) -> Result<(), ToolError>;

    fn generate_json_types(
        &self,
        schema: &Path,
        namespace: &str,
        out_dir: &Path,
    ) -> Result<(), ToolError>;

    /// Compile one `.proto` file.  `proto_file` is resolved by the compiler against `include_paths`.
    fn compile_proto(
        &self,
        proto_file: &Path,
        include_paths: &[&Path],
        out_dir: &Path,
    ) -> Result<(), ToolError>;

    fn generate_envoy(&self, annex: &Path, out_dir: &Path) -> Result<(), ToolError>;

    fn generate_cases(
        &self,
        annex: &Path,
        model: &Path,
        pattern_catalogue: &Path,
        out_dir: &Path,
        case_count: u32,
    ) -> Result<(), ToolError>;

    fn generate_test_code(
        &self,
        annex: &Path,
        model: &Path,
        cases_dir: &Path,
        test_root: &Path,
    ) -> Result<(), ToolError>;

    /// Run a generated standalone test project.
    fn run_tests(&self, project: &Path) -> Result<(), ToolError>;
}

/// The real collaborators, located through [ToolPaths].
pub struct ExternalToolchain<R> {
    tools: ToolPaths,
    language: String,
    runner: R,
}

impl<R: CommandRunner> ExternalToolchain<R> {
    pub fn new(params: &Parameters, runner: R) -> Self {
        ExternalToolchain {
            tools: params.tools.clone(),
            language: params.language.clone(),
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn run(&self, invocation: ToolInvocation) -> Result<(), ToolError> {
        log::debug!("Running {}: {}", invocation.tool, invocation.command_line());
        self.runner.run(&invocation)
    }
}

impl<R: CommandRunner> Toolchain for ExternalToolchain<R> {
    fn expand_template(
        &self,
        template: &Path,
        args: &[(&str, &str)],
        output: &Path,
    ) -> Result<(), ToolError> {
        let mut inv =
            ToolInvocation::new(Tool::TemplateExpander, &self.tools.text_transform).arg(template);
        for (name, value) in args {
            inv = inv.arg("-a").arg(format!("!!{name}!{value}"));
        }
        self.run(inv.arg("-out").arg(output))
    }

    fn generate_schemas(&self, model: &Path, schemas_dir: &Path) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::SchemaGenerator, &self.tools.schema_generator)
                .arg(model)
                .arg(schemas_dir),
        )
    }

    fn generate_avro_types(&self, avsc: &Path, out_dir: &Path) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::AvroGenerator, &self.tools.avro_generator)
                .arg("-s")
                .arg(avsc)
                .arg(out_dir),
        )
    }

    fn generate_json_types(
        &self,
        schema: &Path,
        namespace: &str,
        out_dir: &Path,
    ) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::TypeGenerator, &self.tools.type_generator)
                .arg(&self.language)
                .arg(schema)
                .arg(namespace)
                .arg(out_dir),
        )
    }

    fn compile_proto(
        &self,
        proto_file: &Path,
        include_paths: &[&Path],
        out_dir: &Path,
    ) -> Result<(), ToolError> {
        let mut out_flag = OsString::from(format!("--{}_out=", self.language));
        out_flag.push(out_dir);

        let mut inv =
            ToolInvocation::new(Tool::ProtobufCompiler, &self.tools.protobuf_compiler).arg(out_flag);
        for inc in include_paths {
            let mut flag = OsString::from("--proto_path=");
            flag.push(inc);
            inv = inv.arg(flag);
        }
        self.run(inv.arg(proto_file))
    }

    fn generate_envoy(&self, annex: &Path, out_dir: &Path) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::EnvoyGenerator, &self.tools.envoy_generator)
                .arg(&self.language)
                .arg(annex)
                .arg(out_dir),
        )
    }

    fn generate_cases(
        &self,
        annex: &Path,
        model: &Path,
        pattern_catalogue: &Path,
        out_dir: &Path,
        case_count: u32,
    ) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::CaseGenerator, &self.tools.case_generator)
                .arg(annex)
                .arg(model)
                .arg(pattern_catalogue)
                .arg(out_dir)
                .arg(case_count.to_string()),
        )
    }

    fn generate_test_code(
        &self,
        annex: &Path,
        model: &Path,
        cases_dir: &Path,
        test_root: &Path,
    ) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::TestCodeGenerator, &self.tools.test_code_generator)
                .arg(&self.language)
                .arg(annex)
                .arg(model)
                .arg(cases_dir)
                .arg(test_root),
        )
    }

    fn run_tests(&self, project: &Path) -> Result<(), ToolError> {
        self.run(
            ToolInvocation::new(Tool::TestRunner, &self.tools.test_runner)
                .arg("test")
                .arg(project)
                .inherit_output(),
        )
    }
}
