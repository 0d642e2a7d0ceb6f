//! A fake toolchain and a scratch input tree, so the drivers can be run without any of the real generators.
#![allow(dead_code)]
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use codegen_integration_matrix::toolchain::{Tool, Toolchain};
use codegen_integration_matrix::{Parameters, RawParameters, SerFormat, ToolError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub tool: Tool,
    pub args: Vec<String>,
}

/// Records every call and imitates the file-system effects the pipeline relies on:
///
/// - The template expander writes its arguments to the output, one `name=value` per line.
/// - The schema generator reads the model id back out of that and writes one schema of every kind per entry in
///   `schema_stems` into the namespace folder.
/// - The test code generator creates `dotnet/standalone`.
pub struct FakeTools {
    pub calls: Mutex<Vec<Call>>,
    pub schema_stems: Vec<String>,

    /// Fail any call to this tool whose arguments mention this string.
    pub fail_on: Option<(Tool, String)>,
}

impl Default for FakeTools {
    fn default() -> Self {
        FakeTools {
            calls: Mutex::new(vec![]),
            schema_stems: vec!["Telemetry".to_string()],
            fail_on: None,
        }
    }
}

fn s(p: &Path) -> String {
    p.display().to_string()
}

/// `dtmi:jsonTest:FooTogether;1` to `dtmi_jsonTest_FooTogether__1`.
fn namespace_of(model_id: &str) -> String {
    model_id.replace(':', "_").replace(';', "__")
}

impl FakeTools {
    pub fn with_stems(stems: &[&str]) -> Self {
        FakeTools {
            schema_stems: stems.iter().map(|x| x.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing(tool: Tool, needle: &str) -> Self {
        FakeTools {
            fail_on: Some((tool, needle.to_string())),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, tool: Tool) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.tool == tool)
            .collect()
    }

    fn record(&self, tool: Tool, args: Vec<String>) -> Result<(), ToolError> {
        let fail = self
            .fail_on
            .as_ref()
            .is_some_and(|(t, needle)| *t == tool && args.iter().any(|a| a.contains(needle)));
        self.calls.lock().unwrap().push(Call { tool, args });

        if fail {
            return Err(ToolError::Failed {
                tool,
                program: "fake".to_string(),
                exit_code: Some(2),
                stderr: "fake failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Toolchain for FakeTools {
    fn expand_template(
        &self,
        template: &Path,
        args: &[(&str, &str)],
        output: &Path,
    ) -> Result<(), ToolError> {
        let mut recorded = vec![s(template)];
        recorded.extend(args.iter().map(|(k, v)| format!("{k}={v}")));
        recorded.push(s(output));
        self.record(Tool::TemplateExpander, recorded)?;

        let body = args
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect::<String>();
        std::fs::write(output, body).unwrap();
        Ok(())
    }

    fn generate_schemas(&self, model: &Path, schemas_dir: &Path) -> Result<(), ToolError> {
        self.record(Tool::SchemaGenerator, vec![s(model), s(schemas_dir)])?;

        let model_text = std::fs::read_to_string(model).unwrap();
        let model_id = model_text
            .lines()
            .find_map(|l| l.strip_prefix("modelId="))
            .unwrap();
        let ns_dir = schemas_dir.join(namespace_of(model_id));
        std::fs::create_dir_all(&ns_dir).unwrap();
        for stem in self.schema_stems.iter() {
            for ext in ["avsc", "schema.json", "proto"] {
                std::fs::write(ns_dir.join(format!("{stem}.{ext}")), b"").unwrap();
            }
        }
        Ok(())
    }

    fn generate_avro_types(&self, avsc: &Path, out_dir: &Path) -> Result<(), ToolError> {
        self.record(Tool::AvroGenerator, vec![s(avsc), s(out_dir)])
    }

    fn generate_json_types(
        &self,
        schema: &Path,
        namespace: &str,
        out_dir: &Path,
    ) -> Result<(), ToolError> {
        self.record(
            Tool::TypeGenerator,
            vec![s(schema), namespace.to_string(), s(out_dir)],
        )
    }

    fn compile_proto(
        &self,
        proto_file: &Path,
        include_paths: &[&Path],
        out_dir: &Path,
    ) -> Result<(), ToolError> {
        let mut args = vec![s(proto_file)];
        args.extend(include_paths.iter().map(|p| s(p)));
        args.push(s(out_dir));
        self.record(Tool::ProtobufCompiler, args)
    }

    fn generate_envoy(&self, annex: &Path, out_dir: &Path) -> Result<(), ToolError> {
        self.record(Tool::EnvoyGenerator, vec![s(annex), s(out_dir)])
    }

    fn generate_cases(
        &self,
        annex: &Path,
        model: &Path,
        pattern_catalogue: &Path,
        out_dir: &Path,
        case_count: u32,
    ) -> Result<(), ToolError> {
        self.record(
            Tool::CaseGenerator,
            vec![
                s(annex),
                s(model),
                s(pattern_catalogue),
                s(out_dir),
                case_count.to_string(),
            ],
        )
    }

    fn generate_test_code(
        &self,
        annex: &Path,
        model: &Path,
        cases_dir: &Path,
        test_root: &Path,
    ) -> Result<(), ToolError> {
        self.record(
            Tool::TestCodeGenerator,
            vec![s(annex), s(model), s(cases_dir), s(test_root)],
        )?;
        std::fs::create_dir_all(test_root.join("dotnet").join("standalone")).unwrap();
        Ok(())
    }

    fn run_tests(&self, project: &Path) -> Result<(), ToolError> {
        self.record(Tool::TestRunner, vec![s(project)])
    }
}

/// A scratch copy of the integration test input tree.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub params: Parameters,
}

impl Fixture {
    /// Templates `<name>.tt` for every name, and one serializer per format folder.
    pub fn new(templates: &[&str], formats: &[SerFormat]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let mut raw = RawParameters {
            gen_root: root.join("generated"),
            template_dir: root.join("input").join("templates"),
            pattern_dir: root.join("input").join("patterns"),
            support_dir: root.join("input").join("support"),
            serializers_dir: root.join("serializers"),
            proto_include_dir: root.join("include"),
            ..Default::default()
        };
        raw.formats = formats.to_vec();

        std::fs::create_dir_all(&raw.template_dir).unwrap();
        for t in templates {
            std::fs::write(raw.template_dir.join(format!("{t}.tt")), b"template").unwrap();
        }
        for f in SerFormat::ALL {
            let folder = raw.serializers_dir.join(f.serializer_folder());
            std::fs::create_dir_all(&folder).unwrap();
            std::fs::write(
                folder.join(format!("{}Serializer.cs", f.serializer_folder())),
                b"// serializer",
            )
            .unwrap();
        }

        let params = Parameters::from_raw(raw).unwrap();
        Fixture { dir, params }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}
