//! The parameter table: which formats and topic layouts make up the matrix, where inputs live, where output goes, and
//! which executables do the actual work.
//!
//! The table is built once, validated, and then only ever borrowed by the drivers.  Defaults reproduce the layout of
//! the integration test tree, with every path relative to the directory the tool is launched from (the `scripts`
//! directory next to `input/` and `generated/`).  Any subset of keys may be overridden from a YAML file:
//!
//! ```yaml
//! cases_per_test: 2
//! formats: [json, proto3]
//! tools:
//!   protobuf_compiler: /opt/protoc/bin/protoc
//! ```
//!
//! Topic variants are given as three parallel lists, `topic_types`, `cmd_topics` and `telem_topics`, which must have
//! the same length.  Once validated they are zipped into [TopicVariant]s so that nothing downstream can index them out
//! of step.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::format::SerFormat;

/// Executables for every external collaborator.
///
/// Bare names (`protoc`) are looked up on `PATH`; anything else is used as given.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    pub text_transform: PathBuf,
    pub schema_generator: PathBuf,
    pub avro_generator: PathBuf,
    pub type_generator: PathBuf,
    pub protobuf_compiler: PathBuf,
    pub envoy_generator: PathBuf,
    pub case_generator: PathBuf,
    pub test_code_generator: PathBuf,
    pub test_runner: PathBuf,
}

/// Path of a debug build of one of the .NET generator projects.
fn dotnet_tool(project_parent: &[&str], project: &str) -> PathBuf {
    let mut path: PathBuf = project_parent.iter().collect();
    path.push(project);
    path.push("bin");
    path.push("Debug");
    path.push("net7.0");
    path.push(format!("{project}.exe"));
    path
}

const CODEGEN_SRC: [&str; 5] = ["..", "..", "..", "src", "Akri.Dtdl.Codegen"];

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            text_transform: PathBuf::from("TextTransform"),
            schema_generator: dotnet_tool(&CODEGEN_SRC, "Akri.Dtdl.Codegen.SchemaGenerator"),
            avro_generator: PathBuf::from("avrogen"),
            type_generator: dotnet_tool(&CODEGEN_SRC, "Akri.Dtdl.Codegen.TypeGenerator"),
            protobuf_compiler: PathBuf::from("protoc"),
            envoy_generator: dotnet_tool(&CODEGEN_SRC, "Akri.Dtdl.Codegen.EnvoyGenerator"),
            case_generator: dotnet_tool(
                &[".."],
                "Akri.Dtdl.Codegen.IntegrationTests.TestCaseGenerator",
            ),
            test_code_generator: dotnet_tool(
                &[".."],
                "Akri.Dtdl.Codegen.IntegrationTests.TestCodeGenerator",
            ),
            test_runner: PathBuf::from("dotnet"),
        }
    }
}

/// The parameter table as written in a configuration file.
///
/// This is unvalidated.  Convert to [Parameters] with [Parameters::from_raw].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawParameters {
    pub gen_root: PathBuf,
    pub template_dir: PathBuf,
    pub pattern_dir: PathBuf,
    pub support_dir: PathBuf,

    /// Glob selecting template files inside `template_dir`.
    pub template_glob: String,

    /// File name of the test pattern catalogue inside `pattern_dir`.
    pub pattern_catalogue: String,

    /// File name of the solution template inside `support_dir`.
    pub solution_template: String,

    /// File name of the solution written to `gen_root`.
    pub solution_name: String,

    /// Root of the pre-built serializers.  One folder per format lives beneath it.
    pub serializers_dir: PathBuf,

    /// Include root handed to `protoc` alongside each namespace's schema folder.
    pub proto_include_dir: PathBuf,

    /// Shared options file compiled once per protobuf test, relative to the proto include paths.
    pub proto_options_file: String,

    /// Target language passed to every generator.
    pub language: String,

    pub cases_per_test: u32,
    pub formats: Vec<SerFormat>,
    pub topic_types: Vec<String>,
    pub cmd_topics: Vec<String>,
    pub telem_topics: Vec<String>,
    pub tools: ToolPaths,
}

impl Default for RawParameters {
    fn default() -> Self {
        let in_root = Path::new("..").join("input");
        let serializers_dir = [
            "..",
            "..",
            "..",
            "..",
            "..",
            "lib",
            "dotnet",
            "test",
            "Azure.Iot.Operations.Protocol.UnitTests",
            "Serializers",
        ]
        .iter()
        .collect();

        RawParameters {
            gen_root: Path::new("..").join("generated"),
            template_dir: in_root.join("templates"),
            pattern_dir: in_root.join("patterns"),
            support_dir: in_root.join("support"),
            template_glob: "*.tt".to_string(),
            pattern_catalogue: "TestPatternCatalogue.json".to_string(),
            solution_template: "DotNetTestSln.tt".to_string(),
            solution_name: "Akri.Dtdl.Codegen.IntegrationTests.sln".to_string(),
            serializers_dir,
            proto_include_dir: ["..", "..", "..", "include"].iter().collect(),
            proto_options_file: "dtdl/protobuf/dtdl_options.proto".to_string(),
            language: "csharp".to_string(),
            cases_per_test: 4,
            formats: SerFormat::ALL.to_vec(),
            topic_types: vec!["Together".to_string(), "Separate".to_string()],
            cmd_topics: vec![
                "vehicles/{modelId}/command/{commandName}".to_string(),
                "vehicles/{modelId}/{executorId}/command/{commandName}".to_string(),
            ],
            telem_topics: vec![
                "vehicles/{modelId}/{senderId}/telemetry".to_string(),
                "vehicles/{modelId}/{senderId}/telemetry/{telemetryName}".to_string(),
            ],
            tools: ToolPaths::default(),
        }
    }
}

/// One topic layout.
///
/// Topic strings carry placeholder tokens such as `{modelId}` or `{commandName}`.  They are handed to the template
/// expander verbatim; resolving them is the generated code's business.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicVariant {
    /// Appended to the template name to form the service name, e.g. `Together`.
    pub name: String,
    pub cmd_topic: String,
    pub telem_topic: String,
}

/// The validated parameter table.
#[derive(Clone, Debug)]
pub struct Parameters {
    pub gen_root: PathBuf,
    pub template_dir: PathBuf,
    pub pattern_dir: PathBuf,
    pub support_dir: PathBuf,
    pub template_glob: String,
    pub pattern_catalogue: String,
    pub solution_template: String,
    pub solution_name: String,
    pub serializers_dir: PathBuf,
    pub proto_include_dir: PathBuf,
    pub proto_options_file: String,
    pub language: String,
    pub cases_per_test: u32,
    pub formats: Vec<SerFormat>,
    pub topic_variants: Vec<TopicVariant>,
    pub tools: ToolPaths,
}

fn check_unique<'a>(
    axis: &'static str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    match values.into_iter().duplicates().next() {
        Some(v) => Err(ConfigError::DuplicateAxisValue {
            axis,
            value: v.to_string(),
        }),
        None => Ok(()),
    }
}

impl Parameters {
    pub fn from_raw(raw: RawParameters) -> Result<Parameters, ConfigError> {
        if raw.formats.is_empty() {
            return Err(ConfigError::EmptyAxis("serialization format"));
        }
        check_unique("Serialization format", raw.formats.iter().map(|f| f.as_str()))?;

        if raw.topic_types.len() != raw.cmd_topics.len()
            || raw.topic_types.len() != raw.telem_topics.len()
        {
            return Err(ConfigError::MisalignedTopics {
                topic_types: raw.topic_types.len(),
                cmd_topics: raw.cmd_topics.len(),
                telem_topics: raw.telem_topics.len(),
            });
        }
        if raw.topic_types.is_empty() {
            return Err(ConfigError::EmptyAxis("topic variant"));
        }
        check_unique("Topic type", raw.topic_types.iter().map(String::as_str))?;

        if raw.cases_per_test == 0 {
            return Err(ConfigError::ZeroCases);
        }

        let topic_variants = itertools::izip!(raw.topic_types, raw.cmd_topics, raw.telem_topics)
            .map(|(name, cmd_topic, telem_topic)| TopicVariant {
                name,
                cmd_topic,
                telem_topic,
            })
            .collect();

        Ok(Parameters {
            gen_root: raw.gen_root,
            template_dir: raw.template_dir,
            pattern_dir: raw.pattern_dir,
            support_dir: raw.support_dir,
            template_glob: raw.template_glob,
            pattern_catalogue: raw.pattern_catalogue,
            solution_template: raw.solution_template,
            solution_name: raw.solution_name,
            serializers_dir: raw.serializers_dir,
            proto_include_dir: raw.proto_include_dir,
            proto_options_file: raw.proto_options_file,
            language: raw.language,
            cases_per_test: raw.cases_per_test,
            formats: raw.formats,
            topic_variants,
            tools: raw.tools,
        })
    }

    /// Load the table from an optional YAML file.  Without a file, the defaults are used.
    pub fn load(config: Option<&Path>) -> Result<Parameters, ConfigError> {
        let raw = match config {
            None => RawParameters::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        };

        Self::from_raw(raw)
    }

    /// Convert back to the file representation, e.g. to show the resolved configuration.
    pub fn to_raw(&self) -> RawParameters {
        RawParameters {
            gen_root: self.gen_root.clone(),
            template_dir: self.template_dir.clone(),
            pattern_dir: self.pattern_dir.clone(),
            support_dir: self.support_dir.clone(),
            template_glob: self.template_glob.clone(),
            pattern_catalogue: self.pattern_catalogue.clone(),
            solution_template: self.solution_template.clone(),
            solution_name: self.solution_name.clone(),
            serializers_dir: self.serializers_dir.clone(),
            proto_include_dir: self.proto_include_dir.clone(),
            proto_options_file: self.proto_options_file.clone(),
            language: self.language.clone(),
            cases_per_test: self.cases_per_test,
            formats: self.formats.clone(),
            topic_types: self.topic_variants.iter().map(|v| v.name.clone()).collect(),
            cmd_topics: self
                .topic_variants
                .iter()
                .map(|v| v.cmd_topic.clone())
                .collect(),
            telem_topics: self
                .topic_variants
                .iter()
                .map(|v| v.telem_topic.clone())
                .collect(),
            tools: self.tools.clone(),
        }
    }

    pub fn pattern_catalogue_path(&self) -> PathBuf {
        self.pattern_dir.join(&self.pattern_catalogue)
    }

    pub fn solution_template_path(&self) -> PathBuf {
        self.support_dir.join(&self.solution_template)
    }

    pub fn solution_path(&self) -> PathBuf {
        self.gen_root.join(&self.solution_name)
    }

    /// Folder holding the pre-built serializers for one format.
    pub fn serializers_for(&self, format: SerFormat) -> PathBuf {
        self.serializers_dir.join(format.serializer_folder())
    }
}
