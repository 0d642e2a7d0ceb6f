//! The generation driver: turns every matrix entry into a runnable test project.
//!
//! For each entry we run a fixed pipeline, one external tool at a time, each waited on before the next starts:
//!
//! 1. Wipe and recreate the test root.
//! 2. Expand the service template into a DTDL model.
//! 3. Generate schemas from the model.
//! 4. Generate library types from the schemas.  This is the only step which differs between formats; see
//!    [generate_types].
//! 5. Generate the envoy code.
//! 6. Copy the pre-built serializers for the format into the library.
//! 7. Generate test cases, then the test project which runs them.
//!
//! Once every entry is done the solution template is expanded, so that one solution references every project.
//!
//! Any failure stops the entry it happened in.  Whether it also stops the batch is up to [GenerationOptions].
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::errors::{BatchAborted, PipelineError, Stage, StageContext};
use crate::format::TypeStrategy;
use crate::matrix::MatrixEntry;
use crate::parameters::Parameters;
use crate::summary::BatchSummary;
use crate::toolchain::Toolchain;
use crate::workspace;

#[derive(Clone, Debug, Default)]
pub struct GenerationOptions {
    /// Log failures and carry on with the next entry instead of stopping the batch.
    pub keep_going: bool,

    /// Generate entries on the current rayon pool instead of one after another.
    pub parallel: bool,

    /// Don't expand the solution template at the end.
    pub skip_solution: bool,
}

/// Run the library type generators for one entry.  Expects the schemas to exist already.
pub fn generate_types(
    params: &Parameters,
    tools: &dyn Toolchain,
    entry: &MatrixEntry,
) -> Result<(), PipelineError> {
    let layout = &entry.layout;
    let name = entry.identity.test_name.as_str();
    let stage = Stage::GenerateTypes;
    let schemas = |glob: &str| workspace::files_matching(&layout.namespace_schemas_dir, glob);

    workspace::create_dir(&layout.lib_ns_path).at_stage(name, stage)?;

    match entry.format.type_strategy() {
        TypeStrategy::Avro => {
            for avsc in schemas("*.avsc").at_stage(name, stage)? {
                tools
                    .generate_avro_types(&avsc, &layout.lib_path)
                    .at_stage(name, stage)?;
            }
        }
        TypeStrategy::JsonSchema => {
            for schema in schemas("*.schema.json").at_stage(name, stage)? {
                tools
                    .generate_json_types(&schema, &entry.identity.namespace, &layout.lib_ns_path)
                    .at_stage(name, stage)?;
            }
        }
        TypeStrategy::Protobuf => {
            let include_paths = [
                layout.namespace_schemas_dir.as_path(),
                params.proto_include_dir.as_path(),
            ];

            for proto in schemas("*.proto").at_stage(name, stage)? {
                // protoc resolves inputs against the include paths, the first of which is the namespace folder.
                let Some(file_name) = proto.file_name() else {
                    continue;
                };
                tools
                    .compile_proto(Path::new(file_name), &include_paths, &layout.lib_ns_path)
                    .at_stage(name, stage)?;
            }

            tools
                .compile_proto(
                    Path::new(&params.proto_options_file),
                    &include_paths,
                    &layout.lib_ns_path,
                )
                .at_stage(name, stage)?;
        }
    }

    Ok(())
}

/// Generate one complete test project.
pub fn generate_service_test(
    params: &Parameters,
    tools: &dyn Toolchain,
    entry: &MatrixEntry,
) -> Result<(), PipelineError> {
    let layout = &entry.layout;
    let name = entry.identity.test_name.as_str();

    log::info!("Generating {entry}");

    workspace::reset_dir(&layout.test_root).at_stage(name, Stage::ResetWorkspace)?;

    log::debug!("{name}: expanding model");
    workspace::create_dir(&layout.model_dir).at_stage(name, Stage::ExpandModel)?;
    tools
        .expand_template(
            &entry.template,
            &[
                ("modelId", entry.identity.model_id.as_str()),
                ("format", entry.format.as_str()),
                ("cmdTopic", entry.variant.cmd_topic.as_str()),
                ("telemTopic", entry.variant.telem_topic.as_str()),
            ],
            &layout.model_path,
        )
        .at_stage(name, Stage::ExpandModel)?;

    log::debug!("{name}: generating schemas");
    workspace::create_dir(&layout.schemas_dir).at_stage(name, Stage::GenerateSchemas)?;
    tools
        .generate_schemas(&layout.model_path, &layout.schemas_dir)
        .at_stage(name, Stage::GenerateSchemas)?;

    log::debug!("{name}: generating {} types", entry.format.type_strategy());
    generate_types(params, tools, entry)?;

    log::debug!("{name}: generating envoys");
    tools
        .generate_envoy(&layout.annex_path, &layout.lib_ns_path)
        .at_stage(name, Stage::GenerateEnvoy)?;

    let serializers = params.serializers_for(entry.format);
    let copied = workspace::copy_matching(&serializers, "*.cs", &layout.lib_ns_path)
        .at_stage(name, Stage::CopySerializers)?;
    log::debug!(
        "{name}: copied {copied} serializers from {}",
        serializers.display()
    );

    log::debug!("{name}: generating cases");
    workspace::create_dir(&layout.cases_dir).at_stage(name, Stage::GenerateCases)?;
    tools
        .generate_cases(
            &layout.annex_path,
            &layout.model_path,
            &params.pattern_catalogue_path(),
            &layout.cases_dir,
            params.cases_per_test,
        )
        .at_stage(name, Stage::GenerateCases)?;

    log::debug!("{name}: generating test code");
    tools
        .generate_test_code(
            &layout.annex_path,
            &layout.model_path,
            &layout.cases_dir,
            &layout.test_root,
        )
        .at_stage(name, Stage::GenerateTestCode)?;

    Ok(())
}

/// Expand the solution template into `<gen_root>/<solution_name>`.
pub fn generate_solution(params: &Parameters, tools: &dyn Toolchain) -> Result<(), PipelineError> {
    let solution = params.solution_path();
    let name = params.solution_name.as_str();
    log::info!("Generating solution {}", solution.display());

    workspace::create_dir(&params.gen_root).at_stage(name, Stage::ExpandSolution)?;
    tools
        .expand_template(&params.solution_template_path(), &[], &solution)
        .at_stage(name, Stage::ExpandSolution)
}

fn generate_logged(
    params: &Parameters,
    tools: &dyn Toolchain,
    entry: &MatrixEntry,
) -> Result<String, PipelineError> {
    let res = generate_service_test(params, tools, entry);
    if let Err(e) = &res {
        log::error!("{e}");
    }
    res.map(|()| entry.identity.test_name.clone())
}

/// Generate every entry, then the solution.
///
/// Without `keep_going`, the first failure stops the batch: no further entries start and the solution is not
/// expanded.  In parallel mode entries already in flight still finish, and count towards the partial totals.  With
/// `keep_going`, failures are collected into the summary and the solution is still generated.
pub fn run_generation(
    params: &Parameters,
    tools: &dyn Toolchain,
    entries: &[MatrixEntry],
    options: &GenerationOptions,
) -> Result<BatchSummary, BatchAborted> {
    use rayon::prelude::*;

    let start = Instant::now();
    let stop = AtomicBool::new(false);

    let generate_one = |entry: &MatrixEntry| {
        if stop.load(Ordering::Relaxed) {
            return None;
        }
        let res = generate_logged(params, tools, entry);
        if res.is_err() && !options.keep_going {
            stop.store(true, Ordering::Relaxed);
        }
        Some(res)
    };

    let outcomes: Vec<Result<String, PipelineError>> = if options.parallel {
        entries.par_iter().filter_map(&generate_one).collect()
    } else {
        entries.iter().filter_map(&generate_one).collect()
    };

    let mut summary = BatchSummary::from_outcomes("Generated", outcomes);
    summary.elapsed = start.elapsed();
    if !options.keep_going {
        summary = summary.stop_at_first_failure()?;
    }

    if !options.skip_solution {
        if let Err(e) = generate_solution(params, tools) {
            log::error!("{e}");
            summary.solution_failure = Some(e);
        }
    }

    summary.elapsed = start.elapsed();
    if options.keep_going {
        Ok(summary)
    } else {
        summary.stop_at_first_failure()
    }
}
