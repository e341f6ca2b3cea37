//! CLI: JSON-LD vocabulary → (ThingTalk | JSON)
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use jsonld_osi::error::Diagnostics;
use jsonld_osi::lower::LowerOptions;
use jsonld_osi::policy::Policy;
use jsonld_osi::refine::{self, FileOracle, RefinementOracle};
use jsonld_osi::samples::{DatasetIndex, SampleSource, DEFAULT_MAX_SAMPLES};
use jsonld_osi::{Compiled, Compiler};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a schema.org JSON-LD vocabulary into a ThingTalk class
#[derive(Parser, Debug)]
#[command(name = "jsonld-osi", version)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile and print the ThingTalk class
    Thingtalk(CompileOut),
    /// compile and print the class definition as JSON
    Json(CompileOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct CompileSettings {
    /// scope the class to `org.schema.<NAME>`
    #[arg(long)]
    class_name: Option<String>,

    /// also apply the hand-written canonical phrases
    #[arg(long, default_value_t = false)]
    manual: bool,

    /// JSON policy file replacing the built-in schema.org policy
    #[arg(long)]
    policy: Option<PathBuf>,

    /// parameter-dataset index (TSV) for sample values
    #[arg(long)]
    datasets: Option<PathBuf>,

    /// sample values per argument sent for refinement
    #[arg(long, default_value_t = DEFAULT_MAX_SAMPLES)]
    max_samples: usize,

    /// recorded refinement response (JSON) to merge into the canonicals
    #[arg(long)]
    refinements: Option<PathBuf>,

    /// run the annotator pre-pass even without refinements
    #[arg(long, default_value_t = false)]
    annotate: bool,

    /// write the refinement request (JSON) here
    #[arg(long)]
    request_out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    compile_settings: CompileSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self, mut apply: impl FnMut(serde_json::Value) -> Result<()>) -> Result<()> {
        let sources = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        for source in sources {
            let label = source.label();
            let text = source.read().with_context(|| format!("failed to read {label}"))?;
            let json_value = serde_json::from_str::<serde_json::Value>(&text)
                .with_context(|| format!("failed to parse JSON source ({label})"))?;
            let documents = match self.jq_expr.as_ref() {
                None => vec![json_value],
                Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &json_value)
                    .with_context(|| format!("failed to apply jq expression to {label}"))?,
            };
            for document in documents {
                apply(document).with_context(|| format!("in {label}"))?;
            }
            tracing::debug!(source = %label, "input loaded");
        }
        Ok(())
    }
}

impl CompileSettings {
    fn policy(&self) -> Result<Policy> {
        match &self.policy {
            Some(path) => Policy::load(path).with_context(|| format!("failed to load policy {}", path.display())),
            None => Ok(Policy::default()),
        }
    }

    fn datasets(&self) -> Result<Option<DatasetIndex>> {
        let Some(path) = &self.datasets else { return Ok(None) };
        let index = DatasetIndex::load(path)
            .with_context(|| format!("failed to load dataset index {}", path.display()))?
            .with_max_samples(self.max_samples);
        tracing::debug!(datasets = index.len(), "dataset index loaded");
        Ok(Some(index))
    }

    fn lower_options(&self) -> LowerOptions {
        LowerOptions { class_name: self.class_name.clone(), manual: self.manual }
    }
}

impl CompileOut {
    fn compile(&self) -> Result<Compiled> {
        let settings = &self.compile_settings;
        let mut compiler = Compiler::new(settings.policy()?, settings.lower_options());
        self.input_settings.load_process(|value| {
            compiler.observe_value(value)?;
            Ok(())
        })?;
        let mut compiled = compiler.compile()?;

        if settings.annotate || settings.refinements.is_some() {
            let datasets = settings.datasets()?;
            let source = datasets.as_ref().map(|d| d as &dyn SampleSource);
            let request = refine::annotate(&mut compiled.class, compiler.policy(), source);
            if let Some(path) = &settings.request_out {
                write_output(Some(path.as_path()), &serde_json::to_string_pretty(&request)?)?;
            }
            if let Some(path) = &settings.refinements {
                let response = FileOracle::new(path)
                    .refine(&request)
                    .with_context(|| format!("failed to load refinements {}", path.display()))?;
                refine::merge(&mut compiled.class, &response, &mut compiled.diagnostics);
            }
        }
        Ok(compiled)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        let target = match &self.cmd {
            Command::Thingtalk(target) | Command::Json(target) => target,
        };
        // debug path
        if target.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }
        let compiled = target.compile()?;
        let src = match &self.cmd {
            Command::Thingtalk(_) => compiled.to_thingtalk(),
            Command::Json(_) => compiled.to_json()?,
        };
        write_output(target.out.as_deref(), &src)?;
        print_summary(&compiled);
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> std::io::Result<String> {
        match self {
            Source::Stdin => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
            Source::File(path) => std::fs::read_to_string(path),
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<Source>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<Source>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if pattern == "-" {
            if out.contains(&Source::Stdin) {
                bail!("stdin ('-') given more than once");
            }
            out.push(Source::Stdin);
        } else if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(Source::File(entry?));
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(Source::File(PathBuf::from(pattern)));
        }
    }

    Ok(out)
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn print_summary(compiled: &Compiled) {
    let diags: &Diagnostics = &compiled.diagnostics;
    for d in diags.warnings() {
        eprintln!("{}: {d}", "warning".yellow().bold());
    }
    let warnings = diags.warnings().count();
    let status = if warnings == 0 { "OK".green().bold() } else { "OK".yellow().bold() };
    eprintln!(
        "{status} {} queries, {} warnings, {} notes",
        compiled.class.queries.len(),
        warnings,
        diags.len() - warnings,
    );
}
