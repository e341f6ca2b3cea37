//! Compile a linked-data ontology (schema.org JSON-LD) into a ThingTalk class.
//!
//! ```no_run
//! use jsonld_osi::{Compiler, lower::LowerOptions, policy::Policy};
//!
//! let src = std::fs::read_to_string("schemaorg-current-https.jsonld")?;
//! let mut compiler = Compiler::new(Policy::default(), LowerOptions::default());
//! compiler.observe_str(&src)?;
//! let compiled = compiler.compile()?;
//! println!("{}", compiled.to_thingtalk());
//! # Ok::<(), jsonld_osi::error::CompileError>(())
//! ```
pub mod canonical;
pub mod codegen;
pub mod error;
pub mod facts;
pub mod hierarchy;
pub mod ir;
pub mod lower;
pub mod path_de;
pub mod policy;
pub mod refine;
pub mod resolve;
pub mod samples;

use serde_json::Value;

use error::{Diagnostics, Result};
use facts::{Fact, Namespace};
use hierarchy::TypeGraph;
use ir::ClassDef;
use lower::LowerOptions;
use policy::Policy;
use refine::RefinementOracle;
use samples::SampleSource;

/// Accumulates facts from any number of documents, then compiles them.
#[derive(Debug, Clone)]
pub struct Compiler {
    policy: Policy,
    options: LowerOptions,
    namespace: Namespace,
    facts: Vec<Fact>,
}

/// A compiled class plus everything recoverable that happened on the way.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub class: ClassDef,
    pub graph: TypeGraph,
    pub diagnostics: Diagnostics,
}

impl Compiler {
    pub fn new(policy: Policy, options: LowerOptions) -> Self {
        let namespace = policy.namespace();
        Self { policy, options, namespace, facts: Vec::new() }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn observe_str(&mut self, src: &str) -> Result<()> {
        let facts = facts::facts_from_str(src, &self.namespace)?;
        self.observe_facts(facts);
        Ok(())
    }

    pub fn observe_value(&mut self, value: Value) -> Result<()> {
        let facts = facts::facts_from_value(value, &self.namespace)?;
        self.observe_facts(facts);
        Ok(())
    }

    /// Documents are concatenated into one fact stream, in observation order.
    pub fn observe_facts(&mut self, facts: impl IntoIterator<Item = Fact>) {
        let before = self.facts.len();
        self.facts.extend(facts);
        tracing::debug!(added = self.facts.len() - before, total = self.facts.len(), "facts observed");
    }

    pub fn compile(&self) -> Result<Compiled> {
        let mut diagnostics = Diagnostics::new();
        let graph = hierarchy::analyze(&self.facts, &self.policy, &mut diagnostics);
        let class = lower::lower_class(&graph, &self.policy, &self.options, &mut diagnostics)?;
        Ok(Compiled { class, graph, diagnostics })
    }
}

impl Compiled {
    /// Run the annotator pre-pass and merge the oracle's answer.
    pub fn refine(
        &mut self,
        policy: &Policy,
        source: Option<&dyn SampleSource>,
        oracle: &dyn RefinementOracle,
    ) -> Result<()> {
        refine::refine(&mut self.class, policy, source, oracle, &mut self.diagnostics)
    }

    pub fn to_thingtalk(&self) -> String {
        codegen::to_thingtalk(&self.class)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.class)
    }
}
