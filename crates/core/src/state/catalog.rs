//! The built-in stage catalog.
//!
//! Six records in execution order. The last two describe the same
//! validation step and differ only in id.

use gta_protocol::stage_models::{Stage, StageId, StageStatus};

struct StageSpec {
    id: StageId,
    name: &'static str,
    agent_name: &'static str,
    description: &'static str,
    model: &'static str,
    temperature: f32,
    tools: &'static [&'static str],
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
}

const VALIDATION: StageSpec = StageSpec {
    id: 5,
    name: "Validation & Reporting",
    agent_name: "Reviewer Agent",
    description: "Validates the theory against raw data and generates the final report.",
    model: "GPT-4o-mini",
    temperature: 0.1,
    tools: &["Citation Checker", "Report Formatter"],
    inputs: &["Theoretical Framework", "Raw Data"],
    outputs: &["Final Report", "Validation Score"],
};

const CATALOG: &[StageSpec] = &[
    StageSpec {
        id: 1,
        name: "Open Coding",
        agent_name: "Analyst Agent",
        description:
            "Breaks down raw data into discrete parts, examining interactions and events.",
        model: "GPT-4o",
        temperature: 0.2,
        tools: &["Text Splitter", "Keyword Extractor"],
        inputs: &["Raw Transcripts", "Field Notes", "Research Question"],
        outputs: &["Initial Codes", "Memo Drafts"],
    },
    StageSpec {
        id: 2,
        name: "Axial Coding [2]",
        agent_name: "Synthesizer Agent",
        description: "Relates categories to subcategories, testing relationships against data.",
        model: "Claude 3.5 Sonnet",
        temperature: 0.4,
        tools: &["Relationship Mapper", "Vector Search"],
        inputs: &["Initial Codes", "Context Tags"],
        outputs: &["Axial Categories", "Relationship Graph"],
    },
    StageSpec {
        id: 3,
        name: "Selective Coding",
        agent_name: "Architect Agent",
        description: "Unifies categories around a core \"story\" or central category.",
        model: "GPT-4o",
        temperature: 0.5,
        tools: &["Theme Aggregator", "Narrative Builder"],
        inputs: &["Axial Categories", "Memos"],
        outputs: &["Core Category", "Storyline"],
    },
    StageSpec {
        id: 4,
        name: "Theory Formulation",
        agent_name: "Theorist Agent",
        description:
            "Constructs the grounded theory based on the core categories and relationships.",
        model: "o1-preview",
        temperature: 0.7,
        tools: &["Logic Validator", "Proposition Generator"],
        inputs: &["Core Category", "Relationships"],
        outputs: &["Theoretical Framework", "Propositions"],
    },
    VALIDATION,
    StageSpec { id: 6, ..VALIDATION },
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl StageSpec {
    fn to_stage(&self) -> Stage {
        Stage {
            id: self.id,
            name: self.name.to_string(),
            agent_name: self.agent_name.to_string(),
            description: self.description.to_string(),
            status: StageStatus::Idle,
            logs: Vec::new(),
            output: None,
            model: self.model.to_string(),
            temperature: self.temperature,
            tools: strings(self.tools),
            inputs: strings(self.inputs),
            outputs: strings(self.outputs),
            started_at: None,
            completed_at: None,
        }
    }
}

/// The stages every dashboard starts with, all idle.
pub fn initial_stages() -> Vec<Stage> {
    CATALOG.iter().map(StageSpec::to_stage).collect()
}
