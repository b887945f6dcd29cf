//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use argmine_domain::{Component, DebateGraph, LinkState, Relation, Statement};
use argmine_pipeline::PipelineReport;
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest text shown in a table cell
const CELL_WIDTH: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a pipeline run.
    pub fn format_report(&self, report: &PipelineReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<Value> = report
                    .failures
                    .iter()
                    .map(|f| json!({"kind": f.kind.to_string(), "reason": f.reason, "raw_text": f.raw_text}))
                    .collect();
                let counts = &report.counts;
                Ok(serde_json::to_string_pretty(&json!({
                    "debate": debate_json(&report.debate),
                    "statements": report.statements.iter().map(statement_json).collect::<Vec<_>>(),
                    "counts": {
                        "statements_created": counts.statements_created,
                        "statements_skipped": counts.statements_skipped,
                        "statements_classified": counts.statements_classified,
                        "components_created": counts.components_created,
                        "components_reused": counts.components_reused,
                        "relations_created": counts.relations_created,
                        "links_created": counts.links_created,
                        "links_rejected": counts.links_rejected,
                        "cross_relations_created": counts.cross_relations_created
                    },
                    "failures": failures,
                    "processing_time_ms": report.processing_time_ms
                }))?)
            }
            OutputFormat::Table => {
                let counts = &report.counts;
                let mut out = vec![
                    self.success(&format!(
                        "Debate '{}' ({}) processed in {} ms",
                        report.debate.name, report.debate.identifier, report.processing_time_ms
                    )),
                    format!(
                        "Statements: {} created, {} skipped, {} classified",
                        counts.statements_created, counts.statements_skipped, counts.statements_classified
                    ),
                    format!(
                        "Components: {} created, {} reused",
                        counts.components_created, counts.components_reused
                    ),
                    format!(
                        "Relations: {} created, {} across statements",
                        counts.relations_created, counts.cross_relations_created
                    ),
                    format!(
                        "Links: {} created, {} without relation",
                        counts.links_created, counts.links_rejected
                    ),
                    self.statements_table(&report.statements),
                ];
                for failure in &report.failures {
                    out.push(self.warning(&format!(
                        "{} rejected: {} ({})",
                        failure.kind,
                        failure.reason,
                        truncate(&failure.raw_text)
                    )));
                }
                Ok(out.join("\n"))
            }
            OutputFormat::Quiet => Ok(identifiers(report.statements.iter().map(|s| s.identifier.as_str()))),
        }
    }

    /// Format the graph of a debate.
    pub fn format_graph(&self, graph: &DebateGraph) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "debate": debate_json(&graph.debate),
                "statements": graph.statements.iter().map(statement_json).collect::<Vec<_>>(),
                "nodes": graph.nodes.iter().map(component_json).collect::<Vec<_>>(),
                "edges": graph.edges.iter().map(relation_json).collect::<Vec<_>>()
            }))?),
            OutputFormat::Table => Ok([
                self.info(&format!(
                    "Debate '{}' ({}): {} statements, {} components, {} relations",
                    graph.debate.name,
                    graph.debate.identifier,
                    graph.statements.len(),
                    graph.nodes.len(),
                    graph.edges.len()
                )),
                self.statements_table(&graph.statements),
                self.components_table(&graph.nodes),
                self.relations_table(&graph.edges),
            ]
            .join("\n")),
            OutputFormat::Quiet => Ok(identifiers(graph.nodes.iter().map(|c| c.identifier.as_str()))),
        }
    }

    /// Format a statement with its components.
    pub fn format_statement(&self, statement: &Statement, components: &[Component]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = statement_json(statement);
                value["components"] = Value::Array(components.iter().map(component_json).collect());
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => Ok([
                self.statements_table(std::slice::from_ref(statement)),
                statement.text.clone(),
                self.components_table(components),
            ]
            .join("\n")),
            OutputFormat::Quiet => Ok(statement.identifier.to_string()),
        }
    }

    /// Format a component with its incoming and outgoing relations.
    pub fn format_component(&self, component: &Component, relations: &[Relation]) -> Result<String> {
        let outgoing: Vec<&Relation> = relations.iter().filter(|r| r.source == component.identifier).collect();
        let incoming: Vec<&Relation> = relations.iter().filter(|r| r.target == component.identifier).collect();

        match self.format {
            OutputFormat::Json => {
                let mut value = component_json(component);
                value["outgoing"] = Value::Array(outgoing.iter().map(|r| relation_json(r)).collect());
                value["incoming"] = Value::Array(incoming.iter().map(|r| relation_json(r)).collect());
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let edges: Vec<Relation> = outgoing.into_iter().chain(incoming).cloned().collect();
                Ok([
                    self.components_table(std::slice::from_ref(component)),
                    self.relations_table(&edges),
                ]
                .join("\n"))
            }
            OutputFormat::Quiet => Ok(component.identifier.to_string()),
        }
    }

    fn statements_table(&self, statements: &[Statement]) -> String {
        if statements.is_empty() {
            return self.colorize("No statements found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Role", "Score", "Related To", "Relation", "Manual", "Text"]);
        for statement in statements {
            let (related, relation) = match statement.link_state() {
                LinkState::Unevaluated => ("-".to_string(), "-".to_string()),
                LinkState::NoRelation => ("-".to_string(), "none".to_string()),
                LinkState::Linked { target, score } => (target.to_string(), optional_score(score)),
            };
            builder.push_record([
                statement.identifier.to_string(),
                statement.role.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                optional_score(statement.classification_score),
                related,
                relation,
                yes_no(statement.manual_annotation).to_string(),
                truncate(&statement.text),
            ]);
        }
        render(builder)
    }

    fn components_table(&self, components: &[Component]) -> String {
        if components.is_empty() {
            return self.colorize("No components found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Label", "Span", "Score", "Fragment"]);
        for component in components {
            builder.push_record([
                component.identifier.to_string(),
                component.label.to_string(),
                format!("[{}, {})", component.start, component.end),
                format!("{:.2}", component.score),
                truncate(&component.fragment),
            ]);
        }
        render(builder)
    }

    fn relations_table(&self, relations: &[Relation]) -> String {
        if relations.is_empty() {
            return self.colorize("No relations found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Source", "Label", "Target", "Score", "Manual"]);
        for relation in relations {
            builder.push_record([
                relation.source.to_string(),
                relation.label.to_string(),
                relation.target.to_string(),
                format!("{:.2}", relation.score),
                yes_no(relation.manual_annotation).to_string(),
            ]);
        }
        render(builder)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn identifiers<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= CELL_WIDTH {
        return text.to_string();
    }
    let head: String = text.chars().take(CELL_WIDTH - 1).collect();
    format!("{}…", head)
}

fn optional_score(score: Option<f64>) -> String {
    score.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn debate_json(debate: &argmine_domain::Debate) -> Value {
    json!({
        "identifier": debate.identifier.as_str(),
        "name": debate.name,
        "source": debate.source
    })
}

fn statement_json(statement: &Statement) -> Value {
    json!({
        "identifier": statement.identifier.as_str(),
        "text": statement.text,
        "debate": statement.debate.as_str(),
        "author": statement.author.as_str(),
        "role": statement.role.map(|r| r.as_str()),
        "classification_score": statement.classification_score,
        "related_to": statement.related_to.as_ref().map(|id| id.as_str()),
        "relation_score": statement.relation_score,
        "manual_annotation": statement.manual_annotation
    })
}

fn component_json(component: &Component) -> Value {
    json!({
        "identifier": component.identifier.as_str(),
        "statement": component.statement.as_str(),
        "start": component.start,
        "end": component.end,
        "label": component.label.as_str(),
        "score": component.score,
        "fragment": component.fragment,
        "manual_annotation": component.manual_annotation
    })
}

fn relation_json(relation: &Relation) -> Value {
    json!({
        "source": relation.source.as_str(),
        "target": relation.target.as_str(),
        "label": relation.label.as_str(),
        "score": relation.score,
        "manual_annotation": relation.manual_annotation
    })
}
