//! Brat standoff export.
//!
//! A debate becomes one text file with a statement per line and one
//! annotation file with its components (`T` lines) and relations (`R` lines).
//! Offsets are character offsets into the whole text. Two configuration files
//! let the export be dropped straight into a brat server.

use crate::error::Result;
use argmine_domain::component::char_len;
use argmine_domain::{ComponentLabel, DebateGraph, RelationLabel};
use std::fs;
use std::path::{Path, PathBuf};

const COMPONENT_LABELS: [ComponentLabel; 2] = [ComponentLabel::Claim, ComponentLabel::Premise];
const RELATION_LABELS: [RelationLabel; 2] = [RelationLabel::Attack, RelationLabel::Support];

/// The four files of a brat export
#[derive(Debug, Clone, PartialEq)]
pub struct BratExport {
    /// Base name of the `.txt` and `.ann` files
    pub name: String,

    /// `annotation.conf`
    pub annotation_conf: String,

    /// `tools.conf`
    pub tools_conf: String,

    /// Debate text, one statement per line
    pub text: String,

    /// Standoff annotations
    pub ann: String,
}

impl BratExport {
    /// Build the export of a debate graph
    pub fn from_graph(graph: &DebateGraph) -> Self {
        let mut text = String::new();
        let mut lines = Vec::new();
        for statement in &graph.statements {
            let offset = char_len(&text);
            text.push_str(&statement.text);
            text.push('\n');

            for component in graph.components_of(&statement.identifier) {
                lines.push(format!(
                    "T{}\t{} {} {}\t{}",
                    component.identifier,
                    component.label.code(),
                    component.start + offset,
                    component.end + offset,
                    component.fragment
                ));
            }
        }
        for (index, relation) in graph.edges.iter().enumerate() {
            lines.push(format!(
                "R{}\t{} Source:T{} Target:T{}",
                index + 1,
                relation.label.code(),
                relation.source,
                relation.target
            ));
        }

        Self {
            name: graph.debate.identifier.to_string(),
            annotation_conf: annotation_conf(),
            tools_conf: tools_conf(),
            text,
            ann: lines.join("\n"),
        }
    }

    /// Write the four files into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let files = [
            ("annotation.conf".to_string(), &self.annotation_conf),
            ("tools.conf".to_string(), &self.tools_conf),
            (format!("{}.txt", self.name), &self.text),
            (format!("{}.ann", self.name), &self.ann),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = dir.join(name);
            fs::write(&path, contents)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn annotation_conf() -> String {
    let entities: Vec<&str> = COMPONENT_LABELS.iter().map(|l| l.code()).collect();
    let endpoints = entities.join("|");

    let mut lines = vec!["[entities]".to_string()];
    lines.extend(entities.iter().map(|e| e.to_string()));
    lines.push("[relations]".to_string());
    lines.extend(
        RELATION_LABELS
            .iter()
            .map(|label| format!("{}\tSource:{}, Target:{}", label.code(), endpoints, endpoints)),
    );
    lines.push("[events]".to_string());
    lines.push("[attributes]".to_string());
    lines.join("\n")
}

fn tools_conf() -> String {
    // newline splitting keeps brat from breaking a statement into sentences
    [
        "[options]",
        "Validation\tvalidate:all",
        "Tokens\ttokenizer:whitespace",
        "Sentences\tsplitter:newline",
        "Annotation-log\tlogfile:<NONE>",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::{
        Component, Debate, IdentityEngine, Identifier, Relation, Statement, StatementDraft,
    };
    use tempfile::TempDir;

    fn statement(engine: &IdentityEngine, debate: &Debate, text: &str) -> Statement {
        let author = engine.identifier(&["author"]);
        let draft = StatementDraft::new(text, debate.identifier.clone(), author);
        let id = draft.build_identifier(engine);
        draft.into_statement(id)
    }

    fn component(
        engine: &IdentityEngine,
        statement: &Statement,
        start: usize,
        end: usize,
        label: ComponentLabel,
    ) -> Component {
        let fragment: String = statement.text.chars().skip(start).take(end - start).collect();
        Component {
            identifier: engine.identifier(&[fragment.as_str(), statement.identifier.as_str()]),
            statement: statement.identifier.clone(),
            start,
            end,
            label,
            score: 0.9,
            fragment,
            manual_annotation: false,
        }
    }

    fn graph() -> (DebateGraph, Vec<Identifier>) {
        let engine = IdentityEngine::default();
        let debate = Debate::new(&engine, "Café talk", None);
        // multi-byte characters make byte and char offsets differ
        let first = statement(&engine, &debate, "Café prices rise. Wages do not.");
        let second = statement(&engine, &debate, "Rent is the real problem.");

        let c1 = component(&engine, &first, 0, 16, ComponentLabel::Claim);
        let c2 = component(&engine, &first, 18, 30, ComponentLabel::Premise);
        let c3 = component(&engine, &second, 0, 24, ComponentLabel::Claim);
        let ids = vec![c1.identifier.clone(), c2.identifier.clone(), c3.identifier.clone()];

        let edges = vec![
            Relation::new(c2.identifier.clone(), c1.identifier.clone(), RelationLabel::Support, 0.8),
            Relation::new(c3.identifier.clone(), c1.identifier.clone(), RelationLabel::Attack, 0.7),
        ];

        let graph = DebateGraph {
            debate,
            statements: vec![first, second],
            nodes: vec![c1, c2, c3],
            edges,
        };
        (graph, ids)
    }

    #[test]
    fn test_text_one_statement_per_line() {
        let (graph, _) = graph();
        let export = BratExport::from_graph(&graph);
        assert_eq!(export.text, "Café prices rise. Wages do not.\nRent is the real problem.\n");
        assert_eq!(export.name, graph.debate.identifier.to_string());
    }

    #[test]
    fn test_ann_offsets_shifted_by_statement() {
        let (graph, ids) = graph();
        let export = BratExport::from_graph(&graph);
        let lines: Vec<&str> = export.ann.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], format!("T{}\tCL 0 16\tCafé prices rise", ids[0]));
        assert_eq!(lines[1], format!("T{}\tPR 18 30\tWages do not", ids[1]));
        // "Café prices rise. Wages do not.\n" is 32 characters
        assert_eq!(lines[2], format!("T{}\tCL 32 56\tRent is the real problem", ids[2]));
        assert_eq!(lines[3], format!("R1\tSUP Source:T{} Target:T{}", ids[1], ids[0]));
        assert_eq!(lines[4], format!("R2\tATT Source:T{} Target:T{}", ids[2], ids[0]));

        let text: Vec<char> = export.text.chars().collect();
        let sliced: String = text[32..56].iter().collect();
        assert_eq!(sliced, "Rent is the real problem");
    }

    #[test]
    fn test_annotation_conf() {
        let conf = annotation_conf();
        assert_eq!(
            conf,
            "[entities]\nCL\nPR\n[relations]\nATT\tSource:CL|PR, Target:CL|PR\nSUP\tSource:CL|PR, Target:CL|PR\n[events]\n[attributes]"
        );
        assert!(tools_conf().contains("Sentences\tsplitter:newline"));
    }

    #[test]
    fn test_write_to_directory() {
        let (graph, _) = graph();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("brat");

        let written = BratExport::from_graph(&graph).write_to(&out).unwrap();
        assert_eq!(written.len(), 4);
        assert!(out.join("annotation.conf").exists());
        assert!(out.join("tools.conf").exists());
        let name = graph.debate.identifier.to_string();
        assert!(out.join(format!("{}.txt", name)).exists());
        assert!(out.join(format!("{}.ann", name)).exists());
    }
}
