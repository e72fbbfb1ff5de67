use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ContentError;

/// Node id used as the entry point of a branching dialogue when present.
pub const START_NODE: &str = "start";

/// One step of a branching conversation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueNode {
    pub text: String,
    /// Answer options offered to the player, if this node asks a question.
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    #[serde(default)]
    pub correct_index: Option<usize>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub on_correct: Option<String>,
    #[serde(default)]
    pub on_wrong: Option<String>,
}

impl DialogueNode {
    fn targets(&self) -> impl Iterator<Item = &str> {
        [&self.next, &self.on_correct, &self.on_wrong]
            .into_iter()
            .filter_map(|t| t.as_deref())
    }
}

/// How the player left a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Continue,
    Correct,
    Wrong,
}

/// A character's lines: either a fixed script or a graph of nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawDialogue")]
pub enum Dialogue {
    Linear(Vec<String>),
    Branching {
        start: String,
        nodes: BTreeMap<String, DialogueNode>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDialogue {
    Lines(Vec<String>),
    Nodes(BTreeMap<String, DialogueNode>),
}

impl From<RawDialogue> for Dialogue {
    fn from(raw: RawDialogue) -> Self {
        match raw {
            RawDialogue::Lines(lines) => Dialogue::Linear(lines),
            RawDialogue::Nodes(nodes) => {
                let start = if nodes.contains_key(START_NODE) {
                    START_NODE.to_string()
                } else {
                    nodes.keys().next().cloned().unwrap_or_default()
                };
                Dialogue::Branching { start, nodes }
            }
        }
    }
}

impl Default for Dialogue {
    fn default() -> Self {
        Dialogue::Linear(Vec::new())
    }
}

impl Dialogue {
    /// Parse a standalone `dialogue.json`.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let dialogue: Dialogue = serde_json::from_str(json)?;
        dialogue.validate()?;
        Ok(dialogue)
    }

    /// Check that every branch points at an existing node.
    pub fn validate(&self) -> Result<(), ContentError> {
        if let Dialogue::Branching { nodes, .. } = self {
            if nodes.is_empty() {
                return Err(ContentError::EmptyDialogue);
            }
            for (id, node) in nodes {
                if let Some(missing) = node.targets().find(|t| !nodes.contains_key(*t)) {
                    return Err(ContentError::DanglingDialogue {
                        from: id.clone(),
                        to: missing.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn is_branching(&self) -> bool {
        matches!(self, Dialogue::Branching { .. })
    }

    /// Number of lines (linear) or nodes (branching).
    pub fn line_count(&self) -> usize {
        match self {
            Dialogue::Linear(lines) => lines.len(),
            Dialogue::Branching { nodes, .. } => nodes.len(),
        }
    }

    /// Line `index` of a linear script.
    pub fn line(&self, index: usize) -> Option<&str> {
        match self {
            Dialogue::Linear(lines) => lines.get(index).map(String::as_str),
            Dialogue::Branching { .. } => None,
        }
    }

    /// Entry node of a branching graph.
    pub fn start(&self) -> Option<(&str, &DialogueNode)> {
        match self {
            Dialogue::Branching { start, nodes } => {
                nodes.get(start).map(|n| (start.as_str(), n))
            }
            Dialogue::Linear(_) => None,
        }
    }

    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        match self {
            Dialogue::Branching { nodes, .. } => nodes.get(id),
            Dialogue::Linear(_) => None,
        }
    }

    /// Id of the node reached from `id` given the player's reply.
    /// Correct/wrong replies fall back to `next` when the node has no
    /// dedicated branch.
    pub fn follow(&self, id: &str, reply: Reply) -> Option<&str> {
        let node = self.node(id)?;
        let branch = match reply {
            Reply::Continue => None,
            Reply::Correct => node.on_correct.as_deref(),
            Reply::Wrong => node.on_wrong.as_deref(),
        };
        branch.or(node.next.as_deref())
    }
}
