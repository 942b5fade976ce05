//! Flow definitions consumed by the layout engine.
//!
//! A flow is a trigger followed by a linked chain of actions. Composite
//! actions own nested chains: a branch has a success and a failure chain, a
//! router has one chain per named output and a loop has a single body chain.
//! Children are owned through `Box`, so a loaded flow is always a finite tree.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid flow JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read flow file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown step type '{kind}' on step '{name}'")]
    UnknownStepType { name: String, kind: String },
    #[error("flow must start with a trigger, found {kind} step '{name}'")]
    RootNotTrigger { name: String, kind: &'static str },
    #[error("trigger '{name}' can only appear at the root of a flow")]
    NestedTrigger { name: String },
    #[error("step name '{name}' is used more than once")]
    DuplicateStepName { name: String },
    #[error("router '{name}' declares no outputs")]
    EmptyRouter { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub name: String,
    pub display_name: String,
    pub kind: StepKind,
    pub next_action: Option<Box<Step>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Trigger,
    Action,
    Branch {
        on_success_action: Option<Box<Step>>,
        on_failure_action: Option<Box<Step>>,
    },
    Router {
        children: IndexMap<String, Option<Box<Step>>>,
    },
    LoopOnItems {
        first_loop_action: Option<Box<Step>>,
    },
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Branch { .. } => "branch",
            Self::Router { .. } => "router",
            Self::LoopOnItems { .. } => "loop",
        }
    }
}

impl Step {
    pub fn trigger(name: &str) -> Self {
        Self::new(name, StepKind::Trigger)
    }

    pub fn action(name: &str) -> Self {
        Self::new(name, StepKind::Action)
    }

    pub fn branch(name: &str, on_success: Option<Step>, on_failure: Option<Step>) -> Self {
        Self::new(
            name,
            StepKind::Branch {
                on_success_action: on_success.map(Box::new),
                on_failure_action: on_failure.map(Box::new),
            },
        )
    }

    pub fn router<I, S>(name: &str, children: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Step>)>,
        S: Into<String>,
    {
        let children = children
            .into_iter()
            .map(|(output, child)| (output.into(), child.map(Box::new)))
            .collect();
        Self::new(name, StepKind::Router { children })
    }

    pub fn loop_on_items(name: &str, body: Option<Step>) -> Self {
        Self::new(
            name,
            StepKind::LoopOnItems {
                first_loop_action: body.map(Box::new),
            },
        )
    }

    fn new(name: &str, kind: StepKind) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            kind,
            next_action: None,
        }
    }

    /// Appends `next` at the end of this step's chain.
    pub fn then(mut self, next: Step) -> Self {
        let mut slot = &mut self.next_action;
        while let Some(step) = slot {
            slot = &mut step.next_action;
        }
        *slot = Some(Box::new(next));
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self.kind, StepKind::Trigger)
    }

    /// Depth-first walk: the step, its composite children in declared
    /// order, then whatever follows it.
    pub fn steps(&self) -> StepIter<'_> {
        StepIter { stack: vec![self] }
    }

    pub fn step_count(&self) -> usize {
        self.steps().count()
    }

    /// The final step of this step's own `next_action` chain.
    pub fn last_in_chain(&self) -> &Step {
        let mut current = self;
        while let Some(next) = current.next_action.as_deref() {
            current = next;
        }
        current
    }

    pub fn find(&self, name: &str) -> Option<&Step> {
        self.steps().find(|step| step.name == name)
    }

    fn children(&self) -> Vec<&Step> {
        match &self.kind {
            StepKind::Trigger | StepKind::Action => Vec::new(),
            StepKind::Branch {
                on_success_action,
                on_failure_action,
            } => on_success_action
                .iter()
                .chain(on_failure_action.iter())
                .map(|child| child.as_ref())
                .collect(),
            StepKind::Router { children } => children
                .values()
                .flatten()
                .map(|child| child.as_ref())
                .collect(),
            StepKind::LoopOnItems { first_loop_action } => {
                first_loop_action.iter().map(|child| child.as_ref()).collect()
            }
        }
    }
}

pub struct StepIter<'a> {
    stack: Vec<&'a Step>,
}

impl<'a> Iterator for StepIter<'a> {
    type Item = &'a Step;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.stack.pop()?;
        if let Some(next) = step.next_action.as_deref() {
            self.stack.push(next);
        }
        for child in step.children().into_iter().rev() {
            self.stack.push(child);
        }
        Some(step)
    }
}

/// A versioned flow as stored by the host platform.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowVersion {
    pub display_name: String,
    pub trigger: Step,
}

impl FlowVersion {
    pub fn new(trigger: Step) -> Result<Self, FlowError> {
        let flow = Self {
            display_name: trigger.display_name.clone(),
            trigger,
        };
        flow.validate()?;
        Ok(flow)
    }

    pub fn from_json(input: &str) -> Result<Self, FlowError> {
        let raw: RawFlowVersion = serde_json::from_str(input)?;
        let trigger = raw.trigger.into_step()?;
        let flow = Self {
            display_name: raw.display_name.unwrap_or_else(|| "Untitled".to_string()),
            trigger,
        };
        flow.validate()?;
        Ok(flow)
    }

    pub fn from_path(path: &Path) -> Result<Self, FlowError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if !self.trigger.is_trigger() {
            return Err(FlowError::RootNotTrigger {
                name: self.trigger.name.clone(),
                kind: self.trigger.kind.label(),
            });
        }
        let mut seen = HashSet::new();
        for (idx, step) in self.trigger.steps().enumerate() {
            if idx > 0 && step.is_trigger() {
                return Err(FlowError::NestedTrigger {
                    name: step.name.clone(),
                });
            }
            if !seen.insert(step.name.as_str()) {
                return Err(FlowError::DuplicateStepName {
                    name: step.name.clone(),
                });
            }
            if let StepKind::Router { children } = &step.kind
                && children.is_empty()
            {
                return Err(FlowError::EmptyRouter {
                    name: step.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// The last step under the trigger: the tail of the trigger's own chain.
    pub fn last_top_level_step(&self) -> &Step {
        self.trigger.last_in_chain()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlowVersion {
    display_name: Option<String>,
    trigger: RawStep,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStep {
    name: String,
    display_name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    next_action: Option<Box<RawStep>>,
    on_success_action: Option<Box<RawStep>>,
    on_failure_action: Option<Box<RawStep>>,
    first_loop_action: Option<Box<RawStep>>,
    #[serde(default)]
    children: IndexMap<String, Option<RawStep>>,
}

impl RawStep {
    fn into_step(self) -> Result<Step, FlowError> {
        let kind = match self.kind.as_str() {
            "EMPTY" | "WEBHOOK" | "PIECE_TRIGGER" => StepKind::Trigger,
            "CODE" | "PIECE" => StepKind::Action,
            "BRANCH" => StepKind::Branch {
                on_success_action: convert_child(self.on_success_action)?,
                on_failure_action: convert_child(self.on_failure_action)?,
            },
            "ROUTER" => {
                let mut children = IndexMap::with_capacity(self.children.len());
                for (output, child) in self.children {
                    let child = match child {
                        Some(raw) => Some(Box::new(raw.into_step()?)),
                        None => None,
                    };
                    children.insert(output, child);
                }
                StepKind::Router { children }
            }
            "LOOP_ON_ITEMS" => StepKind::LoopOnItems {
                first_loop_action: convert_child(self.first_loop_action)?,
            },
            _ => {
                return Err(FlowError::UnknownStepType {
                    name: self.name.clone(),
                    kind: self.kind.clone(),
                });
            }
        };
        Ok(Step {
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            kind,
            next_action: convert_child(self.next_action)?,
        })
    }
}

fn convert_child(raw: Option<Box<RawStep>>) -> Result<Option<Box<Step>>, FlowError> {
    raw.map(|raw| raw.into_step().map(Box::new)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "displayName": "Triage",
        "trigger": {
            "name": "trigger",
            "type": "WEBHOOK",
            "displayName": "Catch Webhook",
            "nextAction": {
                "name": "step_1",
                "type": "BRANCH",
                "onSuccessAction": { "name": "step_2", "type": "CODE" },
                "nextAction": {
                    "name": "step_3",
                    "type": "LOOP_ON_ITEMS",
                    "firstLoopAction": { "name": "step_4", "type": "PIECE" }
                }
            }
        }
    }"#;

    #[test]
    fn loads_nested_flow() {
        let flow = FlowVersion::from_json(SAMPLE).unwrap();
        assert_eq!(flow.display_name, "Triage");
        assert_eq!(flow.trigger.display_name, "Catch Webhook");
        let names: Vec<&str> = flow.trigger.steps().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["trigger", "step_1", "step_2", "step_3", "step_4"]);
        assert_eq!(flow.last_top_level_step().name, "step_3");
    }

    #[test]
    fn router_outputs_keep_declared_order() {
        let input = r#"{
            "trigger": {
                "name": "trigger", "type": "EMPTY",
                "nextAction": {
                    "name": "router", "type": "ROUTER",
                    "children": { "zeta": null, "alpha": { "name": "a", "type": "CODE" }, "mid": null }
                }
            }
        }"#;
        let flow = FlowVersion::from_json(input).unwrap();
        let router = flow.trigger.find("router").unwrap();
        let StepKind::Router { children } = &router.kind else {
            panic!("expected router");
        };
        let keys: Vec<&str> = children.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_unknown_type() {
        let input = r#"{ "trigger": { "name": "t", "type": "NOPE" } }"#;
        let err = FlowVersion::from_json(input).unwrap_err();
        assert!(matches!(err, FlowError::UnknownStepType { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let trigger = Step::trigger("trigger").then(Step::action("a")).then(Step::action("a"));
        let err = FlowVersion::new(trigger).unwrap_err();
        assert!(matches!(err, FlowError::DuplicateStepName { name } if name == "a"));
    }

    #[test]
    fn rejects_nested_trigger_and_non_trigger_root() {
        let nested = Step::trigger("t").then(Step::trigger("t2"));
        assert!(matches!(
            FlowVersion::new(nested).unwrap_err(),
            FlowError::NestedTrigger { .. }
        ));
        assert!(matches!(
            FlowVersion::new(Step::action("a")).unwrap_err(),
            FlowError::RootNotTrigger { .. }
        ));
    }

    #[test]
    fn rejects_router_without_outputs() {
        let router = Step::router::<_, String>("r", Vec::new());
        let err = FlowVersion::new(Step::trigger("t").then(router)).unwrap_err();
        assert!(matches!(err, FlowError::EmptyRouter { .. }));
    }

    #[test]
    fn step_count_covers_every_link() {
        let body = Step::action("b1").then(Step::action("b2"));
        let trigger = Step::trigger("t")
            .then(Step::branch("br", Some(Step::action("yes")), Some(Step::action("no"))))
            .then(Step::loop_on_items("loop", Some(body)))
            .then(Step::router("r", [("x", Some(Step::action("x1"))), ("y", None)]));
        assert_eq!(trigger.step_count(), 9);
    }
}
