use crate::layout::{BoundingBox, FlowDrawer, PositionButton, PositionLabel};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub bounding_box: BoundingBox,
    pub steps: Vec<StepDump>,
    pub path: String,
    pub buttons: Vec<PositionButton>,
    pub labels: Vec<PositionLabel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDump {
    /// `None` for an empty slot.
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub kind: Option<&'static str>,
    pub x: f32,
    pub y: f32,
}

impl LayoutDump {
    pub fn from_layout(layout: &FlowDrawer<'_>) -> Self {
        let steps = layout
            .steps
            .iter()
            .map(|step| StepDump {
                name: step.content.map(|s| s.name.clone()),
                display_name: step.content.map(|s| s.display_name.clone()),
                kind: step.content.map(|s| s.kind.label()),
                x: step.x,
                y: step.y,
            })
            .collect();

        LayoutDump {
            bounding_box: layout.bounding_box(),
            steps,
            path: layout.svg.to_path_data(),
            buttons: layout.buttons.clone(),
            labels: layout.labels.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &FlowDrawer<'_>) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
