// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Diffs become duration slices on one track per surface; everything else
//! becomes an instant event on that track.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::collections::HashMap;
use std::io::{self, Write};

use serde_json::{Value, json};

use shadowtree_core::diff::ReparentMode;
use shadowtree_core::mutation::MutationCounts;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Diff end and rich events carry no surface, so they go on the track of the
/// diff that was open when they were recorded.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // Diff index -> surface, for diffs that have begun.
    let mut surfaces: HashMap<u32, i32> = HashMap::new();
    let mut current_surface = 0;

    for record in decode(bytes) {
        let ts = nanos_to_us(record.offset_nanos);
        match record.event {
            RecordedEvent::DiffBegin(e) => {
                surfaces.insert(e.diff_index, e.surface_id.0);
                current_surface = e.surface_id.0;
                events.push(json!({
                    "ph": "B",
                    "name": "Diff",
                    "cat": "Diff",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.surface_id.0,
                    "args": {
                        "diff_index": e.diff_index,
                        "root": e.root.0,
                    }
                }));
            }
            RecordedEvent::DiffEnd(e) => {
                let surface = surfaces.remove(&e.diff_index).unwrap_or(current_surface);
                events.push(json!({
                    "ph": "E",
                    "name": "Diff",
                    "cat": "Diff",
                    "ts": ts,
                    "pid": 0,
                    "tid": surface,
                    "args": counts_json(e.diff_index.into(), &e.counts),
                }));
            }
            RecordedEvent::Transaction(e) => {
                current_surface = e.surface_id.0;
                events.push(json!({
                    "ph": "i",
                    "name": "Transaction",
                    "cat": "Mount",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.surface_id.0,
                    "s": "t",
                    "args": counts_json(e.number, &e.counts),
                }));
            }
            RecordedEvent::DiffBranch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": e.branch.name(),
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": current_surface,
                    "s": "t",
                    "args": {
                        "parent": e.parent.0,
                        "old_tag": e.old_tag.0,
                        "new_tag": e.new_tag.0,
                    }
                }));
            }
            RecordedEvent::Reparent(e) => {
                let name = match e.mode {
                    ReparentMode::Flatten => "Flatten",
                    ReparentMode::Unflatten => "Unflatten",
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": current_surface,
                    "s": "t",
                    "args": {
                        "node": e.node.0,
                        "parent": e.parent.0,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn counts_json(number: u64, c: &MutationCounts) -> Value {
    json!({
        "number": number,
        "create": c.create,
        "delete": c.delete,
        "insert": c.insert,
        "remove": c.remove,
        "update": c.update,
    })
}

#[expect(
    clippy::cast_precision_loss,
    reason = "trace offsets stay far below 2^53 ns"
)]
fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use shadowtree_core::diff::{DiffOptions, diff_with};
    use shadowtree_core::node::{
        ComponentHandle, ShadowNode, ShadowNodeFamily, ShadowNodeFamilyFragment,
        ShadowNodeFragment, ShadowNodeTraits, SimpleComponentDescriptor, SurfaceId, Tag,
    };
    use shadowtree_core::trace::Tracer;

    fn parse(bytes: &[u8]) -> Vec<Value> {
        let mut out = Vec::new();
        export(bytes, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn export_recorded_diff() {
        let family = |tag| {
            ShadowNodeFamily::new(
                ShadowNodeFamilyFragment {
                    tag: Tag(tag),
                    surface_id: SurfaceId(3),
                    event_emitter: None,
                },
                SimpleComponentDescriptor::shared("View", ComponentHandle(1), ShadowNodeTraits::VIEW),
            )
        };
        let root = ShadowNode::new(ShadowNodeFragment::new(), family(1));
        let grown = root.with_children([ShadowNode::new(ShadowNodeFragment::new(), family(2))]);

        let mut rec = RecorderSink::new();
        let _ = diff_with(&root, &grown, &DiffOptions::DEFAULT, &mut Tracer::new(&mut rec));
        let parsed = parse(rec.as_bytes());

        let slices: Vec<_> = parsed.iter().filter(|e| e["cat"] == "Diff").collect();
        assert_eq!(slices.len(), 2, "one begin and one end");
        assert_eq!(slices[0]["ph"], "B", "first slice event opens");
        assert_eq!(slices[0]["tid"], 3, "track is the surface");
        assert_eq!(slices[1]["ph"], "E", "second slice event closes");
        assert_eq!(slices[1]["tid"], 3, "end lands on the same track");
        assert_eq!(slices[1]["args"]["create"], 1, "one create");
        assert_eq!(slices[1]["args"]["insert"], 1, "one insert");
        // The branch taken for the new child is recorded in between.
        assert!(
            parsed.iter().any(|e| e["name"] == "create-tail"),
            "got: {parsed:?}"
        );
    }

    #[test]
    fn export_empty_recording() {
        assert!(parse(&[]).is_empty(), "no records, no events");
    }
}
