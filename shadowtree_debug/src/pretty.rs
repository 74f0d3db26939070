// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).
//! [`format_mutations`] renders a mutation list one line per mutation, which
//! is mostly useful in failing test output.

use std::fmt::Write as _;
use std::io::Write;

use shadowtree_core::diff::ReparentMode;
use shadowtree_core::mutation::{MutationCounts, ShadowViewMutation};
use shadowtree_core::trace::{
    DiffBeginEvent, DiffBranchEvent, DiffEndEvent, ReparentEvent, TraceSink, TransactionEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn counts(c: &MutationCounts) -> String {
    format!(
        "create={} delete={} insert={} remove={} update={}",
        c.create, c.delete, c.insert, c.remove, c.update
    )
}

fn mode_name(mode: ReparentMode) -> &'static str {
    match mode {
        ReparentMode::Flatten => "flatten",
        ReparentMode::Unflatten => "unflatten",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_diff_begin(&mut self, e: &DiffBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[diff:begin] diff={} surface={} root={}",
            e.diff_index, e.surface_id.0, e.root.0,
        );
    }

    fn on_diff_end(&mut self, e: &DiffEndEvent) {
        let _ = writeln!(
            self.writer,
            "[diff:end] diff={} {}",
            e.diff_index,
            counts(&e.counts),
        );
    }

    fn on_transaction(&mut self, e: &TransactionEvent) {
        let _ = writeln!(
            self.writer,
            "[transaction] surface={} number={} {}",
            e.surface_id.0,
            e.number,
            counts(&e.counts),
        );
    }

    fn on_diff_branch(&mut self, e: &DiffBranchEvent) {
        let _ = writeln!(
            self.writer,
            "[branch] {} parent={} old={} new={}",
            e.branch.name(),
            e.parent.0,
            e.old_tag.0,
            e.new_tag.0,
        );
    }

    fn on_reparent(&mut self, e: &ReparentEvent) {
        let _ = writeln!(
            self.writer,
            "[reparent] {} node={} parent={}",
            mode_name(e.mode),
            e.node.0,
            e.parent.0,
        );
    }
}

/// Renders `mutations` one per line, as `kind tag [parent @index]`.
#[must_use]
pub fn format_mutations(mutations: &[ShadowViewMutation]) -> String {
    let mut out = String::new();
    for m in mutations {
        let name = m.kind().name();
        let tag = m.tag().0;
        let _ = match m {
            ShadowViewMutation::Create { new } => {
                writeln!(out, "{name} {tag} ({})", new.component_name)
            }
            ShadowViewMutation::Delete { .. } => writeln!(out, "{name} {tag}"),
            ShadowViewMutation::Insert { parent, index, .. }
            | ShadowViewMutation::Remove { parent, index, .. } => {
                writeln!(out, "{name} {tag} parent={} @{index}", parent.0)
            }
            ShadowViewMutation::Update { parent, old, new } => {
                let frame = if old.layout_metrics.frame == new.layout_metrics.frame {
                    String::new()
                } else {
                    format!(" frame={:?}", new.layout_metrics.frame)
                };
                writeln!(out, "{name} {tag} parent={}{frame}", parent.0)
            }
        };
    }
    out
}
