// Copyright 2026 the Shadowtree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. Each record starts with a
//! type byte and the time since the recorder was created, in nanoseconds.
//! [`decode`] reads them back as an iterator of [`Record`].

use std::time::Instant;

use shadowtree_core::diff::ReparentMode;
use shadowtree_core::mutation::MutationCounts;
use shadowtree_core::node::{SurfaceId, Tag};
use shadowtree_core::trace::{
    DiffBeginEvent, DiffBranch, DiffBranchEvent, DiffEndEvent, ReparentEvent, TraceSink,
    TransactionEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_DIFF_BEGIN: u8 = 1;
const TAG_DIFF_END: u8 = 2;
const TAG_TRANSACTION: u8 = 3;
const TAG_DIFF_BRANCH: u8 = 4;
const TAG_REPARENT: u8 = 5;

const BRANCHES: [DiffBranch; 10] = [
    DiffBranch::TagsDiffer,
    DiffBranch::Matched,
    DiffBranch::DeleteTail,
    DiffBranch::CreateTail,
    DiffBranch::MatchedInOrder,
    DiffBranch::Reordered,
    DiffBranch::Removed,
    DiffBranch::Inserted,
    DiffBranch::Deleted,
    DiffBranch::Created,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Offsets are measured from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin_record(&mut self, tag: u8) {
        let nanos = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.write_u8(tag);
        self.write_u64(nanos);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_counts(&mut self, c: &MutationCounts) {
        for v in [c.create, c.delete, c.insert, c.remove, c.update] {
            self.write_u32(v);
        }
    }

    fn write_branch(&mut self, b: DiffBranch) {
        let index = BRANCHES.iter().position(|&x| x == b).unwrap_or(0);
        self.write_u8(u8::try_from(index).unwrap_or(0));
    }
}

impl TraceSink for RecorderSink {
    fn on_diff_begin(&mut self, e: &DiffBeginEvent) {
        self.begin_record(TAG_DIFF_BEGIN);
        self.write_u32(e.diff_index);
        self.write_i32(e.surface_id.0);
        self.write_i32(e.root.0);
    }

    fn on_diff_end(&mut self, e: &DiffEndEvent) {
        self.begin_record(TAG_DIFF_END);
        self.write_u32(e.diff_index);
        self.write_counts(&e.counts);
    }

    fn on_transaction(&mut self, e: &TransactionEvent) {
        self.begin_record(TAG_TRANSACTION);
        self.write_i32(e.surface_id.0);
        self.write_u64(e.number);
        self.write_counts(&e.counts);
    }

    fn on_diff_branch(&mut self, e: &DiffBranchEvent) {
        self.begin_record(TAG_DIFF_BRANCH);
        self.write_branch(e.branch);
        self.write_i32(e.parent.0);
        self.write_i32(e.old_tag.0);
        self.write_i32(e.new_tag.0);
    }

    fn on_reparent(&mut self, e: &ReparentEvent) {
        self.begin_record(TAG_REPARENT);
        self.write_u8(match e.mode {
            ReparentMode::Flatten => 0,
            ReparentMode::Unflatten => 1,
        });
        self.write_i32(e.node.0);
        self.write_i32(e.parent.0);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`DiffBeginEvent`].
    DiffBegin(DiffBeginEvent),
    /// A [`DiffEndEvent`].
    DiffEnd(DiffEndEvent),
    /// A [`TransactionEvent`].
    Transaction(TransactionEvent),
    /// A [`DiffBranchEvent`].
    DiffBranch(DiffBranchEvent),
    /// A [`ReparentEvent`].
    Reparent(ReparentEvent),
}

/// One decoded record.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    /// Nanoseconds between creating the recorder and the event.
    pub offset_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_tag(&mut self) -> Option<Tag> {
        self.read_i32().map(Tag)
    }

    fn read_counts(&mut self) -> Option<MutationCounts> {
        Some(MutationCounts {
            create: self.read_u32()?,
            delete: self.read_u32()?,
            insert: self.read_u32()?,
            remove: self.read_u32()?,
            update: self.read_u32()?,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_DIFF_BEGIN => RecordedEvent::DiffBegin(DiffBeginEvent {
                diff_index: self.read_u32()?,
                surface_id: SurfaceId(self.read_i32()?),
                root: self.read_tag()?,
            }),
            TAG_DIFF_END => RecordedEvent::DiffEnd(DiffEndEvent {
                diff_index: self.read_u32()?,
                counts: self.read_counts()?,
            }),
            TAG_TRANSACTION => RecordedEvent::Transaction(TransactionEvent {
                surface_id: SurfaceId(self.read_i32()?),
                number: self.read_u64()?,
                counts: self.read_counts()?,
            }),
            TAG_DIFF_BRANCH => RecordedEvent::DiffBranch(DiffBranchEvent {
                branch: *BRANCHES.get(usize::from(self.read_u8()?))?,
                parent: self.read_tag()?,
                old_tag: self.read_tag()?,
                new_tag: self.read_tag()?,
            }),
            TAG_REPARENT => RecordedEvent::Reparent(ReparentEvent {
                mode: match self.read_u8()? {
                    0 => ReparentMode::Flatten,
                    _ => ReparentMode::Unflatten,
                },
                node: self.read_tag()?,
                parent: self.read_tag()?,
            }),
            // Unknown tag: stop iteration.
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let offset_nanos = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Record {
            offset_nanos,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> MutationCounts {
        MutationCounts {
            create: 3,
            delete: 1,
            insert: 3,
            remove: 1,
            update: 2,
        }
    }

    #[test]
    fn round_trip_diff_events() {
        let mut rec = RecorderSink::new();
        rec.on_diff_begin(&DiffBeginEvent {
            diff_index: 9,
            surface_id: SurfaceId(2),
            root: Tag(1),
        });
        rec.on_diff_end(&DiffEndEvent {
            diff_index: 9,
            counts: counts(),
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].offset_nanos <= records[1].offset_nanos);
        match records[0].event {
            RecordedEvent::DiffBegin(e) => {
                assert_eq!(e.diff_index, 9);
                assert_eq!(e.surface_id, SurfaceId(2));
                assert_eq!(e.root, Tag(1));
            }
            other => panic!("expected DiffBegin, got {other:?}"),
        }
        match records[1].event {
            RecordedEvent::DiffEnd(e) => {
                assert_eq!(e.diff_index, 9);
                assert_eq!(e.counts, counts());
            }
            other => panic!("expected DiffEnd, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_transaction() {
        let mut rec = RecorderSink::new();
        rec.on_transaction(&TransactionEvent {
            surface_id: SurfaceId(-4),
            number: 12,
            counts: counts(),
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        match records.as_slice() {
            [
                Record {
                    event: RecordedEvent::Transaction(e),
                    ..
                },
            ] => {
                assert_eq!(e.surface_id, SurfaceId(-4));
                assert_eq!(e.number, 12);
                assert_eq!(e.counts.total(), 10);
            }
            other => panic!("expected one Transaction, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_rich_events() {
        let mut rec = RecorderSink::new();
        rec.on_diff_branch(&DiffBranchEvent {
            branch: DiffBranch::Reordered,
            parent: Tag(10),
            old_tag: Tag(102),
            new_tag: Tag(102),
        });
        rec.on_reparent(&ReparentEvent {
            mode: ReparentMode::Unflatten,
            node: Tag(21),
            parent: Tag(20),
        });

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 2);
        match records[0].event {
            RecordedEvent::DiffBranch(e) => {
                assert_eq!(e.branch, DiffBranch::Reordered);
                assert_eq!((e.parent, e.old_tag, e.new_tag), (Tag(10), Tag(102), Tag(102)));
            }
            other => panic!("expected DiffBranch, got {other:?}"),
        }
        match records[1].event {
            RecordedEvent::Reparent(e) => {
                assert_eq!(e.mode, ReparentMode::Unflatten);
                assert_eq!((e.node, e.parent), (Tag(21), Tag(20)));
            }
            other => panic!("expected Reparent, got {other:?}"),
        }
    }

    #[test]
    fn every_branch_survives_recording() {
        let mut rec = RecorderSink::new();
        for branch in BRANCHES {
            rec.on_diff_branch(&DiffBranchEvent {
                branch,
                parent: Tag(1),
                old_tag: Tag::NONE,
                new_tag: Tag(2),
            });
        }
        let decoded: Vec<_> = decode(rec.as_bytes())
            .map(|r| match r.event {
                RecordedEvent::DiffBranch(e) => e.branch,
                other => panic!("expected DiffBranch, got {other:?}"),
            })
            .collect();
        assert_eq!(decoded, BRANCHES);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_diff_begin(&DiffBeginEvent {
            diff_index: 1,
            surface_id: SurfaceId(1),
            root: Tag(1),
        });
        let bytes = rec.into_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
    }
}
