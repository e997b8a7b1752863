use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};
use trove_codec::QuadCodec;
use trove_types::{Instant, Quad, VersionRange};

use crate::entry::{add_line, begin_marker, delete_line, end_marker, Entry};
use crate::error::JournalResult;
use crate::layout;
use crate::reconstruct::StateReader;
use crate::reverse::{ReverseLineReader, DEFAULT_BLOCK_SIZE};
use crate::timemap::VersionMapReader;

/// Reader tuning for a [`Journal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JournalOptions {
    /// Block size of the backward line reader.
    pub block_size: usize,
}

impl Default for JournalOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// One unit of change: deletions, then additions, at a single instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Commit instant, written on both the begin and end markers.
    pub time: Instant,
    /// Idempotency key recorded on the begin marker.
    pub key: Option<String>,
    /// Quads removed, written before the additions.
    pub deletes: Vec<Quad>,
    /// Quads added.
    pub adds: Vec<Quad>,
}

impl Transaction {
    pub fn new(time: Instant) -> Self {
        Self {
            time,
            key: None,
            deletes: Vec::new(),
            adds: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn deleting(mut self, quads: impl IntoIterator<Item = Quad>) -> Self {
        self.deletes.extend(quads);
        self
    }

    pub fn adding(mut self, quads: impl IntoIterator<Item = Quad>) -> Self {
        self.adds.extend(quads);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.adds.is_empty()
    }

    /// Render the full transaction text, every line newline-terminated.
    fn render(&self, codec: &dyn QuadCodec) -> String {
        let mut text = begin_marker(&self.time, self.key.as_deref());
        text.push('\n');
        for quad in &self.deletes {
            text.push_str(&delete_line(&codec.encode(quad)));
            text.push('\n');
        }
        for quad in &self.adds {
            text.push_str(&add_line(&codec.encode(quad)));
            text.push('\n');
        }
        text.push_str(&end_marker(&self.time));
        text.push('\n');
        text
    }
}

/// Handle to one resource's patch journal file.
///
/// Cheap to construct; nothing touches the filesystem until a read or
/// append. A journal that does not exist yet reads as empty.
#[derive(Clone, Debug)]
pub struct Journal {
    path: PathBuf,
    options: JournalOptions,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: JournalOptions::default(),
        }
    }

    /// The journal inside a resource directory.
    pub fn in_directory(directory: &Path) -> Self {
        Self::new(layout::journal_path(directory))
    }

    pub fn with_options(mut self, options: JournalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Append one transaction of deletions and additions at `time`.
    pub fn append(
        &self,
        codec: &dyn QuadCodec,
        deletes: &[Quad],
        adds: &[Quad],
        time: Instant,
    ) -> JournalResult<()> {
        let tx = Transaction::new(time)
            .deleting(deletes.iter().cloned())
            .adding(adds.iter().cloned());
        self.append_transaction(codec, &tx)
    }

    /// Append a transaction as a single write.
    ///
    /// No rollback: an I/O failure can leave a partial transaction behind,
    /// which readers ignore because it has no `END` marker. If the file ends
    /// mid-line from an earlier torn write, a newline is written first so the
    /// new `BEGIN` marker starts its own line.
    pub fn append_transaction(&self, codec: &dyn QuadCodec, tx: &Transaction) -> JournalResult<()> {
        let text = tx.render(codec);
        self.write(&text).inspect_err(|e| {
            error!(path = %self.path.display(), error = %e, "journal append failed");
        })?;
        debug!(
            path = %self.path.display(),
            deletes = tx.deletes.len(),
            adds = tx.adds.len(),
            key = tx.key.as_deref(),
            "journal append"
        );
        Ok(())
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if ends_mid_line(&mut file)? {
            warn!(path = %self.path.display(), "journal ends mid-line; terminating torn write");
            file.write_all(b"\n")?;
        }
        file.write_all(text.as_bytes())
    }

    /// Backward line reader over the journal, or `None` if it does not exist.
    pub fn reverse_lines(&self) -> JournalResult<Option<ReverseLineReader<File>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(ReverseLineReader::new(file, self.options.block_size)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether one of the last `window` committed transactions carries `key`.
    pub fn has_transaction(&self, key: &str, window: usize) -> JournalResult<bool> {
        let Some(lines) = self.reverse_lines()? else {
            return Ok(false);
        };
        let mut committed = 0;
        let mut in_frame = false;
        for line in lines {
            let line = line?;
            match Entry::parse(&line) {
                Some(Entry::End { .. }) => in_frame = true,
                Some(Entry::Begin { key: found, .. }) if in_frame => {
                    if found == Some(key) {
                        return Ok(true);
                    }
                    in_frame = false;
                    committed += 1;
                    if committed >= window {
                        break;
                    }
                }
                _ => {}
            }
        }
        Ok(false)
    }

    /// Quads in effect for `identifier` at `time`, read backward from the
    /// end of the journal. Empty if the resource did not exist at `time`.
    pub fn state_at<'c>(
        &self,
        codec: &'c dyn QuadCodec,
        identifier: &str,
        time: Instant,
    ) -> JournalResult<StateReader<'c, File>> {
        let lines = self.reverse_lines()?;
        Ok(StateReader::new(lines, codec, identifier, time))
    }

    /// Closed memento intervals, oldest first.
    pub fn version_ranges<'c>(
        &self,
        codec: &'c dyn QuadCodec,
    ) -> JournalResult<VersionMapReader<'c, BufReader<File>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(VersionMapReader::new(BufReader::new(file), codec)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(VersionMapReader::empty(codec)),
            Err(e) => Err(e.into()),
        }
    }

    /// Closed intervals plus the open interval of the current state, which
    /// runs from the last substantive change to `now`.
    pub fn timeline(&self, codec: &dyn QuadCodec, now: Instant) -> JournalResult<Vec<VersionRange>> {
        let mut reader = self.version_ranges(codec)?;
        let mut ranges = reader.by_ref().collect::<JournalResult<Vec<_>>>()?;
        if let Some(last) = reader.boundary() {
            if now > last {
                ranges.push(VersionRange {
                    from: last,
                    until: now,
                });
            }
        }
        Ok(ranges)
    }
}

fn ends_mid_line(file: &mut File) -> io::Result<bool> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use trove_codec::NQuadsCodec;
    use trove_types::vocab::{dc, ldp, rdf, xsd};
    use trove_types::{parse_instant, GraphTag, Term};

    const ID: &str = "trellis:repository/resource";

    fn t(s: &str) -> Instant {
        parse_instant(s).unwrap()
    }

    fn typed(class: &str) -> Quad {
        Quad::new(
            Term::iri(ID),
            Term::iri(rdf::TYPE),
            Term::iri(format!("http://example.org/types/{class}")),
            GraphTag::UserManaged,
        )
    }

    fn contains(child: &str) -> Quad {
        Quad::new(
            Term::iri(ID),
            Term::iri(ldp::CONTAINS),
            Term::iri(format!("{ID}/{child}")),
            GraphTag::Containment,
        )
    }

    fn inbound(from: &str) -> Quad {
        Quad::new(
            Term::iri(from),
            Term::iri("http://example.org/ns#ref"),
            Term::iri(ID),
            GraphTag::InboundReferences,
        )
    }

    fn modified(at: &str) -> Quad {
        Quad::new(
            Term::iri(ID),
            Term::iri(dc::MODIFIED),
            Term::typed_literal(at, xsd::DATE_TIME),
            GraphTag::ServerManaged,
        )
    }

    fn fixture() -> (tempfile::TempDir, Journal) {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::in_directory(dir.path());
        (dir, journal)
    }

    fn state(journal: &Journal, at: &str) -> BTreeSet<Quad> {
        journal
            .state_at(&NQuadsCodec, ID, t(at))
            .unwrap()
            .collect::<JournalResult<_>>()
            .unwrap()
    }

    fn ranges(journal: &Journal) -> Vec<VersionRange> {
        journal
            .version_ranges(&NQuadsCodec)
            .unwrap()
            .collect::<JournalResult<_>>()
            .unwrap()
    }

    #[test]
    fn append_writes_framed_transaction() {
        let (_dir, journal) = fixture();
        journal
            .append(&NQuadsCodec, &[typed("Foo")], &[typed("Bar")], t("2017-02-16T11:15:03Z"))
            .unwrap();
        let text = fs::read_to_string(journal.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "BEGIN # 2017-02-16T11:15:03Z");
        assert_eq!(lines[1], format!("D {}", typed("Foo")));
        assert_eq!(lines[2], format!("A {}", typed("Bar")));
        assert_eq!(lines[3], "END # 2017-02-16T11:15:03Z");
    }

    #[test]
    fn missing_journal_reads_empty() {
        let (_dir, journal) = fixture();
        assert!(!journal.exists());
        assert!(state(&journal, "2020-01-01T00:00:00Z").is_empty());
        assert!(ranges(&journal).is_empty());
        assert!(!journal.has_transaction("k", 64).unwrap());
        assert!(journal.timeline(&NQuadsCodec, t("2020-01-01T00:00:00Z")).unwrap().is_empty());
    }

    #[test]
    fn replacing_a_type() {
        let (_dir, journal) = fixture();
        let t1 = t("2017-02-15T10:05:00Z");
        let t2 = t("2017-02-15T11:15:00Z");
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t1).unwrap();
        journal
            .append(&NQuadsCodec, &[typed("Foo")], &[typed("Bar")], t2)
            .unwrap();

        let at_t1 = state(&journal, "2017-02-15T10:05:01Z");
        assert!(at_t1.contains(&typed("Foo")));
        assert!(!at_t1.contains(&typed("Bar")));
        assert!(at_t1.contains(&modified("2017-02-15T10:05:00Z")));

        let at_t2 = state(&journal, "2017-02-15T11:15:01Z");
        assert!(at_t2.contains(&typed("Bar")));
        assert!(!at_t2.contains(&typed("Foo")));
        assert!(at_t2.contains(&modified("2017-02-15T11:15:00Z")));
        assert_eq!(at_t2.len(), 2);

        assert_eq!(ranges(&journal), vec![VersionRange::new(t1, t2).unwrap()]);
        let now = t("2020-01-01T00:00:00Z");
        assert_eq!(
            journal.timeline(&NQuadsCodec, now).unwrap(),
            vec![
                VersionRange::new(t1, t2).unwrap(),
                VersionRange::new(t2, now).unwrap()
            ]
        );
    }

    #[test]
    fn delete_then_readd() {
        let (_dir, journal) = fixture();
        let q = typed("Foo");
        journal.append(&NQuadsCodec, &[], &[q.clone()], t("2017-01-01T00:00:00Z")).unwrap();
        journal.append(&NQuadsCodec, &[q.clone()], &[], t("2017-01-02T00:00:00Z")).unwrap();
        journal.append(&NQuadsCodec, &[], &[q.clone()], t("2017-01-03T00:00:00Z")).unwrap();

        assert!(!state(&journal, "2016-12-31T23:59:59Z").contains(&q));
        assert!(state(&journal, "2017-01-01T00:00:00Z").contains(&q));
        assert!(state(&journal, "2017-01-01T12:00:00Z").contains(&q));
        assert!(!state(&journal, "2017-01-02T00:00:00Z").contains(&q));
        assert!(!state(&journal, "2017-01-02T12:00:00Z").contains(&q));
        assert!(state(&journal, "2017-01-03T00:00:00Z").contains(&q));
        assert!(state(&journal, "2018-01-01T00:00:00Z").contains(&q));
    }

    #[test]
    fn predating_creation_is_empty() {
        let (_dir, journal) = fixture();
        journal
            .append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-02-15T10:05:00Z"))
            .unwrap();
        assert!(state(&journal, "2017-02-15T10:04:59Z").is_empty());
    }

    #[test]
    fn iri_with_reserved_characters_reads_back() {
        let (_dir, journal) = fixture();
        let quad = Quad::new(
            Term::iri(ID),
            Term::iri("urn:p"),
            Term::iri("http://example.org/a b{c}|\"d\"^`"),
            GraphTag::UserManaged,
        );
        journal
            .append(&NQuadsCodec, &[], &[quad.clone()], t("2017-01-01T00:00:00Z"))
            .unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&quad));
        assert!(now.contains(&modified("2017-01-01T00:00:00Z")));
    }

    #[test]
    fn repeated_additions_emit_once() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-01T00:00:00Z")).unwrap();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-02T00:00:00Z")).unwrap();
        let quads: Vec<_> = journal
            .state_at(&NQuadsCodec, ID, t("2018-01-01T00:00:00Z"))
            .unwrap()
            .collect::<JournalResult<_>>()
            .unwrap();
        assert_eq!(quads.iter().filter(|q| **q == typed("Foo")).count(), 1);
        assert_eq!(quads.iter().filter(|q| q.predicate.is(dc::MODIFIED)).count(), 1);
    }

    #[test]
    fn modified_ignores_inbound_only_transactions() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-01T00:00:00Z")).unwrap();
        journal
            .append(&NQuadsCodec, &[], &[inbound("trellis:repository/other")], t("2017-01-05T00:00:00Z"))
            .unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&inbound("trellis:repository/other")));
        assert!(now.contains(&modified("2017-01-01T00:00:00Z")));
        assert!(!now.contains(&modified("2017-01-05T00:00:00Z")));
    }

    #[test]
    fn only_inbound_history_has_no_modified() {
        let (_dir, journal) = fixture();
        journal
            .append(&NQuadsCodec, &[], &[inbound("trellis:repository/other")], t("2017-01-05T00:00:00Z"))
            .unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert_eq!(now.len(), 1);
        assert!(!now.iter().any(|q| q.predicate.is(dc::MODIFIED)));
    }

    #[test]
    fn dangling_begin_is_ignored() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-01T00:00:00Z")).unwrap();
        // A crashed writer left a transaction without END.
        let mut file = OpenOptions::new().append(true).open(journal.path()).unwrap();
        writeln!(file, "BEGIN # 2017-01-02T00:00:00Z").unwrap();
        writeln!(file, "D {}", typed("Foo")).unwrap();
        writeln!(file, "A {}", typed("Bar")).unwrap();
        drop(file);

        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&typed("Foo")));
        assert!(!now.contains(&typed("Bar")));
        assert!(ranges(&journal).is_empty());

        // A later committed transaction does not resurrect the dangling one.
        journal.append(&NQuadsCodec, &[], &[typed("Baz")], t("2017-01-03T00:00:00Z")).unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&typed("Foo")));
        assert!(now.contains(&typed("Baz")));
        assert!(!now.contains(&typed("Bar")));
        assert_eq!(
            ranges(&journal),
            vec![VersionRange::new(t("2017-01-01T00:00:00Z"), t("2017-01-03T00:00:00Z")).unwrap()]
        );
    }

    #[test]
    fn torn_line_is_terminated_before_next_append() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-01T00:00:00Z")).unwrap();
        let mut file = OpenOptions::new().append(true).open(journal.path()).unwrap();
        write!(file, "BEGIN # 2017-01-02T00:00:00Z\nA <{ID}> <urn:p> \"torn").unwrap();
        drop(file);

        journal.append(&NQuadsCodec, &[], &[typed("Bar")], t("2017-01-03T00:00:00Z")).unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&typed("Foo")));
        assert!(now.contains(&typed("Bar")));
        assert_eq!(now.len(), 3);
    }

    #[test]
    fn non_substantive_transactions_do_not_version() {
        let (_dir, journal) = fixture();
        let t1 = t("2017-01-01T00:00:00Z");
        let t3 = t("2017-01-03T00:00:00Z");
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t1).unwrap();
        journal.append(&NQuadsCodec, &[], &[contains("a")], t("2017-01-02T00:00:00Z")).unwrap();
        journal
            .append(&NQuadsCodec, &[], &[inbound("trellis:repository/x")], t("2017-01-02T12:00:00Z"))
            .unwrap();
        journal.append(&NQuadsCodec, &[], &[typed("Bar")], t3).unwrap();
        assert_eq!(ranges(&journal), vec![VersionRange::new(t1, t3).unwrap()]);
    }

    #[test]
    fn containment_visible_without_new_memento() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo")], t("2017-01-01T00:00:00Z")).unwrap();
        journal.append(&NQuadsCodec, &[], &[contains("a")], t("2017-01-02T00:00:00Z")).unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&contains("a")));
        // Containment counts as an observed change for the modified fact.
        assert!(now.contains(&modified("2017-01-02T00:00:00Z")));
    }

    #[test]
    fn ranges_are_contiguous() {
        let (_dir, journal) = fixture();
        let stamps = [
            "2017-01-01T00:00:00Z",
            "2017-01-02T00:00:00Z",
            "2017-01-02T00:00:00Z",
            "2017-01-05T00:00:00.5Z",
            "2017-02-01T00:00:00Z",
        ];
        for (i, stamp) in stamps.iter().enumerate() {
            journal
                .append(&NQuadsCodec, &[], &[typed(&format!("T{i}"))], t(stamp))
                .unwrap();
        }
        let ranges = ranges(&journal);
        assert_eq!(ranges.len(), 3);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].until, pair[1].from);
        }
        assert!(ranges.iter().all(|r| r.from < r.until));
    }

    #[test]
    fn idempotency_keys() {
        let (_dir, journal) = fixture();
        for i in 0..5 {
            let tx = Transaction::new(t("2017-01-01T00:00:00Z"))
                .with_key(format!("key-{i}"))
                .adding([typed(&format!("T{i}"))]);
            journal.append_transaction(&NQuadsCodec, &tx).unwrap();
        }
        assert!(journal.has_transaction("key-4", 64).unwrap());
        assert!(journal.has_transaction("key-0", 64).unwrap());
        assert!(!journal.has_transaction("key-9", 64).unwrap());
        // Outside the lookback window.
        assert!(!journal.has_transaction("key-0", 2).unwrap());
        assert!(journal.has_transaction("key-3", 2).unwrap());

        // Keys on the begin marker do not disturb readers.
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&typed("T0")));
        assert!(now.contains(&typed("T4")));
    }

    #[test]
    fn uncommitted_key_is_not_found() {
        let (_dir, journal) = fixture();
        fs::write(journal.path(), "BEGIN # 2017-01-01T00:00:00Z # pending\n").unwrap();
        assert!(!journal.has_transaction("pending", 64).unwrap());
    }

    #[test]
    fn small_blocks_match_default() {
        let (_dir, journal) = fixture();
        journal.append(&NQuadsCodec, &[], &[typed("Foo"), contains("a")], t("2017-01-01T00:00:00Z")).unwrap();
        journal.append(&NQuadsCodec, &[typed("Foo")], &[typed("Bar")], t("2017-01-02T00:00:00Z")).unwrap();
        let small = journal.clone().with_options(JournalOptions { block_size: 7 });
        assert_eq!(state(&small, "2018-01-01T00:00:00Z"), state(&journal, "2018-01-01T00:00:00Z"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (_dir, journal) = fixture();
        fs::write(
            journal.path(),
            format!(
                "BEGIN # 2017-01-01T00:00:00Z\nA not a quad\nA {}\nEND # 2017-01-01T00:00:00Z\ngarbage\n",
                typed("Foo")
            ),
        )
        .unwrap();
        let now = state(&journal, "2018-01-01T00:00:00Z");
        assert!(now.contains(&typed("Foo")));
        assert_eq!(now.len(), 2);
    }
}
