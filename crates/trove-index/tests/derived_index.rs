//! Journal -> cache -> derived index -> journal, across resources.

use std::fs;

use chrono::Utc;
use trove_codec::NQuadsCodec;
use trove_index::{ChangeEvent, IndexMaintainer, MaintainerConfig};
use trove_journal::{Journal, JournalResult, StorageConfig};
use trove_types::vocab::{ldp, rdf};
use trove_types::{parse_instant, Dataset, GraphTag, Quad, Term};

const CONTAINER: &str = "trellis:repository/container";
const MEMBERS: &str = "trellis:repository/members";
const CHILD: &str = "trellis:repository/container/child";
const HAS_MEMBER: &str = "http://example.org/ns#hasMember";
const PRIMARY_TOPIC: &str = "http://xmlns.com/foaf/0.1/primaryTopic";

struct Fixture {
    _root: tempfile::TempDir,
    maintainer: IndexMaintainer,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let storage =
            StorageConfig::new().with_repository("repository", root.path().to_string_lossy());
        Self {
            maintainer: IndexMaintainer::new(MaintainerConfig::new(storage), NQuadsCodec),
            _root: root,
        }
    }

    fn journal(&self, identifier: &str) -> Journal {
        self.maintainer.store().journal(identifier).unwrap()
    }

    fn state(&self, identifier: &str) -> Dataset {
        self.journal(identifier)
            .state_at(&NQuadsCodec, identifier, Utc::now())
            .unwrap()
            .collect::<JournalResult<_>>()
            .unwrap()
    }

    fn transactions(&self, identifier: &str) -> usize {
        let journal = self.journal(identifier);
        fs::read_to_string(journal.path())
            .map(|text| text.lines().filter(|l| l.starts_with("END # ")).count())
            .unwrap_or(0)
    }

    /// Create a membership container with the given interaction model and
    /// optional inserted-content relation, then cache it.
    fn container(&self, model: &str, inserted: Option<&str>) {
        let mut adds = vec![
            quad(CONTAINER, rdf::TYPE, Term::iri(model), GraphTag::ServerManaged),
            quad(CONTAINER, ldp::MEMBERSHIP_RESOURCE, Term::iri(MEMBERS), GraphTag::UserManaged),
            quad(CONTAINER, ldp::HAS_MEMBER_RELATION, Term::iri(HAS_MEMBER), GraphTag::UserManaged),
        ];
        if let Some(relation) = inserted {
            adds.push(quad(
                CONTAINER,
                ldp::INSERTED_CONTENT_RELATION,
                Term::iri(relation),
                GraphTag::UserManaged,
            ));
        }
        self.journal(CONTAINER)
            .append(
                &NQuadsCodec,
                &[],
                &adds,
                parse_instant("2017-01-01T00:00:00Z").unwrap(),
            )
            .unwrap();
        let event = ChangeEvent::new(CONTAINER, Dataset::new());
        self.maintainer.write_cache_quads(&event);
    }
}

fn quad(s: &str, p: &str, o: Term, g: GraphTag) -> Quad {
    Quad::new(Term::iri(s), Term::iri(p), o, g)
}

fn contains(child: &str) -> Quad {
    quad(CONTAINER, ldp::CONTAINS, Term::iri(child), GraphTag::Containment)
}

fn member(object: &str) -> Quad {
    quad(MEMBERS, HAS_MEMBER, Term::iri(object), GraphTag::Membership)
}

fn child_event(extra: impl IntoIterator<Item = Quad>) -> ChangeEvent {
    let mut dataset: Dataset = [contains(CHILD)].into_iter().collect();
    dataset.extend(extra);
    ChangeEvent::new(CONTAINER, dataset)
}

#[test]
fn direct_container_adds_member_to_membership_resource() {
    let fx = Fixture::new();
    fx.container(ldp::DIRECT_CONTAINER, None);

    let event = child_event([]);
    let (key, dataset) = fx.maintainer.add_containment_quads(&event);
    assert_eq!(key, CONTAINER);
    assert_eq!(dataset, event.dataset);
    assert!(fx.state(CONTAINER).contains(&contains(CHILD)));

    let (key, dataset) = fx.maintainer.add_membership_quads(&event);
    assert_eq!(key, MEMBERS);
    assert_eq!(dataset, event.dataset);
    assert!(fx.state(MEMBERS).contains(&member(CHILD)));
}

#[test]
fn delete_membership_removes_member() {
    let fx = Fixture::new();
    fx.container(ldp::DIRECT_CONTAINER, None);
    let event = child_event([]);
    fx.maintainer.add_membership_quads(&event);
    assert!(fx.state(MEMBERS).contains(&member(CHILD)));

    let (key, _) = fx.maintainer.delete_membership_quads(&event);
    assert_eq!(key, MEMBERS);
    assert!(!fx.state(MEMBERS).contains(&member(CHILD)));
}

#[test]
fn member_subject_relation_uses_contained_resource() {
    let fx = Fixture::new();
    fx.container(ldp::BASIC_CONTAINER, Some(ldp::MEMBER_SUBJECT));
    fx.maintainer.add_membership_quads(&child_event([]));
    assert!(fx.state(MEMBERS).contains(&member(CHILD)));
}

#[test]
fn indirect_container_resolves_inserted_content() {
    let fx = Fixture::new();
    fx.container(ldp::INDIRECT_CONTAINER, Some(PRIMARY_TOPIC));

    let topic = "http://example.org/topics/rust";
    let event = child_event([quad(CHILD, PRIMARY_TOPIC, Term::iri(topic), GraphTag::UserManaged)]);
    let (key, _) = fx.maintainer.add_membership_quads(&event);
    assert_eq!(key, MEMBERS);

    let members = fx.state(MEMBERS);
    assert!(members.contains(&member(topic)));
    assert!(!members.contains(&member(CHILD)));
}

#[test]
fn unconfigured_container_is_a_noop() {
    let fx = Fixture::new();
    fx.journal(CONTAINER)
        .append(
            &NQuadsCodec,
            &[],
            &[quad(CONTAINER, rdf::TYPE, Term::iri(ldp::BASIC_CONTAINER), GraphTag::ServerManaged)],
            parse_instant("2017-01-01T00:00:00Z").unwrap(),
        )
        .unwrap();

    let (key, dataset) = fx.maintainer.add_membership_quads(&child_event([]));
    assert_eq!(key, CONTAINER);
    assert!(dataset.is_empty());
    assert_eq!(fx.transactions(MEMBERS), 0);
}

#[test]
fn unresolvable_membership_resource_degrades_to_noop() {
    let fx = Fixture::new();
    let elsewhere = "trellis:elsewhere/members";
    fx.journal(CONTAINER)
        .append(
            &NQuadsCodec,
            &[],
            &[
                quad(CONTAINER, rdf::TYPE, Term::iri(ldp::DIRECT_CONTAINER), GraphTag::ServerManaged),
                quad(CONTAINER, ldp::MEMBERSHIP_RESOURCE, Term::iri(elsewhere), GraphTag::UserManaged),
                quad(CONTAINER, ldp::HAS_MEMBER_RELATION, Term::iri(HAS_MEMBER), GraphTag::UserManaged),
            ],
            parse_instant("2017-01-01T00:00:00Z").unwrap(),
        )
        .unwrap();

    let (key, dataset) = fx.maintainer.add_membership_quads(&child_event([]));
    assert_eq!(key, CONTAINER);
    assert!(dataset.is_empty());
}

#[test]
fn redelivered_event_is_written_once() {
    let fx = Fixture::new();
    fx.container(ldp::DIRECT_CONTAINER, None);
    let event = child_event([]).with_delivery_key("changes/3/1187");

    fx.maintainer.add_membership_quads(&event);
    fx.maintainer.add_membership_quads(&event);
    fx.maintainer.add_containment_quads(&event);
    fx.maintainer.add_containment_quads(&event);
    assert_eq!(fx.transactions(MEMBERS), 1);
    // One setup transaction plus one containment write.
    assert_eq!(fx.transactions(CONTAINER), 2);

    // A different delivery of the same payload is a new event.
    let again = child_event([]).with_delivery_key("changes/3/1188");
    fx.maintainer.add_membership_quads(&again);
    assert_eq!(fx.transactions(MEMBERS), 2);
}

#[test]
fn containment_filter_keeps_only_container_graphs() {
    let fx = Fixture::new();
    let event = child_event([
        quad(CONTAINER, "http://purl.org/dc/terms/title", Term::literal("ignored"), GraphTag::UserManaged),
        member(CHILD),
    ]);
    fx.maintainer.add_containment_quads(&event);
    let state = fx.state(CONTAINER);
    assert!(state.contains(&contains(CHILD)));
    assert!(state.contains(&member(CHILD)));
    assert!(!state.iter().any(|q| q.graph == GraphTag::UserManaged));

    fx.maintainer.delete_containment_quads(&event);
    let state = fx.state(CONTAINER);
    assert!(!state.contains(&contains(CHILD)));
}

#[test]
fn inbound_references_round_trip() {
    let fx = Fixture::new();
    let target = "trellis:repository/target";
    let reference = quad(
        "trellis:repository/source",
        "http://example.org/ns#cites",
        Term::iri(target),
        GraphTag::InboundReferences,
    );
    let event = ChangeEvent::new(
        target,
        [
            reference.clone(),
            quad(target, rdf::TYPE, Term::iri("http://example.org/Doc"), GraphTag::UserManaged),
        ]
        .into_iter()
        .collect(),
    );

    fx.maintainer.add_inbound_quads(&event);
    let state = fx.state(target);
    assert!(state.contains(&reference));
    assert!(!state.iter().any(|q| q.graph == GraphTag::UserManaged));

    fx.maintainer.delete_inbound_quads(&event);
    assert!(!fx.state(target).contains(&reference));

    // Inbound-only history never versions the target.
    let ranges: Vec<_> = fx
        .journal(target)
        .version_ranges(&NQuadsCodec)
        .unwrap()
        .collect::<JournalResult<_>>()
        .unwrap();
    assert!(ranges.is_empty());
}

#[test]
fn cache_write_refreshes_snapshot() {
    let fx = Fixture::new();
    fx.container(ldp::DIRECT_CONTAINER, None);
    fx.maintainer.add_containment_quads(&child_event([]));
    fx.maintainer.write_cache_quads(&child_event([]));

    let resource = fx.maintainer.store().get(CONTAINER).unwrap().unwrap();
    assert!(resource.is_cached());
    assert!(resource.snapshot().contains.contains(CHILD));
    assert_eq!(resource.snapshot().interaction_model, ldp::DIRECT_CONTAINER);
}
