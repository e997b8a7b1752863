//! IRIs the store interprets when reading a resource's quads.

/// Linked Data Platform vocabulary.
pub mod ldp {
    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";
    pub const INDIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#IndirectContainer";

    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";
    pub const HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";
    pub const IS_MEMBER_OF_RELATION: &str = "http://www.w3.org/ns/ldp#isMemberOfRelation";
    pub const INSERTED_CONTENT_RELATION: &str = "http://www.w3.org/ns/ldp#insertedContentRelation";
    pub const MEMBER_SUBJECT: &str = "http://www.w3.org/ns/ldp#MemberSubject";
    pub const INBOX: &str = "http://www.w3.org/ns/ldp#inbox";

    pub const PREFER_CONTAINMENT: &str = "http://www.w3.org/ns/ldp#PreferContainment";
    pub const PREFER_MEMBERSHIP: &str = "http://www.w3.org/ns/ldp#PreferMembership";
}

/// Graph names for the store-private provenance categories.
pub mod trellis {
    pub const PREFER_USER_MANAGED: &str = "http://www.trellisldp.org/ns/trellis#PreferUserManaged";
    pub const PREFER_SERVER_MANAGED: &str =
        "http://www.trellisldp.org/ns/trellis#PreferServerManaged";
    pub const PREFER_ACCESS_CONTROL: &str =
        "http://www.trellisldp.org/ns/trellis#PreferAccessControl";
}

pub mod fedora {
    pub const PREFER_INBOUND_REFERENCES: &str =
        "http://fedora.info/definitions/fcrepo#PreferInboundReferences";
}

/// Dublin Core terms.
pub mod dc {
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const HAS_PART: &str = "http://purl.org/dc/terms/hasPart";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
    pub const EXTENT: &str = "http://purl.org/dc/terms/extent";
}

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
}

pub mod acl {
    pub const ACCESS_CONTROL: &str = "http://www.w3.org/ns/auth/acl#accessControl";
}
