use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instant::{format_instant, Instant};
use crate::vocab::xsd;

/// An RDF literal.
///
/// `xsd:string` is the implicit datatype of a plain literal and is never
/// stored explicitly, so two literals with the same lexical form compare
/// equal however they were constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Self {
            lexical: lexical.into(),
            datatype: (datatype != xsd::STRING).then_some(datatype),
            language: None,
        }
    }

    /// Language tags are case-insensitive; they are stored lowercased.
    pub fn lang(lexical: impl Into<String>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.as_ref().to_ascii_lowercase()),
        }
    }
}

/// An RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode(label.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal::plain(lexical))
    }

    pub fn typed_literal(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal(Literal::typed(lexical, datatype))
    }

    pub fn lang_literal(lexical: impl Into<String>, language: impl AsRef<str>) -> Self {
        Self::Literal(Literal::lang(lexical, language))
    }

    /// An `xsd:dateTime` literal for the given instant.
    pub fn date_time(instant: &Instant) -> Self {
        Self::typed_literal(format_instant(instant), xsd::DATE_TIME)
    }

    /// The IRI text, if this term is an IRI.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }

    /// Whether this term is the IRI `iri`.
    pub fn is(&self, iri: &str) -> bool {
        self.as_iri() == Some(iri)
    }
}

/// Canonical N-Triples form: `<iri>`, `_:label`, or a quoted literal.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write_iri(f, iri),
            Self::BlankNode(label) => write!(f, "_:{label}"),
            Self::Literal(lit) => {
                f.write_str("\"")?;
                write_escaped(f, &lit.lexical)?;
                f.write_str("\"")?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = &lit.datatype {
                    f.write_str("^^")?;
                    write_iri(f, dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Write `<iri>`, with characters that cannot appear raw between the angle
/// brackets as `\uXXXX` escapes.
fn write_iri(f: &mut fmt::Formatter<'_>, iri: &str) -> fmt::Result {
    f.write_str("<")?;
    for ch in iri.chars() {
        match ch {
            ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                write!(f, "\\u{:04X}", ch as u32)?
            }
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => fmt::Write::write_char(f, c)?,
        }
    }
    f.write_str(">")
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            other => fmt::Write::write_char(f, other)?,
        }
    }
    Ok(())
}
