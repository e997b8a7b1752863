use tracing::trace;
use trove_types::{GraphTag, Quad, Term};

use crate::error::{CodecError, CodecResult};
use crate::QuadCodec;

/// Canonical N-Quads codec.
///
/// Encoding writes `<s> <p> <o> <graph> .` with the graph always explicit.
/// Decoding accepts any single N-Quads statement; the graph name is
/// classified into a [`GraphTag`], so a missing or unrecognized graph
/// decodes as user-managed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NQuadsCodec;

impl NQuadsCodec {
    pub fn new() -> Self {
        Self
    }

    /// Parse one statement, reporting why it failed.
    pub fn parse(&self, line: &str) -> CodecResult<Quad> {
        let mut cur = Cursor::new(line);
        cur.skip_ws();

        let subject = cur.term("subject")?;
        if subject.as_literal().is_some() {
            return Err(CodecError::TermNotAllowed {
                term: "literal",
                slot: "subject",
            });
        }
        cur.skip_ws();

        let predicate = cur.term("predicate")?;
        if !predicate.is_iri() {
            return Err(CodecError::TermNotAllowed {
                term: kind(&predicate),
                slot: "predicate",
            });
        }
        cur.skip_ws();

        let object = cur.term("object")?;
        cur.skip_ws();

        let graph = match cur.peek() {
            Some('.') | None => None,
            Some(_) => {
                let graph = cur.term("graph name or '.'")?;
                if graph.as_literal().is_some() {
                    return Err(CodecError::TermNotAllowed {
                        term: "literal",
                        slot: "graph",
                    });
                }
                cur.skip_ws();
                Some(graph)
            }
        };

        cur.expect('.', "'.'")?;
        cur.skip_ws();
        match cur.peek() {
            None | Some('#') => {}
            Some(_) => return Err(CodecError::TrailingInput { position: cur.pos }),
        }

        let tag = GraphTag::classify(graph.as_ref().and_then(Term::as_iri));
        Ok(Quad::new(subject, predicate, object, tag))
    }
}

impl QuadCodec for NQuadsCodec {
    fn encode(&self, quad: &Quad) -> String {
        quad.to_string()
    }

    fn decode(&self, line: &str) -> Option<Quad> {
        match self.parse(line) {
            Ok(quad) => Some(quad),
            Err(e) => {
                trace!(error = %e, "unparseable quad text");
                None
            }
        }
    }
}

fn kind(term: &Term) -> &'static str {
    match term {
        Term::Iri(_) => "IRI",
        Term::BlankNode(_) => "blank node",
        Term::Literal(_) => "literal",
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            self.bump();
        }
    }

    fn error_here(&self, expected: &'static str) -> CodecError {
        match self.peek() {
            Some(found) => CodecError::Unexpected {
                found,
                position: self.pos,
                expected,
            },
            None => CodecError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, want: char, expected: &'static str) -> CodecResult<()> {
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn term(&mut self, expected: &'static str) -> CodecResult<Term> {
        match self.peek() {
            Some('<') => self.iri().map(Term::Iri),
            Some('_') => self.blank(),
            Some('"') => self.literal(),
            _ => Err(self.error_here(expected)),
        }
    }

    fn iri(&mut self) -> CodecResult<String> {
        self.expect('<', "'<'")?;
        let mut out = String::new();
        loop {
            let position = self.pos;
            match self.bump() {
                Some('>') => return Ok(out),
                Some('\\') => out.push(self.unicode_escape(position)?),
                Some(c @ (' ' | '\t' | '<' | '"' | '{' | '}' | '|' | '^' | '`')) => {
                    return Err(CodecError::Unexpected {
                        found: c,
                        position,
                        expected: "IRI character",
                    })
                }
                Some(c) => out.push(c),
                None => return Err(CodecError::UnexpectedEnd { expected: "'>'" }),
            }
        }
    }

    fn blank(&mut self) -> CodecResult<Term> {
        self.expect('_', "'_:'")?;
        self.expect(':', "'_:'")?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '<' || c == '"' {
                break;
            }
            self.bump();
        }
        // A label cannot end in '.'; hand trailing dots back as the terminator.
        while self.pos > start && self.src[start..self.pos].ends_with('.') {
            self.pos -= 1;
        }
        if self.pos == start {
            return Err(self.error_here("blank node label"));
        }
        Ok(Term::blank(&self.src[start..self.pos]))
    }

    fn literal(&mut self) -> CodecResult<Term> {
        self.expect('"', "'\"'")?;
        let mut lexical = String::new();
        loop {
            let position = self.pos;
            match self.bump() {
                Some('"') => break,
                Some('\\') => lexical.push(self.string_escape(position)?),
                Some(c) => lexical.push(c),
                None => return Err(CodecError::UnexpectedEnd { expected: "closing '\"'" }),
            }
        }

        match self.peek() {
            Some('@') => {
                self.bump();
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-') {
                    self.bump();
                }
                if self.pos == start {
                    return Err(self.error_here("language tag"));
                }
                Ok(Term::lang_literal(lexical, &self.src[start..self.pos]))
            }
            Some('^') => {
                self.expect('^', "'^^'")?;
                self.expect('^', "'^^'")?;
                let datatype = self.iri()?;
                Ok(Term::typed_literal(lexical, datatype))
            }
            _ => Ok(Term::literal(lexical)),
        }
    }

    fn string_escape(&mut self, position: usize) -> CodecResult<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.hex_char(4, position),
            Some('U') => self.hex_char(8, position),
            _ => Err(CodecError::InvalidEscape { position }),
        }
    }

    fn unicode_escape(&mut self, position: usize) -> CodecResult<char> {
        match self.bump() {
            Some('u') => self.hex_char(4, position),
            Some('U') => self.hex_char(8, position),
            _ => Err(CodecError::InvalidEscape { position }),
        }
    }

    fn hex_char(&mut self, width: usize, position: usize) -> CodecResult<char> {
        let digits = self
            .src
            .get(self.pos..self.pos + width)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or(CodecError::InvalidEscape { position })?;
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| CodecError::InvalidEscape { position })?;
        self.pos += width;
        char::from_u32(code).ok_or(CodecError::InvalidEscape { position })
    }
}
