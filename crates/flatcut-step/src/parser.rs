//! Part 21 parser: builds a raw entity graph from tokens.
//!
//! The parser constructs a graph of STEP entities without interpreting their
//! semantics. Each entity has an ID, a type name, and a list of arguments.
//! Arguments can be nested (lists within lists). Complex instances
//! (`#7 = ( A() B(1.0) C('x') );`) keep every partial type so decoders can
//! ask whether a given supertype is present.

use std::collections::BTreeMap;

use crate::error::StepError;
use crate::lexer::{Lexer, SpannedToken, Token};

/// A single argument value in a STEP entity.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// Entity reference (e.g., `#123`).
    EntityRef(u64),
    /// String literal.
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (e.g., `.T.`).
    Enum(String),
    /// List of values (nested in parentheses).
    List(Vec<StepValue>),
    /// Derived value (`*`).
    Derived,
    /// Null/unset value (`$`).
    Null,
    /// Typed value: `TYPE_NAME(args)`.
    Typed {
        /// The type name.
        type_name: String,
        /// Arguments.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// Entity reference, if this is one.
    pub fn as_entity_ref(&self) -> Option<u64> {
        match self {
            StepValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Real number (integers are widened).
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(v) => Some(*v),
            StepValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// String literal, if this is one.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Enumeration name, if this is one.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// List contents, if this is a list.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is `$`.
    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Null)
    }
}

/// One partial type of a complex entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPart {
    /// Partial type name.
    pub type_name: String,
    /// Arguments of this partial type.
    pub args: Vec<StepValue>,
}

/// A parsed STEP entity.
#[derive(Debug, Clone)]
pub struct StepEntity {
    /// Entity ID (from `#123`).
    pub id: u64,
    /// Entity type name. For complex instances, the first partial type.
    pub type_name: String,
    /// Arguments. For complex instances, those of the first partial type.
    pub args: Vec<StepValue>,
    /// All partial types of a complex instance; empty for simple instances.
    pub parts: Vec<EntityPart>,
}

impl StepEntity {
    /// Names of every type this instance carries.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        let simple = self.parts.is_empty().then_some(self.type_name.as_str());
        simple
            .into_iter()
            .chain(self.parts.iter().map(|p| p.type_name.as_str()))
    }

    /// Whether the instance is, or contains the partial type, `name`.
    pub fn is_a(&self, name: &str) -> bool {
        self.type_names().any(|t| t == name)
    }
}

/// The complete parsed content of a STEP file.
#[derive(Debug, Clone, Default)]
pub struct StepFile {
    /// Header section entities (FILE_DESCRIPTION, FILE_NAME, FILE_SCHEMA).
    pub header: Vec<StepEntity>,
    /// Data section entities, ordered by ID.
    pub entities: BTreeMap<u64, StepEntity>,
}

impl StepFile {
    /// Get an entity by ID.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Get an entity by ID, returning an error if not found.
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.entities.get(&id).ok_or(StepError::MissingEntity(id))
    }

    /// All entities of a given type, in ascending ID order.
    pub fn entities_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a StepEntity> {
        self.entities.values().filter(move |e| e.is_a(type_name))
    }

    /// Schema identifiers from the FILE_SCHEMA header entity.
    pub fn schemas(&self) -> Vec<&str> {
        self.header
            .iter()
            .filter(|e| e.type_name == "FILE_SCHEMA")
            .filter_map(|e| e.args.first().and_then(StepValue::as_list))
            .flat_map(|list| list.iter().filter_map(StepValue::as_string))
            .collect()
    }
}

/// Parser for Part 21 STEP files.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parse a STEP file from bytes.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        parser.parse_file()
    }

    fn parse_file(&mut self) -> Result<StepFile, StepError> {
        let mut file = StepFile::default();

        self.expect_keyword("ISO-10303-21")?;
        self.expect_token(&Token::Semicolon)?;

        while !self.is_at_end() {
            if self.eat_keyword("HEADER") {
                self.expect_token(&Token::Semicolon)?;
                file.header = self.parse_header_section()?;
                self.expect_section_end()?;
            } else if self.eat_keyword("DATA") {
                // AP242 allows a parameter list after DATA.
                if self.check_token(&Token::LParen) {
                    self.parse_args(None)?;
                }
                self.expect_token(&Token::Semicolon)?;
                for entity in self.parse_data_section()? {
                    let id = entity.id;
                    if file.entities.insert(id, entity).is_some() {
                        return Err(StepError::parser(Some(id), "duplicate entity ID"));
                    }
                }
                self.expect_section_end()?;
            } else if self.eat_keyword("END-ISO-10303-21") {
                self.expect_token(&Token::Semicolon)?;
                break;
            } else {
                return Err(self.unexpected(None, "section keyword"));
            }
        }

        Ok(file)
    }

    fn parse_header_section(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            if type_name == "ENDSEC" {
                break;
            }
            self.advance();
            let args = self.parse_args(None)?;
            self.expect_token(&Token::Semicolon)?;
            entities.push(StepEntity {
                id: 0,
                type_name,
                args,
                parts: Vec::new(),
            });
        }
        Ok(entities)
    }

    fn parse_data_section(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::EntityRef(id)) = self.peek_token().cloned() {
            self.advance();
            self.expect_token(&Token::Equals)?;

            let entity = match self.peek_token().cloned() {
                Some(Token::Keyword(type_name)) => {
                    self.advance();
                    let args = self.parse_args(Some(id))?;
                    StepEntity {
                        id,
                        type_name,
                        args,
                        parts: Vec::new(),
                    }
                }
                Some(Token::LParen) => self.parse_complex(id)?,
                _ => return Err(self.unexpected(Some(id), "type name")),
            };
            self.expect_token(&Token::Semicolon)?;
            entities.push(entity);
        }
        Ok(entities)
    }

    /// `( A(args) B(args) ... )`: partial types are not comma separated.
    fn parse_complex(&mut self, id: u64) -> Result<StepEntity, StepError> {
        self.expect_token(&Token::LParen)?;
        let mut parts = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            self.advance();
            let args = self.parse_args(Some(id))?;
            parts.push(EntityPart { type_name, args });
        }
        self.expect_token(&Token::RParen)?;

        let first = parts
            .first()
            .cloned()
            .ok_or_else(|| StepError::parser(Some(id), "empty complex entity"))?;
        Ok(StepEntity {
            id,
            type_name: first.type_name,
            args: first.args,
            parts,
        })
    }

    fn parse_args(&mut self, entity_id: Option<u64>) -> Result<Vec<StepValue>, StepError> {
        self.expect_token(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check_token(&Token::RParen) {
            args.push(self.parse_value(entity_id)?);
            while self.check_token(&Token::Comma) {
                self.advance();
                args.push(self.parse_value(entity_id)?);
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(args)
    }

    fn parse_value(&mut self, entity_id: Option<u64>) -> Result<StepValue, StepError> {
        let Some(token) = self.peek_token().cloned() else {
            return Err(StepError::parser(entity_id, "unexpected end of input"));
        };
        let value = match token {
            Token::EntityRef(id) => StepValue::EntityRef(id),
            Token::String(s) => StepValue::String(s),
            Token::Real(v) => StepValue::Real(v),
            Token::Integer(v) => StepValue::Integer(v),
            Token::Enum(s) => StepValue::Enum(s),
            Token::Asterisk => StepValue::Derived,
            Token::Dollar => StepValue::Null,
            Token::LParen => return self.parse_args(entity_id).map(StepValue::List),
            Token::Keyword(type_name) => {
                self.advance();
                let args = self.parse_args(entity_id)?;
                return Ok(StepValue::Typed { type_name, args });
            }
            _ => return Err(self.unexpected(entity_id, "value")),
        };
        self.advance();
        Ok(value)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check_token(&self, expected: &Token) -> bool {
        self.peek_token() == Some(expected)
    }

    fn check_keyword(&self, name: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Keyword(k)) if k == name)
    }

    fn eat_keyword(&mut self, name: &str) -> bool {
        let found = self.check_keyword(name);
        if found {
            self.advance();
        }
        found
    }

    fn unexpected(&self, entity_id: Option<u64>, wanted: &str) -> StepError {
        match self.tokens.get(self.pos) {
            Some(t) => StepError::parser(
                entity_id,
                format!(
                    "expected {wanted}, got {:?} at line {}, column {}",
                    t.token, t.pos.line, t.pos.col
                ),
            ),
            None => StepError::parser(entity_id, format!("expected {wanted}, got end of input")),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), StepError> {
        if self.check_token(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(None, &format!("{expected:?}")))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), StepError> {
        if self.eat_keyword(name) {
            Ok(())
        } else {
            Err(self.unexpected(None, &format!("keyword '{name}'")))
        }
    }

    fn expect_section_end(&mut self) -> Result<(), StepError> {
        self.expect_keyword("ENDSEC")?;
        self.expect_token(&Token::Semicolon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(data: &str) -> String {
        format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n")
    }

    #[test]
    fn test_parse_simple() {
        let input = r#"
ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''), '2;1');
FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('origin', (0.0, 0.0, 0.0));
#2 = DIRECTION('x', (1.0, 0.0, 0.0));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        assert_eq!(file.header.len(), 2);
        assert_eq!(file.entities.len(), 2);
        assert_eq!(
            file.schemas(),
            vec!["AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }"]
        );

        let p1 = file.get(1).unwrap();
        assert_eq!(p1.type_name, "CARTESIAN_POINT");
        assert_eq!(p1.args[0].as_string(), Some("origin"));
        let coords = p1.args[1].as_list().unwrap();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0].as_real(), Some(0.0));
    }

    #[test]
    fn test_parse_nested_list_and_enums() {
        let input = wrap(
            "#1 = B_SPLINE_CURVE_WITH_KNOTS('', 3, (#2, #3, #4), .UNSPECIFIED., .F., .F., (4, 4), (0.0, 1.0), .UNSPECIFIED.);",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(1).unwrap();
        assert_eq!(e.args.len(), 9);
        let cp = e.args[2].as_list().unwrap();
        assert_eq!(cp[0].as_entity_ref(), Some(2));
        assert_eq!(e.args[3].as_enum(), Some("UNSPECIFIED"));
        assert_eq!(e.args[4].as_enum(), Some("F"));
    }

    #[test]
    fn test_parse_null_derived_and_typed() {
        let input = wrap("#1 = SOME_ENTITY($, *, 'value', LENGTH_MEASURE(1.E-07));");
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(1).unwrap();
        assert!(e.args[0].is_null());
        assert_eq!(e.args[1], StepValue::Derived);
        assert_eq!(e.args[2].as_string(), Some("value"));
        assert_eq!(
            e.args[3],
            StepValue::Typed {
                type_name: "LENGTH_MEASURE".into(),
                args: vec![StepValue::Real(1e-7)],
            }
        );
    }

    #[test]
    fn test_parse_complex_entity() {
        let input = wrap(
            "#5 = ( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI.,.METRE.) );\n#6 = CARTESIAN_POINT('', (0., 0., 0.));",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(5).unwrap();
        assert_eq!(e.type_name, "LENGTH_UNIT");
        assert_eq!(e.parts.len(), 3);
        assert!(e.is_a("SI_UNIT"));
        assert!(!e.is_a("CARTESIAN_POINT"));
        assert_eq!(file.entities_of_type("NAMED_UNIT").count(), 1);
    }

    #[test]
    fn test_entities_of_type_sorted() {
        let input = wrap(
            "#30 = CARTESIAN_POINT('', (1.0, 0.0, 0.0));\n#2 = DIRECTION('', (1.0, 0.0, 0.0));\n#10 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        let ids: Vec<u64> = file
            .entities_of_type("CARTESIAN_POINT")
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![10, 30]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let input = wrap("#1 = DIRECTION('', (1.0, 0.0, 0.0));\n#1 = DIRECTION('', (0.0, 1.0, 0.0));");
        assert!(matches!(
            Parser::parse(input.as_bytes()),
            Err(StepError::Parser {
                entity_id: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_magic_rejected() {
        assert!(matches!(
            Parser::parse(b"HEADER; ENDSEC;"),
            Err(StepError::Parser { .. })
        ));
    }

    #[test]
    fn test_truncated_entity_rejected() {
        let input = "ISO-10303-21;\nDATA;\n#1 = CARTESIAN_POINT('', (0.0, 0.0";
        assert!(Parser::parse(input.as_bytes()).is_err());
    }
}
