//! Typed decoders for the AP203/AP214 entities a B-rep reader needs.
//!
//! Each decoder takes the parsed file and an entity ID, checks the entity
//! type, and pulls its fields out by position. Nothing here builds topology;
//! see the reader for that.

pub mod curves;
pub mod geometry;
pub mod topology;

pub use curves::curve_kind;
pub use geometry::{parse_cartesian_point, parse_surface};
pub use topology::*;

use crate::error::StepError;
use crate::parser::{StepEntity, StepValue};

/// Positional argument access with typed errors.
pub trait EntityArgs {
    /// Required real argument at index.
    fn real(&self, idx: usize) -> Result<f64, StepError>;

    /// Required string argument at index.
    fn string(&self, idx: usize) -> Result<&str, StepError>;

    /// Required enumeration argument at index.
    fn enumeration(&self, idx: usize) -> Result<&str, StepError>;

    /// Required boolean (`.T.` / `.F.`) argument at index.
    fn boolean(&self, idx: usize) -> Result<bool, StepError>;

    /// Required entity reference at index.
    fn entity_ref(&self, idx: usize) -> Result<u64, StepError>;

    /// Required list argument at index.
    fn list(&self, idx: usize) -> Result<&[StepValue], StepError>;

    /// List of reals at index.
    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError>;

    /// List of entity references at index.
    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError>;

    /// Whether the argument at index is `$` or absent.
    fn is_null(&self, idx: usize) -> bool;
}

impl StepEntity {
    fn arg<'a, T>(
        &'a self,
        idx: usize,
        what: &str,
        get: impl FnOnce(&'a StepValue) -> Option<T>,
    ) -> Result<T, StepError> {
        self.args.get(idx).and_then(get).ok_or_else(|| {
            StepError::parser(
                Some(self.id),
                format!("expected {what} at arg {idx} in {}", self.type_name),
            )
        })
    }

    fn list_of<'a, T>(
        &'a self,
        idx: usize,
        what: &str,
        get: impl Fn(&'a StepValue) -> Option<T>,
    ) -> Result<Vec<T>, StepError> {
        self.list(idx)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                get(v).ok_or_else(|| {
                    StepError::parser(
                        Some(self.id),
                        format!("expected {what} at list[{i}] in arg {idx}"),
                    )
                })
            })
            .collect()
    }
}

impl EntityArgs for StepEntity {
    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.arg(idx, "real", StepValue::as_real)
    }

    fn string(&self, idx: usize) -> Result<&str, StepError> {
        self.arg(idx, "string", StepValue::as_string)
    }

    fn enumeration(&self, idx: usize) -> Result<&str, StepError> {
        self.arg(idx, "enum", StepValue::as_enum)
    }

    fn boolean(&self, idx: usize) -> Result<bool, StepError> {
        self.arg(idx, "boolean", |v| match v.as_enum()? {
            "T" => Some(true),
            "F" => Some(false),
            _ => None,
        })
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, StepError> {
        self.arg(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn list(&self, idx: usize) -> Result<&[StepValue], StepError> {
        self.arg(idx, "list", StepValue::as_list)
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        self.list_of(idx, "real", StepValue::as_real)
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        self.list_of(idx, "entity ref", StepValue::as_entity_ref)
    }

    fn is_null(&self, idx: usize) -> bool {
        self.args.get(idx).map_or(true, StepValue::is_null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn entity(data: &str) -> StepEntity {
        let input = format!("ISO-10303-21;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        let file = Parser::parse(input.as_bytes()).unwrap();
        file.get(1).unwrap().clone()
    }

    #[test]
    fn test_typed_accessors() {
        let e = entity("#1 = THING('name', 2.5, .T., #7, (#8, #9), (1, 2.0), $);");
        assert_eq!(e.string(0).unwrap(), "name");
        assert_eq!(e.real(1).unwrap(), 2.5);
        assert!(e.boolean(2).unwrap());
        assert_eq!(e.enumeration(2).unwrap(), "T");
        assert_eq!(e.entity_ref(3).unwrap(), 7);
        assert_eq!(e.entity_ref_list(4).unwrap(), vec![8, 9]);
        assert_eq!(e.real_list(5).unwrap(), vec![1.0, 2.0]);
        assert!(e.is_null(6));
        assert!(e.is_null(42));
    }

    #[test]
    fn test_accessor_errors_carry_entity_id() {
        let e = entity("#1 = THING('name', (#8, 'oops'), .UNKNOWN.);");
        let err = e.real(0).unwrap_err();
        assert!(matches!(err, StepError::Parser { entity_id: Some(1), .. }));
        assert!(e.entity_ref_list(1).is_err());
        assert!(e.boolean(2).is_err());
    }
}
