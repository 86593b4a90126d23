//! Path-construction operators, decoded once at the reader boundary.

use lopdf::content::Operation;
use lopdf::Object;
use serde::{Deserialize, Serialize};

/// PDF operator names for the two path primitives the grid pipeline uses.
pub const MOVE_TO: &str = "m";
pub const LINE_TO: &str = "l";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    /// Fills, text, images, curves... anything the line extractor ignores.
    Other,
}

/// A generic `{code, args}` pair as handed over by an upstream reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOperator {
    pub code: String,
    #[serde(default)]
    pub args: Vec<f64>,
}

impl PathOp {
    /// Decode an operator name and its numeric operands. Move/line operators
    /// with fewer than two operands are treated as `Other`.
    pub fn decode(code: &str, args: &[f64]) -> Self {
        match (code, args) {
            (MOVE_TO, [x, y, ..]) => PathOp::MoveTo { x: *x, y: *y },
            (LINE_TO, [x, y, ..]) => PathOp::LineTo { x: *x, y: *y },
            (MOVE_TO | LINE_TO, _) => {
                tracing::trace!(code, operands = args.len(), "malformed path operator ignored");
                PathOp::Other
            }
            _ => PathOp::Other,
        }
    }

    /// Decode a lopdf content-stream operation.
    pub fn from_operation(operation: &Operation) -> Self {
        match operation.operator.as_str() {
            MOVE_TO | LINE_TO => {
                let args: Option<Vec<f64>> = operation.operands.iter().map(object_to_f64).collect();
                match args {
                    Some(args) => Self::decode(&operation.operator, &args),
                    None => PathOp::Other,
                }
            }
            _ => PathOp::Other,
        }
    }

    pub fn is_path(&self) -> bool {
        !matches!(self, PathOp::Other)
    }
}

impl From<&RawOperator> for PathOp {
    fn from(raw: &RawOperator) -> Self {
        PathOp::decode(&raw.code, &raw.args)
    }
}

/// Numeric value of an integer or real PDF object.
pub fn object_to_f64(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}
