//! TFLite model validation (Andon principle - surface problems immediately).
//!
//! Loads the produced flat binary, resolves its graph tables, and reads back
//! input/output tensor descriptors to confirm the artifact is loadable by a
//! TFLite interpreter. No semantic check of the model's predictions is made.
//!
//! The FlatBuffer walk covers exactly the tables needed for the report:
//! `Model` → `SubGraph` → `Tensor` (shape, element type, name). Every offset
//! is bounds-checked so a truncated or corrupt file fails with a diagnostic
//! instead of reading out of range.

use crate::error::{ConvertError, Result};
use std::path::{Path, PathBuf};

/// File identifier expected at bytes 4..8 of a TFLite container.
pub const TFLITE_FILE_IDENTIFIER: &[u8; 4] = b"TFL3";

/// Element type of a tensor, as encoded in the TFLite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Float16,
    Int32,
    UInt8,
    Int64,
    Str,
    Bool,
    Int16,
    Complex64,
    Int8,
    Float64,
    /// Schema code this reader does not map.
    Unknown(u8),
}

impl TensorType {
    /// Map a schema type code to a tensor type.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Float32,
            1 => Self::Float16,
            2 => Self::Int32,
            3 => Self::UInt8,
            4 => Self::Int64,
            5 => Self::Str,
            6 => Self::Bool,
            7 => Self::Int16,
            8 => Self::Complex64,
            9 => Self::Int8,
            10 => Self::Float64,
            other => Self::Unknown(other),
        }
    }

    /// Size of one element in bytes, if fixed.
    pub fn element_size(&self) -> Option<u64> {
        match self {
            Self::Float32 | Self::Int32 => Some(4),
            Self::Float16 | Self::Int16 => Some(2),
            Self::UInt8 | Self::Int8 | Self::Bool => Some(1),
            Self::Int64 | Self::Complex64 | Self::Float64 => Some(8),
            Self::Str | Self::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for TensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float32 => write!(f, "FLOAT32"),
            Self::Float16 => write!(f, "FLOAT16"),
            Self::Int32 => write!(f, "INT32"),
            Self::UInt8 => write!(f, "UINT8"),
            Self::Int64 => write!(f, "INT64"),
            Self::Str => write!(f, "STRING"),
            Self::Bool => write!(f, "BOOL"),
            Self::Int16 => write!(f, "INT16"),
            Self::Complex64 => write!(f, "COMPLEX64"),
            Self::Int8 => write!(f, "INT8"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// Descriptor for one graph input or output tensor.
#[derive(Debug, Clone)]
pub struct TensorDesc {
    /// Tensor name from the schema (may be empty)
    pub name: String,
    /// Dimensions; -1 marks a dynamic dimension
    pub shape: Vec<i32>,
    /// Element type
    pub dtype: TensorType,
}

impl TensorDesc {
    /// Bytes needed to allocate this tensor, if the shape is static and the
    /// element size is known.
    pub fn byte_size(&self) -> Option<u64> {
        let mut total = self.dtype.element_size()?;
        for &dim in &self.shape {
            if dim < 0 {
                return None;
            }
            total = total.checked_mul(dim as u64)?;
        }
        Some(total)
    }
}

/// Metadata read back from a validated TFLite binary.
#[derive(Debug, Clone)]
pub struct ModelReport {
    /// Path of the validated binary
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Schema version from the Model table
    pub version: u32,
    /// Total tensors in the primary subgraph
    pub tensor_count: usize,
    /// Graph input descriptors
    pub inputs: Vec<TensorDesc>,
    /// Graph output descriptors
    pub outputs: Vec<TensorDesc>,
}

impl ModelReport {
    /// Format as a human-readable report.
    pub fn to_report(&self) -> String {
        let mut report = String::from("Model Info:\n");

        match self.inputs.first() {
            Some(input) => {
                report.push_str(&format!("  Input shape: {:?}\n", input.shape));
                report.push_str(&format!("  Input type: {}\n", input.dtype));
            }
            None => report.push_str("  Input: none declared\n"),
        }
        report.push_str(&format!("  Number of outputs: {}\n", self.outputs.len()));

        for output in &self.outputs {
            report.push_str(&format!("  Output '{}': {:?} {}\n", output.name, output.shape, output.dtype));
        }

        report
    }
}

/// Read and validate a TFLite binary, returning its tensor metadata.
pub fn read_model_report(path: impl AsRef<Path>) -> Result<ModelReport> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| ConvertError::io(format!("reading {}", path.display()), e))?;

    parse_model(&data).map(|(version, tensor_count, inputs, outputs)| ModelReport {
        path: path.to_path_buf(),
        size_bytes: data.len() as u64,
        version,
        tensor_count,
        inputs,
        outputs,
    })
    .map_err(|message| ConvertError::InvalidModel { path: path.to_path_buf(), message })
}

// FlatBuffer field ids from the TFLite schema.
const MODEL_VERSION: usize = 0;
const MODEL_SUBGRAPHS: usize = 2;
const SUBGRAPH_TENSORS: usize = 0;
const SUBGRAPH_INPUTS: usize = 1;
const SUBGRAPH_OUTPUTS: usize = 2;
const TENSOR_SHAPE: usize = 0;
const TENSOR_TYPE: usize = 1;
const TENSOR_NAME: usize = 3;

type Parse<T> = std::result::Result<T, String>;

fn parse_model(data: &[u8]) -> Parse<(u32, usize, Vec<TensorDesc>, Vec<TensorDesc>)> {
    let r = Reader { data };

    if data.len() < 8 {
        return Err(format!("file too small ({} bytes) to be a TFLite container", data.len()));
    }
    if &data[4..8] != TFLITE_FILE_IDENTIFIER {
        return Err("missing TFL3 file identifier".to_string());
    }

    let model = r.indirect(0)?;
    let version = match r.field(model, MODEL_VERSION)? {
        Some(pos) => r.u32(pos)?,
        None => 3,
    };

    let subgraphs_field =
        r.field(model, MODEL_SUBGRAPHS)?.ok_or_else(|| "model contains no subgraphs".to_string())?;
    let (sg_elems, sg_len) = r.vector(r.indirect(subgraphs_field)?)?;
    if sg_len == 0 {
        return Err("model contains no subgraphs".to_string());
    }

    // Interpreter behavior: metadata comes from the primary subgraph.
    let subgraph = r.indirect(sg_elems)?;

    let tensors_field =
        r.field(subgraph, SUBGRAPH_TENSORS)?.ok_or_else(|| "subgraph has no tensors".to_string())?;
    let (tensor_elems, tensor_count) = r.vector(r.indirect(tensors_field)?)?;

    let inputs = read_tensor_list(&r, subgraph, SUBGRAPH_INPUTS, tensor_elems, tensor_count)?;
    let outputs = read_tensor_list(&r, subgraph, SUBGRAPH_OUTPUTS, tensor_elems, tensor_count)?;

    Ok((version, tensor_count, inputs, outputs))
}

/// Resolve a subgraph's input or output index vector into tensor descriptors.
fn read_tensor_list(
    r: &Reader<'_>,
    subgraph: usize,
    field_id: usize,
    tensor_elems: usize,
    tensor_count: usize,
) -> Parse<Vec<TensorDesc>> {
    let Some(field) = r.field(subgraph, field_id)? else {
        return Ok(Vec::new());
    };

    let (elems, len) = r.vector(r.indirect(field)?)?;
    let mut descs = Vec::with_capacity(len);
    for i in 0..len {
        let index = r.i32(elems + 4 * i)?;
        if index < 0 || index as usize >= tensor_count {
            return Err(format!("tensor index {index} out of range (0..{tensor_count})"));
        }
        descs.push(read_tensor(r, r.indirect(tensor_elems + 4 * index as usize)?)?);
    }
    Ok(descs)
}

fn read_tensor(r: &Reader<'_>, tensor: usize) -> Parse<TensorDesc> {
    let shape = match r.field(tensor, TENSOR_SHAPE)? {
        Some(field) => {
            let (elems, len) = r.vector(r.indirect(field)?)?;
            let mut dims = Vec::with_capacity(len);
            for i in 0..len {
                dims.push(r.i32(elems + 4 * i)?);
            }
            dims
        }
        None => Vec::new(),
    };

    let dtype = match r.field(tensor, TENSOR_TYPE)? {
        Some(pos) => TensorType::from_code(r.u8(pos)?),
        None => TensorType::Float32,
    };

    let name = match r.field(tensor, TENSOR_NAME)? {
        Some(field) => r.string(r.indirect(field)?)?,
        None => String::new(),
    };

    Ok(TensorDesc { name, shape, dtype })
}

/// Bounds-checked little-endian FlatBuffer reads.
struct Reader<'a> {
    data: &'a [u8],
}

impl Reader<'_> {
    fn slice(&self, pos: usize, len: usize) -> Parse<&[u8]> {
        self.data
            .get(pos..pos.checked_add(len).ok_or("offset overflow")?)
            .ok_or_else(|| format!("read of {len} bytes at {pos} out of range"))
    }

    fn u8(&self, pos: usize) -> Parse<u8> {
        Ok(self.slice(pos, 1)?[0])
    }

    fn u16(&self, pos: usize) -> Parse<u16> {
        Ok(u16::from_le_bytes(self.slice(pos, 2)?.try_into().unwrap()))
    }

    fn u32(&self, pos: usize) -> Parse<u32> {
        Ok(u32::from_le_bytes(self.slice(pos, 4)?.try_into().unwrap()))
    }

    fn i32(&self, pos: usize) -> Parse<i32> {
        Ok(i32::from_le_bytes(self.slice(pos, 4)?.try_into().unwrap()))
    }

    /// Follow a uoffset to its target position.
    fn indirect(&self, pos: usize) -> Parse<usize> {
        let offset = self.u32(pos)? as usize;
        let target = pos.checked_add(offset).ok_or("offset overflow")?;
        if target >= self.data.len() {
            return Err(format!("indirect offset at {pos} points past end of file"));
        }
        Ok(target)
    }

    /// Resolve field `id` of the table at `table`, returning the absolute
    /// position of its value, or None when the field is absent.
    fn field(&self, table: usize, id: usize) -> Parse<Option<usize>> {
        let soffset = self.i32(table)? as i64;
        let vtable = (table as i64) - soffset;
        if vtable < 0 || vtable as usize >= self.data.len() {
            return Err(format!("vtable offset at {table} out of range"));
        }
        let vtable = vtable as usize;

        let vtable_len = self.u16(vtable)? as usize;
        let slot = 4 + 2 * id;
        if slot + 2 > vtable_len {
            return Ok(None);
        }

        let field_offset = self.u16(vtable + slot)? as usize;
        if field_offset == 0 {
            return Ok(None);
        }
        Ok(Some(table.checked_add(field_offset).ok_or("offset overflow")?))
    }

    /// Read a vector header: (position of first element, length).
    fn vector(&self, pos: usize) -> Parse<(usize, usize)> {
        let len = self.u32(pos)? as usize;
        let elems = pos + 4;
        Ok((elems, len))
    }

    fn string(&self, pos: usize) -> Parse<String> {
        let (start, len) = self.vector(pos)?;
        Ok(String::from_utf8_lossy(self.slice(start, len)?).into_owned())
    }
}
