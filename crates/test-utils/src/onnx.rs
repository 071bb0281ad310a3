//! ONNX model fixtures.
//!
//! Real SRCNN exports are tens of megabytes, so tests use a stand-in graph
//! with the same input and output contract: one float tensor shaped
//! `(1, height, width, 1)` in, one of the same shape out. The graph computes
//! `output = input * scale + offset` with two standard operators.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

// TensorProto.DataType.FLOAT
const ONNX_FLOAT: u64 = 1;
const IR_VERSION: u64 = 8;
const OPSET_VERSION: u64 = 13;

/// Builder for a small element-wise ONNX model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnnxModelFixture {
    scale: f32,
    offset: f32,
    size: Option<(usize, usize)>,
}

impl OnnxModelFixture {
    /// Returns its input unchanged.
    pub fn identity() -> Self {
        Self::affine(1.0, 0.0)
    }

    pub fn affine(scale: f32, offset: f32) -> Self {
        Self {
            scale,
            offset,
            size: None,
        }
    }

    /// Fix height and width in the graph instead of leaving them symbolic.
    pub fn fixed_size(mut self, height: usize, width: usize) -> Self {
        self.size = Some((height, width));
        self
    }

    /// Serialized `ModelProto`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let graph = Message::new()
            .message(1, node("scale_input", "Mul", ["input", "scale"], "scaled"))
            .message(1, node("shift_input", "Add", ["scaled", "offset"], "output"))
            .string(2, "srcnn_fixture")
            .message(5, scalar("scale", self.scale))
            .message(5, scalar("offset", self.offset))
            .message(11, value_info("input", self.size))
            .message(12, value_info("output", self.size));

        Message::new()
            .varint(1, IR_VERSION)
            .string(2, "aqi-test-utils")
            .message(7, graph)
            .message(8, Message::new().varint(2, OPSET_VERSION))
            .into_bytes()
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_bytes())
    }

    /// Write to `srcnn.onnx` in a fresh temporary directory.
    ///
    /// Keep the returned `TempDir` alive for as long as the file is needed.
    pub fn write_temp(&self) -> io::Result<(TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("srcnn.onnx");
        self.write(&path)?;
        Ok((dir, path))
    }
}

fn node(name: &str, op_type: &str, inputs: [&str; 2], output: &str) -> Message {
    Message::new()
        .string(1, inputs[0])
        .string(1, inputs[1])
        .string(2, output)
        .string(3, name)
        .string(4, op_type)
}

/// Rank-0 float initializer.
fn scalar(name: &str, value: f32) -> Message {
    Message::new()
        .varint(2, ONNX_FLOAT)
        .string(8, name)
        .bytes(9, &value.to_le_bytes())
}

/// NHWC float tensor with batch and channel fixed to 1.
fn value_info(name: &str, size: Option<(usize, usize)>) -> Message {
    let fixed = |n: usize| Message::new().varint(1, n as u64);
    let symbolic = |p: &str| Message::new().string(2, p);
    let (height, width) = match size {
        Some((h, w)) => (fixed(h), fixed(w)),
        None => (symbolic("height"), symbolic("width")),
    };
    let shape = Message::new()
        .message(1, fixed(1))
        .message(1, height)
        .message(1, width)
        .message(1, fixed(1));
    let tensor_type = Message::new().varint(1, ONNX_FLOAT).message(2, shape);

    Message::new()
        .string(1, name)
        .message(2, Message::new().message(1, tensor_type))
}

/// Minimal protobuf writer: varint and length-delimited fields only.
struct Message(Vec<u8>);

impl Message {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn key(&mut self, field: u32, wire_type: u8) {
        put_varint(&mut self.0, (u64::from(field) << 3) | u64::from(wire_type));
    }

    fn varint(mut self, field: u32, value: u64) -> Self {
        self.key(field, 0);
        put_varint(&mut self.0, value);
        self
    }

    fn bytes(mut self, field: u32, value: &[u8]) -> Self {
        self.key(field, 2);
        put_varint(&mut self.0, value.len() as u64);
        self.0.extend_from_slice(value);
        self
    }

    fn string(self, field: u32, value: &str) -> Self {
        self.bytes(field, value.as_bytes())
    }

    fn message(self, field: u32, value: Message) -> Self {
        self.bytes(field, &value.0)
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}
