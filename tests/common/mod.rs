//! Shared fixtures for integration tests: a hand-built minimal TFLite
//! FlatBuffer and executable fake-tool scripts.

use std::path::{Path, PathBuf};

/// Forward-writing FlatBuffer construction.
struct Fb {
    buf: Vec<u8>,
}

impl Fb {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn u8v(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16v(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32v(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32v(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn placeholder(&mut self) -> usize {
        let at = self.buf.len();
        self.u32v(0);
        at
    }

    fn resolve(&mut self, at: usize) {
        let delta = (self.buf.len() - at) as u32;
        self.buf[at..at + 4].copy_from_slice(&delta.to_le_bytes());
    }
}

/// Minimal loadable TFLite container: one subgraph, a FLOAT32 input tensor
/// `images` and a FLOAT32 output tensor `output0`.
pub fn minimal_tflite_model(input_shape: &[i32], output_shape: &[i32]) -> Vec<u8> {
    let mut f = Fb::new();
    let root_at = f.placeholder();
    f.buf.extend_from_slice(b"TFL3");

    // Model vtable: version (id 0), subgraphs (id 2)
    f.u16v(10);
    f.u16v(12);
    f.u16v(4);
    f.u16v(0);
    f.u16v(8);
    f.resolve(root_at);
    f.i32v(10);
    f.u32v(3);
    let subgraphs_at = f.placeholder();

    f.resolve(subgraphs_at);
    f.u32v(1);
    let sg_at = f.placeholder();

    // SubGraph vtable: tensors (id 0), inputs (id 1), outputs (id 2)
    f.u16v(10);
    f.u16v(16);
    f.u16v(4);
    f.u16v(8);
    f.u16v(12);
    f.resolve(sg_at);
    f.i32v(10);
    let tensors_at = f.placeholder();
    let inputs_at = f.placeholder();
    let outputs_at = f.placeholder();

    f.resolve(tensors_at);
    f.u32v(2);
    let t0_at = f.placeholder();
    let t1_at = f.placeholder();

    f.resolve(inputs_at);
    f.u32v(1);
    f.i32v(0);

    f.resolve(outputs_at);
    f.u32v(1);
    f.i32v(1);

    for (shape, name, t_at) in [(input_shape, "images", t0_at), (output_shape, "output0", t1_at)] {
        // Tensor vtable: shape (id 0), type (id 1), name (id 3)
        f.u16v(12);
        f.u16v(16);
        f.u16v(4);
        f.u16v(12);
        f.u16v(0);
        f.u16v(8);
        f.resolve(t_at);
        f.i32v(12);
        let shape_at = f.placeholder();
        let name_at = f.placeholder();
        f.u8v(0); // FLOAT32
        f.u8v(0);
        f.u8v(0);
        f.u8v(0);

        f.resolve(shape_at);
        f.u32v(shape.len() as u32);
        for &d in shape {
            f.i32v(d);
        }

        f.resolve(name_at);
        f.u32v(name.len() as u32);
        f.buf.extend_from_slice(name.as_bytes());
        f.u8v(0);
    }

    f.buf
}

/// Write an executable shell script that stands in for an external tool.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
