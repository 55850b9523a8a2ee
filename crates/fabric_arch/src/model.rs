//! Gate-level primitive model descriptors.
//!
//! A [`Model`] describes the port interface of one primitive kind (LUT,
//! latch, I/O pad, or a user black box). Models are immutable and shared:
//! the [`ModelLibrary`] interns them by name and hands out [`Arc`] handles,
//! so every atom block of the same kind points at the same descriptor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the builtin model for primary inputs.
pub const MODEL_INPUT: &str = "input";
/// Name of the builtin model for primary outputs.
pub const MODEL_OUTPUT: &str = "output";
/// Name of the builtin model for single-output combinational covers.
pub const MODEL_NAMES: &str = "names";
/// Name of the builtin model for D latches.
pub const MODEL_LATCH: &str = "latch";

/// A single port on a primitive model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPort {
    /// Port name (e.g. "in", "D", "addr").
    pub name: String,
    /// Declared bit width, always at least 1.
    pub width: u32,
    /// Whether this port carries a clock.
    pub is_clock: bool,
}

impl ModelPort {
    /// Creates a data port of the given width.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            width,
            is_clock: false,
        }
    }

    /// Creates a single-bit clock port.
    pub fn clock(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: 1,
            is_clock: true,
        }
    }
}

/// The port interface of one primitive kind.
///
/// Models outlive the netlist and are read-only; they carry no references
/// back into netlist or architecture data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Unique model name (e.g. "names", "latch", "single_port_ram").
    pub name: String,
    /// Input and clock ports.
    pub inputs: Vec<ModelPort>,
    /// Output ports.
    pub outputs: Vec<ModelPort>,
}

impl Model {
    /// Creates a model with the given ports.
    pub fn new(name: impl Into<String>, inputs: Vec<ModelPort>, outputs: Vec<ModelPort>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }

    /// Returns `true` if this is one of the four builtin gate-level models.
    pub fn is_builtin(&self) -> bool {
        matches!(
            self.name.as_str(),
            MODEL_INPUT | MODEL_OUTPUT | MODEL_NAMES | MODEL_LATCH
        )
    }
}

/// Interning store for primitive models.
///
/// Two requests for the same model name yield the same [`Arc`] handle.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    by_name: HashMap<String, Arc<Model>>,
}

impl ModelLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Creates a library pre-populated with the four builtin models:
    /// `input`, `output`, `names`, and `latch`.
    pub fn with_builtins() -> Self {
        let mut lib = Self::new();
        lib.intern(Model::new(
            MODEL_INPUT,
            vec![],
            vec![ModelPort::new("inpad", 1)],
        ));
        lib.intern(Model::new(
            MODEL_OUTPUT,
            vec![ModelPort::new("outpad", 1)],
            vec![],
        ));
        lib.intern(Model::new(
            MODEL_NAMES,
            vec![ModelPort::new("in", 1)],
            vec![ModelPort::new("out", 1)],
        ));
        lib.intern(Model::new(
            MODEL_LATCH,
            vec![ModelPort::new("D", 1), ModelPort::clock("clk")],
            vec![ModelPort::new("Q", 1)],
        ));
        lib
    }

    /// Interns a model, returning the shared handle.
    ///
    /// If a model with the same name is already present, the existing handle
    /// is returned and the argument is discarded.
    pub fn intern(&mut self, model: Model) -> Arc<Model> {
        if let Some(existing) = self.by_name.get(&model.name) {
            return Arc::clone(existing);
        }
        let handle = Arc::new(model);
        self.by_name
            .insert(handle.name.clone(), Arc::clone(&handle));
        handle
    }

    /// Looks up a model by name.
    pub fn find(&self, name: &str) -> Option<Arc<Model>> {
        self.by_name.get(name).map(Arc::clone)
    }

    /// Returns the number of interned models.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if no models are interned.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_present() {
        let lib = ModelLibrary::with_builtins();
        assert_eq!(lib.len(), 4);
        for name in [MODEL_INPUT, MODEL_OUTPUT, MODEL_NAMES, MODEL_LATCH] {
            let model = lib.find(name).unwrap();
            assert!(model.is_builtin());
        }
    }

    #[test]
    fn intern_dedups_by_name() {
        let mut lib = ModelLibrary::new();
        let a = lib.intern(Model::new("ram", vec![ModelPort::new("addr", 4)], vec![]));
        let b = lib.intern(Model::new("ram", vec![], vec![]));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(lib.len(), 1);
        // The first interned definition wins.
        assert_eq!(b.inputs.len(), 1);
    }

    #[test]
    fn find_missing() {
        let lib = ModelLibrary::with_builtins();
        assert!(lib.find("no_such_model").is_none());
    }

    #[test]
    fn latch_ports() {
        let lib = ModelLibrary::with_builtins();
        let latch = lib.find(MODEL_LATCH).unwrap();
        assert_eq!(latch.inputs.len(), 2);
        assert!(latch.inputs[1].is_clock);
        assert_eq!(latch.outputs[0].name, "Q");
    }

    #[test]
    fn user_model_is_not_builtin() {
        let model = Model::new("mult_18x18", vec![], vec![]);
        assert!(!model.is_builtin());
    }
}
