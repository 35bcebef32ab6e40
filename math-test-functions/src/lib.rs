#![doc = include_str!("../README.md")]

use std::collections::HashMap;

use ndarray::Array1;

pub mod functions;
pub use functions::*;

/// Plain objective signature shared by every function in this crate.
pub type TestFunction = fn(&Array1<f64>) -> f64;

/// A registered objective with its search box and known optima.
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Registry key.
    pub name: String,
    /// The objective itself.
    pub function: TestFunction,
    /// `(lower, upper)` for every coordinate.
    pub bounds: Vec<(f64, f64)>,
    /// Every known global minimiser with the minimum value.
    pub global_minima: Vec<(Vec<f64>, f64)>,
    /// One line for listings.
    pub description: String,
    /// More than one local minimum.
    pub multimodal: bool,
}

struct Entry {
    name: &'static str,
    function: TestFunction,
    half_width: f64,
    minima: &'static [([f64; 2], f64)],
    description: &'static str,
    multimodal: bool,
}

const REGISTRY: [Entry; 3] = [
    Entry {
        name: "rastrigin",
        function: rastrigin,
        half_width: 5.12,
        minima: &[([0.0, 0.0], 0.0)],
        description: "Rastrigin, a cosine grid of local minima over a bowl",
        multimodal: true,
    },
    Entry {
        name: "sinusoidal",
        function: sinusoidal,
        half_width: 5.0,
        minima: &[
            ([0.099196, -0.099196], -0.980161),
            ([-0.099196, 0.099196], -0.980161),
        ],
        description: "sphere bowl under a sin(5 pi x0) sin(5 pi x1) ripple",
        multimodal: true,
    },
    Entry {
        name: "sphere",
        function: sphere,
        half_width: 5.0,
        minima: &[([0.0, 0.0], 0.0)],
        description: "convex sum of squares",
        multimodal: false,
    },
];

impl From<&Entry> for FunctionMetadata {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.name.to_string(),
            function: entry.function,
            bounds: vec![(-entry.half_width, entry.half_width); 2],
            global_minima: entry
                .minima
                .iter()
                .map(|(point, value)| (point.to_vec(), *value))
                .collect(),
            description: entry.description.to_string(),
            multimodal: entry.multimodal,
        }
    }
}

/// Every registered function keyed by name.
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    REGISTRY
        .iter()
        .map(|entry| (entry.name.to_string(), FunctionMetadata::from(entry)))
        .collect()
}

/// Registered names in alphabetical order.
pub fn function_names() -> Vec<String> {
    REGISTRY.iter().map(|entry| entry.name.to_string()).collect()
}

/// Case-insensitive lookup, surrounding whitespace ignored.
pub fn function_by_name(name: &str) -> Option<FunctionMetadata> {
    let key = name.trim().to_lowercase();
    REGISTRY
        .iter()
        .find(|entry| entry.name == key)
        .map(FunctionMetadata::from)
}
