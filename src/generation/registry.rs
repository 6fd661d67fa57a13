//! Serializable tags for built-in generators and selectors.
//!
//! Components cross the background-worker boundary as these tags and are
//! rebuilt on the other side. Custom components without a tag can only run
//! in the foreground.

use serde::{Deserialize, Serialize};

use super::collapse::CollapseColorer;
use super::displacement::{DisplacementGenerator, LandscapeGenerator};
use super::generator::{Generator, GeneratorSelector};
use super::midpoint::MidpointGenerator;
use super::selector::{DiggingSelector, FixedSelector, UniformSelector};
use crate::core::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorKind {
    #[default]
    Landscape,
    Displacement,
    Collapse,
    Midpoint,
}

impl GeneratorKind {
    pub fn build(self) -> Box<dyn Generator> {
        match self {
            GeneratorKind::Landscape => Box::new(LandscapeGenerator),
            GeneratorKind::Displacement => Box::new(DisplacementGenerator),
            GeneratorKind::Collapse => Box::new(CollapseColorer),
            GeneratorKind::Midpoint => Box::new(MidpointGenerator),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectorKind {
    #[default]
    Uniform,
    Digging,
    Fixed(usize),
}

impl SelectorKind {
    pub fn build(self) -> Box<dyn GeneratorSelector> {
        match self {
            SelectorKind::Uniform => Box::new(UniformSelector),
            SelectorKind::Digging => Box::new(DiggingSelector),
            SelectorKind::Fixed(index) => Box::new(FixedSelector(index)),
        }
    }
}

/// Default generator list: a single landscape generator.
pub fn default_generators() -> Vec<GeneratorKind> {
    vec![GeneratorKind::Landscape]
}

pub fn build_generators(kinds: &[GeneratorKind]) -> Vec<Box<dyn Generator>> {
    kinds.iter().map(|kind| kind.build()).collect()
}

/// Registry tags for every generator, failing on the first untagged one.
pub fn generator_kinds(generators: &[Box<dyn Generator>]) -> Result<Vec<GeneratorKind>> {
    generators
        .iter()
        .map(|g| g.kind().ok_or_else(|| Error::UnregisteredComponent(g.name().to_string())))
        .collect()
}

pub fn selector_kind(selector: &dyn GeneratorSelector) -> Result<SelectorKind> {
    selector
        .kind()
        .ok_or_else(|| Error::UnregisteredComponent(selector.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::session::GenerationSession;
    use crate::mesh::vertex::{Vertex, VERTICES_PER_SPLIT};

    struct Flatten;

    impl Generator for Flatten {
        fn apply(&self, vertices: &mut [Vertex; VERTICES_PER_SPLIT], _: &[f32; VERTICES_PER_SPLIT], _: &mut GenerationSession) {
            for v in vertices.iter_mut() {
                v.position.y = 0.0;
            }
        }
    }

    #[test]
    fn test_kinds_round_trip_through_build() {
        let kinds = vec![
            GeneratorKind::Landscape,
            GeneratorKind::Displacement,
            GeneratorKind::Collapse,
            GeneratorKind::Midpoint,
        ];
        let built = build_generators(&kinds);
        assert_eq!(generator_kinds(&built).unwrap(), kinds);

        for kind in [SelectorKind::Uniform, SelectorKind::Digging, SelectorKind::Fixed(2)] {
            assert_eq!(selector_kind(kind.build().as_ref()).unwrap(), kind);
        }
    }

    #[test]
    fn test_untagged_generator_is_unregistered() {
        let generators: Vec<Box<dyn Generator>> = vec![Box::new(LandscapeGenerator), Box::new(Flatten)];
        match generator_kinds(&generators) {
            Err(Error::UnregisteredComponent(name)) => assert!(name.contains("Flatten")),
            other => panic!("expected UnregisteredComponent, got {:?}", other),
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&GeneratorKind::Landscape).unwrap(), "\"landscape\"");
        assert_eq!(serde_json::to_string(&SelectorKind::Fixed(1)).unwrap(), "{\"fixed\":1}");
        let kind: SelectorKind = serde_json::from_str("\"digging\"").unwrap();
        assert_eq!(kind, SelectorKind::Digging);
    }
}
