//! Property tests for splitting generated multi-object documents
//!
//! Each generated document is built together with the exact output expected
//! for every object, so the properties compare against a known answer rather
//! than re-deriving it.

use objcrack_core::{segment, GroupNamePolicy, ObjSplitter, SourceDocument};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct ObjectPlan {
    vertices: usize,
    /// Faces as (local index, component shape) pairs
    faces: Vec<Vec<(usize, u8)>>,
    extras: Vec<u8>,
}

fn object_plan() -> impl Strategy<Value = ObjectPlan> {
    (1usize..6)
        .prop_flat_map(|vertices| {
            let face = prop::collection::vec((1..=vertices, 0u8..4), 3..5);
            (
                Just(vertices),
                prop::collection::vec(face, 0..4),
                prop::collection::vec(0u8..4, 0..3),
            )
        })
        .prop_map(|(vertices, faces, extras)| ObjectPlan {
            vertices,
            faces,
            extras,
        })
}

fn format_ref(index: usize, shape: u8) -> String {
    match shape {
        0 => format!("{}", index),
        1 => format!("{}/{}", index, index),
        2 => format!("{}//{}", index, index),
        _ => format!("{}/{}/{}", index, index, index),
    }
}

fn format_face(face: &[(usize, u8)], base: usize) -> String {
    let refs: Vec<String> = face
        .iter()
        .map(|&(index, shape)| format_ref(index + base, shape))
        .collect();
    format!("f {}", refs.join(" "))
}

fn extra_line(kind: u8) -> &'static str {
    match kind {
        0 => "vn 0 0 1",
        1 => "vt 0.5 0.5",
        2 => "s off",
        _ => "usemtl stone",
    }
}

/// Build the source lines and the expected output of every object
fn build(objects: &[ObjectPlan]) -> (Vec<String>, BTreeMap<String, Vec<String>>) {
    let header = vec!["# exported scene".to_string(), "mtllib scene.mtl".to_string()];
    let mut source = header.clone();
    let mut expected = BTreeMap::new();
    let mut base = 0;

    for (i, object) in objects.iter().enumerate() {
        let name = format!("Obj{}", i);
        let mut shared = vec!["#".to_string(), format!("# object {}", name), "#".to_string()];
        for v in 0..object.vertices {
            shared.push(format!("v {} 0 0", v));
        }
        shared.extend(object.extras.iter().map(|&kind| extra_line(kind).to_string()));
        shared.push(format!("g {}", name));

        let mut local = if i == 0 { header.clone() } else { Vec::new() };
        local.extend(shared.iter().cloned());
        source.extend(shared);

        for face in &object.faces {
            local.push(format_face(face, 0));
            source.push(format_face(face, base));
        }

        expected.insert(name, local);
        base += object.vertices;
    }

    (source, expected)
}

fn parse_components(face: &str) -> Vec<i64> {
    face.split_whitespace()
        .skip(1)
        .flat_map(|token| token.split('/'))
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i64>().unwrap())
        .collect()
}

proptest! {
    #[test]
    fn split_matches_expected_objects(objects in prop::collection::vec(object_plan(), 1..6)) {
        let (source, expected) = build(&objects);
        let doc = SourceDocument::from_lines(source);
        let result = ObjSplitter::default().split(&doc).unwrap();
        prop_assert_eq!(result.into_map(), expected);
    }

    #[test]
    fn vertex_count_is_preserved(objects in prop::collection::vec(object_plan(), 1..6)) {
        let (source, _) = build(&objects);
        let doc = SourceDocument::from_lines(source);
        let result = ObjSplitter::default().split(&doc).unwrap();
        prop_assert_eq!(result.total_vertex_count(), doc.vertex_count());
    }

    #[test]
    fn face_indices_are_local(objects in prop::collection::vec(object_plan(), 1..6)) {
        let (source, _) = build(&objects);
        let doc = SourceDocument::from_lines(source);
        let result = ObjSplitter::default().split(&doc).unwrap();
        for object in &result {
            for line in object.lines.iter().filter(|line| line.starts_with("f ")) {
                for index in parse_components(line) {
                    prop_assert!(index >= 1 && index <= object.vertex_count as i64,
                        "{} out of range in {}", index, object.name);
                }
            }
        }
    }

    #[test]
    fn segments_cover_every_line_once(objects in prop::collection::vec(object_plan(), 1..6)) {
        let (source, _) = build(&objects);
        let doc = SourceDocument::from_lines(source);
        let segments = segment(&doc, GroupNamePolicy::Last).unwrap();
        let rebuilt: Vec<String> = segments
            .iter()
            .flat_map(|seg| seg.lines.iter().cloned())
            .collect();
        prop_assert_eq!(rebuilt.as_slice(), doc.lines());
    }

    #[test]
    fn pass_through_lines_survive_in_order(objects in prop::collection::vec(object_plan(), 1..6)) {
        let (source, _) = build(&objects);
        let doc = SourceDocument::from_lines(source.clone());
        let result = ObjSplitter::default().split(&doc).unwrap();
        let output: Vec<String> = result
            .iter()
            .flat_map(|object| object.lines.iter().cloned())
            .filter(|line| !line.starts_with("f "))
            .collect();
        let input: Vec<String> = source
            .into_iter()
            .filter(|line| !line.starts_with("f "))
            .collect();
        prop_assert_eq!(output, input);
    }
}
