use icefield_core::*;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory asset store that records every request.
#[derive(Default)]
struct MemoryAssets {
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryAssets {
    fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }
}

impl AssetFetcher for MemoryAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        self.requests.borrow_mut().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| format!("404 {}", url))
    }
}

/// Three vertices (36 bytes) followed by three u16 indices (6 bytes).
fn triangle_bin() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(42);
    for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in v {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes
}

fn triangle_gltf(buffer_uri: &str) -> Vec<u8> {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [1.0, 2.0, 3.0] }}],
  "meshes": [{{
    "name": "shard",
    "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}]
  }}],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
  ],
  "buffers": [{{ "uri": "{}", "byteLength": 42 }}]
}}"#,
        buffer_uri
    )
    .into_bytes()
}

#[test]
fn loads_triangle_with_node_transform() {
    let assets = MemoryAssets::default()
        .with("media/tri.gltf", triangle_gltf("tri.bin"))
        .with("media/tri.bin", triangle_bin());

    let model = pollster::block_on(load_model(&assets, "media/tri.gltf")).unwrap();

    assert_eq!(
        *assets.requests.borrow(),
        vec!["media/tri.gltf", "media/tri.bin"]
    );
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.triangle_count(), 1);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.name, "shard");
    assert_eq!(
        mesh.positions,
        vec![[1.0, 2.0, 3.0], [2.0, 2.0, 3.0], [1.0, 3.0, 3.0]]
    );
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
    assert_eq!(mesh.base_color, [1.0; 4]);
}

#[test]
fn missing_document_is_a_fetch_error() {
    let assets = MemoryAssets::default();
    let err = pollster::block_on(load_model(&assets, MODEL_PATH)).unwrap_err();
    match err {
        ModelError::Fetch { url, reason } => {
            assert_eq!(url, "media/ice.gltf");
            assert!(reason.contains("404"));
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn missing_buffer_is_a_fetch_error() {
    let assets = MemoryAssets::default().with("media/tri.gltf", triangle_gltf("tri.bin"));
    let err = pollster::block_on(load_model(&assets, "media/tri.gltf")).unwrap_err();
    assert!(matches!(err, ModelError::Fetch { ref url, .. } if url == "media/tri.bin"));
}

#[test]
fn data_uris_are_rejected() {
    let assets = MemoryAssets::default().with(
        "tri.gltf",
        triangle_gltf("data:application/octet-stream;base64,AAAA"),
    );
    let err = pollster::block_on(load_model(&assets, "tri.gltf")).unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedUri { index: 0 }));
    assert_eq!(*assets.requests.borrow(), vec!["tri.gltf"]);
}

#[test]
fn garbage_is_a_parse_error() {
    let assets = MemoryAssets::default().with("bad.gltf", b"not a model".to_vec());
    let err = pollster::block_on(load_model(&assets, "bad.gltf")).unwrap_err();
    assert!(matches!(err, ModelError::Gltf(_)));
}
