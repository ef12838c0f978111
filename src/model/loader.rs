//! Wavefront OBJ loading.
//!
//! Every model in the file is merged into one indexed mesh. Files without
//! normals get smooth per-vertex normals generated from their faces.

use std::path::Path;

use crate::error::MeshError;
use crate::utils::{Mesh, Vertex};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file into a single mesh.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| MeshError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    let mut mesh = Mesh::empty();
    let mut generated = false;
    for model in models {
        let (mut part, has_normals) = convert(&model.mesh);
        if !has_normals {
            part.recompute_normals();
            generated = true;
        }
        mesh.append(part);
    }

    if mesh.is_empty() {
        return Err(MeshError::Empty(path.to_path_buf()));
    }

    tracing::info!(
        "Loaded mesh {}: {} vertices, {} triangles{}",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count(),
        if generated { " (normals generated)" } else { "" }
    );
    Ok(mesh)
}

/// Returns the mesh and whether every vertex got a usable normal from the file.
/// Partially normalled files (some faces without `vn`) count as unnormalled.
fn convert(src: &tobj::Mesh) -> (Mesh, bool) {
    let has_normals = src.normals.len() == src.positions.len()
        && src.normals.chunks_exact(3).all(|n| n.iter().any(|c| *c != 0.0));
    let vertices = src
        .positions
        .chunks_exact(3)
        .enumerate()
        .map(|(i, p)| Vertex {
            pos: [p[0], p[1], p[2]],
            normal: if has_normals {
                [src.normals[3 * i], src.normals[3 * i + 1], src.normals[3 * i + 2]]
            } else {
                [0.0; 3]
            },
        })
        .collect();

    let mesh = Mesh {
        vertices,
        indices: src.indices.clone(),
    };
    (mesh, has_normals)
}
