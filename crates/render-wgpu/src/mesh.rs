use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Height of the floor quad below each cube.
const FLOOR_Y: f32 = -7.0;
const FLOOR_HALF_EXTENT: f32 = 5.0;

/// Unit cube followed by the floor quad, as one indexed mesh.
///
/// The floor is part of the object mesh, so every cube instance carries its own
/// floor seven units below it.
pub(crate) fn scene_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let (mut vertices, mut indices) = cube_mesh();
    let base = vertices.len() as u16;
    let (floor_verts, floor_indices) = floor_mesh();
    vertices.extend(floor_verts);
    indices.extend(floor_indices.into_iter().map(|i| i + base));
    (vertices, indices)
}

fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

fn floor_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let e = FLOOR_HALF_EXTENT;
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex { position: [-e, FLOOR_Y, e], normal: up },
        Vertex { position: [e, FLOOR_Y, e], normal: up },
        Vertex { position: [e, FLOOR_Y, -e], normal: up },
        Vertex { position: [-e, FLOOR_Y, -e], normal: up },
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_sizes() {
        let (vertices, indices) = scene_mesh();
        assert_eq!(vertices.len(), 28);
        assert_eq!(indices.len(), 42);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn cube_is_unit_sized() {
        let (vertices, _) = cube_mesh();
        for v in &vertices {
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn floor_sits_below_cube() {
        let (vertices, indices) = scene_mesh();
        let floor = &indices[36..];
        assert!(floor.iter().all(|&i| i >= 24));
        for &i in floor {
            let v = vertices[i as usize];
            assert_eq!(v.position[1], FLOOR_Y);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn normals_are_unit() {
        let (vertices, _) = scene_mesh();
        for v in &vertices {
            let n = glam::Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-6);
        }
    }
}
