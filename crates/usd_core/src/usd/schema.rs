//! Peripheral per-schema attribute reconstruction (spec.md §2 out-of-scope
//! note: "per-Prim-type schema attribute reconstruction" beyond a minimal
//! set is not this spec's core, but a real reader still needs *something*
//! here to produce a useful `Prim`). Grounded in the teacher's
//! `UsdMesh`/`XformOp`/`parse_mesh_content` (types.rs, parser.rs).

use glam::{Mat4, Quat, Vec3};

use crate::usd::error::ReaderError;
use crate::usd::prim::{
    GeomBasisCurves, GeomCamera, GeomCapsule, GeomCone, GeomCube, GeomCylinder, GeomMesh,
    GeomPoints, GeomSphere, GeomSubset, LightCommon, OpaqueSchema, PrimPayload, Xform, XformOp,
};
use crate::usd::value::{Property, PropertyMap, PropertyValue};

fn f64_attr(props: &PropertyMap, name: &str) -> Option<f64> {
    props.get_value(name).and_then(PropertyValue::as_f64)
}

fn str_attr<'a>(props: &'a PropertyMap, name: &str) -> Option<&'a str> {
    props.get_value(name).and_then(PropertyValue::as_str)
}

fn bool_attr(props: &PropertyMap, name: &str) -> Option<bool> {
    props.get_value(name).and_then(PropertyValue::as_bool)
}

fn vec3_attr(props: &PropertyMap, name: &str) -> Option<Vec3> {
    props
        .get_value(name)
        .and_then(PropertyValue::as_vec3)
        .map(|(x, y, z)| Vec3::new(x, y, z))
}

fn int_array_attr(props: &PropertyMap, name: &str) -> Vec<i64> {
    props
        .get_value(name)
        .and_then(PropertyValue::as_int_array)
        .map(|v| v.to_vec())
        .unwrap_or_default()
}

fn vec3_array_attr(props: &PropertyMap, name: &str) -> Vec<Vec3> {
    props
        .get_value(name)
        .and_then(PropertyValue::as_vec3_array)
        .map(|v| v.iter().map(|&(x, y, z)| Vec3::new(x, y, z)).collect())
        .unwrap_or_default()
}

/// Reconstruct a typed `PrimPayload` from an opaque `PropertyMap`, dispatched
/// on the USD type-name token. Unknown types are the caller's responsibility
/// (spec.md §4.5: falls back to `Model` or errors, per `allow_unknown_prims`).
pub fn reconstruct_prim(type_name: &str, properties: &PropertyMap) -> Result<PrimPayload, ReaderError> {
    let payload = match type_name {
        "Xform" => PrimPayload::Xform(reconstruct_xform(properties)),
        "Scope" => PrimPayload::Scope,
        "Mesh" => PrimPayload::GeomMesh(reconstruct_mesh(properties)),
        "Sphere" => PrimPayload::GeomSphere(GeomSphere {
            radius: f64_attr(properties, "radius").unwrap_or(1.0),
        }),
        "Cube" => PrimPayload::GeomCube(GeomCube {
            size: f64_attr(properties, "size").unwrap_or(2.0),
        }),
        "Cone" => PrimPayload::GeomCone(GeomCone {
            radius: f64_attr(properties, "radius").unwrap_or(1.0),
            height: f64_attr(properties, "height").unwrap_or(2.0),
            axis: str_attr(properties, "axis").and_then(|s| s.chars().next()).unwrap_or('Y'),
        }),
        "Cylinder" => PrimPayload::GeomCylinder(GeomCylinder {
            radius: f64_attr(properties, "radius").unwrap_or(1.0),
            height: f64_attr(properties, "height").unwrap_or(2.0),
            axis: str_attr(properties, "axis").and_then(|s| s.chars().next()).unwrap_or('Y'),
        }),
        "Capsule" => PrimPayload::GeomCapsule(GeomCapsule {
            radius: f64_attr(properties, "radius").unwrap_or(0.5),
            height: f64_attr(properties, "height").unwrap_or(1.0),
            axis: str_attr(properties, "axis").and_then(|s| s.chars().next()).unwrap_or('Y'),
        }),
        "Points" => PrimPayload::GeomPoints(GeomPoints {
            points: vec3_array_attr(properties, "points"),
            widths: int_array_attr(properties, "widths").into_iter().map(|v| v as f32).collect(),
        }),
        "BasisCurves" => PrimPayload::GeomBasisCurves(GeomBasisCurves {
            points: vec3_array_attr(properties, "points"),
            curve_vertex_counts: int_array_attr(properties, "curveVertexCounts"),
            basis: str_attr(properties, "basis").unwrap_or("bezier").to_string(),
            curve_type: str_attr(properties, "type").unwrap_or("cubic").to_string(),
            wrap: str_attr(properties, "wrap").unwrap_or("nonperiodic").to_string(),
        }),
        "GeomSubset" => PrimPayload::GeomSubset(GeomSubset {
            element_type: str_attr(properties, "elementType").unwrap_or("face").to_string(),
            indices: int_array_attr(properties, "indices"),
            family_name: str_attr(properties, "familyName").map(str::to_string),
        }),
        "Camera" => PrimPayload::GeomCamera(GeomCamera {
            focal_length: f64_attr(properties, "focalLength").unwrap_or(50.0),
            horizontal_aperture: f64_attr(properties, "horizontalAperture").unwrap_or(20.955),
            vertical_aperture: f64_attr(properties, "verticalAperture").unwrap_or(15.2908),
            clipping_range: (
                f64_attr(properties, "clippingRange.0").unwrap_or(1.0),
                f64_attr(properties, "clippingRange.1").unwrap_or(1_000_000.0),
            ),
            projection: str_attr(properties, "projection").unwrap_or("perspective").to_string(),
        }),
        "SphereLight" => PrimPayload::SphereLight(reconstruct_light(properties)),
        "DomeLight" => PrimPayload::DomeLight(reconstruct_light(properties)),
        "DiskLight" => PrimPayload::DiskLight(reconstruct_light(properties)),
        "DistantLight" => PrimPayload::DistantLight(reconstruct_light(properties)),
        "CylinderLight" => PrimPayload::CylinderLight(reconstruct_light(properties)),
        "Material" => PrimPayload::Material(opaque(properties)),
        "Shader" => PrimPayload::Shader(opaque(properties)),
        "SkelRoot" => PrimPayload::SkelRoot(opaque(properties)),
        "Skeleton" => PrimPayload::Skeleton(opaque(properties)),
        "SkelAnimation" => PrimPayload::SkelAnimation(opaque(properties)),
        "BlendShape" => PrimPayload::BlendShape(opaque(properties)),
        "GPrim" => PrimPayload::GPrim(opaque(properties)),
        "NodeGraph" => PrimPayload::NodeGraph(opaque(properties)),
        other => {
            return Err(ReaderError::UnknownPrimType {
                type_name: other.to_string(),
            })
        }
    };
    Ok(payload)
}

fn opaque(properties: &PropertyMap) -> OpaqueSchema {
    OpaqueSchema {
        properties: properties.clone(),
    }
}

fn reconstruct_light(properties: &PropertyMap) -> LightCommon {
    LightCommon {
        intensity: f64_attr(properties, "inputs:intensity").unwrap_or(1.0),
        color: vec3_attr(properties, "inputs:color").unwrap_or(Vec3::ONE),
        exposure: f64_attr(properties, "inputs:exposure").unwrap_or(0.0),
        properties: properties.clone(),
    }
}

/// Build an `Xform` from `xformOpOrder` + the individual `xformOp:*`
/// attributes it names, preserving authored order rather than collapsing
/// eagerly into a matrix (grounded in `compose_xform_ops`, generalized to
/// keep ops un-collapsed per SPEC_FULL.md §9).
fn reconstruct_xform(properties: &PropertyMap) -> Xform {
    let op_order: Vec<String> = properties
        .get_value("xformOpOrder")
        .map(|v| match v {
            PropertyValue::StringArray(v) => v.clone(),
            PropertyValue::Token(s) | PropertyValue::String(s) => vec![s.clone()],
            _ => Vec::new(),
        })
        .unwrap_or_default();

    let mut ops = Vec::with_capacity(op_order.len());
    for op_name in &op_order {
        if let Some(op) = parse_xform_op(op_name, properties) {
            ops.push(op);
        }
    }

    Xform { ops, op_order }
}

fn parse_xform_op(op_name: &str, properties: &PropertyMap) -> Option<XformOp> {
    let value = properties.get_value(op_name)?;
    if op_name.starts_with("xformOp:translate") {
        let (x, y, z) = value.as_vec3()?;
        Some(XformOp::Translate(Vec3::new(x, y, z)))
    } else if op_name.starts_with("xformOp:rotateXYZ") {
        let (x, y, z) = value.as_vec3()?;
        Some(XformOp::RotateXYZ(Vec3::new(x, y, z)))
    } else if op_name.starts_with("xformOp:scale") {
        let (x, y, z) = value.as_vec3()?;
        Some(XformOp::Scale(Vec3::new(x, y, z)))
    } else if op_name.starts_with("xformOp:orient") {
        match value {
            PropertyValue::Quat(x, y, z, w) => Some(XformOp::Orient(Quat::from_xyzw(*x, *y, *z, *w))),
            _ => None,
        }
    } else if op_name.starts_with("xformOp:transform") {
        match value {
            PropertyValue::FloatArray(v) if v.len() == 16 => {
                let mut cols = [0.0f32; 16];
                for (dst, src) in cols.iter_mut().zip(v.iter()) {
                    *dst = *src as f32;
                }
                Some(XformOp::Transform(Mat4::from_cols_array(&cols)))
            }
            _ => None,
        }
    } else {
        None
    }
}

/// Fan-triangulate an n-gon mesh into a flat triangle index buffer
/// (grounded verbatim in the teacher's `UsdMesh::triangulate`).
fn triangulate(face_vertex_counts: &[i64], face_vertex_indices: &[i64]) -> Vec<u32> {
    let mut indices = Vec::new();
    let mut vertex_offset = 0usize;

    for &count in face_vertex_counts {
        let count = count as usize;
        if count < 3 {
            vertex_offset += count;
            continue;
        }
        for i in 1..(count - 1) {
            let i0 = face_vertex_indices[vertex_offset] as u32;
            let i1 = face_vertex_indices[vertex_offset + i] as u32;
            let i2 = face_vertex_indices[vertex_offset + i + 1] as u32;
            indices.push(i0);
            indices.push(i1);
            indices.push(i2);
        }
        vertex_offset += count;
    }

    indices
}

impl GeomMesh {
    /// Fan-triangulated index buffer, suitable for downstream rendering.
    /// Reconstruction itself never triangulates eagerly; this is opt-in.
    pub fn triangulated_indices(&self) -> Vec<u32> {
        triangulate(&self.face_vertex_counts, &self.face_vertex_indices)
    }
}

fn reconstruct_mesh(properties: &PropertyMap) -> GeomMesh {
    let extent = {
        let arr = vec3_array_attr(properties, "extent");
        if arr.len() == 2 {
            Some([arr[0], arr[1]])
        } else {
            None
        }
    };

    GeomMesh {
        points: vec3_array_attr(properties, "points"),
        face_vertex_counts: int_array_attr(properties, "faceVertexCounts"),
        face_vertex_indices: int_array_attr(properties, "faceVertexIndices"),
        normals: vec3_array_attr(properties, "normals"),
        extent,
        double_sided: bool_attr(properties, "doubleSided").unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props_with(pairs: Vec<(&str, PropertyValue)>) -> PropertyMap {
        let mut m = PropertyMap::new();
        for (name, value) in pairs {
            m.insert(
                name,
                Property::Attribute {
                    type_name: value.type_name().to_string(),
                    value: Some(value),
                },
            );
        }
        m
    }

    #[test]
    fn triangulate_quad_is_two_triangles() {
        let indices = triangulate(&[4], &[0, 1, 2, 3]);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn reconstruct_sphere_reads_radius() {
        let props = props_with(vec![("radius", PropertyValue::Float(2.5))]);
        let payload = reconstruct_prim("Sphere", &props).unwrap();
        match payload {
            PrimPayload::GeomSphere(s) => assert_eq!(s.radius, 2.5),
            _ => panic!("wrong payload"),
        }
    }

    #[test]
    fn reconstruct_xform_preserves_op_order() {
        let props = props_with(vec![
            (
                "xformOpOrder",
                PropertyValue::StringArray(vec!["xformOp:translate".to_string()]),
            ),
            ("xformOp:translate", PropertyValue::Vec3(1.0, 2.0, 3.0)),
        ]);
        let payload = reconstruct_prim("Xform", &props).unwrap();
        match payload {
            PrimPayload::Xform(x) => {
                assert_eq!(x.ops.len(), 1);
                assert_eq!(x.ops[0], XformOp::Translate(Vec3::new(1.0, 2.0, 3.0)));
            }
            _ => panic!("wrong payload"),
        }
    }

    #[test]
    fn unknown_type_errors() {
        let props = PropertyMap::new();
        let err = reconstruct_prim("TotallyMadeUp", &props).unwrap_err();
        assert!(matches!(err, ReaderError::UnknownPrimType { .. }));
    }
}
