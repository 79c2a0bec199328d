//! Stanford PLY meshes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use glam::{Vec3, Vec4};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use track4d_core::{Result, Track4dError};
use track4d_structures::MeshFrame;

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scalar(property: Option<&Property>) -> Option<f32> {
    match property? {
        Property::Char(v) => Some(f32::from(*v)),
        Property::UChar(v) => Some(f32::from(*v)),
        Property::Short(v) => Some(f32::from(*v)),
        Property::UShort(v) => Some(f32::from(*v)),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        _ => None,
    }
}

#[allow(clippy::cast_sign_loss)]
fn index_list(property: Option<&Property>) -> Option<Vec<u32>> {
    match property? {
        Property::ListInt(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        Property::ListShort(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
        _ => None,
    }
}

fn color(element: &DefaultElement) -> Option<Vec3> {
    let channel = |key: &str| match element.get(key)? {
        Property::UChar(v) => Some(f32::from(*v) / 255.0),
        Property::Float(v) => Some(*v),
        _ => None,
    };
    Some(Vec3::new(channel("red")?, channel("green")?, channel("blue")?))
}

/// Loads a PLY file (ASCII or binary) as one frame.
///
/// Polygonal faces are fan-triangulated; per-vertex `red`/`green`/`blue`
/// colours are kept when every vertex has them.
pub fn read_ply(path: &Path) -> Result<MeshFrame> {
    let file = File::open(path)
        .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| Track4dError::DataLoad(format!("{}: {e}", path.display())))?;

    let bad = |what: &str| Track4dError::DataLoad(format!("{}: {what}", path.display()));
    let vertex_elements = ply
        .payload
        .get("vertex")
        .ok_or_else(|| bad("no vertex element"))?;

    let mut vertices = Vec::with_capacity(vertex_elements.len());
    let mut colors = Vec::with_capacity(vertex_elements.len());
    for element in vertex_elements {
        let x = scalar(element.get("x")).ok_or_else(|| bad("vertex without x"))?;
        let y = scalar(element.get("y")).ok_or_else(|| bad("vertex without y"))?;
        let z = scalar(element.get("z")).ok_or_else(|| bad("vertex without z"))?;
        vertices.push(Vec3::new(x, y, z));
        if let Some(c) = color(element) {
            colors.push(c);
        }
    }

    let mut faces = Vec::new();
    if let Some(face_elements) = ply.payload.get("face") {
        for element in face_elements {
            let indices = index_list(element.get("vertex_indices"))
                .or_else(|| index_list(element.get("vertex_index")))
                .ok_or_else(|| bad("face without vertex_indices"))?;
            faces.push(indices);
        }
    }

    let name = path
        .file_stem()
        .map_or_else(|| "mesh".to_string(), |s| s.to_string_lossy().into_owned());
    let frame = MeshFrame::from_polygons(name, vertices, &faces)?;
    if !colors.is_empty() && colors.len() == frame.num_vertices() {
        frame.with_colors(colors)
    } else {
        Ok(frame)
    }
}

/// Writes an ASCII PLY mesh with optional per-vertex RGBA colours in `0..=1`.
///
/// `comments` are added to the header after the writer's own line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn write_ply(
    path: &Path,
    vertices: &[Vec3],
    colors: Option<&[Vec4]>,
    triangles: &[[u32; 3]],
    comments: &[String],
) -> Result<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("written by track4d".to_string());
    ply.header.comments.extend(comments.iter().cloned());

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    if colors.is_some() {
        for channel in ["red", "green", "blue", "alpha"] {
            vertex_def.properties.add(PropertyDef::new(
                channel.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            ));
        }
    }
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    ply.header.elements.add(face_def);

    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let vertex_elements = vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(v.x));
            element.insert("y".to_string(), Property::Float(v.y));
            element.insert("z".to_string(), Property::Float(v.z));
            if let Some(c) = colors.and_then(|c| c.get(i)) {
                element.insert("red".to_string(), Property::UChar(to_byte(c.x)));
                element.insert("green".to_string(), Property::UChar(to_byte(c.y)));
                element.insert("blue".to_string(), Property::UChar(to_byte(c.z)));
                element.insert("alpha".to_string(), Property::UChar(to_byte(c.w)));
            }
            element
        })
        .collect();
    let face_elements = triangles
        .iter()
        .map(|t| {
            let mut element = DefaultElement::new();
            element.insert(
                "vertex_indices".to_string(),
                Property::ListInt(t.iter().map(|&i| i as i32).collect()),
            );
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertex_elements);
    ply.payload.insert("face".to_string(), face_elements);
    ply.make_consistent()
        .map_err(|e| Track4dError::DataLoad(format!("{}: {e:?}", path.display())))?;

    let mut writer = BufWriter::new(File::create(path)?);
    Writer::new().write_ply(&mut writer, &mut ply)?;
    writer.flush()?;
    Ok(())
}
