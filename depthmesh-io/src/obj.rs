//! OBJ format support

use crate::MeshWriter;
use depthmesh_core::{Result, TriangleMesh};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct ObjWriter;

impl ObjWriter {
    /// Write `v`, `vt` and `vn` records followed by 1-based faces.
    ///
    /// Texture coordinates and normals are written only when present; the
    /// face records reference whichever attributes exist.
    pub fn write_to<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
        writeln!(writer, "# depthmesh")?;
        writeln!(writer, "# vertices: {} faces: {}", mesh.vertex_count(), mesh.face_count())?;

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        if let Some(uvs) = &mesh.uvs {
            for uv in uvs {
                writeln!(writer, "vt {} {}", uv[0], uv[1])?;
            }
        }
        if let Some(normals) = &mesh.normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }

        let has_uvs = mesh.uvs.is_some();
        let has_normals = mesh.normals.is_some();
        for face in &mesh.faces {
            write!(writer, "f")?;
            for &i in face {
                let i = i + 1;
                match (has_uvs, has_normals) {
                    (true, true) => write!(writer, " {i}/{i}/{i}")?,
                    (true, false) => write!(writer, " {i}/{i}")?,
                    (false, true) => write!(writer, " {i}//{i}")?,
                    (false, false) => write!(writer, " {i}")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
