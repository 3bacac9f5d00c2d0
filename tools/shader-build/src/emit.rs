//! Metadata macros appended to generated headers, and companion sources
//!
//! Each descriptor list is emitted as a COUNT macro and a DEFS macro holding a
//! brace initializer. An empty list gets one `NO_ENTRIES_STR` sentinel entry
//! because empty aggregate initializers are invalid C; COUNT stays 0.

use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::fs::OpenOptions;
use std::io::Write as IoWrite;
use std::path::Path;

use crate::error::BuildError;
use crate::escape::escape_string;
use crate::reflection::ReflectionRecord;

/// Placeholder name used by sentinel entries
pub const NO_ENTRIES_STR: &str = "no_entries";

const INDEX_SENTINEL: &str = "{ .name=NO_ENTRIES_STR, .index=0 }";
const UNIFORM_SENTINEL: &str = "{ .name=NO_ENTRIES_STR, .blockIndex=0, .offset=0, .size=0 }";

/// Render the block of `#define`s describing one shader
pub fn render_metadata(record: &ReflectionRecord, shader_path: &Path) -> Result<String> {
    let shader = &record.shader_name;
    let mut output = String::new();

    writeln!(output)?;
    writeln!(output)?;
    writeln!(output, "//NOTE: These lines were added by shader-build")?;
    writeln!(
        output,
        "//NOTE: Because an empty array is invalid in C, we always add at least one dummy entry to these definition #defines while the corresponding COUNT #define will remain 0"
    )?;
    writeln!(output, "#ifndef NO_ENTRIES_STR")?;
    writeln!(output, "#define NO_ENTRIES_STR \"{}\"", NO_ENTRIES_STR)?;
    writeln!(output, "#endif")?;
    writeln!(
        output,
        "#define {}_SHADER_FILE_PATH {}",
        shader,
        escape_string(&shader_path.to_string_lossy(), true)
    )?;

    let attributes: Vec<String> = record
        .attributes
        .iter()
        .map(|attr| format!("{{ .name=\"{attr}\", .index=ATTR_{shader}_{attr} }}"))
        .collect();
    write_defs(&mut output, shader, "ATTR", &attributes, INDEX_SENTINEL, "ShaderAttributeDef")?;

    let images: Vec<String> = record
        .images
        .iter()
        .map(|image| format!("{{ .name=\"{image}\", .index=IMG_{image} }}"))
        .collect();
    write_defs(&mut output, shader, "IMAGE", &images, INDEX_SENTINEL, "ShaderImageDef")?;

    let samplers: Vec<String> = record
        .samplers
        .iter()
        .map(|sampler| format!("{{ .name=\"{sampler}\", .index=SMP_{sampler} }}"))
        .collect();
    write_defs(&mut output, shader, "SAMPLER", &samplers, INDEX_SENTINEL, "ShaderSamplerDef")?;

    let uniforms: Vec<String> = record
        .uniforms
        .iter()
        .map(|field| {
            let name = &field.name;
            let st = &field.struct_name;
            format!(
                "{{ .name=\"{name}\", .blockIndex=UB_{st}, .offset=STRUCT_VAR_OFFSET({st}_t, {name}), .size=STRUCT_VAR_SIZE({st}_t, {name}) }}"
            )
        })
        .collect();
    write_defs(&mut output, shader, "UNIFORM", &uniforms, UNIFORM_SENTINEL, "ShaderUniformDef")?;

    Ok(output)
}

/// One COUNT/DEFS macro pair
fn write_defs(
    output: &mut String,
    shader: &str,
    kind: &str,
    entries: &[String],
    sentinel: &str,
    c_type: &str,
) -> Result<()> {
    writeln!(output, "#define {}_SHADER_{}_COUNT {}", shader, kind, entries.len())?;
    writeln!(output, "#define {}_SHADER_{}_DEFS {{ \\", shader, kind)?;
    if entries.is_empty() {
        writeln!(output, "\t{} \\", sentinel)?;
    }
    for entry in entries {
        writeln!(output, "\t{}, \\", entry)?;
    }
    writeln!(output, "}} // These should match {} in the shader runtime", c_type)?;
    Ok(())
}

/// Append rendered metadata to the end of the header, keeping its contents
pub fn append_metadata(header_path: &Path, metadata: &str) -> Result<(), BuildError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(header_path)
        .map_err(|e| BuildError::io("Failed to open", header_path, e))?;
    file.write_all(metadata.as_bytes())
        .map_err(|e| BuildError::io("Failed to append to", header_path, e))
}

/// Contents of the `.c` file that compiles a generated header
pub fn companion_source(runtime_header: &str, header_file_name: &str) -> String {
    format!(
        "\n#include \"{}\"\n\n#include \"{}\"\n",
        runtime_header, header_file_name
    )
}

/// (Re)write the companion source from scratch
pub fn write_companion_source(
    path: &Path,
    runtime_header: &str,
    header_file_name: &str,
) -> Result<(), BuildError> {
    std::fs::write(path, companion_source(runtime_header, header_file_name))
        .map_err(|e| BuildError::io("Failed to write", path, e))
}
