//! End-to-end tests for the shader build pipeline
//!
//! A small shell script stands in for sokol-shdc: it copies
//! `<input>.fixture` to the `--output=` path and records its arguments in
//! `<input>.args`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shader_build::args::classify;
use shader_build::escape::escape_string;
use shader_build::{run, BuildConfig, BuildError};
use tempfile::tempdir;

/// Scripts are written then executed; keep that away from concurrent forks
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

const FAKE_SHDC: &str = r#"#!/bin/sh
in=""
out=""
for arg in "$@"; do
  case "$arg" in
    --input=*) in="${arg#--input=}" ;;
    --output=*) out="${arg#--output=}" ;;
  esac
done
echo "$@" > "$in.args"
if [ -f "$in.fixture" ]; then
  cat "$in.fixture" > "$out"
fi
"#;

const FAILING_SHDC: &str = "#!/bin/sh\necho 'main2d.glsl(3): error: syntax error' >&2\nexit 3\n";

const FOO_HEADER: &str = "\
#pragma once
/*
    Shader program: 'foo':
        Attributes:
            ATTR_foo_position => 0
    Bindings:
        Uniform block 'FooParams':
            C struct: FooParams_t
        Image 'tex':
        Sampler 'smp':
*/
#define ATTR_foo_position (0)
SOKOL_SHDC_ALIGN(16) typedef struct FooParams_t {
    float time;
    vec2 offset;
} FooParams_t;
";

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-shdc");
    fs::write(&path, body).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("Failed to chmod");
    path
}

fn add_shader(root: &Path, relative: &str, fixture: Option<&str>) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "@vs vs\n@end\n").unwrap();
    if let Some(fixture) = fixture {
        let mut fixture_path = path.clone().into_os_string();
        fixture_path.push(".fixture");
        fs::write(fixture_path, fixture).unwrap();
    }
    path
}

fn config_for(script: &Path) -> BuildConfig {
    let mut config = BuildConfig::default();
    config.compiler.program = script.to_string_lossy().to_string();
    config
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[test]
fn test_full_pipeline() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let tools = tempdir().unwrap();
    let script = write_script(tools.path(), FAKE_SHDC);

    let root = work.path().join("shaders");
    let top = add_shader(&root, "foo.glsl", Some(FOO_HEADER));
    let bar_header = FOO_HEADER.replace("'foo'", "'bar'").replace("ATTR_foo", "ATTR_bar");
    let nested = add_shader(&root, "ui/bar.glsl", Some(bar_header.as_str()));
    add_shader(&root, "third_party/skip.glsl", Some(FOO_HEADER));

    let list_file = work.path().join("shader_sources.txt");
    let tokens = vec![
        root.to_string_lossy().to_string(),
        "--exclude=third_party".to_string(),
        format!("--list_file={}", list_file.display()),
        "--reflection".to_string(),
    ];
    let args = classify(&tokens).validate().unwrap();

    let summary = run(&args, &config_for(&script), work.path()).unwrap();

    assert_eq!(summary.generated_sources, vec![suffixed(&top, ".c"), suffixed(&nested, ".c")]);
    assert!(summary.unnamed_shaders.is_empty());
    assert!(!root.join("third_party/skip.glsl.h").exists());

    // Header keeps generator output and gains the macros
    let header = fs::read_to_string(suffixed(&top, ".h")).unwrap();
    assert!(header.starts_with(FOO_HEADER));
    assert!(header.contains(&format!("#define foo_SHADER_FILE_PATH \"{}\"\n", top.display())));
    assert!(header.contains("#define foo_SHADER_ATTR_COUNT 1\n"));
    assert!(header.contains("\t{ .name=\"position\", .index=ATTR_foo_position }, \\\n"));
    assert!(header.contains("#define foo_SHADER_IMAGE_COUNT 1\n"));
    assert!(header.contains("#define foo_SHADER_SAMPLER_COUNT 1\n"));
    assert!(header.contains("#define foo_SHADER_UNIFORM_COUNT 2\n"));
    assert!(header.contains(".offset=STRUCT_VAR_OFFSET(FooParams_t, offset)"));

    let nested_header = fs::read_to_string(suffixed(&nested, ".h")).unwrap();
    assert!(nested_header.contains("#define bar_SHADER_ATTR_COUNT 1\n"));

    let companion = fs::read_to_string(suffixed(&top, ".c")).unwrap();
    assert_eq!(companion, "\n#include \"shader_include.h\"\n\n#include \"foo.glsl.h\"\n");

    // Forwarded options come after the fixed ones
    let recorded = fs::read_to_string(suffixed(&top, ".args")).unwrap();
    assert!(recorded.starts_with("--format=sokol_impl --errfmt=msvc --slang=hlsl5:glsl430:metal_macos --input="));
    assert!(recorded.trim_end().ends_with("--reflection"));

    let manifest = fs::read_to_string(&list_file).unwrap();
    assert_eq!(manifest, "shaders/foo.glsl.c,shaders/ui/bar.glsl.c");
    assert_eq!(summary.manifest, Some(list_file));
}

#[test]
fn test_quote_in_folder_name_reaches_compiler_verbatim() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAKE_SHDC);

    let root = work.path().join("Bob's shaders");
    let shader = add_shader(&root, "foo.glsl", Some(FOO_HEADER));
    let list_file = work.path().join("list.txt");

    let tokens = vec![
        root.to_string_lossy().to_string(),
        format!("--list_file={}", list_file.display()),
    ];
    let args = classify(&tokens).validate().unwrap();
    let summary = run(&args, &config_for(&script), work.path()).unwrap();

    assert_eq!(summary.generated_sources, vec![suffixed(&shader, ".c")]);
    let recorded = fs::read_to_string(suffixed(&shader, ".args")).unwrap();
    assert!(recorded.contains(&format!("--output={}", suffixed(&shader, ".h").display())));

    // Only the C literal is escaped
    let header = fs::read_to_string(suffixed(&shader, ".h")).unwrap();
    let literal = escape_string(&shader.to_string_lossy(), true);
    assert!(literal.contains("Bob\\'s shaders"));
    assert!(header.contains(&format!("#define foo_SHADER_FILE_PATH {}\n", literal)));
    assert_eq!(fs::read_to_string(&list_file).unwrap(), "Bob's shaders/foo.glsl.c");
}

#[test]
fn test_dot_segments_in_root_are_resolved() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAKE_SHDC);

    let shader = add_shader(&work.path().join("shaders"), "foo.glsl", Some(FOO_HEADER));
    let root = work.path().join("shaders").join("..").join("shaders").join(".");
    let list_file = work.path().join("list.txt");

    let tokens = vec![
        root.to_string_lossy().to_string(),
        format!("--list_file={}", list_file.display()),
    ];
    let args = classify(&tokens).validate().unwrap();
    let summary = run(&args, &config_for(&script), work.path()).unwrap();

    assert_eq!(summary.generated_sources, vec![suffixed(&shader, ".c")]);
    let header = fs::read_to_string(suffixed(&shader, ".h")).unwrap();
    assert!(header.contains(&format!("#define foo_SHADER_FILE_PATH \"{}\"\n", shader.display())));
    assert_eq!(fs::read_to_string(&list_file).unwrap(), "shaders/foo.glsl.c");
}

#[test]
fn test_header_without_banner_is_left_alone() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAKE_SHDC);

    let root = work.path().join("shaders");
    let plain = "#pragma once\n#define ATTR_foo_position (0)\n";
    let shader = add_shader(&root, "plain.glsl", Some(plain));

    let args = classify([root.to_string_lossy()]).validate().unwrap();
    let summary = run(&args, &config_for(&script), work.path()).unwrap();

    assert_eq!(summary.unnamed_shaders, vec![shader.clone()]);
    assert_eq!(fs::read_to_string(suffixed(&shader, ".h")).unwrap(), plain);
    let companion = fs::read_to_string(suffixed(&shader, ".c")).unwrap();
    assert!(companion.contains("#include \"shader_include.h\""));
    assert!(companion.contains("#include \"plain.glsl.h\""));
    assert!(summary.manifest.is_none());
}

#[test]
fn test_compiler_failure_aborts_run() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAILING_SHDC);

    let root = work.path().join("shaders");
    let first = add_shader(&root, "a.glsl", Some(FOO_HEADER));
    let second = add_shader(&root, "b.glsl", Some(FOO_HEADER));
    let list_file = work.path().join("list.txt");

    let tokens = vec![
        root.to_string_lossy().to_string(),
        format!("--list_file={}", list_file.display()),
    ];
    let args = classify(&tokens).validate().unwrap();
    let err = run(&args, &config_for(&script), work.path()).unwrap_err();

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::CompilerFailed { input, code }) => {
            assert_eq!(input, &first);
            assert_eq!(*code, Some(3));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!suffixed(&first, ".c").exists());
    assert!(!suffixed(&second, ".h").exists());
    assert!(!list_file.exists());
}

#[test]
fn test_missing_header_is_fatal() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAKE_SHDC);

    let root = work.path().join("shaders");
    let shader = add_shader(&root, "nothing.glsl", None);

    let args = classify([root.to_string_lossy()]).validate().unwrap();
    let err = run(&args, &config_for(&script), work.path()).unwrap_err();

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::HeaderMissing(path)) => assert_eq!(path, &suffixed(&shader, ".h")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_no_shaders_still_writes_empty_manifest() {
    let work = tempdir().unwrap();
    let root = work.path().join("empty");
    fs::create_dir_all(root.join("nested")).unwrap();
    let list_file = work.path().join("list.txt");

    let tokens = vec![
        root.to_string_lossy().to_string(),
        format!("--list_file={}", list_file.display()),
    ];
    let args = classify(&tokens).validate().unwrap();

    // Compiler is never looked up when there is nothing to compile
    let mut config = BuildConfig::default();
    config.compiler.program = "no-such-shader-compiler".to_string();

    let summary = run(&args, &config, work.path()).unwrap();
    assert!(summary.generated_sources.is_empty());
    assert_eq!(summary.entries_walked, 1);
    assert_eq!(fs::read_to_string(&list_file).unwrap(), "");
}

#[test]
fn test_config_exclude_and_extension() {
    let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let work = tempdir().unwrap();
    let script = write_script(work.path(), FAKE_SHDC);

    let root = work.path().join("shaders");
    let kept = add_shader(&root, "main.shader", Some(FOO_HEADER));
    add_shader(&root, "legacy/old.shader", Some(FOO_HEADER));
    add_shader(&root, "ignored.glsl", Some(FOO_HEADER));

    let mut config = config_for(&script);
    config.scan.extension = ".shader".to_string();
    config.scan.exclude = vec!["legacy".to_string()];
    config.output.runtime_header = "gfx_shader_runtime.h".to_string();

    let args = classify([root.to_string_lossy()]).validate().unwrap();
    let summary = run(&args, &config, work.path()).unwrap();

    assert_eq!(summary.generated_sources, vec![suffixed(&kept, ".c")]);
    let companion = fs::read_to_string(suffixed(&kept, ".c")).unwrap();
    assert!(companion.contains("#include \"gfx_shader_runtime.h\""));
}
