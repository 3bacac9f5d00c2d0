//! Reflection scraping of sokol-shdc generated headers
//!
//! The generated header describes the shader in a comment block followed by
//! the C declarations:
//!
//! ```text
//!     Shader program: 'main2d':
//!             ATTR_main2d_position => 0
//!         Uniform block 'main2d_VertParams':
//!             C struct: main2d_VertParams_t
//!         Image 'main2d_texture0':
//!         Sampler 'main2d_sampler0':
//! #define ATTR_main2d_position (0)
//! SOKOL_SHDC_ALIGN(16) typedef struct main2d_VertParams_t {
//!     mat4 world;
//! } main2d_VertParams_t;
//! ```
//!
//! This is a single forward pass, not a C parser. Once the program banner has
//! been seen, every line is checked against all patterns independently.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ReflectionError;

/// Shader name used when the header has no program banner
pub const UNKNOWN_SHADER_NAME: &str = "unknown";

static SHADER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Shader program:\s*'([^']+)':").expect("shader name pattern"));
static IMAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Image '([^']+)':").expect("image pattern"));
static SAMPLER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Sampler '([^']+)':").expect("sampler pattern"));
static UNIFORM_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s+([A-Za-z_][A-Za-z0-9_]*);\s*$").expect("uniform field pattern")
});

/// Uniform block announced by a `C struct:` comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    /// Block name without shader prefix and `_t` suffix
    pub name: String,
    /// C struct name without `_t` suffix
    pub struct_name: String,
}

/// One field declared inside a uniform block struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub block: String,
    pub struct_name: String,
    pub ty: String,
    pub name: String,
}

impl UniformField {
    /// (block, type, name) view of the field
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.block, &self.ty, &self.name)
    }
}

/// Everything scraped from one generated header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionRecord {
    pub shader_name: String,
    pub attributes: Vec<String>,
    pub images: Vec<String>,
    pub samplers: Vec<String>,
    pub uniform_blocks: Vec<UniformBlock>,
    /// Fields in the order they appear inside their block
    pub uniforms: Vec<UniformField>,
}

impl Default for ReflectionRecord {
    fn default() -> Self {
        Self {
            shader_name: UNKNOWN_SHADER_NAME.to_string(),
            attributes: Vec::new(),
            images: Vec::new(),
            samplers: Vec::new(),
            uniform_blocks: Vec::new(),
            uniforms: Vec::new(),
        }
    }
}

/// Patterns that depend on the shader name
#[derive(Debug)]
struct ShaderPatterns {
    attribute: Regex,
    uniform_struct: Regex,
}

impl ShaderPatterns {
    fn new(shader_name: &str) -> Self {
        let name = regex::escape(shader_name);
        Self {
            attribute: Regex::new(&format!(r"^\s*#define\s+ATTR_{name}_(\w+)\s*\(\d+\)\s*$"))
                .expect("escaped shader name forms a valid pattern"),
            uniform_struct: Regex::new(&format!(r"C struct:\s*((?:{name}_)?(\w+))_t\s*$"))
                .expect("escaped shader name forms a valid pattern"),
        }
    }
}

/// Open/close patterns for one known uniform block
#[derive(Debug)]
struct BlockPatterns {
    block: UniformBlock,
    open: Regex,
    close: Regex,
}

impl BlockPatterns {
    fn new(block: UniformBlock) -> Self {
        let struct_name = regex::escape(&block.struct_name);
        Self {
            open: Regex::new(&format!(r"typedef\s+struct\s+{struct_name}_t\s*\{{"))
                .expect("escaped struct name forms a valid pattern"),
            close: Regex::new(&format!(r"^\s*\}}\s*{struct_name}_t\s*;\s*$"))
                .expect("escaped struct name forms a valid pattern"),
            block,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockScan {
    Outside,
    /// Index into the known block list
    Inside(usize),
}

#[derive(Debug)]
enum ScanState {
    SeekingName,
    InBody {
        patterns: ShaderPatterns,
        blocks: Vec<BlockPatterns>,
        block_scan: BlockScan,
    },
}

/// Line-by-line scanner over a generated header
#[derive(Debug)]
pub struct HeaderScanner {
    state: ScanState,
    record: ReflectionRecord,
}

impl Default for HeaderScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::SeekingName,
            record: ReflectionRecord::default(),
        }
    }

    /// Feed the next line (without its terminator)
    pub fn feed_line(&mut self, line: &str) {
        match &mut self.state {
            ScanState::SeekingName => {
                if let Some(caps) = SHADER_NAME.captures(line) {
                    let name = caps[1].to_string();
                    tracing::debug!("Shader name: \"{}\"", name);
                    self.state = ScanState::InBody {
                        patterns: ShaderPatterns::new(&name),
                        blocks: Vec::new(),
                        block_scan: BlockScan::Outside,
                    };
                    self.record.shader_name = name;
                }
            }
            ScanState::InBody {
                patterns,
                blocks,
                block_scan,
            } => {
                let record = &mut self.record;

                if let Some(caps) = IMAGE_NAME.captures(line) {
                    record.images.push(caps[1].to_string());
                }
                if let Some(caps) = SAMPLER_NAME.captures(line) {
                    record.samplers.push(caps[1].to_string());
                }
                if let Some(caps) = patterns.attribute.captures(line) {
                    record.attributes.push(caps[1].to_string());
                }
                if let Some(caps) = patterns.uniform_struct.captures(line) {
                    let block = UniformBlock {
                        name: caps[2].to_string(),
                        struct_name: caps[1].to_string(),
                    };
                    tracing::debug!("Found uniform block \"{}\"", block.name);
                    record.uniform_blocks.push(block.clone());
                    blocks.push(BlockPatterns::new(block));
                }

                match *block_scan {
                    BlockScan::Outside => {
                        if let Some(index) = blocks.iter().position(|b| b.open.is_match(line)) {
                            *block_scan = BlockScan::Inside(index);
                        }
                    }
                    BlockScan::Inside(index) => {
                        let current = &blocks[index];
                        if current.close.is_match(line) {
                            *block_scan = BlockScan::Outside;
                        } else if let Some(caps) = UNIFORM_FIELD.captures(line) {
                            record.uniforms.push(UniformField {
                                block: current.block.name.clone(),
                                struct_name: current.block.struct_name.clone(),
                                ty: caps[1].to_string(),
                                name: caps[2].to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Whether the program banner has been seen
    pub fn found_name(&self) -> bool {
        matches!(self.state, ScanState::InBody { .. })
    }

    pub fn finish(self) -> Result<ReflectionRecord, ReflectionError> {
        if self.found_name() {
            Ok(self.record)
        } else {
            Err(ReflectionError::NameNotFound)
        }
    }
}

/// Scan a whole header in one go
pub fn scan_header(contents: &str) -> Result<ReflectionRecord, ReflectionError> {
    let mut scanner = HeaderScanner::new();
    for line in contents.lines() {
        scanner.feed_line(line);
    }
    scanner.finish()
}
