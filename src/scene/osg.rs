// osg.rs - Human-readable text scene format (.osg)

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Read, Write};

use super::node::{Geometry, Material, NodeCore, SceneTree, IDENTITY_MATRIX};
pub use super::node::MAX_NESTING;
use super::traits::SceneFileType;

/// First token of every text scene file
pub const OSG_HEADER: &str = "#OSG V1.0";

/// Text scene format
#[derive(Debug, Clone)]
pub struct OsgFileType;

impl SceneFileType for OsgFileType {
    fn suffixes(&self) -> &'static [&'static str] {
        &["osg"]
    }

    fn name(&self) -> &'static str {
        "OSG"
    }

    fn description(&self) -> &'static str {
        "Text scene format (nested Node blocks)"
    }

    fn read(&self, input: &mut dyn Read) -> Result<SceneTree, String> {
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read text scene: {}", e))?;
        parse_scene(&text)
    }

    fn write(&self, tree: &SceneTree, output: &mut dyn Write, compress: bool) -> Result<(), String> {
        if compress {
            log::debug!("OSG text format ignores the compress flag");
        }
        let text = format_scene(tree)?;
        output
            .write_all(text.as_bytes())
            .map_err(|e| format!("Write error: {}", e))
    }
}

// ============================================================================
// LEXER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("'{}'", s),
            Token::Number(s) => format!("number {}", s),
            Token::Str(s) => format!("string \"{}\"", s),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(&ch) = chars.peek() {
        match ch {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '{' => {
                tokens.push((Token::LBrace, line));
                chars.next();
            }
            '}' => {
                tokens.push((Token::RBrace, line));
                chars.next();
            }
            '[' => {
                tokens.push((Token::LBracket, line));
                chars.next();
            }
            ']' => {
                tokens.push((Token::RBracket, line));
                chars.next();
            }
            '"' => {
                chars.next();
                let start_line = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('"') => value.push('"'),
                            Some('\\') => value.push('\\'),
                            Some(other) => {
                                return Err(format!(
                                    "Line {}: unknown escape '\\{}'",
                                    line, other
                                ))
                            }
                            None => {
                                return Err(format!("Line {}: unterminated string", start_line))
                            }
                        },
                        Some('\n') => {
                            line += 1;
                            value.push('\n');
                        }
                        Some(c) => value.push(c),
                        None => {
                            return Err(format!("Line {}: unterminated string", start_line))
                        }
                    }
                }
                tokens.push((Token::Str(value), start_line));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut value = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                        value.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Number(value), line));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut value = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        value.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(value), line));
            }
            other => return Err(format!("Line {}: unexpected character '{}'", line, other)),
        }
    }

    Ok(tokens)
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, line)| *line)
            .unwrap_or(1)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Result<Token, String> {
        let line = self.line();
        let token = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| format!("Line {}: unexpected end of file", line))?;
        self.pos += 1;
        Ok(token)
    }

    fn error(&self, expected: &str, found: &Token) -> String {
        format!(
            "Line {}: expected {}, found {}",
            self.tokens
                .get(self.pos.saturating_sub(1))
                .map(|(_, l)| *l)
                .unwrap_or(1),
            expected,
            found.describe()
        )
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.error(&expected.describe(), &token))
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.next()? {
            Token::Ident(s) => Ok(s),
            other => Err(self.error("identifier", &other)),
        }
    }

    fn expect_string(&mut self) -> Result<String, String> {
        match self.next()? {
            Token::Str(s) => Ok(s),
            other => Err(self.error("string", &other)),
        }
    }

    fn expect_f32(&mut self) -> Result<f32, String> {
        match self.next()? {
            Token::Number(s) => s
                .parse::<f32>()
                .map_err(|_| format!("Line {}: invalid number '{}'", self.line(), s)),
            other => Err(self.error("number", &other)),
        }
    }

    fn float_list(&mut self) -> Result<Vec<f32>, String> {
        self.expect(Token::LBracket)?;
        let mut values = Vec::new();
        while self.peek() != Some(&Token::RBracket) {
            values.push(self.expect_f32()?);
        }
        self.expect(Token::RBracket)?;
        Ok(values)
    }

    fn fixed_list<const N: usize>(&mut self, field: &str) -> Result<[f32; N], String> {
        let values = self.float_list()?;
        values.as_slice().try_into().map_err(|_| {
            format!(
                "Line {}: '{}' needs {} values, got {}",
                self.line(),
                field,
                N,
                values.len()
            )
        })
    }

    fn vec3_list(&mut self, field: &str) -> Result<Vec<[f32; 3]>, String> {
        let values = self.float_list()?;
        if values.len() % 3 != 0 {
            return Err(format!(
                "Line {}: '{}' length {} is not a multiple of 3",
                self.line(),
                field,
                values.len()
            ));
        }
        Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    }

    fn index_list(&mut self) -> Result<Vec<u32>, String> {
        self.expect(Token::LBracket)?;
        let mut values = Vec::new();
        while self.peek() != Some(&Token::RBracket) {
            match self.next()? {
                Token::Number(s) => values.push(
                    s.parse::<u32>()
                        .map_err(|_| format!("Line {}: invalid index '{}'", self.line(), s))?,
                ),
                other => return Err(self.error("index", &other)),
            }
        }
        self.expect(Token::RBracket)?;
        Ok(values)
    }

    fn parse_node(&mut self, depth: usize) -> Result<SceneTree, String> {
        if depth > MAX_NESTING {
            return Err(format!(
                "Line {}: nodes nested deeper than {}",
                self.line(),
                MAX_NESTING
            ));
        }

        let keyword = self.expect_ident()?;
        if keyword != "Node" {
            return Err(format!("Line {}: expected 'Node', found '{}'", self.line(), keyword));
        }
        self.expect(Token::LBrace)?;

        let mut tree = SceneTree::default();
        loop {
            match self.next()? {
                Token::RBrace => break,
                Token::Ident(field) => match field.as_str() {
                    "name" => tree.name = Some(self.expect_string()?),
                    "core" => {
                        if tree.core.is_some() {
                            return Err(format!("Line {}: node has more than one core", self.line()));
                        }
                        tree.core = Some(self.parse_core()?);
                    }
                    "meta" => self.parse_meta(&mut tree.meta)?,
                    "children" => {
                        self.expect(Token::LBracket)?;
                        while self.peek() != Some(&Token::RBracket) {
                            tree.children.push(self.parse_node(depth + 1)?);
                        }
                        self.expect(Token::RBracket)?;
                    }
                    other => {
                        return Err(format!("Line {}: unknown node field '{}'", self.line(), other))
                    }
                },
                other => return Err(self.error("node field or '}'", &other)),
            }
        }

        Ok(tree)
    }

    fn parse_meta(&mut self, meta: &mut BTreeMap<String, String>) -> Result<(), String> {
        self.expect(Token::LBrace)?;
        while self.peek() != Some(&Token::RBrace) {
            let key = self.expect_string()?;
            let value = self.expect_string()?;
            meta.insert(key, value);
        }
        self.expect(Token::RBrace)
    }

    fn parse_core(&mut self) -> Result<NodeCore, String> {
        let kind = self.expect_ident()?;
        self.expect(Token::LBrace)?;

        let core = match kind.as_str() {
            "Group" => NodeCore::Group,
            "Transform" => {
                let mut matrix = IDENTITY_MATRIX;
                while let Some(Token::Ident(_)) = self.peek() {
                    match self.expect_ident()?.as_str() {
                        "matrix" => matrix = self.fixed_list::<16>("matrix")?,
                        other => return Err(self.unknown_field("Transform", other)),
                    }
                }
                NodeCore::Transform { matrix }
            }
            "DistanceLOD" => {
                let mut center = [0.0; 3];
                let mut ranges = Vec::new();
                while let Some(Token::Ident(_)) = self.peek() {
                    match self.expect_ident()?.as_str() {
                        "center" => center = self.fixed_list::<3>("center")?,
                        "range" => ranges = self.float_list()?,
                        other => return Err(self.unknown_field("DistanceLOD", other)),
                    }
                }
                NodeCore::DistanceLod { center, ranges }
            }
            "MaterialGroup" => {
                let mut material = None;
                while let Some(Token::Ident(_)) = self.peek() {
                    match self.expect_ident()?.as_str() {
                        "material" => material = Some(self.parse_material()?),
                        other => return Err(self.unknown_field("MaterialGroup", other)),
                    }
                }
                let material = material
                    .ok_or_else(|| format!("Line {}: MaterialGroup without material", self.line()))?;
                NodeCore::MaterialGroup { material }
            }
            "Geometry" => {
                let mut geometry = Geometry::default();
                while let Some(Token::Ident(_)) = self.peek() {
                    match self.expect_ident()?.as_str() {
                        "positions" => geometry.positions = self.vec3_list("positions")?,
                        "normals" => geometry.normals = self.vec3_list("normals")?,
                        "indices" => geometry.indices = self.index_list()?,
                        "material" => geometry.material = Some(self.parse_material()?),
                        other => return Err(self.unknown_field("Geometry", other)),
                    }
                }
                geometry
                    .validate()
                    .map_err(|e| format!("Line {}: {}", self.line(), e))?;
                NodeCore::Geometry(geometry)
            }
            other => return Err(format!("Line {}: unknown core type '{}'", self.line(), other)),
        };

        self.expect(Token::RBrace)?;
        Ok(core)
    }

    fn parse_material(&mut self) -> Result<Material, String> {
        let kind = self.expect_ident()?;
        if kind != "SimpleMaterial" {
            return Err(format!("Line {}: unknown material type '{}'", self.line(), kind));
        }
        self.expect(Token::LBrace)?;

        let mut material = Material::default();
        while let Some(Token::Ident(_)) = self.peek() {
            match self.expect_ident()?.as_str() {
                "diffuse" => material.diffuse = self.fixed_list::<4>("diffuse")?,
                "specular" => material.specular = self.fixed_list::<4>("specular")?,
                "shininess" => material.shininess = self.expect_f32()?,
                "transparency" => material.transparency = self.expect_f32()?,
                other => return Err(self.unknown_field("SimpleMaterial", other)),
            }
        }

        self.expect(Token::RBrace)?;
        Ok(material)
    }

    fn unknown_field(&self, owner: &str, field: &str) -> String {
        format!("Line {}: unknown {} field '{}'", self.line(), owner, field)
    }
}

/// Parse a complete text scene
pub fn parse_scene(text: &str) -> Result<SceneTree, String> {
    if !text.trim_start().starts_with("#OSG") {
        return Err("Missing #OSG header".to_string());
    }

    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let tree = parser.parse_node(1)?;

    if let Some(extra) = parser.peek() {
        return Err(format!(
            "Line {}: trailing content after root node: {}",
            parser.line(),
            extra.describe()
        ));
    }
    Ok(tree)
}

// ============================================================================
// WRITER
// ============================================================================

fn check_finite(values: &[f32]) -> Result<(), String> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err("Text scene format can't store NaN or infinite values".to_string())
    }
}

fn flatten(values: &[[f32; 3]]) -> Vec<f32> {
    values.iter().flatten().copied().collect()
}

fn write_list(out: &mut String, values: &[f32]) -> Result<(), String> {
    check_finite(values)?;
    out.push('[');
    for v in values {
        let _ = write!(out, " {}", v);
    }
    out.push_str(" ]");
    Ok(())
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_material(out: &mut String, material: &Material) -> Result<(), String> {
    check_finite(&[material.shininess, material.transparency])?;
    out.push_str("SimpleMaterial { diffuse ");
    write_list(out, &material.diffuse)?;
    out.push_str(" specular ");
    write_list(out, &material.specular)?;
    let _ = write!(
        out,
        " shininess {} transparency {} }}",
        material.shininess, material.transparency
    );
    Ok(())
}

fn write_core(out: &mut String, core: &NodeCore) -> Result<(), String> {
    let _ = write!(out, "core {} {{", core.kind());
    match core {
        NodeCore::Group => {}
        NodeCore::Transform { matrix } => {
            out.push_str(" matrix ");
            write_list(out, matrix)?;
        }
        NodeCore::DistanceLod { center, ranges } => {
            out.push_str(" center ");
            write_list(out, center)?;
            out.push_str(" range ");
            write_list(out, ranges)?;
        }
        NodeCore::MaterialGroup { material } => {
            out.push_str(" material ");
            write_material(out, material)?;
        }
        NodeCore::Geometry(geometry) => {
            out.push_str(" positions ");
            write_list(out, &flatten(&geometry.positions))?;
            if !geometry.normals.is_empty() {
                out.push_str(" normals ");
                write_list(out, &flatten(&geometry.normals))?;
            }
            out.push_str(" indices [");
            for i in &geometry.indices {
                let _ = write!(out, " {}", i);
            }
            out.push_str(" ]");
            if let Some(material) = &geometry.material {
                out.push_str(" material ");
                write_material(out, material)?;
            }
        }
    }
    out.push_str(" }");
    Ok(())
}

fn write_node(out: &mut String, tree: &SceneTree, indent: usize) -> Result<(), String> {
    let pad = "    ".repeat(indent);
    out.push_str("Node {\n");

    if let Some(name) = &tree.name {
        let _ = write!(out, "{}    name ", pad);
        write_string(out, name);
        out.push('\n');
    }
    if let Some(core) = &tree.core {
        let _ = write!(out, "{}    ", pad);
        write_core(out, core)?;
        out.push('\n');
    }
    if !tree.meta.is_empty() {
        let _ = writeln!(out, "{}    meta {{", pad);
        for (key, value) in &tree.meta {
            let _ = write!(out, "{}        ", pad);
            write_string(out, key);
            out.push(' ');
            write_string(out, value);
            out.push('\n');
        }
        let _ = writeln!(out, "{}    }}", pad);
    }
    if !tree.children.is_empty() {
        let _ = writeln!(out, "{}    children [", pad);
        for child in &tree.children {
            let _ = write!(out, "{}        ", pad);
            write_node(out, child, indent + 2)?;
        }
        let _ = writeln!(out, "{}    ]", pad);
    }

    let _ = writeln!(out, "{}}}", pad);
    Ok(())
}

/// Render a complete text scene, header included
pub fn format_scene(tree: &SceneTree) -> Result<String, String> {
    let mut out = String::new();
    let _ = writeln!(out, "{}", OSG_HEADER);
    let _ = writeln!(
        out,
        "# Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "# scenemerge v{}", env!("CARGO_PKG_VERSION"));
    write_node(&mut out, tree, 0)?;
    Ok(out)
}
