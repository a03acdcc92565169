//! Reflection over the GLSL sources the viewer ships with.
//!
//! The software backend cannot run GLSL, so "compiling" means reading the
//! global declarations and the `gl_Position` expression out of the source
//! and checking they describe something the rasterizer can execute:
//! interleaved vec3 position/color inputs, mat4 uniforms, and a clip
//! position built as a product of those uniforms with the input position.

use crate::core::geometry::VERTEX_LAYOUT;
use crate::error::{GraphicsSetupError, ShaderStage};

pub const VERTEX_SHADER: &str = include_str!("../../shaders/vertshader.glsl");
pub const FRAGMENT_SHADER: &str = include_str!("../../shaders/fragshader.glsl");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub location: Option<u32>,
    pub decl: Declaration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    pub stage: ShaderStage,
    pub uniforms: Vec<Declaration>,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Declaration>,
    /// Matrix uniforms multiplied into `gl_Position`, leftmost first.
    /// Always empty for fragment shaders.
    pub position_chain: Vec<String>,
}

/// A linked vertex + fragment pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    uniforms: Vec<Declaration>,
    position_chain: Vec<usize>,
}

impl Program {
    pub fn uniform_location(&self, name: &str) -> Option<usize> {
        self.uniforms.iter().position(|u| u.name == name)
    }

    pub fn uniforms(&self) -> &[Declaration] {
        &self.uniforms
    }

    /// Uniform locations whose product transforms a position to clip space.
    pub fn position_chain(&self) -> &[usize] {
        &self.position_chain
    }
}

pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, GraphicsSetupError> {
    let fail = |reason: String| GraphicsSetupError::Compile { stage, reason };

    let code: String = strip_comments(source)
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    if code.trim().is_empty() {
        return Err(fail("empty source".into()));
    }
    if code.matches('{').count() != code.matches('}').count() {
        return Err(fail("unbalanced braces".into()));
    }
    let Some((globals, body)) = code.split_once("void main") else {
        return Err(fail("missing `void main`".into()));
    };

    let mut shader = CompiledShader {
        stage,
        uniforms: Vec::new(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        position_chain: Vec::new(),
    };

    for stmt in globals.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        parse_declaration(stmt, &mut shader).map_err(fail)?;
    }

    if stage == ShaderStage::Vertex {
        shader.position_chain = parse_position_chain(body, &shader.uniforms).map_err(fail)?;
    }

    Ok(shader)
}

pub fn link(vertex: &CompiledShader, fragment: &CompiledShader) -> Result<Program, GraphicsSetupError> {
    let fail = GraphicsSetupError::Link;

    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(fail("expected one vertex and one fragment shader".into()));
    }

    // vertex inputs must match the interleaved buffer layout exactly
    for attr in VERTEX_LAYOUT.iter() {
        let found = vertex
            .inputs
            .iter()
            .any(|i| i.location == Some(attr.location) && i.decl.ty == "vec3");
        if !found {
            return Err(fail(format!("no vec3 input at location {}", attr.location)));
        }
    }
    if vertex.inputs.len() != VERTEX_LAYOUT.len() {
        return Err(fail(format!(
            "vertex shader declares {} inputs, buffer provides {}",
            vertex.inputs.len(),
            VERTEX_LAYOUT.len()
        )));
    }

    for input in &fragment.inputs {
        if !vertex.outputs.contains(&input.decl) {
            return Err(fail(format!(
                "fragment input `{}` has no matching vertex output",
                input.decl.name
            )));
        }
    }
    if !fragment.outputs.iter().any(|o| o.ty == "vec4") {
        return Err(fail("fragment shader has no vec4 color output".into()));
    }

    let mut uniforms: Vec<Declaration> = Vec::new();
    for u in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match uniforms.iter().find(|known| known.name == u.name) {
            Some(known) if known.ty != u.ty => {
                return Err(fail(format!("uniform `{}` declared with two types", u.name)));
            }
            Some(_) => {}
            None => uniforms.push(u.clone()),
        }
    }

    let position_chain = vertex
        .position_chain
        .iter()
        .filter_map(|name| uniforms.iter().position(|u| &u.name == name))
        .collect();

    Ok(Program {
        uniforms,
        position_chain,
    })
}

fn parse_declaration(stmt: &str, shader: &mut CompiledShader) -> Result<(), String> {
    let (location, rest) = match stmt.strip_prefix("layout") {
        Some(layout) => {
            let open = layout.find('(').ok_or_else(|| format!("malformed layout `{stmt}`"))?;
            let close = layout.find(')').ok_or_else(|| format!("malformed layout `{stmt}`"))?;
            let location = layout[open + 1..close]
                .split_once('=')
                .and_then(|(key, value)| (key.trim() == "location").then_some(value))
                .and_then(|value| value.trim().parse::<u32>().ok())
                .ok_or_else(|| format!("malformed layout `{stmt}`"))?;
            (Some(location), &layout[close + 1..])
        }
        None => (None, stmt),
    };

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [qualifier, ty, name] = tokens.as_slice() else {
        return Err(format!("unsupported declaration `{stmt}`"));
    };
    let decl = Declaration {
        ty: ty.to_string(),
        name: name.to_string(),
    };

    match *qualifier {
        "uniform" => shader.uniforms.push(decl),
        "in" => shader.inputs.push(Input { location, decl }),
        "out" => shader.outputs.push(decl),
        other => return Err(format!("unsupported qualifier `{other}`")),
    }
    Ok(())
}

fn parse_position_chain(body: &str, uniforms: &[Declaration]) -> Result<Vec<String>, String> {
    let assignment = body
        .split(';')
        .find_map(|stmt| {
            let (lhs, rhs) = stmt.split_once('=')?;
            lhs.trim_end().ends_with("gl_Position").then_some(rhs)
        })
        .ok_or("vertex shader never writes gl_Position")?;

    let mut terms: Vec<&str> = assignment.split('*').map(str::trim).collect();
    let position = terms.pop().unwrap_or_default();
    if !position.starts_with("vec4(") {
        return Err(format!("unsupported position expression `{}`", assignment.trim()));
    }

    terms
        .into_iter()
        .map(|term| {
            uniforms
                .iter()
                .find(|u| u.name == term && u.ty == "mat4")
                .map(|u| u.name.clone())
                .ok_or_else(|| format!("`{term}` is not a mat4 uniform"))
        })
        .collect()
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    loop {
        let (start, block) = match (rest.find("//"), rest.find("/*")) {
            (Some(l), Some(b)) if b < l => (b, true),
            (Some(l), _) => (l, false),
            (None, Some(b)) => (b, true),
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        };
        out.push_str(&rest[..start]);
        rest = if block {
            rest[start + 2..]
                .find("*/")
                .map_or("", |end| &rest[start + 2 + end + 2..])
        } else {
            rest[start..].find('\n').map_or("", |nl| &rest[start + nl..])
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipped() -> Program {
        let vs = compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
        let fs = compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
        link(&vs, &fs).unwrap()
    }

    #[test]
    fn shipped_shaders_link() {
        let program = shipped();
        assert_eq!(program.uniform_location("modelTransform"), Some(0));
        assert_eq!(program.uniform_location("projectionTransform"), Some(1));
        assert_eq!(program.uniform_location("viewTransform"), None);
        // projection * model * position
        assert_eq!(program.position_chain(), &[1, 0]);
    }

    #[test]
    fn comments_are_ignored() {
        let src = "// uniform mat4 hidden;\n/* uniform mat4 alsoHidden; */ out vec4 c; void main() { c = vec4(1.0); }";
        let fs = compile(ShaderStage::Fragment, src).unwrap();
        assert!(fs.uniforms.is_empty());
        assert_eq!(fs.outputs.len(), 1);
    }

    #[test]
    fn empty_source_fails() {
        let err = compile(ShaderStage::Vertex, "  // nothing here\n").unwrap_err();
        assert!(matches!(
            err,
            GraphicsSetupError::Compile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn missing_main_fails() {
        assert!(compile(ShaderStage::Fragment, "out vec4 c;").is_err());
    }

    #[test]
    fn vertex_shader_must_write_position() {
        let src = VERTEX_SHADER.replace("gl_Position", "vertPosition");
        assert!(compile(ShaderStage::Vertex, &src).is_err());
    }

    #[test]
    fn undeclared_matrix_fails() {
        let src = VERTEX_SHADER.replace("projectionTransform *", "viewTransform *");
        let err = compile(ShaderStage::Vertex, &src).unwrap_err();
        assert_eq!(
            err,
            GraphicsSetupError::Compile {
                stage: ShaderStage::Vertex,
                reason: "`viewTransform` is not a mat4 uniform".into()
            }
        );
    }

    #[test]
    fn attribute_locations_must_match_layout() {
        let src = VERTEX_SHADER.replace("location = 1", "location = 2");
        let vs = compile(ShaderStage::Vertex, &src).unwrap();
        let fs = compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
        assert_eq!(
            link(&vs, &fs),
            Err(GraphicsSetupError::Link("no vec3 input at location 1".into()))
        );
    }

    #[test]
    fn varyings_must_match() {
        let vs = compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
        let src = FRAGMENT_SHADER.replace("vertColor", "vertNormal");
        let fs = compile(ShaderStage::Fragment, &src).unwrap();
        assert!(matches!(link(&vs, &fs), Err(GraphicsSetupError::Link(_))));
    }

    #[test]
    fn stages_cannot_be_swapped() {
        let vs = compile(ShaderStage::Vertex, VERTEX_SHADER).unwrap();
        let fs = compile(ShaderStage::Fragment, FRAGMENT_SHADER).unwrap();
        assert!(link(&fs, &vs).is_err());
    }
}
