//! WebGL2 implementation of [`GraphicsBackend`].

use anyhow::{Context, Result, anyhow, bail};
use glam::Mat4;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
	HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
	WebGlUniformLocation, WebglLoseContext,
};

use super::config::BlendMode;
use super::gpu::{FLOATS_PER_VERTEX, GraphicsBackend, ProgramKind, Topology};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;
layout(location = 2) in float a_size;
uniform mat4 u_mvp;
uniform float u_point_scale;
out vec4 v_color;
void main() {
	v_color = a_color;
	vec4 clip = u_mvp * vec4(a_position, 1.0);
	gl_Position = clip;
	gl_PointSize = a_size * u_point_scale / max(clip.w, 0.001);
}
"#;

const SPRITE_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec4 v_color;
out vec4 out_color;
void main() {
	float d = length(gl_PointCoord - vec2(0.5));
	if (d > 0.5) discard;
	float a = smoothstep(0.5, 0.0, d);
	out_color = vec4(v_color.rgb, v_color.a * a);
}
"#;

const LINE_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec4 v_color;
out vec4 out_color;
void main() {
	out_color = v_color;
}
"#;

/// A linked program with its uniform locations.
pub struct GlProgram {
	program: WebGlProgram,
	mvp: Option<WebGlUniformLocation>,
	point_scale: Option<WebGlUniformLocation>,
}

/// WebGL2 context bound to one backdrop canvas.
pub struct WebGlBackend {
	gl: GL,
	canvas: HtmlCanvasElement,
	width: u32,
	height: u32,
}

impl WebGlBackend {
	/// Opens a transparent, antialiased WebGL2 context on `canvas`.
	pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
		let options = js_sys::Object::new();
		for key in ["alpha", "antialias"] {
			js_sys::Reflect::set(&options, &JsValue::from_str(key), &JsValue::TRUE)
				.map_err(|e| anyhow!("{e:?}"))?;
		}
		let gl: GL = canvas
			.get_context_with_context_options("webgl2", &options)
			.map_err(|e| anyhow!("{e:?}"))?
			.context("WebGL2 not supported")?
			.dyn_into()
			.map_err(|_| anyhow!("context is not WebGL2"))?;
		Ok(Self {
			gl,
			canvas: canvas.clone(),
			width: canvas.width(),
			height: canvas.height(),
		})
	}
}

impl GraphicsBackend for WebGlBackend {
	type Buffer = WebGlBuffer;
	type Program = GlProgram;

	fn create_program(&mut self, kind: ProgramKind) -> Result<GlProgram> {
		let fragment = match kind {
			ProgramKind::Sprites => SPRITE_FRAGMENT,
			ProgramKind::Lines => LINE_FRAGMENT,
		};
		let vs = compile_shader(&self.gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
		let fs = match compile_shader(&self.gl, GL::FRAGMENT_SHADER, fragment) {
			Ok(fs) => fs,
			Err(err) => {
				self.gl.delete_shader(Some(&vs));
				return Err(err);
			}
		};
		let linked = link_program(&self.gl, &vs, &fs);
		// shaders are not needed once linked
		self.gl.delete_shader(Some(&vs));
		self.gl.delete_shader(Some(&fs));
		let program = linked.with_context(|| format!("linking {kind:?} program"))?;
		Ok(GlProgram {
			mvp: self.gl.get_uniform_location(&program, "u_mvp"),
			point_scale: self.gl.get_uniform_location(&program, "u_point_scale"),
			program,
		})
	}

	fn create_buffer(&mut self) -> Result<WebGlBuffer> {
		self.gl.create_buffer().context("unable to create buffer")
	}

	fn upload(&mut self, buffer: &WebGlBuffer, vertices: &[f32]) {
		self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
		let array = js_sys::Float32Array::from(vertices);
		self.gl
			.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::DYNAMIC_DRAW);
	}

	fn resize(&mut self, width: u32, height: u32) {
		self.width = width;
		self.height = height;
		self.canvas.set_width(width);
		self.canvas.set_height(height);
	}

	fn begin_frame(&mut self, blend: BlendMode) {
		let gl = &self.gl;
		gl.viewport(0, 0, self.width as i32, self.height as i32);
		gl.clear_color(0.0, 0.0, 0.0, 0.0);
		gl.clear(GL::COLOR_BUFFER_BIT);
		gl.disable(GL::DEPTH_TEST);
		gl.enable(GL::BLEND);
		match blend {
			BlendMode::Alpha => gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA),
			BlendMode::Additive => gl.blend_func(GL::SRC_ALPHA, GL::ONE),
		}
	}

	fn draw(
		&mut self,
		program: &GlProgram,
		buffer: &WebGlBuffer,
		topology: Topology,
		vertex_count: usize,
		mvp: &Mat4,
		point_scale: f32,
	) {
		let gl = &self.gl;
		gl.use_program(Some(&program.program));
		gl.uniform_matrix4fv_with_f32_array(program.mvp.as_ref(), false, &mvp.to_cols_array());
		gl.uniform1f(program.point_scale.as_ref(), point_scale);
		gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));

		let stride = (FLOATS_PER_VERTEX * 4) as i32;
		for (location, components, offset) in [(0, 3, 0), (1, 4, 12), (2, 1, 28)] {
			gl.enable_vertex_attrib_array(location);
			gl.vertex_attrib_pointer_with_i32(
				location,
				components,
				GL::FLOAT,
				false,
				stride,
				offset,
			);
		}
		let mode = match topology {
			Topology::Points => GL::POINTS,
			Topology::Lines => GL::LINES,
			Topology::Triangles => GL::TRIANGLES,
		};
		gl.draw_arrays(mode, 0, vertex_count as i32);
	}

	fn delete_buffer(&mut self, buffer: WebGlBuffer) {
		self.gl.delete_buffer(Some(&buffer));
	}

	fn delete_program(&mut self, program: GlProgram) {
		self.gl.delete_program(Some(&program.program));
	}

	fn release(&mut self) {
		// drop the drawing buffer now instead of waiting for the collector
		match self.gl.get_extension("WEBGL_lose_context") {
			Ok(Some(ext)) => ext.unchecked_into::<WebglLoseContext>().lose_context(),
			Ok(None) => log::debug!(target: "backdrop", "WEBGL_lose_context unavailable"),
			Err(err) => log::warn!(target: "backdrop", "WEBGL_lose_context lookup failed: {err:?}"),
		}
	}
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
	let shader = gl.create_shader(kind).context("unable to create shader")?;
	gl.shader_source(&shader, source);
	gl.compile_shader(&shader);
	if gl
		.get_shader_parameter(&shader, GL::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(shader)
	} else {
		let info = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		bail!("shader compile failed: {info}")
	}
}

fn link_program(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram> {
	let program = gl.create_program().context("unable to create program")?;
	gl.attach_shader(&program, vs);
	gl.attach_shader(&program, fs);
	gl.link_program(&program);
	if gl
		.get_program_parameter(&program, GL::LINK_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		gl.detach_shader(&program, vs);
		gl.detach_shader(&program, fs);
		Ok(program)
	} else {
		let info = gl.get_program_info_log(&program).unwrap_or_default();
		gl.delete_program(Some(&program));
		bail!("program link failed: {info}")
	}
}
