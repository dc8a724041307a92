//! Frames rendered headless with the software toolkit.

use std::ffi::CStr;
use std::fs;

use red_top::config::ShaderLibrary;
use red_top::shaders::{RED_UNIFORM, SHADER_NAME};
use red_top::RedTop;
use top_core::render::software::{SoftwareToolkit, ToolkitCall, Uniforms};
use top_core::{
    FrameRequest, GlCommandContext, NodeInfo, NumericParameter, OutputFormat, ParameterInputs,
    ParameterManager, ShaderTier, TopError, TopInstance,
};

struct Red(f64);

impl ParameterInputs for Red {
    fn par_double(&self, name: &CStr, index: usize) -> f64 {
        assert_eq!(name, c"Red");
        assert_eq!(index, 0);
        self.0
    }
}

#[derive(Default)]
struct Context {
    begins: usize,
    ends: usize,
}

impl GlCommandContext for Context {
    fn begin_gl_commands(&mut self) -> bool {
        assert_eq!(self.begins, self.ends, "nested beginGLCommands");
        self.begins += 1;
        true
    }

    fn end_gl_commands(&mut self) {
        self.ends += 1;
    }
}

#[derive(Default)]
struct Manager {
    appended: Vec<(String, usize)>,
}

impl ParameterManager for Manager {
    fn append_float(&mut self, param: &NumericParameter, size: usize) -> top_core::Result<()> {
        self.appended
            .push((param.name().to_string_lossy().into_owned(), size));
        Ok(())
    }
}

/// CPU version of the fragment shader in `shaders/`.
fn red_fragment(uniforms: &Uniforms) -> [f32; 4] {
    [uniforms.get(RED_UNIFORM), 0.0, 0.0, 1.0]
}

fn node() -> RedTop<SoftwareToolkit> {
    node_with(ShaderLibrary::embedded())
}

fn node_with(shaders: ShaderLibrary) -> RedTop<SoftwareToolkit> {
    let toolkit = SoftwareToolkit::new().with_program(SHADER_NAME, red_fragment);
    RedTop::with_toolkit(
        NodeInfo {
            path: "/project1/red1".into(),
            id: 7,
        },
        toolkit,
        shaders,
    )
}

fn frame(top: &mut RedTop<SoftwareToolkit>, width: u32, height: u32, red: f64) -> top_core::Result<()> {
    let mut context = Context::default();
    let result = top.execute(&FrameRequest { width, height }, &Red(red), &mut context);
    assert_eq!((context.begins, context.ends), (1, 1));
    result
}

#[test]
fn half_red_fills_the_frame() {
    let mut top = node();
    frame(&mut top, 256, 256, 0.5).unwrap();

    let image = top.toolkit().last_frame().unwrap();
    assert_eq!(image.dimensions(), (256, 256));
    assert!(image.pixels().iter().all(|p| *p == [0.5, 0.0, 0.0, 1.0]));
}

#[test]
fn latest_red_value_wins() {
    let mut top = node();
    frame(&mut top, 32, 32, 0.0).unwrap();
    assert_eq!(top.toolkit().last_frame().unwrap().pixel(5, 5), [0.0, 0.0, 0.0, 1.0]);
    frame(&mut top, 32, 32, 1.0).unwrap();
    assert_eq!(top.toolkit().last_frame().unwrap().pixel(5, 5), [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn output_matches_every_requested_size() {
    let mut top = node();
    for (width, height) in [(1, 1), (3, 7), (640, 360), (17, 1)] {
        frame(&mut top, width, height, 0.25).unwrap();
        let image = top.toolkit().last_frame().unwrap();
        assert_eq!(image.dimensions(), (width, height));
        assert_eq!(image.pixel(width - 1, height - 1), [0.25, 0.0, 0.0, 1.0]);
    }
}

#[test]
fn setup_runs_once() {
    let mut top = node();
    for _ in 0..5 {
        frame(&mut top, 16, 16, 0.1).unwrap();
    }
    let toolkit = top.toolkit();
    assert_eq!(toolkit.count_calls(|c| *c == ToolkitCall::Setup), 1);
    assert_eq!(
        toolkit.count_calls(|c| matches!(c, ToolkitCall::LoadShader { .. })),
        1
    );
    assert_eq!(toolkit.count_calls(|c| *c == ToolkitCall::FinishRender), 5);
    assert!(top.setup_state().is_initialized());
}

#[test]
fn frame_calls_run_in_order() {
    let mut top = node();
    frame(&mut top, 64, 48, 0.75).unwrap();

    let calls = top.toolkit().calls().to_vec();
    assert_eq!(calls.len(), 12);
    assert_eq!(calls[0], ToolkitCall::EnsureWindow { width: 64, height: 48 });
    assert_eq!(calls[1], ToolkitCall::Setup);
    assert!(matches!(&calls[2], ToolkitCall::LoadShader { name, tier: ShaderTier::Gl3, .. } if name == "shader"));
    assert_eq!(
        calls[3..],
        [
            ToolkitCall::StartRender,
            ToolkitCall::SetupScreen,
            ToolkitCall::Bind {
                name: "shader".into()
            },
            ToolkitCall::PushMatrix,
            ToolkitCall::SetUniform {
                name: "red".into(),
                value: 0.75
            },
            ToolkitCall::DrawRectangle {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                width: 64.0,
                height: 48.0
            },
            ToolkitCall::PopMatrix,
            ToolkitCall::Unbind,
            ToolkitCall::FinishRender,
        ]
    );
}

#[test]
fn failed_setup_is_retried_next_frame() {
    let mut top = node();
    top.toolkit_mut().fail_next_setups(1);

    let err = frame(&mut top, 8, 8, 0.5).unwrap_err();
    assert!(matches!(err, TopError::RenderSetup(_)), "{err}");
    assert!(!top.setup_state().is_initialized());
    assert!(top.toolkit().last_frame().is_none());
    assert_eq!(top.toolkit().count_calls(|c| *c == ToolkitCall::StartRender), 0);

    frame(&mut top, 8, 8, 0.5).unwrap();
    assert_eq!(top.toolkit().count_calls(|c| *c == ToolkitCall::Setup), 2);
    assert_eq!(top.toolkit().last_frame().unwrap().pixel(0, 0), [0.5, 0.0, 0.0, 1.0]);
}

#[test]
fn shaders_come_from_the_data_path() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("shadersGL3");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("shader.vert"), "// custom vertex\n").unwrap();
    fs::write(dir.join("shader.frag"), "// custom fragment\n").unwrap();

    let mut top = node_with(ShaderLibrary::with_root(root.path()));
    frame(&mut top, 4, 4, 0.5).unwrap();

    let fragment = top
        .toolkit()
        .calls()
        .iter()
        .find_map(|c| match c {
            ToolkitCall::LoadShader { fragment, .. } => Some(fragment.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(fragment, "// custom fragment\n");
}

#[test]
fn missing_data_path_files_fail_setup() {
    let root = tempfile::tempdir().unwrap();
    let mut top = node_with(ShaderLibrary::with_root(root.path()));

    let err = frame(&mut top, 4, 4, 0.5).unwrap_err();
    assert!(matches!(err, TopError::RenderSetup(_)));
    assert!(err.to_string().contains("shadersGL3"), "{err}");
    assert!(!top.setup_state().is_initialized());
}

#[test]
fn declares_one_red_parameter() {
    let mut top = node();
    let mut manager = Manager::default();
    top.setup_parameters(&mut manager).unwrap();
    assert_eq!(manager.appended, vec![("Red".to_owned(), 1)]);
}

#[test]
fn cooks_every_frame_and_keeps_host_format() {
    let top = node();
    assert!(top.general_info().cook_every_frame);

    let mut format = OutputFormat {
        width: 99,
        ..Default::default()
    };
    assert!(!top.output_format(&mut format));
    assert_eq!(format.width, 99);
    assert_eq!(top.node().path, "/project1/red1");
}
