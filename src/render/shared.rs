//! WGSL source for the scene's three pipelines.
//!
//! One module, one vertex stage, three fragment entry points: the two
//! per-pixel lighting variants and the unlit path for the light cube.
//! All lighting math runs in view space; the CPU side supplies the light
//! position already transformed by the view matrix, and `lighting::shade`
//! mirrors these fragment programs term for term.

pub(crate) const SHADER: &str = r#"
struct GlobalUniform {
    proj: mat4x4<f32>,
    // View-space light position; w is unused padding.
    light_position: vec4<f32>,
    // x holds the ambient intensity.
    ambient: vec4<f32>,
}

struct ObjectConstants {
    model_view: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) view_pos: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    let view_pos = object.model_view * vec4<f32>(input.position, 1.0);
    output.position = globals.proj * view_pos;
    output.view_pos = view_pos.xyz;
    output.normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;
    return output;
}

// Plastic finish: exponent 32, highlights stay white whatever the base
// color is.
@fragment
fn fs_plastic(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let base_color = object.color.rgb;
    let ambient = globals.ambient.x * base_color;

    let light_dir = normalize(globals.light_position.xyz - input.view_pos);
    let diff = max(dot(normal, light_dir), 0.0);
    let diffuse = diff * base_color;

    let view_dir = normalize(-input.view_pos);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), 32.0);
    let specular = spec * vec3<f32>(1.0);

    return vec4<f32>(ambient + diffuse + specular, 1.0);
}

// Metal finish: Blinn-Phong half vector, exponent 64, highlights tinted
// by the base color.
@fragment
fn fs_metal(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let base_color = object.color.rgb;
    let ambient = globals.ambient.x * base_color;

    let light_dir = normalize(globals.light_position.xyz - input.view_pos);
    let diff = max(dot(normal, light_dir), 0.0);
    let diffuse = diff * base_color;

    let view_dir = normalize(-input.view_pos);
    let half_dir = normalize(light_dir + view_dir);
    let spec = pow(max(dot(normal, half_dir), 0.0), 64.0);
    let specular = spec * base_color;

    return vec4<f32>(ambient + diffuse + specular, 1.0);
}

// The light cube renders in its flat color, unaffected by itself.
@fragment
fn fs_unlit(input: VertexOutput) -> @location(0) vec4<f32> {
    return object.color;
}
"#;
