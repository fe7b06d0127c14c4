use std::borrow::Cow;

use wgpu::naga::ShaderStage;

pub(crate) fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Full-screen triangle; `v_uv` runs from (0, 0) bottom-left to (1, 1) top-right.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Ray casts the floor and bodies through the pass frustum. The uniform block
/// must match `PassUniforms`.
pub(crate) const SCENE_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

struct Body {
    vec4 center_radius;
    vec4 color;
    vec4 spin;
};

layout(std140, set = 0, binding = 0) uniform PassParams {
    vec4 frustum;
    vec4 eye;
    vec4 viewport;
    vec4 light;
    vec4 material;
    Body bodies[8];
} ubo;

const float FLOOR_Y = -2.0;
const float FLOOR_HALF_WIDTH = 5.0;
const float FLOOR_NEAR_Z = 1.0;
const float FLOOR_FAR_Z = -50.0;
const float NO_HIT = 1e30;

float hit_sphere(vec3 origin, vec3 dir, vec4 sphere) {
    vec3 oc = origin - sphere.xyz;
    float a = dot(dir, dir);
    float b = dot(oc, dir);
    float c = dot(oc, oc) - sphere.w * sphere.w;
    float disc = b * b - a * c;
    if (disc < 0.0) {
        return NO_HIT;
    }
    float root = sqrt(disc);
    float t = (-b - root) / a;
    if (t < 1.0) {
        t = (-b + root) / a;
    }
    return t;
}

float checker(vec3 p) {
    vec2 cell = floor(vec2(p.x * 2.0, p.z));
    return mod(cell.x + cell.y, 2.0);
}

vec3 shade(vec3 p, vec3 n, vec3 view_dir, vec3 diffuse) {
    vec3 to_light = normalize(ubo.light.xyz - p);
    float lambert = max(dot(n, to_light), 0.0);
    vec3 half_vec = normalize(to_light + view_dir);
    float spec = lambert > 0.0 ? pow(max(dot(n, half_vec), 0.0), ubo.material.x) : 0.0;
    return vec3(ubo.light.w) + diffuse * lambert + vec3(spec);
}

void main() {
    float near = ubo.eye.z;
    float far_t = ubo.eye.w / near;
    vec3 origin = vec3(ubo.eye.xy, 0.0);
    vec3 dir = vec3(
        mix(ubo.frustum.x, ubo.frustum.y, v_uv.x),
        mix(ubo.frustum.z, ubo.frustum.w, v_uv.y),
        -near
    );

    float best_t = NO_HIT;
    vec3 color = vec3(0.0);

    if (dir.y < 0.0) {
        float t = (FLOOR_Y - origin.y) / dir.y;
        vec3 p = origin + dir * t;
        if (t >= 1.0 && t <= far_t
            && abs(p.x) <= FLOOR_HALF_WIDTH
            && p.z <= FLOOR_NEAR_Z && p.z >= FLOOR_FAR_Z) {
            best_t = t;
            color = vec3(checker(p));
        }
    }

    int count = int(ubo.viewport.z);
    for (int i = 0; i < count; ++i) {
        Body body = ubo.bodies[i];
        float t = hit_sphere(origin, dir, body.center_radius);
        if (t >= 1.0 && t <= far_t && t < best_t) {
            best_t = t;
            vec3 p = origin + dir * t;
            vec3 n = normalize(p - body.center_radius.xyz);

            // Counter-rotate into the body frame so the bands roll with it.
            float angle = body.spin.x;
            vec3 local = n;
            local.y = n.y * cos(angle) + n.z * sin(angle);
            local.z = -n.y * sin(angle) + n.z * cos(angle);
            float band = 0.85 + 0.15 * step(0.0, sin(atan(local.z, local.y) * 3.0));

            color = shade(p, n, normalize(-dir), body.color.rgb * band);
        }
    }

    outColor = vec4(clamp(color, 0.0, 1.0), 1.0);
}
";

/// Samples a full-screen texture; used for accumulation and presentation.
pub(crate) const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D source_texture;
layout(set = 0, binding = 1) uniform sampler source_sampler;

void main() {
    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    outColor = texture(sampler2D(source_texture, source_sampler), uv);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FLOOR_FAR_Z, FLOOR_HALF_WIDTH, FLOOR_NEAR_Z, FLOOR_Y};
    use crate::gpu::uniforms::MAX_BODIES;

    #[test]
    fn scene_shader_matches_uniform_layout() {
        assert!(SCENE_FRAGMENT_GLSL.contains(&format!("Body bodies[{MAX_BODIES}];")));
        for member in ["vec4 frustum;", "vec4 eye;", "vec4 viewport;", "vec4 light;", "vec4 material;"] {
            assert!(SCENE_FRAGMENT_GLSL.contains(member), "missing {member}");
        }
    }

    #[test]
    fn scene_shader_floor_matches_geometry() {
        let expect = |name: &str, value: f32| {
            let line = format!("const float {name} = {value:.1};");
            assert!(SCENE_FRAGMENT_GLSL.contains(&line), "missing {line}");
        };
        expect("FLOOR_Y", FLOOR_Y);
        expect("FLOOR_HALF_WIDTH", FLOOR_HALF_WIDTH);
        expect("FLOOR_NEAR_Z", FLOOR_NEAR_Z);
        expect("FLOOR_FAR_Z", FLOOR_FAR_Z);
    }
}
