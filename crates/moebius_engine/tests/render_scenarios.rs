//! Whole-frame behaviour of the stylised pipeline
//!
//! A flat plane facing the camera is rendered through the two-pass compositor
//! and the resulting pixels are compared with the shading stages directly.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use moebius_engine::prelude::*;
use moebius_engine::render::shading::{shade_fragment, Derivatives, FragmentInput};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

fn camera_at(distance: f32) -> Camera {
    let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, distance), 60.0, 1.0, 0.1, 500.0);
    camera.look_at(Vec3::zeros(), Vec3::y());
    camera
}

/// Material whose key light points straight at a +Z plane
fn facing_light(brightness: f32) -> MaterialConfig {
    MaterialConfig {
        brightness,
        light_direction: Vec3::z(),
        ..MaterialConfig::default()
    }
}

fn render_plane(material: MaterialConfig, distance: f32, size: u32) -> (Framebuffer, usize) {
    let plane = Arc::new(Mesh::quad(Vec3::zeros(), distance * 2.0));
    let compositor = TwoPassCompositor::new(plane, material, SilhouetteConfig::default());
    let camera = camera_at(distance);
    let mut target = Framebuffer::new(size, size).unwrap();
    target.clear(Vec4::from(WHITE));
    let uniforms = FrameUniforms {
        time: 0.0,
        camera_position: camera.position,
        resolution: Vec2::new(size as f32, size as f32),
    };

    let stats = compositor.draw(&mut target, &camera, &uniforms).unwrap();
    assert_eq!(stats.silhouette.fragments_written, 0);
    (target, stats.main.fragments_written)
}

#[test]
fn test_lit_plane_up_close_is_flat_bright_zone() {
    let material = facing_light(1.0);
    let expected = material.zones.bright.to_rgb();
    let (frame, written) = render_plane(material, 10.0, 48);
    // The plane covers the whole view
    assert_eq!(written, 48 * 48);

    for pixel in frame.pixels() {
        // Only the world-space colour jitter separates pixels
        for i in 0..3 {
            assert!((pixel[i] - expected[i]).abs() <= 0.032, "{pixel:?} vs {expected:?}");
        }
        assert_eq!(pixel.w, 1.0);
    }
}

#[test]
fn test_lit_plane_fragment_is_unhatched() {
    let material = MaterialConfig {
        color_smoothing: 0.0,
        ..facing_light(1.0)
    };
    let uniforms = FrameUniforms {
        time: 0.0,
        camera_position: Vec3::new(0.0, 0.0, 10.0),
        resolution: Vec2::new(320.0, 240.0),
    };
    let input = FragmentInput {
        frag_coord: Vec2::new(160.5, 120.5),
        normal: Vec3::z(),
        normal_gradient: Derivatives::zero(),
        world_position: Vec3::zeros(),
        position_gradient: Derivatives::new(Vec3::x() * 0.02, Vec3::y() * 0.02),
        view_position: Vec3::new(0.0, 0.0, -10.0),
        camera_distance: 10.0,
    };

    let shaded = shade_fragment(&material, &uniforms, &input);
    assert_relative_eq!(shaded.brightness, 1.0, epsilon = 1e-6);
    assert_eq!(shaded.hatch, 0.0);
    // No colour jitter: the output is exactly the bright zone
    assert_relative_eq!(shaded.color.xyz(), material.zones.bright.to_rgb(), epsilon = 1e-5);
}

#[test]
fn test_dark_plane_far_away_is_cross_hatched() {
    let material = facing_light(0.05);
    let base = material.zones.dark.to_rgb();
    let (frame, written) = render_plane(material, 70.0, 96);
    assert_eq!(written, 96 * 96);

    let total = frame.pixels().count();
    let mut inked = 0;
    let mut bare = 0;
    for pixel in frame.pixels() {
        let darkest = (0..3).map(|i| pixel[i] / base[i]).fold(f32::MAX, f32::min);
        if darkest < 0.5 {
            inked += 1;
        }
        if (0..3).all(|i| (pixel[i] - base[i]).abs() <= 0.032) {
            bare += 1;
        }
    }
    assert!(inked > total / 50, "only {inked} of {total} pixels carry hatch lines");
    assert!(bare > total / 20, "lines should leave paper between them ({bare} bare)");
}

#[test]
fn test_hatching_grows_with_darkness() {
    let (dim, _) = render_plane(facing_light(0.5), 50.0, 64);
    let (dark, _) = render_plane(facing_light(0.05), 50.0, 64);
    let ink = |frame: &Framebuffer| -> f32 { frame.pixels().map(|p| 3.0 - (p.x + p.y + p.z)).sum() };
    assert!(ink(&dark) > ink(&dim));
}

#[test]
fn test_backdrop_frames_render_and_animate() {
    let mut config = BackdropConfig::default();
    config.output.width = 64;
    config.output.height = 36;
    config.stars.count = 300;
    let mesh = Arc::new(neuron::generate(&config.neuron));

    let mut scene = Backdrop::new(&config, mesh);
    let mut frame = Framebuffer::new(64, 36).unwrap();
    let mut timer = Timer::new();
    let step = Duration::from_millis(16);

    for i in 0..3u32 {
        let update = scene.update(timer.total_time(), step * i);
        assert!(update.resized.is_none());
        let stats = scene.render(&mut frame).unwrap();
        assert!(stats.sky.fragments_written >= 64 * 36);
        assert!(stats.mesh.main.fragments_written > 0);
        timer.advance(step);
    }

    assert_eq!(scene.frame_count(), 3);
    assert!(scene.mesh().transform.rotation.angle() > 0.0);
    assert!(frame.pixels().all(|c| c.iter().all(|v| v.is_finite())));
}
