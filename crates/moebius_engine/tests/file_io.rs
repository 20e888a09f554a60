//! Configuration, mesh and shader files on disk

use std::fs;

use moebius_engine::prelude::*;
use moebius_engine::render::shader_export;
use tempfile::TempDir;

const TETRAHEDRON: &str = "\
o tetra
v 0.0 1.0 0.0
v -1.0 -1.0 1.0
v 1.0 -1.0 1.0
v 0.0 -1.0 -1.0
f 1 2 3
f 1 3 4
f 1 4 2
f 2 4 3
";

#[test]
fn test_config_survives_both_formats_on_disk() {
    let dir = TempDir::new().unwrap();
    let mut config = BackdropConfig::default();
    config.seed = 7;
    config.output.width = 320;
    config.material.zones.threshold1 = 0.65;
    config.material.debug_distance = true;
    config.stars.count = 12;

    for name in ["scene.toml", "scene.ron"] {
        let path = dir.path().join(name);
        config.save_to_file(&path).unwrap();
        let loaded = BackdropConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config, "{name}");
    }
}

#[test]
fn test_partial_config_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "seed = 3\n\n[material.hatching]\nlevel1 = 0.8\n").unwrap();

    let loaded = BackdropConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.seed, 3);
    assert_eq!(loaded.material.hatching.level1, 0.8);
    assert_eq!(loaded.material.hatching.level2, 0.1);
    assert_eq!(loaded.stars, BackdropConfig::default().stars);
}

#[test]
fn test_bad_config_files_are_rejected() {
    let dir = TempDir::new().unwrap();

    let unknown = dir.path().join("scene.yaml");
    fs::write(&unknown, "seed: 1\n").unwrap();
    assert!(matches!(
        BackdropConfig::load_from_file(&unknown),
        Err(ConfigError::UnsupportedFormat(_))
    ));

    let invalid = dir.path().join("scene.toml");
    fs::write(&invalid, "[output]\nwidth = 0\n").unwrap();
    assert!(matches!(
        BackdropConfig::load_from_file(&invalid),
        Err(ConfigError::Invalid { .. })
    ));

    assert!(matches!(
        BackdropConfig::load_from_file(dir.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_obj_file_renders_with_outline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tetra.obj");
    fs::write(&path, TETRAHEDRON).unwrap();

    let mesh = ObjLoader::load_obj(&path).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
    assert!(mesh.vertices.iter().all(|v| (v.normal().norm() - 1.0).abs() < 1e-4));

    let compositor = TwoPassCompositor::new(
        std::sync::Arc::new(mesh),
        MaterialConfig::default(),
        SilhouetteConfig::default(),
    );
    let mut camera = Camera::perspective(Vec3::new(0.0, 0.5, 6.0), 45.0, 1.0, 0.1, 100.0);
    camera.look_at(Vec3::zeros(), Vec3::y());
    let mut target = Framebuffer::new(40, 40).unwrap();
    let uniforms = FrameUniforms {
        time: 0.0,
        camera_position: camera.position,
        resolution: Vec2::new(40.0, 40.0),
    };
    let stats = compositor.draw(&mut target, &camera, &uniforms).unwrap();
    assert!(stats.main.fragments_written > 0);
    assert!(stats.silhouette.fragments_written > 0);

    let png = dir.path().join("tetra.png");
    target.save_png(&png).unwrap();
    assert!(fs::metadata(&png).unwrap().len() > 0);
}

#[test]
fn test_missing_obj_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let result = ObjLoader::load_obj(dir.path().join("nothing.obj"));
    assert!(matches!(result, Err(AssetError::Io(_))));
}

#[test]
fn test_exported_programs_match_the_material() {
    let dir = TempDir::new().unwrap();
    let mut material = MaterialConfig::default();
    material.hatching.line_thickness = 0.125;

    let written = shader_export::export(&material).write_to(&dir.path().join("glsl")).unwrap();
    assert_eq!(written.len(), 4);

    let fragment = fs::read_to_string(dir.path().join("glsl/moebius.frag")).unwrap();
    assert!(fragment.starts_with("#version 450"));
    assert!(fragment.contains("LINE_THICKNESS = 0.125"));
    assert!(fragment.contains("void main()"));

    let vertex = fs::read_to_string(dir.path().join("glsl/moebius.vert")).unwrap();
    assert!(vertex.contains("vCameraDistance"));
    for name in ["silhouette.vert", "silhouette.frag"] {
        assert!(dir.path().join("glsl").join(name).is_file());
    }
}
