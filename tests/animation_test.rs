use neon_cube::{
    animation::{POINTER_BIAS, RING_SPINS, ROOT_SPIN},
    config::SceneConfig,
    cube::{self, MIDDLE_RING, OUTER_RING, RING_GROUP},
    data_structures::scene_graph::SceneNode,
    render::MaterialId,
};

use crate::common::test_utils::{FakeHost, TestScene, fire_frame, mount_fake, run_frames};

mod common;

const EPS: f32 = 1e-6;

fn ring_material(scene: &TestScene, ring: usize) -> MaterialId {
    scene
        .controller()
        .root()
        .get_child(RING_GROUP)
        .and_then(|group| group.get_child(ring))
        .and_then(|ring| ring.drawable())
        .map(|drawable| drawable.material)
        .expect("ring drawable")
}

#[test]
fn should_cycle_accent_colours_in_lockstep() {
    let host = FakeHost::new(420, 420, 1.0);
    let backend_log = host.backend.clone();
    let mut scene = mount_fake(host, None).expect("mount");
    let palette = SceneConfig::default().palette;

    let cycling: Vec<MaterialId> = scene.controller().scene().cycling.iter().map(|c| c.id).collect();
    let middle = ring_material(&scene, MIDDLE_RING);
    let outer = ring_material(&scene, OUTER_RING);

    for &id in &cycling {
        assert_eq!(backend_log.borrow().color_of(id), palette[0]);
    }

    run_frames(&mut scene, 29);
    assert!(backend_log.borrow().material_updates.is_empty());

    for n in 1..=4usize {
        let ticks = if n == 1 { 1 } else { 30 };
        run_frames(&mut scene, ticks);
        let expected = palette[n % 3];
        let backend = backend_log.borrow();
        for &id in &cycling {
            assert_eq!(backend.color_of(id), expected, "after {} steps", n);
        }
        assert_eq!(backend.color_of(middle), palette[1]);
        assert_eq!(backend.color_of(outer), palette[2]);
        assert_eq!(backend.material_updates.len(), 3 * n);
        assert_eq!(scene.controller().accent(), expected);
    }

    scene.unmount();
}

#[test]
fn should_spin_rings_independently() {
    let mut scene = mount_fake(FakeHost::new(420, 420, 1.0), None).expect("mount");
    run_frames(&mut scene, 10);

    let group = scene.controller().root().get_child(RING_GROUP).expect("ring group");
    for (i, spin) in RING_SPINS.iter().enumerate() {
        let ring = group.get_child(i).expect("ring");
        assert!((ring.get_local_transform().rotation.z - spin * 10.0).abs() < 1e-5);
    }
    let particles = scene.controller().root().get_child(cube::PARTICLES).expect("particles");
    assert!(particles.get_local_transform().position.y.abs() <= 0.08);
    assert!(particles.get_local_transform().rotation.y > 0.0);

    scene.unmount();
}

#[test]
fn should_normalise_pointer_against_the_container() {
    // The fake container sits at (10, 20) and is 420 x 420.
    let mut scene = mount_fake(FakeHost::new(420, 420, 1.0), None).expect("mount");

    scene.on_pointer_move((10.0, 20.0));
    let pointer = scene.controller().pointer();
    assert!((pointer.x + 1.0).abs() < EPS && (pointer.y - 1.0).abs() < EPS);

    scene.on_pointer_move((430.0, 440.0));
    let pointer = scene.controller().pointer();
    assert!((pointer.x - 1.0).abs() < EPS && (pointer.y + 1.0).abs() < EPS);

    scene.on_pointer_move((220.0, 230.0));
    let pointer = scene.controller().pointer();
    assert!(pointer.x.abs() < EPS && pointer.y.abs() < EPS);

    scene.on_pointer_move((-500.0, 5000.0));
    let pointer = scene.controller().pointer();
    assert_eq!((pointer.x, pointer.y), (-1.0, -1.0));

    scene.unmount();
}

#[test]
fn should_bias_rotation_towards_the_pointer() {
    let mut scene = mount_fake(FakeHost::new(420, 420, 1.0), None).expect("mount");
    scene.on_pointer_move((430.0, 20.0));
    fire_frame(&mut scene);

    let rotation = scene.controller().root().get_local_transform().rotation;
    assert!((rotation.x - (ROOT_SPIN.0 + POINTER_BIAS)).abs() < EPS);
    assert!((rotation.y - (ROOT_SPIN.1 + POINTER_BIAS)).abs() < EPS);

    scene.unmount();
}
