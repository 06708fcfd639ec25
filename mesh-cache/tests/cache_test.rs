mod common;

use std::sync::Arc;

use composer_mesh_cache::{LoaderKind, MeshDescriptor};

use common::{LFS_POINTER, new_cache, write_ctm, write_gltf};

#[test]
fn same_path_yields_same_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.ctm");
    write_ctm(&path, 4);

    let (mut cache, _monitor) = new_cache();
    cache.register_fn(&path, |_, _| {});
    let id = cache.get_or_create_loader(&path).id();
    assert!(!cache.get_or_create_loader(&path).loader().is_loaded());

    let first = cache.load_mesh(&MeshDescriptor::new(&path)).unwrap();
    let second = cache.load_mesh(&MeshDescriptor::new(&path)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.get_or_create_loader(&path).id(), id);
    assert_eq!(cache.entry_count(), 1);
}

#[test]
fn loader_follows_suffix_not_contents() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cache, _monitor) = new_cache();

    // Compressed bytes behind a glTF suffix.
    let fake_glb = dir.path().join("mesh.glb");
    write_ctm(&fake_glb, 3);
    cache.register_fn(&fake_glb, |_, _| {});
    assert_eq!(cache.get_or_create_loader(&fake_glb).loader().kind(), LoaderKind::Gltf);
    assert!(cache.load_mesh(&MeshDescriptor::new(&fake_glb)).is_none());
    assert!(cache.error(&fake_glb).is_some());

    // glTF bytes behind any other suffix.
    let fake_ctm = dir.path().join("mesh.ctm");
    write_gltf(&dir.path().join("real.glb"), &[3]);
    std::fs::copy(dir.path().join("real.glb"), &fake_ctm).unwrap();
    cache.register_fn(&fake_ctm, |_, _| {});
    assert_eq!(cache.get_or_create_loader(&fake_ctm).loader().kind(), LoaderKind::Ctm);
    assert!(cache.load_mesh(&MeshDescriptor::new(&fake_ctm)).is_none());
    assert!(cache.error(&fake_ctm).is_some());

    let upper = dir.path().join("MESH.GLTF");
    cache.register_fn(&upper, |_, _| {});
    assert_eq!(cache.get_or_create_loader(&upper).loader().kind(), LoaderKind::Gltf);
}

#[test]
fn mesh_counts_per_format() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cache, _monitor) = new_cache();

    let ctm_path = dir.path().join("single.ctm");
    write_ctm(&ctm_path, 5);
    let gltf_path = dir.path().join("multi.gltf");
    write_gltf(&gltf_path, &[3, 4, 6]);
    let broken = dir.path().join("broken.glb");
    std::fs::write(&broken, b"not a mesh").unwrap();
    let missing_ctm = dir.path().join("missing.ctm");

    for path in [&ctm_path, &gltf_path, &broken, &missing_ctm] {
        cache.register_fn(path, |_, _| {});
    }

    assert_eq!(cache.total_mesh_count(&ctm_path), 1);
    assert_eq!(cache.total_mesh_count(&gltf_path), 3);
    assert_eq!(cache.total_mesh_count(&broken), 0);
    assert!(cache.error(&broken).is_some());
    assert_eq!(cache.total_mesh_count(&missing_ctm), 1);

    let second = cache
        .load_mesh(&MeshDescriptor::new(&gltf_path).with_submesh(1))
        .unwrap();
    assert_eq!(second.vertex_count(), 4);
    let baked = cache.load_mesh(&MeshDescriptor::new(&gltf_path).baked()).unwrap();
    assert_eq!(baked.vertex_count(), 13);
    assert_eq!(baked.submesh_count(), 3);
}

#[test]
fn unregistering_last_listener_evicts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.glb");
    write_gltf(&path, &[3]);

    let (mut cache, monitor) = new_cache();
    let a = cache.register_fn(&path, |_, _| {});
    let b = cache.register_fn(&path, |_, _| {});
    let old_id = cache.get_or_create_loader(&path).id();
    let old_mesh = cache.load_mesh(&MeshDescriptor::new(&path)).unwrap();

    assert!(cache.unregister(&path, a));
    assert_eq!(cache.entry_id(&path), Some(old_id));
    assert!(cache.unregister(&path, b));
    assert_eq!(cache.entry_count(), 0);
    assert!(!monitor.is_watched(&path));

    cache.register_fn(&path, |_, _| {});
    let entry = cache.get_or_create_loader(&path);
    assert_ne!(entry.id(), old_id);
    assert!(!entry.loader().is_loaded());
    let new_mesh = cache.load_mesh(&MeshDescriptor::new(&path)).unwrap();
    assert!(!Arc::ptr_eq(&old_mesh, &new_mesh));
    assert_eq!(old_mesh.vertex_count(), new_mesh.vertex_count());
}

#[test]
fn lfs_pointer_has_actionable_message() {
    let dir = tempfile::tempdir().unwrap();
    let (mut cache, _monitor) = new_cache();

    for name in ["pointer.ctm", "pointer.glb", "pointer.gltf"] {
        let path = dir.path().join(name);
        std::fs::write(&path, LFS_POINTER).unwrap();
        cache.register_fn(&path, |_, _| {});

        assert!(cache.load_mesh(&MeshDescriptor::new(&path)).is_none());
        let message = cache.error(&path).unwrap();
        assert!(message.contains("Git LFS pointer"), "{name}: {message}");
        assert!(message.contains("git lfs pull"), "{name}: {message}");
    }
}

#[test]
fn corrupt_file_reports_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.ctm");
    std::fs::write(&path, b"OCTM\x05\x00").unwrap();

    let (mut cache, _monitor) = new_cache();
    cache.register_fn(&path, |_, _| {});
    assert!(cache.load_mesh(&MeshDescriptor::new(&path)).is_none());
    let message = cache.error(&path).unwrap();
    assert!(!message.contains("git lfs pull"));
}

#[test]
fn compressed_format_has_no_scene_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.ctm");
    write_ctm(&path, 3);

    let (mut cache, _monitor) = new_cache();
    cache.register_fn(&path, |_, _| {});
    assert!(cache.scenegraph(&path).is_none());
    assert!(cache.animation_sampler_data(&path, 0, 0).is_none());
    assert!(cache.load_skin(&path, 0).is_none());
    assert!(!cache.write_scenegraph(&common::scenegraph_for(1), &path));
    assert!(cache.error(&path).is_none());
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "register")]
fn loading_unregistered_path_panics_in_debug() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.ctm");
    let (mut cache, _monitor) = new_cache();
    cache.get_or_create_loader(&path);
}

#[test]
fn eviction_drops_stale_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("later.ctm");

    let (mut cache, _monitor) = new_cache();
    let id = cache.register_fn(&path, |_, _| {});
    assert!(cache.load_mesh(&MeshDescriptor::new(&path)).is_none());
    assert!(cache.error(&path).is_some());
    cache.unregister(&path, id);
    assert!(cache.error(&path).is_none());

    write_ctm(&path, 3);
    cache.register_fn(&path, |_, _| {});
    assert!(cache.error(&path).is_none());
    assert_eq!(cache.load_mesh(&MeshDescriptor::new(&path)).unwrap().vertex_count(), 3);
}
