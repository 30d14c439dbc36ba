use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;

use crate::engine::assets::bounds::{ModelBounds, combined_bounds, recentering_offset};
use crate::engine::loading::model_loader::{ModelLoader, ModelReady, ModelRoot, SceneSpawned};
use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::part_selection::state::{BodyPart, PartId};

/// Inserted on a model root once its parts are named and it is recentered.
#[derive(Component)]
pub struct ModelProcessed;

/// Strip a trailing `_<digits>` or `.<digits>` suffix added by exporters.
///
/// `Arm_001` and `Arm.001` both become `Arm`. A name made only of the
/// separator and digits is left untouched.
pub fn normalize_part_name(name: &str) -> &str {
    let Some(index) = name.rfind(['_', '.']) else {
        return name;
    };
    let (stem, suffix) = name.split_at(index);
    let digits = &suffix[1..];
    if stem.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return name;
    }
    stem
}

/// Part identifier for a mesh entity given its node and own names.
pub fn part_id_for(node_name: Option<&str>, mesh_name: Option<&str>) -> PartId {
    node_name
        .filter(|name| !name.trim().is_empty())
        .or(mesh_name.filter(|name| !name.trim().is_empty()))
        .map(|name| PartId::new(normalize_part_name(name)))
        .unwrap_or_else(PartId::synthesized)
}

/// Name the parts of a freshly spawned model, recenter it and reveal it.
pub fn process_spawned_model(
    mut commands: Commands,
    mut roots: Query<
        (Entity, &ModelRoot, &mut Transform, &mut Visibility),
        (With<SceneSpawned>, Without<ModelProcessed>),
    >,
    children: Query<&Children>,
    mesh_entities: Query<(&Mesh3d, &GlobalTransform, Option<&Name>, Option<&ChildOf>)>,
    names: Query<&Name>,
    meshes: Res<Assets<Mesh>>,
    mut loader: ResMut<ModelLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut ready: EventWriter<ModelReady>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for (root, model, mut transform, mut visibility) in &mut roots {
        if !loader.is_current(model.generation) {
            debug!(
                "Discarding stale model {} (generation {})",
                model.file, model.generation
            );
            commands.entity(root).despawn();
            continue;
        }

        let mut part_bounds = Vec::new();
        let mut part_ids: Vec<PartId> = Vec::new();

        for entity in children.iter_descendants(root) {
            let Ok((mesh, global, own_name, parent)) = mesh_entities.get(entity) else {
                continue;
            };

            let node_name = parent
                .map(ChildOf::parent)
                .filter(|node| *node != root)
                .and_then(|node| names.get(node).ok())
                .map(Name::as_str);
            let part = part_id_for(node_name, own_name.map(Name::as_str));

            if let Some(aabb) = meshes.get(&mesh.0).and_then(Mesh::compute_aabb) {
                part_bounds.push(ModelBounds::from_local_box(
                    aabb.min().into(),
                    aabb.max().into(),
                    global,
                ));
            }

            if !part_ids.contains(&part) {
                part_ids.push(part.clone());
            }
            commands
                .entity(entity)
                .insert((Name::new(part.to_string()), BodyPart(part)));
        }

        if let Some(bounds) = combined_bounds(part_bounds) {
            let offset = recentering_offset(&bounds);
            transform.translation += offset;
            debug!("Recentered {} by {:?}", model.file, offset);
        } else {
            warn!("Model {} has no measurable meshes, leaving it in place", model.file);
        }

        *visibility = Visibility::Inherited;
        commands.entity(root).insert(ModelProcessed);

        progress.report(1.0);
        loader.finish(model.generation);

        info!(
            "Model {} ready with {} parts (generation {})",
            model.file,
            part_ids.len(),
            model.generation
        );
        rpc_interface.send_notification(
            "model_loaded",
            serde_json::json!({
                "file": model.file,
                "parts": part_ids,
            }),
        );
        ready.write(ModelReady {
            generation: model.generation,
            root,
            file: model.file.clone(),
            part_count: part_ids.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::config::ViewerConfig;
    use crate::engine::loading::model_loader::{
        ModelLoadRequest, ModelUnloaded, handle_load_requests,
    };
    use bevy::gltf::Gltf;
    use constants::model_catalog::{
        MODEL_ROOT_NAME, SYNTHETIC_PART_PREFIX, SYNTHETIC_PART_SUFFIX_LEN,
    };

    #[test]
    fn numeric_suffixes_are_stripped() {
        assert_eq!(normalize_part_name("Arm_001"), "Arm");
        assert_eq!(normalize_part_name("Leg.002"), "Leg");
        assert_eq!(normalize_part_name("Left_Hand_12"), "Left_Hand");
    }

    #[test]
    fn other_names_are_kept() {
        assert_eq!(normalize_part_name("Arm"), "Arm");
        assert_eq!(normalize_part_name("Left_Hand"), "Left_Hand");
        assert_eq!(normalize_part_name("Arm_"), "Arm_");
        assert_eq!(normalize_part_name("_001"), "_001");
        assert_eq!(normalize_part_name("Arm_01a"), "Arm_01a");
    }

    #[test]
    fn node_name_takes_precedence() {
        assert_eq!(part_id_for(Some("Arm_001"), Some("Arm.0")).as_str(), "Arm");
        assert_eq!(part_id_for(None, Some("Leg")).as_str(), "Leg");
        assert_eq!(part_id_for(Some("  "), Some("Leg_3")).as_str(), "Leg");
    }

    #[test]
    fn unnamed_meshes_get_synthesized_ids() {
        let first = part_id_for(None, None);
        let second = part_id_for(Some(""), None);

        assert!(first.as_str().starts_with(SYNTHETIC_PART_PREFIX));
        assert_eq!(
            first.as_str().len(),
            SYNTHETIC_PART_PREFIX.len() + SYNTHETIC_PART_SUFFIX_LEN
        );
        assert_ne!(first, second);
    }

    fn processing_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<Gltf>()
            .insert_resource(ViewerConfig::default())
            .init_resource::<ModelLoader>()
            .init_resource::<LoadingProgress>()
            .init_resource::<WebRpcInterface>()
            .add_event::<ModelLoadRequest>()
            .add_event::<ModelUnloaded>()
            .add_event::<ModelReady>()
            .add_systems(Update, (handle_load_requests, process_spawned_model).chain());
        app
    }

    fn begin_load(app: &mut App, file: &str) -> u64 {
        app.world_mut()
            .resource_mut::<ModelLoader>()
            .begin(file, Handle::default())
    }

    /// Spawn a root shaped like a loaded glTF scene: an `Arm_001` node holding a
    /// mesh, and a bare `Leg.002` mesh directly under the root.
    fn spawn_scene(app: &mut App, generation: u64, file: &str) -> Entity {
        let cube = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::new(2.0, 2.0, 2.0));
        let world = app.world_mut();

        let arm_mesh = world
            .spawn((
                Name::new("Mesh0"),
                Mesh3d(cube.clone()),
                GlobalTransform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
            ))
            .id();
        let arm_node = world.spawn(Name::new("Arm_001")).add_child(arm_mesh).id();
        let leg_mesh = world
            .spawn((
                Name::new("Leg.002"),
                Mesh3d(cube),
                GlobalTransform::from_translation(Vec3::new(12.0, 4.0, 6.0)),
            ))
            .id();

        world
            .spawn((
                Name::new(MODEL_ROOT_NAME),
                ModelRoot {
                    generation,
                    file: file.to_string(),
                },
                SceneSpawned,
                Transform::default(),
                Visibility::Hidden,
            ))
            .add_children(&[arm_node, leg_mesh])
            .id()
    }

    fn part_names(app: &mut App) -> Vec<String> {
        let world = app.world_mut();
        let mut names: Vec<String> = world
            .query::<&BodyPart>()
            .iter(world)
            .map(|part| part.0.to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn spawned_model_is_named_recentered_and_revealed() {
        let mut app = processing_app();
        let generation = begin_load(&mut app, "man_normal.glb");
        let root = spawn_scene(&mut app, generation, "man_normal.glb");

        app.update();

        // Bounds span (9,-1,-1)..(13,5,7), so the center (11,2,3) moves to the origin.
        let transform = app.world().get::<Transform>(root).unwrap();
        assert!(transform.translation.abs_diff_eq(Vec3::new(-11.0, -2.0, -3.0), 1e-4));
        assert_eq!(
            app.world().get::<Visibility>(root),
            Some(&Visibility::Inherited)
        );
        assert!(app.world().get::<ModelProcessed>(root).is_some());
        assert_eq!(part_names(&mut app), vec!["Arm", "Leg"]);

        let ready = app.world().resource::<Events<ModelReady>>();
        let mut cursor = ready.get_cursor();
        let event = cursor.read(ready).next().unwrap();
        assert_eq!(event.root, root);
        assert_eq!(event.part_count, 2);
        assert_eq!(event.generation, generation);

        assert!(app.world().resource::<ModelLoader>().has_settled());
        assert_eq!(app.world().resource::<LoadingProgress>().percent(), 100);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut app = processing_app();
        let stale = begin_load(&mut app, "man_normal.glb");
        begin_load(&mut app, "woman_normal.glb");
        let root = spawn_scene(&mut app, stale, "man_normal.glb");

        app.update();

        assert!(app.world().get_entity(root).is_err());
        assert!(part_names(&mut app).is_empty());
        assert!(app.world().resource::<Events<ModelReady>>().is_empty());
        assert!(!app.world().resource::<ModelLoader>().has_settled());
    }

    #[test]
    fn swap_leaves_exactly_one_tagged_root() {
        let mut app = processing_app();
        let first = begin_load(&mut app, "man_normal.glb");
        let old_root = spawn_scene(&mut app, first, "man_normal.glb");
        app.update();

        app.world_mut().send_event(ModelLoadRequest {
            file: "man_colored.glb".into(),
        });
        app.update();
        assert!(app.world().get_entity(old_root).is_err());

        let second = app
            .world()
            .resource::<ModelLoader>()
            .active()
            .map(|active| active.generation)
            .unwrap();
        let new_root = spawn_scene(&mut app, second, "man_colored.glb");
        app.update();

        let world = app.world_mut();
        let roots: Vec<(Entity, String)> = world
            .query_filtered::<(Entity, &Name), With<ModelRoot>>()
            .iter(world)
            .map(|(entity, name)| (entity, name.to_string()))
            .collect();
        assert_eq!(roots, vec![(new_root, MODEL_ROOT_NAME.to_string())]);
        assert!(app.world().get::<ModelProcessed>(new_root).is_some());
    }
}
