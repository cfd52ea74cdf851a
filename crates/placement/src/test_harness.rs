//! # TestScene: headless harness for placement tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins`, transform propagation and
//! `PlacementPlugin`. Schedules are stepped explicitly so tests are
//! deterministic: `tick()` runs one simulation step, `frame()` runs one frame
//! of `PreUpdate`/`Update`/`PostUpdate`.

use bevy::app::{App, FixedMain};
use bevy::ecs::event::Events;
use bevy::ecs::world::CommandQueue;
use bevy::prelude::*;

use crate::catalog::{BuildingCatalog, BuildingSlot};
use crate::grid::{GridConfig, GridDefinition};
use crate::interaction::{
    GrabEvent, GrabInteraction, Hand, HoverEnded, HoverStarted, Interactor,
};
use crate::motion_constraint::GridMotionConstraint;
use crate::physics::{BodyLocks, Collider, PlacementBounds, RigidBodyProxy};
use crate::planar_constraint::PlanarOrientationConstraint;
use crate::prefab::{PrefabFactory, PrefabId, Prefabs};
use crate::scale_handle::AxisScaleHandle;
use crate::session::{PlacementRequest, PlacementSession, PlacementSettings, PrefabSelected};
use crate::PlacementPlugin;

/// A unit cube with up, right and front scale handles.
pub const BLOCK: PrefabId = PrefabId(1);
/// A unit cube with no handles.
pub const PLAIN: PrefabId = PrefabId(2);

/// Factory for the two test prefabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestBlocks;

impl TestBlocks {
    fn spawn_handle(commands: &mut Commands, parent: Entity, axis: Vec3) -> Option<Entity> {
        let handle = AxisScaleHandle::new(axis).ok()?;
        let entity = commands
            .spawn((
                handle,
                Transform::from_translation(axis * 0.55).with_scale(Vec3::splat(0.2)),
                Collider::trigger(Vec3::splat(0.5)),
            ))
            .set_parent(parent)
            .id();
        Some(entity)
    }
}

impl PrefabFactory for TestBlocks {
    fn instantiate(
        &self,
        commands: &mut Commands,
        prefab: PrefabId,
        transform: Transform,
    ) -> Option<Entity> {
        if prefab != BLOCK && prefab != PLAIN {
            return None;
        }
        let root = commands
            .spawn((
                transform,
                Collider::cuboid(Vec3::splat(0.5)),
                PlacementBounds {
                    half_extents: Vec3::splat(0.5),
                },
            ))
            .id();
        if prefab == BLOCK {
            for axis in [Vec3::Y, Vec3::X, Vec3::Z] {
                Self::spawn_handle(commands, root, axis);
            }
        }
        Some(root)
    }

    fn label(&self, prefab: PrefabId) -> String {
        match prefab {
            BLOCK => "Block".into(),
            PLAIN => "Plain".into(),
            other => format!("prefab #{}", other.0),
        }
    }
}

/// A headless Bevy App running `PlacementPlugin`.
pub struct TestScene {
    app: App,
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScene {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Unit grid at the world origin, default settings, two-slot catalog.
    pub fn new() -> Self {
        Self::with_config(GridConfig::default(), PlacementSettings::default())
    }

    pub fn with_config(grid: GridConfig, settings: PlacementSettings) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(bevy::transform::TransformPlugin)
            .add_plugins(bevy::hierarchy::HierarchyPlugin);

        // Config must be in place before Startup validates it.
        app.insert_resource(grid)
            .insert_resource(settings)
            .add_plugins(PlacementPlugin)
            .insert_resource(Prefabs::new(TestBlocks))
            .insert_resource(BuildingCatalog::new(vec![
                BuildingSlot::new("Block", BLOCK),
                BuildingSlot::new("Plain", PLAIN),
                BuildingSlot::empty("Empty"),
            ]));

        // Runs Startup once; no fixed step happens on the first frame.
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// One simulation step followed by transform propagation.
    pub fn tick(&mut self) {
        let world = self.app.world_mut();
        world.run_schedule(FixedMain);
        world.run_schedule(PostUpdate);
    }

    pub fn ticks(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// One rendered frame without a simulation step.
    pub fn frame(&mut self) {
        let world = self.app.world_mut();
        world.run_schedule(PreUpdate);
        world.run_schedule(Update);
        world.run_schedule(PostUpdate);
    }

    // -----------------------------------------------------------------------
    // Scene setup
    // -----------------------------------------------------------------------

    /// A right-hand interactor at `position` looking at `target`.
    pub fn spawn_pointer(&mut self, position: Vec3, target: Vec3) -> Entity {
        let transform = Transform::from_translation(position).looking_at(target, Vec3::Z);
        let entity = self
            .app
            .world_mut()
            .spawn((
                transform,
                Interactor {
                    hand: Some(Hand::Right),
                },
            ))
            .id();
        self.propagate();
        entity
    }

    pub fn aim_pointer(&mut self, pointer: Entity, position: Vec3, target: Vec3) {
        let transform = Transform::from_translation(position).looking_at(target, Vec3::Z);
        self.set_transform(pointer, transform);
    }

    pub fn move_to(&mut self, entity: Entity, position: Vec3) {
        if let Some(mut transform) = self.app.world_mut().get_mut::<Transform>(entity) {
            transform.translation = position;
        }
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) {
        if let Some(mut t) = self.app.world_mut().get_mut::<Transform>(entity) {
            *t = transform;
        }
    }

    /// A static box collider, e.g. an existing building to aim at.
    pub fn spawn_obstacle(&mut self, center: Vec3, half_extents: Vec3) -> Entity {
        let entity = self
            .app
            .world_mut()
            .spawn((Transform::from_translation(center), Collider::cuboid(half_extents)))
            .id();
        self.propagate();
        entity
    }

    /// A manipulable test block placed directly, bypassing the session.
    pub fn place_block(&mut self, position: Vec3) -> Entity {
        let world = self.app.world_mut();
        let mut queue = CommandQueue::default();
        let root = {
            let mut commands = Commands::new(&mut queue, world);
            TestBlocks.instantiate(&mut commands, BLOCK, Transform::from_translation(position))
        };
        queue.apply(world);
        let root = root.expect("test block prefab");
        world.entity_mut(root).insert((
            RigidBodyProxy::spawned(1.0, true, BodyLocks::NONE),
            GrabInteraction::default(),
            GridMotionConstraint::default(),
            PlanarOrientationConstraint::from_rotation(Quat::IDENTITY),
        ));
        self.propagate();
        root
    }

    /// Handles under `root`, as (entity, axis).
    pub fn handles_of(&mut self, root: Entity) -> Vec<(Entity, Vec3)> {
        let world = self.app.world_mut();
        let mut query = world.query::<(Entity, &AxisScaleHandle, &Parent)>();
        query
            .iter(world)
            .filter(|(_, _, parent)| parent.get() == root)
            .map(|(e, h, _)| (e, h.axis()))
            .collect()
    }

    pub fn handle_on_axis(&mut self, root: Entity, axis: Vec3) -> Entity {
        self.handles_of(root)
            .into_iter()
            .find(|(_, a)| *a == axis)
            .map(|(e, _)| e)
            .expect("handle on axis")
    }

    fn propagate(&mut self) {
        self.app.world_mut().run_schedule(PostUpdate);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    pub fn select(&mut self, prefab: PrefabId) {
        self.send(PrefabSelected { slot: None, prefab });
    }

    pub fn request(&mut self, request: PlacementRequest) {
        self.send(request);
    }

    pub fn grab(&mut self, target: Entity, pointer: Entity) {
        self.send(GrabEvent::Started { target, pointer });
    }

    pub fn release(&mut self, target: Entity, pointer: Entity) {
        self.send(GrabEvent::Ended { target, pointer });
    }

    pub fn hover(&mut self, target: Entity, pointer: Entity) {
        self.send(HoverStarted { target, pointer });
    }

    pub fn unhover(&mut self, target: Entity, pointer: Entity) {
        self.send(HoverEnded { target, pointer });
    }

    pub fn press_key(&mut self, key: KeyCode) {
        let world = self.app.world_mut();
        world.init_resource::<ButtonInput<KeyCode>>();
        let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
        keys.reset_all();
        keys.press(key);
    }

    pub fn click(&mut self, button: MouseButton) {
        let world = self.app.world_mut();
        world.init_resource::<ButtonInput<MouseButton>>();
        let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
        mouse.reset_all();
        mouse.press(button);
    }

    pub fn release_keys(&mut self) {
        if let Some(mut keys) = self.app.world_mut().get_resource_mut::<ButtonInput<KeyCode>>() {
            keys.reset_all();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    pub fn session(&self) -> &PlacementSession {
        self.resource::<PlacementSession>()
    }

    pub fn grid(&self) -> Option<&GridDefinition> {
        self.app.world().get_resource::<GridDefinition>()
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.app.world().get::<T>(entity)
    }

    pub fn transform(&self, entity: Entity) -> Transform {
        *self.get::<Transform>(entity).expect("entity has a Transform")
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.app.world().get_entity(entity).is_ok()
    }

    pub fn count<T: Component>(&mut self) -> usize {
        let world = self.app.world_mut();
        world.query_filtered::<(), With<T>>().iter(world).count()
    }

    /// Every event of type `E` sent so far.
    pub fn sent<E: Event + Clone>(&self) -> Vec<E> {
        self.app
            .world()
            .get_resource::<Events<E>>()
            .map(|events| events.iter_current_update_events().cloned().collect())
            .unwrap_or_default()
    }
}
