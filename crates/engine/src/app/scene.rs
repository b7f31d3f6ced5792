use std::sync::Arc;

use super::input::{ActionStates, InputAction};
use super::overlay::{OverlayPresenter, OverlayToken};
use super::rendering::screen_to_world_px;
use crate::content::AnimationLibrary;

/// Logical stage size in world units. World space is y-up with the origin at
/// the bottom-left corner; the renderer letterboxes it into the window.
pub const STAGE_WIDTH: f32 = 960.0;
pub const STAGE_HEIGHT: f32 = 540.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Advance,
    Replay,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    confirm_pressed: bool,
    progress_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
        confirm_pressed: bool,
        progress_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_click_pressed,
            confirm_pressed,
            progress_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_confirm_pressed(mut self, confirm_pressed: bool) -> Self {
        self.confirm_pressed = confirm_pressed;
        self
    }

    pub fn with_progress_pressed(mut self, progress_pressed: bool) -> Self {
        self.progress_pressed = progress_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    /// Strips every press the modal overlay consumes. Held movement keys
    /// survive so the actor keeps its cosmetic motion.
    pub fn modal_masked(mut self) -> Self {
        self.left_click_pressed = false;
        self.confirm_pressed = false;
        self.progress_pressed = false;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn confirm_pressed(&self) -> bool {
        self.confirm_pressed
    }

    pub fn progress_pressed(&self) -> bool {
        self.progress_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: Vec2::new(center.x - half_extents.x, center.y - half_extents.y),
            max: Vec2::new(center.x + half_extents.x, center.y + half_extents.y),
        }
    }

    pub fn stage() -> Self {
        Self {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(STAGE_WIDTH, STAGE_HEIGHT),
        }
    }

    /// Touching edges count as an intersection.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderableKind {
    Placeholder,
    Solid([u8; 4]),
    Sprite(String),
    AtlasFrame { atlas: String, frame: String },
    Meter { fill: f32, color: [u8; 4] },
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub half_extents: Vec2,
    pub renderable: RenderableDesc,
    pub visible: bool,
    pub clickable: bool,
    pub flip_x: bool,
    pub label: Option<String>,
    applied_spawn_order: u64,
}

impl Entity {
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.transform.position, self.half_extents)
    }
}

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Per-stage world: entities, HUD text and the stage's overlay presenter.
///
/// Spawns are deferred until [`SceneWorld::apply_pending`], so a stage can
/// iterate entities while queueing new ones.
#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    next_applied_spawn_order: u64,
    overlay: OverlayPresenter,
    hud_lines: Vec<String>,
    animation_library: Option<Arc<AnimationLibrary>>,
}

impl SceneWorld {
    pub fn spawn(
        &mut self,
        transform: Transform,
        half_extents: Vec2,
        renderable: RenderableDesc,
    ) -> EntityId {
        self.spawn_internal(transform, half_extents, renderable, false)
    }

    pub fn spawn_clickable(
        &mut self,
        transform: Transform,
        half_extents: Vec2,
        renderable: RenderableDesc,
    ) -> EntityId {
        self.spawn_internal(transform, half_extents, renderable, true)
    }

    fn spawn_internal(
        &mut self,
        transform: Transform,
        half_extents: Vec2,
        renderable: RenderableDesc,
        clickable: bool,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            half_extents,
            renderable,
            visible: true,
            clickable,
            flip_x: false,
            label: None,
            applied_spawn_order: 0,
        });
        id
    }

    pub fn apply_pending(&mut self) {
        for mut entity in self.pending_spawns.drain(..) {
            entity.applied_spawn_order = self.next_applied_spawn_order;
            self.next_applied_spawn_order = self.next_applied_spawn_order.saturating_add(1);
            self.entities.push(entity);
        }
    }

    /// Drops everything the stage built. The shared animation library stays.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.next_applied_spawn_order = 0;
        self.overlay = OverlayPresenter::default();
        self.hud_lines.clear();
    }

    pub fn bounds(&self) -> Rect {
        Rect::stage()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn find_by_debug_name(&self, debug_name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.renderable.debug_name == debug_name)
    }

    fn find_any_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|entity| entity.id == id)
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> bool {
        match self.find_any_mut(id) {
            Some(entity) => {
                entity.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn set_label(&mut self, id: EntityId, label: impl Into<String>) -> bool {
        match self.find_any_mut(id) {
            Some(entity) => {
                entity.label = Some(label.into());
                true
            }
            None => false,
        }
    }

    pub fn set_renderable_kind(&mut self, id: EntityId, kind: RenderableKind) -> bool {
        match self.find_any_mut(id) {
            Some(entity) => {
                entity.renderable.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Both entities must be applied and visible to overlap.
    pub fn overlapping(&self, a: EntityId, b: EntityId) -> bool {
        match (self.find_entity(a), self.find_entity(b)) {
            (Some(first), Some(second)) if first.visible && second.visible => {
                first.bounds().intersects(&second.bounds())
            }
            _ => false,
        }
    }

    pub fn overlay(&self) -> &OverlayPresenter {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayPresenter {
        &mut self.overlay
    }

    pub fn set_hud_lines(&mut self, lines: Vec<String>) {
        self.hud_lines = lines;
    }

    pub fn hud_lines(&self) -> &[String] {
        &self.hud_lines
    }

    pub fn set_animation_library(&mut self, library: Arc<AnimationLibrary>) {
        self.animation_library = Some(library);
    }

    pub fn animation_library(&self) -> Option<&AnimationLibrary> {
        self.animation_library.as_deref()
    }

    /// Returns the most recently spawned visible clickable entity under the
    /// cursor.
    pub fn pick_topmost_clickable_at_cursor(
        &self,
        cursor_position_px: Vec2,
        window_size: (u32, u32),
    ) -> Option<EntityId> {
        let cursor_world = screen_to_world_px(window_size, cursor_position_px)?;
        let mut best: Option<(u64, EntityId)> = None;

        for entity in &self.entities {
            if !entity.clickable || !entity.visible {
                continue;
            }
            if !entity.bounds().contains(cursor_world) {
                continue;
            }

            match best {
                Some((order, _)) if order >= entity.applied_spawn_order => {}
                _ => best = Some((entity.applied_spawn_order, entity.id)),
            }
        }

        best.map(|(_, id)| id)
    }

    /// True when this tick's click landed on `id`.
    pub fn clicked(&self, input: &InputSnapshot, id: EntityId) -> bool {
        if !input.left_click_pressed() {
            return false;
        }
        input
            .cursor_position_px()
            .and_then(|cursor| self.pick_topmost_clickable_at_cursor(cursor, input.window_size()))
            == Some(id)
    }
}

/// The session record the sequencer owns and lends to the active stage.
pub trait SessionContext {
    fn reset(&mut self);
}

/// One stage of a [`SceneSequence`](super::SceneSequence).
///
/// `load` and `unload` bracket the stage's active lifetime. `update` runs once
/// per fixed tick and returns the stage's request to the sequencer.
/// `overlay_dismissed` re-enters the stage with the token returned by the
/// overlay presenter once the user closes the panel.
pub trait Scene<C> {
    fn load(&mut self, world: &mut SceneWorld, context: &mut C);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
        context: &mut C,
    ) -> SceneCommand;
    fn overlay_dismissed(&mut self, token: OverlayToken, world: &mut SceneWorld, context: &mut C);
    fn unload(&mut self, world: &mut SceneWorld, context: &mut C);
    fn debug_name(&self) -> &'static str;
    fn debug_title(&self, _world: &SceneWorld, _context: &C) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::world_to_screen_px;

    fn placeholder(debug_name: &'static str) -> RenderableDesc {
        RenderableDesc {
            kind: RenderableKind::Placeholder,
            debug_name,
        }
    }

    fn at(x: f32, y: f32) -> Transform {
        Transform {
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        assert_eq!(allocator.allocate().0, 0);
        assert_eq!(allocator.allocate().0, 1);
        assert_eq!(allocator.allocate().0, 2);
    }

    #[test]
    fn spawn_is_deferred_until_apply_pending() {
        let mut world = SceneWorld::default();
        let id = world.spawn(at(10.0, 10.0), Vec2::new(4.0, 4.0), placeholder("zone"));
        assert!(world.find_entity(id).is_none());

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
        assert!(world.find_entity(id).is_some());

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn applied_entities_keep_queue_order_across_passes() {
        let mut world = SceneWorld::default();
        let first = world.spawn(at(0.0, 0.0), Vec2::new(1.0, 1.0), placeholder("first"));
        world.apply_pending();
        let second = world.spawn(at(3.0, 1.0), Vec2::new(1.0, 1.0), placeholder("second"));
        let third = world.spawn(at(6.0, 1.0), Vec2::new(1.0, 1.0), placeholder("third"));
        world.apply_pending();

        let ids: Vec<EntityId> = world.entities().iter().map(|entity| entity.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn set_visible_and_label_reach_pending_entities() {
        let mut world = SceneWorld::default();
        let id = world.spawn(at(0.0, 0.0), Vec2::new(1.0, 1.0), placeholder("button"));
        assert!(world.set_visible(id, false));
        assert!(world.set_label(id, "Next"));
        world.apply_pending();

        let entity = world.find_entity(id).expect("entity");
        assert!(!entity.visible);
        assert_eq!(entity.label.as_deref(), Some("Next"));
        assert!(!world.set_visible(EntityId(99), true));
    }

    #[test]
    fn overlapping_requires_intersecting_visible_bounds() {
        let mut world = SceneWorld::default();
        let actor = world.spawn(at(100.0, 100.0), Vec2::new(10.0, 10.0), placeholder("actor"));
        let near = world.spawn(at(115.0, 100.0), Vec2::new(6.0, 6.0), placeholder("near"));
        let far = world.spawn(at(300.0, 100.0), Vec2::new(6.0, 6.0), placeholder("far"));
        world.apply_pending();

        assert!(world.overlapping(actor, near));
        assert!(!world.overlapping(actor, far));

        world.set_visible(near, false);
        assert!(!world.overlapping(actor, near));
    }

    #[test]
    fn rect_edges_touching_count_as_intersection() {
        let a = Rect::from_center(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Rect::from_center(Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0));
        let c = Rect::from_center(Vec2::new(2.5, 0.0), Vec2::new(1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(Vec2::new(1.0, -1.0)));
        assert_eq!(b.center(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn pick_topmost_clickable_prefers_last_applied_spawn() {
        let mut world = SceneWorld::default();
        let first =
            world.spawn_clickable(at(480.0, 270.0), Vec2::new(40.0, 20.0), placeholder("a"));
        let second =
            world.spawn_clickable(at(480.0, 270.0), Vec2::new(40.0, 20.0), placeholder("b"));
        world.apply_pending();

        let (x, y) = world_to_screen_px((960, 540), Vec2::new(480.0, 270.0));
        let cursor = Vec2::new(x as f32, y as f32);
        assert_eq!(
            world.pick_topmost_clickable_at_cursor(cursor, (960, 540)),
            Some(second)
        );

        world.set_visible(second, false);
        assert_eq!(
            world.pick_topmost_clickable_at_cursor(cursor, (960, 540)),
            Some(first)
        );
    }

    #[test]
    fn pick_ignores_non_clickable_and_empty_space() {
        let mut world = SceneWorld::default();
        world.spawn(at(480.0, 270.0), Vec2::new(40.0, 20.0), placeholder("decor"));
        world.apply_pending();

        assert_eq!(
            world.pick_topmost_clickable_at_cursor(Vec2::new(480.0, 270.0), (960, 540)),
            None
        );
        assert_eq!(
            world.pick_topmost_clickable_at_cursor(Vec2::new(5.0, 5.0), (960, 540)),
            None
        );
    }

    #[test]
    fn clicked_requires_click_edge_on_target() {
        let mut world = SceneWorld::default();
        let button =
            world.spawn_clickable(at(100.0, 100.0), Vec2::new(30.0, 15.0), placeholder("button"));
        world.apply_pending();

        let (x, y) = world_to_screen_px((960, 540), Vec2::new(100.0, 100.0));
        let hover = InputSnapshot::empty()
            .with_cursor_position_px(Some(Vec2::new(x as f32, y as f32)))
            .with_window_size((960, 540));
        assert!(!world.clicked(&hover, button));
        assert!(world.clicked(&hover.with_left_click_pressed(true), button));
    }

    #[test]
    fn clear_resets_entities_hud_and_overlay_but_keeps_library() {
        let mut world = SceneWorld::default();
        world.set_animation_library(Arc::new(AnimationLibrary::default()));
        world.spawn(at(0.0, 0.0), Vec2::new(1.0, 1.0), placeholder("x"));
        world.apply_pending();
        world.set_hud_lines(vec!["Benefits 1/5".to_string()]);
        world
            .overlay_mut()
            .present(crate::app::OverlayContent::new("t", "b"))
            .expect("present");

        world.clear();

        assert_eq!(world.entity_count(), 0);
        assert!(world.hud_lines().is_empty());
        assert!(!world.overlay().is_blocking());
        assert!(world.animation_library().is_some());
    }

    #[test]
    fn modal_masked_keeps_held_movement() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveRight, true)
            .with_left_click_pressed(true)
            .with_confirm_pressed(true)
            .with_progress_pressed(true)
            .modal_masked();
        assert!(input.is_down(InputAction::MoveRight));
        assert!(!input.left_click_pressed());
        assert!(!input.confirm_pressed());
        assert!(!input.progress_pressed());
    }
}
