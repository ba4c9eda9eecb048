use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use cgmath::{Vector2, Zero};
use log::{debug, trace};
use tokio::task::AbortHandle;

use crate::{
    physics::{BodyDef, BodyHandle, Contact, FixtureDef, ParticleSystemHandle, Shape},
    scene::Scene,
    stage::{with_actor, SharedActor, Stage},
    units::rad_to_deg,
};

pub mod id;
pub mod tasks;

pub use id::BodyId;
pub use tasks::{CancelToken, TaskScope};


pub type BodyCell = Rc<RefCell<EntityBody>>;

pub type RenderBlock = Box<dyn FnMut(f32)>;
pub type ContactBlock = Box<dyn FnMut(&BodyCell, &Contact)>;
pub type ParticleContactBlock = Box<dyn FnMut(ParticleSystemHandle, usize)>;


/// A game entity's physics body together with the actor that displays it.
///
/// Built inert. One of the `create*` calls makes it live exactly once, `destroy`
/// makes it inert again. Callbacks run while the wrapper is mutably borrowed, so
/// they must not borrow the wrapper that is dispatching them.
pub struct EntityBody {
    this: Weak<RefCell<EntityBody>>,
    name: String,

    pub body_def: BodyDef,
    pub fixture_def: FixtureDef,
    pub collision_list: Vec<String>,
    /// Dispose the actor on `destroy`. Reset to `true` by every `create*`.
    pub destroy_actor: bool,

    actor: Option<SharedActor>,
    id: BodyId,
    size: Vector2<f32>,
    position: Vector2<f32>,
    body: Option<BodyHandle>,
    scale: f32,
    center: Vector2<f32>,
    tasks: Option<TaskScope>,

    render_blocks: Vec<RenderBlock>,
    begin_contact_blocks: Vec<ContactBlock>,
    end_contact_blocks: Vec<ContactBlock>,
    begin_particle_contact_blocks: Vec<ParticleContactBlock>,
}

impl EntityBody {
    pub fn new(name: impl Into<String>, body_def: BodyDef, fixture_def: FixtureDef) -> BodyCell {
        let name = name.into();
        Rc::new_cyclic(|this| RefCell::new(Self {
            this: this.clone(),
            name,
            body_def,
            fixture_def,
            collision_list: Vec::new(),
            destroy_actor: true,
            actor: None,
            id: BodyId::new(),
            size: Vector2::zero(),
            position: Vector2::zero(),
            body: None,
            scale: 0.0,
            center: Vector2::zero(),
            tasks: None,
            render_blocks: Vec::new(),
            begin_contact_blocks: Vec::new(),
            end_contact_blocks: Vec::new(),
            begin_particle_contact_blocks: Vec::new(),
        }))
    }

    pub fn with_actor(name: impl Into<String>, body_def: BodyDef, fixture_def: FixtureDef, actor: SharedActor) -> BodyCell {
        let cell = Self::new(name, body_def, fixture_def);
        cell.borrow_mut().actor = Some(actor);
        cell
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn is_live(&self) -> bool {
        self.body.is_some()
    }

    pub fn actor(&self) -> Option<&SharedActor> {
        self.actor.as_ref()
    }

    pub fn size(&self) -> Vector2<f32> {
        self.size
    }

    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn center(&self) -> Vector2<f32> {
        self.center
    }

    pub fn tasks(&self) -> Option<&TaskScope> {
        self.tasks.as_ref()
    }

    // ---------------------------------------------------
    // Identity
    // ---------------------------------------------------

    pub fn id(&self) -> &str {
        self.id.get()
    }

    pub fn original_id(&self) -> &str {
        self.id.original()
    }

    pub fn set_id(&mut self, value: impl Into<String>) {
        self.id.set(value);
    }

    pub fn set_none_id(&mut self) {
        self.id.set_none();
    }

    pub fn set_original_id(&mut self) {
        self.id.restore_original();
    }

    // ---------------------------------------------------
    // Callbacks
    // ---------------------------------------------------

    pub fn on_render(&mut self, block: impl FnMut(f32) + 'static) {
        self.render_blocks.push(Box::new(block));
    }

    pub fn on_begin_contact(&mut self, block: impl FnMut(&BodyCell, &Contact) + 'static) {
        self.begin_contact_blocks.push(Box::new(block));
    }

    pub fn on_end_contact(&mut self, block: impl FnMut(&BodyCell, &Contact) + 'static) {
        self.end_contact_blocks.push(Box::new(block));
    }

    pub fn on_begin_particle_contact(&mut self, block: impl FnMut(ParticleSystemHandle, usize) + 'static) {
        self.begin_particle_contact_blocks.push(Box::new(block));
    }

    // ---------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------

    /// Creates the body from the shape `name` drawn in the scene's body editor.
    /// `x`, `y`, `w`, `h` are stage units; the shape is scaled to width `w`.
    pub fn create(&mut self, scene: &mut Scene, x: f32, y: f32, w: f32, h: f32) -> anyhow::Result<()> {
        if self.body.is_some() {
            trace!("body '{}' is already live, create ignored", self.name);
            return Ok(());
        }

        let position = Vector2::new(x, y);
        let size = Vector2::new(w, h);
        let scale = scene.units.to_b2(size.x);
        let center = scene.editor.origin(&self.name, scale)?;

        self.body_def.position = scene.units.vec_to_b2(position) + center;

        let body = scene.world.create_body(&self.body_def);
        scene.register_body(body, self.this.clone());

        if let Err(err) = scene.editor.attach_fixture(&mut *scene.world, body, &self.name, &self.fixture_def, scale) {
            scene.unregister_body(body);
            scene.world.destroy_body(body);
            return Err(err);
        }

        self.position = position;
        self.size = size;
        self.scale = scale;
        self.center = center;
        self.go_live(scene, body);
        Ok(())
    }

    pub fn create_at(&mut self, scene: &mut Scene, position: Vector2<f32>, size: Vector2<f32>) -> anyhow::Result<()> {
        self.create(scene, position.x, position.y, size.x, size.y)
    }

    /// Creates the body with a single box fixture covering the given bounds.
    pub fn create_box(&mut self, scene: &mut Scene, x: f32, y: f32, w: f32, h: f32) -> anyhow::Result<()> {
        if self.body.is_some() {
            trace!("body '{}' is already live, create_box ignored", self.name);
            return Ok(());
        }

        let position = Vector2::new(x, y);
        let size = Vector2::new(w, h);
        let half = size / 2.0;
        let center = scene.units.vec_to_b2(half);

        self.body_def.position = scene.units.vec_to_b2(position + half);

        let body = scene.world.create_body(&self.body_def);
        scene.register_body(body, self.this.clone());

        self.fixture_def.shape = Some(Shape::boxed(center.x, center.y));
        if let Err(err) = scene.world.create_fixture(body, &self.fixture_def) {
            scene.unregister_body(body);
            scene.world.destroy_body(body);
            return Err(err);
        }

        self.position = position;
        self.size = size;
        self.center = center;
        self.go_live(scene, body);
        Ok(())
    }

    fn go_live(&mut self, scene: &mut Scene, body: BodyHandle) {
        self.body = Some(body);
        self.tasks = Some(TaskScope::new(scene.runtime().clone()));
        self.add_actor(&mut scene.stage);
        self.destroy_actor = true;

        debug!("body '{}' live as {:?} at {:?}", self.name, body, self.body_def.position);
    }

    fn add_actor(&self, stage: &mut Stage) {
        if let Some(actor) = &self.actor {
            stage.add_actor(actor.clone());
            with_actor(actor, |a| a.set_bounds(self.position, self.size));
        }
    }

    /// Tears the body down. Does nothing when the body is not live.
    pub fn destroy(&mut self, scene: &mut Scene) {
        let Some(body) = self.body else {
            return;
        };

        self.id.set_none();

        if let Some(tasks) = self.tasks.take() {
            tasks.cancel_all();
        }

        if self.destroy_actor {
            if let Some(actor) = self.actor.take() {
                with_actor(&actor, |a| a.dispose());
            }
        }

        self.collision_list.clear();

        for joint in scene.world.joints_of(body) {
            if let Some(wrapper) = scene.joint_of(joint) {
                wrapper.borrow_mut().destroy(scene);
            }
        }

        scene.unregister_body(body);
        let remove_from_world = scene.settings.destroy_body_in_world;
        if remove_from_world {
            scene.world.destroy_body(body);
        }
        self.body = None;

        debug!("body '{}' destroyed ({:?}, removed from world: {})", self.name, body, remove_from_world);
    }

    /// Runs `task` in this body's scope. `None` while the body is not live.
    pub fn spawn<F, Fut>(&mut self, task: F) -> Option<AbortHandle>
    where
        F: FnOnce(CancelToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.as_mut().map(|tasks| tasks.spawn(task))
    }

    // ---------------------------------------------------
    // Per frame
    // ---------------------------------------------------

    pub fn render(&mut self, scene: &Scene, delta_time: f32) {
        for block in self.render_blocks.iter_mut() {
            block(delta_time);
        }
        self.transform_actor(scene);
    }

    fn transform_actor(&self, scene: &Scene) {
        let (Some(body), Some(actor)) = (self.body, &self.actor) else {
            return;
        };
        let Some(transform) = scene.world.body_transform(body) else {
            return;
        };

        let position = scene.units.vec_to_ui(transform.position - self.center);
        let origin = scene.units.vec_to_ui(self.center);
        with_actor(actor, |a| {
            a.set_position(position);
            a.set_origin(origin);
            a.set_rotation(rad_to_deg(transform.angle));
        });
    }

    pub fn begin_contact(&mut self, other: &BodyCell, contact: &Contact) {
        for block in self.begin_contact_blocks.iter_mut() {
            block(other, contact);
        }
    }

    pub fn end_contact(&mut self, other: &BodyCell, contact: &Contact) {
        for block in self.end_contact_blocks.iter_mut() {
            block(other, contact);
        }
    }

    pub fn begin_particle_contact(&mut self, system: ParticleSystemHandle, index: usize) {
        for block in self.begin_particle_contact_blocks.iter_mut() {
            block(system, index);
        }
    }
}
