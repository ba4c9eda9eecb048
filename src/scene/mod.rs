use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cgmath::Vector2;
use tokio::runtime::Handle;

use crate::{
    body::{BodyCell, EntityBody},
    editor::BodyEditor,
    joint::JointCell,
    physics::{BodyHandle, ContactEvent, JointHandle, PhysicsWorld, RapierWorld},
    registry::HandleTable,
    settings::PhysicsSettings,
    stage::Stage,
    units::Units,
};

pub mod contact;


/// Everything a body needs to come alive: the world it lives in, where its
/// shapes come from and where its actor is drawn. Also the reverse lookup from
/// engine handles back to their wrappers.
pub struct Scene {
    pub world: Box<dyn PhysicsWorld>,
    pub editor: Box<dyn BodyEditor>,
    pub stage: Stage,
    pub units: Units,
    pub settings: PhysicsSettings,
    runtime: Handle,
    bodies: HandleTable<BodyHandle, Weak<RefCell<EntityBody>>>,
    joints: HandleTable<JointHandle, JointCell>,
}

impl Scene {
    pub fn new(
        world: Box<dyn PhysicsWorld>,
        editor: Box<dyn BodyEditor>,
        settings: PhysicsSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            world,
            editor,
            stage: Stage::new(),
            units: Units::new(settings.ui_per_meter),
            settings,
            runtime,
            bodies: HandleTable::new(),
            joints: HandleTable::new(),
        }
    }

    /// Scene backed by a [`RapierWorld`] using the configured gravity.
    pub fn rapier(editor: Box<dyn BodyEditor>, settings: PhysicsSettings, runtime: Handle) -> Self {
        let (gx, gy) = settings.gravity;
        let world = RapierWorld::new(Vector2::new(gx, gy));
        Self::new(Box::new(world), editor, settings, runtime)
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub(crate) fn register_body(&mut self, body: BodyHandle, wrapper: Weak<RefCell<EntityBody>>) {
        self.bodies.insert(body, wrapper);
    }

    pub(crate) fn unregister_body(&mut self, body: BodyHandle) {
        self.bodies.remove(body);
    }

    /// Custom [`JointWrapper`](crate::joint::JointWrapper)s register here so body teardown reaches them.
    pub fn register_joint(&mut self, joint: JointHandle, wrapper: JointCell) {
        self.joints.insert(joint, wrapper);
    }

    pub fn unregister_joint(&mut self, joint: JointHandle) {
        self.joints.remove(joint);
    }

    /// The wrapper owning `body`, if it is still alive.
    pub fn body_of(&self, body: BodyHandle) -> Option<BodyCell> {
        self.bodies.get(body).and_then(Weak::upgrade)
    }

    pub fn joint_of(&self, joint: JointHandle) -> Option<JointCell> {
        self.joints.get(joint).map(Rc::clone)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Live wrappers in creation order. Entries whose wrapper was dropped are forgotten.
    pub fn live_bodies(&mut self) -> Vec<BodyCell> {
        self.bodies.retain(|_, wrapper| wrapper.strong_count() > 0);
        self.bodies.values().filter_map(Weak::upgrade).collect()
    }

    /// Advances the world and dispatches the contacts it reported.
    pub fn step(&mut self, dt: f32) {
        let events = self.world.step(dt, self.settings.velocity_iterations, self.settings.position_iterations);
        for event in events {
            match event {
                ContactEvent::Begin(contact) => self.begin_contact(&contact),
                ContactEvent::End(contact) => self.end_contact(&contact),
            }
        }
    }

    /// Renders every live body, then drops disposed actors from the stage.
    pub fn render(&mut self, delta_time: f32) {
        for body in self.live_bodies() {
            body.borrow_mut().render(self, delta_time);
        }
        self.stage.prune_disposed();
    }
}
