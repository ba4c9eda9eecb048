use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::anyhow;
use log::debug;

use crate::{
    body::BodyCell,
    physics::{JointDef, JointHandle},
    scene::Scene,
};


/// Anything that owns a joint in the physics world and must be torn down with it.
pub trait JointWrapper {
    fn joint(&self) -> Option<JointHandle>;

    /// Idempotent.
    fn destroy(&mut self, scene: &mut Scene);
}

pub type JointCell = Rc<RefCell<dyn JointWrapper>>;

pub type DestroyBlock = Box<dyn FnMut(JointHandle)>;


pub struct EntityJoint {
    this: Weak<RefCell<EntityJoint>>,
    pub def: JointDef,
    joint: Option<JointHandle>,
    destroy_blocks: Vec<DestroyBlock>,
}

impl EntityJoint {
    pub fn new(def: JointDef) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| RefCell::new(Self {
            this: this.clone(),
            def,
            joint: None,
            destroy_blocks: Vec::new(),
        }))
    }

    pub fn on_destroy(&mut self, block: impl FnMut(JointHandle) + 'static) {
        self.destroy_blocks.push(Box::new(block));
    }

    /// Joins two live bodies. Does nothing if the joint already exists.
    pub fn create(&mut self, scene: &mut Scene, body_a: &BodyCell, body_b: &BodyCell) -> anyhow::Result<()> {
        if self.joint.is_some() {
            return Ok(());
        }

        let a = body_a.borrow().body().ok_or_else(|| anyhow!("first body of the joint is not live"))?;
        let b = body_b.borrow().body().ok_or_else(|| anyhow!("second body of the joint is not live"))?;

        let joint = scene.world.create_joint(a, b, &self.def)?;
        if let Some(this) = self.this.upgrade() {
            scene.register_joint(joint, this);
        }
        self.joint = Some(joint);

        debug!("joint {:?} created between {:?} and {:?}", joint, a, b);
        Ok(())
    }
}

impl JointWrapper for EntityJoint {
    fn joint(&self) -> Option<JointHandle> {
        self.joint
    }

    fn destroy(&mut self, scene: &mut Scene) {
        let Some(joint) = self.joint.take() else {
            return;
        };

        scene.unregister_joint(joint);
        scene.world.destroy_joint(joint);

        for block in self.destroy_blocks.iter_mut() {
            block(joint);
        }
        debug!("joint {:?} destroyed", joint);
    }
}
