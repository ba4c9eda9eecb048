use std::sync::{Arc, PoisonError, RwLock};

use cgmath::Vector2;

pub mod group;

pub use group::Group;


/// A node of the scene graph that a body drives.
pub trait Actor: Send + Sync {
    fn set_bounds(&mut self, position: Vector2<f32>, size: Vector2<f32>);

    fn set_position(&mut self, position: Vector2<f32>);

    fn set_origin(&mut self, origin: Vector2<f32>);

    /// Degrees, counter-clockwise.
    fn set_rotation(&mut self, degrees: f32);

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

pub type SharedActor = Arc<RwLock<dyn Actor>>;


/// Runs `f` against the actor, recovering the guard if another thread panicked while holding it.
pub fn with_actor<R>(actor: &SharedActor, f: impl FnOnce(&mut dyn Actor) -> R) -> R {
    let mut guard = actor.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut *guard)
}


/// Top-level container of actors.
#[derive(Default)]
pub struct Stage {
    actors: Vec<SharedActor>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_actor(&mut self, actor: SharedActor) {
        if self.actors.iter().any(|a| Arc::ptr_eq(a, &actor)) {
            return;
        }
        self.actors.push(actor);
    }

    pub fn actors(&self) -> &[SharedActor] {
        &self.actors
    }

    pub fn contains(&self, actor: &SharedActor) -> bool {
        self.actors.iter().any(|a| Arc::ptr_eq(a, actor))
    }

    /// Drops every disposed actor, returning how many were removed.
    pub fn prune_disposed(&mut self) -> usize {
        let before = self.actors.len();
        self.actors.retain(|a| {
            !a.read().unwrap_or_else(PoisonError::into_inner).is_disposed()
        });
        before - self.actors.len()
    }
}
