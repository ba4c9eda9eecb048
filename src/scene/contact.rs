use std::rc::Rc;

use log::trace;

use crate::{
    body::{BodyCell, EntityBody},
    physics::{BodyHandle, Contact, ParticleSystemHandle},
};

use super::Scene;


// Collision dispatch: the physics step reports contacts by handle, these
// resolve the wrappers and notify both sides.

impl Scene {
    pub fn begin_contact(&self, contact: &Contact) {
        self.dispatch_contact(contact, EntityBody::begin_contact);
    }

    pub fn end_contact(&self, contact: &Contact) {
        self.dispatch_contact(contact, EntityBody::end_contact);
    }

    pub fn begin_particle_contact(&self, system: ParticleSystemHandle, index: usize, body: BodyHandle) {
        match self.body_of(body) {
            Some(wrapper) => wrapper.borrow_mut().begin_particle_contact(system, index),
            None => trace!("particle contact with unknown body {:?}", body),
        }
    }

    fn dispatch_contact(&self, contact: &Contact, notify: fn(&mut EntityBody, &BodyCell, &Contact)) {
        let (Some(a), Some(b)) = (self.body_of(contact.body_a), self.body_of(contact.body_b)) else {
            trace!("contact between {:?} and {:?} has no wrapper", contact.body_a, contact.body_b);
            return;
        };
        if Rc::ptr_eq(&a, &b) {
            return;
        }

        notify(&mut a.borrow_mut(), &b, contact);
        notify(&mut b.borrow_mut(), &a, contact);
    }
}
