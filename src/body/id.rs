/// Game-level identifier of a body.
///
/// The first real value ever assigned is kept as the original id, so a body
/// that was temporarily anonymised can get its identity back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyId {
    current: String,
    original: String,
}

impl BodyId {
    pub const NONE: &'static str = "none";

    pub fn new() -> Self {
        Self {
            current: Self::NONE.to_owned(),
            original: Self::NONE.to_owned(),
        }
    }

    pub fn get(&self) -> &str {
        &self.current
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_none(&self) -> bool {
        self.current == Self::NONE
    }

    pub fn set(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.original == Self::NONE && value != Self::NONE {
            self.original = value.clone();
        }
        self.current = value;
    }

    pub fn set_none(&mut self) {
        self.current = Self::NONE.to_owned();
    }

    pub fn restore_original(&mut self) {
        self.current = self.original.clone();
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_none() {
        let id = BodyId::new();
        assert!(id.is_none());
        assert_eq!(id.original(), BodyId::NONE);
    }

    #[test]
    fn first_real_value_is_latched() {
        let mut id = BodyId::new();
        id.set("player");
        assert_eq!(id.get(), "player");
        assert_eq!(id.original(), "player");

        id.set("ghost");
        assert_eq!(id.get(), "ghost");
        assert_eq!(id.original(), "player");
    }

    #[test]
    fn assigning_none_first_does_not_latch() {
        let mut id = BodyId::new();
        id.set(BodyId::NONE);
        id.set("enemy");
        assert_eq!(id.original(), "enemy");
    }

    #[test]
    fn none_and_restore() {
        let mut id = BodyId::new();
        id.set("coin");
        id.set_none();
        assert!(id.is_none());
        assert_eq!(id.original(), "coin");

        id.restore_original();
        assert_eq!(id.get(), "coin");
    }
}
