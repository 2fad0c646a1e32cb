//! Cubes rendered each frame.

use std::rc::Rc;

use crate::cube::Cube;

/// Flat, insertion-ordered list of cubes.
///
/// Cubes are reference counted so a caller can keep a handle to the cube it
/// added. Names are not required to be unique.
#[derive(Debug, Default)]
pub struct Scene {
    cubes: Vec<Rc<Cube>>,
}

impl Scene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `cube`; later lookups find earlier cubes first.
    pub fn add_cube(&mut self, cube: Rc<Cube>) {
        self.cubes.push(cube);
    }

    /// Returns the first cube named `name`, if any.
    #[must_use]
    pub fn cube_by_name(&self, name: &str) -> Option<Rc<Cube>> {
        self.cubes
            .iter()
            .find(|cube| cube.name() == name)
            .cloned()
    }

    /// Cubes in insertion order.
    #[must_use]
    pub fn cubes(&self) -> &[Rc<Cube>] {
        &self.cubes
    }

    /// Number of cubes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    /// True when the scene holds no cubes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Drops the scene's references to every cube.
    pub fn clear(&mut self) {
        self.cubes.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn lookup_after_add() {
        let mut scene = Scene::new();
        scene.add_cube(Rc::new(Cube::new("Cube")));

        let found = scene.cube_by_name("Cube").expect("cube was just added");
        assert_eq!(found.name(), "Cube");
        assert!(scene.cube_by_name("Sphere").is_none());
    }

    #[test]
    fn duplicate_names_resolve_to_first_inserted() {
        let mut scene = Scene::new();
        scene.add_cube(Rc::new(Cube::new("Box").with_color(Vec3::X)));
        scene.add_cube(Rc::new(Cube::new("Box").with_color(Vec3::Y)));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.cube_by_name("Box").map(|c| c.color()), Some(Vec3::X));
    }

    #[test]
    fn shared_handles_survive_clear() {
        let cube = Rc::new(Cube::new("Cube"));
        let mut scene = Scene::new();
        scene.add_cube(Rc::clone(&cube));
        assert_eq!(Rc::strong_count(&cube), 2);

        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(Rc::strong_count(&cube), 1);
        assert_eq!(cube.name(), "Cube");
    }

    #[test]
    fn empty_scene_lookup() {
        let scene = Scene::default();
        assert!(scene.cube_by_name("").is_none());
        assert!(scene.cubes().is_empty());
    }
}
