use crate::core::models::Vec2;

/// A bounding box with one corner fixed at 0,0 and assumed to have positive extent
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoundsOriginRoot {
    pub extent: Vec2,
}

impl BoundsOriginRoot {
    pub fn new(width: i32, height: i32) -> BoundsOriginRoot {
        BoundsOriginRoot {
            extent: Vec2 { x: width, y: height },
        }
    }

    pub fn width(&self) -> i32 {
        self.extent.x
    }

    pub fn height(&self) -> i32 {
        self.extent.y
    }

    pub fn contains(&self, pos: &Vec2) -> bool {
        pos.x >= 0 && pos.x < self.extent.x && pos.y >= 0 && pos.y < self.extent.y
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_excludes_far_edges() {
        let bounds = BoundsOriginRoot::new(3, 2);

        assert!(bounds.contains(&Vec2::new(0, 0)));
        assert!(bounds.contains(&Vec2::new(2, 1)));
        assert!(!bounds.contains(&Vec2::new(3, 1)));
        assert!(!bounds.contains(&Vec2::new(2, 2)));
        assert!(!bounds.contains(&Vec2::new(-1, 0)));
    }
}
