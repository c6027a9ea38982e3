use crate::core::{
    utils::parse_size,
    PointLearnError,
    Position,
};

pub const STANDARD_ASPECT: f64 = 3.0 / 4.0;
pub const ASPECT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Parses `"1200x800"`.
    pub fn parse(text: &str) -> Result<Self, PointLearnError> {
        let (width, height) = parse_size(text)?;
        Ok(Self { width, height })
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// The rectangle the image actually covers inside its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl DisplayBox {
    /// Pixel position of a percentage point, relative to the container.
    pub fn locate(&self, position: Position) -> (f64, f64) {
        (
            self.offset_x + position.x.fraction() * self.width,
            self.offset_y + position.y.fraction() * self.height,
        )
    }
}

/// Letterboxes an image of `natural` size into `container`, preserving aspect.
pub fn fit_image(natural: Size, container: Size) -> Option<DisplayBox> {
    if !natural.is_valid() || !container.is_valid() {
        return None;
    }

    let image_aspect = natural.aspect();
    if image_aspect > container.aspect() {
        let height = container.width / image_aspect;
        Some(DisplayBox {
            width: container.width,
            height,
            offset_x: 0.0,
            offset_y: (container.height - height) / 2.0,
        })
    } else {
        let width = container.height * image_aspect;
        Some(DisplayBox {
            width,
            height: container.height,
            offset_x: (container.width - width) / 2.0,
            offset_y: 0.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    /// Portrait 3:4.
    Standard,
    NonStandard,
}

impl AspectClass {
    pub fn of(natural: Size) -> Self {
        if (natural.aspect() - STANDARD_ASPECT).abs() <= ASPECT_TOLERANCE {
            AspectClass::Standard
        } else {
            AspectClass::NonStandard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Percent;

    #[test]
    fn test_width_limited_portrait() {
        let fitted = fit_image(Size::new(1200.0, 1600.0), Size::new(600.0, 1000.0)).unwrap();
        assert_eq!(fitted, DisplayBox { width: 600.0, height: 800.0, offset_x: 0.0, offset_y: 100.0 });
    }

    #[test]
    fn test_width_limited_landscape_letterboxed() {
        let fitted = fit_image(Size::new(1200.0, 800.0), Size::new(600.0, 600.0)).unwrap();
        assert_eq!(fitted, DisplayBox { width: 600.0, height: 400.0, offset_x: 0.0, offset_y: 100.0 });
    }

    #[test]
    fn test_pillarboxed() {
        let fitted = fit_image(Size::new(300.0, 400.0), Size::new(1000.0, 800.0)).unwrap();
        assert_eq!(fitted, DisplayBox { width: 600.0, height: 800.0, offset_x: 200.0, offset_y: 0.0 });
    }

    #[test]
    fn test_zero_sizes_have_no_box() {
        assert!(fit_image(Size::new(0.0, 1600.0), Size::new(600.0, 1000.0)).is_none());
        assert!(fit_image(Size::new(1200.0, 1600.0), Size::new(600.0, 0.0)).is_none());
    }

    #[test]
    fn test_locate() {
        let fitted = DisplayBox { width: 600.0, height: 800.0, offset_x: 0.0, offset_y: 100.0 };
        let position = Position { x: Percent::clamped(50.0), y: Percent::clamped(25.0) };
        assert_eq!(fitted.locate(position), (300.0, 300.0));
    }

    #[test]
    fn test_aspect_class() {
        assert_eq!(AspectClass::of(Size::new(1200.0, 1600.0)), AspectClass::Standard);
        assert_eq!(AspectClass::of(Size::new(1210.0, 1600.0)), AspectClass::Standard);
        assert_eq!(AspectClass::of(Size::new(1600.0, 1200.0)), AspectClass::NonStandard);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Size::parse("1200x1600").unwrap(), Size::new(1200.0, 1600.0));
        assert!(Size::parse("wide").is_err());
    }
}
