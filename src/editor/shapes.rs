use std::{fmt, str::FromStr};

use crate::{
    config::ShapeDefaults,
    foundation::core::{BezPath, parse_number},
    foundation::error::{CoverError, CoverResult},
};

/// Session-unique shape identifier. Never reused after a delete.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Circle,
    #[serde(alias = "rect")]
    Rectangle,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Circle {
        radius: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
}

impl ShapeKind {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Circle { .. } => ShapeType::Circle,
            Self::Rectangle { .. } => ShapeType::Rectangle,
        }
    }

    fn validate(&self) -> CoverResult<()> {
        let dims = match *self {
            Self::Circle { radius } => vec![("radius", radius)],
            Self::Rectangle {
                width,
                height,
                corner_radius,
            } => vec![
                ("width", width),
                ("height", height),
                ("corner_radius", corner_radius),
            ],
        };
        for (name, v) in dims {
            if !v.is_finite() || v < 0.0 {
                return Err(CoverError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        use kurbo::Shape as _;

        match self.kind {
            ShapeKind::Circle { radius } => {
                kurbo::Circle::new((self.x, self.y), radius).to_path(tolerance)
            }
            ShapeKind::Rectangle {
                width,
                height,
                corner_radius,
            } => {
                let r = corner_radius.min(width.min(height) / 2.0).max(0.0);
                kurbo::RoundedRect::new(self.x, self.y, self.x + width, self.y + height, r)
                    .to_path(tolerance)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeField {
    #[serde(alias = "left")]
    X,
    #[serde(alias = "top")]
    Y,
    Radius,
    Width,
    Height,
    #[serde(alias = "cornerRadius")]
    CornerRadius,
}

impl FromStr for ShapeField {
    type Err = CoverError;

    fn from_str(s: &str) -> CoverResult<Self> {
        match s {
            "x" | "left" => Ok(Self::X),
            "y" | "top" => Ok(Self::Y),
            "radius" => Ok(Self::Radius),
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            "cornerRadius" | "corner_radius" => Ok(Self::CornerRadius),
            other => Err(CoverError::validation(format!(
                "unknown shape field '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ShapeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Radius => "radius",
            Self::Width => "width",
            Self::Height => "height",
            Self::CornerRadius => "cornerRadius",
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ShapeList {
    shapes: Vec<Shape>,
    next_id: u64,
    selected: Option<ShapeId>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ty: ShapeType, defaults: &ShapeDefaults) -> ShapeId {
        let kind = match ty {
            ShapeType::Circle => ShapeKind::Circle {
                radius: defaults.circle_radius,
            },
            ShapeType::Rectangle => ShapeKind::Rectangle {
                width: defaults.rect_width,
                height: defaults.rect_height,
                corner_radius: defaults.rect_corner_radius,
            },
        };
        self.push(defaults.x, defaults.y, kind)
    }

    pub fn add_with(&mut self, x: f64, y: f64, kind: ShapeKind) -> CoverResult<ShapeId> {
        if !x.is_finite() || !y.is_finite() {
            return Err(CoverError::validation("shape position must be finite"));
        }
        kind.validate()?;
        Ok(self.push(x, y, kind))
    }

    fn push(&mut self, x: f64, y: f64, kind: ShapeKind) -> ShapeId {
        self.next_id += 1;
        let id = ShapeId(self.next_id);
        self.shapes.push(Shape { id, x, y, kind });
        self.selected = Some(id);
        tracing::debug!(%id, ty = ?kind.shape_type(), "shape added");
        id
    }

    /// Parse `raw` and write it to `field` of shape `id`.
    ///
    /// Returns `Ok(false)` when no shape has that id. Invalid input is
    /// rejected and the shape is left as it was.
    pub fn update(&mut self, id: ShapeId, field: ShapeField, raw: &str) -> CoverResult<bool> {
        let Some(shape) = self.shapes.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        let v = parse_number(&field.to_string(), raw)?;
        let mut next = *shape;
        match (field, &mut next.kind) {
            (ShapeField::X, _) => next.x = v,
            (ShapeField::Y, _) => next.y = v,
            (ShapeField::Radius, ShapeKind::Circle { radius }) => *radius = v,
            (ShapeField::Width, ShapeKind::Rectangle { width, .. }) => *width = v,
            (ShapeField::Height, ShapeKind::Rectangle { height, .. }) => *height = v,
            (ShapeField::CornerRadius, ShapeKind::Rectangle { corner_radius, .. }) => {
                *corner_radius = v;
            }
            (field, kind) => {
                return Err(CoverError::validation(format!(
                    "field '{field}' does not apply to a {:?}",
                    kind.shape_type()
                )));
            }
        }
        next.kind.validate()?;
        *shape = next;
        tracing::debug!(%id, %field, value = v, "shape updated");
        Ok(true)
    }

    /// Remove shape `id`. The selection is cleared regardless of which shape
    /// was selected.
    pub fn remove(&mut self, id: ShapeId) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|s| s.id != id);
        self.selected = None;
        let removed = self.shapes.len() != before;
        if removed {
            tracing::debug!(%id, "shape removed");
        }
        removed
    }

    pub fn select(&mut self, id: Option<ShapeId>) -> bool {
        match id {
            Some(id) if self.get(id).is_none() => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn as_slice(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ShapeDefaults {
        ShapeDefaults::default()
    }

    #[test]
    fn add_uses_defaults_and_selects() {
        let mut list = ShapeList::new();
        let c = list.add(ShapeType::Circle, &defaults());
        let r = list.add(ShapeType::Rectangle, &defaults());

        assert_eq!(list.selected(), Some(r));
        let circle = list.get(c).unwrap();
        assert_eq!((circle.x, circle.y), (50.0, 50.0));
        assert_eq!(circle.kind, ShapeKind::Circle { radius: 50.0 });
        assert_eq!(
            list.get(r).unwrap().kind,
            ShapeKind::Rectangle {
                width: 100.0,
                height: 100.0,
                corner_radius: 20.0
            }
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut list = ShapeList::new();
        let a = list.add(ShapeType::Circle, &defaults());
        let b = list.add(ShapeType::Circle, &defaults());
        assert!(list.remove(a));
        let c = list.add(ShapeType::Circle, &defaults());
        assert_ne!(c, b);
        assert_ne!(c, a);
        assert!(c > b);
    }

    #[test]
    fn add_n_then_remove_all_is_empty() {
        let mut list = ShapeList::new();
        let ids: Vec<_> = (0..7)
            .map(|i| {
                let ty = if i % 2 == 0 {
                    ShapeType::Circle
                } else {
                    ShapeType::Rectangle
                };
                list.add(ty, &defaults())
            })
            .collect();
        assert_eq!(list.len(), 7);
        for id in ids {
            assert!(list.remove(id));
        }
        assert!(list.is_empty());
        assert_eq!(list.selected(), None);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut list = ShapeList::new();
        list.add(ShapeType::Circle, &defaults());
        let before = list.as_slice().to_vec();
        assert!(!list.update(ShapeId(99), ShapeField::X, "10").unwrap());
        assert_eq!(list.as_slice(), before.as_slice());
    }

    #[test]
    fn update_parses_and_replaces_field() {
        let mut list = ShapeList::new();
        let id = list.add(ShapeType::Rectangle, &defaults());
        assert!(list.update(id, ShapeField::Width, "150.5").unwrap());
        assert!(list.update(id, ShapeField::X, "-12").unwrap());
        let s = list.get(id).unwrap();
        assert_eq!(s.x, -12.0);
        let ShapeKind::Rectangle { width, .. } = s.kind else {
            panic!("expected rectangle");
        };
        assert_eq!(width, 150.5);
    }

    #[test]
    fn update_rejects_garbage_and_keeps_shape() {
        let mut list = ShapeList::new();
        let id = list.add(ShapeType::Circle, &defaults());
        let before = *list.get(id).unwrap();

        assert!(list.update(id, ShapeField::Radius, "abc").is_err());
        assert!(list.update(id, ShapeField::Radius, "-5").is_err());
        assert!(list.update(id, ShapeField::Width, "10").is_err());
        assert_eq!(*list.get(id).unwrap(), before);
    }

    #[test]
    fn remove_clears_selection_even_for_other_shape() {
        let mut list = ShapeList::new();
        let a = list.add(ShapeType::Circle, &defaults());
        let b = list.add(ShapeType::Circle, &defaults());
        assert_eq!(list.selected(), Some(b));
        list.remove(a);
        assert_eq!(list.selected(), None);
        assert!(!list.remove(ShapeId(1234)));
    }

    #[test]
    fn select_requires_existing_shape() {
        let mut list = ShapeList::new();
        let a = list.add(ShapeType::Circle, &defaults());
        assert!(list.select(None));
        assert!(!list.select(Some(ShapeId(77))));
        assert!(list.select(Some(a)));
        assert_eq!(list.selected(), Some(a));
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("cornerRadius".parse::<ShapeField>().unwrap(), ShapeField::CornerRadius);
        assert_eq!("corner_radius".parse::<ShapeField>().unwrap(), ShapeField::CornerRadius);
        assert_eq!("left".parse::<ShapeField>().unwrap(), ShapeField::X);
        assert!("depth".parse::<ShapeField>().is_err());
    }

    #[test]
    fn field_names_deserialize_like_they_parse() {
        let names = [
            "x",
            "left",
            "y",
            "top",
            "radius",
            "width",
            "height",
            "cornerRadius",
            "corner_radius",
        ];
        for name in names {
            let from_json: ShapeField = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(from_json, name.parse::<ShapeField>().unwrap(), "{name}");
        }
    }

    #[test]
    fn rounded_rect_corner_radius_is_capped() {
        let s = Shape {
            id: ShapeId(1),
            x: 0.0,
            y: 0.0,
            kind: ShapeKind::Rectangle {
                width: 10.0,
                height: 40.0,
                corner_radius: 100.0,
            },
        };
        let bbox = kurbo::Shape::bounding_box(&s.to_path(0.1));
        assert!((bbox.width() - 10.0).abs() < 1e-6, "{bbox:?}");
        assert!((bbox.height() - 40.0).abs() < 1e-6, "{bbox:?}");
    }

    #[test]
    fn shape_json_is_flat_and_tagged() {
        let s = Shape {
            id: ShapeId(3),
            x: 1.0,
            y: 2.0,
            kind: ShapeKind::Circle { radius: 4.0 },
        };
        let v = serde_json::to_value(s).unwrap();
        assert_eq!(v["type"], "circle");
        assert_eq!(v["radius"], 4.0);
        assert_eq!(v["id"], 3);
        let back: Shape = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }
}
