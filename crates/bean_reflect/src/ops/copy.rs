use crate::error::BeanResult;
use crate::{Bean, BeanEngine};

impl BeanEngine {
    /// Copies every nested field of `source` into `destination`.
    ///
    /// Values are cloned, not converted. Returns `false`, copying nothing,
    /// if the two beans are of different types.
    pub fn shallow_copy(&self, destination: &mut dyn Bean, source: &dyn Bean) -> BeanResult<bool> {
        if destination.bean_ref() != source.bean_ref() {
            return Ok(false);
        }

        let names = self.nested_field_names(source.bean_shape())?;
        self.copy_paths(destination, source, names.iter().map(|name| name.as_str()))?;
        Ok(true)
    }

    /// Copies the nested fields named in `fields` from `source` into
    /// `destination`.
    ///
    /// Returns `false`, copying nothing, if the two beans are of different
    /// types.
    pub fn shallow_copy_fields(
        &self,
        destination: &mut dyn Bean,
        source: &dyn Bean,
        fields: &[&str],
    ) -> BeanResult<bool> {
        if destination.bean_ref() != source.bean_ref() {
            return Ok(false);
        }

        self.copy_paths(destination, source, fields.iter().copied())?;
        Ok(true)
    }

    fn copy_paths<'p>(
        &self,
        destination: &mut dyn Bean,
        source: &dyn Bean,
        paths: impl Iterator<Item = &'p str>,
    ) -> BeanResult<()> {
        for path in paths {
            let value = self.get_nested(source, path)?;
            self.set_nested(destination, path, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::info::{ShapeBuilder, ShapeCell, TypeShape};
    use crate::{BeanEngine, Typed};
    use alloc::string::String;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Place {
        city: String,
    }

    impl Typed for Place {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("city", |p| &p.city, |p| &mut p.city)
                    .constructible()
                    .build()
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Visit {
        guest: String,
        place: Option<Place>,
        nights: i32,
    }

    impl Typed for Visit {
        fn type_shape() -> &'static TypeShape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                ShapeBuilder::<Self>::new()
                    .property("guest", |v| &v.guest, |v| &mut v.guest)
                    .property("place", |v| &v.place, |v| &mut v.place)
                    .property("nights", |v| &v.nights, |v| &mut v.nights)
                    .constructible()
                    .build()
            })
        }
    }

    fn visit() -> Visit {
        Visit {
            guest: "Ada".into(),
            place: Some(Place { city: "Lagos".into() }),
            nights: 3,
        }
    }

    #[test]
    fn copies_everything() {
        let engine = BeanEngine::new();
        let source = visit();
        let mut copy = Visit::default();
        assert!(engine.shallow_copy(&mut copy, &source).unwrap());
        assert_eq!(copy, source);
    }

    #[test]
    fn copies_named_fields() {
        let engine = BeanEngine::new();
        let source = visit();
        let mut copy = Visit {
            place: Some(Place::default()),
            ..Default::default()
        };
        assert!(engine.shallow_copy_fields(&mut copy, &source, &["place.city", "nights"]).unwrap());
        assert_eq!(copy.guest, "");
        assert_eq!(copy.place.as_ref().map(|p| p.city.as_str()), Some("Lagos"));
        assert_eq!(copy.nights, 3);
    }

    #[test]
    fn refuses_other_types() {
        let engine = BeanEngine::new();
        let mut place = Place::default();
        assert!(!engine.shallow_copy(&mut place, &visit()).unwrap());
        assert_eq!(place, Place::default());
    }
}
