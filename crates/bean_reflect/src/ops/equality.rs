use core::hash::{BuildHasher, Hash, Hasher};

use bean_utils::hash::FixedHashState;

use crate::error::BeanResult;
use crate::metadata::PropertyDescriptor;
use crate::value::Value;
use crate::{Bean, BeanEngine};

const PRIME: u64 = 31;

#[inline]
fn compared<'d>(desc: &'d PropertyDescriptor, ignore: &[&str]) -> Option<&'d PropertyDescriptor> {
    (desc.has_reader() && !ignore.contains(&desc.name())).then_some(desc)
}

impl BeanEngine {
    /// Compares two beans property by property.
    ///
    /// Beans of different types are never equal. Every readable property not
    /// named in `ignore` must read equal on both sides.
    ///
    /// ```
    /// # use bean_reflect::{BeanEngine, Typed};
    /// # use bean_reflect::info::{ShapeBuilder, ShapeCell, TypeShape};
    /// # #[derive(Debug, Clone, PartialEq, Default)]
    /// # struct Item { code: String, version: i32 }
    /// # impl Typed for Item {
    /// #     fn type_shape() -> &'static TypeShape {
    /// #         static CELL: ShapeCell = ShapeCell::new();
    /// #         CELL.get_or_init(|| ShapeBuilder::<Self>::new()
    /// #             .property("code", |i| &i.code, |i| &mut i.code)
    /// #             .property("version", |i| &i.version, |i| &mut i.version)
    /// #             .build())
    /// #     }
    /// # }
    /// let engine = BeanEngine::new();
    /// let a = Item { code: "A1".into(), version: 1 };
    /// let b = Item { code: "A1".into(), version: 2 };
    ///
    /// assert!(!engine.bean_equals(&a, &b, &[]).unwrap());
    /// assert!(engine.bean_equals(&a, &b, &["version"]).unwrap());
    /// ```
    pub fn bean_equals(&self, a: &dyn Bean, b: &dyn Bean, ignore: &[&str]) -> BeanResult<bool> {
        if a.bean_ref() != b.bean_ref() {
            return Ok(false);
        }

        let table = self.metadata(a.bean_shape())?;
        for desc in table.iter().filter_map(|d| compared(d, ignore)) {
            if desc.read(a)? != desc.read(b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Hashes the readable properties of `bean` not named in `ignore`, in
    /// property-name order.
    ///
    /// Beans that are [`bean_equals`](Self::bean_equals) with the same
    /// `ignore` list hash the same, in every process.
    pub fn bean_hash(&self, bean: &dyn Bean, ignore: &[&str]) -> BeanResult<u64> {
        let table = self.metadata(bean.bean_shape())?;
        let mut result: u64 = 1;
        for desc in table.iter().filter_map(|d| compared(d, ignore)) {
            let value = desc.read(bean)?;
            let hash = match value {
                Value::Null => 0,
                value => self.value_hash(&value)?,
            };
            result = result.wrapping_mul(PRIME).wrapping_add(hash);
        }
        Ok(result)
    }

    fn value_hash(&self, value: &Value) -> BeanResult<u64> {
        let mut hasher = FixedHashState.build_hasher();
        self.feed(value, &mut hasher)?;
        Ok(hasher.finish())
    }

    fn feed<H: Hasher>(&self, value: &Value, state: &mut H) -> BeanResult<()> {
        core::mem::discriminant(value).hash(state);
        match value {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::Char(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            // `-0.0 == 0.0`, so both hash as `0.0`.
            Value::F32(v) => (v + 0.0).to_bits().hash(state),
            Value::F64(v) => (v + 0.0).to_bits().hash(state),
            Value::Decimal(v) => v.normalize().hash(state),
            Value::Date(v) => v.hash(state),
            Value::String(v) => v.hash(state),
            Value::Enum(v) => v.hash(state),
            Value::Array(_, items) | Value::Collection(_, items) => {
                items.len().hash(state);
                for item in items {
                    self.feed(item, state)?;
                }
            }
            Value::Map(entries) => {
                entries.len().hash(state);
                for (key, item) in entries {
                    key.hash(state);
                    self.feed(item, state)?;
                }
            }
            Value::Bean(bean) => self.bean_hash(&**bean, &[])?.hash(state),
        }
        Ok(())
    }
}
