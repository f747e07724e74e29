//! Compile-time accessor generation.

use crate::record::Record;

/// Types that wrap a [`Record`], for use with [`store_accessors!`](crate::store_accessors).
pub trait HasRecord {
    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;
}

impl HasRecord for Record {
    fn record(&self) -> &Record {
        self
    }

    fn record_mut(&mut self) -> &mut Record {
        self
    }
}

/// Generates inherent accessor methods on a [`HasRecord`] type.
///
/// For each listed accessor `x` this defines `x`, `set_x`, `is_x`,
/// `x_changed`, `x_change`, `x_was`, `restore_x`, `saved_change_to_x_p`,
/// `saved_change_to_x`, and `x_before_last_save`, all delegating to the
/// matching [`Record`] method by accessor name.
///
/// ```
/// use typed_store::{AttributeOptions, HasRecord, ModelClass, Record, StoreCoder, store_accessors};
///
/// struct User(Record);
///
/// impl HasRecord for User {
///     fn record(&self) -> &Record { &self.0 }
///     fn record_mut(&mut self) -> &mut Record { &mut self.0 }
/// }
///
/// store_accessors!(User { age, active });
///
/// # fn main() -> typed_store::Result<()> {
/// let class = ModelClass::builder("User")
///     .store("settings", StoreCoder::Json)
///     .store_attribute("settings", "age", "integer", AttributeOptions::new())?
///     .store_attribute("settings", "active", "boolean", AttributeOptions::new())?
///     .build()?;
///
/// let mut user = User(Record::new(&class)?);
/// user.set_age("21")?;
/// user.set_active("t")?;
/// assert_eq!(user.age()?, typed_store::Value::Integer(21));
/// assert!(user.is_active()?);
/// assert!(user.age_changed()?);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! store_accessors {
    ($owner:ty { $($accessor:ident),+ $(,)? }) => {
        $crate::paste::paste! {
            impl $owner {
                $(
                    pub fn $accessor(&self) -> $crate::Result<$crate::Value> {
                        $crate::HasRecord::record(self).get(stringify!($accessor))
                    }

                    pub fn [<set_ $accessor>](
                        &mut self,
                        value: impl Into<$crate::Value>,
                    ) -> $crate::Result<()> {
                        $crate::HasRecord::record_mut(self).set(stringify!($accessor), value)
                    }

                    pub fn [<is_ $accessor>](&self) -> $crate::Result<bool> {
                        $crate::HasRecord::record(self).is(stringify!($accessor))
                    }

                    pub fn [<$accessor _changed>](&self) -> $crate::Result<bool> {
                        $crate::HasRecord::record(self).key_changed(stringify!($accessor))
                    }

                    pub fn [<$accessor _change>](
                        &self,
                    ) -> $crate::Result<Option<$crate::ChangeRecord>> {
                        $crate::HasRecord::record(self).key_change(stringify!($accessor))
                    }

                    pub fn [<$accessor _was>](&self) -> $crate::Result<$crate::Value> {
                        $crate::HasRecord::record(self).key_was(stringify!($accessor))
                    }

                    pub fn [<restore_ $accessor>](&mut self) -> $crate::Result<()> {
                        $crate::HasRecord::record_mut(self).restore_key(stringify!($accessor))
                    }

                    pub fn [<saved_change_to_ $accessor _p>](&self) -> $crate::Result<bool> {
                        $crate::HasRecord::record(self).saved_change_to_key(stringify!($accessor))
                    }

                    pub fn [<saved_change_to_ $accessor>](
                        &self,
                    ) -> $crate::Result<Option<$crate::ChangeRecord>> {
                        $crate::HasRecord::record(self).saved_change_to(stringify!($accessor))
                    }

                    pub fn [<$accessor _before_last_save>](&self) -> $crate::Result<$crate::Value> {
                        $crate::HasRecord::record(self).before_last_save(stringify!($accessor))
                    }
                )+
            }
        }
    };
}
