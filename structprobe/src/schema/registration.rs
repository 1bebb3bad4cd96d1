//! Declarative schema registration
//!
//! [`record_schema!`](crate::record_schema) generates a [`Record`](crate::schema::Record)
//! implementation from a field listing, replacing the hand-written accessor plumbing
//! with per-field generated functions. Hand-written implementations remain fully
//! supported; the macro is registration ergonomics, nothing more.

/// Register a record type with the schema registry.
///
/// Each field is declared with a category, optionally prefixed with `readonly` to mark
/// it inaccessible to the engine, and terminated with a comma (including the last):
///
/// - `scalar name: Type,` - plain value, never traversed
/// - `opaque name: Type,` - author-declared non-traversable leaf (the type does not
///   need to implement `Record`)
/// - `optional name: Type,` - field stored as `Option<Type>`, `Type: Record + Default`
/// - `record name: Type,` - record stored in place, `Type: Record`
/// - `collection name: [scalar Type],` - field stored as `Vec<Type>`, `Type: Default`
/// - `collection name: [record Type],` - field stored as `Vec<Type>`, `Type: Record +
///   Default`
///
/// # Example
///
/// ```
/// use structprobe::record_schema;
///
/// #[derive(Default)]
/// struct Address {
///     street: String,
/// }
///
/// #[derive(Default)]
/// struct Customer {
///     name:    String,
///     address: Option<Address>,
/// }
///
/// record_schema!(Address {
///     scalar street: String,
/// });
///
/// record_schema!(Customer {
///     scalar name: String,
///     optional address: Address,
/// });
/// ```
#[macro_export]
macro_rules! record_schema {
    // ---- accessor generation ----------------------------------------------------

    (@accessors $ty:ty,) => {};

    (@accessors $ty:ty, scalar $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, opaque $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, optional $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::__paste! {
            fn [<__materialize_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                let parent = parent.downcast_mut::<$ty>()?;
                parent.$f = ::core::option::Option::Some(
                    <$t as ::core::default::Default>::default(),
                );
                parent
                    .$f
                    .as_mut()
                    .map(|target| target as &mut dyn $crate::schema::Record)
            }

            fn [<__get_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                parent
                    .downcast_mut::<$ty>()?
                    .$f
                    .as_mut()
                    .map(|target| target as &mut dyn $crate::schema::Record)
            }
        }
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, record $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::__paste! {
            fn [<__get_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                parent
                    .downcast_mut::<$ty>()
                    .map(|parent| &mut parent.$f as &mut dyn $crate::schema::Record)
            }
        }
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, collection $f:ident : [scalar $t:ty], $($rest:tt)*) => {
        $crate::__paste! {
            fn [<__materialize_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                let parent = parent.downcast_mut::<$ty>()?;
                parent.$f.push(<$t as ::core::default::Default>::default());
                ::core::option::Option::None
            }
        }
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, collection $f:ident : [record $t:ty], $($rest:tt)*) => {
        $crate::__paste! {
            fn [<__materialize_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                let parent = parent.downcast_mut::<$ty>()?;
                parent.$f.push(<$t as ::core::default::Default>::default());
                parent
                    .$f
                    .last_mut()
                    .map(|element| element as &mut dyn $crate::schema::Record)
            }

            fn [<__get_ $f>](
                parent: &mut dyn ::core::any::Any,
            ) -> ::core::option::Option<&mut dyn $crate::schema::Record> {
                parent
                    .downcast_mut::<$ty>()?
                    .$f
                    .last_mut()
                    .map(|element| element as &mut dyn $crate::schema::Record)
            }
        }
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly scalar $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly opaque $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly optional $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly record $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly collection $f:ident : [scalar $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    (@accessors $ty:ty, readonly collection $f:ident : [record $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@accessors $ty, $($rest)*);
    };

    // ---- descriptor accumulation ------------------------------------------------

    (@fields $ty:ty, [$($acc:expr,)*],) => {
        &[$($acc,)*]
    };

    (@fields $ty:ty, [$($acc:expr,)*], scalar $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Scalar(::core::stringify!($t)),
                mutable: true,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], opaque $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Opaque(::core::stringify!($t)),
                mutable: true,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], optional $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::__paste! {
                $crate::schema::FieldDescriptor {
                    name:    ::core::stringify!($f),
                    ty:      $crate::schema::FieldType::Optional(
                        <$t as $crate::schema::Record>::schema_of,
                    ),
                    mutable: true,
                    access:  $crate::schema::FieldAccess::new(
                        [<__materialize_ $f>],
                        [<__get_ $f>],
                    ),
                }
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], record $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::__paste! {
                $crate::schema::FieldDescriptor {
                    name:    ::core::stringify!($f),
                    ty:      $crate::schema::FieldType::Record(
                        <$t as $crate::schema::Record>::schema_of,
                    ),
                    // Storage already exists, so materialize is plain navigation.
                    mutable: true,
                    access:  $crate::schema::FieldAccess::new(
                        [<__get_ $f>],
                        [<__get_ $f>],
                    ),
                }
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], collection $f:ident : [scalar $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::__paste! {
                $crate::schema::FieldDescriptor {
                    name:    ::core::stringify!($f),
                    ty:      $crate::schema::FieldType::Collection(
                        $crate::schema::ElementType::Scalar(::core::stringify!($t)),
                    ),
                    mutable: true,
                    access:  $crate::schema::FieldAccess::append_leaf(
                        [<__materialize_ $f>],
                    ),
                }
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], collection $f:ident : [record $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::__paste! {
                $crate::schema::FieldDescriptor {
                    name:    ::core::stringify!($f),
                    ty:      $crate::schema::FieldType::Collection(
                        $crate::schema::ElementType::Record(
                            <$t as $crate::schema::Record>::schema_of,
                        ),
                    ),
                    mutable: true,
                    access:  $crate::schema::FieldAccess::new(
                        [<__materialize_ $f>],
                        [<__get_ $f>],
                    ),
                }
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly scalar $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Scalar(::core::stringify!($t)),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly opaque $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Opaque(::core::stringify!($t)),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly optional $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Optional(
                    <$t as $crate::schema::Record>::schema_of,
                ),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly record $f:ident : $t:ty, $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Record(
                    <$t as $crate::schema::Record>::schema_of,
                ),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly collection $f:ident : [scalar $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Collection(
                    $crate::schema::ElementType::Scalar(::core::stringify!($t)),
                ),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    (@fields $ty:ty, [$($acc:expr,)*], readonly collection $f:ident : [record $t:ty], $($rest:tt)*) => {
        $crate::record_schema!(@fields $ty, [$($acc,)*
            $crate::schema::FieldDescriptor {
                name:    ::core::stringify!($f),
                ty:      $crate::schema::FieldType::Collection(
                    $crate::schema::ElementType::Record(
                        <$t as $crate::schema::Record>::schema_of,
                    ),
                ),
                mutable: false,
                access:  $crate::schema::FieldAccess::leaf(),
            },
        ], $($rest)*)
    };

    // ---- entry point ------------------------------------------------------------

    ($ty:ty { $($fields:tt)* }) => {
        impl $crate::schema::Record for $ty {
            fn schema(&self) -> &'static $crate::schema::RecordSchema {
                <Self as $crate::schema::Record>::schema_of()
            }

            fn schema_of() -> &'static $crate::schema::RecordSchema {
                $crate::record_schema!(@accessors $ty, $($fields)*);

                static SCHEMA: $crate::schema::RecordSchema = $crate::schema::RecordSchema {
                    type_name: ::core::stringify!($ty),
                    fields:    $crate::record_schema!(@fields $ty, [], $($fields)*),
                };
                &SCHEMA
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    };
}
