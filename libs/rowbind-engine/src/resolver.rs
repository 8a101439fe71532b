//! Constructor resolution: picking the one constructor of a result type
//! that fits a row shape, then binding row values to its parameters.
//!
//! Selection order:
//!
//! 1. the constructor marked `automap` (two or more marked is ambiguous);
//! 2. the only constructor, when the type has exactly one;
//! 3. the single constructor whose parameters accept the row's columns.
//!
//! Selection runs once per result set against the `Schema`. A `NULL` never
//! fits a non-nullable parameter, so when several constructors fit the shape
//! and differ in which columns they take as `NULL`, each row's `NULL`s pick
//! between them.

use std::fmt;

use rowbind_api::descriptor::{ConstructorDescriptor, TypeDescriptor};
use rowbind_api::error::MappingError;
use rowbind_api::schema::Schema;
use rowbind_api::value::Row;

/// Knobs of the selection and binding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Bind parameters to columns by name instead of position.
    pub arg_name_based: bool,
    /// In name-based binding, ignore underscores (`a_byte` matches `aByte`).
    pub underscore_to_camel_case: bool,
    /// Let parameters accept narrower numeric columns (lossless only).
    pub numeric_widening: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            arg_name_based: false,
            underscore_to_camel_case: false,
            numeric_widening: true,
        }
    }
}

/// Which selection rule picked the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    Automap,
    SingleConstructor,
    Signature,
}

impl fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionRule::Automap => f.write_str("automap"),
            SelectionRule::SingleConstructor => f.write_str("single constructor"),
            SelectionRule::Signature => f.write_str("signature"),
        }
    }
}

/// Stateless constructor resolver. Cheap to copy, safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructorResolver {
    options: ResolverOptions,
}

#[derive(Debug, Clone)]
struct Binding {
    column: usize,
    column_name: String,
}

/// A constructor that fits the row shape, with its binding plan.
struct Candidate<'d, T> {
    constructor: &'d ConstructorDescriptor<T>,
    bindings: Vec<Binding>,
}

/// The constructors chosen for one row shape.
///
/// Usually a single constructor. When several fit the shape and only
/// differ in which columns they accept as NULL, the pick is made per row.
pub struct ResolvedConstructor<'d, T> {
    type_name: &'d str,
    candidates: Vec<Candidate<'d, T>>,
    rule: SelectionRule,
    width: usize,
}

impl ConstructorResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Resolve and construct a single row.
    pub fn resolve<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        schema: &Schema,
        row: &Row,
    ) -> Result<T, MappingError> {
        self.select(descriptor, schema)?.construct(row)
    }

    /// Choose the constructor for rows of `schema`.
    pub fn select<'d, T>(
        &self,
        descriptor: &'d TypeDescriptor<T>,
        schema: &Schema,
    ) -> Result<ResolvedConstructor<'d, T>, MappingError> {
        let (rule, candidates) = self
            .select_constructor(descriptor, schema)
            .map_err(|e| e.with_context(descriptor.type_name()))?;

        tracing::debug!(
            type_name = descriptor.type_name(),
            constructors = %join(candidates.iter().map(|c| c.constructor)),
            rule = %rule,
            "selected constructor"
        );

        Ok(ResolvedConstructor {
            type_name: descriptor.type_name(),
            candidates,
            rule,
            width: schema.len(),
        })
    }

    fn select_constructor<'d, T>(
        &self,
        descriptor: &'d TypeDescriptor<T>,
        schema: &Schema,
    ) -> Result<(SelectionRule, Vec<Candidate<'d, T>>), MappingError> {
        let constructors = descriptor.constructors();

        let annotated: Vec<_> = constructors.iter().filter(|c| c.is_automap()).collect();
        match annotated.as_slice() {
            [] => {}
            [only] => {
                let only = *only;
                let candidate = self.candidate(only, schema)?;
                return Ok((SelectionRule::Automap, vec![candidate]));
            }
            many => {
                return Err(MappingError::ambiguous(format!(
                    "{} constructors are marked automap: {}",
                    many.len(),
                    join(many.iter().copied())
                )));
            }
        }

        match constructors {
            [] => Err(MappingError::no_match("type declares no constructors")),
            [only] => {
                let candidate = self.candidate(only, schema)?;
                Ok((SelectionRule::SingleConstructor, vec![candidate]))
            }
            _ => {
                let mut compatible = Vec::new();
                for constructor in constructors {
                    match self.candidate(constructor, schema) {
                        Ok(candidate) => compatible.push(candidate),
                        Err(e) => tracing::trace!(reason = %e, "constructor rejected"),
                    }
                }

                if compatible.is_empty() {
                    return Err(MappingError::no_match(format!(
                        "none of {} constructors accepts {schema}",
                        constructors.len()
                    )));
                }
                if compatible.len() > 1 && !separable_by_nulls(&compatible, schema) {
                    return Err(MappingError::ambiguous(format!(
                        "{} constructors accept {schema}: {}",
                        compatible.len(),
                        join(compatible.iter().map(|c| c.constructor))
                    )));
                }
                Ok((SelectionRule::Signature, compatible))
            }
        }
    }

    fn candidate<'d, T>(
        &self,
        constructor: &'d ConstructorDescriptor<T>,
        schema: &Schema,
    ) -> Result<Candidate<'d, T>, MappingError> {
        Ok(Candidate {
            constructor,
            bindings: self.plan(constructor, schema)?,
        })
    }

    /// Binding plan: the column feeding each parameter, type-checked.
    fn plan<T>(
        &self,
        constructor: &ConstructorDescriptor<T>,
        schema: &Schema,
    ) -> Result<Vec<Binding>, MappingError> {
        let columns = if self.options.arg_name_based {
            self.plan_by_name(constructor, schema)?
        } else {
            plan_by_position(constructor, schema)?
        };

        let mut bindings: Vec<Binding> = Vec::with_capacity(columns.len());
        for (param, index) in constructor.params().iter().zip(columns) {
            let column = &schema.columns[index];
            if bindings.iter().any(|b| b.column == index) {
                return Err(MappingError::no_match(format!(
                    "{constructor}: column {} is bound to more than one parameter",
                    column.name
                )));
            }
            let column_kind = column.column_type.scalar_kind();
            if !param
                .param_type
                .kind
                .accepts(column_kind, self.options.numeric_widening)
            {
                return Err(MappingError::no_match(format!(
                    "{constructor}: parameter `{param}` cannot take column {} {}",
                    column.name, column.column_type
                )));
            }
            bindings.push(Binding {
                column: index,
                column_name: column.name.clone(),
            });
        }
        Ok(bindings)
    }

    fn plan_by_name<T>(
        &self,
        constructor: &ConstructorDescriptor<T>,
        schema: &Schema,
    ) -> Result<Vec<usize>, MappingError> {
        constructor
            .params()
            .iter()
            .map(|param| {
                let name = param.binding_name().ok_or_else(|| {
                    MappingError::no_match(format!(
                        "{constructor}: unnamed parameter cannot be bound by name"
                    ))
                })?;
                self.find_column(schema, name).ok_or_else(|| {
                    MappingError::no_match(format!("{constructor}: no column named '{name}'"))
                })
            })
            .collect()
    }

    fn find_column(&self, schema: &Schema, name: &str) -> Option<usize> {
        if let Some(index) = schema.index_of(name) {
            return Some(index);
        }
        if !self.options.underscore_to_camel_case {
            return None;
        }
        let wanted = strip_underscores(name);
        schema
            .columns
            .iter()
            .position(|c| strip_underscores(&c.name).eq_ignore_ascii_case(&wanted))
    }
}

fn plan_by_position<T>(
    constructor: &ConstructorDescriptor<T>,
    schema: &Schema,
) -> Result<Vec<usize>, MappingError> {
    if constructor.arity() != schema.len() {
        return Err(MappingError::no_match(format!(
            "{constructor} takes {} arguments, row has {} columns",
            constructor.arity(),
            schema.len()
        )));
    }
    constructor
        .params()
        .iter()
        .enumerate()
        .map(|(position, param)| match &param.column {
            Some(column) => schema.index_of(column).ok_or_else(|| {
                MappingError::no_match(format!(
                    "{constructor}: mapped column '{column}' is not in the row"
                ))
            }),
            None => Ok(position),
        })
        .collect()
}

/// Whether some set of NULLs in nullable columns leaves exactly one
/// candidate standing. If not, no row can ever pick between them.
fn separable_by_nulls<T>(candidates: &[Candidate<'_, T>], schema: &Schema) -> bool {
    candidates.iter().enumerate().any(|(i, survivor)| {
        let kept: Vec<usize> = survivor.required_columns().collect();
        candidates
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .all(|(_, other)| {
                other
                    .required_columns()
                    .any(|col| schema.columns[col].nullable && !kept.contains(&col))
            })
    })
}

fn strip_underscores(name: &str) -> String {
    name.chars().filter(|c| *c != '_').collect()
}

fn join<'a, T: 'a>(constructors: impl Iterator<Item = &'a ConstructorDescriptor<T>>) -> String {
    constructors
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<T> Candidate<'_, T> {
    /// Columns bound to non-nullable parameters.
    fn required_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.constructor
            .params()
            .iter()
            .zip(&self.bindings)
            .filter(|(param, _)| !param.param_type.nullable)
            .map(|(_, binding)| binding.column)
    }

    fn accepts_nulls_of(&self, row: &Row) -> bool {
        self.required_columns().all(|col| !row.0[col].is_null())
    }

    /// Every value is checked before the constructor runs, so a failure
    /// never leaves a half-built object behind.
    fn bind(&self, type_name: &str, row: &Row) -> Result<T, MappingError> {
        let ctx = format!("{type_name}::{}", self.constructor.name());

        let mut args = Vec::with_capacity(self.bindings.len());
        for (param, binding) in self.constructor.params().iter().zip(&self.bindings) {
            let value = &row.0[binding.column];
            if value.is_null() && !param.param_type.nullable {
                return Err(MappingError::null_to_primitive(format!(
                    "column '{}' is NULL but parameter `{param}` is not nullable",
                    binding.column_name
                ))
                .with_context(ctx));
            }
            args.push(value.clone());
        }

        self.constructor.invoke(args).map_err(|e| e.with_context(ctx))
    }
}

impl<'d, T> ResolvedConstructor<'d, T> {
    /// The constructor, when the row shape alone decides it.
    pub fn constructor(&self) -> Option<&'d ConstructorDescriptor<T>> {
        match self.candidates.as_slice() {
            [only] => Some(only.constructor),
            _ => None,
        }
    }

    /// Every constructor still in the running for rows of this shape.
    pub fn constructors(&self) -> impl Iterator<Item = &'d ConstructorDescriptor<T>> + '_ {
        self.candidates.iter().map(|c| c.constructor)
    }

    pub fn rule(&self) -> SelectionRule {
        self.rule
    }

    /// Column index feeding each parameter of the decided constructor.
    pub fn column_indices(&self) -> Option<Vec<usize>> {
        match self.candidates.as_slice() {
            [only] => Some(only.bindings.iter().map(|b| b.column).collect()),
            _ => None,
        }
    }

    /// Build one instance from `row`.
    pub fn construct(&self, row: &Row) -> Result<T, MappingError> {
        if row.len() != self.width {
            return Err(MappingError::conversion(format!(
                "row has {} values, schema has {} columns",
                row.len(),
                self.width
            ))
            .with_context(self.type_name));
        }

        match self.candidates.as_slice() {
            [only] => only.bind(self.type_name, row),
            candidates => self.pick(candidates, row)?.bind(self.type_name, row),
        }
    }

    /// Drop the candidates that cannot take this row's NULLs.
    fn pick<'a>(
        &self,
        candidates: &'a [Candidate<'d, T>],
        row: &Row,
    ) -> Result<&'a Candidate<'d, T>, MappingError> {
        let fits: Vec<&Candidate<'d, T>> =
            candidates.iter().filter(|c| c.accepts_nulls_of(row)).collect();
        match fits.as_slice() {
            [only] => {
                tracing::trace!(
                    type_name = self.type_name,
                    constructor = %only.constructor,
                    "picked constructor for row"
                );
                Ok(*only)
            }
            [] => Err(MappingError::no_match(format!(
                "no constructor takes the NULL values of this row: {}",
                join(candidates.iter().map(|c| c.constructor))
            ))
            .with_context(self.type_name)),
            many => Err(MappingError::ambiguous(format!(
                "{} constructors accept this row: {}",
                many.len(),
                join(many.iter().map(|c| c.constructor))
            ))
            .with_context(self.type_name)),
        }
    }
}

impl<T> fmt::Debug for ResolvedConstructor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConstructor")
            .field("type_name", &self.type_name)
            .field("constructors", &join(self.constructors()))
            .field("rule", &self.rule)
            .field("columns", &self.column_indices())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rowbind_api::descriptor::{ParamDescriptor, ParamType};
    use rowbind_api::error::MappingErrorKind;
    use rowbind_api::schema::{Column, ColumnType};
    use rowbind_api::value::Value;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: i32,
        name: Option<String>,
        age: i32,
    }

    fn person(id: i32, name: Option<String>, age: i32) -> Person {
        Person { id, name, age }
    }

    fn person_ctor(name: &str, params: Vec<ParamDescriptor>) -> ConstructorDescriptor<Person> {
        ConstructorDescriptor::new(name, params, |mut args| {
            Ok(person(args.next()?, args.next()?, args.next()?))
        })
    }

    fn id_only() -> TypeDescriptor<Person> {
        TypeDescriptor::builder("Person")
            .constructor(ConstructorDescriptor::new(
                "with_id",
                vec![ParamDescriptor::of::<i32>("id")],
                |mut args| Ok(person(args.next()?, None, 0)),
            ))
            .build()
    }

    fn person_schema() -> Schema {
        Schema::new(vec![
            Column::new("id", ColumnType::Integer).not_null(),
            Column::new("name", ColumnType::Varchar),
            Column::new("age", ColumnType::Integer),
        ])
    }

    #[test]
    fn single_constructor_binds_in_order() {
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let row = Row(vec![Value::Int32(1)]);
        let p = ConstructorResolver::default()
            .resolve(&id_only(), &schema, &row)
            .unwrap();
        assert_eq!(p.id, 1);
    }

    #[test]
    fn null_into_primitive_slot_fails_without_constructing() {
        let desc = TypeDescriptor::builder("Person")
            .constructor(person_ctor(
                "new",
                vec![
                    ParamDescriptor::of::<i32>("id"),
                    ParamDescriptor::of::<Option<String>>("name"),
                    ParamDescriptor::of::<i32>("age"),
                ],
            ))
            .constructor(ConstructorDescriptor::new(
                "with_id",
                vec![ParamDescriptor::of::<i32>("id")],
                |mut args| Ok(person(args.next()?, None, 0)),
            ))
            .build();
        let row = Row(vec![Value::Int32(1), Value::Null, Value::Null]);
        let err = ConstructorResolver::default()
            .resolve(&desc, &person_schema(), &row)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::NullToPrimitiveParameter);
        assert!(err.message.contains("'age'"), "{err}");
    }

    #[test]
    fn automap_wins_over_signature_match() {
        let params = || {
            vec![
                ParamDescriptor::of::<i32>("id"),
                ParamDescriptor::of::<Option<String>>("name"),
                ParamDescriptor::of::<i32>("age"),
            ]
        };
        let desc = TypeDescriptor::builder("Person")
            .constructor(person_ctor("first", params()))
            .constructor(
                ConstructorDescriptor::new("second", params(), |mut args| {
                    let id: i32 = args.next()?;
                    let name = args.next()?;
                    let age: i32 = args.next()?;
                    Ok(person(id * 10, name, age))
                })
                .automap(),
            )
            .build();
        let row = Row(vec![Value::Int32(2), Value::String("b".into()), Value::Int32(30)]);
        let resolver = ConstructorResolver::default();
        let selected = resolver.select(&desc, &person_schema()).unwrap();
        assert_eq!(selected.rule(), SelectionRule::Automap);
        assert_eq!(selected.constructor().map(|c| c.name()), Some("second"));
        assert_eq!(selected.construct(&row).unwrap(), person(20, Some("b".into()), 30));
    }

    #[test]
    fn two_automap_constructors_are_ambiguous() {
        let desc = TypeDescriptor::builder("Person")
            .constructor(
                ConstructorDescriptor::new(
                    "a",
                    vec![ParamDescriptor::of::<i32>("id")],
                    |mut args| Ok(person(args.next()?, None, 0)),
                )
                .automap(),
            )
            .constructor(
                ConstructorDescriptor::new(
                    "b",
                    vec![ParamDescriptor::of::<i64>("id")],
                    |mut args| Ok(person(args.next::<i64>()? as i32, None, 0)),
                )
                .automap(),
            )
            .build();
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let err = ConstructorResolver::default()
            .select(&desc, &schema)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::AmbiguousConstructor);
    }

    #[test]
    fn signature_filter_picks_the_only_fit() {
        let desc = TypeDescriptor::builder("Person")
            .constructor(ConstructorDescriptor::new(
                "with_id",
                vec![ParamDescriptor::of::<i32>("id")],
                |mut args| Ok(person(args.next()?, None, 0)),
            ))
            .constructor(person_ctor(
                "new",
                vec![
                    ParamDescriptor::of::<i32>("id"),
                    ParamDescriptor::of::<Option<String>>("name"),
                    ParamDescriptor::of::<i32>("age"),
                ],
            ))
            .build();
        let selected = ConstructorResolver::default()
            .select(&desc, &person_schema())
            .unwrap();
        assert_eq!(selected.rule(), SelectionRule::Signature);
        assert_eq!(selected.constructor().map(|c| c.name()), Some("new"));
    }

    #[test]
    fn identical_signatures_are_ambiguous() {
        let params = || {
            vec![
                ParamDescriptor::of::<i32>("id"),
                ParamDescriptor::of::<Option<String>>("name"),
                ParamDescriptor::of::<Option<i32>>("age"),
            ]
        };
        let desc = TypeDescriptor::builder("Person")
            .constructor(ConstructorDescriptor::new("a", params(), |mut args| {
                Ok(person(args.next()?, args.next()?, args.next::<Option<i32>>()?.unwrap_or(0)))
            }))
            .constructor(ConstructorDescriptor::new("b", params(), |mut args| {
                Ok(person(args.next()?, args.next()?, args.next::<Option<i32>>()?.unwrap_or(0)))
            }))
            .build();
        let err = ConstructorResolver::default()
            .select(&desc, &person_schema())
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::AmbiguousConstructor);
        assert!(err.message.starts_with("Person: 2 constructors"), "{err}");
    }

    #[test]
    fn opaque_parameter_never_matches() {
        let desc: TypeDescriptor<Person> = TypeDescriptor::builder("Person")
            .constructor(ConstructorDescriptor::new(
                "new",
                vec![ParamDescriptor::new("id", ParamType::opaque("Height"))],
                |_| Err(MappingError::conversion("unreachable")),
            ))
            .build();
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let err = ConstructorResolver::default()
            .select(&desc, &schema)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::NoMatchingConstructor);
    }

    #[test]
    fn widening_can_be_disabled() {
        let desc = TypeDescriptor::builder("Person")
            .constructor(ConstructorDescriptor::new(
                "wide",
                vec![ParamDescriptor::of::<i64>("id")],
                |mut args| Ok(person(args.next::<i64>()? as i32, None, 0)),
            ))
            .build();
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let row = Row(vec![Value::Int32(9)]);

        let widening = ConstructorResolver::default();
        assert_eq!(widening.resolve(&desc, &schema, &row).unwrap().id, 9);

        let strict = ConstructorResolver::new(ResolverOptions {
            numeric_widening: false,
            ..ResolverOptions::default()
        });
        let err = strict.resolve(&desc, &schema, &row).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::NoMatchingConstructor);
    }

    #[test]
    fn name_based_binding_ignores_column_order_and_extras() {
        let desc = TypeDescriptor::builder("Person")
            .constructor(person_ctor(
                "new",
                vec![
                    ParamDescriptor::of::<i32>("id"),
                    ParamDescriptor::of::<Option<String>>("full_name").column("name"),
                    ParamDescriptor::of::<i32>("age_years"),
                ],
            ))
            .build();
        let schema = Schema::new(vec![
            Column::new("AGEYEARS", ColumnType::Integer),
            Column::new("extra", ColumnType::Boolean),
            Column::new("name", ColumnType::Varchar),
            Column::new("Id", ColumnType::Integer),
        ]);
        let row = Row(vec![
            Value::Int32(41),
            Value::Bool(true),
            Value::String("x".into()),
            Value::Int32(3),
        ]);
        let resolver = ConstructorResolver::new(ResolverOptions {
            arg_name_based: true,
            underscore_to_camel_case: true,
            ..ResolverOptions::default()
        });
        let selected = resolver.select(&desc, &schema).unwrap();
        assert_eq!(selected.column_indices(), Some(vec![3, 2, 0]));
        assert_eq!(selected.construct(&row).unwrap(), person(3, Some("x".into()), 41));

        let without_camel = ConstructorResolver::new(ResolverOptions {
            arg_name_based: true,
            ..ResolverOptions::default()
        });
        let err = without_camel.select(&desc, &schema).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::NoMatchingConstructor);
        assert!(err.message.contains("age_years"), "{err}");
    }

    #[test]
    fn resolving_twice_gives_equal_instances() {
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let row = Row(vec![Value::Int32(5)]);
        let resolver = ConstructorResolver::default();
        let desc = id_only();
        assert_eq!(
            resolver.resolve(&desc, &schema, &row).unwrap(),
            resolver.resolve(&desc, &schema, &row).unwrap()
        );
    }

    #[test]
    fn row_width_must_match_schema() {
        let schema = Schema::new(vec![Column::new("id", ColumnType::Integer)]);
        let row = Row(vec![Value::Int32(5), Value::Int32(6)]);
        let err = ConstructorResolver::default()
            .resolve(&id_only(), &schema, &row)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::Conversion);
    }

    fn primitive_and_wrapper() -> TypeDescriptor<Person> {
        TypeDescriptor::builder("Person")
            .constructor(person_ctor(
                "primitive",
                vec![
                    ParamDescriptor::of::<i32>("id"),
                    ParamDescriptor::of::<Option<String>>("name"),
                    ParamDescriptor::of::<i32>("age"),
                ],
            ))
            .constructor(ConstructorDescriptor::new(
                "wrapper",
                vec![
                    ParamDescriptor::of::<i32>("id"),
                    ParamDescriptor::of::<Option<String>>("name"),
                    ParamDescriptor::of::<Option<i32>>("age"),
                ],
                |mut args| {
                    let id = args.next()?;
                    let name = args.next()?;
                    let age: Option<i32> = args.next()?;
                    Ok(person(id, name, age.unwrap_or(-1)))
                },
            ))
            .build()
    }

    #[test]
    fn null_rules_out_the_primitive_constructor() {
        let desc = primitive_and_wrapper();
        let resolver = ConstructorResolver::default();

        let selected = resolver.select(&desc, &person_schema()).unwrap();
        assert_eq!(selected.rule(), SelectionRule::Signature);
        assert!(selected.constructor().is_none());
        assert_eq!(selected.constructors().count(), 2);

        let row = Row(vec![Value::Int32(1), Value::Null, Value::Null]);
        let p = resolver.resolve(&desc, &person_schema(), &row).unwrap();
        assert_eq!(p, person(1, None, -1));
    }

    #[test]
    fn rows_without_nulls_stay_ambiguous() {
        let row = Row(vec![Value::Int32(1), Value::String("a".into()), Value::Int32(7)]);
        let err = ConstructorResolver::default()
            .resolve(&primitive_and_wrapper(), &person_schema(), &row)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::AmbiguousConstructor);
        assert!(err.message.contains("primitive"), "{err}");
    }

    #[test]
    fn not_null_column_cannot_separate_constructors() {
        let schema = Schema::new(vec![
            Column::new("id", ColumnType::Integer).not_null(),
            Column::new("name", ColumnType::Varchar),
            Column::new("age", ColumnType::Integer).not_null(),
        ]);
        let err = ConstructorResolver::default()
            .select(&primitive_and_wrapper(), &schema)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::AmbiguousConstructor);
    }

    #[test]
    fn column_mapping_cannot_reuse_a_bound_column() {
        let desc = TypeDescriptor::builder("Pair")
            .constructor(ConstructorDescriptor::new(
                "new",
                vec![
                    ParamDescriptor::of::<i32>("a"),
                    ParamDescriptor::of::<i32>("b").column("a"),
                ],
                |mut args| Ok(person(args.next()?, None, args.next()?)),
            ))
            .build();
        let schema = Schema::new(vec![
            Column::new("a", ColumnType::Integer),
            Column::new("b", ColumnType::Integer),
        ]);
        let err = ConstructorResolver::default()
            .select(&desc, &schema)
            .unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::NoMatchingConstructor);
        assert!(err.message.contains("more than one parameter"), "{err}");
    }
}
