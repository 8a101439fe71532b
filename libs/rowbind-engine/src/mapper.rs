use rowbind_api::descriptor::{AutoConstruct, TypeDescriptor};
use rowbind_api::error::MappingError;
use rowbind_api::source::ResultSet;

use crate::resolver::ConstructorResolver;

/// Turns whole result sets into lists of objects.
///
/// The constructor is selected once per result set, before any row is
/// touched; a failing row aborts the whole list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMapper {
    resolver: ConstructorResolver,
}

impl ResultMapper {
    pub fn new(resolver: ConstructorResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ConstructorResolver {
        &self.resolver
    }

    pub fn map_all<T: AutoConstruct>(&self, rs: &ResultSet) -> Result<Vec<T>, MappingError> {
        self.map_with(T::descriptor(), rs)
    }

    pub fn map_with<T>(
        &self,
        descriptor: &TypeDescriptor<T>,
        rs: &ResultSet,
    ) -> Result<Vec<T>, MappingError> {
        let selected = self.resolver.select(descriptor, &rs.schema)?;
        rs.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                tracing::trace!(type_name = descriptor.type_name(), row = i, "mapping row");
                selected
                    .construct(row)
                    .map_err(|e| e.with_context(format_args!("row {i}")))
            })
            .collect()
    }
}
